// In crates/analytics/src/streaks.rs

use crate::chronological;
use crate::types::StreakStats;
use core_types::{Outcome, Trade};

/// Tracks one side (wins or losses) of the streak walk.
#[derive(Default)]
struct RunTracker {
    current: u32,
    max: u32,
    closed_total: u32,
    closed_runs: u32,
}

impl RunTracker {
    fn extend(&mut self) {
        self.current += 1;
        self.max = self.max.max(self.current);
    }

    fn close(&mut self) {
        if self.current > 0 {
            self.closed_total += self.current;
            self.closed_runs += 1;
            self.current = 0;
        }
    }

    fn average(&self) -> f64 {
        if self.closed_runs == 0 {
            0.0
        } else {
            self.closed_total as f64 / self.closed_runs as f64
        }
    }
}

/// Computes consecutive win/loss run statistics.
///
/// Trades are walked in date order (ties keep their input order). A win closes
/// any open loss run and vice versa. A breakeven touches neither counter, so a
/// scratch trade inside a winning run keeps the run alive.
pub fn analyze(trades: &[Trade]) -> StreakStats {
    let mut wins = RunTracker::default();
    let mut losses = RunTracker::default();

    for trade in chronological(trades) {
        match trade.outcome {
            Outcome::Win => {
                losses.close();
                wins.extend();
            }
            Outcome::Loss => {
                wins.close();
                losses.extend();
            }
            Outcome::Breakeven => {}
        }
    }

    // Whichever run is still open at the end counts as closed.
    wins.close();
    losses.close();

    StreakStats {
        max_win_streak: wins.max,
        avg_win_streak: wins.average(),
        max_loss_streak: losses.max,
        avg_loss_streak: losses.average(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{day, trade};
    use rust_decimal_macros::dec;

    #[test]
    fn test_breakeven_does_not_break_a_win_run() {
        let trades = vec![
            trade("1", day(1), Outcome::Win, dec!(100)),
            trade("2", day(2), Outcome::Breakeven, dec!(0)),
            trade("3", day(3), Outcome::Win, dec!(50)),
            trade("4", day(4), Outcome::Loss, dec!(-30)),
        ];
        let stats = analyze(&trades);
        assert_eq!(stats.max_win_streak, 2);
        assert_eq!(stats.avg_win_streak, 2.0);
        assert_eq!(stats.max_loss_streak, 1);
        assert_eq!(stats.avg_loss_streak, 1.0);
    }

    #[test]
    fn test_runs_are_walked_in_date_order() {
        // Input order is scrambled; by date the sequence is W W L L L W.
        let trades = vec![
            trade("6", day(6), Outcome::Win, dec!(5)),
            trade("3", day(3), Outcome::Loss, dec!(-1)),
            trade("1", day(1), Outcome::Win, dec!(5)),
            trade("5", day(5), Outcome::Loss, dec!(-1)),
            trade("2", day(2), Outcome::Win, dec!(5)),
            trade("4", day(4), Outcome::Loss, dec!(-1)),
        ];
        let stats = analyze(&trades);
        assert_eq!(stats.max_win_streak, 2);
        assert_eq!(stats.max_loss_streak, 3);
        // Win runs: 2 and 1.
        assert_eq!(stats.avg_win_streak, 1.5);
        assert_eq!(stats.avg_loss_streak, 3.0);
    }

    #[test]
    fn test_same_day_trades_keep_input_order() {
        let trades = vec![
            trade("a", day(1), Outcome::Loss, dec!(-1)),
            trade("b", day(1), Outcome::Win, dec!(1)),
            trade("c", day(1), Outcome::Loss, dec!(-1)),
        ];
        let stats = analyze(&trades);
        assert_eq!(stats.max_win_streak, 1);
        assert_eq!(stats.max_loss_streak, 1);
        assert_eq!(stats.avg_loss_streak, 1.0);
    }

    #[test]
    fn test_empty_and_breakeven_only() {
        assert_eq!(analyze(&[]), StreakStats::default());
        let only_be = vec![trade("1", day(1), Outcome::Breakeven, dec!(2))];
        assert_eq!(analyze(&only_be), StreakStats::default());
    }

    #[test]
    fn test_inserting_breakeven_never_lowers_max_win_streak() {
        let base = vec![
            trade("1", day(1), Outcome::Win, dec!(1)),
            trade("2", day(3), Outcome::Win, dec!(1)),
            trade("3", day(5), Outcome::Loss, dec!(-1)),
            trade("4", day(7), Outcome::Win, dec!(1)),
        ];
        let without = analyze(&base).max_win_streak;
        for be_day in 1..=8 {
            let mut with_be = base.clone();
            with_be.push(trade("be", day(be_day), Outcome::Breakeven, dec!(0)));
            assert!(analyze(&with_be).max_win_streak >= without);
        }
    }
}
