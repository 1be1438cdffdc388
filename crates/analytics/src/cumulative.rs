// In crates/analytics/src/cumulative.rs

use crate::chronological;
use crate::types::ChartDataPoint;
use chrono::NaiveDate;
use core_types::Trade;
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Builds the daily cumulative P&L series for `[start, end]` inclusive.
///
/// Every calendar day in the range gets a point, with or without trades, so
/// the chart axis has no gaps. Trades outside the range are ignored.
pub fn build(trades: &[Trade], start: NaiveDate, end: NaiveDate) -> Vec<ChartDataPoint> {
    if start > end {
        return Vec::new();
    }

    let mut by_day: HashMap<NaiveDate, Vec<Trade>> = HashMap::new();
    for trade in chronological(trades) {
        if trade.date >= start && trade.date <= end {
            by_day.entry(trade.date).or_default().push(trade.clone());
        }
    }

    let mut points = Vec::with_capacity((end - start).num_days() as usize + 1);
    let mut cumulative = Decimal::ZERO;

    for date in start.iter_days().take_while(|d| *d <= end) {
        let day_trades = by_day.remove(&date).unwrap_or_default();
        let pnl: Decimal = day_trades.iter().map(|t| t.amount).sum();
        let previous = cumulative;
        cumulative += pnl;

        points.push(ChartDataPoint {
            date,
            label: date.format("%b %d").to_string(),
            pnl,
            cumulative_pnl: cumulative,
            is_increasing: cumulative > previous,
            is_decreasing: cumulative < previous,
            daily_change: cumulative - previous,
            is_win_day: pnl > Decimal::ZERO,
            is_loss_day: pnl < Decimal::ZERO,
            is_breakeven_day: !day_trades.is_empty() && pnl.is_zero(),
            trades: day_trades,
        });
    }

    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{day, trade};
    use core_types::Outcome;
    use rust_decimal_macros::dec;

    #[test]
    fn test_one_point_per_day_with_carry_forward() {
        let trades = vec![
            trade("1", day(1), Outcome::Win, dec!(100)),
            trade("2", day(2), Outcome::Breakeven, dec!(0)),
            trade("3", day(3), Outcome::Win, dec!(50)),
            trade("4", day(4), Outcome::Loss, dec!(-30)),
        ];
        let series = build(&trades, day(1), day(10));
        assert_eq!(series.len(), 10);
        assert_eq!(series.last().unwrap().cumulative_pnl, dec!(120));

        assert!(series[0].is_increasing);
        assert!(series[1].is_breakeven_day);
        assert!(!series[1].is_increasing && !series[1].is_decreasing);
        assert!(series[3].is_decreasing);
        assert!(series[3].is_loss_day);
        assert_eq!(series[3].daily_change, dec!(-30));

        // Empty days carry the running total and have no trades.
        assert_eq!(series[6].cumulative_pnl, dec!(120));
        assert!(series[6].trades.is_empty());
        assert!(!series[6].is_breakeven_day);
    }

    #[test]
    fn test_trades_outside_range_are_ignored() {
        let trades = vec![
            trade("1", day(1), Outcome::Win, dec!(100)),
            trade("2", day(5), Outcome::Loss, dec!(-10)),
            trade("3", day(9), Outcome::Win, dec!(7)),
        ];
        let series = build(&trades, day(2), day(6));
        assert_eq!(series.len(), 5);
        assert_eq!(series[0].cumulative_pnl, dec!(0));
        assert!(!series[0].is_increasing && !series[0].is_decreasing);
        assert_eq!(series.last().unwrap().cumulative_pnl, dec!(-10));
    }

    #[test]
    fn test_same_day_trades_are_grouped() {
        let trades = vec![
            trade("a", day(3), Outcome::Win, dec!(5)),
            trade("b", day(3), Outcome::Loss, dec!(-5)),
        ];
        let series = build(&trades, day(3), day(3));
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].trades.len(), 2);
        assert_eq!(series[0].trades[0].id.0, "a");
        assert!(series[0].is_breakeven_day);
        assert_eq!(series[0].label, "Jan 03");
    }

    #[test]
    fn test_inverted_range_is_empty() {
        assert!(build(&[], day(5), day(4)).is_empty());
        assert_eq!(build(&[], day(4), day(4)).len(), 1);
    }
}
