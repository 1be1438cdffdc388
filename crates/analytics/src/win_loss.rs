// In crates/analytics/src/win_loss.rs

use crate::types::{OutcomeBucket, WinLossStats};
use crate::{streaks, win_rate};
use core_types::{Outcome, Trade};
use rust_decimal::Decimal;

fn bucket<'a>(trades: impl Iterator<Item = &'a Trade>) -> OutcomeBucket {
    let (count, total_amount) = trades.fold((0u32, Decimal::ZERO), |(n, sum), t| (n + 1, sum + t.amount));
    let average_amount = if count == 0 {
        Decimal::ZERO
    } else {
        total_amount / Decimal::from(count)
    };
    OutcomeBucket {
        count,
        total_amount,
        average_amount,
    }
}

/// Computes counts, win rate, average amounts and streaks for a set of trades.
///
/// Buckets are decided by the outcome label only.
pub fn aggregate(trades: &[Trade]) -> WinLossStats {
    let wins = bucket(trades.iter().filter(|t| t.outcome == Outcome::Win));
    let losses = bucket(trades.iter().filter(|t| t.outcome == Outcome::Loss));
    let breakevens = bucket(trades.iter().filter(|t| t.outcome == Outcome::Breakeven));
    let streaks = streaks::analyze(trades);

    WinLossStats {
        total_trades: trades.len() as u32,
        win_rate: win_rate(wins.count, losses.count),
        total_pnl: trades.iter().map(|t| t.amount).sum(),
        wins,
        losses,
        breakevens,
        max_win_streak: streaks.max_win_streak,
        avg_win_streak: streaks.avg_win_streak,
        max_loss_streak: streaks.max_loss_streak,
        avg_loss_streak: streaks.avg_loss_streak,
    }
}
