// In crates/analytics/src/sessions.rs

use crate::types::SessionStat;
use crate::win_rate;
use core_types::{Outcome, Session, Trade};
use rust_decimal::Decimal;
use rust_decimal::prelude::*;

/// Win/loss/P&L breakdown per known trading session.
///
/// Always returns one row per known session, in `Asia`, `London`, `NY AM`,
/// `NY PM` order, so charts get a stable axis. Trades without a session or
/// with an unknown label do not contribute.
pub fn compute(trades: &[Trade], account_equity: Decimal) -> Vec<SessionStat> {
    Session::KNOWN
        .iter()
        .map(|session| {
            let mut wins = 0u32;
            let mut losses = 0u32;
            let mut breakevens = 0u32;
            let mut total_pnl = Decimal::ZERO;

            for trade in trades.iter().filter(|t| t.session.as_ref() == Some(session)) {
                total_pnl += trade.amount;
                match trade.outcome {
                    Outcome::Win => wins += 1,
                    Outcome::Loss => losses += 1,
                    Outcome::Breakeven => breakevens += 1,
                }
            }

            let total_trades = wins + losses + breakevens;
            let average_pnl = if total_trades == 0 {
                Decimal::ZERO
            } else {
                total_pnl / Decimal::from(total_trades)
            };
            let pnl_percentage = if account_equity > Decimal::ZERO {
                (total_pnl / account_equity).to_f64().unwrap_or(0.0) * 100.0
            } else {
                0.0
            };

            SessionStat {
                session: session.label().to_string(),
                wins,
                losses,
                breakevens,
                total_trades,
                win_rate: win_rate(wins, losses),
                total_pnl,
                average_pnl,
                pnl_percentage,
            }
        })
        .collect()
}
