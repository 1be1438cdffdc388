// In crates/analytics/src/goals.rs

use crate::types::GoalProgress;
use crate::window::in_period;
use chrono::NaiveDate;
use core_types::{AccountSettings, TimePeriod, Trade};
use rust_decimal::Decimal;
use rust_decimal::prelude::*;
use std::collections::BTreeMap;

fn percent_of(amount: Decimal, percent: f64) -> Option<Decimal> {
    Decimal::from_f64(percent).map(|p| amount * p / Decimal::ONE_HUNDRED)
}

/// Progress towards the monthly target and daily loss limit checks.
///
/// The month is the reference date's month. Daily limits are checked on every
/// day present in `trades`.
pub fn track(trades: &[Trade], reference_date: NaiveDate, account: &AccountSettings) -> GoalProgress {
    let equity = account.account_equity;
    let has_equity = equity > Decimal::ZERO;

    let month_pnl: Decimal = trades
        .iter()
        .filter(|t| in_period(t.date, reference_date, TimePeriod::Month))
        .map(|t| t.amount)
        .sum();

    let monthly_target_amount = account
        .monthly_target_percent
        .filter(|_| has_equity)
        .and_then(|p| percent_of(equity, p));
    let target_progress_percent = monthly_target_amount
        .filter(|target| *target > Decimal::ZERO)
        .map(|target| (month_pnl / target).to_f64().unwrap_or(0.0) * 100.0);

    let mut daily: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
    for trade in trades {
        *daily.entry(trade.date).or_default() += trade.amount;
    }

    let worst_day = daily
        .iter()
        .filter(|(_, pnl)| **pnl < Decimal::ZERO)
        .fold(None, |worst: Option<(NaiveDate, Decimal)>, (date, pnl)| match worst {
            Some((_, w)) if w <= *pnl => worst,
            _ => Some((*date, *pnl)),
        });

    let max_daily_loss_amount = account
        .max_daily_drawdown_percent
        .filter(|_| has_equity)
        .and_then(|p| percent_of(equity, p));
    let breached_days = match max_daily_loss_amount {
        Some(limit) if limit > Decimal::ZERO => daily
            .iter()
            .filter(|(_, pnl)| **pnl <= -limit)
            .map(|(date, _)| *date)
            .collect(),
        _ => Vec::new(),
    };

    if !breached_days.is_empty() {
        tracing::debug!(count = breached_days.len(), "Daily loss limit breached.");
    }

    GoalProgress {
        monthly_target_amount,
        month_pnl,
        target_progress_percent,
        max_daily_loss_amount,
        worst_day,
        breached_days,
    }
}
