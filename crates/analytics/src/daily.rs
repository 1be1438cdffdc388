// In crates/analytics/src/daily.rs

use crate::chronological;
use crate::types::DailySummaryRow;
use chrono::NaiveDate;
use core_types::Trade;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// One row per trading day, most recent day first.
pub fn summarize(trades: &[Trade]) -> Vec<DailySummaryRow> {
    let mut days: BTreeMap<NaiveDate, Vec<&Trade>> = BTreeMap::new();
    for trade in chronological(trades) {
        days.entry(trade.date).or_default().push(trade);
    }

    days.into_iter()
        .rev()
        .map(|(date, day_trades)| DailySummaryRow {
            date,
            trade_count: day_trades.len() as u32,
            dominant_session: dominant_session(&day_trades),
            pnl: day_trades.iter().map(|t| t.amount).sum::<Decimal>(),
        })
        .collect()
}

/// The most frequent session label of a day.
///
/// Ties go to the label whose first trade came earliest. `None` when no trade
/// of the day has a session.
fn dominant_session(day_trades: &[&Trade]) -> Option<String> {
    // Labels in first-seen order, with their counts.
    let mut counts: Vec<(&str, u32)> = Vec::new();
    for session in day_trades.iter().filter_map(|t| t.session.as_ref()) {
        let label = session.label();
        match counts.iter_mut().find(|(l, _)| *l == label) {
            Some((_, n)) => *n += 1,
            None => counts.push((label, 1)),
        }
    }

    counts
        .into_iter()
        .fold(None, |best: Option<(&str, u32)>, (label, n)| match best {
            Some((_, best_n)) if best_n >= n => best,
            _ => Some((label, n)),
        })
        .map(|(label, _)| label.to_string())
}
