// In crates/analytics/src/window.rs

use chrono::{Datelike, NaiveDate};
use core_types::{TimePeriod, Trade};

/// Selects the trades that belong to `period`, anchored at `reference_date`.
///
/// The input is never modified; the selected trades are cloned in input order.
pub fn filter(trades: &[Trade], reference_date: NaiveDate, period: TimePeriod) -> Vec<Trade> {
    trades
        .iter()
        .filter(|t| in_period(t.date, reference_date, period))
        .cloned()
        .collect()
}

pub fn in_period(date: NaiveDate, reference_date: NaiveDate, period: TimePeriod) -> bool {
    match period {
        TimePeriod::Month => date.year() == reference_date.year() && date.month() == reference_date.month(),
        TimePeriod::Year => date.year() == reference_date.year(),
        TimePeriod::All => true,
    }
}

/// The inclusive date range the cumulative chart spans for a request.
///
/// `month` and `year` cover the whole calendar month or year. `all` spans the
/// earliest to the latest trade, or just `today` when there are no trades.
pub fn chart_range(
    trades: &[Trade],
    reference_date: NaiveDate,
    period: TimePeriod,
    today: NaiveDate,
) -> (NaiveDate, NaiveDate) {
    match period {
        TimePeriod::Month => {
            let start = reference_date.with_day(1).unwrap_or(reference_date);
            (start, last_day_of_month(start))
        }
        TimePeriod::Year => {
            let year = reference_date.year();
            let start = NaiveDate::from_ymd_opt(year, 1, 1).unwrap_or(reference_date);
            let end = NaiveDate::from_ymd_opt(year, 12, 31).unwrap_or(reference_date);
            (start, end)
        }
        TimePeriod::All => {
            let start = trades.iter().map(|t| t.date).min();
            let end = trades.iter().map(|t| t.date).max();
            match (start, end) {
                (Some(start), Some(end)) => (start, end),
                _ => (today, today),
            }
        }
    }
}

fn last_day_of_month(first: NaiveDate) -> NaiveDate {
    let (year, month) = if first.month() == 12 {
        (first.year() + 1, 1)
    } else {
        (first.year(), first.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|next| next.pred_opt())
        .unwrap_or(first)
}
