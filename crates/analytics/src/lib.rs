// In crates/analytics/src/lib.rs

pub mod cumulative;
pub mod daily;
pub mod engine;
pub mod goals;
pub mod risk_reward;
pub mod sessions;
pub mod streaks;
pub mod tags;
pub mod types;
pub mod win_loss;
pub mod window;

pub use engine::{AnalyticsEngine, ProgressObserver};
pub use types::{AnalyticsInput, ChartDataPoint, PerformanceReport, TagComparison};

use core_types::Trade;

/// Win rate as a percentage, with breakevens left out of the denominator.
/// Zero when there are no wins or losses.
pub(crate) fn win_rate(wins: u32, losses: u32) -> f64 {
    let decided = wins + losses;
    if decided == 0 {
        0.0
    } else {
        wins as f64 / decided as f64 * 100.0
    }
}

/// The trades in date order. Trades on the same date keep their input order.
pub(crate) fn chronological(trades: &[Trade]) -> Vec<&Trade> {
    let mut sorted: Vec<&Trade> = trades.iter().collect();
    sorted.sort_by_key(|t| t.date);
    sorted
}
