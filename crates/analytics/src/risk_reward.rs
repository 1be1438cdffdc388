// In crates/analytics/src/risk_reward.rs

use crate::chronological;
use crate::types::{RiskRewardPoint, RiskRewardStats};
use core_types::Trade;

/// Average and maximum risk-to-reward, plus the dated series for plotting.
///
/// Trades without a recorded ratio are left out entirely.
pub fn aggregate(trades: &[Trade]) -> RiskRewardStats {
    let series: Vec<RiskRewardPoint> = chronological(trades)
        .into_iter()
        .filter_map(|t| t.risk_to_reward.map(|ratio| RiskRewardPoint { date: t.date, ratio }))
        .collect();

    if series.is_empty() {
        return RiskRewardStats::default();
    }

    let average = series.iter().map(|p| p.ratio).sum::<f64>() / series.len() as f64;
    let maximum = series.iter().map(|p| p.ratio).fold(0.0_f64, f64::max);

    RiskRewardStats {
        average,
        maximum,
        series,
    }
}
