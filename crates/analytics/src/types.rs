// In crates/analytics/src/types.rs

use chrono::NaiveDate;
use core_types::{AccountSettings, TimePeriod, Trade};
use risk::types::{DynamicRiskSettings, RiskPanel};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Count, total and mean amount for one outcome bucket.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct OutcomeBucket {
    pub count: u32,
    pub total_amount: Decimal,
    pub average_amount: Decimal,
}

/// Consecutive run statistics over the chronological trade sequence.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq)]
pub struct StreakStats {
    pub max_win_streak: u32,
    pub avg_win_streak: f64,
    pub max_loss_streak: u32,
    pub avg_loss_streak: f64,
}

/// Win/loss/breakeven breakdown for a set of trades.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct WinLossStats {
    pub total_trades: u32,
    /// Percentage in `[0, 100]`; breakevens are not part of the denominator.
    pub win_rate: f64,
    /// Realized P&L over every trade, breakevens included.
    pub total_pnl: Decimal,
    pub wins: OutcomeBucket,
    pub losses: OutcomeBucket,
    pub breakevens: OutcomeBucket,
    pub max_win_streak: u32,
    pub avg_win_streak: f64,
    pub max_loss_streak: u32,
    pub avg_loss_streak: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiskRewardPoint {
    pub date: NaiveDate,
    pub ratio: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct RiskRewardStats {
    pub average: f64,
    pub maximum: f64,
    pub series: Vec<RiskRewardPoint>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TagStat {
    pub tag: String,
    pub wins: u32,
    pub losses: u32,
    pub breakevens: u32,
    pub total_trades: u32,
    pub win_rate: f64,
    pub total_pnl: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionStat {
    pub session: String,
    pub wins: u32,
    pub losses: u32,
    pub breakevens: u32,
    pub total_trades: u32,
    pub win_rate: f64,
    pub total_pnl: Decimal,
    pub average_pnl: Decimal,
    /// Total P&L as a percentage of account equity.
    pub pnl_percentage: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailySummaryRow {
    pub date: NaiveDate,
    pub trade_count: u32,
    pub dominant_session: Option<String>,
    pub pnl: Decimal,
}

/// One day of the cumulative P&L chart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChartDataPoint {
    pub date: NaiveDate,
    /// Axis label, e.g. "Mar 05".
    pub label: String,
    pub pnl: Decimal,
    pub cumulative_pnl: Decimal,
    pub is_increasing: bool,
    pub is_decreasing: bool,
    /// Change of the cumulative total versus the previous day.
    pub daily_change: Decimal,
    pub is_win_day: bool,
    pub is_loss_day: bool,
    pub is_breakeven_day: bool,
    /// The trades closed on this day, for drill-down.
    pub trades: Vec<Trade>,
}

/// Progress against the monthly target and the daily loss limit.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct GoalProgress {
    pub monthly_target_amount: Option<Decimal>,
    pub month_pnl: Decimal,
    pub target_progress_percent: Option<f64>,
    pub max_daily_loss_amount: Option<Decimal>,
    pub worst_day: Option<(NaiveDate, Decimal)>,
    pub breached_days: Vec<NaiveDate>,
}

/// The primary/secondary tag selection used for the comparison view.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct TagComparison {
    #[serde(default)]
    pub primary: Vec<String>,
    #[serde(default)]
    pub secondary: Vec<String>,
}

/// Everything a single calculation needs.
#[derive(Debug, Clone)]
pub struct AnalyticsInput<'a> {
    pub trades: &'a [Trade],
    pub reference_date: NaiveDate,
    pub period: TimePeriod,
    /// Used as the chart range when an `all` request has no trades.
    pub today: NaiveDate,
    pub account: &'a AccountSettings,
    pub comparison: &'a TagComparison,
    pub risk_settings: &'a DynamicRiskSettings,
}

/// A comprehensive report of a journal's performance over one time window.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PerformanceReport {
    pub period: TimePeriod,
    pub reference_date: NaiveDate,
    pub range_start: NaiveDate,
    pub range_end: NaiveDate,
    pub win_loss: WinLossStats,
    pub risk_reward: RiskRewardStats,
    pub tag_stats: Vec<TagStat>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub tag_comparison: Vec<TagStat>,
    pub session_stats: Vec<SessionStat>,
    pub daily_summary: Vec<DailySummaryRow>,
    pub cumulative: Vec<ChartDataPoint>,
    pub goals: GoalProgress,
    pub risk: Option<RiskPanel>,
}
