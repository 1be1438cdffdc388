// In crates/risk/src/types.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Risk-per-trade configuration, including the optional profit-threshold escalation rule.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct DynamicRiskSettings {
    /// Baseline risk as a percentage of equity. `None` means no risk is configured.
    #[serde(default)]
    pub risk_per_trade_percent: Option<f64>,
    #[serde(default)]
    pub dynamic_risk_enabled: bool,
    /// Escalated risk percentage, only used when dynamic risk is enabled.
    #[serde(default)]
    pub increased_risk_percent: Option<f64>,
    /// Realized profit, as a percentage of starting equity, that triggers escalation.
    #[serde(default)]
    pub profit_threshold_percent: Option<f64>,
}

/// What the presentation layer shows in its risk panel.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RiskPanel {
    pub effective_risk_percent: f64,
    /// Dollar risk per trade, sized off the current total account value.
    pub risk_amount: Decimal,
    pub realized_profit_percent: f64,
    /// Whether the escalated percentage is in effect.
    pub escalated: bool,
}
