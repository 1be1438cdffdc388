// In crates/risk/src/dynamic_manager.rs

use crate::types::{DynamicRiskSettings, RiskPanel};
use crate::{Error, Result, RiskManager};
use num_traits::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Returns the risk percentage that currently applies.
///
/// The escalated percentage is used only when dynamic risk is enabled, both the
/// escalated percentage and the threshold are configured, and the realized
/// profit has reached the threshold. Otherwise the baseline is returned, which
/// may itself be unset.
pub fn effective_risk(settings: &DynamicRiskSettings, realized_profit_percent: f64) -> Option<f64> {
    if settings.dynamic_risk_enabled {
        if let (Some(increased), Some(threshold)) =
            (settings.increased_risk_percent, settings.profit_threshold_percent)
        {
            if realized_profit_percent >= threshold {
                return Some(increased);
            }
        }
    }
    settings.risk_per_trade_percent
}

/// Realized profit as a percentage of starting equity. Zero when equity is not positive.
pub fn realized_profit_percent(total_profit: Decimal, account_equity: Decimal) -> f64 {
    if account_equity <= dec!(0) {
        return 0.0;
    }
    (total_profit / account_equity).to_f64().unwrap_or(0.0) * 100.0
}

/// Dollar risk per trade: `(account_equity + total_profit) * risk_percent / 100`.
///
/// The base is the current total account value, not the starting balance.
pub fn risk_amount(account_equity: Decimal, total_profit: Decimal, risk_percent: f64) -> Decimal {
    let percent = Decimal::from_f64(risk_percent).unwrap_or_default();
    (account_equity + total_profit) * percent / dec!(100)
}

/// A risk manager implementing the profit-threshold escalation rule.
#[derive(Debug, Clone)]
pub struct DynamicRiskManager {
    settings: DynamicRiskSettings,
}

impl DynamicRiskManager {
    /// Creates a new `DynamicRiskManager`, rejecting negative or non-finite percentages.
    pub fn new(settings: DynamicRiskSettings) -> Result<Self> {
        let fields = [
            ("risk_per_trade_percent", settings.risk_per_trade_percent),
            ("increased_risk_percent", settings.increased_risk_percent),
            ("profit_threshold_percent", settings.profit_threshold_percent),
        ];
        for (name, value) in fields {
            if let Some(v) = value {
                if !v.is_finite() || v < 0.0 {
                    return Err(Error::InvalidParameters(format!("{name} must be a non-negative number, got {v}")));
                }
            }
        }
        if settings.dynamic_risk_enabled && settings.increased_risk_percent.is_none() {
            tracing::warn!("Dynamic risk is enabled but no increased risk percentage is configured.");
        }
        Ok(Self { settings })
    }

    pub fn settings(&self) -> &DynamicRiskSettings {
        &self.settings
    }
}

impl RiskManager for DynamicRiskManager {
    fn name(&self) -> &'static str {
        "DynamicRiskManager"
    }

    fn effective_risk(&self, realized_profit_percent: f64) -> Option<f64> {
        effective_risk(&self.settings, realized_profit_percent)
    }

    fn evaluate(&self, account_equity: Decimal, total_profit: Decimal) -> Option<RiskPanel> {
        let realized = realized_profit_percent(total_profit, account_equity);
        let effective = self.effective_risk(realized)?;
        let escalated = self.settings.dynamic_risk_enabled
            && self.settings.increased_risk_percent == Some(effective)
            && self.settings.profit_threshold_percent.is_some_and(|t| realized >= t);

        Some(RiskPanel {
            effective_risk_percent: effective,
            risk_amount: risk_amount(account_equity, total_profit, effective),
            realized_profit_percent: realized,
            escalated,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> DynamicRiskSettings {
        DynamicRiskSettings {
            risk_per_trade_percent: Some(1.0),
            dynamic_risk_enabled: true,
            increased_risk_percent: Some(2.0),
            profit_threshold_percent: Some(10.0),
        }
    }

    #[test]
    fn test_escalates_once_threshold_is_reached() {
        assert_eq!(effective_risk(&settings(), 12.0), Some(2.0));
        assert_eq!(effective_risk(&settings(), 10.0), Some(2.0));
        assert_eq!(effective_risk(&settings(), 5.0), Some(1.0));
    }

    #[test]
    fn test_disabled_rule_uses_baseline() {
        let mut s = settings();
        s.dynamic_risk_enabled = false;
        assert_eq!(effective_risk(&s, 50.0), Some(1.0));
    }

    #[test]
    fn test_missing_threshold_uses_baseline() {
        let mut s = settings();
        s.profit_threshold_percent = None;
        assert_eq!(effective_risk(&s, 50.0), Some(1.0));
    }

    #[test]
    fn test_no_configured_risk_means_no_panel() {
        let s = DynamicRiskSettings::default();
        assert_eq!(effective_risk(&s, 0.0), None);
        let manager = DynamicRiskManager::new(s).unwrap();
        assert!(manager.evaluate(dec!(10000), dec!(500)).is_none());
    }

    #[test]
    fn test_risk_amount_is_based_on_current_account_value() {
        // 10% realized profit on 10k crosses the threshold: 2% of 11k.
        let manager = DynamicRiskManager::new(settings()).unwrap();
        let panel = manager.evaluate(dec!(10000), dec!(1000)).unwrap();
        assert_eq!(panel.effective_risk_percent, 2.0);
        assert!(panel.escalated);
        assert_eq!(panel.risk_amount, dec!(220));
        assert!((panel.realized_profit_percent - 10.0).abs() < 1e-9);

        let panel = manager.evaluate(dec!(10000), dec!(500)).unwrap();
        assert!(!panel.escalated);
        assert_eq!(panel.risk_amount, dec!(105));
    }

    #[test]
    fn test_non_positive_equity_gives_zero_realized_percent() {
        assert_eq!(realized_profit_percent(dec!(100), dec!(0)), 0.0);
        assert_eq!(realized_profit_percent(dec!(100), dec!(-5)), 0.0);
    }

    #[test]
    fn test_rejects_negative_percentages() {
        let mut s = settings();
        s.increased_risk_percent = Some(-2.0);
        assert!(matches!(DynamicRiskManager::new(s), Err(Error::InvalidParameters(_))));
    }
}
