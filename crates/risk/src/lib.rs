// In crates/risk/src/lib.rs

use rust_decimal::Decimal;
use types::RiskPanel;

pub mod dynamic_manager;
pub mod error;
pub mod types;

// Re-export public types
pub use dynamic_manager::{effective_risk, realized_profit_percent, risk_amount, DynamicRiskManager};
pub use error::{Error, Result};
pub use types::DynamicRiskSettings;

/// The universal interface for a risk sizing policy.
///
/// A `RiskManager` decides which risk-per-trade percentage currently applies
/// and turns it into the figures the risk panel displays.
pub trait RiskManager: Sync {
    /// The name of the risk policy.
    fn name(&self) -> &'static str;

    /// The risk percentage in effect given the realized profit so far.
    ///
    /// Returns `None` when no risk is configured at all; callers must hide the
    /// risk panel in that case rather than show a zero.
    fn effective_risk(&self, realized_profit_percent: f64) -> Option<f64>;

    /// Builds the risk panel for an account.
    ///
    /// # Arguments
    ///
    /// * `account_equity`: The starting balance of the account.
    /// * `total_profit`: The realized profit over the selected trades.
    fn evaluate(&self, account_equity: Decimal, total_profit: Decimal) -> Option<RiskPanel>;
}
