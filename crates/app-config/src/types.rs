// In crates/app-config/src/types.rs

use crate::{Error, Result};
use core_types::AccountSettings;
use risk::DynamicRiskSettings;
use rust_decimal::Decimal;
use serde::Deserialize;

#[derive(Deserialize, Debug, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Settings {
    /// The application's general settings.
    pub app: AppSettings,
    /// Settings for the database connection.
    pub database: DatabaseSettings,
    pub server: ServerSettings,
    /// Account equity and goal percentages used by the analytics.
    #[serde(default)]
    pub account: AccountSettings,
    /// Risk-per-trade configuration, including dynamic escalation.
    #[serde(default)]
    pub risk: DynamicRiskSettings,
}

impl Settings {
    /// Rejects values no calculation can make sense of.
    pub fn validate(&self) -> Result<()> {
        if self.account.account_equity < Decimal::ZERO {
            return Err(Error::Invalid("account.account_equity must not be negative".into()));
        }
        let percents = [
            ("account.max_daily_drawdown_percent", self.account.max_daily_drawdown_percent),
            ("account.monthly_target_percent", self.account.monthly_target_percent),
        ];
        for (name, value) in percents {
            if value.is_some_and(|v| !v.is_finite() || v < 0.0) {
                return Err(Error::Invalid(format!("{name} must be a non-negative number")));
            }
        }
        Ok(())
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct AppSettings {
    /// The environment the application is running in (e.g., "development", "production").
    pub environment: String,
    /// The log level for the application.
    pub log_level: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct DatabaseSettings {
    /// The connection URL for the PostgreSQL database.
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

/// Helper function for serde defaults
fn default_max_connections() -> u32 { 5 }
