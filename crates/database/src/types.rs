// In crates/database/src/types.rs

use chrono::NaiveDate;
use core_types::{Trade, TradeRecord};
use rust_decimal::Decimal;

/// A row of the `trades` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TradeRow {
    pub id: String,
    pub trade_date: NaiveDate,
    pub amount: Decimal,
    pub outcome: String,
    pub risk_to_reward: Option<f64>,
    pub tags: Vec<String>,
    pub session: Option<String>,
}

impl TradeRow {
    /// Validates the row into a `Trade`.
    pub fn into_trade(self) -> core_types::Result<Trade> {
        Trade::try_from(TradeRecord {
            id: self.id,
            date: self.trade_date,
            amount: self.amount,
            outcome: self.outcome,
            risk_to_reward: self.risk_to_reward,
            tags: self.tags,
            session: self.session,
        })
    }
}
