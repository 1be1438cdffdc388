// In crates/core-types/src/error.rs

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Trade record is missing an id")]
    MissingId,

    #[error("Trade {id} has an unknown outcome type: {value}")]
    InvalidOutcome { id: String, value: String },

    #[error("Trade {id} has an invalid risk-to-reward ratio: {value}")]
    InvalidRiskToReward { id: String, value: f64 },

    #[error("Unknown time period: {0}")]
    InvalidTimePeriod(String),
}

pub type Result<T> = std::result::Result<T, Error>;
