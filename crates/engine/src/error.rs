// In crates/engine/src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// The trade store could not provide the trades. Never replaced by an empty set.
    #[error("Failed to load trades: {0}")]
    Storage(#[from] database::Error),

    #[error("Request {request_id} was superseded by a newer request")]
    Superseded { request_id: u64 },

    #[error("Analytics task failed: {0}")]
    Task(String),
}

pub type Result<T> = std::result::Result<T, Error>;
