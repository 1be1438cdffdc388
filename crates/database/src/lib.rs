// In crates/database/src/lib.rs

use app_config::types::DatabaseSettings;
use async_trait::async_trait;
use core_types::{Trade, TradeRecord};
use sqlx::{postgres::PgPoolOptions, PgPool};
use types::TradeRow;

pub mod cache;
pub mod error;
pub mod memory;
pub mod types;

// Re-export the most important types for easy access.
pub use cache::CachedTradeStore;
pub use error::{Error, Result};
pub use memory::InMemoryTradeStore;

/// The source of raw journal trades.
///
/// The analytics assume the full in-scope set of a calendar is returned in
/// one call; there is no pagination contract.
#[async_trait]
pub trait TradeStore: Send + Sync {
    /// The name of the store, for logs.
    fn name(&self) -> &'static str;

    /// Returns every trade recorded in a calendar.
    ///
    /// A failure must be reported as an error, never as an empty list.
    async fn trades_for_calendar(&self, calendar_id: &str) -> Result<Vec<Trade>>;

    /// Inserts trades into a calendar, replacing trades with the same id.
    async fn insert_trades(&self, calendar_id: &str, trades: &[Trade]) -> Result<()>;
}

/// A wrapper around the `sqlx` connection pool.
#[derive(Debug, Clone)]
pub struct Db(PgPool);

/// Establishes a connection pool to the PostgreSQL database and runs migrations.
///
/// # Arguments
///
/// * `settings`: The database configuration settings.
///
/// # Returns
///
/// A `Result` containing the `Db` wrapper on success, or an `Error` on failure.
pub async fn connect(settings: &DatabaseSettings) -> Result<Db> {
    // Create a connection pool.
    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        // The `?` operator uses the `#[from]` attribute in our error enum
        // to automatically convert the `sqlx::Error` into a `database::Error`.
        .connect(&settings.url)
        .await?;

    // Run database migrations. This ensures the database schema is up-to-date.
    sqlx::migrate!("../../migrations").run(&pool).await.map_err(Error::from)?;

    Ok(Db(pool))
}

#[async_trait]
impl TradeStore for Db {
    fn name(&self) -> &'static str {
        "postgres"
    }

    async fn trades_for_calendar(&self, calendar_id: &str) -> Result<Vec<Trade>> {
        let rows: Vec<TradeRow> = sqlx::query_as(
            r#"
            SELECT id, trade_date, amount, outcome, risk_to_reward, tags, session
            FROM trades
            WHERE calendar_id = $1
            ORDER BY trade_date, created_at
            "#,
        )
        .bind(calendar_id)
        .fetch_all(&self.0)
        .await
        .map_err(Error::OperationFailed)?;

        tracing::debug!(calendar_id, count = rows.len(), "Loaded trades from the database.");

        rows.into_iter()
            .map(|row| {
                row.into_trade().map_err(|source| Error::InvalidRecord {
                    calendar_id: calendar_id.to_string(),
                    source,
                })
            })
            .collect()
    }

    async fn insert_trades(&self, calendar_id: &str, trades: &[Trade]) -> Result<()> {
        let mut tx = self.0.begin().await.map_err(Error::OperationFailed)?;

        for trade in trades {
            let record = TradeRecord::from(trade.clone());
            sqlx::query(
                r#"
                INSERT INTO trades (calendar_id, id, trade_date, amount, outcome, risk_to_reward, tags, session)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                ON CONFLICT (calendar_id, id) DO UPDATE SET
                    trade_date = EXCLUDED.trade_date,
                    amount = EXCLUDED.amount,
                    outcome = EXCLUDED.outcome,
                    risk_to_reward = EXCLUDED.risk_to_reward,
                    tags = EXCLUDED.tags,
                    session = EXCLUDED.session
                "#,
            )
            .bind(calendar_id)
            .bind(&record.id)
            .bind(record.date)
            .bind(record.amount)
            .bind(&record.outcome)
            .bind(record.risk_to_reward)
            .bind(&record.tags)
            .bind(&record.session)
            .execute(&mut *tx)
            .await
            .map_err(Error::OperationFailed)?;
        }

        tx.commit().await.map_err(Error::OperationFailed)?;
        tracing::info!(calendar_id, count = trades.len(), "Trades saved.");

        Ok(())
    }
}
