// In crates/core-types/src/types.rs

use crate::{Error, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A unique identifier for a journal trade.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TradeId(pub String);

impl fmt::Display for TradeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The labelled result of a closed trade.
///
/// Aggregation always trusts this label rather than the sign of the amount,
/// since a breakeven trade may still carry a small non-zero amount after fees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Win,
    Loss,
    Breakeven,
}

impl FromStr for Outcome {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "win" => Ok(Outcome::Win),
            "loss" => Ok(Outcome::Loss),
            "breakeven" | "break_even" | "be" => Ok(Outcome::Breakeven),
            other => Err(other.to_string()),
        }
    }
}

/// A trading session label.
///
/// The four known sessions get their own variants; anything else a user typed
/// is kept verbatim so it can still take part in daily summaries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Session {
    Asia,
    London,
    NyAm,
    NyPm,
    Other(String),
}

impl Session {
    /// The known sessions, in the order session reports list them.
    pub const KNOWN: [Session; 4] = [Session::Asia, Session::London, Session::NyAm, Session::NyPm];

    pub fn label(&self) -> &str {
        match self {
            Session::Asia => "Asia",
            Session::London => "London",
            Session::NyAm => "NY AM",
            Session::NyPm => "NY PM",
            Session::Other(label) => label,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Session::Other(_))
    }
}

impl From<String> for Session {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Asia" => Session::Asia,
            "London" => Session::London,
            "NY AM" => Session::NyAm,
            "NY PM" => Session::NyPm,
            _ => Session::Other(value),
        }
    }
}

impl From<Session> for String {
    fn from(value: Session) -> Self {
        match value {
            Session::Other(label) => label,
            known => known.label().to_string(),
        }
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The aggregation window for a request, anchored at a reference date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TimePeriod {
    #[default]
    Month,
    Year,
    All,
}

impl FromStr for TimePeriod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "month" => Ok(TimePeriod::Month),
            "year" => Ok(TimePeriod::Year),
            "all" => Ok(TimePeriod::All),
            other => Err(Error::InvalidTimePeriod(other.to_string())),
        }
    }
}

impl fmt::Display for TimePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TimePeriod::Month => "month",
            TimePeriod::Year => "year",
            TimePeriod::All => "all",
        };
        f.write_str(s)
    }
}

/// A trade record as it arrives from storage or an import file.
///
/// Fields are loosely typed here; `Trade::try_from` validates them once so
/// the analytics code never has to guard optional or malformed values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeRecord {
    pub id: String,
    pub date: NaiveDate,
    pub amount: Decimal,
    #[serde(alias = "outcomeType", alias = "trade_type", alias = "tradeType")]
    pub outcome: String,
    #[serde(default, alias = "riskToReward")]
    pub risk_to_reward: Option<f64>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub session: Option<String>,
}

/// A single closed trade, validated and immutable from the engine's point of view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TradeRecord")]
pub struct Trade {
    pub id: TradeId,
    pub date: NaiveDate,
    pub amount: Decimal,
    pub outcome: Outcome,
    pub risk_to_reward: Option<f64>,
    pub tags: Vec<String>,
    pub session: Option<Session>,
}

impl Trade {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// True when the trade carries every tag in `tags` (vacuously true for an empty list).
    pub fn has_all_tags(&self, tags: &[String]) -> bool {
        tags.iter().all(|tag| self.has_tag(tag))
    }
}

impl TryFrom<TradeRecord> for Trade {
    type Error = Error;

    fn try_from(record: TradeRecord) -> Result<Self> {
        let id = record.id.trim().to_string();
        if id.is_empty() {
            return Err(Error::MissingId);
        }

        let outcome = record
            .outcome
            .parse::<Outcome>()
            .map_err(|value| Error::InvalidOutcome { id: id.clone(), value })?;

        if let Some(ratio) = record.risk_to_reward {
            if !ratio.is_finite() || ratio < 0.0 {
                return Err(Error::InvalidRiskToReward { id, value: ratio });
            }
        }

        // Keep the first occurrence of each tag, in the order they were recorded.
        let mut tags: Vec<String> = Vec::with_capacity(record.tags.len());
        for tag in record.tags {
            let tag = tag.trim();
            if !tag.is_empty() && !tags.iter().any(|t| t == tag) {
                tags.push(tag.to_string());
            }
        }

        let session = record
            .session
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(Session::from);

        Ok(Trade {
            id: TradeId(id),
            date: record.date,
            amount: record.amount,
            outcome,
            risk_to_reward: record.risk_to_reward,
            tags,
            session,
        })
    }
}

impl From<Trade> for TradeRecord {
    fn from(trade: Trade) -> Self {
        let outcome = match trade.outcome {
            Outcome::Win => "win",
            Outcome::Loss => "loss",
            Outcome::Breakeven => "breakeven",
        };
        TradeRecord {
            id: trade.id.0,
            date: trade.date,
            amount: trade.amount,
            outcome: outcome.to_string(),
            risk_to_reward: trade.risk_to_reward,
            tags: trade.tags,
            session: trade.session.map(String::from),
        }
    }
}

/// Account-level figures the analytics need alongside the trades.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AccountSettings {
    /// The starting balance of the account.
    #[serde(default)]
    pub account_equity: Decimal,
    /// The largest acceptable single-day loss, as a percentage of equity.
    #[serde(default)]
    pub max_daily_drawdown_percent: Option<f64>,
    /// The monthly profit goal, as a percentage of equity.
    #[serde(default)]
    pub monthly_target_percent: Option<f64>,
}
