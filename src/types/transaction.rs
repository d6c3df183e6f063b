//! Stored and validated transaction records

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{AggregationWarning, GoFinancesError, Result};

/// Direction of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionKind {
    /// Income ("positive")
    #[serde(rename = "positive")]
    Entry,
    /// Spending ("negative")
    #[serde(rename = "negative")]
    Expense,
}

impl TransactionKind {
    pub const ENTRY_TAG: &'static str = "positive";
    pub const EXPENSE_TAG: &'static str = "negative";

    /// Map a stored `type` tag to a kind. Unknown tags yield `None`.
    pub fn classify(tag: &str) -> Option<Self> {
        match tag {
            Self::ENTRY_TAG => Some(Self::Entry),
            Self::EXPENSE_TAG => Some(Self::Expense),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Entry => Self::ENTRY_TAG,
            Self::Expense => Self::EXPENSE_TAG,
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::classify(s).ok_or_else(|| {
            format!(
                "expected \"{}\" or \"{}\", got \"{}\"",
                Self::ENTRY_TAG,
                Self::EXPENSE_TAG,
                s
            )
        })
    }
}

/// Amount as written by the app: a JSON number or a numeric string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawAmount {
    Number(f64),
    Text(String),
    /// Any other JSON value; never numeric
    Other(serde_json::Value),
}

impl RawAmount {
    /// Finite numeric value, or `None` for blank, non-numeric, NaN or infinite input
    pub fn to_f64(&self) -> Option<f64> {
        let value = match self {
            Self::Number(n) => *n,
            Self::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return None;
                }
                trimmed.parse::<f64>().ok()?
            }
            Self::Other(_) => return None,
        };
        value.is_finite().then_some(value)
    }
}

impl fmt::Display for RawAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => write!(f, "\"{}\"", s),
            Self::Other(v) => write!(f, "{}", v),
        }
    }
}

/// A record exactly as kept in storage.
///
/// Only `id` is required to decode, and no field's JSON type can reject the
/// stored list. Amount and date problems surface later as `MalformedRecord`
/// so that one bad record is reported by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTransaction {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<RawAmount>,
    /// Raw `type` tag; kept as a string so unknown tags survive decoding
    #[serde(rename = "type", default, deserialize_with = "lenient_string")]
    pub kind: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub category: String,
    #[serde(
        default,
        deserialize_with = "lenient_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub date: Option<String>,
}

/// Strings as-is, `null` as empty, anything else as its JSON text
fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// Dates as strings. Integer epoch milliseconds are converted to RFC 3339;
/// other values keep their JSON text and fail date parsing later.
fn lenient_date<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Number(n) => Some(
            n.as_i64()
                .and_then(DateTime::from_timestamp_millis)
                .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
                .unwrap_or_else(|| n.to_string()),
        ),
        other => Some(other.to_string()),
    })
}

/// A record whose amount and date have been read successfully
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub id: String,
    pub name: String,
    pub amount: f64,
    /// Bucket used for aggregation (unknown tags land in `Expense`)
    pub kind: TransactionKind,
    /// The stored tag, echoed back in formatted output
    pub type_tag: String,
    pub category: String,
    pub date: DateTime<Utc>,
}

impl Transaction {
    /// Validate a stored record.
    ///
    /// Unknown `type` tags are classified as expenses and reported through
    /// the returned warning.
    pub fn from_raw(raw: &RawTransaction) -> Result<(Self, Option<AggregationWarning>)> {
        let amount = match &raw.amount {
            Some(amount) => amount.to_f64().ok_or_else(|| {
                let reason = format!("amount {} is not a number", amount);
                GoFinancesError::malformed(&raw.id, reason)
            })?,
            None => return Err(GoFinancesError::malformed(&raw.id, "missing amount")),
        };

        let date = match raw.date.as_deref() {
            Some(text) => parse_date(text).ok_or_else(|| {
                let reason = format!("date \"{}\" is not a valid date", text);
                GoFinancesError::malformed(&raw.id, reason)
            })?,
            None => return Err(GoFinancesError::malformed(&raw.id, "missing date")),
        };

        let (kind, warning) = match TransactionKind::classify(&raw.kind) {
            Some(kind) => (kind, None),
            None => (
                TransactionKind::Expense,
                Some(AggregationWarning::UnknownCategoryType {
                    id: raw.id.clone(),
                    value: raw.kind.clone(),
                }),
            ),
        };

        let transaction = Self {
            id: raw.id.clone(),
            name: raw.name.clone(),
            amount,
            kind,
            type_tag: raw.kind.clone(),
            category: raw.category.clone(),
            date,
        };

        Ok((transaction, warning))
    }
}

/// Parse an ISO date string.
///
/// Accepts RFC 3339 (any offset), a naive date-time read as UTC, or a plain
/// date at midnight UTC.
pub fn parse_date(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }

    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, pattern) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
