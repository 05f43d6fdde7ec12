//! Catalog rows and request types.
//!
//! Rows are owned by the remote store; this service reads them and only ever
//! adjusts `Item::count` through an atomic delta.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque row identifier.
///
/// The store may key rows by integer or by text (uuid, slug). Both are
/// passed through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Text(String),
}

impl RecordId {
    /// Interpret a JSON value as a record id.
    ///
    /// Integral numbers (including `42.0`) become `Int` when they fit in an
    /// `i64`; non-empty strings become `Text`.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, IdRejection> {
        match value {
            serde_json::Value::Number(n) => Self::from_number(n),
            serde_json::Value::String(s) if !s.is_empty() => Ok(RecordId::Text(s.clone())),
            _ => Err(IdRejection::WrongType),
        }
    }

    fn from_number(n: &serde_json::Number) -> Result<Self, IdRejection> {
        if let Some(v) = n.as_i64() {
            return Ok(RecordId::Int(v));
        }
        if n.is_u64() {
            return Err(IdRejection::OutOfRange);
        }
        match n.as_f64() {
            Some(f) if f.fract() != 0.0 || !f.is_finite() => Err(IdRejection::WrongType),
            // i64::MAX as f64 rounds up to 2^63, hence the strict bound
            Some(f) if f >= i64::MIN as f64 && f < i64::MAX as f64 => Ok(RecordId::Int(f as i64)),
            Some(_) => Err(IdRejection::OutOfRange),
            None => Err(IdRejection::WrongType),
        }
    }

    /// Whether this id refers to the same row as a query-string value.
    pub fn matches_str(&self, raw: &str) -> bool {
        match self {
            RecordId::Int(n) => raw.trim().parse::<i64>().map(|v| v == *n).unwrap_or(false),
            RecordId::Text(s) => s == raw,
        }
    }
}

/// Why a JSON value is not usable as a record id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdRejection {
    /// Neither an integer nor a non-empty string
    WrongType,
    /// An integer outside the signed 64-bit range
    OutOfRange,
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Int(n) => write!(f, "{}", n),
            RecordId::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for RecordId {
    fn from(n: i64) -> Self {
        RecordId::Int(n)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        RecordId::Text(s.to_string())
    }
}

/// A row of `catalog_group`, projected to `id,name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: RecordId,
    pub name: Option<String>,
}

/// A full row of `catalog`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: RecordId,
    pub name: Option<String>,
    pub catalog_group_id: RecordId,
    pub is_active: bool,
    pub count: i64,
}

impl Item {
    pub fn summary(&self) -> ItemSummary {
        ItemSummary {
            id: self.id.clone(),
            name: self.name.clone(),
        }
    }
}

/// A row of `catalog`, projected to `id,name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemSummary {
    pub id: RecordId,
    pub name: Option<String>,
}

/// Direction of a counter mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountDelta {
    Increase,
    Decrease,
}

impl CountDelta {
    /// Signed delta handed to the store procedure.
    pub fn value(self) -> i64 {
        match self {
            CountDelta::Increase => 1,
            CountDelta::Decrease => -1,
        }
    }

    /// Route name, used in logs and metrics.
    pub fn operation(self) -> &'static str {
        match self {
            CountDelta::Increase => "increase",
            CountDelta::Decrease => "decrease",
        }
    }
}

/// Response body of a successful counter mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountUpdated {
    /// Raw result of the store procedure (usually the updated rows).
    pub updated: serde_json::Value,
}

/// Query string of `GET /get_sub_group`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubGroupQuery {
    pub group_id: Option<String>,
}

impl SubGroupQuery {
    /// Build from decoded query pairs. A repeated `group_id` keeps its first
    /// value; unknown keys are ignored.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        Self {
            group_id: pairs
                .into_iter()
                .find(|(key, _)| key == "group_id")
                .map(|(_, value)| value),
        }
    }
}

/// Liveness report for `GET /health`.
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
    pub store_configured: bool,
}
