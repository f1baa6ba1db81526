// ── Sensor types and readings ──

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use strum::{Display, EnumString};

/// The kind of value a sensor produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Number,
    Text,
    Bool,
}

/// Classification of a measurement, derived from a sensor's schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SensorType {
    pub name: String,
    pub display_name: String,
    pub units: Option<String>,
    pub measure: Option<String>,
    pub kind: ValueKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ReadingValue {
    Number(f64),
    Text(String),
    Bool(bool),
}

impl ReadingValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Number(_) => ValueKind::Number,
            Self::Text(_) => ValueKind::Text,
            Self::Bool(_) => ValueKind::Bool,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for ReadingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// A typed value with its capture time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reading {
    pub value: ReadingValue,
    pub captured_at: DateTime<Utc>,
}
