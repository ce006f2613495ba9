// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Column types and cell values

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ColumnType {
    Boolean,
    Int,
    Long,
    Double,
    String,
    Timestamp,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnType::Boolean => "BOOLEAN",
            ColumnType::Int => "INT",
            ColumnType::Long => "LONG",
            ColumnType::Double => "DOUBLE",
            ColumnType::String => "STRING",
            ColumnType::Timestamp => "TIMESTAMP",
        };
        f.write_str(name)
    }
}

impl FromStr for ColumnType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "BOOLEAN" => Ok(ColumnType::Boolean),
            "INT" => Ok(ColumnType::Int),
            "LONG" => Ok(ColumnType::Long),
            "DOUBLE" => Ok(ColumnType::Double),
            "STRING" | "SYMBOL" | "VARCHAR" => Ok(ColumnType::String),
            "TIMESTAMP" => Ok(ColumnType::Timestamp),
            other => Err(format!("unsupported column type: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub name: String,
    pub ty: ColumnType,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, ty: ColumnType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// A single cell value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Boolean(bool),
    Int(i32),
    Long(i64),
    Double(f64),
    String(String),
    /// Microseconds since the Unix epoch
    Timestamp(i64),
}

pub type Row = Vec<Value>;

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Convert into a value storable in a column of type `ty`
    ///
    /// Returns `None` when no lossless conversion exists.
    pub fn coerce_to(&self, ty: ColumnType) -> Option<Value> {
        match (self, ty) {
            (Value::Null, _) => Some(Value::Null),
            (Value::Boolean(b), ColumnType::Boolean) => Some(Value::Boolean(*b)),
            (Value::Int(v), ColumnType::Int) => Some(Value::Int(*v)),
            (Value::Int(v), ColumnType::Long) => Some(Value::Long(i64::from(*v))),
            (Value::Int(v), ColumnType::Double) => Some(Value::Double(f64::from(*v))),
            (Value::Int(v), ColumnType::Timestamp) => Some(Value::Timestamp(i64::from(*v))),
            (Value::Long(v), ColumnType::Int) => i32::try_from(*v).ok().map(Value::Int),
            (Value::Long(v), ColumnType::Long) => Some(Value::Long(*v)),
            (Value::Long(v), ColumnType::Double) => Some(Value::Double(*v as f64)),
            (Value::Long(v), ColumnType::Timestamp) => Some(Value::Timestamp(*v)),
            (Value::Double(v), ColumnType::Double) => Some(Value::Double(*v)),
            (Value::String(s), ColumnType::String) => Some(Value::String(s.clone())),
            (Value::String(s), ColumnType::Timestamp) => parse_timestamp(s).map(Value::Timestamp),
            (Value::Timestamp(v), ColumnType::Timestamp) => Some(Value::Timestamp(*v)),
            (Value::Timestamp(v), ColumnType::Long) => Some(Value::Long(*v)),
            _ => None,
        }
    }

    /// SQL equality with numeric widening; `NULL` equals nothing
    pub fn sql_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, _) | (_, Value::Null) => false,
            (Value::Double(a), b) | (b, Value::Double(a)) => b.as_f64() == Some(*a),
            (a, b) => match (a.as_i64(), b.as_i64()) {
                (Some(x), Some(y)) => x == y,
                _ => a == b,
            },
        }
    }

    fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(i64::from(*v)),
            Value::Long(v) | Value::Timestamp(v) => Some(*v),
            _ => None,
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Double(v) => Some(*v),
            other => other.as_i64().map(|v| v as f64),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Boolean(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Long(v) => write!(f, "{v}"),
            Value::Double(v) => write!(f, "{v}"),
            Value::String(v) => f.write_str(v),
            Value::Timestamp(v) => match chrono::DateTime::from_timestamp_micros(*v) {
                Some(ts) => write!(f, "{}", ts.format("%Y-%m-%dT%H:%M:%S%.6fZ")),
                None => write!(f, "{v}"),
            },
        }
    }
}

/// ISO-8601 text to epoch microseconds; a missing offset means UTC
fn parse_timestamp(text: &str) -> Option<i64> {
    if let Ok(ts) = chrono::DateTime::parse_from_rfc3339(text) {
        return Some(ts.timestamp_micros());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S"]
        .iter()
        .find_map(|fmt| chrono::NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            chrono::NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .map(|ts| ts.and_utc().timestamp_micros())
}

#[cfg(test)]
#[path = "value_tests.rs"]
mod tests;
