// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Scalar values carried by user traits and event properties.

use chrono::{DateTime, Utc};
use serde_json::{Number, Value};

use crate::error::{RecordError, Result};

/// Renders a timestamp the way the track endpoint expects it (ISO-8601).
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
	timestamp.to_rfc3339()
}

/// A single trait or property value.
///
/// Braze accepts strings, numbers, booleans, explicit nulls and timestamps.
/// Timestamps are rendered as ISO-8601 strings on the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum TraitValue {
	Null,
	Bool(bool),
	Integer(i64),
	Float(f64),
	String(String),
	Timestamp(DateTime<Utc>),
}

impl TraitValue {
	/// Converts the value into its wire representation.
	///
	/// Fails for floats that JSON cannot represent (NaN and infinities).
	pub fn to_json(&self) -> Result<Value> {
		match self {
			TraitValue::Null => Ok(Value::Null),
			TraitValue::Bool(b) => Ok(Value::Bool(*b)),
			TraitValue::Integer(i) => Ok(Value::Number((*i).into())),
			TraitValue::Float(f) => Number::from_f64(*f).map(Value::Number).ok_or_else(|| {
				RecordError::UnrepresentableValue {
					reason: format!("{f} has no JSON representation"),
				}
			}),
			TraitValue::String(s) => Ok(Value::String(s.clone())),
			TraitValue::Timestamp(ts) => Ok(Value::String(format_timestamp(ts))),
		}
	}

	pub fn is_null(&self) -> bool {
		matches!(self, TraitValue::Null)
	}
}

impl std::fmt::Display for TraitValue {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			TraitValue::Null => write!(f, "null"),
			TraitValue::Bool(b) => write!(f, "{b}"),
			TraitValue::Integer(i) => write!(f, "{i}"),
			TraitValue::Float(v) => write!(f, "{v}"),
			TraitValue::String(s) => write!(f, "{s}"),
			TraitValue::Timestamp(ts) => write!(f, "{}", format_timestamp(ts)),
		}
	}
}

impl TryFrom<Value> for TraitValue {
	type Error = RecordError;

	/// Accepts JSON scalars. Strings are kept as strings, never parsed as
	/// timestamps.
	fn try_from(value: Value) -> Result<Self> {
		match value {
			Value::Null => Ok(TraitValue::Null),
			Value::Bool(b) => Ok(TraitValue::Bool(b)),
			Value::Number(n) => match n.as_i64() {
				Some(i) => Ok(TraitValue::Integer(i)),
				None => n
					.as_f64()
					.map(TraitValue::Float)
					.ok_or_else(|| RecordError::InvalidRecord(format!("unsupported number {n}"))),
			},
			Value::String(s) => Ok(TraitValue::String(s)),
			Value::Array(_) | Value::Object(_) => Err(RecordError::InvalidRecord(
				"trait values must be scalars".to_string(),
			)),
		}
	}
}

impl From<&str> for TraitValue {
	fn from(value: &str) -> Self {
		TraitValue::String(value.to_string())
	}
}

impl From<String> for TraitValue {
	fn from(value: String) -> Self {
		TraitValue::String(value)
	}
}

impl From<bool> for TraitValue {
	fn from(value: bool) -> Self {
		TraitValue::Bool(value)
	}
}

impl From<i64> for TraitValue {
	fn from(value: i64) -> Self {
		TraitValue::Integer(value)
	}
}

impl From<i32> for TraitValue {
	fn from(value: i32) -> Self {
		TraitValue::Integer(value.into())
	}
}

impl From<u32> for TraitValue {
	fn from(value: u32) -> Self {
		TraitValue::Integer(value.into())
	}
}

impl From<f64> for TraitValue {
	fn from(value: f64) -> Self {
		TraitValue::Float(value)
	}
}

impl From<DateTime<Utc>> for TraitValue {
	fn from(value: DateTime<Utc>) -> Self {
		TraitValue::Timestamp(value)
	}
}

impl<T: Into<TraitValue>> From<Option<T>> for TraitValue {
	fn from(value: Option<T>) -> Self {
		value.map(Into::into).unwrap_or(TraitValue::Null)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::TimeZone;

	#[test]
	fn test_timestamp_renders_as_iso8601() {
		let ts = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
		let value = TraitValue::from(ts).to_json().unwrap();
		assert_eq!(value, Value::String("2024-03-01T12:30:00+00:00".to_string()));
		assert!(DateTime::parse_from_rfc3339(value.as_str().unwrap()).is_ok());
	}

	#[test]
	fn test_null_is_explicit() {
		assert_eq!(TraitValue::Null.to_json().unwrap(), Value::Null);
		assert!(TraitValue::from(None::<&str>).is_null());
	}

	#[test]
	fn test_nan_is_unrepresentable() {
		let result = TraitValue::Float(f64::NAN).to_json();
		assert!(matches!(result, Err(RecordError::UnrepresentableValue { .. })));
	}

	#[test]
	fn test_scalars_pass_through() {
		assert_eq!(TraitValue::from(42).to_json().unwrap(), serde_json::json!(42));
		assert_eq!(TraitValue::from(1.5).to_json().unwrap(), serde_json::json!(1.5));
		assert_eq!(TraitValue::from(true).to_json().unwrap(), serde_json::json!(true));
		assert_eq!(TraitValue::from("gold").to_json().unwrap(), serde_json::json!("gold"));
	}

	#[test]
	fn test_try_from_json_rejects_nested_values() {
		assert!(TraitValue::try_from(serde_json::json!([1, 2])).is_err());
		assert!(TraitValue::try_from(serde_json::json!({"a": 1})).is_err());
		assert_eq!(
			TraitValue::try_from(serde_json::json!(7)).unwrap(),
			TraitValue::Integer(7)
		);
		assert_eq!(
			TraitValue::try_from(serde_json::json!(2.5)).unwrap(),
			TraitValue::Float(2.5)
		);
	}
}
