// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The record variants a client can queue, and JSON ingestion for them.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::attributes::{Attributes, SerializeIssue};
use crate::error::{RecordError, Result};
use crate::event::EventRecord;
use crate::handle::ClientHandle;
use crate::user::UserRecord;
use crate::value::TraitValue;

/// Output of serializing one record: the wire mapping plus any values that
/// had to be dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct Serialized {
	pub body: Map<String, Value>,
	pub issues: Vec<SerializeIssue>,
}

/// Anything that can be queued for the track endpoint.
#[derive(Debug, Clone)]
pub enum Record {
	User(UserRecord),
	Event(EventRecord),
}

impl Record {
	pub fn external_id(&self) -> &str {
		match self {
			Record::User(u) => &u.external_id,
			Record::Event(e) => &e.external_id,
		}
	}

	pub fn kind(&self) -> &'static str {
		match self {
			Record::User(_) => "user",
			Record::Event(_) => "event",
		}
	}

	pub fn handle(&self) -> Option<&ClientHandle> {
		match self {
			Record::User(u) => u.handle(),
			Record::Event(e) => e.handle(),
		}
	}

	pub fn serialize(&self) -> Serialized {
		match self {
			Record::User(u) => u.serialize(),
			Record::Event(e) => e.serialize(),
		}
	}

	/// Builds a record from a JSON row.
	///
	/// The row's `type` selects the variant:
	///
	/// ```json
	/// {"type": "user", "external_id": "u1", "update_existing_only": false, "traits": {"plan": "gold"}}
	/// {"type": "event", "external_id": "u1", "name": "login", "time": "2024-01-01T00:00:00Z", "properties": {}}
	/// ```
	///
	/// Any other `type` yields [`RecordError::UnsupportedRecord`]. A missing
	/// event `time` defaults to now.
	pub fn from_json(value: Value) -> Result<Self> {
		let kind = value
			.get("type")
			.and_then(Value::as_str)
			.unwrap_or_default()
			.to_string();

		match kind.as_str() {
			"user" => {
				let row: UserRow = serde_json::from_value(value)
					.map_err(|e| RecordError::InvalidRecord(e.to_string()))?;
				Ok(Record::User(
					UserRecord::new(row.external_id)
						.update_existing_only(row.update_existing_only)
						.set_all(attributes_from_json(row.traits)?),
				))
			}
			"event" => {
				let row: EventRow = serde_json::from_value(value)
					.map_err(|e| RecordError::InvalidRecord(e.to_string()))?;
				let mut event = EventRecord::new(row.external_id, row.name)
					.set_all(attributes_from_json(row.properties)?);
				if let Some(time) = row.time {
					event = event.at(time);
				}
				Ok(Record::Event(event))
			}
			_ => Err(RecordError::UnsupportedRecord { kind }),
		}
	}
}

impl From<UserRecord> for Record {
	fn from(user: UserRecord) -> Self {
		Record::User(user)
	}
}

impl From<EventRecord> for Record {
	fn from(event: EventRecord) -> Self {
		Record::Event(event)
	}
}

impl std::fmt::Display for Record {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Record::User(u) => std::fmt::Display::fmt(u, f),
			Record::Event(e) => std::fmt::Display::fmt(e, f),
		}
	}
}

#[derive(Debug, Deserialize)]
struct UserRow {
	external_id: String,
	#[serde(default)]
	update_existing_only: bool,
	#[serde(default)]
	traits: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct EventRow {
	external_id: String,
	name: String,
	#[serde(default)]
	time: Option<DateTime<Utc>>,
	#[serde(default)]
	properties: Map<String, Value>,
}

fn attributes_from_json(map: Map<String, Value>) -> Result<Attributes> {
	let mut attrs = Attributes::new();
	for (key, value) in map {
		let value = TraitValue::try_from(value)
			.map_err(|e| RecordError::InvalidRecord(format!("{key}: {e}")))?;
		attrs.set(key, value);
	}
	Ok(attrs)
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn test_user_row() {
		let record = Record::from_json(json!({
			"type": "user",
			"external_id": "u1",
			"update_existing_only": true,
			"traits": {"plan": "gold", "seats": 3}
		}))
		.unwrap();

		let Record::User(user) = record else {
			panic!("expected a user");
		};
		assert_eq!(user.external_id, "u1");
		assert!(user.update_existing_only);
		assert_eq!(user.traits.get("seats"), Some(&TraitValue::Integer(3)));
		let keys: Vec<_> = user.traits.iter().map(|(k, _)| k).collect();
		assert_eq!(keys, vec!["plan", "seats"]);
	}

	#[test]
	fn test_event_row_with_time() {
		let record = Record::from_json(json!({
			"type": "event",
			"external_id": "u1",
			"name": "login",
			"time": "2024-01-01T00:00:00Z"
		}))
		.unwrap();

		assert_eq!(record.kind(), "event");
		let body = record.serialize().body;
		assert_eq!(body["time"], "2024-01-01T00:00:00+00:00");
	}

	#[test]
	fn test_unknown_type_is_unsupported() {
		let err = Record::from_json(json!({"type": "campaign", "id": "c1"})).unwrap_err();
		assert_eq!(
			err,
			RecordError::UnsupportedRecord {
				kind: "campaign".to_string()
			}
		);

		let err = Record::from_json(json!({"external_id": "u1"})).unwrap_err();
		assert!(matches!(err, RecordError::UnsupportedRecord { .. }));
	}

	#[test]
	fn test_missing_fields_are_invalid() {
		let err = Record::from_json(json!({"type": "event", "external_id": "u1"})).unwrap_err();
		assert!(matches!(err, RecordError::InvalidRecord(_)));
	}

	#[test]
	fn test_nested_trait_is_invalid() {
		let err = Record::from_json(json!({
			"type": "user",
			"external_id": "u1",
			"traits": {"address": {"city": "Oslo"}}
		}))
		.unwrap_err();
		assert!(matches!(err, RecordError::InvalidRecord(msg) if msg.starts_with("address")));
	}
}
