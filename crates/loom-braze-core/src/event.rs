// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Custom event records.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::attributes::Attributes;
use crate::handle::ClientHandle;
use crate::record::Serialized;
use crate::value::{format_timestamp, TraitValue};

/// A custom event performed by a user.
#[derive(Debug, Clone)]
pub struct EventRecord {
	/// External ID of the user the event belongs to.
	pub external_id: String,
	pub name: String,
	/// When the event happened. Defaults to construction time.
	pub timestamp: DateTime<Utc>,
	pub properties: Attributes,
	handle: Option<ClientHandle>,
}

impl EventRecord {
	pub fn new(external_id: impl Into<String>, name: impl Into<String>) -> Self {
		Self {
			external_id: external_id.into(),
			name: name.into(),
			timestamp: Utc::now(),
			properties: Attributes::new(),
			handle: None,
		}
	}

	pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
		self.timestamp = timestamp;
		self
	}

	/// Sets a single property, replacing any previous value for the key.
	pub fn set<K, V>(mut self, key: K, value: V) -> Self
	where
		K: Into<String>,
		V: Into<TraitValue>,
	{
		self.properties.set(key, value);
		self
	}

	/// Merges a batch of properties into the event.
	pub fn set_all(mut self, properties: Attributes) -> Self {
		self.properties = self.properties.merge(properties);
		self
	}

	/// Attaches the client this event should be enqueued with by default.
	pub fn with_handle(mut self, handle: ClientHandle) -> Self {
		self.handle = Some(handle);
		self
	}

	pub fn handle(&self) -> Option<&ClientHandle> {
		self.handle.as_ref()
	}

	/// Renders the event for the `events` list of a track request.
	///
	/// `properties` is only present when the event has any.
	pub fn serialize(&self) -> Serialized {
		let mut body = Map::new();
		body.insert(
			"external_campaign_id".to_string(),
			Value::String(self.external_id.clone()),
		);
		body.insert("name".to_string(), Value::String(self.name.clone()));
		body.insert(
			"time".to_string(),
			Value::String(format_timestamp(&self.timestamp)),
		);

		let mut issues = Vec::new();
		if !self.properties.is_empty() {
			let mut properties = Map::new();
			self.properties
				.write_json(&self.external_id, &mut properties, &mut issues);
			body.insert("properties".to_string(), Value::Object(properties));
		}

		Serialized { body, issues }
	}
}

impl std::fmt::Display for EventRecord {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(
			f,
			"Braze event {} for {}{}",
			self.name, self.external_id, self.properties
		)
	}
}
