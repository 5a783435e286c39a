// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! User attribute records.

use serde_json::{Map, Value};

use crate::attributes::{Attributes, SerializeIssue};
use crate::handle::ClientHandle;
use crate::record::Serialized;
use crate::value::TraitValue;

/// A user whose attributes should be created or updated in Braze.
///
/// # Example
///
/// ```
/// use loom_braze_core::UserRecord;
///
/// let user = UserRecord::new("user_123")
///     .set("email", "ada@example.com")
///     .set("plan", "gold");
/// let body = user.serialize().body;
/// assert_eq!(body["external_campaign_id"], "user_123");
/// assert_eq!(body["plan"], "gold");
/// ```
#[derive(Debug, Clone)]
pub struct UserRecord {
	pub external_id: String,
	/// Only update users that already exist instead of creating them.
	pub update_existing_only: bool,
	pub traits: Attributes,
	handle: Option<ClientHandle>,
}

impl UserRecord {
	pub fn new(external_id: impl Into<String>) -> Self {
		Self {
			external_id: external_id.into(),
			update_existing_only: false,
			traits: Attributes::new(),
			handle: None,
		}
	}

	pub fn update_existing_only(mut self, update_existing_only: bool) -> Self {
		self.update_existing_only = update_existing_only;
		self
	}

	/// Sets a single trait, replacing any previous value for the key.
	pub fn set<K, V>(mut self, key: K, value: V) -> Self
	where
		K: Into<String>,
		V: Into<TraitValue>,
	{
		self.traits.set(key, value);
		self
	}

	/// Merges a batch of traits into the user.
	pub fn set_all(mut self, traits: Attributes) -> Self {
		self.traits = self.traits.merge(traits);
		self
	}

	/// Attaches the client this user should be enqueued with by default.
	pub fn with_handle(mut self, handle: ClientHandle) -> Self {
		self.handle = Some(handle);
		self
	}

	pub fn handle(&self) -> Option<&ClientHandle> {
		self.handle.as_ref()
	}

	/// Renders the user for the `attributes` list of a track request.
	///
	/// Traits are flattened next to the identity keys, so a trait named like
	/// one of them overrides it.
	pub fn serialize(&self) -> Serialized {
		let mut body = Map::new();
		body.insert(
			"external_campaign_id".to_string(),
			Value::String(self.external_id.clone()),
		);
		body.insert(
			"update_existing_only".to_string(),
			Value::Bool(self.update_existing_only),
		);

		let mut issues: Vec<SerializeIssue> = Vec::new();
		self.traits.write_json(&self.external_id, &mut body, &mut issues);

		Serialized { body, issues }
	}
}

impl std::fmt::Display for UserRecord {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "BrazeUser {}{}", self.external_id, self.traits)
	}
}
