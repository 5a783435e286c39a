// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Ordered key-value mapping for user traits and event properties.

use serde_json::{Map, Value};

use crate::value::TraitValue;

/// A value that could not be rendered while serializing a record.
#[derive(Debug, Clone, PartialEq)]
pub struct SerializeIssue {
	/// External ID of the record the value belongs to.
	pub external_id: String,
	/// Trait or property key.
	pub key: String,
	/// Why the value was dropped.
	pub reason: String,
}

impl std::fmt::Display for SerializeIssue {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(
			f,
			"{}: dropped {:?} ({})",
			self.external_id, self.key, self.reason
		)
	}
}

/// An insertion-ordered mapping of trait or property values.
///
/// Setting an existing key replaces the value in place, keeping the key's
/// original position so serialization stays deterministic.
///
/// # Example
///
/// ```
/// use loom_braze_core::Attributes;
///
/// let traits = Attributes::new()
///     .insert("first_name", "Ada")
///     .insert("plan", "gold")
///     .insert("seats", 12)
///     .insert("churned", false);
/// assert_eq!(traits.len(), 4);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes {
	entries: Vec<(String, TraitValue)>,
}

impl Attributes {
	pub fn new() -> Self {
		Self {
			entries: Vec::new(),
		}
	}

	/// Inserts a key-value pair, replacing any previous value for the key.
	pub fn insert<K, V>(mut self, key: K, value: V) -> Self
	where
		K: Into<String>,
		V: Into<TraitValue>,
	{
		self.set(key, value);
		self
	}

	/// In-place variant of [`Attributes::insert`].
	pub fn set<K, V>(&mut self, key: K, value: V)
	where
		K: Into<String>,
		V: Into<TraitValue>,
	{
		let key = key.into();
		let value = value.into();
		match self.entries.iter_mut().find(|(k, _)| *k == key) {
			Some((_, existing)) => *existing = value,
			None => self.entries.push((key, value)),
		}
	}

	/// Merges another mapping into this one.
	///
	/// If both contain the same key, the value from `other` takes precedence.
	pub fn merge(mut self, other: Attributes) -> Self {
		for (k, v) in other.entries {
			self.set(k, v);
		}
		self
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn get(&self, key: &str) -> Option<&TraitValue> {
		self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &TraitValue)> {
		self.entries.iter().map(|(k, v)| (k.as_str(), v))
	}

	/// Renders every value into `out`, in insertion order.
	///
	/// Values that cannot be rendered are left out of `out` and reported in
	/// `issues` instead, so one bad value never takes down the whole record.
	pub fn write_json(
		&self,
		external_id: &str,
		out: &mut Map<String, Value>,
		issues: &mut Vec<SerializeIssue>,
	) {
		for (key, value) in &self.entries {
			match value.to_json() {
				Ok(json) => {
					out.insert(key.clone(), json);
				}
				Err(e) => {
					tracing::warn!(
						external_id = %external_id,
						key = %key,
						error = %e,
						"Dropping value that cannot be serialized"
					);
					issues.push(SerializeIssue {
						external_id: external_id.to_string(),
						key: key.clone(),
						reason: e.to_string(),
					});
				}
			}
		}
	}
}

impl std::fmt::Display for Attributes {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		for (k, v) in &self.entries {
			write!(f, "\n {k}: {v}")?;
		}
		Ok(())
	}
}

impl<K: Into<String>, V: Into<TraitValue>> FromIterator<(K, V)> for Attributes {
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		let mut attrs = Attributes::new();
		for (k, v) in iter {
			attrs.set(k, v);
		}
		attrs
	}
}
