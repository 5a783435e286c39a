// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Bookkeeping for every track request the client builds.
//!
//! Each flush cycle produces one [`FlushRecord`], kept in memory for the
//! lifetime of the client, and optionally one block in an append-only text
//! file written by [`RequestLog`].

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use loom_braze_core::SerializeIssue;
use serde::Serialize;
use serde_json::Value;
use tokio::io::AsyncWriteExt;

/// Outcome of a request that was actually sent.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchOutcome {
	/// True for 2xx statuses.
	pub ok: bool,
	pub status: u16,
	/// Parsed response body.
	pub response: Value,
}

/// One flush cycle: the request that was built and, if sent, what came back.
#[derive(Debug, Clone)]
pub struct FlushRecord {
	/// When the request was built.
	pub timestamp: DateTime<Utc>,
	pub url: String,
	pub request: Value,
	/// Values dropped while serializing the batch.
	pub issues: Vec<SerializeIssue>,
	/// `None` in dry-run mode, or when the request failed before a JSON
	/// response was read.
	pub outcome: Option<DispatchOutcome>,
}

impl FlushRecord {
	/// Number of users in the request's `attributes` list.
	pub fn user_count(&self) -> usize {
		list_len(&self.request, "attributes")
	}

	/// Number of events in the request's `events` list.
	pub fn event_count(&self) -> usize {
		list_len(&self.request, "events")
	}

	pub fn was_sent(&self) -> bool {
		self.outcome.is_some()
	}
}

fn list_len(request: &Value, key: &str) -> usize {
	request
		.get(key)
		.and_then(Value::as_array)
		.map_or(0, Vec::len)
}

/// Append-only request log file.
///
/// Each cycle appends a header, the timestamp and the pretty-printed request,
/// followed by the pretty-printed response when the request was sent.
#[derive(Debug, Clone, Default)]
pub struct RequestLog {
	path: Option<PathBuf>,
}

impl RequestLog {
	pub fn new(path: Option<PathBuf>) -> Self {
		Self { path }
	}

	pub fn disabled() -> Self {
		Self { path: None }
	}

	pub fn path(&self) -> Option<&Path> {
		self.path.as_deref()
	}

	pub async fn write_request(&self, timestamp: DateTime<Utc>, request: &Value) -> std::io::Result<()> {
		let block = format!(
			"\"-- Request {}\"\n\"-- {} {}\"\n\n{}\n\n",
			"-".repeat(49),
			timestamp.to_rfc3339(),
			"-".repeat(30),
			pretty(request)?
		);
		self.append(&block).await
	}

	pub async fn write_response(&self, response: &Value) -> std::io::Result<()> {
		let block = format!(
			"\"-- Response {}\"\n\n{}\n\n",
			"-".repeat(48),
			pretty(response)?
		);
		self.append(&block).await
	}

	async fn append(&self, block: &str) -> std::io::Result<()> {
		let Some(path) = &self.path else {
			return Ok(());
		};

		let mut file = tokio::fs::OpenOptions::new()
			.create(true)
			.append(true)
			.open(path)
			.await?;
		file.write_all(block.as_bytes()).await?;
		file.flush().await
	}
}

/// Pretty-prints with a four-space indent.
fn pretty(value: &Value) -> std::io::Result<String> {
	let mut buf = Vec::new();
	let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
	let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
	value.serialize(&mut ser)?;
	String::from_utf8(buf).map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}
