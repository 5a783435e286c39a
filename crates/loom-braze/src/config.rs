// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Client configuration.

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};

/// Default REST endpoint (EU cluster).
pub const DEFAULT_ENDPOINT: &str = "https://rest.fra-01.braze.eu";
/// Placeholder API key used when none is configured.
pub const DEFAULT_API_KEY: &str = "APIKEY";
/// Most users and most events the track endpoint accepts per call.
pub const MAX_BATCH_SIZE: usize = 75;

/// Configuration for the Braze client.
///
/// `batch_size` above [`MAX_BATCH_SIZE`] is accepted, but the API rejects or
/// truncates oversized calls.
#[derive(Debug, Clone)]
pub struct BrazeConfig {
	/// REST endpoint, without trailing slash.
	pub endpoint: String,
	/// API key of the app group.
	pub api_key: String,
	/// Users and events per track call.
	pub batch_size: usize,
	/// Flush as soon as either queue reaches `batch_size`.
	pub auto_flush: bool,
	/// Actually send requests. When false, requests are only built and logged.
	pub send: bool,
	/// Minimum spacing between consecutive track calls.
	pub pause: Duration,
	/// Write the request log.
	pub log: bool,
	/// Request log file. Defaults to a timestamped file in the working
	/// directory when `log` is set.
	pub log_file: Option<PathBuf>,
	/// Deadline for each HTTP request.
	pub request_timeout: Duration,
}

impl Default for BrazeConfig {
	fn default() -> Self {
		Self {
			endpoint: DEFAULT_ENDPOINT.to_string(),
			api_key: DEFAULT_API_KEY.to_string(),
			batch_size: MAX_BATCH_SIZE,
			auto_flush: true,
			send: false,
			pause: Duration::ZERO,
			log: true,
			log_file: None,
			request_timeout: Duration::from_secs(30),
		}
	}
}

impl BrazeConfig {
	/// URL of the track endpoint.
	pub fn track_url(&self) -> String {
		format!("{}/users/track", self.endpoint)
	}

	/// Batch size used by the flush loop; never zero.
	pub(crate) fn effective_batch_size(&self) -> usize {
		self.batch_size.max(1)
	}

	/// Where the request log goes, if anywhere.
	///
	/// An explicit `log_file` is used even when `log` is off.
	pub(crate) fn resolve_log_path(&self, now: DateTime<Utc>) -> Option<PathBuf> {
		match (&self.log_file, self.log) {
			(Some(path), _) => Some(path.clone()),
			(None, true) => Some(PathBuf::from(format!(
				"braze_{}.log",
				now.format("%Y-%m-%d_%Hh%Mm%Ss")
			))),
			(None, false) => None,
		}
	}
}

fn mask(key: &str) -> String {
	let visible: String = key.chars().take(4).collect();
	if key.chars().count() <= 4 {
		"****".to_string()
	} else {
		format!("{visible}****")
	}
}

impl std::fmt::Display for BrazeConfig {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		writeln!(f, "BrazeConfig")?;
		writeln!(f, " endpoint: {}", self.endpoint)?;
		writeln!(f, " api_key: {}", mask(&self.api_key))?;
		writeln!(f, " batch_size: {}", self.batch_size)?;
		writeln!(f, " auto_flush: {}", self.auto_flush)?;
		writeln!(f, " send: {}", self.send)?;
		writeln!(f, " pause: {:?}", self.pause)?;
		match &self.log_file {
			Some(path) => writeln!(f, " log: {}", path.display()),
			None => writeln!(f, " log: {}", self.log),
		}
	}
}
