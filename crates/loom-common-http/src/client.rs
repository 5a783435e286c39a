// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Shared HTTP client with consistent User-Agent header.

use reqwest::{Client, ClientBuilder};
use std::time::Duration;

/// Creates a new HTTP client builder with the standard Loom User-Agent header.
///
/// Use this when you need to customize the client (e.g., set timeout).
///
/// # Example
/// ```ignore
/// let client = loom_common_http::builder()
///     .timeout(Duration::from_secs(30))
///     .build()?;
/// ```
pub fn builder() -> ClientBuilder {
	Client::builder().user_agent(user_agent())
}

/// Creates a new HTTP client with a request deadline and the standard
/// User-Agent.
pub fn new_client_with_timeout(timeout: Duration) -> reqwest::Result<Client> {
	builder().timeout(timeout).build()
}

/// Returns the standard Loom User-Agent string.
///
/// Format: `loom/{platform}/{version}`
/// Example: `loom/linux-x86_64/0.1.0`
pub fn user_agent() -> String {
	format!(
		"loom/{}-{}/{}",
		std::env::consts::OS,
		std::env::consts::ARCH,
		env!("CARGO_PKG_VERSION")
	)
}
