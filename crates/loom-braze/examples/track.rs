// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Example: Queue users and events and flush them to Braze.
//!
//! Run with:
//!   cargo run --example track -p loom-braze
//!
//! Requests are only sent when BRAZE_SEND=1; otherwise they are built and
//! written to the request log.

use std::time::Duration;

use loom_braze::{BrazeClient, EnqueueRecord, DEFAULT_API_KEY, DEFAULT_ENDPOINT};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	tracing_subscriber::fmt()
		.with_env_filter(
			EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("loom_braze=debug")),
		)
		.init();

	let endpoint = std::env::var("BRAZE_ENDPOINT").unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());
	let api_key = std::env::var("BRAZE_API_KEY").unwrap_or_else(|_| DEFAULT_API_KEY.to_string());
	let send = std::env::var("BRAZE_SEND").is_ok_and(|v| v == "1");

	let braze = BrazeClient::builder()
		.endpoint(&endpoint)
		.api_key(&api_key)
		.send(send)
		.pause(Duration::from_millis(200))
		.build()?;

	println!("{}", braze.config());

	for i in 0..120 {
		braze
			.user(format!("example_user_{i}"))
			.set("plan", if i % 2 == 0 { "gold" } else { "silver" })
			.set("seats", i)
			.enqueue(None)
			.await?;
	}

	braze
		.event("example_user_0", "example_run")
		.set("users", 120)
		.enqueue(None)
		.await?;

	braze.flush().await?;

	println!("{}", braze.summary().await);
	for record in braze.flush_records().await {
		println!(
			"{}: {} users, {} events, sent: {}",
			record.timestamp,
			record.user_count(),
			record.event_count(),
			record.was_sent()
		);
	}
	if let Some(path) = braze.log_path() {
		println!("Request log: {}", path.display());
	}

	Ok(())
}
