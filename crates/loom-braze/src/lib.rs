// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Batching Rust client for the Braze CRM API.
//!
//! Users and events are accumulated in two FIFO queues and sent to the
//! `/users/track` endpoint in batches of at most `batch_size` users plus
//! `batch_size` events per call.
//!
//! # Features
//!
//! - **Auto-flush**: queues flush as soon as either reaches the batch size
//! - **Dry-run by default**: requests are built and logged but only sent
//!   once `send` is enabled
//! - **Request log**: every request (and response) is appended to a text file
//!   and kept in memory as [`FlushRecord`]s
//! - **Pacing**: optional minimum spacing between track calls
//! - **Retry-friendly failures**: a batch rejected by the API stays queued, so
//!   the next flush resends it unchanged
//! - **Campaign lookups**: list campaigns, fetch details and data series
//!
//! # Example
//!
//! ```ignore
//! use loom_braze::{BrazeClient, EnqueueRecord, FlushScope};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let braze = BrazeClient::builder()
//!         .endpoint("https://rest.fra-01.braze.eu")
//!         .api_key("your_api_key")
//!         .send(true)
//!         .build()?;
//!
//!     braze
//!         .user("user_123")
//!         .set("first_name", "Ada")
//!         .set("plan", "gold")
//!         .enqueue(None)
//!         .await?;
//!
//!     braze
//!         .event("user_123", "upgraded")
//!         .set("from", "silver")
//!         .enqueue(None)
//!         .await?;
//!
//!     braze.flush_scope(FlushScope::ALL).await?;
//!     Ok(())
//! }
//! ```

mod batch;
mod campaign;
mod client;
mod config;
mod error;
mod pacer;
mod request_log;

#[cfg(test)]
mod testing;

pub use batch::FlushScope;
pub use campaign::Campaign;
pub use client::{BrazeClient, BrazeClientBuilder, EnqueueRecord};
pub use config::{BrazeConfig, DEFAULT_API_KEY, DEFAULT_ENDPOINT, MAX_BATCH_SIZE};
pub use error::{BrazeError, Result};
pub use request_log::{DispatchOutcome, FlushRecord, RequestLog};

// Re-export core types for convenience
pub use loom_braze_core::{
	format_timestamp, Attributes, ClientHandle, EventRecord, Record, RecordError, SerializeIssue,
	Serialized, TraitValue, UserRecord,
};
pub use loom_common_http::{HttpResponse, JsonTransport, ReqwestTransport, TransportError};
