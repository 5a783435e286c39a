// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Braze client: record queues, batched flushing and campaign lookups.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use loom_braze_core::{ClientHandle, EventRecord, Record, UserRecord};
use loom_common_http::{JsonTransport, ReqwestTransport};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::batch::{BatchQueue, FlushContext, FlushScope};
use crate::campaign::Campaign;
use crate::config::{BrazeConfig, MAX_BATCH_SIZE};
use crate::error::{BrazeError, Result};
use crate::pacer::DispatchPacer;
use crate::request_log::{FlushRecord, RequestLog};

/// Builder for constructing a [`BrazeClient`].
pub struct BrazeClientBuilder {
	config: BrazeConfig,
	transport: Option<Arc<dyn JsonTransport>>,
}

impl BrazeClientBuilder {
	/// Creates a new builder with default settings.
	pub fn new() -> Self {
		Self {
			config: BrazeConfig::default(),
			transport: None,
		}
	}

	/// Replaces every setting at once.
	pub fn config(mut self, config: BrazeConfig) -> Self {
		self.config = config;
		self
	}

	/// Sets the REST endpoint.
	///
	/// Example: `https://rest.iad-01.braze.com`
	pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
		self.config.endpoint = endpoint.into();
		self
	}

	/// Sets the app group API key.
	pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
		self.config.api_key = api_key.into();
		self
	}

	/// Sets how many users and events go into one track call.
	pub fn batch_size(mut self, batch_size: usize) -> Self {
		self.config.batch_size = batch_size;
		self
	}

	pub fn auto_flush(mut self, auto_flush: bool) -> Self {
		self.config.auto_flush = auto_flush;
		self
	}

	/// Enables network calls. Off by default: requests are only built and logged.
	pub fn send(mut self, send: bool) -> Self {
		self.config.send = send;
		self
	}

	/// Sets the minimum spacing between track calls.
	pub fn pause(mut self, pause: Duration) -> Self {
		self.config.pause = pause;
		self
	}

	pub fn log(mut self, log: bool) -> Self {
		self.config.log = log;
		self
	}

	pub fn log_file(mut self, path: impl Into<PathBuf>) -> Self {
		self.config.log_file = Some(path.into());
		self
	}

	/// Sets the HTTP request timeout.
	pub fn request_timeout(mut self, timeout: Duration) -> Self {
		self.config.request_timeout = timeout;
		self
	}

	/// Uses a custom transport instead of the reqwest one.
	pub fn transport(mut self, transport: Arc<dyn JsonTransport>) -> Self {
		self.transport = Some(transport);
		self
	}

	/// Builds the BrazeClient.
	pub fn build(self) -> Result<BrazeClient> {
		let mut config = self.config;

		// Normalize endpoint
		config.endpoint = config.endpoint.trim_end_matches('/').to_string();
		if config.endpoint.is_empty() {
			return Err(BrazeError::InvalidEndpoint);
		}

		if config.batch_size > MAX_BATCH_SIZE {
			warn!(
				batch_size = config.batch_size,
				max = MAX_BATCH_SIZE,
				"Batch size exceeds the track endpoint limit"
			);
		}

		let transport = match self.transport {
			Some(transport) => transport,
			None => Arc::new(ReqwestTransport::new(config.request_timeout)?),
		};

		let log = RequestLog::new(config.resolve_log_path(Utc::now()));
		let pacer = DispatchPacer::new(config.pause);

		info!(
			endpoint = %config.endpoint,
			batch_size = config.batch_size,
			auto_flush = config.auto_flush,
			send = config.send,
			log = ?log.path(),
			"Braze client initialized"
		);

		Ok(BrazeClient {
			inner: Arc::new(ClientInner {
				config,
				transport,
				log,
				queue: Mutex::new(BatchQueue::new(pacer)),
				campaigns: Mutex::new(Vec::new()),
			}),
		})
	}
}

impl Default for BrazeClientBuilder {
	fn default() -> Self {
		Self::new()
	}
}

/// Internal client state.
pub(crate) struct ClientInner {
	pub(crate) config: BrazeConfig,
	pub(crate) transport: Arc<dyn JsonTransport>,
	log: RequestLog,
	/// Both queues, the request history and the pacer, behind one lock so
	/// enqueue and flush never interleave.
	queue: Mutex<BatchQueue>,
	pub(crate) campaigns: Mutex<Vec<Campaign>>,
}

/// Client that accumulates users and events and sends them to the Braze
/// track endpoint in batches.
///
/// # Example
///
/// ```ignore
/// use loom_braze::{BrazeClient, EnqueueRecord};
///
/// let braze = BrazeClient::builder()
///     .endpoint("https://rest.iad-01.braze.com")
///     .api_key("your_api_key")
///     .send(true)
///     .build()?;
///
/// braze.user("user_123").set("plan", "gold").enqueue(None).await?;
/// braze.event("user_123", "upgraded").set("from", "silver").enqueue(None).await?;
///
/// // Send whatever is still queued
/// braze.flush().await?;
/// ```
#[derive(Clone)]
pub struct BrazeClient {
	inner: Arc<ClientInner>,
}

impl BrazeClient {
	/// Creates a new builder for constructing a BrazeClient.
	pub fn builder() -> BrazeClientBuilder {
		BrazeClientBuilder::new()
	}

	/// Creates a client from a complete configuration.
	pub fn new(config: BrazeConfig) -> Result<Self> {
		BrazeClientBuilder::new().config(config).build()
	}

	/// Resolves a record's back-reference, if the client is still alive.
	pub fn from_handle(handle: &ClientHandle) -> Option<Self> {
		handle.upgrade::<ClientInner>().map(|inner| Self { inner })
	}

	/// A non-owning reference to this client.
	pub fn handle(&self) -> ClientHandle {
		ClientHandle::new(&self.inner)
	}

	pub fn config(&self) -> &BrazeConfig {
		&self.inner.config
	}

	/// Path of the request log file, if logging is enabled.
	pub fn log_path(&self) -> Option<&Path> {
		self.inner.log.path()
	}

	/// Creates a user bound to this client.
	pub fn user(&self, external_id: impl Into<String>) -> UserRecord {
		UserRecord::new(external_id).with_handle(self.handle())
	}

	/// Creates an event bound to this client, timestamped now.
	pub fn event(&self, external_id: impl Into<String>, name: impl Into<String>) -> EventRecord {
		EventRecord::new(external_id, name).with_handle(self.handle())
	}

	/// Adds a user or event to its queue.
	///
	/// With auto-flush on, reaching `batch_size` in either queue flushes both
	/// queues before this returns; a failure of that flush is returned here,
	/// with the record already queued.
	pub async fn enqueue(&self, record: impl Into<Record>) -> Result<()> {
		let record = record.into();
		let config = &self.inner.config;
		let mut queue = self.inner.queue.lock().await;

		debug!(kind = record.kind(), external_id = %record.external_id(), "Enqueueing record");

		let full = queue.push(record, config.effective_batch_size());
		if config.auto_flush && full {
			debug!(
				users = queue.user_len(),
				events = queue.event_len(),
				"Batch size reached, auto-flushing"
			);
			queue.flush(&self.flush_context(), FlushScope::ALL).await?;
		}

		Ok(())
	}

	/// Builds a record from a JSON row and enqueues it.
	///
	/// See [`Record::from_json`] for the row format. Rows of any other type
	/// fail with [`BrazeError::UnsupportedRecord`] and leave the queues as
	/// they were.
	pub async fn enqueue_json(&self, row: serde_json::Value) -> Result<()> {
		let record = Record::from_json(row)?;
		self.enqueue(record).await
	}

	/// Sends everything queued.
	pub async fn flush(&self) -> Result<()> {
		self.flush_scope(FlushScope::ALL).await
	}

	/// Sends the queues selected by `scope`.
	///
	/// With a non-zero `pause`, track calls are spaced by at least `pause`,
	/// and a flush that sent anything returns only once `pause` has passed
	/// since its last call. Dry-run flushes (`send` off) never wait.
	pub async fn flush_scope(&self, scope: FlushScope) -> Result<()> {
		let mut queue = self.inner.queue.lock().await;
		let cycles = queue.flush(&self.flush_context(), scope).await?;
		if cycles > 0 {
			info!(
				cycles,
				remaining_users = queue.user_len(),
				remaining_events = queue.event_len(),
				"Flush complete"
			);
		}
		Ok(())
	}

	pub async fn user_queue_len(&self) -> usize {
		self.inner.queue.lock().await.user_len()
	}

	pub async fn event_queue_len(&self) -> usize {
		self.inner.queue.lock().await.event_len()
	}

	/// Every request built so far, oldest first.
	pub async fn flush_records(&self) -> Vec<FlushRecord> {
		self.inner.queue.lock().await.requests().to_vec()
	}

	/// Short summary with queue sizes.
	pub async fn summary(&self) -> String {
		let queue = self.inner.queue.lock().await;
		let mut s = format!(
			"Braze API Helper\n endpoint: {}",
			self.inner.config.endpoint
		);
		if queue.user_len() > 0 {
			s.push_str(&format!("\n users enqueued: {}", queue.user_len()));
		}
		if queue.event_len() > 0 {
			s.push_str(&format!("\n events enqueued: {}", queue.event_len()));
		}
		s
	}

	fn flush_context(&self) -> FlushContext<'_> {
		FlushContext {
			config: &self.inner.config,
			transport: self.inner.transport.as_ref(),
			log: &self.inner.log,
		}
	}

	pub(crate) fn inner(&self) -> &ClientInner {
		&self.inner
	}
}

impl std::fmt::Debug for BrazeClient {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("BrazeClient")
			.field("endpoint", &self.inner.config.endpoint)
			.field("batch_size", &self.inner.config.batch_size)
			.field("send", &self.inner.config.send)
			.finish_non_exhaustive()
	}
}

/// Enqueueing straight from a record.
#[async_trait]
pub trait EnqueueRecord: Sized + Send {
	/// Enqueues with `client`, or with the client the record was created
	/// from when `client` is `None`.
	///
	/// Fails with [`BrazeError::NoClient`] when neither is available.
	async fn enqueue(self, client: Option<&BrazeClient>) -> Result<()>;
}

#[async_trait]
impl<T> EnqueueRecord for T
where
	T: Into<Record> + Send,
{
	async fn enqueue(self, client: Option<&BrazeClient>) -> Result<()> {
		let record: Record = self.into();
		match client {
			Some(client) => client.enqueue(record).await,
			None => {
				let client = record
					.handle()
					.and_then(BrazeClient::from_handle)
					.ok_or(BrazeError::NoClient)?;
				client.enqueue(record).await
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::MockTransport;
	use serde_json::json;

	fn client_with(transport: Arc<MockTransport>, batch_size: usize, auto_flush: bool) -> BrazeClient {
		BrazeClient::builder()
			.endpoint("https://braze.test/")
			.api_key("test-key")
			.batch_size(batch_size)
			.auto_flush(auto_flush)
			.send(true)
			.log(false)
			.transport(transport)
			.build()
			.unwrap()
	}

	#[test]
	fn test_builder_normalizes_endpoint() {
		let client = client_with(Arc::new(MockTransport::new()), 75, true);
		assert_eq!(client.config().endpoint, "https://braze.test");
		assert_eq!(client.config().track_url(), "https://braze.test/users/track");
	}

	#[test]
	fn test_builder_rejects_empty_endpoint() {
		let result = BrazeClient::builder()
			.endpoint("/")
			.log(false)
			.transport(Arc::new(MockTransport::new()))
			.build();
		assert!(matches!(result, Err(BrazeError::InvalidEndpoint)));
	}

	#[test]
	fn test_builder_accepts_oversized_batch() {
		let client = client_with(Arc::new(MockTransport::new()), 500, true);
		assert_eq!(client.config().batch_size, 500);
	}

	#[test]
	fn test_default_log_path_is_timestamped() {
		let client = BrazeClient::builder()
			.transport(Arc::new(MockTransport::new()))
			.build()
			.unwrap();
		let name = client.log_path().unwrap().to_string_lossy().to_string();
		assert!(name.starts_with("braze_") && name.ends_with(".log"));
	}

	#[tokio::test]
	async fn test_enqueue_without_auto_flush_only_queues() {
		let transport = Arc::new(MockTransport::new());
		let client = client_with(transport.clone(), 2, false);

		for i in 0..5 {
			client.enqueue(UserRecord::new(format!("u{i}"))).await.unwrap();
		}

		assert_eq!(client.user_queue_len().await, 5);
		assert!(transport.posts().is_empty());
	}

	#[tokio::test]
	async fn test_auto_flush_at_batch_size() {
		let transport = Arc::new(MockTransport::new());
		let client = client_with(transport.clone(), 3, true);

		client.enqueue(UserRecord::new("u0")).await.unwrap();
		client.enqueue(UserRecord::new("u1")).await.unwrap();
		assert!(transport.posts().is_empty());

		client.enqueue(EventRecord::new("u0", "login")).await.unwrap();
		client.enqueue(UserRecord::new("u2")).await.unwrap();

		let posts = transport.posts();
		assert_eq!(posts.len(), 1);
		assert_eq!(posts[0]["attributes"].as_array().unwrap().len(), 3);
		assert_eq!(posts[0]["events"].as_array().unwrap().len(), 1);
		assert_eq!(client.user_queue_len().await, 0);
		assert_eq!(client.event_queue_len().await, 0);
	}

	#[tokio::test]
	async fn test_auto_flush_error_surfaces_from_enqueue() {
		let transport = Arc::new(MockTransport::new());
		transport.respond_with(400, json!({"error": "bad batch"}));
		let client = client_with(transport.clone(), 1, true);

		let err = client.enqueue(UserRecord::new("u0")).await.unwrap_err();
		assert!(matches!(err, BrazeError::Api { .. }));
		assert_eq!(client.user_queue_len().await, 1);
	}

	#[tokio::test]
	async fn test_flush_scope_events_only() {
		let transport = Arc::new(MockTransport::new());
		let client = client_with(transport.clone(), 75, false);

		client.enqueue(UserRecord::new("u0")).await.unwrap();
		client.enqueue(EventRecord::new("u0", "login")).await.unwrap();
		client.flush_scope(FlushScope::EVENTS).await.unwrap();

		let posts = transport.posts();
		assert_eq!(posts.len(), 1);
		assert!(posts[0].get("attributes").is_none());
		assert_eq!(client.user_queue_len().await, 1);
		assert_eq!(client.event_queue_len().await, 0);
	}

	#[tokio::test]
	async fn test_record_enqueues_through_handle() {
		let transport = Arc::new(MockTransport::new());
		let client = client_with(transport, 75, false);

		client.user("u0").set("plan", "gold").enqueue(None).await.unwrap();
		client.event("u0", "login").enqueue(None).await.unwrap();

		assert_eq!(client.user_queue_len().await, 1);
		assert_eq!(client.event_queue_len().await, 1);
	}

	#[tokio::test]
	async fn test_explicit_client_overrides_handle() {
		let first = client_with(Arc::new(MockTransport::new()), 75, false);
		let second = client_with(Arc::new(MockTransport::new()), 75, false);

		first.user("u0").enqueue(Some(&second)).await.unwrap();

		assert_eq!(first.user_queue_len().await, 0);
		assert_eq!(second.user_queue_len().await, 1);
	}

	#[tokio::test]
	async fn test_enqueue_without_any_client_fails() {
		let err = UserRecord::new("u0").enqueue(None).await.unwrap_err();
		assert!(matches!(err, BrazeError::NoClient));
		assert!(err.is_usage());
	}

	#[tokio::test]
	async fn test_dropped_client_handle_is_dead() {
		let client = client_with(Arc::new(MockTransport::new()), 75, false);
		let user = client.user("u0");
		drop(client);

		let err = user.enqueue(None).await.unwrap_err();
		assert!(matches!(err, BrazeError::NoClient));
	}

	#[tokio::test]
	async fn test_enqueue_json_rejects_unknown_type() {
		let client = client_with(Arc::new(MockTransport::new()), 75, false);

		let err = client
			.enqueue_json(json!({"type": "campaign", "external_id": "u0"}))
			.await
			.unwrap_err();

		assert!(matches!(err, BrazeError::UnsupportedRecord { ref kind } if kind == "campaign"));
		assert!(err.is_usage());
		assert_eq!(client.user_queue_len().await, 0);
		assert_eq!(client.event_queue_len().await, 0);
	}

	#[tokio::test]
	async fn test_enqueue_json_rows() {
		let client = client_with(Arc::new(MockTransport::new()), 75, false);

		client
			.enqueue_json(json!({"type": "user", "external_id": "u0", "traits": {"plan": "gold"}}))
			.await
			.unwrap();
		client
			.enqueue_json(json!({"type": "event", "external_id": "u0", "name": "login"}))
			.await
			.unwrap();

		assert_eq!(client.user_queue_len().await, 1);
		assert_eq!(client.event_queue_len().await, 1);
	}

	#[tokio::test]
	async fn test_summary_lists_queue_sizes() {
		let client = client_with(Arc::new(MockTransport::new()), 75, false);
		client.enqueue(UserRecord::new("u0")).await.unwrap();

		let summary = client.summary().await;
		assert!(summary.contains("endpoint: https://braze.test"));
		assert!(summary.contains("users enqueued: 1"));
		assert!(!summary.contains("events enqueued"));
	}

	#[tokio::test]
	async fn test_concurrent_enqueues_are_serialized() {
		let transport = Arc::new(MockTransport::new());
		let client = client_with(transport.clone(), 10, true);

		let mut tasks = Vec::new();
		for i in 0..100 {
			let client = client.clone();
			tasks.push(tokio::spawn(async move {
				client.enqueue(UserRecord::new(format!("u{i}"))).await
			}));
		}
		for task in tasks {
			task.await.unwrap().unwrap();
		}

		let sent: usize = transport
			.posts()
			.iter()
			.map(|p| p["attributes"].as_array().unwrap().len())
			.sum();
		assert_eq!(sent + client.user_queue_len().await, 100);
		assert!(transport
			.posts()
			.iter()
			.all(|p| p["attributes"].as_array().unwrap().len() == 10));
	}
}
