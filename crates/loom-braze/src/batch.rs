// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! User and event queues, and the flush loop that drains them in batches.

use std::collections::VecDeque;

use chrono::Utc;
use loom_braze_core::{EventRecord, Record, SerializeIssue, UserRecord};
use loom_common_http::JsonTransport;
use serde_json::{Map, Value};
use tracing::{debug, error, warn};

use crate::config::BrazeConfig;
use crate::error::{BrazeError, Result};
use crate::pacer::DispatchPacer;
use crate::request_log::{DispatchOutcome, FlushRecord, RequestLog};

/// Which queues a flush drains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlushScope {
	pub users: bool,
	pub events: bool,
}

impl FlushScope {
	pub const ALL: FlushScope = FlushScope {
		users: true,
		events: true,
	};
	pub const USERS: FlushScope = FlushScope {
		users: true,
		events: false,
	};
	pub const EVENTS: FlushScope = FlushScope {
		users: false,
		events: true,
	};
}

impl Default for FlushScope {
	fn default() -> Self {
		Self::ALL
	}
}

/// Collaborators the flush loop needs besides the queues themselves.
pub(crate) struct FlushContext<'a> {
	pub config: &'a BrazeConfig,
	pub transport: &'a dyn JsonTransport,
	pub log: &'a RequestLog,
}

/// Pending records and the history of every request built from them.
///
/// Records leave a queue only once the batch containing them was accepted:
/// sent without an API error, or built in dry-run mode.
#[derive(Debug)]
pub(crate) struct BatchQueue {
	users: VecDeque<UserRecord>,
	events: VecDeque<EventRecord>,
	requests: Vec<FlushRecord>,
	pacer: DispatchPacer,
}

impl BatchQueue {
	pub fn new(pacer: DispatchPacer) -> Self {
		Self {
			users: VecDeque::new(),
			events: VecDeque::new(),
			requests: Vec::new(),
			pacer,
		}
	}

	pub fn user_len(&self) -> usize {
		self.users.len()
	}

	pub fn event_len(&self) -> usize {
		self.events.len()
	}

	pub fn requests(&self) -> &[FlushRecord] {
		&self.requests
	}

	/// Appends a record to its queue.
	///
	/// Returns true when either queue has reached `batch_size`.
	pub fn push(&mut self, record: Record, batch_size: usize) -> bool {
		match record {
			Record::User(user) => self.users.push_back(user),
			Record::Event(event) => self.events.push_back(event),
		}
		self.users.len() >= batch_size || self.events.len() >= batch_size
	}

	fn has_pending(&self, scope: FlushScope) -> bool {
		(scope.users && !self.users.is_empty()) || (scope.events && !self.events.is_empty())
	}

	/// Drains the queues selected by `scope`, one track call per batch.
	///
	/// Returns the number of cycles completed. An API error stops the loop
	/// and leaves the offending batch at the front of its queue, so calling
	/// flush again resends exactly the same content.
	///
	/// When any batch was sent, the flush returns only after `pause` has
	/// elapsed since the last track call. Dry-run cycles never wait.
	pub async fn flush(&mut self, ctx: &FlushContext<'_>, scope: FlushScope) -> Result<usize> {
		let batch_size = ctx.config.effective_batch_size();
		let url = ctx.config.track_url();
		let mut cycles = 0;
		let mut dispatched = false;

		while self.has_pending(scope) {
			let mut body = Map::new();
			body.insert(
				"api_key".to_string(),
				Value::String(ctx.config.api_key.clone()),
			);
			let mut issues: Vec<SerializeIssue> = Vec::new();

			let user_take = if scope.users {
				self.users.len().min(batch_size)
			} else {
				0
			};
			if user_take > 0 {
				let attributes = self
					.users
					.iter()
					.take(user_take)
					.map(|user| into_wire(user.serialize(), &mut issues))
					.collect();
				body.insert("attributes".to_string(), Value::Array(attributes));
			}

			let event_take = if scope.events {
				self.events.len().min(batch_size)
			} else {
				0
			};
			if event_take > 0 {
				let events = self
					.events
					.iter()
					.take(event_take)
					.map(|event| into_wire(event.serialize(), &mut issues))
					.collect();
				body.insert("events".to_string(), Value::Array(events));
			}

			if !issues.is_empty() {
				warn!(
					dropped = issues.len(),
					"Batch built with values that could not be serialized"
				);
			}

			let request = Value::Object(body);
			let timestamp = Utc::now();
			ctx.log.write_request(timestamp, &request).await?;

			debug!(
				users = user_take,
				events = event_take,
				send = ctx.config.send,
				url = %url,
				"Flushing batch"
			);

			let mut record = FlushRecord {
				timestamp,
				url: url.clone(),
				request,
				issues,
				outcome: None,
			};

			if ctx.config.send {
				self.pacer.acquire().await;

				let response = match ctx.transport.post_json(&url, &record.request).await {
					Ok(response) => response,
					Err(e) => {
						error!(error = %e, timeout = e.is_timeout(), "Track request failed");
						self.requests.push(record);
						return Err(e.into());
					}
				};

				let parsed = match response.json() {
					Ok(parsed) => parsed,
					Err(source) => {
						error!(status = response.status, "Track response is not JSON");
						self.requests.push(record);
						return Err(BrazeError::InvalidResponse {
							status: response.status,
							source,
						});
					}
				};

				dispatched = true;

				let logged = ctx.log.write_response(&parsed).await;

				let api_error = parsed
					.get("error")
					.filter(|e| !e.is_null())
					.map(|e| match e {
						Value::String(s) => s.clone(),
						other => other.to_string(),
					});

				record.outcome = Some(DispatchOutcome {
					ok: response.ok(),
					status: response.status,
					response: parsed,
				});
				self.requests.push(record);

				if let Some(message) = api_error {
					if let Err(e) = &logged {
						warn!(error = %e, "Failed to log track response");
					}
					error!(status = response.status, message = %message, "Braze rejected batch");
					return Err(BrazeError::Api {
						status: response.status,
						message,
					});
				}

				// Braze has the batch; prune it before reporting the log failure.
				if let Err(e) = logged {
					self.users.drain(..user_take);
					self.events.drain(..event_take);
					error!(error = %e, "Failed to log track response");
					self.pacer.settle().await;
					return Err(e.into());
				}
			} else {
				self.requests.push(record);
			}

			self.users.drain(..user_take);
			self.events.drain(..event_take);
			cycles += 1;
		}

		if dispatched {
			self.pacer.settle().await;
		}

		Ok(cycles)
	}
}

fn into_wire(serialized: loom_braze_core::Serialized, issues: &mut Vec<SerializeIssue>) -> Value {
	issues.extend(serialized.issues);
	Value::Object(serialized.body)
}
