// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Spacing between consecutive track calls.

use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

/// Single-token bucket refilled once per `interval`.
///
/// The first dispatch goes out immediately; every later one waits until a
/// full interval has passed since the previous one. Time already spent
/// building or sending a request counts towards the interval, and the
/// spacing carries across flush calls.
#[derive(Debug)]
pub struct DispatchPacer {
	interval: Duration,
	last_dispatch: Option<Instant>,
}

impl DispatchPacer {
	pub fn new(interval: Duration) -> Self {
		Self {
			interval,
			last_dispatch: None,
		}
	}

	/// Waits for the token, then takes it.
	pub async fn acquire(&mut self) {
		if self.interval.is_zero() {
			return;
		}

		if let Some(last) = self.last_dispatch {
			let ready_at = last + self.interval;
			if ready_at > Instant::now() {
				debug!(wait_ms = (ready_at - Instant::now()).as_millis() as u64, "Pacing track call");
				tokio::time::sleep_until(ready_at).await;
			}
		}

		self.last_dispatch = Some(Instant::now());
	}

	/// Waits until the token taken by the last dispatch has refilled.
	///
	/// Leaves the bucket full, so the next `acquire` returns immediately.
	pub async fn settle(&self) {
		if self.interval.is_zero() {
			return;
		}

		if let Some(last) = self.last_dispatch {
			tokio::time::sleep_until(last + self.interval).await;
		}
	}
}
