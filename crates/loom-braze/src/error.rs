// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the Braze client.

use loom_braze_core::RecordError;
use loom_common_http::TransportError;
use thiserror::Error;

/// Result type alias for Braze client operations.
pub type Result<T> = std::result::Result<T, BrazeError>;

/// Braze client errors.
#[derive(Debug, Error)]
pub enum BrazeError {
	/// A record was enqueued without a client, and it carries no live handle.
	#[error("Braze client neither set on the record nor passed as parameter")]
	NoClient,

	/// Something other than a user or an event was enqueued.
	#[error("unsupported record type {kind:?}: expected a user or an event")]
	UnsupportedRecord { kind: String },

	/// A record could not be built from its input.
	#[error("invalid record: {0}")]
	InvalidRecord(String),

	/// The endpoint URL is empty.
	#[error("invalid endpoint URL")]
	InvalidEndpoint,

	/// The track endpoint answered with a non-null `error` field.
	#[error("API call to Braze failed with \"{message}\" (status {status})")]
	Api {
		/// HTTP status code.
		status: u16,
		/// Error message from the API.
		message: String,
	},

	/// The request never produced a response.
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// The response body is not JSON.
	#[error("unparsable response (status {status}): {source}")]
	InvalidResponse {
		/// HTTP status code.
		status: u16,
		#[source]
		source: serde_json::Error,
	},

	/// Writing the request log failed.
	#[error("failed to write request log: {0}")]
	LogWrite(#[from] std::io::Error),
}

impl BrazeError {
	/// True for errors caused by how the client was called rather than by
	/// the remote service.
	pub fn is_usage(&self) -> bool {
		matches!(
			self,
			BrazeError::NoClient | BrazeError::UnsupportedRecord { .. } | BrazeError::InvalidRecord(_)
		)
	}
}

impl From<RecordError> for BrazeError {
	fn from(err: RecordError) -> Self {
		match err {
			RecordError::UnsupportedRecord { kind } => BrazeError::UnsupportedRecord { kind },
			other => BrazeError::InvalidRecord(other.to_string()),
		}
	}
}
