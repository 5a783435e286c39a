// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for record construction and serialization.

use thiserror::Error;

/// Result type alias for record operations.
pub type Result<T> = std::result::Result<T, RecordError>;

/// Errors raised while building or rendering records.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RecordError {
	/// The record kind is neither a user nor an event.
	#[error("unsupported record type {kind:?}: expected \"user\" or \"event\"")]
	UnsupportedRecord { kind: String },

	/// The record is structurally invalid.
	#[error("invalid record: {0}")]
	InvalidRecord(String),

	/// A value cannot be rendered for the wire.
	#[error("unrepresentable value: {reason}")]
	UnrepresentableValue { reason: String },
}
