// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Shared HTTP utilities for Loom.
//!
//! This crate provides:
//! - A pre-configured HTTP client with consistent User-Agent header
//! - A JSON transport trait with a reqwest implementation

mod client;
mod transport;

pub use client::{builder, new_client_with_timeout, user_agent};
pub use transport::{HttpResponse, JsonTransport, ReqwestTransport, TransportError};
