// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! JSON-over-HTTP transport used by the SDK clients.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// Transport-level failures: connection errors, timeouts, invalid URLs.
#[derive(Debug, Error)]
pub enum TransportError {
	/// HTTP request failed before a response was received.
	#[error("HTTP request failed: {0}")]
	Request(#[from] reqwest::Error),
}

impl TransportError {
	pub fn is_timeout(&self) -> bool {
		match self {
			TransportError::Request(e) => e.is_timeout(),
		}
	}
}

/// A fully-read HTTP response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
	pub status: u16,
	pub body: Bytes,
}

impl HttpResponse {
	pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
		Self {
			status,
			body: body.into(),
		}
	}

	/// True for 2xx statuses.
	pub fn ok(&self) -> bool {
		(200..300).contains(&self.status)
	}

	/// Parses the body as JSON.
	pub fn json(&self) -> serde_json::Result<Value> {
		serde_json::from_slice(&self.body)
	}
}

/// Something that can GET and POST JSON.
///
/// The reqwest implementation is [`ReqwestTransport`]; tests substitute
/// in-memory fakes.
#[async_trait]
pub trait JsonTransport: Send + Sync {
	/// Sends a GET request with the given query parameters.
	async fn get(
		&self,
		url: &str,
		query: &[(&str, String)],
	) -> Result<HttpResponse, TransportError>;

	/// Sends a POST request with a JSON body.
	async fn post_json(&self, url: &str, body: &Value) -> Result<HttpResponse, TransportError>;
}

/// [`JsonTransport`] backed by a shared reqwest client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
	client: Client,
}

impl ReqwestTransport {
	/// Builds a transport whose requests fail after `timeout`.
	pub fn new(timeout: Duration) -> Result<Self, TransportError> {
		Ok(Self {
			client: crate::client::new_client_with_timeout(timeout)?,
		})
	}

	pub fn from_client(client: Client) -> Self {
		Self { client }
	}

	async fn read(response: reqwest::Response) -> Result<HttpResponse, TransportError> {
		let status = response.status().as_u16();
		let body = response.bytes().await?;
		Ok(HttpResponse { status, body })
	}
}

#[async_trait]
impl JsonTransport for ReqwestTransport {
	async fn get(
		&self,
		url: &str,
		query: &[(&str, String)],
	) -> Result<HttpResponse, TransportError> {
		debug!(url = %url, "GET");
		let response = self.client.get(url).query(query).send().await?;
		Self::read(response).await
	}

	async fn post_json(&self, url: &str, body: &Value) -> Result<HttpResponse, TransportError> {
		debug!(url = %url, "POST");
		let response = self.client.post(url).json(body).send().await?;
		Self::read(response).await
	}
}
