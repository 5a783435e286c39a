// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! In-memory transport for unit tests.

use std::sync::Mutex;

use async_trait::async_trait;
use loom_common_http::{HttpResponse, JsonTransport, TransportError};
use serde_json::{json, Value};

/// Records every request and answers with a canned response.
pub(crate) struct MockTransport {
	posts: Mutex<Vec<Value>>,
	gets: Mutex<Vec<(String, Vec<(String, String)>)>>,
	response: Mutex<HttpResponse>,
}

impl MockTransport {
	pub fn new() -> Self {
		Self {
			posts: Mutex::new(Vec::new()),
			gets: Mutex::new(Vec::new()),
			response: Mutex::new(HttpResponse::new(
				201,
				json!({"message": "success"}).to_string(),
			)),
		}
	}

	pub fn respond_with(&self, status: u16, body: Value) {
		*self.response.lock().unwrap() = HttpResponse::new(status, body.to_string());
	}

	pub fn respond_with_raw(&self, status: u16, body: &'static str) {
		*self.response.lock().unwrap() = HttpResponse::new(status, body);
	}

	pub fn posts(&self) -> Vec<Value> {
		self.posts.lock().unwrap().clone()
	}

	pub fn gets(&self) -> Vec<(String, Vec<(String, String)>)> {
		self.gets.lock().unwrap().clone()
	}
}

#[async_trait]
impl JsonTransport for MockTransport {
	async fn get(
		&self,
		url: &str,
		query: &[(&str, String)],
	) -> Result<HttpResponse, TransportError> {
		self.gets.lock().unwrap().push((
			url.to_string(),
			query
				.iter()
				.map(|(k, v)| (k.to_string(), v.clone()))
				.collect(),
		));
		Ok(self.response.lock().unwrap().clone())
	}

	async fn post_json(&self, _url: &str, body: &Value) -> Result<HttpResponse, TransportError> {
		self.posts.lock().unwrap().push(body.clone());
		Ok(self.response.lock().unwrap().clone())
	}
}
