// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Read-only campaign lookups.
//!
//! Plain GET-and-parse calls: a 200 response is parsed, anything else yields
//! `None` (or an empty list). Nothing here is batched or queued.

use chrono::{DateTime, Utc};
use loom_braze_core::format_timestamp;
use loom_common_http::HttpResponse;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::client::BrazeClient;
use crate::error::{BrazeError, Result};

/// A campaign as listed by `/campaigns/list`, plus any fetched data.
#[derive(Debug, Clone, PartialEq)]
pub struct Campaign {
	pub id: String,
	pub name: String,
	/// Whether the campaign is API-triggered.
	pub is_api: bool,
	pub tags: Option<Vec<String>>,
	/// Last data series fetched with [`Campaign::fetch_data_series`].
	pub data_series: Option<Vec<Value>>,
	/// Last details fetched with [`Campaign::fetch_details`].
	pub details: Option<Value>,
}

impl Campaign {
	pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			name: name.into(),
			is_api: false,
			tags: None,
			data_series: None,
			details: None,
		}
	}

	pub fn api_triggered(mut self, is_api: bool) -> Self {
		self.is_api = is_api;
		self
	}

	pub fn tags(mut self, tags: Vec<String>) -> Self {
		self.tags = Some(tags);
		self
	}

	/// Fetches and stores the campaign details.
	pub async fn fetch_details(&mut self, client: &BrazeClient) -> Result<Option<&Value>> {
		self.details = client.campaign_details(&self.id).await?;
		Ok(self.details.as_ref())
	}

	/// Fetches and stores `length` points of the campaign data series.
	pub async fn fetch_data_series(
		&mut self,
		client: &BrazeClient,
		length: u32,
		ending_at: Option<DateTime<Utc>>,
	) -> Result<Option<&[Value]>> {
		self.data_series = client
			.campaign_data_series(&self.id, length, ending_at)
			.await?;
		Ok(self.data_series.as_deref())
	}
}

impl std::fmt::Display for Campaign {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "Braze campaign {} with ID {}", self.name, self.id)?;
		write!(
			f,
			"\n - api-triggered: {}",
			if self.is_api { "yes" } else { "no" }
		)?;
		if let Some(tags) = &self.tags {
			write!(f, "\n - tags: {}", tags.join(", "))?;
		}
		Ok(())
	}
}

#[derive(Debug, Deserialize)]
struct CampaignList {
	#[serde(default)]
	campaigns: Vec<CampaignEntry>,
}

#[derive(Debug, Deserialize)]
struct CampaignEntry {
	#[serde(default = "not_available")]
	id: String,
	#[serde(default = "not_available")]
	name: String,
	#[serde(default)]
	is_api_campaign: bool,
	#[serde(default)]
	tags: Option<Vec<String>>,
}

fn not_available() -> String {
	"n/a".to_string()
}

fn parse(response: &HttpResponse) -> Result<Value> {
	response.json().map_err(|source| BrazeError::InvalidResponse {
		status: response.status,
		source,
	})
}

impl BrazeClient {
	/// Lists campaigns and stores them on the client, replacing the
	/// previous list.
	///
	/// A non-200 response clears the stored list and returns it empty.
	pub async fn list_campaigns(&self, include_archived: bool, descending: bool) -> Result<Vec<Campaign>> {
		let config = &self.inner().config;
		let url = format!("{}/campaigns/list", config.endpoint);
		let query = [
			("api_key", config.api_key.clone()),
			("include_archived", include_archived.to_string()),
			(
				"sort_order",
				if descending { "desc" } else { "asc" }.to_string(),
			),
		];

		debug!(url = %url, include_archived, descending, "Listing campaigns");
		let response = self.inner().transport.get(&url, &query).await?;

		let campaigns = if response.status == 200 {
			let list: CampaignList = serde_json::from_value(parse(&response)?).map_err(|source| {
				BrazeError::InvalidResponse {
					status: response.status,
					source,
				}
			})?;
			list.campaigns
				.into_iter()
				.map(|entry| Campaign {
					id: entry.id,
					name: entry.name,
					is_api: entry.is_api_campaign,
					tags: entry.tags,
					data_series: None,
					details: None,
				})
				.collect()
		} else {
			warn!(status = response.status, "Campaign list request failed");
			Vec::new()
		};

		*self.inner().campaigns.lock().await = campaigns.clone();
		Ok(campaigns)
	}

	/// Registers a campaign without asking the API.
	pub async fn add_campaign(&self, campaign: Campaign) {
		self.inner().campaigns.lock().await.push(campaign);
	}

	/// Campaigns stored by [`BrazeClient::list_campaigns`] and
	/// [`BrazeClient::add_campaign`].
	pub async fn campaigns(&self) -> Vec<Campaign> {
		self.inner().campaigns.lock().await.clone()
	}

	/// Fetches the details mapping of a campaign.
	pub async fn campaign_details(&self, campaign_id: &str) -> Result<Option<Value>> {
		let config = &self.inner().config;
		let url = format!("{}/campaigns/details", config.endpoint);
		let query = [
			("api_key", config.api_key.clone()),
			("campaign_id", campaign_id.to_string()),
		];

		debug!(url = %url, campaign_id = %campaign_id, "Fetching campaign details");
		let response = self.inner().transport.get(&url, &query).await?;

		if response.status != 200 {
			warn!(status = response.status, campaign_id = %campaign_id, "Campaign details request failed");
			return Ok(None);
		}
		parse(&response).map(Some)
	}

	/// Fetches the `data` series of a campaign.
	///
	/// Returns `None` on a non-200 response or when the body has no `data`
	/// array.
	pub async fn campaign_data_series(
		&self,
		campaign_id: &str,
		length: u32,
		ending_at: Option<DateTime<Utc>>,
	) -> Result<Option<Vec<Value>>> {
		let config = &self.inner().config;
		let url = format!("{}/campaigns/data_series", config.endpoint);
		let mut query = vec![
			("api_key", config.api_key.clone()),
			("campaign_id", campaign_id.to_string()),
			("length", length.to_string()),
		];
		if let Some(ending_at) = ending_at {
			query.push(("ending_at", format_timestamp(&ending_at)));
		}

		debug!(url = %url, campaign_id = %campaign_id, length, "Fetching campaign data series");
		let response = self.inner().transport.get(&url, &query).await?;

		if response.status != 200 {
			warn!(status = response.status, campaign_id = %campaign_id, "Campaign data series request failed");
			return Ok(None);
		}

		match parse(&response)? {
			Value::Object(mut body) => match body.remove("data") {
				Some(Value::Array(data)) => Ok(Some(data)),
				_ => Ok(None),
			},
			_ => Ok(None),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::MockTransport;
	use chrono::TimeZone;
	use serde_json::json;
	use std::sync::Arc;

	fn client_with(transport: Arc<MockTransport>) -> BrazeClient {
		BrazeClient::builder()
			.endpoint("https://braze.test")
			.api_key("test-key")
			.log(false)
			.transport(transport)
			.build()
			.unwrap()
	}

	#[tokio::test]
	async fn test_list_campaigns_parses_and_stores() {
		let transport = Arc::new(MockTransport::new());
		transport.respond_with(
			200,
			json!({"campaigns": [
				{"id": "c1", "name": "Welcome", "is_api_campaign": true, "tags": ["onboarding"]},
				{"name": "No id"}
			]}),
		);
		let client = client_with(transport.clone());

		let campaigns = client.list_campaigns(true, true).await.unwrap();

		assert_eq!(campaigns.len(), 2);
		assert_eq!(campaigns[0].id, "c1");
		assert!(campaigns[0].is_api);
		assert_eq!(campaigns[0].tags, Some(vec!["onboarding".to_string()]));
		assert_eq!(campaigns[1].id, "n/a");
		assert!(!campaigns[1].is_api);
		assert_eq!(client.campaigns().await, campaigns);

		let (url, query) = transport.gets().remove(0);
		assert_eq!(url, "https://braze.test/campaigns/list");
		assert!(query.contains(&("include_archived".to_string(), "true".to_string())));
		assert!(query.contains(&("sort_order".to_string(), "desc".to_string())));
	}

	#[tokio::test]
	async fn test_list_campaigns_non_200_clears_list() {
		let transport = Arc::new(MockTransport::new());
		let client = client_with(transport.clone());
		client.add_campaign(Campaign::new("c1", "Manual")).await;

		transport.respond_with(401, json!({"message": "Invalid API key"}));
		let campaigns = client.list_campaigns(false, false).await.unwrap();

		assert!(campaigns.is_empty());
		assert!(client.campaigns().await.is_empty());
	}

	#[tokio::test]
	async fn test_details_non_200_is_none() {
		let transport = Arc::new(MockTransport::new());
		transport.respond_with(404, json!({"message": "not found"}));
		let client = client_with(transport);

		assert!(client.campaign_details("c1").await.unwrap().is_none());
	}

	#[tokio::test]
	async fn test_fetch_details_caches_on_campaign() {
		let transport = Arc::new(MockTransport::new());
		transport.respond_with(200, json!({"name": "Welcome", "channels": ["email"]}));
		let client = client_with(transport);
		let mut campaign = Campaign::new("c1", "Welcome");

		let details = campaign.fetch_details(&client).await.unwrap().cloned();

		assert_eq!(details.unwrap()["channels"][0], "email");
		assert!(campaign.details.is_some());
	}

	#[tokio::test]
	async fn test_data_series_query_and_parse() {
		let transport = Arc::new(MockTransport::new());
		transport.respond_with(200, json!({"data": [{"time": "2024-01-01", "messages": {}}]}));
		let client = client_with(transport.clone());
		let end = Utc.with_ymd_and_hms(2024, 1, 7, 0, 0, 0).unwrap();
		let mut campaign = Campaign::new("c1", "Welcome");

		let len = campaign
			.fetch_data_series(&client, 7, Some(end))
			.await
			.unwrap()
			.map(<[Value]>::len);

		assert_eq!(len, Some(1));
		let (_, query) = transport.gets().remove(0);
		assert!(query.contains(&("length".to_string(), "7".to_string())));
		assert!(query.contains(&("ending_at".to_string(), "2024-01-07T00:00:00+00:00".to_string())));
	}

	#[tokio::test]
	async fn test_data_series_without_data_is_none() {
		let transport = Arc::new(MockTransport::new());
		transport.respond_with(200, json!({"message": "success"}));
		let client = client_with(transport);

		assert!(client.campaign_data_series("c1", 7, None).await.unwrap().is_none());
	}

	#[test]
	fn test_display() {
		let campaign = Campaign::new("c1", "Welcome")
			.api_triggered(true)
			.tags(vec!["a".to_string(), "b".to_string()]);
		assert_eq!(
			campaign.to_string(),
			"Braze campaign Welcome with ID c1\n - api-triggered: yes\n - tags: a, b"
		);
	}
}
