//! ApiClient - handles communication with the persistence API.

use std::time::Duration;

use serde::Deserialize;

use super::scan::ScanResponse;
use crate::config::{Config, API_URL_ENV};
use crate::encoder::EncodedImage;
use crate::model::{InventoryRecord, ItemUpdate, NewItem};

/// Default timeout for HTTP requests (30 seconds).
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default connection timeout (10 seconds).
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Error body convention of the persistence API: non-2xx responses carry
/// `{"error": "..."}` and the string is surfaced to the user verbatim.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Request body for `POST /api/scan`.
#[derive(Debug, serde::Serialize)]
struct ScanRequest<'a> {
    /// Encoded still image as a base64 data URL.
    image: &'a str,
}

/// Errors from the persistence and recognition endpoints.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("API base URL not configured. Set {API_URL_ENV} or api.base_url in the config file")]
    MissingBaseUrl,

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response; the message is the server's `error` string when
    /// the body carried one.
    #[error("{message}")]
    Api { status: u16, message: String },
}

/// Client for the inventory persistence API and its recognition endpoint.
pub struct ApiClient {
    base_url: String,
    http_client: reqwest::Client,
}

impl ApiClient {
    /// Create a client from resolved configuration.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::MissingBaseUrl` when neither the `STOCKCHECK_API_URL`
    /// environment variable nor the config file provides a base URL. There is
    /// deliberately no hardcoded fallback host.
    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        let base_url = config.api_base_url().ok_or(ApiError::MissingBaseUrl)?;
        Self::with_base_url(base_url)
    }

    /// Create a client with an explicit base URL.
    ///
    /// Useful for testing against a mock server.
    pub fn with_base_url(base_url: String) -> Result<Self, ApiError> {
        if base_url.is_empty() {
            return Err(ApiError::MissingBaseUrl);
        }

        let http_client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client,
        })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch the full current inventory list.
    pub async fn fetch_items(&self) -> Result<Vec<InventoryRecord>, ApiError> {
        let url = format!("{}/api/items", self.base_url);
        let response = self.http_client.get(&url).send().await?;
        let response = Self::check(response, "Failed to fetch items").await?;
        Ok(response.json().await?)
    }

    /// Create a new inventory record. The server assigns `id` and
    /// `createdAt` and returns the full record.
    pub async fn create_item(&self, item: &NewItem) -> Result<InventoryRecord, ApiError> {
        let url = format!("{}/api/items", self.base_url);
        let response = self.http_client.post(&url).json(item).send().await?;
        let response = Self::check(response, "Failed to save item").await?;
        Ok(response.json().await?)
    }

    /// Update an existing record. The server's returned representation is
    /// authoritative for every field, not just the ones sent.
    pub async fn update_item(
        &self,
        id: &str,
        update: &ItemUpdate,
    ) -> Result<InventoryRecord, ApiError> {
        let url = format!("{}/api/items/{}", self.base_url, id);
        let response = self.http_client.put(&url).json(update).send().await?;
        let response = Self::check(response, "Failed to update item").await?;
        Ok(response.json().await?)
    }

    /// Send an encoded still image to the recognition endpoint.
    ///
    /// Never retried automatically; on failure the caller lets the user
    /// re-attempt the capture or fall back to manual entry.
    pub async fn scan(&self, image: &EncodedImage) -> Result<ScanResponse, ApiError> {
        let url = format!("{}/api/scan", self.base_url);
        let data_url = image.to_data_url();
        let body = ScanRequest { image: &data_url };
        let response = self.http_client.post(&url).json(&body).send().await?;
        let response = Self::check(response, "Failed to scan item").await?;
        Ok(response.json().await?)
    }

    /// Turn a non-2xx response into `ApiError::Api`, surfacing the server's
    /// `error` string when the body carries one.
    async fn check(
        response: reqwest::Response,
        fallback: &str,
    ) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = match response.text().await {
            Ok(body) => serde_json::from_str::<ErrorBody>(&body)
                .map(|b| b.error)
                .unwrap_or_else(|_| {
                    if body.trim().is_empty() {
                        fallback.to_string()
                    } else {
                        body
                    }
                }),
            Err(_) => fallback.to_string(),
        };

        log::warn!("API request failed with status {}: {}", status, message);
        Err(ApiError::Api {
            status: status.as_u16(),
            message,
        })
    }
}
