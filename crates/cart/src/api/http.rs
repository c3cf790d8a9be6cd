//! HTTP client for the storefront catalog and inventory endpoints.

use async_trait::async_trait;
use reqwest::StatusCode;
use rocketshoes_core::ProductId;
use serde::Deserialize;
use serde_json::Value;

use super::CatalogApi;
use crate::config::CartConfig;
use crate::error::ApiError;
use crate::types::{Product, Stock};

/// Client for `GET /stock/{id}` and `GET /products/{id}`.
///
/// One attempt per call: no retries, no backoff. The only timeout is the
/// transport-level request timeout configured on the underlying client.
#[derive(Debug, Clone)]
pub struct HttpCatalogClient {
    api_url: String,
    token: Option<String>,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct StockBody {
    amount: i64,
}

impl HttpCatalogClient {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: normalize_base(api_url.into()),
            token: None,
            client: reqwest::Client::new(),
        }
    }

    /// Build a client from configuration (base URL, optional token, timeout).
    pub fn from_config(config: &CartConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()
            .map_err(|e| ApiError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            api_url: normalize_base(config.api_url.clone()),
            token: config.auth_token.clone(),
            client,
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.api_url, path);
        let req = self.client.get(url);
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }
}

fn normalize_base(mut api_url: String) -> String {
    while api_url.ends_with('/') {
        api_url.pop();
    }
    api_url
}

#[async_trait]
impl CatalogApi for HttpCatalogClient {
    async fn stock(&self, id: ProductId) -> Result<Stock, ApiError> {
        let resp = self.get(&format!("/stock/{id}")).send().await?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound);
        }
        if !status.is_success() {
            return Err(ApiError::Api(status.as_u16(), resp.text().await.unwrap_or_default()));
        }

        let body: StockBody = resp
            .json()
            .await
            .map_err(|e| ApiError::Parse(format!("invalid stock record for {id}: {e}")))?;

        Ok(Stock {
            id,
            amount: body.amount,
        })
    }

    async fn product(&self, id: ProductId) -> Result<Option<Product>, ApiError> {
        let resp = self.get(&format!("/products/{id}")).send().await?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            tracing::debug!("catalog has no product {id}");
            return Ok(None);
        }
        if !status.is_success() {
            return Err(ApiError::Api(status.as_u16(), resp.text().await.unwrap_or_default()));
        }

        let text = resp.text().await?;
        if text.trim().is_empty() {
            return Ok(None);
        }

        let body: Value = serde_json::from_str(&text)
            .map_err(|e| ApiError::Parse(format!("invalid product record for {id}: {e}")))?;

        match body {
            Value::Null => Ok(None),
            Value::Object(record) if record.is_empty() => Ok(None),
            Value::Object(record) => Ok(Some(Product::from_record(id, record))),
            other => Err(ApiError::Parse(format!(
                "expected product object for {id}, got {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slashes_are_trimmed() {
        let client = HttpCatalogClient::new("http://localhost:3333//");
        assert_eq!(client.api_url(), "http://localhost:3333");
    }

    #[test]
    fn from_config_carries_token_and_url() {
        let config = CartConfig {
            api_url: "http://catalog.local/".to_string(),
            auth_token: Some("secret".to_string()),
            ..CartConfig::default()
        };
        let client = HttpCatalogClient::from_config(&config).unwrap();
        assert_eq!(client.api_url(), "http://catalog.local");
        assert_eq!(client.token.as_deref(), Some("secret"));
    }
}
