use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::Value;

use crate::datasource::DataSource;
use crate::error::{AppError, AppResult};

/// HTTP client for the Lighter explorer and exchange APIs.
///
/// Every call is a single attempt: no retry, no timeout beyond reqwest's
/// defaults. A non-success status becomes [`AppError::ApiStatus`].
#[derive(Clone)]
pub struct LighterClient {
    client: Client,
    explorer_url: String,
    exchange_url: String,
}

impl LighterClient {
    pub fn new(explorer_url: &str, exchange_url: &str) -> Self {
        Self {
            client: Client::new(),
            explorer_url: explorer_url.trim_end_matches('/').to_string(),
            exchange_url: exchange_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(base: &str, path: &str, params: &[(&str, &str)]) -> AppResult<Url> {
        let raw = format!("{}{}", base, path);
        let parsed = if params.is_empty() {
            Url::parse(&raw)
        } else {
            Url::parse_with_params(&raw, params)
        };
        parsed.map_err(|e| AppError::InvalidUrl(format!("{}: {}", raw, e)))
    }

    async fn get(&self, url: Url) -> AppResult<Value> {
        tracing::debug!("GET {}", url);
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::ApiStatus(status.as_u16()));
        }

        let result: Value = response.json().await?;
        Ok(result)
    }
}

#[async_trait]
impl DataSource for LighterClient {
    async fn search_account(&self, address: &str) -> AppResult<Value> {
        let url = Self::url(&self.explorer_url, "/api/search", &[("q", address)])?;
        self.get(url).await
    }

    async fn get_markets(&self) -> AppResult<Value> {
        let url = Self::url(&self.exchange_url, "/api/v1/markets", &[])?;
        self.get(url).await
    }

    async fn get_account_balance(&self, address: &str) -> AppResult<Value> {
        let url = Self::url(
            &self.exchange_url,
            "/api/v1/account",
            &[("by", "l1_address"), ("value", address)],
        )?;
        self.get(url).await
    }
}
