//! CoinGecko crypto price provider.
//!
//! Uses the free `/simple/price` endpoint, which takes a comma-separated list
//! of coin ids and returns current prices in the requested quote currency.
//! No API key is required for basic usage, though rate limits apply.

use std::collections::HashMap;

use anyhow::{anyhow, Result};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;

use super::CryptoPriceSource;

const COINGECKO_API_BASE: &str = "https://api.coingecko.com/api/v3";
const USER_AGENT: &str = "networth/0.1 (https://github.com/networth/networth)";

/// CoinGecko current price provider for crypto assets.
pub struct CoinGeckoPriceSource {
    client: reqwest::Client,
    base_url: String,
    /// Quote currency for prices (e.g. "usd", "eur")
    quote_currency: String,
}

impl CoinGeckoPriceSource {
    /// Creates a new CoinGecko provider with USD as the default quote currency.
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: COINGECKO_API_BASE.to_string(),
            quote_currency: "usd".to_string(),
        }
    }

    /// Creates a provider with a custom reqwest client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: COINGECKO_API_BASE.to_string(),
            quote_currency: "usd".to_string(),
        }
    }

    /// Overrides the API base URL (used by tests against a mock server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the quote currency for price lookups.
    pub fn with_quote_currency(mut self, currency: impl Into<String>) -> Self {
        self.quote_currency = currency.into().to_lowercase();
        self
    }
}

impl Default for CoinGeckoPriceSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl CryptoPriceSource for CoinGeckoPriceSource {
    async fn fetch_quotes(&self, ids: &[String]) -> Result<HashMap<String, Decimal>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let url = format!(
            "{}/simple/price?ids={}&vs_currencies={}",
            self.base_url,
            ids.join(","),
            self.quote_currency
        );

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .header("User-Agent", USER_AGENT)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("CoinGecko simple/price API error: {} - {}", status, body));
        }

        // Response shape: {"bitcoin": {"usd": 42000.0}, ...}. Unknown ids are
        // absent from the response and stay absent from the result.
        let data: HashMap<String, HashMap<String, f64>> = response.json().await?;

        let mut prices = HashMap::new();
        for (id, quotes) in data {
            let Some(raw) = quotes.get(&self.quote_currency) else {
                continue;
            };
            let Some(price) = Decimal::from_f64(*raw) else {
                continue;
            };
            prices.insert(id, price.round_dp(2));
        }

        Ok(prices)
    }

    fn name(&self) -> &str {
        "coingecko"
    }
}
