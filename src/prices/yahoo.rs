//! Yahoo Finance equity quote provider.
//!
//! Uses the batch quote endpoint, which accepts a comma-separated ticker list
//! and returns one result object per symbol it recognizes.

use std::collections::HashMap;

use anyhow::{anyhow, Result};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;

use super::EquityPriceSource;

const YAHOO_API_BASE: &str = "https://query1.finance.yahoo.com";
const USER_AGENT: &str = "networth/0.1 (https://github.com/networth/networth)";

#[derive(Debug, Deserialize)]
struct QuoteEnvelope {
    #[serde(rename = "quoteResponse")]
    quote_response: QuoteResponse,
}

#[derive(Debug, Deserialize)]
struct QuoteResponse {
    #[serde(default)]
    result: Vec<Quote>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    symbol: String,
    #[serde(rename = "regularMarketPrice")]
    regular_market_price: Option<f64>,
}

/// Yahoo Finance quote provider for stocks and ETFs.
pub struct YahooPriceSource {
    client: reqwest::Client,
    base_url: String,
}

impl YahooPriceSource {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: YAHOO_API_BASE.to_string(),
        }
    }

    /// Creates a provider with a custom reqwest client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: YAHOO_API_BASE.to_string(),
        }
    }

    /// Overrides the API base URL (used by tests against a mock server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl Default for YahooPriceSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl EquityPriceSource for YahooPriceSource {
    async fn fetch_quotes(&self, tickers: &[String]) -> Result<HashMap<String, Decimal>> {
        if tickers.is_empty() {
            return Ok(HashMap::new());
        }

        let url = format!(
            "{}/v7/finance/quote?symbols={}",
            self.base_url,
            tickers.join(",")
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
            return Err(anyhow!("Yahoo Finance API error: {} - {}", status, body));
        }

        let data: QuoteEnvelope = response.json().await?;

        let mut prices = HashMap::new();
        for quote in data.quote_response.result {
            // Symbols without a market price (halted, delisted) are omitted.
            let Some(raw) = quote.regular_market_price else {
                continue;
            };
            let Some(price) = Decimal::from_f64(raw) else {
                continue;
            };
            prices.insert(quote.symbol, price.round_dp(2));
        }

        Ok(prices)
    }

    fn name(&self) -> &str {
        "yahoo"
    }
}
