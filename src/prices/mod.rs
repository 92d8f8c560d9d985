//! Price lookup collaborators.
//!
//! Sources return whatever subset of the requested symbols they could price;
//! a symbol the source cannot resolve is simply omitted from the map. Whole
//! batch failures (network, auth, malformed responses) surface as errors and
//! are degraded by the caller, not here.

mod coingecko;
mod yahoo;

pub use coingecko::CoinGeckoPriceSource;
pub use yahoo::YahooPriceSource;

use std::collections::HashMap;

use anyhow::Result;
use rust_decimal::Decimal;

/// Batch quote source for stocks and ETFs, keyed by ticker.
#[async_trait::async_trait]
pub trait EquityPriceSource: Send + Sync {
    /// Fetch current USD prices for the given tickers.
    ///
    /// An empty input returns an empty map without any network traffic.
    async fn fetch_quotes(&self, tickers: &[String]) -> Result<HashMap<String, Decimal>>;

    fn name(&self) -> &str;
}

/// Current price source for crypto assets, keyed by provider coin id.
#[async_trait::async_trait]
pub trait CryptoPriceSource: Send + Sync {
    /// Fetch current prices for the given coin ids.
    ///
    /// An empty input returns an empty map without any network traffic.
    async fn fetch_quotes(&self, ids: &[String]) -> Result<HashMap<String, Decimal>>;

    fn name(&self) -> &str;
}
