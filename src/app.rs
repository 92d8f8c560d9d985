//! Refresh orchestration: fetch prices, compute a snapshot, persist it.

use std::collections::HashMap;

use anyhow::Result;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, warn};

use crate::holdings::Holdings;
use crate::prices::{CryptoPriceSource, EquityPriceSource};
use crate::snapshot::{compute_snapshot, CategoryTotals, Snapshot};
use crate::store::SnapshotStore;

/// Headline view of the most recent snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct LatestSummary {
    pub date: NaiveDate,
    pub total_value: Decimal,
    /// Change versus the previous snapshot, when one exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change: Option<Decimal>,
    pub category_totals: CategoryTotals,
}

/// Wires the price sources and the snapshot store into one refresh cycle.
pub struct Tracker {
    store: Box<dyn SnapshotStore>,
    equities: Box<dyn EquityPriceSource>,
    crypto: Box<dyn CryptoPriceSource>,
}

impl Tracker {
    pub fn new(
        store: Box<dyn SnapshotStore>,
        equities: Box<dyn EquityPriceSource>,
        crypto: Box<dyn CryptoPriceSource>,
    ) -> Self {
        Self {
            store,
            equities,
            crypto,
        }
    }

    /// Run one fetch → compute → persist cycle for `date`.
    ///
    /// A failed price source degrades its holdings to zero value; a storage
    /// failure is fatal and leaves previously saved snapshots untouched.
    pub async fn refresh(&self, holdings: &Holdings, date: NaiveDate) -> Result<Snapshot> {
        let tickers = holdings.equity_tickers();
        let equity_prices = match self.equities.fetch_quotes(&tickers).await {
            Ok(prices) => prices,
            Err(err) => {
                warn!(
                    source = self.equities.name(),
                    error = %err,
                    "Equity price fetch failed; valuing affected holdings at zero"
                );
                HashMap::new()
            }
        };

        let ids = holdings.crypto_ids();
        let crypto_prices = match self.crypto.fetch_quotes(&ids).await {
            Ok(prices) => prices,
            Err(err) => {
                warn!(
                    source = self.crypto.name(),
                    error = %err,
                    "Crypto price fetch failed; valuing affected holdings at zero"
                );
                HashMap::new()
            }
        };

        let snapshot = compute_snapshot(date, holdings, &equity_prices, &crypto_prices);
        self.store.save(&snapshot).await?;
        info!(date = %snapshot.date, total = %snapshot.total_value, "Saved net worth snapshot");
        Ok(snapshot)
    }

    /// Every saved snapshot, ordered ascending by date.
    pub async fn history(&self) -> Result<Vec<Snapshot>> {
        self.store.all().await
    }

    /// The most recent snapshot with its change versus the previous one, or
    /// `None` when nothing has been saved yet.
    pub async fn latest_summary(&self) -> Result<Option<LatestSummary>> {
        let history = self.store.all().await?;
        let Some(latest) = history.last() else {
            return Ok(None);
        };

        let change = history
            .len()
            .checked_sub(2)
            .map(|i| latest.total_value - history[i].total_value);

        Ok(Some(LatestSummary {
            date: latest.date,
            total_value: latest.total_value,
            change,
            category_totals: latest.breakdown.category_totals.clone(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    use crate::store::MemorySnapshotStore;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    /// Returns a fixed price for every requested symbol.
    struct FixedSource {
        price: Decimal,
    }

    impl FixedSource {
        fn new(price: &str) -> Self {
            Self {
                price: price.parse().unwrap(),
            }
        }
    }

    #[async_trait::async_trait]
    impl EquityPriceSource for FixedSource {
        async fn fetch_quotes(&self, tickers: &[String]) -> Result<HashMap<String, Decimal>> {
            Ok(tickers.iter().map(|t| (t.clone(), self.price)).collect())
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    #[async_trait::async_trait]
    impl CryptoPriceSource for FixedSource {
        async fn fetch_quotes(&self, ids: &[String]) -> Result<HashMap<String, Decimal>> {
            Ok(ids.iter().map(|i| (i.clone(), self.price)).collect())
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    /// Always fails, like a network outage.
    struct FailingSource;

    #[async_trait::async_trait]
    impl EquityPriceSource for FailingSource {
        async fn fetch_quotes(&self, _tickers: &[String]) -> Result<HashMap<String, Decimal>> {
            Err(anyhow!("connection refused"))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    #[async_trait::async_trait]
    impl CryptoPriceSource for FailingSource {
        async fn fetch_quotes(&self, _ids: &[String]) -> Result<HashMap<String, Decimal>> {
            Err(anyhow!("connection refused"))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    fn sample_holdings() -> Holdings {
        let mut holdings = Holdings::default();
        holdings.add_stock("AAPL", dec("2"));
        holdings.add_crypto("bitcoin", "BTC", dec("1"));
        holdings.add_cash("Checking", dec("100"));
        holdings
    }

    #[tokio::test]
    async fn refresh_computes_and_persists() {
        let tracker = Tracker::new(
            Box::new(MemorySnapshotStore::new()),
            Box::new(FixedSource::new("150.00")),
            Box::new(FixedSource::new("40000.00")),
        );

        let snapshot = tracker
            .refresh(&sample_holdings(), date("2024-01-01"))
            .await
            .unwrap();

        assert_eq!(snapshot.total_value, dec("40400.00"));

        let stored = tracker.history().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0], snapshot);
    }

    #[tokio::test]
    async fn failed_price_source_degrades_to_zero() {
        let tracker = Tracker::new(
            Box::new(MemorySnapshotStore::new()),
            Box::new(FailingSource),
            Box::new(FixedSource::new("40000.00")),
        );

        let snapshot = tracker
            .refresh(&sample_holdings(), date("2024-01-01"))
            .await
            .unwrap();

        // Equities zeroed, crypto and cash still counted.
        assert_eq!(snapshot.breakdown.category_totals.stocks, Decimal::ZERO);
        assert_eq!(snapshot.total_value, dec("40100.00"));
    }

    #[tokio::test]
    async fn refreshing_same_date_overwrites() {
        let store = Box::new(MemorySnapshotStore::new());
        let tracker = Tracker::new(
            store,
            Box::new(FixedSource::new("150.00")),
            Box::new(FixedSource::new("40000.00")),
        );
        let holdings = sample_holdings();

        tracker.refresh(&holdings, date("2024-01-01")).await.unwrap();

        let mut cheaper = Holdings::default();
        cheaper.add_cash("Checking", dec("1200"));
        tracker.refresh(&cheaper, date("2024-01-01")).await.unwrap();

        let history = tracker.history().await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].total_value, dec("1200.00"));
    }

    #[tokio::test]
    async fn latest_summary_reports_change_from_previous() {
        let tracker = Tracker::new(
            Box::new(MemorySnapshotStore::new()),
            Box::new(FixedSource::new("0")),
            Box::new(FixedSource::new("0")),
        );

        assert!(tracker.latest_summary().await.unwrap().is_none());

        let mut day_one = Holdings::default();
        day_one.add_cash("Checking", dec("1000"));
        tracker.refresh(&day_one, date("2024-01-01")).await.unwrap();

        let summary = tracker.latest_summary().await.unwrap().unwrap();
        assert_eq!(summary.total_value, dec("1000.00"));
        assert!(summary.change.is_none());

        let mut day_two = Holdings::default();
        day_two.add_cash("Checking", dec("1250"));
        tracker.refresh(&day_two, date("2024-01-02")).await.unwrap();

        let summary = tracker.latest_summary().await.unwrap().unwrap();
        assert_eq!(summary.date, date("2024-01-02"));
        assert_eq!(summary.change, Some(dec("250.00")));
    }
}
