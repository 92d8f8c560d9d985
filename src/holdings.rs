//! Holdings document: the user-configured assets and cash balances.
//!
//! Holdings are independent of the snapshot history and are persisted as a
//! single JSON file, read and written as a whole document.

use std::path::Path;

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A stock or ETF position, priced by ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityHolding {
    pub ticker: String,
    pub shares: Decimal,
}

/// A crypto position, priced by coin id but displayed by symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CryptoHolding {
    /// Provider coin id (e.g. "bitcoin").
    pub id: String,
    /// Display symbol (e.g. "BTC").
    pub symbol: String,
    pub amount: Decimal,
}

/// A cash balance entered manually; contributes its amount with no lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashHolding {
    pub label: String,
    pub amount: Decimal,
}

/// The whole holdings document. All four lists default to empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Holdings {
    pub stocks: Vec<EquityHolding>,
    pub etfs: Vec<EquityHolding>,
    pub crypto: Vec<CryptoHolding>,
    pub cash: Vec<CashHolding>,
}

impl Holdings {
    /// Load holdings from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read holdings file: {}", path.display()))?;
        let holdings: Holdings = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse holdings file: {}", path.display()))?;
        Ok(holdings)
    }

    /// Load holdings from a file, or return an empty document if it doesn't exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Write the whole document back to disk.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
            }
        }
        let content = serde_json::to_string_pretty(self).context("Failed to serialize holdings")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write holdings file: {}", path.display()))?;
        Ok(())
    }

    /// Tickers to price from the equity source: stocks followed by ETFs.
    pub fn equity_tickers(&self) -> Vec<String> {
        self.stocks
            .iter()
            .chain(self.etfs.iter())
            .map(|h| h.ticker.clone())
            .collect()
    }

    /// Coin ids to price from the crypto source.
    pub fn crypto_ids(&self) -> Vec<String> {
        self.crypto.iter().map(|h| h.id.clone()).collect()
    }

    pub fn add_stock(&mut self, ticker: &str, shares: Decimal) {
        self.stocks.push(EquityHolding {
            ticker: ticker.trim().to_uppercase(),
            shares,
        });
    }

    pub fn add_etf(&mut self, ticker: &str, shares: Decimal) {
        self.etfs.push(EquityHolding {
            ticker: ticker.trim().to_uppercase(),
            shares,
        });
    }

    pub fn add_crypto(&mut self, id: &str, symbol: &str, amount: Decimal) {
        self.crypto.push(CryptoHolding {
            id: id.trim().to_lowercase(),
            symbol: symbol.trim().to_uppercase(),
            amount,
        });
    }

    pub fn add_cash(&mut self, label: &str, amount: Decimal) {
        self.cash.push(CashHolding {
            label: label.trim().to_string(),
            amount,
        });
    }

    /// Remove a stock position by ticker. Returns whether anything was removed.
    pub fn remove_stock(&mut self, ticker: &str) -> bool {
        let before = self.stocks.len();
        self.stocks.retain(|h| !h.ticker.eq_ignore_ascii_case(ticker));
        self.stocks.len() != before
    }

    pub fn remove_etf(&mut self, ticker: &str) -> bool {
        let before = self.etfs.len();
        self.etfs.retain(|h| !h.ticker.eq_ignore_ascii_case(ticker));
        self.etfs.len() != before
    }

    /// Remove a crypto position by coin id.
    pub fn remove_crypto(&mut self, id: &str) -> bool {
        let before = self.crypto.len();
        self.crypto.retain(|h| !h.id.eq_ignore_ascii_case(id));
        self.crypto.len() != before
    }

    /// Remove a cash balance by label.
    pub fn remove_cash(&mut self, label: &str) -> bool {
        let before = self.cash.len();
        self.cash.retain(|h| h.label != label);
        self.cash.len() != before
    }
}
