//! Snapshot model and the net worth computation.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::holdings::Holdings;

/// Per-category subtotals, each rounded to cents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotals {
    pub stocks: Decimal,
    pub etfs: Decimal,
    pub crypto: Decimal,
    pub cash: Decimal,
}

/// Per-asset values grouped by category, plus the category subtotals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Breakdown {
    pub stocks: BTreeMap<String, Decimal>,
    pub etfs: BTreeMap<String, Decimal>,
    pub crypto: BTreeMap<String, Decimal>,
    pub cash: BTreeMap<String, Decimal>,
    pub category_totals: CategoryTotals,
}

/// One dated record of total net worth and its category breakdown.
///
/// At most one snapshot exists per calendar date; saving a date that already
/// has a snapshot replaces the stored record wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub date: NaiveDate,
    pub total_value: Decimal,
    pub breakdown: Breakdown,
}

fn to_cents(value: Decimal) -> Decimal {
    value.round_dp(2)
}

/// Compute a snapshot for `date` from holdings and current prices.
///
/// Equity prices are keyed by ticker and cover both stocks and ETFs; crypto
/// prices are keyed by coin id, though the breakdown entry is keyed by the
/// display symbol. A missing price values that holding at zero rather than
/// failing. Cash entries contribute their stated amount with no lookup.
/// Every per-asset value, category subtotal, and the grand total is rounded
/// to cents. No side effects.
pub fn compute_snapshot(
    date: NaiveDate,
    holdings: &Holdings,
    equity_prices: &HashMap<String, Decimal>,
    crypto_prices: &HashMap<String, Decimal>,
) -> Snapshot {
    let mut breakdown = Breakdown::default();

    let mut stocks_total = Decimal::ZERO;
    for h in &holdings.stocks {
        let price = equity_prices.get(&h.ticker).copied().unwrap_or(Decimal::ZERO);
        let value = to_cents(price * h.shares);
        breakdown.stocks.insert(h.ticker.clone(), value);
        stocks_total += value;
    }

    let mut etfs_total = Decimal::ZERO;
    for h in &holdings.etfs {
        let price = equity_prices.get(&h.ticker).copied().unwrap_or(Decimal::ZERO);
        let value = to_cents(price * h.shares);
        breakdown.etfs.insert(h.ticker.clone(), value);
        etfs_total += value;
    }

    let mut crypto_total = Decimal::ZERO;
    for h in &holdings.crypto {
        let price = crypto_prices.get(&h.id).copied().unwrap_or(Decimal::ZERO);
        let value = to_cents(price * h.amount);
        breakdown.crypto.insert(h.symbol.clone(), value);
        crypto_total += value;
    }

    let mut cash_total = Decimal::ZERO;
    for h in &holdings.cash {
        breakdown.cash.insert(h.label.clone(), h.amount);
        cash_total += h.amount;
    }

    breakdown.category_totals = CategoryTotals {
        stocks: to_cents(stocks_total),
        etfs: to_cents(etfs_total),
        crypto: to_cents(crypto_total),
        cash: to_cents(cash_total),
    };

    Snapshot {
        date,
        total_value: to_cents(stocks_total + etfs_total + crypto_total + cash_total),
        breakdown,
    }
}
