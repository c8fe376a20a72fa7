use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A tracked wallet. Immutable once stored; only list membership changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wallet {
    pub name: String,
    /// Canonical `0x`-prefixed lowercase address
    pub address: String,
    /// Cost basis per token in USD
    #[serde(default)]
    pub cost: f64,
}

/// Balance cell of a wallet view
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum BalanceState {
    /// No read has completed yet
    Loading,
    Loaded(f64),
    Failed,
}

/// USD value cell of a wallet view
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum ValueState {
    Loading,
    /// Balance known, price not (yet) known
    AwaitingPrice,
    Ready(f64),
    Failed,
}

/// Per-wallet computed view, rebuilt every cycle and never persisted
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WalletView {
    pub balance: BalanceState,
    pub usd_value: ValueState,
    pub pl_percent: Option<f64>,
}

impl Default for WalletView {
    fn default() -> Self {
        Self {
            balance: BalanceState::Loading,
            usd_value: ValueState::Loading,
            pl_percent: None,
        }
    }
}

impl WalletView {
    /// Recompute the derived cells from the current balance, price and cost basis
    pub fn recompute(&mut self, cost: f64, price: Option<f64>) {
        self.usd_value = match (self.balance, price) {
            (BalanceState::Loading, _) => ValueState::Loading,
            (BalanceState::Failed, _) => ValueState::Failed,
            (BalanceState::Loaded(_), None) => ValueState::AwaitingPrice,
            (BalanceState::Loaded(balance), Some(price)) => ValueState::Ready(balance * price),
        };
        self.pl_percent = crate::formatter::calculate_pl(price, cost);
    }
}

/// Sums over wallets whose cells are resolved; pending and failed cells are skipped
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Totals {
    pub balance: f64,
    pub usd_value: f64,
    pub counted_balances: usize,
    pub counted_values: usize,
}

impl Totals {
    pub fn from_views<'a>(views: impl IntoIterator<Item = &'a WalletView>) -> Self {
        views.into_iter().fold(Totals::default(), |mut acc, view| {
            if let BalanceState::Loaded(balance) = view.balance {
                acc.balance += balance;
                acc.counted_balances += 1;
            }
            if let ValueState::Ready(value) = view.usd_value {
                acc.usd_value += value;
                acc.counted_values += 1;
            }
            acc
        })
    }
}

/// Where a resolved price came from
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "tier", rename_all = "snake_case")]
pub enum QuoteSource {
    /// Tier 1: aggregator pair on the given exchange
    Aggregator { dex_id: String },
    /// Tier 2: exchange ticker for the given instrument
    Exchange { instrument: String },
}

impl std::fmt::Display for QuoteSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuoteSource::Aggregator { dex_id } => write!(f, "aggregator ({})", dex_id),
            QuoteSource::Exchange { instrument } => write!(f, "exchange ({})", instrument),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceQuote {
    pub price: f64,
    pub source: QuoteSource,
}

/// Process-wide price state, overwritten wholesale every cycle
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PriceStatus {
    /// No resolution has finished yet
    #[default]
    Pending,
    Resolved(PriceQuote),
    Unavailable,
}

impl PriceStatus {
    pub fn price(&self) -> Option<f64> {
        match self {
            PriceStatus::Resolved(quote) => Some(quote.price),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim() {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }
}

/// Styling hint for a P/L cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlTone {
    Positive,
    Negative,
    Neutral,
}

/// One display-ready table row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WalletRow {
    pub name: String,
    pub address: String,
    pub short_address: String,
    pub cost: String,
    pub balance: String,
    pub usd_value: String,
    pub pl: String,
    pub pl_tone: PlTone,
}

/// Everything a presentation adapter needs to render the dashboard
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    pub rows: Vec<WalletRow>,
    pub total_balance: String,
    pub total_usd_value: String,
    pub price: String,
    pub price_source: Option<String>,
    pub last_update: Option<DateTime<Utc>>,
    pub next_update_secs: u64,
    pub theme: Theme,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_recompute_states() {
        let mut view = WalletView::default();
        view.recompute(0.0, Some(2.0));
        assert_eq!(view.usd_value, ValueState::Loading);

        view.balance = BalanceState::Loaded(3.0);
        view.recompute(1.0, None);
        assert_eq!(view.usd_value, ValueState::AwaitingPrice);
        assert_eq!(view.pl_percent, None);

        view.recompute(1.0, Some(2.0));
        assert_eq!(view.usd_value, ValueState::Ready(6.0));
        assert_eq!(view.pl_percent, Some(100.0));

        view.balance = BalanceState::Failed;
        view.recompute(1.0, Some(2.0));
        assert_eq!(view.usd_value, ValueState::Failed);
    }

    #[test]
    fn test_totals_skip_pending_and_failed() {
        let loaded = WalletView {
            balance: BalanceState::Loaded(10.0),
            usd_value: ValueState::Ready(5.0),
            pl_percent: None,
        };
        let awaiting = WalletView {
            balance: BalanceState::Loaded(4.0),
            usd_value: ValueState::AwaitingPrice,
            pl_percent: None,
        };
        let failed = WalletView {
            balance: BalanceState::Failed,
            usd_value: ValueState::Failed,
            pl_percent: None,
        };
        let totals = Totals::from_views([&loaded, &awaiting, &failed, &WalletView::default()]);
        assert_eq!(totals.balance, 14.0);
        assert_eq!(totals.usd_value, 5.0);
        assert_eq!(totals.counted_balances, 2);
        assert_eq!(totals.counted_values, 1);
    }
}
