// Refresh orchestrator: owns wallets, price and per-wallet views for one dashboard

use crate::balance_reader::BalanceReader;
use crate::error::CoreResult;
use crate::formatter::{format_balance, format_pl, format_usd, short_address};
use crate::http_client::HttpClient;
use crate::models::{
    BalanceState, DashboardSnapshot, PriceStatus, Theme, Totals, ValueState, Wallet, WalletRow,
    WalletView,
};
use crate::price_resolver::{PriceResolver, PriceSourceConfig};
use crate::rpc_client::RpcClient;
use crate::schedule::{RefreshSchedule, Tick};
use crate::settings::Settings;
use crate::storage_trait::{keys, StorageBackend};
use crate::wallet_store::WalletStore;
use chrono::{DateTime, Utc};
use futures_util::stream::{FuturesUnordered, StreamExt};
use log::{info, warn};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

pub const LOADING: &str = "Loading...";
pub const ERROR: &str = "Error";
pub const PRICE_LOADING: &str = "Price loading...";
pub const PRICE_UNAVAILABLE: &str = "Price not available";

/// Summary of one refresh cycle
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    pub price: PriceStatus,
    pub loaded: usize,
    pub failed: usize,
}

#[derive(Default)]
struct CycleState {
    price: PriceStatus,
    views: HashMap<String, WalletView>,
    last_update: Option<DateTime<Utc>>,
}

type Listener = Rc<dyn Fn()>;

/// Single-threaded dashboard context.
///
/// All mutable state sits behind `RefCell`s that are only borrowed for the
/// duration of a synchronous update, so wallet mutations can interleave with
/// an in-flight `refresh` on the same thread.
pub struct Dashboard<R, H, S> {
    reader: BalanceReader<R>,
    resolver: PriceResolver<H>,
    storage: S,
    store: RefCell<WalletStore<S>>,
    state: RefCell<CycleState>,
    schedule: RefCell<RefreshSchedule>,
    theme: Cell<Theme>,
    listener: RefCell<Option<Listener>>,
}

impl<R, H, S> Dashboard<R, H, S>
where
    R: RpcClient,
    H: HttpClient,
    S: StorageBackend + Clone,
{
    pub fn new(settings: &Settings, rpc: R, http: H, storage: S) -> CoreResult<Self> {
        let store = WalletStore::load(storage.clone(), &settings.default_wallets)?;
        let theme = match storage.get_raw(keys::THEME) {
            Ok(Some(name)) => Theme::from_name(&name).unwrap_or_else(|| {
                warn!("Unknown stored theme {:?}, using default", name);
                Theme::default()
            }),
            Ok(None) => Theme::default(),
            Err(e) => {
                warn!("Stored theme unreadable, using default: {}", e);
                Theme::default()
            }
        };

        Ok(Self {
            reader: BalanceReader::new(rpc, settings.token_address.to_lowercase(), settings.token_decimals),
            resolver: PriceResolver::new(http, PriceSourceConfig::from(settings)),
            storage,
            store: RefCell::new(store),
            state: RefCell::new(CycleState::default()),
            schedule: RefCell::new(RefreshSchedule::new(settings.refresh_interval_secs())),
            theme: Cell::new(theme),
            listener: RefCell::new(None),
        })
    }

    pub fn reader(&self) -> &BalanceReader<R> {
        &self.reader
    }

    pub fn resolver(&self) -> &PriceResolver<H> {
        &self.resolver
    }

    /// Called after every state change
    pub fn set_listener(&self, listener: Listener) {
        *self.listener.borrow_mut() = Some(listener);
    }

    fn notify(&self) {
        let listener = self.listener.borrow().clone();
        if let Some(listener) = listener {
            listener();
        }
    }

    pub fn wallets(&self) -> Vec<Wallet> {
        self.store.borrow().list().to_vec()
    }

    pub fn price(&self) -> PriceStatus {
        self.state.borrow().price.clone()
    }

    /// Add a wallet and immediately run a cycle so it gets a balance
    pub async fn add_wallet(&self, name: &str, address: &str, cost: f64) -> CoreResult<Wallet> {
        let wallet = self.store.borrow_mut().add(name, address, cost)?;
        self.state
            .borrow_mut()
            .views
            .insert(wallet.address.clone(), WalletView::default());
        self.notify();

        self.refresh().await;
        Ok(wallet)
    }

    /// Returns whether a wallet was removed; a missing address is a no-op
    pub fn remove_wallet(&self, address: &str) -> CoreResult<bool> {
        let removed = self.store.borrow_mut().remove(address)?;
        match removed {
            Some(wallet) => {
                self.state.borrow_mut().views.remove(&wallet.address);
                self.notify();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn clear_wallets(&self) -> CoreResult<()> {
        if self.store.borrow().is_empty() {
            return Ok(());
        }
        self.store.borrow_mut().clear()?;
        self.state.borrow_mut().views.clear();
        self.notify();
        Ok(())
    }

    /// One full cycle. Price and balances are fetched concurrently; each result
    /// is applied and published as soon as it arrives.
    pub async fn refresh(&self) -> CycleReport {
        self.schedule.borrow_mut().reset();
        let wallets = self.wallets();
        {
            let mut state = self.state.borrow_mut();
            state.last_update = Some(Utc::now());
            for wallet in &wallets {
                state.views.entry(wallet.address.clone()).or_default();
            }
        }
        self.notify();

        let (price, (loaded, failed)) =
            futures_util::join!(self.refresh_price(), self.refresh_balances(&wallets));

        info!(
            "Refresh cycle done: {} balances loaded, {} failed, price {}",
            loaded,
            failed,
            match &price {
                PriceStatus::Resolved(quote) => format_usd(quote.price),
                _ => "unavailable".to_string(),
            }
        );
        CycleReport { price, loaded, failed }
    }

    async fn refresh_price(&self) -> PriceStatus {
        let status = match self.resolver.resolve(&self.reader).await {
            Ok(quote) => PriceStatus::Resolved(quote),
            Err(_) => PriceStatus::Unavailable,
        };

        {
            let costs: HashMap<String, f64> = self
                .store
                .borrow()
                .list()
                .iter()
                .map(|w| (w.address.clone(), w.cost))
                .collect();
            let mut state = self.state.borrow_mut();
            state.price = status.clone();
            let price = state.price.price();
            for (address, view) in state.views.iter_mut() {
                if let Some(cost) = costs.get(address) {
                    view.recompute(*cost, price);
                }
            }
        }
        self.notify();
        status
    }

    async fn refresh_balances(&self, wallets: &[Wallet]) -> (usize, usize) {
        let mut pending: FuturesUnordered<_> = wallets
            .iter()
            .map(|wallet| async move {
                let result = self.reader.get_balance(&wallet.address).await;
                (wallet.address.as_str(), result)
            })
            .collect();

        let (mut loaded, mut failed) = (0, 0);
        while let Some((address, result)) = pending.next().await {
            let balance = match result {
                Ok(balance) => {
                    loaded += 1;
                    BalanceState::Loaded(balance)
                }
                Err(e) => {
                    warn!("Balance read failed for {}: {}", address, e);
                    failed += 1;
                    BalanceState::Failed
                }
            };
            if self.apply_balance(address, balance) {
                self.notify();
            }
        }
        (loaded, failed)
    }

    /// Store a balance result; results for wallets removed mid-cycle are dropped
    fn apply_balance(&self, address: &str, balance: BalanceState) -> bool {
        let cost = match self.store.borrow().get(address) {
            Some(wallet) => wallet.cost,
            None => return false,
        };
        let mut state = self.state.borrow_mut();
        let price = state.price.price();
        let view = state.views.entry(address.to_string()).or_default();
        view.balance = balance;
        view.recompute(cost, price);
        true
    }

    /// Totals over views that currently hold a value
    pub fn totals(&self) -> Totals {
        let store = self.store.borrow();
        let state = self.state.borrow();
        Totals::from_views(store.list().iter().filter_map(|w| state.views.get(&w.address)))
    }

    pub fn start(&self) {
        self.schedule.borrow_mut().start();
        self.notify();
    }

    pub fn stop(&self) {
        self.schedule.borrow_mut().stop();
    }

    pub fn is_running(&self) -> bool {
        self.schedule.borrow().is_running()
    }

    /// Advance the countdown by one second; `Tick::Due` means the driver should
    /// call `refresh`
    pub fn tick(&self) -> Tick {
        let tick = self.schedule.borrow_mut().tick();
        if tick != Tick::Idle {
            self.notify();
        }
        tick
    }

    pub fn theme(&self) -> Theme {
        self.theme.get()
    }

    pub fn toggle_theme(&self) -> CoreResult<Theme> {
        let theme = self.theme.get().toggled();
        self.storage.set_raw(keys::THEME, theme.as_str())?;
        self.theme.set(theme);
        self.notify();
        Ok(theme)
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        let store = self.store.borrow();
        let state = self.state.borrow();

        let rows = store
            .list()
            .iter()
            .map(|wallet| {
                let view = state.views.get(&wallet.address).copied().unwrap_or_default();
                wallet_row(wallet, &view)
            })
            .collect();
        let totals =
            Totals::from_views(store.list().iter().filter_map(|w| state.views.get(&w.address)));

        let (price, price_source) = match &state.price {
            PriceStatus::Pending => (PRICE_LOADING.to_string(), None),
            PriceStatus::Resolved(quote) => (format_usd(quote.price), Some(quote.source.to_string())),
            PriceStatus::Unavailable => (PRICE_UNAVAILABLE.to_string(), None),
        };

        DashboardSnapshot {
            rows,
            total_balance: format_balance(totals.balance),
            total_usd_value: format_usd(totals.usd_value),
            price,
            price_source,
            last_update: state.last_update,
            next_update_secs: self.schedule.borrow().remaining_secs(),
            theme: self.theme.get(),
        }
    }
}

fn wallet_row(wallet: &Wallet, view: &WalletView) -> WalletRow {
    let balance = match view.balance {
        BalanceState::Loading => LOADING.to_string(),
        BalanceState::Failed => ERROR.to_string(),
        BalanceState::Loaded(balance) => format_balance(balance),
    };
    let usd_value = match view.usd_value {
        ValueState::Loading => LOADING.to_string(),
        ValueState::Failed => ERROR.to_string(),
        ValueState::AwaitingPrice => PRICE_LOADING.to_string(),
        ValueState::Ready(value) => format_usd(value),
    };
    let (pl, pl_tone) = format_pl(view.pl_percent);

    WalletRow {
        name: wallet.name.clone(),
        address: wallet.address.clone(),
        short_address: short_address(&wallet.address),
        cost: format_usd(wallet.cost),
        balance,
        usd_value,
        pl,
        pl_tone,
    }
}
