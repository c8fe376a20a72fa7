// Ordered wallet list, persisted in full on every mutation

use crate::address::normalize_address;
use crate::error::{CoreError, CoreResult};
use crate::models::Wallet;
use crate::storage_trait::{keys, StorageBackend};
use log::{debug, info, warn};

/// Label used when a wallet is added without a name
pub const UNNAMED_WALLET: &str = "Unnamed";

pub struct WalletStore<S> {
    storage: S,
    wallets: Vec<Wallet>,
}

impl<S: StorageBackend> WalletStore<S> {
    /// Load the persisted list; an empty or unreadable list is replaced by
    /// `seed` (invalid and duplicate seed entries are skipped) and persisted.
    pub fn load(storage: S, seed: &[Wallet]) -> CoreResult<Self> {
        let persisted: Vec<Wallet> = match storage.load(keys::WALLETS) {
            Ok(Some(list)) => list,
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("Stored wallet list unreadable, reseeding: {}", e);
                Vec::new()
            }
        };

        let mut store = Self {
            storage,
            wallets: Vec::new(),
        };

        if persisted.is_empty() {
            for wallet in seed {
                match store.validate(&wallet.name, &wallet.address, wallet.cost) {
                    Ok(wallet) => store.wallets.push(wallet),
                    Err(e) => warn!("Skipping seed wallet {}: {}", wallet.address, e),
                }
            }
            info!("Seeded wallet list with {} default wallets", store.wallets.len());
            if !store.wallets.is_empty() {
                store.storage.save(keys::WALLETS, &store.wallets)?;
            }
        } else {
            for wallet in persisted {
                match store.validate(&wallet.name, &wallet.address, wallet.cost) {
                    Ok(wallet) => store.wallets.push(wallet),
                    Err(e) => warn!("Dropping stored wallet {}: {}", wallet.address, e),
                }
            }
            debug!("Loaded {} wallets from storage", store.wallets.len());
        }

        Ok(store)
    }

    /// Wallets in insertion order
    pub fn list(&self) -> &[Wallet] {
        &self.wallets
    }

    pub fn len(&self) -> usize {
        self.wallets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wallets.is_empty()
    }

    pub fn get(&self, address: &str) -> Option<&Wallet> {
        let address = lookup_key(address);
        self.wallets.iter().find(|w| w.address == address)
    }

    /// Validate and append a wallet; returns the stored wallet
    pub fn add(&mut self, name: &str, address: &str, cost: f64) -> CoreResult<Wallet> {
        let wallet = self.validate(name, address, cost)?;
        let mut next = self.wallets.clone();
        next.push(wallet.clone());
        self.commit(next)?;
        info!("Added wallet {} ({})", wallet.name, wallet.address);
        Ok(wallet)
    }

    /// Remove by address in any accepted spelling; no-op when absent.
    /// Returns the removed wallet.
    pub fn remove(&mut self, address: &str) -> CoreResult<Option<Wallet>> {
        let address = lookup_key(address);
        let Some(index) = self.wallets.iter().position(|w| w.address == address) else {
            debug!("Remove ignored, wallet not tracked: {}", address);
            return Ok(None);
        };
        let mut next = self.wallets.clone();
        let wallet = next.remove(index);
        self.commit(next)?;
        info!("Removed wallet {}", wallet.address);
        Ok(Some(wallet))
    }

    /// Empty the list; clearing an already empty list writes nothing
    pub fn clear(&mut self) -> CoreResult<()> {
        if self.wallets.is_empty() {
            return Ok(());
        }
        self.commit(Vec::new())?;
        info!("Cleared all wallets");
        Ok(())
    }

    fn validate(&self, name: &str, address: &str, cost: f64) -> CoreResult<Wallet> {
        let address = normalize_address(address)?;
        if !cost.is_finite() || cost < 0.0 {
            return Err(CoreError::Validation(format!("cost must be a number >= 0, got {}", cost)));
        }
        if self.wallets.iter().any(|w| w.address == address) {
            return Err(CoreError::DuplicateAddress(address));
        }

        let name = name.trim();
        Ok(Wallet {
            name: if name.is_empty() { UNNAMED_WALLET.to_string() } else { name.to_string() },
            address,
            cost,
        })
    }

    /// Write `next` and adopt it only once the write succeeded
    fn commit(&mut self, next: Vec<Wallet>) -> CoreResult<()> {
        self.storage.save(keys::WALLETS, &next)?;
        self.wallets = next;
        Ok(())
    }
}

/// Canonical form when the input is a valid address, otherwise the trimmed
/// lowercase input (which then matches nothing)
fn lookup_key(address: &str) -> String {
    normalize_address(address).unwrap_or_else(|_| address.trim().to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MemoryStorage;
    use std::rc::Rc;

    const A: &str = "0x06a9f861862e120d2fd03E9650f033C49aFDD486";
    const B: &str = "0xc20662c62CbdD15158017d83462486682033070A";

    fn empty_store() -> (Rc<MemoryStorage>, WalletStore<Rc<MemoryStorage>>) {
        let storage = Rc::new(MemoryStorage::new());
        let store = WalletStore::load(storage.clone(), &[]).unwrap();
        (storage, store)
    }

    #[test]
    fn test_add_normalizes_and_rejects_duplicates_in_any_case() {
        let (_, mut store) = empty_store();
        let wallet = store.add("main", A, 0.0).unwrap();
        assert_eq!(wallet.address, A.to_lowercase());

        for variant in [A.to_string(), A.to_uppercase().replacen("0X", "0x", 1), A[2..].to_string()] {
            assert!(matches!(
                store.add("again", &variant, 0.0),
                Err(CoreError::DuplicateAddress(_))
            ));
        }
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_add_rejects_invalid_and_defaults_name() {
        let (storage, mut store) = empty_store();
        assert!(matches!(store.add("x", "0x1234", 0.0), Err(CoreError::InvalidAddress(_))));
        assert!(matches!(store.add("x", B, -1.0), Err(CoreError::Validation(_))));
        assert_eq!(storage.writes(), 0);

        let wallet = store.add("   ", B, 1.25).unwrap();
        assert_eq!(wallet.name, UNNAMED_WALLET);
        assert_eq!(wallet.cost, 1.25);
        assert_eq!(storage.writes(), 1);
    }

    #[test]
    fn test_every_mutation_is_persisted_in_order() {
        let (storage, mut store) = empty_store();
        store.add("a", A, 0.0).unwrap();
        store.add("b", B, 0.0).unwrap();

        let persisted: Vec<Wallet> = storage.load(keys::WALLETS).unwrap().unwrap();
        let addresses: Vec<_> = persisted.iter().map(|w| w.name.as_str()).collect();
        assert_eq!(addresses, vec!["a", "b"]);

        let removed = store.remove(&A[2..].to_uppercase()).unwrap();
        assert_eq!(removed.map(|w| w.name), Some("a".to_string()));
        let persisted: Vec<Wallet> = storage.load(keys::WALLETS).unwrap().unwrap();
        assert_eq!(persisted.len(), 1);
        assert_eq!(persisted[0].address, B.to_lowercase());
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let (storage, mut store) = empty_store();
        store.add("a", A, 0.0).unwrap();
        let before = store.list().to_vec();
        let writes = storage.writes();

        assert!(store.remove(B).unwrap().is_none());
        assert!(store.remove("not an address").unwrap().is_none());
        assert_eq!(store.list(), before.as_slice());
        assert_eq!(storage.writes(), writes);
    }

    #[test]
    fn test_clear_empty_writes_nothing() {
        let (storage, mut store) = empty_store();
        store.clear().unwrap();
        assert_eq!(storage.writes(), 0);

        store.add("a", A, 0.0).unwrap();
        store.clear().unwrap();
        assert!(store.is_empty());
        assert_eq!(storage.writes(), 2);
        store.clear().unwrap();
        assert_eq!(storage.writes(), 2);
    }

    #[test]
    fn test_seed_only_when_storage_empty() {
        let storage = Rc::new(MemoryStorage::new());
        let seed = vec![
            Wallet { name: "G".into(), address: A.into(), cost: 0.0 },
            Wallet { name: "dup".into(), address: A.to_lowercase(), cost: 0.0 },
            Wallet { name: "bad".into(), address: "0x12".into(), cost: 0.0 },
        ];
        let store = WalletStore::load(storage.clone(), &seed).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.list()[0].address, A.to_lowercase());
        assert_eq!(storage.writes(), 1);

        // A persisted list wins over the seed
        let mut store = store;
        store.add("b", B, 0.0).unwrap();
        let reloaded = WalletStore::load(storage.clone(), &seed).unwrap();
        assert_eq!(reloaded.len(), 2);
    }

    #[test]
    fn test_failed_write_leaves_list_unchanged() {
        let (storage, mut store) = empty_store();
        store.add("a", A, 0.0).unwrap();
        storage.fail_writes(true);

        assert!(store.add("b", B, 0.0).is_err());
        assert!(store.remove(A).is_err());
        assert!(store.clear().is_err());
        assert_eq!(store.len(), 1);
        assert_eq!(store.list()[0].address, A.to_lowercase());

        storage.fail_writes(false);
        store.add("b", B, 0.0).unwrap();
        let persisted: Vec<Wallet> = storage.load(keys::WALLETS).unwrap().unwrap();
        assert_eq!(persisted, store.list());
    }

    #[test]
    fn test_unreadable_storage_reseeds() {
        let storage = Rc::new(MemoryStorage::new());
        storage.set_raw(keys::WALLETS, "not json").unwrap();
        let seed = vec![Wallet { name: "G".into(), address: A.into(), cost: 0.0 }];
        let store = WalletStore::load(storage, &seed).unwrap();
        assert_eq!(store.len(), 1);
    }
}
