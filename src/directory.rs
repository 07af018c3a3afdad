use std::sync::RwLock;

use async_trait::async_trait;

use legbalancer_core::{AccountRef, AssetCode};

// Re-export core directory types so callers can use crate::directory::*
pub use legbalancer_core::directory::{
    AccountDirectory, AccountRecord, Asset, AssetCatalog, DirectoryError,
};

/// Default cap on search hits, matching the account picker page size.
pub const DEFAULT_MAX_RESULTS: usize = 10;

/// Account directory and asset list held in memory.
pub struct InMemoryDirectory {
    accounts: RwLock<Vec<AccountRecord>>,
    assets: RwLock<Vec<Asset>>,
    max_results: usize,
}

impl Default for InMemoryDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::with_max_results(DEFAULT_MAX_RESULTS)
    }

    pub fn with_max_results(max_results: usize) -> Self {
        Self {
            accounts: RwLock::new(Vec::new()),
            assets: RwLock::new(Vec::new()),
            max_results,
        }
    }

    /// Inserts or replaces the account with the same reference.
    pub fn insert_account(&self, record: AccountRecord) -> Result<(), DirectoryError> {
        let mut accounts = self.accounts.write().map_err(poisoned)?;
        match accounts.iter_mut().find(|a| a.account_ref == record.account_ref) {
            Some(existing) => *existing = record,
            None => accounts.push(record),
        }
        Ok(())
    }

    pub fn insert_asset(&self, asset: Asset) -> Result<(), DirectoryError> {
        let mut assets = self.assets.write().map_err(poisoned)?;
        if !assets.iter().any(|a| a.code == asset.code) {
            assets.push(asset);
        }
        Ok(())
    }

    /// Exact lookup by alias or id.
    pub fn get(&self, account_ref: &AccountRef) -> Option<AccountRecord> {
        self.find_exact(account_ref).ok().flatten()
    }

    fn find_exact(&self, account_ref: &AccountRef) -> Result<Option<AccountRecord>, DirectoryError> {
        let accounts = self.accounts.read().map_err(poisoned)?;
        Ok(accounts
            .iter()
            .find(|a| &a.account_ref == account_ref || a.id == account_ref.as_str())
            .cloned())
    }

    fn find_matches(&self, query: &str) -> Result<Vec<AccountRecord>, DirectoryError> {
        let needle = query.trim().to_lowercase();
        let accounts = self.accounts.read().map_err(poisoned)?;
        Ok(accounts
            .iter()
            .filter(|a| {
                a.account_ref.as_str().to_lowercase().contains(&needle)
                    || a.id.to_lowercase().contains(&needle)
                    || a.display_label.to_lowercase().contains(&needle)
            })
            .take(self.max_results)
            .cloned()
            .collect())
    }
}

fn poisoned<T>(_: std::sync::PoisonError<T>) -> DirectoryError {
    DirectoryError::Other("directory lock poisoned".to_string())
}

#[async_trait]
impl AccountDirectory for InMemoryDirectory {
    async fn search(&self, query: &str) -> Result<Vec<AccountRecord>, DirectoryError> {
        let result = self.find_matches(query)?;
        tracing::debug!(query, hits = result.len(), "Account search");
        Ok(result)
    }

    async fn lookup(&self, account_ref: &AccountRef) -> Result<Option<AccountRecord>, DirectoryError> {
        self.find_exact(account_ref)
    }
}

impl AssetCatalog for InMemoryDirectory {
    fn assets(&self) -> Vec<Asset> {
        match self.assets.read() {
            Ok(assets) => assets.clone(),
            Err(_) => Vec::new(),
        }
    }

    fn contains(&self, code: &AssetCode) -> bool {
        match self.assets.read() {
            Ok(assets) => assets.iter().any(|a| &a.code == code),
            Err(_) => false,
        }
    }
}
