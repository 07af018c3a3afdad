use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{AccountRef, AssetCode};

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("directory unavailable: {0}")]
    Unavailable(String),
    #[error("{0}")]
    Other(String),
}

/// One hit of an account search, as shown in the account picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRecord {
    pub account_ref: AccountRef,
    pub id: String,
    pub display_label: String,
    pub asset: AssetCode,
    pub available_balance: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    pub code: AssetCode,
    pub name: String,
}

/// Account lookup by alias or id. Implementations may be remote.
#[async_trait]
pub trait AccountDirectory: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<AccountRecord>, DirectoryError>;

    /// Exact match on alias or id. The default filters `search`, so it is
    /// bounded by whatever page size the directory applies.
    async fn lookup(&self, account_ref: &AccountRef) -> Result<Option<AccountRecord>, DirectoryError> {
        Ok(self
            .search(account_ref.as_str())
            .await?
            .into_iter()
            .find(|r| &r.account_ref == account_ref || r.id == account_ref.as_str()))
    }
}

pub trait AssetCatalog: Send + Sync {
    fn assets(&self) -> Vec<Asset>;

    fn contains(&self, code: &AssetCode) -> bool {
        self.assets().iter().any(|a| &a.code == code)
    }
}
