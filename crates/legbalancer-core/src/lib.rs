//! Core types and traits for the LegBalancer transaction composer.
//!
//! This crate holds the draft data model, the error taxonomy and the
//! `AccountDirectory` / `AssetCatalog` traits, so account and asset
//! back-ends can live in separate crates.

pub mod directory;
pub mod error;
pub mod models;

// Re-export key types at crate root for convenience
pub use directory::{Asset, AssetCatalog, AccountDirectory, AccountRecord, DirectoryError};
pub use error::{DraftError, ReviewError};
pub use models::draft::TransactionDraft;
pub use models::{AccountRef, AssetCode, BalanceState, Leg, LegId, Mode, Side};
