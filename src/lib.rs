//! LegBalancer: client-side composition of multi-leg (N:M) ledger transactions.
//!
//! A [`store::DraftStore`] owns one authoring session. Actions go through the
//! mode controller ([`mode`]), mutate legs ([`registry`]) and are reconciled
//! ([`reconciler`]) before [`payload::finalize`] hands a balanced draft to the
//! review step.

pub mod config;
pub mod directory;
pub mod mode;
pub mod payload;
pub mod reconciler;
pub mod registry;
pub mod replay;
pub mod search;
pub mod store;

