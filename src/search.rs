//! Debounced account search with last-query-wins ordering.

use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use legbalancer_core::{AccountDirectory, AccountRecord, AccountRef, DirectoryError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchSettings {
    pub debounce: Duration,
    pub min_query_len: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(300),
            min_query_len: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    Results(Vec<AccountRecord>),
    /// Query shorter than the configured minimum; nothing was asked.
    TooShort,
    /// A later search started before this one finished; drop the result.
    Superseded,
}

pub struct AccountSearch<D: AccountDirectory + ?Sized> {
    directory: Arc<D>,
    settings: SearchSettings,
    generation: AtomicU64,
}

impl<D: AccountDirectory + ?Sized> AccountSearch<D> {
    pub fn new(directory: Arc<D>, settings: SearchSettings) -> Self {
        Self {
            directory,
            settings,
            generation: AtomicU64::new(0),
        }
    }

    pub fn settings(&self) -> SearchSettings {
        self.settings
    }

    /// Resolves an exact alias or id right away. Takes no ticket, so it
    /// neither waits nor supersedes a pending search.
    pub async fn lookup(&self, account_ref: &AccountRef) -> Result<Option<AccountRecord>, DirectoryError> {
        self.directory.lookup(account_ref).await
    }

    fn is_current(&self, ticket: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket
    }

    /// Waits for input to settle, then queries the directory.
    ///
    /// Every call invalidates all calls started before it.
    pub async fn search(&self, query: &str) -> Result<SearchOutcome, DirectoryError> {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let query = query.trim();
        if query.chars().count() < self.settings.min_query_len {
            return Ok(SearchOutcome::TooShort);
        }

        if !self.settings.debounce.is_zero() {
            tokio::time::sleep(self.settings.debounce).await;
        }
        if !self.is_current(ticket) {
            tracing::debug!(query, ticket, "Search superseded before query");
            return Ok(SearchOutcome::Superseded);
        }

        let results = self.directory.search(query).await?;
        if !self.is_current(ticket) {
            tracing::debug!(query, ticket, "Discarding stale search results");
            return Ok(SearchOutcome::Superseded);
        }
        Ok(SearchOutcome::Results(results))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use async_trait::async_trait;
    use legbalancer_core::{AccountRef, AssetCode};
    use rust_decimal::Decimal;

    use super::*;
    use crate::directory::InMemoryDirectory;

    /// Directory whose latency depends on the query.
    struct SlowDirectory {
        inner: InMemoryDirectory,
        delays: HashMap<String, Duration>,
    }

    #[async_trait]
    impl AccountDirectory for SlowDirectory {
        async fn search(&self, query: &str) -> Result<Vec<AccountRecord>, DirectoryError> {
            if let Some(delay) = self.delays.get(query) {
                tokio::time::sleep(*delay).await;
            }
            self.inner.search(query).await
        }
    }

    fn directory(delays: &[(&str, u64)]) -> Arc<SlowDirectory> {
        let inner = InMemoryDirectory::new();
        for alias in ["brl-account-5-e2e", "brl-account-6-e2e", "usd-treasury"] {
            inner
                .insert_account(AccountRecord {
                    account_ref: AccountRef::new(alias),
                    id: alias.to_string(),
                    display_label: alias.to_string(),
                    asset: AssetCode::parse(&alias[..3]).unwrap(),
                    available_balance: Decimal::ONE_HUNDRED,
                })
                .unwrap();
        }
        Arc::new(SlowDirectory {
            inner,
            delays: delays
                .iter()
                .map(|(q, ms)| (q.to_string(), Duration::from_millis(*ms)))
                .collect(),
        })
    }

    fn settings(debounce_ms: u64) -> SearchSettings {
        SearchSettings {
            debounce: Duration::from_millis(debounce_ms),
            min_query_len: 2,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounce_drops_queries_typed_over() {
        let search = AccountSearch::new(directory(&[]), settings(50));
        let (first, second) = tokio::join!(search.search("br"), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            search.search("brl-account-5").await
        });

        assert_eq!(first.unwrap(), SearchOutcome::Superseded);
        match second.unwrap() {
            SearchOutcome::Results(hits) => {
                assert_eq!(hits.len(), 1);
                assert_eq!(hits[0].account_ref.as_str(), "brl-account-5-e2e");
            }
            other => panic!("Expected results, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_earlier_response_is_discarded() {
        let search = AccountSearch::new(directory(&[("brl", 100)]), settings(10));
        let (first, second) = tokio::join!(search.search("brl"), async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            search.search("usd").await
        });

        assert_eq!(first.unwrap(), SearchOutcome::Superseded);
        assert!(matches!(second.unwrap(), SearchOutcome::Results(hits) if hits.len() == 1));
    }

    #[tokio::test]
    async fn test_short_query_is_not_sent() {
        let search = AccountSearch::new(directory(&[]), settings(0));
        assert_eq!(search.search(" b ").await.unwrap(), SearchOutcome::TooShort);
        assert!(matches!(search.search("e2e").await.unwrap(), SearchOutcome::Results(hits) if hits.len() == 2));
    }
}
