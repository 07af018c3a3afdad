use std::time::Duration;

use clap::Parser;
use rust_decimal::Decimal;
use serde::Deserialize;

use legbalancer_core::{AccountRecord, AccountRef, Asset, AssetCode, DirectoryError};

use crate::{
    directory::{InMemoryDirectory, DEFAULT_MAX_RESULTS},
    search::SearchSettings,
};

#[derive(Parser, Debug)]
#[command(name = "legbalancer", about = "LegBalancer - compose and check multi-leg ledger transactions")]
pub struct CliArgs {
    /// Path to config file
    #[arg(short, long, default_value = "legbalancer.toml")]
    pub config: String,

    /// JSON file with the list of draft actions to replay
    #[arg(short, long)]
    pub script: String,

    /// Log level (overrides config file)
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// Print the ledger request body after the review table
    #[arg(long)]
    pub json_payload: bool,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub assets: Vec<AssetEntry>,

    #[serde(default)]
    pub accounts: Vec<AccountEntry>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub json: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    #[serde(default = "default_min_query_len")]
    pub min_query_len: usize,

    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AssetEntry {
    pub code: String,
    pub name: String,
}

/// Seed account for the in-memory directory.
#[derive(Debug, Deserialize, Clone)]
pub struct AccountEntry {
    pub alias: String,
    pub id: Option<String>,
    pub label: Option<String>,
    pub asset: String,
    #[serde(default)]
    pub balance: Decimal,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_min_query_len() -> usize {
    1
}

fn default_max_results() -> usize {
    DEFAULT_MAX_RESULTS
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            debounce_ms: default_debounce_ms(),
            min_query_len: default_min_query_len(),
            max_results: default_max_results(),
        }
    }
}

impl Config {
    pub fn load(cli: &CliArgs) -> Self {
        let mut config = match std::fs::read_to_string(&cli.config) {
            Ok(contents) => Self::parse(&contents).unwrap_or_else(|e| {
                eprintln!("Warning: Failed to parse config file: {}", e);
                Config::default()
            }),
            Err(_) => Config::default(),
        };

        // CLI overrides
        if let Some(ref level) = cli.log_level {
            config.logging.level = level.clone();
        }

        config
    }

    pub fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    pub fn search_settings(&self) -> SearchSettings {
        SearchSettings {
            debounce: Duration::from_millis(self.search.debounce_ms),
            min_query_len: self.search.min_query_len,
        }
    }

    /// Builds the in-memory directory from the seed assets and accounts.
    pub fn build_directory(&self) -> Result<InMemoryDirectory, DirectoryError> {
        let directory = InMemoryDirectory::with_max_results(self.search.max_results);
        for entry in &self.assets {
            directory.insert_asset(Asset {
                code: parse_asset(&entry.code)?,
                name: entry.name.clone(),
            })?;
        }
        for entry in &self.accounts {
            let id = entry.id.clone().unwrap_or_else(|| entry.alias.clone());
            directory.insert_account(AccountRecord {
                account_ref: AccountRef::new(&entry.alias),
                display_label: entry.label.clone().unwrap_or_else(|| entry.alias.clone()),
                id,
                asset: parse_asset(&entry.asset)?,
                available_balance: entry.balance,
            })?;
        }
        Ok(directory)
    }
}

fn parse_asset(code: &str) -> Result<AssetCode, DirectoryError> {
    AssetCode::parse(code).ok_or_else(|| DirectoryError::Other(format!("invalid asset code: {:?}", code)))
}

#[cfg(test)]
mod tests {
    use legbalancer_core::{AccountDirectory, AssetCatalog};
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn test_defaults_when_sections_missing() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.json);
        assert_eq!(config.search.debounce_ms, 300);
        assert_eq!(config.search_settings().debounce, Duration::from_millis(300));
        assert!(config.accounts.is_empty());
    }

    #[tokio::test]
    async fn test_seeded_directory() {
        let config = Config::parse(
            r#"
            [logging]
            level = "debug"
            json = true

            [search]
            debounce_ms = 0
            max_results = 5

            [[assets]]
            code = "brl"
            name = "Brazilian Real"

            [[accounts]]
            alias = "@external/BRL"
            asset = "BRL"

            [[accounts]]
            alias = "brl-account-5-e2e"
            label = "E2E account five"
            asset = "BRL"
            balance = "1500.75"
            "#,
        )
        .unwrap();
        assert!(config.logging.json);

        let directory = config.build_directory().unwrap();
        assert!(directory.contains(&AssetCode::parse("BRL").unwrap()));

        let hits = directory.search("five").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].available_balance, dec!(1500.75));
        assert_eq!(hits[0].id, "brl-account-5-e2e");

        let external = directory.get(&AccountRef::new("@external/BRL")).unwrap();
        assert_eq!(external.available_balance, Decimal::ZERO);
    }

    #[test]
    fn test_invalid_asset_code_rejected() {
        let config = Config::parse(
            r#"
            [[assets]]
            code = "  "
            name = "Blank"
            "#,
        )
        .unwrap();
        assert!(config.build_directory().is_err());
    }
}
