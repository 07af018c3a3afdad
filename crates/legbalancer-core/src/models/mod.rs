use std::{fmt::Display, sync::Arc};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub mod draft;

/// Prefix the ledger uses for accounts that live outside the organization.
pub const EXTERNAL_ACCOUNT_PREFIX: &str = "@external/";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Source,
    Destination,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Source, Side::Destination];

    pub fn opposite(self) -> Side {
        match self {
            Side::Source => Side::Destination,
            Side::Destination => Side::Source,
        }
    }
}

impl Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Source => f.write_str("source"),
            Side::Destination => f.write_str("destination"),
        }
    }
}

/// Authoring mode. `Simple` is exactly one leg per side, `Advanced` is N:M.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Simple,
    Advanced,
}

impl Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Simple => f.write_str("simple"),
            Mode::Advanced => f.write_str("advanced"),
        }
    }
}

/// Identifier of a leg, unique within one draft and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LegId(pub u32);

impl Display for LegId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Account alias or id as typed or picked by the user. Always trimmed,
/// including when deserialized.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct AccountRef(Arc<str>);

impl AccountRef {
    pub fn new(value: impl AsRef<str>) -> Self {
        Self(Arc::from(value.as_ref().trim()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.is_empty()
    }

    /// `@external/BRL` style accounts have no balance of their own.
    pub fn is_external(&self) -> bool {
        self.0.starts_with(EXTERNAL_ACCOUNT_PREFIX)
    }
}

impl From<&str> for AccountRef {
    fn from(value: &str) -> Self {
        AccountRef::new(value)
    }
}

impl From<String> for AccountRef {
    fn from(value: String) -> Self {
        AccountRef::new(value)
    }
}

impl From<AccountRef> for String {
    fn from(value: AccountRef) -> Self {
        value.0.to_string()
    }
}

impl Display for AccountRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Upper-cased asset code, e.g. `BRL`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetCode(Arc<str>);

impl AssetCode {
    /// Returns `None` for a blank code.
    pub fn parse(value: &str) -> Option<Self> {
        let code = value.trim();
        if code.is_empty() {
            return None;
        }
        Some(Self(Arc::from(code.to_uppercase())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for AssetCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leg {
    pub id: LegId,
    pub account_ref: AccountRef,
    pub amount: Decimal,
    pub chart_of_accounts: Option<String>,
    pub description: Option<String>,
}

impl Leg {
    pub fn new(id: LegId, account_ref: AccountRef, amount: Decimal) -> Self {
        Self {
            id,
            account_ref,
            amount,
            chart_of_accounts: None,
            description: None,
        }
    }
}

/// Advisory totals of a draft. Never an error by itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceState {
    pub total_value: Decimal,
    pub sources_total: Decimal,
    pub destinations_total: Decimal,
    pub is_balanced: bool,
}

impl BalanceState {
    pub fn total_of(&self, side: Side) -> Decimal {
        match side {
            Side::Source => self.sources_total,
            Side::Destination => self.destinations_total,
        }
    }

    /// How far `side` is from the declared value; positive means short.
    /// `None` when the difference does not fit in a `Decimal`.
    pub fn remaining(&self, side: Side) -> Option<Decimal> {
        self.total_value.checked_sub(self.total_of(side))
    }
}

impl Display for BalanceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "value={} sources={} destinations={} balanced={}",
            self.total_value, self.sources_total, self.destinations_total, self.is_balanced
        )
    }
}
