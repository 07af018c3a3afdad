use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::{AccountRef, BalanceState, LegId, Side};

/// Structural rejections. A failed operation never mutates the draft.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftError {
    #[error("account {account_ref} is already a {side} leg")]
    DuplicateAccount { side: Side, account_ref: AccountRef },
    #[error("{side} leg {leg} not found")]
    NotFound { side: Side, leg: LegId },
    #[error("cannot remove the last {0} leg")]
    LastLeg(Side),
    #[error("{side} leg {leg} is the only leg on its side; its amount follows the transaction value")]
    NotEditable { side: Side, leg: LegId },
    #[error("amount must not be negative: {0}")]
    NegativeAmount(Decimal),
    #[error("{0} amounts would exceed the largest representable total")]
    AmountOverflow(Side),
    #[error("account reference must not be blank")]
    BlankAccount(Side),
    #[error("simple mode allows a single {0} leg")]
    SimpleModeLimit(Side),
    #[error("asset not found: {0}")]
    UnknownAsset(String),
    #[error("invalid metadata: {0}")]
    InvalidMetadata(String),
    #[error("a mode change is waiting for confirmation")]
    ConfirmationPending,
    #[error("no mode change is waiting for confirmation")]
    NoPendingConfirmation,
}

/// Reasons a draft cannot be handed to the review step yet.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReviewError {
    #[error("a mode change is waiting for confirmation")]
    ConfirmationPending,
    #[error("no asset selected")]
    MissingAsset,
    #[error("transaction value must be greater than zero")]
    NonPositiveValue,
    #[error("at least one {0} leg is required")]
    MissingLeg(Side),
    #[error("transaction is unbalanced ({0})")]
    Unbalanced(BalanceState),
}
