//! Amount reconciliation.
//!
//! One rule is applied after every structural change: a side with exactly one
//! leg has that leg pinned to the transaction value. Sides with two or more
//! legs are never resized here, so amounts typed by the user survive adds and
//! removals; a mismatch is reported by [`compute_balance_state`] instead.

use rust_decimal::Decimal;
use serde::Serialize;

use legbalancer_core::{
    AccountRecord, AccountRef, AssetCode, BalanceState, DraftError, LegId, Side, TransactionDraft,
};

/// What happened to a side just before reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegChange {
    Added,
    Removed,
    Replaced,
    ValueChanged,
    Collapsed,
}

/// Amount given to a leg being appended to `side`.
///
/// The first leg of a side gets the transaction value; any later leg gets the
/// caller's amount or zero, leaving existing amounts alone.
pub fn amount_for_new_leg(draft: &TransactionDraft, side: Side, requested: Option<Decimal>) -> Decimal {
    if draft.leg_count(side) == 0 {
        return draft.total_value;
    }
    requested.unwrap_or(Decimal::ZERO)
}

/// Re-applies the single-leg pin to `side`.
pub fn reconcile(draft: &mut TransactionDraft, side: Side, change: LegChange) {
    let total = draft.total_value;
    let legs = draft.legs_mut(side);
    if let [only] = legs.as_mut_slice() {
        if only.amount != total {
            tracing::debug!(%side, leg = %only.id, from = %only.amount, to = %total, ?change, "Snapping sole leg to transaction value");
            only.amount = total;
        }
    }
}

pub fn reconcile_all(draft: &mut TransactionDraft, change: LegChange) {
    for side in Side::BOTH {
        reconcile(draft, side, change);
    }
}

/// A lone leg is derived from the transaction value and cannot be edited.
pub fn is_amount_editable(draft: &TransactionDraft, side: Side) -> bool {
    draft.leg_count(side) > 1
}

/// Changes the declared value and re-pins single legs on both sides.
pub fn set_total_value(draft: &mut TransactionDraft, value: Decimal) -> Result<(), DraftError> {
    if value < Decimal::ZERO {
        return Err(DraftError::NegativeAmount(value));
    }
    draft.total_value = value;
    reconcile_all(draft, LegChange::ValueChanged);
    Ok(())
}

/// Sums both sides and compares them to the declared value, exactly.
///
/// A side whose sum overflows is reported as `Decimal::MAX` and unbalanced.
pub fn compute_balance_state(draft: &TransactionDraft) -> BalanceState {
    let sources = draft.side_total(Side::Source);
    let destinations = draft.side_total(Side::Destination);
    let total = Some(draft.total_value);
    BalanceState {
        total_value: draft.total_value,
        sources_total: sources.unwrap_or(Decimal::MAX),
        destinations_total: destinations.unwrap_or(Decimal::MAX),
        is_balanced: sources == total && destinations == total,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LegWarning {
    InsufficientFunds {
        leg: LegId,
        account_ref: AccountRef,
        requested: Decimal,
        available: Decimal,
    },
    AssetMismatch {
        side: Side,
        leg: LegId,
        account_ref: AccountRef,
        account_asset: AssetCode,
        draft_asset: AssetCode,
    },
}

/// Advisory checks against the account records picked for the legs.
///
/// Legs whose account is not among `accounts` are skipped.
pub fn leg_warnings(draft: &TransactionDraft, accounts: &[AccountRecord]) -> Vec<LegWarning> {
    let lookup = |account_ref: &AccountRef| {
        accounts
            .iter()
            .find(|r| &r.account_ref == account_ref || r.id == account_ref.as_str())
    };

    let mut warnings = Vec::new();
    for side in Side::BOTH {
        for leg in draft.legs(side) {
            let Some(record) = lookup(&leg.account_ref) else {
                continue;
            };

            if let Some(draft_asset) = &draft.asset {
                if &record.asset != draft_asset {
                    warnings.push(LegWarning::AssetMismatch {
                        side,
                        leg: leg.id,
                        account_ref: leg.account_ref.clone(),
                        account_asset: record.asset.clone(),
                        draft_asset: draft_asset.clone(),
                    });
                }
            }

            if side == Side::Source
                && !leg.account_ref.is_external()
                && leg.amount > record.available_balance
            {
                warnings.push(LegWarning::InsufficientFunds {
                    leg: leg.id,
                    account_ref: leg.account_ref.clone(),
                    requested: leg.amount,
                    available: record.available_balance,
                });
            }
        }
    }
    warnings
}
