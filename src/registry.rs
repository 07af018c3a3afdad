//! Leg registry: the ordered source and destination legs of a draft.
//!
//! Every operation validates before it touches the draft, so an `Err` leaves
//! the draft exactly as it was.

use rust_decimal::Decimal;

use legbalancer_core::{AccountRef, DraftError, Leg, LegId, Mode, Side, TransactionDraft};

use crate::reconciler::{self, LegChange};

/// Appends a leg for `account_ref` to `side`.
pub fn add_leg(
    draft: &mut TransactionDraft,
    side: Side,
    account_ref: AccountRef,
    initial_amount: Option<Decimal>,
) -> Result<LegId, DraftError> {
    ensure_not_blank(side, &account_ref)?;
    if draft.contains_account(side, &account_ref) {
        return Err(DraftError::DuplicateAccount { side, account_ref });
    }
    if draft.mode == Mode::Simple && draft.leg_count(side) >= 1 {
        return Err(DraftError::SimpleModeLimit(side));
    }
    if let Some(amount) = initial_amount {
        ensure_non_negative(amount)?;
    }

    let amount = reconciler::amount_for_new_leg(draft, side, initial_amount);
    draft
        .side_total(side)
        .and_then(|total| total.checked_add(amount))
        .ok_or(DraftError::AmountOverflow(side))?;
    let id = draft.allocate_leg_id();
    draft.legs_mut(side).push(Leg::new(id, account_ref, amount));
    reconciler::reconcile(draft, side, LegChange::Added);

    tracing::debug!(draft = %draft.id, %side, leg = %id, "Leg added");
    Ok(id)
}

/// Removes a leg. The last leg of a side can only be replaced, not removed.
pub fn remove_leg(draft: &mut TransactionDraft, side: Side, leg: LegId) -> Result<Leg, DraftError> {
    let position = draft
        .position_of(side, leg)
        .ok_or(DraftError::NotFound { side, leg })?;
    if draft.leg_count(side) == 1 {
        return Err(DraftError::LastLeg(side));
    }

    let removed = draft.legs_mut(side).remove(position);
    reconciler::reconcile(draft, side, LegChange::Removed);

    tracing::debug!(draft = %draft.id, %side, %leg, amount = %removed.amount, "Leg removed");
    Ok(removed)
}

/// Sets the amount of a leg on a side that has more than one leg.
///
/// Does not check the side total; an unbalanced draft is allowed while the
/// user is still typing.
pub fn set_leg_amount(
    draft: &mut TransactionDraft,
    side: Side,
    leg: LegId,
    amount: Decimal,
) -> Result<(), DraftError> {
    let position = draft
        .position_of(side, leg)
        .ok_or(DraftError::NotFound { side, leg })?;
    if !reconciler::is_amount_editable(draft, side) {
        return Err(DraftError::NotEditable { side, leg });
    }
    ensure_non_negative(amount)?;
    draft
        .legs(side)
        .iter()
        .enumerate()
        .try_fold(Decimal::ZERO, |acc, (i, l)| {
            acc.checked_add(if i == position { amount } else { l.amount })
        })
        .ok_or(DraftError::AmountOverflow(side))?;

    draft.legs_mut(side)[position].amount = amount;
    Ok(())
}

/// Points an existing leg at another account, keeping its amount.
pub fn replace_leg_account(
    draft: &mut TransactionDraft,
    side: Side,
    leg: LegId,
    account_ref: AccountRef,
) -> Result<(), DraftError> {
    ensure_not_blank(side, &account_ref)?;
    let position = draft
        .position_of(side, leg)
        .ok_or(DraftError::NotFound { side, leg })?;
    if draft.legs(side)[position].account_ref == account_ref {
        return Ok(());
    }
    if draft.contains_account(side, &account_ref) {
        return Err(DraftError::DuplicateAccount { side, account_ref });
    }

    draft.legs_mut(side)[position].account_ref = account_ref;
    reconciler::reconcile(draft, side, LegChange::Replaced);
    Ok(())
}

pub fn set_leg_details(
    draft: &mut TransactionDraft,
    side: Side,
    leg: LegId,
    description: Option<String>,
    chart_of_accounts: Option<String>,
) -> Result<(), DraftError> {
    let position = draft
        .position_of(side, leg)
        .ok_or(DraftError::NotFound { side, leg })?;
    let target = &mut draft.legs_mut(side)[position];
    target.description = description;
    target.chart_of_accounts = chart_of_accounts;
    Ok(())
}

pub fn legs_of(draft: &TransactionDraft, side: Side) -> &[Leg] {
    draft.legs(side)
}

fn ensure_not_blank(side: Side, account_ref: &AccountRef) -> Result<(), DraftError> {
    if account_ref.is_blank() {
        return Err(DraftError::BlankAccount(side));
    }
    Ok(())
}

fn ensure_non_negative(amount: Decimal) -> Result<(), DraftError> {
    if amount < Decimal::ZERO {
        return Err(DraftError::NegativeAmount(amount));
    }
    Ok(())
}
