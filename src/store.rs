use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use legbalancer_core::{
    AccountRef, AssetCatalog, AssetCode, BalanceState, DraftError, LegId, Mode, ReviewError, Side,
    TransactionDraft,
};

use crate::{
    mode::{self, ModeDecision, PendingModeChange},
    payload::{self, TransactionPayload},
    reconciler, registry,
};

pub const METADATA_KEY_MAX_LEN: usize = 100;
pub const METADATA_VALUE_MAX_LEN: usize = 2000;

/// Every user-initiated change to a draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum DraftAction {
    SetAsset { code: String },
    SetTotalValue { value: Decimal },
    AddLeg { side: Side, account: AccountRef, amount: Option<Decimal> },
    RemoveLeg { side: Side, leg: LegId },
    SetLegAmount { side: Side, leg: LegId, amount: Decimal },
    ReplaceLegAccount { side: Side, leg: LegId, account: AccountRef },
    SetLegDetails {
        side: Side,
        leg: LegId,
        description: Option<String>,
        chart_of_accounts: Option<String>,
    },
    SetDescription { description: Option<String> },
    SetChartOfAccountsGroupName { name: Option<String> },
    SetMetadata { key: String, value: String },
    RemoveMetadata { key: String },
    RequestMode { mode: Mode },
    ConfirmModeChange,
    CancelModeChange,
}

impl DraftAction {
    fn resolves_confirmation(&self) -> bool {
        matches!(self, DraftAction::ConfirmModeChange | DraftAction::CancelModeChange)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    LegAdded(LegId),
    ModeChanged { from: Mode, to: Mode, dropped: usize },
    ConfirmationRequired(PendingModeChange),
    ModeChangeCancelled,
}

/// Immutable snapshot of an authoring session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DraftState {
    draft: TransactionDraft,
    pending: Option<PendingModeChange>,
}

impl DraftState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft(&self) -> &TransactionDraft {
        &self.draft
    }

    pub fn pending(&self) -> Option<&PendingModeChange> {
        self.pending.as_ref()
    }

    pub fn balance(&self) -> BalanceState {
        reconciler::compute_balance_state(&self.draft)
    }

    /// Whether the review step may be entered.
    pub fn can_review(&self) -> bool {
        payload::finalize(self).is_ok()
    }
}

/// Pure transition: returns the next snapshot, or an error and no change.
pub fn reduce(
    state: &DraftState,
    action: &DraftAction,
    assets: &dyn AssetCatalog,
) -> Result<(DraftState, Outcome), DraftError> {
    if state.pending.is_some() && !action.resolves_confirmation() {
        return Err(DraftError::ConfirmationPending);
    }

    let mut next = state.clone();
    let draft = &mut next.draft;

    let outcome = match action {
        DraftAction::SetAsset { code } => {
            let asset = AssetCode::parse(code)
                .filter(|c| assets.contains(c))
                .ok_or_else(|| DraftError::UnknownAsset(code.clone()))?;
            draft.asset = Some(asset);
            Outcome::Applied
        }
        DraftAction::SetTotalValue { value } => {
            reconciler::set_total_value(draft, *value)?;
            Outcome::Applied
        }
        DraftAction::AddLeg { side, account, amount } => {
            let id = registry::add_leg(draft, *side, account.clone(), *amount)?;
            Outcome::LegAdded(id)
        }
        DraftAction::RemoveLeg { side, leg } => {
            registry::remove_leg(draft, *side, *leg)?;
            Outcome::Applied
        }
        DraftAction::SetLegAmount { side, leg, amount } => {
            registry::set_leg_amount(draft, *side, *leg, *amount)?;
            Outcome::Applied
        }
        DraftAction::ReplaceLegAccount { side, leg, account } => {
            registry::replace_leg_account(draft, *side, *leg, account.clone())?;
            Outcome::Applied
        }
        DraftAction::SetLegDetails { side, leg, description, chart_of_accounts } => {
            registry::set_leg_details(draft, *side, *leg, description.clone(), chart_of_accounts.clone())?;
            Outcome::Applied
        }
        DraftAction::SetDescription { description } => {
            draft.description = non_blank(description);
            Outcome::Applied
        }
        DraftAction::SetChartOfAccountsGroupName { name } => {
            draft.chart_of_accounts_group_name = non_blank(name);
            Outcome::Applied
        }
        DraftAction::SetMetadata { key, value } => {
            validate_metadata(key, value)?;
            draft.metadata.insert(key.clone(), value.clone());
            Outcome::Applied
        }
        DraftAction::RemoveMetadata { key } => {
            draft.metadata.remove(key);
            Outcome::Applied
        }
        DraftAction::RequestMode { mode: target } => {
            let from = draft.mode;
            match mode::evaluate_request(draft, *target) {
                ModeDecision::Unchanged => Outcome::Applied,
                ModeDecision::Switch(to) => {
                    mode::switch_mode(draft, to);
                    Outcome::ModeChanged { from, to, dropped: 0 }
                }
                ModeDecision::ConfirmationRequired(pending) => {
                    next.pending = Some(pending.clone());
                    Outcome::ConfirmationRequired(pending)
                }
            }
        }
        DraftAction::ConfirmModeChange => {
            let pending = next.pending.take().ok_or(DraftError::NoPendingConfirmation)?;
            let from = next.draft.mode;
            let dropped = mode::apply_confirmed(&mut next.draft, &pending);
            Outcome::ModeChanged { from, to: pending.target, dropped }
        }
        DraftAction::CancelModeChange => {
            next.pending.take().ok_or(DraftError::NoPendingConfirmation)?;
            Outcome::ModeChangeCancelled
        }
    };

    Ok((next, outcome))
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn validate_metadata(key: &str, value: &str) -> Result<(), DraftError> {
    if key.trim().is_empty() {
        return Err(DraftError::InvalidMetadata("key must not be empty".to_string()));
    }
    if key.chars().count() > METADATA_KEY_MAX_LEN {
        return Err(DraftError::InvalidMetadata(format!(
            "key exceeds {} characters",
            METADATA_KEY_MAX_LEN
        )));
    }
    if value.chars().count() > METADATA_VALUE_MAX_LEN {
        return Err(DraftError::InvalidMetadata(format!(
            "value for {} exceeds {} characters",
            key, METADATA_VALUE_MAX_LEN
        )));
    }
    Ok(())
}

/// Owns the current snapshot of one authoring session.
pub struct DraftStore {
    state: DraftState,
    assets: Arc<dyn AssetCatalog>,
}

impl DraftStore {
    pub fn new(assets: Arc<dyn AssetCatalog>) -> Self {
        Self {
            state: DraftState::new(),
            assets,
        }
    }

    pub fn state(&self) -> &DraftState {
        &self.state
    }

    pub fn draft(&self) -> &TransactionDraft {
        self.state.draft()
    }

    pub fn dispatch(&mut self, action: DraftAction) -> Result<Outcome, DraftError> {
        match reduce(&self.state, &action, self.assets.as_ref()) {
            Ok((next, outcome)) => {
                tracing::debug!(draft = %next.draft.id, ?action, ?outcome, "Action applied");
                self.state = next;
                Ok(outcome)
            }
            Err(e) => {
                tracing::warn!(draft = %self.state.draft.id, ?action, error = %e, "Action rejected");
                Err(e)
            }
        }
    }

    pub fn balance(&self) -> BalanceState {
        self.state.balance()
    }

    pub fn finalize(&self) -> Result<TransactionPayload, ReviewError> {
        payload::finalize(&self.state)
    }
}
