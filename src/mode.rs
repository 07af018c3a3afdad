//! Simple / advanced authoring mode.
//!
//! Switching to advanced never loses data. Switching back to simple with more
//! than one leg on a side needs an explicit confirmation, modelled as a
//! [`PendingModeChange`] that lists what the collapse would drop.

use serde::Serialize;

use legbalancer_core::{Leg, Mode, Side, TransactionDraft};

use crate::reconciler::{self, LegChange};

/// A destructive mode change waiting for the user's answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingModeChange {
    pub target: Mode,
    pub discarded_sources: Vec<Leg>,
    pub discarded_destinations: Vec<Leg>,
}

impl PendingModeChange {
    pub fn discarded_count(&self) -> usize {
        self.discarded_sources.len() + self.discarded_destinations.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModeDecision {
    /// Already in the requested mode.
    Unchanged,
    /// Safe to switch right away.
    Switch(Mode),
    ConfirmationRequired(PendingModeChange),
}

/// Decides what a request for `target` needs. Does not mutate.
pub fn evaluate_request(draft: &TransactionDraft, target: Mode) -> ModeDecision {
    if draft.mode == target {
        return ModeDecision::Unchanged;
    }
    match target {
        Mode::Advanced => ModeDecision::Switch(Mode::Advanced),
        Mode::Simple => {
            let beyond_first = |side| draft.legs(side).iter().skip(1).cloned().collect::<Vec<_>>();
            let pending = PendingModeChange {
                target,
                discarded_sources: beyond_first(Side::Source),
                discarded_destinations: beyond_first(Side::Destination),
            };
            if pending.discarded_count() == 0 {
                ModeDecision::Switch(Mode::Simple)
            } else {
                ModeDecision::ConfirmationRequired(pending)
            }
        }
    }
}

/// Switches without touching legs. Only valid for a [`ModeDecision::Switch`].
pub(crate) fn switch_mode(draft: &mut TransactionDraft, target: Mode) {
    tracing::debug!(draft = %draft.id, from = %draft.mode, to = %target, "Mode switched");
    draft.mode = target;
    reconciler::reconcile_all(draft, LegChange::Collapsed);
}

/// Applies a confirmed collapse: keeps the first leg of each side and snaps
/// it to the transaction value. Returns the number of legs dropped.
pub fn apply_confirmed(draft: &mut TransactionDraft, pending: &PendingModeChange) -> usize {
    let mut dropped = 0;
    if pending.target == Mode::Simple {
        for side in Side::BOTH {
            let legs = draft.legs_mut(side);
            if legs.len() > 1 {
                dropped += legs.len() - 1;
                legs.truncate(1);
            }
        }
    }
    tracing::debug!(draft = %draft.id, dropped, "Mode change confirmed");
    switch_mode(draft, pending.target);
    dropped
}
