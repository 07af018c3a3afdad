use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AccountRef, AssetCode, Leg, LegId, Mode, Side};

/// The in-progress transaction being authored.
///
/// Fields are plain data; the invariants (no duplicate account per side,
/// single-leg pin, simple-mode shape) are kept by the operations in the
/// `legbalancer` crate, which are the only intended writers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionDraft {
    pub id: Uuid,
    pub asset: Option<AssetCode>,
    pub total_value: Decimal,
    pub mode: Mode,
    pub sources: Vec<Leg>,
    pub destinations: Vec<Leg>,
    pub description: Option<String>,
    pub chart_of_accounts_group_name: Option<String>,
    pub metadata: BTreeMap<String, String>,
    next_leg_id: u32,
}

impl Default for TransactionDraft {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionDraft {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            asset: None,
            total_value: Decimal::ZERO,
            mode: Mode::Simple,
            sources: Vec::new(),
            destinations: Vec::new(),
            description: None,
            chart_of_accounts_group_name: None,
            metadata: BTreeMap::new(),
            next_leg_id: 1,
        }
    }

    pub fn legs(&self, side: Side) -> &[Leg] {
        match side {
            Side::Source => &self.sources,
            Side::Destination => &self.destinations,
        }
    }

    pub fn legs_mut(&mut self, side: Side) -> &mut Vec<Leg> {
        match side {
            Side::Source => &mut self.sources,
            Side::Destination => &mut self.destinations,
        }
    }

    pub fn leg(&self, side: Side, id: LegId) -> Option<&Leg> {
        self.legs(side).iter().find(|l| l.id == id)
    }

    pub fn position_of(&self, side: Side, id: LegId) -> Option<usize> {
        self.legs(side).iter().position(|l| l.id == id)
    }

    pub fn contains_account(&self, side: Side, account_ref: &AccountRef) -> bool {
        self.legs(side).iter().any(|l| &l.account_ref == account_ref)
    }

    pub fn leg_count(&self, side: Side) -> usize {
        self.legs(side).len()
    }

    /// Hands out the next leg id. Ids are never reused, even after removal.
    pub fn allocate_leg_id(&mut self) -> LegId {
        let id = LegId(self.next_leg_id);
        self.next_leg_id += 1;
        id
    }

    /// Sum of the amounts on `side`, or `None` if it overflows.
    pub fn side_total(&self, side: Side) -> Option<Decimal> {
        self.legs(side)
            .iter()
            .try_fold(Decimal::ZERO, |acc, l| acc.checked_add(l.amount))
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn test_leg_ids_are_not_reused() {
        let mut draft = TransactionDraft::new();
        let a = draft.allocate_leg_id();
        let b = draft.allocate_leg_id();
        assert_ne!(a, b);
        assert!(b > a);
    }

    #[test]
    fn test_side_total() {
        let mut draft = TransactionDraft::new();
        let id = draft.allocate_leg_id();
        draft.destinations.push(Leg::new(id, AccountRef::new("x"), dec!(50.25)));
        let id = draft.allocate_leg_id();
        draft.destinations.push(Leg::new(id, AccountRef::new("y"), dec!(49.75)));
        assert_eq!(draft.side_total(Side::Destination), Some(dec!(100)));
        assert_eq!(draft.side_total(Side::Source), Some(Decimal::ZERO));
        assert!(draft.contains_account(Side::Destination, &AccountRef::new("y")));
        assert!(!draft.contains_account(Side::Source, &AccountRef::new("y")));
    }

    #[test]
    fn test_side_total_overflow_is_none() {
        let mut draft = TransactionDraft::new();
        for account in ["x", "y"] {
            let id = draft.allocate_leg_id();
            draft.sources.push(Leg::new(id, AccountRef::new(account), Decimal::MAX));
        }
        assert_eq!(draft.side_total(Side::Source), None);
    }
}
