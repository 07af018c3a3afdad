use std::{collections::BTreeMap, fmt::Display};

use prettytable::{row, Table};
use rust_decimal::Decimal;
use serde::Serialize;

use legbalancer_core::{AssetCode, Leg, ReviewError, Side};

use crate::{reconciler, store::DraftState};

/// Create-transaction body expected by the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart_of_accounts_group_name: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
    pub send: SendPayload,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SendPayload {
    pub asset: AssetCode,
    pub value: Decimal,
    pub source: SourcePayload,
    pub distribute: DistributePayload,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourcePayload {
    pub from: Vec<LegPayload>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DistributePayload {
    pub to: Vec<LegPayload>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegPayload {
    pub account_alias: String,
    pub amount: AmountPayload,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart_of_accounts: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AmountPayload {
    pub asset: AssetCode,
    pub value: Decimal,
}

impl LegPayload {
    fn from_leg(leg: &Leg, asset: &AssetCode) -> Self {
        Self {
            account_alias: leg.account_ref.to_string(),
            amount: AmountPayload {
                asset: asset.clone(),
                value: leg.amount,
            },
            description: leg.description.clone(),
            chart_of_accounts: leg.chart_of_accounts.clone(),
        }
    }
}

/// Freezes a draft for the review step, or says why it cannot be reviewed.
pub fn finalize(state: &DraftState) -> Result<TransactionPayload, ReviewError> {
    if state.pending().is_some() {
        return Err(ReviewError::ConfirmationPending);
    }
    let draft = state.draft();
    let asset = draft.asset.clone().ok_or(ReviewError::MissingAsset)?;
    if draft.total_value <= Decimal::ZERO {
        return Err(ReviewError::NonPositiveValue);
    }
    for side in Side::BOTH {
        if draft.leg_count(side) == 0 {
            return Err(ReviewError::MissingLeg(side));
        }
    }
    let balance = reconciler::compute_balance_state(draft);
    if !balance.is_balanced {
        return Err(ReviewError::Unbalanced(balance));
    }

    let legs = |side| {
        draft
            .legs(side)
            .iter()
            .map(|leg| LegPayload::from_leg(leg, &asset))
            .collect::<Vec<_>>()
    };

    Ok(TransactionPayload {
        description: draft.description.clone(),
        chart_of_accounts_group_name: draft.chart_of_accounts_group_name.clone(),
        metadata: draft.metadata.clone(),
        send: SendPayload {
            asset: asset.clone(),
            value: draft.total_value,
            source: SourcePayload { from: legs(Side::Source) },
            distribute: DistributePayload { to: legs(Side::Destination) },
        },
    })
}

impl Display for TransactionPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut table = Table::new();
        table.add_row(row!["Side", "Account", "Amount", "Asset", "Description"]);
        table.add_empty_row();

        let sides = [
            (Side::Source, &self.send.source.from),
            (Side::Destination, &self.send.distribute.to),
        ];
        for (side, legs) in sides {
            for leg in legs {
                table.add_row(row![
                    side,
                    leg.account_alias,
                    leg.amount.value,
                    leg.amount.asset,
                    leg.description.as_deref().unwrap_or("")
                ]);
            }
        }

        table.add_empty_row();
        table.add_row(row!["Total", "", self.send.value, self.send.asset, self.description.as_deref().unwrap_or("")]);

        write!(f, "\n{}\n", table)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rust_decimal_macros::dec;

    use super::*;
    use crate::{
        directory::{Asset, InMemoryDirectory},
        store::{DraftAction, DraftStore},
    };
    use legbalancer_core::Mode;

    fn store() -> DraftStore {
        let dir = InMemoryDirectory::new();
        dir.insert_asset(Asset {
            code: AssetCode::parse("BRL").unwrap(),
            name: "Brazilian Real".to_string(),
        })
        .unwrap();
        DraftStore::new(Arc::new(dir))
    }

    fn run(store: &mut DraftStore, actions: Vec<DraftAction>) {
        for action in actions {
            store.dispatch(action).unwrap();
        }
    }

    #[test]
    fn test_review_requirements_in_order() {
        let mut store = store();
        assert_eq!(store.finalize().unwrap_err(), ReviewError::MissingAsset);

        run(&mut store, vec![DraftAction::SetAsset { code: "BRL".to_string() }]);
        assert_eq!(store.finalize().unwrap_err(), ReviewError::NonPositiveValue);

        run(&mut store, vec![DraftAction::SetTotalValue { value: dec!(100) }]);
        assert_eq!(store.finalize().unwrap_err(), ReviewError::MissingLeg(Side::Source));

        run(
            &mut store,
            vec![DraftAction::AddLeg { side: Side::Source, account: "@external/BRL".into(), amount: None }],
        );
        assert_eq!(store.finalize().unwrap_err(), ReviewError::MissingLeg(Side::Destination));
    }

    #[test]
    fn test_payload_json_shape() {
        let mut store = store();
        run(
            &mut store,
            vec![
                DraftAction::SetAsset { code: "BRL".to_string() },
                DraftAction::SetTotalValue { value: dec!(100.00) },
                DraftAction::SetDescription { description: Some("Payroll".to_string()) },
                DraftAction::SetMetadata { key: "batch".to_string(), value: "7".to_string() },
                DraftAction::RequestMode { mode: Mode::Advanced },
                DraftAction::AddLeg { side: Side::Source, account: "@external/BRL".into(), amount: None },
                DraftAction::AddLeg { side: Side::Destination, account: "alice".into(), amount: None },
                DraftAction::AddLeg { side: Side::Destination, account: "bob".into(), amount: Some(dec!(40)) },
                DraftAction::SetLegAmount { side: Side::Destination, leg: legbalancer_core::LegId(2), amount: dec!(60) },
            ],
        );

        let payload = store.finalize().unwrap();
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["description"], "Payroll");
        assert_eq!(json["metadata"]["batch"], "7");
        assert_eq!(json["send"]["asset"], "BRL");
        assert_eq!(json["send"]["value"], "100.00");
        assert_eq!(json["send"]["source"]["from"][0]["accountAlias"], "@external/BRL");
        assert_eq!(json["send"]["source"]["from"][0]["amount"]["value"], "100.00");
        assert_eq!(json["send"]["distribute"]["to"][1]["accountAlias"], "bob");
        assert_eq!(json["send"]["distribute"]["to"][1]["amount"]["asset"], "BRL");
        assert!(json.get("chartOfAccountsGroupName").is_none());

        let rendered = payload.to_string();
        assert!(rendered.contains("alice"));
        assert!(rendered.contains("destination"));
    }

    #[test]
    fn test_unbalanced_blocks_review() {
        let mut store = store();
        run(
            &mut store,
            vec![
                DraftAction::SetAsset { code: "BRL".to_string() },
                DraftAction::SetTotalValue { value: dec!(100) },
                DraftAction::RequestMode { mode: Mode::Advanced },
                DraftAction::AddLeg { side: Side::Source, account: "@external/BRL".into(), amount: None },
                DraftAction::AddLeg { side: Side::Destination, account: "a".into(), amount: None },
                DraftAction::AddLeg { side: Side::Destination, account: "b".into(), amount: Some(dec!(30)) },
            ],
        );
        match store.finalize() {
            Err(ReviewError::Unbalanced(state)) => {
                assert_eq!(state.destinations_total, dec!(130));
                assert_eq!(state.sources_total, dec!(100));
            }
            other => panic!("Expected Unbalanced, got {:?}", other),
        }
        assert!(!store.state().can_review());
    }
}
