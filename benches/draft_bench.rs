use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use legbalancer::directory::InMemoryDirectory;
use legbalancer::reconciler::compute_balance_state;
use legbalancer::store::{reduce, DraftAction, DraftStore};
use legbalancer_core::{Asset, AssetCode, LegId, Mode, Side};
use rust_decimal::Decimal;

fn setup() -> (Arc<InMemoryDirectory>, DraftStore) {
    let directory = Arc::new(InMemoryDirectory::new());
    directory
        .insert_asset(Asset {
            code: AssetCode::parse("BRL").unwrap(),
            name: "Brazilian Real".to_string(),
        })
        .unwrap();
    let store = DraftStore::new(directory.clone());
    (directory, store)
}

/// One external source split evenly across `n` destinations.
fn seed_draft(store: &mut DraftStore, n: u32) {
    let total = Decimal::from(n) * Decimal::ONE_HUNDRED;
    let actions = vec![
        DraftAction::SetAsset { code: "BRL".to_string() },
        DraftAction::SetTotalValue { value: total },
        DraftAction::RequestMode { mode: Mode::Advanced },
        DraftAction::AddLeg { side: Side::Source, account: "@external/BRL".into(), amount: None },
    ];
    for action in actions {
        store.dispatch(action).unwrap();
    }

    for i in 0..n {
        store
            .dispatch(DraftAction::AddLeg {
                side: Side::Destination,
                account: format!("customer-{}", i).as_str().into(),
                amount: Some(Decimal::ONE_HUNDRED),
            })
            .unwrap();
    }
    // The first destination was pinned to the whole value when it was added.
    store
        .dispatch(DraftAction::SetLegAmount {
            side: Side::Destination,
            leg: LegId(2),
            amount: Decimal::ONE_HUNDRED,
        })
        .unwrap();
}

fn bench_add_leg(c: &mut Criterion) {
    let (directory, mut store) = setup();
    seed_draft(&mut store, 100);
    let state = store.state().clone();
    let action = DraftAction::AddLeg {
        side: Side::Destination,
        account: "late-customer".into(),
        amount: None,
    };

    c.bench_function("reduce_add_leg_100", |b| {
        b.iter(|| reduce(black_box(&state), black_box(&action), directory.as_ref()).unwrap())
    });
}

fn bench_balance_state(c: &mut Criterion) {
    let (_directory, mut store) = setup();
    seed_draft(&mut store, 100);

    c.bench_function("balance_state_100", |b| {
        b.iter(|| compute_balance_state(black_box(store.draft())))
    });
}

fn bench_finalize(c: &mut Criterion) {
    let (_directory, mut store) = setup();
    seed_draft(&mut store, 100);

    c.bench_function("finalize_100", |b| b.iter(|| store.finalize().unwrap()));
}

criterion_group!(benches, bench_add_leg, bench_balance_state, bench_finalize);
criterion_main!(benches);
