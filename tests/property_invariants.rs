//! Property tests over random race sequences

use dragrace_manager::race::record_race;
use dragrace_manager::ranking::{rankings, standing_order};
use dragrace_manager::store::{DriverRecordStore, Snapshot};
use dragrace_manager::types::{DivisionPolicy, DriverStatus, DriverUpdate};
use proptest::prelude::*;
use proptest::sample::{subsequence, Index};
use std::cmp::Ordering;

const ROSTER: [(&str, &str); 6] = [
    ("Anna", "Pro"),
    ("Bram", "Pro"),
    ("Cees", "Pro"),
    ("Dirk", "Pro"),
    ("Eva", "Pro"),
    ("Finn", "Street"),
];

#[derive(Debug, Clone)]
enum Op {
    Race(Vec<usize>, Index),
    SetInactive(usize, bool),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        8 => (subsequence((0..ROSTER.len()).collect::<Vec<_>>(), 2..=3), any::<Index>())
            .prop_map(|(drivers, winner)| Op::Race(drivers, winner)),
        1 => (0..ROSTER.len(), any::<bool>())
            .prop_map(|(driver, inactive)| Op::SetInactive(driver, inactive)),
    ]
}

fn roster_store() -> DriverRecordStore {
    let mut store = DriverRecordStore::with_divisions(["Pro", "Street"], DivisionPolicy::Open);
    for (name, division) in ROSTER {
        store.add_driver(name, division).unwrap();
    }
    store
}

fn counter_total(store: &DriverRecordStore) -> u32 {
    store
        .list_drivers(None)
        .iter()
        .map(|d| d.wins() + d.losses())
        .sum()
}

/// Snapshot without its timestamp, for state comparison
fn state_of(store: &DriverRecordStore) -> Snapshot {
    let mut snapshot = store.snapshot();
    snapshot.saved_at = chrono::DateTime::<chrono::Utc>::default();
    snapshot
}

fn apply(store: &mut DriverRecordStore, op: &Op) -> bool {
    match op {
        Op::Race(drivers, winner) => {
            let names: Vec<&str> = drivers.iter().map(|&i| ROSTER[i].0).collect();
            let winner = names[winner.index(names.len())];
            record_race(store, &names, winner).is_ok()
        }
        Op::SetInactive(driver, inactive) => store
            .update_driver(
                ROSTER[*driver].0,
                DriverUpdate {
                    inactive: Some(*inactive),
                    ..Default::default()
                },
            )
            .is_ok(),
    }
}

proptest! {
    #[test]
    fn counters_move_by_participant_count(ops in prop::collection::vec(op(), 0..60)) {
        let mut store = roster_store();

        for op in &ops {
            let before = state_of(&store);
            let total_before = counter_total(&store);
            let applied = apply(&mut store, op);

            match (op, applied) {
                (Op::Race(drivers, _), true) => {
                    prop_assert_eq!(counter_total(&store), total_before + drivers.len() as u32);
                    prop_assert_eq!(store.race_counter(), before.race_counter + 1);
                }
                (Op::Race(..), false) => {
                    // Rejected races leave no trace
                    prop_assert_eq!(state_of(&store), before);
                }
                (Op::SetInactive(..), _) => {
                    prop_assert_eq!(counter_total(&store), total_before);
                }
            }
        }

        prop_assert_eq!(store.race_count() as u64, store.race_counter());
    }

    #[test]
    fn status_follows_losses_and_override(ops in prop::collection::vec(op(), 0..60)) {
        let mut store = roster_store();
        for op in &ops {
            apply(&mut store, op);
        }

        for driver in store.list_drivers(None) {
            let expected = if driver.is_inactive() {
                DriverStatus::Inactive
            } else if driver.losses() >= 3 {
                DriverStatus::Eliminated
            } else {
                DriverStatus::Active
            };
            prop_assert_eq!(driver.status(), expected);
            prop_assert_eq!(driver.total_races(), driver.wins() + driver.losses());
            prop_assert_eq!(driver.races().len() as u32, driver.total_races());

            let ratio = driver.win_ratio();
            prop_assert!((0.0..=1.0).contains(&ratio));
        }
    }

    #[test]
    fn rankings_are_strictly_ordered(ops in prop::collection::vec(op(), 0..60)) {
        let mut store = roster_store();
        for op in &ops {
            apply(&mut store, op);
        }

        let standings = rankings(&store, None);
        prop_assert_eq!(standings.len(), ROSTER.len());
        for (i, standing) in standings.iter().enumerate() {
            prop_assert_eq!(standing.position, i + 1);
        }
        for pair in standings.windows(2) {
            let a = store.get_driver(&pair[0].name).unwrap();
            let b = store.get_driver(&pair[1].name).unwrap();
            prop_assert_eq!(standing_order(a, b), Ordering::Less);
        }
    }

    #[test]
    fn snapshot_reload_is_lossless(ops in prop::collection::vec(op(), 0..40)) {
        let mut store = roster_store();
        for op in &ops {
            apply(&mut store, op);
        }

        let json = store.snapshot().to_json().unwrap();
        let restored = DriverRecordStore::from_snapshot(
            Snapshot::from_json(&json).unwrap(),
            DivisionPolicy::Open,
        )
        .unwrap();

        prop_assert_eq!(state_of(&restored), state_of(&store));
    }
}
