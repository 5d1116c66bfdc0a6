//! Ranking engine
//!
//! Standings are derived on every read from the current counters and are
//! never cached. Order: win ratio descending, then wins descending, then
//! name ascending. Names are unique, so this is a strict total order.

use crate::store::DriverRecordStore;
use crate::types::{Driver, DriverStanding, DriverStatus};
use crate::utils::compare_win_ratio;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Which drivers a caller wants to see in the standings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StandingsFilter {
    /// Every driver, including eliminated and inactive ones
    #[default]
    All,
    /// Drop eliminated drivers, keep inactive ones
    ExcludeEliminated,
    /// Only drivers still racing
    ActiveOnly,
}

impl StandingsFilter {
    pub fn admits(&self, status: DriverStatus) -> bool {
        match self {
            StandingsFilter::All => true,
            StandingsFilter::ExcludeEliminated => status != DriverStatus::Eliminated,
            StandingsFilter::ActiveOnly => status == DriverStatus::Active,
        }
    }
}

/// Ranking order between two drivers
pub fn standing_order(a: &Driver, b: &Driver) -> Ordering {
    compare_win_ratio((b.wins(), b.losses()), (a.wins(), a.losses()))
        .then_with(|| b.wins().cmp(&a.wins()))
        .then_with(|| a.name().cmp(b.name()))
}

/// Standings for one division, or for every driver when `division` is None
pub fn rankings(store: &DriverRecordStore, division: Option<&str>) -> Vec<DriverStanding> {
    rankings_with(store, division, StandingsFilter::All)
}

/// Standings with a caller-supplied status filter
pub fn rankings_with(
    store: &DriverRecordStore,
    division: Option<&str>,
    filter: StandingsFilter,
) -> Vec<DriverStanding> {
    let mut drivers: Vec<&Driver> = store
        .list_drivers(division)
        .into_iter()
        .filter(|d| filter.admits(d.status()))
        .collect();
    drivers.sort_by(|a, b| standing_order(a, b));

    drivers
        .into_iter()
        .enumerate()
        .map(|(index, driver)| DriverStanding {
            position: index + 1,
            name: driver.name().to_string(),
            division: driver.division().to_string(),
            wins: driver.wins(),
            losses: driver.losses(),
            total_races: driver.total_races(),
            win_ratio: driver.win_ratio(),
            status: driver.status(),
        })
        .collect()
}

/// Names of drivers in a division who can still be put into a race
pub fn active_drivers(store: &DriverRecordStore, division: &str) -> Vec<String> {
    store
        .list_drivers(Some(division))
        .into_iter()
        .filter(|d| d.is_active())
        .map(|d| d.name().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::race::record_race;
    use crate::types::DriverUpdate;

    fn names(standings: &[DriverStanding]) -> Vec<&str> {
        standings.iter().map(|s| s.name.as_str()).collect()
    }

    #[test]
    fn test_pro_division_scenario() {
        let mut store = DriverRecordStore::new();
        store.add_driver("A", "Pro").unwrap();
        store.add_driver("B", "Pro").unwrap();
        record_race(&mut store, ["A", "B"], "A").unwrap();

        let standings = rankings(&store, Some("Pro"));
        assert_eq!(names(&standings), vec!["A", "B"]);
        assert_eq!(standings[0].win_ratio, 1.0);
        assert_eq!(standings[0].position, 1);
        assert_eq!(standings[1].win_ratio, 0.0);
        assert_eq!(standings[1].position, 2);
    }

    #[test]
    fn test_tie_breaks() {
        let mut store = DriverRecordStore::new();
        for name in ["Dee", "Cy", "Bo", "Al", "Ed"] {
            store.add_driver(name, "Pro").unwrap();
        }
        // Al: 2-0, Bo: 1-0 (same ratio, fewer wins), Cy and Dee: 1-1 (name order)
        record_race(&mut store, ["Al", "Ed"], "Al").unwrap();
        record_race(&mut store, ["Al", "Ed"], "Al").unwrap();
        record_race(&mut store, ["Bo", "Ed"], "Bo").unwrap();
        record_race(&mut store, ["Cy", "Dee"], "Cy").unwrap();
        record_race(&mut store, ["Cy", "Dee"], "Dee").unwrap();

        let standings = rankings(&store, None);
        assert_eq!(names(&standings), vec!["Al", "Bo", "Cy", "Dee", "Ed"]);
    }

    #[test]
    fn test_unraced_drivers_sort_by_name() {
        let mut store = DriverRecordStore::new();
        for name in ["Zoe", "Mia", "Ann"] {
            store.add_driver(name, "Pro").unwrap();
        }
        assert_eq!(names(&rankings(&store, None)), vec!["Ann", "Mia", "Zoe"]);
    }

    #[test]
    fn test_eliminated_drivers_stay_unless_filtered() {
        let mut store = DriverRecordStore::new();
        for name in ["A", "B", "C"] {
            store.add_driver(name, "Pro").unwrap();
        }
        for _ in 0..3 {
            record_race(&mut store, ["A", "B"], "A").unwrap();
        }
        store
            .update_driver(
                "C",
                DriverUpdate {
                    inactive: Some(true),
                    ..Default::default()
                },
            )
            .unwrap();

        let all = rankings(&store, Some("Pro"));
        assert_eq!(all.len(), 3);
        assert_eq!(names(&all), vec!["A", "B", "C"]);
        assert_eq!(all[1].status, DriverStatus::Eliminated);
        assert_eq!(all[2].status, DriverStatus::Inactive);

        let without = rankings_with(&store, Some("Pro"), StandingsFilter::ExcludeEliminated);
        assert_eq!(names(&without), vec!["A", "C"]);

        let active = rankings_with(&store, Some("Pro"), StandingsFilter::ActiveOnly);
        assert_eq!(names(&active), vec!["A"]);
        assert_eq!(active_drivers(&store, "Pro"), vec!["A".to_string()]);
    }

    #[test]
    fn test_division_filter() {
        let mut store = DriverRecordStore::new();
        store.add_driver("A", "Pro").unwrap();
        store.add_driver("B", "Street").unwrap();

        assert_eq!(names(&rankings(&store, Some("Street"))), vec!["B"]);
        assert!(rankings(&store, Some("Unknown")).is_empty());
        assert_eq!(rankings(&store, None).len(), 2);
    }

    #[test]
    fn test_rankings_do_not_mutate() {
        let mut store = DriverRecordStore::new();
        store.add_driver("A", "Pro").unwrap();
        store.add_driver("B", "Pro").unwrap();
        record_race(&mut store, ["A", "B"], "B").unwrap();

        let first = rankings(&store, None);
        let second = rankings(&store, None);
        assert_eq!(first, second);
        assert_eq!(store.race_count(), 1);
    }
}
