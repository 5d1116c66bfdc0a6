//! Tournament-wide aggregate statistics

use crate::store::DriverRecordStore;
use crate::types::{DriverStatus, RaceKind, TournamentStats};

/// Aggregate counts and averages over the whole store
pub fn tournament_stats(store: &DriverRecordStore) -> TournamentStats {
    let drivers = store.list_drivers(None);
    let races = store.races(None);

    let count_status = |status: DriverStatus| {
        drivers
            .iter()
            .filter(|d| d.status() == status)
            .count()
    };

    let raced: Vec<f64> = drivers
        .iter()
        .filter(|d| d.total_races() > 0)
        .map(|d| d.win_ratio())
        .collect();
    let average_win_ratio = if raced.is_empty() {
        0.0
    } else {
        raced.iter().sum::<f64>() / raced.len() as f64
    };

    let average_races_per_driver = if drivers.is_empty() {
        0.0
    } else {
        drivers.iter().map(|d| d.total_races() as f64).sum::<f64>() / drivers.len() as f64
    };

    TournamentStats {
        total_drivers: drivers.len(),
        active_drivers: count_status(DriverStatus::Active),
        eliminated_drivers: count_status(DriverStatus::Eliminated),
        inactive_drivers: count_status(DriverStatus::Inactive),
        total_races: races.len(),
        championship_races: races
            .iter()
            .filter(|r| r.kind == RaceKind::Championship)
            .count(),
        divisions: store.division_names().len(),
        average_win_ratio,
        average_races_per_driver,
    }
}
