//! In-memory driver record store
//!
//! The store exclusively owns every driver, the registered divisions and the
//! race history. Divisions are otherwise a derived index over the drivers'
//! division labels.

use crate::error::{Result, TournamentError};
use crate::store::snapshot::{Snapshot, SNAPSHOT_VERSION};
use crate::types::{Division, DivisionPolicy, Driver, DriverUpdate, Race, RaceNumber};
use crate::utils::{current_timestamp, normalize_label};
use std::collections::HashSet;

/// Owner of all drivers and the race history
#[derive(Debug, Clone, Default)]
pub struct DriverRecordStore {
    /// Drivers in registration order
    drivers: Vec<Driver>,
    /// Explicitly registered divisions, possibly without members
    divisions: Vec<String>,
    /// Append-only race history
    races: Vec<Race>,
    /// Last race number handed out
    race_counter: RaceNumber,
    policy: DivisionPolicy,
}

impl DriverRecordStore {
    /// Create an empty store with the open division policy
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store with registered divisions
    pub fn with_divisions<I, S>(divisions: I, policy: DivisionPolicy) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut store = Self {
            policy,
            ..Self::default()
        };
        for division in divisions {
            let division = normalize_label(division.as_ref());
            if !division.is_empty() && !store.divisions.contains(&division) {
                store.divisions.push(division);
            }
        }
        store
    }

    pub fn policy(&self) -> DivisionPolicy {
        self.policy
    }

    /// Register a new driver with zeroed counters
    pub fn add_driver(&mut self, name: &str, division: &str) -> Result<Driver> {
        let name = normalize_label(name);
        let division = normalize_label(division);

        if name.is_empty() {
            return Err(TournamentError::validation("Driver name cannot be empty"));
        }
        self.check_division(&division)?;
        if self.position(&name).is_some() {
            return Err(TournamentError::driver_conflict(name));
        }

        let driver = Driver::new(name, division);
        self.drivers.push(driver.clone());
        Ok(driver)
    }

    /// Apply a partial update; every check runs before anything changes
    pub fn update_driver(&mut self, name: &str, update: DriverUpdate) -> Result<Driver> {
        let index = self
            .position(name)
            .ok_or_else(|| TournamentError::driver_not_found(name))?;

        let new_name = match update.name.as_deref().map(normalize_label) {
            Some(new_name) if new_name.is_empty() => {
                return Err(TournamentError::validation("Driver name cannot be empty"));
            }
            Some(new_name) if new_name != self.drivers[index].name => {
                if self.position(&new_name).is_some() {
                    return Err(TournamentError::driver_conflict(new_name));
                }
                Some(new_name)
            }
            _ => None,
        };

        let new_division = match update.division.as_deref().map(normalize_label) {
            Some(division) => {
                self.check_division(&division)?;
                Some(division)
            }
            None => None,
        };

        let driver = &mut self.drivers[index];
        if let Some(new_name) = new_name {
            driver.name = new_name;
        }
        if let Some(division) = new_division {
            driver.division = division;
        }
        if let Some(inactive) = update.inactive {
            driver.inactive = inactive;
        }

        Ok(driver.clone())
    }

    /// Remove a driver; races already recorded keep the name
    pub fn remove_driver(&mut self, name: &str) -> Result<Driver> {
        let index = self
            .position(name)
            .ok_or_else(|| TournamentError::driver_not_found(name))?;
        Ok(self.drivers.remove(index))
    }

    pub fn get_driver(&self, name: &str) -> Result<&Driver> {
        self.drivers
            .iter()
            .find(|d| d.name == name)
            .ok_or_else(|| TournamentError::driver_not_found(name))
    }

    pub fn contains_driver(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Drivers in registration order, optionally limited to one division
    pub fn list_drivers(&self, division: Option<&str>) -> Vec<&Driver> {
        self.drivers
            .iter()
            .filter(|d| division.map_or(true, |div| d.division == div))
            .collect()
    }

    pub fn driver_count(&self) -> usize {
        self.drivers.len()
    }

    /// Register a division that may not have members yet
    pub fn create_division(&mut self, name: &str) -> Result<Division> {
        let name = normalize_label(name);
        if name.is_empty() {
            return Err(TournamentError::validation("Division name cannot be empty"));
        }
        if self.divisions.contains(&name) {
            return Err(TournamentError::Conflict {
                entity: "Division",
                name,
            });
        }
        self.divisions.push(name.clone());
        Ok(self.describe_division(&name))
    }

    /// Registered divisions first, then labels only known through drivers
    pub fn division_names(&self) -> Vec<String> {
        let mut names = self.divisions.clone();
        let mut seen: HashSet<&str> = self.divisions.iter().map(String::as_str).collect();
        for driver in &self.drivers {
            if seen.insert(driver.division.as_str()) {
                names.push(driver.division.clone());
            }
        }
        names
    }

    pub fn list_divisions(&self) -> Vec<Division> {
        self.division_names()
            .iter()
            .map(|name| self.describe_division(name))
            .collect()
    }

    /// Case-insensitive lookup of a known division label
    pub fn knows_division(&self, label: &str) -> bool {
        let label = label.trim();
        self.division_names()
            .iter()
            .any(|name| name.eq_ignore_ascii_case(label))
    }

    /// Race history, optionally limited to one division
    pub fn races(&self, division: Option<&str>) -> Vec<&Race> {
        self.races
            .iter()
            .filter(|r| division.map_or(true, |div| r.division == div))
            .collect()
    }

    pub fn race_count(&self) -> usize {
        self.races.len()
    }

    pub fn race_counter(&self) -> RaceNumber {
        self.race_counter
    }

    pub(crate) fn driver_mut(&mut self, name: &str) -> Result<&mut Driver> {
        self.drivers
            .iter_mut()
            .find(|d| d.name == name)
            .ok_or_else(|| TournamentError::driver_not_found(name))
    }

    pub(crate) fn next_race_number(&mut self) -> RaceNumber {
        self.race_counter += 1;
        self.race_counter
    }

    pub(crate) fn append_race(&mut self, race: Race) {
        self.races.push(race);
    }

    /// Capture the complete state for persistence
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            version: SNAPSHOT_VERSION,
            saved_at: current_timestamp(),
            divisions: self.divisions.clone(),
            drivers: self.drivers.clone(),
            races: self.races.clone(),
            race_counter: self.race_counter,
        }
    }

    /// Rebuild a store from a snapshot
    pub fn from_snapshot(snapshot: Snapshot, policy: DivisionPolicy) -> Result<Self> {
        if snapshot.version > SNAPSHOT_VERSION {
            return Err(TournamentError::validation(format!(
                "Unsupported snapshot version {} (latest supported is {})",
                snapshot.version, SNAPSHOT_VERSION
            )));
        }

        let mut store = Self::with_divisions(&snapshot.divisions, policy);

        for mut driver in snapshot.drivers {
            driver.name = normalize_label(&driver.name);
            driver.division = normalize_label(&driver.division);
            if driver.name.is_empty() || driver.division.is_empty() {
                return Err(TournamentError::validation(
                    "Snapshot contains a driver without name or division",
                ));
            }
            if driver.wins.checked_add(driver.losses).is_none() {
                return Err(TournamentError::validation(format!(
                    "Snapshot counters for '{}' are out of range",
                    driver.name
                )));
            }
            if store.position(&driver.name).is_some() {
                return Err(TournamentError::driver_conflict(driver.name));
            }
            store.drivers.push(driver);
        }

        let highest = snapshot
            .races
            .iter()
            .map(|r| r.race_number)
            .max()
            .unwrap_or(0);
        store.race_counter = snapshot.race_counter.max(highest);
        store.races = snapshot.races;

        Ok(store)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.drivers.iter().position(|d| d.name == name)
    }

    fn check_division(&self, division: &str) -> Result<()> {
        if division.is_empty() {
            return Err(TournamentError::validation("Division cannot be empty"));
        }
        if self.policy == DivisionPolicy::Registered
            && !self.divisions.iter().any(|d| d == division)
        {
            return Err(TournamentError::validation(format!(
                "Invalid division: {}. Valid divisions: {}",
                division,
                self.divisions.join(", ")
            )));
        }
        Ok(())
    }

    fn describe_division(&self, name: &str) -> Division {
        let members = self.drivers.iter().filter(|d| d.division == name);
        let (drivers, active_drivers) = members.fold((0, 0), |(all, active), d| {
            (all + 1, active + usize::from(d.is_active()))
        });
        Division {
            name: name.to_string(),
            drivers,
            active_drivers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DriverStatus;

    fn open_store() -> DriverRecordStore {
        let mut store = DriverRecordStore::new();
        store.add_driver("Alice", "Pro").unwrap();
        store.add_driver("Bob", "Pro").unwrap();
        store.add_driver("Cara", "Street").unwrap();
        store
    }

    #[test]
    fn test_add_driver_trims_and_zeroes() {
        let mut store = DriverRecordStore::new();
        let driver = store.add_driver("  Alice ", " Pro ").unwrap();
        assert_eq!(driver.name(), "Alice");
        assert_eq!(driver.division(), "Pro");
        assert_eq!(driver.wins(), 0);
        assert_eq!(driver.losses(), 0);
        assert_eq!(driver.status(), DriverStatus::Active);
    }

    #[test]
    fn test_add_driver_conflict_is_global() {
        let mut store = open_store();
        let err = store.add_driver("Alice", "Street").unwrap_err();
        assert_eq!(err, TournamentError::driver_conflict("Alice"));
        assert_eq!(store.driver_count(), 3);
    }

    #[test]
    fn test_add_driver_rejects_empty_fields() {
        let mut store = DriverRecordStore::new();
        assert!(matches!(
            store.add_driver("   ", "Pro"),
            Err(TournamentError::Validation { .. })
        ));
        assert!(matches!(
            store.add_driver("Alice", ""),
            Err(TournamentError::Validation { .. })
        ));
    }

    #[test]
    fn test_registered_policy_rejects_unknown_division() {
        let mut store =
            DriverRecordStore::with_divisions(["OPEN", "DAMES"], DivisionPolicy::Registered);
        assert!(store.add_driver("Alice", "OPEN").is_ok());
        let err = store.add_driver("Bob", "Pro").unwrap_err();
        assert!(matches!(err, TournamentError::Validation { .. }));
        assert!(err.to_string().contains("Invalid division: Pro"));
    }

    #[test]
    fn test_update_driver_rename_and_move() {
        let mut store = open_store();
        let updated = store
            .update_driver(
                "Alice",
                DriverUpdate {
                    name: Some("Alicia".into()),
                    division: Some("Street".into()),
                    inactive: None,
                },
            )
            .unwrap();
        assert_eq!(updated.name(), "Alicia");
        assert_eq!(updated.division(), "Street");
        assert!(store.get_driver("Alice").is_err());
        assert_eq!(store.list_drivers(Some("Street")).len(), 2);
    }

    #[test]
    fn test_update_driver_conflict_leaves_state() {
        let mut store = open_store();
        let err = store
            .update_driver(
                "Alice",
                DriverUpdate {
                    name: Some("Bob".into()),
                    division: Some("Street".into()),
                    inactive: Some(true),
                },
            )
            .unwrap_err();
        assert_eq!(err, TournamentError::driver_conflict("Bob"));

        let alice = store.get_driver("Alice").unwrap();
        assert_eq!(alice.division(), "Pro");
        assert!(!alice.is_inactive());
    }

    #[test]
    fn test_update_driver_inactive_override() {
        let mut store = open_store();
        let updated = store
            .update_driver(
                "Bob",
                DriverUpdate {
                    inactive: Some(true),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.status(), DriverStatus::Inactive);

        let cleared = store
            .update_driver(
                "Bob",
                DriverUpdate {
                    inactive: Some(false),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(cleared.status(), DriverStatus::Active);
    }

    #[test]
    fn test_update_and_remove_unknown_driver() {
        let mut store = open_store();
        assert_eq!(
            store.update_driver("Zed", DriverUpdate::default()).unwrap_err(),
            TournamentError::driver_not_found("Zed")
        );
        assert_eq!(
            store.remove_driver("Zed").unwrap_err(),
            TournamentError::driver_not_found("Zed")
        );
    }

    #[test]
    fn test_remove_driver() {
        let mut store = open_store();
        let removed = store.remove_driver("Bob").unwrap();
        assert_eq!(removed.name(), "Bob");
        assert_eq!(store.driver_count(), 2);
        assert!(!store.contains_driver("Bob"));
    }

    #[test]
    fn test_divisions_registered_and_derived() {
        let mut store = DriverRecordStore::with_divisions(["OPEN"], DivisionPolicy::Open);
        store.add_driver("Alice", "Pro").unwrap();
        store.create_division("Empty").unwrap();

        let divisions = store.list_divisions();
        let names: Vec<&str> = divisions.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["OPEN", "Empty", "Pro"]);
        assert_eq!(divisions[0].drivers, 0);
        assert_eq!(divisions[2].drivers, 1);
        assert_eq!(divisions[2].active_drivers, 1);

        assert!(matches!(
            store.create_division("OPEN"),
            Err(TournamentError::Conflict { .. })
        ));
        assert!(store.knows_division("pro"));
        assert!(!store.knows_division("Street"));
    }

    #[test]
    fn test_snapshot_restores_state() {
        let mut store = open_store();
        store.driver_mut("Alice").unwrap().record_result(1, true);
        store.driver_mut("Bob").unwrap().record_result(1, false);
        store.next_race_number();

        let snapshot = store.snapshot();
        let restored = DriverRecordStore::from_snapshot(snapshot, DivisionPolicy::Open).unwrap();

        assert_eq!(restored.driver_count(), 3);
        assert_eq!(restored.get_driver("Alice").unwrap().wins(), 1);
        assert_eq!(restored.get_driver("Bob").unwrap().losses(), 1);
        assert_eq!(restored.race_counter(), 1);
    }

    #[test]
    fn test_snapshot_with_duplicates_is_rejected() {
        let mut snapshot = open_store().snapshot();
        snapshot.drivers.push(Driver::new("Alice", "Street"));
        assert_eq!(
            DriverRecordStore::from_snapshot(snapshot, DivisionPolicy::Open).unwrap_err(),
            TournamentError::driver_conflict("Alice")
        );
    }

    #[test]
    fn test_snapshot_with_overflowing_counters_is_rejected() {
        let mut snapshot = open_store().snapshot();
        snapshot.drivers[0].wins = u32::MAX;
        snapshot.drivers[0].losses = 1;

        let err = DriverRecordStore::from_snapshot(snapshot, DivisionPolicy::Open).unwrap_err();
        assert!(matches!(err, TournamentError::Validation { .. }));
    }
}
