//! Race recorder: validates one race outcome and applies it to the store
//!
//! Every check runs before the first counter changes, so a rejected race
//! leaves the store exactly as it was.

use crate::error::{Result, TournamentError};
use crate::race::command::RecordRaceCommand;
use crate::store::DriverRecordStore;
use crate::types::{DriverStatus, DriverSummary, Race, RaceResult};
use crate::utils::{current_timestamp, generate_race_id};

/// Applies validated race commands to a driver record store
#[derive(Debug, Clone, Copy, Default)]
pub struct RaceRecorder;

impl RaceRecorder {
    pub fn new() -> Self {
        Self
    }

    /// Validate against the store, then apply the outcome
    pub fn apply(
        &self,
        store: &mut DriverRecordStore,
        command: &RecordRaceCommand,
    ) -> Result<RaceResult> {
        let division = Self::validate(store, command)?;

        let participants = command.participants();
        let winner = command.winner();
        let race_number = store.next_race_number();
        let mut newly_eliminated = Vec::new();

        for name in participants {
            let driver = store.driver_mut(name)?;
            let before = driver.status();
            driver.record_result(race_number, name == winner);
            if before != DriverStatus::Eliminated && driver.status() == DriverStatus::Eliminated {
                newly_eliminated.push(name.clone());
            }
        }

        let race = Race {
            id: generate_race_id(),
            race_number,
            kind: command.kind(),
            participants: participants.to_vec(),
            winner: winner.to_string(),
            division,
            timestamp: current_timestamp(),
        };
        store.append_race(race.clone());

        let participants = participants
            .iter()
            .map(|name| store.get_driver(name).map(DriverSummary::from))
            .collect::<Result<Vec<_>>>()?;

        Ok(RaceResult {
            message: format!("Race {}: {} wins!", race.race_number, race.winner),
            race,
            participants,
            newly_eliminated,
        })
    }

    /// Check participants exist, share one division and are still racing.
    /// Returns the shared division.
    fn validate(store: &DriverRecordStore, command: &RecordRaceCommand) -> Result<String> {
        command.check()?;

        let drivers = command
            .participants()
            .iter()
            .map(|name| store.get_driver(name))
            .collect::<Result<Vec<_>>>()?;

        let division = drivers[0].division();
        if let Some(other) = drivers.iter().find(|d| d.division() != division) {
            return Err(TournamentError::validation(format!(
                "Drivers must be in the same division ('{}' is in {}, '{}' is in {})",
                drivers[0].name(),
                division,
                other.name(),
                other.division()
            )));
        }

        if let Some(out) = drivers.iter().find(|d| !d.is_active()) {
            return Err(TournamentError::validation(format!(
                "Driver '{}' is {} and cannot race",
                out.name(),
                out.status().as_str().to_lowercase()
            )));
        }

        if let Some(full) = drivers.iter().find(|d| d.total_races() == u32::MAX) {
            return Err(TournamentError::validation(format!(
                "Driver '{}' has reached the race counter limit",
                full.name()
            )));
        }

        Ok(division.to_string())
    }
}

/// Record one race given raw participant names and the winner
pub fn record_race<I, S>(
    store: &mut DriverRecordStore,
    participants: I,
    winner: &str,
) -> Result<RaceResult>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let command = RecordRaceCommand::new(participants, winner)?;
    RaceRecorder::new().apply(store, &command)
}
