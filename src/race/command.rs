//! Strongly-typed race submission
//!
//! Loosely-typed request payloads are turned into a [`RecordRaceCommand`]
//! before they reach the recorder, so the participant count, distinct
//! names and winner membership are settled by construction.

use crate::error::{Result, TournamentError};
use crate::types::RaceKind;
use crate::utils::normalize_label;
use serde::{Deserialize, Serialize};

/// A validated request to record one race
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase", try_from = "UncheckedCommand")]
pub enum RecordRaceCommand {
    /// Regular two-driver race
    Duel { drivers: [String; 2], winner: String },
    /// Three-driver championship race
    Championship { drivers: [String; 3], winner: String },
}

impl RecordRaceCommand {
    /// Build a command from raw participant names and a winner
    pub fn new<I, S>(participants: I, winner: impl AsRef<str>) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let participants: Vec<String> = participants
            .into_iter()
            .map(|name| normalize_label(name.as_ref()))
            .collect();
        let winner = normalize_label(winner.as_ref());
        check_names(&participants, &winner)?;

        match <[String; 2]>::try_from(participants) {
            Ok(drivers) => Ok(Self::Duel { drivers, winner }),
            Err(participants) => match <[String; 3]>::try_from(participants) {
                Ok(drivers) => Ok(Self::Championship { drivers, winner }),
                Err(participants) => Err(TournamentError::validation(format!(
                    "A race needs 2 or 3 drivers, got {}",
                    participants.len()
                ))),
            },
        }
    }

    pub fn kind(&self) -> RaceKind {
        match self {
            Self::Duel { .. } => RaceKind::Regular,
            Self::Championship { .. } => RaceKind::Championship,
        }
    }

    pub fn participants(&self) -> &[String] {
        match self {
            Self::Duel { drivers, .. } => &drivers[..],
            Self::Championship { drivers, .. } => &drivers[..],
        }
    }

    pub fn winner(&self) -> &str {
        match self {
            Self::Duel { winner, .. } | Self::Championship { winner, .. } => winner,
        }
    }

    /// Re-check the name rules for a command built from its variants directly
    pub(crate) fn check(&self) -> Result<()> {
        check_names(self.participants(), self.winner())
    }
}

fn check_names(participants: &[String], winner: &str) -> Result<()> {
    if participants.iter().any(String::is_empty) {
        return Err(TournamentError::validation(
            "Participant names cannot be empty",
        ));
    }
    for (i, name) in participants.iter().enumerate() {
        if participants[..i].contains(name) {
            return Err(TournamentError::validation(format!(
                "Driver '{}' is listed more than once",
                name
            )));
        }
    }
    if !participants.iter().any(|name| name == winner) {
        return Err(TournamentError::validation(
            "Winner must be one of the racing drivers",
        ));
    }
    Ok(())
}

/// Wire shape of a command before the name rules are applied
#[derive(Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum UncheckedCommand {
    Duel { drivers: [String; 2], winner: String },
    Championship { drivers: [String; 3], winner: String },
}

impl TryFrom<UncheckedCommand> for RecordRaceCommand {
    type Error = TournamentError;

    fn try_from(command: UncheckedCommand) -> Result<Self> {
        match command {
            UncheckedCommand::Duel { drivers, winner } => Self::new(drivers, winner),
            UncheckedCommand::Championship { drivers, winner } => Self::new(drivers, winner),
        }
    }
}
