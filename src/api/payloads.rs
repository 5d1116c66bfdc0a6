//! Request and response bodies of the HTTP API
//!
//! Loosely-typed payloads are converted into core types here, before any
//! handler touches the application state.

use crate::error::{Result, TournamentError};
use crate::exchange::HeaderMode;
use crate::race::RecordRaceCommand;
use crate::ranking::StandingsFilter;
use crate::types::RaceKind;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateDriverRequest {
    pub name: String,
    pub division: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateDivisionRequest {
    pub name: String,
}

/// Race submission
///
/// Accepts either a `participants` list or the `driver1`/`driver2`/`driver3`
/// fields, optionally with a `race_type` that must match the driver count.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RaceRequest {
    #[serde(default)]
    pub participants: Option<Vec<String>>,
    #[serde(default)]
    pub driver1: Option<String>,
    #[serde(default)]
    pub driver2: Option<String>,
    #[serde(default)]
    pub driver3: Option<String>,
    pub winner: String,
    #[serde(default)]
    pub race_type: Option<RaceKind>,
}

impl TryFrom<RaceRequest> for RecordRaceCommand {
    type Error = TournamentError;

    fn try_from(request: RaceRequest) -> Result<Self> {
        let participants = match request.participants {
            Some(list) => list,
            None => [request.driver1, request.driver2, request.driver3]
                .into_iter()
                .flatten()
                .filter(|name| !name.trim().is_empty())
                .collect(),
        };

        let command = RecordRaceCommand::new(participants, &request.winner)?;
        match request.race_type {
            Some(kind) if kind != command.kind() => Err(TournamentError::validation(format!(
                "A {} race needs {} drivers, got {}",
                kind,
                expected_drivers(kind),
                command.participants().len()
            ))),
            _ => Ok(command),
        }
    }
}

fn expected_drivers(kind: RaceKind) -> usize {
    match kind {
        RaceKind::Regular => 2,
        RaceKind::Championship => 3,
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DivisionQuery {
    #[serde(default)]
    pub division: Option<String>,
}

impl DivisionQuery {
    /// Blank `?division=` means no filter
    pub fn division(&self) -> Option<&str> {
        self.division
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RankingsQuery {
    #[serde(default)]
    pub division: Option<String>,
    #[serde(default)]
    pub filter: StandingsFilter,
}

impl RankingsQuery {
    pub fn division(&self) -> Option<&str> {
        self.division
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImportQuery {
    #[serde(default)]
    pub header: HeaderMode,
}

/// Plain acknowledgement for operations without a natural result body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ack {
    pub success: bool,
    pub message: String,
}

impl Ack {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(json: serde_json::Value) -> RaceRequest {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_participants_list() {
        let command = RecordRaceCommand::try_from(request(serde_json::json!({
            "participants": ["A", "B", "C"],
            "winner": "C"
        })))
        .unwrap();
        assert_eq!(command.kind(), RaceKind::Championship);
    }

    #[test]
    fn test_numbered_driver_fields() {
        let command = RecordRaceCommand::try_from(request(serde_json::json!({
            "driver1": "A",
            "driver2": "B",
            "driver3": "",
            "winner": "B",
            "race_type": "regular"
        })))
        .unwrap();
        assert_eq!(command.participants(), ["A".to_string(), "B".to_string()]);
        assert_eq!(command.winner(), "B");
    }

    #[test]
    fn test_race_type_must_match_count() {
        let err = RecordRaceCommand::try_from(request(serde_json::json!({
            "driver1": "A",
            "driver2": "B",
            "winner": "A",
            "race_type": "championship"
        })))
        .unwrap_err();
        assert_eq!(
            err,
            TournamentError::validation("A championship race needs 3 drivers, got 2")
        );
    }

    #[test]
    fn test_blank_division_query_is_unfiltered() {
        let query = DivisionQuery {
            division: Some("  ".to_string()),
        };
        assert_eq!(query.division(), None);
    }
}
