//! Common types used throughout the tournament service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for recorded races
pub type RaceId = Uuid;

/// Sequential race number shown to spectators
pub type RaceNumber = u64;

/// Losses at which a driver is knocked out of the tournament
pub const ELIMINATION_THRESHOLD: u32 = 3;

/// Derived standing of a driver in the tournament
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DriverStatus {
    Active,
    Eliminated,
    Inactive,
}

impl DriverStatus {
    /// Status derived from a loss count and the operator override
    pub fn derive(losses: u32, inactive: bool) -> Self {
        if inactive {
            DriverStatus::Inactive
        } else if losses >= ELIMINATION_THRESHOLD {
            DriverStatus::Eliminated
        } else {
            DriverStatus::Active
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DriverStatus::Active => "ACTIVE",
            DriverStatus::Eliminated => "ELIMINATED",
            DriverStatus::Inactive => "INACTIVE",
        }
    }
}

impl std::fmt::Display for DriverStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registered driver with race counters
///
/// Counters are only changed by the race recorder and by snapshot loads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Driver {
    pub(crate) name: String,
    pub(crate) division: String,
    #[serde(default)]
    pub(crate) wins: u32,
    #[serde(default)]
    pub(crate) losses: u32,
    #[serde(default)]
    pub(crate) races: Vec<RaceNumber>,
    #[serde(default)]
    pub(crate) inactive: bool,
}

impl Driver {
    /// Create a driver with no races
    pub fn new(name: impl Into<String>, division: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            division: division.into(),
            wins: 0,
            losses: 0,
            races: Vec::new(),
            inactive: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn division(&self) -> &str {
        &self.division
    }

    pub fn wins(&self) -> u32 {
        self.wins
    }

    pub fn losses(&self) -> u32 {
        self.losses
    }

    /// Race numbers this driver took part in
    pub fn races(&self) -> &[RaceNumber] {
        &self.races
    }

    pub fn is_inactive(&self) -> bool {
        self.inactive
    }

    pub fn total_races(&self) -> u32 {
        self.wins + self.losses
    }

    /// Wins over total races, 0 for a driver who has not raced
    pub fn win_ratio(&self) -> f64 {
        crate::utils::win_ratio(self.wins, self.losses)
    }

    pub fn status(&self) -> DriverStatus {
        DriverStatus::derive(self.losses, self.inactive)
    }

    pub fn is_active(&self) -> bool {
        self.status() == DriverStatus::Active
    }

    pub(crate) fn record_result(&mut self, race_number: RaceNumber, won: bool) {
        self.races.push(race_number);
        if won {
            self.wins += 1;
        } else {
            self.losses += 1;
        }
    }

    pub fn summary(&self) -> DriverSummary {
        DriverSummary::from(self)
    }
}

/// Read view of a driver including derived fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverSummary {
    pub name: String,
    pub division: String,
    pub wins: u32,
    pub losses: u32,
    pub total_races: u32,
    pub win_ratio: f64,
    pub status: DriverStatus,
    pub races: Vec<RaceNumber>,
}

impl From<&Driver> for DriverSummary {
    fn from(driver: &Driver) -> Self {
        Self {
            name: driver.name.clone(),
            division: driver.division.clone(),
            wins: driver.wins,
            losses: driver.losses,
            total_races: driver.total_races(),
            win_ratio: driver.win_ratio(),
            status: driver.status(),
            races: driver.races.clone(),
        }
    }
}

/// Partial update of a driver's identity and status override
///
/// Counters are intentionally absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DriverUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub division: Option<String>,
    #[serde(default)]
    pub inactive: Option<bool>,
}

impl DriverUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.division.is_none() && self.inactive.is_none()
    }
}

/// A division with its derived membership counts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Division {
    pub name: String,
    pub drivers: usize,
    pub active_drivers: usize,
}

/// Whether drivers may reference divisions that were never registered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DivisionPolicy {
    /// Any non-empty label is accepted
    #[default]
    Open,
    /// Only registered divisions are accepted
    Registered,
}

impl std::str::FromStr for DivisionPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "open" => Ok(DivisionPolicy::Open),
            "registered" => Ok(DivisionPolicy::Registered),
            other => Err(format!("unknown division policy: {}", other)),
        }
    }
}

/// Kind of race by number of participants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RaceKind {
    /// Two drivers, one winner and one loser
    Regular,
    /// Three drivers, one winner and two losers
    Championship,
}

impl RaceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RaceKind::Regular => "regular",
            RaceKind::Championship => "championship",
        }
    }
}

impl std::fmt::Display for RaceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immutable entry in the race history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Race {
    pub id: RaceId,
    pub race_number: RaceNumber,
    pub kind: RaceKind,
    pub participants: Vec<String>,
    pub winner: String,
    pub division: String,
    pub timestamp: DateTime<Utc>,
}

impl Race {
    /// Participants other than the winner
    pub fn losers(&self) -> impl Iterator<Item = &str> {
        self.participants
            .iter()
            .map(String::as_str)
            .filter(move |name| *name != self.winner)
    }

    pub fn involves(&self, name: &str) -> bool {
        self.participants.iter().any(|p| p == name)
    }
}

/// Outcome of a successfully recorded race
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaceResult {
    pub race: Race,
    /// Post-race state of every participant, in participant order
    pub participants: Vec<DriverSummary>,
    /// Drivers whose status became Eliminated with this race
    pub newly_eliminated: Vec<String>,
    pub message: String,
}

/// One row of the rankings table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverStanding {
    pub position: usize,
    pub name: String,
    pub division: String,
    pub wins: u32,
    pub losses: u32,
    pub total_races: u32,
    pub win_ratio: f64,
    pub status: DriverStatus,
}

/// Aggregate figures over the whole tournament
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TournamentStats {
    pub total_drivers: usize,
    pub active_drivers: usize,
    pub eliminated_drivers: usize,
    pub inactive_drivers: usize,
    pub total_races: usize,
    pub championship_races: usize,
    pub divisions: usize,
    /// Mean win ratio over drivers with at least one race
    pub average_win_ratio: f64,
    pub average_races_per_driver: f64,
}
