//! Tournament configuration: seeded divisions and the division policy

use crate::types::DivisionPolicy;
use serde::{Deserialize, Serialize};

/// Divisions registered at startup when none are configured
pub const DEFAULT_DIVISIONS: [&str; 8] = [
    "2X4_4CYL",
    "4X4_4CYL",
    "4X4_6CYL_PETROL",
    "4X4_6CYL_DIESEL",
    "4X4_V8_PETROL",
    "4X4_V8_DIESEL",
    "DAMES",
    "OPEN",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TournamentConfig {
    /// Divisions registered before any driver is added
    pub divisions: Vec<String>,
    /// Whether drivers may use divisions outside the registered list
    pub division_policy: DivisionPolicy,
}

impl Default for TournamentConfig {
    fn default() -> Self {
        Self {
            divisions: DEFAULT_DIVISIONS.iter().map(|d| d.to_string()).collect(),
            division_policy: DivisionPolicy::default(),
        }
    }
}

impl TournamentConfig {
    /// Parse a comma separated division list, dropping blanks
    pub fn parse_divisions(raw: &str) -> Vec<String> {
        raw.split(',')
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_divisions() {
        let config = TournamentConfig::default();
        assert_eq!(config.divisions.len(), 8);
        assert_eq!(config.divisions[0], "2X4_4CYL");
        assert_eq!(config.division_policy, DivisionPolicy::Open);
    }

    #[test]
    fn test_parse_divisions() {
        assert_eq!(
            TournamentConfig::parse_divisions(" PRO, STREET ,,DAMES"),
            vec!["PRO", "STREET", "DAMES"]
        );
        assert!(TournamentConfig::parse_divisions(" , ").is_empty());
    }
}
