//! Utility functions for the tournament service

use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use uuid::Uuid;

/// Generate a new unique race ID
pub fn generate_race_id() -> Uuid {
    Uuid::new_v4()
}

/// Get the current UTC timestamp
pub fn current_timestamp() -> DateTime<Utc> {
    Utc::now()
}

/// Wins over total races, 0 when no races were run
pub fn win_ratio(wins: u32, losses: u32) -> f64 {
    let total = u64::from(wins) + u64::from(losses);
    if total == 0 {
        0.0
    } else {
        wins as f64 / total as f64
    }
}

/// Compare two win ratios exactly, without going through floating point
pub fn compare_win_ratio(a: (u32, u32), b: (u32, u32)) -> Ordering {
    let (a_wins, a_total) = (u128::from(a.0), u128::from(a.0) + u128::from(a.1));
    let (b_wins, b_total) = (u128::from(b.0), u128::from(b.0) + u128::from(b.1));

    // A driver without races sits at ratio 0, same as a driver with only losses
    let a_num = if a_total == 0 { 0 } else { a_wins };
    let b_num = if b_total == 0 { 0 } else { b_wins };
    let a_den = a_total.max(1);
    let b_den = b_total.max(1);

    (a_num * b_den).cmp(&(b_num * a_den))
}

/// Format a win ratio for tabular export
pub fn format_ratio(ratio: f64) -> String {
    format!("{:.3}", ratio)
}

/// Normalize a user-supplied driver or division label
pub fn normalize_label(label: &str) -> String {
    label.trim().to_string()
}

/// Whether a cell looks like a division code such as `4X4_V8_PETROL`
pub fn looks_like_division_token(cell: &str) -> bool {
    let cell = cell.trim();
    !cell.is_empty()
        && cell
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}

/// Attachment file name for result exports, e.g. `Drag Race Results 2024-05-01.csv`
pub fn export_filename(extension: &str) -> String {
    format!(
        "Drag Race Results {}.{}",
        current_timestamp().format("%Y-%m-%d"),
        extension
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_unique_ids() {
        let id1 = generate_race_id();
        let id2 = generate_race_id();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_win_ratio() {
        assert_eq!(win_ratio(0, 0), 0.0);
        assert_eq!(win_ratio(0, 3), 0.0);
        assert_eq!(win_ratio(2, 0), 1.0);
        assert_eq!(win_ratio(1, 1), 0.5);
    }

    #[test]
    fn test_compare_win_ratio() {
        assert_eq!(compare_win_ratio((1, 1), (2, 2)), Ordering::Equal);
        assert_eq!(compare_win_ratio((2, 1), (1, 1)), Ordering::Greater);
        assert_eq!(compare_win_ratio((0, 0), (0, 4)), Ordering::Equal);
        assert_eq!(compare_win_ratio((0, 0), (1, 9)), Ordering::Less);
        assert_eq!(compare_win_ratio((1, 2), (2, 4)), Ordering::Equal);
        assert_eq!(
            compare_win_ratio((u32::MAX, u32::MAX), (1, 1)),
            Ordering::Equal
        );
    }

    #[test]
    fn test_division_token_detection() {
        assert!(looks_like_division_token("4X4_V8_PETROL"));
        assert!(looks_like_division_token("DAMES"));
        assert!(!looks_like_division_token("Division"));
        assert!(!looks_like_division_token("Pro Stock"));
        assert!(!looks_like_division_token("  "));
    }

    #[test]
    fn test_export_filename() {
        let name = export_filename("csv");
        assert!(name.starts_with("Drag Race Results "));
        assert!(name.ends_with(".csv"));
    }
}
