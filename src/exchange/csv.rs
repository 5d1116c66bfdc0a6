//! CSV export of results and CSV parsing for roster import

use crate::error::{Result, TournamentError};
use crate::exchange::import::TabularSheet;
use crate::ranking::rankings;
use crate::store::DriverRecordStore;
use crate::utils::format_ratio;

/// Column headers of the CSV results export
pub const CSV_HEADERS: [&str; 6] =
    ["Name", "Division", "Wins", "Losses", "Status", "Win Ratio"];

/// Serialize every driver, in ranking order, as CSV
pub fn export_csv(store: &DriverRecordStore) -> Result<Vec<u8>> {
    let mut writer = ::csv::Writer::from_writer(Vec::new());

    writer
        .write_record(CSV_HEADERS)
        .map_err(|e| TournamentError::export(format!("Failed to write CSV header: {}", e)))?;

    for standing in rankings(store, None) {
        let wins = standing.wins.to_string();
        let losses = standing.losses.to_string();
        let ratio = format_ratio(standing.win_ratio);
        writer
            .write_record([
                standing.name.as_str(),
                standing.division.as_str(),
                wins.as_str(),
                losses.as_str(),
                standing.status.as_str(),
                ratio.as_str(),
            ])
            .map_err(|e| {
                TournamentError::export(format!(
                    "Failed to write row for {}: {}",
                    standing.name, e
                ))
            })?;
    }

    writer
        .into_inner()
        .map_err(|e| TournamentError::export(format!("Failed to flush CSV output: {}", e)))
}

/// Parse CSV bytes into a single unnamed sheet of trimmed cells
pub fn parse_csv(data: &[u8]) -> Result<TabularSheet> {
    let mut reader = ::csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(::csv::Trim::All)
        .from_reader(data);

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record.map_err(|e| {
            TournamentError::import(format!("Malformed CSV at row {}: {}", index + 1, e))
        })?;
        let line = record
            .position()
            .map_or(index + 1, |pos| pos.line() as usize);
        let cells: Vec<String> = record.iter().map(str::to_string).collect();
        rows.push((line, cells));
    }

    Ok(TabularSheet::with_row_numbers(None, rows))
}
