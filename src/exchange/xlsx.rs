//! Spreadsheet export (one worksheet per division) and spreadsheet parsing

use crate::error::{Result, TournamentError};
use crate::exchange::import::TabularSheet;
use crate::ranking::rankings;
use crate::store::DriverRecordStore;
use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use std::collections::HashSet;
use std::io::Cursor;

/// Column headers of each division worksheet
pub const XLSX_HEADERS: [&str; 7] = [
    "Name",
    "Division",
    "Wins",
    "Losses",
    "Total Races",
    "Win Ratio",
    "Status",
];

const MAX_SHEET_NAME: usize = 31;

/// Build a workbook with one worksheet per division that has drivers
pub fn export_xlsx(store: &DriverRecordStore) -> Result<Vec<u8>> {
    build_workbook(store)
        .map_err(|e| TournamentError::export(format!("Failed to build workbook: {}", e)))
}

fn build_workbook(store: &DriverRecordStore) -> std::result::Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let percent = Format::new().set_num_format("0.0%");

    let mut divisions = store.division_names();
    divisions.sort();

    let mut used_names = HashSet::new();
    for division in divisions {
        let standings = rankings(store, Some(&division));
        if standings.is_empty() {
            continue;
        }

        let worksheet = workbook.add_worksheet();
        worksheet.set_name(unique_sheet_name(&division, &mut used_names))?;
        for (col, title) in XLSX_HEADERS.iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, *title, &header)?;
        }

        for (index, standing) in standings.iter().enumerate() {
            let row = index as u32 + 1;
            worksheet.write_string(row, 0, standing.name.as_str())?;
            worksheet.write_string(row, 1, standing.division.as_str())?;
            worksheet.write_number(row, 2, standing.wins)?;
            worksheet.write_number(row, 3, standing.losses)?;
            worksheet.write_number(row, 4, standing.total_races)?;
            worksheet.write_number_with_format(row, 5, standing.win_ratio, &percent)?;
            worksheet.write_string(row, 6, standing.status.as_str())?;
        }
    }

    if used_names.is_empty() {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name("Results")?;
        for (col, title) in XLSX_HEADERS.iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, *title, &header)?;
        }
    }

    workbook.save_to_buffer()
}

/// Excel limits worksheet names to 31 characters and forbids `[]:*?/\`
fn unique_sheet_name(division: &str, used: &mut HashSet<String>) -> String {
    let base: String = division
        .chars()
        .map(|c| match c {
            '[' | ']' | ':' | '*' | '?' | '/' | '\\' => '_',
            other => other,
        })
        .take(MAX_SHEET_NAME)
        .collect();
    let base = if base.trim().is_empty() {
        "Division".to_string()
    } else {
        base
    };

    let mut candidate = base.clone();
    let mut suffix = 2;
    while !used.insert(candidate.to_lowercase()) {
        let tag = format!("~{}", suffix);
        let keep = MAX_SHEET_NAME.saturating_sub(tag.len());
        candidate = format!("{}{}", base.chars().take(keep).collect::<String>(), tag);
        suffix += 1;
    }
    candidate
}

/// Read every worksheet of an `.xlsx` document into named sheets
pub fn parse_xlsx(data: &[u8]) -> Result<Vec<TabularSheet>> {
    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(data))
        .map_err(|e| TournamentError::import(format!("Error reading Excel file: {}", e)))?;

    let mut sheets = Vec::new();
    for sheet_name in workbook.sheet_names() {
        let range = workbook.worksheet_range(&sheet_name).map_err(|e| {
            TournamentError::import(format!("Error reading sheet '{}': {}", sheet_name, e))
        })?;
        // The range starts at the first used cell, not at A1
        let first_row = range.start().map_or(0, |(row, _)| row as usize);
        let rows = range
            .rows()
            .enumerate()
            .map(|(i, row)| (first_row + i + 1, row.iter().map(cell_text).collect::<Vec<_>>()));
        sheets.push(TabularSheet::with_row_numbers(Some(sheet_name), rows));
    }

    Ok(sheets)
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) if f.fract() == 0.0 => format!("{}", *f as i64),
        other => other.to_string().trim().to_string(),
    }
}
