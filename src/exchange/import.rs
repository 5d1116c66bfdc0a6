//! Roster import from tabular input
//!
//! Rows are `(name, division)` pairs. Each row goes through
//! [`DriverRecordStore::add_driver`]; a row that fails is reported and the
//! import carries on with the next one.

use crate::error::{Result, TournamentError};
use crate::exchange::csv::parse_csv;
use crate::exchange::xlsx::parse_xlsx;
use crate::store::DriverRecordStore;
use crate::utils::looks_like_division_token;
use serde::{Deserialize, Serialize};

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// One worksheet (or a whole CSV document) of trimmed cells
#[derive(Debug, Clone, PartialEq)]
pub struct TabularSheet {
    /// Worksheet name; CSV input has none
    pub name: Option<String>,
    /// Non-empty rows with trailing empty cells removed
    pub rows: Vec<Vec<String>>,
    /// 1-based position of each kept row in the source document
    pub row_numbers: Vec<usize>,
}

impl TabularSheet {
    /// Sheet whose rows are numbered consecutively from 1
    pub fn new(name: Option<String>, rows: Vec<Vec<String>>) -> Self {
        Self::with_row_numbers(name, rows.into_iter().enumerate().map(|(i, r)| (i + 1, r)))
    }

    /// Sheet from rows paired with their source row numbers
    pub fn with_row_numbers<I>(name: Option<String>, rows: I) -> Self
    where
        I: IntoIterator<Item = (usize, Vec<String>)>,
    {
        let (row_numbers, rows): (Vec<usize>, Vec<Vec<String>>) = rows
            .into_iter()
            .map(|(number, mut cells)| {
                while cells.last().is_some_and(|c| c.trim().is_empty()) {
                    cells.pop();
                }
                (number, cells)
            })
            .filter(|(_, cells)| !cells.is_empty())
            .unzip();
        Self {
            name: name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
            rows,
            row_numbers,
        }
    }

    /// Kept rows with their source row numbers
    pub fn numbered_rows(&self) -> impl Iterator<Item = (usize, &[String])> {
        self.row_numbers
            .iter()
            .copied()
            .zip(self.rows.iter().map(Vec::as_slice))
    }
}

/// How the first row of each sheet is treated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderMode {
    /// Header when the second cell does not look like a division
    #[default]
    Auto,
    Present,
    Absent,
}

/// Tabular input formats accepted by the importer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportFormat {
    Csv,
    Xlsx,
}

impl ImportFormat {
    /// Spreadsheets are ZIP containers; anything else is read as CSV
    pub fn detect(data: &[u8]) -> Self {
        if data.starts_with(ZIP_MAGIC) {
            ImportFormat::Xlsx
        } else {
            ImportFormat::Csv
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportOptions {
    #[serde(default)]
    pub header: HeaderMode,
}

/// A row that was not imported
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedRow {
    pub sheet: Option<String>,
    /// 1-based row number within its sheet
    pub row: usize,
    pub name: String,
    pub reason: String,
}

/// Outcome of an import
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportReport {
    pub format: Option<ImportFormat>,
    pub added: Vec<String>,
    pub skipped: Vec<SkippedRow>,
}

impl ImportReport {
    pub fn message(&self) -> String {
        format!(
            "Imported {} drivers, skipped {} rows",
            self.added.len(),
            self.skipped.len()
        )
    }
}

/// Parse raw bytes (CSV or XLSX) and add every row to the store
pub fn import_bytes(
    store: &mut DriverRecordStore,
    data: &[u8],
    options: ImportOptions,
) -> Result<ImportReport> {
    if data.is_empty() {
        return Err(TournamentError::import("No file uploaded"));
    }

    let format = ImportFormat::detect(data);
    let sheets = match format {
        ImportFormat::Xlsx => parse_xlsx(data)?,
        ImportFormat::Csv => vec![parse_csv(data)?],
    };

    let mut report = import_sheets(store, &sheets, options);
    report.format = Some(format);
    Ok(report)
}

/// Add the rows of already-parsed sheets to the store
pub fn import_sheets(
    store: &mut DriverRecordStore,
    sheets: &[TabularSheet],
    options: ImportOptions,
) -> ImportReport {
    let mut report = ImportReport::default();

    for sheet in sheets {
        let Some(first) = sheet.rows.first() else {
            continue;
        };

        let has_header = match options.header {
            HeaderMode::Present => true,
            HeaderMode::Absent => false,
            HeaderMode::Auto => is_header_row(store, first),
        };
        let (name_col, division_col) = if has_header {
            header_columns(first, sheet.name.is_some())
        } else {
            (0, Some(1))
        };
        let skip = usize::from(has_header);

        for (row, cells) in sheet.numbered_rows().skip(skip) {
            let name = cells.get(name_col).map(String::as_str).unwrap_or("").trim();
            if name.is_empty() {
                continue;
            }

            let division = division_col
                .and_then(|col| cells.get(col))
                .map(|d| d.trim())
                .filter(|d| !d.is_empty())
                .or(sheet.name.as_deref());

            let outcome = match division {
                Some(division) => store.add_driver(name, division),
                None => Err(TournamentError::validation("Missing division")),
            };

            match outcome {
                Ok(driver) => report.added.push(driver.name().to_string()),
                Err(e) => report.skipped.push(SkippedRow {
                    sheet: sheet.name.clone(),
                    row,
                    name: name.to_string(),
                    reason: e.to_string(),
                }),
            }
        }
    }

    report
}

/// A first row is a header when its second cell is not a recognizable division
fn is_header_row(store: &DriverRecordStore, cells: &[String]) -> bool {
    match cells.get(1) {
        Some(second) => !(store.knows_division(second) || looks_like_division_token(second)),
        None => cells[0].eq_ignore_ascii_case("name"),
    }
}

/// Locate name and division columns by header title
///
/// A titled sheet whose header names a `Name` column but no `Division` column
/// takes its division from the sheet name.
fn header_columns(header: &[String], sheet_named: bool) -> (usize, Option<usize>) {
    let find = |title: &str| header.iter().position(|c| c.trim().eq_ignore_ascii_case(title));
    match (find("name"), find("division")) {
        (Some(name), Some(division)) => (name, Some(division)),
        (Some(name), None) if sheet_named => (name, None),
        (Some(name), None) => (name, Some(if name == 1 { 0 } else { 1 })),
        (None, Some(division)) => (if division == 0 { 1 } else { 0 }, Some(division)),
        (None, None) => (0, Some(1)),
    }
}
