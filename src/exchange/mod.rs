//! Tabular exchange: CSV and spreadsheet results export, roster import

pub mod csv;
pub mod import;
pub mod xlsx;

pub use self::csv::{export_csv, parse_csv, CSV_HEADERS};
pub use import::{
    import_bytes, import_sheets, HeaderMode, ImportFormat, ImportOptions, ImportReport, SkippedRow,
    TabularSheet,
};
pub use xlsx::{export_xlsx, parse_xlsx, XLSX_HEADERS};
