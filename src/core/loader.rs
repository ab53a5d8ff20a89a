//! Rule file loading
//!
//! Reads a firewall export into a rules [`Table`] and, when the export has
//! one, an address group [`Table`].
//!
//! Spreadsheets (`.xlsx`, `.xlsm`, `.xlsb`, `.xls`, `.ods`) are read with
//! calamine. The rules come from the `Firewall Policy` sheet, or from the only
//! sheet of a single-sheet workbook. An `Address Group` sheet is optional.
//! A `.csv` file is a rules table on its own.
//!
//! The first row of each sheet is the header. Fully blank rows are skipped.
//! Column names are not checked here; a missing `Source` column is reported
//! by the matcher.

use crate::core::error::{LoadError, Result};
use crate::core::groups::AddressGroups;
use crate::core::table::Table;
use calamine::{Data, Reader, Sheets};
use std::io::{Cursor, Read, Seek};
use std::path::Path;

pub const POLICY_SHEET: &str = "Firewall Policy";
pub const GROUP_SHEET: &str = "Address Group";

/// Input file families the loader understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(ascii_case_insensitive)]
pub enum InputFormat {
    #[strum(
        to_string = "spreadsheet",
        serialize = "xlsx",
        serialize = "xlsm",
        serialize = "xlsb",
        serialize = "xls",
        serialize = "ods"
    )]
    Spreadsheet,
    #[strum(serialize = "csv")]
    Csv,
}

impl InputFormat {
    /// Picks the format from a file extension (case-insensitive).
    pub fn from_path(path: &Path) -> std::result::Result<Self, LoadError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        ext.parse()
            .map_err(|_| LoadError::UnsupportedFormat(path.display().to_string()))
    }
}

/// Sheet names to read from a workbook
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetNames {
    pub policy: String,
    pub groups: String,
}

impl Default for SheetNames {
    fn default() -> Self {
        Self {
            policy: POLICY_SHEET.to_string(),
            groups: GROUP_SHEET.to_string(),
        }
    }
}

/// Tables read from one input file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedTables {
    pub rules: Table,
    pub address_groups: Option<Table>,
}

impl LoadedTables {
    /// Indexes the address group table, if there is one.
    ///
    /// # Errors
    ///
    /// Fails when the group table lacks its `Group Name` or `Members` column.
    pub fn groups(&self) -> Result<Option<AddressGroups>> {
        self.address_groups
            .as_ref()
            .map(AddressGroups::from_table)
            .transpose()
    }
}

/// Loads a rules file from disk using the default sheet names.
pub fn load(path: &Path) -> Result<LoadedTables> {
    load_with(path, &SheetNames::default())
}

/// Loads a rules file from disk.
///
/// # Errors
///
/// Returns [`LoadError`] when the file cannot be read, has an unknown
/// extension, is not a valid spreadsheet/CSV, or has no rules sheet.
pub fn load_with(path: &Path, sheets: &SheetNames) -> Result<LoadedTables> {
    let format = InputFormat::from_path(path)?;
    let bytes = std::fs::read(path).map_err(|source| LoadError::Unreadable {
        path: path.display().to_string(),
        source,
    })?;
    tracing::info!("Loading {} ({} bytes) as {}", path.display(), bytes.len(), format);

    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(POLICY_SHEET);
    load_bytes_named(bytes, format, sheets, name)
}

/// Loads a rules file that is already in memory.
pub fn load_bytes(bytes: Vec<u8>, format: InputFormat, sheets: &SheetNames) -> Result<LoadedTables> {
    load_bytes_named(bytes, format, sheets, POLICY_SHEET)
}

fn load_bytes_named(
    bytes: Vec<u8>,
    format: InputFormat,
    sheets: &SheetNames,
    csv_name: &str,
) -> Result<LoadedTables> {
    let tables = match format {
        InputFormat::Csv => LoadedTables {
            rules: read_csv(csv_name, bytes.as_slice())?,
            address_groups: None,
        },
        InputFormat::Spreadsheet => {
            let workbook =
                calamine::open_workbook_auto_from_rs(Cursor::new(bytes)).map_err(LoadError::from)?;
            read_workbook(workbook, sheets)?
        }
    };

    tracing::info!(
        "Loaded {} rules{}",
        tables.rules.len(),
        tables
            .address_groups
            .as_ref()
            .map(|g| format!(" and {} address group rows", g.len()))
            .unwrap_or_default()
    );
    Ok(tables)
}

fn read_workbook<RS: Read + Seek>(
    mut workbook: Sheets<RS>,
    sheets: &SheetNames,
) -> std::result::Result<LoadedTables, LoadError> {
    let available = workbook.sheet_names();

    let policy_name = if available.iter().any(|s| *s == sheets.policy) {
        sheets.policy.clone()
    } else if let [only] = available.as_slice() {
        tracing::debug!("No '{}' sheet, using sole sheet '{}'", sheets.policy, only);
        only.clone()
    } else {
        return Err(LoadError::MissingSheet {
            wanted: sheets.policy.clone(),
            available,
        });
    };

    let rules = read_sheet(&mut workbook, &policy_name)?;
    let address_groups = if policy_name != sheets.groups && available.contains(&sheets.groups) {
        Some(read_sheet(&mut workbook, &sheets.groups)?)
    } else {
        None
    };

    Ok(LoadedTables {
        rules,
        address_groups,
    })
}

fn read_sheet<RS: Read + Seek>(
    workbook: &mut Sheets<RS>,
    name: &str,
) -> std::result::Result<Table, LoadError> {
    let range = workbook.worksheet_range(name)?;
    let mut rows = range.rows();

    let header = rows
        .next()
        .ok_or_else(|| LoadError::EmptySheet(name.to_string()))?;
    let mut table = Table::new(name, header_names(header.iter().map(cell_text)));

    for row in rows {
        let cells: Vec<String> = row.iter().map(cell_text).collect();
        if cells.iter().all(String::is_empty) {
            continue;
        }
        table.push_row(cells);
    }
    Ok(table)
}

fn read_csv<R: Read>(name: &str, reader: R) -> std::result::Result<Table, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let header = reader.headers()?.clone();
    let mut table = Table::new(name, header_names(header.iter().map(str::to_string)));

    for result in reader.records() {
        let record = result?;
        if record.iter().all(|c| c.trim().is_empty()) {
            continue;
        }
        table.push_row(record.iter().map(str::to_string).collect());
    }
    Ok(table)
}

/// Header cells, with blank ones named `Unnamed: <position>`.
fn header_names(cells: impl Iterator<Item = String>) -> Vec<String> {
    cells
        .enumerate()
        .map(|(i, c)| {
            let c = c.trim();
            if c.is_empty() {
                format!("Unnamed: {i}")
            } else {
                c.to_string()
            }
        })
        .collect()
}

/// Renders a spreadsheet cell as text.
///
/// Whole-number floats lose their `.0` so that numeric cells such as port
/// numbers read the way they were typed.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => (*f as i64).to_string(),
        other => other.to_string(),
    }
}
