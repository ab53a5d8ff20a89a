//! Matched-rule export
//!
//! Serializes a result [`Table`] for download: CSV with a header row and no
//! index column, or a JSON array of objects keyed by column name. An empty
//! table still produces a valid document (header-only CSV, `[]` JSON).

use crate::core::error::{Error, Result};
use crate::core::table::Table;
use std::io::Write;
use std::path::Path;

/// Default file name for the CSV artifact
pub const CSV_FILE_NAME: &str = "customer_matched_rules.csv";
/// MIME type of the CSV artifact
pub const CSV_MIME: &str = "text/csv";

/// Output formats for matched rules
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    serde::Serialize,
    serde::Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum ExportFormat {
    #[default]
    #[strum(serialize = "csv")]
    Csv,
    #[strum(serialize = "json")]
    Json,
}

impl ExportFormat {
    pub const fn mime(self) -> &'static str {
        match self {
            ExportFormat::Csv => CSV_MIME,
            ExportFormat::Json => "application/json",
        }
    }

    pub const fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }

    /// Serializes a table in this format.
    pub fn render(self, table: &Table) -> Result<Vec<u8>> {
        match self {
            ExportFormat::Csv => to_csv(table),
            ExportFormat::Json => to_json(table),
        }
    }
}

/// Serializes a table as UTF-8 CSV with a header row.
///
/// # Examples
///
/// ```
/// use fwscope::core::export::to_csv;
/// use fwscope::core::table::Table;
///
/// let mut table = Table::new("matched", vec!["Source".into(), "Comment".into()]);
/// table.push_row(vec!["10.0.0.0/24".into(), "web, public".into()]);
///
/// let csv = String::from_utf8(to_csv(&table).unwrap()).unwrap();
/// assert_eq!(csv, "Source,Comment\n10.0.0.0/24,\"web, public\"\n");
/// ```
pub fn to_csv(table: &Table) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer.write_record(&table.columns)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }

    writer
        .into_inner()
        .map_err(|e| Error::Io(e.into_error()))
}

/// Serializes a table as a pretty-printed JSON array of row objects.
///
/// Object keys follow column order. Repeated column names keep the first
/// occurrence's value.
pub fn to_json(table: &Table) -> Result<Vec<u8>> {
    let rows: Vec<serde_json::Map<String, serde_json::Value>> = table
        .rows
        .iter()
        .map(|row| {
            let mut object = serde_json::Map::new();
            for (column, cell) in table.columns.iter().zip(row) {
                if !object.contains_key(column) {
                    object.insert(column.clone(), serde_json::Value::String(cell.clone()));
                }
            }
            object
        })
        .collect();

    let mut bytes = serde_json::to_vec_pretty(&rows)?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Writes bytes to `path` atomically.
///
/// 1. Writes to a temporary file in the destination directory.
/// 2. Flushes it to disk.
/// 3. Renames it over the target path.
///
/// A reader never observes a half-written artifact.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut temp = tempfile::NamedTempFile::new_in(dir)?;
    temp.write_all(bytes)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| {
        if e.error.kind() == std::io::ErrorKind::StorageFull {
            Error::Io(std::io::Error::new(
                std::io::ErrorKind::StorageFull,
                "Disk full: cannot write matched rules. Free up space and try again.",
            ))
        } else {
            Error::Io(e.error)
        }
    })?;

    tracing::info!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}
