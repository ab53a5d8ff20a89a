use thiserror::Error;

/// Core error types for fwscope
#[derive(Debug, Error)]
pub enum Error {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// CSV serialization failed while writing the result table
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The rules file could not be turned into tables
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    /// A column the matcher depends on is absent from a table
    #[error("Table '{table}' has no '{column}' column")]
    MissingColumn { table: String, column: String },
}

/// Loader-specific errors
///
/// Every variant is fatal for the invocation: the caller has to supply a
/// different file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Cannot read {path}: {source}")]
    Unreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported file type: {0} (expected .xlsx, .xlsm, .xlsb, .xls, .ods or .csv)")]
    UnsupportedFormat(String),

    #[error("Spreadsheet could not be parsed: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("CSV could not be parsed: {0}")]
    Csv(#[from] csv::Error),

    #[error("No '{wanted}' sheet found (sheets present: {})", .available.join(", "))]
    MissingSheet {
        wanted: String,
        available: Vec<String>,
    },

    #[error("Sheet '{0}' is empty (no header row)")]
    EmptySheet(String),
}

/// Why a single address token did not become a network
///
/// Returned as a value by [`crate::core::network::parse_network`] and folded
/// by the matcher according to its skip policy. Never propagated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{token}' is not an IP address or network: {reason}")]
pub struct AddressParseError {
    pub token: String,
    pub reason: AddressParseReason,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressParseReason {
    #[error("empty value")]
    Empty,

    #[error("invalid address '{0}'")]
    InvalidAddress(String),

    #[error("invalid prefix length '{0}'")]
    InvalidPrefix(String),

    #[error("invalid netmask '{0}'")]
    InvalidNetmask(String),

    #[error("prefix /{prefix} is out of range for this address family")]
    PrefixOutOfRange { prefix: u8 },
}

impl AddressParseError {
    pub fn new(token: impl Into<String>, reason: AddressParseReason) -> Self {
        Self {
            token: token.into(),
            reason,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
