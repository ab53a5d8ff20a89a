//! fwscope - Customer Firewall Rule Extractor
//!
//! Pulls the firewall policy rules that concern one customer out of a bulk
//! firewall export. The customer is described by a list of IP subnets; a rule
//! is relevant when its source or destination overlaps any of them.
//!
//! # Architecture
//!
//! - [`core`] - Loading, address group expansion, subnet matching and export
//! - [`config`] - Configuration persistence
//! - [`utils`] - Utility functions (XDG directories, subnet text input)
//!
//! # Pipeline
//!
//! ```no_run
//! use fwscope::core::{export, loader, matcher};
//! use std::path::Path;
//!
//! # fn main() -> fwscope::Result<()> {
//! let tables = loader::load(Path::new("firewall_export.xlsx"))?;
//! let groups = tables.groups()?;
//! let matched = matcher::match_rules(
//!     &tables.rules,
//!     groups.as_ref(),
//!     &["10.20.0.0/16", "203.0.113.7"],
//!     &matcher::MatchOptions::default(),
//! )?;
//! let csv = export::to_csv(&matched)?;
//! # let _ = csv;
//! # Ok(())
//! # }
//! ```

// Allow pedantic clippy warnings that are not worth fixing for this codebase
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::missing_errors_doc)]

pub mod config;
pub mod core;
pub mod utils;

// Re-export commonly used types
pub use crate::core::error::{AddressParseError, Error, LoadError, Result};
pub use crate::core::export::{CSV_FILE_NAME, CSV_MIME, ExportFormat, to_csv};
pub use crate::core::groups::{AddressGroups, resolve_field};
pub use crate::core::loader::{LoadedTables, load};
pub use crate::core::matcher::{MatchOptions, MatchOutcome, MatchStats, match_rules};
pub use crate::core::table::Table;
