//! Core rule extraction functionality
//!
//! This module contains the types and logic for finding the firewall rules that
//! touch a customer's subnets. It provides:
//!
//! - [`table`]: Ordered string tables holding rules and address groups
//! - [`loader`]: Reading spreadsheet and CSV exports into tables
//! - [`groups`]: Address group expansion of rule fields
//! - [`network`]: Permissive IP/CIDR parsing and overlap tests
//! - [`matcher`]: Selecting the rules that overlap customer subnets
//! - [`export`]: CSV/JSON serialization of the matched rules
//! - [`error`]: Error types for load and match operations

pub mod error;
pub mod export;
pub mod groups;
pub mod loader;
pub mod matcher;
pub mod network;
pub mod table;

#[cfg(test)]
pub mod test_helpers;

#[cfg(test)]
mod tests;
