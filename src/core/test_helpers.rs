//! Shared test utilities for core module tests
//!
//! Provides common table builders to avoid duplication across test suites.
//! This module is only compiled in test mode.

use crate::core::groups::{AddressGroups, GROUP_NAME_COLUMN, MEMBERS_COLUMN};
use crate::core::loader::{GROUP_SHEET, POLICY_SHEET};
use crate::core::matcher::{DESTINATION_COLUMN, SOURCE_COLUMN};
use crate::core::table::Table;

/// Creates a rules table with `Name`, `Source`, `Destination` and `Action`
/// columns from `(source, destination)` pairs.
///
/// Rows are named `rule-1`, `rule-2`, ... in input order so tests can check
/// which rules survived.
pub fn rules_table(rules: &[(&str, &str)]) -> Table {
    let mut table = Table::new(
        POLICY_SHEET,
        vec![
            "Name".to_string(),
            SOURCE_COLUMN.to_string(),
            DESTINATION_COLUMN.to_string(),
            "Action".to_string(),
        ],
    );
    for (i, (source, destination)) in rules.iter().enumerate() {
        table.push_row(vec![
            format!("rule-{}", i + 1),
            (*source).to_string(),
            (*destination).to_string(),
            "accept".to_string(),
        ]);
    }
    table
}

/// Creates an `Address Group` table from `(name, members)` pairs.
pub fn group_table(groups: &[(&str, &str)]) -> Table {
    let mut table = Table::new(
        GROUP_SHEET,
        vec![GROUP_NAME_COLUMN.to_string(), MEMBERS_COLUMN.to_string()],
    );
    for (name, members) in groups {
        table.push_row(vec![(*name).to_string(), (*members).to_string()]);
    }
    table
}

/// Creates an indexed address group lookup from `(name, members)` pairs.
pub fn address_groups(groups: &[(&str, &str)]) -> AddressGroups {
    AddressGroups::from_table(&group_table(groups)).expect("group table has both columns")
}

/// Names (first column) of the rules in a result table.
pub fn rule_names(table: &Table) -> Vec<&str> {
    table.rows.iter().map(|row| row[0].as_str()).collect()
}
