//! Address group expansion
//!
//! Rule `Source`/`Destination` fields hold either literal addresses or the
//! names of address groups defined on the `Address Group` sheet. This module
//! turns such a field into the flat list of literal tokens it stands for.
//!
//! Expansion is a single level deep. A group member that happens to be the
//! name of another group is emitted as-is and later fails network parsing like
//! any other non-address token.

use crate::core::error::Result;
use crate::core::table::Table;
use std::collections::HashMap;

pub const GROUP_NAME_COLUMN: &str = "Group Name";
pub const MEMBERS_COLUMN: &str = "Members";

/// Splits a comma-separated field into trimmed, non-empty tokens.
pub fn split_list(field: &str) -> impl Iterator<Item = &str> {
    field.split(',').map(str::trim).filter(|t| !t.is_empty())
}

/// Lookup table from group name to member tokens
///
/// Group names are not required to be unique in the source sheet; the first
/// row with a given name is the one that counts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressGroups {
    /// Group names in sheet order, duplicates removed
    names: Vec<String>,
    members: HashMap<String, Vec<String>>,
}

impl AddressGroups {
    /// Builds the lookup from an `Address Group` table.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::MissingColumn`] when the table lacks a
    /// `Group Name` or `Members` column.
    pub fn from_table(table: &Table) -> Result<Self> {
        let name_col = table.require_column(GROUP_NAME_COLUMN)?;
        let members_col = table.require_column(MEMBERS_COLUMN)?;

        let mut groups = Self::default();
        for record in table.records() {
            groups.insert(record.at(name_col), record.at(members_col));
        }

        tracing::debug!(
            "Indexed {} address groups from {} rows of '{}'",
            groups.len(),
            table.len(),
            table.name
        );
        Ok(groups)
    }

    /// Adds a group unless one with the same name already exists.
    ///
    /// Returns `false` when the name was already taken (first match wins).
    pub fn insert(&mut self, name: &str, members: &str) -> bool {
        if self.members.contains_key(name) {
            tracing::debug!("Ignoring duplicate address group '{}'", name);
            return false;
        }
        self.names.push(name.to_string());
        self.members
            .insert(name.to_string(), split_list(members).map(str::to_string).collect());
        true
    }

    /// Members of a group, or `None` if no group has this exact name.
    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.members.get(name).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Groups in sheet order with their members.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.names
            .iter()
            .map(|n| (n.as_str(), self.members[n].as_slice()))
    }
}

/// Expands a rule field into literal address/subnet tokens.
///
/// Each comma-separated name is replaced by its group's members when a group
/// of that name exists, and kept verbatim otherwise. Order is preserved and
/// duplicates are kept. An empty or blank field yields an empty list.
///
/// # Examples
///
/// ```
/// use fwscope::core::groups::{resolve_field, AddressGroups};
///
/// let mut groups = AddressGroups::default();
/// groups.insert("Web", "10.0.0.10, 10.0.0.11");
///
/// assert_eq!(
///     resolve_field("Web, 192.168.1.0/24", Some(&groups)),
///     vec!["10.0.0.10", "10.0.0.11", "192.168.1.0/24"],
/// );
/// assert_eq!(resolve_field("Web", None), vec!["Web"]);
/// assert!(resolve_field("  ", Some(&groups)).is_empty());
/// ```
pub fn resolve_field(field: &str, groups: Option<&AddressGroups>) -> Vec<String> {
    let mut resolved = Vec::new();
    for name in split_list(field) {
        match groups.and_then(|g| g.get(name)) {
            Some(members) => resolved.extend(members.iter().cloned()),
            None => resolved.push(name.to_string()),
        }
    }
    resolved
}
