//! Utility functions for directory management and terminal output
//!
//! This module provides helper functions following the XDG Base Directory specification
//! for portable configuration and log storage across Linux distributions.
//!
//! # Directory Structure
//!
//! - Config: `~/.config/fwscope/` - User configuration file
//! - State: `~/.local/state/fwscope/` - Log files

use crate::core::table::Table;
use directories::ProjectDirs;
use std::fmt::Write as _;
use std::path::PathBuf;

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "fwscope", "fwscope")
}

pub fn get_config_dir() -> Option<PathBuf> {
    project_dirs().map(|pd| pd.config_dir().to_path_buf())
}

pub fn get_state_dir() -> Option<PathBuf> {
    project_dirs().and_then(|pd| pd.state_dir().map(std::path::Path::to_path_buf))
}

pub fn ensure_dirs() -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use std::fs::DirBuilder;
        use std::os::unix::fs::DirBuilderExt;

        let mut builder = DirBuilder::new();
        builder.mode(0o700); // User read/write/execute only
        builder.recursive(true);

        if let Some(dir) = get_config_dir() {
            builder.create(dir)?;
        }
        if let Some(dir) = get_state_dir() {
            builder.create(dir)?;
        }
    }

    #[cfg(not(unix))]
    {
        if let Some(dir) = get_config_dir() {
            std::fs::create_dir_all(dir)?;
        }
        if let Some(dir) = get_state_dir() {
            std::fs::create_dir_all(dir)?;
        }
    }

    Ok(())
}

/// Splits pasted subnet text into trimmed, non-empty lines.
///
/// `\n`, `\r\n` and a lone `\r` all end a line.
///
/// # Example
///
/// ```
/// use fwscope::utils::subnet_lines;
///
/// let lines = subnet_lines("  10.0.0.0/24\r\n\n192.168.1.7 \r172.16.0.0/12\n");
/// assert_eq!(lines, vec!["10.0.0.0/24", "192.168.1.7", "172.16.0.0/12"]);
/// ```
pub fn subnet_lines(text: &str) -> Vec<String> {
    text.split(['\n', '\r'])
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Truncates a string to a maximum length and adds an ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        // Find the nearest character boundary to avoid splitting multi-byte characters
        let end = s
            .char_indices()
            .map(|(idx, _)| idx)
            .take_while(|&idx| idx <= max_len.saturating_sub(3))
            .last()
            .unwrap_or(0);
        format!("{}...", &s[..end])
    }
}

/// Renders the first `max_rows` rows of a table as aligned text columns.
///
/// Cells wider than `max_width` bytes are truncated. A trailer notes how many
/// rows were left out.
pub fn format_preview(table: &Table, max_rows: usize, max_width: usize) -> String {
    let shown: Vec<Vec<String>> = table
        .rows
        .iter()
        .take(max_rows)
        .map(|row| row.iter().map(|c| truncate_string(c, max_width)).collect())
        .collect();
    let header: Vec<String> = table
        .columns
        .iter()
        .map(|c| truncate_string(c, max_width))
        .collect();

    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in &shown {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    write_row(&mut out, &header, &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    write_row(&mut out, &rule, &widths);
    for row in &shown {
        write_row(&mut out, row, &widths);
    }
    if table.len() > shown.len() {
        let _ = writeln!(out, "... {} more rows", table.len() - shown.len());
    }
    out
}

fn write_row(out: &mut String, cells: &[String], widths: &[usize]) {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ");
    let _ = writeln!(out, "{}", line.trim_end());
}
