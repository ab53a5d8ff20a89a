use crate::core::export::{CSV_FILE_NAME, ExportFormat};
use crate::core::loader::{GROUP_SHEET, POLICY_SHEET, SheetNames};
use crate::core::matcher::MatchOptions;
use crate::utils::get_config_dir;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "config.json";

/// Persistent defaults for the command line front end
///
/// Every field falls back to its default when absent, so a partial config
/// file only overrides what it names. Command line flags override the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Skip a whole rule when one of its addresses is malformed
    #[serde(default)]
    pub strict_rule_skip: bool,
    #[serde(default = "default_policy_sheet")]
    pub policy_sheet: String,
    #[serde(default = "default_group_sheet")]
    pub group_sheet: String,
    /// File written when no `--output` is given
    #[serde(default = "default_output_file")]
    pub output_file: String,
    #[serde(default)]
    pub output_format: ExportFormat,
    /// Matched rules printed to the terminal (0 disables the preview)
    #[serde(default = "default_preview_rows")]
    pub preview_rows: usize,
    /// Log verbosity: error, warn, info, debug or trace
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            strict_rule_skip: false,
            policy_sheet: default_policy_sheet(),
            group_sheet: default_group_sheet(),
            output_file: default_output_file(),
            output_format: ExportFormat::Csv,
            preview_rows: default_preview_rows(),
            log_level: default_log_level(),
        }
    }
}

impl AppConfig {
    /// Matching options, with the skip policy taken from the command line
    /// when it was given there.
    pub fn match_options(&self, strict_override: Option<bool>) -> MatchOptions {
        MatchOptions {
            strict_rule_skip: strict_override.unwrap_or(self.strict_rule_skip),
        }
    }

    pub fn sheet_names(&self) -> SheetNames {
        SheetNames {
            policy: self.policy_sheet.clone(),
            groups: self.group_sheet.clone(),
        }
    }
}

fn default_policy_sheet() -> String {
    POLICY_SHEET.to_string()
}

fn default_group_sheet() -> String {
    GROUP_SHEET.to_string()
}

fn default_output_file() -> String {
    CSV_FILE_NAME.to_string()
}

fn default_preview_rows() -> usize {
    20
}

fn default_log_level() -> String {
    "warn".to_string()
}

/// Location of the config file, if a config directory exists on this system.
pub fn config_path() -> Option<PathBuf> {
    get_config_dir().map(|mut p| {
        p.push(CONFIG_FILE);
        p
    })
}

/// Saves the config to disk using an atomic write pattern.
/// 1. Writes to a temporary file.
/// 2. Sets restrictive permissions (0o600).
/// 3. Atomically renames to the target path.
pub fn save_config_to(config: &AppConfig, path: &Path) -> std::io::Result<()> {
    let json = serde_json::to_string_pretty(config)?;

    let mut temp_path = path.to_path_buf();
    temp_path.set_extension("json.tmp");

    {
        use std::io::Write;

        let mut options = std::fs::OpenOptions::new();
        options.create(true).write(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600); // Set permissions BEFORE any data is written
        }

        let mut file = options.open(&temp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;
    }

    std::fs::rename(temp_path, path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::StorageFull {
            std::io::Error::new(
                std::io::ErrorKind::StorageFull,
                "Disk full: cannot save configuration. Free up space and try again.",
            )
        } else {
            e
        }
    })
}

/// Saves the config to its standard location.
pub fn save_config(config: &AppConfig) -> std::io::Result<()> {
    match config_path() {
        Some(path) => save_config_to(config, &path),
        None => Ok(()),
    }
}

/// Loads the config from `path`, or returns defaults if missing or invalid.
pub fn load_config_from(path: &Path) -> AppConfig {
    match std::fs::read_to_string(path) {
        Ok(json) => serde_json::from_str(&json).unwrap_or_else(|e| {
            tracing::warn!("Ignoring invalid config {}: {}", path.display(), e);
            AppConfig::default()
        }),
        Err(_) => AppConfig::default(),
    }
}

/// Loads the config from its standard location, or returns defaults.
pub fn load_config() -> AppConfig {
    config_path().map_or_else(AppConfig::default, |p| load_config_from(&p))
}
