//! fwscope - Customer Firewall Rule Extractor
//!
//! Command line front end for pulling the rules that concern one customer out
//! of a firewall policy export.
//!
//! # Usage
//!
//! ```bash
//! # Match against subnets listed one per line in a file
//! fwscope match export.xlsx --subnets customer.txt
//!
//! # Subnets on the command line, JSON output, strict malformed-address handling
//! fwscope match export.xlsx -s 10.20.0.0/16 -s 203.0.113.7 --format json --strict-rule-skip
//!
//! # Subnets from stdin
//! cat customer.txt | fwscope match export.xlsx --subnets -
//!
//! # Inspect address groups and how a field expands
//! fwscope groups export.xlsx
//! fwscope resolve export.xlsx "WebServers, 10.0.0.1"
//!
//! # Show or create the config file
//! fwscope config --init
//! ```

use clap::{Parser, Subcommand};
use fwscope::config::{self, AppConfig};
use fwscope::core::export::{self, ExportFormat};
use fwscope::core::groups::resolve_field;
use fwscope::core::loader::{self, LoadedTables};
use fwscope::core::matcher;
use fwscope::core::network::parse_network;
use fwscope::utils;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Cell width used by the terminal preview
const PREVIEW_CELL_WIDTH: usize = 40;

#[derive(Parser)]
#[command(name = "fwscope")]
#[command(about = "Extract the firewall rules that touch a customer's subnets", long_about = None)]
struct Cli {
    /// Log verbosity (error, warn, info, debug, trace); overrides the config file
    #[arg(long, global = true, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Write logs to the state directory instead of stderr
    #[arg(long, global = true)]
    log_file: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find the rules whose source or destination overlaps a customer subnet
    Match {
        /// Firewall export (.xlsx, .xlsm, .xlsb, .xls, .ods or .csv)
        file: PathBuf,
        /// File with one subnet or IP per line ("-" reads stdin)
        #[arg(long, value_name = "FILE")]
        subnets: Option<PathBuf>,
        /// A customer subnet or IP (repeatable)
        #[arg(short = 's', long = "subnet", value_name = "CIDR")]
        subnet: Vec<String>,
        /// Where to write the matched rules (default from config)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
        /// Output format (csv or json)
        #[arg(short, long)]
        format: Option<ExportFormat>,
        /// Skip a whole rule when any of its addresses is malformed
        #[arg(long, overrides_with = "no_strict_rule_skip")]
        strict_rule_skip: bool,
        /// Drop only the malformed addresses, even if the config enables strict mode
        #[arg(long, overrides_with = "strict_rule_skip")]
        no_strict_rule_skip: bool,
        /// Number of matched rules to print (0 disables the preview)
        #[arg(long, value_name = "ROWS")]
        preview: Option<usize>,
    },
    /// List address groups and their members
    Groups {
        /// Firewall export containing an address group sheet
        file: PathBuf,
    },
    /// Show how a Source/Destination value expands and which parts are networks
    Resolve {
        /// Firewall export providing the address groups
        file: PathBuf,
        /// Field value, e.g. "WebServers, 10.0.0.1"
        field: String,
    },
    /// Show the active configuration
    Config {
        /// Write the current settings to the config file
        #[arg(long)]
        init: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = config::load_config();
    init_logging(
        cli.log_level.as_deref().unwrap_or(&config.log_level),
        cli.log_file,
    );

    match handle_cli(cli.command, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(level: &str, to_file: bool) {
    let level = level.parse().unwrap_or(tracing::Level::WARN);
    let builder = tracing_subscriber::fmt().with_max_level(level);

    if to_file {
        if let Err(e) = utils::ensure_dirs() {
            eprintln!("Warning: cannot create state directory: {e}");
        }
        match open_log_file(utils::get_state_dir()) {
            Ok(file) => {
                builder
                    .with_ansi(false)
                    .with_writer(std::sync::Mutex::new(file))
                    .init();
                return;
            }
            Err(reason) => eprintln!("Warning: {reason}; logging to stderr"),
        }
    }
    builder.with_writer(std::io::stderr).init();
}

/// Creates `fwscope.log` in the state directory.
fn open_log_file(state_dir: Option<PathBuf>) -> Result<std::fs::File, String> {
    let mut log_path = state_dir.ok_or("no state directory on this system")?;
    log_path.push("fwscope.log");
    std::fs::File::create(&log_path)
        .map_err(|e| format!("cannot open {}: {e}", log_path.display()))
}

fn handle_cli(command: Commands, config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Match {
            file,
            subnets,
            subnet,
            output,
            format,
            strict_rule_skip,
            no_strict_rule_skip,
            preview,
        } => {
            let mut lines = subnet;
            if let Some(source) = subnets {
                lines.extend(utils::subnet_lines(&read_subnet_source(&source)?));
            }
            if lines.iter().all(|l| l.trim().is_empty()) {
                println!("No customer subnets given. Use --subnets FILE or -s CIDR to begin.");
                return Ok(());
            }

            let tables = loader::load_with(&file, &config.sheet_names())?;
            let groups = tables.groups()?;
            let options =
                config.match_options(strict_override(strict_rule_skip, no_strict_rule_skip));

            let outcome =
                matcher::match_rules_with_stats(&tables.rules, groups.as_ref(), &lines, &options)?;
            let stats = outcome.stats;

            println!("Found {} matching rules.", stats.rules_matched);
            if stats.customer_subnets_rejected > 0 {
                println!(
                    "Ignored {} customer entries that are not valid subnets.",
                    stats.customer_subnets_rejected
                );
            }
            if stats.tokens_dropped > 0 {
                println!(
                    "Dropped {} rule addresses that are not valid networks.",
                    stats.tokens_dropped
                );
            }
            if stats.rules_skipped > 0 {
                println!(
                    "Skipped {} rules with malformed addresses.",
                    stats.rules_skipped
                );
            }

            let preview_rows = preview.unwrap_or(config.preview_rows);
            if preview_rows > 0 && !outcome.table.is_empty() {
                println!();
                print!(
                    "{}",
                    utils::format_preview(&outcome.table, preview_rows, PREVIEW_CELL_WIDTH)
                );
                println!();
            }

            let format = format.unwrap_or(config.output_format);
            let path = output.unwrap_or_else(|| default_output_path(config, format));
            let bytes = format.render(&outcome.table)?;
            export::write_atomic(&path, &bytes)?;
            println!(
                "Saved {} ({}, {} bytes)",
                path.display(),
                format.mime(),
                bytes.len()
            );
        }
        Commands::Groups { file } => {
            let tables = loader::load_with(&file, &config.sheet_names())?;
            match tables.groups()? {
                Some(groups) if !groups.is_empty() => {
                    println!("{} address groups:", groups.len());
                    for (name, members) in groups.iter() {
                        println!("  {name}: {}", members.join(", "));
                    }
                }
                _ => println!("No address groups in {}", file.display()),
            }
        }
        Commands::Resolve { file, field } => {
            let tables = loader::load_with(&file, &config.sheet_names())?;
            print_resolution(&tables, &field)?;
        }
        Commands::Config { init } => {
            match config::config_path() {
                Some(path) => println!("Config file: {}", path.display()),
                None => println!("Config file: (no config directory on this system)"),
            }
            println!("{}", serde_json::to_string_pretty(config)?);
            if init {
                utils::ensure_dirs()?;
                config::save_config(config)?;
                println!("✓ Config saved.");
            }
        }
    }
    Ok(())
}

/// Skip policy given on the command line, if any.
///
/// The two flags override each other, so at most one is set.
fn strict_override(strict: bool, lenient: bool) -> Option<bool> {
    if strict {
        Some(true)
    } else if lenient {
        Some(false)
    } else {
        None
    }
}

fn read_subnet_source(source: &Path) -> std::io::Result<String> {
    if source == Path::new("-") {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        Ok(text)
    } else {
        std::fs::read_to_string(source)
    }
}

fn default_output_path(config: &AppConfig, format: ExportFormat) -> PathBuf {
    let mut path = PathBuf::from(&config.output_file);
    if path.extension().and_then(|e| e.to_str()) != Some(format.extension()) {
        path.set_extension(format.extension());
    }
    path
}

fn print_resolution(tables: &LoadedTables, field: &str) -> fwscope::Result<()> {
    let groups = tables.groups()?;
    let tokens = resolve_field(field, groups.as_ref());
    if tokens.is_empty() {
        println!("'{field}' resolves to nothing.");
        return Ok(());
    }

    println!("'{field}' resolves to {} entries:", tokens.len());
    for token in tokens {
        match parse_network(&token) {
            Ok(net) => println!("  ✓ {token:<24} {net}"),
            Err(e) => println!("  ✗ {token:<24} {}", e.reason),
        }
    }
    Ok(())
}
