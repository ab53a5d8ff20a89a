//! Customer subnet matching
//!
//! For every rule, the `Source` and `Destination` fields are expanded through
//! the address groups, parsed into networks, and tested for overlap against
//! each customer subnet. A rule is kept when any customer subnet overlaps any
//! of its source or destination networks.
//!
//! # Malformed tokens
//!
//! A token that is not an address or network never aborts the run. What
//! happens to it depends on [`MatchOptions::strict_rule_skip`]:
//!
//! - `false`: the token is dropped and the rest of the rule is still matched
//! - `true`: the whole rule is skipped
//!
//! # Cost
//!
//! O(R·C·A) for R rules, C customer subnets and A resolved addresses per rule.

use crate::core::error::{AddressParseError, Result};
use crate::core::groups::{AddressGroups, resolve_field};
use crate::core::network::{overlaps, parse_network};
use crate::core::table::Table;
use ipnetwork::IpNetwork;

pub const SOURCE_COLUMN: &str = "Source";
pub const DESTINATION_COLUMN: &str = "Destination";

/// Matching behaviour switches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchOptions {
    /// Skip a rule entirely when any of its address tokens fails to parse,
    /// instead of dropping just the bad tokens.
    pub strict_rule_skip: bool,
}

/// Counters describing one matching run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchStats {
    pub rules_scanned: usize,
    pub rules_matched: usize,
    /// Rules discarded because of a bad token (strict mode only)
    pub rules_skipped: usize,
    /// Tokens dropped from a rule's candidate set (lenient mode only)
    pub tokens_dropped: usize,
    pub customer_subnets: usize,
    /// Customer subnet lines that were not valid networks
    pub customer_subnets_rejected: usize,
}

/// Matched rules plus the statistics of the run that produced them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchOutcome {
    pub table: Table,
    pub stats: MatchStats,
}

/// The candidate networks of one rule, or the reason it was skipped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleCandidates {
    Networks {
        networks: Vec<IpNetwork>,
        dropped: Vec<AddressParseError>,
    },
    Skipped(AddressParseError),
}

/// Parses customer subnet lines, dropping blanks and invalid entries.
///
/// Lines are trimmed before parsing. Invalid lines are returned separately so
/// callers can report them.
pub fn parse_customer_subnets<S: AsRef<str>>(
    lines: &[S],
) -> (Vec<IpNetwork>, Vec<AddressParseError>) {
    let mut networks = Vec::new();
    let mut rejected = Vec::new();
    for line in lines.iter().map(|l| l.as_ref().trim()).filter(|l| !l.is_empty()) {
        match parse_network(line) {
            Ok(net) => networks.push(net),
            Err(e) => rejected.push(e),
        }
    }
    (networks, rejected)
}

/// Resolves and parses both address fields of a rule into candidate networks.
///
/// Source networks come first, then destination networks, each in field order.
pub fn rule_candidates(
    source: &str,
    destination: &str,
    groups: Option<&AddressGroups>,
    options: &MatchOptions,
) -> RuleCandidates {
    let mut networks = Vec::new();
    let mut dropped = Vec::new();

    let tokens = resolve_field(source, groups)
        .into_iter()
        .chain(resolve_field(destination, groups));
    for token in tokens {
        match parse_network(&token) {
            Ok(net) => networks.push(net),
            Err(e) if options.strict_rule_skip => return RuleCandidates::Skipped(e),
            Err(e) => dropped.push(e),
        }
    }

    RuleCandidates::Networks { networks, dropped }
}

/// Returns true when any customer subnet overlaps any candidate.
///
/// Stops at the first customer subnet that overlaps.
pub fn touches_customer(candidates: &[IpNetwork], customer: &[IpNetwork]) -> bool {
    customer
        .iter()
        .any(|c| candidates.iter().any(|n| overlaps(*c, *n)))
}

/// Selects the rules that touch at least one customer subnet.
///
/// `subnet_lines` are raw lines of customer input. The returned table keeps
/// every column of `rules` and the original row order; each rule appears at
/// most once.
///
/// # Errors
///
/// Fails with [`crate::Error::MissingColumn`] when the rules table has no
/// `Source` or `Destination` column. Bad addresses are never errors.
///
/// # Examples
///
/// ```
/// use fwscope::core::matcher::{match_rules, MatchOptions};
/// use fwscope::core::table::Table;
///
/// let mut rules = Table::new("Firewall Policy", vec!["Source".into(), "Destination".into()]);
/// rules.push_row(vec!["10.0.0.0/24".into(), "8.8.8.8".into()]);
/// rules.push_row(vec!["172.16.0.0/16".into(), "1.1.1.1".into()]);
///
/// let matched = match_rules(&rules, None, &["10.0.0.5/32"], &MatchOptions::default()).unwrap();
/// assert_eq!(matched.len(), 1);
/// assert_eq!(matched.rows[0][0], "10.0.0.0/24");
/// ```
pub fn match_rules<S: AsRef<str>>(
    rules: &Table,
    groups: Option<&AddressGroups>,
    subnet_lines: &[S],
    options: &MatchOptions,
) -> Result<Table> {
    match_rules_with_stats(rules, groups, subnet_lines, options).map(|outcome| outcome.table)
}

/// Same as [`match_rules`], also returning run statistics.
pub fn match_rules_with_stats<S: AsRef<str>>(
    rules: &Table,
    groups: Option<&AddressGroups>,
    subnet_lines: &[S],
    options: &MatchOptions,
) -> Result<MatchOutcome> {
    let source_col = rules.require_column(SOURCE_COLUMN)?;
    let destination_col = rules.require_column(DESTINATION_COLUMN)?;

    let (customer, rejected) = parse_customer_subnets(subnet_lines);
    for err in &rejected {
        tracing::warn!("Ignoring customer subnet: {}", err);
    }

    let mut stats = MatchStats {
        customer_subnets: customer.len(),
        customer_subnets_rejected: rejected.len(),
        ..MatchStats::default()
    };
    let mut matched = rules.empty_like();

    for record in rules.records() {
        stats.rules_scanned += 1;

        let networks = match rule_candidates(
            record.at(source_col),
            record.at(destination_col),
            groups,
            options,
        ) {
            RuleCandidates::Networks { networks, dropped } => {
                for err in &dropped {
                    tracing::debug!("Rule {}: dropping token: {}", record.index + 1, err);
                }
                stats.tokens_dropped += dropped.len();
                networks
            }
            RuleCandidates::Skipped(err) => {
                tracing::debug!("Rule {}: skipped: {}", record.index + 1, err);
                stats.rules_skipped += 1;
                continue;
            }
        };

        if touches_customer(&networks, &customer) {
            matched.push_row(record.cells().to_vec());
        }
    }

    stats.rules_matched = matched.len();
    tracing::info!(
        "Matched {} of {} rules against {} customer subnets ({} tokens dropped, {} rules skipped)",
        stats.rules_matched,
        stats.rules_scanned,
        stats.customer_subnets,
        stats.tokens_dropped,
        stats.rules_skipped
    );

    Ok(MatchOutcome {
        table: matched,
        stats,
    })
}
