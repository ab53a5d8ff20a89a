//! Permissive IP network parsing and overlap tests
//!
//! Tokens from rule fields and customer input are parsed the lenient way:
//!
//! - `10.0.0.0/24`, `2001:db8::/32` - CIDR notation
//! - `10.0.0.5/24` - host bits are allowed and masked off (`10.0.0.0/24`)
//! - `10.0.0.5`, `2001:db8::1` - bare addresses become /32 or /128
//! - `10.0.0.0/255.255.255.0` - IPv4 netmask notation
//! - `10.0.0.0/0.0.0.255` - IPv4 hostmask (wildcard) notation
//!
//! Parsing never panics and never returns a crate-level error. Every token
//! produces either a network or an [`AddressParseError`] saying why not.

use crate::core::error::{AddressParseError, AddressParseReason};
use ipnetwork::IpNetwork;
use std::net::{IpAddr, Ipv4Addr};

/// Parses one address or network token, masking host bits.
///
/// # Examples
///
/// ```
/// use fwscope::core::network::parse_network;
///
/// let net = parse_network("10.0.0.5/24").unwrap();
/// assert_eq!(net.to_string(), "10.0.0.0/24");
///
/// let host = parse_network(" 8.8.8.8 ").unwrap();
/// assert_eq!(host.to_string(), "8.8.8.8/32");
///
/// assert!(parse_network("GroupA").is_err());
/// ```
pub fn parse_network(token: &str) -> Result<IpNetwork, AddressParseError> {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return Err(AddressParseError::new(token, AddressParseReason::Empty));
    }

    let (addr_part, prefix_part) = match trimmed.split_once('/') {
        Some((addr, prefix)) => (addr, Some(prefix)),
        None => (trimmed, None),
    };

    let addr: IpAddr = addr_part.parse().map_err(|_| {
        AddressParseError::new(
            trimmed,
            AddressParseReason::InvalidAddress(addr_part.to_string()),
        )
    })?;

    let prefix = match prefix_part {
        None => max_prefix(addr),
        Some(p) => parse_prefix(trimmed, addr, p)?,
    };

    let network = IpNetwork::new(addr, prefix).map_err(|_| {
        AddressParseError::new(trimmed, AddressParseReason::PrefixOutOfRange { prefix })
    })?;

    // Non-strict: normalise to the network address instead of rejecting host bits
    IpNetwork::new(network.network(), network.prefix()).map_err(|_| {
        AddressParseError::new(trimmed, AddressParseReason::PrefixOutOfRange { prefix })
    })
}

/// Reports whether two networks share at least one address.
///
/// Networks of different address families never overlap. The test is
/// symmetric: `overlaps(a, b) == overlaps(b, a)`.
pub fn overlaps(a: IpNetwork, b: IpNetwork) -> bool {
    if a.is_ipv4() != b.is_ipv4() {
        return false;
    }
    // Aligned prefixes either nest or are disjoint
    a.contains(b.network()) || b.contains(a.network())
}

const fn max_prefix(addr: IpAddr) -> u8 {
    match addr {
        IpAddr::V4(_) => 32,
        IpAddr::V6(_) => 128,
    }
}

fn parse_prefix(token: &str, addr: IpAddr, prefix: &str) -> Result<u8, AddressParseError> {
    if !prefix.is_empty() && prefix.bytes().all(|b| b.is_ascii_digit()) {
        return prefix.parse::<u8>().map_err(|_| {
            AddressParseError::new(token, AddressParseReason::InvalidPrefix(prefix.to_string()))
        });
    }

    // Dotted netmask or hostmask form is IPv4-only
    if addr.is_ipv4()
        && let Ok(mask) = prefix.parse::<Ipv4Addr>()
    {
        let mask_prefix = |m: Ipv4Addr| ipnetwork::ipv4_mask_to_prefix(m).ok();
        return mask_prefix(mask)
            .or_else(|| mask_prefix(Ipv4Addr::from(!u32::from(mask))))
            .ok_or_else(|| {
                AddressParseError::new(
                    token,
                    AddressParseReason::InvalidNetmask(prefix.to_string()),
                )
            });
    }

    Err(AddressParseError::new(
        token,
        AddressParseReason::InvalidPrefix(prefix.to_string()),
    ))
}
