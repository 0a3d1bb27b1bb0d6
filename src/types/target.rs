//! Target specification expansion with CIDR and last-octet range support.
//!
//! Provides flexible, lenient target parsing supporting:
//! - Single IP addresses and hostnames, passed through verbatim
//! - CIDR notation (192.168.1.0/24)
//! - Last-octet ranges (192.168.1.10-20)
//! - Multiple targets separated by commas
//!
//! Elements that fail to expand contribute zero targets and never abort
//! the rest of the expansion.

use super::Parsed;
use ipnetwork::Ipv4Network;
use std::collections::HashSet;
use std::fmt;
use std::net::Ipv4Addr;
use tracing::debug;

/// Classification of one comma-separated target element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    /// Contains a `/`, expanded as an IPv4 CIDR block.
    Cidr,
    /// A dash after the last dot, expanded over the final octet.
    OctetRange,
    /// Hostname or bare IP, used unchanged.
    Literal,
}

impl TargetKind {
    /// Classify a single, already-trimmed element.
    pub fn classify(element: &str) -> Self {
        if element.contains('/') {
            return Self::Cidr;
        }

        match (element.rfind('.'), element.rfind('-')) {
            (Some(dot), Some(dash)) if dash > dot => Self::OctetRange,
            _ => Self::Literal,
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cidr => write!(f, "cidr"),
            Self::OctetRange => write!(f, "range"),
            Self::Literal => write!(f, "host"),
        }
    }
}

/// Best-effort expander for comma-separated target specifications.
pub struct TargetList;

impl TargetList {
    /// Maximum number of addresses a single CIDR block or range may expand to.
    pub const MAX_EXPANSION: u64 = 65536;

    /// Expand a specification, reporting elements that yielded no target.
    ///
    /// Output keeps first-seen order with duplicates removed.
    pub fn parse(spec: &str) -> Parsed<String> {
        let mut seen = HashSet::new();
        let mut parsed = Parsed::default();

        for element in spec.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let kind = TargetKind::classify(element);
            let expanded = match kind {
                TargetKind::Cidr => expand_cidr(element).unwrap_or_default(),
                TargetKind::OctetRange => expand_range(element).unwrap_or_default(),
                TargetKind::Literal => vec![element.to_string()],
            };

            if expanded.is_empty() {
                debug!(element, %kind, "target element expanded to nothing");
                parsed.ignored.push(element.to_string());
                continue;
            }

            for target in expanded {
                if seen.insert(target.clone()) {
                    parsed.items.push(target);
                }
            }
        }

        parsed
    }
}

/// Expand a target specification into a deduplicated list of host strings.
///
/// Malformed elements are silently dropped.
pub fn expand_targets(spec: &str) -> Vec<String> {
    TargetList::parse(spec).items
}

/// Expand an IPv4 CIDR block.
///
/// /31 and /32 include every address in the block. Shorter prefixes exclude
/// the network and broadcast addresses. Returns `None` for malformed input or
/// blocks larger than [`TargetList::MAX_EXPANSION`].
pub fn expand_cidr(cidr: &str) -> Option<Vec<String>> {
    let (base, prefix) = cidr.split_once('/')?;
    let base: Ipv4Addr = base.trim().parse().ok()?;
    let prefix: u8 = prefix.trim().parse().ok()?;
    let network = Ipv4Network::new(base, prefix).ok()?;

    let first = u32::from(network.network());
    let last = u32::from(network.broadcast());
    if u64::from(last - first) + 1 > TargetList::MAX_EXPANSION {
        return None;
    }

    let (start, end) = if prefix >= 31 {
        (first, last)
    } else {
        (first + 1, last - 1)
    };

    Some(
        (start..=end)
            .map(|addr| Ipv4Addr::from(addr).to_string())
            .collect(),
    )
}

/// Expand a range over the final dotted component, e.g. `10.0.0.5-9`.
///
/// The prefix is not validated and the bounds are only required to be
/// integers, so `10.0.0.250-260` yields literal strings up to `10.0.0.260`.
/// Returns `None` for malformed input or spans larger than
/// [`TargetList::MAX_EXPANSION`].
pub fn expand_range(range: &str) -> Option<Vec<String>> {
    let (prefix, range_part) = range.rsplit_once('.')?;
    let mut bounds = range_part.split('-');
    let start: u64 = bounds.next()?.trim().parse().ok()?;
    let end: u64 = bounds.next()?.trim().parse().ok()?;

    if end >= start && end - start >= TargetList::MAX_EXPANSION {
        return None;
    }

    Some((start..=end).map(|i| format!("{}.{}", prefix, i)).collect())
}
