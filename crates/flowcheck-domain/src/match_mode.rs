//! How strictly a resolved set of address objects must cover a queried network.
//!
//! Queries are network segments, not single hosts, so "does this rule apply" needs a policy:
//! - `segment`: some object contains the whole segment
//! - `sample-ip`: some object contains the segment's sample address (its network address)
//! - `expand`: some object contains at least one of the first `max_hosts` usable hosts

use crate::containment::{address_contains_ip, address_contains_network};
use crate::model::AddressObject;
use ipnet::Ipv4Net;
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

pub const DEFAULT_MAX_HOSTS: usize = 256;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MatchModeKind {
    #[default]
    Segment,
    SampleIp,
    Expand,
}

impl MatchModeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MatchModeKind::Segment => "segment",
            MatchModeKind::SampleIp => "sample-ip",
            MatchModeKind::Expand => "expand",
        }
    }
}

impl fmt::Display for MatchModeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchModeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "segment" => Ok(MatchModeKind::Segment),
            "sample-ip" | "sample_ip" => Ok(MatchModeKind::SampleIp),
            "expand" => Ok(MatchModeKind::Expand),
            other => Err(format!(
                "unknown match mode: {other} (expected segment|sample-ip|expand)"
            )),
        }
    }
}

/// Mode tag plus its numeric parameter, passed whole to every evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MatchMode {
    pub kind: MatchModeKind,
    /// Only consulted by `expand`.
    pub max_hosts: usize,
}

impl Default for MatchMode {
    fn default() -> Self {
        Self::segment()
    }
}

impl MatchMode {
    pub fn segment() -> Self {
        Self {
            kind: MatchModeKind::Segment,
            max_hosts: DEFAULT_MAX_HOSTS,
        }
    }

    pub fn sample_ip() -> Self {
        Self {
            kind: MatchModeKind::SampleIp,
            max_hosts: DEFAULT_MAX_HOSTS,
        }
    }

    pub fn expand(max_hosts: usize) -> Self {
        Self {
            kind: MatchModeKind::Expand,
            max_hosts,
        }
    }

    /// Does any of `resolved` cover `network` under this mode?
    pub fn covers(&self, resolved: &[&AddressObject], network: &Ipv4Net) -> bool {
        if resolved.is_empty() {
            return false;
        }
        match self.kind {
            MatchModeKind::Segment => SegmentCoverage.covers(resolved, network),
            MatchModeKind::SampleIp => SampleIpCoverage.covers(resolved, network),
            MatchModeKind::Expand => ExpandCoverage {
                max_hosts: self.max_hosts,
            }
            .covers(resolved, network),
        }
    }
}

pub trait CoverageStrategy {
    fn covers(&self, resolved: &[&AddressObject], network: &Ipv4Net) -> bool;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SegmentCoverage;

impl CoverageStrategy for SegmentCoverage {
    fn covers(&self, resolved: &[&AddressObject], network: &Ipv4Net) -> bool {
        resolved
            .iter()
            .any(|object| address_contains_network(object, network))
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SampleIpCoverage;

impl CoverageStrategy for SampleIpCoverage {
    fn covers(&self, resolved: &[&AddressObject], network: &Ipv4Net) -> bool {
        let sample = sample_ip(network);
        resolved
            .iter()
            .any(|object| address_contains_ip(object, sample))
    }
}

#[derive(Clone, Copy, Debug)]
pub struct ExpandCoverage {
    pub max_hosts: usize,
}

impl CoverageStrategy for ExpandCoverage {
    fn covers(&self, resolved: &[&AddressObject], network: &Ipv4Net) -> bool {
        sampled_hosts(network, self.max_hosts)
            .any(|host| resolved.iter().any(|object| address_contains_ip(object, host)))
    }
}

/// Representative address of a segment.
pub fn sample_ip(network: &Ipv4Net) -> Ipv4Addr {
    network.network()
}

/// Usable hosts of `network` in address order, capped at `max_hosts`.
///
/// Network and broadcast addresses are excluded for prefixes shorter than /31.
pub fn sampled_hosts(network: &Ipv4Net, max_hosts: usize) -> impl Iterator<Item = Ipv4Addr> {
    network.hosts().take(max_hosts)
}
