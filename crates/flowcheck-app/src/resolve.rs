//! The `resolve` use case: show what a named address or service expands to.

use anyhow::Context;
use flowcheck_domain::model::{AddressKind, AddressObject, ServiceEntry, ServiceObject};
use flowcheck_sources::RuleSource;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResolveTarget {
    Address(String),
    Service(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolveOutput {
    /// One line per concrete object, in resolution order.
    pub lines: Vec<String>,
}

pub fn run_resolve(source: &RuleSource, target: &ResolveTarget) -> anyhow::Result<ResolveOutput> {
    let set = flowcheck_sources::load_policy_set(source)
        .with_context(|| format!("load {} rules from {}", source.kind(), source.path()))?;

    let lines = match target {
        ResolveTarget::Address(name) => {
            if !set.address_book.contains(name) {
                anyhow::bail!("address '{name}' is not defined");
            }
            set.address_book
                .resolve(name)
                .into_iter()
                .map(describe_address)
                .collect()
        }
        ResolveTarget::Service(name) => {
            if !set.service_book.contains(name) {
                anyhow::bail!("service '{name}' is not defined");
            }
            set.service_book
                .resolve(name)
                .into_iter()
                .map(describe_service)
                .collect()
        }
    };
    Ok(ResolveOutput { lines })
}

fn describe_address(object: &AddressObject) -> String {
    match &object.kind {
        AddressKind::IpMask(net) => format!("{}\tipmask\t{net}", object.name),
        AddressKind::IpRange { start, end } => format!("{}\tiprange\t{start}-{end}", object.name),
        AddressKind::Fqdn(host) => format!("{}\tfqdn\t{host}", object.name),
        AddressKind::Invalid(raw) => format!("{}\tinvalid\t{raw}", object.name),
    }
}

fn describe_service(service: &ServiceObject) -> String {
    let entries: Vec<String> = service.entries.iter().map(describe_entry).collect();
    let entries = if entries.is_empty() {
        "(no ports)".to_string()
    } else {
        entries.join(" ")
    };
    format!("{}\t{entries}", service.name)
}

fn describe_entry(entry: &ServiceEntry) -> String {
    match (entry.protocol, entry.ports) {
        (None, _) => "any".to_string(),
        (Some(protocol), None) => format!("{protocol}/-"),
        (Some(protocol), Some(range)) if range.start == range.end => {
            format!("{protocol}/{}", range.start)
        }
        (Some(protocol), Some(range)) => format!("{protocol}/{}-{}", range.start, range.end),
    }
}
