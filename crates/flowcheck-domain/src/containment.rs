//! Stateless containment predicates. None of these panic; ill-formed definitions yield `false`.

use crate::model::{AddressKind, AddressObject, Protocol, ServiceEntry, ServiceObject};
use ipnet::Ipv4Net;
use std::net::Ipv4Addr;

pub fn address_contains_ip(object: &AddressObject, ip: Ipv4Addr) -> bool {
    match &object.kind {
        AddressKind::IpMask(net) => net.contains(&ip),
        AddressKind::IpRange { start, end } => *start <= ip && ip <= *end,
        AddressKind::Fqdn(_) | AddressKind::Invalid(_) => false,
    }
}

/// True when every address of `network` lies inside `object`.
pub fn address_contains_network(object: &AddressObject, network: &Ipv4Net) -> bool {
    match &object.kind {
        AddressKind::IpMask(net) => net.contains(network),
        AddressKind::IpRange { start, end } => {
            *start <= network.network() && network.broadcast() <= *end
        }
        AddressKind::Fqdn(_) | AddressKind::Invalid(_) => false,
    }
}

pub fn service_matches(entry: &ServiceEntry, protocol: Protocol, port: u16) -> bool {
    let Some(expected) = entry.protocol else {
        return true;
    };
    if expected != protocol {
        return false;
    }
    entry.ports.is_some_and(|range| range.contains(port))
}

/// True when any entry of `service` matches.
pub fn service_object_matches(service: &ServiceObject, protocol: Protocol, port: u16) -> bool {
    service
        .entries
        .iter()
        .any(|entry| service_matches(entry, protocol, port))
}
