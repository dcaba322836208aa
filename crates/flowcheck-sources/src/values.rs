//! Cell/token interpretation shared by the source adapters.

use flowcheck_domain::model::{AddressObject, PortRange};
use ipnet::Ipv4Net;
use std::net::Ipv4Addr;

/// Build an address object from the loosely typed columns every source carries.
///
/// `first`/`second` are `subnet`/`mask` for `ipmask`, `start`/`end` for `iprange`, and the host
/// name (in `first`) for `fqdn`. Anything uninterpretable becomes [`AddressObject::invalid`].
pub(crate) fn address_from_parts(name: &str, kind: &str, first: &str, second: &str) -> AddressObject {
    let first = first.trim();
    let second = second.trim();
    let kind = kind.trim().to_ascii_lowercase();
    match kind.as_str() {
        "" | "ipmask" | "subnet" => match parse_subnet(first, second) {
            Some(net) => AddressObject::ip_mask(name, net),
            None => AddressObject::invalid(name, format!("{first} {second}").trim().to_string()),
        },
        "iprange" | "range" => {
            match (first.parse::<Ipv4Addr>(), second.parse::<Ipv4Addr>()) {
                (Ok(start), Ok(end)) => AddressObject::ip_range(name, start, end),
                _ => AddressObject::invalid(name, format!("{first}-{second}")),
            }
        }
        "fqdn" if !first.is_empty() => AddressObject::fqdn(name, first),
        other => AddressObject::invalid(name, format!("type {other}")),
    }
}

/// `10.0.0.0 255.255.255.0`, `10.0.0.0/24`, or `10.0.0.0` + `24`. An empty subnet is `0.0.0.0/0`.
///
/// Host bits are cleared, as firewalls store host entries with their own mask.
pub(crate) fn parse_subnet(subnet: &str, mask: &str) -> Option<Ipv4Net> {
    if subnet.is_empty() && mask.is_empty() {
        return Ipv4Net::new(Ipv4Addr::UNSPECIFIED, 0).ok();
    }
    if subnet.contains('/') {
        return subnet.parse::<Ipv4Net>().ok().map(|net| net.trunc());
    }
    let ip: Ipv4Addr = subnet.parse().ok()?;
    let prefix = if mask.is_empty() {
        32
    } else if let Ok(bits) = mask.parse::<u8>() {
        bits
    } else {
        ipnet::ipv4_mask_to_prefix(mask.parse().ok()?).ok()?
    };
    Ipv4Net::new(ip, prefix).ok().map(|net| net.trunc())
}

/// `80`, `3000-3001`, or the FortiGate form `dst_lo[-dst_hi][:src_lo[-src_hi]]` (source part ignored).
pub(crate) fn parse_port_range(token: &str) -> Option<PortRange> {
    let dst = token.split(':').next()?.trim();
    let (lo, hi) = match dst.split_once('-') {
        Some((lo, hi)) => (lo.trim().parse().ok()?, hi.trim().parse().ok()?),
        None => {
            let port = dst.parse().ok()?;
            (port, port)
        }
    };
    Some(PortRange::new(lo, hi))
}

/// Boolean spellings found in rule exports. Empty means enabled.
pub(crate) fn parse_enable(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "true" | "yes" | "y" | "enable" | "enabled" | "1" | "on" => Some(true),
        "false" | "no" | "n" | "disable" | "disabled" | "0" | "off" => Some(false),
        _ => None,
    }
}

/// Split a multi-valued cell on newlines and commas, dropping blanks.
pub(crate) fn split_members(cell: &str) -> Vec<String> {
    cell.split(['\n', '\r', ','])
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .collect()
}
