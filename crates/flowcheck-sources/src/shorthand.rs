//! Services named by convention rather than defined: `tcp_443`, `udp_53`, `tcp_3000-3001`.

use flowcheck_domain::model::{PolicySet, Protocol, ServiceEntry, ServiceObject};
use tracing::debug;

/// Interpret a shorthand service name. Returns `None` for anything else.
pub fn parse_shorthand(name: &str) -> Option<ServiceObject> {
    let (proto, ports) = name.split_once('_')?;
    let protocol: Protocol = proto.parse().ok()?;
    let (start, end) = match ports.split_once('-') {
        Some((lo, hi)) => (lo.parse::<u16>().ok()?, hi.parse::<u16>().ok()?),
        None => {
            let port = ports.parse::<u16>().ok()?;
            (port, port)
        }
    };
    if start > end {
        return None;
    }
    Some(ServiceObject::new(
        name,
        vec![ServiceEntry::new(protocol, start, end)],
    ))
}

/// Define every referenced-but-undefined shorthand service in `set`.
pub fn synthesize_services(set: &mut PolicySet) {
    let referenced: Vec<String> = set
        .policies
        .iter()
        .flat_map(|rule| rule.services.iter())
        .chain(
            set.service_book
                .groups
                .values()
                .flat_map(|group| group.members.iter()),
        )
        .filter(|name| !set.service_book.contains(name))
        .cloned()
        .collect();

    for name in referenced {
        if set.service_book.contains(&name) {
            continue;
        }
        if let Some(service) = parse_shorthand(&name) {
            debug!(service = %name, "synthesized shorthand service");
            set.service_book.insert_service(service);
        }
    }
}
