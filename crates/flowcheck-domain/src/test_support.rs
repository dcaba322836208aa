use crate::match_mode::MatchMode;
use crate::model::{
    AddressBook, AddressGroup, AddressObject, FlowQuery, PolicyRule, Protocol, ServiceBook,
    ServiceEntry, ServiceGroup, ServiceObject,
};
use crate::policy::EffectiveConfig;
use ipnet::Ipv4Net;

pub fn net(cidr: &str) -> Ipv4Net {
    cidr.parse().expect("valid CIDR in test")
}

pub fn ip_mask(name: &str, cidr: &str) -> AddressObject {
    AddressObject::ip_mask(name, net(cidr))
}

pub fn address_book(objects: Vec<AddressObject>, groups: Vec<AddressGroup>) -> AddressBook {
    let mut book = AddressBook::default();
    for object in objects {
        book.insert_object(object);
    }
    for group in groups {
        book.insert_group(group);
    }
    book
}

pub fn service_book(services: Vec<ServiceObject>, groups: Vec<ServiceGroup>) -> ServiceBook {
    let mut book = ServiceBook::default();
    for service in services {
        book.insert_service(service);
    }
    for group in groups {
        book.insert_group(group);
    }
    book
}

/// A book holding only the `ALL` wildcard service.
pub fn all_services() -> ServiceBook {
    service_book(
        vec![ServiceObject::new("ALL", vec![ServiceEntry::any()])],
        vec![],
    )
}

pub fn rule(id: &str, src: &[&str], dst: &[&str], services: &[&str], action: &str) -> PolicyRule {
    let owned = |names: &[&str]| names.iter().map(|n| n.to_string()).collect::<Vec<_>>();
    PolicyRule {
        policy_id: id.to_string(),
        name: format!("rule-{id}"),
        priority: 0,
        source: owned(src),
        destination: owned(dst),
        services: owned(services),
        action: action.to_string(),
        enabled: true,
        schedule: None,
        comment: None,
    }
}

pub fn query(src: &str, dst: &str, protocol: Protocol, port: u16) -> FlowQuery {
    FlowQuery {
        src: net(src),
        dst: net(dst),
        protocol,
        port,
    }
}

pub fn config(match_mode: MatchMode) -> EffectiveConfig {
    EffectiveConfig {
        match_mode,
        ..EffectiveConfig::default()
    }
}
