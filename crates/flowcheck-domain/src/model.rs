use ipnet::Ipv4Net;
use std::collections::BTreeMap;
use std::net::Ipv4Addr;

pub use flowcheck_types::{Decision, Protocol};

/// Concrete definition carried by an [`AddressObject`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AddressKind {
    IpMask(Ipv4Net),
    /// Inclusive on both ends.
    IpRange { start: Ipv4Addr, end: Ipv4Addr },
    /// Hostname; never resolved, so it never matches.
    Fqdn(String),
    /// A definition the source adapter could not interpret. Never matches.
    Invalid(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AddressObject {
    pub name: String,
    pub kind: AddressKind,
}

impl AddressObject {
    pub fn ip_mask(name: impl Into<String>, net: Ipv4Net) -> Self {
        Self {
            name: name.into(),
            kind: AddressKind::IpMask(net),
        }
    }

    pub fn ip_range(name: impl Into<String>, start: Ipv4Addr, end: Ipv4Addr) -> Self {
        Self {
            name: name.into(),
            kind: AddressKind::IpRange { start, end },
        }
    }

    pub fn fqdn(name: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: AddressKind::Fqdn(host.into()),
        }
    }

    pub fn invalid(name: impl Into<String>, raw: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: AddressKind::Invalid(raw.into()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AddressGroup {
    pub name: String,
    /// Member names in declaration order; each may name an object or another group.
    pub members: Vec<String>,
}

impl AddressGroup {
    pub fn new<I, S>(name: impl Into<String>, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            members: members.into_iter().map(Into::into).collect(),
        }
    }
}

/// Address objects and groups, keyed by name.
///
/// The two tables share one namespace. A name present in both resolves to the object.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AddressBook {
    pub objects: BTreeMap<String, AddressObject>,
    pub groups: BTreeMap<String, AddressGroup>,
}

impl AddressBook {
    pub fn insert_object(&mut self, object: AddressObject) {
        self.objects.insert(object.name.clone(), object);
    }

    pub fn insert_group(&mut self, group: AddressGroup) {
        self.groups.insert(group.name.clone(), group);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.objects.contains_key(name) || self.groups.contains_key(name)
    }
}

/// Inclusive port range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PortRange {
    pub start: u16,
    pub end: u16,
}

impl PortRange {
    pub fn new(start: u16, end: u16) -> Self {
        Self { start, end }
    }

    pub fn single(port: u16) -> Self {
        Self::new(port, port)
    }

    pub fn contains(&self, port: u16) -> bool {
        self.start <= port && port <= self.end
    }
}

/// One protocol/port-range matcher inside a service object.
///
/// `protocol: None` is a full wildcard (any protocol, any port).
/// A protocol without a port range matches no numeric port.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ServiceEntry {
    pub protocol: Option<Protocol>,
    pub ports: Option<PortRange>,
}

impl ServiceEntry {
    pub fn any() -> Self {
        Self {
            protocol: None,
            ports: None,
        }
    }

    pub fn new(protocol: Protocol, start: u16, end: u16) -> Self {
        Self {
            protocol: Some(protocol),
            ports: Some(PortRange::new(start, end)),
        }
    }

    pub fn tcp(start: u16, end: u16) -> Self {
        Self::new(Protocol::Tcp, start, end)
    }

    pub fn udp(start: u16, end: u16) -> Self {
        Self::new(Protocol::Udp, start, end)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceObject {
    pub name: String,
    /// OR semantics: the service matches if any entry matches.
    pub entries: Vec<ServiceEntry>,
}

impl ServiceObject {
    pub fn new(name: impl Into<String>, entries: Vec<ServiceEntry>) -> Self {
        Self {
            name: name.into(),
            entries,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceGroup {
    pub name: String,
    pub members: Vec<String>,
}

impl ServiceGroup {
    pub fn new<I, S>(name: impl Into<String>, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            members: members.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ServiceBook {
    pub services: BTreeMap<String, ServiceObject>,
    pub groups: BTreeMap<String, ServiceGroup>,
}

impl ServiceBook {
    pub fn insert_service(&mut self, service: ServiceObject) {
        self.services.insert(service.name.clone(), service);
    }

    pub fn insert_group(&mut self, group: ServiceGroup) {
        self.groups.insert(group.name.clone(), group);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.services.contains_key(name) || self.groups.contains_key(name)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PolicyRule {
    /// Display key; not necessarily unique.
    pub policy_id: String,
    pub name: String,
    /// Informational only. Evaluation order is list order.
    pub priority: i64,
    pub source: Vec<String>,
    pub destination: Vec<String>,
    pub services: Vec<String>,
    /// Raw action text as written by the source (`accept`, `deny`, ...).
    pub action: String,
    pub enabled: bool,
    pub schedule: Option<String>,
    pub comment: Option<String>,
}

/// Canonical policy set every source adapter produces.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PolicySet {
    /// Authoritative precedence order.
    pub policies: Vec<PolicyRule>,
    pub address_book: AddressBook,
    pub service_book: ServiceBook,
}

/// One traffic tuple to evaluate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FlowQuery {
    pub src: Ipv4Net,
    pub dst: Ipv4Net,
    pub protocol: Protocol,
    pub port: u16,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchDetail {
    pub decision: Decision,
    pub matched_policy_id: Option<String>,
    pub matched_policy_name: Option<String>,
    pub matched_policy_action: Option<String>,
    /// Always populated.
    pub reason: String,
}

impl MatchDetail {
    pub fn implicit_deny() -> Self {
        Self {
            decision: Decision::Deny,
            matched_policy_id: None,
            matched_policy_name: None,
            matched_policy_action: None,
            reason: flowcheck_types::ids::REASON_IMPLICIT_DENY.to_string(),
        }
    }

    pub fn is_implicit_deny(&self) -> bool {
        self.decision == Decision::Deny && self.matched_policy_id.is_none()
    }
}
