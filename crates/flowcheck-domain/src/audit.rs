//! Dangling-reference report for a policy set.
//!
//! Evaluation tolerates names that resolve to nothing; this module lists them so callers can
//! warn before running a large cross-product.

use crate::model::PolicySet;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RefField {
    Source,
    Destination,
    Service,
    AddressGroupMember,
    ServiceGroupMember,
}

impl RefField {
    pub fn as_str(self) -> &'static str {
        match self {
            RefField::Source => "srcaddr",
            RefField::Destination => "dstaddr",
            RefField::Service => "service",
            RefField::AddressGroupMember => "address group member",
            RefField::ServiceGroupMember => "service group member",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnresolvedReference {
    /// `policy <id>` or `group <name>`.
    pub context: String,
    pub field: RefField,
    pub name: String,
}

impl fmt::Display for UnresolvedReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} '{}' is not defined",
            self.context,
            self.field.as_str(),
            self.name
        )
    }
}

/// Every reference in `set` that names neither an object nor a group.
///
/// Policies come first in list order, then address groups, then service groups (both by name).
pub fn unresolved_references(set: &PolicySet) -> Vec<UnresolvedReference> {
    let mut out = Vec::new();
    let addresses = &set.address_book;
    let services = &set.service_book;

    for rule in &set.policies {
        let context = format!("policy {}", rule.policy_id);
        let fields = [
            (RefField::Source, &rule.source),
            (RefField::Destination, &rule.destination),
        ];
        for (field, names) in fields {
            for name in names.iter().filter(|n| !addresses.contains(n)) {
                out.push(UnresolvedReference {
                    context: context.clone(),
                    field,
                    name: name.clone(),
                });
            }
        }
        for name in rule.services.iter().filter(|n| !services.contains(n)) {
            out.push(UnresolvedReference {
                context: context.clone(),
                field: RefField::Service,
                name: name.clone(),
            });
        }
    }

    for group in addresses.groups.values() {
        for member in group.members.iter().filter(|m| !addresses.contains(m)) {
            out.push(UnresolvedReference {
                context: format!("group {}", group.name),
                field: RefField::AddressGroupMember,
                name: member.clone(),
            });
        }
    }
    for group in services.groups.values() {
        for member in group.members.iter().filter(|m| !services.contains(m)) {
            out.push(UnresolvedReference {
                context: format!("group {}", group.name),
                field: RefField::ServiceGroupMember,
                name: member.clone(),
            });
        }
    }

    out
}
