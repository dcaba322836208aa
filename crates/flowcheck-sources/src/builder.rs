//! Accumulates definitions from any source into a [`PolicySet`].

use crate::shorthand::synthesize_services;
use flowcheck_domain::model::{
    AddressGroup, AddressKind, AddressObject, PolicyRule, PolicySet, ServiceBook, ServiceEntry,
    ServiceGroup, ServiceObject,
};
use std::collections::BTreeSet;
use tracing::{info, warn};

pub(crate) struct PolicySetBuilder {
    set: PolicySet,
    source: &'static str,
    /// Services defined by this source so far; catalog entries are not in here.
    defined_services: BTreeSet<String>,
}

impl PolicySetBuilder {
    pub(crate) fn new(source: &'static str) -> Self {
        Self {
            set: PolicySet {
                service_book: ServiceBook::with_defaults(),
                ..PolicySet::default()
            },
            source,
            defined_services: BTreeSet::new(),
        }
    }

    pub(crate) fn address(&mut self, object: AddressObject) {
        if let AddressKind::Invalid(raw) = &object.kind {
            warn!(source = self.source, address = %object.name, definition = %raw, "address definition not understood; it will never match");
        }
        self.set.address_book.insert_object(object);
    }

    /// Appends to an existing group of the same name.
    pub(crate) fn address_members(&mut self, group: &str, members: Vec<String>) {
        self.set
            .address_book
            .groups
            .entry(group.to_string())
            .or_insert_with(|| AddressGroup::new(group, Vec::<String>::new()))
            .members
            .extend(members);
    }

    /// Appends entries to a service, creating it if needed. A catalog default of the same name is
    /// replaced on first touch.
    pub(crate) fn service_entries(&mut self, name: &str, entries: Vec<ServiceEntry>) {
        if self.defined_services.insert(name.to_string()) {
            self.set
                .service_book
                .insert_service(ServiceObject::new(name, entries));
        } else if let Some(existing) = self.set.service_book.services.get_mut(name) {
            existing.entries.extend(entries);
        }
    }

    pub(crate) fn service_members(&mut self, group: &str, members: Vec<String>) {
        self.set
            .service_book
            .groups
            .entry(group.to_string())
            .or_insert_with(|| ServiceGroup::new(group, Vec::<String>::new()))
            .members
            .extend(members);
    }

    pub(crate) fn policy(&mut self, rule: PolicyRule) {
        self.set.policies.push(rule);
    }

    pub(crate) fn finish(mut self) -> PolicySet {
        synthesize_services(&mut self.set);
        info!(
            source = self.source,
            policies = self.set.policies.len(),
            address_objects = self.set.address_book.objects.len(),
            address_groups = self.set.address_book.groups.len(),
            services = self.set.service_book.services.len(),
            service_groups = self.set.service_book.groups.len(),
            "loaded policy set"
        );
        self.set
    }
}
