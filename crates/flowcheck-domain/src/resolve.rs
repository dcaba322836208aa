//! Depth-first resolution of named references into concrete objects.
//!
//! Groups may nest, share subgroups, and form cycles. One resolution call carries a single set of
//! the group names it has already expanded; meeting one of them again contributes nothing, so each
//! group is expanded at most once per call. Unknown names resolve to an empty list.

use crate::model::{
    AddressBook, AddressGroup, AddressObject, ServiceBook, ServiceGroup, ServiceObject,
};
use std::collections::{BTreeMap, BTreeSet};

/// A named collection of member references.
pub trait MemberList {
    fn members(&self) -> &[String];
}

impl MemberList for AddressGroup {
    fn members(&self) -> &[String] {
        &self.members
    }
}

impl MemberList for ServiceGroup {
    fn members(&self) -> &[String] {
        &self.members
    }
}

/// Resolve `name` against an object table and a group table.
///
/// Results keep member declaration order. Objects listed directly by several expanded groups
/// appear once per listing; a subgroup reached through several parents is expanded only the first
/// time.
pub fn resolve_named<'a, O, G>(
    objects: &'a BTreeMap<String, O>,
    groups: &'a BTreeMap<String, G>,
    name: &str,
) -> Vec<&'a O>
where
    G: MemberList,
{
    let mut visited = BTreeSet::new();
    let mut out = Vec::new();
    resolve_into(objects, groups, name, &mut visited, &mut out);
    out
}

fn resolve_into<'a, O, G>(
    objects: &'a BTreeMap<String, O>,
    groups: &'a BTreeMap<String, G>,
    name: &str,
    visited: &mut BTreeSet<&'a str>,
    out: &mut Vec<&'a O>,
) where
    G: MemberList,
{
    if let Some(object) = objects.get(name) {
        out.push(object);
        return;
    }
    let Some((key, group)) = groups.get_key_value(name) else {
        return;
    };
    if !visited.insert(key.as_str()) {
        return;
    }
    for member in group.members() {
        resolve_into(objects, groups, member, visited, out);
    }
}

impl AddressBook {
    pub fn resolve(&self, name: &str) -> Vec<&AddressObject> {
        resolve_named(&self.objects, &self.groups, name)
    }

    /// Resolve several references and concatenate the results.
    pub fn resolve_all<S: AsRef<str>>(&self, names: &[S]) -> Vec<&AddressObject> {
        names
            .iter()
            .flat_map(|name| self.resolve(name.as_ref()))
            .collect()
    }
}

impl ServiceBook {
    pub fn resolve(&self, name: &str) -> Vec<&ServiceObject> {
        resolve_named(&self.services, &self.groups, name)
    }

    pub fn resolve_all<S: AsRef<str>>(&self, names: &[S]) -> Vec<&ServiceObject> {
        names
            .iter()
            .flat_map(|name| self.resolve(name.as_ref()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::model::{AddressGroup, ServiceEntry, ServiceGroup, ServiceObject};
    use crate::test_support::{address_book, ip_mask, service_book};

    fn names<'a>(
        objects: impl IntoIterator<Item = &'a crate::model::AddressObject>,
    ) -> Vec<&'a str> {
        objects.into_iter().map(|o| o.name.as_str()).collect()
    }

    #[test]
    fn direct_object_resolves_to_itself() {
        let book = address_book(vec![ip_mask("net", "10.0.0.0/16")], vec![]);
        assert_eq!(names(book.resolve("net")), vec!["net"]);
    }

    #[test]
    fn unknown_name_resolves_to_nothing() {
        let book = address_book(vec![ip_mask("net", "10.0.0.0/16")], vec![]);
        assert!(book.resolve("missing").is_empty());
    }

    #[test]
    fn nested_groups_flatten_in_declaration_order() {
        let book = address_book(
            vec![
                ip_mask("net1", "10.0.0.0/24"),
                ip_mask("net2", "10.0.1.0/24"),
                ip_mask("net3", "10.0.2.0/24"),
            ],
            vec![
                AddressGroup::new("group1", ["net1"]),
                AddressGroup::new("group2", ["group1", "net2"]),
                AddressGroup::new("group3", ["net3", "group2"]),
            ],
        );
        assert_eq!(names(book.resolve("group3")), vec!["net3", "net1", "net2"]);
    }

    #[test]
    fn self_referencing_group_terminates() {
        let book = address_book(
            vec![ip_mask("net", "10.0.0.0/24")],
            vec![AddressGroup::new("a", ["a", "net"])],
        );
        assert_eq!(names(book.resolve("a")), vec!["net"]);
    }

    #[test]
    fn two_group_cycle_drops_only_the_cyclic_edge() {
        let book = address_book(
            vec![ip_mask("x", "10.0.0.0/24"), ip_mask("y", "10.0.1.0/24")],
            vec![
                AddressGroup::new("a", ["b", "x"]),
                AddressGroup::new("b", ["a", "y"]),
            ],
        );
        assert_eq!(names(book.resolve("a")), vec!["y", "x"]);
        assert_eq!(names(book.resolve("b")), vec!["x", "y"]);
    }

    #[test]
    fn repeated_leaves_are_kept_but_subgroups_expand_once() {
        let book = address_book(
            vec![ip_mask("net", "10.0.0.0/24")],
            vec![
                AddressGroup::new("left", ["net"]),
                AddressGroup::new("right", ["net"]),
                AddressGroup::new("both", ["left", "right", "left"]),
            ],
        );
        assert_eq!(names(book.resolve("both")), vec!["net", "net"]);
    }

    #[test]
    fn shared_subgroup_under_two_parents_expands_once() {
        let book = address_book(
            vec![ip_mask("a", "10.0.0.0/24"), ip_mask("b", "10.0.1.0/24")],
            vec![
                AddressGroup::new("shared", ["a"]),
                AddressGroup::new("p1", ["shared", "b"]),
                AddressGroup::new("p2", ["shared"]),
                AddressGroup::new("top", ["p1", "p2"]),
            ],
        );
        assert_eq!(names(book.resolve("top")), vec!["a", "b"]);
        // Each call starts with a fresh set.
        assert_eq!(names(book.resolve("p2")), vec!["a"]);
    }

    #[test]
    fn diamond_chain_stays_linear() {
        let depth = 40;
        let mut groups: Vec<AddressGroup> = (0..depth)
            .map(|i| {
                let next = format!("g{}", i + 1);
                AddressGroup::new(format!("g{i}"), [next.clone(), next])
            })
            .collect();
        groups.push(AddressGroup::new(format!("g{depth}"), ["net"]));
        let book = address_book(vec![ip_mask("net", "10.0.0.0/24")], groups);

        assert_eq!(names(book.resolve("g0")), vec!["net"]);
    }

    #[test]
    fn object_wins_over_group_with_same_name() {
        let book = address_book(
            vec![ip_mask("dup", "10.0.0.0/24"), ip_mask("other", "10.9.0.0/24")],
            vec![AddressGroup::new("dup", ["other"])],
        );
        assert_eq!(names(book.resolve("dup")), vec!["dup"]);
    }

    #[test]
    fn resolve_all_concatenates_references() {
        let book = address_book(
            vec![ip_mask("a", "10.0.0.0/24"), ip_mask("b", "10.0.1.0/24")],
            vec![],
        );
        let refs = vec!["b".to_string(), "missing".to_string(), "a".to_string()];
        assert_eq!(names(book.resolve_all(&refs)), vec!["b", "a"]);
    }

    #[test]
    fn service_groups_resolve_through_cycles() {
        let book = service_book(
            vec![
                ServiceObject::new("web", vec![ServiceEntry::tcp(80, 80)]),
                ServiceObject::new("dns", vec![ServiceEntry::udp(53, 53)]),
            ],
            vec![
                ServiceGroup::new("g1", ["web", "g2"]),
                ServiceGroup::new("g2", ["g1", "dns", "nope"]),
            ],
        );
        let resolved: Vec<&str> = book.resolve("g1").iter().map(|s| s.name.as_str()).collect();
        assert_eq!(resolved, vec!["web", "dns"]);
    }
}
