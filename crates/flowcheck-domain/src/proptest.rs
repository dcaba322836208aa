//! Property-based tests for the domain crate.
//!
//! These tests use proptest to verify invariants around:
//! - Resolver termination on arbitrary (possibly cyclic) group graphs
//! - First-match precedence and the implicit-deny fallback
//! - Containment agreement between the match modes

use crate::engine::evaluate;
use crate::match_mode::MatchMode;
use crate::model::{AddressGroup, Decision, PolicySet, Protocol};
use crate::test_support::{address_book, all_services, config, ip_mask, query, rule};
use ipnet::Ipv4Net;
use proptest::prelude::*;
use std::net::Ipv4Addr;

// ============================================================================
// Strategies
// ============================================================================

/// A group graph over `g0..gN` where each group names other groups (possibly itself) and
/// optionally the single leaf object `leaf`.
fn arb_group_graph() -> impl Strategy<Value = Vec<(Vec<usize>, bool)>> {
    (1usize..8).prop_flat_map(|n| {
        prop::collection::vec((prop::collection::vec(0..n, 0..4), any::<bool>()), n)
    })
}

fn arb_network() -> impl Strategy<Value = Ipv4Net> {
    (any::<u32>(), 8u8..=32).prop_map(|(bits, prefix)| {
        Ipv4Net::new(Ipv4Addr::from(bits), prefix)
            .expect("prefix in range")
            .trunc()
    })
}

fn arb_protocol() -> impl Strategy<Value = Protocol> {
    prop_oneof![Just(Protocol::Tcp), Just(Protocol::Udp)]
}

fn arb_action() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("accept".to_string()),
        Just("deny".to_string()),
        "[a-z]{1,8}",
    ]
}

// ============================================================================
// Resolver
// ============================================================================

proptest! {
    #[test]
    fn resolution_terminates_and_yields_only_the_leaf(graph in arb_group_graph()) {
        let groups = graph
            .iter()
            .enumerate()
            .map(|(i, (edges, has_leaf))| {
                let mut members: Vec<String> = edges.iter().map(|e| format!("g{e}")).collect();
                if *has_leaf {
                    members.push("leaf".to_string());
                }
                AddressGroup::new(format!("g{i}"), members)
            })
            .collect();
        let book = address_book(vec![ip_mask("leaf", "10.0.0.0/8")], groups);

        let leaf_listings = graph.iter().filter(|(_, has_leaf)| *has_leaf).count();
        for i in 0..graph.len() {
            let resolved = book.resolve(&format!("g{i}"));
            prop_assert!(resolved.iter().all(|o| o.name == "leaf"));
            // Every group expands at most once per call.
            prop_assert!(resolved.len() <= leaf_listings);
            if graph[i].1 {
                prop_assert!(!resolved.is_empty());
            }
        }
    }

    #[test]
    fn distinct_members_resolve_in_order(count in 1usize..20) {
        let objects = (0..count)
            .map(|i| ip_mask(&format!("obj{i}"), &format!("10.{i}.0.0/16")))
            .collect();
        let members: Vec<String> = (0..count).map(|i| format!("obj{i}")).collect();
        let book = address_book(objects, vec![AddressGroup::new("all", members.clone())]);

        let names: Vec<String> = book.resolve("all").iter().map(|o| o.name.clone()).collect();
        prop_assert_eq!(names, members);
    }
}

// ============================================================================
// Evaluator
// ============================================================================

proptest! {
    #[test]
    fn empty_policy_list_always_denies(
        src in arb_network(),
        dst in arb_network(),
        protocol in arb_protocol(),
        port in any::<u16>(),
    ) {
        let set = PolicySet::default();
        let q = crate::model::FlowQuery { src, dst, protocol, port };
        for mode in [MatchMode::segment(), MatchMode::sample_ip(), MatchMode::expand(4)] {
            let result = evaluate(&set, &q, &config(mode));
            prop_assert_eq!(result.decision, Decision::Deny);
            prop_assert!(result.matched_policy_id.is_none());
        }
    }

    #[test]
    fn first_matching_rule_wins(actions in prop::collection::vec(arb_action(), 1..6)) {
        let policies = actions
            .iter()
            .enumerate()
            .map(|(i, action)| rule(&(i + 1).to_string(), &["any"], &["any"], &["ALL"], action))
            .collect();
        let set = PolicySet {
            policies,
            address_book: address_book(vec![ip_mask("any", "0.0.0.0/0")], vec![]),
            service_book: all_services(),
        };
        let result = evaluate(
            &set,
            &query("192.168.0.0/24", "172.16.0.0/12", Protocol::Tcp, 443),
            &config(MatchMode::segment()),
        );
        prop_assert_eq!(result.matched_policy_id.as_deref(), Some("1"));
        prop_assert_eq!(result.matched_policy_action.as_deref(), Some(actions[0].as_str()));
    }

    #[test]
    fn segment_match_implies_looser_modes_match(rule_net in arb_network(), q_net in arb_network()) {
        let set = PolicySet {
            policies: vec![rule("1", &["r"], &["r"], &["ALL"], "accept")],
            address_book: address_book(
                vec![crate::model::AddressObject::ip_mask("r", rule_net)],
                vec![],
            ),
            service_book: all_services(),
        };
        let q = crate::model::FlowQuery { src: q_net, dst: q_net, protocol: Protocol::Udp, port: 53 };
        let strict = evaluate(&set, &q, &config(MatchMode::segment()));
        if strict.decision == Decision::Allow {
            prop_assert_eq!(evaluate(&set, &q, &config(MatchMode::sample_ip())).decision, Decision::Allow);
            prop_assert_eq!(evaluate(&set, &q, &config(MatchMode::expand(16))).decision, Decision::Allow);
        }
    }
}
