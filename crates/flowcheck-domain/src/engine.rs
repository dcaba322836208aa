use crate::classify::ActionClassifier;
use crate::containment::service_object_matches;
use crate::match_mode::MatchMode;
use crate::model::{
    AddressBook, Decision, FlowQuery, MatchDetail, PolicyRule, PolicySet, Protocol, ServiceBook,
};
use crate::policy::EffectiveConfig;
use ipnet::Ipv4Net;
use tracing::trace;

/// Evaluate one traffic tuple against a policy set, classifying actions with the configured
/// vocabulary.
pub fn evaluate(set: &PolicySet, query: &FlowQuery, cfg: &EffectiveConfig) -> MatchDetail {
    evaluate_policies(
        &set.policies,
        &set.address_book,
        &set.service_book,
        query,
        cfg,
        &cfg.actions,
    )
}

/// First-match-wins scan over `policies` in list order.
///
/// Never fails: unresolved names and malformed definitions only make a predicate false.
/// When nothing matches the result is an implicit deny with no matched-policy fields.
pub fn evaluate_policies<C>(
    policies: &[PolicyRule],
    address_book: &AddressBook,
    service_book: &ServiceBook,
    query: &FlowQuery,
    cfg: &EffectiveConfig,
    classifier: &C,
) -> MatchDetail
where
    C: ActionClassifier + ?Sized,
{
    for rule in policies {
        if !rule.enabled {
            trace!(policy_id = %rule.policy_id, "skip: disabled");
            continue;
        }
        if !cfg.schedules.is_active(rule.schedule.as_deref()) {
            trace!(policy_id = %rule.policy_id, schedule = ?rule.schedule, "skip: schedule inactive");
            continue;
        }
        if !addresses_cover(address_book, &rule.source, &query.src, cfg.match_mode) {
            continue;
        }
        if !addresses_cover(address_book, &rule.destination, &query.dst, cfg.match_mode) {
            continue;
        }
        if !services_match(service_book, &rule.services, query.protocol, query.port) {
            continue;
        }

        let decision = classifier.classify(&rule.action);
        trace!(policy_id = %rule.policy_id, %decision, "matched");
        return matched(rule, decision);
    }

    MatchDetail::implicit_deny()
}

fn addresses_cover(
    book: &AddressBook,
    references: &[String],
    network: &Ipv4Net,
    mode: MatchMode,
) -> bool {
    references.iter().any(|name| {
        let resolved = book.resolve(name);
        mode.covers(&resolved, network)
    })
}

fn services_match(book: &ServiceBook, references: &[String], protocol: Protocol, port: u16) -> bool {
    references.iter().any(|name| {
        book.resolve(name)
            .into_iter()
            .any(|service| service_object_matches(service, protocol, port))
    })
}

fn matched(rule: &PolicyRule, decision: Decision) -> MatchDetail {
    let label = if rule.name.is_empty() {
        rule.policy_id.as_str()
    } else {
        rule.name.as_str()
    };
    let reason = match decision {
        Decision::Unknown => format!(
            "matched policy {} ({}): unrecognized action '{}'",
            rule.policy_id, label, rule.action
        ),
        Decision::Allow | Decision::Deny => format!(
            "matched policy {} ({}): action {}",
            rule.policy_id, label, rule.action
        ),
    };

    MatchDetail {
        decision,
        matched_policy_id: Some(rule.policy_id.clone()),
        matched_policy_name: Some(rule.name.clone()),
        matched_policy_action: Some(rule.action.clone()),
        reason,
    }
}
