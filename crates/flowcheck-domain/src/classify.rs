//! Mapping raw action text to a decision.
//!
//! Sources use different vocabularies (`accept`, `permit`, `allow`, ...), so classification is
//! injected into the evaluator instead of hardcoded there.

use crate::model::Decision;

/// Total function from action text to decision.
pub trait ActionClassifier {
    fn classify(&self, action: &str) -> Decision;
}

impl<F> ActionClassifier for F
where
    F: Fn(&str) -> Decision,
{
    fn classify(&self, action: &str) -> Decision {
        self(action)
    }
}

/// Exact, case-sensitive vocabulary. Anything not listed is `Unknown`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionVocabulary {
    pub allow: Vec<String>,
    pub deny: Vec<String>,
}

impl Default for ActionVocabulary {
    fn default() -> Self {
        Self {
            allow: ["accept", "permit", "allow"].map(String::from).to_vec(),
            deny: ["deny", "drop", "reject"].map(String::from).to_vec(),
        }
    }
}

impl ActionClassifier for ActionVocabulary {
    fn classify(&self, action: &str) -> Decision {
        if self.allow.iter().any(|a| a == action) {
            Decision::Allow
        } else if self.deny.iter().any(|d| d == action) {
            Decision::Deny
        } else {
            Decision::Unknown
        }
    }
}
