use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Decision, ResultRow};

/// Stable schema identifier for the run report.
pub const SCHEMA_REPORT_V1: &str = "flowcheck.report.v1";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ToolMeta {
    pub name: String,
    pub version: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DecisionCounts {
    pub allow: u32,
    pub deny: u32,
    pub unknown: u32,
    /// Subset of `deny` where no policy matched at all.
    pub implicit_deny: u32,
}

impl DecisionCounts {
    pub fn from_rows(rows: &[ResultRow]) -> Self {
        let mut counts = DecisionCounts::default();
        for row in rows {
            match row.decision {
                Decision::Allow => counts.allow += 1,
                Decision::Deny => {
                    counts.deny += 1;
                    if row.matched_policy_id.is_empty() {
                        counts.implicit_deny += 1;
                    }
                }
                Decision::Unknown => counts.unknown += 1,
            }
        }
        counts
    }

    pub fn total(&self) -> u32 {
        self.allow + self.deny + self.unknown
    }
}

/// Flowcheck-specific summary payload for the report.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct AnalysisData {
    pub profile: String,
    pub match_mode: String,
    pub max_hosts: u32,
    pub ignore_schedule: bool,

    pub policies: u32,
    pub sources: u32,
    pub destinations: u32,
    pub ports: u32,

    pub counts: DecisionCounts,

    /// Dangling object/service references found in the policy set.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unresolved_references: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AnalysisReport {
    /// Versioned schema identifier for the envelope shape.
    pub schema: String,
    pub tool: ToolMeta,
    #[schemars(with = "String")]
    #[serde(with = "time::serde::rfc3339")]
    pub started_at: OffsetDateTime,
    #[schemars(with = "String")]
    #[serde(with = "time::serde::rfc3339")]
    pub finished_at: OffsetDateTime,
    pub data: AnalysisData,
}
