use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// `flowcheck.toml` schema v1.
///
/// Every field is optional; anything left out falls back to the selected profile.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FlowcheckConfigV1 {
    /// Optional schema string for tooling (`flowcheck.config.v1`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Preset to start from: `strict` (default), `sample`, or `expand`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,

    /// `segment`, `sample-ip`, or `expand`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_mode: Option<String>,

    /// Host cap for `expand` mode. Must be at least 1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_hosts: Option<u32>,

    /// Treat every named schedule as active.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore_schedule: Option<bool>,

    /// Named schedules considered active.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub active_schedules: Vec<String>,

    /// Exit with code 2 when any tuple is `UNKNOWN`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fail_on_unknown: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actions: Option<ActionsConfig>,
}

/// Replacement action vocabulary. A list that is present replaces the default list entirely.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ActionsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deny: Option<Vec<String>>,
}
