use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{Decision, Protocol};

/// One evaluated `(source, destination, service)` tuple, as written to the results CSV.
///
/// Field order is the CSV column order (see [`crate::ids::RESULT_COLUMNS`]).
/// Matched-policy fields are empty strings when no policy matched.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ResultRow {
    pub src_network_segment: String,
    pub dst_network_segment: String,
    pub dst_gn: String,
    pub dst_site: String,
    pub dst_location: String,
    pub service_label: String,
    pub protocol: Protocol,
    pub port: u16,
    pub decision: Decision,
    pub matched_policy_id: String,
    pub matched_policy_name: String,
    pub matched_policy_action: String,
    pub reason: String,
}
