//! Stable identifiers: schema ids, reason texts, and output column names.

// Schemas
pub const SCHEMA_CONFIG_V1: &str = "flowcheck.config.v1";

// Reasons
pub const REASON_IMPLICIT_DENY: &str = "no matching policy; implicit deny";

// Well-known names
pub const SCHEDULE_ALWAYS: &str = "always";

// Result row columns, in output order.
pub const COL_SRC_NETWORK_SEGMENT: &str = "src_network_segment";
pub const COL_DST_NETWORK_SEGMENT: &str = "dst_network_segment";
pub const COL_DST_GN: &str = "dst_gn";
pub const COL_DST_SITE: &str = "dst_site";
pub const COL_DST_LOCATION: &str = "dst_location";
pub const COL_SERVICE_LABEL: &str = "service_label";
pub const COL_PROTOCOL: &str = "protocol";
pub const COL_PORT: &str = "port";
pub const COL_DECISION: &str = "decision";
pub const COL_MATCHED_POLICY_ID: &str = "matched_policy_id";
pub const COL_MATCHED_POLICY_NAME: &str = "matched_policy_name";
pub const COL_MATCHED_POLICY_ACTION: &str = "matched_policy_action";
pub const COL_REASON: &str = "reason";

pub const RESULT_COLUMNS: [&str; 13] = [
    COL_SRC_NETWORK_SEGMENT,
    COL_DST_NETWORK_SEGMENT,
    COL_DST_GN,
    COL_DST_SITE,
    COL_DST_LOCATION,
    COL_SERVICE_LABEL,
    COL_PROTOCOL,
    COL_PORT,
    COL_DECISION,
    COL_MATCHED_POLICY_ID,
    COL_MATCHED_POLICY_NAME,
    COL_MATCHED_POLICY_ACTION,
    COL_REASON,
];

// Input columns
pub const INPUT_NETWORK_SEGMENT: &str = "Network Segment";
pub const INPUT_GN: &str = "GN";
pub const INPUT_SITE: &str = "Site";
pub const INPUT_LOCATION: &str = "Location";
