use flowcheck_types::{AnalysisReport, Decision, ResultRow};

/// Markdown summary of a run. UNKNOWN rows are listed individually since they need a human.
pub fn render_markdown(report: &AnalysisReport, rows: &[ResultRow]) -> String {
    let data = &report.data;
    let mut out = String::new();

    out.push_str("# Flowcheck summary\n\n");
    out.push_str(&format!(
        "- Profile: `{}` (match mode `{}`, max hosts {})\n",
        data.profile, data.match_mode, data.max_hosts
    ));
    out.push_str(&format!(
        "- Inputs: {} policies, {} sources x {} destinations x {} ports\n",
        data.policies, data.sources, data.destinations, data.ports
    ));
    if data.ignore_schedule {
        out.push_str("- Schedules: ignored\n");
    }
    out.push('\n');

    out.push_str("| Decision | Rows |\n|---|---:|\n");
    out.push_str(&format!("| ALLOW | {} |\n", data.counts.allow));
    out.push_str(&format!(
        "| DENY | {} (implicit: {}) |\n",
        data.counts.deny, data.counts.implicit_deny
    ));
    out.push_str(&format!("| UNKNOWN | {} |\n", data.counts.unknown));
    out.push_str(&format!("| Total | {} |\n\n", data.counts.total()));

    let unknown: Vec<&ResultRow> = rows
        .iter()
        .filter(|r| r.decision == Decision::Unknown)
        .collect();
    if !unknown.is_empty() {
        out.push_str("## Unknown decisions\n\n");
        for r in unknown {
            out.push_str(&format!(
                "- `{}` -> `{}` {} ({}/{}): {}\n",
                r.src_network_segment,
                r.dst_network_segment,
                r.service_label,
                r.port,
                r.protocol,
                r.reason
            ));
        }
        out.push('\n');
    }

    if !data.unresolved_references.is_empty() {
        out.push_str("## Unresolved references\n\n");
        for reference in &data.unresolved_references {
            out.push_str(&format!("- {reference}\n"));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowcheck_types::{AnalysisData, DecisionCounts, Protocol, SCHEMA_REPORT_V1, ToolMeta};
    use time::macros::datetime;

    fn report(counts: DecisionCounts, unresolved: Vec<String>) -> AnalysisReport {
        AnalysisReport {
            schema: SCHEMA_REPORT_V1.to_string(),
            tool: ToolMeta {
                name: "flowcheck".to_string(),
                version: "0.1.0".to_string(),
            },
            started_at: datetime!(2026-01-01 0:00 UTC),
            finished_at: datetime!(2026-01-01 0:01 UTC),
            data: AnalysisData {
                profile: "strict".to_string(),
                match_mode: "segment".to_string(),
                max_hosts: 256,
                ignore_schedule: false,
                policies: 3,
                sources: 1,
                destinations: 2,
                ports: 2,
                counts,
                unresolved_references: unresolved,
            },
        }
    }

    #[test]
    fn renders_counts_without_sections_when_clean() {
        let counts = DecisionCounts {
            allow: 3,
            deny: 1,
            unknown: 0,
            implicit_deny: 1,
        };
        let md = render_markdown(&report(counts, Vec::new()), &[]);
        assert!(md.contains("# Flowcheck summary"));
        assert!(md.contains("| ALLOW | 3 |"));
        assert!(md.contains("| DENY | 1 (implicit: 1) |"));
        assert!(md.contains("| Total | 4 |"));
        assert!(!md.contains("## Unknown decisions"));
        assert!(!md.contains("## Unresolved references"));
    }

    #[test]
    fn lists_unknown_rows_and_unresolved_references() {
        let counts = DecisionCounts {
            allow: 0,
            deny: 0,
            unknown: 1,
            implicit_deny: 0,
        };
        let row = ResultRow {
            src_network_segment: "10.0.0.0/24".to_string(),
            dst_network_segment: "10.1.0.0/24".to_string(),
            dst_gn: String::new(),
            dst_site: String::new(),
            dst_location: String::new(),
            service_label: "https".to_string(),
            protocol: Protocol::Tcp,
            port: 443,
            decision: Decision::Unknown,
            matched_policy_id: "4".to_string(),
            matched_policy_name: "vpn".to_string(),
            matched_policy_action: "ipsec".to_string(),
            reason: "matched policy 4 (vpn): unrecognized action 'ipsec'".to_string(),
        };
        let md = render_markdown(
            &report(counts, vec!["policy 4: srcaddr 'ghost' is not defined".to_string()]),
            &[row],
        );
        assert!(md.contains("## Unknown decisions"));
        assert!(md.contains("`10.0.0.0/24` -> `10.1.0.0/24` https (443/tcp)"));
        assert!(md.contains("- policy 4: srcaddr 'ghost' is not defined"));
    }
}
