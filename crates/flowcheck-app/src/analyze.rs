//! The `analyze` use case: load everything, evaluate the cross-product, build the report.

use anyhow::Context;
use camino::Utf8Path;
use flowcheck_domain::audit::unresolved_references;
use flowcheck_domain::model::{FlowQuery, MatchDetail, PolicySet};
use flowcheck_domain::policy::EffectiveConfig;
use flowcheck_settings::{FlowcheckConfigV1, Overrides, ResolvedConfig};
use flowcheck_sources::{NetworkRecord, PortSpec, RuleSource};
use flowcheck_types::ids::{INPUT_GN, INPUT_LOCATION, INPUT_SITE};
use flowcheck_types::{
    AnalysisData, AnalysisReport, Decision, DecisionCounts, ResultRow, SCHEMA_REPORT_V1, ToolMeta,
};
use rayon::prelude::*;
use time::OffsetDateTime;
use tracing::{info, warn};

/// Input for the analyze use case.
#[derive(Clone, Debug)]
pub struct AnalysisInput<'a> {
    pub source: RuleSource,
    pub src_csv: &'a Utf8Path,
    pub dst_csv: &'a Utf8Path,
    pub ports: &'a Utf8Path,
    /// Config file contents (empty string if not found).
    pub config_text: &'a str,
    /// CLI overrides.
    pub overrides: Overrides,
}

/// Output from the analyze use case.
#[derive(Clone, Debug)]
pub struct AnalysisOutput {
    /// One row per (source, destination, port), source-major.
    pub rows: Vec<ResultRow>,
    pub report: AnalysisReport,
    /// The resolved configuration used.
    pub resolved_config: ResolvedConfig,
}

/// Run the analyze use case. Every input is loaded and validated before the first evaluation.
pub fn run_analysis(input: AnalysisInput<'_>) -> anyhow::Result<AnalysisOutput> {
    let started_at = OffsetDateTime::now_utc();

    // Parse config (empty is allowed, defaults apply).
    let cfg = if input.config_text.trim().is_empty() {
        FlowcheckConfigV1::default()
    } else {
        flowcheck_settings::parse_config_toml(input.config_text).context("parse config")?
    };
    let resolved =
        flowcheck_settings::resolve_config(cfg, input.overrides.clone()).context("resolve config")?;
    let effective = &resolved.effective;

    let set = flowcheck_sources::load_policy_set(&input.source)
        .with_context(|| format!("load {} rules from {}", input.source.kind(), input.source.path()))?;
    let sources = flowcheck_sources::inputs::read_network_csv(input.src_csv)
        .context("load source networks")?;
    let destinations = flowcheck_sources::inputs::read_network_csv(input.dst_csv)
        .context("load destination networks")?;
    let ports =
        flowcheck_sources::inputs::read_port_specs(input.ports).context("load port specs")?;

    let unresolved: Vec<String> = unresolved_references(&set)
        .iter()
        .map(ToString::to_string)
        .collect();
    for reference in &unresolved {
        warn!("{reference}");
    }

    info!(
        profile = %effective.profile,
        match_mode = %effective.match_mode.kind,
        tuples = sources.len() * destinations.len() * ports.len(),
        "evaluating"
    );
    let rows = evaluate_cross_product(&set, &sources, &destinations, &ports, effective);
    let counts = DecisionCounts::from_rows(&rows);
    info!(
        allow = counts.allow,
        deny = counts.deny,
        unknown = counts.unknown,
        "evaluation finished"
    );

    let finished_at = OffsetDateTime::now_utc();
    let report = AnalysisReport {
        schema: SCHEMA_REPORT_V1.to_string(),
        tool: ToolMeta {
            name: "flowcheck".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        started_at,
        finished_at,
        data: AnalysisData {
            profile: effective.profile.clone(),
            match_mode: effective.match_mode.kind.to_string(),
            max_hosts: report_count(effective.match_mode.max_hosts),
            ignore_schedule: effective.schedules.ignore,
            policies: report_count(set.policies.len()),
            sources: report_count(sources.len()),
            destinations: report_count(destinations.len()),
            ports: report_count(ports.len()),
            counts,
            unresolved_references: unresolved,
        },
    };

    Ok(AnalysisOutput {
        rows,
        report,
        resolved_config: resolved,
    })
}

/// Report counters saturate rather than wrap.
fn report_count(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

/// Evaluate every (source, destination, port) tuple.
///
/// Sources are spread across the rayon pool; the result order is source-major, then destination,
/// then port, the same as a sequential triple loop.
pub fn evaluate_cross_product(
    set: &PolicySet,
    sources: &[NetworkRecord],
    destinations: &[NetworkRecord],
    ports: &[PortSpec],
    cfg: &EffectiveConfig,
) -> Vec<ResultRow> {
    sources
        .par_iter()
        .flat_map_iter(|src| rows_for_source(set, src, destinations, ports, cfg))
        .collect()
}

fn rows_for_source(
    set: &PolicySet,
    src: &NetworkRecord,
    destinations: &[NetworkRecord],
    ports: &[PortSpec],
    cfg: &EffectiveConfig,
) -> Vec<ResultRow> {
    let mut rows = Vec::with_capacity(destinations.len() * ports.len());
    for dst in destinations {
        for port in ports {
            let query = FlowQuery {
                src: src.segment,
                dst: dst.segment,
                protocol: port.protocol,
                port: port.port,
            };
            let detail = flowcheck_domain::evaluate(set, &query, cfg);
            rows.push(result_row(src, dst, port, detail));
        }
    }
    rows
}

fn result_row(
    src: &NetworkRecord,
    dst: &NetworkRecord,
    port: &PortSpec,
    detail: MatchDetail,
) -> ResultRow {
    ResultRow {
        src_network_segment: src.segment.to_string(),
        dst_network_segment: dst.segment.to_string(),
        dst_gn: dst.field(INPUT_GN).to_string(),
        dst_site: dst.field(INPUT_SITE).to_string(),
        dst_location: dst.field(INPUT_LOCATION).to_string(),
        service_label: port.label.clone(),
        protocol: port.protocol,
        port: port.port,
        decision: detail.decision,
        matched_policy_id: detail.matched_policy_id.unwrap_or_default(),
        matched_policy_name: detail.matched_policy_name.unwrap_or_default(),
        matched_policy_action: detail.matched_policy_action.unwrap_or_default(),
        reason: detail.reason,
    }
}

/// Map a finished run to an exit code: 2 when UNKNOWN rows should fail the run, else 0.
pub fn analysis_exit_code(output: &AnalysisOutput) -> i32 {
    let has_unknown = output.rows.iter().any(|r| r.decision == Decision::Unknown);
    if output.resolved_config.effective.fail_on_unknown && has_unknown {
        2
    } else {
        0
    }
}
