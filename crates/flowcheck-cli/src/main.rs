//! CLI entry point for flowcheck.
//!
//! This module only handles argument parsing, logging setup, I/O, and exit codes.
//! All analysis logic lives in the `flowcheck-app` crate.

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Args, Parser, Subcommand};
use flowcheck_app::{
    AnalysisInput, ResolveTarget, analysis_exit_code, run_analysis, run_resolve, write_report,
    write_results, write_text,
};
use flowcheck_settings::Overrides;
use flowcheck_sources::RuleSource;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "flowcheck",
    version,
    about = "Offline firewall policy reachability analysis for network segments"
)]
struct Cli {
    /// Path to flowcheck settings TOML. A missing file means defaults.
    #[arg(long, global = true, default_value = "flowcheck.toml")]
    settings: Utf8PathBuf,

    /// Override profile (strict|sample|expand).
    #[arg(long, global = true)]
    profile: Option<String>,

    /// Log filter, e.g. `info` or `flowcheck_sources=debug`. Falls back to RUST_LOG.
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    cmd: Commands,
}

/// Where the policy set comes from. Exactly one must be given.
#[derive(Args, Debug)]
struct SourceArgs {
    /// FortiGate CLI configuration file.
    #[arg(long)]
    config: Option<Utf8PathBuf>,

    /// Excel workbook with Policy, Address, AddressGroup, Service, and ServiceGroup sheets.
    #[arg(long)]
    excel: Option<Utf8PathBuf>,

    /// SQLite database holding the policy tables.
    #[arg(long)]
    db_conn: Option<Utf8PathBuf>,
}

impl SourceArgs {
    fn into_source(self) -> anyhow::Result<RuleSource> {
        Ok(RuleSource::select(self.config, self.excel, self.db_conn)?)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Evaluate every (source, destination, port) tuple and write the results CSV.
    Analyze {
        #[command(flatten)]
        source: SourceArgs,

        /// Source network CSV (needs a `Network Segment` column).
        #[arg(long)]
        src_csv: Utf8PathBuf,

        /// Destination network CSV (`Network Segment`, optional `GN`, `Site`, `Location`).
        #[arg(long)]
        dst_csv: Utf8PathBuf,

        /// Port list, one `label,port/protocol` entry per line.
        #[arg(long)]
        ports: Utf8PathBuf,

        /// Where to write the results CSV.
        #[arg(long)]
        out: Utf8PathBuf,

        /// Treat every schedule as active.
        #[arg(long)]
        ignore_schedule: bool,

        /// Schedule name to treat as active. Repeatable.
        #[arg(long = "active-schedule", value_name = "NAME")]
        active_schedules: Vec<String>,

        /// Override match mode (segment|sample-ip|expand).
        #[arg(long)]
        match_mode: Option<String>,

        /// Override the host cap used by `expand`.
        #[arg(long)]
        max_hosts: Option<u32>,

        /// Where to write the JSON run report.
        #[arg(long)]
        report_out: Option<Utf8PathBuf>,

        /// Where to write the Markdown summary.
        #[arg(long)]
        markdown_out: Option<Utf8PathBuf>,

        /// Exit with code 2 if any decision is UNKNOWN.
        #[arg(long)]
        fail_on_unknown: bool,
    },

    /// Print the concrete objects an address or service name resolves to.
    Resolve {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        target: TargetArgs,
    },
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct TargetArgs {
    /// Address or address group name.
    #[arg(long)]
    address: Option<String>,

    /// Service or service group name.
    #[arg(long)]
    service: Option<String>,
}

impl TargetArgs {
    fn into_target(self) -> anyhow::Result<ResolveTarget> {
        match (self.address, self.service) {
            (Some(name), None) => Ok(ResolveTarget::Address(name)),
            (None, Some(name)) => Ok(ResolveTarget::Service(name)),
            _ => anyhow::bail!("specify exactly one of --address or --service"),
        }
    }
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = if err.use_stderr() { 1 } else { 0 };
            let _ = err.print();
            std::process::exit(code);
        }
    };

    init_tracing(cli.log_level.as_deref());

    let result = match cli.cmd {
        Commands::Analyze {
            source,
            src_csv,
            dst_csv,
            ports,
            out,
            ignore_schedule,
            active_schedules,
            match_mode,
            max_hosts,
            report_out,
            markdown_out,
            fail_on_unknown,
        } => {
            let overrides = Overrides {
                profile: cli.profile,
                match_mode,
                max_hosts,
                ignore_schedule: ignore_schedule.then_some(true),
                active_schedules,
                fail_on_unknown: fail_on_unknown.then_some(true),
            };
            let outputs = AnalyzeOutputs {
                out,
                report_out,
                markdown_out,
            };
            cmd_analyze(
                &cli.settings,
                source,
                &src_csv,
                &dst_csv,
                &ports,
                overrides,
                &outputs,
            )
        }
        Commands::Resolve { source, target } => cmd_resolve(source, target).map(|()| 0),
    };

    match result {
        Ok(0) => {}
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("flowcheck error: {err:#}");
            std::process::exit(1);
        }
    }
}

fn init_tracing(log_level: Option<&str>) {
    let filter = log_level
        .and_then(|level| EnvFilter::try_new(level).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

struct AnalyzeOutputs {
    out: Utf8PathBuf,
    report_out: Option<Utf8PathBuf>,
    markdown_out: Option<Utf8PathBuf>,
}

fn cmd_analyze(
    settings: &Utf8Path,
    source: SourceArgs,
    src_csv: &Utf8Path,
    dst_csv: &Utf8Path,
    ports: &Utf8Path,
    overrides: Overrides,
    outputs: &AnalyzeOutputs,
) -> anyhow::Result<i32> {
    let source = source.into_source()?;
    let settings_text = read_settings(settings)?;

    let output = run_analysis(AnalysisInput {
        source,
        src_csv,
        dst_csv,
        ports,
        config_text: &settings_text,
        overrides,
    })?;

    write_results(&outputs.out, &output.rows).context("write results csv")?;
    info!(rows = output.rows.len(), path = %outputs.out, "results written");

    if let Some(path) = &outputs.report_out {
        write_report(path, &output.report).context("write report json")?;
    }
    if let Some(path) = &outputs.markdown_out {
        let md = flowcheck_render::render_markdown(&output.report, &output.rows);
        write_text(path, &md).context("write markdown")?;
    }

    Ok(analysis_exit_code(&output))
}

fn cmd_resolve(source: SourceArgs, target: TargetArgs) -> anyhow::Result<()> {
    let source = source.into_source()?;
    let output = run_resolve(&source, &target.into_target()?)?;
    for line in output.lines {
        println!("{line}");
    }
    Ok(())
}

/// Settings are optional: a missing file yields an empty string and therefore defaults.
fn read_settings(path: &Utf8Path) -> anyhow::Result<String> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(text),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
        Err(err) => Err(err).with_context(|| format!("read settings: {path}")),
    }
}
