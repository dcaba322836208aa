//! Writing run artifacts to disk.

use anyhow::Context;
use camino::Utf8Path;
use flowcheck_types::{AnalysisReport, ResultRow};

fn create_parent(path: &Utf8Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_str().is_empty()
    {
        std::fs::create_dir_all(parent).with_context(|| format!("create {parent}"))?;
    }
    Ok(())
}

/// Write the results CSV.
pub fn write_results(path: &Utf8Path, rows: &[ResultRow]) -> anyhow::Result<()> {
    create_parent(path)?;
    let file = std::fs::File::create(path).with_context(|| format!("create {path}"))?;
    flowcheck_render::write_results_csv(std::io::BufWriter::new(file), rows)
        .with_context(|| format!("write {path}"))?;
    Ok(())
}

/// Write the JSON run report.
pub fn write_report(path: &Utf8Path, report: &AnalysisReport) -> anyhow::Result<()> {
    create_parent(path)?;
    let mut json = serde_json::to_string_pretty(report).context("serialize report")?;
    json.push('\n');
    std::fs::write(path, json).with_context(|| format!("write {path}"))?;
    Ok(())
}

pub fn write_text(path: &Utf8Path, text: &str) -> anyhow::Result<()> {
    create_parent(path)?;
    std::fs::write(path, text).with_context(|| format!("write {path}"))?;
    Ok(())
}
