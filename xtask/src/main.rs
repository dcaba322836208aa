//! Developer tasks (schema generation, fixture conformance).
//!
//! Keeping this separate avoids bloating the end-user CLI.

use anyhow::{Context, bail};
use schemars::schema_for;
use std::fs;
use std::path::{Path, PathBuf};

/// Get the project root (parent of xtask directory).
fn project_root() -> anyhow::Result<PathBuf> {
    let manifest_dir = match std::env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(_) => std::env::current_dir().context("determine current directory")?,
    };

    if manifest_dir.ends_with("xtask") {
        manifest_dir
            .parent()
            .map(Path::to_path_buf)
            .context("xtask has no parent directory")
    } else {
        Ok(manifest_dir)
    }
}

fn schemas_dir() -> anyhow::Result<PathBuf> {
    Ok(project_root()?.join("schemas"))
}

/// Schema definition with its target filename.
struct SchemaSpec {
    filename: &'static str,
    generate: fn() -> schemars::Schema,
}

fn generate_report_schema() -> schemars::Schema {
    schema_for!(flowcheck_types::AnalysisReport)
}

fn generate_config_schema() -> schemars::Schema {
    schema_for!(flowcheck_settings::FlowcheckConfigV1)
}

fn schema_specs() -> Vec<SchemaSpec> {
    vec![
        SchemaSpec {
            filename: "flowcheck.report.v1.json",
            generate: generate_report_schema,
        },
        SchemaSpec {
            filename: "flowcheck.config.v1.json",
            generate: generate_config_schema,
        },
    ]
}

/// Serialize a schema to pretty-printed JSON with trailing newline.
fn serialize_schema(schema: &schemars::Schema) -> anyhow::Result<String> {
    let mut json = serde_json::to_string_pretty(schema).context("serialize schema")?;
    json.push('\n');
    Ok(json)
}

fn emit_schemas() -> anyhow::Result<()> {
    let dir = schemas_dir()?;
    fs::create_dir_all(&dir).context("create schemas directory")?;

    for spec in schema_specs() {
        let json = serialize_schema(&(spec.generate)())?;
        let path = dir.join(spec.filename);
        fs::write(&path, &json).with_context(|| format!("write {}", path.display()))?;
        println!("Wrote {}", path.display());
    }
    Ok(())
}

/// Check that schemas/ matches what would be generated.
fn validate_schemas() -> anyhow::Result<()> {
    let dir = schemas_dir()?;
    let mut missing = Vec::new();
    let mut mismatched = Vec::new();

    for spec in schema_specs() {
        let path = dir.join(spec.filename);
        if !path.exists() {
            missing.push(spec.filename);
            continue;
        }
        let expected = serialize_schema(&(spec.generate)())?;
        let actual =
            fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
        if expected != actual {
            mismatched.push(spec.filename);
        }
    }

    if missing.is_empty() && mismatched.is_empty() {
        println!("All schemas are up to date.");
        return Ok(());
    }
    for name in &missing {
        eprintln!("missing: {name}");
    }
    for name in &mismatched {
        eprintln!("out of date: {name}");
    }
    eprintln!("\nRun `cargo xtask emit-schemas` to regenerate.");
    bail!("schema validation failed")
}

/// Run the built `flowcheck` binary on every fixture and validate the JSON report it writes
/// against the generated report schema.
fn conform() -> anyhow::Result<()> {
    let root = project_root()?;
    let schema = serde_json::to_value(generate_report_schema()).context("schema to json")?;
    let validator = jsonschema::validator_for(&schema)
        .map_err(|e| anyhow::anyhow!("compile report schema: {e}"))?;

    let mut binary = root.join("target").join("debug").join("flowcheck");
    if cfg!(target_os = "windows") {
        binary.set_extension("exe");
    }
    if !binary.exists() {
        bail!(
            "flowcheck binary not found at {}. Run `cargo build -p flowcheck-cli` first.",
            binary.display()
        );
    }

    let fixtures = root.join("tests").join("fixtures");
    let mut errors = Vec::new();
    let mut checked = 0;

    for entry in fs::read_dir(&fixtures).context("read tests/fixtures/")? {
        let dir = entry?.path();
        if !dir.join("fortigate.conf").exists() {
            continue;
        }
        let name = dir
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        let tmp = tempfile::tempdir().context("create temp dir")?;
        let report_out = tmp.path().join("report.json");
        let output = std::process::Command::new(&binary)
            .arg("analyze")
            .arg("--config")
            .arg(dir.join("fortigate.conf"))
            .arg("--src-csv")
            .arg(dir.join("src.csv"))
            .arg("--dst-csv")
            .arg(dir.join("dst.csv"))
            .arg("--ports")
            .arg(dir.join("ports.txt"))
            .arg("--out")
            .arg(tmp.path().join("results.csv"))
            .arg("--report-out")
            .arg(&report_out)
            .output()
            .with_context(|| format!("run flowcheck on fixture '{name}'"))?;

        if !output.status.success() {
            errors.push(format!(
                "fixture '{name}': flowcheck exited with {:?}: {}",
                output.status.code(),
                String::from_utf8_lossy(&output.stderr)
            ));
            continue;
        }

        let text = fs::read_to_string(&report_out)
            .with_context(|| format!("read report for fixture '{name}'"))?;
        let report: serde_json::Value = serde_json::from_str(&text)
            .with_context(|| format!("parse report for fixture '{name}'"))?;
        for err in validator.iter_errors(&report) {
            errors.push(format!("fixture '{name}': schema validation: {err}"));
        }
        checked += 1;
        println!("  ok {name}");
    }

    if checked == 0 && errors.is_empty() {
        bail!("no fixtures found in {}", fixtures.display());
    }
    if !errors.is_empty() {
        for err in &errors {
            eprintln!("  - {err}");
        }
        bail!("conformance failed with {} errors", errors.len());
    }
    println!("\nAll {checked} fixtures produce schema-valid reports.");
    Ok(())
}

fn print_help() {
    eprintln!("xtask commands:");
    eprintln!("  help              Show this message");
    eprintln!("  emit-schemas      Generate JSON schemas from Rust types to schemas/");
    eprintln!("  validate-schemas  Check if schemas/ matches generated output (for CI)");
    eprintln!("  print-schema-ids  Print known schema IDs");
    eprintln!("  conform           Run flowcheck on tests/fixtures and validate the reports");
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let cmd = args.get(1).map(|s| s.as_str()).unwrap_or("help");

    match cmd {
        "help" | "--help" | "-h" => {
            print_help();
            Ok(())
        }
        "emit-schemas" => emit_schemas(),
        "validate-schemas" => validate_schemas(),
        "conform" => conform(),
        "print-schema-ids" => {
            for spec in schema_specs() {
                println!("{}", spec.filename.trim_end_matches(".json"));
            }
            Ok(())
        }
        other => bail!("unknown xtask command: {other}\n\nRun `cargo xtask help` for usage."),
    }
    .context("xtask failed")
}
