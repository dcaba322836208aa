//! Source adapters: load a policy set from a FortiGate config, a rules workbook, or a SQLite
//! store, and read the traffic inputs (network CSVs, port specs).
//!
//! This crate is allowed to do filesystem IO. Every adapter produces the same canonical
//! [`PolicySet`], seeded with the default service catalog.

#![forbid(unsafe_code)]

mod builder;
pub mod db;
mod error;
pub mod excel;
pub mod fortigate;
pub mod inputs;
pub mod shorthand;
mod values;

use camino::{Utf8Path, Utf8PathBuf};
use flowcheck_domain::model::PolicySet;
use tracing::info;

pub use error::SourceError;
pub use inputs::{NetworkRecord, PortSpec};

/// Fuzz-friendly API for testing parsing robustness without filesystem access.
/// These functions are designed to never panic on any input.
pub mod fuzz {
    use super::*;

    /// Parse arbitrary text as a FortiGate configuration. **Never panics** on any input.
    pub fn parse_fortigate_config(text: &str) -> Result<(), SourceError> {
        let _ = fortigate::parse_fortigate_config(text)?;
        Ok(())
    }

    /// Parse arbitrary text as a port spec list. **Never panics** on any input.
    pub fn parse_port_specs(text: &str) -> Result<(), SourceError> {
        let _ = inputs::parse_port_specs(text)?;
        Ok(())
    }
}

/// Where the policy set comes from. Exactly one per run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RuleSource {
    FortiGate(Utf8PathBuf),
    Excel(Utf8PathBuf),
    Database(Utf8PathBuf),
}

impl RuleSource {
    /// Pick the single source given on the command line.
    pub fn select(
        config: Option<Utf8PathBuf>,
        excel: Option<Utf8PathBuf>,
        db_conn: Option<Utf8PathBuf>,
    ) -> Result<Self, SourceError> {
        match (config, excel, db_conn) {
            (Some(path), None, None) => Ok(RuleSource::FortiGate(path)),
            (None, Some(path), None) => Ok(RuleSource::Excel(path)),
            (None, None, Some(path)) => Ok(RuleSource::Database(path)),
            _ => Err(SourceError::RuleSourceSelection),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            RuleSource::FortiGate(_) => "fortigate",
            RuleSource::Excel(_) => "excel",
            RuleSource::Database(_) => "database",
        }
    }

    pub fn path(&self) -> &Utf8Path {
        match self {
            RuleSource::FortiGate(path) | RuleSource::Excel(path) | RuleSource::Database(path) => {
                path
            }
        }
    }
}

/// Load and normalize the policy set from `source`.
pub fn load_policy_set(source: &RuleSource) -> Result<PolicySet, SourceError> {
    info!(kind = source.kind(), path = %source.path(), "loading policy set");
    match source {
        RuleSource::FortiGate(path) => {
            let text =
                std::fs::read_to_string(path).map_err(|e| SourceError::io(path.as_str(), e))?;
            fortigate::parse_fortigate_config(&text)
        }
        RuleSource::Excel(path) => excel::load_excel(path),
        RuleSource::Database(path) => db::load_database(path),
    }
}
