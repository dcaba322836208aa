//! Config parsing and profile/preset resolution.
//!
//! This crate does no IO: it parses and resolves configuration provided as strings.

#![forbid(unsafe_code)]

mod model;
mod presets;
mod resolve;

pub use model::{ActionsConfig, FlowcheckConfigV1};
pub use presets::PROFILES;
pub use resolve::{Overrides, ResolvedConfig};

/// Parse `flowcheck.toml` (or equivalent) into a typed model.
pub fn parse_config_toml(input: &str) -> anyhow::Result<FlowcheckConfigV1> {
    let cfg: FlowcheckConfigV1 = toml::from_str(input)?;
    Ok(cfg)
}

/// Resolve the effective config used by the engine (preset + config file + CLI overrides).
pub fn resolve_config(
    cfg: FlowcheckConfigV1,
    overrides: Overrides,
) -> anyhow::Result<ResolvedConfig> {
    resolve::resolve_config(cfg, overrides)
}
