use crate::{model::FlowcheckConfigV1, presets};
use anyhow::Context;
use flowcheck_domain::classify::ActionVocabulary;
use flowcheck_domain::match_mode::MatchModeKind;
use flowcheck_domain::policy::EffectiveConfig;
use flowcheck_types::ids::SCHEMA_CONFIG_V1;

/// Values supplied on the command line. `None` means "not given".
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub profile: Option<String>,
    pub match_mode: Option<String>,
    pub max_hosts: Option<u32>,
    pub ignore_schedule: Option<bool>,
    /// Added to the schedules listed in the config file.
    pub active_schedules: Vec<String>,
    pub fail_on_unknown: Option<bool>,
}

#[derive(Clone, Debug)]
pub struct ResolvedConfig {
    pub effective: EffectiveConfig,
}

pub fn resolve_config(
    cfg: FlowcheckConfigV1,
    overrides: Overrides,
) -> anyhow::Result<ResolvedConfig> {
    if let Some(schema) = cfg.schema.as_deref()
        && schema != SCHEMA_CONFIG_V1
    {
        anyhow::bail!("unsupported config schema: {schema} (expected {SCHEMA_CONFIG_V1})");
    }

    let profile = overrides
        .profile
        .clone()
        .or(cfg.profile.clone())
        .unwrap_or_else(|| "strict".to_string());

    let mut effective = presets::preset(&profile).with_context(|| {
        format!(
            "unknown profile: {profile} (expected {})",
            presets::PROFILES.join("|")
        )
    })?;

    // Match mode
    if let Some(mode) = overrides.match_mode.clone().or(cfg.match_mode.clone()) {
        effective.match_mode.kind = mode
            .parse::<MatchModeKind>()
            .map_err(anyhow::Error::msg)
            .context("invalid match_mode")?;
    }

    // Host cap
    if let Some(max_hosts) = overrides.max_hosts.or(cfg.max_hosts) {
        if max_hosts == 0 {
            anyhow::bail!("max_hosts must be at least 1");
        }
        effective.match_mode.max_hosts = usize::try_from(max_hosts).unwrap_or(usize::MAX);
    }

    // Schedules
    if let Some(ignore) = overrides.ignore_schedule.or(cfg.ignore_schedule) {
        effective.schedules.ignore = ignore;
    }
    effective.schedules.active.extend(
        cfg.active_schedules
            .iter()
            .chain(overrides.active_schedules.iter())
            .cloned(),
    );

    if let Some(fail) = overrides.fail_on_unknown.or(cfg.fail_on_unknown) {
        effective.fail_on_unknown = fail;
    }

    // Action vocabulary
    if let Some(actions) = cfg.actions {
        effective.actions = merge_actions(effective.actions, actions.allow, actions.deny)?;
    }

    Ok(ResolvedConfig { effective })
}

fn merge_actions(
    base: ActionVocabulary,
    allow: Option<Vec<String>>,
    deny: Option<Vec<String>>,
) -> anyhow::Result<ActionVocabulary> {
    let vocab = ActionVocabulary {
        allow: allow.unwrap_or(base.allow),
        deny: deny.unwrap_or(base.deny),
    };
    if vocab.allow.is_empty() {
        anyhow::bail!("actions.allow must list at least one action");
    }
    if let Some(both) = vocab.allow.iter().find(|a| vocab.deny.contains(a)) {
        anyhow::bail!("action {both:?} is listed in both actions.allow and actions.deny");
    }
    Ok(vocab)
}
