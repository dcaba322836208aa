use flowcheck_domain::match_mode::{DEFAULT_MAX_HOSTS, MatchMode};
use flowcheck_domain::policy::EffectiveConfig;

pub const PROFILES: [&str; 3] = ["strict", "sample", "expand"];

/// Preset profiles are opinionated defaults.
///
/// Keep these small and readable. Anything complex should go into `flowcheck.toml`.
pub fn preset(profile: &str) -> Option<EffectiveConfig> {
    let match_mode = match profile {
        "strict" => MatchMode::segment(),
        "sample" => MatchMode::sample_ip(),
        "expand" => MatchMode::expand(DEFAULT_MAX_HOSTS),
        _ => return None,
    };
    Some(EffectiveConfig {
        profile: profile.to_string(),
        match_mode,
        ..EffectiveConfig::default()
    })
}
