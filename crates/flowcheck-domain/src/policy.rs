use crate::classify::ActionVocabulary;
use crate::match_mode::MatchMode;
use std::collections::BTreeSet;

/// Which named schedules count as active.
///
/// Schedule time windows are not evaluated. A rule with no schedule, or with `always`, is active.
/// Any other named schedule is inactive unless schedules are ignored or the name is listed in
/// `active`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SchedulePolicy {
    pub ignore: bool,
    pub active: BTreeSet<String>,
}

impl SchedulePolicy {
    pub fn is_active(&self, schedule: Option<&str>) -> bool {
        match schedule {
            None => true,
            Some(name) if name == flowcheck_types::ids::SCHEDULE_ALWAYS => true,
            Some(name) => self.ignore || self.active.contains(name),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EffectiveConfig {
    pub profile: String,
    pub match_mode: MatchMode,
    pub schedules: SchedulePolicy,
    pub actions: ActionVocabulary,
    /// Exit non-zero when any tuple classifies as `Unknown`.
    pub fail_on_unknown: bool,
}

impl Default for EffectiveConfig {
    fn default() -> Self {
        Self {
            profile: "strict".to_string(),
            match_mode: MatchMode::default(),
            schedules: SchedulePolicy::default(),
            actions: ActionVocabulary::default(),
            fail_on_unknown: false,
        }
    }
}
