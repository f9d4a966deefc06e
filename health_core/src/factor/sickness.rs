//! Sickness factor

use super::CrewContext;
use crate::crew::CrewHealthState;
use crate::types::ConditionKind;

/// Base rate while the crew member is sick
pub(super) fn change_per_day(
    base: f64,
    crew: &CrewHealthState,
    ctx: &CrewContext<'_>,
    enabled_in_estimate: bool,
) -> f64 {
    if ctx.mode.is_estimate() && !enabled_in_estimate {
        return 0.0;
    }
    if crew.has_condition(ConditionKind::Sick) {
        base
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use crate::config::HealthSettings;
    use crate::crew::CrewHealthState;
    use crate::factor::{CrewContext, Factor};
    use crate::types::ConditionKind;

    #[test]
    fn test_sickness_follows_condition() {
        let settings = HealthSettings::default();
        let mut crew = CrewHealthState::new("Bob".into(), "Bob", 0, &settings);
        let ctx = CrewContext::live(None);
        assert!(Factor::Sickness.change_per_day(&crew, &ctx, true, &settings).abs() < f64::EPSILON);

        crew.add_condition(ConditionKind::Sick, 0.0, None);
        let rate = Factor::Sickness.change_per_day(&crew, &ctx, true, &settings);
        assert!((rate - settings.factors.sickness).abs() < f64::EPSILON);
    }
}
