//! Per-crew tick processing

use crate::config::HealthSettings;
use crate::crew::CrewHealthState;
use crate::effect::HealthEffect;
use crate::factor::{CrewContext, FactorRegistry};
use crate::types::ConditionKind;
use serde::{Deserialize, Serialize};

/// What happened to one crew member during a tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrewTick {
    pub name: String,
    pub hp: f64,
    /// HP/day at the end of the tick
    pub change_per_day: f64,
    pub expired: Vec<ConditionKind>,
    /// `Some(true)` if exhaustion started, `Some(false)` if it ended
    pub exhaustion: Option<bool>,
}

/// Result of one simulation tick
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickResult {
    pub now: f64,
    /// Simulated days since the previous tick
    pub days: f64,
    pub crew: Vec<CrewTick>,
    /// Ids of modules that found themselves short of resource this tick
    pub starving_modules: Vec<u32>,
}

/// Advance one crew member from `from` to `to` (universal time, seconds)
///
/// The interval is split wherever a condition starts or wears off, so every
/// piece runs under constant rates and can use the closed-form forecast.
/// Conditions with an onset after `from` only count from that onset.
pub fn advance_crew(
    crew: &mut CrewHealthState,
    ctx: &CrewContext<'_>,
    effect: &HealthEffect,
    factors: &FactorRegistry,
    settings: &HealthSettings,
    from: f64,
    to: f64,
) -> CrewTick {
    let day_length = settings.general.day_length;
    let mut expired = crew.expire_conditions(from);
    let mut pending = crew.take_pending_conditions(from).into_iter().peekable();
    let mut t = from;
    let mut change = crew.evaluate(ctx, factors, effect, settings);

    while t < to {
        let onset = pending.peek().map(|c| c.since);
        let end = [crew.next_expiry(), onset]
            .into_iter()
            .flatten()
            .fold(to, f64::min);
        let days = (end - t) / day_length;
        crew.advance(&change, days);
        crew.train(days, settings);
        t = end;
        while let Some(condition) = pending.next_if(|c| c.since <= t) {
            crew.restore_condition(condition);
        }
        expired.extend(crew.expire_conditions(t));
        change = crew.evaluate(ctx, factors, effect, settings);
    }
    // Onsets beyond this tick wait for the next one
    for condition in pending {
        crew.restore_condition(condition);
    }

    let exhaustion = crew.update_exhaustion(to, settings);
    if exhaustion.is_some() {
        change = crew.evaluate(ctx, factors, effect, settings);
    }

    CrewTick {
        name: crew.name.clone(),
        hp: crew.hp(),
        change_per_day: crew.hp_change_per_day(&change),
        expired,
        exhaustion,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RosterStatus;

    fn settings() -> HealthSettings {
        let mut settings = HealthSettings::default();
        settings.general.day_length = 100.0;
        settings
    }

    #[test]
    fn test_split_at_expiry() {
        let settings = settings();
        let mut crew = CrewHealthState::new("Bob".into(), "Bob", 0, &settings);
        crew.status = RosterStatus::Assigned;
        crew.set_hp(80.0);
        // Sick for the first two days of a four day tick
        crew.add_condition(ConditionKind::Sick, 0.0, Some(200.0));

        let tick = advance_crew(
            &mut crew,
            &CrewContext::live(None),
            &HealthEffect::new(),
            &FactorRegistry::with_defaults(),
            &settings,
            0.0,
            400.0,
        );
        assert!((crew.hp() - 70.0).abs() < 1e-9);
        assert_eq!(tick.expired, vec![ConditionKind::Sick]);
        assert!(!crew.has_condition(ConditionKind::Sick));
        assert!(tick.change_per_day.abs() < f64::EPSILON);
    }

    #[test]
    fn test_exhaustion_reported() {
        let settings = settings();
        let mut crew = CrewHealthState::new("Bob".into(), "Bob", 0, &settings);
        crew.set_hp(22.0);
        crew.add_condition(ConditionKind::Sick, 0.0, None);

        let tick = advance_crew(
            &mut crew,
            &CrewContext::live(None),
            &HealthEffect::new(),
            &FactorRegistry::with_defaults(),
            &settings,
            0.0,
            100.0,
        );
        assert!((tick.hp - 17.0).abs() < 1e-9);
        assert_eq!(tick.exhaustion, Some(true));
        assert!(crew.has_condition(ConditionKind::Exhausted));
    }

    #[test]
    fn test_sickness_counts_from_onset() {
        let settings = settings();
        let mut crew = CrewHealthState::new("Bob".into(), "Bob", 0, &settings);
        crew.status = RosterStatus::Assigned;
        crew.set_hp(80.0);
        crew.add_condition(ConditionKind::Sick, 200.0, Some(500.0));

        let registry = FactorRegistry::with_defaults();
        let ctx = CrewContext::live(None);
        let effect = HealthEffect::new();
        let tick = advance_crew(&mut crew, &ctx, &effect, &registry, &settings, 0.0, 200.0);
        assert!((crew.hp() - 80.0).abs() < 1e-9);
        assert!(crew.has_condition(ConditionKind::Sick));
        assert!((tick.change_per_day - settings.factors.sickness).abs() < f64::EPSILON);

        // Onset halfway through the tick
        crew.remove_condition(ConditionKind::Sick);
        crew.add_condition(ConditionKind::Sick, 300.0, Some(500.0));
        advance_crew(&mut crew, &ctx, &effect, &registry, &settings, 200.0, 400.0);
        assert!((crew.hp() - 75.0).abs() < 1e-9);

        // Sick from 300 to 500 only: one more day of sickness
        advance_crew(&mut crew, &ctx, &effect, &registry, &settings, 400.0, 800.0);
        assert!((crew.hp() - 70.0).abs() < 1e-9);
        assert!(!crew.has_condition(ConditionKind::Sick));
    }
}
