//! CrewHealthState - Health of one crew member

mod condition;
mod training;

pub use condition::Condition;
pub use training::TrainingItem;

use crate::config::HealthSettings;
use crate::effect::HealthEffect;
use crate::factor::{CrewContext, Factor, FactorRegistry};
use crate::forecast::HealthModel;
use crate::types::{ConditionKind, CrewId, EvaluationMode, RosterStatus};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// One factor's share of the daily HP change
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FactorContribution {
    pub factor: Factor,
    /// HP/day before multipliers
    pub raw: f64,
    pub multiplier: f64,
}

impl FactorContribution {
    pub fn rate(&self) -> f64 {
        self.raw * self.multiplier
    }
}

/// Breakdown of what drives a crew member's HP right now
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HealthChange {
    pub factors: Vec<FactorContribution>,
    /// Multiplied factor rates plus flat module HP, per day
    pub constant_rate: f64,
    /// %/day toward max HP
    pub recuperation: f64,
    /// %/day toward min HP
    pub decay: f64,
}

/// Mutable health state of a crew member
///
/// Owned by the roster; callers that only display data should work on a
/// clone from [`crate::roster::Roster::snapshot`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrewHealthState {
    pub id: CrewId,
    pub name: String,
    pub level: u32,
    /// Veterans are immune to loneliness
    #[serde(default)]
    pub veteran: bool,
    #[serde(default)]
    pub status: RosterStatus,
    hp: f64,
    min_hp: f64,
    max_hp: f64,
    #[serde(default)]
    conditions: BTreeMap<ConditionKind, Condition>,
    /// Training level per module id, within [0, training cap]
    #[serde(default)]
    training: BTreeMap<u32, f64>,
    #[serde(default)]
    training_queue: Vec<TrainingItem>,
    /// Name of the vessel being trained for
    #[serde(default)]
    pub training_vessel: Option<String>,
    /// Personal training speed multiplier
    #[serde(default = "default_training_speed")]
    pub training_speed: f64,
    /// Last raw factor rates, reused while the vessel is unloaded
    #[serde(skip)]
    cached_rates: BTreeMap<Factor, f64>,
    #[serde(skip)]
    last_change: Option<HealthChange>,
    #[serde(skip)]
    dirty: bool,
}

fn default_training_speed() -> f64 {
    1.0
}

impl CrewHealthState {
    /// Start tracking a crew member at full health
    pub fn new(id: CrewId, name: &str, level: u32, settings: &HealthSettings) -> Self {
        let max_hp = max_hp_for_level(level, settings);
        CrewHealthState {
            id,
            name: name.to_string(),
            level,
            veteran: false,
            status: RosterStatus::Available,
            hp: max_hp,
            min_hp: settings.hp.min_hp,
            max_hp,
            conditions: BTreeMap::new(),
            training: BTreeMap::new(),
            training_queue: Vec::new(),
            training_vessel: None,
            training_speed: 1.0,
            cached_rates: BTreeMap::new(),
            last_change: None,
            dirty: true,
        }
    }

    // === HP ===

    pub fn hp(&self) -> f64 {
        self.hp
    }

    pub fn min_hp(&self) -> f64 {
        self.min_hp
    }

    pub fn max_hp(&self) -> f64 {
        self.max_hp
    }

    /// Set HP, clamped to [min HP, max HP]
    pub fn set_hp(&mut self, hp: f64) {
        self.hp = hp.clamp(self.min_hp, self.max_hp);
    }

    /// HP as a share of the HP range
    pub fn health(&self) -> f64 {
        (self.hp - self.min_hp) / (self.max_hp - self.min_hp)
    }

    /// Change level, rescaling max HP and keeping HP within bounds
    pub fn set_level(&mut self, level: u32, settings: &HealthSettings) {
        self.level = level;
        self.max_hp = max_hp_for_level(level, settings);
        self.min_hp = settings.hp.min_hp;
        self.set_hp(self.hp);
        self.set_dirty();
    }

    // === Conditions ===

    pub fn has_condition(&self, kind: ConditionKind) -> bool {
        self.conditions.contains_key(&kind)
    }

    pub fn condition(&self, kind: ConditionKind) -> Option<&Condition> {
        self.conditions.get(&kind)
    }

    pub fn conditions(&self) -> impl Iterator<Item = &Condition> {
        self.conditions.values()
    }

    /// Add a condition; an existing one of the same kind has its timer reset
    ///
    /// Returns true if the condition was not present before.
    pub fn add_condition(&mut self, kind: ConditionKind, now: f64, expires_at: Option<f64>) -> bool {
        self.set_dirty();
        if let Some(existing) = self.conditions.get_mut(&kind) {
            existing.refresh(now, expires_at);
            return false;
        }
        info!("{} acquired condition {}.", self.name, kind.name());
        self.conditions
            .insert(kind, Condition::new(kind, now, expires_at));
        true
    }

    /// Remove a condition; returns whether it was present
    pub fn remove_condition(&mut self, kind: ConditionKind) -> bool {
        let removed = self.conditions.remove(&kind).is_some();
        if removed {
            info!("{} lost condition {}.", self.name, kind.name());
            self.set_dirty();
        }
        removed
    }

    /// Earliest universal time at which a condition wears off
    pub fn next_expiry(&self) -> Option<f64> {
        self.conditions
            .values()
            .filter_map(|c| c.expires_at)
            .min_by(|a, b| a.total_cmp(b))
    }

    /// Drop conditions that have worn off by `now`
    pub fn expire_conditions(&mut self, now: f64) -> Vec<ConditionKind> {
        let expired: Vec<ConditionKind> = self
            .conditions
            .values()
            .filter(|c| c.is_expired(now))
            .map(|c| c.kind)
            .collect();
        for kind in &expired {
            self.remove_condition(*kind);
        }
        expired
    }

    /// Detach conditions whose onset lies after `now`, earliest first
    ///
    /// Factors do not see them until they are put back with
    /// [`CrewHealthState::restore_condition`].
    pub fn take_pending_conditions(&mut self, now: f64) -> Vec<Condition> {
        let kinds: Vec<ConditionKind> = self
            .conditions
            .values()
            .filter(|c| c.since > now)
            .map(|c| c.kind)
            .collect();
        let mut pending: Vec<Condition> = kinds
            .iter()
            .filter_map(|kind| self.conditions.remove(kind))
            .collect();
        pending.sort_by(|a, b| a.since.total_cmp(&b.since));
        if !pending.is_empty() {
            self.set_dirty();
        }
        pending
    }

    /// Put back a condition detached by `take_pending_conditions`
    pub fn restore_condition(&mut self, condition: Condition) {
        self.set_dirty();
        self.conditions.insert(condition.kind, condition);
    }

    /// HP at which exhaustion next starts or ends
    pub fn next_condition_hp(&self, settings: &HealthSettings) -> f64 {
        if self.has_condition(ConditionKind::Exhausted) {
            self.exhaustion_end_hp(settings)
        } else {
            self.exhaustion_start_hp(settings)
        }
    }

    fn exhaustion_start_hp(&self, settings: &HealthSettings) -> f64 {
        settings.hp.exhaustion_start * self.max_hp
    }

    fn exhaustion_end_hp(&self, settings: &HealthSettings) -> f64 {
        settings.hp.exhaustion_end * self.max_hp
    }

    /// Add or remove exhaustion according to current HP
    ///
    /// Returns the change, if any: `Some(true)` when exhaustion started.
    pub fn update_exhaustion(&mut self, now: f64, settings: &HealthSettings) -> Option<bool> {
        let exhausted = self.has_condition(ConditionKind::Exhausted);
        if !exhausted && self.hp < self.exhaustion_start_hp(settings) {
            self.add_condition(ConditionKind::Exhausted, now, None);
            return Some(true);
        }
        if exhausted && self.hp >= self.exhaustion_end_hp(settings) {
            self.remove_condition(ConditionKind::Exhausted);
            return Some(false);
        }
        None
    }

    // === Change evaluation ===

    /// Invalidate cached rates after something the factors depend on changed
    pub fn set_dirty(&mut self) {
        self.dirty = true;
        self.cached_rates.clear();
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Evaluate every factor and the module effect into one change
    ///
    /// On an unloaded vessel, factors that are constant while unloaded reuse
    /// their last value; the rest are recomputed.
    pub fn evaluate(
        &mut self,
        ctx: &CrewContext<'_>,
        factors: &FactorRegistry,
        effect: &HealthEffect,
        settings: &HealthSettings,
    ) -> HealthChange {
        let live = ctx.mode == EvaluationMode::Live;
        let loaded = ctx.vessel.map(|v| v.loaded).unwrap_or(true);

        let mut change = HealthChange {
            recuperation: effect.recuperation,
            decay: effect.decay,
            constant_rate: effect.hp_per_day,
            ..Default::default()
        };
        for entry in factors.iter() {
            let factor = entry.factor;
            let cached = if live && !loaded && factor.constant_for_unloaded() {
                self.cached_rates.get(&factor).copied()
            } else {
                None
            };
            let raw = match cached {
                Some(raw) => raw,
                None => {
                    let raw = factor.change_per_day(self, ctx, entry.enabled_in_estimate, settings);
                    if live && factor.constant_for_unloaded() {
                        self.cached_rates.insert(factor, raw);
                    }
                    raw
                }
            };
            let contribution = FactorContribution {
                factor,
                raw,
                multiplier: effect.multiplier(factor.name()),
            };
            change.constant_rate += contribution.rate();
            change.factors.push(contribution);
        }

        debug!(
            "{}: {:.2} HP/day constant, {:.1}% recuperation, {:.1}% decay.",
            self.name, change.constant_rate, change.recuperation, change.decay
        );
        self.last_change = Some(change.clone());
        self.dirty = false;
        change
    }

    /// The most recent evaluation, if it is still valid
    pub fn last_change(&self) -> Option<&HealthChange> {
        if self.dirty {
            None
        } else {
            self.last_change.as_ref()
        }
    }

    /// Forecast model for a change, bounded by this crew member's HP range
    pub fn model(&self, change: &HealthChange) -> HealthModel {
        HealthModel::new(self.min_hp, self.max_hp)
            .with_constant_rate(change.constant_rate)
            .with_recuperation(change.recuperation)
            .with_decay(change.decay)
    }

    /// HP/day at the current HP
    pub fn hp_change_per_day(&self, change: &HealthChange) -> f64 {
        self.model(change).change_per_day(self.hp)
    }

    /// HP this crew member settles at, if recuperation or decay apply
    pub fn balance_hp(&self, change: &HealthChange) -> Option<f64> {
        self.model(change)
            .balance_hp()
            .map(|hp| hp.clamp(self.min_hp, self.max_hp))
    }

    /// Days until exhaustion starts (or ends), `None` if it never does
    pub fn time_to_next_condition(&self, change: &HealthChange, settings: &HealthSettings) -> Option<f64> {
        self.model(change)
            .time_to(self.hp, self.next_condition_hp(settings))
    }

    /// Move HP forward by `days` under a constant change
    pub fn advance(&mut self, change: &HealthChange, days: f64) {
        let hp = self.model(change).hp_at(self.hp, days);
        self.set_hp(hp);
    }
}

fn max_hp_for_level(level: u32, settings: &HealthSettings) -> f64 {
    (settings.hp.base_max_hp + settings.hp.hp_per_level * level as f64).max(settings.hp.min_hp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vessel::{CelestialBody, Part, Vessel};

    fn crew() -> CrewHealthState {
        CrewHealthState::new("Jeb".into(), "Jebediah", 2, &HealthSettings::default())
    }

    #[test]
    fn test_max_hp_scales_with_level() {
        let crew = crew();
        assert!((crew.max_hp() - 120.0).abs() < f64::EPSILON);
        assert!((crew.hp() - 120.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_hp_is_clamped() {
        let mut crew = crew();
        crew.set_hp(500.0);
        assert!((crew.hp() - 120.0).abs() < f64::EPSILON);
        crew.set_hp(-3.0);
        assert!(crew.hp().abs() < f64::EPSILON);

        crew.set_hp(120.0);
        crew.set_level(0, &HealthSettings::default());
        assert!((crew.hp() - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_add_condition_is_idempotent() {
        let mut crew = crew();
        assert!(crew.add_condition(ConditionKind::Sick, 0.0, Some(100.0)));
        assert!(!crew.add_condition(ConditionKind::Sick, 10.0, Some(200.0)));
        assert_eq!(crew.conditions().count(), 1);
        assert_eq!(crew.condition(ConditionKind::Sick).unwrap().expires_at, Some(200.0));

        assert!(crew.remove_condition(ConditionKind::Sick));
        assert!(!crew.remove_condition(ConditionKind::Sick));
    }

    #[test]
    fn test_expire_conditions() {
        let mut crew = crew();
        crew.add_condition(ConditionKind::Sick, 0.0, Some(50.0));
        crew.add_condition(ConditionKind::Training, 0.0, None);
        assert_eq!(crew.next_expiry(), Some(50.0));
        assert!(crew.expire_conditions(49.0).is_empty());
        assert_eq!(crew.expire_conditions(50.0), vec![ConditionKind::Sick]);
        assert!(crew.has_condition(ConditionKind::Training));
        assert_eq!(crew.next_expiry(), None);
    }

    #[test]
    fn test_exhaustion_hysteresis() {
        let settings = HealthSettings::default();
        let mut crew = CrewHealthState::new("Bob".into(), "Bob", 0, &settings);
        assert!((crew.next_condition_hp(&settings) - 20.0).abs() < f64::EPSILON);

        crew.set_hp(19.0);
        assert_eq!(crew.update_exhaustion(0.0, &settings), Some(true));
        assert!((crew.next_condition_hp(&settings) - 25.0).abs() < f64::EPSILON);

        crew.set_hp(22.0);
        assert_eq!(crew.update_exhaustion(0.0, &settings), None);
        crew.set_hp(25.0);
        assert_eq!(crew.update_exhaustion(0.0, &settings), Some(false));
    }

    #[test]
    fn test_evaluate_applies_multipliers() {
        let mut settings = HealthSettings::default();
        settings.factors.loneliness = -4.0;
        let vessel = Vessel::new(1, "Solo")
            .at(CelestialBody::foreign("Mun", 5000.0), 20000.0)
            .with_part(Part::new(1, "pod").with_crew("Jeb"));
        let mut crew = crew();
        crew.status = RosterStatus::Assigned;

        let mut effect = HealthEffect::new();
        effect.combine_multiplier("Loneliness", 0.5);
        effect.hp_per_day = 1.0;
        effect.recuperation = 3.0;

        let change = crew.evaluate(
            &CrewContext::live(Some(&vessel)),
            &FactorRegistry::with_defaults(),
            &effect,
            &settings,
        );
        // -4 * 0.5 + 1
        assert!((change.constant_rate + 1.0).abs() < f64::EPSILON);
        assert!((change.recuperation - 3.0).abs() < f64::EPSILON);
        assert_eq!(change.factors.len(), 3);
        assert!(crew.last_change().is_some());
    }

    #[test]
    fn test_unloaded_reuses_cache_except_sickness() {
        let settings = HealthSettings::default();
        let mut vessel = Vessel::new(1, "Lander")
            .at(CelestialBody::home("Kerbin", 18000.0), 100.0)
            .with_part(Part::new(1, "pod").with_crew("Jeb").with_crew("Bill"));
        let mut crew = crew();
        crew.status = RosterStatus::Assigned;
        let factors = FactorRegistry::with_defaults();
        let effect = HealthEffect::new();

        let loaded = crew.evaluate(&CrewContext::live(Some(&vessel)), &factors, &effect, &settings);
        assert!((loaded.constant_rate - settings.factors.home).abs() < f64::EPSILON);

        // Unloaded vessels keep the home rate they had, even after leaving
        vessel.loaded = false;
        if let Some(location) = vessel.location.as_mut() {
            location.altitude = 100000.0;
        }
        let unloaded = crew.evaluate(&CrewContext::live(Some(&vessel)), &factors, &effect, &settings);
        assert!((unloaded.constant_rate - settings.factors.home).abs() < f64::EPSILON);

        // Sickness is always recomputed, but adding it also invalidates the cache
        crew.add_condition(ConditionKind::Sick, 0.0, None);
        let sick = crew.evaluate(&CrewContext::live(Some(&vessel)), &factors, &effect, &settings);
        assert!((sick.constant_rate - settings.factors.sickness).abs() < f64::EPSILON);

        if let Some(location) = vessel.location.as_mut() {
            location.altitude = 100.0;
        }
        let still_cached = crew.evaluate(&CrewContext::live(Some(&vessel)), &factors, &effect, &settings);
        assert!((still_cached.constant_rate - settings.factors.sickness).abs() < f64::EPSILON);
    }

    #[test]
    fn test_forecast_helpers() {
        let settings = HealthSettings::default();
        let mut crew = CrewHealthState::new("Bob".into(), "Bob", 0, &settings);
        crew.set_hp(50.0);
        let change = HealthChange {
            constant_rate: -2.0,
            recuperation: 20.0,
            ..Default::default()
        };
        assert!((crew.balance_hp(&change).unwrap() - 90.0).abs() < 1e-9);
        assert!((crew.hp_change_per_day(&change) - 8.0).abs() < 1e-9);
        // Rising toward 90, never drops to the exhaustion threshold
        assert!(crew.time_to_next_condition(&change, &settings).is_none());

        crew.advance(&change, 1000.0);
        assert!((crew.hp() - 90.0).abs() < 1e-6);
    }

    #[test]
    fn test_pending_conditions_detached_until_onset() {
        let mut crew = crew();
        crew.add_condition(ConditionKind::Sick, 200.0, Some(500.0));
        crew.add_condition(ConditionKind::Training, 0.0, None);

        let pending = crew.take_pending_conditions(100.0);
        assert_eq!(pending.len(), 1);
        assert!(!crew.has_condition(ConditionKind::Sick));
        assert!(crew.has_condition(ConditionKind::Training));

        for condition in pending {
            crew.restore_condition(condition);
        }
        assert_eq!(crew.condition(ConditionKind::Sick).map(|c| c.since), Some(200.0));
    }

    #[test]
    fn test_max_hp_never_below_min() {
        let mut settings = HealthSettings::default();
        settings.hp.hp_per_level = -30.0;
        let mut crew = CrewHealthState::new("Bob".into(), "Bob", 4, &settings);
        crew.set_hp(50.0);
        assert!((crew.hp() - settings.hp.min_hp).abs() < f64::EPSILON);
    }
}
