//! HealthModule - A health module mounted on a vessel part

use super::configuration::{ModuleConfiguration, DEFAULT_RESOURCE};
use crate::resource::{is_starving, ResourceProvider};
use crate::types::EvaluationMode;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// One instance of a health module
///
/// The configuration is shared read-only with every other instance of the
/// same part; per-instance state (active, starving) lives here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthModule {
    /// Persistent identifier, used as the training key
    pub id: u32,
    config: Arc<ModuleConfiguration>,
    /// Training complexity, 0 if no training is needed
    #[serde(default)]
    pub complexity: f64,
    /// Switch state; ignored for always-active modules
    pub is_active: bool,
    /// Set when the previous resource request was not sufficiently fulfilled
    #[serde(default)]
    pub starving: bool,
    /// Resource draw reported for display, units per second
    #[serde(default)]
    pub resource_per_sec: f64,
    #[serde(default)]
    last_updated: Option<f64>,
}

impl HealthModule {
    pub fn new(id: u32, config: Arc<ModuleConfiguration>) -> Self {
        HealthModule {
            id,
            config,
            complexity: 0.0,
            is_active: true,
            starving: false,
            resource_per_sec: 0.0,
            last_updated: None,
        }
    }

    pub fn with_complexity(mut self, complexity: f64) -> Self {
        self.complexity = complexity.max(0.0);
        self
    }

    pub fn config(&self) -> &ModuleConfiguration {
        &self.config
    }

    pub fn title(&self) -> String {
        self.config.title()
    }

    pub fn is_always_active(&self) -> bool {
        self.config.is_always_active()
    }

    /// Whether the module contributes to health in the given evaluation
    pub fn is_module_active(&self, mode: EvaluationMode) -> bool {
        if self.is_always_active() {
            return true;
        }
        let enabled_here = match mode {
            EvaluationMode::Live => true,
            EvaluationMode::Estimate(options) => options.health_modules_enabled,
        };
        self.is_active && enabled_here && !self.starving
    }

    /// Whether crew must train for this module
    pub fn needs_training(&self) -> bool {
        self.complexity > 0.0
    }

    /// Number of crew this module affects: its part's crew or the whole vessel
    pub fn affected_crew(&self, part_crew: usize, vessel_crew: usize) -> usize {
        if self.config.part_crew_only {
            part_crew
        } else {
            vessel_crew
        }
    }

    /// Affected crew limited by the crew cap
    pub fn capped_affected_crew(&self, affected: usize) -> usize {
        if self.config.crew_cap > 0 {
            affected.min(self.config.crew_cap as usize)
        } else {
            affected
        }
    }

    /// Share of full strength delivered to `affected` crew, in (0, 1]
    ///
    /// With no crew aboard the module runs uncapped.
    pub fn cap_ratio(&self, affected: usize) -> f64 {
        if self.config.crew_cap == 0 || affected == 0 {
            return 1.0;
        }
        (self.config.crew_cap as f64 / affected as f64).min(1.0)
    }

    pub fn recuperation_power(&self, affected: usize) -> f64 {
        self.config.recuperation * self.cap_ratio(affected)
    }

    pub fn decay_power(&self, affected: usize) -> f64 {
        self.config.decay * self.cap_ratio(affected)
    }

    /// Multiplier after crew-cap de-rating
    ///
    /// The deviation from 1 shrinks with the cap ratio, so an overcrowded
    /// module drifts toward having no effect rather than a stronger one.
    pub fn multiplier_power(&self, affected: usize) -> f64 {
        1.0 + (self.config.multiplier - 1.0) * self.cap_ratio(affected)
    }

    /// Resource drawn per second while serving `affected` crew
    pub fn total_resource_consumption(&self, affected: usize) -> f64 {
        self.config.resource_consumption
            + self.config.resource_consumption_per_kerbal * self.capped_affected_crew(affected) as f64
    }

    /// Flip the switch; always-active modules stay on
    pub fn toggle_active(&mut self) {
        self.is_active = self.is_always_active() || !self.is_active;
        debug!(module = self.id, active = self.is_active, "Toggled {}", self.title());
    }

    /// Draw this module's resource for the time since the last update
    ///
    /// The outcome only sets `starving`, which gates the module on the next
    /// evaluation rather than this one.
    pub fn fixed_update(
        &mut self,
        now: f64,
        affected: usize,
        provider: &mut impl ResourceProvider,
        starvation_ratio: f64,
    ) {
        let elapsed = self.last_updated.map(|t| (now - t).max(0.0)).unwrap_or(0.0);
        self.last_updated = Some(now);

        if !self.is_active || self.is_always_active() {
            self.resource_per_sec = 0.0;
            return;
        }

        let rate = self.total_resource_consumption(affected);
        self.resource_per_sec = if self.config.resource == DEFAULT_RESOURCE {
            rate
        } else {
            0.0
        };

        let required = rate * elapsed;
        if required <= 0.0 {
            return;
        }
        let provided = provider.request_resource(&self.config.resource, required);
        self.starving = is_starving(required, provided, starvation_ratio);
        if self.starving {
            info!(
                "{} module is starving of {} ({:.3} needed, {:.3} provided)",
                self.title(),
                self.config.resource,
                required,
                provided
            );
        }
    }

    /// Description for part info, including training complexity
    pub fn info(&self) -> String {
        let mut res = self.config.describe();
        if self.complexity != 0.0 {
            res.push_str(&format!("\nTraining complexity: {:.0}%", self.complexity * 100.0));
        }
        res.trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::ResourcePool;
    use crate::types::EstimateOptions;

    fn capped_module(cap: u32) -> HealthModule {
        HealthModule::new(
            1,
            Arc::new(ModuleConfiguration {
                recuperation: 10.0,
                decay: 4.0,
                multiply_factor: "Loneliness".to_string(),
                multiplier: 0.5,
                crew_cap: cap,
                resource_consumption: 1.0,
                resource_consumption_per_kerbal: 0.5,
                ..Default::default()
            }),
        )
    }

    #[test]
    fn test_cap_ratio_below_and_above_cap() {
        let module = capped_module(2);
        assert!((module.recuperation_power(1) - 10.0).abs() < f64::EPSILON);
        assert!((module.recuperation_power(2) - 10.0).abs() < f64::EPSILON);
        assert!((module.recuperation_power(4) - 5.0).abs() < f64::EPSILON);
        assert!((module.decay_power(4) - 2.0).abs() < f64::EPSILON);
        // 1 + (0.5 - 1) * 0.5
        assert!((module.multiplier_power(4) - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zero_crew_runs_uncapped() {
        let module = capped_module(2);
        assert!((module.cap_ratio(0) - 1.0).abs() < f64::EPSILON);
        assert!((module.recuperation_power(0) - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_resource_consumption_uses_capped_crew() {
        let module = capped_module(2);
        // 1.0 flat + 0.5 * min(5, 2)
        assert!((module.total_resource_consumption(5) - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_starvation_is_lagged() {
        let mut module = capped_module(0);
        let mut pool = ResourcePool::new().with("ElectricCharge", 4.0);

        module.fixed_update(0.0, 0, &mut pool, 0.5);
        assert!(!module.starving);
        assert!(module.is_module_active(EvaluationMode::Live));

        // 10 units needed over 10 seconds, only 4 available
        module.fixed_update(10.0, 0, &mut pool, 0.5);
        assert!(module.starving);
        assert!(!module.is_module_active(EvaluationMode::Live));

        pool.add("ElectricCharge", 100.0);
        module.fixed_update(20.0, 0, &mut pool, 0.5);
        assert!(!module.starving);
    }

    #[test]
    fn test_always_active_cannot_toggle() {
        let mut module = HealthModule::new(2, Arc::new(ModuleConfiguration::default()));
        module.toggle_active();
        assert!(module.is_active);

        let mut powered = capped_module(0);
        powered.toggle_active();
        assert!(!powered.is_active);
        assert!(!powered.is_module_active(EvaluationMode::Live));
    }

    #[test]
    fn test_estimate_respects_module_switch() {
        let module = capped_module(0);
        let disabled = EvaluationMode::Estimate(EstimateOptions {
            health_modules_enabled: false,
            training_enabled: true,
        });
        assert!(!module.is_module_active(disabled));
        assert!(module.is_module_active(EvaluationMode::Estimate(EstimateOptions::default())));
    }

    #[test]
    fn test_info_includes_complexity() {
        let module = capped_module(0).with_complexity(1.5);
        assert!(module.info().ends_with("Training complexity: 150%"));
    }
}
