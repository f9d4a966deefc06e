//! HealthEffect - Combined effect of every health module affecting a crew member

mod radiation;

pub use radiation::exposure;

use crate::config::HealthSettings;
use crate::module::{HealthModule, ALL_FACTORS};
use crate::types::EvaluationMode;
use crate::vessel::{Part, Vessel};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Aggregate of all active module configurations in scope
///
/// Rebuilt whenever it is needed and never persisted. Recuperation, decay,
/// space and shielding add up across modules; multipliers on the same factor
/// multiply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthEffect {
    /// Flat HP/day from modules
    pub hp_per_day: f64,
    /// Total recuperation, %/day
    pub recuperation: f64,
    /// Total decay, %/day
    pub decay: f64,
    /// Combined multiplier by lowercased factor name
    pub multipliers: BTreeMap<String, f64>,
    pub space: f64,
    /// Total halving-thicknesses
    pub shielding: f64,
    /// Total radioactive emission per day
    pub radioactivity: f64,
    /// Share of radiation that gets through the vessel's shielding
    pub vessel_exposure: f64,
    /// Share that gets through in the best-shielded part
    pub shelter_exposure: f64,
    /// Modules switched off because their resource ran short
    pub starving_modules: Vec<u32>,
}

impl Default for HealthEffect {
    fn default() -> Self {
        HealthEffect {
            hp_per_day: 0.0,
            recuperation: 0.0,
            decay: 0.0,
            multipliers: BTreeMap::new(),
            space: 0.0,
            shielding: 0.0,
            radioactivity: 0.0,
            vessel_exposure: 1.0,
            shelter_exposure: 1.0,
            starving_modules: Vec::new(),
        }
    }
}

impl HealthEffect {
    /// A neutral effect: no modules, full exposure
    pub fn new() -> Self {
        Self::default()
    }

    /// Effect enjoyed by crew resting at the home base
    pub fn at_home(settings: &HealthSettings) -> Self {
        HealthEffect {
            recuperation: settings.hp.home_recuperation,
            ..Self::default()
        }
    }

    /// Vessel-wide effect, ignoring modules that only serve their own part
    pub fn for_vessel(vessel: &Vessel, mode: EvaluationMode) -> Self {
        Self::build(vessel, None, mode)
    }

    /// Effect on a crew member seated in `part_id`
    ///
    /// Includes vessel-wide modules plus part-only modules of that part.
    pub fn for_crew(vessel: &Vessel, part_id: Option<u32>, mode: EvaluationMode) -> Self {
        Self::build(vessel, part_id, mode)
    }

    fn build(vessel: &Vessel, part_id: Option<u32>, mode: EvaluationMode) -> Self {
        let mut effect = HealthEffect::new();
        let vessel_crew = vessel.crew_count();
        let mut best_local_shielding = 0.0f64;

        for part in &vessel.parts {
            let own_part = part_id == Some(part.id);
            for module in &part.modules {
                if module.config().part_crew_only && !own_part {
                    continue;
                }
                let affected = module.affected_crew(part.crew.len(), vessel_crew);
                effect.add_module(module, affected, mode);
            }
            best_local_shielding = best_local_shielding.max(local_shielding(part, mode));
        }

        // Shielding of the crew member's own part is already in the total
        let shelter_bonus = if part_id.is_some() {
            (best_local_shielding - own_local_shielding(vessel, part_id, mode)).max(0.0)
        } else {
            best_local_shielding
        };
        effect.vessel_exposure = exposure(effect.shielding);
        effect.shelter_exposure = exposure(effect.shielding + shelter_bonus);

        debug!(vessel = %vessel.name, "Health effect: {}", effect.summary());
        effect
    }

    /// Fold one module into the aggregate
    ///
    /// Returns false if the module is inactive (switched off, disabled for the
    /// estimate, or starving) and contributed nothing.
    pub fn add_module(&mut self, module: &HealthModule, affected: usize, mode: EvaluationMode) -> bool {
        if module.starving && module.is_active && !module.is_always_active() {
            self.starving_modules.push(module.id);
        }
        if !module.is_module_active(mode) {
            return false;
        }

        let config = module.config();
        self.hp_per_day += config.hp_change_per_day;
        self.recuperation += module.recuperation_power(affected);
        self.decay += module.decay_power(affected);
        if config.multiplier != 1.0 {
            self.combine_multiplier(&config.multiply_factor, module.multiplier_power(affected));
        }
        self.space += config.space;
        self.shielding += config.shielding;
        self.radioactivity += config.radioactivity;
        true
    }

    /// Multiply a factor's combined multiplier by `multiplier`
    pub fn combine_multiplier(&mut self, factor_name: &str, multiplier: f64) {
        if multiplier == 1.0 {
            return;
        }
        *self
            .multipliers
            .entry(factor_name.to_lowercase())
            .or_insert(1.0) *= multiplier;
    }

    /// Multiplier applied to the named factor, including "All" multipliers
    pub fn multiplier(&self, factor_name: &str) -> f64 {
        let own = self
            .multipliers
            .get(&factor_name.to_lowercase())
            .copied()
            .unwrap_or(1.0);
        let all = self
            .multipliers
            .get(&ALL_FACTORS.to_lowercase())
            .copied()
            .unwrap_or(1.0);
        own * all
    }

    /// Recuperation left after decay, never negative
    pub fn effective_recuperation(&self) -> f64 {
        (self.recuperation - self.decay).max(0.0)
    }

    /// Radiation dose per day that reaches the crew
    pub fn dose_per_day(&self, ambient: f64) -> f64 {
        (ambient + self.radioactivity) * self.vessel_exposure
    }

    pub fn is_starving(&self) -> bool {
        !self.starving_modules.is_empty()
    }

    pub fn summary(&self) -> String {
        format!(
            "HP: {:.1}/day; recuperation: {:.1}%; decay: {:.1}%; multipliers: {:?}; space: {:.1}; shielding: {:.1}; radioactivity: {:.0}; exposure: {:.3}",
            self.hp_per_day,
            self.recuperation,
            self.decay,
            self.multipliers,
            self.space,
            self.shielding,
            self.radioactivity,
            self.vessel_exposure
        )
    }
}

fn local_shielding(part: &Part, mode: EvaluationMode) -> f64 {
    part.modules
        .iter()
        .filter(|m| m.config().part_crew_only && m.is_module_active(mode))
        .map(|m| m.config().shielding)
        .sum()
}

fn own_local_shielding(vessel: &Vessel, part_id: Option<u32>, mode: EvaluationMode) -> f64 {
    vessel
        .parts
        .iter()
        .find(|p| Some(p.id) == part_id)
        .map(|p| local_shielding(p, mode))
        .unwrap_or(0.0)
}
