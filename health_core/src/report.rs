//! Health estimates for a vessel design

use crate::config::HealthSettings;
use crate::effect::HealthEffect;
use crate::factor::{CrewContext, FactorRegistry};
use crate::roster::Roster;
use crate::types::{EstimateOptions, EvaluationMode};
use crate::vessel::Vessel;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

/// Forecast for one crew member of the design
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrewEstimate {
    pub name: String,
    pub max_hp: f64,
    /// HP/day starting from full health
    pub change_per_day: f64,
    pub balance_hp: Option<f64>,
    /// Days until the crew member becomes exhausted
    pub time_to_next_condition: Option<f64>,
    /// Days of training needed for the design's equipment
    pub training_time: Option<f64>,
}

/// Vessel-wide figures of the design
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VesselSummary {
    pub space: f64,
    pub recuperation: f64,
    pub shielding: f64,
    pub exposure: f64,
    pub shelter_exposure: f64,
}

impl From<&HealthEffect> for VesselSummary {
    fn from(effect: &HealthEffect) -> Self {
        VesselSummary {
            space: effect.space,
            recuperation: effect.effective_recuperation(),
            shielding: effect.shielding,
            exposure: effect.vessel_exposure,
            shelter_exposure: effect.shelter_exposure,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub vessel: String,
    pub crew: Vec<CrewEstimate>,
    pub summary: VesselSummary,
}

/// Estimate how the design's crew would fare, starting from full health
///
/// Works on detached copies, so the roster is left untouched. Crew on the
/// design that the roster does not know are skipped.
pub fn estimate_vessel(
    design: &Vessel,
    roster: &Roster,
    factors: &FactorRegistry,
    options: EstimateOptions,
    settings: &HealthSettings,
) -> HealthReport {
    let mode = EvaluationMode::Estimate(options);
    let ctx = CrewContext::estimate(mode, design);
    let training_modules = design.training_modules();

    let mut crew = Vec::new();
    for id in design.crew() {
        let Some(mut state) = roster.snapshot(id) else {
            warn!("{} is aboard {} but not on the roster.", id, design.name);
            continue;
        };
        state.set_hp(state.max_hp());
        let part = design.part_of(id).map(|p| p.id);
        let effect = HealthEffect::for_crew(design, part, mode);
        let change = state.evaluate(&ctx, factors, &effect, settings);
        let training_time = if options.training_enabled && settings.training.enabled {
            state.training_time(&training_modules, settings)
        } else {
            None
        };
        crew.push(CrewEstimate {
            name: state.name.clone(),
            max_hp: state.max_hp(),
            change_per_day: state.hp_change_per_day(&change),
            balance_hp: state.balance_hp(&change),
            time_to_next_condition: state.time_to_next_condition(&change, settings),
            training_time,
        });
    }

    HealthReport {
        vessel: design.name.clone(),
        crew,
        summary: VesselSummary::from(&HealthEffect::for_vessel(design, mode)),
    }
}

impl HealthReport {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

fn days(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |d| format!("{:.1} d", d))
}

impl fmt::Display for HealthReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== {} ===", self.vessel)?;
        writeln!(
            f,
            "Space: {:.1}  Recuperation: {:.1}%  Shielding: {:.1}  Exposure: {:.0}% (shelter {:.0}%)",
            self.summary.space,
            self.summary.recuperation,
            self.summary.shielding,
            self.summary.exposure * 100.0,
            self.summary.shelter_exposure * 100.0
        )?;
        for crew in &self.crew {
            writeln!(
                f,
                "  {:<16} {:>7.2} HP/day  balance {:>6}  exhausted in {:>8}  training {:>8}",
                crew.name,
                crew.change_per_day,
                crew.balance_hp.map_or_else(|| "-".to_string(), |hp| format!("{:.1}", hp)),
                days(crew.time_to_next_condition),
                days(crew.training_time)
            )?;
        }
        Ok(())
    }
}
