//! ModuleConfiguration - Immutable description of a health module's effect

use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Multiply target that applies to every factor
pub const ALL_FACTORS: &str = "All";

/// Resource consumed when a configuration does not name one
pub const DEFAULT_RESOURCE: &str = "ElectricCharge";

/// What a health module does to the crew it affects
///
/// Fields left at their default are skipped when serializing, so saved
/// configurations only carry what differs from a blank module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModuleConfiguration {
    /// Display title, empty to derive one from the effect
    #[serde(skip_serializing_if = "String::is_empty")]
    pub title: String,
    /// Raw HP/day gained by every affected crew member
    #[serde(skip_serializing_if = "is_zero")]
    pub hp_change_per_day: f64,
    /// %/day of (max HP - HP) restored
    #[serde(skip_serializing_if = "is_zero")]
    pub recuperation: f64,
    /// %/day of (HP - min HP) lost
    #[serde(skip_serializing_if = "is_zero")]
    pub decay: f64,
    /// Affects only crew in the module's own part instead of the whole vessel
    #[serde(skip_serializing_if = "is_false")]
    pub part_crew_only: bool,
    /// Name of the factor whose effect is multiplied
    #[serde(skip_serializing_if = "is_all_factors")]
    pub multiply_factor: String,
    /// 0.5 halves the factor's effect, 1 leaves it alone
    #[serde(skip_serializing_if = "is_one")]
    pub multiplier: f64,
    /// Crew this module serves at full strength, 0 for unlimited
    #[serde(skip_serializing_if = "is_zero_u32")]
    pub crew_cap: u32,
    /// Living space provided
    #[serde(skip_serializing_if = "is_zero")]
    pub space: f64,
    /// Number of halving-thicknesses
    #[serde(skip_serializing_if = "is_zero")]
    pub shielding: f64,
    /// Radioactive emission per day
    #[serde(skip_serializing_if = "is_zero")]
    pub radioactivity: f64,
    #[serde(skip_serializing_if = "is_default_resource")]
    pub resource: String,
    /// Flat resource consumption, units per second
    #[serde(skip_serializing_if = "is_zero")]
    pub resource_consumption: f64,
    /// Resource consumption per affected crew member, units per second
    #[serde(skip_serializing_if = "is_zero")]
    pub resource_consumption_per_kerbal: f64,
}

impl Default for ModuleConfiguration {
    fn default() -> Self {
        ModuleConfiguration {
            title: String::new(),
            hp_change_per_day: 0.0,
            recuperation: 0.0,
            decay: 0.0,
            part_crew_only: false,
            multiply_factor: ALL_FACTORS.to_string(),
            multiplier: 1.0,
            crew_cap: 0,
            space: 0.0,
            shielding: 0.0,
            radioactivity: 0.0,
            resource: DEFAULT_RESOURCE.to_string(),
            resource_consumption: 0.0,
            resource_consumption_per_kerbal: 0.0,
        }
    }
}

fn is_zero(v: &f64) -> bool {
    *v == 0.0
}
fn is_one(v: &f64) -> bool {
    *v == 1.0
}
fn is_false(v: &bool) -> bool {
    !*v
}
fn is_zero_u32(v: &u32) -> bool {
    *v == 0
}
fn is_all_factors(v: &String) -> bool {
    v == ALL_FACTORS
}
fn is_default_resource(v: &String) -> bool {
    v == DEFAULT_RESOURCE
}

impl ModuleConfiguration {
    /// Title shown for the module, derived from its strongest trait when unset
    pub fn title(&self) -> String {
        if !self.title.is_empty() {
            return self.title.clone();
        }
        if self.recuperation > 0.0 {
            return "R&R".to_string();
        }
        if self.decay > 0.0 {
            return "Health Poisoning".to_string();
        }
        let by_factor = match self.multiply_factor.to_lowercase().as_str() {
            "stress" => Some("Stress Relief"),
            "confinement" => Some("Comforts"),
            "loneliness" => Some("Meditation"),
            "microgravity" if self.multiplier <= 0.25 => Some("Paragravity"),
            "microgravity" => Some("Exercise Equipment"),
            "connected" => Some("TV Set"),
            "conditions" => Some("Sick Bay"),
            _ => None,
        };
        if let Some(title) = by_factor {
            return title.to_string();
        }
        if self.space > 0.0 {
            return "Living Quarters".to_string();
        }
        if self.shielding > 0.0 {
            return "RadShield".to_string();
        }
        if self.radioactivity > 0.0 {
            return "Radiation".to_string();
        }
        "Health Module".to_string()
    }

    /// Modules that draw no resource can never be switched off or starve
    pub fn is_always_active(&self) -> bool {
        self.resource_consumption == 0.0 && self.resource_consumption_per_kerbal == 0.0
    }

    /// Multi-line summary of every non-zero trait, empty for a blank module
    pub fn describe(&self) -> String {
        let mut res = String::new();
        if self.hp_change_per_day != 0.0 {
            let _ = write!(res, "\nHealth points: {:.1}/day", self.hp_change_per_day);
        }
        if self.recuperation != 0.0 {
            let _ = write!(res, "\nRecuperation: {:.1}%/day", self.recuperation);
        }
        if self.decay != 0.0 {
            let _ = write!(res, "\nHealth decay: {:.1}%/day", self.decay);
        }
        if self.multiplier != 1.0 {
            let _ = write!(res, "\n{:.2}x {}", self.multiplier, self.multiply_factor);
        }
        if self.crew_cap > 0 {
            let _ = write!(res, " for up to {} crew", self.crew_cap);
        }
        if self.space != 0.0 {
            let _ = write!(res, "\nSpace: {:.1}", self.space);
        }
        if self.resource_consumption != 0.0 {
            let _ = write!(res, "\n{}: {:.2}/sec.", self.resource, self.resource_consumption);
        }
        if self.resource_consumption_per_kerbal != 0.0 {
            let _ = write!(
                res,
                "\n{} per crew member: {:.2}/sec.",
                self.resource, self.resource_consumption_per_kerbal
            );
        }
        if self.shielding != 0.0 {
            let _ = write!(res, "\nShielding rating: {:.1}", self.shielding);
        }
        if self.radioactivity != 0.0 {
            let _ = write!(res, "\nRadioactive emission: {:.0}/day", self.radioactivity);
        }
        if res.is_empty() {
            return res;
        }
        format!("Module type: {}{}", self.title(), res)
    }
}
