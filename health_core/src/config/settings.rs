//! Tunable health constants

use super::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root of all tunable health settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HealthSettings {
    #[serde(default)]
    pub general: GeneralSettings,
    #[serde(default)]
    pub factors: FactorSettings,
    #[serde(default)]
    pub hp: HpSettings,
    #[serde(default)]
    pub training: TrainingSettings,
    #[serde(default)]
    pub resources: ResourceSettings,
}

impl HealthSettings {
    /// Load settings from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let settings: HealthSettings = super::load_toml(path)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Parse settings from a TOML string
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let settings: HealthSettings = super::parse_toml(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject settings that would break the HP bounds or the clock
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.general.day_length <= 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "day_length must be positive, got {}",
                self.general.day_length
            )));
        }
        if self.hp.base_max_hp <= self.hp.min_hp {
            return Err(ConfigError::ValidationError(format!(
                "base_max_hp ({}) must exceed min_hp ({})",
                self.hp.base_max_hp, self.hp.min_hp
            )));
        }
        if self.hp.hp_per_level < 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "hp_per_level must not be negative, got {}",
                self.hp.hp_per_level
            )));
        }
        if self.hp.exhaustion_end < self.hp.exhaustion_start {
            return Err(ConfigError::ValidationError(
                "exhaustion_end must not be below exhaustion_start".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.training.cap) {
            return Err(ConfigError::ValidationError(format!(
                "training cap must be within [0, 1], got {}",
                self.training.cap
            )));
        }
        if self.training.per_day < 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "training per_day must not be negative, got {}",
                self.training.per_day
            )));
        }
        if !(0.0..=1.0).contains(&self.resources.starvation_ratio) {
            return Err(ConfigError::ValidationError(format!(
                "starvation_ratio must be within [0, 1], got {}",
                self.resources.starvation_ratio
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralSettings {
    /// Master switch; a disabled simulation leaves HP untouched
    #[serde(default = "default_mod_enabled")]
    pub mod_enabled: bool,
    /// Length of one day in seconds of simulation time
    #[serde(default = "default_day_length")]
    pub day_length: f64,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        GeneralSettings {
            mod_enabled: true,
            day_length: 21600.0,
        }
    }
}

fn default_mod_enabled() -> bool {
    true
}
fn default_day_length() -> f64 {
    21600.0
}

/// Base HP/day of each factor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactorSettings {
    #[serde(default = "default_home")]
    pub home: f64,
    #[serde(default = "default_loneliness")]
    pub loneliness: f64,
    #[serde(default = "default_sickness")]
    pub sickness: f64,
}

impl Default for FactorSettings {
    fn default() -> Self {
        FactorSettings {
            home: 2.0,
            loneliness: -1.0,
            sickness: -5.0,
        }
    }
}

fn default_home() -> f64 {
    2.0
}
fn default_loneliness() -> f64 {
    -1.0
}
fn default_sickness() -> f64 {
    -5.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HpSettings {
    /// Max HP of a level 0 crew member
    #[serde(default = "default_base_max_hp")]
    pub base_max_hp: f64,
    #[serde(default = "default_hp_per_level")]
    pub hp_per_level: f64,
    #[serde(default)]
    pub min_hp: f64,
    /// Fraction of max HP below which a crew member becomes exhausted
    #[serde(default = "default_exhaustion_start")]
    pub exhaustion_start: f64,
    /// Fraction of max HP a crew member must regain to stop being exhausted
    #[serde(default = "default_exhaustion_end")]
    pub exhaustion_end: f64,
    /// Recuperation %/day for crew resting at the home base
    #[serde(default = "default_home_recuperation")]
    pub home_recuperation: f64,
}

impl Default for HpSettings {
    fn default() -> Self {
        HpSettings {
            base_max_hp: 100.0,
            hp_per_level: 10.0,
            min_hp: 0.0,
            exhaustion_start: 0.2,
            exhaustion_end: 0.25,
            home_recuperation: 10.0,
        }
    }
}

fn default_base_max_hp() -> f64 {
    100.0
}
fn default_hp_per_level() -> f64 {
    10.0
}
fn default_exhaustion_start() -> f64 {
    0.2
}
fn default_exhaustion_end() -> f64 {
    0.25
}
fn default_home_recuperation() -> f64 {
    10.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingSettings {
    #[serde(default = "default_training_enabled")]
    pub enabled: bool,
    /// Highest training level any crew member can reach for one module
    #[serde(default = "default_training_cap")]
    pub cap: f64,
    /// Training level gained per day for a module of complexity 1
    #[serde(default = "default_training_per_day")]
    pub per_day: f64,
}

impl Default for TrainingSettings {
    fn default() -> Self {
        TrainingSettings {
            enabled: true,
            cap: 0.6,
            per_day: 0.1,
        }
    }
}

fn default_training_enabled() -> bool {
    true
}
fn default_training_cap() -> f64 {
    0.6
}
fn default_training_per_day() -> f64 {
    0.1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceSettings {
    /// A module starves when it was granted less than this share of its request
    #[serde(default = "default_starvation_ratio")]
    pub starvation_ratio: f64,
}

impl Default for ResourceSettings {
    fn default() -> Self {
        ResourceSettings {
            starvation_ratio: 0.5,
        }
    }
}

fn default_starvation_ratio() -> f64 {
    0.5
}

/// Get the bundled default settings
pub fn default_settings() -> HealthSettings {
    let toml = include_str!("../../config/settings.toml");
    HealthSettings::parse(toml).unwrap_or_default()
}
