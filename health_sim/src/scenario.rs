//! Scenario files: crew, vessels and resources to simulate

use health_core::config::{parse_module_catalogue, ModuleCatalogue, ModuleEntry};
use health_core::prelude::*;
use health_core::{ConfigError, HealthError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur when loading a scenario
#[derive(Error, Debug)]
pub enum ScenarioError {
    #[error("Failed to read scenario: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse scenario: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Health(#[from] HealthError),
    #[error("Part {part} has unknown module {module}")]
    UnknownModule { part: String, module: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    /// Universal time the scenario starts at, seconds
    #[serde(default)]
    pub start: f64,
    #[serde(default = "default_settings")]
    pub settings: HealthSettings,
    /// Module definitions added to the bundled catalogue
    #[serde(default)]
    pub modules: Vec<ModuleEntry>,
    #[serde(default)]
    pub crew: Vec<CrewSpec>,
    #[serde(default)]
    pub vessels: Vec<VesselSpec>,
    #[serde(default)]
    pub resources: Vec<ResourceSpec>,
    #[serde(default)]
    pub events: EventSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrewSpec {
    pub name: String,
    #[serde(default)]
    pub level: u32,
    #[serde(default)]
    pub veteran: bool,
    /// Starting HP, full health if left out
    #[serde(default)]
    pub hp: Option<f64>,
    #[serde(default)]
    pub training_speed: Option<f64>,
    /// Days the crew member starts out sick for
    #[serde(default)]
    pub sick_days: Option<f64>,
    /// Vessel id to train for at the home base
    #[serde(default)]
    pub train_for: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VesselSpec {
    pub id: u32,
    pub name: String,
    pub body: CelestialBody,
    #[serde(default)]
    pub altitude: f64,
    #[serde(default = "default_loaded")]
    pub loaded: bool,
    #[serde(default)]
    pub ambient_radiation: f64,
    #[serde(default)]
    pub parts: Vec<PartSpec>,
}

fn default_loaded() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartSpec {
    pub name: String,
    #[serde(default)]
    pub crew: Vec<String>,
    /// Catalogue part names of the modules mounted here
    #[serde(default)]
    pub modules: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceSpec {
    pub name: String,
    #[serde(default)]
    pub amount: f64,
    /// Units generated per second
    #[serde(default)]
    pub per_second: f64,
}

/// Random events rolled once per tick
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventSpec {
    /// Chance per crew member per day of falling sick
    #[serde(default)]
    pub sickness_chance: f64,
    #[serde(default = "default_sickness_days")]
    pub sickness_days: f64,
}

impl Default for EventSpec {
    fn default() -> Self {
        EventSpec {
            sickness_chance: 0.0,
            sickness_days: default_sickness_days(),
        }
    }
}

fn default_sickness_days() -> f64 {
    3.0
}

/// Everything needed to run a scenario
pub struct Loaded {
    pub simulation: HealthSimulation,
    pub pool: ResourcePool,
    pub generation: Vec<(String, f64)>,
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self, ScenarioError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ScenarioError> {
        Ok(toml::from_str(content)?)
    }

    /// The bundled catalogue plus this scenario's own modules
    pub fn catalogue(&self) -> Result<ModuleCatalogue, ScenarioError> {
        let mut catalogue =
            parse_module_catalogue(include_str!("../../health_core/config/modules.toml"))?;
        for entry in &self.modules {
            catalogue.register(entry.clone());
        }
        Ok(catalogue)
    }

    /// Build the simulation at the scenario's start time
    pub fn build(&self) -> Result<Loaded, ScenarioError> {
        let settings = &self.settings;
        settings.validate()?;
        let catalogue = self.catalogue()?;
        let mut simulation = HealthSimulation::new(settings.clone());

        let mut next_id = 1;
        for entry in &self.vessels {
            let mut vessel = Vessel::new(entry.id, &entry.name).at(entry.body.clone(), entry.altitude);
            vessel.loaded = entry.loaded;
            vessel.ambient_radiation = entry.ambient_radiation;
            for (index, part_entry) in entry.parts.iter().enumerate() {
                let mut part = Part::new(index as u32 + 1, &part_entry.name);
                for crew in &part_entry.crew {
                    part = part.with_crew(crew.as_str());
                }
                for module in &part_entry.modules {
                    let instance = catalogue.instantiate(module, next_id).ok_or_else(|| {
                        ScenarioError::UnknownModule {
                            part: part_entry.name.clone(),
                            module: module.clone(),
                        }
                    })?;
                    next_id += 1;
                    part = part.with_module(instance);
                }
                vessel = vessel.with_part(part);
            }
            simulation.add_vessel(vessel);
        }

        for entry in &self.crew {
            let mut state = CrewHealthState::new(entry.name.as_str().into(), &entry.name, entry.level, settings);
            state.veteran = entry.veteran;
            if let Some(hp) = entry.hp {
                state.set_hp(hp);
            }
            if let Some(speed) = entry.training_speed {
                state.training_speed = speed;
            }
            if let Some(days) = entry.sick_days {
                let until = self.start + days * settings.general.day_length;
                state.add_condition(ConditionKind::Sick, self.start, Some(until));
            }
            let id = state.id.clone();
            simulation.roster.hire(state)?;
            if let Some(vessel) = entry.train_for.and_then(|v| simulation.vessel(v).cloned()) {
                simulation
                    .roster
                    .start_training(&id, &vessel, self.start, settings)?;
            }
        }

        let mut pool = ResourcePool::new();
        let mut generation = Vec::new();
        for resource in &self.resources {
            pool.add(&resource.name, resource.amount);
            if resource.per_second > 0.0 {
                generation.push((resource.name.clone(), resource.per_second));
            }
        }

        Ok(Loaded {
            simulation,
            pool,
            generation,
        })
    }
}
