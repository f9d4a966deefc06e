//! Vessel, part and location snapshots supplied by the roster provider

use crate::module::HealthModule;
use crate::types::CrewId;
use serde::{Deserialize, Serialize};

/// The body a vessel is orbiting or landed on
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CelestialBody {
    pub name: String,
    /// Whether this is the crew's home world
    #[serde(default)]
    pub is_home: bool,
    /// Altitude below which a vessel counts as flying in the atmosphere
    #[serde(default)]
    pub flying_altitude_threshold: f64,
}

impl CelestialBody {
    pub fn home(name: &str, flying_altitude_threshold: f64) -> Self {
        CelestialBody {
            name: name.to_string(),
            is_home: true,
            flying_altitude_threshold,
        }
    }

    pub fn foreign(name: &str, flying_altitude_threshold: f64) -> Self {
        CelestialBody {
            name: name.to_string(),
            is_home: false,
            flying_altitude_threshold,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub body: CelestialBody,
    pub altitude: f64,
}

/// A crewable part and the health modules mounted on it
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Part {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub crew: Vec<CrewId>,
    #[serde(default)]
    pub modules: Vec<HealthModule>,
}

impl Part {
    pub fn new(id: u32, name: &str) -> Self {
        Part {
            id,
            name: name.to_string(),
            crew: Vec::new(),
            modules: Vec::new(),
        }
    }

    pub fn with_crew(mut self, crew: impl Into<CrewId>) -> Self {
        self.crew.push(crew.into());
        self
    }

    pub fn with_module(mut self, module: HealthModule) -> Self {
        self.modules.push(module);
        self
    }
}

/// A vessel, launched or still on the drawing board
///
/// A design being estimated has no location.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Vessel {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub location: Option<Location>,
    /// Loaded vessels are fully simulated; unloaded ones may reuse cached factor rates
    #[serde(default)]
    pub loaded: bool,
    /// Ambient radiation per day before shielding
    #[serde(default)]
    pub ambient_radiation: f64,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Vessel {
    pub fn new(id: u32, name: &str) -> Self {
        Vessel {
            id,
            name: name.to_string(),
            loaded: true,
            ..Default::default()
        }
    }

    pub fn at(mut self, body: CelestialBody, altitude: f64) -> Self {
        self.location = Some(Location { body, altitude });
        self
    }

    pub fn with_part(mut self, part: Part) -> Self {
        self.parts.push(part);
        self
    }

    pub fn crew_count(&self) -> usize {
        self.parts.iter().map(|p| p.crew.len()).sum()
    }

    pub fn crew(&self) -> impl Iterator<Item = &CrewId> {
        self.parts.iter().flat_map(|p| p.crew.iter())
    }

    pub fn contains(&self, crew: &CrewId) -> bool {
        self.crew().any(|c| c == crew)
    }

    /// The part a crew member is seated in
    pub fn part_of(&self, crew: &CrewId) -> Option<&Part> {
        self.parts.iter().find(|p| p.crew.contains(crew))
    }

    /// Modules that require training, in part order
    pub fn training_modules(&self) -> Vec<&HealthModule> {
        self.parts
            .iter()
            .flat_map(|p| p.modules.iter())
            .filter(|m| m.needs_training())
            .collect()
    }
}
