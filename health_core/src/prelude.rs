//! Prelude module for convenient imports
//!
//! ```rust
//! use health_core::prelude::*;
//! ```

// Core types
pub use crate::crew::{CrewHealthState, HealthChange};
pub use crate::types::{ConditionKind, CrewId, EstimateOptions, EvaluationMode, RosterStatus};

// Factors and modules
pub use crate::effect::HealthEffect;
pub use crate::factor::{Factor, FactorRegistry};
pub use crate::module::{HealthModule, ModuleConfiguration};

// Forecasting
pub use crate::forecast::HealthModel;

// Simulation
pub use crate::report::{estimate_vessel, HealthReport};
pub use crate::resource::{ResourcePool, ResourceProvider};
pub use crate::roster::Roster;
pub use crate::sim::HealthSimulation;
pub use crate::vessel::{CelestialBody, Part, Vessel};

// Config
pub use crate::config::{default_settings, HealthSettings};
