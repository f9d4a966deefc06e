//! health_core - Crew health simulation library
//!
//! This library provides:
//! - Factors: Independent contributors to a crew member's daily HP change
//! - HealthModule: Equipment configurations and their per-instance state
//! - HealthEffect: Aggregated effect of every module affecting a crew member
//! - CrewHealthState: HP, conditions and training of one crew member
//! - HealthModel: Closed-form forecasting of HP over time
//! - HealthSimulation: Roster-wide tick driver with resource-gated modules

pub mod config;
pub mod crew;
pub mod effect;
pub mod error;
pub mod factor;
pub mod forecast;
pub mod module;
pub mod prelude;
pub mod report;
pub mod resource;
pub mod roster;
pub mod sim;
pub mod types;
pub mod vessel;

// Re-export core types for convenience
pub use config::{default_settings, ConfigError, HealthSettings, ModuleCatalogue};
pub use crew::{Condition, CrewHealthState, FactorContribution, HealthChange, TrainingItem};
pub use effect::{exposure, HealthEffect};
pub use error::HealthError;
pub use factor::{CrewContext, Factor, FactorRegistry};
pub use forecast::HealthModel;
pub use module::{HealthModule, ModuleConfiguration};
pub use report::{estimate_vessel, CrewEstimate, HealthReport, VesselSummary};
pub use resource::{ResourcePool, ResourceProvider};
pub use roster::Roster;
pub use sim::{CrewTick, HealthSimulation, TickResult};
pub use types::{ConditionKind, CrewId, EstimateOptions, EvaluationMode, RosterStatus};
pub use vessel::{CelestialBody, Location, Part, Vessel};
