//! Health modules - Equipment that changes the health of nearby crew

mod configuration;
mod instance;

pub use configuration::{ModuleConfiguration, ALL_FACTORS, DEFAULT_RESOURCE};
pub use instance::HealthModule;
