//! Health module catalogue loading

use super::ConfigError;
use crate::module::{HealthModule, ModuleConfiguration};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// One `[[modules]]` table: the part it belongs to plus its configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleEntry {
    pub part: String,
    #[serde(default)]
    pub complexity: f64,
    #[serde(flatten)]
    pub config: ModuleConfiguration,
}

/// Container for module configurations
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ModulesConfig {
    #[serde(default)]
    modules: Vec<ModuleEntry>,
}

/// Shared, immutable module configurations keyed by part name
#[derive(Debug, Clone, Default)]
pub struct ModuleCatalogue {
    entries: HashMap<String, (Arc<ModuleConfiguration>, f64)>,
}

impl ModuleCatalogue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a part's configuration
    pub fn register(&mut self, entry: ModuleEntry) {
        self.entries
            .insert(entry.part, (Arc::new(entry.config), entry.complexity));
    }

    pub fn get(&self, part: &str) -> Option<&ModuleConfiguration> {
        self.entries.get(part).map(|(config, _)| config.as_ref())
    }

    /// Create a module instance sharing the part's configuration
    pub fn instantiate(&self, part: &str, id: u32) -> Option<HealthModule> {
        self.entries.get(part).map(|(config, complexity)| {
            HealthModule::new(id, Arc::clone(config)).with_complexity(*complexity)
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Load a module catalogue from a TOML file
pub fn load_module_catalogue(path: &Path) -> Result<ModuleCatalogue, ConfigError> {
    let config: ModulesConfig = super::load_toml(path)?;
    build_catalogue(config)
}

/// Load a module catalogue from a TOML string
pub fn parse_module_catalogue(content: &str) -> Result<ModuleCatalogue, ConfigError> {
    let config: ModulesConfig = super::parse_toml(content)?;
    build_catalogue(config)
}

fn build_catalogue(config: ModulesConfig) -> Result<ModuleCatalogue, ConfigError> {
    let mut catalogue = ModuleCatalogue::new();
    for entry in config.modules {
        validate_entry(&entry)?;
        catalogue.register(entry);
    }
    Ok(catalogue)
}

fn validate_entry(entry: &ModuleEntry) -> Result<(), ConfigError> {
    let c = &entry.config;
    if !(0.0..=100.0).contains(&c.recuperation) || !(0.0..=100.0).contains(&c.decay) {
        return Err(ConfigError::ValidationError(format!(
            "{}: recuperation and decay must be within [0, 100]",
            entry.part
        )));
    }
    if c.multiplier < 0.0 {
        return Err(ConfigError::ValidationError(format!(
            "{}: multiplier must not be negative",
            entry.part
        )));
    }
    if entry.complexity < 0.0 {
        return Err(ConfigError::ValidationError(format!(
            "{}: complexity must not be negative",
            entry.part
        )));
    }
    Ok(())
}
