//! Health settings and module catalogues, read from TOML

mod modules;
mod settings;

pub use modules::{load_module_catalogue, parse_module_catalogue, ModuleCatalogue, ModuleEntry};
pub use settings::{
    default_settings, FactorSettings, GeneralSettings, HealthSettings, HpSettings,
    ResourceSettings, TrainingSettings,
};

use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error raised while reading settings or a module catalogue
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not read {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Invalid health configuration: {0}")]
    ValidationError(String),
}

/// Read a TOML file into `T`
pub fn load_toml<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::IoError {
        path: path.to_path_buf(),
        source,
    })?;
    parse_toml(&content)
}

pub fn parse_toml<T: DeserializeOwned>(content: &str) -> Result<T, ConfigError> {
    Ok(toml::from_str(content)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_names_path() {
        let err = load_toml::<HealthSettings>(Path::new("no/such/settings.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::IoError { .. }));
        assert!(err.to_string().contains("no/such/settings.toml"));
    }

    #[test]
    fn test_bad_toml() {
        let err = parse_toml::<HealthSettings>("[hp\nbase_max_hp = ").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }
}
