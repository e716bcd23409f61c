use std::fs;
use std::path::Path;

use fnbatch_core::errors::{BatchError, ErrorInfo};
use serde::{Deserialize, Serialize};

use crate::options::DEFAULT_MAX_OPTIONS;
use crate::serde::{from_json_slice, from_yaml_slice};

/// Tunables for a generation run, loadable from YAML or JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Upper bound on sampled candidates per ranged or enumerated parameter.
    #[serde(default = "GeneratorConfig::default_max_options")]
    pub max_options_per_param: usize,
}

impl GeneratorConfig {
    const fn default_max_options() -> usize {
        DEFAULT_MAX_OPTIONS
    }

    pub fn with_max_options(mut self, max_options_per_param: usize) -> Self {
        self.max_options_per_param = max_options_per_param;
        self
    }

    pub fn validate(&self) -> Result<(), BatchError> {
        if self.max_options_per_param == 0 {
            return Err(BatchError::Config(
                ErrorInfo::new("config.max_options", "max_options_per_param must be at least 1")
                    .with_context("field", "max_options_per_param")
                    .with_context("value", "0"),
            ));
        }
        Ok(())
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            max_options_per_param: Self::default_max_options(),
        }
    }
}

/// Loads and validates a config file. `.json` files are parsed as JSON,
/// everything else as YAML.
pub fn load_config(path: &Path) -> Result<GeneratorConfig, BatchError> {
    let bytes = fs::read(path).map_err(|err| {
        BatchError::Io(
            ErrorInfo::new("io.read_config", err.to_string())
                .with_context("path", path.display().to_string()),
        )
    })?;
    let config: GeneratorConfig = match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => from_json_slice(&bytes)?,
        _ => from_yaml_slice(&bytes)?,
    };
    config.validate()?;
    Ok(config)
}
