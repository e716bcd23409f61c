pub mod describe;
pub mod inputs;

use std::path::Path;

use fnbatch_core::errors::BatchError;
use fnbatch_gen::{load_config, GeneratorConfig};

/// Config file values first, then the `--max-options` override.
pub(crate) fn resolve_config(
    config: Option<&Path>,
    max_options: Option<usize>,
) -> Result<GeneratorConfig, BatchError> {
    let mut resolved = match config {
        Some(path) => load_config(path)?,
        None => GeneratorConfig::default(),
    };
    if let Some(max_options) = max_options {
        resolved = resolved.with_max_options(max_options);
    }
    resolved.validate()?;
    Ok(resolved)
}
