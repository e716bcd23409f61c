use std::collections::BTreeMap;

use fnbatch_core::errors::{BatchError, ErrorInfo};
use fnbatch_core::ModelDependency;
use serde_json::Value;
use tracing::{debug, warn};

/// Caller supplied model references for a schema's declared dependencies.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ModelResolution {
    /// Nothing supplied.
    #[default]
    None,
    /// One reference shared by every declared dependency.
    Shared(String),
    /// Reference per dependency name.
    Map(BTreeMap<String, String>),
}

impl ModelResolution {
    /// Interprets an already parsed JSON value: a string is broadcast, an object
    /// maps dependency names to references, `null` means nothing was supplied.
    pub fn from_json(value: &Value) -> Result<Self, BatchError> {
        match value {
            Value::Null => Ok(ModelResolution::None),
            Value::String(reference) => Ok(ModelResolution::Shared(reference.clone())),
            Value::Object(entries) => entries
                .iter()
                .map(|(name, reference)| match reference.as_str() {
                    Some(reference) => Ok((name.clone(), reference.to_string())),
                    None => Err(BatchError::Serde(
                        ErrorInfo::new(
                            "deps.reference_type",
                            "model references must be strings",
                        )
                        .with_context("dependency", name.as_str()),
                    )),
                })
                .collect::<Result<BTreeMap<_, _>, _>>()
                .map(ModelResolution::Map),
            other => Err(BatchError::Serde(ErrorInfo::new(
                "deps.resolution_type",
                format!("model resolution must be a string or an object, got {other}"),
            ))),
        }
    }

    fn lookup(&self, name: &str) -> Option<&str> {
        match self {
            ModelResolution::None => None,
            ModelResolution::Shared(reference) => Some(reference.as_str()),
            ModelResolution::Map(entries) => entries.get(name).map(String::as_str),
        }
    }
}

/// Resolves declared dependencies against the caller's references.
///
/// Returns `None` when the schema declares no dependencies, so executions do
/// not carry an empty `model_input_keys` object. Every missing required
/// dependency is reported in one error, sorted by name.
pub fn resolve_dependencies(
    declared: &[ModelDependency],
    resolution: &ModelResolution,
) -> Result<Option<BTreeMap<String, String>>, BatchError> {
    if declared.is_empty() {
        if *resolution != ModelResolution::None {
            warn!("model references supplied but the schema declares no model dependencies");
        }
        return Ok(None);
    }

    if let ModelResolution::Map(entries) = resolution {
        for name in entries.keys() {
            if !declared.iter().any(|dep| &dep.name == name) {
                warn!(dependency = %name, "ignoring reference for undeclared model dependency");
            }
        }
    }

    let mut resolved = BTreeMap::new();
    let mut missing = Vec::new();
    for dep in declared {
        match resolution.lookup(&dep.name) {
            Some(reference) => {
                resolved.insert(dep.name.clone(), reference.to_string());
            }
            None if dep.optional => {
                debug!(dependency = %dep.name, "optional model dependency left unresolved");
            }
            None => missing.push(dep.name.clone()),
        }
    }

    if !missing.is_empty() {
        missing.sort();
        missing.dedup();
        return Err(BatchError::Dependency(
            ErrorInfo::new(
                "deps.missing",
                format!(
                    "required model dependencies were not supplied: {}",
                    missing.join(", ")
                ),
            )
            .with_context("missing", missing.join(", "))
            .with_hint("pass a model reference for each required dependency"),
        ));
    }
    Ok(Some(resolved))
}
