use fnbatch_core::errors::{BatchError, ErrorInfo};
use fnbatch_core::{BatchResult, ModelDependency, ParameterDescriptor};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::config::GeneratorConfig;
use crate::deps::{resolve_dependencies, ModelResolution};
use crate::expand::{expand, expected_len};
use crate::hash::stable_hash_string;
use crate::options::{sample_option_sets, OptionSet};
use crate::schema::{normalize_schema, SchemaDialect};
use crate::sink::ExecutionSink;

/// Normalized parameters and their sampled candidates, ready for expansion.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchPlan {
    /// Dialect the schema was written in.
    pub dialect: SchemaDialect,
    /// Normalized parameters in declaration order.
    pub parameters: Vec<ParameterDescriptor>,
    /// Sampled candidates keyed by parameter name, same order as `parameters`.
    pub options: OptionSet,
    /// Declared model dependencies, empty when the schema has none.
    pub model_dependencies: Vec<ModelDependency>,
}

impl BatchPlan {
    /// Number of executions the plan expands to, `None` on overflow.
    pub fn execution_count(&self) -> Option<usize> {
        expected_len(&self.options)
    }
}

/// Per-parameter line of a [`BatchSummary`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSummary {
    /// Parameter name as declared in the schema.
    pub name: String,
    /// Kind label such as `numeric-range` or `default-only`.
    pub kind: String,
    /// Number of sampled candidates after the cap.
    pub options: usize,
}

/// Description of a batch without its executions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// SHA-256 of the canonical (key-sorted) schema JSON.
    pub schema_hash: String,
    /// Dialect the schema was written in.
    pub dialect: SchemaDialect,
    /// Candidate cap the batch was sampled with.
    pub max_options_per_param: usize,
    /// One line per parameter, in declaration order.
    pub parameters: Vec<ParameterSummary>,
    /// Declared model dependencies.
    pub model_dependencies: Vec<ModelDependency>,
    /// Size of the cartesian product.
    pub executions: usize,
}

/// Normalizes the schema and samples candidates for every parameter.
pub fn plan_batch(schema: &Value, config: &GeneratorConfig) -> Result<BatchPlan, BatchError> {
    config.validate()?;
    let normalized = normalize_schema(schema)?;
    let options = sample_option_sets(&normalized.parameters, config.max_options_per_param)?;
    Ok(BatchPlan {
        dialect: normalized.dialect,
        parameters: normalized.parameters,
        options,
        model_dependencies: normalized.model_dependencies,
    })
}

/// Runs the full pipeline and returns the executions in generation order.
/// Fails on the first error; nothing is returned partially.
pub fn generate_batch(
    schema: &Value,
    resolution: &ModelResolution,
    config: &GeneratorConfig,
) -> Result<BatchResult, BatchError> {
    let plan = plan_batch(schema, config)?;
    let models = resolve_dependencies(&plan.model_dependencies, resolution)?;
    let count = plan.execution_count().ok_or_else(|| {
        BatchError::Config(
            ErrorInfo::new("batch.too_large", "execution count overflows the address space")
                .with_context("parameters", plan.parameters.len().to_string())
                .with_hint("lower max_options_per_param"),
        )
    })?;
    let executions = expand(&plan.options, models.as_ref());
    debug_assert_eq!(executions.len(), count);
    info!(
        parameters = plan.parameters.len(),
        executions = executions.len(),
        "batch generated"
    );
    Ok(executions)
}

/// Generates the batch and hands it to `sink`. The sink is not touched when
/// generation fails.
pub fn run_batch(
    schema: &Value,
    resolution: &ModelResolution,
    config: &GeneratorConfig,
    sink: &mut dyn ExecutionSink,
) -> Result<usize, BatchError> {
    let executions = generate_batch(schema, resolution, config)?;
    sink.accept(&executions)?;
    Ok(executions.len())
}

/// Summarizes a schema: its hash, parameters, candidate counts and the
/// resulting execution count.
pub fn summarize_batch(schema: &Value, config: &GeneratorConfig) -> Result<BatchSummary, BatchError> {
    let plan = plan_batch(schema, config)?;
    let executions = plan.execution_count().unwrap_or(usize::MAX);
    let parameters = plan
        .parameters
        .iter()
        .map(|param| ParameterSummary {
            name: param.name.clone(),
            kind: param.kind.label().to_string(),
            options: plan.options.get(&param.name).map_or(0, Vec::len),
        })
        .collect();
    Ok(BatchSummary {
        schema_hash: stable_hash_string(schema)?,
        dialect: plan.dialect,
        max_options_per_param: config.max_options_per_param,
        parameters,
        model_dependencies: plan.model_dependencies,
        executions,
    })
}
