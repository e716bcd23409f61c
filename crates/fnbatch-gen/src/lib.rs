//! Batch test input generation: schema normalization, bounded sampling and
//! cartesian expansion of parameter candidates.

mod config;
mod deps;
mod expand;
mod generate;
mod hash;
mod options;
mod sample;
mod schema;
mod serde;
mod sink;

pub use config::{load_config, GeneratorConfig};
pub use deps::{resolve_dependencies, ModelResolution};
pub use expand::{expand, expected_len};
pub use generate::{
    generate_batch, plan_batch, run_batch, summarize_batch, BatchPlan, BatchSummary,
    ParameterSummary,
};
pub use hash::stable_hash_string;
pub use options::{sample_option_sets, sample_options, OptionSet, DEFAULT_MAX_OPTIONS};
pub use sample::{evenly_distributed_indices, evenly_distributed_subset};
pub use schema::{normalize_schema, NormalizedSchema, RawSchema, SchemaDialect};
pub use sink::{read_schema, write_atomic, ExecutionSink, JsonFileSink};

pub use crate::serde::{from_json_slice, to_canonical_json_bytes, to_json_bytes};
