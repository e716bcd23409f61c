#![deny(missing_docs)]
#![doc = "Parameter model, execution records and error types for the fnbatch input generator."]

pub mod errors;
pub mod execution;
pub mod params;

pub use errors::{BatchError, ErrorInfo};
pub use execution::{BatchResult, Execution, MODEL_INPUT_KEYS};
pub use params::{ModelDependency, ParameterDescriptor, ParameterKind};
