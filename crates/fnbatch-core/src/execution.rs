//! Execution records emitted by the generator.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Key under which resolved model dependencies are attached to an execution.
pub const MODEL_INPUT_KEYS: &str = "model_input_keys";

/// One concrete assignment of a value to every parameter.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Execution {
    /// Parameter values keyed by name, in schema order.
    #[serde(flatten)]
    pub params: IndexMap<String, Value>,
    /// Resolved model references. Absent when the schema declares no dependencies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_input_keys: Option<BTreeMap<String, String>>,
}

impl Execution {
    /// Returns the value selected for `name`, if any.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.params.get(name)
    }

    /// Returns the selected values in parameter order.
    pub fn values(&self) -> Vec<&Value> {
        self.params.values().collect()
    }
}

/// Ordered list of executions; the only artifact produced by a batch run.
pub type BatchResult = Vec<Execution>;
