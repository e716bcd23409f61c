use std::collections::BTreeMap;

use fnbatch_core::Execution;
use indexmap::IndexMap;
use serde_json::Value;

use crate::options::OptionSet;

/// Number of executions [`expand`] will produce, or `None` on overflow.
pub fn expected_len(options: &OptionSet) -> Option<usize> {
    options
        .values()
        .try_fold(1usize, |acc, candidates| acc.checked_mul(candidates.len()))
}

/// Builds the cartesian product of all option sets in nested-loop order: the
/// first parameter varies slowest, the last fastest.
pub fn expand(options: &OptionSet, models: Option<&BTreeMap<String, String>>) -> Vec<Execution> {
    let axes: Vec<(&String, &Vec<Value>)> = options.iter().collect();
    let mut outputs = Vec::with_capacity(expected_len(options).unwrap_or(0));
    expand_axes(&axes, 0, IndexMap::new(), models, &mut outputs);
    outputs
}

fn expand_axes(
    axes: &[(&String, &Vec<Value>)],
    idx: usize,
    current: IndexMap<String, Value>,
    models: Option<&BTreeMap<String, String>>,
    outputs: &mut Vec<Execution>,
) {
    if idx == axes.len() {
        outputs.push(Execution {
            params: current,
            model_input_keys: models.cloned(),
        });
        return;
    }
    let (name, candidates) = axes[idx];
    for value in candidates.iter() {
        let mut next = current.clone();
        next.insert(name.clone(), value.clone());
        expand_axes(axes, idx + 1, next, models, outputs);
    }
}
