use fnbatch_core::errors::{BatchError, ErrorInfo};
use fnbatch_core::{ParameterDescriptor, ParameterKind};
use indexmap::IndexMap;
use serde_json::{json, Value};
use tracing::debug;

use crate::sample::{evenly_distributed_indices, evenly_distributed_subset};

/// Default cap on the number of candidates sampled per parameter.
pub const DEFAULT_MAX_OPTIONS: usize = 10;

/// Tolerance absorbing float error when counting range steps, so that
/// `0.0..=1.0` by `0.1` still reaches `1.0`.
const RANGE_EPSILON: f64 = 1e-9;

const POLYLINE_DISCRIMINATOR: &str = "Elements.Geometry.Polyline";
const POLYGON_DISCRIMINATOR: &str = "Elements.Geometry.Polygon";

/// Candidate values per parameter, in schema order.
pub type OptionSet = IndexMap<String, Vec<Value>>;

/// Produces the bounded candidate list for a single parameter.
pub fn sample_options(param: &ParameterDescriptor, cap: usize) -> Result<Vec<Value>, BatchError> {
    match &param.kind {
        ParameterKind::NumericRange { min, max, step } => {
            check_numeric_range(&param.name, *min, *max, *step)?;
            match step {
                Some(step) => sample_range(*min, *max, *step, cap),
                None => spread_range(*min, *max, cap),
            }
        }
        ParameterKind::StringEnum { values } => {
            if values.is_empty() {
                return Err(BatchError::ParameterKind(
                    ErrorInfo::new("param.empty_enum", "string enum declares no values")
                        .with_context("parameter", param.name.as_str())
                        .with_context("kind", param.kind.label()),
                ));
            }
            let picked = evenly_distributed_subset(values, cap.min(values.len()))?;
            Ok(picked.into_iter().map(Value::String).collect())
        }
        ParameterKind::Boolean => Ok(vec![Value::Bool(true), Value::Bool(false)]),
        ParameterKind::GeometryPolyline => Ok(vec![canonical_shape(POLYLINE_DISCRIMINATOR)]),
        ParameterKind::GeometryPolygon => Ok(vec![canonical_shape(POLYGON_DISCRIMINATOR)]),
        ParameterKind::Color => Ok(vec![canonical_color()]),
        ParameterKind::DefaultOnly { default_value } => Ok(vec![default_value.clone()]),
    }
}

/// Samples every parameter, keeping schema order.
pub fn sample_option_sets(
    params: &[ParameterDescriptor],
    cap: usize,
) -> Result<OptionSet, BatchError> {
    let mut options = OptionSet::with_capacity(params.len());
    for param in params {
        let candidates = sample_options(param, cap)?;
        debug!(
            parameter = %param.name,
            kind = param.kind.label(),
            candidates = candidates.len(),
            "options sampled"
        );
        options.insert(param.name.clone(), candidates);
    }
    Ok(options)
}

/// Rejects ranges that cannot be enumerated.
pub(crate) fn check_numeric_range(
    name: &str,
    min: f64,
    max: f64,
    step: Option<f64>,
) -> Result<(), BatchError> {
    let step_ok = step.map_or(true, |step| step.is_finite() && step > 0.0);
    if min.is_finite() && max.is_finite() && max >= min && step_ok {
        return Ok(());
    }
    let mut info = ErrorInfo::new(
        "param.invalid_range",
        format!("numeric range for `{name}` needs finite bounds with max >= min and step > 0"),
    )
    .with_context("parameter", name)
    .with_context("kind", "numeric-range")
    .with_context("min", min.to_string())
    .with_context("max", max.to_string());
    if let Some(step) = step {
        info = info.with_context("step", step.to_string());
    }
    Err(BatchError::ParameterKind(info))
}

/// Walks `min + i * step` up to `max` without materializing the full range.
fn sample_range(min: f64, max: f64, step: f64, cap: usize) -> Result<Vec<Value>, BatchError> {
    let steps = ((max - min) / step + RANGE_EPSILON).floor();
    // Saturating cast; anything this large is reduced to `cap` picks anyway.
    let len = (steps as usize).saturating_add(1);
    let indices = evenly_distributed_indices(len, cap.min(len))?;
    Ok(indices
        .into_iter()
        .map(|idx| numeric_value(min + idx as f64 * step))
        .collect())
}

/// Used when a range declares no step: `cap` evenly spaced points, both ends included.
fn spread_range(min: f64, max: f64, cap: usize) -> Result<Vec<Value>, BatchError> {
    if cap == 0 {
        return Err(BatchError::Sampler(
            ErrorInfo::new("sampler.invalid", "cannot spread a range over zero items")
                .with_context("n", "0"),
        ));
    }
    if cap == 1 || max == min {
        return Ok(vec![numeric_value(min)]);
    }
    let width = max - min;
    let last = (cap - 1) as f64;
    Ok((0..cap)
        .map(|idx| {
            if idx == cap - 1 {
                numeric_value(max)
            } else {
                numeric_value(min + width * idx as f64 / last)
            }
        })
        .collect())
}

/// Integral values are emitted as JSON integers.
fn numeric_value(value: f64) -> Value {
    const EXACT_INT: f64 = 9_007_199_254_740_992.0;
    if value.fract() == 0.0 && value.abs() < EXACT_INT {
        json!(value as i64)
    } else {
        json!(value)
    }
}

/// Closed 40x40 square on the XY plane, tagged as polyline or polygon.
fn canonical_shape(discriminator: &str) -> Value {
    let vertices: Vec<Value> = [(0, 0), (40, 0), (40, 40), (0, 40)]
        .iter()
        .map(|(x, y)| json!({"X": x, "Y": y, "Z": 0}))
        .collect();
    json!({
        "discriminator": discriminator,
        "Vertices": vertices,
    })
}

/// Opaque white.
fn canonical_color() -> Value {
    json!({"Red": 1.0, "Green": 1.0, "Blue": 1.0, "Alpha": 1.0})
}
