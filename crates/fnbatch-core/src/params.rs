//! Normalized parameter model shared by both schema dialects.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Kind of a parameter together with its kind specific constraints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ParameterKind {
    /// Open polyline geometry, sampled as one canonical shape.
    GeometryPolyline,
    /// Closed polygon geometry, sampled as one canonical shape.
    GeometryPolygon,
    /// Arithmetic range `min, min + step, ..., <= max`.
    NumericRange {
        /// Inclusive lower bound.
        min: f64,
        /// Inclusive upper bound.
        max: f64,
        /// Positive increment. `None` spreads the cap evenly over the range.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        step: Option<f64>,
    },
    /// Boolean flag with the implicit domain `{true, false}`.
    Boolean,
    /// Closed set of string choices in declaration order.
    StringEnum {
        /// Declared values, never empty.
        values: Vec<String>,
    },
    /// RGBA color, sampled as one canonical color.
    Color,
    /// Fallback for parameters that only carry a default value.
    DefaultOnly {
        /// Declared default, emitted verbatim.
        default_value: Value,
    },
}

impl ParameterKind {
    /// Returns the stable kebab-case label used in logs and summaries.
    pub fn label(&self) -> &'static str {
        match self {
            ParameterKind::GeometryPolyline => "geometry-polyline",
            ParameterKind::GeometryPolygon => "geometry-polygon",
            ParameterKind::NumericRange { .. } => "numeric-range",
            ParameterKind::Boolean => "boolean",
            ParameterKind::StringEnum { .. } => "string-enum",
            ParameterKind::Color => "color",
            ParameterKind::DefaultOnly { .. } => "default-only",
        }
    }
}

/// A single named parameter in schema declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterDescriptor {
    /// Parameter name, unique within a schema.
    pub name: String,
    /// Kind and constraints.
    #[serde(flatten)]
    pub kind: ParameterKind,
}

impl ParameterDescriptor {
    /// Creates a descriptor from a name and kind.
    pub fn new(name: impl Into<String>, kind: ParameterKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// External model dependency declared by a schema.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModelDependency {
    /// Dependency name used as the key in `model_input_keys`.
    pub name: String,
    /// Optional dependencies may be left unresolved.
    #[serde(default)]
    pub optional: bool,
}

impl ModelDependency {
    /// Creates a required dependency.
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            optional: false,
        }
    }

    /// Creates an optional dependency.
    pub fn optional(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            optional: true,
        }
    }
}
