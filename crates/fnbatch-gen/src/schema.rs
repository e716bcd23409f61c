use std::collections::BTreeSet;

use fnbatch_core::errors::{BatchError, ErrorInfo};
use fnbatch_core::{ModelDependency, ParameterDescriptor, ParameterKind, MODEL_INPUT_KEYS};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::options::check_numeric_range;

/// Schema shapes accepted by the normalizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaDialect {
    /// Legacy `inputs: [{name, type, ...}]` list.
    Flat,
    /// `input_schema.properties` object keyed by parameter name.
    Properties,
}

/// Parameter declarations borrowed from a schema document, tagged by dialect.
#[derive(Debug, Clone, Copy)]
pub enum RawSchema<'a> {
    Flat(&'a [Value]),
    Properties(&'a Map<String, Value>),
}

impl<'a> RawSchema<'a> {
    /// Detects the dialect of `document`. A top-level `inputs` array wins over
    /// `input_schema.properties`.
    pub fn detect(document: &'a Value) -> Result<Self, BatchError> {
        if let Some(inputs) = document.get("inputs").and_then(Value::as_array) {
            return Ok(RawSchema::Flat(inputs));
        }
        if let Some(properties) = document
            .pointer("/input_schema/properties")
            .and_then(Value::as_object)
        {
            return Ok(RawSchema::Properties(properties));
        }
        Err(BatchError::Schema(
            ErrorInfo::new(
                "schema.undetected",
                "schema has neither an `inputs` array nor an `input_schema.properties` object",
            )
            .with_hint("pass a hypar.json with `inputs` or a function schema with `input_schema`"),
        ))
    }

    pub fn dialect(&self) -> SchemaDialect {
        match self {
            RawSchema::Flat(_) => SchemaDialect::Flat,
            RawSchema::Properties(_) => SchemaDialect::Properties,
        }
    }
}

/// Dialect-agnostic view of a schema document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedSchema {
    pub dialect: SchemaDialect,
    pub parameters: Vec<ParameterDescriptor>,
    #[serde(default)]
    pub model_dependencies: Vec<ModelDependency>,
}

/// Converts either schema dialect into an ordered parameter list plus the
/// declared model dependencies.
pub fn normalize_schema(document: &Value) -> Result<NormalizedSchema, BatchError> {
    let raw = RawSchema::detect(document)?;
    let parameters = match raw {
        RawSchema::Flat(entries) => entries
            .iter()
            .enumerate()
            .map(|(idx, entry)| normalize_flat_entry(idx, entry))
            .collect::<Result<Vec<_>, _>>()?,
        RawSchema::Properties(properties) => properties
            .iter()
            .map(|(name, entry)| normalize_property(name, entry))
            .collect::<Result<Vec<_>, _>>()?,
    };
    check_names(&parameters)?;
    let model_dependencies = parse_model_dependencies(document)?;
    debug!(
        dialect = ?raw.dialect(),
        parameters = parameters.len(),
        model_dependencies = model_dependencies.len(),
        "schema normalized"
    );
    Ok(NormalizedSchema {
        dialect: raw.dialect(),
        parameters,
        model_dependencies,
    })
}

fn normalize_flat_entry(idx: usize, entry: &Value) -> Result<ParameterDescriptor, BatchError> {
    let fields = entry.as_object().ok_or_else(|| {
        BatchError::Schema(
            ErrorInfo::new("schema.entry", "parameter entry must be an object")
                .with_context("dialect", "flat")
                .with_context("index", idx.to_string()),
        )
    })?;
    let name = fields
        .get("name")
        .and_then(Value::as_str)
        .filter(|name| !name.trim().is_empty())
        .ok_or_else(|| {
            BatchError::Schema(
                ErrorInfo::new("schema.entry_name", "parameter entry is missing a name")
                    .with_context("dialect", "flat")
                    .with_context("index", idx.to_string()),
            )
        })?;
    let type_name = fields.get("type").and_then(Value::as_str).unwrap_or("unknown");
    let kind = match type_name {
        "geometry" => {
            if fields.get("primitive_type").and_then(Value::as_str) == Some("polyline") {
                Some(ParameterKind::GeometryPolyline)
            } else {
                Some(ParameterKind::GeometryPolygon)
            }
        }
        "range" | "number" => numeric_kind(name, fields, ("min", "max"), &["step"], None, true)?,
        "integer" => numeric_kind(name, fields, ("min", "max"), &["step"], Some(1.0), true)?,
        "boolean" | "bool" => Some(ParameterKind::Boolean),
        "string" | "enum" | "choice" => string_enum(name, fields, &["values", "options"])?,
        "color" => Some(ParameterKind::Color),
        _ => None,
    };
    finish(name, type_name, kind, fields)
}

fn normalize_property(name: &str, entry: &Value) -> Result<ParameterDescriptor, BatchError> {
    let fields = entry.as_object().ok_or_else(|| {
        BatchError::Schema(
            ErrorInfo::new("schema.entry", "property definition must be an object")
                .with_context("dialect", "properties")
                .with_context("parameter", name),
        )
    })?;
    if let Some(reference) = schema_ref(fields) {
        let kind = if reference.ends_with("Polyline.json") {
            Some(ParameterKind::GeometryPolyline)
        } else if reference.ends_with("Polygon.json") || reference.ends_with("Profile.json") {
            Some(ParameterKind::GeometryPolygon)
        } else if reference.ends_with("Color.json") {
            Some(ParameterKind::Color)
        } else {
            None
        };
        return finish(name, reference, kind, fields);
    }
    let type_name = primary_type(fields).unwrap_or("unknown");
    let step_keys = ["multipleOf", "$hyparStep", "step"];
    let bounds = ("minimum", "maximum");
    let kind = match type_name {
        "number" => numeric_kind(name, fields, bounds, &step_keys, None, false)?,
        "integer" => numeric_kind(name, fields, bounds, &step_keys, Some(1.0), false)?,
        "boolean" => Some(ParameterKind::Boolean),
        "string" => string_enum(name, fields, &["enum"])?,
        _ => None,
    };
    finish(name, type_name, kind, fields)
}

/// Applies the `default-only` fallback when no sampling rule matched.
fn finish(
    name: &str,
    type_label: &str,
    kind: Option<ParameterKind>,
    fields: &Map<String, Value>,
) -> Result<ParameterDescriptor, BatchError> {
    let default = fields.get("default").filter(|value| !value.is_null());
    match kind.or_else(|| {
        default.map(|value| ParameterKind::DefaultOnly {
            default_value: value.clone(),
        })
    }) {
        Some(kind) => Ok(ParameterDescriptor::new(name, kind)),
        None => Err(BatchError::ParameterKind(
            ErrorInfo::new(
                "param.unsupported",
                format!("cannot generate options for parameter `{name}` of type `{type_label}`"),
            )
            .with_context("parameter", name)
            .with_context("kind", type_label)
            .with_hint("declare a default value or use a supported parameter type"),
        )),
    }
}

/// `None` when a bound is missing, or when `step_required` and no step key is
/// present, so the caller falls back to the default rule.
fn numeric_kind(
    name: &str,
    fields: &Map<String, Value>,
    (min_key, max_key): (&str, &str),
    step_keys: &[&str],
    default_step: Option<f64>,
    step_required: bool,
) -> Result<Option<ParameterKind>, BatchError> {
    let min = fields.get(min_key).and_then(Value::as_f64);
    let max = fields.get(max_key).and_then(Value::as_f64);
    let (Some(min), Some(max)) = (min, max) else {
        return Ok(None);
    };
    let step = step_keys
        .iter()
        .find_map(|key| fields.get(*key).and_then(Value::as_f64))
        .or(default_step);
    if step.is_none() && step_required {
        return Ok(None);
    }
    check_numeric_range(name, min, max, step)?;
    Ok(Some(ParameterKind::NumericRange { min, max, step }))
}

fn string_enum(
    name: &str,
    fields: &Map<String, Value>,
    keys: &[&str],
) -> Result<Option<ParameterKind>, BatchError> {
    let Some(entries) = keys
        .iter()
        .find_map(|key| fields.get(*key).and_then(Value::as_array))
    else {
        return Ok(None);
    };
    let mut values = Vec::with_capacity(entries.len());
    for (idx, entry) in entries.iter().enumerate() {
        match entry.as_str() {
            Some(value) => values.push(value.to_owned()),
            None => {
                return Err(BatchError::ParameterKind(
                    ErrorInfo::new(
                        "param.enum_value",
                        format!("enum value {entry} of `{name}` is not a string"),
                    )
                    .with_context("parameter", name)
                    .with_context("kind", "string-enum")
                    .with_context("index", idx.to_string()),
                ))
            }
        }
    }
    if values.is_empty() {
        Ok(None)
    } else {
        Ok(Some(ParameterKind::StringEnum { values }))
    }
}

fn schema_ref(fields: &Map<String, Value>) -> Option<&str> {
    fields.get("$ref").and_then(Value::as_str).or_else(|| {
        fields
            .get("allOf")
            .and_then(Value::as_array)?
            .iter()
            .find_map(|part| part.get("$ref").and_then(Value::as_str))
    })
}

/// `type` may be a plain string or a union such as `["number", "null"]`.
fn primary_type(fields: &Map<String, Value>) -> Option<&str> {
    match fields.get("type")? {
        Value::String(name) => Some(name.as_str()),
        Value::Array(names) => names
            .iter()
            .filter_map(Value::as_str)
            .find(|name| *name != "null"),
        _ => None,
    }
}

fn check_names(parameters: &[ParameterDescriptor]) -> Result<(), BatchError> {
    let mut seen = BTreeSet::new();
    for param in parameters {
        if param.name == MODEL_INPUT_KEYS {
            return Err(BatchError::Schema(
                ErrorInfo::new(
                    "schema.reserved_name",
                    format!("parameter name `{MODEL_INPUT_KEYS}` is reserved"),
                )
                .with_context("parameter", param.name.as_str()),
            ));
        }
        if !seen.insert(param.name.as_str()) {
            return Err(BatchError::Schema(
                ErrorInfo::new("schema.duplicate_name", "parameter names must be unique")
                    .with_context("parameter", param.name.as_str()),
            ));
        }
    }
    Ok(())
}

fn parse_model_dependencies(document: &Value) -> Result<Vec<ModelDependency>, BatchError> {
    match document.get("model_dependencies") {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(value) => Vec::<ModelDependency>::deserialize(value).map_err(|err| {
            BatchError::Schema(ErrorInfo::new(
                "schema.model_dependencies",
                format!("invalid model_dependencies declaration: {err}"),
            ))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn names(schema: &NormalizedSchema) -> Vec<&str> {
        schema.parameters.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn flat_dialect_keeps_array_order() {
        let doc = json!({
            "inputs": [
                {"name": "Width", "type": "range", "min": 0, "max": 100, "step": 10},
                {"name": "Outline", "type": "geometry", "primitive_type": "polyline"},
                {"name": "Site", "type": "geometry", "primitive_type": "polygon"},
            ]
        });
        let schema = normalize_schema(&doc).unwrap();
        assert_eq!(schema.dialect, SchemaDialect::Flat);
        assert_eq!(names(&schema), vec!["Width", "Outline", "Site"]);
        assert_eq!(
            schema.parameters[0].kind,
            ParameterKind::NumericRange {
                min: 0.0,
                max: 100.0,
                step: Some(10.0)
            }
        );
        assert_eq!(schema.parameters[1].kind, ParameterKind::GeometryPolyline);
        assert_eq!(schema.parameters[2].kind, ParameterKind::GeometryPolygon);
    }

    #[test]
    fn properties_dialect_keeps_key_order() {
        let doc = json!({
            "input_schema": {
                "properties": {
                    "Zoning": {"type": "string", "enum": ["A", "B"]},
                    "Levels": {"type": "integer", "minimum": 1, "maximum": 4},
                    "Boundary": {"$ref": "https://hypar.io/Schemas/Geometry/Polygon.json"},
                    "Tint": {"$ref": "https://hypar.io/Schemas/Geometry/Color.json"},
                    "Enabled": {"type": "boolean"},
                }
            }
        });
        let schema = normalize_schema(&doc).unwrap();
        assert_eq!(schema.dialect, SchemaDialect::Properties);
        assert_eq!(
            names(&schema),
            vec!["Zoning", "Levels", "Boundary", "Tint", "Enabled"]
        );
        assert_eq!(
            schema.parameters[1].kind,
            ParameterKind::NumericRange {
                min: 1.0,
                max: 4.0,
                step: Some(1.0)
            }
        );
        assert_eq!(schema.parameters[3].kind, ParameterKind::Color);
    }

    #[test]
    fn inputs_array_wins_over_properties() {
        let doc = json!({
            "inputs": [{"name": "Flag", "type": "boolean"}],
            "input_schema": {"properties": {"Other": {"type": "boolean"}}}
        });
        let schema = normalize_schema(&doc).unwrap();
        assert_eq!(schema.dialect, SchemaDialect::Flat);
        assert_eq!(names(&schema), vec!["Flag"]);
    }

    #[test]
    fn unknown_shapes_are_rejected() {
        for doc in [json!({}), json!([]), json!({"inputs": {}}), json!({"input_schema": {}})] {
            let err = normalize_schema(&doc).unwrap_err();
            assert!(matches!(err, BatchError::Schema(_)), "{doc}");
            assert_eq!(err.code(), "schema.undetected");
        }
    }

    #[test]
    fn default_is_the_fallback() {
        let doc = json!({
            "input_schema": {
                "properties": {
                    "Layout": {"type": "object", "default": {"rows": 2}},
                    "Label": {"type": "string", "default": "north"},
                }
            }
        });
        let schema = normalize_schema(&doc).unwrap();
        assert_eq!(
            schema.parameters[0].kind,
            ParameterKind::DefaultOnly {
                default_value: json!({"rows": 2})
            }
        );
        assert_eq!(
            schema.parameters[1].kind,
            ParameterKind::DefaultOnly {
                default_value: json!("north")
            }
        );
    }

    #[test]
    fn unsupported_kind_names_the_parameter() {
        let doc = json!({"inputs": [{"name": "Mesh", "type": "mesh"}]});
        let err = normalize_schema(&doc).unwrap_err();
        assert!(matches!(err, BatchError::ParameterKind(_)));
        assert_eq!(err.info().context["parameter"], "Mesh");
        assert_eq!(err.info().context["kind"], "mesh");

        let doc = json!({
            "input_schema": {"properties": {"Frame": {"$ref": "https://hypar.io/Schemas/Geometry/Transform.json"}}}
        });
        let err = normalize_schema(&doc).unwrap_err();
        assert_eq!(err.info().context["parameter"], "Frame");
        assert!(err.info().context["kind"].ends_with("Transform.json"));
    }

    #[test]
    fn invalid_ranges_are_rejected() {
        let doc = json!({"inputs": [{"name": "Depth", "type": "range", "min": 5, "max": 1, "step": 1}]});
        let err = normalize_schema(&doc).unwrap_err();
        assert_eq!(err.code(), "param.invalid_range");
        assert_eq!(err.info().context["parameter"], "Depth");
    }

    #[test]
    fn duplicate_and_reserved_names_are_rejected() {
        let doc = json!({"inputs": [
            {"name": "A", "type": "boolean"},
            {"name": "A", "type": "boolean"},
        ]});
        assert_eq!(normalize_schema(&doc).unwrap_err().code(), "schema.duplicate_name");

        let doc = json!({"inputs": [{"name": "model_input_keys", "type": "boolean"}]});
        assert_eq!(normalize_schema(&doc).unwrap_err().code(), "schema.reserved_name");
    }

    #[test]
    fn model_dependencies_are_parsed() {
        let doc = json!({
            "inputs": [],
            "model_dependencies": [
                {"name": "site", "optional": false},
                {"name": "context", "optional": true},
                {"name": "envelope"},
            ]
        });
        let schema = normalize_schema(&doc).unwrap();
        assert_eq!(
            schema.model_dependencies,
            vec![
                ModelDependency::required("site"),
                ModelDependency::optional("context"),
                ModelDependency::required("envelope"),
            ]
        );

        let doc = json!({"inputs": [], "model_dependencies": "site"});
        assert_eq!(
            normalize_schema(&doc).unwrap_err().code(),
            "schema.model_dependencies"
        );
    }

    #[test]
    fn hypar_step_sets_the_properties_step() {
        let doc = json!({
            "input_schema": {
                "properties": {
                    "Width": {"type": "number", "minimum": 0, "maximum": 4, "$hyparStep": 2},
                }
            }
        });
        let schema = normalize_schema(&doc).unwrap();
        assert_eq!(
            schema.parameters[0].kind,
            ParameterKind::NumericRange {
                min: 0.0,
                max: 4.0,
                step: Some(2.0)
            }
        );
        let options = crate::options::sample_options(&schema.parameters[0], 10).unwrap();
        assert_eq!(options, vec![json!(0), json!(2), json!(4)]);
    }

    #[test]
    fn non_string_enum_values_are_rejected() {
        let doc = json!({"inputs": [{"name": "Mode", "type": "enum", "values": ["a", 1, "b"]}]});
        let err = normalize_schema(&doc).unwrap_err();
        assert!(matches!(err, BatchError::ParameterKind(_)));
        assert_eq!(err.code(), "param.enum_value");
        assert_eq!(err.info().context["parameter"], "Mode");
        assert_eq!(err.info().context["index"], "1");

        let doc = json!({
            "input_schema": {"properties": {"Zone": {"type": "string", "enum": ["A", null]}}}
        });
        let err = normalize_schema(&doc).unwrap_err();
        assert_eq!(err.code(), "param.enum_value");
        assert_eq!(err.info().context["parameter"], "Zone");
    }

    #[test]
    fn flat_range_without_step_is_not_a_range() {
        let doc = json!({"inputs": [
            {"name": "Height", "type": "range", "min": 0, "max": 10, "default": 5},
            {"name": "Count", "type": "integer", "min": 1, "max": 3},
        ]});
        let schema = normalize_schema(&doc).unwrap();
        assert_eq!(
            schema.parameters[0].kind,
            ParameterKind::DefaultOnly {
                default_value: json!(5)
            }
        );
        assert_eq!(
            schema.parameters[1].kind,
            ParameterKind::NumericRange {
                min: 1.0,
                max: 3.0,
                step: Some(1.0)
            }
        );

        let doc = json!({"inputs": [{"name": "Depth", "type": "number", "min": 0, "max": 10}]});
        let err = normalize_schema(&doc).unwrap_err();
        assert_eq!(err.code(), "param.unsupported");
        assert_eq!(err.info().context["parameter"], "Depth");
    }

    #[test]
    fn flat_type_aliases_are_accepted() {
        let doc = json!({"inputs": [
            {"name": "Flag", "type": "bool"},
            {"name": "Style", "type": "choice", "options": ["x", "y"]},
            {"name": "Depth", "type": "number", "min": 0, "max": 1, "step": 0.5},
        ]});
        let schema = normalize_schema(&doc).unwrap();
        assert_eq!(schema.parameters[0].kind, ParameterKind::Boolean);
        assert_eq!(
            schema.parameters[1].kind,
            ParameterKind::StringEnum {
                values: vec!["x".into(), "y".into()]
            }
        );
        assert_eq!(
            schema.parameters[2].kind,
            ParameterKind::NumericRange {
                min: 0.0,
                max: 1.0,
                step: Some(0.5)
            }
        );
    }

    #[test]
    fn refs_and_type_unions_are_resolved() {
        let doc = json!({
            "input_schema": {
                "properties": {
                    "Perimeter": {"$ref": "https://hypar.io/Schemas/Geometry/Profile.json"},
                    "Path": {"allOf": [{"$ref": "https://hypar.io/Schemas/Geometry/Polyline.json"}]},
                    "Offset": {"type": ["number", "null"], "minimum": 0, "maximum": 2, "multipleOf": 1},
                }
            }
        });
        let schema = normalize_schema(&doc).unwrap();
        assert_eq!(schema.parameters[0].kind, ParameterKind::GeometryPolygon);
        assert_eq!(schema.parameters[1].kind, ParameterKind::GeometryPolyline);
        assert_eq!(
            schema.parameters[2].kind,
            ParameterKind::NumericRange {
                min: 0.0,
                max: 2.0,
                step: Some(1.0)
            }
        );
    }
}
