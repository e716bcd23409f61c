use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use serde_json::{json, Value};

fn fnbatch(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_fnbatch"))
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .expect("run fnbatch")
}

fn write_json(path: &Path, value: &Value) {
    fs::write(path, serde_json::to_vec_pretty(value).unwrap()).unwrap();
}

#[test]
fn inputs_writes_the_batch() {
    let dir = tempfile::tempdir().unwrap();
    let schema = dir.path().join("hypar.json");
    write_json(
        &schema,
        &json!({"inputs": [
            {"name": "flag", "type": "boolean"},
            {"name": "mode", "type": "string", "values": ["a", "b", "c"]},
        ]}),
    );
    let out = dir.path().join("batch.json");
    let summary = dir.path().join("summary.json");
    let output = fnbatch(&[
        "inputs",
        schema.to_str().unwrap(),
        out.to_str().unwrap(),
        "--summary",
        summary.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(String::from_utf8_lossy(&output.stdout).starts_with("Success"));

    let written: Value = serde_json::from_slice(&fs::read(&out).unwrap()).unwrap();
    assert_eq!(written.as_array().map(Vec::len), Some(6));
    assert_eq!(written[0], json!({"flag": true, "mode": "a"}));

    let summary: Value = serde_json::from_slice(&fs::read(&summary).unwrap()).unwrap();
    assert_eq!(summary["executions"], 6);
    assert_eq!(summary["dialect"], "flat");
}

#[test]
fn inputs_attaches_model_references() {
    let dir = tempfile::tempdir().unwrap();
    let schema = dir.path().join("function.json");
    write_json(
        &schema,
        &json!({
            "input_schema": {"properties": {"Enabled": {"type": "boolean"}}},
            "model_dependencies": [{"name": "Site", "optional": false}],
        }),
    );
    let out = dir.path().join("batch.json");
    let output = fnbatch(&[
        "inputs",
        schema.to_str().unwrap(),
        out.to_str().unwrap(),
        "--model",
        "Site=models/site.json",
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let written: Value = serde_json::from_slice(&fs::read(&out).unwrap()).unwrap();
    assert_eq!(written[1]["model_input_keys"], json!({"Site": "models/site.json"}));
}

#[test]
fn missing_dependency_fails_without_output() {
    let dir = tempfile::tempdir().unwrap();
    let schema = dir.path().join("hypar.json");
    write_json(
        &schema,
        &json!({
            "inputs": [{"name": "flag", "type": "boolean"}],
            "model_dependencies": [{"name": "site", "optional": false}],
        }),
    );
    let out = dir.path().join("batch.json");
    let output = fnbatch(&["inputs", schema.to_str().unwrap(), out.to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("site"));
    assert!(!out.exists());
}

#[test]
fn path_conventions_are_enforced() {
    let dir = tempfile::tempdir().unwrap();
    let legacy = dir.path().join("schema.json");
    write_json(&legacy, &json!({"inputs": [{"name": "flag", "type": "boolean"}]}));

    let out = dir.path().join("batch.json");
    let output = fnbatch(&["inputs", legacy.to_str().unwrap(), out.to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("hypar.json"));

    let bad_out = dir.path().join("batch.txt");
    let output = fnbatch(&["inputs", legacy.to_str().unwrap(), bad_out.to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(!bad_out.exists());
}

#[test]
fn describe_prints_summary() {
    let dir = tempfile::tempdir().unwrap();
    let schema = dir.path().join("hypar.json");
    write_json(
        &schema,
        &json!({"inputs": [
            {"name": "Height", "type": "range", "min": 0, "max": 100, "step": 10},
            {"name": "Outline", "type": "geometry", "primitive_type": "polygon"},
        ]}),
    );
    let output = fnbatch(&["describe", schema.to_str().unwrap(), "--max-options", "3"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let summary: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["executions"], 3);
    assert_eq!(summary["parameters"][0]["kind"], "numeric-range");
    assert_eq!(summary["parameters"][1]["options"], 1);
}
