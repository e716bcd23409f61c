use std::collections::BTreeMap;
use std::error::Error;
use std::path::{Path, PathBuf};

use clap::Args;
use fnbatch_gen::{
    read_schema, run_batch, summarize_batch, to_json_bytes, write_atomic, JsonFileSink,
    ModelResolution, RawSchema, SchemaDialect,
};
use serde_json::Value;
use tracing::info;

use super::resolve_config;

const LEGACY_SCHEMA_NAME: &str = "hypar.json";

#[derive(Args, Debug)]
pub struct InputsArgs {
    /// Schema document: `hypar.json` for the legacy `inputs` dialect, any
    /// `.json` file for the `input_schema` dialect.
    pub schema: PathBuf,
    /// Target `.json` file for the generated executions.
    pub out: PathBuf,
    /// Model references: a JSON object of name to path, or one path shared by
    /// every dependency.
    #[arg(long, conflicts_with = "model")]
    pub models: Option<String>,
    /// Single `NAME=PATH` model reference; may be repeated.
    #[arg(long = "model", value_name = "NAME=PATH")]
    pub model: Vec<String>,
    /// Optional YAML or JSON generator config.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Cap on sampled candidates per parameter.
    #[arg(long)]
    pub max_options: Option<usize>,
    /// Also write a summary (schema hash, option counts) to this path.
    #[arg(long)]
    pub summary: Option<PathBuf>,
    /// Pretty-print the output array.
    #[arg(long)]
    pub pretty: bool,
}

pub fn run(args: &InputsArgs) -> Result<(), Box<dyn Error>> {
    if !has_json_extension(&args.out) {
        return Err(format!(
            "Target output path must be a .json file. Currently: {}",
            args.out.display()
        )
        .into());
    }
    let config = resolve_config(args.config.as_deref(), args.max_options)?;
    let schema = read_schema(&args.schema)?;
    check_schema_path(&args.schema, &schema)?;
    let resolution = parse_resolution(args.models.as_deref(), &args.model)?;

    let mut sink = JsonFileSink::new(&args.out).pretty(args.pretty);
    let count = run_batch(&schema, &resolution, &config, &mut sink)?;

    if let Some(summary_path) = &args.summary {
        let summary = summarize_batch(&schema, &config)?;
        write_atomic(summary_path, &to_json_bytes(&summary, true)?)?;
        info!(path = %summary_path.display(), "summary written");
    }
    println!("Success: {count} executions written to {}", args.out.display());
    Ok(())
}

fn has_json_extension(path: &Path) -> bool {
    path.extension().and_then(|ext| ext.to_str()) == Some("json")
}

/// The legacy dialect is only accepted from a file named `hypar.json`.
fn check_schema_path(path: &Path, schema: &Value) -> Result<(), Box<dyn Error>> {
    let dialect = RawSchema::detect(schema)?.dialect();
    let file_name = path.file_name().and_then(|name| name.to_str());
    match dialect {
        SchemaDialect::Flat if file_name != Some(LEGACY_SCHEMA_NAME) => Err(format!(
            "Hypar config path must point to a file called '{LEGACY_SCHEMA_NAME}'. Currently: {}",
            path.display()
        )
        .into()),
        SchemaDialect::Properties if !has_json_extension(path) => Err(format!(
            "Schema path must be a .json file. Currently: {}",
            path.display()
        )
        .into()),
        _ => Ok(()),
    }
}

fn parse_resolution(
    models: Option<&str>,
    pairs: &[String],
) -> Result<ModelResolution, Box<dyn Error>> {
    if let Some(raw) = models {
        let trimmed = raw.trim();
        if trimmed.starts_with('{') {
            let value: Value = serde_json::from_str(trimmed)?;
            return Ok(ModelResolution::from_json(&value)?);
        }
        return Ok(ModelResolution::Shared(trimmed.to_string()));
    }
    if pairs.is_empty() {
        return Ok(ModelResolution::None);
    }
    let mut entries = BTreeMap::new();
    for pair in pairs {
        let (name, path) = pair
            .split_once('=')
            .filter(|(name, path)| !name.is_empty() && !path.is_empty())
            .ok_or_else(|| format!("expected NAME=PATH for --model, got `{pair}`"))?;
        entries.insert(name.to_string(), path.to_string());
    }
    Ok(ModelResolution::Map(entries))
}
