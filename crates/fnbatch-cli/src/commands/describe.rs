use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use fnbatch_gen::{read_schema, summarize_batch, to_json_bytes};

use super::resolve_config;

#[derive(Args, Debug)]
pub struct DescribeArgs {
    /// Schema document (hypar.json or a function schema with `input_schema`).
    pub schema: PathBuf,
    /// Optional YAML or JSON generator config.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Cap on sampled candidates per parameter.
    #[arg(long)]
    pub max_options: Option<usize>,
}

pub fn run(args: &DescribeArgs) -> Result<(), Box<dyn Error>> {
    let config = resolve_config(args.config.as_deref(), args.max_options)?;
    let schema = read_schema(&args.schema)?;
    let summary = summarize_batch(&schema, &config)?;
    let bytes = to_json_bytes(&summary, true)?;
    println!("{}", String::from_utf8(bytes)?);
    Ok(())
}
