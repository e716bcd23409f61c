use std::error::Error;

use clap::{Parser, Subcommand};
use commands::{
    describe::{self, DescribeArgs},
    inputs::{self, InputsArgs},
};
use tracing_subscriber::{fmt, EnvFilter};

mod commands;

#[derive(Parser, Debug)]
#[command(name = "fnbatch", version, about = "Batch test input generator for parametric functions")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate every combination of sampled inputs and write them as a JSON array.
    Inputs(InputsArgs),
    /// Print the normalized parameters and the size of the batch they expand to.
    Describe(DescribeArgs),
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<(), Box<dyn Error>> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Command::Inputs(args) => inputs::run(&args),
        Command::Describe(args) => describe::run(&args),
    }
}
