use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;

use pymesh::config::Config;
use pymesh::graph::{GraphOptions, build_graph};

#[derive(Parser, Debug)]
#[command(
    name = "pymesh",
    version = "1.0",
    about = "Maps module imports and cross-module function calls of a Python project"
)]
struct Args {
    /// Path to the project root
    root: PathBuf,

    /// Entry point to trace, as a module name ("app.main") or a path relative to the root
    #[arg(short, long = "entry")]
    entries: Vec<String>,

    /// YAML file with the ignore policy and source extension
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Emit the node/edge graph document instead of the full report
    #[arg(long)]
    document: bool,

    /// Leave a module out of the graph document (repeatable)
    #[arg(long = "hide")]
    hidden: Vec<String>,

    /// Print every path (report or document) relative to the project root
    #[arg(long)]
    relative: bool,

    /// Select a specific nested key from the output using colon notation (e.g., "entries:app.main:function_graph")
    #[arg(short, long)]
    select: Option<String>,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => Config::from_yaml_file(path)?,
        None => Config::default(),
    };
    let options = GraphOptions {
        entries: args.entries,
        document: args.document,
        hidden: args.hidden,
        relative: args.relative,
        select: args.select,
    };

    let output_value = build_graph(&args.root, &config, &options)?;
    let json_output = serde_json::to_string_pretty(&output_value)
        .context("Failed to serialize output to JSON")?;

    println!("{}", json_output);

    Ok(())
}
