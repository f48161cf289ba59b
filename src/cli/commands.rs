//! CLI command definitions

use clap::Args;

/// Run a chain
#[derive(Debug, Args, Clone)]
pub struct RunCommand {
    /// Path to chain YAML file
    #[arg(short, long)]
    pub file: String,

    /// Input location of the first stage
    #[arg(short, long)]
    pub input: String,

    /// Output location of the last stage
    #[arg(short, long)]
    pub output: String,

    /// Base configuration overrides (key=value)
    #[arg(long, value_parser = parse_key_value)]
    pub conf: Vec<(String, String)>,

    /// Launcher executable spawned for each stage
    #[arg(long)]
    pub command: Option<String>,

    /// Extra argument passed to the launcher (repeatable)
    #[arg(long = "arg")]
    pub args: Vec<String>,

    /// Per-stage timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,
}

/// Assemble a chain and list its stages
#[derive(Debug, Args, Clone)]
pub struct ValidateCommand {
    /// Path to chain YAML file
    #[arg(short, long)]
    pub file: String,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Show where each stage reads and writes
#[derive(Debug, Args, Clone)]
pub struct PlanCommand {
    /// Path to chain YAML file
    #[arg(short, long)]
    pub file: String,

    /// Input location of the first stage
    #[arg(short, long)]
    pub input: String,

    /// Output location of the last stage
    #[arg(short, long)]
    pub output: String,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Parse key=value pairs
pub fn parse_key_value(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("Invalid key=value pair: {}", s)),
    }
}
