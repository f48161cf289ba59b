use anyhow::{Context, Result};
use mrchain::cli::commands::{PlanCommand, RunCommand, ValidateCommand};
use mrchain::cli::output::*;
use mrchain::cli::{Cli, Command};
use mrchain::core::config::ChainConfig;
use mrchain::core::Pipeline;
use mrchain::execution::{EngineConfig, PipelineRunner, RunEvent, RunStatus, SubprocessEngine};
use serde_yaml::Value;
use tracing::{error, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::from_args();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set logging subscriber")?;

    match &cli.command {
        Command::Run(cmd) => run_chain(cmd).await?,
        Command::Validate(cmd) => validate_chain(cmd)?,
        Command::Plan(cmd) => plan_chain(cmd)?,
    }

    Ok(())
}

/// Load a chain file and apply configuration overrides
fn load_config(file: &str, overrides: &[(String, String)]) -> Result<ChainConfig> {
    let mut config = ChainConfig::from_file(file)
        .with_context(|| format!("Failed to load chain config {}", file))?;

    for (key, value) in overrides {
        config
            .configuration
            .insert(key.clone(), Value::String(value.clone()));
    }
    Ok(config)
}

fn assemble(config: &ChainConfig) -> Result<Pipeline> {
    config
        .to_pipeline()
        .with_context(|| format!("Failed to assemble chain '{}'", config.name))
}

/// Load a chain file, apply configuration overrides and assemble it
fn load_pipeline(file: &str, overrides: &[(String, String)]) -> Result<Pipeline> {
    assemble(&load_config(file, overrides)?)
}

async fn run_chain(cmd: &RunCommand) -> Result<()> {
    let pipeline = load_pipeline(&cmd.file, &cmd.conf)?;

    println!(
        "{} Loaded chain: {} ({} stages)",
        INFO,
        style(pipeline.name()).bold(),
        pipeline.stage_count()
    );

    let mut engine_config = EngineConfig::new().with_args(cmd.args.clone());
    if let Some(command) = &cmd.command {
        engine_config = engine_config.with_command(command.clone());
    }
    if let Some(timeout) = cmd.timeout {
        engine_config = engine_config.with_timeout(timeout);
    }
    let engine = SubprocessEngine::new(engine_config);

    let progress = create_progress_bar(pipeline.stage_count());
    let mut runner = PipelineRunner::new(&engine);
    let bar = progress.clone();
    runner.add_event_handler(move |event| {
        bar.println(format_run_event(&event));
        if let RunEvent::StageCompleted { .. } = event {
            bar.inc(1);
        }
    });

    let result = runner.run(&pipeline, &cmd.input, &cmd.output).await;
    progress.finish_and_clear();

    match result {
        Ok(report) => {
            println!(
                "\n{} {} completed {} (run {})",
                CHECK,
                style(pipeline.name()).bold(),
                style("successfully").green(),
                style(&report.run_id.to_string()[..8]).dim()
            );
            Ok(())
        }
        Err(e) => {
            println!(
                "\n{} {} {}",
                CROSS,
                style(pipeline.name()).bold(),
                style("failed").red()
            );
            error!("{}", e);
            std::process::exit(RunStatus::Failed.exit_code());
        }
    }
}

fn validate_chain(cmd: &ValidateCommand) -> Result<()> {
    println!("{} Validating chain...", INFO);

    let loaded = load_config(&cmd.file, &[]).and_then(|config| {
        let pipeline = assemble(&config)?;
        Ok((config.stages.len(), pipeline))
    });

    match loaded {
        Ok((entries, pipeline)) => {
            println!("{} Chain is valid!", CHECK);
            println!("  Name: {}", style(pipeline.name()).bold());
            println!("  Temp dir: {}", style(pipeline.temp_dir()).dim());
            println!("  Stages: {}", format_assembly(entries, pipeline.stage_count()));
            for stage in pipeline.stages() {
                println!("    {}", format_stage(stage));
            }

            if cmd.json {
                println!("\n{}", format_stages_json(pipeline.stages())?);
            }
            Ok(())
        }
        Err(e) => {
            println!("{} Validation failed:", CROSS);
            println!("  {}", style(format!("{:#}", e)).red());
            std::process::exit(1);
        }
    }
}

fn plan_chain(cmd: &PlanCommand) -> Result<()> {
    let pipeline = load_pipeline(&cmd.file, &[])?;
    let specs = pipeline.wire_locations(&cmd.input, &cmd.output);

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&specs)?);
        return Ok(());
    }

    println!("{} Plan for {}:", INFO, style(pipeline.name()).bold());
    for spec in &specs {
        println!("  {}", format_stage_spec(spec));
        println!("      {}", format_stage(&spec.stage));
    }
    Ok(())
}
