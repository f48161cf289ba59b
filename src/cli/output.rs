//! CLI output formatting

use crate::core::{Stage, StageSpec};
use crate::execution::{RunEvent, RunStatus};
use console::Emoji;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

// Re-export style
pub use console::style;

// Emojis for output
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "✓ ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "✗ ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", "> ");

/// Create a progress bar counting finished stages
pub fn create_progress_bar(total: usize) -> ProgressBar {
    let progress = ProgressBar::new(total as u64);
    progress.set_style(
        ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} stages {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    progress.enable_steady_tick(Duration::from_millis(100));
    progress
}

/// Format a run status for display
pub fn format_status(status: RunStatus) -> String {
    match status {
        RunStatus::Succeeded => style("SUCCEEDED").green().to_string(),
        RunStatus::Failed => style("FAILED").red().to_string(),
    }
}

/// Format a stage for display
pub fn format_stage(stage: &Stage) -> String {
    let mut line = format!(
        "[{}] {}  {} -> ({}, {})",
        stage.ordinal,
        style(stage.describe()).bold(),
        style(format!("({}, {})", stage.map_output_key, stage.map_output_value)).dim(),
        style(&stage.output_key).cyan(),
        style(&stage.output_value).cyan()
    );
    if !stage.named_outputs.is_empty() {
        let names: Vec<&str> = stage.named_outputs.iter().map(|o| o.name.as_str()).collect();
        line.push_str(&format!("  outputs: {}", names.join(", ")));
    }
    line
}

/// Summarize how chain file entries were assembled into stages
pub fn format_assembly(entries: usize, stages: usize) -> String {
    let noun = if stages == 1 { "stage" } else { "stages" };
    if entries == stages {
        format!("{} {}", style(stages).cyan(), noun)
    } else {
        format!(
            "{} {} {}",
            style(stages).cyan(),
            noun,
            style(format!("(assembled from {} entries)", entries)).dim()
        )
    }
}

/// Assembled stages as pretty JSON, before any location is wired
pub fn format_stages_json(stages: &[Stage]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(stages)
}

/// Format a wired stage for display
pub fn format_stage_spec(spec: &StageSpec) -> String {
    format!(
        "[{}] {} {} {}",
        spec.stage.ordinal,
        style(&spec.input).dim(),
        style("->").bold(),
        style(&spec.output).dim()
    )
}

/// Format a run event for display
pub fn format_run_event(event: &RunEvent) -> String {
    match event {
        RunEvent::PipelineStarted {
            pipeline_name,
            stage_count,
            ..
        } => format!(
            "{} Running {} ({} stages)",
            ROCKET,
            style(pipeline_name).bold(),
            stage_count
        ),
        RunEvent::StageSubmitted {
            ordinal,
            handle,
            input,
            output,
        } => format!(
            "{} Stage {} submitted as {}: {} -> {}",
            INFO,
            style(ordinal).cyan(),
            style(handle).dim(),
            input,
            output
        ),
        RunEvent::StageCompleted { ordinal } => {
            format!("{} Stage {} completed", CHECK, style(ordinal).cyan())
        }
        RunEvent::StageFailed { ordinal, error } => format!(
            "{} Stage {} failed: {}",
            CROSS,
            style(ordinal).cyan(),
            style(error).red()
        ),
        RunEvent::PipelineCompleted { status, .. } => {
            format!("{} Run finished: {}", INFO, format_status(*status))
        }
    }
}
