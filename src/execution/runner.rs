//! Pipeline runner - drives stages through an engine one at a time

use crate::core::{Pipeline, StageSpec};
use crate::execution::engine::{EngineError, ExecutionEngine, JobHandle};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

/// Error that stops a pipeline run
#[derive(Debug, Error)]
pub enum RunError {
    /// The engine reported the stage as unsuccessful
    #[error("Stage {ordinal} of job '{name}' failed")]
    StageFailed { ordinal: usize, name: String },

    #[error("Failed to submit stage {ordinal} of job '{name}': {source}")]
    Submit {
        ordinal: usize,
        name: String,
        #[source]
        source: EngineError,
    },

    #[error("Lost track of stage {ordinal} of job '{name}': {source}")]
    Await {
        ordinal: usize,
        name: String,
        #[source]
        source: EngineError,
    },
}

impl RunError {
    /// Ordinal of the stage that stopped the run
    pub fn ordinal(&self) -> usize {
        match self {
            RunError::StageFailed { ordinal, .. }
            | RunError::Submit { ordinal, .. }
            | RunError::Await { ordinal, .. } => *ordinal,
        }
    }
}

/// Final status of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    Succeeded,
    Failed,
}

impl RunStatus {
    /// Process exit code for this status
    pub fn exit_code(&self) -> i32 {
        match self {
            RunStatus::Succeeded => 0,
            RunStatus::Failed => 1,
        }
    }
}

/// Events that can occur during a run
#[derive(Debug, Clone)]
pub enum RunEvent {
    PipelineStarted {
        run_id: Uuid,
        pipeline_name: String,
        stage_count: usize,
    },
    StageSubmitted {
        ordinal: usize,
        handle: JobHandle,
        input: String,
        output: String,
    },
    StageCompleted {
        ordinal: usize,
    },
    StageFailed {
        ordinal: usize,
        error: String,
    },
    PipelineCompleted {
        run_id: Uuid,
        status: RunStatus,
    },
}

/// Type for event handlers
pub type EventHandler = Arc<dyn Fn(RunEvent) + Send + Sync>;

/// A stage that ran to completion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageOutcome {
    pub ordinal: usize,
    pub handle: JobHandle,
    pub input: String,
    pub output: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

/// Summary of a successful run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub pipeline_name: String,
    pub status: RunStatus,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub stages: Vec<StageOutcome>,
}

/// Runs a pipeline's stages strictly in order on one engine
pub struct PipelineRunner<'e, E: ?Sized> {
    engine: &'e E,
    event_handlers: Vec<EventHandler>,
}

impl<'e, E: ExecutionEngine + ?Sized> PipelineRunner<'e, E> {
    pub fn new(engine: &'e E) -> Self {
        Self {
            engine,
            event_handlers: Vec::new(),
        }
    }

    /// Add an event handler
    pub fn add_event_handler<F>(&mut self, handler: F)
    where
        F: Fn(RunEvent) + Send + Sync + 'static,
    {
        self.event_handlers.push(Arc::new(handler));
    }

    /// Emit an event to all handlers
    fn emit_event(&self, event: RunEvent) {
        for handler in &self.event_handlers {
            handler(event.clone());
        }
    }

    /// Wire the pipeline and run every stage, stopping at the first failure
    ///
    /// Paths written by stages that completed before a failure are left in
    /// place.
    pub async fn run(&self, pipeline: &Pipeline, input: &str, output: &str) -> Result<RunReport, RunError> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();

        info!("Starting pipeline: {} ({})", pipeline.name(), run_id);
        self.emit_event(RunEvent::PipelineStarted {
            run_id,
            pipeline_name: pipeline.name().to_string(),
            stage_count: pipeline.stage_count(),
        });

        let specs = pipeline.wire_locations(input, output);
        let mut stages = Vec::with_capacity(specs.len());

        for spec in &specs {
            match self.run_stage(spec).await {
                Ok(outcome) => stages.push(outcome),
                Err(e) => {
                    error!("{}", e);
                    self.emit_event(RunEvent::StageFailed {
                        ordinal: e.ordinal(),
                        error: e.to_string(),
                    });
                    self.emit_event(RunEvent::PipelineCompleted {
                        run_id,
                        status: RunStatus::Failed,
                    });
                    return Err(e);
                }
            }
        }

        info!("Pipeline finished: {} - {} stage(s) succeeded", pipeline.name(), stages.len());
        self.emit_event(RunEvent::PipelineCompleted {
            run_id,
            status: RunStatus::Succeeded,
        });

        Ok(RunReport {
            run_id,
            pipeline_name: pipeline.name().to_string(),
            status: RunStatus::Succeeded,
            started_at,
            completed_at: Utc::now(),
            stages,
        })
    }

    /// Submit one stage and block until the engine reports its outcome
    async fn run_stage(&self, spec: &StageSpec) -> Result<StageOutcome, RunError> {
        let ordinal = spec.stage.ordinal;
        let name = &spec.stage.job_name;
        let started_at = Utc::now();

        info!("Submitting stage {}: {}", ordinal, spec.stage.describe());
        let handle = self
            .engine
            .submit(spec)
            .await
            .map_err(|source| RunError::Submit {
                ordinal,
                name: name.clone(),
                source,
            })?;

        self.emit_event(RunEvent::StageSubmitted {
            ordinal,
            handle: handle.clone(),
            input: spec.input.clone(),
            output: spec.output.clone(),
        });

        let succeeded = self
            .engine
            .await_completion(&handle)
            .await
            .map_err(|source| RunError::Await {
                ordinal,
                name: name.clone(),
                source,
            })?;

        if !succeeded {
            return Err(RunError::StageFailed {
                ordinal,
                name: name.clone(),
            });
        }

        info!("Stage {} completed", ordinal);
        self.emit_event(RunEvent::StageCompleted { ordinal });

        Ok(StageOutcome {
            ordinal,
            handle,
            input: spec.input.clone(),
            output: spec.output.clone(),
            started_at,
            completed_at: Utc::now(),
        })
    }
}
