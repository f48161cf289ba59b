//! Pipeline domain model

use crate::core::stage::Stage;
use crate::execution::{ExecutionEngine, PipelineRunner, RunError, RunReport};
use serde::{Deserialize, Serialize};

/// An assembled, immutable chain of stages
#[derive(Debug, Clone, PartialEq)]
pub struct Pipeline {
    name: String,
    temp_dir: String,
    stages: Vec<Stage>,
}

/// A stage together with the locations it reads from and writes to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageSpec {
    pub input: String,
    pub output: String,
    #[serde(flatten)]
    pub stage: Stage,
}

impl Pipeline {
    /// Only the builder creates pipelines, and never with zero stages
    pub(crate) fn new(name: String, temp_dir: String, stages: Vec<Stage>) -> Self {
        Self { name, temp_dir, stages }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn temp_dir(&self) -> &str {
        &self.temp_dir
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Get a stage by ordinal
    pub fn stage(&self, index: usize) -> Option<&Stage> {
        self.stages.get(index)
    }

    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Location connecting stage `index - 1` to stage `index`
    pub fn intermediate_path(&self, index: usize) -> String {
        format!("{}{}", self.temp_dir, index)
    }

    /// Assign input and output locations to every stage
    ///
    /// The first stage reads `input`, the last writes `output`, and each pair
    /// of neighbours shares an intermediate path. The result depends only on
    /// the temp root and the stage count.
    pub fn wire_locations(&self, input: &str, output: &str) -> Vec<StageSpec> {
        let last = self.stages.len().saturating_sub(1);
        self.stages
            .iter()
            .enumerate()
            .map(|(i, stage)| StageSpec {
                input: if i == 0 { input.to_string() } else { self.intermediate_path(i) },
                output: if i == last { output.to_string() } else { self.intermediate_path(i + 1) },
                stage: stage.clone(),
            })
            .collect()
    }

    /// Run every stage in order on `engine`, stopping at the first failure
    pub async fn run<E>(&self, engine: &E, input: &str, output: &str) -> Result<RunReport, RunError>
    where
        E: ExecutionEngine + ?Sized,
    {
        PipelineRunner::new(engine).run(self, input, output).await
    }
}
