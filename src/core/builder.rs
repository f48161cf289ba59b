//! Pipeline assembly
//!
//! [`ChainBuilder::create`] starts a fixed call sequence:
//!
//! ```text
//! NamedBuilder --name--> TempDirBuilder --temp_dir--> MapReduceBuilder
//!     --mapper/reducer--> ReadyBuilder --mapper/reducer/build--> ...
//! ```
//!
//! Each step returns a different type, so building before naming or before
//! any phase is attached does not compile. The sealing rules live in
//! [`BuilderState`], which the config loader also drives directly.

use crate::core::error::BuildError;
use crate::core::options::{Configuration, StageOptions};
use crate::core::phase::{infer_map_types, infer_reduce_types, MapPhase, PhaseKind, ReducePhase};
use crate::core::pipeline::Pipeline;
use crate::core::stage::Stage;
use tracing::{debug, info, warn};

/// Mutable state behind the staged builders
///
/// A pending stage only ever exists while it holds a lone map phase: a
/// reducer always seals the stage it lands in.
#[derive(Debug)]
pub struct BuilderState {
    name: String,
    temp_dir: String,
    base: Configuration,
    stages: Vec<Stage>,
    pending: Option<Stage>,
}

impl BuilderState {
    pub fn new(name: impl Into<String>, temp_dir: impl Into<String>, base: Configuration) -> Self {
        Self {
            name: name.into(),
            temp_dir: temp_dir.into(),
            base,
            stages: Vec::new(),
            pending: None,
        }
    }

    /// Number of stages sealed so far
    pub fn sealed_count(&self) -> usize {
        self.stages.len()
    }

    /// Whether a map-only stage is waiting for a reducer
    pub fn has_pending_mapper(&self) -> bool {
        self.pending.is_some()
    }

    /// Attach a map phase, sealing a previous lone map phase
    ///
    /// Nothing changes when the phase or its options are rejected.
    pub fn attach_mapper(&mut self, phase: MapPhase, options: &StageOptions) -> Result<(), BuildError> {
        let (key, value) = infer_map_types(&phase)?;

        let mut stage = Stage::with_mapper(
            &self.name,
            self.base.clone(),
            phase.phase().class_name(),
            key,
            value,
        );
        stage.ordinal = self.stages.len() + usize::from(self.pending.is_some());
        options.apply_to(&mut stage, PhaseKind::Map)?;

        if let Some(previous) = self.pending.take() {
            warn!(
                "Stage {} ({}) has no reducer; sealing it as map-only",
                previous.ordinal,
                previous.describe()
            );
            self.seal_map_only(previous);
        }

        debug!("Stage {} started with {}", stage.ordinal, stage.describe());
        self.pending = Some(stage);
        Ok(())
    }

    /// Attach a reduce phase, completing the pending stage or starting a
    /// reduce-only one, and seal it
    pub fn attach_reducer(&mut self, phase: ReducePhase, options: &StageOptions) -> Result<(), BuildError> {
        let types = infer_reduce_types(&phase)?;
        let class_name = phase.phase().class_name();

        let mut stage = match self.pending.take() {
            Some(mut stage) => {
                if stage.map_output_key != types.input_key || stage.map_output_value != types.input_value {
                    warn!(
                        "Stage {}: mapper emits ({}, {}) but reducer {} expects ({}, {})",
                        stage.ordinal,
                        stage.map_output_key,
                        stage.map_output_value,
                        class_name,
                        types.input_key,
                        types.input_value
                    );
                }
                stage.attach_reducer(class_name, &types);
                stage
            }
            None => {
                let mut stage = Stage::with_reducer(&self.name, self.base.clone(), class_name, &types);
                stage.ordinal = self.stages.len();
                stage
            }
        };
        options.apply_to(&mut stage, PhaseKind::Reduce)?;

        self.seal(stage);
        Ok(())
    }

    /// Seal any open map-only stage and package the pipeline
    pub fn finish(mut self) -> Result<Pipeline, BuildError> {
        if let Some(stage) = self.pending.take() {
            self.seal_map_only(stage);
        }
        if self.stages.is_empty() {
            return Err(BuildError::EmptyPipeline);
        }

        info!("Assembled pipeline '{}' with {} stage(s)", self.name, self.stages.len());
        Ok(Pipeline::new(self.name, self.temp_dir, self.stages))
    }

    fn seal_map_only(&mut self, mut stage: Stage) {
        stage.seal_map_only();
        self.seal(stage);
    }

    fn seal(&mut self, stage: Stage) {
        debug!("Sealed stage {}: {}", stage.ordinal, stage.describe());
        self.stages.push(stage);
    }
}

/// Entry point of the staged builder
pub struct ChainBuilder;

impl ChainBuilder {
    /// Start assembling a pipeline with an empty base configuration
    pub fn create() -> NamedBuilder {
        Self::with_configuration(Configuration::new())
    }

    /// Start assembling a pipeline whose stages all inherit `base`
    pub fn with_configuration(base: Configuration) -> NamedBuilder {
        NamedBuilder { base }
    }
}

/// Builder waiting for the pipeline name
pub struct NamedBuilder {
    base: Configuration,
}

impl NamedBuilder {
    pub fn name(self, name: impl Into<String>) -> TempDirBuilder {
        TempDirBuilder {
            base: self.base,
            name: name.into(),
        }
    }
}

/// Builder waiting for the root of intermediate paths
pub struct TempDirBuilder {
    base: Configuration,
    name: String,
}

impl TempDirBuilder {
    /// Intermediate paths are formed as `path` followed by the stage index
    pub fn temp_dir(self, path: impl Into<String>) -> MapReduceBuilder {
        MapReduceBuilder {
            state: BuilderState::new(self.name, path, self.base),
        }
    }
}

/// Builder waiting for its first phase
pub struct MapReduceBuilder {
    state: BuilderState,
}

impl MapReduceBuilder {
    pub fn mapper(self, phase: impl Into<MapPhase>) -> Result<ReadyBuilder, BuildError> {
        self.ready().mapper(phase)
    }

    pub fn mapper_with_options(
        self,
        phase: impl Into<MapPhase>,
        options: StageOptions,
    ) -> Result<ReadyBuilder, BuildError> {
        self.ready().mapper_with_options(phase, options)
    }

    pub fn reducer(self, phase: impl Into<ReducePhase>) -> Result<ReadyBuilder, BuildError> {
        self.ready().reducer(phase)
    }

    pub fn reducer_with_options(
        self,
        phase: impl Into<ReducePhase>,
        options: StageOptions,
    ) -> Result<ReadyBuilder, BuildError> {
        self.ready().reducer_with_options(phase, options)
    }

    fn ready(self) -> ReadyBuilder {
        ReadyBuilder { state: self.state }
    }
}

/// Builder with at least one phase attached
pub struct ReadyBuilder {
    state: BuilderState,
}

impl ReadyBuilder {
    pub fn mapper(self, phase: impl Into<MapPhase>) -> Result<Self, BuildError> {
        self.mapper_with_options(phase, StageOptions::new())
    }

    pub fn mapper_with_options(
        mut self,
        phase: impl Into<MapPhase>,
        options: StageOptions,
    ) -> Result<Self, BuildError> {
        self.state.attach_mapper(phase.into(), &options)?;
        Ok(self)
    }

    pub fn reducer(self, phase: impl Into<ReducePhase>) -> Result<Self, BuildError> {
        self.reducer_with_options(phase, StageOptions::new())
    }

    pub fn reducer_with_options(
        mut self,
        phase: impl Into<ReducePhase>,
        options: StageOptions,
    ) -> Result<Self, BuildError> {
        self.state.attach_reducer(phase.into(), &options)?;
        Ok(self)
    }

    pub fn build(self) -> Result<Pipeline, BuildError> {
        self.state.finish()
    }
}
