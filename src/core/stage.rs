//! Stage domain model

use crate::core::options::{Configuration, InputFormat, NamedOutput, OutputFormat};
use crate::core::phase::ReduceTypes;
use crate::core::types::TypeTag;
use serde::{Deserialize, Serialize};

/// One map and/or reduce execution unit
///
/// Stages are created by the builder when a phase is attached and are never
/// mutated after being sealed into a [`Pipeline`](crate::core::Pipeline).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    /// Position in the pipeline
    pub ordinal: usize,

    /// Job name reported to the engine (the pipeline name)
    pub job_name: String,

    /// Class name of the map phase, if any
    pub mapper: Option<String>,

    /// Class name of the reduce phase, if any
    pub reducer: Option<String>,

    /// Intermediate key type emitted by the map side
    pub map_output_key: TypeTag,

    /// Intermediate value type emitted by the map side
    pub map_output_value: TypeTag,

    /// Final key type written by the stage
    pub output_key: TypeTag,

    /// Final value type written by the stage
    pub output_value: TypeTag,

    /// Reduce task count; `Some(0)` for map-only stages, `None` leaves it to the engine
    pub num_reduce_tasks: Option<u32>,

    pub input_format: InputFormat,

    pub output_format: OutputFormat,

    #[serde(default)]
    pub named_outputs: Vec<NamedOutput>,

    /// Stage-scoped configuration
    #[serde(default)]
    pub configuration: Configuration,
}

impl Stage {
    /// Start a stage around a map phase
    ///
    /// The map output types double as the stage output types until a
    /// reducer overrides them.
    pub fn with_mapper(
        job_name: &str,
        configuration: Configuration,
        class_name: &str,
        output_key: TypeTag,
        output_value: TypeTag,
    ) -> Self {
        Self {
            ordinal: 0,
            job_name: job_name.to_string(),
            mapper: Some(class_name.to_string()),
            reducer: None,
            map_output_key: output_key.clone(),
            map_output_value: output_value.clone(),
            output_key,
            output_value,
            num_reduce_tasks: None,
            input_format: InputFormat::default(),
            output_format: OutputFormat::default(),
            named_outputs: Vec::new(),
            configuration,
        }
    }

    /// Start a stage that only has a reduce phase
    pub fn with_reducer(
        job_name: &str,
        configuration: Configuration,
        class_name: &str,
        types: &ReduceTypes,
    ) -> Self {
        Self {
            ordinal: 0,
            job_name: job_name.to_string(),
            mapper: None,
            reducer: Some(class_name.to_string()),
            map_output_key: types.input_key.clone(),
            map_output_value: types.input_value.clone(),
            output_key: types.output_key.clone(),
            output_value: types.output_value.clone(),
            num_reduce_tasks: None,
            input_format: InputFormat::default(),
            output_format: OutputFormat::default(),
            named_outputs: Vec::new(),
            configuration,
        }
    }

    /// Attach a reduce phase to a stage that so far only maps
    ///
    /// The reducer's input types fix the intermediate types and its output
    /// types become the stage output types.
    pub fn attach_reducer(&mut self, class_name: &str, types: &ReduceTypes) {
        self.reducer = Some(class_name.to_string());
        self.map_output_key = types.input_key.clone();
        self.map_output_value = types.input_value.clone();
        self.output_key = types.output_key.clone();
        self.output_value = types.output_value.clone();
    }

    /// Close the stage without a reduce phase
    pub fn seal_map_only(&mut self) {
        self.num_reduce_tasks = Some(0);
    }

    pub fn is_map_only(&self) -> bool {
        self.reducer.is_none()
    }

    /// Short human-readable description of the phases
    pub fn describe(&self) -> String {
        match (&self.mapper, &self.reducer) {
            (Some(m), Some(r)) => format!("map {} -> reduce {}", m, r),
            (Some(m), None) => format!("map {} (map-only)", m),
            (None, Some(r)) => format!("reduce {}", r),
            (None, None) => "empty".to_string(),
        }
    }
}
