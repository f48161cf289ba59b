//! Chain configuration from YAML

use crate::core::builder::BuilderState;
use crate::core::error::BuildError;
use crate::core::options::{Configuration, StageOptions};
use crate::core::phase::{MapPhase, ReducePhase, Signature};
use crate::core::pipeline::Pipeline;
use crate::core::types::TypeTag;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::collections::BTreeMap;
use std::path::Path;

/// Top-level chain configuration loaded from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Pipeline name, used as the job name of every stage
    pub name: String,

    /// Root of intermediate paths
    pub temp_dir: String,

    /// Base configuration copied into every stage
    #[serde(default)]
    pub configuration: BTreeMap<String, Value>,

    /// Phase declarations, in order
    ///
    /// Entries are not stages one-to-one: they pass through the builder's
    /// sealing rules, so a lone `mapper` entry followed by a lone `reducer`
    /// entry assembles into a single stage.
    #[serde(default)]
    pub stages: Vec<StageConfig>,
}

/// One stage declaration: a mapper, a reducer, or both
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageConfig {
    #[serde(default)]
    pub mapper: Option<PhaseConfig>,

    #[serde(default)]
    pub reducer: Option<PhaseConfig>,
}

/// A phase implemented outside this process
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseConfig {
    /// Class name the engine resolves
    pub class: String,

    /// Key in, value in, key out, value out; `~` leaves a parameter unbound
    #[serde(default)]
    pub types: Vec<Option<String>>,

    /// Stage options (`-M`, `-I`, or free-form configuration)
    #[serde(default)]
    pub options: BTreeMap<String, Value>,
}

impl PhaseConfig {
    fn signature(&self) -> Signature {
        let mut params: [Option<TypeTag>; 4] = Default::default();
        for (slot, name) in params.iter_mut().zip(&self.types) {
            *slot = name.as_deref().map(TypeTag::from);
        }
        Signature::from_params(params)
    }

    fn stage_options(&self) -> StageOptions {
        self.options
            .iter()
            .map(|(k, v)| (k.clone(), value_to_string(v)))
            .collect()
    }
}

impl ChainConfig {
    /// Load chain configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse chain configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: ChainConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the chain configuration
    ///
    /// Type and option problems are left to the builder, which reports them
    /// with the phase that caused them.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            anyhow::bail!("Chain name must not be empty");
        }
        if self.temp_dir.trim().is_empty() {
            anyhow::bail!("Chain '{}' has an empty temp_dir", self.name);
        }

        for (index, stage) in self.stages.iter().enumerate() {
            if stage.mapper.is_none() && stage.reducer.is_none() {
                anyhow::bail!("Stage entry {} declares neither a mapper nor a reducer", index);
            }
            for phase in stage.mapper.iter().chain(stage.reducer.iter()) {
                if phase.class.trim().is_empty() {
                    anyhow::bail!("Stage entry {} has a phase without a class", index);
                }
                if !phase.types.is_empty() && phase.types.len() != 4 {
                    anyhow::bail!(
                        "Phase '{}' in stage entry {} lists {} types; expected 4",
                        phase.class,
                        index,
                        phase.types.len()
                    );
                }
            }
        }

        Ok(())
    }

    /// Base configuration as plain strings
    pub fn base_configuration(&self) -> Configuration {
        self.configuration
            .iter()
            .map(|(k, v)| (k.clone(), value_to_string(v)))
            .collect()
    }

    /// Assemble the pipeline, applying the builder's sealing rules to the
    /// declared phases in order
    pub fn to_pipeline(&self) -> Result<Pipeline, BuildError> {
        let mut state = BuilderState::new(&self.name, &self.temp_dir, self.base_configuration());

        for stage in &self.stages {
            if let Some(mapper) = &stage.mapper {
                let phase = MapPhase::external(&mapper.class, mapper.signature());
                state.attach_mapper(phase, &mapper.stage_options())?;
            }
            if let Some(reducer) = &stage.reducer {
                let phase = ReducePhase::external(&reducer.class, reducer.signature());
                state.attach_reducer(phase, &reducer.stage_options())?;
            }
        }

        state.finish()
    }
}

/// Render a scalar YAML value the way it would be written on a command line
fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Null => String::new(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}
