//! Stage options, formats and configuration

use crate::core::error::BuildError;
use crate::core::phase::PhaseKind;
use crate::core::stage::Stage;
use crate::core::types::TypeTag;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;
use tracing::{debug, warn};

/// Option key that turns on multiple named outputs for a reduce phase
pub const MULTIPLE_OUTPUTS: &str = "-M";

/// Option key that overrides the input format of a map phase
pub const INPUT_FORMAT: &str = "-I";

/// Name of the output channel registered by [`MULTIPLE_OUTPUTS`]
pub const DEFAULT_NAMED_OUTPUT: &str = "text";

/// Key/value configuration handed to the engine with a stage
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Configuration(BTreeMap<String, String>);

impl Configuration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Configuration {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// How a stage reads its input
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputFormat {
    /// Line-oriented text; key is the byte offset
    #[default]
    Text,
    /// Line-oriented text split into key and value at the first tab
    KeyValueText,
}

impl InputFormat {
    pub fn class_name(&self) -> &'static str {
        match self {
            InputFormat::Text => "TextInputFormat",
            InputFormat::KeyValueText => "KeyValueTextInputFormat",
        }
    }
}

impl FromStr for InputFormat {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TextInputFormat" => Ok(InputFormat::Text),
            "KeyValueTextInputFormat" => Ok(InputFormat::KeyValueText),
            other => Err(BuildError::UnsupportedInputFormat(other.to_string())),
        }
    }
}

/// How a stage writes its output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    #[default]
    Text,
    /// Text output that only creates files for outputs actually written to,
    /// used together with named outputs
    LazyText,
}

/// An extra output channel a reduce phase may write to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedOutput {
    pub name: String,
    pub format: OutputFormat,
    pub key: TypeTag,
    pub value: TypeTag,
}

/// Options supplied when a phase is attached
///
/// `-M` and `-I` are interpreted by the builder; every other key is copied
/// into the stage configuration verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageOptions(BTreeMap<String, String>);

impl StageOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Shorthand for the `-M` option
    pub fn multiple_outputs(self, enabled: bool) -> Self {
        self.set(MULTIPLE_OUTPUTS, enabled.to_string())
    }

    /// Shorthand for the `-I` option
    pub fn input_format(self, format: InputFormat) -> Self {
        self.set(INPUT_FORMAT, format.class_name())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Apply the options to a stage whose `kind` phase was just attached
    pub fn apply_to(&self, stage: &mut Stage, kind: PhaseKind) -> Result<(), BuildError> {
        for (key, value) in self.iter() {
            match key {
                MULTIPLE_OUTPUTS => {
                    if !parse_flag(value) {
                        continue;
                    }
                    if kind != PhaseKind::Reduce {
                        warn!("Option {} ignored on map phase of stage {}", key, stage.ordinal);
                        continue;
                    }
                    debug!("Enabling named output '{}' on stage {}", DEFAULT_NAMED_OUTPUT, stage.ordinal);
                    stage.output_format = OutputFormat::LazyText;
                    stage.named_outputs.push(NamedOutput {
                        name: DEFAULT_NAMED_OUTPUT.to_string(),
                        format: OutputFormat::Text,
                        key: stage.output_key.clone(),
                        value: stage.output_value.clone(),
                    });
                }
                INPUT_FORMAT => {
                    if kind != PhaseKind::Map {
                        warn!("Option {} ignored on reduce phase of stage {}", key, stage.ordinal);
                        continue;
                    }
                    stage.input_format = value.parse()?;
                    debug!("Stage {} reads {}", stage.ordinal, stage.input_format.class_name());
                }
                _ => stage.configuration.set(key, value),
            }
        }
        Ok(())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for StageOptions {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl From<HashMap<String, String>> for StageOptions {
    fn from(map: HashMap<String, String>) -> Self {
        map.into_iter().collect()
    }
}

/// Boolean option values: `true` in any case, everything else is false
fn parse_flag(value: &str) -> bool {
    value.eq_ignore_ascii_case("true")
}
