//! Pipeline assembly errors

use crate::core::phase::PhaseKind;
use thiserror::Error;

/// Error raised while assembling a pipeline
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// A phase left one of its key/value type parameters unbound
    #[error("Cannot infer type parameter {parameter} of {kind} phase '{class_name}'")]
    TypeInference {
        class_name: String,
        kind: PhaseKind,
        parameter: &'static str,
    },

    #[error("Pipeline has no stages")]
    EmptyPipeline,

    /// The `-I` option named an input format the builder does not know
    #[error("Unsupported input format '{0}'")]
    UnsupportedInputFormat(String),
}
