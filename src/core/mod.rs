//! Core domain models for chains
//!
//! This module defines the key/value type tags, map and reduce phases,
//! stages, the staged builder and the assembled pipeline.

pub mod builder;
pub mod config;
pub mod error;
pub mod options;
pub mod phase;
pub mod pipeline;
pub mod stage;
pub mod types;

pub use builder::*;
pub use error::BuildError;
pub use options::{Configuration, InputFormat, NamedOutput, OutputFormat, StageOptions};
pub use phase::{infer_map_types, infer_reduce_types, MapPhase, Mapper, PhaseKind, ReducePhase, ReduceTypes, Reducer, Signature};
pub use pipeline::*;
pub use stage::*;
pub use types::{TypeTag, Writable};
