//! mrchain - assemble and run linear chains of map/reduce stages

pub mod cli;
pub mod core;
pub mod execution;

// Re-export commonly used types
pub use core::{BuildError, ChainBuilder, Mapper, Pipeline, Reducer, Stage, StageOptions, StageSpec};
pub use execution::{EngineConfig, ExecutionEngine, RunError, RunEvent, RunReport, SubprocessEngine};
