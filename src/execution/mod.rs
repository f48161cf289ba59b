//! Pipeline execution

pub mod engine;
pub mod runner;
pub mod subprocess;

pub use engine::{EngineError, ExecutionEngine, JobHandle};
pub use runner::{EventHandler, PipelineRunner, RunError, RunEvent, RunReport, RunStatus, StageOutcome};
pub use subprocess::{EngineConfig, SubprocessEngine};
