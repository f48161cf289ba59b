//! Execution engine contract
//!
//! The engine that actually runs a stage lives outside this crate. It is
//! reached through two calls: submit a wired stage, then wait for it to
//! reach a terminal state.

use crate::core::StageSpec;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error types for engine operations
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Failed to launch stage: {0}")]
    Launch(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Timeout after {0} seconds")]
    Timeout(u64),

    #[error("Unknown job handle: {0}")]
    UnknownHandle(JobHandle),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Identifies a submitted stage within an engine
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobHandle(String);

impl JobHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn id(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Trait for stage execution - allows for different engines
#[async_trait]
pub trait ExecutionEngine: Send + Sync {
    /// Schedule a wired stage for execution
    async fn submit(&self, spec: &StageSpec) -> Result<JobHandle, EngineError>;

    /// Wait until the stage finishes; `true` means it succeeded
    async fn await_completion(&self, handle: &JobHandle) -> Result<bool, EngineError>;
}
