//! Subprocess engine - hands each stage to an external launcher command

use crate::core::StageSpec;
use crate::execution::engine::{EngineError, ExecutionEngine, JobHandle};
use async_trait::async_trait;
use std::collections::HashMap;
use std::process::Stdio;
use std::io;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::{Child, Command};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, warn};
use uuid::Uuid;

/// Environment variable carrying the stage ordinal to the launcher
pub const STAGE_ENV: &str = "MRCHAIN_STAGE";

/// Configuration for the subprocess engine
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Launcher executable, spawned once per stage
    pub command: String,

    /// Arguments passed before anything else
    pub args: Vec<String>,

    /// Per-stage timeout in seconds
    pub timeout_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            command: "hadoop-stage".to_string(),
            args: Vec::new(),
            timeout_secs: 21600,
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = command.into();
        self
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

/// A launched stage: the child, its stdin feeder and its deadline
#[derive(Debug)]
struct RunningStage {
    child: Child,
    feeder: JoinHandle<io::Result<()>>,
    deadline: Instant,
}

/// Engine that runs each stage as a child process
///
/// The launcher receives the wired stage as JSON on stdin and the stage
/// ordinal in [`STAGE_ENV`]. Exit status 0 means the stage succeeded.
/// The timeout runs from spawn and covers feeding stdin as well as waiting.
#[derive(Debug)]
pub struct SubprocessEngine {
    config: EngineConfig,
    running: Mutex<HashMap<JobHandle, RunningStage>>,
}

impl SubprocessEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            running: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

#[async_trait]
impl ExecutionEngine for SubprocessEngine {
    async fn submit(&self, spec: &StageSpec) -> Result<JobHandle, EngineError> {
        let payload = serde_json::to_vec(spec)
            .map_err(|e| EngineError::Internal(format!("Failed to encode stage: {}", e)))?;

        debug!(
            "Spawning {} for stage {} ({} bytes of spec)",
            self.config.command,
            spec.stage.ordinal,
            payload.len()
        );

        let mut child = Command::new(&self.config.command)
            .args(&self.config.args)
            .env(STAGE_ENV, spec.stage.ordinal.to_string())
            .stdin(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| EngineError::Launch(format!("{}: {}", self.config.command, e)))?;
        let deadline = Instant::now() + Duration::from_secs(self.config.timeout_secs);

        // Stdin is fed in the background; the deadline covers it.
        let stdin = child.stdin.take();
        let ordinal = spec.stage.ordinal;
        let feeder = tokio::spawn(async move {
            let Some(mut stdin) = stdin else {
                return Ok(());
            };
            match stdin.write_all(&payload).await {
                Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                    debug!("Launcher for stage {} closed stdin early", ordinal);
                    Ok(())
                }
                other => other,
            }
        });

        let handle = JobHandle::new(Uuid::new_v4().to_string());
        self.running.lock().await.insert(
            handle.clone(),
            RunningStage {
                child,
                feeder,
                deadline,
            },
        );
        Ok(handle)
    }

    async fn await_completion(&self, handle: &JobHandle) -> Result<bool, EngineError> {
        let RunningStage {
            mut child,
            mut feeder,
            deadline,
        } = self
            .running
            .lock()
            .await
            .remove(handle)
            .ok_or_else(|| EngineError::UnknownHandle(handle.clone()))?;

        let waited = timeout_at(deadline, child.wait()).await;
        let status = match waited {
            Ok(status) => status?,
            Err(_) => {
                warn!("Stage {} timed out after {}s", handle, self.config.timeout_secs);
                feeder.abort();
                child.kill().await?;
                return Err(EngineError::Timeout(self.config.timeout_secs));
            }
        };

        match timeout_at(deadline, &mut feeder).await {
            Ok(fed) => fed
                .map_err(|e| EngineError::Internal(format!("Stdin feeder for {} failed: {}", handle, e)))??,
            Err(_) => {
                debug!("Launcher for {} exited with stdin still open", handle);
                feeder.abort();
            }
        }

        if !status.success() {
            warn!(
                "{} exited with code {} for job {}",
                self.config.command,
                status.code().unwrap_or(-1),
                handle
            );
        }
        Ok(status.success())
    }
}
