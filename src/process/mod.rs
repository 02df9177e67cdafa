use std::{path::Path, time::Duration};

use async_trait::async_trait;
use tokio::time::Instant;

use crate::{cmd::execution_plan::Stage, error::ShellError, parse::ParseError};

use self::{child::StageChild, status::StageStatus};

pub mod child;
pub mod status;

/// Output of the last stage of an external invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Captured {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub status: StageStatus,
}

impl Captured {
    pub fn stdout_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}

/// The capability of running commands outside the interpreter.
///
/// Every external invocation the dispatcher makes goes through this trait, so
/// an allow-list or sandbox can wrap it without touching dispatch.
#[async_trait]
pub trait ExternalExec: Send + Sync {
    /// Runs `stages` in `cwd`, each stage's stdout feeding the next one's stdin.
    async fn run(&self, stages: &[Stage], cwd: &Path) -> Result<Captured, ShellError>;
}

/// Spawns real host processes.
#[derive(Debug, Clone)]
pub struct HostExec {
    timeout: Duration,
}

impl HostExec {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl ExternalExec for HostExec {
    async fn run(&self, stages: &[Stage], cwd: &Path) -> Result<Captured, ShellError> {
        let deadline = Instant::now() + self.timeout;
        let last = stages.len().saturating_sub(1);

        let mut input = None::<Vec<u8>>;
        let mut captured = None;

        for (idx, stage) in stages.iter().enumerate() {
            trace!(stage = idx, %stage, "running pipe stage");

            let mut child = StageChild::spawn(stage, cwd, input.is_some())?;
            let res = tokio::time::timeout_at(deadline, child.collect(input.take())).await;

            let output = match res {
                Ok(output) => output.map_err(|err| ShellError::io(&stage.program, cwd, err))?,
                Err(_) => {
                    debug!(%stage, timeout = ?self.timeout, "command timed out");
                    child.kill_group().await;
                    return Err(ShellError::Timeout {
                        limit: self.timeout,
                    });
                }
            };

            trace!(stage = idx, status = ?output.status, "pipe stage finished");

            if idx < last {
                if output.status.failure() && !output.stderr.is_empty() {
                    debug!(%stage, "aborting pipe on failed stage");
                    return Err(ShellError::Process {
                        command: stage.program.clone(),
                        status: output.status,
                        stderr: output.stderr_lossy(),
                    });
                }

                input = Some(output.stdout);
            } else {
                captured = Some(output);
            }
        }

        captured.ok_or_else(|| ParseError::Empty.into())
    }
}
