use std::{io, path::Path, process::Stdio};

use nix::{
    sys::signal::{killpg, Signal},
    unistd::Pid,
};
use tokio::{
    io::{AsyncRead, AsyncReadExt, AsyncWriteExt},
    process::{Child, Command},
};

use crate::{cmd::execution_plan::Stage, error::ShellError};

use super::{status::StageStatus, Captured};

/// A spawned stage, leader of its own process group.
pub struct StageChild {
    program: String,
    child: Child,
    group: Option<Pid>,
}

impl StageChild {
    pub fn spawn(stage: &Stage, cwd: &Path, piped_input: bool) -> Result<Self, ShellError> {
        let mut cmd = Command::new(&stage.program);
        cmd.args(&stage.args)
            .current_dir(cwd)
            .stdin(if piped_input {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .process_group(0)
            .kill_on_drop(true);

        trace!("spawning command: {:?}", cmd);

        let child = cmd.spawn().map_err(|err| match err.kind() {
            // a vanished working directory fails the same way as a missing program
            io::ErrorKind::NotFound if !cwd.is_dir() => ShellError::io(&stage.program, cwd, err),
            io::ErrorKind::NotFound => ShellError::NotFound {
                command: stage.program.clone(),
            },
            _ => ShellError::io(&stage.program, &stage.program, err),
        })?;

        // with process_group(0) the group id is the leader's pid
        let group = child.id().map(|id| Pid::from_raw(id as i32));

        Ok(Self {
            program: stage.program.clone(),
            child,
            group,
        })
    }

    /// Feeds `input` to stdin, drains stdout and stderr, and waits for exit.
    pub async fn collect(&mut self, input: Option<Vec<u8>>) -> io::Result<Captured> {
        let stdin = self.child.stdin.take();
        let stdout = self.child.stdout.take();
        let stderr = self.child.stderr.take();

        let program = &self.program;
        let feed = async move {
            if let (Some(mut stdin), Some(input)) = (stdin, input) {
                // the reader may exit without consuming everything
                if let Err(err) = stdin.write_all(&input).await {
                    trace!(%program, %err, "stdin closed early");
                }
            }
            Ok::<_, io::Error>(())
        };

        let ((), stdout, stderr) = tokio::try_join!(feed, drain(stdout), drain(stderr))?;

        let status = self.child.wait().await?;

        Ok(Captured {
            stdout,
            stderr,
            status: StageStatus::from(status),
        })
    }

    /// SIGKILLs the whole group and reaps the leader.
    pub async fn kill_group(&mut self) {
        if let Some(group) = self.group {
            match killpg(group, Signal::SIGKILL) {
                Ok(()) => trace!(%group, "killed process group"),
                Err(err) => warn!(%group, %err, "failed to kill process group"),
            }
        }

        if let Err(err) = self.child.wait().await {
            error!("failed to reap {}: {}", self.program, err);
        }
    }
}

async fn drain<R: AsyncRead + Unpin>(reader: Option<R>) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    if let Some(mut reader) = reader {
        reader.read_to_end(&mut buf).await?;
    }
    Ok(buf)
}
