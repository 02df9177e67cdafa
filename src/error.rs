use std::{io, path::PathBuf, time::Duration};

use thiserror::Error;

use crate::{parse::ParseError, process::status::StageStatus};

#[derive(Debug, Error)]
pub enum ShellError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("{command}: command not found")]
    NotFound { command: String },
    #[error("Command timed out after {}s", .limit.as_secs())]
    Timeout { limit: Duration },
    #[error("{command}: {}: {failure}", .path.display())]
    Io {
        command: String,
        path: PathBuf,
        #[source]
        failure: FsFailure,
    },
    #[error("{}", process_message(.command, .status, .stderr))]
    Process {
        command: String,
        status: StageStatus,
        stderr: String,
    },
}

impl ShellError {
    pub fn io(command: impl Into<String>, path: impl Into<PathBuf>, err: io::Error) -> Self {
        Self::Io {
            command: command.into(),
            path: path.into(),
            failure: err.into(),
        }
    }

    pub fn fs(command: impl Into<String>, path: impl Into<PathBuf>, failure: FsFailure) -> Self {
        Self::Io {
            command: command.into(),
            path: path.into(),
            failure,
        }
    }
}

fn process_message(command: &str, status: &StageStatus, stderr: &str) -> String {
    let stderr = stderr.trim_end();
    if !stderr.is_empty() {
        return stderr.to_owned();
    }

    match (status.code(), status.signal()) {
        (_, Some(signal)) => format!("{command}: terminated by signal {signal}"),
        (Some(code), None) => format!("{command}: exited with status {code}"),
        (None, None) => format!("{command}: exited abnormally"),
    }
}

/// Filesystem failures, rendered the way coreutils words them.
#[derive(Debug, Error)]
pub enum FsFailure {
    #[error("No such file or directory")]
    NotFound,
    #[error("Permission denied")]
    PermissionDenied,
    #[error("Not a directory")]
    NotADirectory,
    #[error("File exists")]
    AlreadyExists,
    #[error("Is a directory (use -r to remove directories)")]
    DirectoryWithoutRecursive,
    #[error("{0}")]
    Os(io::Error),
}

impl From<io::Error> for FsFailure {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Self::NotFound,
            io::ErrorKind::PermissionDenied => Self::PermissionDenied,
            io::ErrorKind::AlreadyExists => Self::AlreadyExists,
            // ENOTDIR has no stable ErrorKind
            _ if err.raw_os_error() == Some(nix::libc::ENOTDIR) => Self::NotADirectory,
            _ => Self::Os(err),
        }
    }
}
