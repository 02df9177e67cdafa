use std::{os::unix::process::ExitStatusExt, process::ExitStatus};

/// How an external stage finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageStatus {
    code: Option<i32>,
    signal: Option<i32>,
}

impl From<ExitStatus> for StageStatus {
    fn from(value: ExitStatus) -> Self {
        Self {
            code: value.code(),
            signal: value.signal(),
        }
    }
}

impl StageStatus {
    pub fn from_code(code: i32) -> Self {
        Self {
            code: Some(code),
            signal: None,
        }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    pub fn failure(&self) -> bool {
        !self.success()
    }

    pub fn code(&self) -> Option<i32> {
        self.code
    }

    pub fn signal(&self) -> Option<i32> {
        self.signal
    }
}
