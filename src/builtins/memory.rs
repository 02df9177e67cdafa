use std::io;

use async_trait::async_trait;

use crate::{
    config::BuiltinConfig,
    error::{FsFailure, ShellError},
    state::Session,
};

use super::BuiltinCommand;

const PROC_MEMINFO: &str = "/proc/meminfo";

#[derive(Default)]
pub struct Memory;

#[async_trait]
impl BuiltinCommand for Memory {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn execute(
        &self,
        _session: &mut Session,
        _config: &BuiltinConfig,
        _args: &[String],
    ) -> Result<String, ShellError> {
        let meminfo = tokio::fs::read_to_string(PROC_MEMINFO)
            .await
            .map_err(|err| ShellError::io("memory", PROC_MEMINFO, err))?;

        let usage = MemoryUsage::parse(&meminfo).ok_or_else(|| {
            ShellError::fs(
                "memory",
                PROC_MEMINFO,
                FsFailure::Os(io::Error::new(
                    io::ErrorKind::InvalidData,
                    "missing MemTotal or MemAvailable",
                )),
            )
        })?;

        Ok(usage.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryUsage {
    pub total_kb: u64,
    pub available_kb: u64,
}

impl MemoryUsage {
    pub fn parse(meminfo: &str) -> Option<Self> {
        let field = |name: &str| {
            meminfo
                .lines()
                .find_map(|line| line.strip_prefix(name)?.strip_prefix(':'))
                .and_then(|rest| rest.split_whitespace().next()?.parse::<u64>().ok())
        };

        Some(Self {
            total_kb: field("MemTotal")?,
            available_kb: field("MemAvailable")?,
        })
    }

    pub fn used_percent(&self) -> f64 {
        if self.total_kb == 0 {
            return 0.0;
        }
        let used = self.total_kb.saturating_sub(self.available_kb);
        used as f64 * 100.0 / self.total_kb as f64
    }
}

impl std::fmt::Display for MemoryUsage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Memory Usage: {:.1}%\nAvailable: {} MB\nTotal: {} MB",
            self.used_percent(),
            self.available_kb / 1024,
            self.total_kb / 1024
        )
    }
}
