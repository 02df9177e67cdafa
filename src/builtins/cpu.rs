use std::io;

use async_trait::async_trait;

use crate::{
    config::BuiltinConfig,
    error::{FsFailure, ShellError},
    state::Session,
};

use super::BuiltinCommand;

const PROC_STAT: &str = "/proc/stat";

#[derive(Default)]
pub struct Cpu;

#[async_trait]
impl BuiltinCommand for Cpu {
    fn name(&self) -> &'static str {
        "cpu"
    }

    /// Samples `/proc/stat` twice, `cpu_sample_ms` apart.
    async fn execute(
        &self,
        _session: &mut Session,
        config: &BuiltinConfig,
        _args: &[String],
    ) -> Result<String, ShellError> {
        let before = sample().await?;
        tokio::time::sleep(config.cpu_sample()).await;
        let after = sample().await?;

        Ok(format!("CPU Usage: {:.1}%", after.usage_since(&before)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuTimes {
    pub busy: u64,
    pub idle: u64,
}

impl CpuTimes {
    /// Parses the aggregate `cpu` line of `/proc/stat`.
    pub fn parse(stat: &str) -> Option<Self> {
        let line = stat.lines().find(|line| line.starts_with("cpu "))?;
        let fields = line
            .split_whitespace()
            .skip(1)
            .map(str::parse::<u64>)
            .collect::<Result<Vec<_>, _>>()
            .ok()?;

        if fields.len() < 4 {
            return None;
        }

        // user nice system idle iowait irq softirq steal; guest time is already in user
        let idle = fields[3] + fields.get(4).copied().unwrap_or(0);
        let total: u64 = fields.iter().take(8).sum();

        Some(Self {
            busy: total - idle,
            idle,
        })
    }

    pub fn usage_since(&self, earlier: &Self) -> f64 {
        let busy = self.busy.saturating_sub(earlier.busy);
        let idle = self.idle.saturating_sub(earlier.idle);
        let total = busy + idle;

        if total == 0 {
            0.0
        } else {
            busy as f64 * 100.0 / total as f64
        }
    }
}

async fn sample() -> Result<CpuTimes, ShellError> {
    let stat = tokio::fs::read_to_string(PROC_STAT)
        .await
        .map_err(|err| ShellError::io("cpu", PROC_STAT, err))?;

    CpuTimes::parse(&stat).ok_or_else(|| {
        ShellError::fs(
            "cpu",
            PROC_STAT,
            FsFailure::Os(io::Error::new(
                io::ErrorKind::InvalidData,
                "unrecognised cpu line",
            )),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const STAT: &str = "cpu  100 0 50 800 50 0 0 0 0 0\ncpu0 50 0 25 400 25 0 0 0 0 0\nintr 1 2 3\n";

    #[test]
    fn parses_aggregate_line() {
        assert_eq!(
            CpuTimes::parse(STAT),
            Some(CpuTimes {
                busy: 150,
                idle: 850
            })
        );
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(CpuTimes::parse("intr 1 2 3"), None);
        assert_eq!(CpuTimes::parse("cpu  1 x 3 4"), None);
    }

    #[test]
    fn usage_is_busy_share_of_delta() {
        let before = CpuTimes { busy: 100, idle: 900 };
        let after = CpuTimes { busy: 130, idle: 970 };

        assert_eq!(after.usage_since(&before), 30.0);
    }

    #[test]
    fn no_ticks_means_idle() {
        let times = CpuTimes { busy: 5, idle: 5 };
        assert_eq!(times.usage_since(&times), 0.0);
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn reports_a_percentage() {
        let config = BuiltinConfig {
            cpu_sample_ms: 50,
            ..BuiltinConfig::default()
        };
        let out = Cpu
            .execute(&mut Session::new("/"), &config, &[])
            .await
            .unwrap();

        assert!(out.starts_with("CPU Usage: "));
        assert!(out.ends_with('%'));
    }
}
