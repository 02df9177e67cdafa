use std::{collections::HashMap, os::unix::fs::MetadataExt, path::Path};

use async_trait::async_trait;
use itertools::Itertools;
use nix::unistd::{Uid, User};

use crate::{config::BuiltinConfig, error::ShellError, state::Session};

use super::BuiltinCommand;

const PROC: &str = "/proc";

#[derive(Default)]
pub struct Processes;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessInfo {
    pub pid: u32,
    pub name: String,
    pub owner: String,
}

#[async_trait]
impl BuiltinCommand for Processes {
    fn name(&self) -> &'static str {
        "processes"
    }

    async fn execute(
        &self,
        _session: &mut Session,
        config: &BuiltinConfig,
        _args: &[String],
    ) -> Result<String, ShellError> {
        let processes = scan(Path::new(PROC)).await;

        Ok(render(&processes, config.process_limit))
    }
}

/// Reads every `<pid>/comm` under `root`. Processes that exit mid-scan or
/// deny access are skipped.
pub async fn scan(root: &Path) -> Vec<ProcessInfo> {
    let mut dir = match tokio::fs::read_dir(root).await {
        Ok(dir) => dir,
        Err(err) => {
            warn!(?root, %err, "cannot list processes");
            return Vec::new();
        }
    };

    let mut owners = HashMap::<u32, String>::new();
    let mut processes = Vec::new();

    loop {
        let entry = match dir.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(err) => {
                warn!(%err, "process scan interrupted");
                break;
            }
        };

        let Some(pid) = entry.file_name().to_str().and_then(|s| s.parse::<u32>().ok()) else {
            continue;
        };

        let (comm, meta) = match tokio::try_join!(
            tokio::fs::read_to_string(entry.path().join("comm")),
            tokio::fs::metadata(entry.path()),
        ) {
            Ok(found) => found,
            Err(err) => {
                trace!(pid, %err, "skipping process");
                continue;
            }
        };

        let uid = meta.uid();
        let owner = match owners.get(&uid) {
            Some(owner) => owner.clone(),
            None => {
                let owner = owner_name(uid).await;
                owners.insert(uid, owner.clone());
                owner
            }
        };

        processes.push(ProcessInfo {
            pid,
            name: comm.trim_end().to_owned(),
            owner,
        });
    }

    processes.sort_by_key(|process| process.pid);
    processes
}

/// Resolves `uid` through the passwd database, falling back to the number.
async fn owner_name(uid: u32) -> String {
    let lookup = tokio::task::spawn_blocking(move || User::from_uid(Uid::from_raw(uid)));

    match lookup.await {
        Ok(Ok(Some(user))) => user.name,
        _ => uid.to_string(),
    }
}

pub fn render(processes: &[ProcessInfo], limit: usize) -> String {
    if processes.is_empty() {
        return "No processes found".into();
    }

    let rows = processes
        .iter()
        .take(limit)
        .map(|p| format!("{:>6} {:<20} {}", p.pid, p.name, p.owner))
        .join("\n");

    let mut out = format!("PID      NAME                 USER\n{rows}");
    if processes.len() > limit {
        out.push_str(&format!("\n... and {} more", processes.len() - limit));
    }
    out
}
