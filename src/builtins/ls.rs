use std::{fs::Metadata, os::unix::fs::PermissionsExt};

use async_trait::async_trait;
use chrono::{DateTime, Local};
use itertools::Itertools;

use crate::{config::BuiltinConfig, error::ShellError, state::Session};

use super::{Args, BuiltinCommand};

#[derive(Default)]
pub struct Ls;

struct Entry {
    name: String,
    meta: Metadata,
}

#[async_trait]
impl BuiltinCommand for Ls {
    fn name(&self) -> &'static str {
        "ls"
    }

    async fn execute(
        &self,
        session: &mut Session,
        _config: &BuiltinConfig,
        args: &[String],
    ) -> Result<String, ShellError> {
        let args = Args::parse(args);
        let long = args.has('l');
        let all = args.has('a');

        let operands = if args.operands.is_empty() {
            vec!["."]
        } else {
            args.operands.clone()
        };
        let headed = operands.len() > 1;

        let mut sections = Vec::with_capacity(operands.len());

        for path in operands {
            let entries = list(session, path, all).await?;
            let body = entries
                .iter()
                .map(|entry| {
                    if long {
                        long_line(entry)
                    } else {
                        entry.name.clone()
                    }
                })
                .join("\n");

            sections.push(if headed {
                format!("{path}:\n{body}")
            } else {
                body
            });
        }

        Ok(sections.join("\n\n"))
    }
}

async fn list(session: &Session, path: &str, all: bool) -> Result<Vec<Entry>, ShellError> {
    let full_path = session.resolve(path);

    let meta = tokio::fs::metadata(&full_path)
        .await
        .map_err(|err| ShellError::io("ls", path, err))?;

    if !meta.is_dir() {
        return Ok(vec![Entry {
            name: path.to_owned(),
            meta,
        }]);
    }

    let mut dir = tokio::fs::read_dir(&full_path)
        .await
        .map_err(|err| ShellError::io("ls", path, err))?;

    let mut entries = Vec::new();
    while let Some(entry) = dir
        .next_entry()
        .await
        .map_err(|err| ShellError::io("ls", path, err))?
    {
        let name = entry.file_name().to_string_lossy().into_owned();
        if !all && name.starts_with('.') {
            continue;
        }

        // entries can vanish between listing and stat
        match entry.metadata().await {
            Ok(meta) => entries.push(Entry { name, meta }),
            Err(err) => trace!(%name, %err, "skipping entry"),
        }
    }

    entries.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(entries)
}

fn long_line(entry: &Entry) -> String {
    let modified = entry
        .meta
        .modified()
        .map(|time| DateTime::<Local>::from(time).format("%b %e %H:%M").to_string())
        .unwrap_or_else(|_| "?".repeat(12));

    format!(
        "{} {:>10} {} {}",
        mode_string(&entry.meta),
        entry.meta.len(),
        modified,
        entry.name
    )
}

fn mode_string(meta: &Metadata) -> String {
    let kind = if meta.is_dir() {
        'd'
    } else if meta.file_type().is_symlink() {
        'l'
    } else {
        '-'
    };

    let mode = meta.permissions().mode();
    let bits = [
        (0o400, 'r'),
        (0o200, 'w'),
        (0o100, 'x'),
        (0o040, 'r'),
        (0o020, 'w'),
        (0o010, 'x'),
        (0o004, 'r'),
        (0o002, 'w'),
        (0o001, 'x'),
    ];

    std::iter::once(kind)
        .chain(
            bits.iter()
                .map(|&(bit, c)| if mode & bit != 0 { c } else { '-' }),
        )
        .collect()
}
