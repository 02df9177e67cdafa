use std::io;

use async_trait::async_trait;

use crate::{
    config::BuiltinConfig,
    error::{FsFailure, ShellError},
    state::Session,
};

use super::{Args, BuiltinCommand};

#[derive(Default)]
pub struct Rm;

#[async_trait]
impl BuiltinCommand for Rm {
    fn name(&self) -> &'static str {
        "rm"
    }

    async fn execute(
        &self,
        session: &mut Session,
        _config: &BuiltinConfig,
        args: &[String],
    ) -> Result<String, ShellError> {
        let args = Args::parse(args);
        let recursive = args.has('r') || args.has('R') || args.has_long("recursive");
        let force = args.has('f') || args.has_long("force");

        for path in args.require_operands("rm")? {
            let full_path = session.resolve(path);

            let meta = match tokio::fs::symlink_metadata(&full_path).await {
                Ok(meta) => meta,
                Err(err) if force && err.kind() == io::ErrorKind::NotFound => continue,
                Err(err) => return Err(ShellError::io("rm", path, err)),
            };

            let res = if meta.is_dir() {
                if !recursive {
                    return Err(ShellError::fs(
                        "rm",
                        path,
                        FsFailure::DirectoryWithoutRecursive,
                    ));
                }
                tokio::fs::remove_dir_all(&full_path).await
            } else {
                tokio::fs::remove_file(&full_path).await
            };

            res.map_err(|err| ShellError::io("rm", path, err))?;
            trace!(?full_path, "removed");
        }

        Ok(String::new())
    }
}
