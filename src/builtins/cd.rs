use async_trait::async_trait;

use crate::{
    config::BuiltinConfig,
    error::{FsFailure, ShellError},
    parse::ParseError,
    state::Session,
};

use super::BuiltinCommand;

#[derive(Default)]
pub struct Cd;

#[async_trait]
impl BuiltinCommand for Cd {
    fn name(&self) -> &'static str {
        "cd"
    }

    async fn execute(
        &self,
        session: &mut Session,
        _config: &BuiltinConfig,
        args: &[String],
    ) -> Result<String, ShellError> {
        trace!("executing cd builtin: {args:?}");

        let path = args
            .first()
            .ok_or(ParseError::MissingOperand { command: "cd" })?;

        let full_path = tokio::fs::canonicalize(session.resolve(path))
            .await
            .map_err(|err| ShellError::io("cd", path, err))?;

        let meta = tokio::fs::metadata(&full_path)
            .await
            .map_err(|err| ShellError::io("cd", path, err))?;
        if !meta.is_dir() {
            return Err(ShellError::fs("cd", path, FsFailure::NotADirectory));
        }

        session.set_working_dir(full_path);

        Ok(String::new())
    }
}
