use async_trait::async_trait;

use crate::{config::BuiltinConfig, error::ShellError, state::Session};

use super::BuiltinCommand;

#[derive(Default)]
pub struct Pwd;

#[async_trait]
impl BuiltinCommand for Pwd {
    fn name(&self) -> &'static str {
        "pwd"
    }

    async fn execute(
        &self,
        session: &mut Session,
        _config: &BuiltinConfig,
        _args: &[String],
    ) -> Result<String, ShellError> {
        Ok(session.working_dir().to_string_lossy().into_owned())
    }
}
