use async_trait::async_trait;

use crate::{config::BuiltinConfig, error::ShellError, state::Session};

use super::BuiltinCommand;

#[derive(Default)]
pub struct Clear;

#[async_trait]
impl BuiltinCommand for Clear {
    fn name(&self) -> &'static str {
        "clear"
    }

    async fn execute(
        &self,
        _session: &mut Session,
        _config: &BuiltinConfig,
        _args: &[String],
    ) -> Result<String, ShellError> {
        Ok(String::new())
    }
}
