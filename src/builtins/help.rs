use async_trait::async_trait;
use itertools::Itertools;

use crate::{config::BuiltinConfig, error::ShellError, state::Session};

use super::{BuiltinCommand, BuiltinCommands};

#[derive(Default)]
pub struct Help;

#[async_trait]
impl BuiltinCommand for Help {
    fn name(&self) -> &'static str {
        "help"
    }

    async fn execute(
        &self,
        _session: &mut Session,
        _config: &BuiltinConfig,
        _args: &[String],
    ) -> Result<String, ShellError> {
        Ok(format!(
            "Available commands:\n{}",
            BuiltinCommands::names().iter().join("\n")
        ))
    }
}
