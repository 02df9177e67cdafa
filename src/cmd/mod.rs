use std::sync::Arc;

use serde::{Serialize, Serializer};

use crate::{
    builtins::BuiltinCommands,
    config::Config,
    error::ShellError,
    history::{History, HistoryEntry},
    process::{ExternalExec, HostExec},
    state::Session,
};

pub mod execute;
pub mod execution_plan;

/// The uniform envelope every command produces.
#[derive(Debug, Serialize)]
pub struct ExecutionResult {
    pub output: String,
    #[serde(serialize_with = "render_error")]
    pub error: Option<ShellError>,
}

impl ExecutionResult {
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            error: None,
        }
    }

    pub fn failure(error: impl Into<ShellError>) -> Self {
        Self {
            output: String::new(),
            error: Some(error.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(ToString::to_string)
    }
}

impl From<Result<String, ShellError>> for ExecutionResult {
    fn from(value: Result<String, ShellError>) -> Self {
        match value {
            Ok(output) => Self::success(output),
            Err(err) => Self::failure(err),
        }
    }
}

// errors are rendered to text only when they leave the interpreter
fn render_error<S: Serializer>(error: &Option<ShellError>, serializer: S) -> Result<S::Ok, S::Error> {
    match error {
        Some(err) => serializer.serialize_some(&err.to_string()),
        None => serializer.serialize_none(),
    }
}

/// Entry point for the four boundary operations: execute, history,
/// clear-history and suggest.
pub struct Interpreter {
    config: Config,
    external: Arc<dyn ExternalExec>,
    history: History,
}

impl Interpreter {
    pub fn new(config: Config) -> Self {
        let external = Arc::new(HostExec::new(config.exec.timeout()));
        Self::with_external(config, external)
    }

    pub fn with_external(config: Config, external: Arc<dyn ExternalExec>) -> Self {
        Self {
            config,
            external,
            history: History::new(),
        }
    }

    /// Runs one command line. The line is recorded in history whatever the
    /// outcome, and every failure comes back inside the result.
    pub async fn execute(&self, session: &mut Session, line: &str) -> ExecutionResult {
        self.history.push(line);

        let result = self.run_line(session, line).await;

        if let Some(err) = &result.error {
            debug!(%line, %err, "command failed");
        }

        result
    }

    pub fn history(&self) -> Vec<HistoryEntry> {
        self.history.entries()
    }

    pub fn clear_history(&self) {
        self.history.clear();
    }

    /// Builtin names starting with `partial`, ignoring case, in registry order.
    pub fn suggest(&self, partial: &str) -> Vec<&'static str> {
        let partial = partial.to_lowercase();

        BuiltinCommands::names()
            .iter()
            .copied()
            .filter(|name| name.to_lowercase().starts_with(&partial))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::ParseError;

    #[test]
    fn serializes_error_as_text() {
        let result = ExecutionResult::failure(ParseError::Empty);

        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            serde_json::json!({ "output": "", "error": "empty command" })
        );
    }

    #[test]
    fn serializes_success_with_null_error() {
        let result = ExecutionResult::success("hi");

        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            serde_json::json!({ "output": "hi", "error": null })
        );
    }

    #[test]
    fn suggest_matches_prefix_case_insensitively() {
        let interpreter = Interpreter::new(Config::default());

        assert_eq!(interpreter.suggest("p"), vec!["pwd", "processes"]);
        assert_eq!(interpreter.suggest("P"), vec!["pwd", "processes"]);
        assert_eq!(interpreter.suggest("c"), vec!["clear", "cd", "cpu", "cat"]);
        assert!(interpreter.suggest("zz").is_empty());
        assert_eq!(interpreter.suggest("").len(), BuiltinCommands::names().len());
    }
}
