use super::{
    execution_plan::{ExecutionPlan, Stage},
    ExecutionResult, Interpreter,
};
use crate::{
    builtins::{BuiltinCommand, BuiltinCommands},
    error::ShellError,
    parse::parse_command,
    process::Captured,
    state::Session,
};

impl Interpreter {
    pub(super) async fn run_line(&self, session: &mut Session, line: &str) -> ExecutionResult {
        let plan = match parse_command(line) {
            Ok(plan) => plan,
            Err(err) => return ExecutionResult::failure(err),
        };

        trace!(?plan, shape = ?plan.shape(), "execution plan");

        self.run_plan(session, &plan).await
    }

    pub async fn run_plan(&self, session: &mut Session, plan: &ExecutionPlan) -> ExecutionResult {
        match plan {
            ExecutionPlan::Execute(stage) => {
                if let Some(builtin) = BuiltinCommands::from_name(&stage.program) {
                    trace!(program = %stage.program, "dispatching to builtin");
                    return builtin
                        .execute(session, &self.config.builtins, &stage.args)
                        .await
                        .into();
                }

                self.run_external(session, std::slice::from_ref(stage)).await
            }
            ExecutionPlan::Pipe(stages) => self.run_external(session, stages).await,
            ExecutionPlan::Redirect { source, target } => {
                self.run_redirect(session, source.stages(), target).await
            }
        }
    }

    async fn run_external(&self, session: &Session, stages: &[Stage]) -> ExecutionResult {
        match self.external.run(stages, session.working_dir()).await {
            Ok(captured) => finish(stages, captured),
            Err(err) => ExecutionResult::failure(err),
        }
    }

    /// Runs `stages` and writes their stdout to `target` instead of returning it.
    async fn run_redirect(&self, session: &Session, stages: &[Stage], target: &str) -> ExecutionResult {
        let captured = match self.external.run(stages, session.working_dir()).await {
            Ok(captured) => captured,
            Err(err) => return ExecutionResult::failure(err),
        };

        let path = session.resolve(target);
        if let Err(err) = tokio::fs::write(&path, &captured.stdout).await {
            return ExecutionResult::failure(ShellError::io("redirect", target, err));
        }

        trace!(?path, bytes = captured.stdout.len(), "redirected output");

        match finish(stages, captured) {
            ExecutionResult { error: Some(err), .. } => ExecutionResult::failure(err),
            _ => ExecutionResult::success(format!("Output redirected to '{target}'.")),
        }
    }
}

/// A zero exit returns stdout followed by any diagnostics; anything else is a
/// process error carrying the last stage's stderr.
fn finish(stages: &[Stage], captured: Captured) -> ExecutionResult {
    if captured.status.success() {
        let mut output = captured.stdout_lossy();
        output.push_str(&captured.stderr_lossy());
        return ExecutionResult::success(output);
    }

    let command = stages
        .last()
        .map(|stage| stage.program.clone())
        .unwrap_or_default();

    ExecutionResult {
        output: captured.stdout_lossy(),
        error: Some(ShellError::Process {
            command,
            status: captured.status,
            stderr: captured.stderr_lossy(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::{
        path::Path,
        sync::{Arc, Mutex},
    };

    use async_trait::async_trait;

    use super::*;
    use crate::{
        config::Config,
        process::{status::StageStatus, ExternalExec},
    };

    /// Records every invocation and answers with a canned result.
    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<Vec<Stage>>>,
        exit_code: i32,
    }

    #[async_trait]
    impl ExternalExec for Recorder {
        async fn run(&self, stages: &[Stage], _cwd: &Path) -> Result<Captured, ShellError> {
            self.calls.lock().unwrap().push(stages.to_vec());
            Ok(Captured {
                stdout: b"recorded\n".to_vec(),
                stderr: Vec::new(),
                status: StageStatus::from_code(self.exit_code),
            })
        }
    }

    fn interpreter(recorder: Arc<Recorder>) -> Interpreter {
        Interpreter::with_external(Config::default(), recorder)
    }

    #[tokio::test]
    async fn builtins_never_reach_the_executor() {
        let recorder = Arc::new(Recorder::default());
        let mut config = Config::default();
        config.builtins.cpu_sample_ms = 10;
        let interpreter = Interpreter::with_external(config, recorder.clone());
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), "hi\n").unwrap();
        let mut session = Session::new(dir.path());

        let lines = [
            "clear",
            "pwd",
            "help",
            "ls",
            "mkdir d",
            "cd d",
            "cd ..",
            "rm -r d",
            "cpu",
            "memory",
            "processes",
            "cat notes.txt",
        ];
        for line in lines {
            let result = interpreter.execute(&mut session, line).await;
            assert!(result.is_success(), "{line}: {:?}", result.error);
        }

        assert!(recorder.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn operators_force_external_dispatch() {
        let recorder = Arc::new(Recorder::default());
        let interpreter = interpreter(recorder.clone());
        let mut session = Session::new("/");

        interpreter.execute(&mut session, "ls | wc -l").await;

        let calls = recorder.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0], vec![Stage::new("ls", Vec::<String>::new()), Stage::new("wc", ["-l"])]);
    }

    #[tokio::test]
    async fn unknown_names_fall_through() {
        let recorder = Arc::new(Recorder::default());
        let interpreter = interpreter(recorder.clone());
        let mut session = Session::new("/");

        let result = interpreter.execute(&mut session, "echo hi").await;

        assert_eq!(result.output, "recorded\n");
        assert_eq!(recorder.calls.lock().unwrap()[0], vec![Stage::new("echo", ["hi"])]);
    }

    #[tokio::test]
    async fn non_zero_exit_keeps_stdout_and_reports_status() {
        let recorder = Arc::new(Recorder {
            exit_code: 2,
            ..Recorder::default()
        });
        let interpreter = interpreter(recorder);
        let mut session = Session::new("/");

        let result = interpreter.execute(&mut session, "grep x").await;

        assert_eq!(result.output, "recorded\n");
        assert_eq!(result.error_message().as_deref(), Some("grep: exited with status 2"));
    }

    #[tokio::test]
    async fn parse_errors_never_execute() {
        let recorder = Arc::new(Recorder::default());
        let interpreter = interpreter(recorder.clone());
        let mut session = Session::new("/");

        let result = interpreter.execute(&mut session, "echo 'open").await;

        assert!(matches!(result.error, Some(ShellError::Parse(_))));
        assert!(recorder.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn redirect_writes_file_and_confirms() {
        let recorder = Arc::new(Recorder::default());
        let interpreter = interpreter(recorder);
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session::new(dir.path());

        let result = interpreter.execute(&mut session, "anything > out.txt").await;

        assert_eq!(result.output, "Output redirected to 'out.txt'.");
        assert_eq!(
            std::fs::read_to_string(dir.path().join("out.txt")).unwrap(),
            "recorded\n"
        );
    }
}
