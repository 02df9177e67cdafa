use async_trait::async_trait;

use crate::{config::BuiltinConfig, error::ShellError, state::Session};

use super::{Args, BuiltinCommand};

#[derive(Default)]
pub struct Cat;

#[async_trait]
impl BuiltinCommand for Cat {
    fn name(&self) -> &'static str {
        "cat"
    }

    async fn execute(
        &self,
        session: &mut Session,
        _config: &BuiltinConfig,
        args: &[String],
    ) -> Result<String, ShellError> {
        let args = Args::parse(args);
        let mut out = String::new();

        for path in args.require_operands("cat")? {
            let bytes = tokio::fs::read(session.resolve(path))
                .await
                .map_err(|err| ShellError::io("cat", path, err))?;
            out.push_str(&String::from_utf8_lossy(&bytes));
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn cat(session: &mut Session, args: &[&str]) -> Result<String, ShellError> {
        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        Cat.execute(session, &BuiltinConfig::default(), &args).await
    }

    #[tokio::test]
    async fn returns_exact_contents() {
        let dir = tempfile::tempdir().unwrap();
        let contents = "line one\n\tindented  \nno trailing newline";
        std::fs::write(dir.path().join("f.txt"), contents).unwrap();
        let mut session = Session::new(dir.path());

        assert_eq!(cat(&mut session, &["f.txt"]).await.unwrap(), contents);
    }

    #[tokio::test]
    async fn concatenates_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a"), "a\n").unwrap();
        std::fs::write(dir.path().join("b"), "b\n").unwrap();
        let mut session = Session::new(dir.path());

        assert_eq!(cat(&mut session, &["a", "b"]).await.unwrap(), "a\nb\n");
    }

    #[tokio::test]
    async fn missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session::new(dir.path());

        let err = cat(&mut session, &["missing.txt"]).await.unwrap_err();

        assert!(err.to_string().contains("No such file or directory"));
    }
}
