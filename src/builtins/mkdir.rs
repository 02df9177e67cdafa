use async_trait::async_trait;

use crate::{config::BuiltinConfig, error::ShellError, state::Session};

use super::{Args, BuiltinCommand};

#[derive(Default)]
pub struct Mkdir;

#[async_trait]
impl BuiltinCommand for Mkdir {
    fn name(&self) -> &'static str {
        "mkdir"
    }

    /// Creates each directory and its parents; existing directories are fine.
    async fn execute(
        &self,
        session: &mut Session,
        _config: &BuiltinConfig,
        args: &[String],
    ) -> Result<String, ShellError> {
        let args = Args::parse(args);

        for path in args.require_operands("mkdir")? {
            tokio::fs::create_dir_all(session.resolve(path))
                .await
                .map_err(|err| ShellError::io("mkdir", path, err))?;
        }

        Ok(String::new())
    }
}

#[cfg(test)]
mod tests {
    use crate::error::FsFailure;

    use super::*;

    async fn mkdir(session: &mut Session, args: &[&str]) -> Result<String, ShellError> {
        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        Mkdir.execute(session, &BuiltinConfig::default(), &args).await
    }

    #[tokio::test]
    async fn creation_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session::new(dir.path());

        mkdir(&mut session, &["d"]).await.unwrap();
        mkdir(&mut session, &["d"]).await.unwrap();

        assert!(dir.path().join("d").is_dir());
    }

    #[tokio::test]
    async fn creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session::new(dir.path());

        mkdir(&mut session, &["-p", "a/b/c", "x"]).await.unwrap();

        assert!(dir.path().join("a/b/c").is_dir());
        assert!(dir.path().join("x").is_dir());
    }

    #[tokio::test]
    async fn existing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("f"), "").unwrap();
        let mut session = Session::new(dir.path());

        assert!(matches!(
            mkdir(&mut session, &["f"]).await,
            Err(ShellError::Io {
                failure: FsFailure::AlreadyExists,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn requires_an_operand() {
        let mut session = Session::new("/");
        assert!(mkdir(&mut session, &[]).await.is_err());
    }
}
