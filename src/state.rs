use std::{
    io,
    path::{Path, PathBuf},
};

/// Per-session interpreter state.
///
/// The working directory lives here rather than in the host process, so
/// sessions sharing one interpreter never observe each other's `cd`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    working_dir: PathBuf,
}

impl Session {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
        }
    }

    /// Starts a session in the host process's current directory.
    pub fn from_current_dir() -> io::Result<Self> {
        Ok(Self::new(std::env::current_dir()?))
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    pub fn set_working_dir(&mut self, dir: PathBuf) {
        trace!(from = ?self.working_dir, to = ?dir, "changing working directory");
        self.working_dir = dir;
    }

    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        self.working_dir.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_relative_paths_against_working_dir() {
        let session = Session::new("/srv/data");

        assert_eq!(session.resolve("logs"), PathBuf::from("/srv/data/logs"));
    }

    #[test]
    fn absolute_paths_are_kept() {
        let session = Session::new("/srv/data");

        assert_eq!(session.resolve("/etc/hosts"), PathBuf::from("/etc/hosts"));
    }
}
