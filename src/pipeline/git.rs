//! Committing and pushing the static site.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{Error, Result};

/// Records site changes in version control.
pub trait VersionPublisher: Send + Sync {
    /// Stage `paths`, commit with `message`, and share the result.
    fn publish(&self, paths: &[PathBuf], message: &str) -> Result<()>;
}

/// [`VersionPublisher`] backed by the `git` command line.
#[derive(Debug, Clone)]
pub struct GitPublisher {
    repo_dir: PathBuf,
    push: bool,
    program: String,
}

impl GitPublisher {
    /// Publish from the repository at `repo_dir`, pushing after commit.
    pub fn new(repo_dir: impl Into<PathBuf>) -> Self {
        Self {
            repo_dir: repo_dir.into(),
            push: true,
            program: "git".to_string(),
        }
    }

    /// Enable or disable `git push`.
    pub fn with_push(mut self, push: bool) -> Self {
        self.push = push;
        self
    }

    /// Use a different `git` executable.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    fn command(&self, args: &[&str]) -> (Command, String) {
        let mut cmd = Command::new(&self.program);
        cmd.args(args).current_dir(&self.repo_dir);
        let line = std::iter::once(self.program.as_str())
            .chain(args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ");
        (cmd, line)
    }

    fn run(&self, args: &[&str]) -> Result<()> {
        let (mut cmd, line) = self.command(args);
        log::info!("RUN: {}", line);
        let status = cmd.status()?;
        if status.success() {
            Ok(())
        } else {
            Err(Error::CommandFailed {
                command: line,
                status: status.code(),
            })
        }
    }
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

impl VersionPublisher for GitPublisher {
    fn publish(&self, paths: &[PathBuf], message: &str) -> Result<()> {
        let paths: Vec<String> = paths.iter().map(|p| path_arg(p)).collect();
        let mut add = vec!["add"];
        add.extend(paths.iter().map(String::as_str));
        self.run(&add)?;

        // Nothing to commit also exits non-zero; that is not a failure.
        match self.run(&["commit", "-m", message]) {
            Ok(()) => {}
            Err(Error::CommandFailed { .. }) => {
                log::warn!("No changes to commit (or commit failed); continuing");
            }
            Err(e) => return Err(e),
        }

        if self.push {
            self.run(&["push"])?;
        } else {
            log::info!("Push disabled; commit left local");
        }
        Ok(())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_failed_add_is_command_failed() {
        let dir = tempfile::tempdir().unwrap();
        let git = GitPublisher::new(dir.path()).with_program("false");

        let err = git
            .publish(&[PathBuf::from("docs/index.html")], "msg")
            .unwrap_err();
        match err {
            Error::CommandFailed { command, status } => {
                assert_eq!(command, "false add docs/index.html");
                assert_eq!(status, Some(1));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_successful_commands() {
        let dir = tempfile::tempdir().unwrap();
        let git = GitPublisher::new(dir.path())
            .with_program("true")
            .with_push(false);
        git.publish(&[PathBuf::from("docs")], "msg").unwrap();
    }

    #[test]
    fn test_missing_program_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let git = GitPublisher::new(dir.path()).with_program("storyshelf-no-such-git");
        assert!(matches!(git.publish(&[], "msg"), Err(Error::Io(_))));
    }
}
