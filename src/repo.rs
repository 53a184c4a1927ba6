//! Repository initialization for generated trees.
//!
//! Git runs as an awaited subprocess; a non-zero exit fails the step with
//! the captured stderr. The runner sits behind a trait so tests can stub it.

use std::path::Path;
use std::process::Command;

use crate::error::{DevforgeError, Result};

/// Runs git commands. Implemented by [`SystemGit`] for real use and by mocks
/// in tests.
pub trait GitRunner {
    fn run(&self, dir: &Path, args: &[&str]) -> Result<()>;
}

/// Spawns the real `git` binary.
pub struct SystemGit;

impl GitRunner for SystemGit {
    fn run(&self, dir: &Path, args: &[&str]) -> Result<()> {
        let output = Command::new("git")
            .current_dir(dir)
            .args(args)
            .output()
            .map_err(|e| DevforgeError::RepositoryOperation {
                args: args.join(" "),
                stderr: format!("failed to spawn git: {}", e),
            })?;

        if !output.status.success() {
            return Err(DevforgeError::RepositoryOperation {
                args: args.join(" "),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(())
    }
}

/// Check the git binary is on PATH before the pipeline reaches the commit
/// step.
pub fn ensure_git_available() -> Result<()> {
    which::which("git")
        .map(|_| ())
        .map_err(|_| DevforgeError::GitNotInstalled)
}

/// Initialize a repository at `dir` with a single commit of everything in
/// the tree. A directory that already contains `.git` is left untouched;
/// re-running is a no-op, not an error.
///
/// Returns `true` when a repository was created.
pub fn init_repository(runner: &dyn GitRunner, dir: &Path, message: &str) -> Result<bool> {
    if dir.join(".git").exists() {
        return Ok(false);
    }

    runner.run(dir, &["init", "-q"])?;
    runner.run(dir, &["add", "-A"])?;
    runner.run(dir, &["commit", "-m", message, "-q"])?;

    Ok(true)
}
