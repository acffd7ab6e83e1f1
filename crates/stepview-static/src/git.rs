//! Thin wrappers around the `git` command line.

use std::path::Path;
use std::process::{Command, Output, Stdio};

/// Run git in `repo` and return its output once the process has run.
pub fn git(repo: &Path, args: &[&str]) -> std::io::Result<Output> {
    Command::new("git")
        .arg("-C")
        .arg(repo)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
}

/// Run git and capture stdout on success.
///
/// Spawn failures and non-zero exits are both reported as `Err` with git's stderr.
pub fn git_stdout(repo: &Path, args: &[&str]) -> Result<String, String> {
    let output = git(repo, args).map_err(|e| format!("failed to run git: {}", e))?;

    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    } else {
        Err(String::from_utf8_lossy(&output.stderr).trim().to_string())
    }
}

/// All tags in the repository, in git's listing order.
pub fn list_tags(repo: &Path) -> Result<Vec<String>, String> {
    let out = git_stdout(repo, &["tag", "--list"])?;
    Ok(out.split_whitespace().map(str::to_string).collect())
}

/// Whether a `git` binary is available on this host.
pub fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
pub(crate) mod testing {
    //! Helpers for tests that need a real repository.

    use std::path::Path;
    use std::process::Command;

    /// Run git in `repo` with a fixed identity, panicking on failure.
    pub fn run(repo: &Path, args: &[&str]) {
        let status = Command::new("git")
            .args(["-c", "user.name=Step Viewer Test"])
            .args(["-c", "user.email=steps@example.com"])
            .args(["-c", "commit.gpgsign=false"])
            .args(["-c", "tag.gpgsign=false"])
            .arg("-C")
            .arg(repo)
            .args(args)
            .status()
            .expect("spawn git");
        assert!(status.success(), "git {:?} failed", args);
    }

    /// Initialize an empty repository.
    pub fn init(repo: &Path) {
        run(repo, &["init", "-q"]);
    }

    /// Stage everything, commit and tag it.
    pub fn commit_and_tag(repo: &Path, tag: &str) {
        run(repo, &["add", "-A"]);
        run(repo, &["commit", "-q", "-m", tag]);
        run(repo, &["tag", tag]);
    }
}
