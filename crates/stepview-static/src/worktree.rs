//! Ephemeral git worktrees for building a tagged step in isolation.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::BuildError;
use crate::git::{git, git_stdout};

/// A checked-out worktree that is removed when dropped.
///
/// Creation adds an entry to the parent repository's worktree list; dropping
/// the guard removes it again on every exit path, including build failures.
#[derive(Debug)]
pub struct Worktree {
    repo_root: PathBuf,
    path: PathBuf,
}

impl Worktree {
    /// Directory used for the worktree of `tag`.
    pub fn path_for(repo_root: &Path, tag: &str) -> PathBuf {
        repo_root.join(format!(".wt-{}", tag))
    }

    /// Check out `tag` into `<repo_root>/.wt-<tag>`.
    pub fn checkout(repo_root: &Path, tag: &str) -> Result<Self, BuildError> {
        let path = Self::path_for(repo_root, tag);

        // Left behind by an interrupted run
        if path.exists() {
            tracing::debug!("Removing stale worktree {}", path.display());
            release(repo_root, &path);
        }

        let path_arg = path.to_string_lossy();
        git_stdout(repo_root, &["worktree", "add", "--detach", &path_arg, tag]).map_err(
            |message| BuildError::Checkout {
                tag: tag.to_string(),
                message,
            },
        )?;

        tracing::debug!("Checked out {} into {}", tag, path.display());

        Ok(Self {
            repo_root: repo_root.to_path_buf(),
            path,
        })
    }

    /// Root of the checked-out tree.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for Worktree {
    fn drop(&mut self) {
        release(&self.repo_root, &self.path);
    }
}

/// Remove a worktree, falling back to deleting the directory and pruning.
fn release(repo_root: &Path, path: &Path) {
    let path_arg = path.to_string_lossy();
    match git(repo_root, &["worktree", "remove", "--force", &path_arg]) {
        Ok(out) if out.status.success() => {}
        Ok(out) => tracing::debug!(
            "git worktree remove {} failed: {}",
            path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        ),
        Err(e) => tracing::debug!("Failed to run git worktree remove: {}", e),
    }

    if path.exists() {
        if let Err(e) = fs::remove_dir_all(path) {
            tracing::warn!("Failed to remove worktree {}: {}", path.display(), e);
        }
        let _ = git(repo_root, &["worktree", "prune"]);
    }
}
