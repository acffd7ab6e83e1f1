//! Package manager and bundler invocations.
//!
//! Step builds shell out to `npm` and `vite`. The [`Toolchain`] trait is the
//! seam between the build logic and those processes, and [`BestEffort`] names
//! the failures the build deliberately tolerates.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::LazyLock;

use regex::Regex;

use crate::error::BuildError;

/// Bundler config files recognized in a package directory.
pub const VITE_CONFIG_NAMES: &[&str] = &["vite.config.js", "vite.config.mjs", "vite.config.ts"];

/// Package descriptor that marks a buildable sub-application.
pub const PACKAGE_JSON: &str = "package.json";

static VITE_BASE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(\bbase\s*:\s*)(?:'(?:/[^']*)?'|"(?:/[^"]*)?")"#).expect("valid base pattern")
});

/// A failed tool invocation.
#[derive(Debug, Clone, thiserror::Error)]
#[error("`{command}` failed ({}): {stderr}", describe_status(.status))]
pub struct ToolError {
    /// Command line that was run
    pub command: String,

    /// Exit status, `None` if the process could not be started or was killed
    pub status: Option<i32>,

    /// Tail of the captured standard error
    pub stderr: String,
}

fn describe_status(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("exit status {}", code),
        None => "did not exit normally".to_string(),
    }
}

/// A tool failure the build tolerates by policy.
///
/// Dependency installs and secondary build scripts are best-effort: their
/// failures are logged and recorded, never propagated.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{action} failed and was ignored: {source}")]
pub struct BestEffort {
    /// What was attempted, e.g. "dependency install"
    pub action: &'static str,

    #[source]
    pub source: ToolError,
}

impl BestEffort {
    /// Convert a failed result into a tolerated failure, logging it.
    pub fn tolerate(action: &'static str, result: Result<(), ToolError>) -> Option<Self> {
        match result {
            Ok(()) => None,
            Err(source) => {
                let failure = Self { action, source };
                tracing::warn!("{}", failure);
                Some(failure)
            }
        }
    }
}

/// External tools used to build a step's sub-application.
pub trait Toolchain {
    /// Install dependencies from the lockfile (`npm ci`).
    fn install(&self, dir: &Path) -> Result<(), ToolError>;

    /// Bundle the app in `dir` into `out_dir`, optionally forcing the asset base path.
    fn bundle(&self, dir: &Path, out_dir: &Path, base: Option<&str>) -> Result<(), ToolError>;

    /// Run a package script (`npm run <script>`).
    fn run_script(&self, dir: &Path, script: &str) -> Result<(), ToolError>;
}

/// Toolchain backed by the real `npm` and `npx` binaries.
#[derive(Debug, Clone)]
pub struct SystemToolchain {
    npm: String,
    npx: String,
}

impl Default for SystemToolchain {
    fn default() -> Self {
        if cfg!(windows) {
            Self {
                npm: "npm.cmd".to_string(),
                npx: "npx.cmd".to_string(),
            }
        } else {
            Self {
                npm: "npm".to_string(),
                npx: "npx".to_string(),
            }
        }
    }
}

impl SystemToolchain {
    /// Create a toolchain using the platform's npm binaries.
    pub fn new() -> Self {
        Self::default()
    }

    fn run(&self, program: &str, args: &[String], dir: &Path) -> Result<(), ToolError> {
        let command = format!("{} {}", program, args.join(" "));
        tracing::debug!("Running `{}` in {}", command, dir.display());

        let output = Command::new(program)
            .args(args)
            .current_dir(dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| ToolError {
                command: command.clone(),
                status: None,
                stderr: e.to_string(),
            })?;

        if output.status.success() {
            Ok(())
        } else {
            Err(ToolError {
                command,
                status: output.status.code(),
                stderr: tail(&String::from_utf8_lossy(&output.stderr), 20),
            })
        }
    }
}

impl Toolchain for SystemToolchain {
    fn install(&self, dir: &Path) -> Result<(), ToolError> {
        self.run(&self.npm, &["ci".to_string()], dir)
    }

    fn bundle(&self, dir: &Path, out_dir: &Path, base: Option<&str>) -> Result<(), ToolError> {
        let mut args = vec!["vite".to_string(), "build".to_string()];
        if let Some(base) = base {
            args.push(format!("--base={}", base));
        }
        args.push(format!("--outDir={}", out_dir.display()));
        self.run(&self.npx, &args, dir)
    }

    fn run_script(&self, dir: &Path, script: &str) -> Result<(), ToolError> {
        self.run(&self.npm, &["run".to_string(), script.to_string()], dir)
    }
}

/// Last `lines` lines of a process's output.
fn tail(text: &str, lines: usize) -> String {
    let all: Vec<&str> = text.trim_end().lines().collect();
    let start = all.len().saturating_sub(lines);
    all[start..].join("\n")
}

/// Whether `dir` holds a package descriptor.
pub fn has_package(dir: &Path) -> bool {
    dir.join(PACKAGE_JSON).is_file()
}

/// First bundler config file present in `dir`.
pub fn find_bundler_config(dir: &Path) -> Option<PathBuf> {
    VITE_CONFIG_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

/// Whether the package in `dir` defines the named script.
pub fn has_script(dir: &Path, script: &str) -> bool {
    let Ok(text) = fs::read_to_string(dir.join(PACKAGE_JSON)) else {
        return false;
    };
    serde_json::from_str::<serde_json::Value>(&text)
        .ok()
        .and_then(|pkg| pkg.get("scripts")?.get(script).map(|s| s.is_string()))
        .unwrap_or(false)
}

/// Rewrite an absolute `base:` in the bundler config to `'./'`.
///
/// Only used inside ephemeral worktrees; returns whether the file changed.
pub fn patch_base_to_relative(dir: &Path) -> Result<bool, BuildError> {
    let Some(config_path) = find_bundler_config(dir) else {
        return Ok(false);
    };

    let content = crate::fs::read_text(&config_path)?;
    let patched = VITE_BASE_RE.replace_all(&content, "${1}'./'");

    if patched == content {
        return Ok(false);
    }

    crate::fs::write_text(&config_path, &patched)?;
    tracing::debug!("Patched base path in {}", config_path.display());
    Ok(true)
}

#[cfg(test)]
pub(crate) mod testing {
    //! A scripted toolchain for exercising build paths without npm.

    use std::cell::RefCell;
    use std::collections::HashSet;
    use std::path::Path;

    use super::{ToolError, Toolchain};

    /// Records calls and fails the operations it is told to fail.
    ///
    /// A successful `bundle` writes an `index.html` referencing `/assets/app.js`
    /// into the output directory; a successful `run_script("build")` writes a
    /// `dist/` folder next to the package.
    #[derive(Default)]
    pub struct FakeToolchain {
        pub fail: HashSet<&'static str>,
        pub calls: RefCell<Vec<String>>,
    }

    impl FakeToolchain {
        pub fn failing(ops: &[&'static str]) -> Self {
            Self {
                fail: ops.iter().copied().collect(),
                ..Default::default()
            }
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }

        fn outcome(&self, op: &'static str, detail: String) -> Result<(), ToolError> {
            self.calls.borrow_mut().push(detail.clone());
            if self.fail.contains(op) {
                Err(ToolError {
                    command: detail,
                    status: Some(1),
                    stderr: format!("{} failed", op),
                })
            } else {
                Ok(())
            }
        }
    }

    fn write_app(dir: &Path, marker: &str) {
        std::fs::create_dir_all(dir.join("assets")).unwrap();
        std::fs::write(
            dir.join("index.html"),
            format!(
                "<html><head><title>{}</title><script src=\"/assets/app.js\"></script></head><body></body></html>",
                marker
            ),
        )
        .unwrap();
        std::fs::write(
            dir.join("assets/app.js"),
            "import(\"/assets/chunk.js\");",
        )
        .unwrap();
    }

    impl Toolchain for FakeToolchain {
        fn install(&self, dir: &Path) -> Result<(), ToolError> {
            self.outcome("install", format!("install {}", dir.display()))
        }

        fn bundle(&self, dir: &Path, out_dir: &Path, base: Option<&str>) -> Result<(), ToolError> {
            self.outcome(
                "bundle",
                format!("bundle {} base={}", dir.display(), base.unwrap_or("-")),
            )?;
            write_app(out_dir, "bundled");
            Ok(())
        }

        fn run_script(&self, dir: &Path, script: &str) -> Result<(), ToolError> {
            self.outcome("script", format!("script {} {}", script, dir.display()))?;
            write_app(&dir.join("dist"), "script");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn tolerated_failure_keeps_source() {
        let err = ToolError {
            command: "npm ci".to_string(),
            status: Some(1),
            stderr: "lockfile missing".to_string(),
        };

        let tolerated = BestEffort::tolerate("dependency install", Err(err)).unwrap();

        assert_eq!(tolerated.action, "dependency install");
        assert!(tolerated.to_string().contains("npm ci"));
        assert!(tolerated.to_string().contains("exit status 1"));
        assert!(BestEffort::tolerate("dependency install", Ok(())).is_none());
    }

    #[test]
    fn detects_package_and_scripts() {
        let temp = tempdir().unwrap();
        assert!(!has_package(temp.path()));
        assert!(!has_script(temp.path(), "build"));

        fs::write(
            temp.path().join(PACKAGE_JSON),
            r#"{ "scripts": { "build": "vite build", "lint": 3 } }"#,
        )
        .unwrap();

        assert!(has_package(temp.path()));
        assert!(has_script(temp.path(), "build"));
        assert!(!has_script(temp.path(), "lint"));
        assert!(!has_script(temp.path(), "test"));
    }

    #[test]
    fn finds_bundler_config_in_order() {
        let temp = tempdir().unwrap();
        assert!(find_bundler_config(temp.path()).is_none());

        fs::write(temp.path().join("vite.config.ts"), "").unwrap();
        fs::write(temp.path().join("vite.config.mjs"), "").unwrap();

        let found = find_bundler_config(temp.path()).unwrap();
        assert!(found.ends_with("vite.config.mjs"));
    }

    #[test]
    fn patches_absolute_base() {
        let temp = tempdir().unwrap();
        let config = temp.path().join("vite.config.js");
        fs::write(
            &config,
            "export default defineConfig({ base: \"/social-demo/\", plugins: [vue()] })",
        )
        .unwrap();

        assert!(patch_base_to_relative(temp.path()).unwrap());

        let patched = fs::read_to_string(&config).unwrap();
        assert!(patched.contains("base: './'"));
        assert!(!patched.contains("social-demo"));
    }

    #[test]
    fn leaves_relative_base_alone() {
        let temp = tempdir().unwrap();
        fs::write(
            temp.path().join("vite.config.js"),
            "export default { base: './' }",
        )
        .unwrap();

        assert!(!patch_base_to_relative(temp.path()).unwrap());
    }

    #[test]
    fn tail_keeps_last_lines() {
        assert_eq!(tail("a\nb\nc\n", 2), "b\nc");
        assert_eq!(tail("", 5), "");
    }

    #[test]
    fn missing_binary_is_a_tool_error() {
        let toolchain = SystemToolchain {
            npm: "definitely-not-a-real-npm".to_string(),
            npx: "definitely-not-a-real-npx".to_string(),
        };
        let temp = tempdir().unwrap();

        let err = toolchain.install(temp.path()).unwrap_err();

        assert_eq!(err.status, None);
        assert!(err.command.starts_with("definitely-not-a-real-npm ci"));
    }
}
