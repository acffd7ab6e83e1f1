//! Static site generator for the step viewer.
//!
//! Discovers the numbered steps of an incremental coding experiment (git tags,
//! `step-*` folders or a `steps.json` manifest), builds each one into its own
//! directory, and wraps them in a navigational shell.

pub mod assets;
pub mod builder;
pub mod config;
pub mod discovery;
pub mod error;
pub mod fs;
pub mod git;
pub mod i18n;
pub mod manifest;
pub mod normalize;
pub mod shell;
pub mod step;
pub mod step_id;
pub mod templates;
pub mod toolchain;
pub mod verify;
pub mod worktree;

pub use builder::{BuildMode, BuildResult, SiteBuilder, SiteConfig};
pub use config::ViewerConfig;
pub use discovery::{Discovered, Discovery, StepSource};
pub use error::BuildError;
pub use manifest::StepRecord;
pub use shell::ShellPages;
pub use step::{StepBuild, StepBuilder};
pub use step_id::StepId;
pub use toolchain::{BestEffort, SystemToolchain, ToolError, Toolchain};
pub use verify::{verify_full_build, MissingArtifact, VerifyError};
