//! Post-build guardrail.
//!
//! A full build must leave a landing page, the manifest, the viewer config and
//! at least one built step behind. Anything less is a shell-only deploy.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::SITE_CONFIG_FILE;
use crate::manifest::MANIFEST_FILE;
use crate::step_id::StepId;

/// A top-level artifact the guardrail expected but did not find.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingArtifact {
    Index,
    Manifest,
    ViewerConfig,
    StepDirectory,
    StepIndex,
}

impl fmt::Display for MissingArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index => f.write_str("index.html"),
            Self::Manifest => f.write_str(MANIFEST_FILE),
            Self::ViewerConfig => f.write_str(SITE_CONFIG_FILE),
            Self::StepDirectory => f.write_str("at least one step-*/ folder (e.g. step-01/index.html)"),
            Self::StepIndex => f.write_str("at least one step-*/index.html"),
        }
    }
}

/// The site is missing required artifacts.
#[derive(Debug, thiserror::Error)]
#[error(
    "Build produced the shell only; {} is incomplete.{}",
    .site.display(),
    missing_lines(.missing)
)]
pub struct VerifyError {
    pub site: PathBuf,
    pub missing: Vec<MissingArtifact>,
}

fn missing_lines(missing: &[MissingArtifact]) -> String {
    missing
        .iter()
        .map(|m| format!("\n  Missing: {}", m))
        .collect()
}

/// Check that `site` holds a complete build, reporting every missing artifact.
pub fn verify_full_build(site: &Path) -> Result<(), VerifyError> {
    let mut missing = Vec::new();

    for (file, artifact) in [
        ("index.html", MissingArtifact::Index),
        (MANIFEST_FILE, MissingArtifact::Manifest),
        (SITE_CONFIG_FILE, MissingArtifact::ViewerConfig),
    ] {
        if !site.join(file).is_file() {
            missing.push(artifact);
        }
    }

    let step_dirs: Vec<PathBuf> = crate::fs::list_dirs(site)
        .into_iter()
        .filter(|name| StepId::parse(name).is_some())
        .map(|name| site.join(name))
        .collect();

    if step_dirs.is_empty() {
        missing.push(MissingArtifact::StepDirectory);
    } else if !step_dirs.iter().any(|dir| dir.join("index.html").is_file()) {
        missing.push(MissingArtifact::StepIndex);
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(VerifyError {
            site: site.to_path_buf(),
            missing,
        })
    }
}
