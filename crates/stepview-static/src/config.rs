//! Viewer configuration (`viewer.config.json`).

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::BuildError;
use crate::fs::{read_json, write_json};

/// File name of the viewer configuration at the project root.
pub const CONFIG_FILE: &str = "viewer.config.json";

/// File name the configuration is published under in the site.
pub const SITE_CONFIG_FILE: &str = "viewer-config.json";

/// Site-wide settings shared by the shell pages and the client script.
///
/// Every key is optional on disk; missing keys take their default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewerConfig {
    pub site_title: String,
    pub assistant_name: String,
    pub repo_url: String,
    pub other_experiment_url: String,
    pub footer_name: String,
    pub footer_url: String,
    pub description: String,

    /// Deployment sub-path, e.g. `""` for the domain root or `"/viewer"`.
    #[serde(rename = "pagesURL")]
    pub pages_url: String,

    /// Locale of the shell's interface text.
    pub locale: String,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            site_title: "GenAI Incremental Experiment Viewer".to_string(),
            assistant_name: String::new(),
            repo_url: String::new(),
            other_experiment_url: String::new(),
            footer_name: String::new(),
            footer_url: String::new(),
            description: String::new(),
            pages_url: String::new(),
            locale: "en".to_string(),
        }
    }
}

impl ViewerConfig {
    /// Load the configuration, creating it with defaults if absent.
    ///
    /// A malformed file is reported and replaced by the defaults in memory
    /// (the file itself is left untouched).
    pub fn load_or_create(path: &Path) -> Result<Self, BuildError> {
        if !path.exists() {
            let config = Self::default();
            write_json(path, &config)?;
            tracing::info!("Created {} with defaults", path.display());
            return Ok(config);
        }

        match read_json::<Self>(path) {
            Ok(config) => {
                tracing::debug!("Loaded viewer config from {}", path.display());
                Ok(config)
            }
            Err(BuildError::Json { source, .. }) => {
                tracing::warn!("Ignoring malformed {}: {}", path.display(), source);
                Ok(Self::default())
            }
            Err(e) => Err(e),
        }
    }

    /// Absolute URL prefix the site is served under, always slash-terminated.
    pub fn path_prefix(&self) -> String {
        let trimmed = self.pages_url.trim().trim_matches('/');
        if trimmed.is_empty() {
            "/".to_string()
        } else {
            format!("/{}/", trimmed)
        }
    }
}
