//! Initialize the step viewer in a project.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use stepview_static::config::CONFIG_FILE;
use stepview_static::ViewerConfig;

/// Run the init command.
pub fn run(root: &Path, yes: bool) -> Result<()> {
    tracing::info!("Initializing stepview in {}...", root.display());

    let config_path = root.join(CONFIG_FILE);
    if config_path.exists() && !yes {
        tracing::warn!("{} already exists. Use --yes to overwrite.", CONFIG_FILE);
        return Ok(());
    }
    stepview_static::fs::write_json(&config_path, &ViewerConfig::default())?;
    tracing::info!("Created {}", CONFIG_FILE);

    for (rel, content) in [
        ("docs/agent-notes/01.md", SAMPLE_NOTES),
        ("docs/prompts/01.md", SAMPLE_PROMPT),
    ] {
        let path = root.join(rel);
        if path.exists() && !yes {
            continue;
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&path, content).with_context(|| format!("Failed to write {}", rel))?;
        tracing::info!("Created {}", rel);
    }

    tracing::info!("Initialization complete!");
    tracing::info!("Tag each step as step-01, step-02, ... and run 'stepview build'.");

    Ok(())
}

const SAMPLE_NOTES: &str = r#"---
short: Project setup
---

# Setting up the project

Notes the assistant wrote while working on this step: what changed, what
was tricky, and what is left for the next step.
"#;

const SAMPLE_PROMPT: &str = r#"# Prompt

The exact prompt given to the assistant for this step.
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_config_and_samples() {
        let temp = tempfile::tempdir().unwrap();

        run(temp.path(), false).unwrap();

        let config = ViewerConfig::load_or_create(&temp.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(config, ViewerConfig::default());
        assert!(temp.path().join("docs/agent-notes/01.md").is_file());
        assert!(temp.path().join("docs/prompts/01.md").is_file());
    }

    #[test]
    fn keeps_existing_config_without_yes() {
        let temp = tempfile::tempdir().unwrap();
        fs::write(temp.path().join(CONFIG_FILE), r#"{"siteTitle":"Mine"}"#).unwrap();

        run(temp.path(), false).unwrap();

        let config = ViewerConfig::load_or_create(&temp.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(config.site_title, "Mine");
        assert!(!temp.path().join("docs").exists());
    }
}
