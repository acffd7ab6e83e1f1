//! Shell-only generation command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use stepview_static::config::CONFIG_FILE;
use stepview_static::manifest::{write_manifest, MANIFEST_FILE};
use stepview_static::step::describe_step;
use stepview_static::step_id::normalize_step_param;
use stepview_static::{BuildError, ShellPages, StepId, ViewerConfig};

/// Run the shell command: manifest, landing, about and wrapper pages for
/// the given steps. Step outputs themselves are left alone.
pub fn run(root: PathBuf, ids: Vec<String>, output: Option<PathBuf>) -> Result<()> {
    let mut parsed = ids
        .iter()
        .map(|id| parse_step_arg(id))
        .collect::<Result<Vec<_>, _>>()?;

    let site = output.unwrap_or_else(|| root.join("site"));
    let config = ViewerConfig::load_or_create(&root.join(CONFIG_FILE))?;
    parsed.sort_by_key(StepId::num);

    let steps = parsed
        .iter()
        .map(|id| describe_step(&root, id))
        .collect::<Result<Vec<_>, _>>()?;

    let shell = ShellPages::new(config)?
        .with_templates_dir(&root.join("viewer").join("templates"))?;

    write_manifest(&site.join(MANIFEST_FILE), &steps)?;
    let written = shell
        .write_all(&site, &steps)
        .with_context(|| format!("Failed to write shell pages to {}", site.display()))?;

    tracing::info!("Wrote shell pages for {} step(s) to {}", written, site.display());

    Ok(())
}

/// Accept `step-01`, `01` or `1`.
fn parse_step_arg(arg: &str) -> Result<StepId, BuildError> {
    normalize_step_param(arg)
        .and_then(|id| StepId::parse(&id))
        .ok_or_else(|| BuildError::InvalidStepId(arg.to_string()))
}
