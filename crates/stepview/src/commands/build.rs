//! Full site build command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use stepview_static::{SiteBuilder, SiteConfig};

/// Run the build command.
pub async fn run(root: PathBuf, output: Option<PathBuf>, minify: bool, mock: bool) -> Result<()> {
    tracing::info!("Building step viewer site from {}...", root.display());

    let mut config = SiteConfig::for_root(root);
    if let Some(output) = output {
        config.site_dir = output;
    }
    config.minify = minify;
    config.mock = mock;

    let result = tokio::task::spawn_blocking(move || SiteBuilder::new(config).build())
        .await
        .context("Build task panicked")??;

    tracing::info!(
        "Built {} step(s) in {} mode ({}) in {}ms",
        result.steps.len(),
        result.mode,
        result.source,
        result.duration_ms
    );
    if result.tolerated > 0 {
        tracing::warn!("{} best-effort failure(s) were ignored", result.tolerated);
    }

    tracing::info!("Output: {}", result.output_dir.display());

    Ok(())
}
