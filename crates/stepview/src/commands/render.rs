//! Markdown to HTML fragment command.

use std::path::PathBuf;

use anyhow::{bail, Result};
use stepview_md::{render_file, wrap_prose};

/// Run the render command, printing the wrapped fragment to stdout.
pub fn run(file: Option<PathBuf>) -> Result<()> {
    let Some(file) = file else {
        bail!("Usage: stepview render <input.md>");
    };

    let doc = render_file(&file)?;
    if let Some(e) = &doc.frontmatter_error {
        tracing::warn!("{}: {}", file.display(), e);
    }

    println!("{}", wrap_prose(&doc.html));

    Ok(())
}
