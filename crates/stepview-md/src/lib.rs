//! Markdown rendering for step documentation.
//!
//! Turns agent notes and prompts into HTML fragments that the viewer shell
//! injects into its sidebar, and derives step titles from their headings.

pub mod frontmatter;
pub mod render;

pub use frontmatter::{extract_frontmatter, Frontmatter, FrontmatterError};
pub use render::{
    decode_entities, first_heading, render_file, render_markdown, render_source, wrap_prose,
    RenderError, RenderedDoc,
};
