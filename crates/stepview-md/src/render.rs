//! Markdown to HTML fragment rendering.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use pulldown_cmark::{html, Options, Parser};
use regex::Regex;

use crate::frontmatter::{extract_frontmatter, Frontmatter};

static H1_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<h1(?:\s[^>]*)?>(.*?)</h1\s*>").expect("valid h1 pattern"));

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid tag pattern"));

/// A rendered Markdown document.
#[derive(Debug, Clone)]
pub struct RenderedDoc {
    /// Parsed frontmatter (if present and valid)
    pub frontmatter: Option<Frontmatter>,

    /// Rendered HTML fragment, not yet wrapped in a prose container
    pub html: String,

    /// Title from frontmatter, else from the first `<h1>` of the rendered HTML
    pub title: Option<String>,

    /// Set when a frontmatter block was present but could not be parsed;
    /// the whole file was rendered as Markdown instead.
    pub frontmatter_error: Option<String>,
}

impl RenderedDoc {
    /// Short title for labels, if the frontmatter provides one.
    pub fn short_title(&self) -> Option<&str> {
        self.frontmatter
            .as_ref()
            .and_then(|f| f.short.as_deref())
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Errors that can occur when rendering a file.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Error reading {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Render Markdown to an HTML fragment.
///
/// Raw HTML in the source passes through unchanged.
pub fn render_markdown(content: &str) -> String {
    let options = Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS;

    let parser = Parser::new_ext(content, options);

    let mut html_output = String::new();
    html::push_html(&mut html_output, parser);

    html_output
}

/// Wrap a fragment in the prose container the shell styles.
pub fn wrap_prose(html: &str) -> String {
    format!("<div class=\"prose\">\n{}\n</div>", html)
}

/// Text of the first `<h1>` in an HTML fragment, with markup stripped.
pub fn first_heading(html: &str) -> Option<String> {
    let inner = H1_RE.captures(html)?.get(1)?.as_str();
    let text = decode_entities(&TAG_RE.replace_all(inner, ""));
    let text = text.trim();

    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// Decode the entities the Markdown renderer emits in text.
pub fn decode_entities(text: &str) -> String {
    // &amp; last, so "&amp;lt;" stays "&lt;"
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Read and render a Markdown file.
pub fn render_file(path: &Path) -> Result<RenderedDoc, RenderError> {
    let source = fs::read_to_string(path).map_err(|source| RenderError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(render_source(&source))
}

/// Render Markdown source that may begin with frontmatter.
pub fn render_source(source: &str) -> RenderedDoc {
    let (frontmatter, body, frontmatter_error) = match extract_frontmatter(source) {
        Ok((fm, body)) => (fm, body, None),
        Err(e) => (None, source, Some(e.to_string())),
    };

    let html = render_markdown(body);

    let title = frontmatter
        .as_ref()
        .and_then(|f| f.title.as_deref())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .or_else(|| first_heading(&html));

    RenderedDoc {
        frontmatter,
        html,
        title,
        frontmatter_error,
    }
}
