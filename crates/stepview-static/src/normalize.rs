//! Asset path normalization for built step apps.
//!
//! Step apps are served from `/<pages-url>/<step-id>/`, so root-relative
//! `/assets/...` references emitted by the bundler must become relative, and
//! the page gets a `<base href>` for everything else.

use std::borrow::Cow;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use walkdir::WalkDir;

use crate::error::BuildError;
use crate::fs::{read_text, write_text};

static HTML_ASSET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(\b(?:src|href)\s*=\s*["'])/assets/"#).expect("valid html asset pattern")
});

// Root-relative only: a preceding '.', word char, '/' or '-' means the
// reference is already relative or part of a longer URL.
static CODE_ASSET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(^|[^.\w/-])/assets/").expect("valid code asset pattern"));

static BASE_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<base\s").expect("valid base tag pattern"));

static HEAD_OPEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<head(?:\s[^>]*)?>").expect("valid head pattern"));

/// File extensions of bundled assets that may embed asset URLs.
const ASSET_EXTENSIONS: &[&str] = &["js", "mjs", "css"];

/// Rewrite `src="/assets/..."` and `href="/assets/..."` to `./assets/...`.
pub fn relativize_html_assets(html: &str) -> Cow<'_, str> {
    HTML_ASSET_RE.replace_all(html, "${1}./assets/")
}

/// Rewrite root-relative `/assets/` references inside scripts and styles.
pub fn relativize_code_assets(code: &str) -> Cow<'_, str> {
    CODE_ASSET_RE.replace_all(code, "${1}./assets/")
}

/// Insert `<base href>` right after `<head>`, unless the page already has one.
pub fn inject_base_href<'a>(html: &'a str, href: &str) -> Cow<'a, str> {
    if BASE_TAG_RE.is_match(html) {
        return Cow::Borrowed(html);
    }

    match HEAD_OPEN_RE.find(html) {
        Some(head) => {
            let mut out = String::with_capacity(html.len() + href.len() + 24);
            out.push_str(&html[..head.end()]);
            out.push_str(&format!("\n    <base href=\"{}\">", href));
            out.push_str(&html[head.end()..]);
            Cow::Owned(out)
        }
        None => Cow::Borrowed(html),
    }
}

/// `<base href>` value for a step served under `path_prefix` (slash-terminated).
pub fn step_base_href(path_prefix: &str, step_id: &str) -> String {
    format!("{}{}/", path_prefix, step_id)
}

/// Normalize a built step directory in place.
///
/// Rewrites `index.html` and every script or stylesheet under `assets/`.
/// Returns the number of files changed.
pub fn normalize_step_output(step_dir: &Path, base_href: &str) -> Result<usize, BuildError> {
    let mut changed = 0;

    let index_path = step_dir.join("index.html");
    if index_path.is_file() {
        let html = read_text(&index_path)?;
        let relative = relativize_html_assets(&html);
        let next = inject_base_href(&relative, base_href);
        if next != html {
            write_text(&index_path, &next)?;
            changed += 1;
        }
    }

    let assets_dir = step_dir.join("assets");
    if !assets_dir.is_dir() {
        return Ok(changed);
    }

    for entry in WalkDir::new(&assets_dir).into_iter().filter_map(|e| e.ok()) {
        let path = entry.path();
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if !entry.file_type().is_file() || !ASSET_EXTENSIONS.contains(&ext) {
            continue;
        }

        let Ok(content) = std::fs::read_to_string(path) else {
            // Binary or non-UTF-8 bundle output has nothing to rewrite.
            continue;
        };
        if let Cow::Owned(next) = relativize_code_assets(&content) {
            write_text(path, &next)?;
            changed += 1;
        }
    }

    Ok(changed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn rewrites_root_relative_asset_links() {
        let html = r#"<script type="module" src="/assets/app.js"></script><link href='/assets/app.css'>"#;

        let out = relativize_html_assets(html);

        assert_eq!(
            out,
            r#"<script type="module" src="./assets/app.js"></script><link href='./assets/app.css'>"#
        );
    }

    #[test]
    fn leaves_relative_links_alone() {
        let html = r#"<script src="./assets/app.js"></script><a href="https://x.dev/assets/y">y</a>"#;

        assert!(matches!(relativize_html_assets(html), Cow::Borrowed(_)));
    }

    #[test]
    fn rewrites_code_references_once() {
        let js = r#"import("/assets/chunk.js");const a="./assets/b.png";url(/assets/f.woff)"#;

        let once = relativize_code_assets(js).into_owned();
        let twice = relativize_code_assets(&once).into_owned();

        assert_eq!(
            once,
            r#"import("./assets/chunk.js");const a="./assets/b.png";url(./assets/f.woff)"#
        );
        assert_eq!(twice, once);
    }

    #[test]
    fn code_urls_with_hosts_are_untouched() {
        let css = "background:url(https://cdn.example.com/assets/bg.png)";

        assert!(matches!(relativize_code_assets(css), Cow::Borrowed(_)));
    }

    #[test]
    fn injects_base_after_head() {
        let html = "<html><head lang=\"en\"><title>x</title></head><body><header></header></body></html>";

        let out = inject_base_href(html, "/viewer/step-01/");

        assert_eq!(
            out,
            "<html><head lang=\"en\">\n    <base href=\"/viewer/step-01/\"><title>x</title></head><body><header></header></body></html>"
        );
    }

    #[test]
    fn keeps_existing_base() {
        let html = "<head><BASE href=\"/\"></head>";

        assert!(matches!(inject_base_href(html, "/step-01/"), Cow::Borrowed(_)));
    }

    #[test]
    fn base_href_joins_prefix() {
        assert_eq!(step_base_href("/", "step-01"), "/step-01/");
        assert_eq!(step_base_href("/viewer/", "step-02"), "/viewer/step-02/");
    }

    #[test]
    fn normalizes_a_step_directory() {
        let temp = tempdir().unwrap();
        let step = temp.path();
        fs::create_dir_all(step.join("assets/nested")).unwrap();
        fs::write(
            step.join("index.html"),
            "<html><head><script src=\"/assets/index.js\"></script></head></html>",
        )
        .unwrap();
        fs::write(step.join("assets/index.js"), "import('/assets/x.js')").unwrap();
        fs::write(step.join("assets/nested/style.css"), "a{}").unwrap();
        fs::write(step.join("assets/logo.svg"), "<svg href=\"/assets/x\"/>").unwrap();

        let changed = normalize_step_output(step, "/step-01/").unwrap();

        assert_eq!(changed, 2);
        let index = fs::read_to_string(step.join("index.html")).unwrap();
        assert!(index.contains("src=\"./assets/index.js\""));
        assert!(index.contains("<base href=\"/step-01/\">"));
        assert_eq!(
            fs::read_to_string(step.join("assets/index.js")).unwrap(),
            "import('./assets/x.js')"
        );
        assert_eq!(
            fs::read_to_string(step.join("assets/logo.svg")).unwrap(),
            "<svg href=\"/assets/x\"/>"
        );
    }
}
