//! The navigational shell around the built steps.
//!
//! Writes the landing and about pages, the shared stylesheet and script, and
//! one wrapper page per step at `view/<step-id>/index.html` that frames the
//! step's own build.

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde_json::{Map, Value};

use crate::assets::AssetPipeline;
use crate::config::ViewerConfig;
use crate::error::BuildError;
use crate::fs::{read_text, write_text};
use crate::i18n::{Catalog, MessageKey};
use crate::manifest::StepRecord;
use crate::templates::{
    PageContext, TemplateEngine, ABOUT, LANDING, MISSING_NOTES, MISSING_PROMPT, PLACEHOLDER_STEP,
    STEP_WRAPPER,
};

/// Directory holding the step wrapper pages.
pub const VIEW_DIR: &str = "view";

/// Relative path from a wrapper page back to the site root.
const WRAPPER_ROOT: &str = "../../";

/// Generates the shell pages for a set of steps.
pub struct ShellPages {
    config: ViewerConfig,
    catalog: Catalog,
    templates: TemplateEngine,
    minify: bool,
    missing_notes: Option<String>,
    missing_prompt: Option<String>,
}

impl ShellPages {
    /// Create a generator for the configured locale.
    pub fn new(config: ViewerConfig) -> Result<Self, BuildError> {
        let catalog = Catalog::load(&config.locale)?;
        Ok(Self {
            config,
            catalog,
            templates: TemplateEngine::new(),
            minify: true,
            missing_notes: None,
            missing_prompt: None,
        })
    }

    /// Use `missing-notes.html` / `missing-prompt.html` from `dir` when present.
    pub fn with_templates_dir(mut self, dir: &Path) -> Result<Self, BuildError> {
        self.missing_notes = read_optional(&dir.join(MISSING_NOTES))?;
        self.missing_prompt = read_optional(&dir.join(MISSING_PROMPT))?;
        Ok(self)
    }

    /// Minify the stylesheet.
    pub fn minify(mut self, minify: bool) -> Self {
        self.minify = minify;
        self
    }

    /// Write every shell page for `steps`.
    ///
    /// The landing page is skipped when `site/index.html` already exists.
    pub fn write_all(&self, site: &Path, steps: &[StepRecord]) -> Result<usize, BuildError> {
        self.write_assets(site)?;
        self.write_about(site, steps)?;

        if site.join("index.html").is_file() {
            tracing::debug!("Keeping existing {}", site.join("index.html").display());
        } else {
            self.write_landing(site, steps)?;
        }

        self.write_wrappers(site, steps)
    }

    /// Write `shell/shell.css` and `shell/shell.js`.
    pub fn write_assets(&self, site: &Path) -> Result<(), BuildError> {
        let shell_dir = site.join("shell");
        write_text(&shell_dir.join("shell.css"), &AssetPipeline::shell_css(self.minify))?;
        write_text(&shell_dir.join("shell.js"), &AssetPipeline::generate_js())
    }

    /// Write the landing page listing every step.
    pub fn write_landing(&self, site: &Path, steps: &[StepRecord]) -> Result<(), BuildError> {
        let ctx = self.context(self.config.site_title.clone(), "./", steps, None);
        let html = self.templates.render(LANDING, &ctx)?;
        write_text(&site.join("index.html"), &html)
    }

    /// Write `about/index.html`.
    pub fn write_about(&self, site: &Path, steps: &[StepRecord]) -> Result<(), BuildError> {
        let title = format!(
            "{} · {}",
            self.catalog.get(MessageKey::About),
            self.config.site_title
        );
        let ctx = self.context(title, "../", steps, None);
        let html = self.templates.render(ABOUT, &ctx)?;
        write_text(&site.join("about").join("index.html"), &html)
    }

    /// Write one wrapper page per step, in parallel.
    pub fn write_wrappers(&self, site: &Path, steps: &[StepRecord]) -> Result<usize, BuildError> {
        steps
            .par_iter()
            .map(|step| {
                let html = self.render_wrapper(steps, step)?;
                write_text(&wrapper_path(site, &step.id), &html)
            })
            .collect::<Result<Vec<()>, BuildError>>()
            .map(|written| written.len())
    }

    /// Render the wrapper page of `current`.
    pub fn render_wrapper(
        &self,
        steps: &[StepRecord],
        current: &StepRecord,
    ) -> Result<String, BuildError> {
        let title = format!("{} · {}", current.label, self.config.site_title);
        let mut ctx = self.context(title, WRAPPER_ROOT, steps, Some(current));
        ctx.shell_script = self.shell_script(&current.id, WRAPPER_ROOT);
        Ok(self.templates.render(STEP_WRAPPER, &ctx)?)
    }

    /// Fill in what a built step is missing: a page when the build produced
    /// no `index.html`, and the "missing" fragments for absent docs.
    pub fn complete_step(&self, step_dir: &Path, step: &StepRecord) -> Result<(), BuildError> {
        if !step_dir.join("index.html").is_file() {
            let summary = self.catalog.get(MessageKey::NoApp).to_string();
            self.write_step_page(step_dir, step, summary)?;
        }
        if !step_dir.join("notes.html").is_file() {
            write_text(&step_dir.join("notes.html"), &self.missing_notes_html()?)?;
        }
        if !step_dir.join("prompt.html").is_file() {
            write_text(&step_dir.join("prompt.html"), &self.missing_prompt_html()?)?;
        }
        Ok(())
    }

    /// Write the placeholder page of a synthesized step.
    pub fn write_mock_step(&self, step_dir: &Path, step: &StepRecord) -> Result<(), BuildError> {
        let summary = self.catalog.get(MessageKey::MockStep).to_string();
        self.write_step_page(step_dir, step, summary)
    }

    /// Fragment shown when a step has no notes.
    pub fn missing_notes_html(&self) -> Result<String, BuildError> {
        match &self.missing_notes {
            Some(html) => Ok(html.clone()),
            None => self.render_fragment(MISSING_NOTES),
        }
    }

    /// Fragment shown when a step has no prompt.
    pub fn missing_prompt_html(&self) -> Result<String, BuildError> {
        match &self.missing_prompt {
            Some(html) => Ok(html.clone()),
            None => self.render_fragment(MISSING_PROMPT),
        }
    }

    fn render_fragment(&self, template: &str) -> Result<String, BuildError> {
        let ctx = self.context(String::new(), WRAPPER_ROOT, &[], None);
        Ok(self.templates.render(template, &ctx)?)
    }

    fn write_step_page(
        &self,
        step_dir: &Path,
        step: &StepRecord,
        summary: String,
    ) -> Result<(), BuildError> {
        let mut ctx = self.context(step.title.clone(), "../", &[], Some(step));
        ctx.summary = summary;
        let html = self.templates.render(PLACEHOLDER_STEP, &ctx)?;
        write_text(&step_dir.join("index.html"), &html)
    }

    fn context(
        &self,
        title: String,
        root: &str,
        steps: &[StepRecord],
        current: Option<&StepRecord>,
    ) -> PageContext {
        let count = steps.len().to_string();
        PageContext {
            title,
            root: root.to_string(),
            lang: self.catalog.locale().to_string(),
            site: self.config.clone(),
            text: self.catalog.to_map(),
            steps: steps.to_vec(),
            current: current.cloned(),
            shell_script: String::new(),
            summary: self
                .catalog
                .format(MessageKey::StepCount, &[("count", &count)]),
        }
    }

    /// Inline script handing the step, root and text to `shell.js`.
    fn shell_script(&self, step_id: &str, root: &str) -> String {
        let text: Map<String, Value> = self
            .catalog
            .to_map()
            .into_iter()
            .map(|(key, message)| (key.to_string(), Value::String(message)))
            .collect();

        [
            ("SHELL_STEP", Value::from(step_id)),
            ("SHELL_ROOT", Value::from(root)),
            ("SHELL_TEXT", Value::Object(text)),
        ]
        .iter()
        .map(|(name, value)| format!("window.{} = {};", name, script_safe(value)))
        .collect::<Vec<_>>()
        .join("\n")
    }
}

/// Path of the wrapper page of a step.
pub fn wrapper_path(site: &Path, step_id: &str) -> PathBuf {
    site.join(VIEW_DIR).join(step_id).join("index.html")
}

/// JSON that cannot close the surrounding `<script>` element.
fn script_safe(value: &Value) -> String {
    value.to_string().replace('<', "\\u003c")
}

fn read_optional(path: &Path) -> Result<Option<String>, BuildError> {
    if path.is_file() {
        read_text(path).map(Some)
    } else {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn steps() -> Vec<StepRecord> {
        vec![
            StepRecord::new("step-01", 1, Some("Scaffold".into()), Some("Scaffold"), None, true, true),
            StepRecord::new("step-02", 2, None, None, None, false, false),
        ]
    }

    fn pages() -> ShellPages {
        ShellPages::new(ViewerConfig::default()).unwrap()
    }

    #[test]
    fn writes_the_whole_shell() {
        let site = TempDir::new().unwrap();

        let written = pages().write_all(site.path(), &steps()).unwrap();

        assert_eq!(written, 2);
        for rel in [
            "index.html",
            "about/index.html",
            "shell/shell.css",
            "shell/shell.js",
            "view/step-01/index.html",
            "view/step-02/index.html",
        ] {
            assert!(site.path().join(rel).is_file(), "missing {}", rel);
        }
        let landing = fs::read_to_string(site.path().join("index.html")).unwrap();
        assert!(landing.contains("2 steps"));
    }

    #[test]
    fn keeps_an_existing_landing_page() {
        let site = TempDir::new().unwrap();
        fs::write(site.path().join("index.html"), "viewer app").unwrap();

        pages().write_all(site.path(), &steps()).unwrap();

        assert_eq!(
            fs::read_to_string(site.path().join("index.html")).unwrap(),
            "viewer app"
        );
    }

    #[test]
    fn wrapper_injects_client_config() {
        let all = steps();

        let html = pages().render_wrapper(&all, &all[0]).unwrap();

        assert!(html.contains("window.SHELL_STEP = \"step-01\";"));
        assert!(html.contains("window.SHELL_ROOT = \"../../\";"));
        assert!(html.contains("\"copy_link\":\"Copy link\""));
        assert!(html.contains("<title>Step 01 — Scaffold · GenAI Incremental Experiment Viewer</title>"));
    }

    #[test]
    fn script_config_cannot_close_the_script_tag() {
        let value = Value::from("</script><script>alert(1)");

        let safe = script_safe(&value);

        assert!(!safe.contains("</script>"));
        assert!(safe.contains("\\u003c/script>"));
    }

    #[test]
    fn localizes_pages() {
        let config = ViewerConfig {
            locale: "fr".to_string(),
            ..Default::default()
        };
        let all = steps();

        let html = ShellPages::new(config).unwrap().render_wrapper(&all, &all[1]).unwrap();

        assert!(html.contains("Notes de l"));
        assert!(html.contains("<html lang=\"fr\">"));
    }

    #[test]
    fn unknown_locale_declares_the_fallback_language() {
        let config = ViewerConfig {
            locale: "de".to_string(),
            ..Default::default()
        };
        let all = steps();

        let html = ShellPages::new(config).unwrap().render_wrapper(&all, &all[0]).unwrap();

        assert!(html.contains("<html lang=\"en\">"));
        assert!(!html.contains("lang=\"de\""));
    }

    #[test]
    fn completes_steps_without_app_or_docs() {
        let site = TempDir::new().unwrap();
        let step_dir = site.path().join("step-02");
        fs::create_dir_all(&step_dir).unwrap();
        fs::write(step_dir.join("notes.html"), "<div class=\"prose\">real</div>").unwrap();

        pages().complete_step(&step_dir, &steps()[1]).unwrap();

        let index = fs::read_to_string(step_dir.join("index.html")).unwrap();
        assert!(index.contains("<h1>Step 02</h1>"));
        assert!(index.contains("no app build"));
        assert_eq!(
            fs::read_to_string(step_dir.join("notes.html")).unwrap(),
            "<div class=\"prose\">real</div>"
        );
        assert!(fs::read_to_string(step_dir.join("prompt.html"))
            .unwrap()
            .contains("No prompt was recorded"));
    }

    #[test]
    fn missing_fragments_come_from_the_templates_dir() {
        let templates = TempDir::new().unwrap();
        fs::write(templates.path().join("missing-notes.html"), "<p>custom</p>").unwrap();

        let pages = pages().with_templates_dir(templates.path()).unwrap();

        assert_eq!(pages.missing_notes_html().unwrap(), "<p>custom</p>");
        assert!(pages.missing_prompt_html().unwrap().contains("prose-missing"));
    }
}
