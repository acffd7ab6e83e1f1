//! Static site builder.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Instant;

use stepview_md::{render_markdown, wrap_prose};

use crate::config::{ViewerConfig, CONFIG_FILE, SITE_CONFIG_FILE};
use crate::discovery::{Discovery, StepSource};
use crate::error::BuildError;
use crate::fs::{ensure_dir, remove_dir, write_json, write_text};
use crate::manifest::{write_manifest, StepRecord, MANIFEST_FILE};
use crate::shell::ShellPages;
use crate::step::StepBuilder;
use crate::toolchain::{has_package, SystemToolchain, Toolchain};
use crate::verify::verify_full_build;

/// Configuration for building the site.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// Project root: the repository holding the step tags, folders and docs
    pub root: PathBuf,

    /// Output directory, wiped on every build
    pub site_dir: PathBuf,

    /// Shell application bundled into the site root, if it has a package
    pub viewer_app_dir: PathBuf,

    /// Optional overrides for the "missing notes/prompt" fragments
    pub templates_dir: PathBuf,

    /// Minify the shell stylesheet
    pub minify: bool,

    /// Skip discovery and emit the two placeholder steps
    pub mock: bool,

    /// Run the post-build guardrail
    pub verify: bool,
}

impl SiteConfig {
    /// Default layout under a project root.
    pub fn for_root(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            site_dir: root.join("site"),
            viewer_app_dir: root.join("viewer").join("viewer-app"),
            templates_dir: root.join("viewer").join("templates"),
            root,
            minify: true,
            mock: false,
            verify: true,
        }
    }

    /// Path of the project's viewer configuration.
    pub fn config_path(&self) -> PathBuf {
        self.root.join(CONFIG_FILE)
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self::for_root(".")
    }
}

/// How the steps of a build were obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildMode {
    /// Steps discovered in the project and built from it
    Integrated,
    /// Placeholder steps, used when the project has none
    Mock,
}

impl fmt::Display for BuildMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integrated => f.write_str("integrated"),
            Self::Mock => f.write_str("mock"),
        }
    }
}

/// Result of a build operation.
#[derive(Debug)]
pub struct BuildResult {
    /// Steps written to the manifest, in order
    pub steps: Vec<StepRecord>,

    /// Integrated or mock
    pub mode: BuildMode,

    /// Where the step ids came from
    pub source: StepSource,

    /// Number of failures tolerated across all steps
    pub tolerated: usize,

    /// Total build time in milliseconds
    pub duration_ms: u64,

    /// Output directory
    pub output_dir: PathBuf,
}

/// Builds the whole site: shell app, config, steps, manifest and shell pages.
pub struct SiteBuilder<T: Toolchain = SystemToolchain> {
    config: SiteConfig,
    toolchain: T,
}

impl SiteBuilder<SystemToolchain> {
    /// Create a builder using the system's npm toolchain.
    pub fn new(config: SiteConfig) -> Self {
        Self::with_toolchain(config, SystemToolchain::new())
    }
}

impl<T: Toolchain> SiteBuilder<T> {
    /// Create a builder with a custom toolchain.
    pub fn with_toolchain(config: SiteConfig, toolchain: T) -> Self {
        Self { config, toolchain }
    }

    /// Build the site.
    pub fn build(&self) -> Result<BuildResult, BuildError> {
        let start = Instant::now();
        let site = &self.config.site_dir;

        remove_dir(site)?;
        ensure_dir(site)?;

        self.build_viewer_app()?;

        let viewer_config = ViewerConfig::load_or_create(&self.config.config_path())?;
        write_json(&site.join(SITE_CONFIG_FILE), &viewer_config)?;
        tracing::info!("Emitted {}", SITE_CONFIG_FILE);

        let shell = ShellPages::new(viewer_config.clone())?
            .with_templates_dir(&self.config.templates_dir)?
            .minify(self.config.minify);

        let discovered = if self.config.mock {
            None
        } else {
            Some(Discovery::new(&self.config.root).discover()).filter(|d| !d.is_empty())
        };

        let (mode, source, steps, tolerated) = match discovered {
            Some(discovered) => {
                tracing::info!(
                    "Integrated mode: building {} step(s) from {}",
                    discovered.ids.len(),
                    discovered.source
                );
                let builder = StepBuilder::new(&self.config.root, site, &self.toolchain)
                    .use_tags(discovered.source == StepSource::Tags)
                    .path_prefix(viewer_config.path_prefix());

                let mut steps = Vec::new();
                let mut tolerated = 0;
                for id in &discovered.ids {
                    tracing::info!("Building {}...", id);
                    match builder.build(id) {
                        Ok(Some(build)) => {
                            shell.complete_step(&builder.output_dir(id), &build.record)?;
                            tolerated += build.tolerated.len();
                            steps.push(build.record);
                        }
                        Ok(None) => {}
                        Err(e) => tracing::warn!("Skipping {}: {}", id, e),
                    }
                }
                (BuildMode::Integrated, discovered.source, steps, tolerated)
            }
            None => {
                tracing::info!("Standalone mode: generating mock step artifacts");
                let steps = self.write_mock_steps(&shell)?;
                (BuildMode::Mock, StepSource::None, steps, 0)
            }
        };

        write_manifest(&site.join(MANIFEST_FILE), &steps)?;
        tracing::info!("Emitted {} with {} step(s)", MANIFEST_FILE, steps.len());

        let wrappers = shell.write_all(site, &steps)?;
        tracing::debug!("Wrote {} step wrapper page(s)", wrappers);

        if self.config.verify {
            verify_full_build(site)?;
        }

        Ok(BuildResult {
            steps,
            mode,
            source,
            tolerated,
            duration_ms: start.elapsed().as_millis() as u64,
            output_dir: site.clone(),
        })
    }

    /// Bundle the shell application into the site root. Failure is fatal.
    fn build_viewer_app(&self) -> Result<(), BuildError> {
        let app = &self.config.viewer_app_dir;
        if !has_package(app) {
            tracing::debug!("No viewer app at {}", app.display());
            return Ok(());
        }

        tracing::info!("Building viewer app into {}...", self.config.site_dir.display());
        self.toolchain.bundle(app, &self.config.site_dir, None)?;
        Ok(())
    }

    fn write_mock_steps(&self, shell: &ShellPages) -> Result<Vec<StepRecord>, BuildError> {
        let steps = vec![
            mock_record(1, "Mock step with docs", true),
            mock_record(2, "Mock step missing docs", false),
        ];

        for step in &steps {
            let step_dir = self.config.site_dir.join(&step.id);
            ensure_dir(&step_dir)?;
            shell.write_mock_step(&step_dir, step)?;

            let notes = if step.has_notes {
                mock_doc("Mock notes", "Sample notes for this step.")
            } else {
                shell.missing_notes_html()?
            };
            let prompt = if step.has_prompt {
                mock_doc("Mock prompt", "Sample prompt for this step.")
            } else {
                shell.missing_prompt_html()?
            };
            write_text(&step_dir.join("notes.html"), &notes)?;
            write_text(&step_dir.join("prompt.html"), &prompt)?;
        }

        Ok(steps)
    }
}

fn mock_record(num: u32, short: &str, has_docs: bool) -> StepRecord {
    let label = crate::manifest::step_label(num, Some(short));
    StepRecord::new(
        format!("step-{}", crate::step_id::pad_num(num)),
        num,
        Some(label),
        Some(short),
        None,
        has_docs,
        has_docs,
    )
}

fn mock_doc(heading: &str, body: &str) -> String {
    wrap_prose(&render_markdown(&format!("# {}\n\n{}\n", heading, body)))
}

/// Whether `root` contains a built site.
pub fn has_site(site: &Path) -> bool {
    site.join(MANIFEST_FILE).is_file()
}
