//! Building a single step into `<site>/<step-id>/`.
//!
//! A step is built from its git tag when tags are in use, checked out into an
//! ephemeral [`Worktree`], and otherwise from a `step-*` folder in the project
//! root. Either way its docs are rendered next to the app and the emitted asset
//! paths are made relative.

use std::path::{Path, PathBuf};

use stepview_md::{render_file, wrap_prose};

use crate::error::BuildError;
use crate::fs::{copy_dir, ensure_dir, remove_dir, write_text};
use crate::manifest::StepRecord;
use crate::normalize::{normalize_step_output, step_base_href};
use crate::step_id::StepId;
use crate::toolchain::{
    find_bundler_config, has_package, has_script, patch_base_to_relative, BestEffort, Toolchain,
};
use crate::worktree::Worktree;

/// Asset base passed to the bundler.
const RELATIVE_BASE: &str = "./";

/// Outcome of a successful step build.
#[derive(Debug)]
pub struct StepBuild {
    /// Manifest entry for the step
    pub record: StepRecord,

    /// Failures that were tolerated along the way
    pub tolerated: Vec<BestEffort>,
}

/// Docs found for a step.
#[derive(Debug, Default)]
struct StepDocs {
    title: Option<String>,
    short: Option<String>,
    has_notes: bool,
    has_prompt: bool,
}

/// Where the app of a step is built from.
#[derive(Clone, Copy)]
enum Source<'p> {
    /// A fresh worktree checkout
    Checkout(&'p Path),
    /// A folder of the working copy
    Folder(&'p Path),
}

impl<'p> Source<'p> {
    fn dir(self) -> &'p Path {
        match self {
            Self::Checkout(dir) | Self::Folder(dir) => dir,
        }
    }
}

/// Builds individual steps.
pub struct StepBuilder<'a, T: Toolchain> {
    repo_root: &'a Path,
    site_dir: &'a Path,
    toolchain: &'a T,
    use_tags: bool,
    path_prefix: String,
}

impl<'a, T: Toolchain> StepBuilder<'a, T> {
    /// Create a builder writing steps under `site_dir`.
    pub fn new(repo_root: &'a Path, site_dir: &'a Path, toolchain: &'a T) -> Self {
        Self {
            repo_root,
            site_dir,
            toolchain,
            use_tags: false,
            path_prefix: "/".to_string(),
        }
    }

    /// Try a tag build before falling back to the step folder.
    pub fn use_tags(mut self, use_tags: bool) -> Self {
        self.use_tags = use_tags;
        self
    }

    /// URL prefix the site is deployed under, used for `<base href>`.
    pub fn path_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.path_prefix = prefix.into();
        self
    }

    /// Output directory of a step.
    pub fn output_dir(&self, step_id: &str) -> PathBuf {
        self.site_dir.join(step_id)
    }

    /// Build one step.
    ///
    /// Returns `Ok(None)` when the id is not a step identifier or there is
    /// nothing to build it from. Errors leave no output directory behind.
    pub fn build(&self, step_id: &str) -> Result<Option<StepBuild>, BuildError> {
        let Some(id) = StepId::parse(step_id) else {
            tracing::warn!("Skipping {}: not a step identifier", step_id);
            return Ok(None);
        };

        let out_dir = self.output_dir(id.as_str());
        reset_dir(&out_dir)?;

        let result = self.build_into(&id, &out_dir);
        if !matches!(result, Ok(Some(_))) {
            remove_dir(&out_dir)?;
        }
        result
    }

    fn build_into(&self, id: &StepId, out_dir: &Path) -> Result<Option<StepBuild>, BuildError> {
        let mut tolerated = Vec::new();
        let mut tag = None;
        let mut docs = None;

        if self.use_tags {
            match self.build_from_tag(id, out_dir, &mut tolerated) {
                Ok(found) => {
                    docs = Some(found);
                    tag = Some(id.to_string());
                }
                Err(e) => {
                    tracing::warn!("Tag build of {} failed, trying folder: {}", id, e);
                    reset_dir(out_dir)?;
                }
            }
        }

        let docs = match docs {
            Some(docs) => docs,
            None => match self.build_from_folder(id, out_dir, &mut tolerated)? {
                Some(docs) => docs,
                None => {
                    tracing::warn!("Skipping {}: no tag or folder to build from", id);
                    return Ok(None);
                }
            },
        };

        let base_href = step_base_href(&self.path_prefix, id.as_str());
        let changed = normalize_step_output(out_dir, &base_href)?;
        tracing::debug!("Normalized {} file(s) in {}", changed, out_dir.display());

        let record = StepRecord::new(
            id.as_str(),
            id.num(),
            docs.title.clone(),
            docs.short.as_deref().or(docs.title.as_deref()),
            tag,
            docs.has_notes,
            docs.has_prompt,
        );

        tracing::info!("Built {} ({})", record.id, record.title);

        Ok(Some(StepBuild { record, tolerated }))
    }

    fn build_from_tag(
        &self,
        id: &StepId,
        out_dir: &Path,
        tolerated: &mut Vec<BestEffort>,
    ) -> Result<StepDocs, BuildError> {
        let worktree = Worktree::checkout(self.repo_root, id.as_str())?;
        let tree = worktree.path();

        self.build_app(Source::Checkout(tree), out_dir, tolerated)?;
        render_docs(tree, id, out_dir)
    }

    fn build_from_folder(
        &self,
        id: &StepId,
        out_dir: &Path,
        tolerated: &mut Vec<BestEffort>,
    ) -> Result<Option<StepDocs>, BuildError> {
        let step_dir = self.repo_root.join(id.as_str());
        if !step_dir.is_dir() {
            return Ok(None);
        }

        let built = self.build_app(Source::Folder(&step_dir), out_dir, tolerated)?;

        if !built {
            let root_dist = self.repo_root.join("dist");
            if has_package(self.repo_root) && root_dist.is_dir() {
                tracing::debug!("Using the project's dist for {}", id);
                copy_dir(&root_dist, out_dir)?;
            }
        }

        render_docs(self.repo_root, id, out_dir).map(Some)
    }

    /// Build the app in `source` into `out_dir`.
    ///
    /// Returns whether anything was produced. A bundler failure is only
    /// propagated when the build script fallback yields nothing either.
    fn build_app(
        &self,
        source: Source<'_>,
        out_dir: &Path,
        tolerated: &mut Vec<BestEffort>,
    ) -> Result<bool, BuildError> {
        let dir = source.dir();
        let dist = dir.join("dist");

        if !has_package(dir) {
            if dist.is_dir() {
                copy_dir(&dist, out_dir)?;
                return Ok(true);
            }
            return Ok(false);
        }

        // A fresh checkout has no node_modules.
        if let Source::Checkout(tree) = source {
            tolerated.extend(BestEffort::tolerate(
                "dependency install",
                self.toolchain.install(tree),
            ));
        }

        if find_bundler_config(dir).is_none() {
            if matches!(source, Source::Checkout(_)) && dist.is_dir() {
                copy_dir(&dist, out_dir)?;
                return Ok(true);
            }
            return self.build_script(dir, out_dir, tolerated);
        }

        if let Source::Checkout(tree) = source {
            patch_base_to_relative(tree)?;
        }

        match self.toolchain.bundle(dir, out_dir, Some(RELATIVE_BASE)) {
            Ok(()) => Ok(true),
            Err(e) => {
                tracing::warn!(
                    "Bundling {} failed, trying its build script: {}",
                    dir.display(),
                    e
                );
                reset_dir(out_dir)?;
                if self.build_script(dir, out_dir, tolerated)? {
                    Ok(true)
                } else {
                    Err(e.into())
                }
            }
        }
    }

    /// Run the package's `build` script and copy its `dist`.
    fn build_script(
        &self,
        dir: &Path,
        out_dir: &Path,
        tolerated: &mut Vec<BestEffort>,
    ) -> Result<bool, BuildError> {
        if has_script(dir, "build") {
            tolerated.extend(BestEffort::tolerate(
                "build script",
                self.toolchain.run_script(dir, "build"),
            ));
        }

        let dist = dir.join("dist");
        if dist.is_dir() {
            copy_dir(&dist, out_dir)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

fn reset_dir(dir: &Path) -> Result<(), BuildError> {
    remove_dir(dir)?;
    ensure_dir(dir)
}

/// Notes file of a step under `docs_root`.
pub fn notes_path(docs_root: &Path, id: &StepId) -> PathBuf {
    docs_root
        .join("docs")
        .join("agent-notes")
        .join(format!("{}.md", id.digits()))
}

/// Prompt file of a step under `docs_root`; `step-NN.md` wins over `NN.md`.
pub fn prompt_path(docs_root: &Path, id: &StepId) -> Option<PathBuf> {
    let prompts = docs_root.join("docs").join("prompts");
    [
        format!("step-{}.md", id.digits()),
        format!("{}.md", id.digits()),
    ]
    .into_iter()
    .map(|name| prompts.join(name))
    .find(|path| path.is_file())
}

/// Manifest entry for a step from the docs under `docs_root`, without
/// building anything.
pub fn describe_step(docs_root: &Path, id: &StepId) -> Result<StepRecord, BuildError> {
    let notes = notes_path(docs_root, id);
    let (title, short) = if notes.is_file() {
        let doc = render_file(&notes)?;
        let short = doc.short_title().map(str::to_string);
        (doc.title, short)
    } else {
        (None, None)
    };

    Ok(StepRecord::new(
        id.as_str(),
        id.num(),
        title.clone(),
        short.as_deref().or(title.as_deref()),
        None,
        notes.is_file(),
        prompt_path(docs_root, id).is_some(),
    ))
}

/// Render notes and prompt into `notes.html` / `prompt.html`.
fn render_docs(docs_root: &Path, id: &StepId, out_dir: &Path) -> Result<StepDocs, BuildError> {
    let mut docs = StepDocs::default();

    let notes = notes_path(docs_root, id);
    if notes.is_file() {
        let doc = render_file(&notes)?;
        if let Some(e) = &doc.frontmatter_error {
            tracing::warn!("{}: {}", notes.display(), e);
        }
        write_text(&out_dir.join("notes.html"), &wrap_prose(&doc.html))?;
        docs.has_notes = true;
        docs.short = doc.short_title().map(str::to_string);
        docs.title = doc.title;
    }

    if let Some(prompt) = prompt_path(docs_root, id) {
        let doc = render_file(&prompt)?;
        write_text(&out_dir.join("prompt.html"), &wrap_prose(&doc.html))?;
        docs.has_prompt = true;
    }

    Ok(docs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::{git_available, testing};
    use crate::toolchain::testing::FakeToolchain;
    use std::fs;
    use tempfile::TempDir;

    struct Project {
        root: TempDir,
        site: TempDir,
    }

    impl Project {
        fn new() -> Self {
            Self {
                root: TempDir::new().unwrap(),
                site: TempDir::new().unwrap(),
            }
        }

        fn write(&self, rel: &str, content: &str) {
            let path = self.root.path().join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }

        fn read_site(&self, rel: &str) -> String {
            fs::read_to_string(self.site.path().join(rel)).unwrap()
        }

        fn builder<'a>(&'a self, toolchain: &'a FakeToolchain) -> StepBuilder<'a, FakeToolchain> {
            StepBuilder::new(self.root.path(), self.site.path(), toolchain)
        }
    }

    #[test]
    fn bundles_a_step_folder() {
        let project = Project::new();
        project.write("step-01/package.json", "{}");
        project.write("step-01/vite.config.js", "export default {}");
        project.write("docs/agent-notes/01.md", "# Scaffold the *app*\n\nBody.");
        project.write("docs/prompts/01.md", "Build it.");
        let toolchain = FakeToolchain::default();

        let build = project.builder(&toolchain).build("step-01").unwrap().unwrap();

        assert_eq!(build.record.title, "Scaffold the app");
        assert_eq!(build.record.label, "Step 01 — Scaffold the app");
        assert_eq!(build.record.tag, None);
        assert!(build.record.has_notes);
        assert!(build.record.has_prompt);
        assert!(build.tolerated.is_empty());

        let calls = toolchain.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].starts_with("bundle ") && calls[0].ends_with("base=./"));

        let index = project.read_site("step-01/index.html");
        assert!(index.contains("src=\"./assets/app.js\""));
        assert!(index.contains("<base href=\"/step-01/\">"));
        assert_eq!(
            project.read_site("step-01/assets/app.js"),
            "import(\"./assets/chunk.js\");"
        );
        assert!(project
            .read_site("step-01/notes.html")
            .starts_with("<div class=\"prose\">"));
    }

    #[test]
    fn falls_back_to_build_script_when_bundling_fails() {
        let project = Project::new();
        project.write("step-02/package.json", r#"{"scripts":{"build":"vite build"}}"#);
        project.write("step-02/vite.config.ts", "export default {}");
        let toolchain = FakeToolchain::failing(&["bundle"]);

        let build = project.builder(&toolchain).build("step-02").unwrap().unwrap();

        assert_eq!(build.record.title, "Step 02");
        assert_eq!(build.record.label, "Step 02");
        assert!(!build.record.has_notes);
        assert!(project.read_site("step-02/index.html").contains("<title>script</title>"));
        assert_eq!(toolchain.calls().len(), 2);
    }

    #[test]
    fn bundler_failure_without_fallback_skips_the_step() {
        let project = Project::new();
        project.write("step-03/package.json", "{}");
        project.write("step-03/vite.config.js", "export default {}");
        let toolchain = FakeToolchain::failing(&["bundle"]);

        let err = project.builder(&toolchain).build("step-03").unwrap_err();

        assert!(matches!(err, BuildError::Tool(_)));
        assert!(!project.site.path().join("step-03").exists());
    }

    #[test]
    fn runs_build_script_without_bundler_config() {
        let project = Project::new();
        project.write("step-04/package.json", r#"{"scripts":{"build":"make"}}"#);
        let toolchain = FakeToolchain::default();

        project.builder(&toolchain).build("step-04").unwrap().unwrap();

        let calls = toolchain.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].starts_with("script build "));
        assert!(project.site.path().join("step-04/index.html").is_file());
    }

    #[test]
    fn tolerates_a_failing_build_script() {
        let project = Project::new();
        project.write("step-05/package.json", r#"{"scripts":{"build":"make"}}"#);
        project.write("docs/agent-notes/05.md", "# Notes only");
        let toolchain = FakeToolchain::failing(&["script"]);

        let build = project.builder(&toolchain).build("step-05").unwrap().unwrap();

        assert_eq!(build.tolerated.len(), 1);
        assert_eq!(build.tolerated[0].action, "build script");
        assert_eq!(build.record.title, "Notes only");
        assert!(!project.site.path().join("step-05/index.html").exists());
    }

    #[test]
    fn copies_prebuilt_and_project_dist() {
        let project = Project::new();
        project.write("step-06/dist/index.html", "<html><head></head></html>");
        project.write("step-07/README.md", "no app here");
        project.write("package.json", "{}");
        project.write("dist/index.html", "<html><head></head><body>root</body></html>");
        let toolchain = FakeToolchain::default();
        let builder = project.builder(&toolchain);

        builder.build("step-06").unwrap().unwrap();
        builder.build("step-07").unwrap().unwrap();

        assert!(project.read_site("step-06/index.html").contains("<base href=\"/step-06/\">"));
        assert!(project.read_site("step-07/index.html").contains("root"));
        assert!(toolchain.calls().is_empty());
    }

    #[test]
    fn prefers_step_prefixed_prompt() {
        let project = Project::new();
        project.write("step-08/.keep", "");
        project.write("docs/prompts/step-08.md", "# Preferred");
        project.write("docs/prompts/08.md", "# Other");
        let toolchain = FakeToolchain::default();

        project.builder(&toolchain).build("step-08").unwrap().unwrap();

        let prompt = project.read_site("step-08/prompt.html");
        assert!(prompt.contains("Preferred"));
        assert!(!prompt.contains("Other"));
    }

    #[test]
    fn frontmatter_short_title_drives_the_label() {
        let project = Project::new();
        project.write("step-09/.keep", "");
        project.write(
            "docs/agent-notes/09.md",
            "---\nshort: Comments\n---\n# Adding threaded comments",
        );
        let toolchain = FakeToolchain::default();

        let build = project.builder(&toolchain).build("step-09").unwrap().unwrap();

        assert_eq!(build.record.title, "Adding threaded comments");
        assert_eq!(build.record.label, "Step 09 — Comments");
    }

    #[test]
    fn uses_deployment_prefix_for_base_href() {
        let project = Project::new();
        project.write("step-10/dist/index.html", "<html><head></head></html>");
        let toolchain = FakeToolchain::default();

        project
            .builder(&toolchain)
            .path_prefix("/viewer/")
            .build("step-10")
            .unwrap()
            .unwrap();

        assert!(project
            .read_site("step-10/index.html")
            .contains("<base href=\"/viewer/step-10/\">"));
    }

    #[test]
    fn skips_unknown_and_malformed_steps() {
        let project = Project::new();
        let toolchain = FakeToolchain::default();
        let builder = project.builder(&toolchain);

        assert!(builder.build("step-11").unwrap().is_none());
        assert!(builder.build("intro").unwrap().is_none());
        assert!(!project.site.path().join("step-11").exists());
    }

    #[test]
    fn rebuild_replaces_previous_output() {
        let project = Project::new();
        project.write("step-12/.keep", "");
        fs::create_dir_all(project.site.path().join("step-12")).unwrap();
        fs::write(project.site.path().join("step-12/stale.txt"), "old").unwrap();
        let toolchain = FakeToolchain::default();

        project.builder(&toolchain).build("step-12").unwrap().unwrap();

        assert!(!project.site.path().join("step-12/stale.txt").exists());
    }

    #[test]
    fn describes_a_step_from_its_docs() {
        let project = Project::new();
        project.write("docs/agent-notes/04.md", "# Login form");
        let id = StepId::parse("step-04").unwrap();

        let record = describe_step(project.root.path(), &id).unwrap();

        assert_eq!(record.title, "Login form");
        assert_eq!(record.label, "Step 04 — Login form");
        assert!(record.has_notes);
        assert!(!record.has_prompt);
        assert!(!project.site.path().join("step-04").exists());
    }

    #[test]
    fn builds_steps_from_tags() {
        if !git_available() {
            eprintln!("skipping: git not found in PATH");
            return;
        }

        let project = Project::new();
        testing::init(project.root.path());
        project.write("docs/agent-notes/01.md", "# First <em>step</em> &amp; setup\n");
        testing::commit_and_tag(project.root.path(), "step-01");
        project.write("docs/agent-notes/02.md", "# Second step\n");
        project.write("docs/prompts/step-02.md", "Do the second thing.");
        testing::commit_and_tag(project.root.path(), "step-02");
        let toolchain = FakeToolchain::default();
        let builder = project.builder(&toolchain).use_tags(true);

        let first = builder.build("step-01").unwrap().unwrap().record;
        let second = builder.build("step-02").unwrap().unwrap().record;

        assert_eq!(first.title, "First step & setup");
        assert_eq!(first.tag.as_deref(), Some("step-01"));
        assert!(first.has_notes);
        assert!(!first.has_prompt);
        assert_eq!(second.title, "Second step");
        assert!(second.has_notes);
        assert!(second.has_prompt);
        assert!(!Worktree::path_for(project.root.path(), "step-01").exists());
        assert!(!Worktree::path_for(project.root.path(), "step-02").exists());
    }

    #[test]
    fn tag_build_installs_and_tolerates_install_failure() {
        if !git_available() {
            eprintln!("skipping: git not found in PATH");
            return;
        }

        let project = Project::new();
        testing::init(project.root.path());
        project.write("package.json", "{}");
        project.write("vite.config.js", "export default { base: '/' }");
        testing::commit_and_tag(project.root.path(), "step-01");
        let toolchain = FakeToolchain::failing(&["install"]);

        let build = project
            .builder(&toolchain)
            .use_tags(true)
            .build("step-01")
            .unwrap()
            .unwrap();

        assert_eq!(build.record.tag.as_deref(), Some("step-01"));
        assert_eq!(build.tolerated.len(), 1);
        assert_eq!(build.tolerated[0].action, "dependency install");
        let calls = toolchain.calls();
        assert!(calls[0].starts_with("install "));
        assert!(calls[1].starts_with("bundle "));
        assert!(project.read_site("step-01/index.html").contains("bundled"));
    }

    #[test]
    fn tag_build_installs_before_running_the_build_script() {
        if !git_available() {
            eprintln!("skipping: git not found in PATH");
            return;
        }

        let project = Project::new();
        testing::init(project.root.path());
        project.write("package.json", r#"{"scripts":{"build":"webpack"}}"#);
        testing::commit_and_tag(project.root.path(), "step-01");
        let toolchain = FakeToolchain::default();

        let build = project
            .builder(&toolchain)
            .use_tags(true)
            .build("step-01")
            .unwrap()
            .unwrap();

        assert_eq!(build.record.tag.as_deref(), Some("step-01"));
        assert!(build.tolerated.is_empty());
        let calls = toolchain.calls();
        assert_eq!(calls.len(), 2);
        assert!(calls[0].starts_with("install "));
        assert!(calls[1].starts_with("script build "));
        assert!(project.read_site("step-01/index.html").contains("script"));
    }

    #[test]
    fn missing_tag_falls_back_to_folder() {
        if !git_available() {
            eprintln!("skipping: git not found in PATH");
            return;
        }

        let project = Project::new();
        testing::init(project.root.path());
        project.write("step-03/dist/index.html", "<html><head></head></html>");
        testing::commit_and_tag(project.root.path(), "step-01");
        let toolchain = FakeToolchain::default();

        let build = project
            .builder(&toolchain)
            .use_tags(true)
            .build("step-03")
            .unwrap()
            .unwrap();

        assert_eq!(build.record.tag, None);
        assert!(project.site.path().join("step-03/index.html").is_file());
    }
}
