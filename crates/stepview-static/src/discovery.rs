//! Step discovery: git tags, then `step-*` folders, then a `steps.json` manifest.

use std::fmt;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::fs::{list_dirs, read_json};
use crate::git::list_tags;
use crate::step_id::parse_step_num;

/// Manifest file listing steps explicitly, at the project root.
pub const STEPS_MANIFEST: &str = "steps.json";

/// Where a list of steps came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepSource {
    /// `step-<n>` git tags
    Tags,
    /// `step-<n>` directories in the project root
    Folders,
    /// The project's `steps.json`
    Manifest,
    /// Nothing found
    None,
}

impl fmt::Display for StepSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Tags => "git tags",
            Self::Folders => "step folders",
            Self::Manifest => STEPS_MANIFEST,
            Self::None => "none",
        };
        f.write_str(name)
    }
}

/// Result of step discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discovered {
    /// Source that produced the ids
    pub source: StepSource,

    /// Step ids in build order
    pub ids: Vec<String>,
}

impl Discovered {
    /// Whether any steps were found.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Discovers steps in a project root.
///
/// Sources are tried in priority order and the first non-empty one wins;
/// results are never merged. Errors in any source count as "no results".
#[derive(Debug, Clone)]
pub struct Discovery {
    root: PathBuf,
}

impl Discovery {
    /// Create a discovery rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Project root being searched.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Discover steps from the highest-priority source that has any.
    pub fn discover(&self) -> Discovered {
        let sources: [(StepSource, fn(&Self) -> Vec<String>); 3] = [
            (StepSource::Tags, Self::from_tags),
            (StepSource::Folders, Self::from_folders),
            (StepSource::Manifest, Self::from_manifest),
        ];

        for (source, find) in sources {
            let ids = find(self);
            if !ids.is_empty() {
                tracing::info!("Discovered {} steps from {}", ids.len(), source);
                return Discovered { source, ids };
            }
        }

        tracing::info!("No steps discovered in {}", self.root.display());
        Discovered {
            source: StepSource::None,
            ids: Vec::new(),
        }
    }

    /// Step tags, numerically ordered.
    pub fn from_tags(&self) -> Vec<String> {
        match list_tags(&self.root) {
            Ok(tags) => sort_by_step_num(tags),
            Err(e) => {
                tracing::debug!("No tags from {}: {}", self.root.display(), e);
                Vec::new()
            }
        }
    }

    /// Step folders in the project root, numerically ordered.
    pub fn from_folders(&self) -> Vec<String> {
        sort_by_step_num(list_dirs(&self.root))
    }

    /// Ids listed in `steps.json`, in file order.
    ///
    /// Accepts an array of id strings, an array of objects with an `id`
    /// field, or an object wrapping either under `steps`.
    pub fn from_manifest(&self) -> Vec<String> {
        let path = self.root.join(STEPS_MANIFEST);
        if !path.is_file() {
            return Vec::new();
        }

        match read_json::<Value>(&path) {
            Ok(data) => manifest_ids(&data),
            Err(e) => {
                tracing::debug!("Ignoring {}: {}", path.display(), e);
                Vec::new()
            }
        }
    }
}

/// Keep step ids only and order them by numeric suffix.
///
/// The sort is stable: equal numbers (`step-1`, `step-01`) keep input order.
fn sort_by_step_num(names: Vec<String>) -> Vec<String> {
    let mut steps: Vec<(u32, String)> = names
        .into_iter()
        .filter_map(|name| parse_step_num(&name).map(|num| (num, name)))
        .collect();
    steps.sort_by_key(|(num, _)| *num);
    steps.into_iter().map(|(_, name)| name).collect()
}

fn manifest_ids(data: &Value) -> Vec<String> {
    let entries: &[Value] = match data {
        Value::Array(entries) => entries.as_slice(),
        Value::Object(map) => match map.get("steps") {
            Some(Value::Array(entries)) => entries.as_slice(),
            _ => &[],
        },
        _ => &[],
    };

    entries
        .iter()
        .filter_map(|entry| match entry {
            Value::String(id) => Some(id.as_str()),
            Value::Object(obj) => obj.get("id").and_then(Value::as_str),
            _ => None,
        })
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}
