//! The steps manifest (`steps.json` at the site root).

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::BuildError;
use crate::fs::{read_json, write_json};
use crate::step_id::pad_num;

/// File name of the manifest in the site output.
pub const MANIFEST_FILE: &str = "steps.json";

/// One built step, as listed in the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepRecord {
    pub id: String,
    pub num: u32,
    pub title: String,
    pub tag: Option<String>,
    pub has_notes: bool,
    pub has_prompt: bool,
    pub label: String,
}

impl StepRecord {
    /// Create a record, deriving the title fallback and the label.
    ///
    /// An empty `title` becomes `"Step NN"`. The label is `"Step NN — <short>"`
    /// when a short title is known, else `"Step NN"`.
    pub fn new(
        id: impl Into<String>,
        num: u32,
        title: Option<String>,
        short: Option<&str>,
        tag: Option<String>,
        has_notes: bool,
        has_prompt: bool,
    ) -> Self {
        Self {
            id: id.into(),
            num,
            title: title
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| default_title(num)),
            tag,
            has_notes,
            has_prompt,
            label: step_label(num, short),
        }
    }
}

/// `"Step NN"` for a step number.
pub fn default_title(num: u32) -> String {
    format!("Step {}", pad_num(num))
}

/// Label shown in the step selector.
pub fn step_label(num: u32, short: Option<&str>) -> String {
    match short.map(str::trim).filter(|s| !s.is_empty()) {
        Some(short) => format!("Step {} — {}", pad_num(num), short),
        None => default_title(num),
    }
}

/// Write the manifest in the given order.
pub fn write_manifest(path: &Path, steps: &[StepRecord]) -> Result<(), BuildError> {
    write_json(path, steps)
}

/// Read a manifest back.
pub fn read_manifest(path: &Path) -> Result<Vec<StepRecord>, BuildError> {
    read_json(path)
}
