//! Step identifiers (`step-01`, `step-12`, ...).

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

static STEP_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^step-([0-9]+)$").expect("valid step id pattern"));

/// A parsed step identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StepId {
    id: String,
    digits: String,
    num: u32,
}

impl StepId {
    /// Parse `step-<digits>`, case-insensitively.
    ///
    /// Returns `None` for anything else, including suffixes too large for a `u32`.
    pub fn parse(id: &str) -> Option<Self> {
        let digits = STEP_ID_RE.captures(id)?.get(1)?.as_str();
        let num = digits.parse().ok()?;

        Some(Self {
            id: id.to_string(),
            digits: digits.to_string(),
            num,
        })
    }

    /// The identifier as discovered (tag, folder or manifest entry).
    pub fn as_str(&self) -> &str {
        &self.id
    }

    /// The digit suffix exactly as written, leading zeros included.
    pub fn digits(&self) -> &str {
        &self.digits
    }

    /// Numeric value of the suffix, the canonical sort key.
    pub fn num(&self) -> u32 {
        self.num
    }

    /// Number zero-padded to two digits, as shown in labels.
    pub fn padded(&self) -> String {
        pad_num(self.num)
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

/// Numeric suffix of a step identifier.
pub fn parse_step_num(id: &str) -> Option<u32> {
    StepId::parse(id).map(|s| s.num)
}

/// Zero-pad a step number to two digits.
pub fn pad_num(num: u32) -> String {
    format!("{:02}", num)
}

/// Normalize a route parameter to the canonical `step-XX` form.
///
/// Accepts `"01"`, `"7"` or `"step-01"` (any case).
pub fn normalize_step_param(param: &str) -> Option<String> {
    let trimmed = param.trim();

    if STEP_ID_RE.is_match(trimmed) {
        return Some(trimmed.to_lowercase());
    }

    if !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_digit()) {
        return Some(format!("step-{:0>2}", trimmed));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suffix_ignores_leading_zeros() {
        assert_eq!(parse_step_num("step-01"), Some(1));
        assert_eq!(parse_step_num("step-007"), Some(7));
        assert_eq!(parse_step_num("step-10"), Some(10));
        assert_eq!(parse_step_num("STEP-3"), Some(3));
    }

    #[test]
    fn rejects_non_step_ids() {
        assert_eq!(parse_step_num("step-"), None);
        assert_eq!(parse_step_num("step-1a"), None);
        assert_eq!(parse_step_num("v1.0"), None);
        assert_eq!(parse_step_num("step-99999999999999"), None);
    }

    #[test]
    fn keeps_raw_digits() {
        let id = StepId::parse("step-007").unwrap();

        assert_eq!(id.digits(), "007");
        assert_eq!(id.padded(), "07");
        assert_eq!(id.to_string(), "step-007");
    }

    #[test]
    fn normalizes_route_params() {
        assert_eq!(normalize_step_param("01"), Some("step-01".to_string()));
        assert_eq!(normalize_step_param("7"), Some("step-07".to_string()));
        assert_eq!(normalize_step_param(" Step-12 "), Some("step-12".to_string()));
        assert_eq!(normalize_step_param("intro"), None);
        assert_eq!(normalize_step_param(""), None);
    }
}
