//! Errors raised while building the site.

use std::path::PathBuf;

use crate::i18n::I18nError;
use crate::toolchain::ToolError;
use crate::verify::VerifyError;

/// Errors that can occur during a build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Not a step identifier: {0}")]
    InvalidStepId(String),

    #[error("Failed to check out {tag}: {message}")]
    Checkout { tag: String, message: String },

    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error("Failed to render template: {0}")]
    Template(String),

    #[error(transparent)]
    I18n(#[from] I18nError),

    #[error(transparent)]
    Verify(#[from] VerifyError),
}

impl BuildError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Process exit status for this error.
    ///
    /// A failing subprocess passes its own status through; everything else is 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Tool(ToolError {
                status: Some(code), ..
            }) if *code != 0 => *code,
            _ => 1,
        }
    }
}

impl From<stepview_md::RenderError> for BuildError {
    fn from(e: stepview_md::RenderError) -> Self {
        match e {
            stepview_md::RenderError::Read { path, source } => Self::Io { path, source },
        }
    }
}

impl From<minijinja::Error> for BuildError {
    fn from(e: minijinja::Error) -> Self {
        Self::Template(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_status_becomes_exit_code() {
        let err = BuildError::Tool(ToolError {
            command: "npx vite build".to_string(),
            status: Some(3),
            stderr: String::new(),
        });
        assert_eq!(err.exit_code(), 3);

        let killed = BuildError::Tool(ToolError {
            command: "npx vite build".to_string(),
            status: None,
            stderr: String::new(),
        });
        assert_eq!(killed.exit_code(), 1);

        assert_eq!(BuildError::InvalidStepId("x".into()).exit_code(), 1);
    }
}
