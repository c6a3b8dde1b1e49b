use serde_json::json;
use thiserror::Error;

use crate::layout::LayoutError;
use crate::xref::XrefError;

/// Top-level error for the generation pipeline and the binary.
///
/// Layout and reference errors keep their own types; this wraps them so callers
/// get one `Result` and one machine-readable error body.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error(transparent)]
    Xref(#[from] XrefError),

    #[error("Malformed document: {0}")]
    Document(#[source] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Stable machine code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Layout(e) => e.code(),
            AppError::Xref(e) => e.code(),
            AppError::Document(_) => "INVALID_DOCUMENT",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// `{"error": {"code": ..., "message": ...}}`, the shape renderers and the CLI print.
    pub fn to_json(&self) -> serde_json::Value {
        let message = match self {
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                "An internal error occurred".to_string()
            }
            other => other.to_string(),
        };

        json!({
            "error": {
                "code": self.code(),
                "message": message
            }
        })
    }
}
