use crate::core::model::ScriptStatus;
use thiserror::Error;

/// Failures the script core can raise on its own.
///
/// Malformed script *content* is never one of these: the parser always
/// degrades to a minimal structure instead.
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("unsupported file format: '{extension}' (allowed: .txt, .docx, .pdf)")]
    UnsupportedFormat { extension: String },

    #[error("failed to extract text from {path}: {reason}")]
    Extraction { path: String, reason: String },

    #[error("invalid status transition: {from:?} -> {to:?}")]
    InvalidTransition { from: ScriptStatus, to: ScriptStatus },

    #[error("character not found: {0}")]
    CharacterNotFound(String),
}

impl ScriptError {
    pub fn extraction(path: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        ScriptError::Extraction {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
