//! Registry build errors
//!
//! All registry errors are configuration-time failures: a registry that fails
//! to build is never used.

use thiserror::Error;

/// Result type for registry operations
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Registry errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Ambiguous member mapping for {member}: {candidates} candidates on {definition}")]
    AmbiguousMemberMapping {
        member: String,
        definition: String,
        candidates: usize,
    },

    #[error("Malformed format template '{template}' for {member}: {reason}")]
    MalformedFormatTemplate {
        member: String,
        template: String,
        reason: String,
    },

    #[error("Generic definition {definition} declares no member matching {member}")]
    UnknownTemplateMember { member: String, definition: String },

    #[error("Duplicate mapping for {0}")]
    DuplicateMapping(String),
}

impl RegistryError {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            RegistryError::AmbiguousMemberMapping { .. } => "WQ_AMBIGUOUS_MEMBER_MAPPING",
            RegistryError::MalformedFormatTemplate { .. } => "WQ_MALFORMED_FORMAT_TEMPLATE",
            RegistryError::UnknownTemplateMember { .. } => "WQ_UNKNOWN_TEMPLATE_MEMBER",
            RegistryError::DuplicateMapping(_) => "WQ_DUPLICATE_MAPPING",
        }
    }
}
