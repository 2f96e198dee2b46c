//! Filter compilation and parsing errors

use thiserror::Error;

use crate::registry::RegistryError;

/// Result type for filter operations
pub type FilterResult<T> = Result<T, FilterError>;

/// Filter errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    /// A call or property inside a predicate has no registry mapping
    #[error("Unmapped member: {0}")]
    UnmappedMember(String),

    /// The expression cannot be expressed in the filter grammar
    #[error("Unsupported expression: {0}")]
    UnsupportedExpression(String),

    #[error("Syntax error at offset {offset}: {message}")]
    Syntax { offset: usize, message: String },

    #[error("Unknown member '{name}' on {owner}")]
    UnknownMember { owner: String, name: String },

    #[error("Unmapped function {name} with {arity} argument(s)")]
    UnmappedFunction { name: String, arity: usize },

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl FilterError {
    pub(crate) fn syntax(offset: usize, message: impl Into<String>) -> Self {
        FilterError::Syntax {
            offset,
            message: message.into(),
        }
    }

    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            FilterError::UnmappedMember(_) => "WQ_UNMAPPED_MEMBER",
            FilterError::UnsupportedExpression(_) => "WQ_UNSUPPORTED_EXPRESSION",
            FilterError::Syntax { .. } => "WQ_FILTER_SYNTAX",
            FilterError::UnknownMember { .. } => "WQ_UNKNOWN_MEMBER",
            FilterError::UnmappedFunction { .. } => "WQ_UNMAPPED_FUNCTION",
            FilterError::Registry(err) => err.code(),
        }
    }
}
