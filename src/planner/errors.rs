//! Planner error types
//!
//! Error codes:
//! - WQ_UNSUPPORTED_QUERY_SHAPE (REJECT)
//! - WQ_NOT_IMPLEMENTED_OPERATOR (REJECT)

use std::fmt;

use thiserror::Error;

/// Severity levels for planner errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Query rejected; no plan produced
    Reject,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
        }
    }
}

/// Planner error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannerErrorCode {
    /// Operator chain cannot be expressed as a single request
    UnsupportedQueryShape,
    /// Operator is part of the vocabulary but not supported
    NotImplementedOperator,
}

impl PlannerErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            PlannerErrorCode::UnsupportedQueryShape => "WQ_UNSUPPORTED_QUERY_SHAPE",
            PlannerErrorCode::NotImplementedOperator => "WQ_NOT_IMPLEMENTED_OPERATOR",
        }
    }

    pub fn severity(&self) -> Severity {
        Severity::Reject
    }
}

impl fmt::Display for PlannerErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Planner error type with full context
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("[{}] {code}: {message}", .code.severity())]
pub struct PlannerError {
    code: PlannerErrorCode,
    message: String,
    /// Operator the error was raised at, if any
    operator: Option<String>,
}

impl PlannerError {
    /// Create an unsupported shape error raised at `operator`
    pub fn unsupported_at(operator: impl Into<String>, reason: impl Into<String>) -> Self {
        let operator = operator.into();
        Self {
            code: PlannerErrorCode::UnsupportedQueryShape,
            message: format!("{}: {}", operator, reason.into()),
            operator: Some(operator),
        }
    }

    /// Create a not implemented error for a vocabulary operator
    pub fn not_implemented(operator: impl Into<String>) -> Self {
        let operator = operator.into();
        Self {
            code: PlannerErrorCode::NotImplementedOperator,
            message: format!("operator '{}' is not supported", operator),
            operator: Some(operator),
        }
    }

    pub fn code(&self) -> PlannerErrorCode {
        self.code
    }

    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn operator(&self) -> Option<&str> {
        self.operator.as_deref()
    }
}

/// Result type for planner operations
pub type PlannerResult<T> = Result<T, PlannerError>;
