//! Error types for the planning core

use thiserror::Error;

/// Failures the planning core reports to its caller.
///
/// Most planning edge cases degrade to advisory notes instead of errors;
/// only requests that cannot be answered at all end up here.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PlanError {
    #[error("hop '{0}' is not recognized by the flavor catalog")]
    UnrecognizedHop(String),
    #[error("style '{0}' is not in the style catalog")]
    UnknownStyle(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

pub type PlanResult<T> = Result<T, PlanError>;
