//! Error types for GroupsNet core

use thiserror::Error;

/// Errors raised by core types
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("Message id {0:?} is not an integer origin id")]
    InvalidOriginId(String),

    #[error("Message {0} already has a route attached")]
    RouteAlreadyAttached(String),
}

/// Result type for core operations
pub type CoreResult<T> = Result<T, CoreError>;
