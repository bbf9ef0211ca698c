//! Routing error types
//!
//! Route table loading errors are fatal configuration errors: a table that
//! fails to load must never be used, so every variant names the source it
//! came from.

use std::path::PathBuf;

use thiserror::Error;

use groupsnet_core::{CoreError, MessageId, OriginId};

/// Errors raised while loading a route table
#[derive(Debug, Error)]
pub enum RouteTableError {
    /// Route file could not be opened
    #[error("Failed to open route file {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Route file could not be read to the end
    #[error("Failed to read route file {} at line {line}: {source}", .path.display())]
    Read {
        path: PathBuf,
        line: usize,
        #[source]
        source: std::io::Error,
    },

    /// A record holds a token that is not a non-negative integer
    #[error("Invalid token {token:?} in route file {} at line {line}", .path.display())]
    InvalidToken {
        path: PathBuf,
        line: usize,
        token: String,
    },

    /// The same origin id appears on more than one line
    #[error("Duplicate origin {origin} in route file {} at line {line}", .path.display())]
    DuplicateOrigin {
        path: PathBuf,
        line: usize,
        origin: OriginId,
    },
}

impl RouteTableError {
    /// The route source the error refers to
    pub fn path(&self) -> &PathBuf {
        match self {
            Self::Open { path, .. }
            | Self::Read { path, .. }
            | Self::InvalidToken { path, .. }
            | Self::DuplicateOrigin { path, .. } => path,
        }
    }
}

/// Errors raised by the forwarding policy
#[derive(Debug, Error)]
pub enum RoutingError {
    /// Core type error
    #[error("Core error: {0}")]
    Core(#[from] CoreError),

    /// The message id does not name a route table key
    #[error("Message id {message} is not an integer origin id")]
    InvalidOriginId { message: MessageId },

    /// The route table has no record for the message
    #[error("No route defined for message {message} (origin {origin})")]
    MissingRoute { message: MessageId, origin: OriginId },
}

/// Result type for routing operations
pub type RoutingResult<T> = Result<T, RoutingError>;
