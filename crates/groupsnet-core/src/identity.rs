//! Identifiers for nodes and messages
//!
//! - `NodeAddress`: numeric address of a simulated node
//! - `OriginId`: integer key of a message into the route table
//! - `MessageId`: the substrate's textual message name

use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Address of a node in the simulated network
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeAddress(pub u32);

impl NodeAddress {
    /// Get the raw address value
    pub fn value(&self) -> u32 {
        self.0
    }
}

impl Display for NodeAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "n{}", self.0)
    }
}

impl From<u32> for NodeAddress {
    fn from(address: u32) -> Self {
        Self(address)
    }
}

/// Key of a message into the route table
///
/// Messages are named by their origin id, so a message called `"17"` is
/// routed by the table record whose first integer is `17`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OriginId(pub u32);

impl Display for OriginId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for OriginId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl FromStr for OriginId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u32>()
            .map(Self)
            .map_err(|_| CoreError::InvalidOriginId(s.to_string()))
    }
}

/// Substrate-assigned message name
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    /// Create a message id from any string-like value
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Interpret this id as a route table key
    pub fn origin_id(&self) -> Result<OriginId, CoreError> {
        self.0.parse()
    }
}

impl Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MessageId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<OriginId> for MessageId {
    fn from(origin: OriginId) -> Self {
        Self(origin.0.to_string())
    }
}
