//! Core types for the GroupsNet contact simulation
//!
//! Models nodes joined by scheduled contacts. While a contact is up, the two
//! nodes share a connection over which one message at a time can move.

use groupsnet_core::{Message, MessageId, NodeAddress};
use serde::{Deserialize, Serialize};

/// An open connection between two nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SimConnection {
    /// Monotonic id, unique for the whole run
    pub id: u64,
    /// Lower node address
    pub a: NodeAddress,
    /// Higher node address
    pub b: NodeAddress,
}

impl SimConnection {
    /// Create a connection with endpoints in address order
    pub fn new(id: u64, a: NodeAddress, b: NodeAddress) -> Self {
        if a <= b {
            Self { id, a, b }
        } else {
            Self { id, a: b, b: a }
        }
    }

    /// The endpoint opposite `node`
    pub fn other(&self, node: NodeAddress) -> NodeAddress {
        if self.a == node { self.b } else { self.a }
    }

    /// Check if `node` is an endpoint
    pub fn involves(&self, node: NodeAddress) -> bool {
        self.a == node || self.b == node
    }

    /// Check if this connection joins exactly these two nodes
    pub fn joins(&self, x: NodeAddress, y: NodeAddress) -> bool {
        (self.a == x && self.b == y) || (self.a == y && self.b == x)
    }
}

impl std::fmt::Display for SimConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}<->{}#{}", self.a, self.b, self.id)
    }
}

/// A message copy in flight over a connection
#[derive(Debug, Clone)]
pub struct Transfer {
    /// Connection carrying the message
    pub connection: SimConnection,
    /// Sending node
    pub from: NodeAddress,
    /// Receiving node
    pub to: NodeAddress,
    /// Copy being sent
    pub message: Message,
    /// Ticks left until the copy arrives
    pub remaining: u64,
}

/// How a transfer ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferKind {
    /// Received by its final recipient
    Delivered,
    /// Received by an intermediate node
    Relayed,
    /// Connection went down before the copy arrived
    Aborted,
}

/// Log entry for a finished transfer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRecord {
    /// Tick at which the transfer ended
    pub tick: u64,
    /// Message that moved
    pub message: MessageId,
    /// Sending node
    pub from: NodeAddress,
    /// Receiving node
    pub to: NodeAddress,
    /// Outcome
    pub kind: TransferKind,
}

impl std::fmt::Display for TransferRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[t={}] {:?} message {} {} -> {}",
            self.tick, self.kind, self.message, self.from, self.to
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_endpoints_ordered() {
        let conn = SimConnection::new(1, NodeAddress(5), NodeAddress(2));
        assert_eq!(conn.a, NodeAddress(2));
        assert_eq!(conn.b, NodeAddress(5));
        assert_eq!(conn.other(NodeAddress(2)), NodeAddress(5));
        assert_eq!(conn.other(NodeAddress(5)), NodeAddress(2));
        assert!(conn.involves(NodeAddress(5)));
        assert!(!conn.involves(NodeAddress(3)));
        assert!(conn.joins(NodeAddress(5), NodeAddress(2)));
    }
}
