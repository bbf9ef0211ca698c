//! Substrate capabilities consumed by the forwarding policy
//!
//! The forwarding policy only decides *what* may be sent *where*. Everything
//! about contacts and transfers (connection lifecycle, the one-transfer-at-a-
//! time discipline, buffer management, message expiry) belongs to an
//! [`ActiveRouter`] substrate, which the policy reaches exclusively through
//! this trait. Any scheduler that implements it can host the policy.

use std::fmt::Debug;

use crate::identity::{MessageId, NodeAddress};
use crate::message::Message;

/// A message that may be sent over a connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate<C> {
    /// Buffered message to send
    pub message: MessageId,
    /// Connection to send it over
    pub connection: C,
}

impl<C> Candidate<C> {
    /// Create a new candidate pair
    pub fn new(message: MessageId, connection: C) -> Self {
        Self {
            message,
            connection,
        }
    }
}

/// Contact/transfer substrate of a single node
///
/// One value represents the view of the node currently being updated.
/// Remote nodes are addressed through [`ActiveRouter::other_node`] and the
/// `*_node_*` queries; the policy never mutates another node.
pub trait ActiveRouter {
    /// Handle to an open connection
    type Connection: Clone + Debug;

    /// Substrate housekeeping run at the start of every tick
    ///
    /// Finishes transfers, drops expired messages and the like.
    fn update(&mut self) {}

    /// Address of the node this view belongs to
    fn address(&self) -> NodeAddress;

    /// Check if the node is in a state where it could start a transfer
    fn can_start_transfer(&self) -> bool;

    /// Check if the node is currently sending or receiving
    fn is_transferring(&self) -> bool;

    /// Try to deliver buffered messages to directly connected recipients
    ///
    /// Returns the connection used when a delivery was started.
    fn exchange_deliverable_messages(&mut self) -> Option<Self::Connection>;

    /// Try to start one transfer out of the given candidates
    ///
    /// The substrate applies its own ordering and returns the candidate
    /// that was started, if any.
    fn try_messages_for_connected(
        &mut self,
        candidates: Vec<Candidate<Self::Connection>>,
    ) -> Option<Candidate<Self::Connection>>;

    /// Currently open connections, in the substrate's iteration order
    fn connections(&self) -> Vec<Self::Connection>;

    /// Address of the remote end of a connection
    fn other_node(&self, connection: &Self::Connection) -> NodeAddress;

    /// Check if a remote node is currently sending or receiving
    fn is_node_transferring(&self, node: NodeAddress) -> bool;

    /// Check if a remote node already holds a message
    fn node_has_message(&self, node: NodeAddress, id: &MessageId) -> bool;

    /// Messages in this node's buffer, in buffer order
    fn message_collection(&self) -> Vec<&Message>;

    /// Generic admission of a locally created message into the buffer
    fn create_new_message(&mut self, message: Message) -> bool;
}
