//! Contact and transfer substrate
//!
//! The [`World`] owns every node's buffer, the open connections and the
//! transfers in flight. A [`HostView`] borrows the world on behalf of one
//! node and exposes it to the forwarding policy as an [`ActiveRouter`].
//!
//! Transfer rules:
//! - a node takes part in at most one transfer at a time, sending or receiving
//! - a transfer of `size` bytes takes `ceil(size / transfer_speed)` ticks,
//!   at least one
//! - closing a connection aborts the transfers running over it
//! - a relayed copy leaves the sender's copy in place; a delivered message is
//!   removed from the sender's buffer

use std::collections::HashSet;

use groupsnet_core::{ActiveRouter, Candidate, Message, MessageId, NodeAddress};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::{debug, info, trace};

use crate::config::{SendQueueMode, WorldConfig};
use crate::types::{SimConnection, Transfer, TransferKind, TransferRecord};

/// Per-node storage
#[derive(Debug, Default)]
pub struct NodeState {
    /// Messages held for forwarding, in arrival order
    pub buffer: Vec<Message>,
    /// Ids of messages delivered to this node
    pub received: HashSet<MessageId>,
}

impl NodeState {
    /// Check if the node holds or has received a message
    pub fn has_message(&self, id: &MessageId) -> bool {
        self.received.contains(id) || self.buffer.iter().any(|m| &m.id == id)
    }

    fn message(&self, id: &MessageId) -> Option<&Message> {
        self.buffer.iter().find(|m| &m.id == id)
    }
}

/// Shared state of all simulated nodes
#[derive(Debug)]
pub struct World {
    nodes: Vec<NodeState>,
    links: Vec<SimConnection>,
    transfers: Vec<Transfer>,
    next_connection_id: u64,
    transfer_speed: u64,
    send_queue: SendQueueMode,
    message_ttl: Option<u64>,
    rng: StdRng,
    tick: u64,
    log: Vec<TransferRecord>,
}

impl World {
    /// Create a world with `config.nodes` empty nodes and no connections
    pub fn new(config: &WorldConfig) -> Self {
        Self {
            nodes: (0..config.nodes).map(|_| NodeState::default()).collect(),
            links: Vec::new(),
            transfers: Vec::new(),
            next_connection_id: 0,
            transfer_speed: config.transfer_speed.max(1),
            send_queue: config.send_queue,
            message_ttl: config.message_ttl,
            rng: StdRng::seed_from_u64(config.seed),
            tick: 0,
            log: Vec::new(),
        }
    }

    /// Current tick
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub(crate) fn set_tick(&mut self, tick: u64) {
        self.tick = tick;
    }

    /// State of a node
    pub fn node(&self, node: NodeAddress) -> Option<&NodeState> {
        self.nodes.get(node.0 as usize)
    }

    fn node_mut(&mut self, node: NodeAddress) -> Option<&mut NodeState> {
        self.nodes.get_mut(node.0 as usize)
    }

    /// Open connections, oldest first
    pub fn links(&self) -> &[SimConnection] {
        &self.links
    }

    /// Transfers currently in flight
    pub fn transfers(&self) -> &[Transfer] {
        &self.transfers
    }

    /// Finished and aborted transfers, in the order they ended
    pub fn log(&self) -> &[TransferRecord] {
        &self.log
    }

    /// Open a connection between two nodes
    ///
    /// Returns the existing connection if the two are already connected.
    pub fn open_link(&mut self, a: NodeAddress, b: NodeAddress) -> SimConnection {
        if let Some(link) = self.links.iter().find(|l| l.joins(a, b)) {
            return *link;
        }

        let link = SimConnection::new(self.next_connection_id, a, b);
        self.next_connection_id += 1;
        self.links.push(link);
        debug!(tick = self.tick, connection = %link, "Connection up");
        link
    }

    /// Close the connection between two nodes, aborting its transfers
    pub fn close_link(&mut self, a: NodeAddress, b: NodeAddress) {
        let Some(pos) = self.links.iter().position(|l| l.joins(a, b)) else {
            return;
        };
        let link = self.links.remove(pos);
        debug!(tick = self.tick, connection = %link, "Connection down");

        let (aborted, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.transfers)
            .into_iter()
            .partition(|t| t.connection.id == link.id);
        self.transfers = kept;

        for transfer in aborted {
            debug!(
                tick = self.tick,
                message = %transfer.message.id,
                from = %transfer.from,
                to = %transfer.to,
                "Transfer aborted"
            );
            self.log.push(TransferRecord {
                tick: self.tick,
                message: transfer.message.id,
                from: transfer.from,
                to: transfer.to,
                kind: TransferKind::Aborted,
            });
        }
    }

    /// Check if a node is sending or receiving
    pub fn is_transferring(&self, node: NodeAddress) -> bool {
        self.transfers
            .iter()
            .any(|t| t.from == node || t.to == node)
    }

    /// Check if a node holds or has received a message
    pub fn has_message(&self, node: NodeAddress, id: &MessageId) -> bool {
        self.node(node).is_some_and(|n| n.has_message(id))
    }

    /// Check if a message was delivered to a node
    pub fn was_delivered(&self, node: NodeAddress, id: &MessageId) -> bool {
        self.node(node).is_some_and(|n| n.received.contains(id))
    }

    /// Connections involving a node, oldest first
    pub fn connections_of(&self, node: NodeAddress) -> Vec<SimConnection> {
        self.links
            .iter()
            .filter(|l| l.involves(node))
            .copied()
            .collect()
    }

    /// Try to start sending a buffered message over a connection
    ///
    /// Fails if the connection is closed, either end is busy, the sender
    /// does not hold the message or the receiver already has it.
    pub fn start_transfer(
        &mut self,
        connection: SimConnection,
        from: NodeAddress,
        id: &MessageId,
    ) -> bool {
        if !connection.involves(from) || !self.links.iter().any(|l| l.id == connection.id) {
            return false;
        }
        let to = connection.other(from);
        if self.is_transferring(from) || self.is_transferring(to) {
            return false;
        }
        if self.has_message(to, id) {
            return false;
        }
        let Some(message) = self.node(from).and_then(|n| n.message(id)).cloned() else {
            return false;
        };

        let remaining = message.size.div_ceil(self.transfer_speed).max(1);
        debug!(
            tick = self.tick,
            message = %id,
            from = %from,
            to = %to,
            ticks = remaining,
            "Transfer started"
        );
        self.transfers.push(Transfer {
            connection,
            from,
            to,
            message,
            remaining,
        });
        true
    }

    /// Advance every transfer by one tick and complete the finished ones
    pub fn progress_transfers(&mut self) {
        let mut finished = Vec::new();
        let mut running = Vec::with_capacity(self.transfers.len());

        for mut transfer in std::mem::take(&mut self.transfers) {
            transfer.remaining = transfer.remaining.saturating_sub(1);
            if transfer.remaining == 0 {
                finished.push(transfer);
            } else {
                running.push(transfer);
            }
        }
        self.transfers = running;

        for transfer in finished {
            self.finish(transfer);
        }
    }

    fn finish(&mut self, transfer: Transfer) {
        let Transfer {
            from, to, message, ..
        } = transfer;
        let id = message.id.clone();

        let kind = if message.to == to {
            if let Some(sender) = self.node_mut(from) {
                sender.buffer.retain(|m| m.id != id);
            }
            if let Some(receiver) = self.node_mut(to) {
                receiver.received.insert(id.clone());
            }
            info!(tick = self.tick, message = %id, from = %from, to = %to, "Message delivered");
            TransferKind::Delivered
        } else {
            if let Some(receiver) = self.node_mut(to)
                && !receiver.has_message(&id)
            {
                receiver.buffer.push(message);
            }
            debug!(tick = self.tick, message = %id, from = %from, to = %to, "Message relayed");
            TransferKind::Relayed
        };

        self.log.push(TransferRecord {
            tick: self.tick,
            message: id,
            from,
            to,
            kind,
        });
    }

    /// Drop messages from a node's buffer once their time to live has passed
    pub fn drop_expired(&mut self, node: NodeAddress) {
        let Some(ttl) = self.message_ttl else {
            return;
        };
        let tick = self.tick;
        if let Some(state) = self.node_mut(node) {
            state.buffer.retain(|m| {
                let alive = tick < m.created_at.saturating_add(ttl);
                if !alive {
                    debug!(tick, node = %node, message = %m.id, "Message expired");
                }
                alive
            });
        }
    }

    /// Borrow the world as seen by one node
    pub fn host(&mut self, node: NodeAddress) -> HostView<'_> {
        HostView { world: self, node }
    }
}

/// One node's view of the [`World`]
pub struct HostView<'a> {
    world: &'a mut World,
    node: NodeAddress,
}

impl HostView<'_> {
    fn created_at(&self, id: &MessageId) -> u64 {
        self.world
            .node(self.node)
            .and_then(|n| n.message(id))
            .map_or(u64::MAX, |m| m.created_at)
    }
}

impl ActiveRouter for HostView<'_> {
    type Connection = SimConnection;

    fn update(&mut self) {
        self.world.drop_expired(self.node);
    }

    fn address(&self) -> NodeAddress {
        self.node
    }

    fn can_start_transfer(&self) -> bool {
        let has_messages = self
            .world
            .node(self.node)
            .is_some_and(|n| !n.buffer.is_empty());
        has_messages && self.world.links.iter().any(|l| l.involves(self.node))
    }

    fn is_transferring(&self) -> bool {
        self.world.is_transferring(self.node)
    }

    fn exchange_deliverable_messages(&mut self) -> Option<SimConnection> {
        let node = self.node;

        // Our messages for connected recipients first, then theirs for us
        let mut offers = Vec::new();
        for link in self.world.connections_of(node) {
            let other = link.other(node);
            if let Some(state) = self.world.node(node) {
                offers.extend(
                    state
                        .buffer
                        .iter()
                        .filter(|m| m.to == other)
                        .map(|m| (link, node, m.id.clone())),
                );
            }
        }
        for link in self.world.connections_of(node) {
            let other = link.other(node);
            if let Some(state) = self.world.node(other) {
                offers.extend(
                    state
                        .buffer
                        .iter()
                        .filter(|m| m.to == node)
                        .map(|m| (link, other, m.id.clone())),
                );
            }
        }

        for (link, from, id) in offers {
            if self.world.start_transfer(link, from, &id) {
                return Some(link);
            }
        }
        None
    }

    fn try_messages_for_connected(
        &mut self,
        mut candidates: Vec<Candidate<SimConnection>>,
    ) -> Option<Candidate<SimConnection>> {
        match self.world.send_queue {
            SendQueueMode::Fifo => candidates.sort_by_key(|c| self.created_at(&c.message)),
            SendQueueMode::Random => candidates.shuffle(&mut self.world.rng),
        }

        for candidate in candidates {
            if self
                .world
                .start_transfer(candidate.connection, self.node, &candidate.message)
            {
                return Some(candidate);
            }
            trace!(node = %self.node, message = %candidate.message, "Candidate not started");
        }
        None
    }

    fn connections(&self) -> Vec<SimConnection> {
        self.world.connections_of(self.node)
    }

    fn other_node(&self, connection: &SimConnection) -> NodeAddress {
        connection.other(self.node)
    }

    fn is_node_transferring(&self, node: NodeAddress) -> bool {
        self.world.is_transferring(node)
    }

    fn node_has_message(&self, node: NodeAddress, id: &MessageId) -> bool {
        self.world.has_message(node, id)
    }

    fn message_collection(&self) -> Vec<&Message> {
        self.world
            .node(self.node)
            .map(|n| n.buffer.iter().collect())
            .unwrap_or_default()
    }

    fn create_new_message(&mut self, message: Message) -> bool {
        let node = self.node;
        match self.world.node_mut(node) {
            Some(state) if !state.has_message(&message.id) => {
                state.buffer.push(message);
                true
            }
            _ => false,
        }
    }
}
