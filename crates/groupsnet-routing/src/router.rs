//! GroupsNet forwarding policy
//!
//! The [`GroupsNetRouter`] forwards a message over a connection only if the
//! remote node is listed in the message's precomputed route.
//!
//! ## Per-tick algorithm
//!
//! 1. **HOUSEKEEPING**: let the substrate finish its own bookkeeping
//! 2. **BUSY**: skip the tick if this node cannot start a transfer or is mid-transfer
//! 3. **DELIVER**: let the substrate deliver to directly connected recipients;
//!    a delivery ends the tick
//! 4. **RELAY**: collect every (message, connection) pair whose remote node is
//!    idle, lacks the message and is in the message's route, then hand the
//!    whole list to the substrate, which picks and starts one transfer

use std::sync::Arc;

use groupsnet_core::{ActiveRouter, Candidate, Message, MessageId, Route};
use tracing::{debug, trace, warn};

use crate::config::MissingRoutePolicy;
use crate::error::{RoutingError, RoutingResult};
use crate::table::RouteTable;

/// Why a tick was skipped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The substrate reports it cannot start a transfer
    CannotStartTransfer,
    /// The node is already sending or receiving
    Transferring,
}

/// What a single [`GroupsNetRouter::update`] did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome<C> {
    /// Preconditions failed, nothing was attempted
    Skipped(SkipReason),
    /// The substrate started a delivery to a final recipient
    Delivered { connection: C },
    /// No eligible candidate this tick
    NoCandidates,
    /// Candidates were handed to the substrate
    ///
    /// `started` is whatever the substrate reported; the policy does not act on it.
    Offered {
        candidates: usize,
        started: Option<Candidate<C>>,
    },
}

impl<C> UpdateOutcome<C> {
    /// Check if the tick ran the relay step
    pub fn is_offered(&self) -> bool {
        matches!(self, Self::Offered { .. })
    }

    /// Check if the tick ended in direct delivery
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered { .. })
    }
}

/// Static-route forwarding policy for one node
///
/// Holds no state of its own besides the shared route table, so one value
/// per simulated node is cheap. Create them through
/// [`GroupsNetRouterFactory`](crate::GroupsNetRouterFactory).
#[derive(Debug, Clone)]
pub struct GroupsNetRouter {
    /// Route table shared by all routers in the process
    routes: Arc<RouteTable>,
    /// Handling of messages without a route
    missing_route: MissingRoutePolicy,
}

impl GroupsNetRouter {
    /// Create a router over a shared route table
    pub fn new(routes: Arc<RouteTable>, missing_route: MissingRoutePolicy) -> Self {
        Self {
            routes,
            missing_route,
        }
    }

    /// The shared route table
    pub fn routes(&self) -> &Arc<RouteTable> {
        &self.routes
    }

    /// The configured missing-route policy
    pub fn missing_route_policy(&self) -> MissingRoutePolicy {
        self.missing_route
    }

    /// Run one tick for the node behind `host`
    pub fn update<H: ActiveRouter>(&self, host: &mut H) -> UpdateOutcome<H::Connection> {
        host.update();

        if !host.can_start_transfer() {
            trace!(node = %host.address(), "Cannot start transfer, skipping tick");
            return UpdateOutcome::Skipped(SkipReason::CannotStartTransfer);
        }
        if host.is_transferring() {
            trace!(node = %host.address(), "Already transferring, skipping tick");
            return UpdateOutcome::Skipped(SkipReason::Transferring);
        }

        if let Some(connection) = host.exchange_deliverable_messages() {
            debug!(node = %host.address(), connection = ?connection, "Direct delivery started");
            return UpdateOutcome::Delivered { connection };
        }

        self.try_other_messages(host)
    }

    /// Collect every eligible (message, connection) pair for this node
    ///
    /// Iterates connections in substrate order and, per connection, buffered
    /// messages in buffer order. Does not modify anything.
    pub fn candidates<H: ActiveRouter>(&self, host: &H) -> Vec<Candidate<H::Connection>> {
        let messages = host.message_collection();
        let mut candidates = Vec::new();

        for connection in host.connections() {
            let other = host.other_node(&connection);

            if host.is_node_transferring(other) {
                trace!(node = %host.address(), peer = %other, "Peer transferring, skipping");
                continue;
            }

            for message in &messages {
                if host.node_has_message(other, &message.id) {
                    trace!(message = %message.id, peer = %other, "Peer already has message");
                    continue;
                }
                if message.authorizes(other) {
                    trace!(message = %message.id, peer = %other, "Peer is on route");
                    candidates.push(Candidate::new(message.id.clone(), connection.clone()));
                }
            }
        }

        candidates
    }

    fn try_other_messages<H: ActiveRouter>(&self, host: &mut H) -> UpdateOutcome<H::Connection> {
        let candidates = self.candidates(host);
        if candidates.is_empty() {
            trace!(node = %host.address(), "No route candidates");
            return UpdateOutcome::NoCandidates;
        }

        let count = candidates.len();
        debug!(node = %host.address(), candidates = count, "Offering route candidates");
        let started = host.try_messages_for_connected(candidates);

        UpdateOutcome::Offered {
            candidates: count,
            started,
        }
    }

    /// Resolve the route for a message id under the missing-route policy
    ///
    /// `Ok(None)` means the message is admitted without a route.
    pub fn route_for(&self, id: &MessageId) -> RoutingResult<Option<Route>> {
        let origin = match id.origin_id() {
            Ok(origin) => origin,
            Err(_) => {
                return match self.missing_route {
                    MissingRoutePolicy::FailClosed => {
                        warn!(message = %id, "Message id is not an origin id, it will never be relayed");
                        Ok(None)
                    }
                    MissingRoutePolicy::Reject => Err(RoutingError::InvalidOriginId {
                        message: id.clone(),
                    }),
                };
            }
        };

        match self.routes.lookup(origin) {
            Some(route) => Ok(Some(route.clone())),
            None => match self.missing_route {
                MissingRoutePolicy::FailClosed => {
                    warn!(message = %id, origin = %origin, "No route defined, message will never be relayed");
                    Ok(None)
                }
                MissingRoutePolicy::Reject => Err(RoutingError::MissingRoute {
                    message: id.clone(),
                    origin,
                }),
            },
        }
    }

    /// Attach the message's route and admit it into the host's buffer
    ///
    /// Returns the substrate's admission result. Under
    /// [`MissingRoutePolicy::Reject`] a message without a route is not
    /// handed to the substrate.
    pub fn create_new_message<H: ActiveRouter>(
        &self,
        host: &mut H,
        mut message: Message,
    ) -> RoutingResult<bool> {
        let route = self.route_for(&message.id)?;
        match &route {
            Some(route) => {
                debug!(node = %host.address(), message = %message.id, route = %route, "Creating message");
            }
            None => {
                debug!(node = %host.address(), message = %message.id, "Creating message without route");
            }
        }
        message.attach_route(route)?;
        Ok(host.create_new_message(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use groupsnet_core::{NodeAddress, OriginId};

    fn make_router(policy: MissingRoutePolicy) -> GroupsNetRouter {
        let table = RouteTable::from_records([
            (OriginId(1), Route::from([2, 3])),
            (OriginId(4), Route::from([5])),
        ]);
        GroupsNetRouter::new(Arc::new(table), policy)
    }

    #[test]
    fn test_route_for_known_origin() {
        let router = make_router(MissingRoutePolicy::FailClosed);
        let route = router.route_for(&MessageId::new("1")).unwrap().unwrap();
        assert_eq!(route, Route::from([2, 3]));
        assert!(route.ptr_eq(router.routes().lookup(OriginId(1)).unwrap()));
    }

    #[test]
    fn test_route_for_unknown_origin_fail_closed() {
        let router = make_router(MissingRoutePolicy::FailClosed);
        assert_eq!(router.route_for(&MessageId::new("99")).unwrap(), None);
        assert_eq!(router.route_for(&MessageId::new("M1")).unwrap(), None);
    }

    #[test]
    fn test_route_for_unknown_origin_reject() {
        let router = make_router(MissingRoutePolicy::Reject);

        match router.route_for(&MessageId::new("99")) {
            Err(RoutingError::MissingRoute { origin, .. }) => assert_eq!(origin, OriginId(99)),
            other => panic!("Expected MissingRoute, got {:?}", other),
        }
        assert!(matches!(
            router.route_for(&MessageId::new("M1")),
            Err(RoutingError::InvalidOriginId { .. })
        ));
    }

    #[test]
    fn test_outcome_helpers() {
        let offered: UpdateOutcome<NodeAddress> = UpdateOutcome::Offered {
            candidates: 1,
            started: None,
        };
        assert!(offered.is_offered());
        assert!(!offered.is_delivered());

        let delivered = UpdateOutcome::Delivered {
            connection: NodeAddress(1),
        };
        assert!(delivered.is_delivered());
    }
}
