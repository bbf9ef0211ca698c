//! # GroupsNet Routing
//!
//! Static precomputed-route forwarding for opportunistic network simulation.
//!
//! Every message carries a fixed set of nodes it may be relayed through,
//! computed offline and attached when the message is created. On each tick a
//! node forwards a buffered message over any open connection whose remote
//! node is in that set. Contact scheduling and transfers are left to an
//! [`ActiveRouter`](groupsnet_core::ActiveRouter) substrate.
//!
//! ## Core Components
//!
//! - [`RouteTable`]: Origin id to route mapping, loaded once from a file
//! - [`GroupsNetRouter`]: Per-node forwarding policy
//! - [`GroupsNetRouterFactory`]: Loads the table and creates one router per node
//! - [`RouterSettings`]: Route file location and missing-route policy
//!
//! ## Example
//!
//! ```rust,ignore
//! use groupsnet_routing::{GroupsNetRouterFactory, RouterSettings};
//!
//! // Load the route table once, before any node ticks
//! let factory = GroupsNetRouterFactory::from_settings(&RouterSettings::new("routes.txt"))?;
//!
//! // One router per simulated node, all sharing the table
//! let routers: Vec<_> = (0..node_count).map(|_| factory.replicate()).collect();
//!
//! // Messages pick up their route on creation
//! routers[0].create_new_message(&mut host, message)?;
//!
//! // Each tick
//! let outcome = routers[0].update(&mut host);
//! ```

pub mod config;
pub mod error;
pub mod factory;
pub mod router;
pub mod table;

// Re-export main types
pub use config::{MissingRoutePolicy, RouterSettings};
pub use error::{RouteTableError, RoutingError, RoutingResult};
pub use factory::GroupsNetRouterFactory;
pub use router::{GroupsNetRouter, SkipReason, UpdateOutcome};
pub use table::RouteTable;
