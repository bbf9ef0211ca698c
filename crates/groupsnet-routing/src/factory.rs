//! Per-node router construction
//!
//! The route table is loaded once and every simulated node gets its own
//! [`GroupsNetRouter`] pointing at the same table.

use std::sync::Arc;

use tracing::info;

use crate::config::{MissingRoutePolicy, RouterSettings};
use crate::error::RouteTableError;
use crate::router::GroupsNetRouter;
use crate::table::RouteTable;

/// Produces one [`GroupsNetRouter`] per simulated node
#[derive(Debug, Clone)]
pub struct GroupsNetRouterFactory {
    routes: Arc<RouteTable>,
    missing_route: MissingRoutePolicy,
}

impl GroupsNetRouterFactory {
    /// Create a factory over an already loaded table
    pub fn new(routes: Arc<RouteTable>) -> Self {
        Self {
            routes,
            missing_route: MissingRoutePolicy::default(),
        }
    }

    /// Load the configured route file and build a factory around it
    ///
    /// Must complete before any node ticks. A load failure is fatal.
    pub fn from_settings(settings: &RouterSettings) -> Result<Self, RouteTableError> {
        let routes = RouteTable::load(&settings.routes_file)?;
        info!(
            routes_file = %settings.routes_file.display(),
            missing_route = ?settings.missing_route,
            "Router factory ready"
        );
        Ok(Self::new(Arc::new(routes)).with_missing_route(settings.missing_route))
    }

    /// Set the missing-route policy for routers produced from now on
    pub fn with_missing_route(mut self, policy: MissingRoutePolicy) -> Self {
        self.missing_route = policy;
        self
    }

    /// Create a fresh router for one node
    pub fn replicate(&self) -> GroupsNetRouter {
        GroupsNetRouter::new(Arc::clone(&self.routes), self.missing_route)
    }

    /// The shared route table
    pub fn routes(&self) -> &Arc<RouteTable> {
        &self.routes
    }
}
