//! Scenario files
//!
//! A scenario is a TOML file describing the router settings, the world, the
//! contact schedule and the messages to create:
//!
//! ```toml
//! [router]
//! routes_file = "routes.txt"      # relative to the scenario file
//! missing_route = "fail_closed"   # or "reject"
//!
//! [world]
//! nodes = 4
//! duration = 100
//! transfer_speed = 250            # bytes per tick
//! send_queue = "fifo"             # or "random"
//! seed = 7
//! message_ttl = 60                # optional, in ticks
//!
//! [[contacts]]
//! a = 0
//! b = 1
//! up = 0
//! down = 20
//!
//! [[messages]]
//! id = "1"
//! from = 0
//! to = 3
//! size = 500
//! at = 1
//! ```

use std::path::{Path, PathBuf};

use groupsnet_routing::{RouteTableError, RouterSettings, RoutingError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading or running a scenario
#[derive(Debug, Error)]
pub enum ScenarioError {
    /// Scenario file could not be read
    #[error("Failed to read scenario {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Scenario file is not valid TOML for a scenario
    #[error("Failed to parse scenario {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Scenario values are inconsistent
    #[error("Invalid scenario: {0}")]
    Invalid(String),

    /// Route table failed to load
    #[error(transparent)]
    RouteTable(#[from] RouteTableError),

    /// Forwarding policy refused an operation
    #[error(transparent)]
    Routing(#[from] RoutingError),
}

/// Order in which the substrate tries route candidates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SendQueueMode {
    /// Oldest message first
    #[default]
    Fifo,
    /// Seeded random order
    Random,
}

/// World parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldConfig {
    /// Number of nodes, addressed `0..nodes`
    pub nodes: u32,
    /// Number of ticks to run
    pub duration: u64,
    /// Bytes moved per tick over a connection
    #[serde(default = "default_transfer_speed")]
    pub transfer_speed: u64,
    /// Candidate ordering used by the substrate
    #[serde(default)]
    pub send_queue: SendQueueMode,
    /// Seed for the random send queue
    #[serde(default)]
    pub seed: u64,
    /// Ticks after creation at which a message is dropped
    #[serde(default)]
    pub message_ttl: Option<u64>,
}

fn default_transfer_speed() -> u64 {
    250
}

/// A scheduled contact between two nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactConfig {
    pub a: u32,
    pub b: u32,
    /// Tick at which the connection opens
    pub up: u64,
    /// Tick at which the connection closes
    pub down: u64,
}

/// A message created by a node at a given tick
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageConfig {
    pub id: String,
    pub from: u32,
    pub to: u32,
    pub size: u64,
    pub at: u64,
}

/// A complete scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioConfig {
    pub router: RouterSettings,
    pub world: WorldConfig,
    #[serde(default)]
    pub contacts: Vec<ContactConfig>,
    #[serde(default)]
    pub messages: Vec<MessageConfig>,
}

impl ScenarioConfig {
    /// Read, parse and validate a scenario file
    ///
    /// A relative route file is resolved against the scenario's directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ScenarioError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Self = toml::from_str(&text).map_err(|source| ScenarioError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        if let Some(base) = path.parent() {
            config.router = config.router.resolve_against(base);
        }
        config.validate()?;
        Ok(config)
    }

    /// Check scenario invariants
    pub fn validate(&self) -> Result<(), ScenarioError> {
        let nodes = self.world.nodes;
        if nodes == 0 {
            return Err(ScenarioError::Invalid("world.nodes must be positive".into()));
        }
        if self.world.transfer_speed == 0 {
            return Err(ScenarioError::Invalid(
                "world.transfer_speed must be positive".into(),
            ));
        }

        for (i, contact) in self.contacts.iter().enumerate() {
            if contact.a >= nodes || contact.b >= nodes {
                return Err(ScenarioError::Invalid(format!(
                    "contact {i} joins unknown node ({} <-> {}, nodes = {nodes})",
                    contact.a, contact.b
                )));
            }
            if contact.a == contact.b {
                return Err(ScenarioError::Invalid(format!(
                    "contact {i} joins node {} to itself",
                    contact.a
                )));
            }
            if contact.up >= contact.down {
                return Err(ScenarioError::Invalid(format!(
                    "contact {i} closes at {} before it opens at {}",
                    contact.down, contact.up
                )));
            }
        }

        // A pair has one connection, so its contact windows must not overlap
        for (i, first) in self.contacts.iter().enumerate() {
            for (j, second) in self.contacts.iter().enumerate().skip(i + 1) {
                let same_pair = (first.a == second.a && first.b == second.b)
                    || (first.a == second.b && first.b == second.a);
                if same_pair && first.up < second.down && second.up < first.down {
                    return Err(ScenarioError::Invalid(format!(
                        "contacts {i} and {j} overlap between nodes {} and {} ({}..{} and {}..{})",
                        first.a, first.b, first.up, first.down, second.up, second.down
                    )));
                }
            }
        }

        for message in &self.messages {
            if message.from >= nodes || message.to >= nodes {
                return Err(ScenarioError::Invalid(format!(
                    "message {} uses unknown node ({} -> {}, nodes = {nodes})",
                    message.id, message.from, message.to
                )));
            }
            if message.from == message.to {
                return Err(ScenarioError::Invalid(format!(
                    "message {} is addressed to its own sender",
                    message.id
                )));
            }
        }

        Ok(())
    }
}
