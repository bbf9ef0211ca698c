//! # GroupsNet Simulation
//!
//! A discrete-time contact simulation that hosts the GroupsNet forwarding
//! policy on every node.
//!
//! ## Overview
//!
//! Nodes meet over a fixed schedule of contacts. While a contact is up the two
//! nodes may exchange messages, one transfer at a time. Messages are relayed
//! only to nodes listed in their precomputed route; direct delivery to the
//! final recipient is always allowed.
//!
//! ## Architecture
//!
//! - **Types** (`types.rs`): Connections, transfers and the transfer log
//! - **Config** (`config.rs`): TOML scenario files
//! - **World** (`world.rs`): Contact/transfer substrate implementing
//!   [`ActiveRouter`](groupsnet_core::ActiveRouter) for one node at a time
//! - **Simulation** (`simulation.rs`): The tick loop
//!
//! ## Example
//!
//! ```rust,ignore
//! use groupsnet_simulation::*;
//!
//! let config = ScenarioConfig::load("scenarios/demo.toml")?;
//! let mut sim = Simulation::from_config(&config)?;
//! sim.run()?;
//!
//! for record in sim.deliveries() {
//!     println!("{record}");
//! }
//! ```

pub mod config;
pub mod simulation;
pub mod types;
pub mod world;

#[cfg(test)]
mod integration_scenarios;

pub use config::{
    ContactConfig, MessageConfig, ScenarioConfig, ScenarioError, SendQueueMode, WorldConfig,
};
pub use simulation::Simulation;
pub use types::{SimConnection, Transfer, TransferKind, TransferRecord};
pub use world::{HostView, NodeState, World};
