//! Simulation engine for GroupsNet
//!
//! Discrete-time loop over a fixed contact schedule. Each tick:
//! 1. Scheduled messages are created through their node's router
//! 2. Contacts due to close go down, contacts due to open come up
//! 3. Transfers in flight advance by one tick
//! 4. Every node's router runs its forwarding policy, in address order

use groupsnet_core::{Message, NodeAddress};
use groupsnet_routing::{GroupsNetRouter, GroupsNetRouterFactory};
use tracing::{debug, info, trace};

use crate::config::{ContactConfig, MessageConfig, ScenarioConfig, ScenarioError};
use crate::types::{TransferKind, TransferRecord};
use crate::world::World;

/// The simulation state
#[derive(Debug)]
pub struct Simulation {
    /// Shared node state
    pub world: World,
    /// One router per node, indexed by address
    routers: Vec<GroupsNetRouter>,
    contacts: Vec<ContactConfig>,
    messages: Vec<MessageConfig>,
    /// Next tick to run
    tick: u64,
    duration: u64,
}

impl Simulation {
    /// Build a simulation from a scenario, loading its route table
    ///
    /// Fails before any tick runs if the route table cannot be loaded.
    pub fn from_config(config: &ScenarioConfig) -> Result<Self, ScenarioError> {
        let factory = GroupsNetRouterFactory::from_settings(&config.router)?;
        Ok(Self::with_factory(config, &factory))
    }

    /// Build a simulation whose routers come from an existing factory
    pub fn with_factory(config: &ScenarioConfig, factory: &GroupsNetRouterFactory) -> Self {
        let routers = (0..config.world.nodes).map(|_| factory.replicate()).collect();
        info!(
            nodes = config.world.nodes,
            contacts = config.contacts.len(),
            messages = config.messages.len(),
            routes = factory.routes().len(),
            "Simulation initialized"
        );

        Self {
            world: World::new(&config.world),
            routers,
            contacts: config.contacts.clone(),
            messages: config.messages.clone(),
            tick: 0,
            duration: config.world.duration,
        }
    }

    /// Next tick to run
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Check if the configured duration has been reached
    pub fn is_finished(&self) -> bool {
        self.tick >= self.duration
    }

    /// Finished and aborted transfers so far
    pub fn log(&self) -> &[TransferRecord] {
        self.world.log()
    }

    /// Transfers that reached their final recipient
    pub fn deliveries(&self) -> impl Iterator<Item = &TransferRecord> {
        self.world
            .log()
            .iter()
            .filter(|r| r.kind == TransferKind::Delivered)
    }

    /// Run a single simulation tick
    ///
    /// Messages are created before contacts or transfers change, so a
    /// refused message leaves links and transfers as they were and the
    /// tick counter unmoved.
    pub fn step(&mut self) -> Result<(), ScenarioError> {
        let tick = self.tick;
        trace!("=== Tick {} ===", tick);
        self.world.set_tick(tick);

        self.create_messages(tick)?;
        self.process_contacts(tick);
        self.world.progress_transfers();

        for (address, router) in self.routers.iter().enumerate() {
            let node = NodeAddress(address as u32);
            let outcome = router.update(&mut self.world.host(node));
            trace!(tick, node = %node, outcome = ?outcome, "Router updated");
        }

        self.tick += 1;
        Ok(())
    }

    /// Run until the configured duration
    pub fn run(&mut self) -> Result<(), ScenarioError> {
        while !self.is_finished() {
            self.step()?;
        }

        info!(
            tick = self.tick,
            transfers = self.log().len(),
            delivered = self.deliveries().count(),
            "Simulation complete"
        );
        Ok(())
    }

    /// Run for a specific number of ticks, ignoring the configured duration
    pub fn run_ticks(&mut self, ticks: u64) -> Result<(), ScenarioError> {
        for _ in 0..ticks {
            self.step()?;
        }
        Ok(())
    }

    fn process_contacts(&mut self, tick: u64) {
        for contact in &self.contacts {
            if contact.down == tick {
                self.world
                    .close_link(NodeAddress(contact.a), NodeAddress(contact.b));
            }
        }
        for contact in &self.contacts {
            if contact.up == tick {
                self.world
                    .open_link(NodeAddress(contact.a), NodeAddress(contact.b));
            }
        }
    }

    fn create_messages(&mut self, tick: u64) -> Result<(), ScenarioError> {
        for scheduled in self.messages.iter().filter(|m| m.at == tick) {
            let from = NodeAddress(scheduled.from);
            let Some(router) = self.routers.get(scheduled.from as usize) else {
                continue;
            };

            let to = NodeAddress(scheduled.to);
            let message = Message::new(scheduled.id.as_str(), from, to, scheduled.size, tick);
            let admitted = router.create_new_message(&mut self.world.host(from), message)?;
            if !admitted {
                debug!(tick, node = %from, message = %scheduled.id, "Message not admitted");
            }
        }
        Ok(())
    }
}
