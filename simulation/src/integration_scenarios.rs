//! Integration scenarios
//!
//! End-to-end runs that load a scenario and a route file from disk, then
//! check the transfer log against the forwarding rules.

use groupsnet_core::{MessageId, NodeAddress};
use groupsnet_routing::RouteTableError;
use tempfile::TempDir;

use crate::config::{ScenarioConfig, ScenarioError};
use crate::simulation::Simulation;
use crate::types::{TransferKind, TransferRecord};

/// Four nodes: 0 meets 1, then 1 meets 3. Message "1" goes from 0 to 3.
const RELAY_SCENARIO: &str = r#"
[router]
routes_file = "routes.txt"

[world]
nodes = 4
duration = 12
transfer_speed = 100

[[contacts]]
a = 0
b = 1
up = 0
down = 5

[[contacts]]
a = 1
b = 3
up = 5
down = 10

[[messages]]
id = "1"
from = 0
to = 3
size = 100
at = 0
"#;

fn write_scenario(scenario: &str, routes: &str) -> (TempDir, ScenarioConfig) {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("routes.txt"), routes).unwrap();
    let path = dir.path().join("scenario.toml");
    std::fs::write(&path, scenario).unwrap();

    let config = ScenarioConfig::load(&path).unwrap();
    (dir, config)
}

fn run(scenario: &str, routes: &str) -> Simulation {
    let (_dir, config) = write_scenario(scenario, routes);
    let mut sim = Simulation::from_config(&config).unwrap();
    sim.run().unwrap();
    sim
}

fn record(tick: u64, id: &str, from: u32, to: u32, kind: TransferKind) -> TransferRecord {
    TransferRecord {
        tick,
        message: MessageId::new(id),
        from: NodeAddress(from),
        to: NodeAddress(to),
        kind,
    }
}

/// A message is relayed through a node on its route, then delivered
#[test]
fn test_relay_along_route() {
    let sim = run(RELAY_SCENARIO, "1 1 2\n");

    assert_eq!(
        sim.log(),
        &[
            record(1, "1", 0, 1, TransferKind::Relayed),
            record(6, "1", 1, 3, TransferKind::Delivered),
        ]
    );
    assert!(sim.world.was_delivered(NodeAddress(3), &MessageId::new("1")));
    // The relay dropped its copy on delivery, the source kept its own
    assert!(!sim.world.has_message(NodeAddress(1), &MessageId::new("1")));
    assert!(sim.world.has_message(NodeAddress(0), &MessageId::new("1")));
}

/// A node missing from the route never receives a relay copy
#[test]
fn test_no_relay_off_route() {
    let sim = run(RELAY_SCENARIO, "1 2\n");

    assert!(sim.log().is_empty());
    assert!(sim.world.has_message(NodeAddress(0), &MessageId::new("1")));
    assert!(!sim.world.has_message(NodeAddress(1), &MessageId::new("1")));
    assert_eq!(sim.deliveries().count(), 0);
}

/// A message without a route is kept for direct delivery only
#[test]
fn test_missing_route_fails_closed() {
    let sim = run(RELAY_SCENARIO, "7 1 2 3\n");

    assert!(sim.log().is_empty());
    let node = sim.world.node(NodeAddress(0)).unwrap();
    assert_eq!(node.buffer.len(), 1);
    assert_eq!(node.buffer[0].route(), None);
}

/// Direct delivery works even without a route
#[test]
fn test_missing_route_still_delivers_directly() {
    let scenario = r#"
        [router]
        routes_file = "routes.txt"

        [world]
        nodes = 2
        duration = 5

        [[contacts]]
        a = 0
        b = 1
        up = 1
        down = 4

        [[messages]]
        id = "42"
        from = 0
        to = 1
        size = 10
        at = 0
    "#;
    let sim = run(scenario, "");

    assert_eq!(sim.log(), &[record(2, "42", 0, 1, TransferKind::Delivered)]);
}

/// Under the reject policy a message without a route stops the run
#[test]
fn test_missing_route_rejected() {
    let scenario = RELAY_SCENARIO.replace(
        "routes_file = \"routes.txt\"",
        "routes_file = \"routes.txt\"\nmissing_route = \"reject\"",
    );
    let (_dir, config) = write_scenario(&scenario, "7 1 2 3\n");
    let mut sim = Simulation::from_config(&config).unwrap();

    let result = sim.step();
    assert!(matches!(result, Err(ScenarioError::Routing(_))));
}

/// A missing route file is fatal before any tick runs
#[test]
fn test_missing_route_file_is_fatal() {
    let (dir, config) = write_scenario(RELAY_SCENARIO, "1 1 2\n");
    std::fs::remove_file(dir.path().join("routes.txt")).unwrap();

    let result = Simulation::from_config(&config);
    assert!(matches!(
        result,
        Err(ScenarioError::RouteTable(RouteTableError::Open { .. }))
    ));
}

/// A malformed route file is fatal before any tick runs
#[test]
fn test_malformed_route_file_is_fatal() {
    let (_dir, config) = write_scenario(RELAY_SCENARIO, "1 one 2\n");

    let result = Simulation::from_config(&config);
    assert!(matches!(
        result,
        Err(ScenarioError::RouteTable(RouteTableError::InvalidToken { line: 1, .. }))
    ));
}

/// A contact that closes mid-transfer aborts it
#[test]
fn test_contact_loss_aborts_transfer() {
    let scenario = RELAY_SCENARIO.replace("size = 100", "size = 500");
    let sim = run(&scenario, "1 1 2\n");

    assert_eq!(sim.log()[0], record(5, "1", 0, 1, TransferKind::Aborted));
    assert!(!sim.world.has_message(NodeAddress(1), &MessageId::new("1")));
    assert_eq!(sim.deliveries().count(), 0);
}

/// Delivery to a connected recipient wins over relaying to route members
#[test]
fn test_direct_delivery_preempts_relay() {
    let scenario = r#"
        [router]
        routes_file = "routes.txt"

        [world]
        nodes = 4
        duration = 6

        [[contacts]]
        a = 0
        b = 1
        up = 0
        down = 6

        [[contacts]]
        a = 0
        b = 2
        up = 0
        down = 6

        [[contacts]]
        a = 0
        b = 3
        up = 0
        down = 6

        [[messages]]
        id = "5"
        from = 0
        to = 3
        size = 10
        at = 0
    "#;
    let sim = run(scenario, "5 1 2\n");

    assert_eq!(sim.log(), &[record(1, "5", 0, 3, TransferKind::Delivered)]);
}

/// The random send queue is reproducible for a fixed seed
#[test]
fn test_random_queue_is_seeded() {
    let scenario = r#"
        [router]
        routes_file = "routes.txt"

        [world]
        nodes = 4
        duration = 8
        send_queue = "random"
        seed = 11

        [[contacts]]
        a = 0
        b = 1
        up = 0
        down = 8

        [[messages]]
        id = "1"
        from = 0
        to = 3
        size = 10
        at = 0

        [[messages]]
        id = "2"
        from = 0
        to = 3
        size = 10
        at = 0

        [[messages]]
        id = "3"
        from = 0
        to = 3
        size = 10
        at = 0
    "#;
    let routes = "1 1\n2 1\n3 1\n";

    let first = run(scenario, routes);
    let second = run(scenario, routes);

    assert_eq!(first.log(), second.log());
    assert_eq!(first.log().len(), 3);
    assert!(first.log().iter().all(|r| r.kind == TransferKind::Relayed));
}

/// Overlapping contacts between one pair are refused when the scenario loads
#[test]
fn test_overlapping_contacts_refused_on_load() {
    let scenario = RELAY_SCENARIO.replace(
        "a = 1\nb = 3\nup = 5\ndown = 10",
        "a = 1\nb = 0\nup = 3\ndown = 10",
    );
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("scenario.toml");
    std::fs::write(&path, scenario).unwrap();

    let result = ScenarioConfig::load(&path);
    assert!(matches!(result, Err(ScenarioError::Invalid(_))));
}

/// A contact that ends as the next one for the same pair begins keeps the pair connected
#[test]
fn test_back_to_back_contacts_stay_connected() {
    let scenario = RELAY_SCENARIO.replace(
        "a = 1\nb = 3\nup = 5\ndown = 10",
        "a = 1\nb = 0\nup = 5\ndown = 10",
    );
    let (_dir, config) = write_scenario(&scenario, "1 1 2\n");
    let mut sim = Simulation::from_config(&config).unwrap();

    for _ in 0..10 {
        sim.step().unwrap();
        assert_eq!(sim.world.links().len(), 1, "tick {}", sim.tick() - 1);
    }
    sim.step().unwrap();
    assert!(sim.world.links().is_empty());
}
