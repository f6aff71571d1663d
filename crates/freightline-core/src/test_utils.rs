//! Shared helpers for tests and benches. Compiled only with the
//! `test-utils` feature or under `cfg(test)`.

use crate::economy::Tuning;
use crate::engine::Engine;
use crate::id::NodeId;
use crate::world::{NodeKind, World};

/// A chain of nodes on the x-axis, `spacing` apart, consecutive nodes
/// linked. Returns the world and the node ids in chain order.
pub fn chain(kinds: &[NodeKind], spacing: f64) -> (World, Vec<NodeId>) {
    let mut world = World::new(0.0);
    let ids: Vec<NodeId> = kinds
        .iter()
        .enumerate()
        .map(|(i, &kind)| world.add_node(kind, i as f64 * spacing, 0.0))
        .collect();
    for pair in ids.windows(2) {
        world
            .add_link(pair[0], pair[1])
            .expect("chain links are distinct and fresh");
    }
    (world, ids)
}

/// One factory linked to one city, `distance` apart.
pub fn factory_city_pair(distance: f64) -> (World, NodeId, NodeId) {
    let (world, ids) = chain(&[NodeKind::Factory, NodeKind::City], distance);
    (world, ids[0], ids[1])
}

/// Set a factory's storage directly.
pub fn set_storage(world: &mut World, factory: NodeId, storage: f64) {
    world
        .node_mut(factory)
        .expect("factory exists")
        .as_factory_mut()
        .expect("node is a factory")
        .storage = storage;
}

/// Set a city's accumulated demand directly.
pub fn set_demand(world: &mut World, city: NodeId, demand: f64) {
    world
        .node_mut(city)
        .expect("city exists")
        .as_city_mut()
        .expect("node is a city")
        .current_demand = demand;
}

/// A started engine with the given tuning and a fixed seed.
pub fn started_engine(tuning: Tuning) -> Engine {
    let mut engine = Engine::new(tuning, 0xF8E1_6A7);
    engine.start();
    engine
}

/// Tuning with random events disabled, for tests that assert exact money.
pub fn quiet_tuning() -> Tuning {
    Tuning {
        event_probability: 0.0,
        ..Tuning::default()
    }
}
