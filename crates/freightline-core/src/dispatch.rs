//! Packet dispatch: demand-weighted factory-to-city matching.
//!
//! The driver gates this to one run per `dispatch_interval` ticks; each
//! eligible run is one dispatch cycle. A cycle lets every factory with at
//! least one whole unit of storage send exactly one packet to the neediest
//! city it can reach. Unreachable cities are skipped without error; a
//! factory that finds no match simply spawns nothing this cycle.

use crate::economy::Tuning;
use crate::id::NodeId;
use crate::routing::shortest_path;
use crate::world::World;
use std::cmp::Ordering;

/// Run one dispatch cycle. Returns the number of packets spawned.
pub fn run(world: &mut World, tuning: &Tuning) -> u32 {
    let factories: Vec<NodeId> = world
        .nodes()
        .filter(|(_, node)| node.as_factory().is_some())
        .map(|(id, _)| id)
        .collect();

    // Cities ranked by descending demand. Demand only changes on arrival,
    // never on spawn, so one ranking serves the whole cycle. The sort is
    // stable; ties keep arena iteration order.
    let mut cities: Vec<(NodeId, f64)> = world
        .nodes()
        .filter_map(|(id, node)| node.as_city().map(|city| (id, city.current_demand)))
        .collect();
    cities.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

    let mut spawned = 0;
    for factory in factories {
        let has_stock = world
            .node(factory)
            .and_then(|n| n.as_factory())
            .is_some_and(|f| f.storage >= 1.0);
        if !has_stock {
            continue;
        }

        for &(city, demand) in &cities {
            if demand <= 0.0 {
                continue;
            }
            let Some(path) = shortest_path(world, factory, city) else {
                continue;
            };
            if path.len() < 2 {
                continue;
            }

            // Commit: one packet enters the world, one unit leaves storage.
            // The length check above guarantees the spawn lands.
            if world.spawn_packet(path, tuning.packet_value).is_some() {
                if let Some(state) = world.node_mut(factory).and_then(|n| n.as_factory_mut()) {
                    state.storage -= 1.0;
                }
                spawned += 1;
            }
            break;
        }
    }
    spawned
}
