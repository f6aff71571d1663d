//! Shortest-path routing over the live transport graph.
//!
//! Dijkstra by cumulative link distance (not hop count), run fresh per
//! spawn decision -- the graph may have changed since the last call, so
//! nothing is cached. The unvisited set is scanned linearly for the
//! minimum; O(V^2) is acceptable at the graph sizes players build. Ties
//! resolve to the first minimum in arena iteration order, which is
//! deterministic for a given world.

use crate::id::NodeId;
use crate::world::World;
use slotmap::SecondaryMap;

/// Shortest path from `source` to `target` as the full node sequence,
/// endpoints inclusive. Returns `None` when the target is unreachable or
/// either endpoint is missing. A `source == target` call returns a
/// single-node path; callers treat paths shorter than two nodes as
/// unusable for spawning.
pub fn shortest_path(world: &World, source: NodeId, target: NodeId) -> Option<Vec<NodeId>> {
    world.node(source)?;
    world.node(target)?;

    let mut dist: SecondaryMap<NodeId, f64> = SecondaryMap::new();
    let mut prev: SecondaryMap<NodeId, NodeId> = SecondaryMap::new();
    let mut unvisited: Vec<NodeId> = Vec::with_capacity(world.node_count());
    for (id, _) in world.nodes() {
        dist.insert(id, f64::INFINITY);
        unvisited.push(id);
    }
    dist[source] = 0.0;

    while !unvisited.is_empty() {
        // Linear scan for the closest unvisited node. Strict less-than:
        // the first minimum found wins on ties.
        let mut closest: Option<(usize, NodeId)> = None;
        let mut min_dist = f64::INFINITY;
        for (index, &id) in unvisited.iter().enumerate() {
            if dist[id] < min_dist {
                min_dist = dist[id];
                closest = Some((index, id));
            }
        }

        // Only unreachable nodes remain.
        let Some((index, current)) = closest else {
            break;
        };
        if current == target {
            break;
        }
        unvisited.remove(index);

        for (_, link) in world.links() {
            let Some(neighbor) = link.other_end(current) else {
                continue;
            };
            if !unvisited.contains(&neighbor) {
                continue;
            }
            let alt = dist[current] + link.distance;
            if alt < dist[neighbor] {
                dist[neighbor] = alt;
                prev.insert(neighbor, current);
            }
        }
    }

    // Walk predecessors back from the target. A missing predecessor on a
    // non-source node means the target was never reached.
    let mut path = vec![target];
    let mut current = target;
    while current != source {
        let Some(&p) = prev.get(current) else {
            return None;
        };
        current = p;
        path.push(current);
    }
    path.reverse();
    Some(path)
}

/// Total cost of a path: the sum of link distances along consecutive hops.
/// `None` if any hop has no connecting link.
pub fn path_cost(world: &World, path: &[NodeId]) -> Option<f64> {
    let mut total = 0.0;
    for pair in path.windows(2) {
        let link = world.link_between(pair[0], pair[1])?;
        total += world.link(link)?.distance;
    }
    Some(total)
}
