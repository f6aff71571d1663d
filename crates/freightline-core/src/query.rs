//! Read-only query API for inspecting simulation state.
//!
//! Snapshot types aggregate world state into convenient views for
//! rendering, HUD, and FFI consumers. All types are owned copies -- no
//! references into internal world storage. Packet snapshots carry an
//! interpolated map position so the renderer never needs the graph.

use crate::id::{LinkId, NodeId, PacketId};
use crate::world::{NodeKind, NodeRole, World};

// ---------------------------------------------------------------------------
// Node snapshot
// ---------------------------------------------------------------------------

/// An owned, read-only view of a single node.
#[derive(Debug, Clone)]
pub struct NodeSnapshot {
    pub id: NodeId,
    pub kind: NodeKind,
    pub x: f64,
    pub y: f64,
    pub capacity: f64,
    /// Kind-specific state: storage/production for factories, demand for
    /// cities.
    pub role: NodeRole,
}

// ---------------------------------------------------------------------------
// Link snapshot
// ---------------------------------------------------------------------------

/// An owned, read-only view of a single link, with endpoint positions
/// resolved so the renderer can draw it directly.
#[derive(Debug, Clone)]
pub struct LinkSnapshot {
    pub id: LinkId,
    pub a: NodeId,
    pub b: NodeId,
    pub ax: f64,
    pub ay: f64,
    pub bx: f64,
    pub by: f64,
    pub distance: f64,
}

// ---------------------------------------------------------------------------
// Packet snapshot
// ---------------------------------------------------------------------------

/// An owned, read-only view of a packet in transit, with its position
/// interpolated between the current hop's endpoints.
#[derive(Debug, Clone)]
pub struct PacketSnapshot {
    pub id: PacketId,
    pub x: f64,
    pub y: f64,
    /// Fraction of the current hop traversed.
    pub progress: f64,
    pub value: f64,
}

// ---------------------------------------------------------------------------
// Snapshot builders
// ---------------------------------------------------------------------------

pub fn snapshot_nodes(world: &World) -> Vec<NodeSnapshot> {
    world
        .nodes()
        .map(|(id, node)| NodeSnapshot {
            id,
            kind: node.kind(),
            x: node.x,
            y: node.y,
            capacity: node.capacity,
            role: node.role.clone(),
        })
        .collect()
}

pub fn snapshot_links(world: &World) -> Vec<LinkSnapshot> {
    world
        .links()
        .filter_map(|(id, link)| {
            let a = world.node(link.a)?;
            let b = world.node(link.b)?;
            Some(LinkSnapshot {
                id,
                a: link.a,
                b: link.b,
                ax: a.x,
                ay: a.y,
                bx: b.x,
                by: b.y,
                distance: link.distance,
            })
        })
        .collect()
}

/// Packets in insertion (render) order. Packets whose current hop endpoints
/// no longer exist are skipped; the mover will discard them on its next
/// pass anyway.
pub fn snapshot_packets(world: &World) -> Vec<PacketSnapshot> {
    world
        .packets()
        .iter()
        .filter_map(|packet| {
            let from = world.node(*packet.path.get(packet.hop)?)?;
            let to_id = packet
                .path
                .get(packet.hop + 1)
                .or_else(|| packet.path.get(packet.hop))?;
            let to = world.node(*to_id)?;
            Some(PacketSnapshot {
                id: packet.id,
                x: from.x + (to.x - from.x) * packet.progress,
                y: from.y + (to.y - from.y) * packet.progress,
                progress: packet.progress,
                value: packet.value,
            })
        })
        .collect()
}
