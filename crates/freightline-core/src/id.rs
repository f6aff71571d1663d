use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    /// Identifies a node (city or factory) on the map.
    pub struct NodeId;

    /// Identifies a transport link between two nodes.
    pub struct LinkId;
}

/// Identifies a packet in transit. Packets live in a plain `Vec` (insertion
/// order is render/removal order), so this is a monotonically increasing
/// counter rather than an arena key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PacketId(pub u64);
