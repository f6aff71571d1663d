//! The world model: nodes, links, packets, money, and simulated time.
//!
//! The [`World`] is a single owned aggregate; every simulation component
//! takes it by reference from the driver. Nodes and links live in slotmap
//! arenas (stable keys, O(1) removal), packets in a `Vec` whose insertion
//! order is the render and removal order. Links hold non-owning [`NodeId`]
//! endpoints; packets hold non-owning `NodeId` paths. Removing a node
//! cascades to its links, while packets referencing a removed link are
//! discarded lazily by the mover.

use crate::id::{LinkId, NodeId, PacketId};
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

/// Default storage/demand capacity for new nodes.
pub const DEFAULT_CAPACITY: f64 = 500.0;
/// Default factory production rate, units per second.
pub const DEFAULT_PRODUCTION_RATE: f64 = 5.0;
/// Default city demand growth rate, units per second.
pub const DEFAULT_DEMAND_RATE: f64 = 2.0;
/// Default link speed, distance units per second.
pub const DEFAULT_LINK_SPEED: f64 = 100.0;
/// Default link capacity. Advisory only; movement math ignores it.
pub const DEFAULT_LINK_CAPACITY: u32 = 10;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors from world mutation operations. Expected invalid input is an
/// error value, never a panic; callers decide whether to surface it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum WorldError {
    #[error("a link cannot connect a node to itself")]
    SelfLink,
    #[error("a link between these nodes already exists")]
    DuplicateLink,
    #[error("node not found: {0:?}")]
    NodeNotFound(NodeId),
}

// ---------------------------------------------------------------------------
// Nodes
// ---------------------------------------------------------------------------

/// Discriminant for the two node kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    /// Demand sink: accumulates unmet demand, satisfied by arriving packets.
    City,
    /// Supply source: accumulates storage, drained by the dispatcher.
    Factory,
}

/// Kind-specific city state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CityState {
    /// Demand growth, units per second.
    pub demand_rate: f64,
    /// Accumulated unmet demand, clamped to `[0, capacity]`.
    pub current_demand: f64,
}

/// Kind-specific factory state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactoryState {
    /// Production, units per second.
    pub production_rate: f64,
    /// Accumulated goods, clamped to `[0, capacity]`.
    pub storage: f64,
}

/// Kind-specific node state. Enum dispatch keeps the city/factory split
/// closed: a node is exactly one of the two, checked at compile time rather
/// than by comparing kind strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum NodeRole {
    City(CityState),
    Factory(FactoryState),
}

/// A node placed on the map: shared position/capacity plus its role state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub x: f64,
    pub y: f64,
    /// Upper bound for both factory storage and city demand.
    pub capacity: f64,
    pub role: NodeRole,
}

impl Node {
    /// Create a node of the given kind with kind-appropriate defaults.
    pub fn new(kind: NodeKind, x: f64, y: f64) -> Self {
        let role = match kind {
            NodeKind::City => NodeRole::City(CityState {
                demand_rate: DEFAULT_DEMAND_RATE,
                current_demand: 0.0,
            }),
            NodeKind::Factory => NodeRole::Factory(FactoryState {
                production_rate: DEFAULT_PRODUCTION_RATE,
                storage: 0.0,
            }),
        };
        Self {
            x,
            y,
            capacity: DEFAULT_CAPACITY,
            role,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self.role {
            NodeRole::City(_) => NodeKind::City,
            NodeRole::Factory(_) => NodeKind::Factory,
        }
    }

    pub fn as_city(&self) -> Option<&CityState> {
        match &self.role {
            NodeRole::City(city) => Some(city),
            NodeRole::Factory(_) => None,
        }
    }

    pub fn as_city_mut(&mut self) -> Option<&mut CityState> {
        match &mut self.role {
            NodeRole::City(city) => Some(city),
            NodeRole::Factory(_) => None,
        }
    }

    pub fn as_factory(&self) -> Option<&FactoryState> {
        match &self.role {
            NodeRole::Factory(factory) => Some(factory),
            NodeRole::City(_) => None,
        }
    }

    pub fn as_factory_mut(&mut self) -> Option<&mut FactoryState> {
        match &mut self.role {
            NodeRole::Factory(factory) => Some(factory),
            NodeRole::City(_) => None,
        }
    }

    /// Euclidean distance to another node's position.
    pub fn distance_to(&self, other: &Node) -> f64 {
        ((other.x - self.x).powi(2) + (other.y - self.y).powi(2)).sqrt()
    }
}

// ---------------------------------------------------------------------------
// Links
// ---------------------------------------------------------------------------

/// A transport link between two nodes. Stored with an (a, b) order but
/// undirected for traversal: packets and routing treat both directions
/// alike. Distance is frozen at creation from the endpoint positions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Link {
    pub a: NodeId,
    pub b: NodeId,
    /// Euclidean endpoint distance at creation time.
    pub distance: f64,
    /// Packet speed on this link, distance units per second.
    pub speed: f64,
    /// Advisory throughput limit. Unused by movement math.
    pub capacity: u32,
}

impl Link {
    /// Whether this link connects the unordered pair `{x, y}`.
    pub fn connects(&self, x: NodeId, y: NodeId) -> bool {
        (self.a == x && self.b == y) || (self.a == y && self.b == x)
    }

    /// Whether this link has `n` as either endpoint.
    pub fn touches(&self, n: NodeId) -> bool {
        self.a == n || self.b == n
    }

    /// The endpoint opposite `n`, if `n` is an endpoint at all.
    pub fn other_end(&self, n: NodeId) -> Option<NodeId> {
        if self.a == n {
            Some(self.b)
        } else if self.b == n {
            Some(self.a)
        } else {
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Packets
// ---------------------------------------------------------------------------

/// A unit of goods in transit along a path resolved once at spawn time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Packet {
    pub id: PacketId,
    /// Factory the packet was dispatched from.
    pub source: NodeId,
    /// City the packet is bound for.
    pub target: NodeId,
    /// Full node sequence from source to target inclusive (length >= 2).
    pub path: Vec<NodeId>,
    /// Index of the hop currently being traversed.
    pub hop: usize,
    /// Fraction of the current hop traversed, in `[0, 1)`.
    pub progress: f64,
    /// Flat revenue credited on arrival.
    pub value: f64,
}

// ---------------------------------------------------------------------------
// World
// ---------------------------------------------------------------------------

/// All mutable game state for one session. Owned by the driver; components
/// receive it by reference each step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct World {
    nodes: SlotMap<NodeId, Node>,
    links: SlotMap<LinkId, Link>,
    pub(crate) packets: Vec<Packet>,
    /// Signed money accumulator. Going below zero is bankruptcy.
    pub money: f64,
    /// Simulated time in seconds. Monotonic.
    pub time: f64,
    next_packet: u64,
}

impl World {
    /// Create an empty world with the given starting money.
    pub fn new(starting_money: f64) -> Self {
        Self {
            nodes: SlotMap::with_key(),
            links: SlotMap::with_key(),
            packets: Vec::new(),
            money: starting_money,
            time: 0.0,
            next_packet: 0,
        }
    }

    // -----------------------------------------------------------------------
    // Node operations
    // -----------------------------------------------------------------------

    /// Add a node with kind-appropriate defaults. The closed [`NodeKind`]
    /// enum makes an unrecognized kind unrepresentable, so this cannot fail.
    pub fn add_node(&mut self, kind: NodeKind, x: f64, y: f64) -> NodeId {
        self.nodes.insert(Node::new(kind, x, y))
    }

    /// Remove a node and every link touching it. Packets whose paths
    /// reference the node are left in place; the mover discards them when
    /// their current hop's link turns out to be missing.
    pub fn remove_node(&mut self, node: NodeId) -> Option<Node> {
        let removed = self.nodes.remove(node)?;
        self.links.retain(|_, link| !link.touches(node));
        Some(removed)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter()
    }

    pub fn nodes_mut(&mut self) -> impl Iterator<Item = (NodeId, &mut Node)> {
        self.nodes.iter_mut()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    // -----------------------------------------------------------------------
    // Link operations
    // -----------------------------------------------------------------------

    /// Connect two nodes with a link. Fails on self-links, on a duplicate
    /// undirected pair, and on missing endpoints. Distance is computed from
    /// the endpoint positions once, here; speed and capacity take their
    /// fixed defaults.
    pub fn add_link(&mut self, a: NodeId, b: NodeId) -> Result<LinkId, WorldError> {
        if a == b {
            return Err(WorldError::SelfLink);
        }
        if self.link_between(a, b).is_some() {
            return Err(WorldError::DuplicateLink);
        }
        let node_a = self.nodes.get(a).ok_or(WorldError::NodeNotFound(a))?;
        let node_b = self.nodes.get(b).ok_or(WorldError::NodeNotFound(b))?;
        let distance = node_a.distance_to(node_b);
        Ok(self.links.insert(Link {
            a,
            b,
            distance,
            speed: DEFAULT_LINK_SPEED,
            capacity: DEFAULT_LINK_CAPACITY,
        }))
    }

    /// Remove a link by id.
    pub fn remove_link(&mut self, link: LinkId) -> Option<Link> {
        self.links.remove(link)
    }

    /// Find the link connecting the unordered pair `{a, b}`, if any.
    /// Linear scan; fine at the graph sizes this game reaches.
    pub fn link_between(&self, a: NodeId, b: NodeId) -> Option<LinkId> {
        self.links
            .iter()
            .find(|(_, link)| link.connects(a, b))
            .map(|(id, _)| id)
    }

    pub fn link(&self, id: LinkId) -> Option<&Link> {
        self.links.get(id)
    }

    pub fn links(&self) -> impl Iterator<Item = (LinkId, &Link)> {
        self.links.iter()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    // -----------------------------------------------------------------------
    // Packet operations
    // -----------------------------------------------------------------------

    /// Add a packet with a freshly assigned id. The path must run from
    /// source to target inclusive; anything shorter than two nodes has no
    /// hop to travel and spawns nothing.
    pub fn spawn_packet(&mut self, path: Vec<NodeId>, value: f64) -> Option<PacketId> {
        let [source, .., target] = path[..] else {
            return None;
        };
        let id = PacketId(self.next_packet);
        self.next_packet += 1;
        self.packets.push(Packet {
            id,
            source,
            target,
            path,
            hop: 0,
            progress: 0.0,
            value,
        });
        Some(id)
    }

    pub fn packets(&self) -> &[Packet] {
        &self.packets
    }

    pub fn packet_count(&self) -> usize {
        self.packets.len()
    }
}
