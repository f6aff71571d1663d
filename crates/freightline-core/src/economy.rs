//! Economic accrual, maintenance, tuning constants, and terminal outcomes.

use crate::world::{NodeRole, World};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Tuning
// ---------------------------------------------------------------------------

/// Every gameplay constant in one place. `Default` mirrors the shipped
/// balance; hosts may deserialize overrides from a config file. Unknown
/// fields fall back to their defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Money at the start of a session.
    pub starting_money: f64,
    /// Build cost of a city.
    pub city_cost: f64,
    /// Build cost of a factory.
    pub factory_cost: f64,
    /// Link build cost per unit of distance; the total is floored.
    pub link_cost_per_unit: f64,
    /// Upkeep per node per maintenance interval.
    pub maintenance_per_node: f64,
    /// Upkeep per link per maintenance interval.
    pub maintenance_per_link: f64,
    /// Seconds between maintenance charges.
    pub maintenance_interval: f64,
    /// Money at or above which the session ends in victory.
    pub victory_threshold: f64,
    /// Revenue per delivered packet.
    pub packet_value: f64,
    /// Update calls between dispatcher runs (a tick counter, not seconds).
    pub dispatch_interval: u64,
    /// Simulated seconds between random-event rolls.
    pub event_check_interval: f64,
    /// Probability that a roll triggers an event.
    pub event_probability: f64,
    /// Upper bound on a single step's dt, in seconds. Bounds the damage a
    /// long real-time gap (a backgrounded host) can do to one update.
    pub max_step: f64,
}

impl Tuning {
    /// Clamp degenerate values a config override can introduce. A zero
    /// dispatch interval would otherwise be a remainder-by-zero in the
    /// step loop; it becomes every-tick dispatch instead.
    pub fn sanitized(mut self) -> Self {
        self.dispatch_interval = self.dispatch_interval.max(1);
        self
    }
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            starting_money: 2000.0,
            city_cost: 500.0,
            factory_cost: 1000.0,
            link_cost_per_unit: 1.0,
            maintenance_per_node: 1.0,
            maintenance_per_link: 0.5,
            maintenance_interval: 1.0,
            victory_threshold: 10_000.0,
            packet_value: 100.0,
            dispatch_interval: 60,
            event_check_interval: 10.0,
            event_probability: 0.3,
            max_step: 0.1,
        }
    }
}

// ---------------------------------------------------------------------------
// Accrual
// ---------------------------------------------------------------------------

/// Advance production and demand by `dt` seconds. Factory storage and city
/// demand both clamp to `[0, capacity]` here, before maintenance and the
/// outcome check run -- the in-step ordering is load-bearing for
/// reproducibility.
pub fn accrue(world: &mut World, dt: f64) {
    for (_, node) in world.nodes_mut() {
        let capacity = node.capacity;
        match &mut node.role {
            NodeRole::Factory(factory) => {
                factory.storage += factory.production_rate * dt;
                factory.storage = factory.storage.clamp(0.0, capacity);
            }
            NodeRole::City(city) => {
                city.current_demand += city.demand_rate * dt;
                city.current_demand = city.current_demand.clamp(0.0, capacity);
            }
        }
    }
}

/// Upkeep for one maintenance interval at the world's current size.
pub fn maintenance_cost(world: &World, tuning: &Tuning) -> f64 {
    world.node_count() as f64 * tuning.maintenance_per_node
        + world.link_count() as f64 * tuning.maintenance_per_link
}

// ---------------------------------------------------------------------------
// Terminal outcomes
// ---------------------------------------------------------------------------

/// Terminal session outcome. Either stops the simulation for good.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Bankruptcy,
    Victory,
}

impl Outcome {
    /// The game-over message shown to the player.
    pub fn message(self) -> &'static str {
        match self {
            Outcome::Bankruptcy => "Bankruptcy! You ran out of money.",
            Outcome::Victory => "Victory! You are a Logistics Tycoon.",
        }
    }
}

/// Check the win/lose thresholds. Bankruptcy is strictly below zero;
/// victory is at or above the threshold.
pub fn check_outcome(money: f64, tuning: &Tuning) -> Option<Outcome> {
    if money < 0.0 {
        Some(Outcome::Bankruptcy)
    } else if money >= tuning.victory_threshold {
        Some(Outcome::Victory)
    } else {
        None
    }
}
