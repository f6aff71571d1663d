//! The simulation driver: owns the world and runs the per-step pipeline.
//!
//! Single-threaded cooperative stepping: the host calls [`Engine::step`]
//! with elapsed real seconds once per frame. Each step runs the phases in
//! a fixed order (accrual, maintenance, outcome check, events, dispatch,
//! movement); the ordering is part of the simulation contract. Terminal
//! outcomes clear the running flag, after which `step` is a no-op until a
//! fresh session is constructed.

use crate::dispatch;
use crate::economy::{self, Outcome, Tuning};
use crate::event::{EventEngine, Notice, NoticeBus};
use crate::id::{LinkId, NodeId};
use crate::movement;
use crate::query::{LinkSnapshot, NodeSnapshot, PacketSnapshot};
use crate::rng::SimRng;
use crate::world::{Node, NodeKind, World, WorldError};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors from the charged build operations.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum BuildError {
    #[error("insufficient funds: need {needed}, have {available}")]
    InsufficientFunds { needed: f64, available: f64 },
    #[error(transparent)]
    World(#[from] WorldError),
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// The simulation driver for one game session.
#[derive(Debug)]
pub struct Engine {
    world: World,
    tuning: Tuning,
    rng: SimRng,
    events: EventEngine,
    notices: NoticeBus,
    /// Update counter; the dispatcher cadence is keyed to it.
    tick: u64,
    /// Seconds until the next maintenance charge.
    next_maintenance: f64,
    /// Simulation speed multiplier applied after the dt cap.
    speed: f64,
    running: bool,
    outcome: Option<Outcome>,
}

impl Engine {
    /// Create a stopped engine with the given tuning and RNG seed. The
    /// tuning is sanitized on the way in, so deserialized overrides cannot
    /// smuggle in a divide-by-zero cadence.
    pub fn new(tuning: Tuning, seed: u64) -> Self {
        let tuning = tuning.sanitized();
        let world = World::new(tuning.starting_money);
        Self {
            world,
            next_maintenance: tuning.maintenance_interval,
            tuning,
            rng: SimRng::new(seed),
            events: EventEngine::new(),
            notices: NoticeBus::new(),
            tick: 0,
            speed: 1.0,
            running: false,
            outcome: None,
        }
    }

    // -----------------------------------------------------------------------
    // Control
    // -----------------------------------------------------------------------

    /// Begin (or resume) stepping. Once a terminal outcome has fired the
    /// session stays stopped; a new session requires a new engine.
    pub fn start(&mut self) {
        if self.outcome.is_none() {
            self.running = true;
        }
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// Set the simulation speed multiplier.
    pub fn set_speed(&mut self, speed: f64) {
        self.speed = speed.max(0.0);
    }

    // -----------------------------------------------------------------------
    // Stepping
    // -----------------------------------------------------------------------

    /// Advance the simulation by one step of `dt` real seconds. No-op when
    /// stopped. `dt` is capped at `tuning.max_step` before the speed
    /// multiplier applies, bounding the effect of long host stalls.
    pub fn step(&mut self, dt: f64) {
        if !self.running {
            return;
        }
        let dt = dt.min(self.tuning.max_step) * self.speed;

        self.world.time += dt;
        self.tick += 1;

        economy::accrue(&mut self.world, dt);

        // Maintenance countdown resets to exactly one interval rather than
        // carrying the overshoot: a long dt that crosses several intervals
        // still charges once per call. Intentional rate limiting.
        self.next_maintenance -= dt;
        if self.next_maintenance <= 0.0 {
            self.world.money -= economy::maintenance_cost(&self.world, &self.tuning);
            self.next_maintenance = self.tuning.maintenance_interval;
        }

        if self.outcome.is_none() {
            if let Some(outcome) = economy::check_outcome(self.world.money, &self.tuning) {
                self.outcome = Some(outcome);
                self.running = false;
                self.notices.push(Notice::GameOver { outcome });
                // The rest of this step still runs, matching the established
                // in-step ordering; subsequent calls are no-ops.
            }
        }

        let now = self.world.time;
        self.events
            .poll(&mut self.world, now, &self.tuning, &mut self.rng, &mut self.notices);

        if self.tick % self.tuning.dispatch_interval == 0 {
            dispatch::run(&mut self.world, &self.tuning);
        }

        movement::advance(&mut self.world, dt);
    }

    // -----------------------------------------------------------------------
    // Build operations (charged)
    // -----------------------------------------------------------------------

    /// Place a node, charging its build cost. The deduction commits only
    /// after the add succeeds, so a failure never costs money.
    pub fn build_node(&mut self, kind: NodeKind, x: f64, y: f64) -> Result<NodeId, BuildError> {
        let cost = match kind {
            NodeKind::City => self.tuning.city_cost,
            NodeKind::Factory => self.tuning.factory_cost,
        };
        self.ensure_funds(cost)?;
        let id = self.world.add_node(kind, x, y);
        self.world.money -= cost;
        Ok(id)
    }

    /// Connect two nodes, charging by distance (floored). Checks funds
    /// against the would-be distance first, attempts the add, and deducts
    /// only on success -- a duplicate or self link charges nothing.
    pub fn build_link(&mut self, a: NodeId, b: NodeId) -> Result<LinkId, BuildError> {
        let node_a = self.world.node(a).ok_or(WorldError::NodeNotFound(a))?;
        let node_b = self.world.node(b).ok_or(WorldError::NodeNotFound(b))?;
        let cost = (node_a.distance_to(node_b) * self.tuning.link_cost_per_unit).floor();
        self.ensure_funds(cost)?;
        let id = self.world.add_link(a, b)?;
        self.world.money -= cost;
        Ok(id)
    }

    /// Remove a node and its links. Demolition is free.
    pub fn demolish_node(&mut self, id: NodeId) -> Option<Node> {
        self.world.remove_node(id)
    }

    fn ensure_funds(&self, needed: f64) -> Result<(), BuildError> {
        if self.world.money < needed {
            return Err(BuildError::InsufficientFunds {
                needed,
                available: self.world.money,
            });
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Read access
    // -----------------------------------------------------------------------

    pub fn world(&self) -> &World {
        &self.world
    }

    /// Direct mutable world access for scenario setup and embedding hosts.
    /// User actions should go through the build/demolish entry points.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn money(&self) -> f64 {
        self.world.money
    }

    pub fn time(&self) -> f64 {
        self.world.time
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    // -----------------------------------------------------------------------
    // Notices
    // -----------------------------------------------------------------------

    /// Take all buffered notices, oldest first.
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        self.notices.drain()
    }

    /// Register a string sink that receives every notice as it fires.
    pub fn set_notice_sink(&mut self, sink: Box<dyn FnMut(&str)>) {
        self.notices.set_sink(sink);
    }

    // -----------------------------------------------------------------------
    // Snapshots
    // -----------------------------------------------------------------------

    pub fn snapshot_nodes(&self) -> Vec<NodeSnapshot> {
        crate::query::snapshot_nodes(&self.world)
    }

    pub fn snapshot_links(&self) -> Vec<LinkSnapshot> {
        crate::query::snapshot_links(&self.world)
    }

    pub fn snapshot_packets(&self) -> Vec<PacketSnapshot> {
        crate::query::snapshot_packets(&self.world)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started(tuning: Tuning) -> Engine {
        let mut engine = Engine::new(tuning, 42);
        engine.start();
        engine
    }

    #[test]
    fn step_is_noop_when_stopped() {
        let mut engine = Engine::new(Tuning::default(), 42);
        engine.step(0.1);
        assert_eq!(engine.time(), 0.0);
        assert_eq!(engine.tick(), 0);
    }

    #[test]
    fn dt_is_capped() {
        let mut engine = started(Tuning::default());
        engine.step(5.0);
        assert_eq!(engine.time(), 0.1);
    }

    #[test]
    fn speed_multiplier_scales_dt() {
        let mut engine = started(Tuning::default());
        engine.set_speed(2.0);
        engine.step(0.1);
        assert_eq!(engine.time(), 0.2);
    }

    #[test]
    fn build_node_charges_cost() {
        let mut engine = Engine::new(Tuning::default(), 42);
        engine.build_node(NodeKind::City, 0.0, 0.0).unwrap();
        assert_eq!(engine.money(), 1500.0);
        engine.build_node(NodeKind::Factory, 50.0, 0.0).unwrap();
        assert_eq!(engine.money(), 500.0);
    }

    #[test]
    fn build_node_fails_without_funds_and_adds_nothing() {
        let tuning = Tuning {
            starting_money: 100.0,
            ..Tuning::default()
        };
        let mut engine = Engine::new(tuning, 42);
        let err = engine.build_node(NodeKind::Factory, 0.0, 0.0).unwrap_err();
        assert!(matches!(err, BuildError::InsufficientFunds { .. }));
        assert_eq!(engine.money(), 100.0);
        assert_eq!(engine.world().node_count(), 0);
    }

    #[test]
    fn failed_link_charges_nothing() {
        let mut engine = Engine::new(Tuning::default(), 42);
        let a = engine.build_node(NodeKind::City, 0.0, 0.0).unwrap();
        let b = engine.build_node(NodeKind::Factory, 100.0, 0.0).unwrap();
        engine.build_link(a, b).unwrap();
        let after_first = engine.money();

        assert!(engine.build_link(a, b).is_err());
        assert!(engine.build_link(a, a).is_err());
        assert_eq!(engine.money(), after_first);
        assert_eq!(engine.world().link_count(), 1);
    }

    #[test]
    fn link_cost_is_floored_distance() {
        let mut engine = Engine::new(Tuning::default(), 42);
        let a = engine.build_node(NodeKind::City, 0.0, 0.0).unwrap();
        let b = engine.build_node(NodeKind::Factory, 30.0, 40.0).unwrap();
        let before = engine.money();
        engine.build_link(a, b).unwrap();
        assert_eq!(engine.money(), before - 50.0);
    }

    #[test]
    fn bankruptcy_fires_once_and_stays_stopped() {
        let mut engine = started(Tuning::default());
        engine.world_mut().money = -10.0;

        engine.step(0.05);
        assert_eq!(engine.outcome(), Some(Outcome::Bankruptcy));
        assert!(!engine.is_running());
        let notices = engine.drain_notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].to_string(), "Bankruptcy! You ran out of money.");

        // start() must not revive a finished session.
        engine.start();
        engine.step(0.05);
        assert!(engine.drain_notices().is_empty());
        assert!(!engine.is_running());
    }

    #[test]
    fn victory_fires_once() {
        let mut engine = started(Tuning::default());
        engine.world_mut().money = 20_000.0;

        engine.step(0.05);
        assert_eq!(engine.outcome(), Some(Outcome::Victory));
        let notices = engine.drain_notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].to_string(), "Victory! You are a Logistics Tycoon.");
    }

    #[test]
    fn zero_dispatch_interval_from_config_is_clamped() {
        let tuning: Tuning = serde_json::from_str(r#"{ "dispatch_interval": 0 }"#).unwrap();
        let mut engine = started(tuning);
        assert_eq!(engine.tuning().dispatch_interval, 1);

        // Clamped to every-tick dispatch: a stocked factory ships on the
        // very first step instead of panicking at the cadence check.
        let f = engine.world_mut().add_node(NodeKind::Factory, 0.0, 0.0);
        let c = engine.world_mut().add_node(NodeKind::City, 100.0, 0.0);
        engine.world_mut().add_link(f, c).unwrap();
        crate::test_utils::set_storage(engine.world_mut(), f, 10.0);
        crate::test_utils::set_demand(engine.world_mut(), c, 5.0);

        engine.step(0.1);
        assert_eq!(engine.world().packet_count(), 1);
    }

    #[test]
    fn maintenance_charges_once_per_interval() {
        // Quarter-second steps are exact in binary, so the countdown hits
        // zero on the fourth step, not one step late.
        let tuning = Tuning {
            event_probability: 0.0,
            max_step: 0.25,
            ..Tuning::default()
        };
        let mut engine = started(tuning);
        engine.world_mut().add_node(NodeKind::City, 0.0, 0.0);
        engine.world_mut().add_node(NodeKind::Factory, 100.0, 0.0);
        let start_money = engine.money();

        // Four steps of 0.25 s = one second = one charge of 2.
        for _ in 0..4 {
            engine.step(0.25);
        }
        assert_eq!(engine.money(), start_money - 2.0);
    }
}
