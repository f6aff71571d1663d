//! Freightline Core -- the simulation engine for the logistics strategy game.
//!
//! Players place cities and factories on a 2D map, connect them with
//! transport links, and watch packets of goods flow from factories to cities,
//! earning revenue while maintenance costs accrue. This crate is the
//! headless core: world state, routing, economy, dispatch, packet movement,
//! and random events. Rendering and input handling live elsewhere and
//! consume read-only snapshots.
//!
//! # Step Pipeline
//!
//! Each call to [`engine::Engine::step`] advances the simulation by one
//! fixed step through the following phases, in order:
//!
//! 1. **Accrual** -- Factories produce into storage, cities accumulate
//!    demand, both clamped to capacity.
//! 2. **Maintenance** -- A one-second countdown charges upkeep per node and
//!    link when it expires.
//! 3. **Outcome** -- Bankruptcy / victory thresholds are checked; either is
//!    terminal and stops the driver.
//! 4. **Events** -- The random event engine is polled: due reversals fire,
//!    then a new event may trigger.
//! 5. **Dispatch** -- Every N ticks, factories route one packet each toward
//!    the neediest reachable city.
//! 6. **Movement** -- Packets advance along their paths; arrivals pay out,
//!    orphaned packets are discarded.
//!
//! # Key Types
//!
//! - [`engine::Engine`] -- Simulation driver and pipeline orchestrator.
//! - [`world::World`] -- Nodes, links, packets, money, and simulated time.
//! - [`routing`] -- Dijkstra shortest path by cumulative link distance.
//! - [`economy::Tuning`] -- Every gameplay constant in one serde-loadable
//!   struct.
//! - [`event::EventEngine`] -- Random economic events with scheduled
//!   reversals on simulated time.
//! - [`event::NoticeBus`] -- Buffered human-readable notices for the UI log.
//! - [`query`] -- Owned snapshot types for rendering and FFI.

pub mod dispatch;
pub mod economy;
pub mod engine;
pub mod event;
pub mod id;
pub mod movement;
pub mod query;
pub mod rng;
pub mod routing;
pub mod world;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
