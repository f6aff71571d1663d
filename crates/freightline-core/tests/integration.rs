//! Integration tests for the Freightline simulation core.
//!
//! These exercise end-to-end behavior across the full step pipeline:
//! accrual, maintenance, outcomes, dispatch, routing, movement, and the
//! random event engine, driven through the public `Engine` API.

use freightline_core::economy::{Outcome, Tuning};
use freightline_core::engine::Engine;
use freightline_core::event::Notice;
use freightline_core::routing::{path_cost, shortest_path};
use freightline_core::test_utils::*;
use freightline_core::world::NodeKind;

/// Tuning for money-exact scenarios: no random events, no upkeep, and an
/// uncapped-enough step so binary-exact dt values pass through unchanged.
fn exact_tuning() -> Tuning {
    Tuning {
        event_probability: 0.0,
        maintenance_per_node: 0.0,
        maintenance_per_link: 0.0,
        max_step: 0.25,
        ..Tuning::default()
    }
}

// ===========================================================================
// Test 1: full delivery cycle
// ===========================================================================
//
// Factory --link(100)--> City. Production fills storage, the dispatcher
// fires on tick 60, the packet crosses in one simulated second, and arrival
// pays out and satisfies one unit of demand.

#[test]
fn full_delivery_cycle() {
    let mut engine = started_engine(exact_tuning());
    let factory = engine.world_mut().add_node(NodeKind::Factory, 0.0, 0.0);
    let city = engine.world_mut().add_node(NodeKind::City, 100.0, 0.0);
    engine.world_mut().add_link(factory, city).unwrap();

    // Ticks 1..=59: storage and demand accrue, nothing dispatches.
    for _ in 0..59 {
        engine.step(0.25);
    }
    assert_eq!(engine.world().packet_count(), 0);

    // Tick 60: dispatch fires, one packet leaves.
    engine.step(0.25);
    assert_eq!(engine.world().packet_count(), 1);
    let storage = engine
        .world()
        .node(factory)
        .unwrap()
        .as_factory()
        .unwrap()
        .storage;
    // 60 ticks * 5/s * 0.25 s = 75, clamped nowhere, minus the dispatched unit.
    assert_eq!(storage, 74.0);

    // Distance 100 at speed 100 takes one second; the spawn tick already
    // moved it a quarter of the way.
    for _ in 0..3 {
        engine.step(0.25);
    }
    assert_eq!(engine.world().packet_count(), 0);
    assert_eq!(engine.money(), 2000.0 + 100.0);

    // Demand accrued 2/s over 15.75 s, minus the delivered unit.
    let demand = engine
        .world()
        .node(city)
        .unwrap()
        .as_city()
        .unwrap()
        .current_demand;
    assert_eq!(demand, 2.0 * 15.75 - 1.0);

    // No second dispatch until tick 120.
    assert_eq!(engine.tick(), 63);
}

// ===========================================================================
// Test 2: maintenance is dt-granularity independent
// ===========================================================================
//
// Eight steps of 0.125 s and one step of 1 s cross the countdown once each
// and must deduct the same total.

#[test]
fn maintenance_parity_across_dt_granularities() {
    let coarse_tuning = Tuning {
        event_probability: 0.0,
        max_step: 1.0,
        ..Tuning::default()
    };

    let mut fine = started_engine(coarse_tuning.clone());
    let f = fine.world_mut().add_node(NodeKind::Factory, 0.0, 0.0);
    let c = fine.world_mut().add_node(NodeKind::City, 100.0, 0.0);
    fine.world_mut().add_link(f, c).unwrap();
    for _ in 0..8 {
        fine.step(0.125);
    }

    let mut coarse = started_engine(coarse_tuning);
    let f = coarse.world_mut().add_node(NodeKind::Factory, 0.0, 0.0);
    let c = coarse.world_mut().add_node(NodeKind::City, 100.0, 0.0);
    coarse.world_mut().add_link(f, c).unwrap();
    coarse.step(1.0);

    // 2 nodes * 1 + 1 link * 0.5, charged exactly once in both runs.
    assert_eq!(fine.money(), 2000.0 - 2.5);
    assert_eq!(coarse.money(), fine.money());
}

// ===========================================================================
// Test 3: routing edge cases through a built world
// ===========================================================================

#[test]
fn routing_chain_and_unreachable() {
    let (world, ids) = chain(&[NodeKind::Factory, NodeKind::City, NodeKind::City], 10.0);
    let path = shortest_path(&world, ids[0], ids[2]).unwrap();
    assert_eq!(path, ids);
    assert_eq!(path_cost(&world, &path), Some(20.0));

    let (world, ids) = {
        let mut w = freightline_core::world::World::new(0.0);
        let a = w.add_node(NodeKind::Factory, 0.0, 0.0);
        let b = w.add_node(NodeKind::City, 10.0, 0.0);
        (w, vec![a, b])
    };
    assert_eq!(shortest_path(&world, ids[0], ids[1]), None);
}

// ===========================================================================
// Test 4: node removal orphans in-flight cargo
// ===========================================================================
//
// Removing a mid-path node cascades its links away; the packet riding that
// hop is discarded on the next movement pass with no payout.

#[test]
fn demolition_loses_in_flight_cargo() {
    let mut engine = started_engine(exact_tuning());
    let world = engine.world_mut();
    let f = world.add_node(NodeKind::Factory, 0.0, 0.0);
    let mid = world.add_node(NodeKind::City, 100.0, 0.0);
    let far = world.add_node(NodeKind::City, 200.0, 0.0);
    world.add_link(f, mid).unwrap();
    world.add_link(mid, far).unwrap();
    world.spawn_packet(vec![f, mid, far], 100.0).unwrap();

    engine.demolish_node(mid);
    assert_eq!(engine.world().link_count(), 0);
    assert_eq!(engine.world().packet_count(), 1, "cleanup is lazy");

    engine.step(0.25);
    assert_eq!(engine.world().packet_count(), 0);
    assert_eq!(engine.money(), 2000.0, "lost cargo pays nothing");
}

// ===========================================================================
// Test 5: victory through deliveries
// ===========================================================================

#[test]
fn deliveries_can_win_the_game() {
    let tuning = Tuning {
        victory_threshold: 2050.0,
        ..exact_tuning()
    };
    let mut engine = started_engine(tuning);
    let f = engine.world_mut().add_node(NodeKind::Factory, 0.0, 0.0);
    let c = engine.world_mut().add_node(NodeKind::City, 100.0, 0.0);
    engine.world_mut().add_link(f, c).unwrap();

    for _ in 0..200 {
        engine.step(0.25);
        if engine.outcome().is_some() {
            break;
        }
    }
    assert_eq!(engine.outcome(), Some(Outcome::Victory));
    assert!(!engine.is_running());
    assert!(engine.money() >= 2050.0);

    let game_over: Vec<_> = engine
        .drain_notices()
        .into_iter()
        .filter(|n| matches!(n, Notice::GameOver { .. }))
        .collect();
    assert_eq!(game_over.len(), 1);
}

// ===========================================================================
// Test 6: maintenance can bankrupt
// ===========================================================================

#[test]
fn upkeep_bankrupts_an_idle_network() {
    let tuning = Tuning {
        starting_money: 3.0,
        event_probability: 0.0,
        max_step: 1.0,
        ..Tuning::default()
    };
    let mut engine = started_engine(tuning);
    engine.world_mut().add_node(NodeKind::City, 0.0, 0.0);
    engine.world_mut().add_node(NodeKind::City, 50.0, 0.0);

    // 2 per second against 3 in the bank: broke during the second charge.
    for _ in 0..3 {
        engine.step(1.0);
    }
    assert_eq!(engine.outcome(), Some(Outcome::Bankruptcy));
    assert!(!engine.is_running());

    // Stopped means stopped: further steps change nothing.
    let frozen_time = engine.time();
    let frozen_money = engine.money();
    engine.step(1.0);
    assert_eq!(engine.time(), frozen_time);
    assert_eq!(engine.money(), frozen_money);
    assert_eq!(
        engine
            .drain_notices()
            .iter()
            .filter(|n| matches!(n, Notice::GameOver { .. }))
            .count(),
        1
    );
}

// ===========================================================================
// Test 7: random events surface through the notice log
// ===========================================================================

#[test]
fn certain_probability_triggers_an_event_after_the_interval() {
    let tuning = Tuning {
        event_probability: 1.0,
        maintenance_per_node: 0.0,
        maintenance_per_link: 0.0,
        max_step: 0.25,
        ..Tuning::default()
    };
    let mut engine = started_engine(tuning);
    engine.world_mut().add_node(NodeKind::Factory, 0.0, 0.0);
    engine.world_mut().add_node(NodeKind::City, 100.0, 0.0);

    // 11 simulated seconds: the 10-second check interval has elapsed.
    for _ in 0..44 {
        engine.step(0.25);
    }
    let triggered = engine
        .drain_notices()
        .into_iter()
        .any(|n| matches!(n, Notice::EventTriggered { .. }));
    assert!(triggered);
}

#[test]
fn zero_probability_never_triggers() {
    let mut engine = started_engine(quiet_tuning());
    engine.world_mut().add_node(NodeKind::Factory, 0.0, 0.0);
    for _ in 0..2000 {
        engine.step(0.1);
    }
    assert!(engine.drain_notices().is_empty());
}

// ===========================================================================
// Test 8: notice sink mirrors the buffered log
// ===========================================================================

#[test]
fn notice_sink_sees_game_over_message() {
    use std::cell::RefCell;
    use std::rc::Rc;

    let seen: Rc<RefCell<Vec<String>>> = Rc::default();
    let seen_in_sink = Rc::clone(&seen);

    let mut engine = started_engine(quiet_tuning());
    engine.set_notice_sink(Box::new(move |msg| {
        seen_in_sink.borrow_mut().push(msg.to_string());
    }));
    engine.world_mut().money = -1.0;
    engine.step(0.05);

    assert_eq!(seen.borrow().as_slice(), ["Bankruptcy! You ran out of money."]);
}

// ===========================================================================
// Test 9: dispatcher starvation cases through the engine
// ===========================================================================

#[test]
fn no_demand_means_no_dispatch() {
    let mut engine = started_engine(exact_tuning());
    let world = engine.world_mut();
    let f = world.add_node(NodeKind::Factory, 0.0, 0.0);
    let c = world.add_node(NodeKind::City, 100.0, 0.0);
    world.add_link(f, c).unwrap();
    // City wants nothing, ever.
    world.node_mut(c).unwrap().as_city_mut().unwrap().demand_rate = 0.0;
    set_storage(world, f, 50.0);

    for _ in 0..120 {
        engine.step(0.25);
    }
    assert_eq!(engine.world().packet_count(), 0);
    let storage = engine
        .world()
        .node(f)
        .unwrap()
        .as_factory()
        .unwrap()
        .storage;
    // 50 carried in plus 30 s of production, nothing shipped.
    assert_eq!(storage, 200.0);
}

#[test]
fn disconnected_city_gets_no_packets() {
    let mut engine = started_engine(exact_tuning());
    let w = engine.world_mut();
    w.add_node(NodeKind::Factory, 0.0, 0.0);
    w.add_node(NodeKind::City, 100.0, 0.0);
    // No link at all.
    for _ in 0..120 {
        engine.step(0.25);
    }
    assert_eq!(engine.world().packet_count(), 0);
}
