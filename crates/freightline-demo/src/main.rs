//! Headless runner: builds a small freight network, steps the simulation
//! in real-time-sized increments, and prints snapshots and the notice log.
//!
//! Run with: `cargo run --package freightline-demo [-- tuning.toml]`
//!
//! The optional argument is a TOML file of `Tuning` overrides; any field
//! left out keeps its default.

use std::env;
use std::fs;
use std::path::PathBuf;

use freightline_core::economy::Tuning;
use freightline_core::engine::Engine;
use freightline_core::world::{NodeKind, NodeRole};

/// Simulated seconds to run.
const RUN_SECONDS: u64 = 120;
/// Steps per simulated second.
const STEPS_PER_SECOND: u64 = 60;
/// Seconds between printed snapshots.
const REPORT_EVERY: u64 = 15;

#[derive(Debug, thiserror::Error)]
enum DemoError {
    #[error("failed to read tuning file {path}: {source}")]
    ReadTuning {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse tuning file {path}: {source}")]
    ParseTuning {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("scenario setup failed: {0}")]
    Setup(#[from] freightline_core::engine::BuildError),
}

fn load_tuning() -> Result<Tuning, DemoError> {
    match env::args().nth(1) {
        Some(arg) => {
            let path = PathBuf::from(arg);
            let text = fs::read_to_string(&path).map_err(|source| DemoError::ReadTuning {
                path: path.clone(),
                source,
            })?;
            toml::from_str(&text).map_err(|source| DemoError::ParseTuning { path, source })
        }
        None => Ok(Tuning::default()),
    }
}

/// Two factories feeding three cities over a small mesh, built through the
/// charged entry points so the starting budget matters.
fn build_scenario(engine: &mut Engine) -> Result<(), DemoError> {
    // The stock budget covers one factory and one city; seed a bigger
    // demo economy before building.
    engine.world_mut().money += 4000.0;

    let plant_a = engine.build_node(NodeKind::Factory, 100.0, 300.0)?;
    let plant_b = engine.build_node(NodeKind::Factory, 700.0, 100.0)?;
    let rivertown = engine.build_node(NodeKind::City, 400.0, 100.0)?;
    let lakeside = engine.build_node(NodeKind::City, 400.0, 500.0)?;
    let hillcrest = engine.build_node(NodeKind::City, 800.0, 400.0)?;

    engine.build_link(plant_a, rivertown)?;
    engine.build_link(plant_a, lakeside)?;
    engine.build_link(plant_b, rivertown)?;
    engine.build_link(rivertown, hillcrest)?;
    engine.build_link(lakeside, hillcrest)?;
    Ok(())
}

fn print_snapshot(engine: &Engine) {
    println!(
        "t={:7.2}s tick={:6} money=${:<9.2} packets={}",
        engine.time(),
        engine.tick(),
        engine.money(),
        engine.world().packet_count()
    );
    for snap in engine.snapshot_nodes() {
        match snap.role {
            NodeRole::Factory(f) => println!(
                "    factory @({:4.0},{:4.0}) storage={:6.1}/{:.0} rate={}/s",
                snap.x, snap.y, f.storage, snap.capacity, f.production_rate
            ),
            NodeRole::City(c) => println!(
                "    city    @({:4.0},{:4.0}) demand={:6.1}/{:.0} rate={}/s",
                snap.x, snap.y, c.current_demand, snap.capacity, c.demand_rate
            ),
        }
    }
}

fn main() -> Result<(), DemoError> {
    let tuning = load_tuning()?;
    let mut engine = Engine::new(tuning, 0xC0FFEE);
    engine.set_notice_sink(Box::new(|msg| println!("  [notice] {msg}")));

    build_scenario(&mut engine)?;
    println!(
        "=== Freightline demo: {} nodes, {} links, ${:.0} in the bank ===\n",
        engine.world().node_count(),
        engine.world().link_count(),
        engine.money()
    );

    engine.start();
    let dt = 1.0 / STEPS_PER_SECOND as f64;
    for second in 1..=RUN_SECONDS {
        for _ in 0..STEPS_PER_SECOND {
            engine.step(dt);
        }
        if second % REPORT_EVERY == 0 {
            print_snapshot(&engine);
        }
        if let Some(outcome) = engine.outcome() {
            println!("\nSession over after {second}s: {outcome:?}");
            break;
        }
    }

    if engine.outcome().is_none() {
        println!(
            "\nStill trading after {RUN_SECONDS}s: ${:.2} in the bank.",
            engine.money()
        );
    }
    Ok(())
}
