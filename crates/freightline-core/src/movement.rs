//! Packet movement: advance packets along their paths, handle arrival
//! revenue, and lazily discard orphaned cargo.
//!
//! Packets are traversed back-to-front so in-place removal never skips an
//! element. A packet whose current hop has no connecting link (the link or
//! an endpoint was removed after spawn) is dropped silently with no
//! economic effect -- lost cargo, not an error.

use crate::world::{Packet, World};

/// What one movement pass did, for logging and the HUD.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MovementReport {
    /// Packets that reached their target this pass.
    pub delivered: u32,
    /// Packets discarded because their current hop's link was missing.
    pub lost: u32,
}

/// Advance every packet by `dt` seconds.
pub fn advance(world: &mut World, dt: f64) -> MovementReport {
    let mut report = MovementReport::default();

    let mut i = world.packets.len();
    while i > 0 {
        i -= 1;

        let (hop, path_len) = {
            let p = &world.packets[i];
            (p.hop, p.path.len())
        };

        // Defensive: a packet already at (or past) its final index counts
        // as arrived immediately.
        if hop + 1 >= path_len {
            let packet = world.packets.remove(i);
            deliver(world, &packet);
            report.delivered += 1;
            continue;
        }

        let (current, next) = {
            let p = &world.packets[i];
            (p.path[hop], p.path[hop + 1])
        };

        let Some((speed, distance)) = world
            .link_between(current, next)
            .and_then(|id| world.link(id))
            .map(|link| (link.speed, link.distance))
        else {
            // Current hop's link is gone: discard, no revenue.
            world.packets.remove(i);
            report.lost += 1;
            continue;
        };

        let p = &mut world.packets[i];
        p.progress += speed * dt / distance;
        if p.progress >= 1.0 {
            p.hop += 1;
            p.progress = 0.0;
            if p.hop + 1 >= p.path.len() {
                let packet = world.packets.remove(i);
                deliver(world, &packet);
                report.delivered += 1;
            }
        }
    }

    report
}

/// Credit an arrival: a packet reaching a city pays its value and satisfies
/// one unit of demand (floored at zero). Targets that are missing or not
/// cities complete with no economic effect.
fn deliver(world: &mut World, packet: &Packet) {
    let mut paid = false;
    if let Some(city) = world.node_mut(packet.target).and_then(|n| n.as_city_mut()) {
        city.current_demand = (city.current_demand - 1.0).max(0.0);
        paid = true;
    }
    if paid {
        world.money += packet.value;
    }
}
