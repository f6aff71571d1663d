//! Random economic events and the notice bus.
//!
//! The event engine is polled once per step with the current simulated
//! time. Every `event_check_interval` seconds it rolls once; on a hit it
//! picks one event uniformly from the catalog and applies it immediately.
//! Boom and strike are temporary: their reversals sit in an explicit
//! scheduled-task queue keyed by simulated expiry time and fire when a
//! later poll passes that time. No host timers are involved, so a stopped
//! simulation holds its pending reversals instead of leaking them on
//! wall-clock time.
//!
//! Every trigger and expiry emits a human-readable [`Notice`]; the
//! [`NoticeBus`] buffers them for the UI log to drain and forwards each to
//! an optional string sink.

use crate::economy::{Outcome, Tuning};
use crate::id::NodeId;
use crate::rng::SimRng;
use crate::world::{NodeRole, World};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How long an economic boom lasts, in simulated seconds.
const BOOM_DURATION: f64 = 10.0;
/// Demand multiplier during a boom.
const BOOM_FACTOR: f64 = 1.5;
/// How long a factory strike lasts, in simulated seconds.
const STRIKE_DURATION: f64 = 5.0;
/// Production restored to a factory whose pre-strike rate went unrecorded.
const STRIKE_FALLBACK_RATE: f64 = 5.0;
/// Immediate deduction for a tax hike.
const TAX_HIKE_AMOUNT: f64 = 500.0;
/// Immediate grant for a subsidy.
const SUBSIDY_AMOUNT: f64 = 300.0;

// ---------------------------------------------------------------------------
// Event catalog
// ---------------------------------------------------------------------------

/// The fixed catalog of random events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RandomEvent {
    /// City demand rates x1.5 for ten seconds.
    EconomicBoom,
    /// Factory production halted for five seconds.
    FactoryStrike,
    /// One-off deduction of 500.
    TaxHike,
    /// One-off grant of 300.
    Subsidy,
}

impl RandomEvent {
    pub const ALL: [RandomEvent; 4] = [
        RandomEvent::EconomicBoom,
        RandomEvent::FactoryStrike,
        RandomEvent::TaxHike,
        RandomEvent::Subsidy,
    ];

    pub fn name(self) -> &'static str {
        match self {
            RandomEvent::EconomicBoom => "Economic Boom",
            RandomEvent::FactoryStrike => "Factory Strike",
            RandomEvent::TaxHike => "Tax Hike",
            RandomEvent::Subsidy => "Subsidy",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            RandomEvent::EconomicBoom => "Demand increases by 50%!",
            RandomEvent::FactoryStrike => "Production halted for 5 seconds!",
            RandomEvent::TaxHike => "Government deducts $500.",
            RandomEvent::Subsidy => "Government grants $300.",
        }
    }
}

// ---------------------------------------------------------------------------
// Notices
// ---------------------------------------------------------------------------

/// A human-readable message for the UI event log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// A random event fired.
    EventTriggered { event: RandomEvent },
    /// A temporary event's effect expired.
    EventEnded { message: &'static str },
    /// The session reached a terminal state.
    GameOver { outcome: Outcome },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::EventTriggered { event } => {
                write!(f, "{}: {}", event.name(), event.description())
            }
            Notice::EventEnded { message } => f.write_str(message),
            Notice::GameOver { outcome } => f.write_str(outcome.message()),
        }
    }
}

/// Buffered notice delivery. Notices accumulate until the UI drains them;
/// each is also forwarded, as a formatted string, to an optional sink
/// closure registered by the host.
#[derive(Default)]
pub struct NoticeBus {
    buffer: Vec<Notice>,
    sink: Option<Box<dyn FnMut(&str)>>,
}

impl fmt::Debug for NoticeBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NoticeBus")
            .field("buffer", &self.buffer)
            .field("sink", &self.sink.is_some())
            .finish()
    }
}

impl NoticeBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a string sink. Replaces any previous sink.
    pub fn set_sink(&mut self, sink: Box<dyn FnMut(&str)>) {
        self.sink = Some(sink);
    }

    /// Record a notice: buffer it and forward it to the sink.
    pub fn push(&mut self, notice: Notice) {
        if let Some(sink) = self.sink.as_mut() {
            sink(&notice.to_string());
        }
        self.buffer.push(notice);
    }

    /// Take all buffered notices, oldest first.
    pub fn drain(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.buffer)
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Scheduled reversals
// ---------------------------------------------------------------------------

/// The undo half of a temporary event.
#[derive(Debug, Clone, Serialize, Deserialize)]
enum Reversal {
    /// Divide city demand rates back down.
    EndBoom,
    /// Restore each factory's remembered production rate.
    EndStrike { prior: Vec<(NodeId, f64)> },
}

/// A reversal waiting for its simulated expiry time.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ScheduledTask {
    due: f64,
    reversal: Reversal,
}

// ---------------------------------------------------------------------------
// EventEngine
// ---------------------------------------------------------------------------

/// Periodic random-event roller plus the pending-reversal queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEngine {
    /// Simulated time of the last roll.
    last_check: f64,
    pending: Vec<ScheduledTask>,
}

impl Default for EventEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl EventEngine {
    pub fn new() -> Self {
        Self {
            last_check: 0.0,
            pending: Vec::new(),
        }
    }

    /// Poll once per step: fire due reversals, then maybe roll a new event.
    pub fn poll(
        &mut self,
        world: &mut World,
        time: f64,
        tuning: &Tuning,
        rng: &mut SimRng,
        notices: &mut NoticeBus,
    ) {
        self.fire_due(world, time, notices);

        if time - self.last_check > tuning.event_check_interval {
            self.last_check = time;
            if rng.chance(tuning.event_probability) {
                let event = RandomEvent::ALL[rng.pick(RandomEvent::ALL.len())];
                self.trigger(event, world, time, notices);
            }
        }
    }

    /// Number of reversals still waiting to fire.
    pub fn pending_reversals(&self) -> usize {
        self.pending.len()
    }

    /// Apply an event's immediate effect and schedule its reversal if it
    /// has one. Public within the crate so tests can force a specific
    /// event instead of fishing for RNG seeds.
    pub(crate) fn trigger(
        &mut self,
        event: RandomEvent,
        world: &mut World,
        time: f64,
        notices: &mut NoticeBus,
    ) {
        notices.push(Notice::EventTriggered { event });

        match event {
            RandomEvent::EconomicBoom => {
                for (_, node) in world.nodes_mut() {
                    if let NodeRole::City(city) = &mut node.role {
                        city.demand_rate *= BOOM_FACTOR;
                    }
                }
                self.pending.push(ScheduledTask {
                    due: time + BOOM_DURATION,
                    reversal: Reversal::EndBoom,
                });
            }
            RandomEvent::FactoryStrike => {
                let mut prior = Vec::new();
                for (id, node) in world.nodes_mut() {
                    if let NodeRole::Factory(factory) = &mut node.role {
                        prior.push((id, factory.production_rate));
                        factory.production_rate = 0.0;
                    }
                }
                self.pending.push(ScheduledTask {
                    due: time + STRIKE_DURATION,
                    reversal: Reversal::EndStrike { prior },
                });
            }
            RandomEvent::TaxHike => {
                world.money -= TAX_HIKE_AMOUNT;
            }
            RandomEvent::Subsidy => {
                world.money += SUBSIDY_AMOUNT;
            }
        }
    }

    /// Fire every reversal whose expiry has passed, in scheduling order.
    fn fire_due(&mut self, world: &mut World, time: f64, notices: &mut NoticeBus) {
        while let Some(pos) = self.pending.iter().position(|task| task.due <= time) {
            let task = self.pending.remove(pos);
            match task.reversal {
                Reversal::EndBoom => {
                    for (_, node) in world.nodes_mut() {
                        if let NodeRole::City(city) = &mut node.role {
                            city.demand_rate /= BOOM_FACTOR;
                        }
                    }
                    notices.push(Notice::EventEnded {
                        message: "Economic Boom ended.",
                    });
                }
                Reversal::EndStrike { prior } => {
                    for (id, node) in world.nodes_mut() {
                        if let NodeRole::Factory(factory) = &mut node.role {
                            factory.production_rate = prior
                                .iter()
                                .find(|(n, _)| *n == id)
                                .map(|(_, rate)| *rate)
                                .unwrap_or(STRIKE_FALLBACK_RATE);
                        }
                    }
                    notices.push(Notice::EventEnded {
                        message: "Strike ended.",
                    });
                }
            }
        }
    }
}
