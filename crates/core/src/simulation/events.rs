//! Lifecycle events and their subscribers

use crate::core_types::vec2::Vec2;
use crate::evacuation::ThermalTier;
use crate::fire::FireId;
use serde::{Deserialize, Serialize};
use std::sync::mpsc::{self, Receiver, Sender};

/// How a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionOutcome {
    /// The evacuation countdown elapsed
    Evacuated,
    /// Every fire was put out before the evacuation trigger
    FireDefeated,
}

/// Events published by the simulation, in the order they happened
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FireEvent {
    FireSpawned {
        id: FireId,
        position: Vec2,
        intensity: f32,
        /// `None` for externally spawned fires
        parent: Option<FireId>,
    },
    FireExtinguished {
        id: FireId,
        position: Vec2,
    },
    ThermalWarning {
        tier: ThermalTier,
        temperature: f32,
    },
    EvacuationTriggered {
        temperature: f32,
        countdown: f32,
    },
    SessionOver {
        reason: SessionOutcome,
    },
}

/// Fan-out of events to channel subscribers plus a per-tick record
#[derive(Debug, Default)]
pub struct EventBus {
    subscribers: Vec<Sender<FireEvent>>,
    emitted_this_tick: Vec<FireEvent>,
}

impl EventBus {
    /// Open a new subscription; it receives every event published afterwards
    pub fn subscribe(&mut self) -> Receiver<FireEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    /// Deliver `event` to every live subscriber, dropping disconnected ones
    pub fn publish(&mut self, event: FireEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
        self.emitted_this_tick.push(event);
    }

    /// Events published since the last `begin_tick`
    pub fn emitted_this_tick(&self) -> &[FireEvent] {
        &self.emitted_this_tick
    }

    /// Clear the per-tick record at the start of each tick
    pub fn begin_tick(&mut self) {
        self.emitted_this_tick.clear();
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}
