//! Intent queue feeding the single-writer coordinator
//!
//! Collaborators never mutate fire counts or the temperature directly. They
//! submit intents, and the simulation applies them in arrival order at the
//! start of the next tick.
//!
//! - **One writer**: only `FireSimulation::tick` drains the queue
//! - **Arrival order**: intents apply first-in, first-out
//! - **Bounded history**: the oldest applied intents are dropped past `max_history`

use crate::core_types::vec2::Vec2;
use crate::fire::FireId;
use std::collections::VecDeque;

/// Requests an external collaborator can make of the simulation
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Intent {
    /// Place a fire at `position`
    Spawn { position: Vec2, intensity: f32 },
    /// Water hit on a known fire
    Extinguish { id: FireId, amount: f32 },
    /// Water hit at a position; douses the nearest fire within `radius`
    ExtinguishAt {
        position: Vec2,
        radius: f32,
        amount: f32,
    },
    /// Force one spread attempt from a fire
    TriggerSpread { id: FireId },
}

/// Intent stamped with the simulation time it was submitted at
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubmittedIntent {
    pub intent: Intent,
    pub submitted_at: f32,
}

/// FIFO of pending intents plus a bounded log of applied ones
#[derive(Debug)]
pub struct IntentQueue {
    /// Intents waiting for the next tick
    pending: VecDeque<SubmittedIntent>,
    /// Intents applied during the current tick
    applied_this_tick: Vec<SubmittedIntent>,
    /// All applied intents, oldest first
    history: VecDeque<SubmittedIntent>,
    max_history: usize,
}

impl Default for IntentQueue {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl IntentQueue {
    /// Create a new intent queue with specified history limit
    pub fn new(max_history: usize) -> Self {
        Self {
            pending: VecDeque::with_capacity(32),
            applied_this_tick: Vec::with_capacity(32),
            history: VecDeque::with_capacity(max_history.min(1024)),
            max_history,
        }
    }

    /// Queue an intent for the next tick
    pub fn submit(&mut self, intent: Intent, submitted_at: f32) {
        self.pending.push_back(SubmittedIntent {
            intent,
            submitted_at,
        });
    }

    /// Number of intents waiting
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Take all pending intents in arrival order
    pub fn take_pending(&mut self) -> Vec<SubmittedIntent> {
        self.pending.drain(..).collect()
    }

    /// Record an intent as applied
    pub fn mark_applied(&mut self, intent: SubmittedIntent) {
        self.applied_this_tick.push(intent);
        self.history.push_back(intent);
        while self.history.len() > self.max_history {
            self.history.pop_front();
        }
    }

    /// Intents applied during the current tick
    pub fn applied_this_tick(&self) -> &[SubmittedIntent] {
        &self.applied_this_tick
    }

    pub fn history(&self) -> impl Iterator<Item = &SubmittedIntent> {
        self.history.iter()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Clear the per-tick record at the start of each tick
    pub fn begin_tick(&mut self) {
        self.applied_this_tick.clear();
    }

    /// Drop everything still pending (session ended)
    pub fn discard_pending(&mut self) -> usize {
        let dropped = self.pending.len();
        self.pending.clear();
        dropped
    }
}
