//! A single fire source and its lifecycle state machine
//!
//! ```text
//! Spawning ──► Active ──► Extinguishing ──► Extinguished
//!     │                                         ▲
//!     └──────────────► (any hit) ───────────────┘
//! ```
//!
//! A fire is born `Spawning` and becomes `Active` on the first tick that sees
//! it. The first water hit that leaves it above the extinguish threshold moves
//! it to `Extinguishing`, where it keeps burning but no longer spreads. Dropping
//! to the threshold or below is terminal.

use crate::core_types::rng::SimRng;
use crate::core_types::vec2::Vec2;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

/// Slack on the extinguish threshold so repeated `f32` subtraction lands on it
const INTENSITY_EPSILON: f32 = 1e-6;

/// Unique fire identifier; never reused within a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FireId(pub u32);

impl fmt::Display for FireId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fire#{}", self.0)
    }
}

/// Lifecycle state of a fire
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FireState {
    /// Just created; becomes active on the next tick
    Spawning,
    /// Burning and spreading
    Active,
    /// Hit by water at least once; burning but no longer spreading
    Extinguishing,
    /// Terminal
    Extinguished,
}

/// Lightweight reference returned when a fire is created
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FireHandle {
    pub id: FireId,
    pub position: Vec2,
}

/// Result of an extinguish call
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExtinguishOutcome {
    /// Unknown id, already extinguished, ended session, or unusable amount
    Ignored,
    /// Intensity reduced but still above the threshold
    Doused {
        /// Intensity left after the hit
        remaining: f32,
    },
    /// This hit crossed the threshold
    Extinguished,
}

/// One simulated fire source
#[derive(Debug, Clone, Serialize)]
pub struct FireAgent {
    pub(crate) id: FireId,
    pub(crate) position: Vec2,
    pub(crate) intensity: f32,
    pub(crate) state: FireState,
    pub(crate) spread_timer: f32,
    pub(crate) generation: u32,
    pub(crate) recent_children: VecDeque<Vec2>,
    recent_capacity: usize,
}

impl FireAgent {
    /// Create a fire in the `Spawning` state
    pub(crate) fn new(
        id: FireId,
        position: Vec2,
        intensity: f32,
        generation: u32,
        recent_capacity: usize,
    ) -> Self {
        FireAgent {
            id,
            position,
            intensity,
            state: FireState::Spawning,
            spread_timer: 0.0,
            generation,
            recent_children: VecDeque::with_capacity(recent_capacity),
            recent_capacity,
        }
    }

    pub fn id(&self) -> FireId {
        self.id
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn intensity(&self) -> f32 {
        self.intensity
    }

    pub fn state(&self) -> FireState {
        self.state
    }

    /// Seconds until the next spread attempt
    pub fn spread_timer(&self) -> f32 {
        self.spread_timer
    }

    /// Spread depth: 0 for externally spawned fires
    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn handle(&self) -> FireHandle {
        FireHandle {
            id: self.id,
            position: self.position,
        }
    }

    /// Whether the fire still counts toward the population
    pub fn is_burning(&self) -> bool {
        self.state != FireState::Extinguished
    }

    /// Whether the spread loop runs for this fire
    pub fn can_spread(&self) -> bool {
        self.state == FireState::Active
    }

    /// `Spawning → Active`, arming the first spread timer. Returns whether the
    /// transition happened.
    pub(crate) fn activate(&mut self, first_delay: f32) -> bool {
        if self.state != FireState::Spawning {
            return false;
        }
        self.state = FireState::Active;
        self.spread_timer = first_delay;
        true
    }

    /// Count the spread timer down; returns `true` when an attempt is due.
    pub(crate) fn advance_timer(&mut self, dt: f32) -> bool {
        if !self.can_spread() {
            return false;
        }
        self.spread_timer -= dt;
        self.spread_timer <= 0.0
    }

    /// Arm the timer for the next attempt
    pub(crate) fn reschedule(&mut self, delay: f32) {
        self.spread_timer = delay;
    }

    /// Intensity a child of this fire starts with
    pub(crate) fn child_intensity(&self, growth_factor: f32, cap: f32) -> f32 {
        (self.intensity * growth_factor).min(cap)
    }

    /// Remember where this fire spread to, evicting the oldest entry when full
    pub(crate) fn record_child(&mut self, position: Vec2) {
        if self.recent_capacity == 0 {
            return;
        }
        if self.recent_children.len() == self.recent_capacity {
            self.recent_children.pop_front();
        }
        self.recent_children.push_back(position);
    }

    /// Clustering anchor: the fire itself or one of its recent children
    pub(crate) fn spread_anchor(&self, rng: &mut SimRng) -> Vec2 {
        match rng.index(self.recent_children.len() + 1) {
            Some(i) if i < self.recent_children.len() => self.recent_children[i],
            _ => self.position,
        }
    }

    /// Apply a water hit of `amount` (direct-subtract policy).
    ///
    /// Idempotent once extinguished: further hits return
    /// [`ExtinguishOutcome::Ignored`] and leave the fire untouched.
    pub(crate) fn extinguish(&mut self, amount: f32, threshold: f32) -> ExtinguishOutcome {
        if self.state == FireState::Extinguished || !amount.is_finite() || amount <= 0.0 {
            return ExtinguishOutcome::Ignored;
        }

        self.intensity = (self.intensity - amount).max(0.0);

        if self.intensity <= threshold + INTENSITY_EPSILON {
            self.state = FireState::Extinguished;
            self.spread_timer = 0.0;
            ExtinguishOutcome::Extinguished
        } else {
            self.state = FireState::Extinguishing;
            ExtinguishOutcome::Doused {
                remaining: self.intensity,
            }
        }
    }
}
