//! Read-only post-tick views for rendering and telemetry

use crate::core_types::vec2::Vec2;
use crate::evacuation::EvacuationPhase;
use crate::fire::{FireAgent, FireId, FireState};
use crate::simulation::events::SessionOutcome;
use serde::{Deserialize, Serialize};

/// One fire as seen by a renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FireSnapshot {
    pub id: FireId,
    pub position: Vec2,
    pub intensity: f32,
    pub state: FireState,
    pub generation: u32,
}

impl From<&FireAgent> for FireSnapshot {
    fn from(agent: &FireAgent) -> Self {
        Self {
            id: agent.id,
            position: agent.position,
            intensity: agent.intensity,
            state: agent.state,
            generation: agent.generation,
        }
    }
}

/// Session counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationStats {
    /// Fires created by any means
    pub fires_spawned: u32,
    /// Fires put out
    pub fires_extinguished: u32,
    /// Spread attempts that passed the chance roll
    pub spread_attempts: u32,
    /// Attempts refused for placement reasons
    pub spreads_rejected: u32,
    /// Attempts deferred because the room was at capacity
    pub saturation_backoffs: u32,
    /// Highest simultaneous fire count
    pub peak_fires: u32,
}

/// Consistent view of the whole simulation after a tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSnapshot {
    pub frame: u64,
    pub time: f32,
    pub temperature: f32,
    pub phase: EvacuationPhase,
    pub countdown_remaining: Option<f32>,
    pub active_fires: usize,
    pub fires: Vec<FireSnapshot>,
    pub outcome: Option<SessionOutcome>,
    pub stats: SimulationStats,
}

impl SimulationSnapshot {
    /// Sum of all fire intensities
    pub fn total_intensity(&self) -> f32 {
        self.fires.iter().map(|f| f.intensity).sum()
    }
}
