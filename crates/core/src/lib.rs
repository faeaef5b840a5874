//! Room Fire Simulation Core Library
//!
//! Simulates an escalating fire inside a single room: fire sources spread new
//! fires over time, a shared room temperature climbs with the fire count, and
//! reaching the temperature ceiling starts an irreversible evacuation
//! countdown. Water hits reduce a fire's intensity until it goes out.
//!
//! ## Components
//!
//! - [`FireAgent`]: one fire's `Spawning → Active → Extinguishing → Extinguished` lifecycle
//! - [`SpreadPolicy`]: legal spawn positions and spread timing
//! - [`PopulationLimiter`]: cap on simultaneously burning fires
//! - [`ThermalAccumulator`]: the clamped room temperature
//! - [`EvacuationController`]: the one-way escalation to evacuation
//! - [`FireSimulation`]: the single-writer coordinator tying them together
//!
//! ```
//! use room_fire_core::{FireSimulation, RoomBounds, SimulationConfig, Vec2};
//!
//! let mut sim = FireSimulation::new(SimulationConfig::for_room(RoomBounds::sized(20.0, 12.0)))
//!     .expect("valid config");
//! let fire = sim.spawn_fire(Vec2::new(10.0, 6.0), 1.0).expect("inside the room");
//! sim.run_for(3.0);
//! assert!(sim.active_fire_count() >= 1);
//! sim.extinguish(fire.id, 0.25);
//! ```

pub mod config;
pub mod core_types;
pub mod error;
pub mod evacuation;
pub mod fire;
pub mod simulation;
pub mod thermal;

// Re-export core types
pub use core_types::{RoomBounds, SimRng, SpatialIndex, Vec2};

pub use config::{
    EvacuationConfig, FireConfig, SimulationConfig, SpawnerConfig, SpreadConfig, ThermalConfig,
    TuningPreset, WaterConfig,
};
pub use error::{ConfigError, SpawnRejection};
pub use evacuation::{EvacuationController, EvacuationPhase, EvacuationTransition, ThermalTier};
pub use fire::{
    ExtinguishOutcome, FireAgent, FireHandle, FireId, FireSpawner, FireState, PopulationLimiter,
    SpreadPolicy,
};
pub use simulation::{
    FireEvent, FireSimulation, FireSnapshot, Intent, SessionOutcome, SimCommand,
    SimulationHandle, SimulationSnapshot, SimulationStats,
};
pub use thermal::ThermalAccumulator;
