//! Fire sources: lifecycle, spread policy, population cap and external spawner

pub mod agent;
pub mod population;
pub mod spawner;
pub mod spread;

pub use agent::{ExtinguishOutcome, FireAgent, FireHandle, FireId, FireState};
pub use population::PopulationLimiter;
pub use spawner::FireSpawner;
pub use spread::SpreadPolicy;
