//! External spawner igniting fires at fixed points on an interval

use crate::config::SpawnerConfig;
use crate::core_types::rng::SimRng;
use crate::core_types::timer::elapse;
use crate::core_types::vec2::Vec2;

/// Spawns owed beyond this many in one step are dropped
const MAX_CATCH_UP: u64 = 16;

/// Emits spawn requests at randomly chosen spawn points.
///
/// The spawner only proposes positions; the simulation decides whether each
/// request is admitted (bounds, population cap).
#[derive(Debug, Clone)]
pub struct FireSpawner {
    spawn_points: Vec<Vec2>,
    interval: f32,
    intensity: f32,
    timer: f32,
}

impl FireSpawner {
    pub fn new(config: &SpawnerConfig) -> Self {
        Self {
            spawn_points: config.spawn_points.clone(),
            interval: config.interval,
            intensity: config.intensity,
            timer: config.start_delay,
        }
    }

    /// Intensity given to spawned fires
    pub fn intensity(&self) -> f32 {
        self.intensity
    }

    /// Advance by `dt`, returning the spawn positions that came due (at most
    /// `MAX_CATCH_UP` per step).
    pub fn advance(&mut self, dt: f32, rng: &mut SimRng) -> Vec<Vec2> {
        if self.spawn_points.is_empty() {
            return Vec::new();
        }

        let due = elapse(&mut self.timer, dt, self.interval).min(MAX_CATCH_UP);
        (0..due)
            .filter_map(|_| rng.index(self.spawn_points.len()))
            .map(|i| self.spawn_points[i])
            .collect()
    }
}
