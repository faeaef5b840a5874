//! Spread placement and timing policy
//!
//! Decides where a fire may spread (room bounds, minimum separation, optional
//! clustering toward recent fires) and when its next attempt is due. The
//! policy also owns the spatial index of burning fires, since placement checks
//! and water-hit lookups are the only proximity queries in the simulation.

use crate::config::SpreadConfig;
use crate::core_types::bounds::RoomBounds;
use crate::core_types::rng::SimRng;
use crate::core_types::spatial::SpatialIndex;
use crate::core_types::vec2::Vec2;
use crate::error::SpawnRejection;
use rustc_hash::FxHashMap;

/// Placement rules plus the occupancy of burning fires
#[derive(Debug, Clone)]
pub struct SpreadPolicy {
    bounds: RoomBounds,
    config: SpreadConfig,
    index: SpatialIndex,
    occupied: FxHashMap<u32, Vec2>,
}

impl SpreadPolicy {
    pub fn new(bounds: RoomBounds, config: SpreadConfig) -> Self {
        let (origin, _) = bounds.bounding_box();
        // Cells as wide as the search radius keep queries to a 3x3 block
        let cell_size = config.spread_range.max(0.5);
        Self {
            bounds,
            config,
            index: SpatialIndex::new(origin, cell_size),
            occupied: FxHashMap::default(),
        }
    }

    pub fn bounds(&self) -> &RoomBounds {
        &self.bounds
    }

    pub fn config(&self) -> &SpreadConfig {
        &self.config
    }

    /// Register a burning fire
    pub fn occupy(&mut self, id: u32, position: Vec2) {
        if let Some(old) = self.occupied.insert(id, position) {
            self.index.remove(id, old);
        }
        self.index.insert(id, position);
    }

    /// Unregister an extinguished fire
    pub fn vacate(&mut self, id: u32) {
        if let Some(position) = self.occupied.remove(&id) {
            self.index.remove(id, position);
        }
    }

    /// Number of registered fires
    pub fn occupied_count(&self) -> usize {
        self.occupied.len()
    }

    /// Draw a spread candidate.
    ///
    /// The draw is uniform over the room; with clustering enabled and an
    /// `anchor` given it is pulled toward the anchor by `cluster_bias`.
    /// `None` only when a polygon room could not be sampled.
    pub fn propose(&self, anchor: Option<Vec2>, rng: &mut SimRng) -> Option<Vec2> {
        let uniform = self.bounds.sample(rng)?;
        match anchor {
            Some(anchor) if self.config.clustering => {
                Some(uniform.lerp(&anchor, self.config.cluster_bias))
            }
            _ => Some(uniform),
        }
    }

    /// Check a candidate against the room and every burning fire.
    ///
    /// # Errors
    /// [`SpawnRejection::OutsideRoom`] when the candidate is outside the bounds,
    /// [`SpawnRejection::TooClose`] on the first neighbour closer than
    /// `min_separation`.
    pub fn validate(&self, candidate: Vec2) -> Result<(), SpawnRejection> {
        if !self.bounds.contains(candidate) {
            return Err(SpawnRejection::OutsideRoom);
        }

        let min_sep = self.config.min_separation;
        let too_close = self
            .index
            .query_radius(candidate, self.config.spread_range)
            .into_iter()
            .filter_map(|id| self.occupied.get(&id))
            .any(|pos| (pos - candidate).norm() < min_sep);

        if too_close {
            Err(SpawnRejection::TooClose)
        } else {
            Ok(())
        }
    }

    /// Closest burning fire within `radius` of `position`
    pub fn nearest_within(&self, position: Vec2, radius: f32) -> Option<u32> {
        self.index
            .query_radius(position, radius)
            .into_iter()
            .filter_map(|id| self.occupied.get(&id).map(|pos| (id, (pos - position).norm())))
            .filter(|&(_, d)| d <= radius)
            .min_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)))
            .map(|(id, _)| id)
    }

    /// Roll the spread chance for a due attempt
    pub fn roll(&self, rng: &mut SimRng) -> bool {
        rng.chance(self.config.spread_chance)
    }

    /// Delay until the next attempt: base delay plus jitter
    pub fn next_delay(&self, rng: &mut SimRng) -> f32 {
        self.config.spread_delay + rng.range(0.0, self.config.spread_jitter)
    }

    /// Wait after finding the population saturated
    pub fn backoff(&self) -> f32 {
        self.config.saturation_backoff
    }
}
