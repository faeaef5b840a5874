//! Global cap on simultaneously active fires

use crate::error::SpawnRejection;
use tracing::warn;

/// Tracks the number of burning fires against a fixed ceiling.
///
/// `try_admit` performs the capacity check and the increment as one call, so
/// no sequence of admissions can push the count past `max_fires`.
#[derive(Debug, Clone)]
pub struct PopulationLimiter {
    active_count: usize,
    max_fires: usize,
    peak: usize,
}

impl PopulationLimiter {
    pub fn new(max_fires: usize) -> Self {
        Self {
            active_count: 0,
            max_fires,
            peak: 0,
        }
    }

    pub fn active_count(&self) -> usize {
        self.active_count
    }

    pub fn max_fires(&self) -> usize {
        self.max_fires
    }

    /// Highest count reached this session
    pub fn peak(&self) -> usize {
        self.peak
    }

    pub fn has_headroom(&self) -> bool {
        self.active_count < self.max_fires
    }

    pub fn is_saturated(&self) -> bool {
        !self.has_headroom()
    }

    /// Reserve a slot for a new fire.
    ///
    /// # Errors
    /// Returns [`SpawnRejection::CapacityExceeded`] when the cap is reached;
    /// the count is left unchanged.
    pub fn try_admit(&mut self) -> Result<(), SpawnRejection> {
        if self.is_saturated() {
            return Err(SpawnRejection::CapacityExceeded);
        }
        self.active_count += 1;
        self.peak = self.peak.max(self.active_count);
        if self.is_saturated() {
            warn!("Maximum fire limit reached ({})", self.max_fires);
        }
        Ok(())
    }

    /// Return the slot of an extinguished fire
    pub fn release(&mut self) {
        debug_assert!(self.active_count > 0, "released more fires than admitted");
        self.active_count = self.active_count.saturating_sub(1);
    }
}
