//! Shared room temperature
//!
//! One clamped value in `[room_baseline, max_temperature]`. Spreads push it up,
//! extinguishments may pull it down, and a background rise adds
//! `temperature_increase` per active fire on a fixed cadence. The cadence
//! slows from `rise_interval` to `throttled_interval` once more than
//! `throttle_threshold` fires burn.

use crate::config::ThermalConfig;
use crate::core_types::timer::elapse;
use tracing::debug;

/// Floor on the rise cadence so a zero interval cannot stall `advance`
const MIN_RISE_INTERVAL: f32 = 1e-3;

/// Room temperature accumulator
#[derive(Debug, Clone)]
pub struct ThermalAccumulator {
    temperature: f32,
    config: ThermalConfig,
    rise_timer: f32,
}

impl ThermalAccumulator {
    /// Start at the room baseline
    pub fn new(config: ThermalConfig) -> Self {
        Self {
            temperature: config.room_baseline,
            rise_timer: config.rise_interval,
            config,
        }
    }

    /// Current temperature (°C)
    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    pub fn baseline(&self) -> f32 {
        self.config.room_baseline
    }

    pub fn max_temperature(&self) -> f32 {
        self.config.max_temperature
    }

    /// Whether the temperature sits at its ceiling
    pub fn is_at_max(&self) -> bool {
        self.temperature >= self.config.max_temperature
    }

    /// Raise by `delta`, clamped to `max_temperature`. Returns the applied change.
    pub fn increase(&mut self, delta: f32) -> f32 {
        if !delta.is_finite() || delta <= 0.0 {
            return 0.0;
        }
        let before = self.temperature;
        self.temperature = (self.temperature + delta).min(self.config.max_temperature);
        debug!("Room temperature: {:.1}°C", self.temperature);
        self.temperature - before
    }

    /// Lower by `delta`, clamped to `room_baseline`. Returns the applied change
    /// as a positive number.
    pub fn decrease(&mut self, delta: f32) -> f32 {
        if !delta.is_finite() || delta <= 0.0 {
            return 0.0;
        }
        let before = self.temperature;
        self.temperature = (self.temperature - delta).max(self.config.room_baseline);
        debug!("Room temperature: {:.1}°C", self.temperature);
        before - self.temperature
    }

    /// Interval before the next background rise given the current fire count
    pub fn rise_interval_for(&self, active_count: usize) -> f32 {
        let interval = if active_count > self.config.throttle_threshold {
            self.config.throttled_interval
        } else {
            self.config.rise_interval
        };
        interval.max(MIN_RISE_INTERVAL)
    }

    /// Advance the background rise by `dt`.
    ///
    /// Returns the total temperature change applied during this step.
    pub fn advance(&mut self, dt: f32, active_count: usize) -> f32 {
        if !self.config.periodic_rise {
            return 0.0;
        }

        let interval = self.rise_interval_for(active_count);
        let due = elapse(&mut self.rise_timer, dt, interval);
        if due == 0 || active_count == 0 {
            return 0.0;
        }
        self.increase(self.config.temperature_increase * active_count as f32 * due as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ThermalConfig {
        ThermalConfig {
            periodic_rise: false,
            ..Default::default()
        }
    }

    #[test]
    fn test_four_spreads_reach_28() {
        let mut thermal = ThermalAccumulator::new(config());
        for _ in 0..4 {
            thermal.increase(2.0);
        }
        assert_eq!(thermal.temperature(), 28.0);
    }

    #[test]
    fn test_clamped_both_ways() {
        let mut thermal = ThermalAccumulator::new(config());
        assert_eq!(thermal.increase(500.0), 80.0);
        assert_eq!(thermal.temperature(), 100.0);
        assert!(thermal.is_at_max());

        assert_eq!(thermal.decrease(500.0), 80.0);
        assert_eq!(thermal.temperature(), 20.0);
    }

    #[test]
    fn test_ignores_bad_deltas() {
        let mut thermal = ThermalAccumulator::new(config());
        assert_eq!(thermal.increase(-3.0), 0.0);
        assert_eq!(thermal.increase(f32::NAN), 0.0);
        assert_eq!(thermal.decrease(f32::INFINITY), 0.0);
        assert_eq!(thermal.temperature(), 20.0);
    }

    #[test]
    fn test_periodic_rise_per_fire() {
        let mut thermal = ThermalAccumulator::new(ThermalConfig::default());
        assert_eq!(thermal.advance(4.0, 3), 0.0);
        assert_eq!(thermal.advance(1.0, 3), 6.0);
        assert_eq!(thermal.temperature(), 26.0);
    }

    #[test]
    fn test_periodic_rise_throttles_above_threshold() {
        let thermal = ThermalAccumulator::new(ThermalConfig::default());
        assert_eq!(thermal.rise_interval_for(5), 5.0);
        assert_eq!(thermal.rise_interval_for(6), 10.0);
    }

    #[test]
    fn test_long_step_rises_once_per_interval() {
        let mut thermal = ThermalAccumulator::new(ThermalConfig::default());
        // Intervals due at 5, 10 and 15 seconds
        assert_eq!(thermal.advance(17.0, 2), 12.0);
        assert_eq!(thermal.temperature(), 32.0);
    }

    #[test]
    fn test_huge_step_returns_clamped() {
        let mut thermal = ThermalAccumulator::new(ThermalConfig::default());
        assert_eq!(thermal.advance(1.0e9, 1), 80.0);
        assert!(thermal.is_at_max());
        assert_eq!(thermal.advance(1.0e9, 1), 0.0);
    }

    #[test]
    fn test_no_rise_without_fires() {
        let mut thermal = ThermalAccumulator::new(ThermalConfig::default());
        assert_eq!(thermal.advance(30.0, 0), 0.0);
        assert_eq!(thermal.temperature(), 20.0);
    }
}
