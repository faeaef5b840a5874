//! Simulation configuration and tuning presets
//!
//! Every sub-config has a `Default` that matches the classic room tuning, so
//! callers override only what they need:
//!
//! ```
//! use room_fire_core::{RoomBounds, SimulationConfig, SpreadConfig};
//!
//! let config = SimulationConfig {
//!     spread: SpreadConfig {
//!         spread_chance: 0.5,
//!         ..Default::default()
//!     },
//!     ..SimulationConfig::for_room(RoomBounds::sized(20.0, 12.0))
//! };
//! assert!(config.validate().is_ok());
//! ```

use crate::core_types::bounds::RoomBounds;
use crate::core_types::rng::DEFAULT_SEED;
use crate::core_types::vec2::Vec2;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Per-fire intensity parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FireConfig {
    /// Intensity of an externally spawned fire when none is given
    pub initial_intensity: f32,
    /// Upper clamp for any fire's intensity
    pub intensity_cap: f32,
    /// A fire is extinguished once its intensity drops to this value or below
    pub extinguish_threshold: f32,
    /// Child intensity = parent intensity × `growth_factor`
    pub growth_factor: f32,
}

impl Default for FireConfig {
    fn default() -> Self {
        Self {
            initial_intensity: 1.0,
            intensity_cap: 5.0,
            extinguish_threshold: 0.1,
            growth_factor: 1.1,
        }
    }
}

/// Spread timing and placement parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpreadConfig {
    /// Base wait between spread attempts (seconds)
    pub spread_delay: f32,
    /// Uniform jitter added on top of `spread_delay` (seconds)
    pub spread_jitter: f32,
    /// Probability that a due attempt actually spreads
    pub spread_chance: f32,
    /// Search radius of the proximity check
    pub spread_range: f32,
    /// Minimum distance between two active fires at spawn time
    pub min_separation: f32,
    /// Wait after finding the population saturated (seconds); never shorter
    /// than `spread_delay`
    pub saturation_backoff: f32,
    /// Bias candidates toward the parent and its recent children
    pub clustering: bool,
    /// Interpolation factor toward the clustering anchor (0 = uniform, 1 = on the anchor)
    pub cluster_bias: f32,
    /// Recent child positions remembered per fire
    pub recent_positions: usize,
}

impl Default for SpreadConfig {
    fn default() -> Self {
        Self {
            spread_delay: 1.0,
            spread_jitter: 0.0,
            spread_chance: 1.0,
            spread_range: 2.0,
            min_separation: 1.8,
            saturation_backoff: 2.0,
            clustering: true,
            cluster_bias: 0.5,
            recent_positions: 8,
        }
    }
}

/// Room temperature parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThermalConfig {
    /// Ambient temperature and lower clamp (°C)
    pub room_baseline: f32,
    /// Upper clamp; reaching it triggers evacuation (°C)
    pub max_temperature: f32,
    /// Rise per successful spread, and per fire on each periodic rise (°C)
    pub temperature_increase: f32,
    /// Enable the background rise proportional to active fires
    pub periodic_rise: bool,
    /// Periodic rise interval (seconds)
    pub rise_interval: f32,
    /// Periodic rise interval once the fire count exceeds `throttle_threshold`
    pub throttled_interval: f32,
    /// Fire count above which the throttled interval applies
    pub throttle_threshold: usize,
    /// Lower the temperature when a fire is extinguished
    pub cool_on_extinguish: bool,
    /// Temperature drop per extinguished fire (°C)
    pub extinguish_cooling: f32,
}

impl Default for ThermalConfig {
    fn default() -> Self {
        Self {
            room_baseline: 20.0,
            max_temperature: 100.0,
            temperature_increase: 2.0,
            periodic_rise: true,
            rise_interval: 5.0,
            throttled_interval: 10.0,
            throttle_threshold: 5,
            cool_on_extinguish: true,
            extinguish_cooling: 2.0,
        }
    }
}

/// Evacuation escalation parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvacuationConfig {
    /// Temperature entering the warning tier (°C)
    pub warning_threshold: f32,
    /// Temperature entering the critical tier (°C)
    pub critical_threshold: f32,
    /// Interval between temperature polls (seconds)
    pub poll_interval: f32,
    /// Final countdown length after the trigger (seconds)
    pub countdown: f32,
}

impl Default for EvacuationConfig {
    fn default() -> Self {
        Self {
            warning_threshold: 80.0,
            critical_threshold: 90.0,
            poll_interval: 0.25,
            countdown: 30.0,
        }
    }
}

/// Water hit parameters used by the interaction layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaterConfig {
    /// Intensity removed per hit
    pub extinguish_amount: f32,
    /// Radius of the proximity check around a hit position
    pub hit_radius: f32,
}

impl Default for WaterConfig {
    fn default() -> Self {
        Self {
            extinguish_amount: 0.25,
            hit_radius: 0.5,
        }
    }
}

/// External spawner placing fires at fixed points on an interval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnerConfig {
    /// Candidate spawn points, one chosen at random per spawn
    pub spawn_points: Vec<Vec2>,
    /// Seconds between spawns
    pub interval: f32,
    /// Delay before the first spawn (seconds)
    pub start_delay: f32,
    /// Intensity of spawned fires
    pub intensity: f32,
}

impl Default for SpawnerConfig {
    fn default() -> Self {
        Self {
            spawn_points: Vec::new(),
            interval: 3.0,
            start_delay: 0.0,
            intensity: 1.0,
        }
    }
}

/// Complete session configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Legal spawn region; required
    pub room: Option<RoomBounds>,
    /// Maximum simultaneously active fires
    pub max_fires: usize,
    /// Fixed simulation rate (ticks per second)
    pub tick_rate: f32,
    /// Seed of the simulation RNG
    pub seed: u64,
    pub fire: FireConfig,
    pub spread: SpreadConfig,
    pub thermal: ThermalConfig,
    pub evacuation: EvacuationConfig,
    pub water: WaterConfig,
    /// Optional external spawner
    pub spawner: Option<SpawnerConfig>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            room: None,
            max_fires: 10,
            tick_rate: 30.0,
            seed: DEFAULT_SEED,
            fire: FireConfig::default(),
            spread: SpreadConfig::default(),
            thermal: ThermalConfig::default(),
            evacuation: EvacuationConfig::default(),
            water: WaterConfig::default(),
            spawner: None,
        }
    }
}

impl SimulationConfig {
    /// Default configuration for the given room
    pub fn for_room(room: RoomBounds) -> Self {
        Self {
            room: Some(room),
            ..Default::default()
        }
    }

    /// Seconds per tick
    pub fn tick_dt(&self) -> f32 {
        1.0 / self.tick_rate
    }

    /// Validate every parameter.
    ///
    /// # Errors
    /// Returns the first [`ConfigError`] found: missing or degenerate room
    /// bounds, non-positive rates and intervals, probabilities outside
    /// `[0, 1]`, or temperature thresholds out of order.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let room = self.room.as_ref().ok_or(ConfigError::MissingRoomBounds)?;
        room.validate()?;

        if self.max_fires == 0 {
            return Err(ConfigError::invalid("max_fires", "must be at least 1"));
        }
        positive("tick_rate", self.tick_rate)?;

        let fire = &self.fire;
        positive("fire.intensity_cap", fire.intensity_cap)?;
        positive("fire.growth_factor", fire.growth_factor)?;
        non_negative("fire.extinguish_threshold", fire.extinguish_threshold)?;
        if fire.extinguish_threshold >= fire.intensity_cap {
            return Err(ConfigError::invalid(
                "fire.extinguish_threshold",
                "must be below fire.intensity_cap",
            ));
        }
        positive("fire.initial_intensity", fire.initial_intensity)?;

        let spread = &self.spread;
        positive("spread.spread_delay", spread.spread_delay)?;
        non_negative("spread.spread_jitter", spread.spread_jitter)?;
        probability("spread.spread_chance", spread.spread_chance)?;
        non_negative("spread.spread_range", spread.spread_range)?;
        non_negative("spread.min_separation", spread.min_separation)?;
        if spread.min_separation > spread.spread_range {
            return Err(ConfigError::invalid(
                "spread.min_separation",
                format!(
                    "must not exceed spread.spread_range ({}), got {}",
                    spread.spread_range, spread.min_separation
                ),
            ));
        }
        positive("spread.saturation_backoff", spread.saturation_backoff)?;
        if spread.saturation_backoff < spread.spread_delay {
            return Err(ConfigError::invalid(
                "spread.saturation_backoff",
                format!(
                    "must be at least spread.spread_delay ({}), got {}",
                    spread.spread_delay, spread.saturation_backoff
                ),
            ));
        }
        probability("spread.cluster_bias", spread.cluster_bias)?;

        let thermal = &self.thermal;
        if !thermal.room_baseline.is_finite() {
            return Err(ConfigError::invalid("thermal.room_baseline", "must be finite"));
        }
        if !(thermal.max_temperature.is_finite() && thermal.max_temperature > thermal.room_baseline) {
            return Err(ConfigError::invalid(
                "thermal.max_temperature",
                format!(
                    "must exceed thermal.room_baseline ({}), got {}",
                    thermal.room_baseline, thermal.max_temperature
                ),
            ));
        }
        non_negative("thermal.temperature_increase", thermal.temperature_increase)?;
        non_negative("thermal.extinguish_cooling", thermal.extinguish_cooling)?;
        if thermal.periodic_rise {
            positive("thermal.rise_interval", thermal.rise_interval)?;
            positive("thermal.throttled_interval", thermal.throttled_interval)?;
        }

        let evac = &self.evacuation;
        let ordered = thermal.room_baseline < evac.warning_threshold
            && evac.warning_threshold <= evac.critical_threshold
            && evac.critical_threshold <= thermal.max_temperature;
        if !ordered {
            return Err(ConfigError::invalid(
                "evacuation",
                format!(
                    "thresholds must satisfy baseline < warning <= critical <= max, got {} < {} <= {} <= {}",
                    thermal.room_baseline,
                    evac.warning_threshold,
                    evac.critical_threshold,
                    thermal.max_temperature
                ),
            ));
        }
        positive("evacuation.poll_interval", evac.poll_interval)?;
        positive("evacuation.countdown", evac.countdown)?;

        positive("water.extinguish_amount", self.water.extinguish_amount)?;
        non_negative("water.hit_radius", self.water.hit_radius)?;

        if let Some(spawner) = &self.spawner {
            positive("spawner.interval", spawner.interval)?;
            non_negative("spawner.start_delay", spawner.start_delay)?;
            positive("spawner.intensity", spawner.intensity)?;
        }

        Ok(())
    }
}

fn positive(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::not_positive(name, value))
    }
}

fn non_negative(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(
            name,
            format!("must be finite and non-negative, got {value}"),
        ))
    }
}

fn probability(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::not_probability(name, value))
    }
}

/// Tuning presets observed for the room fire game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TuningPreset {
    /// Every due attempt spreads; fixed one second cadence
    #[default]
    Classic,

    /// Slower, jittered escalation
    /// - 15% spread chance per attempt
    /// - up to 0.5s jitter on the spread delay
    /// - 15 fire cap
    Escalation,
}

impl TuningPreset {
    /// Spread chance for this preset
    pub fn spread_chance(&self) -> f32 {
        match self {
            TuningPreset::Classic => 1.0,
            TuningPreset::Escalation => 0.15,
        }
    }

    /// Jitter added to each spread delay
    pub fn spread_jitter(&self) -> f32 {
        match self {
            TuningPreset::Classic => 0.0,
            TuningPreset::Escalation => 0.5,
        }
    }

    /// Population cap
    pub fn max_fires(&self) -> usize {
        match self {
            TuningPreset::Classic => 10,
            TuningPreset::Escalation => 15,
        }
    }

    /// Build a configuration for `room` using this preset
    pub fn config(&self, room: RoomBounds) -> SimulationConfig {
        let mut config = SimulationConfig::for_room(room);
        self.apply(&mut config);
        config
    }

    /// Apply preset tuning on top of an existing configuration
    pub fn apply(&self, config: &mut SimulationConfig) {
        config.spread.spread_chance = self.spread_chance();
        config.spread.spread_jitter = self.spread_jitter();
        config.max_fires = self.max_fires();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room() -> RoomBounds {
        RoomBounds::sized(20.0, 12.0)
    }

    #[test]
    fn test_default_requires_room() {
        assert_eq!(
            SimulationConfig::default().validate(),
            Err(ConfigError::MissingRoomBounds)
        );
        assert!(SimulationConfig::for_room(room()).validate().is_ok());
    }

    #[test]
    fn test_threshold_order_enforced() {
        let mut config = SimulationConfig::for_room(room());
        config.evacuation.warning_threshold = 95.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidParameter { name: "evacuation", .. })
        ));
    }

    #[test]
    fn test_separation_bounded_by_range() {
        let mut config = SimulationConfig::for_room(room());
        config.spread.min_separation = 3.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_probability_and_rate() {
        let mut config = SimulationConfig::for_room(room());
        config.spread.spread_chance = 1.2;
        assert!(config.validate().is_err());

        let mut config = SimulationConfig::for_room(room());
        config.tick_rate = 0.0;
        assert!(config.validate().is_err());

        let mut config = SimulationConfig::for_room(room());
        config.max_fires = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_backoff_not_shorter_than_delay() {
        let mut config = SimulationConfig::for_room(room());
        config.spread.spread_delay = 3.0;
        config.spread.saturation_backoff = 2.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidParameter {
                name: "spread.saturation_backoff",
                ..
            })
        ));

        config.spread.saturation_backoff = 3.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_presets() {
        let classic = TuningPreset::Classic.config(room());
        assert_eq!(classic.spread.spread_chance, 1.0);
        assert_eq!(classic.max_fires, 10);

        let escalation = TuningPreset::Escalation.config(room());
        assert_eq!(escalation.spread.spread_chance, 0.15);
        assert_eq!(escalation.spread.spread_jitter, 0.5);
        assert!(escalation.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{ "room": { "Rect": { "min": [0.0, 0.0], "max": [8.0, 6.0] } }, "max_fires": 4 }"#;
        let config: SimulationConfig = serde_json::from_str(json).expect("valid config json");
        assert_eq!(config.max_fires, 4);
        assert_eq!(config.thermal, ThermalConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_is_classic() {
        assert_eq!(TuningPreset::default(), TuningPreset::Classic);
    }
}
