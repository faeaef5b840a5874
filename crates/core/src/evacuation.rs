//! Evacuation escalation state machine
//!
//! ```text
//! Normal ─► Warning ─► Critical ─► Triggered ─► FinalCountdown ─► Over
//!   (≥ warning)  (≥ critical)  (≥ max, once)   (immediately)   (countdown elapsed)
//! ```
//!
//! The phase is driven by polling the room temperature and never moves
//! backwards. Cooling after the trigger does not cancel the evacuation.

use crate::config::EvacuationConfig;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Escalation phase, ordered by severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EvacuationPhase {
    Normal,
    Warning,
    Critical,
    Triggered,
    FinalCountdown,
    Over,
}

impl EvacuationPhase {
    /// Phase that follows this one, `None` for `Over`
    pub fn next(self) -> Option<Self> {
        match self {
            EvacuationPhase::Normal => Some(EvacuationPhase::Warning),
            EvacuationPhase::Warning => Some(EvacuationPhase::Critical),
            EvacuationPhase::Critical => Some(EvacuationPhase::Triggered),
            EvacuationPhase::Triggered => Some(EvacuationPhase::FinalCountdown),
            EvacuationPhase::FinalCountdown => Some(EvacuationPhase::Over),
            EvacuationPhase::Over => None,
        }
    }
}

/// Warning tiers reported before the trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ThermalTier {
    Warning,
    Critical,
}

/// Phase change produced by a poll or countdown step
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EvacuationTransition {
    /// Entered a warning tier at `temperature`
    Tier {
        tier: ThermalTier,
        temperature: f32,
    },
    /// The one-shot trigger fired; countdown of `countdown` seconds begins
    Triggered { temperature: f32, countdown: f32 },
    /// Countdown elapsed; the session is over
    Over,
}

/// Watches the room temperature and escalates toward evacuation
#[derive(Debug, Clone)]
pub struct EvacuationController {
    phase: EvacuationPhase,
    config: EvacuationConfig,
    max_temperature: f32,
    /// Set exactly once, when the trigger fires
    latched: bool,
    countdown_remaining: Option<f32>,
    countdowns_started: u32,
    poll_timer: f32,
}

impl EvacuationController {
    pub fn new(config: EvacuationConfig, max_temperature: f32) -> Self {
        Self {
            phase: EvacuationPhase::Normal,
            config,
            max_temperature,
            latched: false,
            countdown_remaining: None,
            countdowns_started: 0,
            poll_timer: 0.0,
        }
    }

    pub fn phase(&self) -> EvacuationPhase {
        self.phase
    }

    /// Seconds left once the final countdown is running
    pub fn countdown_remaining(&self) -> Option<f32> {
        self.countdown_remaining
    }

    /// Number of countdowns ever started; at most one per session
    pub fn countdowns_started(&self) -> u32 {
        self.countdowns_started
    }

    pub fn is_triggered(&self) -> bool {
        self.latched
    }

    pub fn is_over(&self) -> bool {
        self.phase == EvacuationPhase::Over
    }

    /// Highest pre-trigger phase the temperature warrants
    fn target_phase(&self, temperature: f32) -> EvacuationPhase {
        if temperature >= self.max_temperature {
            EvacuationPhase::Triggered
        } else if temperature >= self.config.critical_threshold {
            EvacuationPhase::Critical
        } else if temperature >= self.config.warning_threshold {
            EvacuationPhase::Warning
        } else {
            EvacuationPhase::Normal
        }
    }

    /// Compare `temperature` against the thresholds and escalate.
    ///
    /// A jump across several tiers walks through each of them in order.
    pub fn poll(&mut self, temperature: f32) -> Vec<EvacuationTransition> {
        let mut transitions = Vec::new();
        let target = self.target_phase(temperature);

        while self.phase < target && self.phase < EvacuationPhase::Triggered {
            let Some(next) = self.phase.next() else {
                break;
            };
            self.phase = next;
            match next {
                EvacuationPhase::Warning => {
                    warn!("Room temperature {:.1}°C: warning tier", temperature);
                    transitions.push(EvacuationTransition::Tier {
                        tier: ThermalTier::Warning,
                        temperature,
                    });
                }
                EvacuationPhase::Critical => {
                    warn!("Room temperature {:.1}°C: critical tier", temperature);
                    transitions.push(EvacuationTransition::Tier {
                        tier: ThermalTier::Critical,
                        temperature,
                    });
                }
                EvacuationPhase::Triggered => {
                    if let Some(t) = self.trigger(temperature) {
                        transitions.push(t);
                    }
                }
                _ => {}
            }
        }

        transitions
    }

    /// Latch the trigger and start the countdown. `None` if already latched.
    fn trigger(&mut self, temperature: f32) -> Option<EvacuationTransition> {
        if self.latched {
            return None;
        }
        self.latched = true;
        self.phase = EvacuationPhase::FinalCountdown;
        self.countdown_remaining = Some(self.config.countdown);
        self.countdowns_started += 1;
        warn!(
            "Evacuation triggered at {:.1}°C, {:.0}s countdown",
            temperature, self.config.countdown
        );
        Some(EvacuationTransition::Triggered {
            temperature,
            countdown: self.config.countdown,
        })
    }

    /// Advance by `dt`: run the countdown, then poll on the configured cadence.
    pub fn advance(&mut self, dt: f32, temperature: f32) -> Vec<EvacuationTransition> {
        let mut transitions = Vec::new();

        if let Some(remaining) = self.countdown_remaining.as_mut() {
            if self.phase == EvacuationPhase::FinalCountdown {
                *remaining = (*remaining - dt).max(0.0);
                if *remaining <= 0.0 {
                    self.phase = EvacuationPhase::Over;
                    info!("Evacuation countdown elapsed");
                    transitions.push(EvacuationTransition::Over);
                }
            }
            return transitions;
        }

        self.poll_timer -= dt;
        if self.poll_timer <= 0.0 {
            self.poll_timer = self.config.poll_interval;
            transitions.extend(self.poll(temperature));
        }
        transitions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> EvacuationController {
        EvacuationController::new(EvacuationConfig::default(), 100.0)
    }

    #[test]
    fn test_tiers_in_order() {
        let mut evac = controller();
        assert!(evac.poll(50.0).is_empty());
        assert_eq!(evac.phase(), EvacuationPhase::Normal);

        let t = evac.poll(85.0);
        assert_eq!(evac.phase(), EvacuationPhase::Warning);
        assert!(matches!(
            t.as_slice(),
            [EvacuationTransition::Tier {
                tier: ThermalTier::Warning,
                ..
            }]
        ));

        evac.poll(95.0);
        assert_eq!(evac.phase(), EvacuationPhase::Critical);
    }

    #[test]
    fn test_jump_walks_every_tier() {
        let mut evac = controller();
        let t = evac.poll(100.0);
        assert_eq!(t.len(), 3);
        assert!(matches!(t[2], EvacuationTransition::Triggered { .. }));
        assert_eq!(evac.phase(), EvacuationPhase::FinalCountdown);
        assert_eq!(evac.countdown_remaining(), Some(30.0));
    }

    #[test]
    fn test_trigger_latches_once() {
        let mut evac = controller();
        evac.poll(100.0);
        assert!(evac.poll(100.0).is_empty());
        evac.advance(0.1, 100.0);
        evac.advance(0.1, 100.0);
        assert_eq!(evac.countdowns_started(), 1);
    }

    #[test]
    fn test_cooling_never_regresses() {
        let mut evac = controller();
        evac.poll(92.0);
        assert!(evac.poll(20.0).is_empty());
        assert_eq!(evac.phase(), EvacuationPhase::Critical);

        evac.poll(100.0);
        evac.advance(1.0, 20.0);
        assert_eq!(evac.phase(), EvacuationPhase::FinalCountdown);
    }

    #[test]
    fn test_countdown_reaches_over() {
        let mut evac = controller();
        evac.poll(100.0);
        for _ in 0..29 {
            assert!(evac.advance(1.0, 100.0).is_empty());
        }
        assert_eq!(evac.advance(1.0, 100.0), vec![EvacuationTransition::Over]);
        assert!(evac.is_over());
        assert!(evac.advance(1.0, 100.0).is_empty());
        assert_eq!(EvacuationPhase::Over.next(), None);
    }

    #[test]
    fn test_advance_polls_on_cadence() {
        let mut evac = controller();
        // First advance polls immediately, then every 0.25s
        assert_eq!(evac.advance(0.1, 85.0).len(), 1);
        assert!(evac.advance(0.1, 95.0).is_empty());
        assert_eq!(evac.phase(), EvacuationPhase::Warning);
        assert_eq!(evac.advance(0.2, 95.0).len(), 1);
        assert_eq!(evac.phase(), EvacuationPhase::Critical);
    }
}
