//! Room fire session coordinator
//!
//! `FireSimulation` owns every piece of shared mutable state in a session:
//! the fire agents, the population count, the room temperature and the
//! evacuation latch. It is the only writer. External collaborators either call
//! its `&mut` methods from the owning thread or submit [`Intent`]s, which are
//! applied in arrival order at the start of the next tick.
//!
//! Each tick runs, in order:
//! 1. pending intents
//! 2. the external spawner, if configured
//! 3. every fire's spread timer (ascending id)
//! 4. the background temperature rise
//! 5. the evacuation poll and countdown
//!
//! The session ends at `EvacuationPhase::Over` or when the last fire is put out
//! before the evacuation trigger; after that, ticks and intents are ignored.

pub mod events;
pub mod handle;
pub mod intent_queue;
pub mod snapshot;

pub use events::{EventBus, FireEvent, SessionOutcome};
pub use handle::{SimCommand, SimulationHandle};
pub use intent_queue::{Intent, SubmittedIntent};
pub(crate) use intent_queue::IntentQueue;
pub use snapshot::{FireSnapshot, SimulationSnapshot, SimulationStats};

use crate::config::SimulationConfig;
use crate::core_types::rng::SimRng;
use crate::core_types::vec2::Vec2;
use crate::error::{ConfigError, SpawnRejection};
use crate::evacuation::{EvacuationController, EvacuationPhase, EvacuationTransition};
use crate::fire::{
    ExtinguishOutcome, FireAgent, FireHandle, FireId, FireSpawner, FireState, PopulationLimiter,
    SpreadPolicy,
};
use crate::thermal::ThermalAccumulator;
use std::collections::BTreeMap;
use std::sync::mpsc::Receiver;
use tracing::{debug, info, warn};

/// A single in-memory room fire session
pub struct FireSimulation {
    config: SimulationConfig,
    rng: SimRng,

    // Fire agents, keyed by id so iteration order is stable for a given seed
    fires: BTreeMap<FireId, FireAgent>,
    next_fire_id: u32,

    population: PopulationLimiter,
    spread: SpreadPolicy,
    thermal: ThermalAccumulator,
    evacuation: EvacuationController,
    spawner: Option<FireSpawner>,

    intents: IntentQueue,
    events: EventBus,

    outcome: Option<SessionOutcome>,
    stats: SimulationStats,
    simulation_time: f32,
    frame: u64,
}

impl FireSimulation {
    /// Create a session from a validated configuration.
    ///
    /// # Errors
    /// Returns [`ConfigError`] when the configuration is incomplete or
    /// inconsistent (see [`SimulationConfig::validate`]).
    pub fn new(config: SimulationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let room = config.room.clone().ok_or(ConfigError::MissingRoomBounds)?;

        info!(
            "Creating room fire simulation: max_fires={}, tick_rate={}Hz, seed={}",
            config.max_fires, config.tick_rate, config.seed
        );

        Ok(Self {
            rng: SimRng::from_seed_u64(config.seed),
            fires: BTreeMap::new(),
            next_fire_id: 0,
            population: PopulationLimiter::new(config.max_fires),
            spread: SpreadPolicy::new(room, config.spread),
            thermal: ThermalAccumulator::new(config.thermal),
            evacuation: EvacuationController::new(
                config.evacuation,
                config.thermal.max_temperature,
            ),
            spawner: config.spawner.as_ref().map(FireSpawner::new),
            intents: IntentQueue::default(),
            events: EventBus::default(),
            outcome: None,
            stats: SimulationStats::default(),
            simulation_time: 0.0,
            frame: 0,
            config,
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Subscribe to lifecycle events published from now on
    pub fn subscribe(&mut self) -> Receiver<FireEvent> {
        self.events.subscribe()
    }

    /// Queue an intent for the next tick
    pub fn submit(&mut self, intent: Intent) {
        if self.outcome.is_some() {
            debug!("Ignoring {:?}: session over", intent);
            return;
        }
        self.intents.submit(intent, self.simulation_time);
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn active_fire_count(&self) -> usize {
        self.population.active_count()
    }

    /// Room temperature (°C)
    pub fn temperature(&self) -> f32 {
        self.thermal.temperature()
    }

    pub fn evacuation_phase(&self) -> EvacuationPhase {
        self.evacuation.phase()
    }

    pub fn countdown_remaining(&self) -> Option<f32> {
        self.evacuation.countdown_remaining()
    }

    /// Number of evacuation countdowns started this session (0 or 1)
    pub fn countdowns_started(&self) -> u32 {
        self.evacuation.countdowns_started()
    }

    /// A burning fire by id; extinguished fires are gone
    pub fn fire(&self, id: FireId) -> Option<&FireAgent> {
        self.fires.get(&id)
    }

    /// Every burning fire in ascending id order
    pub fn fires(&self) -> impl Iterator<Item = &FireAgent> {
        self.fires.values()
    }

    pub fn outcome(&self) -> Option<SessionOutcome> {
        self.outcome
    }

    pub fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn stats(&self) -> SimulationStats {
        self.stats
    }

    /// Simulated seconds since the session started
    pub fn simulation_time(&self) -> f32 {
        self.simulation_time
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Events published during the most recent tick
    pub fn events_this_tick(&self) -> &[FireEvent] {
        self.events.emitted_this_tick()
    }

    /// Intents applied during the most recent tick
    pub fn intents_applied_this_tick(&self) -> &[SubmittedIntent] {
        self.intents.applied_this_tick()
    }

    /// Capture a consistent view of the session
    pub fn snapshot(&self) -> SimulationSnapshot {
        SimulationSnapshot {
            frame: self.frame,
            time: self.simulation_time,
            temperature: self.thermal.temperature(),
            phase: self.evacuation.phase(),
            countdown_remaining: self.evacuation.countdown_remaining(),
            active_fires: self.population.active_count(),
            fires: self.fires.values().map(FireSnapshot::from).collect(),
            outcome: self.outcome,
            stats: self.stats,
        }
    }

    /// Check the bookkeeping invariants: the population count matches the
    /// burning agents and the spatial occupancy, and the temperature is in range.
    pub fn check_invariants(&self) -> bool {
        let burning = self.fires.values().filter(|f| f.is_burning()).count();
        let temperature = self.thermal.temperature();
        burning == self.population.active_count()
            && self.fires.len() == self.spread.occupied_count()
            && temperature >= self.thermal.baseline()
            && temperature <= self.thermal.max_temperature()
    }

    // ========================================================================
    // External operations
    // ========================================================================

    /// Place a fire at `position`.
    ///
    /// Explicit placement ignores the minimum separation. A non-finite or
    /// non-positive intensity falls back to `fire.initial_intensity`; larger
    /// values are clamped to `fire.intensity_cap`.
    ///
    /// # Errors
    /// [`SpawnRejection::OutsideRoom`], [`SpawnRejection::CapacityExceeded`],
    /// or [`SpawnRejection::SessionOver`].
    pub fn spawn_fire(
        &mut self,
        position: Vec2,
        initial_intensity: f32,
    ) -> Result<FireHandle, SpawnRejection> {
        if self.outcome.is_some() {
            return Err(SpawnRejection::SessionOver);
        }
        if !self.spread.bounds().contains(position) {
            warn!(
                "Fire cannot spawn at ({:.2}, {:.2}): outside room",
                position.x, position.y
            );
            return Err(SpawnRejection::OutsideRoom);
        }

        let fire = &self.config.fire;
        let intensity = if initial_intensity.is_finite() && initial_intensity > 0.0 {
            initial_intensity.min(fire.intensity_cap)
        } else {
            fire.initial_intensity
        };

        self.population.try_admit()?;
        Ok(self.insert_fire(position, intensity, 0, None))
    }

    /// Apply a water hit of `amount` to fire `id`.
    ///
    /// Unknown or already extinguished ids are a silent no-op.
    pub fn extinguish(&mut self, id: FireId, amount: f32) -> ExtinguishOutcome {
        if self.outcome.is_some() {
            return ExtinguishOutcome::Ignored;
        }
        let threshold = self.config.fire.extinguish_threshold;
        let Some(agent) = self.fires.get_mut(&id) else {
            debug!("Extinguish on unknown {}", id);
            return ExtinguishOutcome::Ignored;
        };

        let outcome = agent.extinguish(amount, threshold);
        match outcome {
            ExtinguishOutcome::Extinguished => {
                info!("Fire {} extinguished by {:.2}", id, amount);
                self.retire_fire(id);
            }
            ExtinguishOutcome::Doused { remaining } => {
                debug!("Fire {} doused by {:.2}, {:.2} left", id, amount, remaining);
            }
            ExtinguishOutcome::Ignored => {}
        }
        outcome
    }

    /// Water hit at `position`: douse the nearest burning fire within `radius`.
    ///
    /// Returns the id of the fire that was hit, if any. Hits with a
    /// non-finite position, a non-finite or negative radius, or that cannot
    /// reach the room miss.
    pub fn extinguish_at(&mut self, position: Vec2, radius: f32, amount: f32) -> Option<FireId> {
        if self.outcome.is_some() {
            return None;
        }
        let finite = position.x.is_finite() && position.y.is_finite() && radius.is_finite();
        if !finite || radius < 0.0 {
            debug!("Ignoring water hit at {:?} with radius {}", position, radius);
            return None;
        }

        let (lo, hi) = self.spread.bounds().bounding_box();
        let reach = Vec2::new(radius, radius);
        let (near_lo, near_hi) = (lo - reach, hi + reach);
        if position.x < near_lo.x
            || position.x > near_hi.x
            || position.y < near_lo.y
            || position.y > near_hi.y
        {
            return None;
        }

        // No fire is further away than the farthest corner of the room
        let farthest = Vec2::new(
            (position.x - lo.x).abs().max((position.x - hi.x).abs()),
            (position.y - lo.y).abs().max((position.y - hi.y).abs()),
        );
        let radius = radius.min(farthest.norm());
        let id = FireId(self.spread.nearest_within(position, radius)?);
        self.extinguish(id, amount);
        Some(id)
    }

    /// Water hit at `position` using the configured hit radius and amount
    pub fn water_hit(&mut self, position: Vec2) -> Option<FireId> {
        let water = self.config.water;
        self.extinguish_at(position, water.hit_radius, water.extinguish_amount)
    }

    /// Force one spread attempt from fire `id`, skipping the timer and chance roll.
    ///
    /// # Errors
    /// Any [`SpawnRejection`]; the parent is left untouched on rejection.
    pub fn trigger_spread(&mut self, id: FireId) -> Result<FireHandle, SpawnRejection> {
        self.attempt_spread(id)
    }

    /// Force one spread attempt from every burning fire
    pub fn trigger_spread_all(&mut self) -> Vec<Result<FireHandle, SpawnRejection>> {
        let ids: Vec<FireId> = self.fires.keys().copied().collect();
        ids.into_iter().map(|id| self.attempt_spread(id)).collect()
    }

    // ========================================================================
    // Time
    // ========================================================================

    /// Advance one fixed tick of `1 / tick_rate` seconds
    pub fn tick(&mut self) {
        self.step(self.config.tick_dt());
    }

    /// Advance by `dt` seconds
    pub fn step(&mut self, dt: f32) {
        if self.outcome.is_some() || !(dt.is_finite() && dt > 0.0) {
            return;
        }

        self.events.begin_tick();
        self.intents.begin_tick();
        self.frame += 1;
        self.simulation_time += dt;

        self.apply_intents();
        if self.outcome.is_some() {
            return;
        }

        self.run_spawner(dt);
        self.run_fires(dt);

        let rise = self.thermal.advance(dt, self.population.active_count());
        if rise > 0.0 {
            debug!(
                "Background rise +{:.1}°C from {} fires",
                rise,
                self.population.active_count()
            );
        }

        let transitions = self
            .evacuation
            .advance(dt, self.thermal.temperature());
        self.publish_transitions(transitions);

        debug_assert!(self.check_invariants(), "simulation bookkeeping diverged");
    }

    /// Run fixed ticks for `seconds` or until the session ends. Returns ticks run.
    pub fn run_for(&mut self, seconds: f32) -> usize {
        let ticks = (seconds.max(0.0) * self.config.tick_rate).ceil() as usize;
        let mut ran = 0;
        while ran < ticks && self.outcome.is_none() {
            self.tick();
            ran += 1;
        }
        ran
    }

    /// Run until the session ends or `max_seconds` elapse
    pub fn run_until_over(&mut self, max_seconds: f32) -> Option<SessionOutcome> {
        self.run_for(max_seconds);
        self.outcome
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn apply_intents(&mut self) {
        for submitted in self.intents.take_pending() {
            if self.outcome.is_some() {
                break;
            }
            match submitted.intent {
                Intent::Spawn {
                    position,
                    intensity,
                } => {
                    if let Err(reason) = self.spawn_fire(position, intensity) {
                        debug!("Spawn intent rejected: {}", reason);
                    }
                }
                Intent::Extinguish { id, amount } => {
                    self.extinguish(id, amount);
                }
                Intent::ExtinguishAt {
                    position,
                    radius,
                    amount,
                } => {
                    self.extinguish_at(position, radius, amount);
                }
                Intent::TriggerSpread { id } => {
                    if let Err(reason) = self.attempt_spread(id) {
                        debug!("Spread intent from {} rejected: {}", id, reason);
                    }
                }
            }
            self.intents.mark_applied(submitted);
        }
    }

    fn run_spawner(&mut self, dt: f32) {
        let Some(spawner) = self.spawner.as_mut() else {
            return;
        };
        let intensity = spawner.intensity();
        for position in spawner.advance(dt, &mut self.rng) {
            if let Err(reason) = self.spawn_fire(position, intensity) {
                debug!(
                    "Spawner could not place fire at ({:.2}, {:.2}): {}",
                    position.x, position.y, reason
                );
            }
        }
    }

    fn run_fires(&mut self, dt: f32) {
        // Fires created during this pass wait for the next tick
        let ids: Vec<FireId> = self.fires.keys().copied().collect();
        for id in ids {
            let Some(agent) = self.fires.get_mut(&id) else {
                continue;
            };
            let state = agent.state;
            match state {
                FireState::Spawning => {
                    let first_delay = self.spread.next_delay(&mut self.rng);
                    agent.activate(first_delay);
                }
                FireState::Active => {
                    if agent.advance_timer(dt) {
                        self.run_spread_cycle(id);
                    }
                }
                FireState::Extinguishing | FireState::Extinguished => {}
            }
        }
    }

    /// A due spread attempt: back off when saturated, otherwise roll the
    /// spread chance, attempt, and rearm the timer.
    fn run_spread_cycle(&mut self, id: FireId) {
        let delay = if self.population.is_saturated() {
            self.stats.saturation_backoffs += 1;
            debug!("{} backing off: room at capacity", id);
            self.spread.backoff()
        } else {
            if self.spread.roll(&mut self.rng) {
                if let Err(reason) = self.attempt_spread(id) {
                    debug!("Fire cannot spread from {}: {}", id, reason);
                }
            }
            self.spread.next_delay(&mut self.rng)
        };

        if let Some(agent) = self.fires.get_mut(&id) {
            agent.reschedule(delay);
        }
    }

    fn attempt_spread(&mut self, parent_id: FireId) -> Result<FireHandle, SpawnRejection> {
        if self.outcome.is_some() {
            return Err(SpawnRejection::SessionOver);
        }

        let fire = self.config.fire;
        let clustering = self.spread.config().clustering;
        let (anchor, intensity, generation) = {
            let parent = self
                .fires
                .get(&parent_id)
                .filter(|f| f.is_burning())
                .ok_or(SpawnRejection::ParentNotBurning)?;
            if parent.state == FireState::Extinguishing {
                return Err(SpawnRejection::ParentExtinguishing);
            }
            let anchor = if clustering {
                Some(parent.spread_anchor(&mut self.rng))
            } else {
                None
            };
            (
                anchor,
                parent.child_intensity(fire.growth_factor, fire.intensity_cap),
                parent.generation + 1,
            )
        };

        if self.population.is_saturated() {
            return Err(SpawnRejection::CapacityExceeded);
        }

        self.stats.spread_attempts += 1;
        let placed = self
            .spread
            .propose(anchor, &mut self.rng)
            .ok_or(SpawnRejection::OutsideRoom)
            .and_then(|candidate| self.spread.validate(candidate).map(|()| candidate));
        let candidate = match placed {
            Ok(candidate) => candidate,
            Err(reason) => {
                self.stats.spreads_rejected += 1;
                return Err(reason);
            }
        };

        self.population.try_admit()?;
        let handle = self.insert_fire(candidate, intensity, generation, Some(parent_id));
        if let Some(parent) = self.fires.get_mut(&parent_id) {
            parent.record_child(candidate);
        }
        self.thermal
            .increase(self.config.thermal.temperature_increase);

        Ok(handle)
    }

    /// Create and register a fire whose population slot is already admitted
    fn insert_fire(
        &mut self,
        position: Vec2,
        intensity: f32,
        generation: u32,
        parent: Option<FireId>,
    ) -> FireHandle {
        let id = FireId(self.next_fire_id);
        self.next_fire_id += 1;

        let agent = FireAgent::new(
            id,
            position,
            intensity,
            generation,
            self.config.spread.recent_positions,
        );
        let handle = agent.handle();
        self.spread.occupy(id.0, position);
        self.fires.insert(id, agent);

        self.stats.fires_spawned += 1;
        self.stats.peak_fires = self.population.peak() as u32;

        debug!(
            "Fire {} at ({:.2}, {:.2}) intensity {:.2}. Total fires: {}",
            id,
            position.x,
            position.y,
            intensity,
            self.population.active_count()
        );
        self.events.publish(FireEvent::FireSpawned {
            id,
            position,
            intensity,
            parent,
        });

        handle
    }

    /// Drop an extinguished fire from every structure, exactly once
    fn retire_fire(&mut self, id: FireId) {
        let Some(agent) = self.fires.remove(&id) else {
            return;
        };
        self.spread.vacate(id.0);
        self.population.release();
        self.stats.fires_extinguished += 1;

        let thermal = self.config.thermal;
        if thermal.cool_on_extinguish {
            self.thermal.decrease(thermal.extinguish_cooling);
        }

        info!(
            "Fire {} out. Total fires: {}",
            id,
            self.population.active_count()
        );
        self.events.publish(FireEvent::FireExtinguished {
            id,
            position: agent.position,
        });

        if self.population.active_count() == 0 && !self.evacuation.is_triggered() {
            self.end_session(SessionOutcome::FireDefeated);
        }
    }

    fn publish_transitions(&mut self, transitions: Vec<EvacuationTransition>) {
        for transition in transitions {
            match transition {
                EvacuationTransition::Tier { tier, temperature } => {
                    self.events
                        .publish(FireEvent::ThermalWarning { tier, temperature });
                }
                EvacuationTransition::Triggered {
                    temperature,
                    countdown,
                } => {
                    self.events.publish(FireEvent::EvacuationTriggered {
                        temperature,
                        countdown,
                    });
                }
                EvacuationTransition::Over => self.end_session(SessionOutcome::Evacuated),
            }
        }
    }

    fn end_session(&mut self, reason: SessionOutcome) {
        if self.outcome.is_some() {
            return;
        }
        self.outcome = Some(reason);
        let dropped = self.intents.discard_pending();
        info!(
            "Session over: {:?} at t={:.2}s ({} fires burning, {} intents dropped)",
            reason,
            self.simulation_time,
            self.population.active_count(),
            dropped
        );
        self.events.publish(FireEvent::SessionOver { reason });
    }
}
