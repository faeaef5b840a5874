//! End-to-end behavior of a room fire session: population cap, thermal
//! escalation, evacuation latch and the extinguish contract.

use approx::assert_relative_eq;
use ctor::ctor;
use room_fire_core::{
    EvacuationPhase, ExtinguishOutcome, FireAgent, FireEvent, FireId, FireSimulation, FireState,
    Intent, RoomBounds, SessionOutcome, SimulationConfig, SpawnRejection, SpreadConfig,
    ThermalConfig, TuningPreset, Vec2,
};

#[ctor]
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Large room, no automatic spreading, no background rise, no separation.
/// Everything that happens is driven explicitly by the test.
fn scripted_config() -> SimulationConfig {
    SimulationConfig {
        spread: SpreadConfig {
            spread_chance: 0.0,
            min_separation: 0.0,
            ..Default::default()
        },
        thermal: ThermalConfig {
            periodic_rise: false,
            cool_on_extinguish: false,
            ..Default::default()
        },
        ..SimulationConfig::for_room(RoomBounds::sized(100.0, 100.0))
    }
}

#[test]
fn test_four_spreads_raise_temperature_to_28() {
    let mut sim = FireSimulation::new(scripted_config()).unwrap();
    let origin = sim.spawn_fire(Vec2::new(50.0, 50.0), 1.0).unwrap();
    assert_eq!(sim.temperature(), 20.0);

    for _ in 0..4 {
        sim.trigger_spread(origin.id).unwrap();
    }
    sim.run_for(2.0);

    assert_eq!(sim.temperature(), 28.0);
    assert_eq!(sim.active_fire_count(), 5);
    assert_eq!(sim.evacuation_phase(), EvacuationPhase::Normal);
}

#[test]
fn test_children_burn_hotter() {
    let mut sim = FireSimulation::new(scripted_config()).unwrap();
    let origin = sim.spawn_fire(Vec2::new(50.0, 50.0), 1.0).unwrap();
    let child = sim.trigger_spread(origin.id).unwrap();
    let grandchild = sim.trigger_spread(child.id).unwrap();

    let intensity = |id| sim.fire(id).map(FireAgent::intensity).unwrap();
    assert_relative_eq!(intensity(child.id), 1.1, epsilon = 1e-6);
    assert_relative_eq!(intensity(grandchild.id), 1.21, epsilon = 1e-6);
}

#[test]
fn test_population_cap_refuses_fourth_fire() {
    let mut sim = FireSimulation::new(SimulationConfig {
        max_fires: 3,
        ..scripted_config()
    })
    .unwrap();

    let origin = sim.spawn_fire(Vec2::new(50.0, 50.0), 1.0).unwrap();
    assert!(sim.trigger_spread(origin.id).is_ok());
    assert!(sim.trigger_spread(origin.id).is_ok());
    assert_eq!(
        sim.trigger_spread(origin.id),
        Err(SpawnRejection::CapacityExceeded)
    );
    assert_eq!(
        sim.spawn_fire(Vec2::new(10.0, 10.0), 1.0),
        Err(SpawnRejection::CapacityExceeded)
    );
    assert_eq!(sim.active_fire_count(), 3);
    assert!(sim.check_invariants());
}

#[test]
fn test_automatic_spread_respects_cap_and_backs_off() {
    let mut sim = FireSimulation::new(SimulationConfig {
        max_fires: 3,
        spread: SpreadConfig {
            spread_chance: 1.0,
            min_separation: 0.0,
            ..Default::default()
        },
        ..scripted_config()
    })
    .unwrap();
    sim.spawn_fire(Vec2::new(50.0, 50.0), 1.0).unwrap();

    for _ in 0..(30 * 30) {
        sim.tick();
        assert!(sim.active_fire_count() <= 3);
        assert!(sim.check_invariants());
    }

    assert_eq!(sim.active_fire_count(), 3);
    assert_eq!(sim.stats().peak_fires, 3);
    assert!(sim.stats().saturation_backoffs > 0);
}

#[test]
fn test_extinguish_hits_and_idempotence() {
    let mut sim = FireSimulation::new(scripted_config()).unwrap();
    let target = sim.spawn_fire(Vec2::new(20.0, 20.0), 1.0).unwrap();
    let other = sim.spawn_fire(Vec2::new(80.0, 80.0), 1.0).unwrap();
    assert_eq!(sim.active_fire_count(), 2);

    let intensity = |sim: &FireSimulation| sim.fire(target.id).map(FireAgent::intensity);

    sim.extinguish(target.id, 0.3);
    assert_relative_eq!(intensity(&sim).unwrap(), 0.7, epsilon = 1e-5);
    sim.extinguish(target.id, 0.3);
    assert_relative_eq!(intensity(&sim).unwrap(), 0.4, epsilon = 1e-5);
    assert_eq!(sim.active_fire_count(), 2);

    assert_eq!(
        sim.extinguish(target.id, 0.3),
        ExtinguishOutcome::Extinguished
    );
    assert_eq!(sim.active_fire_count(), 1);
    assert!(sim.fire(target.id).is_none());

    let temperature = sim.temperature();
    assert_eq!(sim.extinguish(target.id, 0.3), ExtinguishOutcome::Ignored);
    assert_eq!(sim.active_fire_count(), 1);
    assert_eq!(sim.temperature(), temperature);
    assert!(sim.fire(other.id).is_some());
    assert!(sim.check_invariants());
}

#[test]
fn test_unknown_fire_is_noop() {
    let mut sim = FireSimulation::new(scripted_config()).unwrap();
    sim.spawn_fire(Vec2::new(20.0, 20.0), 1.0).unwrap();
    assert_eq!(
        sim.extinguish(FireId(999), 1.0),
        ExtinguishOutcome::Ignored
    );
    assert_eq!(sim.active_fire_count(), 1);
}

#[test]
fn test_extinguish_cools_room_when_enabled() {
    let mut config = scripted_config();
    config.thermal.cool_on_extinguish = true;
    config.thermal.extinguish_cooling = 3.0;
    let mut sim = FireSimulation::new(config).unwrap();

    let origin = sim.spawn_fire(Vec2::new(50.0, 50.0), 1.0).unwrap();
    for _ in 0..3 {
        sim.trigger_spread(origin.id).unwrap();
    }
    assert_eq!(sim.temperature(), 26.0);

    sim.extinguish(origin.id, 10.0);
    assert_eq!(sim.temperature(), 23.0);

    // Cooling never goes below the baseline
    let ids: Vec<_> = sim.fires().map(FireAgent::id).collect();
    for id in ids {
        sim.extinguish(id, 10.0);
    }
    assert_eq!(sim.temperature(), 20.0);
}

#[test]
fn test_evacuation_latch_fires_once() {
    let mut config = scripted_config();
    config.thermal.temperature_increase = 40.0;
    let mut sim = FireSimulation::new(config).unwrap();
    let events = sim.subscribe();

    let origin = sim.spawn_fire(Vec2::new(50.0, 50.0), 1.0).unwrap();
    sim.trigger_spread(origin.id).unwrap();
    sim.trigger_spread(origin.id).unwrap();
    assert_eq!(sim.temperature(), 100.0);

    // Several polls at the ceiling
    sim.run_for(1.0);
    assert_eq!(sim.evacuation_phase(), EvacuationPhase::FinalCountdown);
    assert_eq!(sim.countdowns_started(), 1);

    let triggered = events
        .try_iter()
        .filter(|e| matches!(e, FireEvent::EvacuationTriggered { .. }))
        .count();
    assert_eq!(triggered, 1);
}

#[test]
fn test_evacuation_survives_cooling_and_ends_session() {
    let mut config = scripted_config();
    config.thermal.temperature_increase = 40.0;
    config.thermal.cool_on_extinguish = true;
    config.thermal.extinguish_cooling = 40.0;
    let mut sim = FireSimulation::new(config).unwrap();
    let events = sim.subscribe();

    let origin = sim.spawn_fire(Vec2::new(50.0, 50.0), 1.0).unwrap();
    sim.trigger_spread(origin.id).unwrap();
    sim.trigger_spread(origin.id).unwrap();
    sim.run_for(0.5);
    assert!(sim.countdown_remaining().is_some());

    // Put every fire out: the room cools but the evacuation stands
    let ids: Vec<_> = sim.fires().map(FireAgent::id).collect();
    for id in ids {
        sim.extinguish(id, 10.0);
    }
    assert_eq!(sim.active_fire_count(), 0);
    assert_eq!(sim.temperature(), 20.0);
    assert_eq!(sim.outcome(), None);
    assert_eq!(sim.evacuation_phase(), EvacuationPhase::FinalCountdown);

    assert_eq!(sim.run_until_over(60.0), Some(SessionOutcome::Evacuated));
    assert_eq!(sim.evacuation_phase(), EvacuationPhase::Over);

    let over: Vec<_> = events
        .try_iter()
        .filter_map(|e| match e {
            FireEvent::SessionOver { reason } => Some(reason),
            _ => None,
        })
        .collect();
    assert_eq!(over, vec![SessionOutcome::Evacuated]);
}

#[test]
fn test_fire_defeated_ends_session() {
    let mut sim = FireSimulation::new(scripted_config()).unwrap();
    let events = sim.subscribe();
    let a = sim.spawn_fire(Vec2::new(10.0, 10.0), 1.0).unwrap();
    let b = sim.spawn_fire(Vec2::new(90.0, 90.0), 1.0).unwrap();

    sim.extinguish(a.id, 5.0);
    assert!(!sim.is_over());
    sim.extinguish(b.id, 5.0);
    assert_eq!(sim.outcome(), Some(SessionOutcome::FireDefeated));

    // Nothing moves after the session ends
    let frame = sim.frame();
    sim.tick();
    assert_eq!(sim.frame(), frame);
    assert_eq!(
        sim.spawn_fire(Vec2::new(5.0, 5.0), 1.0),
        Err(SpawnRejection::SessionOver)
    );

    let received: Vec<_> = events.try_iter().collect();
    assert!(matches!(
        received.last(),
        Some(FireEvent::SessionOver {
            reason: SessionOutcome::FireDefeated
        })
    ));
}

#[test]
fn test_spawn_events_name_parent() {
    let mut sim = FireSimulation::new(scripted_config()).unwrap();
    let events = sim.subscribe();
    let origin = sim.spawn_fire(Vec2::new(50.0, 50.0), 1.0).unwrap();
    let child = sim.trigger_spread(origin.id).unwrap();

    let spawned: Vec<_> = events
        .try_iter()
        .filter_map(|e| match e {
            FireEvent::FireSpawned { id, parent, .. } => Some((id, parent)),
            _ => None,
        })
        .collect();
    assert_eq!(spawned, vec![(origin.id, None), (child.id, Some(origin.id))]);
}

#[test]
fn test_water_hit_douses_nearest_fire() {
    let mut sim = FireSimulation::new(scripted_config()).unwrap();
    let near = sim.spawn_fire(Vec2::new(10.0, 10.0), 1.0).unwrap();
    let far = sim.spawn_fire(Vec2::new(10.8, 10.0), 1.0).unwrap();

    assert_eq!(sim.water_hit(Vec2::new(10.1, 10.0)), Some(near.id));
    assert_relative_eq!(
        sim.fire(near.id).map(FireAgent::intensity).unwrap(),
        0.75,
        epsilon = 1e-6
    );
    assert_eq!(sim.fire(far.id).map(FireAgent::intensity), Some(1.0));
    assert_eq!(sim.water_hit(Vec2::new(60.0, 60.0)), None);
}

#[test]
fn test_far_water_hits_miss() {
    let mut sim = FireSimulation::new(scripted_config()).unwrap();
    let fire = sim.spawn_fire(Vec2::new(10.0, 10.0), 1.0).unwrap();

    assert_eq!(sim.extinguish_at(Vec2::new(1.0e30, 0.0), 0.5, 0.25), None);
    assert_eq!(sim.extinguish_at(Vec2::new(-1.0e30, -1.0e30), 0.5, 0.25), None);
    assert_eq!(sim.extinguish_at(Vec2::new(f32::NAN, 10.0), 0.5, 0.25), None);
    assert_eq!(sim.water_hit(Vec2::new(5.0e20, 5.0e20)), None);

    assert_eq!(sim.fire(fire.id).map(FireAgent::intensity), Some(1.0));
    assert_eq!(sim.active_fire_count(), 1);
}

#[test]
fn test_oversized_water_radius() {
    let mut sim = FireSimulation::new(scripted_config()).unwrap();
    let fire = sim.spawn_fire(Vec2::new(90.0, 90.0), 1.0).unwrap();

    // A huge radius still reaches the nearest fire
    assert_eq!(
        sim.extinguish_at(Vec2::new(5.0, 5.0), 1.0e5, 0.25),
        Some(fire.id)
    );
    assert_relative_eq!(
        sim.fire(fire.id).map(FireAgent::intensity).unwrap(),
        0.75,
        epsilon = 1e-6
    );

    // Unbounded or negative radii miss
    assert_eq!(sim.extinguish_at(Vec2::new(5.0, 5.0), f32::INFINITY, 0.25), None);
    assert_eq!(sim.extinguish_at(Vec2::new(90.0, 90.0), -1.0, 0.25), None);

    sim.submit(Intent::ExtinguishAt {
        position: Vec2::new(5.0, 5.0),
        radius: 1.0e5,
        amount: 0.25,
    });
    sim.tick();
    assert_relative_eq!(
        sim.fire(fire.id).map(FireAgent::intensity).unwrap(),
        0.5,
        epsilon = 1e-6
    );
}

#[test]
fn test_huge_step_completes() {
    let mut config = scripted_config();
    config.thermal.periodic_rise = true;
    let mut sim = FireSimulation::new(config).unwrap();
    sim.spawn_fire(Vec2::new(50.0, 50.0), 1.0).unwrap();

    sim.step(1.0e9);
    assert_eq!(sim.temperature(), 100.0);
    assert_eq!(sim.evacuation_phase(), EvacuationPhase::FinalCountdown);
    assert!(sim.check_invariants());

    sim.step(1.0e9);
    assert_eq!(sim.outcome(), Some(SessionOutcome::Evacuated));
}

#[test]
fn test_fire_being_put_out_does_not_spread() {
    let mut sim = FireSimulation::new(scripted_config()).unwrap();
    let fire = sim.spawn_fire(Vec2::new(50.0, 50.0), 2.0).unwrap();
    sim.tick();

    sim.extinguish(fire.id, 0.5);
    assert_eq!(
        sim.fire(fire.id).map(FireAgent::state),
        Some(FireState::Extinguishing)
    );

    assert_eq!(
        sim.trigger_spread(fire.id),
        Err(SpawnRejection::ParentExtinguishing)
    );
    sim.submit(Intent::TriggerSpread { id: fire.id });
    sim.tick();
    assert!(sim.trigger_spread_all().iter().all(Result::is_err));

    assert_eq!(sim.active_fire_count(), 1);
    assert_eq!(sim.temperature(), 20.0);
}

#[test]
fn test_classic_session_escalates_monotonically_to_evacuation() {
    let mut sim = FireSimulation::new(TuningPreset::Classic.config(RoomBounds::sized(20.0, 12.0)))
        .unwrap();
    sim.spawn_fire(Vec2::new(10.0, 6.0), 1.0).unwrap();

    let mut last_phase = sim.evacuation_phase();
    let max_ticks = (600.0 * sim.config().tick_rate) as usize;
    for _ in 0..max_ticks {
        sim.tick();
        let phase = sim.evacuation_phase();
        assert!(phase >= last_phase, "phase regressed {last_phase:?} -> {phase:?}");
        last_phase = phase;

        let t = sim.temperature();
        assert!((20.0..=100.0).contains(&t));
        assert!(sim.active_fire_count() <= 10);
        assert!(sim.check_invariants());

        if sim.is_over() {
            break;
        }
    }

    assert_eq!(sim.outcome(), Some(SessionOutcome::Evacuated));
}

#[test]
fn test_same_seed_same_session() {
    let run = |seed| {
        let mut config = TuningPreset::Escalation.config(RoomBounds::sized(20.0, 12.0));
        config.seed = seed;
        let mut sim = FireSimulation::new(config).unwrap();
        sim.spawn_fire(Vec2::new(4.0, 4.0), 1.0).unwrap();
        sim.run_for(20.0);
        sim.snapshot()
    };

    assert_eq!(run(7), run(7));
}

#[test]
fn test_polygon_room_keeps_fires_inside() {
    let room = RoomBounds::polygon(vec![
        Vec2::new(0.0, 0.0),
        Vec2::new(12.0, 0.0),
        Vec2::new(12.0, 6.0),
        Vec2::new(6.0, 6.0),
        Vec2::new(6.0, 12.0),
        Vec2::new(0.0, 12.0),
    ]);
    let mut config = TuningPreset::Classic.config(room.clone());
    config.thermal.periodic_rise = false;
    let mut sim = FireSimulation::new(config).unwrap();
    sim.spawn_fire(Vec2::new(2.0, 2.0), 1.0).unwrap();
    sim.run_for(30.0);

    assert!(sim.active_fire_count() > 1);
    for fire in sim.fires() {
        assert!(room.contains(fire.position()));
    }
}

#[test]
fn test_snapshot_serializes() {
    let mut sim = FireSimulation::new(scripted_config()).unwrap();
    sim.spawn_fire(Vec2::new(3.0, 4.0), 1.0).unwrap();
    sim.tick();

    let json = serde_json::to_string(&sim.snapshot()).unwrap();
    assert!(json.contains("\"temperature\":20.0"));
    assert!(json.contains("\"Active\""));
}
