//! Bird spawning, simulation and animation systems
//!
//! This system handles:
//! - Spawning birds of a species when a [`SpawnBirdsEvent`] arrives
//! - Ticking every [`BirdAgent`] against the player position and ground height
//! - Publishing [`BirdTransitionEvent`]s for animation and audio listeners
//! - Feeding the wing flap and vertical bob phases to the bird mesh child

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::bird::{random_point_around, BirdAgent, TickInput};
use crate::components::{BirdAnimation, BirdMesh, BirdRng, BirdState, FlightMode, PlayerCharacter};
use crate::events::{BirdTransitionEvent, SpawnBirdsEvent};
use crate::resources::{AltitudeBand, BirdConfig, BirdSettings, FlightEnvelope, GroundHeight};

/// Fraction of the territory radius birds are scattered over when spawned
const SPAWN_SCATTER: f32 = 0.5;
/// Flap animation keeps a slow idle beat while gliding
const GLIDE_FLAP_FACTOR: f32 = 0.1;
const FLAP_SCALE_AMPLITUDE: f32 = 0.3;
const BOB_OFFSET_FACTOR: f32 = 0.1;

/// Plugin for bird systems
pub struct BirdPlugin;

impl Plugin for BirdPlugin {
    fn build(&self, app: &mut App) {
        log::info!("[BIRD] BirdPlugin::build() called - registering bird systems");
        app
            // Register types for reflection
            .register_type::<BirdState>()
            .register_type::<FlightMode>()
            .register_type::<BirdAnimation>()
            .register_type::<PlayerCharacter>()
            .register_type::<AltitudeBand>()
            .register_type::<BirdConfig>()
            .register_type::<BirdSettings>()
            .register_type::<FlightEnvelope>()
            // Add resources
            .init_resource::<BirdSettings>()
            .init_resource::<FlightEnvelope>()
            .init_resource::<GroundHeight>()
            .add_message::<SpawnBirdsEvent>()
            .add_message::<BirdTransitionEvent>()
            // Add systems
            .add_systems(
                Update,
                (spawn_birds_system, update_birds_system, bird_animation_system).chain(),
            );
    }
}

/// Spawns the requested birds around each event's home position
pub fn spawn_birds_system(
    mut commands: Commands,
    settings: Res<BirdSettings>,
    envelope: Res<FlightEnvelope>,
    ground: Res<GroundHeight>,
    mut spawn_events: MessageReader<SpawnBirdsEvent>,
) {
    if !settings.enabled {
        spawn_events.clear();
        return;
    }

    let mut rng = rand::thread_rng();
    for event in spawn_events.read() {
        let Some(config) = settings.find_species(&event.species) else {
            log::warn!("[BIRD] Unknown species '{}', no birds spawned", event.species);
            continue;
        };
        if !event.home.is_finite() {
            log::warn!("[BIRD] Ignoring spawn request with non-finite home {:?}", event.home);
            continue;
        }

        log::info!(
            "[BIRD] Spawning {} {} bird(s) around {:?} with territory radius {}",
            event.count,
            config.species,
            event.home,
            config.territory_radius
        );

        for i in 0..event.count {
            let mut bird_rng = StdRng::seed_from_u64(rng.gen());
            let home = random_point_around(event.home, config.territory_radius * SPAWN_SCATTER, &mut bird_rng);
            let ground_level = ground.at(home.x, home.z);
            if ground_level + config.flight_altitude.min > envelope.cruise_ceiling() {
                log::warn!(
                    "[BIRD] Ground at {:.1} leaves no room for the {} cruise band under the {:.1} ceiling, flights are capped",
                    ground_level,
                    config.species,
                    envelope.cruise_ceiling()
                );
            }
            let agent = BirdAgent::new(config.clone(), envelope.clone(), home, ground_level, &mut bird_rng);

            let initial_phase = bird_rng.gen::<f32>() * std::f32::consts::TAU;
            let position = agent.position();

            let bird_entity = commands
                .spawn((
                    Transform::from_translation(position)
                        .with_rotation(agent.rotation())
                        .with_scale(Vec3::splat(config.size)),
                    agent,
                    BirdRng(bird_rng),
                ))
                .id();

            // Mesh child, filled in by the renderer
            let mesh_entity = commands.spawn((BirdMesh, Transform::default())).id();
            commands.entity(bird_entity).add_child(mesh_entity).insert(BirdAnimation {
                flap_phase: initial_phase,
                bob_phase: initial_phase * 0.5,
                mesh_entity: Some(mesh_entity),
            });

            if i < 3 {
                log::info!(
                    "[BIRD DEBUG] Spawned {} bird {} at position {:?}",
                    config.species,
                    i,
                    position
                );
            }
        }
    }
}

/// Advances every bird one tick and mirrors the result onto its transform
pub fn update_birds_system(
    time: Res<Time>,
    settings: Res<BirdSettings>,
    ground: Res<GroundHeight>,
    player_query: Query<&Transform, (With<PlayerCharacter>, Without<BirdAgent>)>,
    mut bird_query: Query<(Entity, &mut BirdAgent, &mut BirdRng, &mut Transform)>,
    mut transition_events: MessageWriter<BirdTransitionEvent>,
) {
    if !settings.enabled {
        return;
    }

    let delta_time = time.delta_secs();
    let player_position = player_query.iter().next().map(|transform| transform.translation);

    for (entity, mut agent, mut rng, mut transform) in bird_query.iter_mut() {
        let position = agent.position();
        let report = agent.tick(
            TickInput {
                delta_time,
                player_position,
                ground_level: ground.at(position.x, position.z),
            },
            &mut rng.0,
        );

        for transition in report.transitions {
            transition_events.write(BirdTransitionEvent {
                entity,
                from_state: transition.from_state,
                to_state: transition.to_state,
                flight_mode: transition.flight_mode,
                reason: transition.reason,
            });
        }

        transform.translation = agent.position();
        transform.rotation = agent.rotation();
    }
}

/// Drives the wing flap and walking bob from the agent's state
pub fn bird_animation_system(
    time: Res<Time>,
    settings: Res<BirdSettings>,
    mut bird_query: Query<(&BirdAgent, &mut BirdAnimation)>,
    mut mesh_query: Query<&mut Transform, (With<BirdMesh>, Without<BirdAgent>)>,
) {
    if !settings.enabled {
        return;
    }

    let dt = time.delta_secs();

    for (agent, mut animation) in bird_query.iter_mut() {
        let flap_rate = if agent.is_flapping() {
            settings.flap_speed * agent.wing_beat_intensity()
        } else if agent.flight_mode().is_airborne() {
            settings.flap_speed * GLIDE_FLAP_FACTOR
        } else {
            0.0
        };
        animation.flap_phase = advance_phase(animation.flap_phase, flap_rate, dt);

        let bobbing = matches!(agent.bird_state(), BirdState::Walking | BirdState::Foraging);
        if bobbing {
            animation.bob_phase = advance_phase(animation.bob_phase, settings.bob_speed, dt);
        }

        let Some(mesh_entity) = animation.mesh_entity else {
            continue;
        };
        if let Ok(mut mesh_transform) = mesh_query.get_mut(mesh_entity) {
            let (flap_scale, bob_offset) = mesh_pose(&animation, agent, settings.bob_amplitude);
            mesh_transform.scale.y = flap_scale;
            mesh_transform.translation.y = bob_offset;
        }
    }
}

/// Advances a cyclic phase, keeping it inside `[0, 2π)`
pub fn advance_phase(phase: f32, rate: f32, delta_time: f32) -> f32 {
    if !delta_time.is_finite() || !rate.is_finite() {
        return phase;
    }
    (phase + rate * delta_time).rem_euclid(std::f32::consts::TAU)
}

/// Mesh scale along Y for the wing beat and vertical offset for the walking bob
fn mesh_pose(animation: &BirdAnimation, agent: &BirdAgent, bob_amplitude: f32) -> (f32, f32) {
    if agent.flight_mode().is_airborne() {
        (1.0 + animation.flap_phase.sin() * FLAP_SCALE_AMPLITUDE, 0.0)
    } else {
        (1.0, animation.bob_phase.sin() * bob_amplitude * BOB_OFFSET_FACTOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::{IntentSink, TransitionReason};
    use std::f32::consts::{PI, TAU};
    use std::time::Duration;

    #[test]
    fn test_advance_phase_wraps() {
        let phase = advance_phase(TAU - 0.1, 1.0, 0.2);
        assert!((phase - 0.1).abs() < 1e-4);
        assert!(phase >= 0.0 && phase < TAU);
    }

    #[test]
    fn test_advance_phase_ignores_bad_input() {
        assert_eq!(advance_phase(1.0, f32::NAN, 0.016), 1.0);
        assert_eq!(advance_phase(1.0, 12.0, f32::INFINITY), 1.0);
        assert_eq!(advance_phase(1.0, 12.0, 0.0), 1.0);
    }

    #[test]
    fn test_grounded_mesh_pose_bobs_without_flapping() {
        let mut rng = StdRng::seed_from_u64(5);
        let agent = BirdAgent::new(
            BirdConfig::crow(),
            FlightEnvelope::default(),
            Vec3::ZERO,
            0.0,
            &mut rng,
        );
        let animation = BirdAnimation {
            flap_phase: PI / 2.0,
            bob_phase: PI / 2.0,
            mesh_entity: None,
        };
        let (flap_scale, bob_offset) = mesh_pose(&animation, &agent, 0.5);
        assert_eq!(flap_scale, 1.0);
        assert!((bob_offset - 0.05).abs() < 1e-6);
    }

    #[test]
    fn test_airborne_mesh_pose_flaps_without_bobbing() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut agent = BirdAgent::new(
            BirdConfig::crow(),
            FlightEnvelope::default(),
            Vec3::ZERO,
            0.0,
            &mut rng,
        );
        agent.start_flight(TransitionReason::Scheduled);
        let animation = BirdAnimation {
            flap_phase: PI / 2.0,
            bob_phase: PI / 2.0,
            mesh_entity: None,
        };
        let (flap_scale, bob_offset) = mesh_pose(&animation, &agent, 0.5);
        assert!((flap_scale - (1.0 + FLAP_SCALE_AMPLITUDE)).abs() < 1e-6);
        assert_eq!(bob_offset, 0.0);
    }

    #[test]
    fn test_update_publishes_transitions_and_mirrors_transforms() {
        let mut app = App::new();
        app.init_resource::<Time>().add_plugins(BirdPlugin);
        app.world_mut().write_message(SpawnBirdsEvent {
            species: "crow".to_string(),
            home: Vec3::ZERO,
            count: 3,
        });
        app.update();

        let world = app.world_mut();
        let (bird, bird_position) = world
            .query::<(Entity, &BirdAgent)>()
            .iter(world)
            .map(|(entity, agent)| (entity, agent.position()))
            .next()
            .expect("birds spawned");
        world.spawn((PlayerCharacter, Transform::from_translation(bird_position + Vec3::X)));
        world
            .resource_mut::<Time>()
            .advance_by(Duration::from_secs_f32(1.0 / 60.0));
        app.update();

        let world = app.world();
        let messages = world.resource::<Messages<BirdTransitionEvent>>();
        let fled = messages.get_cursor().read(messages).any(|event| {
            event.entity == bird
                && event.reason == TransitionReason::Flee
                && event.to_state == BirdState::TakingOff
                && event.flight_mode == FlightMode::Ascending
        });
        assert!(fled, "bird next to the player should have fled");

        let world = app.world_mut();
        for (agent, transform) in world.query::<(&BirdAgent, &Transform)>().iter(world) {
            assert_eq!(transform.translation, agent.position());
            assert_eq!(transform.rotation, agent.rotation());
        }
        let agent = world.get::<BirdAgent>(bird).expect("bird still exists");
        assert_eq!(agent.bird_state(), BirdState::TakingOff);
        assert!(agent.position().y > bird_position.y);
    }

    #[test]
    fn test_plugin_spawns_requested_birds() {
        let mut app = App::new();
        app.init_resource::<Time>().add_plugins(BirdPlugin);

        app.world_mut().write_message(SpawnBirdsEvent {
            species: "Crow".to_string(),
            home: Vec3::new(10.0, 0.0, -5.0),
            count: 4,
        });
        app.world_mut().write_message(SpawnBirdsEvent {
            species: "dodo".to_string(),
            home: Vec3::ZERO,
            count: 2,
        });
        app.update();

        let world = app.world_mut();
        let birds: Vec<(BirdState, Option<Entity>)> = world
            .query::<(&BirdAgent, &BirdAnimation)>()
            .iter(world)
            .map(|(agent, animation)| (agent.bird_state(), animation.mesh_entity))
            .collect();
        assert_eq!(birds.len(), 4);
        assert!(birds.iter().all(|(state, _)| *state == BirdState::Idle));

        let meshes = world.query::<&BirdMesh>().iter(world).count();
        assert_eq!(meshes, 4);
        for (_, mesh_entity) in birds {
            let mesh_entity = mesh_entity.expect("mesh child recorded");
            assert!(world.get::<BirdMesh>(mesh_entity).is_some());
        }
    }
}
