//! ECS wiring: the locomotion systems and their fixed-step ordering.
//!
//! FixedUpdate: `Activate -> Look -> Probe -> Step`
//! FixedPostUpdate (after Rapier writeback): `Observe`
//!
//! A body takes part once it carries a [`LocomotionConfig`], a Rapier `RigidBody`,
//! `Velocity` and `Collider`, an [`Energy`] pool and a `Transform`. Activation validates
//! all of that once; a body that fails is logged and left alone for good.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;
use thiserror::Error;

use crate::config::{ensure_positive, ConfigError, LocomotionConfig};
use crate::controller::{step_locomotion, LocomotionInput, Locomotor, MovementState, TickContext};
use crate::energy::{Energy, EnergyDebited, EnergyPool};
use crate::floor::{floor_action, FloorAction, FloorConfig, WorldFloor};
use crate::jump::{JumpOutcome, LandingPoll};
use crate::look::{apply_look, LookAngles};
use crate::probe::{sample_ground, RapierGround};

#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocomotionSet {
    Activate,
    Look,
    Probe,
    Step,
    Observe,
}

/// Marker for bodies that passed activation.
#[derive(Component, Debug, Default)]
pub struct LocomotionActive;

/// Marker for bodies that failed activation. They are never retried.
#[derive(Component, Debug)]
pub struct ActivationFailed;

#[derive(Debug, Error)]
pub enum ActivationError {
    #[error("no physics body (RigidBody and Velocity are required)")]
    MissingBody,
    #[error("no collider")]
    MissingCollider,
    #[error("no energy pool")]
    MissingEnergy,
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Check everything a body needs before it may be driven.
pub fn check_activation(
    config: &LocomotionConfig,
    energy: Option<&Energy>,
    has_body: bool,
    has_collider: bool,
) -> Result<(), ActivationError> {
    if !has_body {
        return Err(ActivationError::MissingBody);
    }
    if !has_collider {
        return Err(ActivationError::MissingCollider);
    }
    let energy = energy.ok_or(ActivationError::MissingEnergy)?;
    ensure_positive("energy.max", energy.max())?;
    config.validate()?;
    Ok(())
}

/// Capsule for a posture height (caps included).
pub fn posture_collider(height: f32, radius: f32) -> Collider {
    Collider::capsule_y((height / 2.0 - radius).max(0.0), radius)
}

// =============================================================================
// SYSTEMS
// =============================================================================

pub fn activate_locomotors(
    mut commands: Commands,
    candidates: Query<
        (
            Entity,
            &LocomotionConfig,
            &Transform,
            Option<&Energy>,
            Has<RigidBody>,
            Has<Velocity>,
            Has<Collider>,
        ),
        (Without<LocomotionActive>, Without<ActivationFailed>),
    >,
) {
    for (entity, config, transform, energy, has_rigid_body, has_velocity, has_collider) in
        candidates.iter()
    {
        let checked = check_activation(config, energy, has_rigid_body && has_velocity, has_collider);
        if let Err(err) = checked {
            error!("Locomotion activation failed for {:?}: {}", entity, err);
            commands.entity(entity).insert(ActivationFailed);
            continue;
        }

        commands
            .entity(entity)
            .insert((Locomotor::new(config), LocomotionActive))
            .insert_if_new((
                LocomotionInput::default(),
                LookAngles::from_rotation(transform.rotation),
            ));
        info!("Activated {:?} locomotor {:?}", config.variant, entity);
    }
}

pub fn apply_look_input(
    mut bodies: Query<
        (&LocomotionConfig, &LocomotionInput, &mut LookAngles, &mut Transform),
        With<LocomotionActive>,
    >,
) {
    for (config, input, mut angles, mut transform) in bodies.iter_mut() {
        if input.look == Vec2::ZERO {
            continue;
        }
        transform.rotation = apply_look(&mut angles, input.look, &config.look, transform.rotation);
    }
}

pub fn sample_ground_contacts(
    rapier: ReadRapierContext,
    mut bodies: Query<(Entity, &LocomotionConfig, &Transform, &mut Locomotor), With<LocomotionActive>>,
) {
    let Ok(context) = rapier.single() else {
        return;
    };

    for (entity, config, transform, mut locomotor) in bodies.iter_mut() {
        let ground = RapierGround::new(&context, entity);
        locomotor.contact = sample_ground(
            &ground,
            transform.translation,
            transform.rotation,
            &config.probe,
            config.variant.supports_tilted_probe(),
        );
    }
}

pub fn step_locomotors(
    time: Res<Time>,
    mut debits: MessageWriter<EnergyDebited>,
    mut bodies: Query<
        (
            Entity,
            &LocomotionConfig,
            &Transform,
            &mut LocomotionInput,
            &mut Locomotor,
            &mut Energy,
            &mut Velocity,
            &mut Collider,
        ),
        With<LocomotionActive>,
    >,
) {
    for (entity, config, transform, mut input, mut locomotor, mut energy, mut velocity, mut collider) in
        bodies.iter_mut()
    {
        let requests = input.take();
        let ctx = TickContext {
            config,
            orientation: transform.rotation,
            body_velocity: velocity.linvel,
            delta: time.delta(),
        };
        let report = step_locomotion(ctx, &requests, &mut locomotor, &mut *energy);

        if let Some(linvel) = report.velocity {
            velocity.linvel = linvel;
        }
        if let Some(height) = report.collider_height {
            *collider = posture_collider(height, config.crouch.radius);
        }
        for debit in &report.debits {
            debits.write(EnergyDebited {
                entity,
                amount: debit.amount,
                cause: debit.cause,
            });
        }

        if config.debug_logging {
            if let Some(outcome) = report.jump {
                match outcome {
                    JumpOutcome::Launched { vertical_velocity, .. } => {
                        debug!("{:?} jumped (vy = {:.2})", entity, vertical_velocity)
                    }
                    JumpOutcome::Rejected(reason) => debug!("{:?} jump dropped: {:?}", entity, reason),
                }
            }
            if report.landing == LandingPoll::Landed {
                debug!("{:?} landed", entity);
            }
            if let Some(height) = report.collider_height {
                debug!(
                    "{:?} posture {:?} (height {:.2})",
                    entity,
                    locomotor.posture_state(),
                    height
                );
            }
            if report.sprinting {
                debug!("{:?} sprinting, energy {:.1}/{:.1}", entity, energy.current(), energy.max());
            }
        }
    }
}

pub fn sample_movement_state(mut bodies: Query<(&Velocity, &mut Locomotor), With<LocomotionActive>>) {
    for (velocity, mut locomotor) in bodies.iter_mut() {
        let movement = MovementState::from_velocity(velocity.linvel);
        if locomotor.movement != movement {
            locomotor.movement = movement;
        }
    }
}

pub fn enforce_world_floor(
    mut commands: Commands,
    time: Res<Time>,
    mut floor: ResMut<WorldFloor>,
    mut bodies: Query<
        (Entity, &LocomotionConfig, &mut Transform, &mut Velocity, &mut Locomotor),
        With<LocomotionActive>,
    >,
) {
    if !floor.tick(time.delta()) {
        return;
    }

    for (entity, config, mut transform, mut velocity, mut locomotor) in bodies.iter_mut() {
        match floor_action(config.variant, transform.translation.y, &floor.config) {
            FloorAction::Keep => {}
            FloorAction::Respawn(position) => {
                info!("{:?} fell below the world, respawning at {:?}", entity, position);
                transform.translation = position;
                velocity.linvel.y = 0.0;
                locomotor.reset_vertical();
            }
            FloorAction::Despawn => {
                info!("{:?} fell below the world, despawning", entity);
                commands.entity(entity).despawn();
            }
        }
    }
}

// =============================================================================
// PLUGIN
// =============================================================================

/// Adds locomotion to an app that already runs Rapier in the fixed schedule.
#[derive(Default)]
pub struct LocomotionPlugin {
    pub floor: FloorConfig,
}

impl Plugin for LocomotionPlugin {
    fn build(&self, app: &mut App) {
        let floor = match self.floor.validate() {
            Ok(()) => self.floor.clone(),
            Err(err) => {
                error!("Invalid world floor config, using defaults: {}", err);
                FloorConfig::default()
            }
        };
        app.add_message::<EnergyDebited>()
            .insert_resource(WorldFloor::new(floor));

        app.configure_sets(
            FixedUpdate,
            (
                LocomotionSet::Activate,
                LocomotionSet::Look,
                LocomotionSet::Probe,
                LocomotionSet::Step,
            )
                .chain(),
        );
        app.configure_sets(
            FixedPostUpdate,
            LocomotionSet::Observe.after(PhysicsSet::Writeback),
        );

        app.add_systems(
            FixedUpdate,
            (
                activate_locomotors.in_set(LocomotionSet::Activate),
                apply_look_input.in_set(LocomotionSet::Look),
                sample_ground_contacts.in_set(LocomotionSet::Probe),
                step_locomotors.in_set(LocomotionSet::Step),
            ),
        );
        app.add_systems(
            FixedPostUpdate,
            (sample_movement_state, enforce_world_floor)
                .chain()
                .in_set(LocomotionSet::Observe),
        );
    }
}
