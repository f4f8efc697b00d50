//! One locomotion tick for one body.
//!
//! [`step_locomotion`] is used by the ECS systems and directly by tests. Given this
//! tick's ground contact (sampled beforehand by the probe), it runs in order:
//! 1. landing check poll
//! 2. sprint gate (may debit energy, boosts the speed modifier)
//! 3. velocity composition from axis intent
//! 4. momentum nudge, if requested
//! 5. jump request
//! 6. crouch toggle and crouch drag
//!
//! and commits the resulting body velocity once at the end.

use std::time::Duration;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::composer::{
    apply_momentum, compose_horizontal, route_velocity, AirContext, MomentumDirection,
};
use crate::config::LocomotionConfig;
use crate::energy::{Debit, EnergyPool};
use crate::jump::{AirState, JumpContext, JumpOutcome, JumpState, LandingPoll};
use crate::posture::{Posture, PostureState};
use crate::probe::GroundContact;
use crate::sprint::{try_apply_sprint, SprintRequest};
use crate::velocity::PendingVelocity;

// =============================================================================
// COMPONENTS
// =============================================================================

/// Whether the body moved during the last physics step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MovementState {
    #[default]
    Idle,
    Moving,
}

impl MovementState {
    pub fn from_velocity(velocity: Vec3) -> Self {
        if velocity == Vec3::ZERO {
            MovementState::Idle
        } else {
            MovementState::Moving
        }
    }

    /// Like [`MovementState::from_velocity`], but only lateral motion counts.
    pub fn from_horizontal(velocity: Vec3) -> Self {
        Self::from_velocity(Vec3::new(velocity.x, 0.0, velocity.z))
    }
}

/// Intent for the current tick, written by whatever drives the body (input, script).
///
/// `jump`, `crouch_toggle` and `momentum` are one-shot requests and are consumed by
/// the tick that reads them; `axis`, `look` and `sprint` are held values.
#[derive(Component, Clone, Copy, Debug, Default, PartialEq)]
pub struct LocomotionInput {
    pub axis: Vec2,
    pub look: Vec2,
    pub sprint: bool,
    pub jump: bool,
    pub crouch_toggle: bool,
    pub momentum: Option<(MomentumDirection, f32)>,
}

impl LocomotionInput {
    /// Copy out this tick's requests, clearing the one-shot ones.
    pub fn take(&mut self) -> Self {
        let requests = *self;
        self.jump = false;
        self.crouch_toggle = false;
        self.momentum = None;
        self.look = Vec2::ZERO;
        requests
    }
}

/// Locomotion state for one controllable body.
#[derive(Component, Clone, Debug)]
pub struct Locomotor {
    pub contact: GroundContact,
    pub movement: MovementState,
    pub jump: JumpState,
    pub posture: Posture,
    /// Scratch target velocity; only its vertical component outlives a tick.
    pub desired: Vec3,
}

impl Locomotor {
    pub fn new(config: &LocomotionConfig) -> Self {
        Self {
            contact: GroundContact::default(),
            movement: MovementState::Idle,
            jump: JumpState::default(),
            posture: Posture::standing(&config.crouch),
            desired: Vec3::ZERO,
        }
    }

    pub fn is_grounded(&self) -> bool {
        self.contact.is_grounded
    }

    pub fn air_state(&self) -> AirState {
        self.jump.air_state
    }

    pub fn posture_state(&self) -> PostureState {
        self.posture.state
    }

    /// Clear vertical carry and airtime state after a teleport.
    pub fn reset_vertical(&mut self) {
        self.desired.y = 0.0;
        self.jump.reset();
    }
}

// =============================================================================
// TICK
// =============================================================================

/// Read-only facts for one tick.
#[derive(Clone, Copy, Debug)]
pub struct TickContext<'a> {
    pub config: &'a LocomotionConfig,
    pub orientation: Quat,
    pub body_velocity: Vec3,
    pub delta: Duration,
}

/// Everything a tick changed outside the [`Locomotor`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickReport {
    /// New body velocity, if anything wrote one this tick.
    pub velocity: Option<Vec3>,
    /// New capsule height, if posture changed this tick.
    pub collider_height: Option<f32>,
    pub debits: Vec<Debit>,
    pub jump: Option<JumpOutcome>,
    pub landing: LandingPoll,
    pub sprinting: bool,
}

/// Advance one body by one tick. `locomotor.contact` must already hold this tick's
/// ground sample.
pub fn step_locomotion(
    ctx: TickContext<'_>,
    input: &LocomotionInput,
    locomotor: &mut Locomotor,
    energy: &mut impl EnergyPool,
) -> TickReport {
    let config = ctx.config;
    let is_grounded = locomotor.contact.is_grounded;
    let mut report = TickReport::default();
    let mut pending = PendingVelocity::new(ctx.body_velocity);

    report.landing =
        locomotor
            .jump
            .poll_landing(ctx.delta, is_grounded, config.jump.settle_delay());

    // --- Sprint ---
    let mut modifier = 1.0;
    let sprint = SprintRequest {
        held: input.sprint,
        is_grounded,
        movement: locomotor.movement,
        base_speed: config.base_speed,
    };
    if let Some(boost) = try_apply_sprint(sprint, &config.sprint, energy) {
        modifier += boost.modifier_bonus;
        report.debits.push(boost.debit);
        report.sprinting = true;
    }

    // --- Compose ---
    let air = AirContext {
        is_grounded,
        air_state: locomotor.jump.air_state,
        was_moving_on_jump: locomotor.jump.was_moving_on_jump,
    };
    let horizontal = compose_horizontal(input.axis, config, modifier, energy.ratio());
    locomotor.desired.x = horizontal.x;
    locomotor.desired.z = horizontal.z;
    if let Some(write) = route_velocity(locomotor.desired, ctx.orientation, air) {
        pending.alter(write);
    }

    // --- Momentum ---
    if let Some((direction, nudge)) = input.momentum {
        apply_momentum(&mut locomotor.desired, direction, config, nudge);
        if let Some(write) = route_velocity(locomotor.desired, ctx.orientation, air) {
            pending.alter(write);
        }
    }

    // --- Jump ---
    if input.jump {
        // Only lateral momentum at takeoff disables airborne steering.
        let jump_ctx = JumpContext {
            config,
            is_grounded,
            movement: MovementState::from_horizontal(ctx.body_velocity),
        };
        let outcome = locomotor
            .jump
            .try_jump(jump_ctx, energy, &mut pending, &mut locomotor.desired);
        if let JumpOutcome::Launched { debit, .. } = outcome {
            report.debits.push(debit);
        }
        report.jump = Some(outcome);
    }

    // --- Posture ---
    if input.crouch_toggle {
        report.collider_height = Some(locomotor.posture.toggle(&config.crouch));
    }
    locomotor.posture.apply_drag(&config.crouch, &mut pending);

    report.velocity = pending.commit();
    report
}
