//! Velocity composer: turns directional intent into a target body velocity.
//!
//! Horizontal speed per axis is `intent * (base_speed - mass/π) * modifier`, then
//! blended with the energy ratio as `axis * ratio/2 + axis/2`, so an exhausted body
//! still moves at half speed instead of stalling.
//!
//! Where the result goes depends on contact:
//! - grounded: rotated into the body orientation and written horizontally
//! - airborne after a standing jump: same, damped by [`AIRTIME_DAMPING`]
//! - airborne after a moving jump (or a plain fall): ignored, keeping jump-carry momentum
//!
//! In Bevy: +X is right, +Y is up, -Z is forward. Intent `y > 0` means forward.

use std::f32::consts::PI;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::{LocomotionConfig, AIRTIME_DAMPING};
use crate::jump::AirState;
use crate::velocity::VelocityWrite;

/// Speed after the mass penalty.
#[inline]
pub fn effective_speed(base_speed: f32, mass: f32) -> f32 {
    debug_assert!(mass > 0.0, "mass must be validated before composing");
    base_speed - mass / PI
}

/// Half-weighted interpolation between half and full speed by energy ratio.
#[inline]
pub fn energy_blend(axis: f32, energy_ratio: f32) -> f32 {
    axis * energy_ratio / 2.0 + axis / 2.0
}

/// Build the horizontal target velocity (body-local, Y = 0) for this tick's intent.
pub fn compose_horizontal(
    intent: Vec2,
    config: &LocomotionConfig,
    modifier: f32,
    energy_ratio: f32,
) -> Vec3 {
    let intent = if config.clamp_intent {
        intent.clamp_length_max(1.0)
    } else {
        intent
    };

    let scale = effective_speed(config.base_speed, config.mass) * modifier;
    let x = intent.x * scale;
    let z = -intent.y * scale;

    Vec3::new(energy_blend(x, energy_ratio), 0.0, energy_blend(z, energy_ratio))
}

/// Contact and jump state that decides how a composed velocity is applied.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AirContext {
    pub is_grounded: bool,
    pub air_state: AirState,
    pub was_moving_on_jump: bool,
}

impl AirContext {
    /// Scale applied to horizontal contributions, or `None` if they must be dropped.
    pub fn horizontal_scale(&self) -> Option<f32> {
        if self.is_grounded {
            Some(1.0)
        } else if self.air_state != AirState::Grounded && !self.was_moving_on_jump {
            Some(AIRTIME_DAMPING)
        } else {
            None
        }
    }
}

/// Rotate `desired` into the body orientation and decide whether it is written.
///
/// Writes are horizontal only; vertical airtime velocity is never clobbered here.
pub fn route_velocity(desired: Vec3, orientation: Quat, air: AirContext) -> Option<VelocityWrite> {
    let scale = air.horizontal_scale()?;
    Some(VelocityWrite::horizontal(orientation * (desired * scale)))
}

// =============================================================================
// MOMENTUM HELPERS
// =============================================================================

/// Direction of a single-axis momentum nudge (body-local).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MomentumDirection {
    Forward,
    Backward,
    Left,
    Right,
}

/// Overwrite one axis of `desired` with `±(base_speed / mass) * modifier`.
pub fn apply_momentum(
    desired: &mut Vec3,
    direction: MomentumDirection,
    config: &LocomotionConfig,
    modifier: f32,
) {
    debug_assert!(config.mass > 0.0, "mass must be validated before composing");
    let magnitude = config.base_speed / config.mass * modifier;
    match direction {
        MomentumDirection::Forward => desired.z = -magnitude,
        MomentumDirection::Backward => desired.z = magnitude,
        MomentumDirection::Right => desired.x = magnitude,
        MomentumDirection::Left => desired.x = -magnitude,
    }
}
