//! Body orientation from look input.
//!
//! Look deltas accumulate into pitch/yaw (degrees). Pitch is clamped, roll is always
//! zero, and the body slerps a fixed `1/φ` of the way toward the target per update.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::PHI;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookConfig {
    /// Degrees per unit of look delta, `[yaw, pitch]`.
    pub rotation_speed: [f32; 2],
    pub pitch_limit_deg: f32,
}

impl Default for LookConfig {
    fn default() -> Self {
        Self {
            rotation_speed: [1.0, 1.0],
            pitch_limit_deg: 85.0,
        }
    }
}

/// Accumulated look angles, in degrees.
#[derive(Component, Clone, Copy, Debug, Default, PartialEq)]
pub struct LookAngles {
    pub pitch: f32,
    pub yaw: f32,
}

impl LookAngles {
    /// Seed the angles from an existing rotation.
    pub fn from_rotation(rotation: Quat) -> Self {
        let (yaw, pitch, _) = rotation.to_euler(EulerRot::YXZ);
        Self {
            pitch: pitch.to_degrees(),
            yaw: yaw.to_degrees(),
        }
    }

    pub fn target(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw.to_radians(), self.pitch.to_radians(), 0.0)
    }
}

/// Fold a look delta into `angles` and return the body's next rotation.
/// Returns `current` unchanged for a zero delta.
pub fn apply_look(angles: &mut LookAngles, delta: Vec2, config: &LookConfig, current: Quat) -> Quat {
    if delta == Vec2::ZERO {
        return current;
    }

    // Mouse right turns right (negative yaw about +Y); mouse up looks up.
    angles.yaw -= delta.x * config.rotation_speed[0];
    angles.pitch -= delta.y * config.rotation_speed[1];
    angles.pitch = angles
        .pitch
        .clamp(-config.pitch_limit_deg, config.pitch_limit_deg);

    current.slerp(angles.target(), 1.0 / PHI).normalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pitch_is_clamped() {
        let config = LookConfig::default();
        let mut angles = LookAngles::default();

        apply_look(&mut angles, Vec2::new(0.0, -500.0), &config, Quat::IDENTITY);
        assert_eq!(angles.pitch, 85.0);

        apply_look(&mut angles, Vec2::new(0.0, 1000.0), &config, Quat::IDENTITY);
        assert_eq!(angles.pitch, -85.0);
    }

    #[test]
    fn test_zero_delta_keeps_rotation() {
        let config = LookConfig::default();
        let mut angles = LookAngles::default();
        let current = Quat::from_rotation_y(0.3);

        assert_eq!(apply_look(&mut angles, Vec2::ZERO, &config, current), current);
        assert_eq!(angles, LookAngles::default());
    }

    #[test]
    fn test_slerps_toward_target() {
        let config = LookConfig::default();
        let mut angles = LookAngles::default();

        let next = apply_look(&mut angles, Vec2::new(-90.0, 0.0), &config, Quat::IDENTITY);
        let target = angles.target();

        let moved = Quat::IDENTITY.angle_between(next);
        let total = Quat::IDENTITY.angle_between(target);
        assert!((moved / total - 1.0 / PHI).abs() < 1e-3);
        // No roll ever accumulates.
        let (_, _, roll) = next.to_euler(EulerRot::YXZ);
        assert!(roll.abs() < 1e-4);
    }

    #[test]
    fn test_from_rotation_round_trip() {
        let rotation = Quat::from_euler(EulerRot::YXZ, 0.5, -0.2, 0.0);
        let angles = LookAngles::from_rotation(rotation);
        assert!(angles.target().angle_between(rotation) < 1e-4);
    }
}
