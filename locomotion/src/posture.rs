//! Crouch/posture controller.
//!
//! Toggling into `Crouched` shrinks the capsule and starts a repeating two-step drag
//! pulse: the amplify step scales horizontal velocity up, the settle step pulls it to a
//! tiny residual. This keeps the collider resize from launching the body. Standing up
//! restores the full height and stops the pulse. Posture is independent of airtime.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::CrouchConfig;
use crate::velocity::{PendingVelocity, VelocityWrite};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PostureState {
    #[default]
    Standing,
    Crouched,
}

/// Which half of the crouch drag pulse runs on the next physics step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DragPhase {
    Amplify,
    Settle,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Posture {
    pub state: PostureState,
    /// Current capsule height (caps included).
    pub height: f32,
    drag: Option<DragPhase>,
}

impl Posture {
    pub fn standing(config: &CrouchConfig) -> Self {
        Self {
            state: PostureState::Standing,
            height: config.standing_height,
            drag: None,
        }
    }

    pub fn drag_phase(&self) -> Option<DragPhase> {
        self.drag
    }

    /// Flip posture. Returns the new capsule height.
    pub fn toggle(&mut self, config: &CrouchConfig) -> f32 {
        match self.state {
            PostureState::Standing => {
                self.state = PostureState::Crouched;
                self.height = config.crouched_height;
                // Restart the pulse from its first half.
                self.drag = Some(DragPhase::Amplify);
            }
            PostureState::Crouched => {
                self.state = PostureState::Standing;
                self.height = config.standing_height;
                self.drag = None;
            }
        }
        self.height
    }

    /// Run one physics step of the crouch drag. No-op while standing.
    pub fn apply_drag(&mut self, config: &CrouchConfig, pending: &mut PendingVelocity) {
        let Some(phase) = self.drag else {
            return;
        };

        match phase {
            DragPhase::Amplify => {
                pending.alter(VelocityWrite::horizontal(
                    pending.current() * config.entry_amplify,
                ));
                self.drag = Some(DragPhase::Settle);
            }
            DragPhase::Settle => {
                pending.alter(VelocityWrite::horizontal(Vec3::splat(
                    -config.residual_drag,
                )));
                self.drag = (self.state == PostureState::Crouched).then_some(DragPhase::Amplify);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_halves_and_restores_height() {
        let config = CrouchConfig::default();
        let mut posture = Posture::standing(&config);

        let crouched = posture.toggle(&config);
        assert_eq!(posture.state, PostureState::Crouched);
        assert!((crouched - config.standing_height / 2.0).abs() < 1e-6);

        let standing = posture.toggle(&config);
        assert_eq!(posture.state, PostureState::Standing);
        assert_eq!(standing, config.standing_height);
    }

    #[test]
    fn test_drag_pulse_alternates_while_crouched() {
        let config = CrouchConfig::default();
        let mut posture = Posture::standing(&config);
        posture.toggle(&config);

        let mut pending = PendingVelocity::new(Vec3::new(1.0, -2.0, 0.0));
        posture.apply_drag(&config, &mut pending);
        let amplified = pending.current();
        assert!((amplified.x - std::f32::consts::PI).abs() < 1e-5);
        assert_eq!(amplified.y, -2.0);

        posture.apply_drag(&config, &mut pending);
        let settled = pending.current();
        assert!((settled.x + config.residual_drag).abs() < 1e-6);
        assert!((settled.z + config.residual_drag).abs() < 1e-6);
        assert_eq!(settled.y, -2.0);

        // Still crouched: the pulse repeats.
        assert_eq!(posture.drag_phase(), Some(DragPhase::Amplify));
    }

    #[test]
    fn test_no_drag_while_standing() {
        let config = CrouchConfig::default();
        let mut posture = Posture::standing(&config);
        let mut pending = PendingVelocity::new(Vec3::new(4.0, 1.0, 4.0));

        posture.apply_drag(&config, &mut pending);
        assert!(!pending.is_dirty());

        posture.toggle(&config);
        posture.toggle(&config);
        posture.apply_drag(&config, &mut pending);
        assert!(!pending.is_dirty());
        assert_eq!(posture.drag_phase(), None);
    }
}
