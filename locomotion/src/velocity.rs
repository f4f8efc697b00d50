//! Single-commit velocity writes.
//!
//! Every contributor in a tick (composer, momentum, jump, crouch drag) alters a
//! [`PendingVelocity`] that starts from the body's current velocity. The result is
//! committed to the physics body once, after all of them have run.

use bevy::prelude::*;

/// One alteration of the body velocity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VelocityWrite {
    pub velocity: Vec3,
    /// When false the vertical component of the write is ignored and the
    /// current vertical velocity is kept.
    pub affect_vertical: bool,
}

impl VelocityWrite {
    pub fn horizontal(velocity: Vec3) -> Self {
        Self {
            velocity,
            affect_vertical: false,
        }
    }

    pub fn full(velocity: Vec3) -> Self {
        Self {
            velocity,
            affect_vertical: true,
        }
    }
}

/// Velocity accumulator for one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PendingVelocity {
    value: Vec3,
    dirty: bool,
}

impl PendingVelocity {
    pub fn new(body_velocity: Vec3) -> Self {
        Self {
            value: body_velocity,
            dirty: false,
        }
    }

    /// Overwrite X/Z, and Y only if the write asks for it.
    pub fn alter(&mut self, write: VelocityWrite) {
        self.value.x = write.velocity.x;
        self.value.z = write.velocity.z;
        if write.affect_vertical {
            self.value.y = write.velocity.y;
        }
        self.dirty = true;
    }

    /// Velocity the body would have if committed now.
    pub fn current(&self) -> Vec3 {
        self.value
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Final velocity for the body, or `None` if nothing wrote this tick.
    pub fn commit(self) -> Option<Vec3> {
        self.dirty.then_some(self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_horizontal_write_keeps_vertical() {
        let mut pending = PendingVelocity::new(Vec3::new(1.0, -4.0, 2.0));
        pending.alter(VelocityWrite::horizontal(Vec3::new(5.0, 99.0, -3.0)));
        assert_eq!(pending.commit(), Some(Vec3::new(5.0, -4.0, -3.0)));
    }

    #[test]
    fn test_full_write_sets_vertical() {
        let mut pending = PendingVelocity::new(Vec3::new(1.0, -4.0, 2.0));
        pending.alter(VelocityWrite::full(Vec3::new(0.0, 10.0, 0.0)));
        assert_eq!(pending.commit(), Some(Vec3::new(0.0, 10.0, 0.0)));
    }

    #[test]
    fn test_untouched_commits_nothing() {
        let pending = PendingVelocity::new(Vec3::ONE);
        assert!(!pending.is_dirty());
        assert_eq!(pending.commit(), None);
    }
}
