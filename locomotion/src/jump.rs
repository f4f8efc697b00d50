//! Jump/landing state machine.
//!
//! `Grounded -> Jumping -> Landing -> Grounded`
//!
//! A jump is only accepted from `Grounded` while the probe reports contact and the
//! energy pool can pay the cost. Takeoff arms a delayed landing check instead of
//! checking ground every tick, because contact sensing is unreliable right after
//! leaving the ground. When the check fires the body enters `Landing`; if it is
//! grounded the machine settles back to `Grounded`, otherwise the same check is
//! re-armed and the body keeps polling at the settle interval until it lands.

use std::time::Duration;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::LocomotionConfig;
use crate::controller::MovementState;
use crate::energy::{Debit, DebitCause, EnergyPool};
use crate::schedule::DelayedCheck;
use crate::velocity::{PendingVelocity, VelocityWrite};

/// Discrete airtime state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AirState {
    #[default]
    Grounded,
    /// Took off; waiting for the first landing check.
    Jumping,
    /// A landing check ran and the body was still airborne; polling for touchdown.
    Landing,
}

/// Why a jump request was dropped. Not an error; the request is simply ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum JumpRejection {
    AlreadyAirborne,
    NoGroundContact,
    InsufficientEnergy,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum JumpOutcome {
    Launched {
        vertical_velocity: f32,
        debit: Debit,
    },
    Rejected(JumpRejection),
}

impl JumpOutcome {
    pub fn launched(&self) -> bool {
        matches!(self, JumpOutcome::Launched { .. })
    }
}

/// What the landing check did this tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LandingPoll {
    /// No check fired.
    #[default]
    Idle,
    /// The check fired while grounded; back to `Grounded`.
    Landed,
    /// The check fired while airborne and was re-armed.
    Rearmed,
}

/// Jump machine state for one body.
#[derive(Clone, Debug, Default)]
pub struct JumpState {
    pub air_state: AirState,
    /// Whether the body had horizontal motion at takeoff. Controls airborne steering.
    pub was_moving_on_jump: bool,
    landing_check: DelayedCheck,
}

/// Per-tick facts the jump machine reads.
#[derive(Clone, Copy, Debug)]
pub struct JumpContext<'a> {
    pub config: &'a LocomotionConfig,
    pub is_grounded: bool,
    pub movement: MovementState,
}

impl JumpState {
    pub fn landing_check_pending(&self) -> bool {
        self.landing_check.is_pending()
    }

    /// Try to take off. On success the takeoff velocity is written to `pending`
    /// (vertical included), `desired` loses its stale vertical carry, and a fresh
    /// landing check replaces any pending one.
    pub fn try_jump(
        &mut self,
        ctx: JumpContext<'_>,
        energy: &mut impl EnergyPool,
        pending: &mut PendingVelocity,
        desired: &mut Vec3,
    ) -> JumpOutcome {
        if self.air_state != AirState::Grounded {
            return JumpOutcome::Rejected(JumpRejection::AlreadyAirborne);
        }
        if !ctx.is_grounded {
            return JumpOutcome::Rejected(JumpRejection::NoGroundContact);
        }

        let cost = ctx.config.jump.cost;
        if !energy.consume(cost) {
            return JumpOutcome::Rejected(JumpRejection::InsufficientEnergy);
        }

        desired.y = 0.0;

        debug_assert!(ctx.config.mass > 0.0, "mass must be validated before jumping");
        let vertical_velocity = ctx.config.jump.impulse / ctx.config.mass;
        let mut takeoff = pending.current();
        takeoff.y = vertical_velocity;
        pending.alter(VelocityWrite::full(takeoff));

        self.air_state = AirState::Jumping;
        self.was_moving_on_jump = ctx.movement == MovementState::Moving;
        self.landing_check.arm(ctx.config.jump.settle_delay());

        JumpOutcome::Launched {
            vertical_velocity,
            debit: Debit {
                amount: cost,
                cause: DebitCause::Jump,
            },
        }
    }

    /// Advance the landing check by `delta`, resolving it against this tick's contact.
    pub fn poll_landing(
        &mut self,
        delta: Duration,
        is_grounded: bool,
        settle_delay: Duration,
    ) -> LandingPoll {
        if self.landing_check.tick(delta).is_none() {
            return LandingPoll::Idle;
        }

        self.air_state = AirState::Landing;
        if is_grounded {
            self.air_state = AirState::Grounded;
            self.was_moving_on_jump = false;
            LandingPoll::Landed
        } else {
            self.landing_check.arm(settle_delay);
            LandingPoll::Rearmed
        }
    }

    /// Drop any airtime state (used when a body is teleported).
    pub fn reset(&mut self) {
        self.landing_check.cancel();
        self.air_state = AirState::Grounded;
        self.was_moving_on_jump = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::energy::Energy;

    const STEP: Duration = Duration::from_millis(50);

    fn config() -> LocomotionConfig {
        let mut config = LocomotionConfig::cell();
        config.mass = 2.0;
        config.jump.impulse = 20.0;
        config.jump.cost = 5.0;
        config
    }

    fn ctx(config: &LocomotionConfig, is_grounded: bool) -> JumpContext<'_> {
        JumpContext {
            config,
            is_grounded,
            movement: MovementState::Idle,
        }
    }

    #[test]
    fn test_jump_from_ground() {
        let config = config();
        let mut state = JumpState::default();
        let mut energy = Energy::full(100.0);
        let mut pending = PendingVelocity::new(Vec3::new(3.0, -1.0, 0.0));
        let mut desired = Vec3::new(0.0, 4.0, 0.0);

        let outcome = state.try_jump(ctx(&config, true), &mut energy, &mut pending, &mut desired);

        assert!(outcome.launched());
        assert_eq!(state.air_state, AirState::Jumping);
        assert!((energy.current - 95.0).abs() < 1e-6);
        assert_eq!(pending.commit(), Some(Vec3::new(3.0, 10.0, 0.0)));
        assert_eq!(desired.y, 0.0);
        assert!(state.landing_check_pending());
    }

    #[test]
    fn test_jump_records_motion_at_takeoff() {
        let config = config();
        let mut state = JumpState::default();
        let mut energy = Energy::full(100.0);
        let mut desired = Vec3::ZERO;
        let mut pending = PendingVelocity::new(Vec3::ZERO);
        let moving = JumpContext {
            movement: MovementState::Moving,
            ..ctx(&config, true)
        };

        state.try_jump(moving, &mut energy, &mut pending, &mut desired);
        assert!(state.was_moving_on_jump);
    }

    #[test]
    fn test_jump_rejected_while_airborne() {
        let config = config();
        let mut state = JumpState {
            air_state: AirState::Jumping,
            ..default()
        };
        let mut energy = Energy::full(100.0);
        let mut desired = Vec3::ZERO;
        let mut pending = PendingVelocity::new(Vec3::new(1.0, 2.0, 3.0));

        let outcome = state.try_jump(ctx(&config, true), &mut energy, &mut pending, &mut desired);

        assert_eq!(outcome, JumpOutcome::Rejected(JumpRejection::AlreadyAirborne));
        assert_eq!(state.air_state, AirState::Jumping);
        assert_eq!(energy.current, 100.0);
        assert_eq!(pending.commit(), None);
    }

    #[test]
    fn test_jump_rejected_without_contact() {
        let config = config();
        let mut state = JumpState::default();
        let mut energy = Energy::full(100.0);
        let mut desired = Vec3::ZERO;
        let mut pending = PendingVelocity::new(Vec3::ZERO);

        let outcome = state.try_jump(ctx(&config, false), &mut energy, &mut pending, &mut desired);

        assert_eq!(outcome, JumpOutcome::Rejected(JumpRejection::NoGroundContact));
        assert_eq!(energy.current, 100.0);
    }

    #[test]
    fn test_jump_rejected_without_energy() {
        let config = config();
        let mut state = JumpState::default();
        let mut energy = Energy::new(4.0, 100.0);
        let mut desired = Vec3::ZERO;
        let mut pending = PendingVelocity::new(Vec3::ZERO);

        let outcome = state.try_jump(ctx(&config, true), &mut energy, &mut pending, &mut desired);

        assert_eq!(outcome, JumpOutcome::Rejected(JumpRejection::InsufficientEnergy));
        assert_eq!(state.air_state, AirState::Grounded);
        assert_eq!(energy.current, 4.0);
        assert!(!state.landing_check_pending());
        assert_eq!(pending.commit(), None);
    }

    #[test]
    fn test_landing_check_settles_when_grounded() {
        let config = config();
        let delay = config.jump.settle_delay();
        let mut state = JumpState::default();
        let mut energy = Energy::full(100.0);
        let mut desired = Vec3::ZERO;
        let mut pending = PendingVelocity::new(Vec3::ZERO);
        let moving = JumpContext {
            movement: MovementState::Moving,
            ..ctx(&config, true)
        };
        state.try_jump(moving, &mut energy, &mut pending, &mut desired);

        // Nothing happens before the settle delay, even with contact.
        for _ in 0..4 {
            assert_eq!(state.poll_landing(STEP, true, delay), LandingPoll::Idle);
        }
        assert_eq!(state.air_state, AirState::Jumping);

        // t = 0.25
        assert_eq!(state.poll_landing(STEP, true, delay), LandingPoll::Landed);
        assert_eq!(state.air_state, AirState::Grounded);
        assert!(!state.was_moving_on_jump);
        assert!(!state.landing_check_pending());
    }

    #[test]
    fn test_landing_check_rearms_while_airborne() {
        let config = config();
        let delay = config.jump.settle_delay();
        let mut state = JumpState::default();
        let mut energy = Energy::full(100.0);
        let mut desired = Vec3::ZERO;
        let mut pending = PendingVelocity::new(Vec3::ZERO);
        state.try_jump(ctx(&config, true), &mut energy, &mut pending, &mut desired);

        let polls: Vec<_> = (0..5).map(|_| state.poll_landing(STEP, false, delay)).collect();
        assert_eq!(polls.iter().filter(|p| **p == LandingPoll::Rearmed).count(), 1);
        assert_eq!(state.air_state, AirState::Landing);
        assert!(state.landing_check_pending());

        // Next check at t = 0.5 finds ground.
        let polls: Vec<_> = (0..5).map(|_| state.poll_landing(STEP, true, delay)).collect();
        assert_eq!(polls.last(), Some(&LandingPoll::Landed));
        assert_eq!(state.air_state, AirState::Grounded);
    }

    #[test]
    fn test_second_jump_request_mid_air_yields_one_landing() {
        let config = config();
        let delay = config.jump.settle_delay();
        let mut state = JumpState::default();
        let mut energy = Energy::full(100.0);
        let mut desired = Vec3::ZERO;

        let mut pending = PendingVelocity::new(Vec3::ZERO);
        assert!(state
            .try_jump(ctx(&config, true), &mut energy, &mut pending, &mut desired)
            .launched());

        // t = 0.1, still airborne: the second request is dropped.
        state.poll_landing(STEP, false, delay);
        state.poll_landing(STEP, false, delay);
        let mut pending = PendingVelocity::new(Vec3::ZERO);
        let second = state.try_jump(ctx(&config, true), &mut energy, &mut pending, &mut desired);
        assert!(!second.launched());

        let mut landings = 0;
        for _ in 0..20 {
            if state.poll_landing(STEP, true, delay) == LandingPoll::Landed {
                landings += 1;
            }
        }
        assert_eq!(landings, 1);
        assert!((energy.current - 95.0).abs() < 1e-6);
    }

    #[test]
    fn test_reset_cancels_landing_check() {
        let config = config();
        let mut state = JumpState::default();
        let mut energy = Energy::full(100.0);
        let mut desired = Vec3::ZERO;
        let mut pending = PendingVelocity::new(Vec3::ZERO);
        state.try_jump(ctx(&config, true), &mut energy, &mut pending, &mut desired);

        state.reset();
        assert_eq!(state.air_state, AirState::Grounded);
        assert!(!state.landing_check_pending());
        assert_eq!(
            state.poll_landing(Duration::from_secs(1), true, config.jump.settle_delay()),
            LandingPoll::Idle
        );
    }
}
