//! Sprint gate: throttles the sprint modifier against the energy pool.
//!
//! Sprint only applies while grounded and moving, and only if the nonlinear cost
//! `sigmoid(base_speed) * energy_ratio / cost_divisor` is affordable. A refused
//! sprint is silent; the tick simply composes without the bonus.

use crate::config::SprintConfig;
use crate::controller::MovementState;
use crate::energy::{Debit, DebitCause, EnergyPool};

/// Logistic function.
#[inline]
pub fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Per-tick sprint cost for the given speed and energy ratio.
pub fn sprint_cost(base_speed: f32, energy_ratio: f32, config: &SprintConfig) -> f32 {
    sigmoid(base_speed) * energy_ratio / config.cost_divisor
}

/// Result of a successful sprint gate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SprintBoost {
    /// Added to the composer's speed modifier this tick.
    pub modifier_bonus: f32,
    pub debit: Debit,
}

/// Sprint request context for one tick.
#[derive(Clone, Copy, Debug)]
pub struct SprintRequest {
    pub held: bool,
    pub is_grounded: bool,
    pub movement: MovementState,
    pub base_speed: f32,
}

/// Debit the sprint cost once and return the modifier bonus, or `None` if sprint
/// doesn't apply this tick.
pub fn try_apply_sprint(
    request: SprintRequest,
    config: &SprintConfig,
    energy: &mut impl EnergyPool,
) -> Option<SprintBoost> {
    if !request.held || !request.is_grounded || request.movement != MovementState::Moving {
        return None;
    }

    let cost = sprint_cost(request.base_speed, energy.ratio(), config);
    if !energy.consume(cost) {
        return None;
    }

    Some(SprintBoost {
        modifier_bonus: energy.ratio() * config.boost_scale,
        debit: Debit {
            amount: cost,
            cause: DebitCause::Sprint,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::energy::Energy;

    fn request() -> SprintRequest {
        SprintRequest {
            held: true,
            is_grounded: true,
            movement: MovementState::Moving,
            base_speed: 20.0,
        }
    }

    #[test]
    fn test_sigmoid_midpoint() {
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-6);
        assert!(sigmoid(20.0) > 0.999);
    }

    #[test]
    fn test_sprint_debits_cost_once() {
        let config = SprintConfig::default();
        let mut energy = Energy::full(100.0);
        let expected_cost = sprint_cost(20.0, 1.0, &config);

        let boost = try_apply_sprint(request(), &config, &mut energy).unwrap();

        assert!((boost.debit.amount - expected_cost).abs() < 1e-6);
        assert!((energy.current - (100.0 - expected_cost)).abs() < 1e-4);
        assert_eq!(boost.debit.cause, DebitCause::Sprint);
        // Bonus is the post-debit ratio at scale one.
        assert!((boost.modifier_bonus - energy.ratio()).abs() < 1e-6);
    }

    #[test]
    fn test_sprint_with_no_energy_does_nothing() {
        let config = SprintConfig::default();
        let mut energy = Energy::new(0.0, 100.0);

        assert!(try_apply_sprint(request(), &config, &mut energy).is_none());
        assert_eq!(energy.current, 0.0);
    }

    #[test]
    fn test_sprint_requires_ground_and_motion() {
        let config = SprintConfig::default();
        let mut energy = Energy::full(100.0);

        let airborne = SprintRequest {
            is_grounded: false,
            ..request()
        };
        assert!(try_apply_sprint(airborne, &config, &mut energy).is_none());

        let idle = SprintRequest {
            movement: MovementState::Idle,
            ..request()
        };
        assert!(try_apply_sprint(idle, &config, &mut energy).is_none());

        let released = SprintRequest {
            held: false,
            ..request()
        };
        assert!(try_apply_sprint(released, &config, &mut energy).is_none());

        assert_eq!(energy.current, 100.0);
    }

    #[test]
    fn test_sprint_rejected_when_unaffordable() {
        let config = SprintConfig::default();
        // A tiny pool: ratio 0.2 makes the cost ~0.02, twice what is left.
        let mut energy = Energy::new(0.01, 0.05);
        let cost = sprint_cost(20.0, energy.ratio(), &config);
        assert!(cost > energy.current);

        assert!(try_apply_sprint(request(), &config, &mut energy).is_none());
        assert_eq!(energy.current, 0.01);
    }
}
