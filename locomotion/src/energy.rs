//! Energy pool read and debited by the jump and sprint gates.
//!
//! The pool itself belongs to the entity's resource subsystem; locomotion only
//! reads the ratio and debits through [`EnergyPool`]. Each debit is also published
//! as an [`EnergyDebited`] message so the owner (HUD, regen) can react.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Read/debit access to a depletable resource.
pub trait EnergyPool {
    fn current(&self) -> f32;
    fn max(&self) -> f32;

    /// Withdraw `amount`. Returns `false` (and changes nothing) if unaffordable.
    fn consume(&mut self, amount: f32) -> bool;

    /// `current / max`, in `[0, 1]`. A pool with no capacity reports 0.
    fn ratio(&self) -> f32 {
        let max = self.max();
        if max <= 0.0 {
            return 0.0;
        }
        (self.current() / max).clamp(0.0, 1.0)
    }

    /// An empty pool can't pay for anything, even a zero-cost action.
    fn can_consume(&self, amount: f32) -> bool {
        amount >= 0.0 && self.current() > 0.0 && self.current() >= amount
    }
}

/// Simple energy pool component.
#[derive(Component, Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct Energy {
    pub current: f32,
    pub max: f32,
}

impl Default for Energy {
    fn default() -> Self {
        Self::full(100.0)
    }
}

impl Energy {
    pub fn full(max: f32) -> Self {
        Self { current: max, max }
    }

    pub fn new(current: f32, max: f32) -> Self {
        Self {
            current: current.clamp(0.0, max.max(0.0)),
            max,
        }
    }

    /// Refill by `amount`, capped at `max`.
    pub fn restore(&mut self, amount: f32) {
        self.current = (self.current + amount.max(0.0)).min(self.max);
    }

    pub fn is_empty(&self) -> bool {
        self.current <= 0.0
    }
}

impl EnergyPool for Energy {
    fn current(&self) -> f32 {
        self.current
    }

    fn max(&self) -> f32 {
        self.max
    }

    fn consume(&mut self, amount: f32) -> bool {
        if !self.can_consume(amount) {
            return false;
        }
        self.current = (self.current - amount).max(0.0);
        true
    }
}

/// What an energy debit paid for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DebitCause {
    Jump,
    Sprint,
}

/// A single withdrawal made during a locomotion tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Debit {
    pub amount: f32,
    pub cause: DebitCause,
}

/// Published once per debit so the resource subsystem can observe spending.
#[derive(Message, Clone, Copy, Debug, PartialEq)]
pub struct EnergyDebited {
    pub entity: Entity,
    pub amount: f32,
    pub cause: DebitCause,
}
