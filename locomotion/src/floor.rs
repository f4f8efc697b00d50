//! World floor: bodies that fall through the world are recovered or removed.
//!
//! Checked on a slow repeating timer rather than every tick. Players are teleported
//! back above the world with their vertical carry reset; everything else is despawned.

use std::time::Duration;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::{ensure_finite, ensure_positive, ConfigError, Variant};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FloorConfig {
    pub floor_y: f32,
    pub check_interval_secs: f32,
    pub respawn_position: [f32; 3],
}

impl Default for FloorConfig {
    fn default() -> Self {
        Self {
            floor_y: -100.0,
            check_interval_secs: 10.0,
            respawn_position: [0.0, 100.0, 0.0],
        }
    }
}

impl FloorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_positive("floor.check_interval_secs", self.check_interval_secs)?;
        ensure_finite("floor.floor_y", self.floor_y)?;
        for value in self.respawn_position {
            ensure_finite("floor.respawn_position", value)?;
        }
        Ok(())
    }

    pub fn respawn_position(&self) -> Vec3 {
        Vec3::from_array(self.respawn_position)
    }
}

/// Floor config plus its repeating check timer.
#[derive(Resource, Clone, Debug)]
pub struct WorldFloor {
    pub config: FloorConfig,
    timer: Timer,
}

impl WorldFloor {
    pub fn new(config: FloorConfig) -> Self {
        // An unbounded interval never fires.
        let interval = Duration::try_from_secs_f32(config.check_interval_secs.max(f32::EPSILON))
            .unwrap_or(Duration::MAX);
        Self {
            config,
            timer: Timer::new(interval, TimerMode::Repeating),
        }
    }

    /// Advance the check timer; true on ticks where the floor should be enforced.
    pub fn tick(&mut self, delta: Duration) -> bool {
        self.timer.tick(delta).just_finished()
    }
}

impl Default for WorldFloor {
    fn default() -> Self {
        Self::new(FloorConfig::default())
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FloorAction {
    Keep,
    Respawn(Vec3),
    Despawn,
}

/// Decide what happens to a body of `variant` at height `y`.
pub fn floor_action(variant: Variant, y: f32, config: &FloorConfig) -> FloorAction {
    if y >= config.floor_y {
        FloorAction::Keep
    } else if variant.respawns_below_floor() {
        FloorAction::Respawn(config.respawn_position())
    } else {
        FloorAction::Despawn
    }
}
