//! Locomotion tuning values and presets.
//!
//! Each controllable body carries a [`LocomotionConfig`] component. Two presets mirror
//! the two kinds of body the simulation drives:
//! - [`cell`]: generic AI/cell-like entities (world-down probe only, despawned below the floor)
//! - [`character`]: the player character (tilted-ground probe, respawned above the floor)
//!
//! Tuning can also be authored as RON and loaded through [`LocomotionTuning`].

use std::f32::consts::PI;
use std::path::{Path, PathBuf};

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::floor::FloorConfig;
use crate::look::LookConfig;

/// Golden ratio.
pub const PHI: f32 = 1.618_034;

/// Multiplier applied to horizontal contributions while airborne (1/φ ≈ 0.618).
pub const AIRTIME_DAMPING: f32 = 1.0 / PHI;

// =============================================================================
// PRESET CONSTANTS
// =============================================================================

pub mod cell {
    pub const BASE_SPEED: f32 = 20.0;
    pub const MASS: f32 = 1.0;
    pub const JUMP_IMPULSE: f32 = 20.0;
    pub const JUMP_COST: f32 = 1.0;
}

pub mod character {
    /// Matches the on-foot speed of the player (m/s) before the mass term.
    pub const BASE_SPEED: f32 = 8.0;
    pub const MASS: f32 = 1.0;
    /// ~7.5 m/s of takeoff velocity at unit mass.
    pub const JUMP_IMPULSE: f32 = 7.5;
    pub const JUMP_COST: f32 = 1.0;
}

/// Radius of the grounding sphere cast.
pub const PROBE_RADIUS: f32 = 0.1;
/// World-down probe reach; slightly exceeds standing leg clearance.
pub const PROBE_DISTANCE: f32 = 1.5;
/// Reach of the second, orientation-relative probe.
pub const TILTED_PROBE_DISTANCE: f32 = 1.0;

/// Wait before the first landing check after takeoff (seconds).
pub const SETTLE_DELAY_SECS: f32 = 0.25;

pub const STANDING_HEIGHT: f32 = 2.0;
pub const CROUCHED_HEIGHT: f32 = 1.0;
pub const CAPSULE_RADIUS: f32 = 0.5;
/// Leftover horizontal drift written on the settle half of the crouch pulse.
pub const CROUCH_RESIDUAL_DRAG: f32 = 0.002;

// =============================================================================
// TYPES
// =============================================================================

/// Which kind of body is being driven.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Variant {
    #[default]
    Cell,
    Player,
}

impl Variant {
    /// Players get a second probe along their local down axis for tilted terrain.
    pub fn supports_tilted_probe(self) -> bool {
        matches!(self, Variant::Player)
    }

    /// Players are teleported back above the world floor instead of despawned.
    pub fn respawns_below_floor(self) -> bool {
        matches!(self, Variant::Player)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    pub radius: f32,
    pub distance: f32,
    pub tilted_distance: f32,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            radius: PROBE_RADIUS,
            distance: PROBE_DISTANCE,
            tilted_distance: TILTED_PROBE_DISTANCE,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JumpConfig {
    /// Vertical takeoff velocity is `impulse / mass`.
    pub impulse: f32,
    /// Energy debited per successful jump.
    pub cost: f32,
    pub settle_delay_secs: f32,
}

impl JumpConfig {
    pub fn settle_delay(&self) -> std::time::Duration {
        std::time::Duration::from_secs_f32(self.settle_delay_secs)
    }
}

impl Default for JumpConfig {
    fn default() -> Self {
        Self {
            impulse: cell::JUMP_IMPULSE,
            cost: cell::JUMP_COST,
            settle_delay_secs: SETTLE_DELAY_SECS,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrouchConfig {
    pub standing_height: f32,
    pub crouched_height: f32,
    pub radius: f32,
    /// Scale applied to horizontal velocity on the amplify half of the pulse.
    pub entry_amplify: f32,
    pub residual_drag: f32,
}

impl Default for CrouchConfig {
    fn default() -> Self {
        Self {
            standing_height: STANDING_HEIGHT,
            crouched_height: CROUCHED_HEIGHT,
            radius: CAPSULE_RADIUS,
            entry_amplify: PI,
            residual_drag: CROUCH_RESIDUAL_DRAG,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SprintConfig {
    /// Divides `sigmoid(base_speed) * energy_ratio` to get the per-tick cost.
    pub cost_divisor: f32,
    /// Scale on the energy-ratio modifier bonus. Kept at exactly 1.0 by default;
    /// this is the clamp point for tuning sprint strength.
    pub boost_scale: f32,
}

impl Default for SprintConfig {
    fn default() -> Self {
        Self {
            cost_divisor: 10.0,
            boost_scale: PHI / PHI,
        }
    }
}

/// Per-body locomotion tuning.
#[derive(Component, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocomotionConfig {
    pub variant: Variant,
    pub base_speed: f32,
    /// Scales speed (`base_speed - mass/π`) and jump height (`impulse/mass`). Must be > 0.
    pub mass: f32,
    /// Clamp axis intent to unit length before composing. Off by default, so
    /// diagonal input is faster than cardinal input.
    pub clamp_intent: bool,
    pub probe: ProbeConfig,
    pub jump: JumpConfig,
    pub crouch: CrouchConfig,
    pub sprint: SprintConfig,
    pub look: LookConfig,
    /// Verbose per-tick tracing for this body (logged at debug level).
    pub debug_logging: bool,
}

impl Default for LocomotionConfig {
    fn default() -> Self {
        Self::cell()
    }
}

impl LocomotionConfig {
    pub fn cell() -> Self {
        Self {
            variant: Variant::Cell,
            base_speed: cell::BASE_SPEED,
            mass: cell::MASS,
            clamp_intent: false,
            probe: ProbeConfig::default(),
            jump: JumpConfig::default(),
            crouch: CrouchConfig::default(),
            sprint: SprintConfig::default(),
            look: LookConfig::default(),
            debug_logging: false,
        }
    }

    pub fn character() -> Self {
        Self {
            variant: Variant::Player,
            base_speed: character::BASE_SPEED,
            mass: character::MASS,
            jump: JumpConfig {
                impulse: character::JUMP_IMPULSE,
                cost: character::JUMP_COST,
                ..default()
            },
            ..Self::cell()
        }
    }

    /// Reject tuning that would divide by zero or produce a degenerate collider.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.mass.is_finite() || self.mass <= 0.0 {
            return Err(ConfigError::InvalidMass(self.mass));
        }

        let positives = [
            ("base_speed", self.base_speed),
            ("probe.radius", self.probe.radius),
            ("probe.distance", self.probe.distance),
            ("probe.tilted_distance", self.probe.tilted_distance),
            ("jump.settle_delay_secs", self.jump.settle_delay_secs),
            ("crouch.standing_height", self.crouch.standing_height),
            ("crouch.crouched_height", self.crouch.crouched_height),
            ("crouch.radius", self.crouch.radius),
            ("sprint.cost_divisor", self.sprint.cost_divisor),
        ];
        for (field, value) in positives {
            ensure_positive(field, value)?;
        }

        let finite = [
            ("jump.impulse", self.jump.impulse),
            ("crouch.entry_amplify", self.crouch.entry_amplify),
            ("sprint.boost_scale", self.sprint.boost_scale),
            ("look.rotation_speed[0]", self.look.rotation_speed[0]),
            ("look.rotation_speed[1]", self.look.rotation_speed[1]),
            ("look.pitch_limit_deg", self.look.pitch_limit_deg),
        ];
        for (field, value) in finite {
            ensure_finite(field, value)?;
        }

        for (field, value) in [
            ("jump.cost", self.jump.cost),
            ("crouch.residual_drag", self.crouch.residual_drag),
        ] {
            ensure_finite(field, value)?;
            if value < 0.0 {
                return Err(ConfigError::Negative { field, value });
            }
        }

        if self.crouch.crouched_height >= self.crouch.standing_height {
            return Err(ConfigError::CrouchHeight {
                standing: self.crouch.standing_height,
                crouched: self.crouch.crouched_height,
            });
        }

        Ok(())
    }
}

/// `value` must be finite and strictly positive.
pub(crate) fn ensure_positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}

pub(crate) fn ensure_finite(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NotFinite { field, value })
    }
}

// =============================================================================
// TUNING FILE
// =============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read tuning file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse tuning: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("mass must be positive and finite (got {0})")]
    InvalidMass(f32),
    #[error("{field} must be positive and finite (got {value})")]
    NonPositive { field: &'static str, value: f32 },
    #[error("{field} must be finite (got {value})")]
    NotFinite { field: &'static str, value: f32 },
    #[error("{field} must not be negative (got {value})")]
    Negative { field: &'static str, value: f32 },
    #[error("crouched height {crouched} must be below standing height {standing}")]
    CrouchHeight { standing: f32, crouched: f32 },
}

/// Whole-simulation tuning: one config per variant plus the world floor.
#[derive(Resource, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocomotionTuning {
    pub player: LocomotionConfig,
    pub cell: LocomotionConfig,
    pub floor: FloorConfig,
}

impl Default for LocomotionTuning {
    fn default() -> Self {
        Self {
            player: LocomotionConfig::character(),
            cell: LocomotionConfig::cell(),
            floor: FloorConfig::default(),
        }
    }
}

impl LocomotionTuning {
    /// Parse and validate RON tuning. The slot a config sits in decides its variant;
    /// fields left out of a slot fall back to the cell preset.
    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        let mut tuning: Self = ron::from_str(text)?;
        tuning.player.variant = Variant::Player;
        tuning.cell.variant = Variant::Cell;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.player.validate()?;
        self.cell.validate()?;
        self.floor.validate()
    }

    pub fn config_for(&self, variant: Variant) -> &LocomotionConfig {
        match variant {
            Variant::Player => &self.player,
            Variant::Cell => &self.cell,
        }
    }
}
