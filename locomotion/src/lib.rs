//! Physics-driven locomotion for rigid-body characters.
//!
//! Each tick a body is probed for ground contact, its directional intent is turned
//! into a velocity, and jump/crouch/sprint requests are gated by contact and an
//! energy pool. All writes to the body velocity are collected and committed once.
//!
//! Modules:
//! - [`config`]: tuning, variant presets, RON loading and validation
//! - [`probe`]: two-phase sphere-cast grounding probe
//! - [`composer`]: intent -> velocity, airtime branching, momentum helpers
//! - [`jump`]: jump/landing state machine
//! - [`posture`]: crouch toggle and crouch drag
//! - [`sprint`]: energy-throttled sprint modifier
//! - [`energy`]: energy pool interface and debit messages
//! - [`controller`]: one full tick for one body
//! - [`plugin`]: Bevy systems and schedule wiring

pub mod composer;
pub mod config;
pub mod controller;
pub mod energy;
pub mod floor;
pub mod jump;
pub mod look;
pub mod plugin;
pub mod posture;
pub mod probe;
pub mod schedule;
pub mod sprint;
pub mod velocity;

pub use composer::MomentumDirection;
pub use config::{ConfigError, LocomotionConfig, LocomotionTuning, Variant};
pub use controller::{step_locomotion, LocomotionInput, Locomotor, MovementState, TickReport};
pub use energy::{DebitCause, Energy, EnergyDebited, EnergyPool};
pub use floor::{FloorConfig, WorldFloor};
pub use jump::AirState;
pub use look::LookAngles;
pub use plugin::{posture_collider, ActivationError, LocomotionActive, LocomotionPlugin, LocomotionSet};
pub use posture::PostureState;
