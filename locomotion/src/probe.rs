//! Grounding probe: per-tick contact sensor.
//!
//! A small sphere is cast straight down (world -Y) from the body position. If that
//! misses and the body supports tilted probing (players), a second, shorter cast
//! follows the body's local down axis so tilted bodies on irregular terrain still
//! register contact. Each phase is a single synchronous query; there are no retries.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use crate::config::ProbeConfig;

/// Where a probe cast stopped.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GroundHit {
    /// Collider that was hit, if the backend knows it.
    pub entity: Option<Entity>,
    /// Travel distance of the sphere center along the cast direction.
    pub distance: f32,
    /// Surface normal at the contact (world space).
    pub normal: Vec3,
}

/// Which probe phase produced the contact.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProbePhase {
    WorldDown,
    LocalDown,
}

/// Result of one grounding sample. Only valid for the tick it was taken in.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GroundContact {
    pub is_grounded: bool,
    pub hit: Option<GroundHit>,
    pub phase: Option<ProbePhase>,
}

impl GroundContact {
    pub fn grounded() -> Self {
        Self {
            is_grounded: true,
            hit: None,
            phase: Some(ProbePhase::WorldDown),
        }
    }

    pub fn airborne() -> Self {
        Self::default()
    }

    fn from_hit(hit: GroundHit, phase: ProbePhase) -> Self {
        Self {
            is_grounded: true,
            hit: Some(hit),
            phase: Some(phase),
        }
    }
}

/// Short-range sphere cast against world geometry.
pub trait GroundQuery {
    /// Cast a sphere of `radius` from `origin` along unit `direction`, up to `max_distance`.
    fn cast_sphere(
        &self,
        origin: Vec3,
        radius: f32,
        direction: Vec3,
        max_distance: f32,
    ) -> Option<GroundHit>;
}

/// Sample ground contact for a body at `position` with `orientation`.
pub fn sample_ground(
    query: &impl GroundQuery,
    position: Vec3,
    orientation: Quat,
    config: &ProbeConfig,
    tilted_probe: bool,
) -> GroundContact {
    if let Some(hit) = query.cast_sphere(position, config.radius, Vec3::NEG_Y, config.distance) {
        return GroundContact::from_hit(hit, ProbePhase::WorldDown);
    }

    if !tilted_probe {
        return GroundContact::airborne();
    }

    let local_down = (orientation * Vec3::NEG_Y).normalize_or(Vec3::NEG_Y);
    match query.cast_sphere(position, config.radius, local_down, config.tilted_distance) {
        Some(hit) => GroundContact::from_hit(hit, ProbePhase::LocalDown),
        None => GroundContact::airborne(),
    }
}

// =============================================================================
// RAPIER BACKEND
// =============================================================================

/// Rapier shape-cast backend that ignores the probing body's own collider.
pub struct RapierGround<'c, 'w> {
    context: &'c RapierContext<'w>,
    exclude: Entity,
}

impl<'c, 'w> RapierGround<'c, 'w> {
    pub fn new(context: &'c RapierContext<'w>, exclude: Entity) -> Self {
        Self { context, exclude }
    }
}

impl GroundQuery for RapierGround<'_, '_> {
    fn cast_sphere(
        &self,
        origin: Vec3,
        radius: f32,
        direction: Vec3,
        max_distance: f32,
    ) -> Option<GroundHit> {
        let shape = Collider::ball(radius);
        let options = ShapeCastOptions::with_max_time_of_impact(max_distance);
        let filter = QueryFilter::default()
            .exclude_rigid_body(self.exclude)
            .exclude_collider(self.exclude)
            .exclude_sensors();

        let (entity, hit) = self.context.cast_shape(
            origin,
            Quat::IDENTITY,
            direction,
            &*shape.raw,
            options,
            filter,
        )?;

        Some(GroundHit {
            entity: Some(entity),
            distance: hit.time_of_impact,
            normal: hit.details.map(|d| d.normal2).unwrap_or(Vec3::Y),
        })
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Infinite horizontal plane at `height`.
    pub struct GroundPlane {
        pub height: f32,
    }

    impl GroundQuery for GroundPlane {
        fn cast_sphere(
            &self,
            origin: Vec3,
            radius: f32,
            direction: Vec3,
            max_distance: f32,
        ) -> Option<GroundHit> {
            // Only casts with a downward component can reach a floor below.
            if direction.y >= 0.0 {
                return None;
            }
            let gap = origin.y - radius - self.height;
            let distance = (gap / -direction.y).max(0.0);
            (distance <= max_distance).then_some(GroundHit {
                entity: None,
                distance,
                normal: Vec3::Y,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::GroundPlane;
    use super::*;

    use std::cell::Cell;

    /// Records how many casts were made and never hits anything.
    struct CountingVoid {
        casts: Cell<u32>,
    }

    impl GroundQuery for CountingVoid {
        fn cast_sphere(&self, _: Vec3, _: f32, _: Vec3, _: f32) -> Option<GroundHit> {
            self.casts.set(self.casts.get() + 1);
            None
        }
    }

    #[test]
    fn test_grounded_within_probe_distance() {
        let ground = GroundPlane { height: 0.0 };
        let contact = sample_ground(
            &ground,
            Vec3::new(0.0, 1.0, 0.0),
            Quat::IDENTITY,
            &ProbeConfig::default(),
            false,
        );

        assert!(contact.is_grounded);
        assert_eq!(contact.phase, Some(ProbePhase::WorldDown));
        let hit = contact.hit.unwrap();
        assert!((hit.distance - 0.9).abs() < 1e-5);
    }

    #[test]
    fn test_airborne_beyond_probe_distance() {
        let ground = GroundPlane { height: 0.0 };
        let contact = sample_ground(
            &ground,
            Vec3::new(0.0, 3.0, 0.0),
            Quat::IDENTITY,
            &ProbeConfig::default(),
            true,
        );

        assert!(!contact.is_grounded);
        assert!(contact.hit.is_none());
    }

    #[test]
    fn test_cell_variant_skips_second_phase() {
        let void = CountingVoid { casts: Cell::new(0) };
        let contact = sample_ground(
            &void,
            Vec3::ZERO,
            Quat::IDENTITY,
            &ProbeConfig::default(),
            false,
        );

        assert!(!contact.is_grounded);
        assert_eq!(void.casts.get(), 1);
    }

    #[test]
    fn test_player_variant_probes_twice_on_miss() {
        let void = CountingVoid { casts: Cell::new(0) };
        sample_ground(
            &void,
            Vec3::ZERO,
            Quat::IDENTITY,
            &ProbeConfig::default(),
            true,
        );

        assert_eq!(void.casts.get(), 2);
    }

    /// Reports contact only for casts that lean sideways (a wall or slope beside the body).
    struct SlopeBeside;

    impl GroundQuery for SlopeBeside {
        fn cast_sphere(&self, _: Vec3, _: f32, direction: Vec3, max_distance: f32) -> Option<GroundHit> {
            (direction.x.abs() > 0.1).then_some(GroundHit {
                entity: None,
                distance: max_distance * 0.5,
                normal: Vec3::X,
            })
        }
    }

    #[test]
    fn test_tilted_probe_follows_local_down() {
        let tilted = Quat::from_rotation_z(std::f32::consts::FRAC_PI_4);
        let config = ProbeConfig::default();

        let player = sample_ground(&SlopeBeside, Vec3::ZERO, tilted, &config, true);
        assert!(player.is_grounded);
        assert_eq!(player.phase, Some(ProbePhase::LocalDown));
        let hit = player.hit.unwrap();
        assert!((hit.distance - config.tilted_distance * 0.5).abs() < 1e-5);

        let cell = sample_ground(&SlopeBeside, Vec3::ZERO, tilted, &config, false);
        assert!(!cell.is_grounded);
    }
}
