//! Test arena: a flat ground slab, one player-variant body and a row of cells.

use std::time::Duration;

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;
use locomotion::{posture_collider, Energy, LocomotionConfig, LocomotionTuning, Locomotor};

/// Half extent of the square ground slab.
pub const GROUND_HALF_EXTENT: f32 = 50.0;
pub const PLAYER_SPAWN: Vec3 = Vec3::new(0.0, 1.5, 0.0);
pub const CELL_COUNT: usize = 4;
pub const CELL_SPACING: f32 = 4.0;
pub const MAX_ENERGY: f32 = 100.0;

/// Physics body and energy pool for a locomotion body.
fn body(config: &LocomotionConfig) -> impl Bundle {
    (
        RigidBody::Dynamic,
        posture_collider(config.crouch.standing_height, config.crouch.radius),
        ColliderMassProperties::Mass(config.mass),
        Velocity::zero(),
        LockedAxes::ROTATION_LOCKED,
        Energy::full(MAX_ENERGY),
    )
}

pub fn setup_world(mut commands: Commands, tuning: Res<LocomotionTuning>) {
    commands.spawn((
        Name::new("Ground"),
        Transform::from_xyz(0.0, -0.5, 0.0),
        RigidBody::Fixed,
        Collider::cuboid(GROUND_HALF_EXTENT, 0.5, GROUND_HALF_EXTENT),
    ));

    commands.spawn((
        Name::new("Player"),
        Transform::from_translation(PLAYER_SPAWN),
        body(&tuning.player),
        tuning.player.clone(),
    ));

    for i in 0..CELL_COUNT {
        let x = (i as f32 + 1.0) * CELL_SPACING;
        commands.spawn((
            Name::new(format!("Cell {}", i)),
            Transform::from_xyz(x, PLAYER_SPAWN.y, -CELL_SPACING),
            body(&tuning.cell),
            tuning.cell.clone(),
        ));
    }

    info!("World ready: ground, 1 player, {} cells", CELL_COUNT);
}

#[derive(Resource)]
pub struct StatusTimer(pub Timer);

impl Default for StatusTimer {
    fn default() -> Self {
        Self(Timer::new(Duration::from_secs(1), TimerMode::Repeating))
    }
}

/// Periodic one-line summary per body.
pub fn log_status(
    time: Res<Time>,
    mut timer: ResMut<StatusTimer>,
    bodies: Query<(&Name, &Transform, &Velocity, &Locomotor, &Energy)>,
) {
    if !timer.0.tick(time.delta()).just_finished() {
        return;
    }

    for (name, transform, velocity, locomotor, energy) in bodies.iter() {
        let p = transform.translation;
        info!(
            "[{:>6.2}s] {}: pos ({:.1}, {:.1}, {:.1}) vel ({:.1}, {:.1}, {:.1}) {:?}/{:?}/{:?} grounded={} energy {:.1}",
            time.elapsed_secs(),
            name,
            p.x,
            p.y,
            p.z,
            velocity.linvel.x,
            velocity.linvel.y,
            velocity.linvel.z,
            locomotor.air_state(),
            locomotor.posture_state(),
            locomotor.movement,
            locomotor.is_grounded(),
            energy.current,
        );
    }
}
