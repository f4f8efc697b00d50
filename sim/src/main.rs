//! Headless locomotion simulation.
//!
//! Runs Rapier and the locomotion systems on a fixed tick with no rendering, driving
//! the bodies from a scripted intent timeline.
//!
//! Environment:
//! - `LOCOMOTION_TUNING`: path to a RON tuning file (built-in presets otherwise)
//! - `LOCOMOTION_SCRIPT`: path to a RON intent script (built-in script otherwise)
//! - `SIM_SECONDS`: exit after this many simulated seconds (runs forever otherwise)

mod script;
mod stamina;
mod world;

use std::time::Duration;

use bevy::app::ScheduleRunnerPlugin;
use bevy::prelude::*;
use bevy_rapier3d::prelude::*;
use locomotion::{LocomotionPlugin, LocomotionSet, LocomotionTuning};

use script::IntentScript;
use stamina::{EnergyRegen, SpendLedger};
use world::StatusTimer;

pub const FIXED_TIMESTEP_HZ: f64 = 50.0;

const TUNING_ENV: &str = "LOCOMOTION_TUNING";
const SCRIPT_ENV: &str = "LOCOMOTION_SCRIPT";
const DURATION_ENV: &str = "SIM_SECONDS";

pub fn tick_duration() -> Duration {
    Duration::from_secs_f64(1.0 / FIXED_TIMESTEP_HZ)
}

/// Exit once the configured run time has elapsed.
#[derive(Resource)]
struct RunFor(f32);

fn stop_when_done(
    time: Res<Time>,
    run_for: Res<RunFor>,
    ledger: Res<SpendLedger>,
    mut exit: MessageWriter<AppExit>,
) {
    if time.elapsed_secs() >= run_for.0 {
        info!(
            "Simulated {:.1}s: {} jumps ({:.1} energy), {:.2} energy sprinting",
            time.elapsed_secs(),
            ledger.jumps,
            ledger.jump,
            ledger.sprint
        );
        exit.write(AppExit::Success);
    }
}

fn main() {
    let mut app = App::new();

    // Run the main loop at the fixed rate so every frame is one physics tick.
    app.add_plugins(MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(tick_duration())));
    app.add_plugins(bevy::log::LogPlugin::default());
    app.add_plugins(TransformPlugin);
    app.insert_resource(Time::<Fixed>::from_hz(FIXED_TIMESTEP_HZ));

    let tuning = match std::env::var(TUNING_ENV) {
        Ok(path) => LocomotionTuning::load(&path),
        Err(_) => Ok(LocomotionTuning::default()),
    };
    let tuning = match tuning {
        Ok(tuning) => tuning,
        Err(err) => {
            error!("Invalid locomotion tuning: {}", err);
            return;
        }
    };

    let script = match std::env::var(SCRIPT_ENV) {
        Ok(path) => IntentScript::load(&path),
        Err(_) => Ok(IntentScript::default()),
    };
    let script = match script {
        Ok(script) => script,
        Err(err) => {
            error!("Invalid intent script: {}", err);
            return;
        }
    };

    // Physics steps in FixedPostUpdate, after the locomotion writes.
    app.add_plugins(RapierPhysicsPlugin::<NoUserData>::default().in_fixed_schedule());
    app.add_plugins(LocomotionPlugin {
        floor: tuning.floor.clone(),
    });

    app.insert_resource(tuning);
    app.insert_resource(script);
    app.init_resource::<EnergyRegen>();
    app.init_resource::<SpendLedger>();
    app.init_resource::<StatusTimer>();

    app.add_systems(Startup, world::setup_world);
    app.add_systems(
        FixedUpdate,
        (
            script::play_script
                .after(LocomotionSet::Activate)
                .before(LocomotionSet::Look),
            (stamina::regenerate_energy, stamina::record_debits)
                .chain()
                .after(LocomotionSet::Step),
        ),
    );
    app.add_systems(FixedPostUpdate, world::log_status.after(LocomotionSet::Observe));

    if let Some(seconds) = std::env::var(DURATION_ENV)
        .ok()
        .and_then(|s| s.parse::<f32>().ok())
    {
        app.insert_resource(RunFor(seconds));
        app.add_systems(Update, stop_when_done);
    }

    info!("Starting locomotion sim at {} Hz", FIXED_TIMESTEP_HZ);
    app.run();
}
