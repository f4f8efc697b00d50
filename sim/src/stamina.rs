//! Energy owner for the simulation: passive regeneration and debit tracing.

use bevy::prelude::*;
use locomotion::{DebitCause, Energy, EnergyDebited};

/// Energy restored per second while not spending.
#[derive(Resource, Clone, Copy, Debug)]
pub struct EnergyRegen {
    pub per_second: f32,
}

impl Default for EnergyRegen {
    fn default() -> Self {
        Self { per_second: 2.0 }
    }
}

/// Running totals of what locomotion spent, by cause.
#[derive(Resource, Default, Debug)]
pub struct SpendLedger {
    pub jump: f32,
    pub sprint: f32,
    pub jumps: u32,
}

pub fn regenerate_energy(time: Res<Time>, regen: Res<EnergyRegen>, mut pools: Query<&mut Energy>) {
    let amount = regen.per_second * time.delta_secs();
    for mut energy in pools.iter_mut() {
        if energy.current < energy.max {
            energy.restore(amount);
        }
    }
}

pub fn record_debits(mut debits: MessageReader<EnergyDebited>, mut ledger: ResMut<SpendLedger>) {
    for debit in debits.read() {
        match debit.cause {
            DebitCause::Jump => {
                ledger.jump += debit.amount;
                ledger.jumps += 1;
                debug!("{:?} spent {:.2} energy on a jump", debit.entity, debit.amount);
            }
            DebitCause::Sprint => ledger.sprint += debit.amount,
        }
    }
}
