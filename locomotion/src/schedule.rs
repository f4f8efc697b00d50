//! Single-shot delayed checks driven by the tick loop.
//!
//! A [`DelayedCheck`] holds at most one pending timer. Arming replaces whatever was
//! pending in the same call, so a stale check can never fire after a newer one was
//! scheduled.

use std::time::Duration;

use bevy::prelude::*;

/// Identifies one armed check. Each arm produces a fresh handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CheckHandle(u32);

#[derive(Clone, Debug)]
struct PendingCheck {
    handle: CheckHandle,
    timer: Timer,
}

/// Cancellable one-shot timer slot.
#[derive(Clone, Debug, Default)]
pub struct DelayedCheck {
    pending: Option<PendingCheck>,
    next_id: u32,
}

impl DelayedCheck {
    /// Schedule a check `delay` from now, cancelling any pending one.
    pub fn arm(&mut self, delay: Duration) -> CheckHandle {
        let handle = CheckHandle(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.pending = Some(PendingCheck {
            handle,
            timer: Timer::new(delay, TimerMode::Once),
        });
        handle
    }

    /// Drop the pending check, returning its handle if there was one.
    pub fn cancel(&mut self) -> Option<CheckHandle> {
        self.pending.take().map(|p| p.handle)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending_handle(&self) -> Option<CheckHandle> {
        self.pending.as_ref().map(|p| p.handle)
    }

    /// Advance the pending timer. Returns the handle on the tick it fires; the slot is
    /// empty afterwards.
    pub fn tick(&mut self, delta: Duration) -> Option<CheckHandle> {
        let pending = self.pending.as_mut()?;
        if !pending.timer.tick(delta).just_finished() {
            return None;
        }
        self.cancel()
    }
}
