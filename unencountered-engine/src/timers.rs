//! Delayed commands tied to the scene that scheduled them.
//!
//! Every scheduled command records the scene generation it was created in.
//! Once the director moves to a new scene, older timers are dropped instead of
//! firing into a scene that no longer exists.

use crate::context::Command;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Debug, Clone, PartialEq)]
struct Pending {
    id: TimerId,
    remaining_ms: f64,
    generation: u64,
    command: Command,
}

#[derive(Debug, Default)]
pub struct Timers {
    pending: Vec<Pending>,
    next_id: u64,
}

impl Timers {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, delay_ms: f64, command: Command, generation: u64) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        self.pending.push(Pending {
            id,
            remaining_ms: delay_ms.max(0.0),
            generation,
            command,
        });
        id
    }

    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|timer| timer.id != id);
        before != self.pending.len()
    }

    /// Drop every timer scheduled before `generation`. Returns how many were dropped.
    pub fn cancel_before(&mut self, generation: u64) -> usize {
        let before = self.pending.len();
        self.pending.retain(|timer| timer.generation >= generation);
        before - self.pending.len()
    }

    /// Advance time and return the commands that came due, in schedule order.
    ///
    /// Timers from any generation other than `live_generation` are discarded.
    pub fn advance(&mut self, dt_ms: f64, live_generation: u64) -> Vec<Command> {
        let mut fired = Vec::new();
        let mut kept = Vec::with_capacity(self.pending.len());
        for mut timer in self.pending.drain(..) {
            if timer.generation != live_generation {
                log::debug!("dropping stale timer {:?}", timer.id);
                continue;
            }
            timer.remaining_ms -= dt_ms;
            if timer.remaining_ms <= 0.0 {
                fired.push(timer.command);
            } else {
                kept.push(timer);
            }
        }
        self.pending = kept;
        fired
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
