//! One-shot story phases stored as flags.
//!
//! Each phase owns three flags: `{phase}_ready`, `{phase}_started` and
//! `{phase}_completed`. A completed phase can never be armed again until it
//! is explicitly reset.

use crate::context::GameContext;
use crate::events::GameEvent;
use crate::flags::{FlagError, FlagStore};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseTracker {
    phases: Vec<String>,
}

#[must_use]
pub fn ready_key(phase: &str) -> String {
    format!("{phase}_ready")
}

#[must_use]
pub fn started_key(phase: &str) -> String {
    format!("{phase}_started")
}

#[must_use]
pub fn completed_key(phase: &str) -> String {
    format!("{phase}_completed")
}

impl PhaseTracker {
    pub fn new<I, S>(phases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            phases: phases.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn phases(&self) -> &[String] {
        &self.phases
    }

    #[must_use]
    pub fn contains(&self, phase: &str) -> bool {
        self.phases.iter().any(|known| known == phase)
    }

    #[must_use]
    pub fn is_ready(&self, flags: &dyn FlagStore, phase: &str) -> bool {
        flags.get_bool(&ready_key(phase))
    }

    #[must_use]
    pub fn is_started(&self, flags: &dyn FlagStore, phase: &str) -> bool {
        flags.get_bool(&started_key(phase))
    }

    #[must_use]
    pub fn is_completed(&self, flags: &dyn FlagStore, phase: &str) -> bool {
        flags.get_bool(&completed_key(phase))
    }

    /// The latest ready phase in declaration order, or the first phase.
    #[must_use]
    pub fn current(&self, flags: &dyn FlagStore) -> Option<&str> {
        self.phases
            .iter()
            .rev()
            .find(|phase| self.is_ready(flags, phase))
            .or_else(|| self.phases.first())
            .map(String::as_str)
    }

    /// Mark `phase` ready and announce it. Refused once the phase is completed.
    pub fn arm(&self, ctx: &mut GameContext<'_>, phase: &str) -> bool {
        if !self.contains(phase) {
            log::warn!("phase `{phase}` is not configured; not arming");
            return false;
        }
        if self.is_completed(ctx.flags(), phase) {
            log::debug!("phase `{phase}` already completed; not re-arming");
            return false;
        }
        if self.is_ready(ctx.flags(), phase) {
            return false;
        }
        ctx.set_flag(&ready_key(phase), true);
        ctx.publish(GameEvent::PhaseReady {
            phase: phase.to_string(),
        });
        true
    }

    /// Mark `phase` started. Returns `false` without writing once it is completed.
    ///
    /// # Errors
    ///
    /// Returns an error if the flag cannot be written.
    pub fn start(&self, flags: &mut dyn FlagStore, phase: &str) -> Result<bool, FlagError> {
        if self.is_completed(flags, phase) {
            log::debug!("phase `{phase}` already completed; not starting");
            return Ok(false);
        }
        flags.set_bool(&started_key(phase), true)?;
        Ok(true)
    }

    /// Complete `phase`: drop its ready and started flags and set completed.
    ///
    /// # Errors
    ///
    /// Returns an error if a flag cannot be written.
    pub fn complete(&self, flags: &mut dyn FlagStore, phase: &str) -> Result<(), FlagError> {
        flags.remove(&ready_key(phase))?;
        flags.remove(&started_key(phase))?;
        flags.set_bool(&completed_key(phase), true)
    }

    /// Run `body` the first time `phase` is ready and not yet started.
    pub fn run_once<F>(&self, ctx: &mut GameContext<'_>, phase: &str, body: F) -> bool
    where
        F: FnOnce(&mut GameContext<'_>),
    {
        let flags = ctx.flags();
        if !self.is_ready(flags, phase)
            || self.is_started(flags, phase)
            || self.is_completed(flags, phase)
        {
            return false;
        }
        ctx.set_flag(&started_key(phase), true);
        body(ctx);
        true
    }

    /// # Errors
    ///
    /// Returns an error if a flag cannot be removed.
    pub fn reset(&self, flags: &mut dyn FlagStore, phase: &str) -> Result<(), FlagError> {
        flags.remove(&ready_key(phase))?;
        flags.remove(&started_key(phase))?;
        flags.remove(&completed_key(phase))
    }

    /// # Errors
    ///
    /// Returns the first flag removal failure.
    pub fn reset_all(&self, flags: &mut dyn FlagStore) -> Result<(), FlagError> {
        for phase in &self.phases {
            self.reset(flags, phase)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::World;
    use crate::flags::MemoryFlagStore;

    fn tracker() -> PhaseTracker {
        PhaseTracker::new(["phase1", "phase2", "phase3"])
    }

    #[test]
    fn current_is_latest_ready_phase() {
        let phases = tracker();
        let mut flags = MemoryFlagStore::new();
        assert_eq!(phases.current(&flags), Some("phase1"));
        flags.set_bool("phase3_ready", true).unwrap();
        flags.set_bool("phase2_ready", true).unwrap();
        assert_eq!(phases.current(&flags), Some("phase3"));
    }

    #[test]
    fn completed_phase_cannot_be_rearmed() {
        let phases = tracker();
        let mut world = World::new(Box::new(MemoryFlagStore::new()));
        {
            let mut ctx = world.context(false);
            assert!(phases.arm(&mut ctx, "phase2"));
            assert!(!phases.arm(&mut ctx, "phase2"));
        }
        assert_eq!(world.take_events().len(), 1);
        phases.complete(world.flags_mut(), "phase2").unwrap();
        let mut ctx = world.context(false);
        assert!(!phases.arm(&mut ctx, "phase2"));
        assert!(!phases.is_ready(ctx.flags(), "phase2"));
    }

    #[test]
    fn run_once_runs_exactly_once() {
        let phases = tracker();
        let mut world = World::new(Box::new(MemoryFlagStore::with_flags([(
            "phase1_ready",
            "true",
        )])));
        let mut ctx = world.context(false);
        let mut runs = 0;
        assert!(phases.run_once(&mut ctx, "phase1", |_| runs += 1));
        assert!(!phases.run_once(&mut ctx, "phase1", |_| runs += 1));
        assert_eq!(runs, 1);
        assert!(phases.is_started(ctx.flags(), "phase1"));
    }

    #[test]
    fn complete_drops_ready_and_started() {
        let phases = tracker();
        let mut flags = MemoryFlagStore::with_flags([("phase1_ready", "true")]);
        assert!(phases.start(&mut flags, "phase1").unwrap());
        assert!(phases.is_started(&flags, "phase1"));
        phases.complete(&mut flags, "phase1").unwrap();
        assert!(!phases.is_ready(&flags, "phase1"));
        assert!(!phases.is_started(&flags, "phase1"));
        assert!(phases.is_completed(&flags, "phase1"));
        assert_eq!(flags.get("phase1_started"), None);
        assert_eq!(flags.get("phase1_ready"), None);
    }

    #[test]
    fn completed_phase_cannot_be_started() {
        let phases = tracker();
        let mut flags = MemoryFlagStore::new();
        phases.complete(&mut flags, "phase1").unwrap();
        assert!(!phases.start(&mut flags, "phase1").unwrap());
        assert!(!phases.is_started(&flags, "phase1"));
    }

    #[test]
    fn unknown_phases_are_never_armed() {
        let phases = tracker();
        let mut world = World::new(Box::new(MemoryFlagStore::new()));
        let mut ctx = world.context(false);
        assert!(!phases.arm(&mut ctx, "epilogue"));
        assert!(!ctx.flag("epilogue_ready"));
    }

    #[test]
    fn reset_clears_all_three_flags() {
        let phases = tracker();
        let mut flags = MemoryFlagStore::new();
        flags.set_bool("phase1_ready", true).unwrap();
        phases.start(&mut flags, "phase1").unwrap();
        phases.complete(&mut flags, "phase1").unwrap();
        phases.reset_all(&mut flags).unwrap();
        assert!(flags.snapshot().is_empty());
    }
}
