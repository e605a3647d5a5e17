//! Frame timing for the `requestAnimationFrame` loop.

/// Longest step fed to the engine. Tabs left in the background resume with
/// one short step instead of replaying seconds of game time.
pub const MAX_FRAME_MS: f64 = 100.0;

/// Turns absolute animation timestamps into clamped frame deltas.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameClock {
    last: Option<f64>,
}

impl FrameClock {
    #[must_use]
    pub const fn new() -> Self {
        Self { last: None }
    }

    /// Milliseconds since the previous tick. The first tick yields zero.
    pub fn tick(&mut self, now_ms: f64) -> f64 {
        let delta = self
            .last
            .map_or(0.0, |last| (now_ms - last).clamp(0.0, MAX_FRAME_MS));
        self.last = Some(now_ms);
        delta
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    #[test]
    fn first_tick_is_zero() {
        let mut clock = FrameClock::new();
        assert!(clock.tick(1234.0).abs() < f64::EPSILON);
        assert!((clock.tick(1250.0) - 16.0).abs() < f64::EPSILON);
    }

    #[test]
    fn long_gaps_and_clock_skew_are_clamped() {
        let mut clock = FrameClock::new();
        clock.tick(0.0);
        assert!((clock.tick(5_000.0) - MAX_FRAME_MS).abs() < f64::EPSILON);
        assert!(clock.tick(4_000.0).abs() < f64::EPSILON);
        clock.reset();
        assert!(clock.tick(9_000.0).abs() < f64::EPSILON);
    }
}
