//! # Animation Driver
//!
//! Advances the loop's time fraction against the host frame clock.
//!
//! ## States
//! - `Stopped(fraction)`: time holds still and may be scrubbed.
//! - `Running`: time advances linearly. When started from a fraction above
//!   zero the driver first plays the remainder of the current loop, over
//!   `period * (1 - fraction)`, then snaps to `0` and repeats `0 -> 1`
//!   forever. Resuming mid-loop therefore never jumps.
//!
//! The driver holds a single advance at a time: `play` replaces whatever
//! advance was running.

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DriverState {
    Stopped {
        fraction: f64,
    },
    Running {
        start_fraction: f64,
        start_millis: f64,
        period_millis: f64,
    },
}

#[derive(Debug, Clone)]
pub struct AnimationDriver {
    state: DriverState,
}

impl Default for AnimationDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimationDriver {
    pub fn new() -> Self {
        Self {
            state: DriverState::Stopped { fraction: 0.0 },
        }
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, DriverState::Running { .. })
    }

    /// Time fraction at `now_millis`, in `[0, 1]`.
    pub fn fraction(&self, now_millis: f64) -> f64 {
        match self.state {
            DriverState::Stopped { fraction } => fraction,
            DriverState::Running {
                start_fraction,
                start_millis,
                period_millis,
            } => {
                if period_millis <= 0.0 || !period_millis.is_finite() {
                    return start_fraction;
                }
                let elapsed = (now_millis - start_millis).max(0.0);
                let lead_in = if start_fraction > 0.0 {
                    period_millis * (1.0 - start_fraction)
                } else {
                    0.0
                };
                if elapsed < lead_in {
                    start_fraction + elapsed / period_millis
                } else {
                    ((elapsed - lead_in) / period_millis).fract()
                }
            }
        }
    }

    /// Starts (or restarts) advancing from the current fraction.
    pub fn play(&mut self, now_millis: f64, period_millis: f64) {
        let fraction = self.fraction(now_millis);
        self.state = DriverState::Running {
            start_fraction: fraction,
            start_millis: now_millis,
            period_millis,
        };
    }

    pub fn pause(&mut self, now_millis: f64) {
        let fraction = self.fraction(now_millis);
        self.state = DriverState::Stopped { fraction };
    }

    /// Sets the fraction directly. Only allowed while stopped.
    pub fn scrub(&mut self, fraction: f64) -> bool {
        if self.is_running() || !(0.0..=1.0).contains(&fraction) {
            return false;
        }
        self.state = DriverState::Stopped { fraction };
        true
    }

    pub fn reset(&mut self) {
        self.state = DriverState::Stopped { fraction: 0.0 };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runs_a_full_loop_from_zero() {
        let mut driver = AnimationDriver::new();
        driver.play(1000.0, 2000.0);
        assert_eq!(driver.fraction(1000.0), 0.0);
        assert!((driver.fraction(1500.0) - 0.25).abs() < 1e-12);
        assert!((driver.fraction(3500.0) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn resumes_mid_loop_without_jumping() {
        let mut driver = AnimationDriver::new();
        driver.scrub(0.75);
        driver.play(0.0, 1000.0);
        assert!((driver.fraction(0.0) - 0.75).abs() < 1e-12);
        assert!((driver.fraction(200.0) - 0.95).abs() < 1e-12);
        // Remainder is 250ms, then a fresh loop begins.
        assert!((driver.fraction(250.0)).abs() < 1e-12);
        assert!((driver.fraction(500.0) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn pause_keeps_fraction_and_blocks_nothing_but_scrub_while_running() {
        let mut driver = AnimationDriver::new();
        driver.play(0.0, 1000.0);
        assert!(!driver.scrub(0.5));
        driver.pause(400.0);
        assert!((driver.fraction(10_000.0) - 0.4).abs() < 1e-12);
        assert!(driver.scrub(0.5));
        assert_eq!(driver.fraction(0.0), 0.5);
        assert!(!driver.scrub(1.5));
    }

    #[test]
    fn replaying_at_a_new_period_preserves_continuity() {
        let mut driver = AnimationDriver::new();
        driver.play(0.0, 1000.0);
        let before = driver.fraction(300.0);
        driver.play(300.0, 500.0);
        assert!((driver.fraction(300.0) - before).abs() < 1e-12);
        assert!((driver.fraction(400.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn replaying_supersedes_the_running_advance() {
        let mut driver = AnimationDriver::new();
        driver.play(0.0, 1000.0);
        driver.play(100.0, 4000.0);
        assert!((driver.fraction(100.0) - 0.1).abs() < 1e-12);
        // Only the 4s advance applies: 0.1 + 400/4000.
        assert!((driver.fraction(500.0) - 0.2).abs() < 1e-12);

        driver.reset();
        assert!(!driver.is_running());
        assert_eq!(driver.fraction(99.0), 0.0);
    }

    #[test]
    fn zero_period_holds_still() {
        let mut driver = AnimationDriver::new();
        driver.play(0.0, 0.0);
        assert_eq!(driver.fraction(5000.0), 0.0);
    }
}
