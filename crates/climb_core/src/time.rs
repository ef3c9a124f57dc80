//! Fixed-timestep clock and the play-session countdown.
//!
//! The simulation advances in whole 60 Hz ticks. Wall-clock time is fed into
//! an accumulator and drained one `fixed_dt` slice at a time; every movement
//! constant in the game is expressed per tick, not per second.

use std::time::Instant;

pub const TICKS_PER_SECOND: f64 = 60.0;

pub struct TimeState {
    pub fixed_dt: f64,
    pub max_accumulator: f64,
    accumulator: f64,
    pub total_time: f64,
    pub fixed_step_count: u64,
    pub frame_count: u64,
    pub steps_this_frame: u32,
    pub real_dt: f64,
    last_instant: Instant,
    pub interpolation_alpha: f64,
}

impl TimeState {
    pub fn new() -> Self {
        Self {
            fixed_dt: 1.0 / TICKS_PER_SECOND,
            max_accumulator: 0.25,
            accumulator: 0.0,
            total_time: 0.0,
            fixed_step_count: 0,
            frame_count: 0,
            steps_this_frame: 0,
            real_dt: 0.0,
            last_instant: Instant::now(),
            interpolation_alpha: 0.0,
        }
    }

    /// Measure the wall-clock delta since the last frame and feed it in.
    pub fn begin_frame(&mut self) {
        let now = Instant::now();
        let real_dt = now.duration_since(self.last_instant).as_secs_f64();
        self.last_instant = now;
        self.advance(real_dt);
    }

    /// Start a frame with an explicit delta instead of the wall clock.
    pub fn advance(&mut self, real_dt: f64) {
        self.real_dt = real_dt.max(0.0);

        // Spiral-of-death cap
        if self.real_dt > self.max_accumulator {
            log::warn!(
                "Frame took {:.1}ms, capping accumulator to {}ms",
                self.real_dt * 1000.0,
                self.max_accumulator * 1000.0
            );
            self.real_dt = self.max_accumulator;
        }

        self.accumulator += self.real_dt;
        self.steps_this_frame = 0;
        self.frame_count += 1;
    }

    pub fn should_step(&mut self) -> bool {
        if self.accumulator >= self.fixed_dt {
            self.accumulator -= self.fixed_dt;
            self.total_time += self.fixed_dt;
            self.fixed_step_count += 1;
            self.steps_this_frame += 1;
            true
        } else {
            false
        }
    }

    pub fn end_frame(&mut self) {
        self.interpolation_alpha = self.accumulator / self.fixed_dt;
    }
}

impl Default for TimeState {
    fn default() -> Self {
        Self::new()
    }
}

/// Countdown for one play session. Elapsed time is supplied by the caller
/// (normally `TimeState::total_time`), so the timer itself holds no clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionTimer {
    pub limit_secs: f64,
}

impl SessionTimer {
    pub fn new(limit_secs: f64) -> Self {
        Self { limit_secs }
    }

    pub fn remaining(&self, elapsed_secs: f64) -> f64 {
        (self.limit_secs - elapsed_secs).max(0.0)
    }

    pub fn is_expired(&self, elapsed_secs: f64) -> bool {
        self.remaining(elapsed_secs) <= 0.0
    }

    /// HUD label, e.g. `TIME: 042s`.
    pub fn label(&self, elapsed_secs: f64) -> String {
        format!("TIME: {:03}s", self.remaining(elapsed_secs) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_accumulates_whole_steps() {
        let mut time = TimeState::new();
        time.advance(time.fixed_dt * 2.5);
        let mut steps = 0;
        while time.should_step() {
            steps += 1;
        }
        time.end_frame();
        assert_eq!(steps, 2);
        assert_eq!(time.steps_this_frame, 2);
        assert_eq!(time.fixed_step_count, 2);
        assert!((time.interpolation_alpha - 0.5).abs() < 1e-9);
    }

    #[test]
    fn advance_caps_long_frames() {
        let mut time = TimeState::new();
        time.advance(5.0);
        assert!((time.real_dt - time.max_accumulator).abs() < f64::EPSILON);
        let mut steps = 0;
        while time.should_step() {
            steps += 1;
        }
        assert_eq!(steps, 15);
    }

    #[test]
    fn negative_delta_is_ignored() {
        let mut time = TimeState::new();
        time.advance(-1.0);
        assert!(!time.should_step());
        assert_eq!(time.frame_count, 1);
    }

    #[test]
    fn session_timer_counts_down_and_clamps() {
        let timer = SessionTimer::new(300.0);
        assert!((timer.remaining(10.0) - 290.0).abs() < f64::EPSILON);
        assert_eq!(timer.remaining(400.0), 0.0);
        assert!(!timer.is_expired(299.9));
        assert!(timer.is_expired(300.0));
    }

    #[test]
    fn session_timer_label_is_zero_padded() {
        let timer = SessionTimer::new(300.0);
        assert_eq!(timer.label(258.4), "TIME: 041s");
        assert_eq!(timer.label(1000.0), "TIME: 000s");
    }
}
