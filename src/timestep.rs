//! Frame timing for the fixed-timestep loop.
//!
//! `FrameClock` measures wall-clock time between loop iterations,
//! `FixedTimestep` turns that into a whole number of constant-size simulation
//! steps, and `FpsCounter` produces the once-per-second title statistics.

use std::time::{Duration, Instant};

/// Slack when comparing the accumulator against the step, so that a sequence
/// of deltas summing to exactly one interval is not lost to rounding.
const ACCUMULATOR_TOLERANCE: f64 = 1e-9;

/// Step used when the configured one is unusable.
pub const DEFAULT_INTERVAL: f64 = 1.0 / 60.0;

/// Whether `interval` can drive the loop. An interval at or below the
/// accumulator tolerance would step forever without any time passing.
pub fn is_usable_interval(interval: f64) -> bool {
    interval.is_finite() && interval > ACCUMULATOR_TOLERANCE
}

/// Monotonic stopwatch between loop iterations.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Instant,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            last: Instant::now(),
        }
    }

    /// Seconds since the previous tick (or construction).
    pub fn tick(&mut self) -> f64 {
        self.tick_at(Instant::now())
    }

    pub fn tick_at(&mut self, now: Instant) -> f64 {
        let elapsed = now.saturating_duration_since(self.last);
        self.last = now;
        elapsed.as_secs_f64()
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Accumulates elapsed time and releases it in fixed-size steps.
///
/// Usage per loop iteration:
/// ```ignore
/// timestep.accumulate(clock.tick());
/// while timestep.step() {
///     scene.update(events, timestep.interval());
/// }
/// ```
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    interval: f64,
    accumulator: f64,
    /// 0 means unbounded.
    max_steps: u32,
    steps_this_frame: u32,
}

impl FixedTimestep {
    pub fn new(interval: f64, max_steps: u32) -> Self {
        let interval = if is_usable_interval(interval) {
            interval
        } else {
            log::warn!("Unusable update interval {}s, using 1/60s", interval);
            DEFAULT_INTERVAL
        };
        Self {
            interval,
            accumulator: 0.0,
            max_steps,
            steps_this_frame: 0,
        }
    }

    pub fn interval(&self) -> f64 {
        self.interval
    }

    pub fn accumulated(&self) -> f64 {
        self.accumulator
    }

    /// Add elapsed wall-clock time and start a new frame's step budget.
    pub fn accumulate(&mut self, seconds: f64) {
        self.accumulator += seconds.max(0.0);
        self.steps_this_frame = 0;
    }

    /// Consume one interval if enough time has accumulated.
    ///
    /// Once the per-frame bound is reached, whole intervals still pending are
    /// dropped and only the sub-interval remainder carries over.
    pub fn step(&mut self) -> bool {
        if self.accumulator + ACCUMULATOR_TOLERANCE < self.interval {
            return false;
        }

        if self.max_steps != 0 && self.steps_this_frame >= self.max_steps {
            let dropped = (self.accumulator / self.interval).floor();
            log::debug!(
                "Update budget of {} reached, dropping {} pending steps",
                self.max_steps,
                dropped
            );
            self.accumulator %= self.interval;
            return false;
        }

        self.accumulator = (self.accumulator - self.interval).max(0.0);
        self.steps_this_frame += 1;
        true
    }
}

/// Frames-per-second sampler, reporting once per second.
#[derive(Debug, Clone)]
pub struct FpsCounter {
    frames: u32,
    window_start: Instant,
    last_frame: Instant,
}

/// One second's worth of frame statistics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FpsSample {
    pub fps: f32,
    pub frame_ms: f32,
}

impl FpsCounter {
    pub fn new(now: Instant) -> Self {
        Self {
            frames: 0,
            window_start: now,
            last_frame: now,
        }
    }

    /// Record a presented frame; returns a sample when a second has passed.
    pub fn record_frame(&mut self, now: Instant) -> Option<FpsSample> {
        let frame_time = now.saturating_duration_since(self.last_frame);
        self.last_frame = now;
        self.frames += 1;

        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed < Duration::from_secs(1) {
            return None;
        }

        let sample = FpsSample {
            fps: self.frames as f32 / elapsed.as_secs_f32(),
            frame_ms: frame_time.as_secs_f32() * 1000.0,
        };
        self.frames = 0;
        self.window_start = now;
        Some(sample)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIXTY_HZ: f64 = 1.0 / 60.0;

    fn count_steps(timestep: &mut FixedTimestep) -> u32 {
        let mut steps = 0;
        while timestep.step() {
            steps += 1;
        }
        steps
    }

    #[test]
    fn deltas_summing_to_one_interval_give_exactly_one_step() {
        let sequences: [&[f64]; 4] = [
            &[SIXTY_HZ],
            &[SIXTY_HZ / 2.0, SIXTY_HZ / 2.0],
            &[SIXTY_HZ / 3.0, SIXTY_HZ / 3.0, SIXTY_HZ / 3.0],
            &[0.01, SIXTY_HZ - 0.01],
        ];

        for deltas in sequences {
            let mut timestep = FixedTimestep::new(SIXTY_HZ, 0);
            let mut steps = 0;
            for &delta in deltas {
                timestep.accumulate(delta);
                steps += count_steps(&mut timestep);
            }
            assert_eq!(steps, 1, "sequence {deltas:?}");
        }
    }

    #[test]
    fn short_frames_do_not_step() {
        let mut timestep = FixedTimestep::new(SIXTY_HZ, 0);
        timestep.accumulate(SIXTY_HZ * 0.9);
        assert!(!timestep.step());
        assert!((timestep.accumulated() - SIXTY_HZ * 0.9).abs() < 1e-12);
    }

    #[test]
    fn long_frame_catches_up_with_multiple_steps() {
        let mut timestep = FixedTimestep::new(SIXTY_HZ, 0);
        timestep.accumulate(SIXTY_HZ * 3.5);
        assert_eq!(count_steps(&mut timestep), 3);
        assert!((timestep.accumulated() - SIXTY_HZ * 0.5).abs() < 1e-9);
    }

    #[test]
    fn catch_up_is_bounded_and_backlog_dropped() {
        let mut timestep = FixedTimestep::new(SIXTY_HZ, 4);
        // A two second stall, e.g. sitting on a breakpoint.
        timestep.accumulate(2.0 + SIXTY_HZ * 0.25);
        assert_eq!(count_steps(&mut timestep), 4);
        assert!(timestep.accumulated() < SIXTY_HZ);

        // The next ordinary frame gets a fresh budget.
        timestep.accumulate(SIXTY_HZ);
        assert_eq!(count_steps(&mut timestep), 1);
    }

    #[test]
    fn degenerate_intervals_fall_back_to_sixty_hz() {
        for interval in [0.0, -1.0, 1e-10, ACCUMULATOR_TOLERANCE, f64::NAN, f64::INFINITY] {
            let mut timestep = FixedTimestep::new(interval, 0);
            assert_eq!(timestep.interval(), DEFAULT_INTERVAL, "interval {interval}");

            // No elapsed time means no steps, even without a catch-up bound.
            timestep.accumulate(0.0);
            assert!(!timestep.step(), "interval {interval}");
        }
    }

    #[test]
    fn usable_interval_bounds() {
        assert!(is_usable_interval(SIXTY_HZ));
        assert!(is_usable_interval(1e-6));
        assert!(!is_usable_interval(1e-9));
        assert!(!is_usable_interval(0.0));
        assert!(!is_usable_interval(f64::NAN));
    }

    #[test]
    fn negative_elapsed_is_ignored() {
        let mut timestep = FixedTimestep::new(SIXTY_HZ, 0);
        timestep.accumulate(-1.0);
        assert_eq!(timestep.accumulated(), 0.0);
    }

    #[test]
    fn clock_measures_between_ticks() {
        let start = Instant::now();
        let mut clock = FrameClock { last: start };
        let elapsed = clock.tick_at(start + Duration::from_millis(250));
        assert!((elapsed - 0.25).abs() < 1e-9);
        assert_eq!(clock.tick_at(start), 0.0);
    }

    #[test]
    fn fps_reports_once_per_second() {
        let start = Instant::now();
        let mut fps = FpsCounter::new(start);
        let frame = Duration::from_millis(10);

        let mut samples = Vec::new();
        for i in 1..=150 {
            if let Some(sample) = fps.record_frame(start + frame * i) {
                samples.push(sample);
            }
        }

        assert_eq!(samples.len(), 1);
        assert!((samples[0].fps - 100.0).abs() < 0.01);
        assert!((samples[0].frame_ms - 10.0).abs() < 0.01);
    }
}
