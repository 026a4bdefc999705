//! Time Management
//!
//! - Stopwatch for per-frame timing metrics
//! - Tick accumulator splitting a variable frame into fixed sub-steps

use std::time::{Duration, Instant};

use smallvec::SmallVec;

/// Stopwatch for measuring elapsed time
#[derive(Debug, Clone)]
pub struct Stopwatch {
    start: Instant,
    elapsed: Duration,
    running: bool,
}

impl Stopwatch {
    /// Create and start a new stopwatch
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            elapsed: Duration::ZERO,
            running: true,
        }
    }

    /// Stop the stopwatch
    pub fn stop(&mut self) {
        if self.running {
            self.elapsed += self.start.elapsed();
            self.running = false;
        }
    }

    /// Reset and restart the stopwatch
    pub fn restart(&mut self) {
        self.elapsed = Duration::ZERO;
        self.start = Instant::now();
        self.running = true;
    }

    /// Get the elapsed time
    pub fn elapsed(&self) -> Duration {
        if self.running {
            self.elapsed + self.start.elapsed()
        } else {
            self.elapsed
        }
    }

    /// Get the elapsed time in milliseconds
    pub fn elapsed_ms(&self) -> f32 {
        self.elapsed().as_secs_f32() * 1000.0
    }

    /// Check if the stopwatch is running
    pub fn is_running(&self) -> bool {
        self.running
    }
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::new()
    }
}

/// Splits a frame's delta time into sub-steps of a fixed tick rate.
///
/// A rate of zero (or less) means "step once with the whole frame".
/// Otherwise every whole tick becomes a step and any leftover time is
/// flushed as a final shorter step, so nothing carries into the next frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickAccumulator {
    rate: f32,
    accumulated: f32,
}

impl TickAccumulator {
    pub fn new(rate: f32) -> Self {
        Self {
            rate: rate.max(0.0),
            accumulated: 0.0,
        }
    }

    /// Seconds per tick; zero when unthrottled
    pub fn rate(&self) -> f32 {
        self.rate
    }

    pub fn set_rate(&mut self, rate: f32) {
        self.rate = if rate.is_finite() { rate.max(0.0) } else { 0.0 };
    }

    /// Step durations for a frame of `delta_time` seconds
    pub fn split(&mut self, delta_time: f32) -> SmallVec<[f32; 8]> {
        let mut steps = SmallVec::new();
        if self.rate <= 0.0 {
            steps.push(delta_time);
            return steps;
        }

        self.accumulated += delta_time;
        while self.accumulated >= self.rate {
            steps.push(self.rate);
            self.accumulated -= self.rate;
        }
        if self.accumulated > 0.0 {
            steps.push(self.accumulated);
        }
        self.accumulated = 0.0;
        steps
    }
}
