//! Time management utilities

use std::time::{Duration, Instant};

/// Frame clock driving the elapsed-time uniform
///
/// Runs either against the wall clock (`tick`) or with a fixed step
/// (`advance`) for headless rendering, where frame times must be reproducible.
pub struct Timer {
    last_frame: Instant,
    delta_time: f32,
    total_time: f32,
    frame_count: u64,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    /// Create a new timer
    pub fn new() -> Self {
        Self {
            last_frame: Instant::now(),
            delta_time: 0.0,
            total_time: 0.0,
            frame_count: 0,
        }
    }

    /// Update the timer from the wall clock (call once per frame)
    pub fn tick(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_frame);
        self.last_frame = now;
        self.advance(elapsed);
    }

    /// Advance the timer by a fixed step
    pub fn advance(&mut self, step: Duration) {
        self.delta_time = step.as_secs_f32();
        self.total_time += self.delta_time;
        self.frame_count += 1;
    }

    /// Time since the last frame in seconds
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    /// Monotonic seconds since the timer was created
    pub fn total_time(&self) -> f32 {
        self.total_time
    }

    /// Number of frames advanced so far
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Average FPS since timer creation
    pub fn average_fps(&self) -> f32 {
        if self.total_time > 0.0 {
            self.frame_count as f32 / self.total_time
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_step_accumulates() {
        let mut timer = Timer::new();
        for _ in 0..30 {
            timer.advance(Duration::from_millis(100));
        }
        assert_eq!(timer.frame_count(), 30);
        assert!((timer.total_time() - 3.0).abs() < 1e-4);
        assert!((timer.average_fps() - 10.0).abs() < 1e-3);
    }

    #[test]
    fn test_wall_clock_tick_counts_frames() {
        let mut timer = Timer::new();
        assert_eq!(timer.average_fps(), 0.0);
        timer.tick();
        timer.tick();
        assert_eq!(timer.frame_count(), 2);
        assert!(timer.delta_time() >= 0.0);
        assert!(timer.total_time() >= timer.delta_time());
    }
}
