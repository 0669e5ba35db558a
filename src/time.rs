//! Frame timing for the render loop.
//!
//! One `Time` value is the single source of truth for the clock handed to the
//! per-frame `render(time)` call: elapsed seconds are monotonically
//! non-decreasing, advance only on `update()`, and freeze while paused. The
//! integrator has no fixed step requirement, it just expects small, roughly
//! regular increments.
//!
//! # Example
//!
//! ```ignore
//! use curlfield::time::Time;
//!
//! let mut time = Time::new();
//!
//! // In your frame loop:
//! let (elapsed, _delta) = time.update();
//! renderer.render(&device, &queue, &mut encoder, &view, elapsed);
//! ```

use std::time::{Duration, Instant};

/// Time tracking for the frame driver.
#[derive(Debug)]
pub struct Time {
    /// When the timer was created.
    start: Instant,
    /// When the last frame occurred.
    last_frame: Instant,
    /// Total elapsed time in seconds (cached for fast access).
    elapsed_secs: f32,
    /// Time since last frame in seconds.
    delta_secs: f32,
    /// Total frames since start.
    frame_count: u64,
    /// Calculated FPS (updated periodically).
    fps: f32,
    /// Frame count at last FPS update.
    fps_frame_count: u64,
    /// Time of last FPS calculation.
    fps_update_time: Instant,
    /// How often to update the FPS estimate.
    fps_update_interval: Duration,
    /// Whether time is paused.
    paused: bool,
    /// Elapsed time spent paused.
    pause_elapsed: Duration,
    /// When the current pause began. Meaningless while running.
    paused_at: Instant,
}

impl Time {
    /// Create a new time tracker starting from now.
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_frame: now,
            elapsed_secs: 0.0,
            delta_secs: 0.0,
            frame_count: 0,
            fps: 0.0,
            fps_frame_count: 0,
            fps_update_time: now,
            fps_update_interval: Duration::from_millis(500),
            paused: false,
            pause_elapsed: Duration::ZERO,
            paused_at: now,
        }
    }

    /// Update timing values. Call once per frame.
    ///
    /// Returns `(elapsed_time, delta_time)` for convenience.
    pub fn update(&mut self) -> (f32, f32) {
        let now = Instant::now();

        if self.paused {
            self.delta_secs = 0.0;
            return (self.elapsed_secs, self.delta_secs);
        }

        self.delta_secs = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;

        let raw_elapsed = now.duration_since(self.start) - self.pause_elapsed;
        self.elapsed_secs = raw_elapsed.as_secs_f32();

        self.frame_count += 1;

        let fps_elapsed = now.duration_since(self.fps_update_time);
        if fps_elapsed >= self.fps_update_interval {
            let frames_since = self.frame_count - self.fps_frame_count;
            self.fps = frames_since as f32 / fps_elapsed.as_secs_f32();
            self.fps_frame_count = self.frame_count;
            self.fps_update_time = now;
        }

        (self.elapsed_secs, self.delta_secs)
    }

    /// Total elapsed time in seconds since start.
    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed_secs
    }

    /// Time since last frame in seconds.
    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta_secs
    }

    /// Total frames since start.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    /// Calculated frames per second.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// Whether time is currently paused.
    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Pause time progression.
    ///
    /// While paused, `delta()` returns 0 and `elapsed()` stops increasing,
    /// so the simulation holds still while the camera stays interactive.
    pub fn pause(&mut self) {
        if !self.paused {
            self.paused = true;
            self.paused_at = Instant::now();
        }
    }

    /// Resume time progression after pausing.
    ///
    /// Only the span since [`pause`](Self::pause) counts as paused; running
    /// time accrued between the last `update()` and the pause is kept.
    pub fn resume(&mut self) {
        if self.paused {
            let now = Instant::now();
            self.pause_elapsed += now.duration_since(self.paused_at);
            self.last_frame = now;
            self.paused = false;
        }
    }

    /// Toggle pause state.
    pub fn toggle_pause(&mut self) {
        if self.paused {
            self.resume();
        } else {
            self.pause();
        }
    }

    /// Reset the timer to its initial state.
    pub fn reset(&mut self) {
        let now = Instant::now();
        self.start = now;
        self.last_frame = now;
        self.elapsed_secs = 0.0;
        self.delta_secs = 0.0;
        self.frame_count = 0;
        self.fps = 0.0;
        self.fps_frame_count = 0;
        self.fps_update_time = now;
        self.paused = false;
        self.pause_elapsed = Duration::ZERO;
        self.paused_at = now;
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_time_new() {
        let time = Time::new();
        assert_eq!(time.frame(), 0);
        assert!(!time.is_paused());
        assert_eq!(time.elapsed(), 0.0);
    }

    #[test]
    fn test_time_update() {
        let mut time = Time::new();
        thread::sleep(Duration::from_millis(10));
        let (elapsed, delta) = time.update();

        assert!(elapsed > 0.0);
        assert!(delta > 0.0);
        assert_eq!(time.frame(), 1);
    }

    #[test]
    fn test_time_monotonic() {
        let mut time = Time::new();
        let mut previous = 0.0;
        for _ in 0..5 {
            thread::sleep(Duration::from_millis(2));
            let (elapsed, _) = time.update();
            assert!(elapsed >= previous);
            previous = elapsed;
        }
    }

    #[test]
    fn test_time_pause() {
        let mut time = Time::new();
        time.update();

        time.pause();
        assert!(time.is_paused());

        let elapsed_before = time.elapsed();
        thread::sleep(Duration::from_millis(10));
        time.update();

        // Elapsed must not increase while paused
        assert_eq!(time.elapsed(), elapsed_before);
        assert_eq!(time.delta(), 0.0);
    }

    #[test]
    fn test_pause_keeps_running_time_before_pause() {
        // Time accrued between the last update() and pause() is running time;
        // only the pause-to-resume span may be discarded.
        let wall = Instant::now();
        let mut time = Time::new();
        thread::sleep(Duration::from_millis(30));
        time.update();
        time.pause();
        thread::sleep(Duration::from_millis(30));
        time.resume();
        let (elapsed, _) = time.update();
        let total = wall.elapsed().as_secs_f32();

        assert!(elapsed >= 0.025, "pre-pause time lost: elapsed = {}", elapsed);
        assert!(
            elapsed <= total - 0.025,
            "paused span counted: elapsed = {}, wall = {}",
            elapsed,
            total
        );
    }

    #[test]
    fn test_time_resume_continues() {
        let mut time = Time::new();
        time.update();
        time.pause();
        thread::sleep(Duration::from_millis(10));
        time.resume();
        thread::sleep(Duration::from_millis(5));
        let (elapsed, delta) = time.update();
        assert!(elapsed > 0.0);
        assert!(delta > 0.0);
    }

    #[test]
    fn test_time_reset() {
        let mut time = Time::new();
        thread::sleep(Duration::from_millis(5));
        time.update();
        assert!(time.frame() > 0);

        time.reset();
        assert_eq!(time.frame(), 0);
        assert_eq!(time.elapsed(), 0.0);
        assert_eq!(time.delta(), 0.0);
    }
}
