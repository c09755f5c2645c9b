//! Frame schedulers.
//!
//! A [`FrameScheduler`] is the host's "call me on the next display refresh"
//! primitive. [`Engine::run`](crate::engine::Engine::run) asks it for the
//! next frame, advances the clock to the returned timestamp and steps.
//! Returning `None` means the host is gone (window closed, frame budget
//! spent) and ends the run.

use std::thread;
use std::time::{Duration, Instant};

use log::debug;

pub trait FrameScheduler {
    /// Block until the next frame is due and return its timestamp in
    /// milliseconds, or `None` when no more frames will come.
    fn next_frame(&mut self) -> Option<f64>;
}

/// Headless scheduler producing synthetic timestamps at a fixed frame
/// duration. Never sleeps.
#[derive(Debug, Clone)]
pub struct ManualScheduler {
    frame_duration_ms: f64,
    frame_limit: Option<u64>,
    frames: u64,
}

impl ManualScheduler {
    pub fn new(frame_duration_ms: f64) -> Self {
        Self {
            frame_duration_ms,
            frame_limit: None,
            frames: 0,
        }
    }

    /// Scheduler ticking at `fps` frames per second.
    pub fn at_fps(fps: u32) -> Self {
        Self::new(1_000.0 / f64::from(fps.max(1)))
    }

    /// Stop yielding frames after `limit` of them.
    pub fn with_frame_limit(mut self, limit: u64) -> Self {
        self.frame_limit = Some(limit);
        self
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl FrameScheduler for ManualScheduler {
    fn next_frame(&mut self) -> Option<f64> {
        if self.frame_limit.is_some_and(|limit| self.frames >= limit) {
            return None;
        }
        let timestamp = self.frames as f64 * self.frame_duration_ms;
        self.frames += 1;
        Some(timestamp)
    }
}

/// Wall-clock scheduler that sleeps until the next frame of a target rate.
#[derive(Debug, Clone)]
pub struct FixedRateScheduler {
    frame_duration: Duration,
    started: Instant,
    next_due: Instant,
    frame_limit: Option<u64>,
    frames: u64,
}

impl FixedRateScheduler {
    pub fn new(target_fps: u32) -> Self {
        let frame_duration = Duration::from_secs_f64(1.0 / f64::from(target_fps.max(1)));
        let now = Instant::now();
        debug!("fixed rate scheduler at {target_fps} fps ({frame_duration:?} per frame)");
        Self {
            frame_duration,
            started: now,
            next_due: now,
            frame_limit: None,
            frames: 0,
        }
    }

    pub fn with_frame_limit(mut self, limit: u64) -> Self {
        self.frame_limit = Some(limit);
        self
    }
}

impl FrameScheduler for FixedRateScheduler {
    fn next_frame(&mut self) -> Option<f64> {
        if self.frame_limit.is_some_and(|limit| self.frames >= limit) {
            return None;
        }
        let now = Instant::now();
        if self.next_due > now {
            thread::sleep(self.next_due - now);
        }
        let frame_time = Instant::now();
        // a late frame does not try to catch up
        self.next_due = frame_time.max(self.next_due) + self.frame_duration;
        self.frames += 1;
        Some(frame_time.duration_since(self.started).as_secs_f64() * 1_000.0)
    }
}
