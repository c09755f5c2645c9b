/// Frame clock, advanced once per frame from the scheduler's timestamps.
///
/// Timestamps are milliseconds on the scheduler's own clock. The first frame
/// has a zero delta.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WorldTime {
    /// Milliseconds since the first frame.
    pub elapsed_ms: f64,
    /// Milliseconds since the previous frame.
    pub delta_ms: f64,
    pub frame_count: u64,
    /// Timestamp of the latest frame.
    pub now_ms: f64,
    last_timestamp: Option<f64>,
}

impl WorldTime {
    pub fn advance_to(&mut self, timestamp_ms: f64) {
        let delta = match self.last_timestamp {
            Some(last) => (timestamp_ms - last).max(0.0),
            None => 0.0,
        };
        self.delta_ms = delta;
        self.elapsed_ms += delta;
        self.now_ms = timestamp_ms;
        self.frame_count += 1;
        self.last_timestamp = Some(timestamp_ms);
    }

    pub fn delta_seconds(&self) -> f64 {
        self.delta_ms / 1_000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_frame_has_no_delta() {
        let mut time = WorldTime::default();
        time.advance_to(500.0);
        assert_eq!(time.delta_ms, 0.0);
        assert_eq!(time.elapsed_ms, 0.0);
        assert_eq!(time.now_ms, 500.0);
        assert_eq!(time.frame_count, 1);
    }

    #[test]
    fn later_frames_accumulate() {
        let mut time = WorldTime::default();
        time.advance_to(0.0);
        time.advance_to(16.0);
        time.advance_to(40.0);
        assert_eq!(time.delta_ms, 24.0);
        assert_eq!(time.elapsed_ms, 40.0);
        assert_eq!(time.frame_count, 3);
        assert!((time.delta_seconds() - 0.024).abs() < 1e-12);
    }

    #[test]
    fn clock_going_backwards_is_clamped() {
        let mut time = WorldTime::default();
        time.advance_to(100.0);
        time.advance_to(90.0);
        assert_eq!(time.delta_ms, 0.0);
        assert_eq!(time.elapsed_ms, 0.0);
    }
}
