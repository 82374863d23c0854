/// Clamp a frame delta to `[0, max_dt]`. Non-finite input counts as no time.
pub fn clamp_dt(dt: f32, max_dt: f32) -> f32 {
    if !dt.is_finite() || dt <= 0.0 {
        return 0.0;
    }
    dt.min(max_dt.max(0.0))
}

/// Turns monotonic timestamps (milliseconds, e.g. `performance.now()`) into
/// clamped per-frame deltas in seconds.
pub struct FrameClock {
    /// Upper bound on a single delta, in seconds.
    max_dt: f32,
    /// Timestamp of the previous tick.
    last_ms: Option<f64>,
}

impl FrameClock {
    pub fn new(max_dt: f32) -> Self {
        Self {
            max_dt,
            last_ms: None,
        }
    }

    /// Record a timestamp and return the seconds since the previous one.
    /// The first tick returns 0; a clock that goes backwards also returns 0.
    pub fn tick(&mut self, now_ms: f64) -> f32 {
        let dt = match self.last_ms {
            Some(last) => ((now_ms - last) / 1000.0) as f32,
            None => 0.0,
        };
        self.last_ms = Some(now_ms);
        clamp_dt(dt, self.max_dt)
    }

    /// Forget the previous timestamp, e.g. after the loop was paused.
    pub fn reset(&mut self) {
        self.last_ms = None;
    }

    pub fn max_dt(&self) -> f32 {
        self.max_dt
    }
}
