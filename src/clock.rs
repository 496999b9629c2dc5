use web_time::Instant;

/// Frame timestamp source.
///
/// Timestamps are milliseconds since the clock was created, the same shape as the value
/// browsers pass to animation-frame callbacks. The clock is started when the app launches,
/// so the first frame's timestamp includes the time spent creating the window and device.
#[derive(Debug, Clone)]
pub struct FrameClock {
    origin: Instant,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    pub fn starting_at(origin: Instant) -> Self {
        Self { origin }
    }

    /// Timestamp of `instant`, in milliseconds after the origin. Instants before the origin
    /// map to zero.
    pub fn timestamp_ms(&self, instant: Instant) -> f64 {
        instant.saturating_duration_since(self.origin).as_secs_f64() * 1000.0
    }

    /// Returns the timestamp for a new frame.
    pub fn tick(&self) -> f64 {
        self.timestamp_ms(Instant::now())
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
