//! Player clock with clamped frame deltas

use std::time::{Duration, Instant};

/// Longest delta handed to systems in one tick, in seconds
const MAX_DELTA: f64 = 0.25;

/// Tracks playback loop time.
///
/// Use `tick` in a real-time loop, or `advance` to step by a known amount
/// (headless runs and tests).
pub struct PlaybackClock {
    /// Total elapsed loop time in seconds
    pub total_time: f64,
    /// Time since last tick in seconds
    pub delta_time: f64,
    /// Target interval between ticks (default: 1/60 second)
    pub tick_interval: f64,
    last_instant: Instant,
    first_tick: bool,
}

impl Default for PlaybackClock {
    fn default() -> Self {
        Self {
            total_time: 0.0,
            delta_time: 0.0,
            tick_interval: 1.0 / 60.0,
            last_instant: Instant::now(),
            first_tick: true,
        }
    }
}

impl PlaybackClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a clock targeting `hz` ticks per second. Non-positive rates keep the default.
    pub fn with_tick_rate(hz: f64) -> Self {
        let mut clock = Self::default();
        if hz.is_finite() && hz > 0.0 {
            clock.tick_interval = 1.0 / hz;
        } else {
            tracing::warn!("Ignoring invalid tick rate {}", hz);
        }
        clock
    }

    /// Measure wall-clock time since the previous tick. The first tick yields 0.
    pub fn tick(&mut self) -> f64 {
        let now = Instant::now();

        if self.first_tick {
            self.first_tick = false;
            self.last_instant = now;
            self.delta_time = 0.0;
            return 0.0;
        }

        let elapsed = now.duration_since(self.last_instant).as_secs_f64();
        self.last_instant = now;
        self.record(elapsed)
    }

    /// Step the clock by `dt` seconds without reading the wall clock.
    pub fn advance(&mut self, dt: f64) -> f64 {
        self.first_tick = false;
        self.last_instant = Instant::now();
        self.record(dt)
    }

    /// Time left until the next tick is due, for loops that sleep between ticks.
    pub fn time_until_next_tick(&self) -> Duration {
        let since = self.last_instant.elapsed().as_secs_f64();
        Duration::from_secs_f64((self.tick_interval - since).max(0.0))
    }

    fn record(&mut self, dt: f64) -> f64 {
        // Long stalls (debugger, window drag) must not skip whole clips
        self.delta_time = if dt.is_finite() { dt.clamp(0.0, MAX_DELTA) } else { 0.0 };
        self.total_time += self.delta_time;
        self.delta_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_defaults() {
        let clock = PlaybackClock::new();
        assert!((clock.tick_interval - 1.0 / 60.0).abs() < 1e-10);
        assert_eq!(clock.total_time, 0.0);
        assert_eq!(clock.delta_time, 0.0);
    }

    #[test]
    fn test_custom_tick_rate() {
        let clock = PlaybackClock::with_tick_rate(30.0);
        assert!((clock.tick_interval - 1.0 / 30.0).abs() < 1e-10);

        let fallback = PlaybackClock::with_tick_rate(0.0);
        assert!((fallback.tick_interval - 1.0 / 60.0).abs() < 1e-10);
    }

    #[test]
    fn test_first_tick_zero_delta() {
        let mut clock = PlaybackClock::new();
        assert_eq!(clock.tick(), 0.0);
        assert_eq!(clock.delta_time, 0.0);
        assert!(clock.tick() >= 0.0);
    }

    #[test]
    fn test_advance_accumulates() {
        let mut clock = PlaybackClock::new();
        clock.advance(0.1);
        clock.advance(0.05);
        assert!((clock.total_time - 0.15).abs() < 1e-10);
        assert!((clock.delta_time - 0.05).abs() < 1e-10);
    }

    #[test]
    fn test_delta_is_clamped() {
        let mut clock = PlaybackClock::new();
        assert_eq!(clock.advance(3.0), 0.25);
        assert_eq!(clock.advance(-1.0), 0.0);
        assert_eq!(clock.advance(f64::NAN), 0.0);
        assert_eq!(clock.total_time, 0.25);
    }

    #[test]
    fn test_time_until_next_tick_bounded() {
        let mut clock = PlaybackClock::with_tick_rate(10.0);
        clock.advance(0.0);
        assert!(clock.time_until_next_tick() <= Duration::from_millis(100));
    }
}
