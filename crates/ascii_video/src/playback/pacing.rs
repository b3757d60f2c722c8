use std::time::{Duration, Instant};

use crate::config::FALLBACK_FRAME_INTERVAL_MS;

pub trait Clock {
    fn now(&self) -> Instant;
    fn sleep(&mut self, duration: Duration);
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Target time between frames: `1000 / fps` ms, or the fallback for
/// sources without a usable rate.
pub fn frame_interval(fps: f64) -> Duration {
    if fps > 0.0 && fps.is_finite() {
        Duration::from_millis((1000.0 / fps) as u64)
    } else {
        Duration::from_millis(FALLBACK_FRAME_INTERVAL_MS)
    }
}

/// Sleeps away whatever is left of the frame interval since the last tick.
///
/// Work that overruns one interval is not made up later, so playback drifts
/// behind wall-clock time when conversion is slower than the frame rate.
#[derive(Clone, Debug)]
pub struct FramePacer {
    interval: Duration,
    last_tick: Option<Instant>,
}

impl FramePacer {
    pub fn new(interval: Duration) -> Self {
        Self { interval, last_tick: None }
    }

    /// Forget the previous tick, e.g. after a pause.
    pub fn reset(&mut self) {
        self.last_tick = None;
    }

    /// Returns how long it slept.
    pub fn tick<C: Clock>(&mut self, clock: &mut C) -> Duration {
        let now = clock.now();
        let remaining = match self.last_tick {
            Some(last) => self.interval.saturating_sub(now.saturating_duration_since(last)),
            None => self.interval,
        };
        if !remaining.is_zero() {
            clock.sleep(remaining);
        }
        self.last_tick = Some(clock.now());
        remaining
    }
}
