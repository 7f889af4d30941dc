use log::trace;
use std::thread;
use std::time::{Duration, Instant};

pub const DEFAULT_TICK_RATE_HZ: u32 = 60;

/// Paces the tick loop.
pub trait TickScheduler {
    /// Blocks until the next tick boundary.
    fn wait_for_next_tick(&mut self);
}

/// Sleeps out the remainder of each fixed period.
pub struct FixedRateScheduler {
    period: Duration,
    next_boundary: Option<Instant>,
}

impl FixedRateScheduler {
    pub fn new(rate_hz: u32) -> Self {
        let rate_hz = rate_hz.max(1);
        FixedRateScheduler {
            period: Duration::from_secs(1) / rate_hz,
            next_boundary: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }
}

impl Default for FixedRateScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_TICK_RATE_HZ)
    }
}

impl TickScheduler for FixedRateScheduler {
    fn wait_for_next_tick(&mut self) {
        let now = Instant::now();
        let boundary = self.next_boundary.unwrap_or(now + self.period);

        if boundary > now {
            thread::sleep(boundary - now);
            self.next_boundary = Some(boundary + self.period);
        } else {
            // Overran: re-base instead of bursting to catch up.
            trace!("Tick overran its boundary by {:?}", now - boundary);
            self.next_boundary = Some(now + self.period);
        }
    }
}

/// Never waits. Used by tests and offline runs.
#[derive(Debug, Default)]
pub struct ImmediateScheduler {
    pub ticks: u64,
}

impl TickScheduler for ImmediateScheduler {
    fn wait_for_next_tick(&mut self) {
        self.ticks += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sixty_hz_period() {
        let scheduler = FixedRateScheduler::new(60);
        assert_eq!(scheduler.period(), Duration::from_nanos(16_666_666));
    }

    #[test]
    fn test_zero_rate_is_clamped() {
        assert_eq!(FixedRateScheduler::new(0).period(), Duration::from_secs(1));
    }

    #[test]
    fn test_fixed_rate_waits_about_one_period() {
        let mut scheduler = FixedRateScheduler::new(100);
        let start = Instant::now();
        for _ in 0..5 {
            scheduler.wait_for_next_tick();
        }
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(45), "elapsed {:?}", elapsed);
    }
}
