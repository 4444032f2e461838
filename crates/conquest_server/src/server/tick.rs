//! # Server Tick Loop
//!
//! Fixed-rate pacing for the scheduler.
//!
//! ## Design
//!
//! - Sleep until the next deadline, spin the last half millisecond
//! - A tick that starts late runs immediately and the schedule restarts from
//!   that instant; missed ticks are never replayed in a burst
//! - Simulated time is advanced by the fixed delta elsewhere, never by the
//!   measured interval

use std::time::{Duration, Instant};

/// How far past its deadline a tick may start and still count as on time.
const LATE_START_TOLERANCE: Duration = Duration::from_millis(1);

/// Fixed-rate tick pacing controller.
pub struct TickLoop {
    /// Target tick duration.
    tick_duration: Duration,
    /// Deadline of the next tick.
    next_tick: Instant,
    /// Total ticks executed.
    tick_count: u64,
    /// Frame time statistics.
    stats: TickStats,
}

/// Tick timing statistics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickStats {
    /// Minimum tick duration observed.
    pub min_tick_us: u64,
    /// Maximum tick duration observed.
    pub max_tick_us: u64,
    /// Average tick duration (rolling).
    pub avg_tick_us: u64,
    /// Number of late ticks (took longer than budget).
    pub late_ticks: u64,
    /// Number of ticks that started after their deadline.
    pub late_starts: u64,
    /// Total ticks measured.
    pub total_ticks: u64,
}

impl TickStats {
    fn fresh(tick_duration: Duration) -> Self {
        Self {
            min_tick_us: u64::MAX,
            max_tick_us: 0,
            avg_tick_us: micros(tick_duration),
            late_ticks: 0,
            late_starts: 0,
            total_ticks: 0,
        }
    }
}

fn micros(duration: Duration) -> u64 {
    u64::try_from(duration.as_micros()).unwrap_or(u64::MAX)
}

impl TickLoop {
    /// Creates a new tick loop with the specified rate.
    ///
    /// # Arguments
    ///
    /// * `tick_rate` - Ticks per second, clamped to at least 1
    #[must_use]
    pub fn new(tick_rate: u32) -> Self {
        let tick_duration = Duration::from_micros(1_000_000 / u64::from(tick_rate.max(1)));

        Self {
            tick_duration,
            next_tick: Instant::now(),
            tick_count: 0,
            stats: TickStats::fresh(tick_duration),
        }
    }

    /// Time left until the next tick is due (zero if overdue).
    #[must_use]
    pub fn time_until_next_tick(&self) -> Duration {
        self.next_tick.saturating_duration_since(Instant::now())
    }

    /// Waits until the next tick is due.
    ///
    /// Uses spin-wait for the final microseconds to ensure accuracy.
    pub fn wait_for_next_tick(&self) {
        let remaining = self.time_until_next_tick();
        if remaining.is_zero() {
            return;
        }

        // Sleep for most of the time
        if remaining > Duration::from_micros(1000) {
            std::thread::sleep(remaining - Duration::from_micros(500));
        }

        // Spin-wait for precision
        while Instant::now() < self.next_tick {
            std::hint::spin_loop();
        }
    }

    /// Marks the start of a tick and schedules the next deadline.
    ///
    /// Returns the tick start time for duration measurement.
    #[must_use]
    pub fn begin_tick(&mut self) -> Instant {
        let start = Instant::now();
        let base = if start.saturating_duration_since(self.next_tick) > LATE_START_TOLERANCE {
            self.stats.late_starts += 1;
            start
        } else {
            self.next_tick
        };
        self.next_tick = base + self.tick_duration;
        self.tick_count += 1;
        start
    }

    /// Marks the end of a tick.
    ///
    /// # Returns
    ///
    /// `true` if the tick took longer than its budget.
    pub fn end_tick(&mut self, start: Instant) -> bool {
        let duration = start.elapsed();
        let duration_us = micros(duration);

        self.stats.total_ticks += 1;
        self.stats.min_tick_us = self.stats.min_tick_us.min(duration_us);
        self.stats.max_tick_us = self.stats.max_tick_us.max(duration_us);

        // Rolling average
        self.stats.avg_tick_us = (self.stats.avg_tick_us * 15 + duration_us) / 16;

        let late = duration > self.tick_duration;
        if late {
            self.stats.late_ticks += 1;
        }
        late
    }

    /// Returns the current tick count.
    #[must_use]
    pub const fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Returns tick statistics.
    #[must_use]
    pub const fn stats(&self) -> &TickStats {
        &self.stats
    }

    /// Returns the target tick duration.
    #[must_use]
    pub const fn tick_duration(&self) -> Duration {
        self.tick_duration
    }

    /// Resets statistics.
    pub fn reset_stats(&mut self) {
        self.stats = TickStats::fresh(self.tick_duration);
    }
}

impl Default for TickLoop {
    fn default() -> Self {
        Self::new(conquest_shared::TICK_RATE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_loop_creation() {
        let tick_loop = TickLoop::new(60);
        assert_eq!(tick_loop.tick_count(), 0);
        assert_eq!(tick_loop.tick_duration(), Duration::from_micros(16666));
    }

    #[test]
    fn test_late_start_does_not_catch_up() {
        let mut tick_loop = TickLoop::new(100);
        std::thread::sleep(Duration::from_millis(50));

        // Five periods overdue, but only one tick runs now.
        let start = tick_loop.begin_tick();
        tick_loop.end_tick(start);
        assert_eq!(tick_loop.stats().late_starts, 1);

        // The next deadline is a full period after the late start, not in the past.
        assert!(tick_loop.time_until_next_tick() > Duration::from_millis(5));
    }

    #[test]
    fn test_on_time_keeps_cadence() {
        let mut tick_loop = TickLoop::new(200);
        for _ in 0..5 {
            tick_loop.wait_for_next_tick();
            let start = tick_loop.begin_tick();
            tick_loop.end_tick(start);
        }
        assert_eq!(tick_loop.tick_count(), 5);
        assert_eq!(tick_loop.stats().total_ticks, 5);
    }

    #[test]
    fn test_overlong_tick_counted() {
        let mut tick_loop = TickLoop::new(1000);
        let start = tick_loop.begin_tick();
        std::thread::sleep(Duration::from_millis(3));
        assert!(tick_loop.end_tick(start));
        assert_eq!(tick_loop.stats().late_ticks, 1);

        tick_loop.reset_stats();
        assert_eq!(tick_loop.stats().late_ticks, 0);
    }
}
