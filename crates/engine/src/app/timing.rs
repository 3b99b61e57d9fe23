use std::env;
use std::thread;
use std::time::{Duration, Instant};

use tracing::warn;

pub const SLOW_FRAME_ENV_VAR: &str = "TILEQUEST_SLOW_FRAME_MS";

/// Ticks owed for one rendered frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TickBudget {
    pub(crate) ticks: u32,
    /// Banked time thrown away because the frame hit the tick cap.
    pub(crate) dropped: Duration,
}

/// Fixed timestep clock. Frame time is banked, capped at `max_frame`, and
/// paid out in whole ticks, at most `max_ticks` per frame.
#[derive(Debug)]
pub(crate) struct FixedStep {
    tick: Duration,
    max_frame: Duration,
    max_ticks: u32,
    banked: Duration,
}

impl FixedStep {
    pub(crate) fn new(tick: Duration, max_frame: Duration, max_ticks: u32) -> Self {
        Self {
            tick: non_zero(tick, Duration::from_millis(16)),
            max_frame: non_zero(max_frame, Duration::from_millis(250)),
            max_ticks: max_ticks.max(1),
            banked: Duration::ZERO,
        }
    }

    pub(crate) fn per_second(tps: u32, max_frame: Duration, max_ticks: u32) -> Self {
        Self::new(Duration::from_secs_f64(1.0 / tps.max(1) as f64), max_frame, max_ticks)
    }

    pub(crate) fn max_ticks(&self) -> u32 {
        self.max_ticks
    }

    pub(crate) fn advance(&mut self, frame: Duration) -> TickBudget {
        self.banked = self.banked.saturating_add(frame.min(self.max_frame));
        let owed = self.banked.as_nanos() / self.tick.as_nanos();
        let ticks = u32::try_from(owed).unwrap_or(u32::MAX).min(self.max_ticks);
        self.banked -= self.tick * ticks;

        let mut dropped = Duration::ZERO;
        if self.banked >= self.tick {
            dropped = std::mem::take(&mut self.banked);
        }
        TickBudget { ticks, dropped }
    }
}

/// Optional render rate cap.
#[derive(Debug)]
pub(crate) struct FramePacer {
    budget: Option<Duration>,
    last_present: Instant,
}

impl FramePacer {
    pub(crate) fn new(max_fps: Option<u32>) -> Self {
        Self {
            budget: max_fps
                .filter(|fps| *fps > 0)
                .map(|fps| Duration::from_secs_f64(1.0 / fps as f64)),
            last_present: Instant::now(),
        }
    }

    pub(crate) fn budget(&self) -> Option<Duration> {
        self.budget
    }

    fn remaining(&self, elapsed: Duration) -> Duration {
        self.budget
            .map_or(Duration::ZERO, |budget| budget.saturating_sub(elapsed))
    }

    /// Sleeps off what is left of the frame budget since the last present.
    pub(crate) fn wait(&self) {
        let rest = self.remaining(self.last_present.elapsed());
        if !rest.is_zero() {
            thread::sleep(rest);
        }
    }

    pub(crate) fn presented(&mut self) {
        self.last_present = Instant::now();
    }
}

/// Artificial per-frame delay for exercising the tick cap. The env var wins
/// over the configured value; a bad value falls back with a warning.
pub(crate) fn debug_frame_delay(configured_ms: u64) -> Duration {
    let ms = match env::var(SLOW_FRAME_ENV_VAR) {
        Err(env::VarError::NotPresent) => configured_ms,
        Err(error) => {
            warn!(env_var = SLOW_FRAME_ENV_VAR, error = %error, "slow_frame_env_unreadable");
            configured_ms
        }
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(env_var = SLOW_FRAME_ENV_VAR, value = %raw, "slow_frame_env_invalid");
            configured_ms
        }),
    };
    Duration::from_millis(ms)
}

fn non_zero(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() {
        fallback
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clock(max_ticks: u32) -> FixedStep {
        FixedStep::new(Duration::from_millis(16), Duration::from_millis(250), max_ticks)
    }

    #[test]
    fn whole_ticks_are_paid_out() {
        let mut clock = clock(5);

        let budget = clock.advance(Duration::from_millis(48));

        assert_eq!(budget.ticks, 3);
        assert_eq!(budget.dropped, Duration::ZERO);
    }

    #[test]
    fn partial_tick_carries_to_the_next_frame() {
        let mut clock = clock(5);

        assert_eq!(clock.advance(Duration::from_millis(20)).ticks, 1);
        assert_eq!(clock.advance(Duration::from_millis(12)).ticks, 1);
    }

    #[test]
    fn backlog_past_the_tick_cap_is_dropped() {
        let mut clock = clock(3);

        let budget = clock.advance(Duration::from_millis(120));

        assert_eq!(budget.ticks, 3);
        assert_eq!(budget.dropped, Duration::from_millis(72));
        assert_eq!(clock.advance(Duration::ZERO).ticks, 0);
    }

    #[test]
    fn long_frames_are_capped_before_banking() {
        let mut clock = FixedStep::new(Duration::from_millis(100), Duration::from_millis(250), 10);

        assert_eq!(clock.advance(Duration::from_secs(5)).ticks, 2);
    }

    #[test]
    fn pacer_without_cap_never_waits() {
        let pacer = FramePacer::new(Some(0));

        assert_eq!(pacer.budget(), None);
        assert_eq!(pacer.remaining(Duration::ZERO), Duration::ZERO);
    }

    #[test]
    fn pacer_waits_only_while_under_budget() {
        let pacer = FramePacer::new(Some(60));
        let budget = pacer.budget().expect("capped");

        assert!((budget.as_secs_f64() - 1.0 / 60.0).abs() < 0.000_001);
        assert!(pacer.remaining(Duration::from_millis(5)) > Duration::ZERO);
        assert_eq!(pacer.remaining(Duration::from_millis(20)), Duration::ZERO);
    }
}
