use std::time::{Duration, Instant};

/// Loop rates over one logging interval.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct LoopMetricsSnapshot {
    pub(crate) fps: f32,
    pub(crate) tps: f32,
    pub(crate) frame_time_ms: f32,
    /// Frames in the interval whose tick backlog was dropped.
    pub(crate) clamped_frames: u32,
}

/// Frame and tick counters for the interval in progress.
#[derive(Debug)]
pub(crate) struct LoopStats {
    started: Instant,
    interval: Duration,
    frames: u32,
    ticks: u32,
    clamped_frames: u32,
    frame_time: Duration,
}

impl LoopStats {
    pub(crate) fn new(interval: Duration, now: Instant) -> Self {
        Self {
            started: now,
            interval,
            frames: 0,
            ticks: 0,
            clamped_frames: 0,
            frame_time: Duration::ZERO,
        }
    }

    pub(crate) fn frame(&mut self, frame_time: Duration) {
        self.frames = self.frames.saturating_add(1);
        self.frame_time = self.frame_time.saturating_add(frame_time);
    }

    pub(crate) fn tick(&mut self) {
        self.ticks = self.ticks.saturating_add(1);
    }

    pub(crate) fn clamped(&mut self) {
        self.clamped_frames = self.clamped_frames.saturating_add(1);
    }

    /// Closes the interval once it has run its length and starts the next.
    pub(crate) fn take(&mut self, now: Instant) -> Option<LoopMetricsSnapshot> {
        let elapsed = now.saturating_duration_since(self.started);
        if elapsed < self.interval {
            return None;
        }
        let done = std::mem::replace(self, Self::new(self.interval, now));
        let seconds = elapsed.as_secs_f32().max(f32::EPSILON);
        let frame_time_ms = match done.frames {
            0 => 0.0,
            frames => done.frame_time.as_secs_f32() * 1000.0 / frames as f32,
        };
        Some(LoopMetricsSnapshot {
            fps: done.frames as f32 / seconds,
            tps: done.ticks as f32 / seconds,
            frame_time_ms,
            clamped_frames: done.clamped_frames,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_averages_over_the_interval() {
        let start = Instant::now();
        let mut stats = LoopStats::new(Duration::from_secs(1), start);
        stats.frame(Duration::from_millis(16));
        stats.frame(Duration::from_millis(16));
        for _ in 0..4 {
            stats.tick();
        }

        let snapshot = stats
            .take(start + Duration::from_secs(1))
            .expect("interval elapsed");

        assert!((snapshot.fps - 2.0).abs() < 0.05);
        assert!((snapshot.tps - 4.0).abs() < 0.05);
        assert!((snapshot.frame_time_ms - 16.0).abs() < 0.001);
        assert_eq!(snapshot.clamped_frames, 0);
    }

    #[test]
    fn nothing_reported_before_the_interval_ends() {
        let start = Instant::now();
        let mut stats = LoopStats::new(Duration::from_secs(1), start);
        stats.frame(Duration::from_millis(16));

        assert!(stats.take(start + Duration::from_millis(500)).is_none());
    }

    #[test]
    fn counters_restart_after_each_snapshot() {
        let start = Instant::now();
        let mut stats = LoopStats::new(Duration::from_millis(100), start);
        stats.clamped();
        stats.clamped();

        let first = stats.take(start + Duration::from_millis(100)).expect("first");
        let second = stats.take(start + Duration::from_millis(250)).expect("second");

        assert_eq!(first.clamped_frames, 2);
        assert_eq!(second.clamped_frames, 0);
        assert_eq!(second.frame_time_ms, 0.0);
    }
}
