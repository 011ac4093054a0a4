use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use tracing::warn;

static METRICS_LOCK_POISON_WARNED: AtomicBool = AtomicBool::new(false);

fn warn_metrics_lock_poison_once(operation: &'static str) {
    if METRICS_LOCK_POISON_WARNED
        .compare_exchange(false, true, Ordering::Relaxed, Ordering::Relaxed)
        .is_ok()
    {
        warn!(operation, "metrics lock poisoned; recovered inner value");
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LoopMetricsSnapshot {
    pub fps: f32,
    pub tps: f32,
}

/// Shared loop counters. The logic task records ticks, the render task
/// records frames, and the render task periodically folds both into a
/// published snapshot.
#[derive(Clone, Debug)]
pub struct MetricsHandle {
    frames: Arc<AtomicU32>,
    ticks: Arc<AtomicU32>,
    snapshot: Arc<RwLock<LoopMetricsSnapshot>>,
}

impl Default for MetricsHandle {
    fn default() -> Self {
        Self {
            frames: Arc::new(AtomicU32::new(0)),
            ticks: Arc::new(AtomicU32::new(0)),
            snapshot: Arc::new(RwLock::new(LoopMetricsSnapshot::default())),
        }
    }
}

impl MetricsHandle {
    pub fn record_frame(&self) {
        self.frames.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_tick(&self) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> LoopMetricsSnapshot {
        match self.snapshot.read() {
            Ok(guard) => *guard,
            Err(poisoned) => {
                warn_metrics_lock_poison_once("read");
                *poisoned.into_inner()
            }
        }
    }

    fn take_counters(&self) -> (u32, u32) {
        (
            self.frames.swap(0, Ordering::Relaxed),
            self.ticks.swap(0, Ordering::Relaxed),
        )
    }

    fn publish(&self, snapshot: LoopMetricsSnapshot) {
        match self.snapshot.write() {
            Ok(mut guard) => *guard = snapshot,
            Err(poisoned) => {
                warn_metrics_lock_poison_once("write");
                let mut guard = poisoned.into_inner();
                *guard = snapshot;
            }
        }
    }
}

/// Folds the shared counters into rate snapshots once per interval.
/// Owned by the render task, the slowest periodic loop.
#[derive(Debug)]
pub struct MetricsReporter {
    handle: MetricsHandle,
    interval: Duration,
    interval_start: Instant,
}

impl MetricsReporter {
    pub fn new(handle: MetricsHandle, interval: Duration) -> Self {
        Self {
            handle,
            interval,
            interval_start: Instant::now(),
        }
    }

    pub fn maybe_publish(&mut self, now: Instant) -> Option<LoopMetricsSnapshot> {
        let elapsed = now.saturating_duration_since(self.interval_start);
        if elapsed < self.interval {
            return None;
        }

        let elapsed_seconds = elapsed.as_secs_f32().max(f32::EPSILON);
        let (frames, ticks) = self.handle.take_counters();
        let snapshot = LoopMetricsSnapshot {
            fps: frames as f32 / elapsed_seconds,
            tps: ticks as f32 / elapsed_seconds,
        };

        self.interval_start = now;
        self.handle.publish(snapshot);
        Some(snapshot)
    }
}
