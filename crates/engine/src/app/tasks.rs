use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, TryLockError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{info, warn};

/// The fixed set of periodic tasks. The task table is static, so each kind
/// is spawned exactly once at startup; there is no runtime dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    Input,
    Logic,
    Render,
}

impl TaskKind {
    pub fn name(self) -> &'static str {
        match self {
            TaskKind::Input => "input",
            TaskKind::Logic => "logic",
            TaskKind::Render => "render",
        }
    }
}

/// What a tick callback tells its runner to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskControl {
    Continue,
    Shutdown,
}

/// Cooperative stop signal shared by every task and the presenter.
#[derive(Clone, Default)]
pub struct ShutdownFlag {
    inner: Arc<AtomicBool>,
}

impl ShutdownFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.inner.store(true, Ordering::Release);
    }

    pub fn is_requested(&self) -> bool {
        self.inner.load(Ordering::Acquire)
    }
}

/// Absolute-deadline pacing: each wait targets `previous deadline +
/// period`, so one late tick does not shift every following one. A stall
/// longer than a period resynchronizes by skipping the missed deadlines
/// instead of replaying the backlog.
#[derive(Debug)]
pub struct Ticker {
    period: Duration,
    next_deadline: Instant,
}

impl Ticker {
    pub fn new(period: Duration) -> Self {
        assert!(!period.is_zero(), "ticker period must be non-zero");
        Self {
            period,
            next_deadline: Instant::now() + period,
        }
    }

    /// Sleeps until the next deadline, then schedules the following one.
    pub fn wait(&mut self) {
        if let Some(remaining) = self.next_deadline.checked_duration_since(Instant::now()) {
            thread::sleep(remaining);
        }
        self.advance(Instant::now());
    }

    fn advance(&mut self, now: Instant) {
        self.next_deadline += self.period;
        while self.next_deadline < now {
            self.next_deadline += self.period;
        }
    }

    #[cfg(test)]
    fn next_deadline(&self) -> Instant {
        self.next_deadline
    }
}

/// Spawns one periodic task thread. The loop runs `tick`, then sleeps to
/// the next deadline, until shutdown is requested from anywhere or the
/// tick itself asks to stop. Thread creation failure is left to the
/// caller; it is part of the fatal initialization class.
pub fn spawn_periodic<F>(
    kind: TaskKind,
    period: Duration,
    shutdown: ShutdownFlag,
    mut tick: F,
) -> io::Result<JoinHandle<()>>
where
    F: FnMut() -> TaskControl + Send + 'static,
{
    thread::Builder::new()
        .name(kind.name().to_string())
        .spawn(move || {
            info!(
                task = kind.name(),
                period_ms = period.as_millis() as u64,
                "task_started"
            );
            let mut ticker = Ticker::new(period);
            while !shutdown.is_requested() {
                if tick() == TaskControl::Shutdown {
                    shutdown.request();
                    break;
                }
                ticker.wait();
            }
            info!(task = kind.name(), "task_stopped");
        })
}

static WORLD_LOCK_POISON_WARNED: AtomicBool = AtomicBool::new(false);

fn warn_world_lock_poison_once() {
    if WORLD_LOCK_POISON_WARNED
        .compare_exchange(false, true, Ordering::Relaxed, Ordering::Relaxed)
        .is_ok()
    {
        warn!("world lock poisoned; recovered inner value");
    }
}

const LOCK_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// The one lock guarding the world state. Acquisition is bounded: a task
/// that cannot take the lock within its budget skips the tick instead of
/// stalling the other tasks. Accesses happen entirely under the guard, so
/// readers never observe a half-written state.
pub struct SharedWorld<T> {
    inner: Arc<Mutex<T>>,
}

impl<T> Clone for SharedWorld<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> SharedWorld<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(Mutex::new(value)),
        }
    }

    /// Runs `f` under the lock, waiting at most `budget`. Returns `None`
    /// when the budget elapses first; the caller skips its tick.
    pub fn try_with_for<R>(&self, budget: Duration, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        let deadline = Instant::now() + budget;
        loop {
            match self.inner.try_lock() {
                Ok(mut guard) => return Some(f(&mut guard)),
                Err(TryLockError::Poisoned(poisoned)) => {
                    warn_world_lock_poison_once();
                    return Some(f(&mut poisoned.into_inner()));
                }
                Err(TryLockError::WouldBlock) => {
                    if Instant::now() >= deadline {
                        return None;
                    }
                    thread::sleep(LOCK_POLL_INTERVAL);
                }
            }
        }
    }

    /// Unbounded access for startup, shutdown, and tests, where no peer
    /// task is competing for the lock yet.
    pub fn with<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let mut guard = self
            .inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        f(&mut guard)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicU32;

    use super::*;

    #[test]
    fn ticker_advances_by_whole_periods() {
        let mut ticker = Ticker::new(Duration::from_millis(50));
        let first = ticker.next_deadline();
        ticker.advance(first);
        assert_eq!(ticker.next_deadline(), first + Duration::from_millis(50));
    }

    #[test]
    fn ticker_skips_missed_deadlines_after_a_stall() {
        let mut ticker = Ticker::new(Duration::from_millis(10));
        let first = ticker.next_deadline();
        ticker.advance(first + Duration::from_millis(35));

        // Deadlines at +10, +20 and +30 are gone; the next one is ahead of
        // the stalled clock.
        assert!(ticker.next_deadline() >= first + Duration::from_millis(35));
        assert!(ticker.next_deadline() <= first + Duration::from_millis(45));
    }

    #[test]
    fn try_with_for_runs_closure_under_uncontended_lock() {
        let world = SharedWorld::new(7u32);
        let doubled = world.try_with_for(Duration::from_millis(5), |value| {
            *value *= 2;
            *value
        });
        assert_eq!(doubled, Some(14));
        assert_eq!(world.with(|value| *value), 14);
    }

    #[test]
    fn try_with_for_gives_up_when_the_lock_is_held() {
        let world = SharedWorld::new(0u32);
        let holder = world.clone();

        let guard_entered = Arc::new(AtomicBool::new(false));
        let release = Arc::new(AtomicBool::new(false));
        let entered_flag = Arc::clone(&guard_entered);
        let release_flag = Arc::clone(&release);
        let blocker = thread::spawn(move || {
            holder.with(|_| {
                entered_flag.store(true, Ordering::Release);
                while !release_flag.load(Ordering::Acquire) {
                    thread::sleep(Duration::from_millis(1));
                }
            });
        });

        while !guard_entered.load(Ordering::Acquire) {
            thread::sleep(Duration::from_millis(1));
        }
        let skipped = world.try_with_for(Duration::from_millis(10), |_| ());
        assert_eq!(skipped, None);

        release.store(true, Ordering::Release);
        blocker.join().expect("blocker thread");
    }

    #[test]
    fn spawn_periodic_stops_on_shutdown_request() {
        let shutdown = ShutdownFlag::new();
        let ticks = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&ticks);
        let handle = spawn_periodic(
            TaskKind::Input,
            Duration::from_millis(1),
            shutdown.clone(),
            move || {
                counter.fetch_add(1, Ordering::Relaxed);
                TaskControl::Continue
            },
        )
        .expect("spawn task");

        while ticks.load(Ordering::Relaxed) < 3 {
            thread::sleep(Duration::from_millis(1));
        }
        shutdown.request();
        handle.join().expect("task thread");
        assert!(ticks.load(Ordering::Relaxed) >= 3);
    }

    #[test]
    fn tick_can_request_shutdown_for_everyone() {
        let shutdown = ShutdownFlag::new();
        let handle = spawn_periodic(
            TaskKind::Logic,
            Duration::from_millis(1),
            shutdown.clone(),
            || TaskControl::Shutdown,
        )
        .expect("spawn task");

        handle.join().expect("task thread");
        assert!(shutdown.is_requested());
    }

    #[test]
    fn task_kind_names_are_stable_thread_names() {
        assert_eq!(TaskKind::Input.name(), "input");
        assert_eq!(TaskKind::Logic.name(), "logic");
        assert_eq!(TaskKind::Render.name(), "render");
    }
}
