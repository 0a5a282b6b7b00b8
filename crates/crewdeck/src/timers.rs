//! Fixed-interval background timers.
//!
//! Each timer is a tokio task running a synchronous tick closure on a
//! [`tokio::time::interval`]. Timers are stopped through a cloneable
//! [`TimerHandle`]; a [`TimerManager`] stops and aborts every timer it owns.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::debug;

/// What a timer drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Clock display refresh.
    Clock,
    /// Reminder poll.
    Reminder,
    /// Timeline progress refresh.
    Progress,
}

impl std::fmt::Display for TimerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Clock => write!(f, "clock"),
            Self::Reminder => write!(f, "reminder"),
            Self::Progress => write!(f, "progress"),
        }
    }
}

/// A handle to stop one timer.
///
/// This is a lightweight, cloneable handle that can be used from any task.
#[derive(Debug, Clone)]
pub struct TimerHandle {
    kind: TimerKind,
    stop_signal: Arc<AtomicBool>,
}

impl TimerHandle {
    /// Create a new timer handle.
    #[must_use]
    pub fn new(kind: TimerKind) -> Self {
        Self {
            kind,
            stop_signal: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Get the timer kind.
    #[must_use]
    pub fn kind(&self) -> TimerKind {
        self.kind
    }

    /// Signal the timer to stop.
    pub fn stop(&self) {
        self.stop_signal.store(true, Ordering::SeqCst);
    }

    /// Check if the stop signal has been sent.
    #[must_use]
    pub fn should_stop(&self) -> bool {
        self.stop_signal.load(Ordering::SeqCst)
    }
}

/// Spawn a timer task calling `tick` every `period` until `handle` is stopped.
///
/// The first tick fires immediately. Missed ticks are delayed, not burst.
/// Must be called from within a tokio runtime.
pub fn spawn_timer<F>(handle: TimerHandle, period: Duration, mut tick: F) -> JoinHandle<()>
where
    F: FnMut() + Send + 'static,
{
    tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        debug!(
            timer = %handle.kind(),
            interval_ms = period.as_millis(),
            "Starting timer"
        );

        loop {
            ticker.tick().await;
            if handle.should_stop() {
                break;
            }
            tick();
        }

        debug!(timer = %handle.kind(), "Timer stopped");
    })
}

/// A set of timers that are torn down together.
///
/// Dropping the manager stops every timer.
#[derive(Debug, Default)]
pub struct TimerManager {
    handles: Vec<TimerHandle>,
    tasks: Vec<JoinHandle<()>>,
}

impl TimerManager {
    /// Create an empty manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Track an externally driven timer.
    pub fn add(&mut self, handle: TimerHandle) {
        self.handles.push(handle);
    }

    /// Spawn and track a timer. See [`spawn_timer`].
    pub fn spawn<F>(&mut self, kind: TimerKind, period: Duration, tick: F) -> TimerHandle
    where
        F: FnMut() + Send + 'static,
    {
        let handle = TimerHandle::new(kind);
        self.tasks.push(spawn_timer(handle.clone(), period, tick));
        self.handles.push(handle.clone());
        handle
    }

    /// Stop every timer and abort their tasks.
    pub fn stop_all(&self) {
        for handle in &self.handles {
            handle.stop();
        }
        for task in &self.tasks {
            task.abort();
        }
    }

    /// Number of tracked timers.
    #[must_use]
    pub fn count(&self) -> usize {
        self.handles.len()
    }

    /// Whether any tracked timer has not been told to stop.
    #[must_use]
    pub fn any_running(&self) -> bool {
        self.handles.iter().any(|h| !h.should_stop())
    }

    /// Kinds of the tracked timers, in spawn order.
    #[must_use]
    pub fn kinds(&self) -> Vec<TimerKind> {
        self.handles.iter().map(TimerHandle::kind).collect()
    }
}

impl Drop for TimerManager {
    fn drop(&mut self) {
        self.stop_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counter() -> (Arc<AtomicUsize>, impl FnMut() + Send + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let ticks = Arc::clone(&count);
        (count, move || {
            ticks.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_timer_kind_display() {
        assert_eq!(TimerKind::Clock.to_string(), "clock");
        assert_eq!(TimerKind::Reminder.to_string(), "reminder");
        assert_eq!(TimerKind::Progress.to_string(), "progress");
    }

    #[test]
    fn test_timer_handle_stop() {
        let handle = TimerHandle::new(TimerKind::Clock);
        assert_eq!(handle.kind(), TimerKind::Clock);
        assert!(!handle.should_stop());

        handle.stop();
        assert!(handle.should_stop());
    }

    #[test]
    fn test_timer_handle_clone_shares_signal() {
        let handle1 = TimerHandle::new(TimerKind::Reminder);
        let handle2 = handle1.clone();

        handle1.stop();
        assert!(handle2.should_stop());
    }

    #[test]
    fn test_manager_add_and_any_running() {
        let mut manager = TimerManager::new();
        let clock = TimerHandle::new(TimerKind::Clock);
        let progress = TimerHandle::new(TimerKind::Progress);
        manager.add(clock.clone());
        manager.add(progress.clone());

        assert_eq!(manager.count(), 2);
        assert!(manager.any_running());

        clock.stop();
        assert!(manager.any_running());

        progress.stop();
        assert!(!manager.any_running());
    }

    #[tokio::test]
    async fn test_spawned_timer_ticks() {
        let mut manager = TimerManager::new();
        let (count, tick) = counter();

        manager.spawn(TimerKind::Clock, Duration::from_millis(10), tick);
        tokio::time::sleep(Duration::from_millis(60)).await;

        assert!(count.load(Ordering::SeqCst) >= 1);
        assert_eq!(manager.kinds(), vec![TimerKind::Clock]);
    }

    #[tokio::test]
    async fn test_stop_all_halts_ticks() {
        let mut manager = TimerManager::new();
        let (count, tick) = counter();
        let handle = manager.spawn(TimerKind::Progress, Duration::from_millis(10), tick);
        tokio::time::sleep(Duration::from_millis(30)).await;

        manager.stop_all();
        tokio::time::sleep(Duration::from_millis(20)).await;
        let stopped_at = count.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(handle.should_stop());
        assert!(!manager.any_running());
        assert_eq!(count.load(Ordering::SeqCst), stopped_at);
    }

    #[tokio::test]
    async fn test_handle_stop_ends_task() {
        let (count, tick) = counter();
        let handle = TimerHandle::new(TimerKind::Reminder);
        let task = spawn_timer(handle.clone(), Duration::from_millis(5), tick);
        tokio::time::sleep(Duration::from_millis(20)).await;

        handle.stop();
        task.await.unwrap();

        assert!(count.load(Ordering::SeqCst) >= 1);
    }

    #[tokio::test]
    async fn test_drop_stops_timers() {
        let (count, tick) = counter();
        let handle = {
            let mut manager = TimerManager::new();
            manager.spawn(TimerKind::Clock, Duration::from_millis(10), tick)
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        let after_drop = count.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(40)).await;

        assert!(handle.should_stop());
        assert_eq!(count.load(Ordering::SeqCst), after_drop);
    }
}
