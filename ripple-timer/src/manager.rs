//! Timer manager.

use crate::error::{TimerError, TimerResult};
use crate::timer::{Timer, TimerList};
use ripple_log::{debug, trace};
use std::fmt;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Owns a set of timers and advances them together.
///
/// # Examples
///
/// ```
/// use ripple_timer::TimerManager;
/// use std::sync::atomic::{AtomicU32, Ordering};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// let fired = Arc::new(AtomicU32::new(0));
/// let manager = TimerManager::new();
/// let timer = manager.create(Duration::from_millis(30), false)?;
///
/// let counter = fired.clone();
/// timer.on_trigger().connect(move |_: &()| {
///     counter.fetch_add(1, Ordering::SeqCst);
/// });
///
/// manager.update(Duration::from_millis(20));
/// manager.update(Duration::from_millis(20));
/// assert_eq!(fired.load(Ordering::SeqCst), 1);
///
/// // Finished one-shot timers are dropped on the next update.
/// manager.update(Duration::from_millis(20));
/// assert!(manager.is_empty());
/// # Ok::<(), ripple_timer::TimerError>(())
/// ```
pub struct TimerManager {
    timers: Arc<TimerList>,
}

impl TimerManager {
    /// Create a manager with no timers.
    pub fn new() -> Self {
        Self {
            timers: Arc::new(TimerList::default()),
        }
    }

    /// Create a timer counting down from `interval` and start tracking it.
    pub fn create(&self, interval: Duration, looping: bool) -> TimerResult<Arc<Timer>> {
        if interval.is_zero() {
            return Err(TimerError::ZeroInterval);
        }

        let timer = Arc::new(Timer::new(interval, looping, Arc::downgrade(&self.timers)));
        let count = {
            let mut timers = self.timers.lock();
            timers.push(timer.clone());
            timers.len()
        };

        debug!(
            "Timer created - interval: {:?}, looping: {} ({} tracked)",
            interval, looping, count
        );
        Ok(timer)
    }

    /// Stop tracking `timer`. Returns whether it was tracked.
    pub fn remove(&self, timer: &Arc<Timer>) -> bool {
        let mut timers = self.timers.lock();
        let before = timers.len();
        timers.retain(|tracked| !Arc::ptr_eq(tracked, timer));
        timers.len() != before
    }

    /// Drop finished timers, then tick the rest by `delta`.
    ///
    /// Ticking runs on a snapshot taken outside the lock, so trigger
    /// handlers may create or delete timers. Those changes apply from the
    /// next update.
    pub fn update(&self, delta: Duration) {
        let snapshot = {
            let mut timers = self.timers.lock();
            timers.retain(|timer| !timer.has_finished());
            timers.clone()
        };

        trace!("Updating {} timers by {:?}", snapshot.len(), delta);
        for timer in &snapshot {
            timer.tick(delta);
        }
    }

    /// Number of tracked timers.
    pub fn len(&self) -> usize {
        self.timers.lock().len()
    }

    /// Whether no timer is tracked.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run `f` once on a background thread after `delay`.
    pub fn spawn_delayed<F>(delay: Duration, f: F) -> JoinHandle<()>
    where
        F: FnOnce() + Send + 'static,
    {
        thread::spawn(move || {
            thread::sleep(delay);
            f();
        })
    }
}

impl Default for TimerManager {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TimerManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerManager")
            .field("timers", &self.len())
            .finish()
    }
}
