//! Countdown timers.

use crate::error::{TimerError, TimerResult};
use parking_lot::Mutex;
use ripple_events::Event;
use ripple_log::debug;
use std::fmt;
use std::sync::{Arc, Weak};
use std::time::Duration;

pub(crate) type TimerList = Mutex<Vec<Arc<Timer>>>;

#[derive(Debug)]
struct TimerState {
    time_left: Duration,
    paused: bool,
    // Set when the countdown triggers; cleared whenever the time left is set.
    fired: bool,
}

/// A countdown advanced by [`Timer::tick`].
///
/// A tick that leaves no time fires [`Timer::on_trigger`], including a tick
/// on a timer whose time left was set to zero. A looping timer then restarts
/// from its interval; a one-shot timer fires once, ignores further ticks
/// until its time is set again and is dropped by its manager on the next
/// update.
///
/// The state lock is released before any event fires, so handlers may call
/// back into the timer.
pub struct Timer {
    interval: Duration,
    looping: bool,
    state: Mutex<TimerState>,
    manager: Weak<TimerList>,
    on_trigger: Event,
    on_pause: Event,
    on_resume: Event,
}

impl Timer {
    pub(crate) fn new(interval: Duration, looping: bool, manager: Weak<TimerList>) -> Self {
        Self {
            interval,
            looping,
            state: Mutex::new(TimerState {
                time_left: interval,
                paused: false,
                fired: false,
            }),
            manager,
            on_trigger: Event::builder().label("timer.trigger").build(),
            on_pause: Event::builder().label("timer.pause").build(),
            on_resume: Event::builder().label("timer.resume").build(),
        }
    }

    /// Length of one countdown.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Whether the timer restarts after triggering.
    pub fn is_looping(&self) -> bool {
        self.looping
    }

    /// Remaining time of the current countdown.
    pub fn time_left(&self) -> Duration {
        self.state.lock().time_left
    }

    /// Overwrite the remaining time and re-arm the countdown.
    pub fn set_time_left(&self, time_left: Duration) {
        let mut state = self.state.lock();
        state.time_left = time_left;
        state.fired = false;
    }

    /// Restart the countdown from the full interval.
    pub fn reset(&self) {
        self.set_time_left(self.interval);
    }

    /// Whether a one-shot timer has triggered.
    pub fn has_finished(&self) -> bool {
        !self.looping && self.state.lock().fired
    }

    /// Advance the countdown by `delta`. Paused timers ignore ticks.
    pub fn tick(&self, delta: Duration) {
        {
            let mut state = self.state.lock();
            if state.paused || (state.fired && !self.looping) {
                return;
            }
            state.time_left = state.time_left.saturating_sub(delta);
            if !state.time_left.is_zero() {
                return;
            }
            state.fired = true;
        }

        self.on_trigger.emit(&());
        if self.looping {
            self.reset();
        }
    }

    /// Stop reacting to ticks. Fires [`Timer::on_pause`] if it was running.
    pub fn pause(&self) {
        if self.set_paused(true) {
            self.on_pause.emit(&());
        }
    }

    /// React to ticks again. Fires [`Timer::on_resume`] if it was paused.
    pub fn resume(&self) {
        if self.set_paused(false) {
            self.on_resume.emit(&());
        }
    }

    /// Whether the timer is paused.
    pub fn is_paused(&self) -> bool {
        self.state.lock().paused
    }

    /// Remove the timer from its manager.
    ///
    /// Returns `Ok(false)` if the manager no longer tracks this timer.
    pub fn delete(self: &Arc<Self>) -> TimerResult<bool> {
        let timers = self.manager.upgrade().ok_or(TimerError::ManagerDropped)?;
        let mut timers = timers.lock();
        let before = timers.len();
        timers.retain(|timer| !Arc::ptr_eq(timer, self));

        let removed = timers.len() != before;
        if removed {
            debug!("Timer deleted ({} remaining)", timers.len());
        }
        Ok(removed)
    }

    /// Fired each time the countdown reaches zero.
    pub fn on_trigger(&self) -> &Event {
        &self.on_trigger
    }

    /// Fired when a running timer is paused.
    pub fn on_pause(&self) -> &Event {
        &self.on_pause
    }

    /// Fired when a paused timer resumes.
    pub fn on_resume(&self) -> &Event {
        &self.on_resume
    }

    // Returns whether the state changed.
    fn set_paused(&self, paused: bool) -> bool {
        let mut state = self.state.lock();
        let changed = state.paused != paused;
        state.paused = paused;
        changed
    }
}

impl fmt::Debug for Timer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("Timer")
            .field("interval", &self.interval)
            .field("looping", &self.looping)
            .field("time_left", &state.time_left)
            .field("paused", &state.paused)
            .finish()
    }
}
