// Driving timers from a fixed-step loop

use ripple::prelude::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

fn main() -> Result<(), TimerError> {
    ripple::ripple_log::set_level(ripple::ripple_log::Level::Debug);

    let manager = TimerManager::new();
    let beats = Arc::new(AtomicU32::new(0));

    let heartbeat = manager.create(Duration::from_millis(250), true)?;
    let counter = beats.clone();
    heartbeat.on_trigger().connect(move |_: &()| {
        let beat = counter.fetch_add(1, Ordering::SeqCst) + 1;
        println!("heartbeat {beat}");
    });

    let alarm = manager.create(Duration::from_secs(1), false)?;
    alarm.on_trigger().connect(|_: &()| println!("alarm"));
    alarm.on_pause().connect(|_: &()| println!("alarm paused"));
    alarm.on_resume().connect(|_: &()| println!("alarm resumed"));

    let step = Duration::from_millis(100);
    for frame in 0..15 {
        if frame == 4 {
            alarm.pause();
        }
        if frame == 6 {
            alarm.resume();
        }
        manager.update(step);
    }
    println!("{} timers left, {} heartbeats", manager.len(), beats.load(Ordering::SeqCst));

    let delayed = TimerManager::spawn_delayed(Duration::from_millis(50), || println!("delayed work"));
    if delayed.join().is_err() {
        eprintln!("delayed work panicked");
    }
    Ok(())
}
