// One-shot event queue

use ripple::prelude::*;

fn main() {
    let queue: EventQueue = EventQueue::new();

    queue.connect(|_: &()| println!("One"));
    queue.emit(&());

    queue.connect(|_: &()| println!("Two"));
    let skipped = queue.connect(|_: &()| println!("Skipped"));
    queue.connect(|_: &()| println!("Three"));
    skipped.disconnect();
    queue.emit(&());

    // Nothing left to run
    queue.emit(&());
    println!("Pending after drain: {}", queue.len());
}
