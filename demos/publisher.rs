// Keyed publisher
//
// Expected output:
// 1
// 1
// 3

use ripple::prelude::*;

fn main() -> Result<(), EventError> {
    let publisher: Publisher<&str> = Publisher::new();

    let one = publisher.register("One", |_: &()| println!("1"));
    publisher.register("Two", |_: &()| println!("2"));
    publisher.register("Three", |_: &()| println!("3"));

    publisher.publish(&"One", &());
    publisher.publish(&"One", &());
    publisher.try_publish(&"Three", &())?;

    one.disconnect();
    publisher.publish(&"One", &());

    if let Err(err) = publisher.try_publish(&"Four", &()) {
        eprintln!("{err}");
    }
    Ok(())
}
