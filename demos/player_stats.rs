// Accumulating player stats from equipment slots

use ripple::prelude::*;
use std::cell::RefCell;

#[derive(Debug, Default)]
struct Stats {
    melee_damage: u32,
    defence: u32,
}

fn main() {
    let player_stats: Event<RefCell<Stats>> = Event::builder().label("player_stats").build();

    // "Equip" weapons and armour
    let _main_hand = player_stats.connect(|stats: &RefCell<Stats>| stats.borrow_mut().melee_damage += 300);
    let off_hand = player_stats.connect(|stats: &RefCell<Stats>| stats.borrow_mut().melee_damage += 150);
    let _platebody = player_stats.connect(|stats: &RefCell<Stats>| stats.borrow_mut().defence += 50);

    let stats = RefCell::new(Stats::default());
    player_stats.emit(&stats);
    let stats = stats.into_inner();
    println!("Player stats are:\nMelee damage = {}\nDefence = {}", stats.melee_damage, stats.defence);

    // Unequip the off-hand weapon for one calculation only
    off_hand.set_blocking(true);
    let stats = RefCell::new(Stats::default());
    player_stats.emit(&stats);
    println!("Without off-hand: {:?}", stats.into_inner());
    off_hand.set_blocking(false);
}
