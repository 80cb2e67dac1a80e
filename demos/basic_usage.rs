//! Basic usage example for slot-signals.
//!
//! Demonstrates:
//! - Binding a function and a method to a `Delegate`
//! - Handling an unbound delegate
//! - Connecting functions, methods and closures to a `Signal`
//! - Disconnecting by instance, by function and by closure handle
//!
//! Run with: `RUST_LOG=trace cargo run --example basic_usage`

use slot_signals::{ContextKey, Delegate, DelegateError, Signal};
use std::cell::RefCell;
use std::rc::Rc;

fn square(x: i32) -> i32 {
    x * x
}

fn announce(value: i32) {
    println!("   announce: {value}");
}

#[derive(Debug)]
struct Thermostat {
    name: &'static str,
    target: i32,
}

impl Thermostat {
    fn adjust(&mut self, delta: i32) {
        self.target += delta;
        println!("   {} target is now {}", self.name, self.target);
    }

    fn scaled(&mut self, factor: i32) -> i32 {
        self.target * factor
    }
}

fn main() {
    env_logger::init();

    println!("=== slot-signals: Basic Usage ===\n");

    // -------------------------------------------------------------------------
    // 1. Delegates
    // -------------------------------------------------------------------------
    println!("1. Delegates...");

    let mut delegate: Delegate<fn(i32) -> i32> = Delegate::new();
    match delegate.invoke(5) {
        Err(DelegateError::Unbound) => println!("   unbound delegate reported an error"),
        other => println!("   unexpected: {other:?}"),
    }

    delegate.bind(square);
    println!("   square(5) = {:?}", delegate.invoke(5));

    let living_room = Rc::new(RefCell::new(Thermostat {
        name: "living room",
        target: 20,
    }));
    delegate.bind_method(&living_room, Thermostat::scaled);
    println!("   living_room.scaled(2) = {:?}", delegate.invoke(2));

    delegate.clear();
    println!("   after clear, bound = {}", delegate.is_bound());

    // -------------------------------------------------------------------------
    // 2. Signals
    // -------------------------------------------------------------------------
    println!("\n2. Signals...");

    let kitchen = Rc::new(RefCell::new(Thermostat {
        name: "kitchen",
        target: 18,
    }));

    let signal: Signal<fn(i32)> = Signal::new();
    signal.set_trace_callback(|event| println!("   [trace] {event}"));

    signal.connect(announce);
    signal.connect_method(&living_room, Thermostat::adjust);
    signal.connect_method(&kitchen, Thermostat::adjust);

    let base = 10;
    let handle = signal.connect_closure(move |x| println!("   closure sees {}", base + x));

    println!("   dispatching 5 to {} slots", signal.len());
    signal.dispatch(5);

    // -------------------------------------------------------------------------
    // 3. Disconnecting
    // -------------------------------------------------------------------------
    println!("\n3. Disconnecting...");

    signal.disconnect(ContextKey::of(&kitchen));
    signal.disconnect_fn(announce);
    signal.disconnect(handle);

    println!("   dispatching 1 to {} slot(s)", signal.len());
    signal.dispatch(1);

    println!("\n   final state: {:?} / {:?}", living_room.borrow(), kitchen.borrow());
    println!("\n=== Done ===");
}
