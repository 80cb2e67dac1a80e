//! Integration tests for connecting, disconnecting and dispatching signals.
//!
//! NOTE: Tests touching the static counters use #[serial] because they share them.

use serial_test::serial;
use slot_signals::{ContextKey, Signal};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::atomic::{AtomicI32, Ordering};

static COUNTER: AtomicI32 = AtomicI32::new(0);
static LAST_VALUE: AtomicI32 = AtomicI32::new(0);

fn inc() {
    COUNTER.fetch_add(1, Ordering::SeqCst);
}

fn store(value: i32) {
    LAST_VALUE.store(value, Ordering::SeqCst);
}

fn add_to_counter(value: i32) {
    COUNTER.fetch_add(value, Ordering::SeqCst);
}

#[derive(Default)]
struct Obj {
    count: i32,
    values: Vec<i32>,
}

impl Obj {
    fn inc(&mut self) {
        self.count += 1;
    }

    fn record(&mut self, value: i32) {
        self.values.push(value);
    }

    fn record_negated(&mut self, value: i32) -> i32 {
        self.values.push(-value);
        -value
    }
}

#[test]
#[serial]
fn test_function_and_method_each_called_once() {
    COUNTER.store(0, Ordering::SeqCst);
    let obj = Rc::new(RefCell::new(Obj::default()));

    let signal: Signal<fn()> = Signal::new();
    signal.connect(inc);
    signal.connect_method(&obj, Obj::inc);
    signal.dispatch();

    assert_eq!(COUNTER.load(Ordering::SeqCst), 1);
    assert_eq!(obj.borrow().count, 1);
}

#[test]
#[serial]
fn test_int_function_and_method() {
    LAST_VALUE.store(0, Ordering::SeqCst);
    let obj = Rc::new(RefCell::new(Obj::default()));

    let signal: Signal<fn(i32)> = Signal::new();
    signal.connect(store);
    signal.connect_method(&obj, Obj::record);
    signal.dispatch(1);

    assert_eq!(LAST_VALUE.load(Ordering::SeqCst), 1);
    assert_eq!(obj.borrow().values, vec![1]);
}

#[test]
fn test_each_slot_called_once_in_order() {
    for n in [0usize, 1, 2, 7, 32] {
        let order = Rc::new(RefCell::new(Vec::new()));
        let signal: Signal<fn()> = Signal::new();
        for i in 0..n {
            let order = order.clone();
            signal.connect_closure(move || order.borrow_mut().push(i));
        }

        signal.dispatch();
        assert_eq!(*order.borrow(), (0..n).collect::<Vec<_>>());
    }
}

#[test]
fn test_return_values_are_discarded() {
    let obj = Rc::new(RefCell::new(Obj::default()));
    let signal: Signal<fn(i32) -> i32> = Signal::new();
    signal.connect_method(&obj, Obj::record_negated);
    signal.connect_closure(|x| x * 100);

    signal.dispatch(3);
    assert_eq!(obj.borrow().values, vec![-3]);
}

#[test]
fn test_closure_sees_captured_value_until_disconnected() {
    let results = Rc::new(RefCell::new(Vec::new()));
    let sink = results.clone();
    let base = 10;

    let signal: Signal<fn(i32)> = Signal::new();
    let handle = signal.connect_closure(move |x| sink.borrow_mut().push(base + x));

    signal.dispatch(5);
    signal.dispatch(6);
    assert_eq!(*results.borrow(), vec![15, 16]);

    assert_eq!(signal.disconnect(handle), 1);
    signal.dispatch(7);
    assert_eq!(*results.borrow(), vec![15, 16]);
}

#[test]
fn test_closures_dispatch_in_connection_order_with_other_slots() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let obj = Rc::new(RefCell::new(Obj::default()));
    let signal: Signal<fn(i32)> = Signal::new();

    let early = log.clone();
    signal.connect_closure(move |x| early.borrow_mut().push(("early", x)));
    signal.connect_method(&obj, Obj::record);
    let late = log.clone();
    signal.connect_closure(move |x| late.borrow_mut().push(("late", x)));

    signal.dispatch(2);
    assert_eq!(*log.borrow(), vec![("early", 2), ("late", 2)]);
    assert_eq!(obj.borrow().values, vec![2]);
}

#[test]
fn test_disconnect_instance_is_idempotent() {
    let a = Rc::new(RefCell::new(Obj::default()));
    let b = Rc::new(RefCell::new(Obj::default()));
    let signal: Signal<fn(i32)> = Signal::new();
    signal.connect_method(&a, Obj::record);
    signal.connect_method(&b, Obj::record);
    signal.connect_method(&a, Obj::record);

    assert_eq!(signal.disconnect(ContextKey::of(&a)), 2);
    assert_eq!(signal.disconnect(ContextKey::of(&a)), 0);
    assert_eq!(signal.len(), 1);

    signal.dispatch(9);
    assert!(a.borrow().values.is_empty());
    assert_eq!(b.borrow().values, vec![9]);
}

#[test]
#[serial]
fn test_disconnect_fn_removes_every_duplicate() {
    COUNTER.store(0, Ordering::SeqCst);
    let signal: Signal<fn(i32)> = Signal::new();
    signal.connect(add_to_counter);
    signal.connect(store);
    signal.connect(add_to_counter);
    signal.connect(add_to_counter);

    signal.dispatch(1);
    assert_eq!(COUNTER.load(Ordering::SeqCst), 3);

    assert_eq!(signal.disconnect_fn(add_to_counter), 3);
    assert_eq!(signal.len(), 1);
    signal.dispatch(1);
    assert_eq!(COUNTER.load(Ordering::SeqCst), 3);
}

#[test]
fn test_disconnect_method_for_all_instances() {
    let a = Rc::new(RefCell::new(Obj::default()));
    let b = Rc::new(RefCell::new(Obj::default()));
    let signal: Signal<fn(i32)> = Signal::new();
    signal.connect_method(&a, Obj::record);
    signal.connect_method(&b, Obj::record);

    assert_eq!(signal.disconnect_method::<Obj>(None, Obj::record), 2);
    assert!(signal.is_empty());
}

#[test]
fn test_disconnect_method_for_one_instance() {
    let a = Rc::new(RefCell::new(Obj::default()));
    let b = Rc::new(RefCell::new(Obj::default()));
    let signal: Signal<fn(i32)> = Signal::new();
    signal.connect_method(&a, Obj::record);
    signal.connect_method(&b, Obj::record);

    assert_eq!(signal.disconnect_method(Some(&b), Obj::record), 1);
    signal.dispatch(4);
    assert_eq!(a.borrow().values, vec![4]);
    assert!(b.borrow().values.is_empty());
}

#[test]
fn test_stateless_closure_is_not_owned() {
    let signal: Signal<fn(i32) -> i32> = Signal::new();
    signal.connect_closure(|x| x + 1);
    assert_eq!(signal.owned_count(), 0);

    let offset = Cell::new(3);
    signal.connect_closure(move |x| x + offset.get());
    assert_eq!(signal.owned_count(), 1);
}

#[test]
fn test_dispatch_on_empty_signal() {
    let signal: Signal<fn(String, u64)> = Signal::default();
    signal.dispatch("nobody".to_string(), 0);
    assert!(signal.is_empty());
}

#[test]
fn test_signal_can_be_shared() {
    let signal: Rc<Signal<fn(u8)>> = Rc::new(Signal::new());
    let total = Rc::new(Cell::new(0u32));

    let sink = total.clone();
    signal.connect_closure(move |v| sink.set(sink.get() + u32::from(v)));

    let emitter = Rc::clone(&signal);
    emitter.dispatch(200);
    signal.dispatch(100);
    assert_eq!(total.get(), 300);
}
