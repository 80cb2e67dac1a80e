//! # Slot Signals
//!
//! Allocation-minimal callback dispatch for single-threaded code.
//!
//! This crate provides two primitives sharing one representation of a bound callable:
//!
//! - [`Delegate`] holds at most one target (a free function or an instance method) and
//!   returns its result.
//! - [`Signal`] holds an ordered list of subscribers (functions, instance methods and
//!   closures) and notifies all of them.
//!
//! The call shape is written as a function-pointer type, so `Delegate<fn(i32) -> i32>`
//! accepts anything callable as `fn(i32) -> i32`.
//!
//! ## Quick Start
//!
//! ```rust
//! use slot_signals::{Delegate, Signal};
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! fn square(x: i32) -> i32 {
//!     x * x
//! }
//!
//! let mut delegate: Delegate<fn(i32) -> i32> = Delegate::new();
//! delegate.bind(square);
//! assert_eq!(delegate.invoke(5), Ok(25));
//!
//! let total = Rc::new(Cell::new(0));
//! let signal: Signal<fn(i32)> = Signal::new();
//! let sink = total.clone();
//! signal.connect_closure(move |x| sink.set(sink.get() + x));
//! signal.dispatch(15);
//! assert_eq!(total.get(), 15);
//! ```
//!
//! ## Features
//!
//! - **No allocation for plain targets**: functions and capture-free closures are stored
//!   without touching the heap
//! - **Owned captures**: state captured by a connected closure is released exactly once,
//!   on disconnect or when the signal is dropped
//! - **Weak instances**: bound methods never keep their instance alive
//! - **Reentrancy-safe dispatch**: callbacks may connect and disconnect while a dispatch runs
//! - **Tracing support**: optional per-signal callback plus `log` records for every operation
//!
//! ## Main Types
//!
//! - [`Delegate`] - single target, [`Delegate::invoke`] returns `Result<R, DelegateError>`
//! - [`Signal`] - ordered subscribers, [`Signal::dispatch`] notifies all of them
//! - [`ContextKey`] - identity used to disconnect instances and closures
//! - [`SignalEvent`] - events passed to [`Signal::set_trace_callback`]
//! - [`define_signal!`] - declares a thread-local signal with free-function access

mod binding;
mod delegate;
mod delegate_error;
mod macros;
mod signal;
mod signal_event;
mod signature;

pub use binding::ContextKey;
pub use delegate::Delegate;
pub use delegate_error::DelegateError;
pub use signal::{Signal, TraceCallback};
pub use signal_event::{SignalEvent, SlotKind};
pub use signature::Signature;
