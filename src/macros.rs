//! Macros for declaring named signals.
//!
//! This module provides a macro-based approach to declare a signal once and reach it
//! from anywhere on the current thread through free functions.

/// Declares a module holding a thread-local [`Signal`](crate::Signal).
///
/// The macro generates a module containing:
/// - The signal itself (hidden, one instance per thread)
/// - `with` for full access to the signal
/// - Free functions for the common operations
///
/// # Examples
///
/// ```rust
/// use slot_signals::define_signal;
/// use std::cell::Cell;
///
/// thread_local! {
///     static TOTAL: Cell<i32> = const { Cell::new(0) };
/// }
///
/// fn add(x: i32) {
///     TOTAL.with(|total| total.set(total.get() + x));
/// }
///
/// define_signal!(on_value: fn(i32));
///
/// on_value::connect(add);
/// on_value::emit((5,));
/// on_value::with(|signal| signal.dispatch(7));
///
/// assert_eq!(TOTAL.with(Cell::get), 12);
/// assert_eq!(on_value::len(), 1);
/// ```
///
/// # Multiple Signals
///
/// Each declaration is isolated:
///
/// ```rust
/// use slot_signals::define_signal;
///
/// define_signal!(opened: fn());
/// define_signal!(closed: fn());
///
/// opened::with(|signal| signal.connect_closure(|| {}));
///
/// assert_eq!(opened::len(), 1);
/// assert_eq!(closed::len(), 0);
/// ```
#[macro_export]
macro_rules! define_signal {
    ($name:ident : $sig:ty) => {
        pub mod $name {
            #[allow(unused_imports)]
            use super::*;

            thread_local! {
                // One signal per thread (module-private)
                static SIGNAL: $crate::Signal<$sig> = $crate::Signal::new();
            }

            /// Run `f` with this thread's signal.
            pub fn with<R>(f: impl FnOnce(&$crate::Signal<$sig>) -> R) -> R {
                SIGNAL.with(f)
            }

            /// Connect a free function.
            pub fn connect(function: $sig) {
                with(|signal| signal.connect(function))
            }

            /// Disconnect every slot with the given context.
            pub fn disconnect(key: $crate::ContextKey) -> usize {
                with(|signal| signal.disconnect(key))
            }

            /// Disconnect every slot connected with `function`.
            pub fn disconnect_fn(function: $sig) -> usize {
                with(|signal| signal.disconnect_fn(function))
            }

            /// Call every slot with packed arguments.
            pub fn emit(args: <$sig as $crate::Signature>::Args) {
                with(|signal| signal.emit(args))
            }

            /// Number of connected slots.
            pub fn len() -> usize {
                with(|signal| signal.len())
            }

            /// Disconnect every slot.
            pub fn clear() -> usize {
                with(|signal| signal.clear())
            }

            /// Set a tracing callback for this signal.
            pub fn set_trace_callback(
                callback: impl Fn(&$crate::SignalEvent) + 'static,
            ) {
                with(|signal| signal.set_trace_callback(callback))
            }

            /// Clear the tracing callback.
            pub fn clear_trace_callback() {
                with(|signal| signal.clear_trace_callback())
            }
        }
    };
}
