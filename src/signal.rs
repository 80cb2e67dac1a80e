//! Ordered multi-subscriber notifier.
//!
//! A [`Signal`] keeps an ordered list of slots. Each slot is a bound function, a bound
//! instance method, or a closure the signal owns. Dispatching calls every slot in
//! connection order and discards their return values.
//!
//! # Reentrancy
//!
//! While a dispatch runs the slot list is checked out of the signal. Callbacks may
//! still use the signal:
//!
//! - `connect*` is queued and applied once the dispatch returns, so the new slot is
//!   first called by the next dispatch.
//! - `disconnect*` and `clear` are queued the same way; every slot of the running
//!   dispatch is still called once.
//! - A nested dispatch on the same signal is ignored.
//!
//! If a slot panics, the remaining slots of that dispatch are skipped, the slot list is
//! restored and queued mutations are applied before the panic leaves `dispatch`.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::mem;
use std::rc::Rc;

use log::{debug, trace, warn};

use crate::binding::Binding;
use crate::{ContextKey, DelegateError, Signature, SignalEvent, SlotKind};

/// Type alias for a per-signal tracing callback.
///
/// The callback receives every [`SignalEvent`] emitted by the signal it is set on.
pub type TraceCallback = dyn Fn(&SignalEvent) + 'static;

type Callable<S> = Box<dyn FnMut(<S as Signature>::Args) -> <S as Signature>::Output>;

enum Slot<S: Signature> {
    Bound(Binding<S>),
    Closure {
        key: ContextKey,
        owns_capture: bool,
        callable: Callable<S>,
    },
}

impl<S: Signature> Slot<S> {
    fn context(&self) -> Option<ContextKey> {
        match self {
            Slot::Bound(binding) => binding.context(),
            Slot::Closure { key, .. } => Some(*key),
        }
    }

    fn kind(&self) -> SlotKind {
        match self {
            Slot::Bound(binding) => binding.kind(),
            Slot::Closure { .. } => SlotKind::Closure,
        }
    }

    fn owns_capture(&self) -> bool {
        matches!(
            self,
            Slot::Closure {
                owns_capture: true,
                ..
            }
        )
    }

    /// Calls the slot; returns `false` if its instance has been dropped.
    fn invoke(&mut self, args: S::Args) -> bool {
        match self {
            Slot::Bound(binding) => match binding.call(args) {
                Ok(_) => true,
                Err(DelegateError::InstanceDropped { .. }) => false,
                Err(err) => panic!("{err}"),
            },
            Slot::Closure { callable, .. } => {
                callable(args);
                true
            }
        }
    }
}

/// Which slots a removal request targets.
#[derive(Debug, Clone, Copy)]
enum Removal {
    Context(ContextKey),
    Function(usize),
    Method {
        method: usize,
        instance: Option<ContextKey>,
    },
    Expired,
    All,
}

impl Removal {
    fn matches<S: Signature>(&self, slot: &Slot<S>) -> bool {
        match (self, slot) {
            (Removal::Context(key), slot) => slot.context() == Some(*key),
            (Removal::Function(address), Slot::Bound(Binding::Function(function))) => {
                function.address() == *address
            }
            (
                Removal::Method { method, instance },
                Slot::Bound(Binding::Method {
                    method: bound,
                    instance: key,
                    ..
                }),
            ) => method == bound && instance.map_or(true, |instance| instance == *key),
            (Removal::Expired, Slot::Bound(binding)) => !binding.is_live(),
            (Removal::All, _) => true,
            _ => false,
        }
    }

    fn event(&self, removed: usize, released: usize) -> SignalEvent {
        match self {
            Removal::Expired => SignalEvent::Expired { removed },
            Removal::All => SignalEvent::Clear { removed },
            _ => SignalEvent::Disconnect { removed, released },
        }
    }
}

/// A mutation requested while the slot list was checked out.
enum Deferred<S: Signature> {
    Connect(Slot<S>),
    Remove(Removal),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Dispatching,
    Releasing,
}

/// An ordered list of subscribers notified together.
///
/// The call shape `S` is a function-pointer type; `Signal<fn(i32)>` notifies
/// subscribers taking one `i32`. Return values of subscribers are discarded.
///
/// All methods take `&self`, so a callback may hold an `Rc<Signal<_>>` and connect or
/// disconnect while it is being dispatched (see the module documentation).
///
/// # Examples
///
/// ```rust
/// use slot_signals::Signal;
/// use std::cell::{Cell, RefCell};
/// use std::rc::Rc;
///
/// struct Meter {
///     hits: u32,
/// }
///
/// impl Meter {
///     fn hit(&mut self, _amount: u32) {
///         self.hits += 1;
///     }
/// }
///
/// let meter = Rc::new(RefCell::new(Meter { hits: 0 }));
/// let sum = Rc::new(Cell::new(0));
///
/// let signal: Signal<fn(u32)> = Signal::new();
/// signal.connect_method(&meter, Meter::hit);
/// let sink = sum.clone();
/// let handle = signal.connect_closure(move |amount| sink.set(sink.get() + amount));
///
/// signal.dispatch(4);
/// signal.disconnect(handle);
/// signal.dispatch(4);
///
/// assert_eq!(meter.borrow().hits, 2);
/// assert_eq!(sum.get(), 4);
/// ```
pub struct Signal<S: Signature> {
    slots: RefCell<Vec<Slot<S>>>,
    deferred: RefCell<Vec<Deferred<S>>>,
    phase: Cell<Phase>,
    len: Cell<usize>,
    owned: Cell<usize>,
    next_handle: Cell<u64>,
    trace: RefCell<Option<Rc<TraceCallback>>>,
}

impl<S: Signature> Signal<S> {
    /// Creates a signal with no slots.
    pub const fn new() -> Self {
        Signal {
            slots: RefCell::new(Vec::new()),
            deferred: RefCell::new(Vec::new()),
            phase: Cell::new(Phase::Idle),
            len: Cell::new(0),
            owned: Cell::new(0),
            next_handle: Cell::new(0),
            trace: RefCell::new(None),
        }
    }

    /// Creates a signal with room for `capacity` slots before reallocating.
    pub fn with_capacity(capacity: usize) -> Self {
        let signal = Self::new();
        signal.slots.borrow_mut().reserve(capacity);
        signal
    }

    // ---------------------------------------------------------------------------------------------
    // Tracing
    // ---------------------------------------------------------------------------------------------

    /// Set a tracing callback for this signal.
    ///
    /// The callback is invoked for every connect, disconnect, clear and dispatch. It is
    /// called without any internal borrow held, so it may use the signal.
    pub fn set_trace_callback(&self, callback: impl Fn(&SignalEvent) + 'static) {
        *self.trace.borrow_mut() = Some(Rc::new(callback));
    }

    /// Clear the tracing callback.
    pub fn clear_trace_callback(&self) {
        *self.trace.borrow_mut() = None;
    }

    fn emit_event(&self, event: &SignalEvent) {
        trace!("signal {event}");
        let callback = self.trace.borrow().clone();
        if let Some(callback) = callback {
            callback(event);
        }
    }

    // ---------------------------------------------------------------------------------------------
    // Registration
    // ---------------------------------------------------------------------------------------------

    /// Connects a free function.
    ///
    /// Connecting the same function twice makes it run twice per dispatch.
    pub fn connect(&self, function: S) {
        self.insert(Slot::Bound(Binding::Function(function)));
    }

    /// Connects a closure taking packed arguments.
    ///
    /// [`connect_closure`](Signal::connect_closure) is the unpacked form of this method.
    /// Closures that capture state are moved into a heap block owned by the signal and
    /// dropped exactly once: when disconnected, cleared, or when the signal is dropped.
    /// Capture-free closures are stored without allocating.
    pub fn connect_packed<F>(&self, closure: F) -> ContextKey
    where
        F: FnMut(S::Args) -> S::Output + 'static,
    {
        let owns_capture = mem::size_of::<F>() != 0;
        self.insert_closure(owns_capture, Box::new(closure))
    }

    fn insert_closure(&self, owns_capture: bool, callable: Callable<S>) -> ContextKey {
        let handle = self.next_handle.get();
        self.next_handle.set(handle + 1);

        let key = ContextKey::closure(handle);
        self.insert(Slot::Closure {
            key,
            owns_capture,
            callable,
        });
        key
    }

    fn insert(&self, slot: Slot<S>) {
        if self.phase.get() != Phase::Idle {
            trace!("signal queued connect of {}", slot.kind());
            self.deferred.borrow_mut().push(Deferred::Connect(slot));
            return;
        }

        let event = SignalEvent::Connect {
            kind: slot.kind(),
            owned: slot.owns_capture(),
        };
        self.len.set(self.len.get() + 1);
        if slot.owns_capture() {
            self.owned.set(self.owned.get() + 1);
        }
        self.slots.borrow_mut().push(slot);
        self.emit_event(&event);
    }

    // ---------------------------------------------------------------------------------------------
    // Removal
    // ---------------------------------------------------------------------------------------------

    /// Disconnects every slot whose context is `key`.
    ///
    /// `key` is either [`ContextKey::of`] an instance, which removes all of its methods,
    /// or the handle returned by [`connect_closure`](Signal::connect_closure). Owned
    /// closure state is released before this returns. Returns the number of slots
    /// removed; `0` when called during a dispatch, as the request is queued.
    pub fn disconnect(&self, key: ContextKey) -> usize {
        self.remove(Removal::Context(key))
    }

    /// Disconnects every method bound to `instance`.
    pub fn disconnect_instance<T: ?Sized>(&self, instance: &Rc<T>) -> usize {
        self.disconnect(ContextKey::of(instance))
    }

    /// Disconnects every slot connected with `function`, including duplicates.
    pub fn disconnect_fn(&self, function: S) -> usize {
        self.remove(Removal::Function(function.address()))
    }

    /// Disconnects every slot, releasing all owned closure state.
    pub fn clear(&self) -> usize {
        self.remove(Removal::All)
    }

    fn remove(&self, removal: Removal) -> usize {
        if self.phase.get() != Phase::Idle {
            trace!("signal queued {removal:?}");
            self.deferred.borrow_mut().push(Deferred::Remove(removal));
            return 0;
        }

        let mut checkout = self.checkout(Phase::Releasing);
        let before = checkout.slots.len();
        let mut released = 0;
        checkout.slots.retain(|slot| {
            let hit = removal.matches(slot);
            if hit && slot.owns_capture() {
                released += 1;
            }
            !hit
        });
        let removed = before - checkout.slots.len();
        drop(checkout);

        if removed > 0 {
            debug!("signal removed {removed} slot(s), released {released} capture(s)");
        }
        self.emit_event(&removal.event(removed, released));
        removed
    }

    // ---------------------------------------------------------------------------------------------
    // Dispatch
    // ---------------------------------------------------------------------------------------------

    /// Calls every slot in connection order with packed arguments.
    ///
    /// [`dispatch`](Signal::dispatch) is the unpacked form of this method. Return values
    /// are discarded and an empty signal does nothing. Method slots whose instance has
    /// been dropped are skipped and removed once the dispatch completes.
    ///
    /// # Panics
    ///
    /// Panics raised by a slot propagate to the caller. A method slot whose instance is
    /// already mutably borrowed panics, as a direct `RefCell::borrow_mut` would.
    pub fn emit(&self, args: S::Args)
    where
        S::Args: Clone,
    {
        if self.phase.get() != Phase::Idle {
            warn!("signal dispatch ignored: signal is already in use by a running operation");
            return;
        }

        self.emit_event(&SignalEvent::Dispatch {
            slots: self.len.get(),
        });

        let mut checkout = self.checkout(Phase::Dispatching);
        let mut expired = false;
        if let Some((last, rest)) = checkout.slots.split_last_mut() {
            for slot in rest {
                expired |= !slot.invoke(args.clone());
            }
            expired |= !last.invoke(args);
        }
        drop(checkout);

        if expired {
            self.remove(Removal::Expired);
        }
    }

    // ---------------------------------------------------------------------------------------------
    // Introspection
    // ---------------------------------------------------------------------------------------------

    /// Number of connected slots. Requests queued by a running dispatch are not counted.
    pub fn len(&self) -> usize {
        self.len.get()
    }

    /// Returns `true` if no slot is connected.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of slots owning captured closure state.
    pub fn owned_count(&self) -> usize {
        self.owned.get()
    }

    /// Returns `true` while a dispatch is running.
    pub fn is_dispatching(&self) -> bool {
        self.phase.get() == Phase::Dispatching
    }

    // ---------------------------------------------------------------------------------------------
    // Slot list checkout
    // ---------------------------------------------------------------------------------------------

    fn checkout(&self, phase: Phase) -> Checkout<'_, S> {
        self.phase.set(phase);
        let slots = mem::take(&mut *self.slots.borrow_mut());
        Checkout {
            signal: self,
            slots,
        }
    }

    fn apply_deferred(&self) {
        loop {
            let pending = mem::take(&mut *self.deferred.borrow_mut());
            if pending.is_empty() {
                break;
            }
            for request in pending {
                match request {
                    Deferred::Connect(slot) => self.insert(slot),
                    Deferred::Remove(removal) => {
                        self.remove(removal);
                    }
                }
            }
        }
    }
}

/// Holds the slot list while it is being called or pruned.
///
/// Dropping it, including during unwinding, puts the list back and applies the
/// mutations queued in the meantime.
struct Checkout<'a, S: Signature> {
    signal: &'a Signal<S>,
    slots: Vec<Slot<S>>,
}

impl<S: Signature> Drop for Checkout<'_, S> {
    fn drop(&mut self) {
        let slots = mem::take(&mut self.slots);
        self.signal.len.set(slots.len());
        self.signal
            .owned
            .set(slots.iter().filter(|slot| slot.owns_capture()).count());
        *self.signal.slots.borrow_mut() = slots;
        self.signal.phase.set(Phase::Idle);
        self.signal.apply_deferred();
    }
}

macro_rules! impl_signal_arity {
    ($($A:ident $a:ident),*) => {
        impl<R: 'static, $($A: 'static),*> Signal<fn($($A),*) -> R> {
            /// Connects `method` on `instance`.
            ///
            /// The signal keeps only a weak reference. Once `instance` is dropped the slot
            /// is skipped and pruned by the next dispatch. The slot's context is
            /// [`ContextKey::of`]`(instance)`.
            pub fn connect_method<T: 'static>(
                &self,
                instance: &Rc<RefCell<T>>,
                method: fn(&mut T, $($A),*) -> R,
            ) {
                self.insert(Slot::Bound(Binding::method(
                    instance,
                    method as usize,
                    move |this, ($($a,)*)| method(this, $($a),*),
                )));
            }

            /// Connects a closure and returns its registration handle.
            ///
            /// Pass the handle to [`Signal::disconnect`] to remove the closure. See
            /// [`Signal::connect_packed`] for how captured state is owned.
            pub fn connect_closure<F>(&self, mut closure: F) -> ContextKey
            where
                F: FnMut($($A),*) -> R + 'static,
            {
                let owns_capture = mem::size_of::<F>() != 0;
                self.insert_closure(
                    owns_capture,
                    Box::new(move |($($a,)*): ($($A,)*)| closure($($a),*)),
                )
            }

            /// Disconnects slots bound to `method`.
            ///
            /// With `Some(instance)` only the slot pairing `method` with that instance is
            /// removed; with `None` every slot bound to `method` is removed regardless of
            /// instance.
            pub fn disconnect_method<T: 'static>(
                &self,
                instance: Option<&Rc<RefCell<T>>>,
                method: fn(&mut T, $($A),*) -> R,
            ) -> usize {
                self.remove(Removal::Method {
                    method: method as usize,
                    instance: instance.map(ContextKey::of),
                })
            }
        }

        impl<R: 'static, $($A: Clone + 'static),*> Signal<fn($($A),*) -> R> {
            /// Calls every slot in connection order.
            ///
            /// See [`Signal::emit`].
            pub fn dispatch(&self, $($a: $A),*) {
                self.emit(($($a,)*))
            }
        }
    };
}

impl_signal_arity!();
impl_signal_arity!(A1 a1);
impl_signal_arity!(A1 a1, A2 a2);
impl_signal_arity!(A1 a1, A2 a2, A3 a3);
impl_signal_arity!(A1 a1, A2 a2, A3 a3, A4 a4);
impl_signal_arity!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5);
impl_signal_arity!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6);

impl<S: Signature> Default for Signal<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Signature> fmt::Debug for Signal<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("len", &self.len.get())
            .field("owned", &self.owned.get())
            .field("dispatching", &self.is_dispatching())
            .finish()
    }
}

// -------------------------------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------------------------------
