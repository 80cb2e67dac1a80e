use std::fmt;

/// The kind of callable held by a signal slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    /// A free function pointer.
    Function,
    /// A method bound to a weakly referenced instance.
    Method,
    /// A closure, with or without captured state.
    Closure,
}

impl fmt::Display for SlotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotKind::Function => write!(f, "function"),
            SlotKind::Method => write!(f, "method"),
            SlotKind::Closure => write!(f, "closure"),
        }
    }
}

/// Events emitted by a [`Signal`](crate::Signal) during operations.
///
/// These events are passed to the tracing callback set via `Signal::set_trace_callback`.
/// Mutations requested during a dispatch are reported when they are applied.
///
/// # Examples
///
/// ```rust
/// use slot_signals::{SignalEvent, SlotKind};
///
/// let event = SignalEvent::Connect { kind: SlotKind::Closure, owned: true };
/// assert_eq!(event.to_string(), "connect { kind: closure, owned: true }");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignalEvent {
    /// A slot was appended.
    Connect {
        /// What was connected
        kind: SlotKind,
        /// Whether the slot owns captured closure state
        owned: bool,
    },

    /// A disconnect request was applied.
    Disconnect {
        /// Number of slots removed
        removed: usize,
        /// Number of owned captures released with them
        released: usize,
    },

    /// Method slots whose instance was dropped were pruned after a dispatch.
    Expired {
        /// Number of slots removed
        removed: usize,
    },

    /// A dispatch started.
    Dispatch {
        /// Number of slots that will be called
        slots: usize,
    },

    /// The signal was cleared.
    Clear {
        /// Number of slots removed
        removed: usize,
    },
}

impl fmt::Display for SignalEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalEvent::Connect { kind, owned } => {
                write!(f, "connect {{ kind: {kind}, owned: {owned} }}")
            }
            SignalEvent::Disconnect { removed, released } => {
                write!(
                    f,
                    "disconnect {{ removed: {removed}, released: {released} }}"
                )
            }
            SignalEvent::Expired { removed } => write!(f, "expired {{ removed: {removed} }}"),
            SignalEvent::Dispatch { slots } => write!(f, "dispatch {{ slots: {slots} }}"),
            SignalEvent::Clear { removed } => write!(f, "clear {{ removed: {removed} }}"),
        }
    }
}
