//! Single-target callable holder.
//!
//! A [`Delegate`] stores at most one target, a free function or a method bound to an
//! instance, and forwards calls to it. Rebinding replaces the previous target; nothing
//! is ever owned by the delegate, so clearing never frees memory.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use log::trace;

use crate::binding::Binding;
use crate::{ContextKey, DelegateError, Signature};

/// A single-slot binder for a function or an instance method.
///
/// The call shape `S` is a function-pointer type such as `fn(i32) -> i32`.
///
/// # Examples
///
/// ```rust
/// use slot_signals::{Delegate, DelegateError};
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// struct Scale {
///     factor: i32,
/// }
///
/// impl Scale {
///     fn apply(&mut self, x: i32) -> i32 {
///         x * self.factor
///     }
/// }
///
/// let scale = Rc::new(RefCell::new(Scale { factor: 3 }));
///
/// let mut delegate: Delegate<fn(i32) -> i32> = Delegate::new();
/// assert_eq!(delegate.invoke(1), Err(DelegateError::Unbound));
///
/// delegate.bind_method(&scale, Scale::apply);
/// assert_eq!(delegate.invoke(14), Ok(42));
/// ```
pub struct Delegate<S: Signature> {
    binding: Option<Binding<S>>,
}

impl<S: Signature> Delegate<S> {
    /// Creates an unbound delegate.
    pub const fn new() -> Self {
        Delegate { binding: None }
    }

    /// Creates a delegate bound to `function`.
    pub fn from_fn(function: S) -> Self {
        Delegate {
            binding: Some(Binding::Function(function)),
        }
    }

    /// Binds a free function, replacing any previous target.
    pub fn bind(&mut self, function: S) {
        trace!(
            "delegate bind {{ function: {:#x} }}",
            function.address()
        );
        self.binding = Some(Binding::Function(function));
    }

    /// Calls the bound target with packed arguments.
    ///
    /// [`invoke`](Delegate::invoke) is the unpacked form of this method.
    ///
    /// # Errors
    ///
    /// - [`DelegateError::Unbound`] if nothing is bound
    /// - [`DelegateError::InstanceDropped`] if the bound method's instance is gone
    /// - [`DelegateError::InstanceBorrowed`] if the bound method's instance is already
    ///   mutably borrowed
    pub fn call(&self, args: S::Args) -> Result<S::Output, DelegateError> {
        self.binding
            .as_ref()
            .ok_or(DelegateError::Unbound)?
            .call(args)
    }

    /// Returns whether a target is bound.
    ///
    /// A bound method whose instance has been dropped still counts as bound.
    pub fn is_bound(&self) -> bool {
        self.binding.is_some()
    }

    /// Returns the context of the bound method, if any.
    pub fn context(&self) -> Option<ContextKey> {
        self.binding.as_ref().and_then(Binding::context)
    }

    /// Clears the bound target.
    pub fn clear(&mut self) {
        self.binding = None;
    }

    fn bind_binding(&mut self, binding: Binding<S>) {
        trace!("delegate bind {:?}", binding);
        self.binding = Some(binding);
    }
}

macro_rules! impl_delegate_arity {
    ($($A:ident $a:ident),*) => {
        impl<R: 'static, $($A: 'static),*> Delegate<fn($($A),*) -> R> {
            /// Binds `method` on `instance`, replacing any previous target.
            ///
            /// The delegate keeps only a weak reference; `instance` must stay alive for
            /// calls to succeed.
            pub fn bind_method<T: 'static>(
                &mut self,
                instance: &Rc<RefCell<T>>,
                method: fn(&mut T, $($A),*) -> R,
            ) {
                self.bind_binding(Binding::method(
                    instance,
                    method as usize,
                    move |this, ($($a,)*)| method(this, $($a),*),
                ));
            }

            /// Calls the bound target.
            ///
            /// # Errors
            ///
            /// See [`Delegate::call`].
            pub fn invoke(&self, $($a: $A),*) -> Result<R, DelegateError> {
                self.call(($($a,)*))
            }
        }
    };
}

impl_delegate_arity!();
impl_delegate_arity!(A1 a1);
impl_delegate_arity!(A1 a1, A2 a2);
impl_delegate_arity!(A1 a1, A2 a2, A3 a3);
impl_delegate_arity!(A1 a1, A2 a2, A3 a3, A4 a4);
impl_delegate_arity!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5);
impl_delegate_arity!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6);

impl<S: Signature> Default for Delegate<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Signature> Clone for Delegate<S> {
    fn clone(&self) -> Self {
        Delegate {
            binding: self.binding.clone(),
        }
    }
}

impl<S: Signature> fmt::Debug for Delegate<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Delegate")
            .field("binding", &self.binding)
            .finish()
    }
}

// -------------------------------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------------------------------
