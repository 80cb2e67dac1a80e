//! Type-erased representation of one bound callable.
//!
//! A [`Binding`] is either a plain function pointer or an instance method reached
//! through a weak reference. Both delegates and signals store targets this way;
//! signals additionally own closures (see `signal.rs`).

use std::any::{type_name, Any};
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::{DelegateError, Signature, SlotKind};

/// Identity of the context a callable runs against.
///
/// A key is either the address of an instance's shared cell, obtained with
/// [`ContextKey::of`], or the registration handle returned by
/// [`Signal::connect_closure`](crate::Signal::connect_closure). Keys are used to
/// disconnect every slot bound to the same context.
///
/// # Examples
///
/// ```rust
/// use slot_signals::ContextKey;
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// let a = Rc::new(RefCell::new(0));
/// let b = Rc::new(RefCell::new(0));
/// assert_eq!(ContextKey::of(&a), ContextKey::of(&a.clone()));
/// assert_ne!(ContextKey::of(&a), ContextKey::of(&b));
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextKey(Repr);

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
enum Repr {
    Instance(usize),
    Closure(u64),
}

impl ContextKey {
    /// Returns the key of a shared instance.
    ///
    /// All clones of the same `Rc` yield the same key.
    pub fn of<T: ?Sized>(instance: &Rc<T>) -> Self {
        ContextKey(Repr::Instance(Rc::as_ptr(instance) as *const () as usize))
    }

    pub(crate) fn closure(handle: u64) -> Self {
        ContextKey(Repr::Closure(handle))
    }

    /// Returns `true` if this key was handed out for a connected closure.
    pub fn is_closure(&self) -> bool {
        matches!(self.0, Repr::Closure(_))
    }
}

impl fmt::Debug for ContextKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Repr::Instance(addr) => write!(f, "ContextKey::Instance({addr:#x})"),
            Repr::Closure(handle) => write!(f, "ContextKey::Closure({handle})"),
        }
    }
}

type Trampoline<S> =
    Rc<dyn Fn(<S as Signature>::Args) -> Result<<S as Signature>::Output, DelegateError>>;

/// One bound function or method.
pub(crate) enum Binding<S: Signature> {
    Function(S),
    Method {
        instance: ContextKey,
        method: usize,
        liveness: Weak<dyn Any>,
        trampoline: Trampoline<S>,
    },
}

impl<S: Signature> Binding<S> {
    /// Binds `invoke` to a weakly held instance.
    ///
    /// `method` is the address of the user's method pointer and only serves as
    /// its identity; `invoke` performs the actual call.
    pub(crate) fn method<T: 'static>(
        instance: &Rc<RefCell<T>>,
        method: usize,
        invoke: impl Fn(&mut T, S::Args) -> S::Output + 'static,
    ) -> Self {
        let weak = Rc::downgrade(instance);
        let liveness: Weak<dyn Any> = weak.clone();

        let call = move |args: S::Args| -> Result<S::Output, DelegateError> {
            let instance = weak.upgrade().ok_or(DelegateError::InstanceDropped {
                type_name: type_name::<T>(),
            })?;
            let mut this =
                instance
                    .try_borrow_mut()
                    .map_err(|_| DelegateError::InstanceBorrowed {
                        type_name: type_name::<T>(),
                    })?;
            Ok(invoke(&mut this, args))
        };

        Binding::Method {
            instance: ContextKey::of(instance),
            method,
            liveness,
            trampoline: Rc::new(call),
        }
    }

    #[inline]
    pub(crate) fn call(&self, args: S::Args) -> Result<S::Output, DelegateError> {
        match self {
            Binding::Function(function) => Ok(function.apply(args)),
            Binding::Method { trampoline, .. } => trampoline(args),
        }
    }

    pub(crate) fn context(&self) -> Option<ContextKey> {
        match self {
            Binding::Function(_) => None,
            Binding::Method { instance, .. } => Some(*instance),
        }
    }

    pub(crate) fn kind(&self) -> SlotKind {
        match self {
            Binding::Function(_) => SlotKind::Function,
            Binding::Method { .. } => SlotKind::Method,
        }
    }

    /// `false` once the instance behind a method binding is gone.
    pub(crate) fn is_live(&self) -> bool {
        match self {
            Binding::Function(_) => true,
            Binding::Method { liveness, .. } => liveness.strong_count() > 0,
        }
    }
}

impl<S: Signature> Clone for Binding<S> {
    fn clone(&self) -> Self {
        match self {
            Binding::Function(function) => Binding::Function(*function),
            Binding::Method {
                instance,
                method,
                liveness,
                trampoline,
            } => Binding::Method {
                instance: *instance,
                method: *method,
                liveness: liveness.clone(),
                trampoline: Rc::clone(trampoline),
            },
        }
    }
}

impl<S: Signature> fmt::Debug for Binding<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Binding::Function(function) => f
                .debug_tuple("Function")
                .field(&format_args!("{:#x}", function.address()))
                .finish(),
            Binding::Method {
                instance, method, ..
            } => f
                .debug_struct("Method")
                .field("instance", instance)
                .field("method", &format_args!("{method:#x}"))
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counter {
        hits: i32,
    }

    impl Counter {
        fn add(&mut self, amount: i32) -> i32 {
            self.hits += amount;
            self.hits
        }
    }

    fn negate(x: i32) -> i32 {
        -x
    }

    fn method_binding(instance: &Rc<RefCell<Counter>>) -> Binding<fn(i32) -> i32> {
        let method: fn(&mut Counter, i32) -> i32 = Counter::add;
        Binding::method(instance, method as usize, move |this, (amount,)| {
            method(this, amount)
        })
    }

    #[test]
    fn test_function_binding_has_no_context() {
        let binding: Binding<fn(i32) -> i32> = Binding::Function(negate);
        assert_eq!(binding.call((4,)), Ok(-4));
        assert_eq!(binding.context(), None);
        assert_eq!(binding.kind(), SlotKind::Function);
        assert!(binding.is_live());
    }

    #[test]
    fn test_method_binding_calls_instance() {
        let counter = Rc::new(RefCell::new(Counter { hits: 0 }));
        let binding = method_binding(&counter);

        assert_eq!(binding.call((2,)), Ok(2));
        assert_eq!(binding.call((3,)), Ok(5));
        assert_eq!(counter.borrow().hits, 5);
        assert_eq!(binding.context(), Some(ContextKey::of(&counter)));
        assert_eq!(binding.kind(), SlotKind::Method);
    }

    #[test]
    fn test_method_binding_does_not_keep_instance_alive() {
        let counter = Rc::new(RefCell::new(Counter { hits: 0 }));
        let binding = method_binding(&counter);
        assert_eq!(Rc::strong_count(&counter), 1);
        assert!(binding.is_live());

        drop(counter);
        assert!(!binding.is_live());
        assert!(matches!(
            binding.call((1,)),
            Err(DelegateError::InstanceDropped { .. })
        ));
    }

    #[test]
    fn test_method_binding_reports_borrowed_instance() {
        let counter = Rc::new(RefCell::new(Counter { hits: 0 }));
        let binding = method_binding(&counter);

        let _guard = counter.borrow_mut();
        assert!(matches!(
            binding.call((1,)),
            Err(DelegateError::InstanceBorrowed { .. })
        ));
    }

    #[test]
    fn test_clone_shares_target() {
        let counter = Rc::new(RefCell::new(Counter { hits: 0 }));
        let binding = method_binding(&counter);
        let cloned = binding.clone();

        binding.call((1,)).unwrap();
        cloned.call((1,)).unwrap();
        assert_eq!(counter.borrow().hits, 2);
    }

    #[test]
    fn test_context_key_identity() {
        let a = Rc::new(RefCell::new(Counter { hits: 0 }));
        let b = Rc::new(RefCell::new(Counter { hits: 0 }));
        assert_eq!(ContextKey::of(&a), ContextKey::of(&Rc::clone(&a)));
        assert_ne!(ContextKey::of(&a), ContextKey::of(&b));
        assert!(!ContextKey::of(&a).is_closure());
        assert!(ContextKey::closure(3).is_closure());
        assert_ne!(ContextKey::closure(3), ContextKey::closure(4));
    }

    #[test]
    fn test_debug_format() {
        let key = ContextKey::closure(7);
        assert_eq!(format!("{key:?}"), "ContextKey::Closure(7)");

        let binding: Binding<fn(i32) -> i32> = Binding::Function(negate);
        assert!(format!("{binding:?}").starts_with("Function(0x"));
    }
}
