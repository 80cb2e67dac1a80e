//! Call shapes for delegates and signals.
//!
//! A call shape is spelled as a function-pointer type such as `fn(i32, i32) -> i32`.
//! [`Signature`] splits it into an argument tuple and a return type, which lets the
//! rest of the crate store and call targets generically over the arity.

/// A function-pointer type usable as the call shape of a delegate or signal.
///
/// Implemented for `fn(A1, ..., An) -> R` with up to six arguments. All argument
/// and return types must be `'static`, so borrowed arguments are not supported.
///
/// # Examples
///
/// ```rust
/// use slot_signals::Signature;
///
/// fn add(a: i32, b: i32) -> i32 {
///     a + b
/// }
///
/// let f: fn(i32, i32) -> i32 = add;
/// assert_eq!(f.apply((2, 3)), 5);
/// ```
pub trait Signature: Copy + 'static {
    /// The arguments, packed as a tuple.
    type Args: 'static;

    /// The return type.
    type Output: 'static;

    /// Calls the function pointer with unpacked arguments.
    fn apply(self, args: Self::Args) -> Self::Output;

    /// Address of the function, used as its identity when disconnecting.
    ///
    /// Identical functions may be merged by the compiler, and the same function may
    /// occasionally have distinct addresses across codegen units.
    fn address(self) -> usize;
}

macro_rules! impl_signature {
    ($($A:ident $a:ident),*) => {
        impl<R: 'static, $($A: 'static),*> Signature for fn($($A),*) -> R {
            type Args = ($($A,)*);
            type Output = R;

            #[inline]
            fn apply(self, ($($a,)*): Self::Args) -> R {
                self($($a),*)
            }

            #[inline]
            fn address(self) -> usize {
                self as usize
            }
        }
    };
}

impl_signature!();
impl_signature!(A1 a1);
impl_signature!(A1 a1, A2 a2);
impl_signature!(A1 a1, A2 a2, A3 a3);
impl_signature!(A1 a1, A2 a2, A3 a3, A4 a4);
impl_signature!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5);
impl_signature!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6);
