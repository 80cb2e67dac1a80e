use thiserror::Error;

/// Errors returned when calling through a [`Delegate`](crate::Delegate).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DelegateError {
    /// The delegate has no bound target.
    #[error("Cannot call delegate without any bound target")]
    Unbound,

    /// The instance behind a bound method has been dropped.
    #[error("Bound instance of type {type_name} has been dropped")]
    InstanceDropped { type_name: &'static str },

    /// The instance behind a bound method is already mutably borrowed,
    /// usually because the call re-entered a method of the same instance.
    #[error("Bound instance of type {type_name} is already borrowed")]
    InstanceBorrowed { type_name: &'static str },
}
