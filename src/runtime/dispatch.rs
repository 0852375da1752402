use crate::runtime::object::{ObjectRef, Runtime};

/// Failure reported by a dispatcher. The engine never inspects it; it is
/// forwarded to the caller as the source of [`RuntimeError::Dispatch`].
///
/// [`RuntimeError::Dispatch`]: crate::runtime::RuntimeError::Dispatch
pub type DispatchError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Resolves a method name against a receiver and runs it.
///
/// `args` holds the call's arguments in the order CALL popped them: the
/// most recently pushed argument comes first. `args.len()` is the argument
/// count. Implementations must return exactly one object.
pub trait Dispatcher {
    fn invoke(
        &mut self,
        runtime: &Runtime,
        receiver: ObjectRef,
        method: &str,
        args: &[ObjectRef],
    ) -> Result<ObjectRef, DispatchError>;
}
