//! # Runtime
//!
//! The execution engine and the collaborators it runs against:
//!
//! - [`vm`]: the fetch-decode-execute loop over one flat frame.
//! - [`object`]: values, the shared nil/true/false singletons, and the
//!   [`Runtime`] factory that brackets every run.
//! - [`dispatch`]: the seam CALL goes through.
//! - [`kernel`]: a small built-in method table behind that seam.

pub mod dispatch;
pub mod kernel;
pub mod object;
pub mod runtime_error;
pub mod stack;
pub mod vm;

pub use dispatch::{DispatchError, Dispatcher};
pub use kernel::{Kernel, KernelError};
pub use object::{Object, ObjectRef, Runtime};
pub use runtime_error::RuntimeError;
pub use vm::{Halt, Vm, VmConfig};
