use crate::runtime::dispatch::{DispatchError, Dispatcher};
use crate::runtime::object::{Object, ObjectRef, Runtime};
use std::io::{self, Write};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum KernelError {
    #[error("undefined method '{method}' for {receiver}")]
    NoMethod {
        method: String,
        receiver: &'static str,
    },

    #[error("wrong number of arguments for '{method}' (given {given}, expected {expected})")]
    Arity {
        method: String,
        given: usize,
        expected: usize,
    },

    #[error("type error in '{method}': expected {expected}, got {got}")]
    Type {
        method: String,
        expected: &'static str,
        got: &'static str,
    },

    #[error("integer overflow in '{method}'")]
    Overflow { method: String },

    #[error("write failed: {0}")]
    Io(#[from] io::Error),
}

/// Built-in method table, resolved on the receiver's kind.
///
/// Output from `print`/`puts` goes to the wrapped writer.
pub struct Kernel<W: Write> {
    out: W,
}

impl Kernel<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> Kernel<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn print(&mut self, runtime: &Runtime, args: &[ObjectRef]) -> Result<ObjectRef, KernelError> {
        // Arguments arrive last-pushed first; print them in source order.
        for arg in args.iter().rev() {
            writeln!(self.out, "{}", arg)?;
        }
        self.out.flush()?;
        Ok(runtime.nil())
    }

    fn call(
        &mut self,
        runtime: &Runtime,
        receiver: &ObjectRef,
        method: &str,
        args: &[ObjectRef],
    ) -> Result<ObjectRef, KernelError> {
        let arity = |expected: usize| {
            if args.len() == expected {
                Ok(())
            } else {
                Err(KernelError::Arity {
                    method: method.to_string(),
                    given: args.len(),
                    expected,
                })
            }
        };

        match (receiver.as_ref(), method) {
            (Object::Instance(_), "print" | "puts") => self.print(runtime, args),

            (_, "to_s") => {
                arity(0)?;
                Ok(runtime.new_string(&receiver.to_string()))
            }
            (_, "inspect") => {
                arity(0)?;
                Ok(runtime.new_string(&receiver.inspect()))
            }
            (_, "nil?") => {
                arity(0)?;
                Ok(runtime.boolean(matches!(receiver.as_ref(), Object::Nil)))
            }
            (_, "==") => {
                arity(1)?;
                let other = &args[0];
                Ok(runtime.boolean(Arc::ptr_eq(receiver, other) || receiver == other))
            }

            (Object::Number(a), "+" | "-" | "*") => {
                arity(1)?;
                let b = args[0].number_value().ok_or_else(|| KernelError::Type {
                    method: method.to_string(),
                    expected: "Number",
                    got: args[0].kind(),
                })?;
                let result = match method {
                    "+" => a.checked_add(b),
                    "-" => a.checked_sub(b),
                    _ => a.checked_mul(b),
                };
                result
                    .map(|n| runtime.new_number(n))
                    .ok_or_else(|| KernelError::Overflow {
                        method: method.to_string(),
                    })
            }

            (Object::String(s), "length") => {
                arity(0)?;
                Ok(runtime.new_number(s.chars().count() as i64))
            }
            (Object::String(s), "+") => {
                arity(1)?;
                let other = args[0].as_str().ok_or_else(|| KernelError::Type {
                    method: method.to_string(),
                    expected: "String",
                    got: args[0].kind(),
                })?;
                Ok(runtime.new_string(&format!("{}{}", s, other)))
            }

            (obj, _) => Err(KernelError::NoMethod {
                method: method.to_string(),
                receiver: obj.kind(),
            }),
        }
    }
}

impl<W: Write> Dispatcher for Kernel<W> {
    fn invoke(
        &mut self,
        runtime: &Runtime,
        receiver: ObjectRef,
        method: &str,
        args: &[ObjectRef],
    ) -> Result<ObjectRef, DispatchError> {
        tracing::debug!(
            receiver = receiver.kind(),
            method,
            argc = args.len(),
            "kernel dispatch"
        );
        Ok(self.call(runtime, &receiver, method, args)?)
    }
}
