//! # Cinder
//!
//! A minimal stack-based bytecode interpreter. Programs are a literal pool
//! plus a byte stream of variable-width instructions; a single flat frame
//! executes them against a small object model and a pluggable method
//! dispatcher.
//!
//! ```no_run
//! use cinder::bytecode::Program;
//! use cinder::runtime::{Kernel, Runtime, Vm};
//!
//! let runtime = Runtime::init();
//! let mut kernel = Kernel::stdout();
//! Vm::new().run(&runtime, &Program::demo(), &mut kernel).unwrap();
//! runtime.teardown();
//! ```

pub mod bytecode;
pub mod logger;
pub mod runtime;
