use crate::bytecode::Opcode;
use crate::runtime::dispatch::DispatchError;
use thiserror::Error;

/// Why an engine invocation stopped without reaching RETURN.
///
/// `offset` is the byte offset of the opcode being executed.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("stack overflow at offset {offset}: {opcode} exceeds capacity {capacity}")]
    StackOverflow {
        offset: usize,
        opcode: Opcode,
        capacity: usize,
    },

    #[error("stack underflow at offset {offset}: {opcode} popped an empty stack")]
    StackUnderflow { offset: usize, opcode: Opcode },

    #[error("invalid local index {index} at offset {offset} ({capacity} slots)")]
    InvalidLocalIndex {
        offset: usize,
        index: usize,
        capacity: usize,
    },

    #[error("unknown opcode {byte:#04x} at offset {offset}")]
    UnknownOpcode { offset: usize, byte: u8 },

    #[error("type mismatch at offset {offset}: {opcode} expected {expected}, got {found}")]
    TypeMismatch {
        offset: usize,
        opcode: Opcode,
        expected: &'static str,
        found: &'static str,
    },

    #[error("invalid literal index {index} at offset {offset} (pool has {len})")]
    InvalidLiteralIndex {
        offset: usize,
        index: u8,
        len: usize,
    },

    #[error("{opcode} at offset {offset} is missing operand bytes")]
    TruncatedInstruction { offset: usize, opcode: Opcode },

    #[error("too many arguments at offset {offset}: {argc} exceeds the limit of {max}")]
    TooManyArguments {
        offset: usize,
        argc: usize,
        max: usize,
    },

    #[error("integer overflow at offset {offset}: {a} + {b}")]
    ArithmeticOverflow { offset: usize, a: i64, b: i64 },

    #[error("instruction stream ended at offset {offset} without RETURN")]
    MissingReturn { offset: usize },

    #[error("execution step limit exceeded ({limit})")]
    StepLimitExceeded { limit: usize },

    #[error("call to '{method}' at offset {offset} failed")]
    Dispatch {
        offset: usize,
        method: String,
        #[source]
        source: DispatchError,
    },
}

impl RuntimeError {
    /// Offset of the failing instruction, if the failure has one.
    pub fn offset(&self) -> Option<usize> {
        match self {
            RuntimeError::StackOverflow { offset, .. }
            | RuntimeError::StackUnderflow { offset, .. }
            | RuntimeError::InvalidLocalIndex { offset, .. }
            | RuntimeError::UnknownOpcode { offset, .. }
            | RuntimeError::TypeMismatch { offset, .. }
            | RuntimeError::InvalidLiteralIndex { offset, .. }
            | RuntimeError::TruncatedInstruction { offset, .. }
            | RuntimeError::TooManyArguments { offset, .. }
            | RuntimeError::ArithmeticOverflow { offset, .. }
            | RuntimeError::MissingReturn { offset }
            | RuntimeError::Dispatch { offset, .. } => Some(*offset),
            RuntimeError::StepLimitExceeded { .. } => None,
        }
    }
}
