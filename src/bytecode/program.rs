use crate::bytecode::{Literal, LiteralPool, Opcode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A pre-built bytecode program: a literal pool plus one instruction stream.
///
/// Programs are persisted with postcard. There is no assembler; streams are
/// written out byte by byte.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    pub literals: LiteralPool,
    pub code: Vec<u8>,
}

#[derive(Debug, Error)]
pub enum ProgramError {
    #[error("failed to encode program: {0}")]
    Encode(#[source] postcard::Error),

    #[error("failed to decode program: {0}")]
    Decode(#[source] postcard::Error),
}

impl Program {
    pub fn new(literals: LiteralPool, code: Vec<u8>) -> Self {
        Self { literals, code }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, ProgramError> {
        postcard::to_allocvec(self).map_err(ProgramError::Encode)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ProgramError> {
        postcard::from_bytes(bytes).map_err(ProgramError::Decode)
    }

    /// The reference program:
    ///
    /// ```text
    /// print("the answer is:")
    /// a = 30 + 2
    /// if true
    ///   print(a)
    /// end
    /// ```
    pub fn demo() -> Self {
        use Opcode::*;

        let literals = LiteralPool::from_iter([
            Literal::from("the answer is:"),
            "print".into(),
            30.into(),
            2.into(),
        ]);

        #[rustfmt::skip]
        let code = vec![
            PushSelf as u8,
            PushString as u8, 0, // [self, "the answer is:"]
            Call as u8, 1, 1, // print
            PushNumber as u8, 2, // [30]
            PushNumber as u8, 3, // [30, 2]
            Add as u8, // [32]
            SetLocal as u8, 0, // a
            PushBool as u8, 1, // [true]
            JumpUnless as u8, 6,
            PushSelf as u8,
            GetLocal as u8, 0, // [self, 32]
            Call as u8, 1, 1,
            Return as u8,
        ];

        Self::new(literals, code)
    }
}
