pub mod disasm;
pub mod instruction;
pub mod literal;
pub mod op;
pub mod program;
pub mod verify;

pub use instruction::{DecodeError, Instruction, Instructions};
pub use literal::{Literal, LiteralPool};
pub use op::Opcode;
pub use program::{Program, ProgramError};
