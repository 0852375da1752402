use crate::bytecode::Opcode;
use thiserror::Error;

/// One decoded instruction, used by tooling that walks a stream without
/// executing it (disassembler, verifier). The engine decodes inline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    pub offset: usize,
    pub opcode: Opcode,
    operands: [u8; 2],
}

impl Instruction {
    pub fn operands(&self) -> &[u8] {
        &self.operands[..self.opcode.operand_count()]
    }

    pub fn operand(&self, n: usize) -> u8 {
        self.operands()[n]
    }

    /// Offset of the instruction that follows this one in the stream.
    pub fn next_offset(&self) -> usize {
        self.offset + self.opcode.width()
    }

    /// Where a taken `JUMP_UNLESS` lands, `None` for every other opcode.
    pub fn jump_target(&self) -> Option<usize> {
        match self.opcode {
            Opcode::JumpUnless => Some(self.next_offset() + self.operand(0) as usize),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("unknown opcode {byte:#04x} at offset {offset}")]
    UnknownOpcode { offset: usize, byte: u8 },

    #[error("{opcode} at offset {offset} is missing operand bytes")]
    Truncated { offset: usize, opcode: Opcode },
}

impl DecodeError {
    pub fn offset(&self) -> usize {
        match self {
            DecodeError::UnknownOpcode { offset, .. } | DecodeError::Truncated { offset, .. } => {
                *offset
            }
        }
    }
}

pub fn decode_at(code: &[u8], offset: usize) -> Option<Result<Instruction, DecodeError>> {
    let byte = *code.get(offset)?;

    let opcode = match Opcode::try_from(byte) {
        Ok(op) => op,
        Err(byte) => return Some(Err(DecodeError::UnknownOpcode { offset, byte })),
    };

    let count = opcode.operand_count();
    let Some(raw) = code.get(offset + 1..offset + 1 + count) else {
        return Some(Err(DecodeError::Truncated { offset, opcode }));
    };

    let mut operands = [0u8; 2];
    operands[..count].copy_from_slice(raw);

    Some(Ok(Instruction {
        offset,
        opcode,
        operands,
    }))
}

/// Sequential decoder. Stops after the first error.
pub struct Instructions<'a> {
    code: &'a [u8],
    offset: usize,
    failed: bool,
}

impl<'a> Instructions<'a> {
    pub fn new(code: &'a [u8]) -> Self {
        Self {
            code,
            offset: 0,
            failed: false,
        }
    }
}

impl Iterator for Instructions<'_> {
    type Item = Result<Instruction, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let item = decode_at(self.code, self.offset)?;
        match &item {
            Ok(ins) => self.offset = ins.next_offset(),
            Err(_) => self.failed = true,
        }
        Some(item)
    }
}
