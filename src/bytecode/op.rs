use std::fmt;

// =============================================================================
// OPCODE - one-byte instruction tags
// =============================================================================

/// Instruction tag. The discriminant is the byte found in the instruction stream.
///
/// Operands follow the opcode inline; their count is fixed per opcode (see
/// [`Opcode::operand_count`]). Nothing else in the stream marks where an
/// instruction ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Opcode {
    /// `CALL name argc` ( receiver arg1 .. argN -- result )
    Call = 0,
    /// `PUSH_NUMBER lit` ( -- number )
    PushNumber = 1,
    /// `PUSH_STRING lit` ( -- string )
    PushString = 2,
    /// `PUSH_SELF` ( -- self )
    PushSelf = 3,
    /// `PUSH_NIL` ( -- nil )
    PushNil = 4,
    /// `PUSH_BOOL flag` ( -- bool )
    PushBool = 5,
    /// `GET_LOCAL slot` ( -- value )
    GetLocal = 6,
    /// `SET_LOCAL slot` ( value -- )
    SetLocal = 7,
    /// `JUMP_UNLESS offset` ( test -- )
    ///
    /// When the test is not truthy, skips `offset` bytes past the end of this
    /// instruction. Forward only.
    JumpUnless = 8,
    /// `ADD` ( a b -- sum )
    Add = 9,
    /// `RETURN` halts the frame.
    Return = 10,
}

impl Opcode {
    pub const ALL: [Opcode; 11] = [
        Opcode::Call,
        Opcode::PushNumber,
        Opcode::PushString,
        Opcode::PushSelf,
        Opcode::PushNil,
        Opcode::PushBool,
        Opcode::GetLocal,
        Opcode::SetLocal,
        Opcode::JumpUnless,
        Opcode::Add,
        Opcode::Return,
    ];

    /// Number of operand bytes that follow the opcode byte.
    pub fn operand_count(self) -> usize {
        match self {
            Opcode::Call => 2,
            Opcode::PushNumber
            | Opcode::PushString
            | Opcode::PushBool
            | Opcode::GetLocal
            | Opcode::SetLocal
            | Opcode::JumpUnless => 1,
            Opcode::PushSelf | Opcode::PushNil | Opcode::Add | Opcode::Return => 0,
        }
    }

    /// Total encoded width, opcode byte included.
    pub fn width(self) -> usize {
        1 + self.operand_count()
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Call => "CALL",
            Opcode::PushNumber => "PUSH_NUMBER",
            Opcode::PushString => "PUSH_STRING",
            Opcode::PushSelf => "PUSH_SELF",
            Opcode::PushNil => "PUSH_NIL",
            Opcode::PushBool => "PUSH_BOOL",
            Opcode::GetLocal => "GET_LOCAL",
            Opcode::SetLocal => "SET_LOCAL",
            Opcode::JumpUnless => "JUMP_UNLESS",
            Opcode::Add => "ADD",
            Opcode::Return => "RETURN",
        }
    }
}

impl From<Opcode> for u8 {
    fn from(op: Opcode) -> u8 {
        op as u8
    }
}

impl TryFrom<u8> for Opcode {
    type Error = u8;

    /// Returns the unrecognised byte on failure.
    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        Opcode::ALL.get(byte as usize).copied().ok_or(byte)
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.mnemonic())
    }
}
