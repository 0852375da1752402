use crate::bytecode::{Instruction, Instructions, Opcode, Program};
use crate::runtime::vm::VmConfig;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("verify error at offset {offset}: {message}")]
pub struct VerifyError {
    pub offset: usize,
    pub message: String,
}

impl VerifyError {
    fn new(offset: usize, message: impl Into<String>) -> Self {
        Self {
            offset,
            message: message.into(),
        }
    }
}

/// Returns (pops, pushes) for an instruction.
fn effect(ins: &Instruction) -> (usize, usize) {
    use Opcode::*;
    match ins.opcode {
        PushSelf | PushNil | PushBool | PushNumber | PushString | GetLocal => (0, 1),
        SetLocal | JumpUnless => (1, 0),
        Add => (2, 1),
        Call => (1 + ins.operand(1) as usize, 1),
        Return => (0, 0),
    }
}

/// Pre-flight check of a program against the limits the engine will run with.
///
/// NOTE: This is a linear scan, not a control-flow analysis. Stack heights
/// are tracked only up to the first jump target; past a join point the two
/// incoming heights may differ, so from there on only the per-instruction
/// checks (operands, literal kinds, local slots, argument counts) apply.
pub fn verify(program: &Program, config: &VmConfig) -> Result<(), VerifyError> {
    let code = &program.code;
    let mut height: Option<usize> = Some(0);
    let mut boundaries = Vec::new();
    let mut targets = Vec::new();

    for item in Instructions::new(code) {
        let ins = item.map_err(|e| VerifyError::new(e.offset(), e.to_string()))?;
        boundaries.push(ins.offset);

        if targets.contains(&ins.offset) {
            height = None;
        }

        check_operands(program, config, &ins)?;

        if let Some(h) = height {
            let (pops, pushes) = effect(&ins);
            if h < pops {
                return Err(VerifyError::new(
                    ins.offset,
                    format!(
                        "stack underflow: {} needs {} items, {} available",
                        ins.opcode, pops, h
                    ),
                ));
            }
            let h = h - pops + pushes;
            if h > config.stack_capacity {
                return Err(VerifyError::new(
                    ins.offset,
                    format!(
                        "stack overflow: {} items exceed capacity {}",
                        h, config.stack_capacity
                    ),
                ));
            }
            height = Some(h);
        }

        if let Some(target) = ins.jump_target() {
            if target > code.len() {
                return Err(VerifyError::new(
                    ins.offset,
                    format!(
                        "jump target {} is past the end of the stream ({} bytes)",
                        target,
                        code.len()
                    ),
                ));
            }
            targets.push(target);
        }

        // Nothing after RETURN is reachable unless something jumps over it.
        if ins.opcode == Opcode::Return && targets.iter().all(|t| *t <= ins.offset) {
            return check_targets(&targets, &boundaries);
        }
    }

    Err(VerifyError::new(code.len(), "stream ends without RETURN"))
}

fn check_targets(targets: &[usize], boundaries: &[usize]) -> Result<(), VerifyError> {
    for target in targets {
        if !boundaries.contains(target) {
            return Err(VerifyError::new(
                *target,
                "jump lands inside an instruction",
            ));
        }
    }
    Ok(())
}

fn check_operands(
    program: &Program,
    config: &VmConfig,
    ins: &Instruction,
) -> Result<(), VerifyError> {
    let literal = |index: u8, want: &str| -> Result<(), VerifyError> {
        match program.literals.get(index) {
            None => Err(VerifyError::new(
                ins.offset,
                format!(
                    "literal index {} out of range (pool has {})",
                    index,
                    program.literals.len()
                ),
            )),
            Some(lit) if lit.kind() != want => Err(VerifyError::new(
                ins.offset,
                format!(
                    "{} expects a {} literal, slot {} holds a {}",
                    ins.opcode,
                    want,
                    index,
                    lit.kind()
                ),
            )),
            Some(_) => Ok(()),
        }
    };

    match ins.opcode {
        Opcode::PushNumber => literal(ins.operand(0), "number"),
        Opcode::PushString => literal(ins.operand(0), "string"),
        Opcode::Call => {
            literal(ins.operand(0), "string")?;
            let argc = ins.operand(1) as usize;
            if argc > config.max_args {
                return Err(VerifyError::new(
                    ins.offset,
                    format!("{} arguments exceed the limit of {}", argc, config.max_args),
                ));
            }
            Ok(())
        }
        Opcode::GetLocal | Opcode::SetLocal => {
            let slot = ins.operand(0) as usize;
            if slot >= config.locals_capacity {
                return Err(VerifyError::new(
                    ins.offset,
                    format!(
                        "local slot {} out of range ({} slots)",
                        slot, config.locals_capacity
                    ),
                ));
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::{Literal, LiteralPool};
    use Opcode::*;

    fn verify_default(program: &Program) -> Result<(), VerifyError> {
        verify(program, &VmConfig::default())
    }

    fn program(literals: Vec<Literal>, code: Vec<u8>) -> Program {
        Program::new(LiteralPool::new(literals), code)
    }

    fn assert_rejected(p: &Program, contains: &str) {
        match verify_default(p) {
            Ok(()) => panic!("expected verify error containing '{}'", contains),
            Err(e) => assert!(
                e.message.contains(contains),
                "expected error containing '{}', got: {}",
                contains,
                e
            ),
        }
    }

    #[test]
    fn test_demo_program_verifies() {
        assert!(verify_default(&Program::demo()).is_ok());
    }

    #[test]
    fn test_underflow() {
        let p = program(vec![], vec![Add as u8, Return as u8]);
        assert_rejected(&p, "underflow");
    }

    #[test]
    fn test_call_counts_receiver() {
        let p = program(
            vec![Literal::from("m")],
            vec![PushNil as u8, Call as u8, 0, 1, Return as u8],
        );
        assert_rejected(&p, "needs 2 items");
    }

    #[test]
    fn test_overflow_against_configured_capacity() {
        let mut code = vec![PushNil as u8; 3];
        code.push(Return as u8);
        let p = program(vec![], code);
        let config = VmConfig {
            stack_capacity: 2,
            ..VmConfig::default()
        };
        let err = verify(&p, &config).unwrap_err();
        assert_eq!(err.offset, 2);
        assert!(err.message.contains("overflow"));
    }

    #[test]
    fn test_literal_kind_mismatch() {
        let p = program(
            vec![Literal::from(5)],
            vec![PushString as u8, 0, Return as u8],
        );
        assert_rejected(&p, "expects a string literal");
    }

    #[test]
    fn test_literal_out_of_range() {
        let p = program(vec![], vec![PushNumber as u8, 3, Return as u8]);
        assert_rejected(&p, "out of range");
    }

    #[test]
    fn test_local_slot_out_of_range() {
        let p = program(vec![], vec![GetLocal as u8, 10, Return as u8]);
        assert_rejected(&p, "local slot 10");
    }

    #[test]
    fn test_missing_return() {
        let p = program(vec![], vec![PushNil as u8]);
        assert_rejected(&p, "without RETURN");
    }

    #[test]
    fn test_return_jumped_over_is_not_the_end() {
        // PUSH_NIL; JUMP_UNLESS +1; RETURN; PUSH_NIL  (falls off the end)
        let p = program(
            vec![],
            vec![
                PushNil as u8,
                JumpUnless as u8,
                1,
                Return as u8,
                PushNil as u8,
            ],
        );
        assert_rejected(&p, "without RETURN");
    }

    #[test]
    fn test_jump_into_operand() {
        // Target 4 is the operand byte of GET_LOCAL at 3.
        let p = program(
            vec![],
            vec![
                PushNil as u8,
                JumpUnless as u8,
                1,
                GetLocal as u8,
                0,
                Return as u8,
            ],
        );
        assert_rejected(&p, "inside an instruction");
    }

    #[test]
    fn test_bytes_after_return_are_ignored() {
        let p = program(vec![], vec![Return as u8, 0xee, 0xff]);
        assert!(verify_default(&p).is_ok());
    }

    #[test]
    fn test_unknown_opcode() {
        let p = program(vec![], vec![0x30]);
        assert_rejected(&p, "unknown opcode");
    }

    #[test]
    fn test_too_many_arguments() {
        let mut code = vec![PushSelf as u8];
        code.extend(std::iter::repeat_n(PushNil as u8, 11));
        code.extend([Call as u8, 0, 11, Return as u8]);
        let p = program(vec![Literal::from("m")], code);
        let config = VmConfig {
            stack_capacity: 20,
            ..VmConfig::default()
        };
        let err = verify(&p, &config).unwrap_err();
        assert!(err.message.contains("11 arguments"));
    }
}
