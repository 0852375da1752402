use crate::bytecode::{Instruction, Instructions, Opcode, Program};
use std::fmt::Write;

/// Print disassembly of a bytecode program
pub fn print_program(program: &Program) {
    print!("{}", disassemble(program));
}

/// Render a program listing: literal table, then one line per instruction.
pub fn disassemble(program: &Program) -> String {
    let mut out = String::new();

    let count = Instructions::new(&program.code).count();
    let _ = writeln!(out, "════════════════════════════════════════");
    let _ = writeln!(out, " main");
    let _ = writeln!(
        out,
        " {} instructions, {} bytes, {} literals",
        count,
        program.code.len(),
        program.literals.len()
    );
    let _ = writeln!(out, "════════════════════════════════════════");

    if !program.literals.is_empty() {
        let _ = writeln!(out, "literals:");
        for (i, lit) in program.literals.iter().enumerate() {
            let _ = writeln!(out, "  [{}] {}", i, lit);
        }
    }

    disassemble_code(program, &mut out);
    out
}

fn disassemble_code(program: &Program, out: &mut String) {
    let jump_targets = collect_jump_targets(&program.code);

    for item in Instructions::new(&program.code) {
        match item {
            Ok(ins) => {
                if jump_targets.contains(&ins.offset) {
                    let _ = writeln!(out, "      ┌──────────────────────────────────");
                }
                let marker = if jump_targets.contains(&ins.offset) {
                    "►"
                } else {
                    " "
                };
                let line = format!(
                    "{:04} {} {}",
                    ins.offset,
                    marker,
                    format_instruction(program, &ins)
                );
                let _ = writeln!(out, "{}", line.trim_end());
            }
            Err(e) => {
                // Everything from the bad byte onward is raw data.
                let start = e.offset();
                let rest: Vec<String> = program.code[start..]
                    .iter()
                    .map(|b| format!("{:#04x}", b))
                    .collect();
                let _ = writeln!(
                    out,
                    "{:04}   .byte       {}  ; {}",
                    start,
                    rest.join(" "),
                    e
                );
            }
        }
    }

    // A jump may land exactly on the end of the stream.
    let end = program.code.len();
    if jump_targets.contains(&end) {
        let _ = writeln!(out, "      ┌──────────────────────────────────");
        let _ = writeln!(out, "{:04} ► <end of stream>", end);
    }
}

fn collect_jump_targets(code: &[u8]) -> Vec<usize> {
    let mut targets = Vec::new();

    for ins in Instructions::new(code).flatten() {
        if let Some(target) = ins.jump_target() {
            if !targets.contains(&target) {
                targets.push(target);
            }
        }
    }

    targets
}

fn format_instruction(program: &Program, ins: &Instruction) -> String {
    let literal = |index: u8| match program.literals.get(index) {
        Some(lit) => lit.to_string(),
        None => "<missing literal>".to_string(),
    };

    match ins.opcode {
        Opcode::PushSelf | Opcode::PushNil | Opcode::Add | Opcode::Return => {
            ins.opcode.mnemonic().to_string()
        }
        Opcode::PushNumber | Opcode::PushString => {
            let index = ins.operand(0);
            format!("{:<12}{:<8}; {}", ins.opcode, index, literal(index))
        }
        Opcode::PushBool => {
            let flag = ins.operand(0);
            format!("{:<12}{:<8}; {}", ins.opcode, flag, flag != 0)
        }
        Opcode::GetLocal | Opcode::SetLocal => {
            format!("{:<12}{}", ins.opcode, ins.operand(0))
        }
        Opcode::JumpUnless => {
            let target = ins.jump_target().unwrap_or(ins.next_offset());
            format!(
                "{:<12}{:<8}; ↓ (→ {:04})",
                ins.opcode,
                format!("+{}", ins.operand(0)),
                target
            )
        }
        Opcode::Call => {
            let (name, argc) = (ins.operand(0), ins.operand(1));
            format!(
                "{:<12}{:<8}; {}/{}",
                ins.opcode,
                format!("{} {}", name, argc),
                literal(name),
                argc
            )
        }
    }
}
