use crate::bytecode::{LiteralPool, Opcode, Program};
use crate::runtime::dispatch::Dispatcher;
use crate::runtime::object::{ObjectRef, Runtime};
use crate::runtime::runtime_error::RuntimeError;
use crate::runtime::stack::{Locals, OperandStack};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VmConfig {
    pub stack_capacity: usize,
    pub locals_capacity: usize,
    /// Largest argument count a CALL may carry.
    pub max_args: usize,
    pub max_steps: Option<usize>,
}

impl Default for VmConfig {
    fn default() -> Self {
        VmConfig {
            stack_capacity: 10,
            locals_capacity: 10,
            max_args: 10,
            max_steps: None,
        }
    }
}

/// State left behind by a frame that reached RETURN.
#[derive(Debug)]
pub struct Halt {
    /// Operand stack, bottom to top.
    pub stack: Vec<ObjectRef>,
    pub locals: Vec<Option<ObjectRef>>,
    /// Offset of the RETURN that halted the frame.
    pub offset: usize,
    /// Number of instructions executed, RETURN included.
    pub steps: usize,
}

/// The execution engine.
///
/// Holds only configuration: every [`Vm::run`] builds a fresh frame, so a
/// dispatcher is free to start nested runs on the same `Vm`.
#[derive(Debug, Clone, Default)]
pub struct Vm {
    config: VmConfig,
}

/// Private state of one invocation.
struct Frame<'a> {
    code: &'a [u8],
    literals: &'a LiteralPool,
    ip: usize,
    // Offset and opcode of the instruction being executed, for diagnostics.
    at: usize,
    opcode: Opcode,
    stack: OperandStack,
    locals: Locals,
    receiver: ObjectRef,
}

impl<'a> Frame<'a> {
    /// Advance to the next operand byte and read it.
    fn operand(&mut self) -> Result<u8, RuntimeError> {
        self.ip += 1;
        self.code
            .get(self.ip)
            .copied()
            .ok_or(RuntimeError::TruncatedInstruction {
                offset: self.at,
                opcode: self.opcode,
            })
    }

    fn push(&mut self, value: ObjectRef) -> Result<(), RuntimeError> {
        self.stack
            .push(value)
            .map_err(|_| RuntimeError::StackOverflow {
                offset: self.at,
                opcode: self.opcode,
                capacity: self.stack.capacity(),
            })
    }

    fn pop(&mut self) -> Result<ObjectRef, RuntimeError> {
        self.stack.pop().ok_or(RuntimeError::StackUnderflow {
            offset: self.at,
            opcode: self.opcode,
        })
    }

    fn literal_error(&self, index: u8) -> RuntimeError {
        RuntimeError::InvalidLiteralIndex {
            offset: self.at,
            index,
            len: self.literals.len(),
        }
    }

    fn number_literal(&self, index: u8) -> Result<i64, RuntimeError> {
        let lit = self
            .literals
            .get(index)
            .ok_or_else(|| self.literal_error(index))?;
        lit.as_number().ok_or(RuntimeError::TypeMismatch {
            offset: self.at,
            opcode: self.opcode,
            expected: "number literal",
            found: "string literal",
        })
    }

    fn string_literal(&self, index: u8) -> Result<&'a str, RuntimeError> {
        let literals: &'a LiteralPool = self.literals;
        let lit = literals
            .get(index)
            .ok_or_else(|| self.literal_error(index))?;
        lit.as_str().ok_or(RuntimeError::TypeMismatch {
            offset: self.at,
            opcode: self.opcode,
            expected: "string literal",
            found: "number literal",
        })
    }

    fn pop_number(&mut self) -> Result<i64, RuntimeError> {
        let value = self.pop()?;
        value.number_value().ok_or(RuntimeError::TypeMismatch {
            offset: self.at,
            opcode: self.opcode,
            expected: "Number",
            found: value.kind(),
        })
    }

    fn local_index_error(&self, index: usize) -> RuntimeError {
        RuntimeError::InvalidLocalIndex {
            offset: self.at,
            index,
            capacity: self.locals.len(),
        }
    }
}

impl Vm {
    pub fn new() -> Self {
        Self::with_config(VmConfig::default())
    }

    pub fn with_config(config: VmConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &VmConfig {
        &self.config
    }

    /// Execute `program` from its first byte until RETURN.
    ///
    /// Every CALL goes to `dispatcher`. Any failure aborts this invocation
    /// only and is returned to the caller.
    pub fn run(
        &self,
        runtime: &Runtime,
        program: &Program,
        dispatcher: &mut dyn Dispatcher,
    ) -> Result<Halt, RuntimeError> {
        let mut frame = Frame {
            code: &program.code,
            literals: &program.literals,
            ip: 0,
            at: 0,
            opcode: Opcode::Return,
            stack: OperandStack::with_capacity(self.config.stack_capacity),
            locals: Locals::new(self.config.locals_capacity),
            receiver: runtime.new_object(),
        };

        tracing::debug!(
            code_len = program.code.len(),
            literals = program.literals.len(),
            "frame entered"
        );

        let mut steps: usize = 0;

        loop {
            frame.at = frame.ip;
            let Some(&byte) = frame.code.get(frame.ip) else {
                return Err(RuntimeError::MissingReturn { offset: frame.ip });
            };

            steps += 1;
            if let Some(limit) = self.config.max_steps {
                if steps > limit {
                    return Err(RuntimeError::StepLimitExceeded { limit });
                }
            }

            frame.opcode = Opcode::try_from(byte).map_err(|byte| RuntimeError::UnknownOpcode {
                offset: frame.at,
                byte,
            })?;

            tracing::trace!(
                offset = frame.at,
                opcode = %frame.opcode,
                depth = frame.stack.len(),
                "exec"
            );

            match frame.opcode {
                Opcode::Call => {
                    let name = frame.operand()?;
                    let argc = frame.operand()? as usize;
                    if argc > self.config.max_args {
                        return Err(RuntimeError::TooManyArguments {
                            offset: frame.at,
                            argc,
                            max: self.config.max_args,
                        });
                    }
                    let method = frame.string_literal(name)?;

                    // Most recently pushed argument first.
                    let mut args = Vec::with_capacity(argc);
                    for _ in 0..argc {
                        args.push(frame.pop()?);
                    }
                    let receiver = frame.pop()?;

                    tracing::debug!(offset = frame.at, method, argc, "dispatch");
                    let result = dispatcher
                        .invoke(runtime, receiver, method, &args)
                        .map_err(|source| RuntimeError::Dispatch {
                            offset: frame.at,
                            method: method.to_string(),
                            source,
                        })?;

                    frame.push(result)?;
                }

                Opcode::PushNumber => {
                    let index = frame.operand()?;
                    let n = frame.number_literal(index)?;
                    frame.push(runtime.new_number(n))?;
                }

                Opcode::PushString => {
                    let index = frame.operand()?;
                    let s = frame.string_literal(index)?;
                    frame.push(runtime.new_string(s))?;
                }

                Opcode::PushSelf => {
                    let receiver = frame.receiver.clone();
                    frame.push(receiver)?;
                }

                Opcode::PushNil => frame.push(runtime.nil())?,

                Opcode::PushBool => {
                    let flag = frame.operand()?;
                    frame.push(runtime.boolean(flag != 0))?;
                }

                Opcode::GetLocal => {
                    let slot = frame.operand()? as usize;
                    // A slot that was never set reads as nil.
                    let value = match frame.locals.get(slot) {
                        Some(v) => v.cloned().unwrap_or_else(|| runtime.nil()),
                        None => return Err(frame.local_index_error(slot)),
                    };
                    frame.push(value)?;
                }

                Opcode::SetLocal => {
                    let slot = frame.operand()? as usize;
                    let value = frame.pop()?;
                    if !frame.locals.set(slot, value) {
                        return Err(frame.local_index_error(slot));
                    }
                }

                Opcode::Add => {
                    let a = frame.pop_number()?;
                    let b = frame.pop_number()?;
                    let sum = a.checked_add(b).ok_or(RuntimeError::ArithmeticOverflow {
                        offset: frame.at,
                        a,
                        b,
                    })?;
                    frame.push(runtime.new_number(sum))?;
                }

                Opcode::JumpUnless => {
                    let offset = frame.operand()?;
                    let test = frame.pop()?;
                    if !test.is_truthy() {
                        // The trailing advance below moves one byte further.
                        frame.ip += offset as usize;
                    }
                }

                Opcode::Return => {
                    tracing::debug!(offset = frame.at, steps, "frame halted");
                    return Ok(Halt {
                        stack: frame.stack.into_vec(),
                        locals: frame.locals.into_vec(),
                        offset: frame.at,
                        steps,
                    });
                }
            }

            frame.ip += 1;
        }
    }
}
