//! The executor: runtime state, the instruction-pointer loop and opcode
//! dispatch.
//!
//! The interpreter walks strictly increasing orders, skipping absent
//! ones. Handlers return a [`Step`]: `Next` keeps the post-increment,
//! `Jump` replaces the pointer and suppresses it, `Exit` ends the run
//! with a code. Termination is therefore a value bubbled up to the loop,
//! never a process-wide exit from inside a handler.
//!
//! Handler families live in sibling modules: `memory` for
//! frames/variables/data stack, `flow` for control transfer, `arith` for
//! arithmetic/relational/boolean opcodes, `strings` for string and
//! conversion opcodes. I/O and introspection opcodes stay here next to
//! the ports they use.

mod arith;
mod flow;
mod memory;
mod strings;

use crate::error::{fault_err, ErrorKind, InterpretError, RunResult};
use crate::frame::Frames;
use crate::instruction::{Arg, FrameKind, Instruction, Opcode, ReadType};
use crate::io::{InputPort, OutputPort};
use crate::loader::Program;
use crate::value::Value;

/// Outcome of one executed instruction.
pub(crate) enum Step {
    /// Fall through to the next order.
    Next,
    /// Move the instruction pointer to this order, suppressing the
    /// post-increment for this tick.
    Jump(u32),
    /// Terminate the whole program with this exit code.
    Exit(u8),
}

/// Executes a loaded [`Program`] against injected I/O ports.
///
/// Owns all runtime state: the instruction pointer, the frame registry,
/// the data stack and the call stack. One interpreter runs one program
/// once; construct a fresh one per run.
///
/// # Example
/// ```
/// use tacit::{CollectOutput, Interpreter, Program, QueuedInput};
///
/// let source = r#"
/// <program>
///   <instruction order="1" opcode="WRITE"><arg1 type="string">hi</arg1></instruction>
/// </program>"#;
/// let program = Program::parse(source).unwrap();
/// let mut input = QueuedInput::default();
/// let (mut out, mut err) = (CollectOutput::new(), CollectOutput::new());
/// let code = Interpreter::new(&program, &mut input, &mut out, &mut err).run().unwrap();
/// assert_eq!((code, out.output()), (0, "hi"));
/// ```
pub struct Interpreter<'a> {
    program: &'a Program,
    input: &'a mut dyn InputPort,
    output: &'a mut dyn OutputPort,
    errput: &'a mut dyn OutputPort,
    frames: Frames,
    data_stack: Vec<Value>,
    call_stack: Vec<u32>,
    ip: u32,
    steps: u64,
    step_limit: Option<u64>,
}

impl<'a> Interpreter<'a> {
    /// Creates an interpreter over `program` with the given ports.
    ///
    /// `output` receives `WRITE`; `errput` receives `DPRINT` and `BREAK`.
    pub fn new(
        program: &'a Program,
        input: &'a mut dyn InputPort,
        output: &'a mut dyn OutputPort,
        errput: &'a mut dyn OutputPort,
    ) -> Self {
        Self {
            program,
            input,
            output,
            errput,
            frames: Frames::new(),
            data_stack: Vec::new(),
            call_stack: Vec::new(),
            ip: 1,
            steps: 0,
            step_limit: None,
        }
    }

    /// Caps the number of executed instructions.
    ///
    /// Exhausting the budget aborts with an internal error. Intended for
    /// tests and hosts that must bound non-terminating programs.
    #[must_use]
    pub fn with_step_limit(mut self, limit: u64) -> Self {
        self.step_limit = Some(limit);
        self
    }

    /// Runs the program to completion.
    ///
    /// # Errors
    /// The first [`InterpretError`] any instruction produces; the run is
    /// not resumable afterwards.
    ///
    /// # Returns
    /// The exit code: 0 on falling off the end of the program, or the
    /// operand of a successful `EXIT`.
    pub fn run(mut self) -> RunResult<u8> {
        while self.ip <= self.program.last_order() {
            let Some(instr) = self.program.instruction_at(self.ip) else {
                self.ip += 1;
                continue;
            };
            self.charge_step()?;
            match self.execute(instr)? {
                Step::Next => self.ip += 1,
                Step::Jump(target) => self.ip = target,
                Step::Exit(code) => return Ok(code),
            }
        }
        Ok(0)
    }

    fn execute(&mut self, instr: &Instruction) -> RunResult<Step> {
        match instr.opcode {
            Opcode::Move => self.op_move(instr),
            Opcode::Createframe => self.op_createframe(instr),
            Opcode::Pushframe => self.op_pushframe(instr),
            Opcode::Popframe => self.op_popframe(instr),
            Opcode::Defvar => self.op_defvar(instr),
            Opcode::Pushs => self.op_pushs(instr),
            Opcode::Pops => self.op_pops(instr),

            Opcode::Call => self.op_call(instr),
            Opcode::Return => self.op_return(instr),
            Opcode::Label => self.op_label(instr),
            Opcode::Jump => self.op_jump(instr),
            Opcode::Jumpifeq => self.op_jumpif(instr, true),
            Opcode::Jumpifneq => self.op_jumpif(instr, false),
            Opcode::Exit => self.op_exit(instr),

            Opcode::Add | Opcode::Sub | Opcode::Mul | Opcode::Idiv => self.op_arith(instr),
            Opcode::Lt | Opcode::Gt | Opcode::Eq => self.op_relation(instr),
            Opcode::And | Opcode::Or => self.op_bool_binop(instr),
            Opcode::Not => self.op_not(instr),

            Opcode::Int2Char => self.op_int2char(instr),
            Opcode::Stri2Int => self.op_stri2int(instr),
            Opcode::Concat => self.op_concat(instr),
            Opcode::Strlen => self.op_strlen(instr),
            Opcode::Getchar => self.op_getchar(instr),
            Opcode::Setchar => self.op_setchar(instr),

            Opcode::Read => self.op_read(instr),
            Opcode::Write => self.op_write(instr),
            Opcode::Type => self.op_type(instr),
            Opcode::Dprint => self.op_dprint(instr),
            Opcode::Break => self.op_break(instr),
        }
    }

    fn charge_step(&mut self) -> RunResult<()> {
        self.steps += 1;
        if let Some(limit) = self.step_limit {
            if self.steps > limit {
                return fault_err!(ErrorKind::Internal; "step limit of {limit} exceeded at order {}", self.ip);
            }
        }
        Ok(())
    }

    // --- Operand resolution ---

    /// Resolves a symbol operand to its value: literals stand for
    /// themselves, variables read through the frame registry.
    fn value_of(&self, arg: &Arg) -> RunResult<Value> {
        match arg {
            Arg::Int(v) => Ok(Value::Int(*v)),
            Arg::Float(v) => Ok(Value::Float(*v)),
            Arg::Bool(v) => Ok(Value::Bool(*v)),
            Arg::Str(v) => Ok(Value::Str(v.clone())),
            Arg::Nil => Ok(Value::Nil),
            Arg::Var(frame, name) => self.frames.value(*frame, name).cloned(),
            Arg::Label(_) | Arg::TypeName(_) => {
                fault_err!(ErrorKind::SourceStructure; "a {} operand cannot be used as a symbol", arg.kind_name())
            }
        }
    }

    fn int_of(&self, arg: &Arg) -> RunResult<i64> {
        match self.value_of(arg)? {
            Value::Int(v) => Ok(v),
            other => fault_err!(ErrorKind::OperandType; "expected int, found {}", other.type_name()),
        }
    }

    fn str_of(&self, arg: &Arg) -> RunResult<String> {
        match self.value_of(arg)? {
            Value::Str(v) => Ok(v),
            other => fault_err!(ErrorKind::OperandType; "expected string, found {}", other.type_name()),
        }
    }

    fn bool_of(&self, arg: &Arg) -> RunResult<bool> {
        match self.value_of(arg)? {
            Value::Bool(v) => Ok(v),
            other => fault_err!(ErrorKind::OperandType; "expected bool, found {}", other.type_name()),
        }
    }

    /// Writes a value into a variable destination operand.
    fn assign_to(&mut self, arg: &Arg, value: Value) -> RunResult<()> {
        let (frame, name) = dest(arg)?;
        self.frames.assign(frame, name, value)
    }

    // --- I/O and introspection opcodes ---

    fn op_read(&mut self, instr: &Instruction) -> RunResult<Step> {
        let (dst, selector) = instr.two()?;
        let Arg::TypeName(read_type) = selector else {
            return fault_err!(ErrorKind::SourceStructure; "READ expects a type operand, found {}", selector.kind_name());
        };
        let value = match read_type {
            ReadType::Int => self.input.read_int().map_err(InterpretError::host)?.map(Value::Int),
            ReadType::String => self.input.read_string().map_err(InterpretError::host)?.map(Value::Str),
            ReadType::Bool => self.input.read_bool().map_err(InterpretError::host)?.map(Value::Bool),
        };
        self.assign_to(dst, value.unwrap_or(Value::Nil))?;
        Ok(Step::Next)
    }

    fn op_write(&mut self, instr: &Instruction) -> RunResult<Step> {
        let value = self.value_of(instr.one()?)?;
        write_value(self.output, &value)?;
        Ok(Step::Next)
    }

    fn op_dprint(&mut self, instr: &Instruction) -> RunResult<Step> {
        let value = self.value_of(instr.one()?)?;
        write_value(self.errput, &value)?;
        Ok(Step::Next)
    }

    fn op_break(&mut self, instr: &Instruction) -> RunResult<Step> {
        instr.none()?;
        let line = format!(
            "break at order {}: data stack {}, call stack {}, local frames {}, temporary frame {}\n",
            self.ip,
            self.data_stack.len(),
            self.call_stack.len(),
            self.frames.local_depth(),
            if self.frames.has_temporary() { "present" } else { "absent" },
        );
        self.errput.write_str(&line).map_err(InterpretError::host)?;
        Ok(Step::Next)
    }

    fn op_type(&mut self, instr: &Instruction) -> RunResult<Step> {
        let (dst, symb) = instr.two()?;
        let name = match symb {
            // The raw slot read is what lets TYPE observe Undef (as "")
            // without a missing-value error.
            Arg::Var(frame, name) => self.frames.raw(*frame, name)?.type_name(),
            Arg::Label(_) | Arg::TypeName(_) => {
                return fault_err!(ErrorKind::SourceStructure; "a {} operand cannot be used as a symbol", symb.kind_name());
            }
            literal => literal.kind_name(),
        };
        self.assign_to(dst, Value::Str(name.to_owned()))?;
        Ok(Step::Next)
    }
}

/// Extracts the frame and name of a variable destination operand.
fn dest(arg: &Arg) -> RunResult<(FrameKind, &str)> {
    match arg {
        Arg::Var(frame, name) => Ok((*frame, name)),
        other => fault_err!(ErrorKind::SourceStructure; "expected a variable operand, found {}", other.kind_name()),
    }
}

/// Extracts the name of a label operand.
fn label_name(arg: &Arg) -> RunResult<&str> {
    match arg {
        Arg::Label(name) => Ok(name),
        other => fault_err!(ErrorKind::SourceStructure; "expected a label operand, found {}", other.kind_name()),
    }
}

/// Formats a value onto a port per the WRITE rules: ints in decimal,
/// bools as `true`/`false`, nil as the empty string, strings verbatim
/// (escapes were decoded at load), floats in canonical text form.
fn write_value(port: &mut dyn OutputPort, value: &Value) -> RunResult<()> {
    let written = match value {
        Value::Int(v) => port.write_int(*v),
        Value::Float(v) => port.write_float(*v),
        Value::Bool(v) => port.write_bool(*v),
        Value::Str(s) => port.write_str(s),
        Value::Nil => port.write_str(""),
        Value::Undef => return fault_err!(ErrorKind::Value; "cannot write a missing value"),
    };
    written.map_err(InterpretError::host)
}
