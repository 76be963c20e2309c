//! Control-transfer opcodes.
//!
//! Jumps resolve through the label table built at load time. A taken
//! jump replaces the instruction pointer and suppresses the loop's
//! post-increment; `CALL` records the following order as the return
//! address before the pointer moves.

use crate::error::{fault, fault_err, ErrorKind, RunResult};
use crate::instruction::{Arg, Instruction};
use crate::value::Value;

use super::{label_name, Interpreter, Step};

impl Interpreter<'_> {
    /// `CALL label`: pushes the return address, then jumps.
    pub(super) fn op_call(&mut self, instr: &Instruction) -> RunResult<Step> {
        let target = self.jump_target(instr.one()?)?;
        self.call_stack.push(self.ip + 1);
        Ok(Step::Jump(target))
    }

    /// `RETURN`: jumps to the most recent return address.
    pub(super) fn op_return(&mut self, instr: &Instruction) -> RunResult<Step> {
        instr.none()?;
        match self.call_stack.pop() {
            Some(address) => Ok(Step::Jump(address)),
            None => fault_err!(ErrorKind::Value; "RETURN on an empty call stack"),
        }
    }

    /// `LABEL name`: no runtime effect; the target was recorded at load.
    pub(super) fn op_label(&mut self, instr: &Instruction) -> RunResult<Step> {
        label_name(instr.one()?)?;
        Ok(Step::Next)
    }

    /// `JUMP label`: unconditional transfer.
    pub(super) fn op_jump(&mut self, instr: &Instruction) -> RunResult<Step> {
        let target = self.jump_target(instr.one()?)?;
        Ok(Step::Jump(target))
    }

    /// `JUMPIFEQ` / `JUMPIFNEQ`: branches on equality of two symbols.
    ///
    /// The label must exist whether or not the branch is taken.
    pub(super) fn op_jumpif(&mut self, instr: &Instruction, when_equal: bool) -> RunResult<Step> {
        let (label, a, b) = instr.three()?;
        let target = self.jump_target(label)?;
        if self.equal(a, b)? == when_equal {
            Ok(Step::Jump(target))
        } else {
            Ok(Step::Next)
        }
    }

    /// `EXIT symb`: terminates the whole program with the operand as the
    /// exit code; the operand must be an int in `[0, 9]`.
    pub(super) fn op_exit(&mut self, instr: &Instruction) -> RunResult<Step> {
        let symb = instr.one()?;
        let code = match self.value_of(symb)? {
            Value::Int(code) => code,
            other => return fault_err!(ErrorKind::OperandType; "EXIT expects int, found {}", other.type_name()),
        };
        if !(0..=9).contains(&code) {
            return fault_err!(ErrorKind::OperandValue; "exit code {code} is outside [0, 9]");
        }
        Ok(Step::Exit(code as u8))
    }

    fn jump_target(&self, arg: &Arg) -> RunResult<u32> {
        let name = label_name(arg)?;
        self.program
            .label_target(name)
            .ok_or_else(|| fault!(ErrorKind::Semantic; "jump to undefined label '{name}'"))
    }
}
