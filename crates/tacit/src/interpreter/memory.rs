//! Frame, variable and data-stack opcodes.

use crate::error::{fault_err, ErrorKind, RunResult};
use crate::instruction::Instruction;

use super::{dest, Interpreter, Step};

impl Interpreter<'_> {
    /// `MOVE var, symb`: copies the symbol's value and type into the
    /// variable.
    pub(super) fn op_move(&mut self, instr: &Instruction) -> RunResult<Step> {
        let (dst, symb) = instr.two()?;
        let value = self.value_of(symb)?;
        self.assign_to(dst, value)?;
        Ok(Step::Next)
    }

    /// `CREATEFRAME`: a fresh temporary frame, discarding any previous
    /// one.
    pub(super) fn op_createframe(&mut self, instr: &Instruction) -> RunResult<Step> {
        instr.none()?;
        self.frames.create_temporary();
        Ok(Step::Next)
    }

    /// `PUSHFRAME`: the temporary frame becomes the new local frame.
    pub(super) fn op_pushframe(&mut self, instr: &Instruction) -> RunResult<Step> {
        instr.none()?;
        self.frames.push_temporary()?;
        Ok(Step::Next)
    }

    /// `POPFRAME`: the local frame becomes the temporary frame.
    pub(super) fn op_popframe(&mut self, instr: &Instruction) -> RunResult<Step> {
        instr.none()?;
        self.frames.pop_local()?;
        Ok(Step::Next)
    }

    /// `DEFVAR var`: a new unassigned slot; redefinition is a semantic
    /// error.
    pub(super) fn op_defvar(&mut self, instr: &Instruction) -> RunResult<Step> {
        let (frame, name) = dest(instr.one()?)?;
        self.frames.define(frame, name)?;
        Ok(Step::Next)
    }

    /// `PUSHS symb`: pushes the symbol's value onto the data stack.
    pub(super) fn op_pushs(&mut self, instr: &Instruction) -> RunResult<Step> {
        let value = self.value_of(instr.one()?)?;
        self.data_stack.push(value);
        Ok(Step::Next)
    }

    /// `POPS var`: pops the data stack into the variable.
    pub(super) fn op_pops(&mut self, instr: &Instruction) -> RunResult<Step> {
        let dst = instr.one()?;
        let Some(value) = self.data_stack.pop() else {
            return fault_err!(ErrorKind::Value; "POPS on an empty data stack");
        };
        self.assign_to(dst, value)?;
        Ok(Step::Next)
    }
}
