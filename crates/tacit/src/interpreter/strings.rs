//! String and conversion opcodes.
//!
//! Indexing, length and replacement all work in Unicode scalars, never
//! bytes.

use crate::error::{fault, fault_err, ErrorKind, RunResult};
use crate::instruction::Instruction;
use crate::value::Value;

use super::{dest, Interpreter, Step};

impl Interpreter<'_> {
    /// `INT2CHAR var, symb`: the scalar at the operand's codepoint, as a
    /// one-character string.
    pub(super) fn op_int2char(&mut self, instr: &Instruction) -> RunResult<Step> {
        let (dst, symb) = instr.two()?;
        let code = self.int_of(symb)?;
        let scalar = u32::try_from(code).ok().and_then(char::from_u32);
        let Some(scalar) = scalar else {
            return fault_err!(ErrorKind::StringOperation; "{code} is not a Unicode scalar value");
        };
        self.assign_to(dst, Value::Str(scalar.to_string()))?;
        Ok(Step::Next)
    }

    /// `STRI2INT var, symb, symb`: the codepoint of the scalar at the
    /// given index.
    pub(super) fn op_stri2int(&mut self, instr: &Instruction) -> RunResult<Step> {
        let (dst, string, index) = instr.three()?;
        let string = self.str_of(string)?;
        let index = self.int_of(index)?;
        let scalar = scalar_at(&string, index)?;
        self.assign_to(dst, Value::Int(i64::from(u32::from(scalar))))?;
        Ok(Step::Next)
    }

    /// `CONCAT var, symb, symb`: both operands must be strings.
    pub(super) fn op_concat(&mut self, instr: &Instruction) -> RunResult<Step> {
        let (dst, a, b) = instr.three()?;
        let mut joined = self.str_of(a)?;
        joined.push_str(&self.str_of(b)?);
        self.assign_to(dst, Value::Str(joined))?;
        Ok(Step::Next)
    }

    /// `STRLEN var, symb`: length in scalars.
    pub(super) fn op_strlen(&mut self, instr: &Instruction) -> RunResult<Step> {
        let (dst, symb) = instr.two()?;
        let length = self.str_of(symb)?.chars().count();
        self.assign_to(dst, Value::Int(length as i64))?;
        Ok(Step::Next)
    }

    /// `GETCHAR var, symb, symb`: the scalar at the given index, as a
    /// one-character string.
    pub(super) fn op_getchar(&mut self, instr: &Instruction) -> RunResult<Step> {
        let (dst, string, index) = instr.three()?;
        let string = self.str_of(string)?;
        let index = self.int_of(index)?;
        let scalar = scalar_at(&string, index)?;
        self.assign_to(dst, Value::Str(scalar.to_string()))?;
        Ok(Step::Next)
    }

    /// `SETCHAR var, symb, symb`: replaces one scalar of the string held
    /// in `var` with the first scalar of the third operand.
    pub(super) fn op_setchar(&mut self, instr: &Instruction) -> RunResult<Step> {
        let (dst, index, replacement) = instr.three()?;
        let (frame, name) = dest(dst)?;
        let current = match self.frames.value(frame, name)? {
            Value::Str(s) => s.clone(),
            other => {
                return fault_err!(ErrorKind::OperandType; "SETCHAR expects a string variable, found {}", other.type_name());
            }
        };
        let index = self.int_of(index)?;
        let replacement = self.str_of(replacement)?;
        let Some(new_scalar) = replacement.chars().next() else {
            return fault_err!(ErrorKind::StringOperation; "SETCHAR with an empty replacement string");
        };

        let target = usize::try_from(index)
            .ok()
            .filter(|&idx| idx < current.chars().count());
        let Some(target) = target else {
            return fault_err!(ErrorKind::StringOperation; "index {index} is outside the string");
        };
        let updated: String = current
            .chars()
            .enumerate()
            .map(|(idx, scalar)| if idx == target { new_scalar } else { scalar })
            .collect();
        self.frames.assign(frame, name, Value::Str(updated))?;
        Ok(Step::Next)
    }
}

/// The scalar at `index`, or a string-operation error when the index is
/// negative or past the end.
fn scalar_at(s: &str, index: i64) -> RunResult<char> {
    usize::try_from(index)
        .ok()
        .and_then(|idx| s.chars().nth(idx))
        .ok_or_else(|| fault!(ErrorKind::StringOperation; "index {index} is outside the string"))
}
