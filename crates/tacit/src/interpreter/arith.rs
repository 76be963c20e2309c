//! Arithmetic, relational and boolean opcodes.
//!
//! Arithmetic is integer-only. Relations order ints numerically, strings
//! pointwise and bools with `false < true`; `nil` participates in
//! equality only, where it equals nothing but itself. Floats carry no
//! comparison relation at all (they exist only as an output type).

use std::cmp::Ordering;

use crate::error::{fault_err, ErrorKind, RunResult};
use crate::instruction::{Arg, Instruction, Opcode};
use crate::value::Value;

use super::{Interpreter, Step};

impl Interpreter<'_> {
    /// `ADD`/`SUB`/`MUL`/`IDIV var, symb, symb`: integer arithmetic.
    ///
    /// `IDIV` truncates toward zero; division by zero and overflow are
    /// operand-value errors.
    pub(super) fn op_arith(&mut self, instr: &Instruction) -> RunResult<Step> {
        let (dst, a, b) = instr.three()?;
        let (a, b) = (self.int_of(a)?, self.int_of(b)?);
        let result = match instr.opcode {
            Opcode::Add => a.checked_add(b),
            Opcode::Sub => a.checked_sub(b),
            Opcode::Mul => a.checked_mul(b),
            Opcode::Idiv => {
                if b == 0 {
                    return fault_err!(ErrorKind::OperandValue; "division by zero");
                }
                a.checked_div(b)
            }
            other => unreachable!("op_arith dispatched for {other}"),
        };
        let Some(value) = result else {
            return fault_err!(ErrorKind::OperandValue; "integer overflow in {}", instr.opcode);
        };
        self.assign_to(dst, Value::Int(value))?;
        Ok(Step::Next)
    }

    /// `LT`/`GT`/`EQ var, symb, symb`: result type is bool.
    pub(super) fn op_relation(&mut self, instr: &Instruction) -> RunResult<Step> {
        let (dst, a, b) = instr.three()?;
        let result = match instr.opcode {
            Opcode::Lt => self.ordering(a, b)? == Ordering::Less,
            Opcode::Gt => self.ordering(a, b)? == Ordering::Greater,
            Opcode::Eq => self.equal(a, b)?,
            other => unreachable!("op_relation dispatched for {other}"),
        };
        self.assign_to(dst, result.into())?;
        Ok(Step::Next)
    }

    /// `AND`/`OR var, symb, symb`: both operands must be bool.
    pub(super) fn op_bool_binop(&mut self, instr: &Instruction) -> RunResult<Step> {
        let (dst, a, b) = instr.three()?;
        let (a, b) = (self.bool_of(a)?, self.bool_of(b)?);
        let result = match instr.opcode {
            Opcode::And => a && b,
            Opcode::Or => a || b,
            other => unreachable!("op_bool_binop dispatched for {other}"),
        };
        self.assign_to(dst, result.into())?;
        Ok(Step::Next)
    }

    /// `NOT var, symb`.
    pub(super) fn op_not(&mut self, instr: &Instruction) -> RunResult<Step> {
        let (dst, symb) = instr.two()?;
        let value = self.bool_of(symb)?;
        self.assign_to(dst, (!value).into())?;
        Ok(Step::Next)
    }

    /// The equality relation shared by `EQ` and the conditional jumps:
    /// operand types must match, except that `nil` may meet any type and
    /// equals only `nil`.
    pub(super) fn equal(&self, a: &Arg, b: &Arg) -> RunResult<bool> {
        match (self.value_of(a)?, self.value_of(b)?) {
            (Value::Nil, Value::Nil) => Ok(true),
            (Value::Nil, _) | (_, Value::Nil) => Ok(false),
            (Value::Int(a), Value::Int(b)) => Ok(a == b),
            (Value::Str(a), Value::Str(b)) => Ok(a == b),
            (Value::Bool(a), Value::Bool(b)) => Ok(a == b),
            (a, b) => {
                fault_err!(ErrorKind::OperandValue; "cannot compare {} with {}", a.type_name(), b.type_name())
            }
        }
    }

    /// The ordering relation for `LT`/`GT`; `nil` has no order.
    fn ordering(&self, a: &Arg, b: &Arg) -> RunResult<Ordering> {
        match (self.value_of(a)?, self.value_of(b)?) {
            (Value::Int(a), Value::Int(b)) => Ok(a.cmp(&b)),
            (Value::Str(a), Value::Str(b)) => Ok(a.cmp(&b)),
            (Value::Bool(a), Value::Bool(b)) => Ok(a.cmp(&b)),
            (Value::Nil, _) | (_, Value::Nil) => {
                fault_err!(ErrorKind::OperandValue; "nil cannot be ordered")
            }
            (a, b) => {
                fault_err!(ErrorKind::OperandValue; "cannot compare {} with {}", a.type_name(), b.type_name())
            }
        }
    }
}
