//! Instructions, opcodes and their decoded arguments.
//!
//! Arguments are fully decoded at load time: by the time an
//! [`Instruction`] reaches the executor its lexemes have already been
//! turned into typed literals, variable references, labels or type
//! selectors. String-keyed dispatch therefore ends at the loader; the
//! executor matches on the [`Opcode`] enum alone.

use std::fmt;

use strum::{Display, EnumString, IntoStaticStr};

use crate::error::{fault_err, ErrorKind, RunResult};

/// The instruction set, one variant per opcode.
///
/// Parsed from the uppercased `opcode` attribute via strum's `FromStr`;
/// the string form of each variant is its uppercase name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Opcode {
    // Frames and variables
    Move,
    Createframe,
    Pushframe,
    Popframe,
    Defvar,

    // Flow control
    Call,
    Return,
    Label,
    Jump,
    Jumpifeq,
    Jumpifneq,

    // Data stack
    Pushs,
    Pops,

    // Integer arithmetic
    Add,
    Sub,
    Mul,
    Idiv,

    // Relations and booleans
    Lt,
    Gt,
    Eq,
    And,
    Or,
    Not,

    // Conversions
    Int2Char,
    Stri2Int,

    // I/O
    Read,
    Write,

    // Strings
    Concat,
    Strlen,
    Getchar,
    Setchar,

    // Introspection and debugging
    Type,
    Dprint,
    Break,

    // Termination
    Exit,
}

/// Which frame a variable reference names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
pub enum FrameKind {
    #[strum(serialize = "GF")]
    Global,
    #[strum(serialize = "LF")]
    Local,
    #[strum(serialize = "TF")]
    Temporary,
}

/// The type selector accepted by `READ`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum ReadType {
    Int,
    String,
    Bool,
}

/// A decoded instruction argument.
///
/// Literal variants carry their final value (string escapes already
/// resolved); `Var` carries the frame and name split out of the
/// `FRAME@name` lexeme.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
    Nil,
    Var(FrameKind, String),
    Label(String),
    TypeName(ReadType),
}

impl Arg {
    /// The type-tag name this argument was written with, for error
    /// messages.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Bool(_) => "bool",
            Self::Str(_) => "string",
            Self::Nil => "nil",
            Self::Var(..) => "var",
            Self::Label(_) => "label",
            Self::TypeName(_) => "type",
        }
    }
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "int@{v}"),
            Self::Float(v) => write!(f, "float@{v}"),
            Self::Bool(v) => write!(f, "bool@{v}"),
            Self::Str(v) => write!(f, "string@{v}"),
            Self::Nil => write!(f, "nil@nil"),
            Self::Var(frame, name) => write!(f, "{frame}@{name}"),
            Self::Label(name) => write!(f, "label {name}"),
            Self::TypeName(t) => write!(f, "type {t}"),
        }
    }
}

/// One numbered instruction: opcode plus decoded positional arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    pub order: u32,
    pub opcode: Opcode,
    pub args: Vec<Arg>,
}

impl Instruction {
    /// Requires exactly zero arguments.
    pub(crate) fn none(&self) -> RunResult<()> {
        self.arity(0)?;
        Ok(())
    }

    /// Requires exactly one argument.
    pub(crate) fn one(&self) -> RunResult<&Arg> {
        self.arity(1)?;
        Ok(&self.args[0])
    }

    /// Requires exactly two arguments.
    pub(crate) fn two(&self) -> RunResult<(&Arg, &Arg)> {
        self.arity(2)?;
        Ok((&self.args[0], &self.args[1]))
    }

    /// Requires exactly three arguments.
    pub(crate) fn three(&self) -> RunResult<(&Arg, &Arg, &Arg)> {
        self.arity(3)?;
        Ok((&self.args[0], &self.args[1], &self.args[2]))
    }

    fn arity(&self, expected: usize) -> RunResult<()> {
        if self.args.len() == expected {
            Ok(())
        } else {
            fault_err!(
                ErrorKind::SourceStructure;
                "{} expects {} argument(s), found {} at order {}",
                self.opcode, expected, self.args.len(), self.order
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn opcode_names_round_trip_uppercase() {
        assert_eq!(Opcode::from_str("MOVE").unwrap(), Opcode::Move);
        assert_eq!(Opcode::from_str("INT2CHAR").unwrap(), Opcode::Int2Char);
        assert_eq!(Opcode::from_str("STRI2INT").unwrap(), Opcode::Stri2Int);
        assert_eq!(Opcode::Jumpifneq.to_string(), "JUMPIFNEQ");
        assert!(Opcode::from_str("move").is_err());
        assert!(Opcode::from_str("NOP").is_err());
    }

    #[test]
    fn frame_kind_parses_prefixes() {
        assert_eq!(FrameKind::from_str("GF").unwrap(), FrameKind::Global);
        assert_eq!(FrameKind::from_str("LF").unwrap(), FrameKind::Local);
        assert_eq!(FrameKind::from_str("TF").unwrap(), FrameKind::Temporary);
        assert!(FrameKind::from_str("gf").is_err());
    }

    #[test]
    fn arity_mismatch_is_a_structure_error() {
        let instr = Instruction {
            order: 7,
            opcode: Opcode::Move,
            args: vec![Arg::Nil],
        };
        let err = instr.two().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SourceStructure);
    }
}
