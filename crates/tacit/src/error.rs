//! The closed error taxonomy shared by the loader and the interpreter.
//!
//! Every failure an input program can provoke belongs to exactly one
//! [`ErrorKind`], and every kind maps to one process exit code. The first
//! error aborts the run; there is no recovery inside the interpreted
//! language.

use std::fmt;

use strum::Display;

/// Result type alias for operations that can fail with an [`InterpretError`].
pub type RunResult<T> = Result<T, InterpretError>;

/// Classification of everything that can go wrong while loading or running
/// a program.
///
/// The string representation is kebab-case (`SourceStructure` ->
/// "source-structure") and is used as the error prefix in CLI output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum ErrorKind {
    /// Malformed document shape: bad root, bad order, bad arity, bad
    /// argument shape, unknown opcode.
    SourceStructure,
    /// Redefined variable, duplicate label, jump to an undefined label.
    Semantic,
    /// A value of the wrong type where a specific type tag was required.
    OperandType,
    /// Use of a variable name that was never defined in the frame.
    Variable,
    /// A reference to a frame that does not currently exist.
    Frame,
    /// A missing value: read of an unassigned variable, pop of an empty
    /// stack.
    Value,
    /// A value of the right type outside its legal range: division by
    /// zero, exit code out of range, type mismatch in comparisons.
    OperandValue,
    /// A string index outside the value, or a scalar outside Unicode.
    StringOperation,
    /// Host faults: I/O failure, step budget exhausted.
    Internal,
}

impl ErrorKind {
    /// The process exit code this kind maps to.
    #[must_use]
    pub fn exit_code(self) -> u8 {
        match self {
            Self::SourceStructure => 32,
            Self::Semantic => 52,
            Self::OperandType => 53,
            Self::Variable => 54,
            Self::Frame => 55,
            Self::Value => 56,
            Self::OperandValue => 57,
            Self::StringOperation => 58,
            Self::Internal => 99,
        }
    }
}

/// An error produced while loading or executing a program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterpretError {
    kind: ErrorKind,
    message: String,
}

impl InterpretError {
    pub fn new(kind: ErrorKind, message: String) -> Self {
        Self { kind, message }
    }

    /// Which part of the taxonomy this error belongs to.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The process exit code for this error.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        self.kind.exit_code()
    }

    /// Wraps a host I/O failure.
    pub(crate) fn host(err: std::io::Error) -> Self {
        Self::new(ErrorKind::Internal, err.to_string())
    }
}

impl fmt::Display for InterpretError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for InterpretError {}

macro_rules! fault {
    ($kind:expr; $($fmt_args:tt)*) => {
        crate::error::InterpretError::new($kind, format!($($fmt_args)*))
    };
}
pub(crate) use fault;

macro_rules! fault_err {
    ($kind:expr; $($fmt_args:tt)*) => {
        Err(crate::error::fault!($kind; $($fmt_args)*))
    };
}
pub(crate) use fault_err;
