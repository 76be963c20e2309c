#![doc = include_str!("../../../README.md")]
mod error;
mod frame;
mod instruction;
mod interpreter;
mod io;
mod loader;
mod value;

pub use crate::{
    error::{ErrorKind, InterpretError, RunResult},
    instruction::{Arg, FrameKind, Instruction, Opcode, ReadType},
    interpreter::Interpreter,
    io::{CollectOutput, InputPort, NoOutput, OutputPort, QueuedInput, StdErrOutput, StdInput, StdOutput},
    loader::Program,
    value::Value,
};
