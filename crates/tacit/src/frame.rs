//! Variable frames and the frame registry.
//!
//! Three kinds of frame exist: the global frame (always present), an
//! optional temporary frame, and a LIFO stack of local frames. The global
//! frame sits at the bottom of the stack, so `LF` resolves to `GF` until
//! the program's first `PUSHFRAME` — and `POPFRAME` must never pop it.

use ahash::AHashMap;

use crate::error::{fault_err, ErrorKind, RunResult};
use crate::instruction::FrameKind;
use crate::value::Value;

/// One frame: a mapping from variable name to value slot.
///
/// Slots are created only by `DEFVAR` (as [`Value::Undef`]) and live as
/// long as the frame does.
#[derive(Debug, Default)]
pub(crate) struct Frame(AHashMap<String, Value>);

impl Frame {
    fn define(&mut self, frame: FrameKind, name: &str) -> RunResult<()> {
        if self.0.contains_key(name) {
            return fault_err!(ErrorKind::Semantic; "variable {frame}@{name} is already defined");
        }
        self.0.insert(name.to_owned(), Value::Undef);
        Ok(())
    }

    fn slot(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    fn slot_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.0.get_mut(name)
    }
}

/// The frame registry: global frame, optional temporary frame, local
/// frame stack.
#[derive(Debug)]
pub(crate) struct Frames {
    /// Index 0 is the global frame; the top is what `LF` resolves to.
    stack: Vec<Frame>,
    temporary: Option<Frame>,
}

impl Frames {
    pub fn new() -> Self {
        Self {
            stack: vec![Frame::default()],
            temporary: None,
        }
    }

    /// `CREATEFRAME`: (re)creates the temporary frame, discarding any
    /// previous one.
    pub fn create_temporary(&mut self) {
        self.temporary = Some(Frame::default());
    }

    /// `PUSHFRAME`: moves the temporary frame onto the local stack.
    pub fn push_temporary(&mut self) -> RunResult<()> {
        match self.temporary.take() {
            Some(frame) => {
                self.stack.push(frame);
                Ok(())
            }
            None => fault_err!(ErrorKind::Frame; "PUSHFRAME without a temporary frame"),
        }
    }

    /// `POPFRAME`: moves the top local frame into the temporary slot.
    ///
    /// The global frame at the bottom of the stack is not poppable.
    pub fn pop_local(&mut self) -> RunResult<()> {
        if self.stack.len() <= 1 {
            return fault_err!(ErrorKind::Frame; "POPFRAME without a local frame");
        }
        self.temporary = self.stack.pop();
        Ok(())
    }

    /// `DEFVAR`: creates an unassigned slot in the named frame.
    pub fn define(&mut self, frame: FrameKind, name: &str) -> RunResult<()> {
        self.frame_mut(frame)?.define(frame, name)
    }

    /// Reads a variable's value, requiring it to be assigned.
    pub fn value(&self, frame: FrameKind, name: &str) -> RunResult<&Value> {
        let value = self.raw(frame, name)?;
        if value.is_undef() {
            return fault_err!(ErrorKind::Value; "variable {frame}@{name} has no value");
        }
        Ok(value)
    }

    /// Reads a variable's slot as-is; `Undef` is a legal result.
    ///
    /// Only `TYPE` reads through this.
    pub fn raw(&self, frame: FrameKind, name: &str) -> RunResult<&Value> {
        match self.frame(frame)?.slot(name) {
            Some(value) => Ok(value),
            None => fault_err!(ErrorKind::Variable; "variable {frame}@{name} is not defined"),
        }
    }

    /// Overwrites a defined variable's value.
    pub fn assign(&mut self, frame: FrameKind, name: &str, value: Value) -> RunResult<()> {
        match self.frame_mut(frame)?.slot_mut(name) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => fault_err!(ErrorKind::Variable; "variable {frame}@{name} is not defined"),
        }
    }

    /// Number of frames on the local stack above the global frame.
    pub fn local_depth(&self) -> usize {
        self.stack.len() - 1
    }

    pub fn has_temporary(&self) -> bool {
        self.temporary.is_some()
    }

    fn frame(&self, kind: FrameKind) -> RunResult<&Frame> {
        match kind {
            FrameKind::Global => Ok(&self.stack[0]),
            // The global frame doubles as the bottom local frame, so this
            // cannot fail.
            FrameKind::Local => Ok(self.stack.last().expect("frame stack holds the global frame")),
            FrameKind::Temporary => match &self.temporary {
                Some(frame) => Ok(frame),
                None => fault_err!(ErrorKind::Frame; "temporary frame does not exist"),
            },
        }
    }

    fn frame_mut(&mut self, kind: FrameKind) -> RunResult<&mut Frame> {
        match kind {
            FrameKind::Global => Ok(&mut self.stack[0]),
            FrameKind::Local => Ok(self.stack.last_mut().expect("frame stack holds the global frame")),
            FrameKind::Temporary => match &mut self.temporary {
                Some(frame) => Ok(frame),
                None => fault_err!(ErrorKind::Frame; "temporary frame does not exist"),
            },
        }
    }
}
