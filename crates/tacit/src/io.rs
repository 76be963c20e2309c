//! Injectable I/O ports.
//!
//! The interpreter never touches raw streams: `READ` goes through an
//! [`InputPort`] and `WRITE`/`DPRINT`/`BREAK` go through [`OutputPort`]s.
//! The default implementations wrap stdin/stdout/stderr; tests inject
//! [`QueuedInput`] and [`CollectOutput`] to run programs entirely in
//! memory.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

/// Trait for the typed input queries issued by `READ`.
///
/// Each method consumes one input token. `Ok(None)` is the absence
/// sentinel — end of input or an unparseable token — which `READ` stores
/// as nil. `Err` is a host fault and aborts the run.
pub trait InputPort {
    /// Reads one integer.
    fn read_int(&mut self) -> io::Result<Option<i64>>;

    /// Reads one line of text.
    fn read_string(&mut self) -> io::Result<Option<String>>;

    /// Reads one boolean (`true`/`false`, case-insensitive).
    fn read_bool(&mut self) -> io::Result<Option<bool>>;
}

/// Trait for writing interpreter output.
///
/// The interpreter decides what to print (`WRITE` formatting rules live in
/// the executor); ports decide where it goes. The typed methods default to
/// the canonical text form so most implementations only provide
/// [`write_str`](OutputPort::write_str).
pub trait OutputPort {
    /// Writes a string verbatim, without any terminator.
    fn write_str(&mut self, s: &str) -> io::Result<()>;

    /// Writes an integer in decimal.
    fn write_int(&mut self, v: i64) -> io::Result<()> {
        self.write_str(&v.to_string())
    }

    /// Writes a float in its canonical text form.
    fn write_float(&mut self, v: f64) -> io::Result<()> {
        self.write_str(&v.to_string())
    }

    /// Writes a boolean as `true` or `false`.
    fn write_bool(&mut self, v: bool) -> io::Result<()> {
        self.write_str(if v { "true" } else { "false" })
    }
}

/// Line-oriented [`InputPort`] over stdin.
#[derive(Debug, Default)]
pub struct StdInput;

impl StdInput {
    fn next_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(strip_newline(line)))
    }
}

impl InputPort for StdInput {
    fn read_int(&mut self) -> io::Result<Option<i64>> {
        Ok(self.next_line()?.and_then(|line| parse_int(&line)))
    }

    fn read_string(&mut self) -> io::Result<Option<String>> {
        self.next_line()
    }

    fn read_bool(&mut self) -> io::Result<Option<bool>> {
        Ok(self.next_line()?.and_then(|line| parse_bool(&line)))
    }
}

/// In-memory [`InputPort`] over a queue of lines.
///
/// Used by tests, and by the CLI when an input file is supplied.
#[derive(Debug, Default)]
pub struct QueuedInput {
    lines: VecDeque<String>,
}

impl QueuedInput {
    /// Creates a queue holding each line of `text`.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        Self {
            lines: text.lines().map(str::to_owned).collect(),
        }
    }

    /// Appends one line to the queue.
    pub fn push_line(&mut self, line: impl Into<String>) {
        self.lines.push_back(line.into());
    }

    fn next_line(&mut self) -> Option<String> {
        self.lines.pop_front()
    }
}

impl InputPort for QueuedInput {
    fn read_int(&mut self) -> io::Result<Option<i64>> {
        Ok(self.next_line().and_then(|line| parse_int(&line)))
    }

    fn read_string(&mut self) -> io::Result<Option<String>> {
        Ok(self.next_line())
    }

    fn read_bool(&mut self) -> io::Result<Option<bool>> {
        Ok(self.next_line().and_then(|line| parse_bool(&line)))
    }
}

/// Default [`OutputPort`] over stdout.
#[derive(Debug, Default)]
pub struct StdOutput;

impl OutputPort for StdOutput {
    fn write_str(&mut self, s: &str) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        stdout.write_all(s.as_bytes())?;
        stdout.flush()
    }
}

/// [`OutputPort`] over stderr, used for `DPRINT` and `BREAK`.
#[derive(Debug, Default)]
pub struct StdErrOutput;

impl OutputPort for StdErrOutput {
    fn write_str(&mut self, s: &str) -> io::Result<()> {
        let mut stderr = io::stderr().lock();
        stderr.write_all(s.as_bytes())?;
        stderr.flush()
    }
}

/// An [`OutputPort`] that collects everything into a string.
#[derive(Debug, Default)]
pub struct CollectOutput(String);

impl CollectOutput {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The collected output so far.
    #[must_use]
    pub fn output(&self) -> &str {
        self.0.as_str()
    }

    /// Consumes the port and returns the collected output.
    #[must_use]
    pub fn into_output(self) -> String {
        self.0
    }
}

impl OutputPort for CollectOutput {
    fn write_str(&mut self, s: &str) -> io::Result<()> {
        self.0.push_str(s);
        Ok(())
    }
}

/// An [`OutputPort`] that discards everything.
#[derive(Debug, Default)]
pub struct NoOutput;

impl OutputPort for NoOutput {
    fn write_str(&mut self, _s: &str) -> io::Result<()> {
        Ok(())
    }
}

fn strip_newline(mut line: String) -> String {
    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
    line
}

fn parse_int(line: &str) -> Option<i64> {
    line.trim().parse().ok()
}

fn parse_bool(line: &str) -> Option<bool> {
    let token = line.trim();
    if token.eq_ignore_ascii_case("true") {
        Some(true)
    } else if token.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}
