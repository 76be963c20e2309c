//! The loader: turns an XML document tree into a validated [`Program`].
//!
//! Structural rules live here. Everything lexical is resolved at load
//! time — opcodes become [`Opcode`] variants, lexemes become decoded
//! [`Arg`]s, `LABEL` targets are collected into the label table — so the
//! executor never re-parses a string. Per-opcode arity is the one check
//! deferred to execute time (`LABEL` excepted, because the label table
//! must be complete before the first forward jump).

use std::str::FromStr;

use ahash::AHashMap;
use roxmltree::{Document, Node};

use crate::error::{fault, fault_err, ErrorKind, RunResult};
use crate::instruction::{Arg, FrameKind, Instruction, Opcode, ReadType};

/// A loaded program: the order-indexed instruction table and the label
/// table. Immutable during execution.
#[derive(Debug)]
pub struct Program {
    instructions: Vec<Instruction>,
    by_order: AHashMap<u32, usize>,
    labels: AHashMap<String, u32>,
    last_order: u32,
}

impl Program {
    /// Parses XML source text and loads it.
    ///
    /// Convenience over [`Program::from_document`]; XML syntax failures
    /// are reported as source-structure errors.
    pub fn parse(source: &str) -> RunResult<Self> {
        let doc = Document::parse(source)
            .map_err(|err| fault!(ErrorKind::SourceStructure; "malformed XML: {err}"))?;
        Self::from_document(&doc)
    }

    /// Loads a program from an already-parsed document tree.
    ///
    /// # Errors
    /// Source-structure errors for any violation of the document shape
    /// (root name, instruction attributes, argument slots, lexeme forms,
    /// unknown opcodes); a semantic error for duplicate labels.
    pub fn from_document(doc: &Document) -> RunResult<Self> {
        let root = doc.root_element();
        if root.tag_name().name() != "program" {
            return fault_err!(
                ErrorKind::SourceStructure;
                "root element must be <program>, found <{}>", root.tag_name().name()
            );
        }

        let mut loader = Loader::default();
        for child in root.children().filter(Node::is_element) {
            loader.load_instruction(child)?;
        }
        Ok(loader.finish())
    }

    /// The instruction with the given order, if one exists.
    ///
    /// Orders need not be contiguous; the executor skips absent orders.
    #[must_use]
    pub fn instruction_at(&self, order: u32) -> Option<&Instruction> {
        self.by_order.get(&order).map(|&idx| &self.instructions[idx])
    }

    /// The order a label names, if the label exists.
    #[must_use]
    pub fn label_target(&self, name: &str) -> Option<u32> {
        self.labels.get(name).copied()
    }

    /// The highest order in the program; execution stops past it.
    #[must_use]
    pub fn last_order(&self) -> u32 {
        self.last_order
    }

    /// Number of instructions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}

#[derive(Debug, Default)]
struct Loader {
    instructions: Vec<Instruction>,
    by_order: AHashMap<u32, usize>,
    labels: AHashMap<String, u32>,
    last_order: u32,
}

impl Loader {
    fn load_instruction(&mut self, node: Node) -> RunResult<()> {
        if node.tag_name().name() != "instruction" {
            return fault_err!(
                ErrorKind::SourceStructure;
                "unexpected element <{}> in <program>", node.tag_name().name()
            );
        }

        let order = decode_order(required_attribute(node, "order")?)?;
        if self.by_order.contains_key(&order) {
            return fault_err!(ErrorKind::SourceStructure; "duplicate instruction order {order}");
        }

        let opcode_attr = required_attribute(node, "opcode")?;
        let opcode = Opcode::from_str(&opcode_attr.trim().to_uppercase())
            .map_err(|_| fault!(ErrorKind::SourceStructure; "unknown opcode '{opcode_attr}' at order {order}"))?;

        let args = collect_args(node, order)?;
        if opcode == Opcode::Label {
            self.record_label(&args, order)?;
        }

        self.by_order.insert(order, self.instructions.len());
        self.instructions.push(Instruction { order, opcode, args });
        self.last_order = self.last_order.max(order);
        Ok(())
    }

    fn record_label(&mut self, args: &[Arg], order: u32) -> RunResult<()> {
        match args {
            [Arg::Label(name)] => {
                if self.labels.insert(name.clone(), order).is_some() {
                    return fault_err!(ErrorKind::Semantic; "label '{name}' is defined more than once");
                }
                Ok(())
            }
            _ => fault_err!(ErrorKind::SourceStructure; "LABEL expects a single label argument at order {order}"),
        }
    }

    fn finish(self) -> Program {
        Program {
            instructions: self.instructions,
            by_order: self.by_order,
            labels: self.labels,
            last_order: self.last_order,
        }
    }
}

fn required_attribute<'a>(node: Node<'a, '_>, name: &str) -> RunResult<&'a str> {
    match node.attribute(name) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => fault_err!(ErrorKind::SourceStructure; "instruction is missing the '{name}' attribute"),
    }
}

fn decode_order(text: &str) -> RunResult<u32> {
    match text.trim().parse::<u32>() {
        Ok(order) if order >= 1 => Ok(order),
        _ => fault_err!(ErrorKind::SourceStructure; "instruction order '{text}' is not a positive integer"),
    }
}

/// Gathers `arg1`..`arg3` children into positional order.
///
/// A higher-numbered arg without all lower-numbered args present is a
/// gap and is rejected; so is a duplicated slot. Child elements outside
/// the `argN` set are ignored.
fn collect_args(node: Node, order: u32) -> RunResult<Vec<Arg>> {
    let mut slots: [Option<Arg>; 3] = [None, None, None];
    for child in node.children().filter(Node::is_element) {
        let idx = match child.tag_name().name() {
            "arg1" => 0,
            "arg2" => 1,
            "arg3" => 2,
            _ => continue,
        };
        if slots[idx].is_some() {
            return fault_err!(ErrorKind::SourceStructure; "duplicate arg{} at order {order}", idx + 1);
        }
        slots[idx] = Some(decode_arg(child, order)?);
    }

    let mut args = Vec::new();
    let mut gap = false;
    for (idx, slot) in slots.into_iter().enumerate() {
        match slot {
            Some(_) if gap => {
                return fault_err!(ErrorKind::SourceStructure; "arg{} without arg{} at order {order}", idx + 1, idx);
            }
            Some(arg) => args.push(arg),
            None => gap = true,
        }
    }
    Ok(args)
}

fn decode_arg(node: Node, order: u32) -> RunResult<Arg> {
    let Some(tag) = node.attribute("type") else {
        return fault_err!(ErrorKind::SourceStructure; "argument without a 'type' attribute at order {order}");
    };
    let lexeme = node.text().unwrap_or("").trim();

    match tag.trim() {
        "int" => match lexeme.parse::<i64>() {
            Ok(value) => Ok(Arg::Int(value)),
            Err(_) => fault_err!(ErrorKind::SourceStructure; "'{lexeme}' is not an int literal at order {order}"),
        },
        "float" => match lexeme.parse::<f64>() {
            Ok(value) => Ok(Arg::Float(value)),
            Err(_) => fault_err!(ErrorKind::SourceStructure; "'{lexeme}' is not a float literal at order {order}"),
        },
        "bool" => match lexeme {
            "true" => Ok(Arg::Bool(true)),
            "false" => Ok(Arg::Bool(false)),
            _ => fault_err!(ErrorKind::SourceStructure; "'{lexeme}' is not a bool literal at order {order}"),
        },
        "string" => Ok(Arg::Str(decode_escapes(lexeme))),
        "nil" => Ok(Arg::Nil),
        "var" => decode_var(lexeme, order),
        "label" if !lexeme.is_empty() => Ok(Arg::Label(lexeme.to_owned())),
        "label" => fault_err!(ErrorKind::SourceStructure; "empty label at order {order}"),
        "type" => ReadType::from_str(lexeme)
            .map(Arg::TypeName)
            .map_err(|_| fault!(ErrorKind::SourceStructure; "'{lexeme}' is not a readable type at order {order}")),
        other => fault_err!(ErrorKind::SourceStructure; "unknown argument type '{other}' at order {order}"),
    }
}

fn decode_var(lexeme: &str, order: u32) -> RunResult<Arg> {
    let parsed = lexeme
        .split_once('@')
        .and_then(|(frame, name)| FrameKind::from_str(frame).ok().map(|frame| (frame, name)));
    match parsed {
        Some((frame, name)) if !name.is_empty() => Ok(Arg::Var(frame, name.to_owned())),
        _ => fault_err!(ErrorKind::SourceStructure; "'{lexeme}' is not a variable reference at order {order}"),
    }
}

/// Replaces `\DDD` (exactly three decimal digits) with the scalar at that
/// codepoint. A backslash not followed by three digits is kept literally.
fn decode_escapes(lexeme: &str) -> String {
    let mut out = String::with_capacity(lexeme.len());
    let mut iter = lexeme.char_indices();
    while let Some((idx, c)) = iter.next() {
        if c == '\\' {
            if let Some(digits) = lexeme.get(idx + 1..idx + 4) {
                if digits.bytes().all(|b| b.is_ascii_digit()) {
                    // Three decimal digits top out at 999, well inside the
                    // scalar range.
                    let code: u32 = digits.parse().expect("three ascii digits");
                    out.push(char::from_u32(code).expect("codepoint below 1000"));
                    iter.nth(2);
                    continue;
                }
            }
        }
        out.push(c);
    }
    out
}
