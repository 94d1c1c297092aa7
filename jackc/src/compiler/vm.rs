//! Stack machine instructions and the code emitter.
use std::{
    fmt::{self, Display},
    io::Write,
    str::FromStr,
};

use smol_str::SmolStr;

use crate::error::{JackError, JackResult};

/// Virtual memory segment addressed by `push` and `pop`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Segment {
    Constant,
    Argument,
    Local,
    Static,
    This,
    That,
    Pointer,
    Temp,
}

impl Segment {
    #[rustfmt::skip]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Constant => "constant",
            Self::Argument => "argument",
            Self::Local    => "local",
            Self::Static   => "static",
            Self::This     => "this",
            Self::That     => "that",
            Self::Pointer  => "pointer",
            Self::Temp     => "temp",
        }
    }
}

impl Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Segment {
    type Err = JackError;

    #[rustfmt::skip]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "constant" => Ok(Self::Constant),
            "argument" => Ok(Self::Argument),
            "local"    => Ok(Self::Local),
            "static"   => Ok(Self::Static),
            "this"     => Ok(Self::This),
            "that"     => Ok(Self::That),
            "pointer"  => Ok(Self::Pointer),
            "temp"     => Ok(Self::Temp),
            _ => Err(JackError::UnknownSegment(s.to_owned())),
        }
    }
}

/// Arithmetic and logical commands operating on the top of the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ArithmeticOp {
    Add,
    Sub,
    Neg,
    Eq,
    Gt,
    Lt,
    And,
    Or,
    Not,
}

impl ArithmeticOp {
    #[rustfmt::skip]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Sub => "sub",
            Self::Neg => "neg",
            Self::Eq  => "eq",
            Self::Gt  => "gt",
            Self::Lt  => "lt",
            Self::And => "and",
            Self::Or  => "or",
            Self::Not => "not",
        }
    }
}

impl Display for ArithmeticOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArithmeticOp {
    type Err = JackError;

    #[rustfmt::skip]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "add" => Ok(Self::Add),
            "sub" => Ok(Self::Sub),
            "neg" => Ok(Self::Neg),
            "eq"  => Ok(Self::Eq),
            "gt"  => Ok(Self::Gt),
            "lt"  => Ok(Self::Lt),
            "and" => Ok(Self::And),
            "or"  => Ok(Self::Or),
            "not" => Ok(Self::Not),
            _ => Err(JackError::UnknownCommand(s.to_owned())),
        }
    }
}

/// One stack machine instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VmCommand {
    /// `push segment index`
    Push(Segment, u16),
    /// `pop segment index`
    Pop(Segment, u16),
    Arithmetic(ArithmeticOp),
    /// `label name`
    Label(SmolStr),
    /// `goto name`
    Goto(SmolStr),
    /// `if-goto name`
    /// Pops the top of the stack and jumps if it is not zero.
    IfGoto(SmolStr),
    /// `call Class.name nArgs`
    Call(SmolStr, u16),
    /// `function Class.name nLocals`
    Function(SmolStr, u16),
    Return,
}

/// Outputs the instruction in the translator's text syntax.
impl Display for VmCommand {
    #[rustfmt::skip]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            VmCommand::Push(segment, index) => write!(f, "push {} {}", segment, index),
            VmCommand::Pop(segment, index)  => write!(f, "pop {} {}", segment, index),
            VmCommand::Arithmetic(op)       => write!(f, "{}", op),
            VmCommand::Label(name)          => write!(f, "label {}", name),
            VmCommand::Goto(name)           => write!(f, "goto {}", name),
            VmCommand::IfGoto(name)         => write!(f, "if-goto {}", name),
            VmCommand::Call(name, n_args)   => write!(f, "call {} {}", name, n_args),
            VmCommand::Function(name, n_locals) => write!(f, "function {} {}", name, n_locals),
            VmCommand::Return               => write!(f, "return"),
        }
    }
}

/// Code emitter.
///
/// Commands are appended to a buffer, which is written out in one go
/// after the whole class compiled.
#[derive(Debug, Default)]
pub struct VmWriter {
    code: Vec<VmCommand>,
}

impl VmWriter {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    fn emit(&mut self, command: VmCommand) {
        self.code.push(command)
    }

    pub fn push(&mut self, segment: Segment, index: u16) {
        self.emit(VmCommand::Push(segment, index))
    }

    pub fn pop(&mut self, segment: Segment, index: u16) {
        self.emit(VmCommand::Pop(segment, index))
    }

    pub fn arithmetic(&mut self, op: ArithmeticOp) {
        self.emit(VmCommand::Arithmetic(op))
    }

    pub fn label(&mut self, name: impl Into<SmolStr>) {
        self.emit(VmCommand::Label(name.into()))
    }

    pub fn goto(&mut self, name: impl Into<SmolStr>) {
        self.emit(VmCommand::Goto(name.into()))
    }

    pub fn if_goto(&mut self, name: impl Into<SmolStr>) {
        self.emit(VmCommand::IfGoto(name.into()))
    }

    pub fn call(&mut self, name: impl Into<SmolStr>, n_args: u16) {
        self.emit(VmCommand::Call(name.into(), n_args))
    }

    pub fn function(&mut self, name: impl Into<SmolStr>, n_locals: u16) {
        self.emit(VmCommand::Function(name.into(), n_locals))
    }

    pub fn ret(&mut self) {
        self.emit(VmCommand::Return)
    }

    /// Emitted commands so far, in order.
    pub fn commands(&self) -> &[VmCommand] {
        &self.code
    }

    /// Write every command on its own line.
    pub fn write_to<W: Write>(&self, mut w: W) -> JackResult<()> {
        for command in &self.code {
            writeln!(w, "{command}")?;
        }
        w.flush()?;
        Ok(())
    }
}

impl Display for VmWriter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for command in &self.code {
            writeln!(f, "{command}")?;
        }
        Ok(())
    }
}
