//! Compiler
mod cursor;
mod engine;
mod lexer;
mod symbol;
mod token_stream;
mod tokens;
mod vm;

use std::fmt::Write;

use crate::error::JackResult;

/// Compiler options.
#[derive(Debug, Clone)]
pub struct CompilerConf {
    /// Redeclaring a name in the same scope is an error, instead
    /// of a warning where the last declaration wins.
    pub strict_declarations: bool,
    /// A `return` that is the last statement of a subroutine body
    /// falls through to the end of the subroutine without a jump.
    pub fold_tail_return: bool,
}

impl Default for CompilerConf {
    fn default() -> Self {
        Self {
            strict_declarations: false,
            fold_tail_return: true,
        }
    }
}

/// Compile the source of one class into stack machine code, using the
/// default options.
pub fn compile(source_code: impl AsRef<str>) -> JackResult<String> {
    compile_with(source_code, CompilerConf::default())
}

pub fn compile_with(source_code: impl AsRef<str>, conf: CompilerConf) -> JackResult<String> {
    let lexer = Lexer::new(source_code.as_ref());
    let writer = CompilationEngine::new(lexer, conf).compile_class()?;

    let mut output = String::new();
    write!(output, "{writer}")?;
    Ok(output)
}

pub use self::{
    engine::CompilationEngine,
    lexer::{Lexer, LexerIter},
    symbol::{Symbol, SymbolKind, SymbolTable},
    token_stream::TokenStream,
    tokens::{Keyword, Span, Token, TokenKind},
    vm::{ArithmeticOp, Segment, VmCommand, VmWriter},
};
