pub mod compiler;
pub mod constants;
mod error;

pub use self::{
    compiler::{compile, compile_with, CompilerConf},
    error::{JackError, JackResult, LexError, LexErrorKind, Location, SyntaxError},
};

pub const IMPL_VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod prelude {
    pub use super::{
        compiler::{CompilationEngine, CompilerConf, Lexer, VmCommand, VmWriter},
        error::{JackError, JackResult},
    };
}
