//! Compilation engine
//!
//! Recursive descent over the class grammar, with one method per
//! production. Each method consumes its tokens and emits stack machine
//! code as it goes, so there is no syntax tree in between. The native
//! call stack doubles as the parse stack.
use log::{debug, trace, warn};
use smol_str::SmolStr;

use crate::{
    constants::*,
    error::{JackError, JackResult, Location},
};

use super::{
    symbol::{SymbolKind, SymbolTable},
    token_stream::TokenStream,
    tokens::{Keyword, Token, TokenKind},
    vm::{ArithmeticOp, Segment, VmWriter},
    CompilerConf, Lexer,
};

use TokenKind as TK;

pub struct CompilationEngine<'a> {
    stream: TokenStream<'a>,
    symbols: SymbolTable,
    writer: VmWriter,
    conf: CompilerConf,
    /// Name of the class being compiled.
    class_name: SmolStr,
    /// Source of label numbers. Shared by every construct in the
    /// class so that labels never collide within one output.
    label_counter: usize,
    subroutine: SubroutineState,
}

/// Memory location of a resolved variable.
#[derive(Debug, Clone, Copy)]
struct Variable {
    segment: Segment,
    index: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SubroutineKind {
    Constructor,
    Function,
    Method,
}

/// State of the subroutine currently being compiled.
#[derive(Debug, Default)]
struct SubroutineState {
    /// Label that every `return` statement jumps to. The single
    /// `return` instruction of the subroutine is emitted there.
    end_label: SmolStr,
    returns_void: bool,
    /// Number of jumps emitted to the end label.
    return_jumps: usize,
    /// Nesting of statement blocks, where 0 is the subroutine body.
    depth: usize,
}

impl<'a> CompilationEngine<'a> {
    pub fn new(lexer: Lexer<'a>, conf: CompilerConf) -> Self {
        Self {
            stream: TokenStream::new(lexer),
            symbols: SymbolTable::new(),
            writer: VmWriter::new(),
            conf,
            class_name: SmolStr::default(),
            label_counter: 0,
            subroutine: SubroutineState::default(),
        }
    }

    /// Compile the source unit, which must contain exactly one class.
    ///
    /// Stops at the first error. The writer is only handed back when
    /// the whole class compiled.
    pub fn compile_class(mut self) -> JackResult<VmWriter> {
        self.stream.consume(TK::Keyword(Keyword::Class))?;
        let name = self.stream.consume(TK::Ident)?;
        self.class_name = SmolStr::from(self.stream.fragment(&name));
        self.stream.consume(TK::LeftBrace)?;

        while matches!(
            self.stream.peek_kind()?,
            TK::Keyword(Keyword::Static | Keyword::Field)
        ) {
            self.class_var_dec()?;
        }

        while matches!(
            self.stream.peek_kind()?,
            TK::Keyword(Keyword::Constructor | Keyword::Function | Keyword::Method)
        ) {
            self.subroutine_dec()?;
        }

        self.stream.consume(TK::RightBrace)?;
        self.stream.consume(TK::EOF)?;

        debug!(
            "compiled class {} into {} commands",
            self.class_name,
            self.writer.commands().len()
        );

        Ok(self.writer)
    }

    fn next_label_id(&mut self) -> usize {
        let id = self.label_counter;
        self.label_counter += 1;
        id
    }

    #[inline]
    fn location(&self, token: &Token) -> Location {
        Location::new(self.stream.source_code(), &token.span)
    }

    /// Point a symbol table error at the identifier token.
    fn locate(&self, err: JackError, token: &Token) -> JackError {
        match err {
            JackError::Unresolved {
                name,
                location: None,
            } => JackError::Unresolved {
                name,
                location: Some(self.location(token)),
            },
            JackError::TooManySymbols {
                name,
                location: None,
            } => JackError::TooManySymbols {
                name,
                location: Some(self.location(token)),
            },
            err => err,
        }
    }

    /// Storage of the variable named by the identifier token.
    fn resolve(&self, token: &Token) -> JackResult<Variable> {
        let name = self.stream.fragment(token);
        let kind = self
            .symbols
            .kind_of(name)
            .map_err(|err| self.locate(err, token))?;
        let index = self
            .symbols
            .index_of(name)
            .map_err(|err| self.locate(err, token))?;

        Ok(Variable {
            segment: kind.segment(),
            index,
        })
    }

    fn declare(&mut self, name: &Token, ty: SmolStr, kind: SymbolKind) -> JackResult<()> {
        let ident = self.stream.fragment(name);

        let previous = self
            .symbols
            .define(ident, ty, kind)
            .map_err(|err| self.locate(err, name))?;

        if let Some(previous) = previous {
            let location = self.location(name);
            if self.conf.strict_declarations {
                return Err(JackError::Redeclared {
                    name: SmolStr::from(ident),
                    location,
                });
            }
            warn!(
                "'{}' redeclared {}, replacing {:?} {} {}",
                ident, location, previous.kind, previous.ty, previous.index
            );
        }

        Ok(())
    }

    #[inline]
    fn push_variable(&mut self, variable: Variable) {
        self.writer.push(variable.segment, variable.index)
    }

    #[inline]
    fn pop_variable(&mut self, variable: Variable) {
        self.writer.pop(variable.segment, variable.index)
    }
}

/// Declarations
impl<'a> CompilationEngine<'a> {
    /// `('static' | 'field') type name (',' name)* ';'`
    fn class_var_dec(&mut self) -> JackResult<()> {
        let keyword = self.stream.consume_any(&[
            TK::Keyword(Keyword::Static),
            TK::Keyword(Keyword::Field),
        ])?;

        let kind = if keyword.kind.is_keyword(Keyword::Static) {
            SymbolKind::Static
        } else {
            SymbolKind::Field
        };

        self.var_names(kind)
    }

    /// `'var' type name (',' name)* ';'`
    fn var_dec(&mut self) -> JackResult<()> {
        self.stream.consume(TK::Keyword(Keyword::Var))?;
        self.var_names(SymbolKind::Local)
    }

    /// Shared tail of variable declarations.
    fn var_names(&mut self, kind: SymbolKind) -> JackResult<()> {
        let ty = self.compile_type()?;

        loop {
            let name = self.stream.consume(TK::Ident)?;
            self.declare(&name, ty.clone(), kind)?;

            if !self.stream.match_token(TK::Comma)? {
                break;
            }
        }

        self.stream.consume(TK::Semicolon)?;
        Ok(())
    }

    /// `'int' | 'char' | 'boolean' | className`
    fn compile_type(&mut self) -> JackResult<SmolStr> {
        let token = self.stream.peek()?;

        match token.kind {
            TK::Keyword(keyword) if keyword.is_primitive_type() => {}
            TK::Ident => {}
            _ => return Err(self.stream.error("type", &token)),
        }

        self.stream.next_token()?;
        Ok(SmolStr::from(self.stream.fragment(&token)))
    }

    /// `('constructor' | 'function' | 'method') ('void' | type) name '(' parameterList ')' body`
    fn subroutine_dec(&mut self) -> JackResult<()> {
        let keyword = self.stream.consume_any(&[
            TK::Keyword(Keyword::Constructor),
            TK::Keyword(Keyword::Function),
            TK::Keyword(Keyword::Method),
        ])?;

        let kind = match keyword.kind {
            TK::Keyword(Keyword::Constructor) => SubroutineKind::Constructor,
            TK::Keyword(Keyword::Method) => SubroutineKind::Method,
            _ => SubroutineKind::Function,
        };

        let returns_void = if self.stream.match_token(TK::Keyword(Keyword::Void))? {
            true
        } else {
            self.compile_type()?;
            false
        };

        let name = self.stream.consume(TK::Ident)?;
        let full_name = SmolStr::from(format!(
            "{}.{}",
            self.class_name,
            self.stream.fragment(&name)
        ));
        trace!("compiling {:?} {}", kind, full_name);

        self.symbols.start_subroutine();
        if kind == SubroutineKind::Method {
            // Implicit receiver is always argument 0.
            self.symbols
                .define(RECEIVER, self.class_name.clone(), SymbolKind::Argument)?;
        }

        self.stream.consume(TK::LeftParen)?;
        self.parameter_list()?;
        self.stream.consume(TK::RightParen)?;

        self.subroutine_body(kind, full_name, returns_void)
    }

    /// `((type name) (',' type name)*)?`
    fn parameter_list(&mut self) -> JackResult<()> {
        if self.stream.peek_kind()? == TK::RightParen {
            return Ok(());
        }

        loop {
            let ty = self.compile_type()?;
            let name = self.stream.consume(TK::Ident)?;
            self.declare(&name, ty, SymbolKind::Argument)?;

            if !self.stream.match_token(TK::Comma)? {
                return Ok(());
            }
        }
    }

    /// `'{' varDec* statements '}'`
    fn subroutine_body(
        &mut self,
        kind: SubroutineKind,
        full_name: SmolStr,
        returns_void: bool,
    ) -> JackResult<()> {
        self.stream.consume(TK::LeftBrace)?;

        // Locals must all be declared before the first statement,
        // so the count is final here.
        while self.stream.peek_kind()?.is_keyword(Keyword::Var) {
            self.var_dec()?;
        }

        let n_locals = self.symbols.count(SymbolKind::Local);
        self.writer.function(full_name.clone(), n_locals);

        match kind {
            SubroutineKind::Constructor => {
                let n_fields = self.symbols.count(SymbolKind::Field);
                self.writer.push(Segment::Constant, n_fields);
                self.writer.call(MEMORY_ALLOC, 1);
                self.writer.pop(Segment::Pointer, THIS_POINTER);
            }
            SubroutineKind::Method => {
                self.writer.push(Segment::Argument, 0);
                self.writer.pop(Segment::Pointer, THIS_POINTER);
            }
            SubroutineKind::Function => {}
        }

        let id = self.next_label_id();
        self.subroutine = SubroutineState {
            end_label: SmolStr::from(format!("RETURN{id}")),
            returns_void,
            return_jumps: 0,
            depth: 0,
        };

        self.statements()?;
        self.stream.consume(TK::RightBrace)?;

        if self.subroutine.return_jumps > 0 || !self.conf.fold_tail_return {
            self.writer.label(self.subroutine.end_label.clone());
        }
        if self.subroutine.returns_void {
            self.writer.push(Segment::Constant, 0);
        }
        self.writer.ret();

        debug!("compiled {} with {} locals", full_name, n_locals);

        Ok(())
    }
}

/// Statements
impl<'a> CompilationEngine<'a> {
    /// `statement*`
    fn statements(&mut self) -> JackResult<()> {
        loop {
            match self.stream.peek_kind()? {
                TK::Keyword(Keyword::Let) => self.let_statement()?,
                TK::Keyword(Keyword::If) => self.if_statement()?,
                TK::Keyword(Keyword::While) => self.while_statement()?,
                TK::Keyword(Keyword::Do) => self.do_statement()?,
                TK::Keyword(Keyword::Return) => self.return_statement()?,
                _ => return Ok(()),
            }
        }
    }

    /// `'{' statements '}'`
    fn block(&mut self) -> JackResult<()> {
        self.stream.consume(TK::LeftBrace)?;
        self.subroutine.depth += 1;
        self.statements()?;
        self.subroutine.depth -= 1;
        self.stream.consume(TK::RightBrace)?;
        Ok(())
    }

    /// `'let' name ('[' expression ']')? '=' expression ';'`
    fn let_statement(&mut self) -> JackResult<()> {
        self.stream.consume(TK::Keyword(Keyword::Let))?;
        let name = self.stream.consume(TK::Ident)?;
        let target = self.resolve(&name)?;

        if self.stream.match_token(TK::LeftBracket)? {
            // The element address is computed first and stays on the
            // stack while the right-hand side runs, because the
            // right-hand side may index arrays through `pointer 1` too.
            self.push_variable(target);
            self.expression()?;
            self.stream.consume(TK::RightBracket)?;
            self.writer.arithmetic(ArithmeticOp::Add);

            self.stream.consume(TK::Eq)?;
            self.expression()?;
            self.stream.consume(TK::Semicolon)?;

            self.writer.pop(Segment::Temp, SCRATCH_TEMP);
            self.writer.pop(Segment::Pointer, THAT_POINTER);
            self.writer.push(Segment::Temp, SCRATCH_TEMP);
            self.writer.pop(Segment::That, 0);
        } else {
            self.stream.consume(TK::Eq)?;
            self.expression()?;
            self.stream.consume(TK::Semicolon)?;

            self.pop_variable(target);
        }

        Ok(())
    }

    /// `'if' '(' expression ')' '{' statements '}' ('else' '{' statements '}')?`
    fn if_statement(&mut self) -> JackResult<()> {
        self.stream.consume(TK::Keyword(Keyword::If))?;
        self.stream.consume(TK::LeftParen)?;
        self.expression()?;
        self.stream.consume(TK::RightParen)?;

        let id = self.next_label_id();
        let false_label = SmolStr::from(format!("IF_FALSE{id}"));
        let end_label = SmolStr::from(format!("IF_END{id}"));

        self.writer.arithmetic(ArithmeticOp::Not);
        self.writer.if_goto(false_label.clone());
        self.block()?;

        if self.stream.match_token(TK::Keyword(Keyword::Else))? {
            self.writer.goto(end_label.clone());
            self.writer.label(false_label);
            self.block()?;
            self.writer.label(end_label);
        } else {
            self.writer.label(false_label);
        }

        Ok(())
    }

    /// `'while' '(' expression ')' '{' statements '}'`
    fn while_statement(&mut self) -> JackResult<()> {
        self.stream.consume(TK::Keyword(Keyword::While))?;

        let id = self.next_label_id();
        let exp_label = SmolStr::from(format!("WHILE_EXP{id}"));
        let end_label = SmolStr::from(format!("WHILE_END{id}"));

        self.writer.label(exp_label.clone());

        self.stream.consume(TK::LeftParen)?;
        self.expression()?;
        self.stream.consume(TK::RightParen)?;

        self.writer.arithmetic(ArithmeticOp::Not);
        self.writer.if_goto(end_label.clone());
        self.block()?;
        self.writer.goto(exp_label);
        self.writer.label(end_label);

        Ok(())
    }

    /// `'do' subroutineCall ';'`
    fn do_statement(&mut self) -> JackResult<()> {
        self.stream.consume(TK::Keyword(Keyword::Do))?;
        self.subroutine_call()?;
        self.stream.consume(TK::Semicolon)?;

        // Discard the return value.
        self.writer.pop(Segment::Temp, SCRATCH_TEMP);
        Ok(())
    }

    /// `'return' expression? ';'`
    ///
    /// Leaves the value on the stack and jumps to the end label, where
    /// the one `return` instruction of the subroutine lives.
    fn return_statement(&mut self) -> JackResult<()> {
        self.stream.consume(TK::Keyword(Keyword::Return))?;
        if self.stream.peek_kind()? != TK::Semicolon {
            self.expression()?;
        }
        self.stream.consume(TK::Semicolon)?;

        // The end label directly follows the last statement of the body.
        let is_tail = self.conf.fold_tail_return
            && self.subroutine.depth == 0
            && self.stream.peek_kind()? == TK::RightBrace;

        if !is_tail {
            self.writer.goto(self.subroutine.end_label.clone());
            self.subroutine.return_jumps += 1;
        }

        Ok(())
    }
}

/// Expressions
impl<'a> CompilationEngine<'a> {
    /// `term (op term)*`
    ///
    /// Operators have no precedence and associate to the left.
    fn expression(&mut self) -> JackResult<()> {
        self.term()?;

        loop {
            let op = self.stream.peek()?;
            if !op.kind.is_binary_op() {
                return Ok(());
            }
            self.stream.next_token()?;
            self.term()?;
            self.binary_op(&op)?;
        }
    }

    fn binary_op(&mut self, op: &Token) -> JackResult<()> {
        match op.kind {
            TK::Plus => self.writer.arithmetic(ArithmeticOp::Add),
            TK::Minus => self.writer.arithmetic(ArithmeticOp::Sub),
            TK::Star => self.writer.call(MATH_MULTIPLY, 2),
            TK::Slash => self.writer.call(MATH_DIVIDE, 2),
            TK::Ampersand => self.writer.arithmetic(ArithmeticOp::And),
            TK::Pipe => self.writer.arithmetic(ArithmeticOp::Or),
            TK::Less => self.writer.arithmetic(ArithmeticOp::Lt),
            TK::Greater => self.writer.arithmetic(ArithmeticOp::Gt),
            TK::Eq => self.writer.arithmetic(ArithmeticOp::Eq),
            kind => return Err(JackError::UnknownCommand(kind.to_string())),
        }
        Ok(())
    }

    fn term(&mut self) -> JackResult<()> {
        let token = self.stream.peek()?;

        match token.kind {
            TK::Number => {
                self.stream.next_token()?;
                let value = self
                    .stream
                    .fragment(&token)
                    .parse::<u16>()
                    .map_err(|_| self.stream.error("integer constant", &token))?;
                self.writer.push(Segment::Constant, value);
            }
            TK::String => {
                self.stream.next_token()?;
                self.string_constant(&token)?;
            }
            TK::Keyword(Keyword::True) => {
                self.stream.next_token()?;
                self.writer.push(Segment::Constant, 1);
                self.writer.arithmetic(ArithmeticOp::Neg);
            }
            TK::Keyword(Keyword::False | Keyword::Null) => {
                self.stream.next_token()?;
                self.writer.push(Segment::Constant, 0);
            }
            TK::Keyword(Keyword::This) => {
                self.stream.next_token()?;
                self.writer.push(Segment::Pointer, THIS_POINTER);
            }
            TK::Minus => {
                self.stream.next_token()?;
                self.term()?;
                self.writer.arithmetic(ArithmeticOp::Neg);
            }
            TK::Tilde => {
                self.stream.next_token()?;
                self.term()?;
                self.writer.arithmetic(ArithmeticOp::Not);
            }
            TK::LeftParen => {
                self.stream.next_token()?;
                self.expression()?;
                self.stream.consume(TK::RightParen)?;
            }
            TK::Ident => self.term_identifier()?,
            _ => return Err(self.stream.error("term", &token)),
        }

        Ok(())
    }

    /// A term starting with an identifier is a variable, an array
    /// element or a subroutine call. Which one is decided by the token
    /// that follows the identifier.
    fn term_identifier(&mut self) -> JackResult<()> {
        match self.stream.peek_next()?.kind {
            TK::LeftBracket => {
                let name = self.stream.consume(TK::Ident)?;
                let array = self.resolve(&name)?;
                self.stream.consume(TK::LeftBracket)?;

                self.push_variable(array);
                self.expression()?;
                self.stream.consume(TK::RightBracket)?;
                self.writer.arithmetic(ArithmeticOp::Add);

                self.writer.pop(Segment::Pointer, THAT_POINTER);
                self.writer.push(Segment::That, 0);
            }
            TK::LeftParen | TK::Dot => self.subroutine_call()?,
            _ => {
                let name = self.stream.consume(TK::Ident)?;
                let variable = self.resolve(&name)?;
                self.push_variable(variable);
            }
        }

        Ok(())
    }

    /// String constants become a new `String` object, filled one
    /// character at a time.
    fn string_constant(&mut self, token: &Token) -> JackResult<()> {
        let text = token.string_value(self.stream.source_code());

        let len = u16::try_from(text.chars().count())
            .ok()
            .filter(|len| *len <= MAX_INT)
            .ok_or_else(|| self.stream.error("shorter string constant", token))?;
        self.writer.push(Segment::Constant, len);
        self.writer.call(STRING_NEW, 1);

        for c in text.chars() {
            let code = u16::try_from(u32::from(c))
                .ok()
                .filter(|code| *code <= MAX_INT)
                .ok_or_else(|| self.stream.error("character with code up to 32767", token))?;
            self.writer.push(Segment::Constant, code);
            self.writer.call(STRING_APPEND_CHAR, 2);
        }

        Ok(())
    }

    /// `name '(' expressionList ')' | name '.' name '(' expressionList ')'`
    ///
    /// Method calls receive the object as an implicit first argument.
    fn subroutine_call(&mut self) -> JackResult<()> {
        let first = self.stream.consume(TK::Ident)?;
        let first_name = self.stream.fragment(&first);

        let (class_name, member, n_implicit) = if self.stream.match_token(TK::Dot)? {
            let member = self.stream.consume(TK::Ident)?;
            let member = self.stream.fragment(&member);

            if self.symbols.has(first_name) {
                // Method call on an object variable.
                let object = self.resolve(&first)?;
                let class_name = SmolStr::from(self.symbols.type_of(first_name)?);
                self.push_variable(object);
                (class_name, member, 1)
            } else {
                // Anything else is taken to be a class name.
                (SmolStr::from(first_name), member, 0)
            }
        } else {
            // Method call on the current object.
            self.writer.push(Segment::Pointer, THIS_POINTER);
            (self.class_name.clone(), first_name, 1)
        };

        self.stream.consume(TK::LeftParen)?;
        let n_args = self.expression_list()?;
        let close = self.stream.consume(TK::RightParen)?;

        let n_args = n_args
            .checked_add(n_implicit)
            .ok_or_else(|| self.stream.error("at most 65535 arguments", &close))?;
        self.writer.call(format!("{class_name}.{member}"), n_args);

        Ok(())
    }

    /// `(expression (',' expression)*)?`
    ///
    /// Returns the number of expressions.
    fn expression_list(&mut self) -> JackResult<u16> {
        if self.stream.peek_kind()? == TK::RightParen {
            return Ok(0);
        }

        let mut count: u16 = 0;
        loop {
            let start = self.stream.peek()?;
            count = count
                .checked_add(1)
                .ok_or_else(|| self.stream.error("at most 65535 arguments", &start))?;
            self.expression()?;

            if !self.stream.match_token(TK::Comma)? {
                return Ok(count);
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn compile_commands(source_code: &str, conf: CompilerConf) -> JackResult<Vec<String>> {
        let engine = CompilationEngine::new(Lexer::new(source_code), conf);
        let writer = engine.compile_class()?;
        Ok(writer
            .commands()
            .iter()
            .map(|command| command.to_string())
            .collect())
    }

    fn compile_lines(source_code: &str) -> Vec<String> {
        compile_commands(source_code, CompilerConf::default()).unwrap()
    }

    #[test]
    fn test_empty_void_function() {
        let lines = compile_lines("class Main { function void main() { return; } }");
        assert_eq!(lines, ["function Main.main 0", "push constant 0", "return"]);
    }

    #[test]
    fn test_missing_return_still_returns() {
        let lines = compile_lines("class Main { function void main() { } }");
        assert_eq!(lines, ["function Main.main 0", "push constant 0", "return"]);
    }

    #[test]
    fn test_early_return_jumps_to_end() {
        let lines = compile_lines(
            "class Main {
                function int sign(int x) {
                    if (x < 0) { return -1; }
                    return 1;
                }
            }",
        );
        assert_eq!(
            lines,
            [
                "function Main.sign 0",
                "push argument 0",
                "push constant 0",
                "lt",
                "not",
                "if-goto IF_FALSE1",
                "push constant 1",
                "neg",
                "goto RETURN0",
                "label IF_FALSE1",
                "push constant 1",
                "label RETURN0",
                "return",
            ]
        );
    }

    #[test]
    fn test_unfolded_tail_return() {
        let conf = CompilerConf {
            fold_tail_return: false,
            ..CompilerConf::default()
        };
        let lines =
            compile_commands("class Main { function int one() { return 1; } }", conf).unwrap();
        assert_eq!(
            lines,
            [
                "function Main.one 0",
                "push constant 1",
                "goto RETURN0",
                "label RETURN0",
                "return",
            ]
        );
    }

    #[test]
    fn test_labels_unique_across_subroutines() {
        let lines = compile_lines(
            "class Loop {
                function void a() { while (true) { } return; }
                function void b() { while (false) { } return; }
            }",
        );
        let labels = lines
            .iter()
            .filter(|line| line.starts_with("label"))
            .collect::<Vec<_>>();
        assert_eq!(
            labels,
            [
                "label WHILE_EXP1",
                "label WHILE_END1",
                "label WHILE_EXP3",
                "label WHILE_END3",
            ]
        );
    }

    #[test]
    fn test_method_receiver_is_argument_zero() {
        let lines = compile_lines(
            "class Point {
                field int x;
                method int plus(int dx) { return x + dx; }
            }",
        );
        assert_eq!(
            lines,
            [
                "function Point.plus 0",
                "push argument 0",
                "pop pointer 0",
                "push this 0",
                "push argument 1",
                "add",
                "return",
            ]
        );
    }

    #[test]
    fn test_local_count_in_function_line() {
        let lines = compile_lines(
            "class Main {
                function void main() {
                    var int a, b;
                    var Array c;
                    let b = 2;
                    return;
                }
            }",
        );
        assert_eq!(lines[0], "function Main.main 3");
        assert_eq!(lines[2], "pop local 1");
    }

    #[test]
    fn test_redeclaration() {
        let source_code = "class Main { function void main() { var int a; var char a; let a = 1; return; } }";

        // Last declaration wins, keeping its own slot.
        let lines = compile_lines(source_code);
        assert_eq!(lines[0], "function Main.main 2");
        assert_eq!(lines[2], "pop local 1");

        let conf = CompilerConf {
            strict_declarations: true,
            ..CompilerConf::default()
        };
        assert!(matches!(
            compile_commands(source_code, conf),
            Err(JackError::Redeclared { name, .. }) if name == "a"
        ));
    }

    #[test]
    fn test_unresolved_has_location() {
        let err = compile_commands(
            "class Main {\n  function void main() {\n    let y = 1;\n  }\n}",
            CompilerConf::default(),
        )
        .unwrap_err();

        match err {
            JackError::Unresolved {
                name,
                location: Some(location),
            } => {
                assert_eq!(name, "y");
                assert_eq!(location.line, 3);
                assert_eq!(location.column, 9);
            }
            err => panic!("unexpected error: {err}"),
        }
    }

    #[test]
    fn test_trailing_tokens_rejected() {
        let err = compile_commands("class A { } class B { }", CompilerConf::default()).unwrap_err();
        assert!(matches!(err, JackError::Syntax(_)));
    }

    #[test]
    fn test_field_after_subroutine_rejected() {
        let err = compile_commands(
            "class A { function void f() { return; } field int x; }",
            CompilerConf::default(),
        )
        .unwrap_err();
        assert!(err
            .to_string()
            .starts_with("expected symbol '}', found keyword 'field'"));
    }
}
