mod expressions;
mod precedence;
mod statements;

use crate::chunk::{Chunk, OpCode};
use crate::errors::report_compile_error;
use crate::lexer::tokens::{Token, TokenKind};
use crate::lexer::Lexer;
use crate::objects::Object;
use crate::value::Value;
use crate::virtual_machine::{InterpretResult, VM};
use crate::LOCALS_MAX;

/// A local variable slot. Locals live directly on the VM's value stack, so
/// a local's index in this list is its runtime stack slot.
struct Local<'a> {
  /// The token the variable was declared from.
  name: Token<'a>,
  /// The scope depth the local was declared at, or `None` while its
  /// initializer is still being compiled. An uninitialized local must not
  /// be readable.
  depth: Option<usize>,
}

/// Represents the compiler and its internal state. The compiler pulls
/// tokens from the lexer on demand and emits bytecode into a single chunk
/// as it goes; there is no intermediate tree.
pub struct Compiler<'a> {
  lexer: Lexer<'a>,
  previous: Token<'a>,
  current: Token<'a>,
  had_error: bool,
  panic_mode: bool,
  chunk: Chunk,
  locals: Vec<Local<'a>>,
  scope_depth: usize,
  /// The VM owns the interned string pool, so every string or identifier
  /// constant is allocated through it.
  vm: &'a mut VM,
}

impl<'a> Compiler<'a> {
  /// Compiles a source string into a chunk of bytecode instructions.
  ///
  /// # Parameters
  /// - `source`: The program's source text.
  /// - `vm`: The virtual machine that will run the chunk; used here to
  ///   intern string constants.
  ///
  /// # Returns
  /// - The compiled chunk, or `InterpretResult::CompileError` if any
  ///   compile error was reported. Compilation always runs to the end of
  ///   the source so that every error in the file surfaces in one pass.
  pub fn compile(source: &'a str, vm: &'a mut VM) -> Result<Chunk, InterpretResult> {
    let init_token = Token {
      kind: TokenKind::EOF,
      lexeme: "",
      line: 1,
    };

    let mut s = Self {
      lexer: Lexer::new(source),
      previous: init_token,
      current: init_token,
      had_error: false,
      panic_mode: false,
      chunk: Chunk::new(),
      locals: Vec::with_capacity(LOCALS_MAX),
      scope_depth: 0,
      vm,
    };

    s.advance();
    while !s.matches(TokenKind::EOF) {
      s.declaration();
    }

    s.emit_op(OpCode::Return);

    #[cfg(feature = "show_bytecode")]
    {
      if !s.had_error {
        crate::debug::disassemble_chunk(&s.chunk, "<script>");
      }
    }

    if s.had_error {
      Err(InterpretResult::CompileError)
    } else {
      Ok(s.chunk)
    }
  }

  /// Advances the compiler to the next token. Error tokens are reported
  /// here and skipped, so the parser itself only ever sees real tokens.
  pub(super) fn advance(&mut self) {
    self.previous = self.current;

    loop {
      self.current = self.lexer.next_token();

      if self.current.kind != TokenKind::ERROR {
        break;
      }

      let message = self.current.lexeme;
      self.error_at_current(message);
    }
  }

  /// Checks that the current token matches the provided kind, without
  /// consuming it.
  pub(super) fn check(&self, kind: TokenKind) -> bool {
    self.current.kind == kind
  }

  /// Consumes the current token if it matches the provided kind. Returns
  /// whether the token was consumed.
  pub(super) fn matches(&mut self, kind: TokenKind) -> bool {
    if self.check(kind) {
      self.advance();
      return true;
    }

    false
  }

  /// Consumes the current token if it is of the given kind, and emits a
  /// compile error otherwise.
  pub(super) fn consume(&mut self, kind: TokenKind, message: &str) {
    if self.check(kind) {
      self.advance();
      return;
    }

    self.error_at_current(message);
  }

  /// Emits a raw byte into the chunk, tagged with the previous token's line.
  pub(super) fn emit_byte(&mut self, byte: u8) {
    let line = self.previous.line;
    self.chunk.write(byte, line);
  }

  /// Emits an instruction byte into the chunk.
  pub(super) fn emit_op(&mut self, op: OpCode) {
    let line = self.previous.line;
    self.chunk.write_op(op, line);
  }

  /// Emits a 16-bit operand into the chunk in big-endian order.
  pub(super) fn emit_short(&mut self, val: u16) {
    let line = self.previous.line;
    self.chunk.write_short(val, line);
  }

  /// Adds a value to the constant pool and emits the instruction that
  /// loads it.
  pub(super) fn emit_constant(&mut self, value: Value) {
    let line = self.previous.line;

    if !self.chunk.write_constant(value, line) {
      self.error("Too many constants in one chunk.");
    }
  }

  /// Emits a jump instruction followed by two placeholder bytes, and
  /// returns the offset of the placeholder so it can be patched once the
  /// jump target is known.
  pub(super) fn emit_jump(&mut self, op: OpCode) -> usize {
    self.emit_op(op);
    self.emit_byte(0xff);
    self.emit_byte(0xff);

    self.chunk.len() - 2
  }

  /// Back-fills the placeholder left by `emit_jump` with the distance from
  /// the placeholder to the current end of the chunk.
  pub(super) fn patch_jump(&mut self, offset: usize) {
    let jump = self.chunk.len() - offset - 2;

    if jump > u16::MAX as usize {
      self.error_at_current("Too much code to jump over.");
    }

    self.chunk.patch(offset, (jump >> 8) as u8);
    self.chunk.patch(offset + 1, (jump & 0xff) as u8);
  }

  /// Emits a backwards jump to `loop_start`. The two operand bytes are part
  /// of the instruction, hence the `+ 2` in the offset.
  pub(super) fn emit_loop(&mut self, loop_start: usize) {
    self.emit_op(OpCode::Loop);

    let offset = self.chunk.len() - loop_start + 2;
    if offset > u16::MAX as usize {
      self.error_at_current("Loop body too large.");
    }

    self.emit_byte((offset >> 8) as u8);
    self.emit_byte((offset & 0xff) as u8);
  }

  /// Interns the token's lexeme and stores it in the constant pool,
  /// returning the constant's index. This is how variable names travel
  /// from the compiler to the VM.
  pub(super) fn identifier_constant(&mut self, name: &Token<'a>) -> usize {
    let string = self.vm.copy_string(name.lexeme);
    let idx = self.chunk.add_constant(Value::Obj(Object::Str(string)));

    if idx > u16::MAX as usize {
      self.error("Too many constants in one chunk.");
      return 0;
    }

    idx
  }

  /// Emits a compile error at the previous token.
  pub(super) fn error(&mut self, message: &str) {
    self.error_at(self.previous, message);
  }

  /// Emits a compile error at the current token.
  pub(super) fn error_at_current(&mut self, message: &str) {
    self.error_at(self.current, message);
  }

  /// Emits a compile error at the given token. While the compiler is in
  /// panic mode every further error is suppressed; `synchronize` clears
  /// the flag at the next statement boundary.
  pub(super) fn error_at(&mut self, token: Token<'a>, message: &str) {
    if self.panic_mode {
      return;
    }

    self.panic_mode = true;
    self.had_error = true;

    report_compile_error(&token, message);
  }

  /// Discards tokens until a statement boundary, then leaves panic mode.
  /// This keeps one syntax error from cascading into a screenful of
  /// follow-on errors.
  pub(super) fn synchronize(&mut self) {
    self.panic_mode = false;

    while self.current.kind != TokenKind::EOF {
      if self.previous.kind == TokenKind::SEMICOLON {
        return;
      }

      match self.current.kind {
        TokenKind::CLASS_KW
        | TokenKind::FN_KW
        | TokenKind::LET_KW
        | TokenKind::FOR_KW
        | TokenKind::IF_KW
        | TokenKind::WHILE_KW
        | TokenKind::PRINT_KW
        | TokenKind::RETURN_KW => {
          return;
        }

        _ => {}
      }

      self.advance();
    }
  }
}
