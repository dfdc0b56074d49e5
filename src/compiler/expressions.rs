use crate::chunk::OpCode;
use crate::compiler::precedence::{get_rule, ParseFn, Precedence};
use crate::compiler::Compiler;
use crate::lexer::tokens::{Token, TokenKind};
use crate::objects::Object;
use crate::value::Value;

impl<'a> Compiler<'a> {
  /// Compiles a single expression.
  pub(super) fn expression(&mut self) {
    self.parse_precedence(Precedence::Assignment);
  }

  /// The heart of the Pratt parser. Consumes one token and runs its prefix
  /// rule, then keeps consuming operators as long as they bind at least as
  /// tightly as the requested precedence, running their infix rules.
  ///
  /// `can_assign` is threaded into the rules so that `variable` only
  /// accepts an `=` when the expression is in assignment position. An `=`
  /// still pending after the loop means the target was something that can
  /// never be assigned to (e.g. `a + b = c`).
  pub(super) fn parse_precedence(&mut self, precedence: Precedence) {
    self.advance();

    let can_assign = precedence <= Precedence::Assignment;
    let prefix = get_rule(self.previous.kind).prefix;

    if !self.run_parse_fn(prefix, can_assign) {
      self.error("Expect expression.");
      return;
    }

    while precedence <= get_rule(self.current.kind).precedence {
      self.advance();
      let infix = get_rule(self.previous.kind).infix;
      self.run_parse_fn(infix, can_assign);
    }

    if can_assign && self.matches(TokenKind::EQUALS) {
      self.error_at_current("Invalid assignment target.");
    }
  }

  /// Dispatches a parse function for the previous token. Returns false when
  /// there is no function to run, which for a prefix position means the
  /// token cannot start an expression.
  fn run_parse_fn(&mut self, func: ParseFn, can_assign: bool) -> bool {
    match func {
      ParseFn::CompileBinary => self.binary(),
      ParseFn::CompileGrouping => self.grouping(),
      ParseFn::CompileLiteral => self.literal(),
      ParseFn::CompileLogicAnd => self.logic_and(),
      ParseFn::CompileLogicOr => self.logic_or(),
      ParseFn::CompileNumber => self.number(),
      ParseFn::CompileString => self.string(),
      ParseFn::CompileUnary => self.unary(),
      ParseFn::CompileVariable => self.variable(can_assign),
      ParseFn::None => return false,
    }

    true
  }

  /// Compiles a parenthesized expression.
  fn grouping(&mut self) {
    self.expression();
    self.consume(TokenKind::R_PAREN, "Expect ')' after expression.");
  }

  /// Compiles a unary `!` or `-` expression. The operand is compiled first,
  /// so the operator instruction works on whatever it left on the stack.
  fn unary(&mut self) {
    let operator = self.previous.kind;

    self.parse_precedence(Precedence::Unary);

    match operator {
      TokenKind::BANG => self.emit_op(OpCode::Not),
      TokenKind::MINUS => self.emit_op(OpCode::Negate),
      _ => unreachable!("Not a unary operator."),
    }
  }

  /// Compiles the right operand and the operator of a binary expression;
  /// the left operand has already been compiled. The right operand parses
  /// one precedence level higher to keep the operator left-associative.
  /// `!=`, `>=`, and `<=` have no opcode of their own: each compiles to the
  /// opposite comparison followed by `Not`.
  fn binary(&mut self) {
    let operator = self.previous.kind;
    let rule = get_rule(operator);

    self.parse_precedence(rule.precedence.one_higher());

    match operator {
      TokenKind::LOGIC_EQ => self.emit_op(OpCode::Equal),
      TokenKind::GREATER => self.emit_op(OpCode::Greater),
      TokenKind::LESS => self.emit_op(OpCode::Less),

      TokenKind::BANG_EQ => {
        self.emit_op(OpCode::Equal);
        self.emit_op(OpCode::Not);
      }
      TokenKind::GREATER_EQ => {
        self.emit_op(OpCode::Less);
        self.emit_op(OpCode::Not);
      }
      TokenKind::LESS_EQ => {
        self.emit_op(OpCode::Greater);
        self.emit_op(OpCode::Not);
      }

      TokenKind::PLUS => self.emit_op(OpCode::Add),
      TokenKind::MINUS => self.emit_op(OpCode::Subtract),
      TokenKind::STAR => self.emit_op(OpCode::Multiply),
      TokenKind::SLASH => self.emit_op(OpCode::Divide),

      _ => unreachable!("Not a binary operator."),
    }
  }

  /// Compiles a numeric literal.
  fn number(&mut self) {
    let value = match self.previous.lexeme.parse::<f64>() {
      Ok(value) => value,
      Err(_) => {
        self.error("Invalid numeric literal.");
        return;
      }
    };

    self.emit_constant(Value::Number(value));
  }

  /// Compiles a string literal. The quotes are part of the lexeme, so the
  /// interior is what gets interned.
  fn string(&mut self) {
    let lexeme = self.previous.lexeme;
    let string = self.vm.copy_string(&lexeme[1..lexeme.len() - 1]);

    self.emit_constant(Value::Obj(Object::Str(string)));
  }

  /// Compiles a `nil`, `true`, or `false` literal.
  fn literal(&mut self) {
    match self.previous.kind {
      TokenKind::NIL_KW => self.emit_op(OpCode::Nil),
      TokenKind::TRUE_KW => self.emit_op(OpCode::True),
      TokenKind::FALSE_KW => self.emit_op(OpCode::False),
      _ => unreachable!("Not a literal keyword."),
    }
  }

  /// Compiles a short-circuit `and` expression. When the left operand is
  /// falsy it stays on the stack as the expression's value and the right
  /// operand is skipped entirely; otherwise it is popped and the right
  /// operand takes its place.
  fn logic_and(&mut self) {
    let end_jump = self.emit_jump(OpCode::JumpIfFalse);

    self.emit_op(OpCode::Pop);
    self.parse_precedence(Precedence::And);

    self.patch_jump(end_jump);
  }

  /// Compiles a short-circuit `or` expression. A truthy left operand stays
  /// on the stack and the right operand is skipped.
  fn logic_or(&mut self) {
    let else_jump = self.emit_jump(OpCode::JumpIfFalse);
    let end_jump = self.emit_jump(OpCode::Jump);

    self.patch_jump(else_jump);
    self.emit_op(OpCode::Pop);

    self.parse_precedence(Precedence::Or);
    self.patch_jump(end_jump);
  }

  /// Compiles an identifier expression: either a read, or, when an `=`
  /// follows in assignment position, a write.
  fn variable(&mut self, can_assign: bool) {
    self.named_variable(can_assign);
  }

  /// Resolves a name to a local stack slot if one is in scope, otherwise to
  /// a global name constant, then emits the matching get or set
  /// instruction. The short or long form is chosen by the resolved index.
  fn named_variable(&mut self, can_assign: bool) {
    let name = self.previous;

    let (idx, get_op, get_op_long, set_op, set_op_long) = match self.resolve_local(&name) {
      Some(slot) => (
        slot,
        OpCode::GetLocal,
        OpCode::GetLocalLong,
        OpCode::SetLocal,
        OpCode::SetLocalLong,
      ),
      None => (
        self.identifier_constant(&name),
        OpCode::GetGlobal,
        OpCode::GetGlobalLong,
        OpCode::SetGlobal,
        OpCode::SetGlobalLong,
      ),
    };

    let is_assignment = can_assign && self.matches(TokenKind::EQUALS);
    if is_assignment {
      self.expression();
    }

    let (op, op_long) = if is_assignment {
      (set_op, set_op_long)
    } else {
      (get_op, get_op_long)
    };

    if idx <= u8::MAX as usize {
      self.emit_op(op);
      self.emit_byte(idx as u8);
    } else {
      self.emit_op(op_long);
      self.emit_short(idx as u16);
    }
  }

  /// Scans the locals from innermost out for the given name. A hit on a
  /// local whose initializer is still being compiled is the `let a = a;`
  /// hole, and gets reported here.
  pub(super) fn resolve_local(&mut self, name: &Token<'a>) -> Option<usize> {
    for i in (0..self.locals.len()).rev() {
      if identifiers_equal(&self.locals[i].name, name) {
        if self.locals[i].depth.is_none() {
          self.error_at_current("Can't read local variable in its own initializer.");
        }

        return Some(i);
      }
    }

    None
  }
}

/// Two identifier tokens name the same variable when their lexemes match.
pub(super) fn identifiers_equal(a: &Token, b: &Token) -> bool {
  a.lexeme == b.lexeme
}
