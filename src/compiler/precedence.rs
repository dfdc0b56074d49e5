use crate::lexer::tokens::TokenKind;

/// Represents the precedence of different expressions in ascending order.
/// For example, `Equality` binds looser than `Unary` because `Equality`
/// appears earlier in the enum.
#[derive(Debug, PartialEq, PartialOrd, Clone, Copy)]
#[repr(u8)]
pub enum Precedence {
  None,
  Assignment, // =
  Or,         // or
  And,        // and
  Equality,   // == !=
  Comparison, // < > <= >=
  Term,       // + -
  Factor,     // * /
  Unary,      // ! -
  Call,       // . ()
  Primary,
}

impl Precedence {
  /// Gets the Precedence variant associated with a given numeric value.
  pub fn get_by_val(val: u8) -> Precedence {
    match val {
      0 => Precedence::None,
      1 => Precedence::Assignment,
      2 => Precedence::Or,
      3 => Precedence::And,
      4 => Precedence::Equality,
      5 => Precedence::Comparison,
      6 => Precedence::Term,
      7 => Precedence::Factor,
      8 => Precedence::Unary,
      9 => Precedence::Call,
      _ => Precedence::Primary,
    }
  }

  /// The next-higher precedence level. Parsing a binary operator's right
  /// operand one level above the operator itself is what keeps the
  /// operators left-associative.
  pub fn one_higher(&self) -> Precedence {
    Precedence::get_by_val(*self as u8 + 1)
  }
}

/// The compiling function associated with a given token.
#[derive(Clone, Copy)]
pub enum ParseFn {
  CompileBinary,
  CompileGrouping,
  CompileLiteral,
  CompileLogicAnd,
  CompileLogicOr,
  CompileNumber,
  CompileString,
  CompileUnary,
  CompileVariable,
  None, // Do not call a parsing function
}

/// Wraps the parsing properties of a token so that they can be easily
/// accessed throughout the compiler.
pub struct ParseRule {
  pub prefix: ParseFn,
  pub infix: ParseFn,
  pub precedence: Precedence,
}

pub fn get_rule(kind: TokenKind) -> ParseRule {
  match kind {
    TokenKind::BANG => ParseRule {
      prefix: ParseFn::CompileUnary,
      infix: ParseFn::None,
      precedence: Precedence::None,
    },

    TokenKind::BANG_EQ => ParseRule {
      prefix: ParseFn::None,
      infix: ParseFn::CompileBinary,
      precedence: Precedence::Equality,
    },

    TokenKind::GREATER => ParseRule {
      prefix: ParseFn::None,
      infix: ParseFn::CompileBinary,
      precedence: Precedence::Comparison,
    },

    TokenKind::GREATER_EQ => ParseRule {
      prefix: ParseFn::None,
      infix: ParseFn::CompileBinary,
      precedence: Precedence::Comparison,
    },

    TokenKind::LESS => ParseRule {
      prefix: ParseFn::None,
      infix: ParseFn::CompileBinary,
      precedence: Precedence::Comparison,
    },

    TokenKind::LESS_EQ => ParseRule {
      prefix: ParseFn::None,
      infix: ParseFn::CompileBinary,
      precedence: Precedence::Comparison,
    },

    TokenKind::LOGIC_EQ => ParseRule {
      prefix: ParseFn::None,
      infix: ParseFn::CompileBinary,
      precedence: Precedence::Equality,
    },

    TokenKind::L_PAREN => ParseRule {
      prefix: ParseFn::CompileGrouping,
      infix: ParseFn::None,
      precedence: Precedence::None,
    },

    TokenKind::MINUS => ParseRule {
      prefix: ParseFn::CompileUnary,
      infix: ParseFn::CompileBinary,
      precedence: Precedence::Term,
    },

    TokenKind::PLUS => ParseRule {
      prefix: ParseFn::None,
      infix: ParseFn::CompileBinary,
      precedence: Precedence::Term,
    },

    TokenKind::SLASH => ParseRule {
      prefix: ParseFn::None,
      infix: ParseFn::CompileBinary,
      precedence: Precedence::Factor,
    },

    TokenKind::STAR => ParseRule {
      prefix: ParseFn::None,
      infix: ParseFn::CompileBinary,
      precedence: Precedence::Factor,
    },

    TokenKind::IDENTIFIER => ParseRule {
      prefix: ParseFn::CompileVariable,
      infix: ParseFn::None,
      precedence: Precedence::None,
    },

    TokenKind::NUMBER => ParseRule {
      prefix: ParseFn::CompileNumber,
      infix: ParseFn::None,
      precedence: Precedence::None,
    },

    TokenKind::STRING => ParseRule {
      prefix: ParseFn::CompileString,
      infix: ParseFn::None,
      precedence: Precedence::None,
    },

    TokenKind::AND_KW => ParseRule {
      prefix: ParseFn::None,
      infix: ParseFn::CompileLogicAnd,
      precedence: Precedence::And,
    },

    TokenKind::OR_KW => ParseRule {
      prefix: ParseFn::None,
      infix: ParseFn::CompileLogicOr,
      precedence: Precedence::Or,
    },

    TokenKind::FALSE_KW => ParseRule {
      prefix: ParseFn::CompileLiteral,
      infix: ParseFn::None,
      precedence: Precedence::None,
    },

    TokenKind::NIL_KW => ParseRule {
      prefix: ParseFn::CompileLiteral,
      infix: ParseFn::None,
      precedence: Precedence::None,
    },

    TokenKind::TRUE_KW => ParseRule {
      prefix: ParseFn::CompileLiteral,
      infix: ParseFn::None,
      precedence: Precedence::None,
    },

    // The rest of the tokens do not have a parse rule
    _ => ParseRule {
      prefix: ParseFn::None,
      infix: ParseFn::None,
      precedence: Precedence::None,
    },
  }
}
