/// A token that represents a single unit of Ember code.
#[derive(Clone, Copy)]
pub struct Token<'a> {
  /// The token's type.
  pub kind: TokenKind,
  /// A slice of the source text that produced this token. For `ERROR`
  /// tokens this is a static message instead.
  pub lexeme: &'a str,
  /// The 1-based line the token starts on.
  pub line: usize,
}

/// The types of tokens in an Ember program.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TokenKind {
  BANG,
  BANG_EQ,
  COMMA,
  DOT,
  EQUALS,
  GREATER,
  GREATER_EQ,
  IDENTIFIER,
  LESS,
  LESS_EQ,
  LOGIC_EQ,
  L_CURLY,
  L_PAREN,
  MINUS,
  NUMBER,
  PLUS,
  R_CURLY,
  R_PAREN,
  SEMICOLON,
  SLASH,
  STAR,
  STRING,

  // Keywords. Most of these are reserved for future versions of the
  // language; only the ones with a parse rule or a statement form do
  // anything today, but all of them are off-limits as identifiers.
  AND_KW,
  CLASS_KW,
  ELSE_KW,
  FALSE_KW,
  FN_KW,
  FOR_KW,
  IF_KW,
  LET_KW,
  NIL_KW,
  OR_KW,
  PRINT_KW,
  RETURN_KW,
  SUPER_KW,
  THIS_KW,
  TRUE_KW,
  WHILE_KW,

  ERROR,
  EOF,
}

/// Finds the token kind for an identifier-shaped lexeme. Keywords are
/// recognized with a dispatch on the first letter (and second, where two
/// keywords share a prefix) so that most identifiers bail out after a
/// single comparison.
pub fn make_identifier_kind(id: &str) -> TokenKind {
  let bytes = id.as_bytes();

  match bytes[0] {
    b'a' => check_keyword(id, "and", TokenKind::AND_KW),
    b'c' => check_keyword(id, "class", TokenKind::CLASS_KW),
    b'e' => check_keyword(id, "else", TokenKind::ELSE_KW),
    b'f' => match bytes.get(1) {
      Some(b'a') => check_keyword(id, "false", TokenKind::FALSE_KW),
      Some(b'n') => check_keyword(id, "fn", TokenKind::FN_KW),
      Some(b'o') => check_keyword(id, "for", TokenKind::FOR_KW),
      _ => TokenKind::IDENTIFIER,
    },
    b'i' => check_keyword(id, "if", TokenKind::IF_KW),
    b'l' => check_keyword(id, "let", TokenKind::LET_KW),
    b'n' => check_keyword(id, "nil", TokenKind::NIL_KW),
    b'o' => check_keyword(id, "or", TokenKind::OR_KW),
    b'p' => check_keyword(id, "print", TokenKind::PRINT_KW),
    b'r' => check_keyword(id, "return", TokenKind::RETURN_KW),
    b's' => check_keyword(id, "super", TokenKind::SUPER_KW),
    b't' => match bytes.get(1) {
      Some(b'h') => check_keyword(id, "this", TokenKind::THIS_KW),
      Some(b'r') => check_keyword(id, "true", TokenKind::TRUE_KW),
      _ => TokenKind::IDENTIFIER,
    },
    b'w' => check_keyword(id, "while", TokenKind::WHILE_KW),
    _ => TokenKind::IDENTIFIER,
  }
}

fn check_keyword(id: &str, keyword: &str, kind: TokenKind) -> TokenKind {
  if id == keyword {
    kind
  } else {
    TokenKind::IDENTIFIER
  }
}
