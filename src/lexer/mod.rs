use crate::lexer::tokens::{make_identifier_kind, Token, TokenKind};

// Submodules
pub mod tokens;

/// Struct that represents the scanner. Tokens are produced one at a time as
/// the compiler asks for them; nothing is buffered.
pub struct Lexer<'a> {
  /// The source text being scanned.
  source: &'a str,
  /// The position of the first byte of the token being scanned.
  token_start: usize,
  /// The position of the next byte to consume.
  current: usize,
  /// The current 1-based line number.
  line: usize,
}

impl<'a> Lexer<'a> {
  /// An initialized instance of the lexer.
  ///
  /// # Parameters
  /// - `source`: The program's source text.
  pub fn new(source: &'a str) -> Lexer<'a> {
    Self {
      source,
      token_start: 0,
      current: 0,
      line: 1,
    }
  }

  /// Scans the next token in the source. Once the end of the source is
  /// reached, every further call returns an `EOF` token.
  pub fn next_token(&mut self) -> Token<'a> {
    self.skip_whitespace();
    self.token_start = self.current;

    if self.is_at_end() {
      return self.make_token(TokenKind::EOF);
    }

    match self.advance() {
      b'(' => self.make_token(TokenKind::L_PAREN),
      b')' => self.make_token(TokenKind::R_PAREN),
      b'{' => self.make_token(TokenKind::L_CURLY),
      b'}' => self.make_token(TokenKind::R_CURLY),
      b';' => self.make_token(TokenKind::SEMICOLON),
      b',' => self.make_token(TokenKind::COMMA),
      b'.' => self.make_token(TokenKind::DOT),
      b'+' => self.make_token(TokenKind::PLUS),
      b'-' => self.make_token(TokenKind::MINUS),
      b'*' => self.make_token(TokenKind::STAR),
      b'/' => self.make_token(TokenKind::SLASH),

      // "!", "!="
      b'!' if self.matches(b'=') => self.make_token(TokenKind::BANG_EQ),
      b'!' => self.make_token(TokenKind::BANG),

      // "=", "=="
      b'=' if self.matches(b'=') => self.make_token(TokenKind::LOGIC_EQ),
      b'=' => self.make_token(TokenKind::EQUALS),

      // "<", "<="
      b'<' if self.matches(b'=') => self.make_token(TokenKind::LESS_EQ),
      b'<' => self.make_token(TokenKind::LESS),

      // ">", ">="
      b'>' if self.matches(b'=') => self.make_token(TokenKind::GREATER_EQ),
      b'>' => self.make_token(TokenKind::GREATER),

      // String literals open with either quote and close with the same one.
      quote @ (b'"' | b'\'') => self.make_string_token(quote),

      ch if is_digit(ch) => self.make_number_token(),
      ch if is_alpha(ch) => self.make_identifier_token(),

      // Everything else is an error token
      _ => self.make_error_token("unexpected character"),
    }
  }

  /// Checks if the scanner is at the end of the source.
  fn is_at_end(&self) -> bool {
    self.current >= self.source.len()
  }

  /// Gets the current byte without consuming it.
  fn peek(&self) -> u8 {
    if self.is_at_end() {
      return b'\0';
    }

    self.source.as_bytes()[self.current]
  }

  /// Gets the byte after the current one without consuming anything.
  fn peek_next(&self) -> u8 {
    match self.source.as_bytes().get(self.current + 1) {
      Some(byte) => *byte,
      None => b'\0',
    }
  }

  /// Advances to the next byte and returns the consumed one.
  fn advance(&mut self) -> u8 {
    let current = self.peek();
    self.current += 1;
    current
  }

  /// Consumes the current byte only if it matches the expected one.
  fn matches(&mut self, expected: u8) -> bool {
    if self.is_at_end() || self.peek() != expected {
      return false;
    }

    self.current += 1;
    true
  }

  /// Skips spaces, tabs, carriage returns, newlines, and line comments.
  fn skip_whitespace(&mut self) {
    loop {
      match self.peek() {
        b' ' | b'\r' | b'\t' => {
          self.advance();
        }
        b'\n' => {
          self.line += 1;
          self.advance();
        }
        b'/' if self.peek_next() == b'/' => {
          while !self.is_at_end() && self.peek() != b'\n' {
            self.advance();
          }
        }
        _ => return,
      }
    }
  }

  /// Scans a string literal delimited by the given quote. The literal may
  /// span lines; each newline inside it still counts toward the line total.
  fn make_string_token(&mut self, quote: u8) -> Token<'a> {
    while !self.is_at_end() && self.peek() != quote {
      if self.peek() == b'\n' {
        self.line += 1;
      }

      self.advance();
    }

    if self.is_at_end() {
      return self.make_error_token("unterminated string");
    }

    // The closing quote
    self.advance();
    self.make_token(TokenKind::STRING)
  }

  /// Scans a numeric literal. A trailing `.` with no digit after it is left
  /// for the parser, so `3.` lexes as the number `3` followed by a dot.
  fn make_number_token(&mut self) -> Token<'a> {
    while is_digit(self.peek()) {
      self.advance();
    }

    if self.peek() == b'.' && is_digit(self.peek_next()) {
      self.advance();

      while is_digit(self.peek()) {
        self.advance();
      }
    }

    self.make_token(TokenKind::NUMBER)
  }

  /// Scans an identifier and resolves it to a keyword kind when it is one.
  fn make_identifier_token(&mut self) -> Token<'a> {
    while is_alpha(self.peek()) || is_digit(self.peek()) {
      self.advance();
    }

    let id = &self.source[self.token_start..self.current];
    self.make_token(make_identifier_kind(id))
  }

  /// Generates a token from the current state of the scanner.
  fn make_token(&self, kind: TokenKind) -> Token<'a> {
    Token {
      kind,
      lexeme: &self.source[self.token_start..self.current],
      line: self.line,
    }
  }

  /// Generates an error token whose lexeme is the provided message.
  fn make_error_token(&self, message: &'static str) -> Token<'a> {
    Token {
      kind: TokenKind::ERROR,
      lexeme: message,
      line: self.line,
    }
  }
}

fn is_digit(byte: u8) -> bool {
  byte.is_ascii_digit()
}

fn is_alpha(byte: u8) -> bool {
  byte.is_ascii_alphabetic() || byte == b'_'
}
