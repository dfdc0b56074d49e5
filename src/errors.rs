use crate::lexer::tokens::{Token, TokenKind};

/// Prints a compile error for the given token to the standard error stream.
///
/// The reported location is the token's lexeme, or `at end` when the error
/// is at the end of the program. Error tokens get no location clause at all:
/// the scanner already put its message where the lexeme would be, so the
/// message *is* the location.
pub fn report_compile_error(token: &Token, message: &str) {
  eprint!("[line {}] Error", token.line);

  match token.kind {
    TokenKind::EOF => eprint!(" at end"),
    TokenKind::ERROR => {}
    _ => eprint!(" at '{}'", token.lexeme),
  }

  eprintln!(": {}", message);
}

/// Prints a runtime error and the line it was raised from to the standard
/// error stream.
pub fn report_runtime_error(line: usize, message: &str) {
  eprintln!("{}", message);
  eprintln!("[line {}] in script", line);
}
