use std::{env, fs, process};

use ember::virtual_machine::{InterpretResult, VM};
use rustyline::Editor;

fn main() {
  // structure: ember <filename?>
  let args = env::args().collect::<Vec<String>>();

  match args.as_slice() {
    [_] => repl(),
    [_, file] => run_file(file),
    _ => {
      eprintln!("Usage: ember [path]");
      process::exit(exitcode::USAGE);
    }
  }
}

/// Reads and interprets a script file, then exits with a code describing
/// how the run went.
fn run_file(filename: &str) {
  let source = match fs::read_to_string(filename) {
    Ok(source) => source,
    Err(error) => {
      eprintln!("Could not open file '{}': {}.", filename, error);
      process::exit(exitcode::IOERR);
    }
  };

  let mut vm = VM::new();

  match vm.interpret(&source) {
    InterpretResult::Ok => process::exit(exitcode::OK),
    InterpretResult::CompileError => process::exit(exitcode::DATAERR),
    InterpretResult::RuntimeError => process::exit(exitcode::SOFTWARE),
  }
}

/// An interactive session. One VM lives for the whole session, so globals
/// defined on one line are visible on the next.
fn repl() {
  let mut rl = Editor::<()>::new();
  let mut vm = VM::new();

  loop {
    match rl.readline("> ") {
      Ok(line) => {
        rl.add_history_entry(&line);
        vm.interpret(&line);
      }
      Err(_) => break,
    }
  }
}
