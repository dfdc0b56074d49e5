use std::rc::Rc;

use crate::chunk::Chunk;
use crate::compiler::Compiler;
use crate::errors::report_runtime_error;
use crate::objects::{hash_bytes, StrObj};
use crate::table::Table;
use crate::value::Value;
use crate::STACK_MAX;

// Submodules
mod run;

/// The types of results the interpreter can return.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum InterpretResult {
  Ok,
  CompileError,
  RuntimeError,
}

/// The result of executing a single instruction.
pub(crate) enum RuntimeResult {
  Continue,
  Halt,
  Error,
}

/// Represents the virtual machine and the state that outlives any single
/// run: the value stack, the interned string pool, and the global table.
/// One VM can interpret any number of sources; globals and interned
/// strings carry over between calls, which is what makes the REPL
/// stateful.
pub struct VM {
  /// The value stack. The live top is the end of the vector.
  stack: Vec<Value>,
  /// The instruction pointer into the chunk being executed.
  ip: usize,
  /// The owning registry of every string object this VM has allocated.
  /// Tables, constant pools, and the stack hold additional handles; the
  /// payloads die together with the VM.
  objects: Vec<Rc<StrObj>>,
  /// The string intern set. Keys only; every value is `Nil`.
  strings: Table,
  /// Global variable bindings, keyed by interned name.
  globals: Table,
}

impl VM {
  pub fn new() -> VM {
    VM {
      stack: Vec::with_capacity(STACK_MAX),
      ip: 0,
      objects: vec![],
      strings: Table::new(),
      globals: Table::new(),
    }
  }

  /// Compiles and runs a source string.
  ///
  /// # Returns
  /// - `InterpretResult::CompileError` when compilation failed (the VM is
  ///   not touched), otherwise the result of executing the chunk.
  pub fn interpret(&mut self, source: &str) -> InterpretResult {
    let chunk = match Compiler::compile(source, self) {
      Ok(chunk) => chunk,
      Err(result) => return result,
    };

    self.ip = 0;
    self.run(&chunk)
  }

  /// Pushes a value onto the stack.
  pub(crate) fn push(&mut self, value: Value) -> RuntimeResult {
    self.stack.push(value);
    RuntimeResult::Continue
  }

  /// Pops the value off the top of the stack.
  pub(crate) fn pop(&mut self) -> Value {
    match self.stack.pop() {
      Some(value) => value,
      None => panic!("Stack is empty!"),
    }
  }

  /// Peeks at the value `distance` slots down from the top of the stack.
  pub(crate) fn peek(&self, distance: usize) -> &Value {
    &self.stack[self.stack.len() - 1 - distance]
  }

  fn reset_stack(&mut self) {
    self.stack.clear();
  }

  /// Reports a runtime error with the source line of the instruction that
  /// raised it, then resets the stack. Runtime errors are fatal to the
  /// current run.
  pub(crate) fn runtime_error(&mut self, chunk: &Chunk, message: &str) -> RuntimeResult {
    report_runtime_error(chunk.get_line(self.ip - 1), message);
    self.reset_stack();

    RuntimeResult::Error
  }

  /// Interns a string copied out of borrowed text. Returns the existing
  /// object when a byte-equal string was interned before.
  pub(crate) fn copy_string(&mut self, data: &str) -> Rc<StrObj> {
    let hash = hash_bytes(data.as_bytes());

    if let Some(interned) = self.strings.find_string(data, hash) {
      return interned;
    }

    self.allocate_string(String::from(data), hash)
  }

  /// Interns a string that already owns its buffer, e.g. the result of a
  /// concatenation. When a byte-equal twin is already interned the new
  /// buffer is discarded and the twin wins.
  pub(crate) fn take_string(&mut self, data: String) -> Rc<StrObj> {
    let hash = hash_bytes(data.as_bytes());

    if let Some(interned) = self.strings.find_string(&data, hash) {
      return interned;
    }

    self.allocate_string(data, hash)
  }

  /// Allocates a fresh string object, registers it with the VM, and adds
  /// it to the intern set.
  fn allocate_string(&mut self, data: String, hash: u32) -> Rc<StrObj> {
    let obj = Rc::new(StrObj { data, hash });

    self.objects.push(Rc::clone(&obj));
    self.strings.set(Rc::clone(&obj), Value::Nil);

    obj
  }

  /// Looks up a global binding by name. Test support.
  #[cfg(test)]
  pub(crate) fn get_global(&mut self, name: &str) -> Option<Value> {
    let key = self.copy_string(name);
    self.globals.get(&key)
  }

  /// The number of string objects this VM has allocated. Test support.
  #[cfg(test)]
  pub(crate) fn object_count(&self) -> usize {
    self.objects.len()
  }
}

impl Default for VM {
  fn default() -> Self {
    Self::new()
  }
}
