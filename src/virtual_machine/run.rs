use std::rc::Rc;

use crate::chunk::{Chunk, OpCode};
use crate::objects::{Object, StrObj};
use crate::value::Value;
use crate::virtual_machine::{InterpretResult, RuntimeResult, VM};

impl VM {
  /// Executes the instructions in a chunk. Classic fetch-decode loop: read
  /// one byte, decode it, dispatch on the opcode.
  pub(crate) fn run(&mut self, chunk: &Chunk) -> InterpretResult {
    loop {
      #[cfg(feature = "trace_execution")]
      self.trace(chunk);

      let instruction = match chunk.get_op_code(self.ip) {
        Some(op) => op,
        None => unreachable!("Invalid instruction byte."),
      };
      self.ip += 1;

      let exec = match instruction {
        OpCode::Constant => {
          let value = self.read_constant(chunk, false);
          self.push(value)
        }
        OpCode::ConstantLong => {
          let value = self.read_constant(chunk, true);
          self.push(value)
        }

        OpCode::Nil => self.push(Value::Nil),
        OpCode::True => self.push(Value::Bool(true)),
        OpCode::False => self.push(Value::Bool(false)),

        OpCode::Pop => {
          self.pop();
          RuntimeResult::Continue
        }

        // Local declarations
        OpCode::GetLocal => self.op_get_local(chunk, false),
        OpCode::GetLocalLong => self.op_get_local(chunk, true),
        OpCode::SetLocal => self.op_set_local(chunk, false),
        OpCode::SetLocalLong => self.op_set_local(chunk, true),

        // Global declarations
        OpCode::DefineGlobal => self.op_define_global(chunk, false),
        OpCode::DefineGlobalLong => self.op_define_global(chunk, true),
        OpCode::GetGlobal => self.op_get_global(chunk, false),
        OpCode::GetGlobalLong => self.op_get_global(chunk, true),
        OpCode::SetGlobal => self.op_set_global(chunk, false),
        OpCode::SetGlobalLong => self.op_set_global(chunk, true),

        // Operators
        OpCode::Equal => self.op_equal(),
        OpCode::Greater => self.binary_operation(chunk, OpCode::Greater),
        OpCode::Less => self.binary_operation(chunk, OpCode::Less),
        OpCode::Add => self.op_add(chunk),
        OpCode::Subtract => self.binary_operation(chunk, OpCode::Subtract),
        OpCode::Multiply => self.binary_operation(chunk, OpCode::Multiply),
        OpCode::Divide => self.binary_operation(chunk, OpCode::Divide),
        OpCode::Not => self.op_not(),
        OpCode::Negate => self.op_negate(chunk),

        OpCode::Print => {
          println!("{}", self.pop());
          RuntimeResult::Continue
        }

        // Jumps
        OpCode::Jump => self.op_jump(chunk),
        OpCode::JumpIfFalse => self.op_jump_if_false(chunk),
        OpCode::Loop => self.op_loop(chunk),

        // The end of the top-level chunk.
        OpCode::Return => RuntimeResult::Halt,
      };

      match exec {
        RuntimeResult::Continue => continue,
        RuntimeResult::Halt => return InterpretResult::Ok,
        RuntimeResult::Error => return InterpretResult::RuntimeError,
      }
    }
  }

  /// Reads the byte at the instruction pointer and advances past it.
  fn read_byte(&mut self, chunk: &Chunk) -> u8 {
    let byte = chunk.get_byte(self.ip);
    self.ip += 1;
    byte
  }

  /// Reads the next two bytes as a big-endian short.
  fn read_short(&mut self, chunk: &Chunk) -> u16 {
    let short = chunk.get_short(self.ip);
    self.ip += 2;
    short
  }

  /// Reads a one- or two-byte operand as an index.
  fn read_operand(&mut self, chunk: &Chunk, long: bool) -> usize {
    if long {
      self.read_short(chunk) as usize
    } else {
      self.read_byte(chunk) as usize
    }
  }

  /// Reads a constant-pool operand and loads the constant. The long form's
  /// operand is big-endian; the two reads are sequenced explicitly, high
  /// byte first.
  fn read_constant(&mut self, chunk: &Chunk, long: bool) -> Value {
    let idx = if long {
      let hi = self.read_byte(chunk) as usize;
      let lo = self.read_byte(chunk) as usize;
      (hi << 8) | lo
    } else {
      self.read_byte(chunk) as usize
    };

    chunk.get_constant(idx).clone()
  }

  /// Reads a constant operand that the compiler guarantees is a string:
  /// the name operand of the global-variable instructions.
  fn read_string(&mut self, chunk: &Chunk, long: bool) -> Rc<StrObj> {
    match self.read_constant(chunk, long) {
      Value::Obj(Object::Str(s)) => s,
      _ => unreachable!("Expected a string constant for a variable name."),
    }
  }

  fn pop_number(&mut self) -> f64 {
    match self.pop() {
      Value::Number(n) => n,
      _ => unreachable!("Operand type was checked before popping."),
    }
  }

  fn pop_string(&mut self) -> Rc<StrObj> {
    match self.pop() {
      Value::Obj(Object::Str(s)) => s,
      _ => unreachable!("Operand type was checked before popping."),
    }
  }

  /// Executes a numeric binary instruction: both operands are type-checked
  /// before anything is popped, so a failed check leaves the stack intact
  /// for the error report.
  fn binary_operation(&mut self, chunk: &Chunk, op: OpCode) -> RuntimeResult {
    if !self.peek(0).is_number() || !self.peek(1).is_number() {
      return self.runtime_error(chunk, "Operands must be numbers.");
    }

    let b = self.pop_number();
    let a = self.pop_number();

    match op {
      OpCode::Subtract => self.push(Value::Number(a - b)),
      OpCode::Multiply => self.push(Value::Number(a * b)),
      OpCode::Divide => self.push(Value::Number(a / b)),
      OpCode::Greater => self.push(Value::Bool(a > b)),
      OpCode::Less => self.push(Value::Bool(a < b)),
      _ => unreachable!("Not a numeric binary instruction."),
    }
  }

  /// Executes the `Add` instruction, which is the one operator with two
  /// meanings: string concatenation and numeric addition.
  fn op_add(&mut self, chunk: &Chunk) -> RuntimeResult {
    if self.peek(0).is_string() && self.peek(1).is_string() {
      return self.concatenate();
    }

    if self.peek(0).is_number() && self.peek(1).is_number() {
      let b = self.pop_number();
      let a = self.pop_number();
      return self.push(Value::Number(a + b));
    }

    self.runtime_error(chunk, "Operands must be two numbers or strings.")
  }

  /// Concatenates the two strings on top of the stack. The result goes
  /// through the interner, so a concatenation that reproduces an existing
  /// string yields the existing object.
  fn concatenate(&mut self) -> RuntimeResult {
    let b = self.pop_string();
    let a = self.pop_string();

    let mut data = String::with_capacity(a.data.len() + b.data.len());
    data.push_str(&a.data);
    data.push_str(&b.data);

    let result = self.take_string(data);
    self.push(Value::Obj(Object::Str(result)))
  }

  fn op_equal(&mut self) -> RuntimeResult {
    let b = self.pop();
    let a = self.pop();

    self.push(Value::Bool(a == b))
  }

  /// Replaces the top of the stack with its falsy-negation.
  fn op_not(&mut self) -> RuntimeResult {
    let value = self.pop();
    self.push(Value::Bool(value.is_falsy()))
  }

  fn op_negate(&mut self, chunk: &Chunk) -> RuntimeResult {
    if !self.peek(0).is_number() {
      return self.runtime_error(chunk, "Operand must be a number.");
    }

    let n = self.pop_number();
    self.push(Value::Number(-n))
  }

  /// Executes the instruction to push a local's value. Locals *are* stack
  /// slots; the operand is the slot index.
  fn op_get_local(&mut self, chunk: &Chunk, long: bool) -> RuntimeResult {
    let slot = self.read_operand(chunk, long);
    let value = self.stack[slot].clone();

    self.push(value)
  }

  /// Executes the instruction to store the top of the stack into a local's
  /// slot. Assignment is an expression, so the value stays on the stack.
  fn op_set_local(&mut self, chunk: &Chunk, long: bool) -> RuntimeResult {
    let slot = self.read_operand(chunk, long);
    self.stack[slot] = self.peek(0).clone();

    RuntimeResult::Continue
  }

  /// Executes the instruction to define a global binding. The value is
  /// peeked, inserted, and only then popped, so it stays reachable from
  /// the stack while the table may be resizing.
  fn op_define_global(&mut self, chunk: &Chunk, long: bool) -> RuntimeResult {
    let name = self.read_string(chunk, long);

    let value = self.peek(0).clone();
    self.globals.set(name, value);
    self.pop();

    RuntimeResult::Continue
  }

  fn op_get_global(&mut self, chunk: &Chunk, long: bool) -> RuntimeResult {
    let name = self.read_string(chunk, long);

    match self.globals.get(&name) {
      Some(value) => self.push(value),
      None => {
        let message = format!("Undefined variable '{}'.", name.data);
        self.runtime_error(chunk, &message)
      }
    }
  }

  /// Executes the instruction to assign to an existing global. Assignment
  /// never creates a binding: when the insert turns out to be new, it is
  /// rolled back before the error is raised.
  fn op_set_global(&mut self, chunk: &Chunk, long: bool) -> RuntimeResult {
    let name = self.read_string(chunk, long);
    let value = self.peek(0).clone();

    if self.globals.set(Rc::clone(&name), value) {
      self.globals.delete(&name);

      let message = format!("Undefined variable '{}'.", name.data);
      return self.runtime_error(chunk, &message);
    }

    RuntimeResult::Continue
  }

  fn op_jump(&mut self, chunk: &Chunk) -> RuntimeResult {
    let offset = self.read_short(chunk) as usize;
    self.ip += offset;

    RuntimeResult::Continue
  }

  /// Jumps forward when the top of the stack is falsy. The condition value
  /// is intentionally left on the stack; the compiler emits the pops.
  fn op_jump_if_false(&mut self, chunk: &Chunk) -> RuntimeResult {
    let offset = self.read_short(chunk) as usize;

    if self.peek(0).is_falsy() {
      self.ip += offset;
    }

    RuntimeResult::Continue
  }

  fn op_loop(&mut self, chunk: &Chunk) -> RuntimeResult {
    let offset = self.read_short(chunk) as usize;
    self.ip -= offset;

    RuntimeResult::Continue
  }

  /// Prints the value stack and disassembles the instruction about to be
  /// executed. Useful when debugging the VM itself.
  #[cfg(feature = "trace_execution")]
  fn trace(&self, chunk: &Chunk) {
    if !self.stack.is_empty() {
      print!("\t");
      for value in self.stack.iter() {
        print!("[{:?}]", value);
      }
      println!();
    }

    crate::debug::disassemble_instruction(chunk, self.ip);
  }
}
