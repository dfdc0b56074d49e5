use num_derive::FromPrimitive;
use num_traits::FromPrimitive as _;

use crate::value::Value;

/// The set of instructions supported by the virtual machine.
///
/// **NOTE:** Changing the order in which members are declared changes their
/// encoding, and with it the meaning of every previously emitted chunk.
#[derive(Debug, PartialEq, Eq, Clone, Copy, FromPrimitive)]
#[repr(u8)]
pub enum OpCode {
  // Instructions with zero chunk operands. Some of these still take value
  // operands from the stack.
  Add,
  Divide,
  Equal,
  False,
  Greater,
  Less,
  Multiply,
  Negate,
  Nil,
  Not,
  Pop,
  Print,
  Return,
  Subtract,
  True,

  // Instructions that use the next byte from the chunk as their operand.
  Constant,
  DefineGlobal,
  GetGlobal,
  GetLocal,
  SetGlobal,
  SetLocal,

  // Instructions that use the next two bytes (a big-endian short) as their
  // operand.
  ConstantLong,
  DefineGlobalLong,
  GetGlobalLong,
  GetLocalLong,
  Jump,
  JumpIfFalse,
  Loop,
  SetGlobalLong,
  SetLocalLong,
}

/// Contains all the necessary information about the instructions to be
/// executed: the raw bytecode, the source line that produced each byte, and
/// the constant pool the bytecode loads from.
pub struct Chunk {
  code: Vec<u8>,
  lines: Vec<usize>,
  constants: Vec<Value>,
}

impl Chunk {
  /// Creates a new, empty chunk.
  pub fn new() -> Self {
    Self {
      code: vec![],
      lines: vec![],
      constants: vec![],
    }
  }

  /// Gets the length of the instruction stream.
  pub fn len(&self) -> usize {
    self.code.len()
  }

  /// Checks whether the instruction stream is empty.
  pub fn is_empty(&self) -> bool {
    self.code.is_empty()
  }

  /// Appends a raw byte and its source line in lockstep.
  pub fn write(&mut self, byte: u8, line: usize) {
    self.code.push(byte);
    self.lines.push(line);
  }

  /// Appends an instruction byte from a given OpCode.
  pub fn write_op(&mut self, op: OpCode, line: usize) {
    self.write(op as u8, line);
  }

  /// Splits a 16-bit integer into two bytes and appends them in big-endian
  /// order.
  pub fn write_short(&mut self, val: u16, line: usize) {
    let short = val.to_be_bytes();
    self.write(short[0], line);
    self.write(short[1], line);
  }

  /// Modifies the byte value at the specified index.
  pub fn patch(&mut self, idx: usize, new_byte: u8) {
    self.code[idx] = new_byte;
  }

  /// Retrieves a raw byte from the instruction stream.
  pub fn get_byte(&self, idx: usize) -> u8 {
    self.code[idx]
  }

  /// Retrieves the bytes at `idx` and `idx + 1` as a big-endian short.
  pub fn get_short(&self, idx: usize) -> u16 {
    u16::from_be_bytes([self.code[idx], self.code[idx + 1]])
  }

  /// Decodes the byte at the given index as an OpCode.
  pub fn get_op_code(&self, idx: usize) -> Option<OpCode> {
    OpCode::from_u8(self.code[idx])
  }

  /// Gets the 1-based source line that produced the byte at the given index.
  pub fn get_line(&self, idx: usize) -> usize {
    self.lines[idx]
  }

  /// Adds a constant to this chunk's constant pool and returns its index.
  /// The pool is append-only; values are never deduplicated here (interning
  /// already shares string payloads).
  pub fn add_constant(&mut self, value: Value) -> usize {
    self.constants.push(value);
    self.constants.len() - 1
  }

  /// Retrieves a constant from this chunk's constant pool.
  pub fn get_constant(&self, idx: usize) -> &Value {
    &self.constants[idx]
  }

  /// Gets the size of the constant pool for this chunk.
  pub fn constants_len(&self) -> usize {
    self.constants.len()
  }

  /// Adds a constant to the pool and emits the instruction that loads it,
  /// choosing the short or long encoding based on where the constant
  /// landed. Returns false when the pool has outgrown what a long operand
  /// can address.
  pub fn write_constant(&mut self, value: Value, line: usize) -> bool {
    let idx = self.add_constant(value);

    if idx <= u8::MAX as usize {
      self.write_op(OpCode::Constant, line);
      self.write(idx as u8, line);
    } else if idx <= u16::MAX as usize {
      self.write_op(OpCode::ConstantLong, line);
      self.write_short(idx as u16, line);
    } else {
      return false;
    }

    true
  }
}

impl Default for Chunk {
  fn default() -> Self {
    Self::new()
  }
}
