//! Bytecode disassembler. Only compiled in when one of the debugging
//! features is enabled.

use crate::chunk::{Chunk, OpCode};

/// Disassembles a whole chunk, printing each instruction and its related
/// information under a header.
pub fn disassemble_chunk(chunk: &Chunk, name: &str) {
  println!("==== {} ====", name);

  let mut offset = 0;
  while offset < chunk.len() {
    offset = disassemble_instruction(chunk, offset);
  }

  println!();
}

/// Disassembles the instruction at the given offset and returns the offset
/// of the next one. Prints the byte offset, the source line (or a vertical
/// bar when the instruction shares its line with the previous one), the
/// instruction name, and its operand.
pub fn disassemble_instruction(chunk: &Chunk, offset: usize) -> usize {
  print!("{:>04} ", offset);

  let line = chunk.get_line(offset);
  if offset > 0 && line == chunk.get_line(offset - 1) {
    print!("   | ");
  } else {
    print!("{:>4} ", line);
  }

  let op = match chunk.get_op_code(offset) {
    Some(op) => op,
    None => {
      println!("Unknown opcode {:#04X}", chunk.get_byte(offset));
      return offset + 1;
    }
  };

  match op {
    OpCode::Constant | OpCode::DefineGlobal | OpCode::GetGlobal | OpCode::SetGlobal => {
      constant_instruction(chunk, op, offset, false)
    }

    OpCode::ConstantLong
    | OpCode::DefineGlobalLong
    | OpCode::GetGlobalLong
    | OpCode::SetGlobalLong => constant_instruction(chunk, op, offset, true),

    OpCode::GetLocal | OpCode::SetLocal => {
      let slot = chunk.get_byte(offset + 1);
      println!("{:<16} {:>4}", format!("{:?}", op), slot);
      offset + 2
    }

    OpCode::GetLocalLong | OpCode::SetLocalLong => {
      let slot = chunk.get_short(offset + 1);
      println!("{:<16} {:>4}", format!("{:?}", op), slot);
      offset + 3
    }

    OpCode::Jump | OpCode::JumpIfFalse => jump_instruction(chunk, op, offset, true),
    OpCode::Loop => jump_instruction(chunk, op, offset, false),

    // Everything else carries no operand.
    _ => {
      println!("{:?}", op);
      offset + 1
    }
  }
}

fn constant_instruction(chunk: &Chunk, op: OpCode, offset: usize, long: bool) -> usize {
  let (idx, next) = if long {
    (chunk.get_short(offset + 1) as usize, offset + 3)
  } else {
    (chunk.get_byte(offset + 1) as usize, offset + 2)
  };

  println!(
    "{:<16} {:>4} ({:?})",
    format!("{:?}", op),
    idx,
    chunk.get_constant(idx)
  );

  next
}

fn jump_instruction(chunk: &Chunk, op: OpCode, offset: usize, forward: bool) -> usize {
  let jump = chunk.get_short(offset + 1) as usize;

  // At runtime the ip has already moved past the operand, so the target is
  // relative to the following instruction.
  let target = if forward {
    offset + 3 + jump
  } else {
    offset + 3 - jump
  };

  println!("{:<16} {:>4} -> {}", format!("{:?}", op), offset, target);

  offset + 3
}
