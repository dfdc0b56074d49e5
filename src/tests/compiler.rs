use crate::chunk::{Chunk, OpCode};
use crate::compiler::Compiler;
use crate::virtual_machine::{InterpretResult, VM};

fn compile(source: &str) -> Result<Chunk, InterpretResult> {
  let mut vm = VM::new();
  Compiler::compile(source, &mut vm)
}

/// Decodes the chunk into (opcode, operand) pairs, so tests can assert on
/// instruction sequences without caring about encoding widths.
fn decode(chunk: &Chunk) -> Vec<(OpCode, Option<usize>)> {
  let mut decoded = vec![];
  let mut offset = 0;

  while offset < chunk.len() {
    let op = match chunk.get_op_code(offset) {
      Some(op) => op,
      None => panic!("Invalid opcode at offset {}.", offset),
    };

    match op {
      OpCode::Constant
      | OpCode::DefineGlobal
      | OpCode::GetGlobal
      | OpCode::SetGlobal
      | OpCode::GetLocal
      | OpCode::SetLocal => {
        decoded.push((op, Some(chunk.get_byte(offset + 1) as usize)));
        offset += 2;
      }

      OpCode::ConstantLong
      | OpCode::DefineGlobalLong
      | OpCode::GetGlobalLong
      | OpCode::SetGlobalLong
      | OpCode::GetLocalLong
      | OpCode::SetLocalLong
      | OpCode::Jump
      | OpCode::JumpIfFalse
      | OpCode::Loop => {
        decoded.push((op, Some(chunk.get_short(offset + 1) as usize)));
        offset += 3;
      }

      _ => {
        decoded.push((op, None));
        offset += 1;
      }
    }
  }

  decoded
}

#[test]
fn arithmetic_respects_precedence() {
  let chunk = compile("1 + 2 * 3;").unwrap();

  assert_eq!(
    decode(&chunk),
    vec![
      (OpCode::Constant, Some(0)),
      (OpCode::Constant, Some(1)),
      (OpCode::Constant, Some(2)),
      (OpCode::Multiply, None),
      (OpCode::Add, None),
      (OpCode::Pop, None),
      (OpCode::Return, None),
    ]
  );
}

#[test]
fn derived_comparisons_compile_to_primitive_plus_not() {
  let chunk = compile("1 <= 2;").unwrap();

  assert_eq!(
    decode(&chunk),
    vec![
      (OpCode::Constant, Some(0)),
      (OpCode::Constant, Some(1)),
      (OpCode::Greater, None),
      (OpCode::Not, None),
      (OpCode::Pop, None),
      (OpCode::Return, None),
    ]
  );
}

#[test]
fn every_chunk_ends_with_return() {
  let chunk = compile("").unwrap();

  assert_eq!(chunk.len(), 1);
  assert_eq!(chunk.get_op_code(0), Some(OpCode::Return));
}

#[test]
fn let_without_initializer_defaults_to_nil() {
  let chunk = compile("let a;").unwrap();

  assert_eq!(
    decode(&chunk),
    vec![
      (OpCode::Nil, None),
      (OpCode::DefineGlobal, Some(0)),
      (OpCode::Return, None),
    ]
  );
}

#[test]
fn block_locals_compile_to_stack_slots() {
  let chunk = compile("{ let a = 1; print a; }").unwrap();

  assert_eq!(
    decode(&chunk),
    vec![
      (OpCode::Constant, Some(0)),
      (OpCode::GetLocal, Some(0)),
      (OpCode::Print, None),
      (OpCode::Pop, None), // the local is discarded at scope exit
      (OpCode::Return, None),
    ]
  );
}

#[test]
fn logic_and_short_circuits() {
  let chunk = compile("true and false;").unwrap();

  assert_eq!(
    decode(&chunk),
    vec![
      (OpCode::True, None),
      (OpCode::JumpIfFalse, Some(2)), // over the Pop and the rhs
      (OpCode::Pop, None),
      (OpCode::False, None),
      (OpCode::Pop, None),
      (OpCode::Return, None),
    ]
  );
}

#[test]
fn while_loop_jumps_back_to_its_condition() {
  let chunk = compile("while (true) {}").unwrap();
  let decoded = decode(&chunk);

  // [True, JumpIfFalse, Pop, Loop, Pop, Return]
  assert_eq!(decoded[0], (OpCode::True, None));
  assert_eq!(decoded[1].0, OpCode::JumpIfFalse);
  assert_eq!(decoded[3].0, OpCode::Loop);

  // The Loop instruction starts at offset 5 and its operand lands the ip
  // back on the condition at offset 0.
  assert_eq!(decoded[3].1, Some(8));
}

#[test]
fn reading_a_local_in_its_own_initializer_fails() {
  assert!(compile("let a = a;").is_ok()); // fine for globals: late binding
  assert_eq!(
    compile("{ let a = a; }").err(),
    Some(InterpretResult::CompileError)
  );
}

#[test]
fn redeclaring_in_the_same_scope_fails() {
  assert_eq!(
    compile("{ let a = 1; let a = 2; }").err(),
    Some(InterpretResult::CompileError)
  );

  // Shadowing in an inner scope is fine.
  assert!(compile("{ let a = 1; { let a = 2; } }").is_ok());
}

#[test]
fn invalid_assignment_targets_are_rejected() {
  assert_eq!(
    compile("let a = 1; let b = 2; a + b = 3;").err(),
    Some(InterpretResult::CompileError)
  );
}

#[test]
fn missing_expression_is_a_compile_error() {
  assert_eq!(compile("print ;").err(), Some(InterpretResult::CompileError));
}

#[test]
fn compilation_continues_past_the_first_error() {
  // Both statements are bad; synchronize lets the second one be seen. Any
  // error still fails the compile as a whole.
  assert_eq!(
    compile("let 1 = 2;\nprint ;").err(),
    Some(InterpretResult::CompileError)
  );
}

#[test]
fn large_constant_pools_use_the_long_opcodes() {
  // 300 distinct string literals overflow the one-byte operand.
  let mut source = String::new();
  for i in 0..300 {
    source.push_str(&format!("'s{}';", i));
  }

  let chunk = compile(&source).unwrap();
  let decoded = decode(&chunk);

  assert!(decoded.contains(&(OpCode::ConstantLong, Some(299))));
  assert_eq!(chunk.constants_len(), 300);
}

#[test]
fn too_many_locals_fails() {
  let mut source = String::from("{");
  for i in 0..257 {
    source.push_str(&format!("let l{} = {};", i, i));
  }
  source.push('}');

  assert_eq!(compile(&source).err(), Some(InterpretResult::CompileError));
}

#[test]
fn oversized_loop_bodies_fail() {
  // Enough statements inside the loop to push the backwards jump past what
  // a 16-bit offset can express.
  let mut source = String::from("let x = 0; while (true) {");
  for _ in 0..12000 {
    source.push_str("x = 1;");
  }
  source.push('}');

  assert_eq!(compile(&source).err(), Some(InterpretResult::CompileError));
}

#[test]
fn identifier_constants_are_interned_across_the_pool() {
  // Two uses of one global name append two pool entries, but interning
  // makes them the same string object.
  let mut vm = VM::new();
  let before = vm.object_count();

  Compiler::compile("let a = 1; a = 2;", &mut vm).unwrap();

  assert_eq!(vm.object_count(), before + 1);
}
