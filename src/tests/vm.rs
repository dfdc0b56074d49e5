use std::rc::Rc;

use crate::objects::Object;
use crate::value::Value;
use crate::virtual_machine::{InterpretResult, VM};

fn run(source: &str) -> (VM, InterpretResult) {
  let mut vm = VM::new();
  let result = vm.interpret(source);
  (vm, result)
}

/// Runs a program and returns the final value of a global.
fn global(source: &str, name: &str) -> Value {
  let (mut vm, result) = run(source);
  assert_eq!(result, InterpretResult::Ok);

  match vm.get_global(name) {
    Some(value) => value,
    None => panic!("Global '{}' was never defined.", name),
  }
}

#[test]
fn arithmetic_and_globals() {
  assert_eq!(global("let a = 1 + 2 * 3;", "a"), Value::Number(7.0));
  assert_eq!(global("let a = (1 + 2) * 3;", "a"), Value::Number(9.0));
  assert_eq!(global("let a = -(4 - 6);", "a"), Value::Number(2.0));
}

#[test]
fn assignment_is_an_expression() {
  // `b` receives the value of the assignment itself.
  let (mut vm, result) = run("let a = 1; let b = a = 5;");

  assert_eq!(result, InterpretResult::Ok);
  assert_eq!(vm.get_global("a"), Some(Value::Number(5.0)));
  assert_eq!(vm.get_global("b"), Some(Value::Number(5.0)));
}

#[test]
fn assignment_does_not_create_globals() {
  let (mut vm, result) = run("x = 1;");

  assert_eq!(result, InterpretResult::RuntimeError);
  assert_eq!(vm.get_global("x"), None);
}

#[test]
fn reading_an_undefined_global_fails() {
  let (_, result) = run("print missing;");
  assert_eq!(result, InterpretResult::RuntimeError);
}

#[test]
fn type_errors_are_runtime_errors() {
  assert_eq!(run("1 + 'a';").1, InterpretResult::RuntimeError);
  assert_eq!(run("-'a';").1, InterpretResult::RuntimeError);
  assert_eq!(run("'a' < 'b';").1, InterpretResult::RuntimeError);
}

#[test]
fn string_concatenation() {
  match global("let s = 'ab' + 'cd';", "s") {
    Value::Obj(Object::Str(s)) => assert_eq!(s.data, "abcd"),
    other => panic!("Expected a string, got {:?}.", other),
  }
}

#[test]
fn concatenation_results_are_interned() {
  let (mut vm, result) = run("let a = 'xy'; let b = 'x' + 'y';");
  assert_eq!(result, InterpretResult::Ok);

  let a = match vm.get_global("a") {
    Some(Value::Obj(Object::Str(s))) => s,
    other => panic!("Expected a string, got {:?}.", other),
  };
  let b = match vm.get_global("b") {
    Some(Value::Obj(Object::Str(s))) => s,
    other => panic!("Expected a string, got {:?}.", other),
  };

  // Byte-equal strings are one object; equality is identity.
  assert!(Rc::ptr_eq(&a, &b));
}

#[test]
fn equality_never_crosses_types() {
  assert_eq!(global("let e = 1 == '1';", "e"), Value::Bool(false));
  assert_eq!(global("let e = nil == false;", "e"), Value::Bool(false));
  assert_eq!(global("let e = !(nil) == true;", "e"), Value::Bool(true));
  assert_eq!(global("let e = 'ab' == 'a' + 'b';", "e"), Value::Bool(true));
}

#[test]
fn nan_is_not_equal_to_itself() {
  assert_eq!(global("let e = 0/0 == 0/0;", "e"), Value::Bool(false));
}

#[test]
fn only_nil_and_false_are_falsy() {
  let source = "let r = '';
    if (0) r = 'zero-truthy'; else r = 'zero-falsy';";
  match global(source, "r") {
    Value::Obj(Object::Str(s)) => assert_eq!(s.data, "zero-truthy"),
    other => panic!("Expected a string, got {:?}.", other),
  }

  assert_eq!(global("let r = !''; ", "r"), Value::Bool(false));
  assert_eq!(global("let r = !nil;", "r"), Value::Bool(true));
  assert_eq!(global("let r = !false;", "r"), Value::Bool(true));
  assert_eq!(global("let r = !(0/0);", "r"), Value::Bool(false));
}

#[test]
fn logic_operators_short_circuit() {
  // `or` keeps the first truthy value, `and` the first falsy one.
  assert_eq!(global("let r = nil or 0;", "r"), Value::Number(0.0));
  assert_eq!(global("let r = 1 and 2;", "r"), Value::Number(2.0));
  assert_eq!(global("let r = false and missing;", "r"), Value::Bool(false));
  assert_eq!(global("let r = 1 or missing;", "r"), Value::Number(1.0));
}

#[test]
fn while_loops_run_to_completion() {
  let source = "let x = 0; let sum = 0;
    while (x < 3) { sum = sum + x; x = x + 1; }";
  let (mut vm, result) = run(source);

  assert_eq!(result, InterpretResult::Ok);
  assert_eq!(vm.get_global("x"), Some(Value::Number(3.0)));
  assert_eq!(vm.get_global("sum"), Some(Value::Number(3.0)));
}

#[test]
fn block_scoping_shadows_and_restores() {
  let source = "let a = 1; let inner = 0;
    { let a = 2; inner = a; }
    let outer = a;";
  let (mut vm, result) = run(source);

  assert_eq!(result, InterpretResult::Ok);
  assert_eq!(vm.get_global("inner"), Some(Value::Number(2.0)));
  assert_eq!(vm.get_global("outer"), Some(Value::Number(1.0)));
}

#[test]
fn compile_errors_never_reach_the_vm() {
  let (mut vm, result) = run("let ok = 1; print ;");

  assert_eq!(result, InterpretResult::CompileError);
  // Nothing ran, so the first (valid) statement left no trace either.
  assert_eq!(vm.get_global("ok"), None);
}

#[test]
fn globals_persist_across_interpret_calls() {
  let mut vm = VM::new();

  assert_eq!(vm.interpret("let a = 5;"), InterpretResult::Ok);
  assert_eq!(vm.interpret("let b = a + 1;"), InterpretResult::Ok);

  assert_eq!(vm.get_global("b"), Some(Value::Number(6.0)));
}

#[test]
fn the_vm_recovers_after_a_runtime_error() {
  let mut vm = VM::new();

  assert_eq!(vm.interpret("print missing;"), InterpretResult::RuntimeError);
  // The stack was reset; the next run starts clean.
  assert_eq!(vm.interpret("let a = 1;"), InterpretResult::Ok);
  assert_eq!(vm.get_global("a"), Some(Value::Number(1.0)));
}

#[test]
fn long_global_opcodes_resolve_names_past_the_first_256_constants() {
  // Push the name constants of interest past index 255, then make sure
  // definition, read, and write still find the right binding.
  let mut source = String::new();
  for i in 0..300 {
    source.push_str(&format!("'s{}';", i));
  }
  source.push_str("let target = 1; target = target + 41;");

  let (mut vm, result) = run(&source);

  assert_eq!(result, InterpretResult::Ok);
  assert_eq!(vm.get_global("target"), Some(Value::Number(42.0)));
}
