//! Integration tests for end-to-end compilation.
//!
//! These tests verify that the complete pipeline works correctly from source
//! code through tokenization, parsing, symbol resolution, type checking and
//! code generation, and then run the generated assembly on the stack
//! virtual machine.

use foolc::{
    ast::types::TypeNode,
    compile_source,
    errors::errors::ErrorKind,
    svm::{
        assembler::assemble,
        machine::{Execution, Machine},
        VmError,
    },
    CompileFailure, Compilation, CompilerOptions, Stage,
};

fn compile(source: &str) -> Compilation {
    match compile_source(source, &CompilerOptions::default()) {
        Ok(compilation) => compilation,
        Err(failure) => panic!("compilation failed: {:?}", failure.errors),
    }
}

fn compile_err(source: &str) -> CompileFailure {
    match compile_source(source, &CompilerOptions::default()) {
        Ok(compilation) => panic!("compilation succeeded:\n{}", compilation.assembly),
        Err(failure) => failure,
    }
}

fn execute(source: &str) -> Result<Execution, VmError> {
    let compilation = compile(source);
    Machine::new(assemble(&compilation.assembly)?).run()
}

fn run(source: &str) -> Execution {
    execute(source).unwrap()
}

fn error_kinds(failure: &CompileFailure) -> Vec<ErrorKind> {
    failure.errors.iter().map(|error| error.kind()).collect()
}

#[test]
fn test_let_in_arithmetic() {
    let compilation = compile("let var x: int = 5; in x + 2;");
    assert_eq!(compilation.main_type, Some(TypeNode::Int));

    let execution = run("let var x: int = 5; in x + 2;");
    assert_eq!(execution.result, Some(7));
}

#[test]
fn test_bare_expression_program() {
    assert_eq!(run("(10 - 4) * 3 / 2;").result, Some(9));
    assert_eq!(run("3 - -4").result, Some(7));
}

#[test]
fn test_subclass_instance_type() {
    let compilation = compile(
        "let
           class A (f: int) {}
           class B extends A () {}
         in new B(3);",
    );
    assert_eq!(compilation.main_type, Some(TypeNode::reference("B")));
}

#[test]
fn test_duplicate_variable_keeps_first_binding() {
    let failure = compile_err("let var x: int = 5; var x: bool = true; in x + 1;");
    assert_eq!(failure.stage, Stage::Semantic);
    assert_eq!(error_kinds(&failure), vec![ErrorKind::DuplicateDeclaration]);
    assert_eq!(failure.counts.symbol_table, 1);
    assert_eq!(failure.counts.type_checker, 0);
}

#[test]
fn test_arity_mismatch_generates_nothing() {
    let failure = compile_err("let fun f: int (a: int, b: int) a + b; in f(1);");
    assert_eq!(failure.stage, Stage::Semantic);
    assert_eq!(error_kinds(&failure), vec![ErrorKind::ArityMismatch]);
    assert_eq!(failure.counts.type_checker, 1);
}

#[test]
fn test_if_joins_int_and_bool() {
    let compilation = compile("if true then { 1 } else { false };");
    assert_eq!(compilation.main_type, Some(TypeNode::Int));
    assert_eq!(run("if true then { 1 } else { false };").result, Some(1));
}

#[test]
fn test_method_call_on_non_object() {
    let failure = compile_err("let var n: int = 1; in n.m();");
    assert_eq!(error_kinds(&failure), vec![ErrorKind::InvalidUsage]);
    assert_eq!(failure.counts.symbol_table, 1);
    assert_eq!(failure.counts.type_checker, 0);
}

#[test]
fn test_recursive_function() {
    let execution = run(
        "let
           fun fact: int (n: int)
             if n <= 1 then { 1 } else { n * fact(n - 1) };
         in fact(6);",
    );
    assert_eq!(execution.result, Some(720));
}

#[test]
fn test_nested_functions_use_access_links() {
    let execution = run(
        "let
           var base: int = 10;
           fun outer: int (x: int)
             let
               var y: int = 2;
               fun inner: int (z: int) base + x + y + z;
             in inner(3);
         in outer(1);",
    );
    assert_eq!(execution.result, Some(16));
}

#[test]
fn test_print_yields_its_value() {
    let execution = run("print(3) + print(4);");
    assert_eq!(execution.output, vec![3, 4]);
    assert_eq!(execution.result, Some(7));
}

#[test]
fn test_boolean_operators_short_circuit() {
    let execution = run("false && print(1) == 1;");
    assert!(execution.output.is_empty());
    assert_eq!(execution.result, Some(0));

    let execution = run("true || print(5) == 5;");
    assert!(execution.output.is_empty());
    assert_eq!(execution.result, Some(1));

    let execution = run("true && print(7) == 7;");
    assert_eq!(execution.output, vec![7]);
    assert_eq!(execution.result, Some(1));
}

#[test]
fn test_comparisons_and_negation() {
    assert_eq!(
        run("if 3 >= 2 then { if 2 <= 1 then { 0 } else { 1 } } else { 2 };").result,
        Some(1)
    );
    assert_eq!(run("!(1 == 2);").result, Some(1));
    assert_eq!(run("!true || false;").result, Some(0));
}

#[test]
fn test_dynamic_dispatch() {
    let execution = run(
        "let
           class Account (balance: int) {
             fun get: int () balance;
             fun interest: int () 0;
             fun total: int () get() + interest();
           }
           class Savings extends Account (rate: int) {
             fun interest: int () balance * rate / 100;
           }
           var a: Account = new Savings(1000, 5);
           var b: Account = new Account(300);
         in print(a.total()) + b.total();",
    );
    assert_eq!(execution.output, vec![1050]);
    assert_eq!(execution.result, Some(1350));
}

#[test]
fn test_recursive_objects_and_null() {
    let execution = run(
        "let
           class List (head: int, tail: List) {
             fun length: int ()
               if tail == null then { 1 } else { 1 + tail.length() };
             fun sum: int ()
               if tail == null then { head } else { head + tail.sum() };
           }
           var l: List = new List(1, new List(2, new List(3, null)));
         in print(l.length()) + l.sum();",
    );
    assert_eq!(execution.output, vec![3]);
    assert_eq!(execution.result, Some(9));
}

#[test]
fn test_method_parameters_and_locals() {
    let execution = run(
        "let
           class Counter (start: int) {
             fun add: int (n: int, m: int)
               let var s: int = start + n;
               in s * m;
           }
           var c: Counter = new Counter(2);
         in c.add(3, 4);",
    );
    assert_eq!(execution.result, Some(20));
}

#[test]
fn test_subclass_passed_where_superclass_expected() {
    let execution = run(
        "let
           class Animal (legs: int) { fun count: int () legs; }
           class Dog extends Animal () {}
           class Vet () { fun check: int (a: Animal) a.count(); }
           var v: Vet = new Vet();
         in v.check(new Dog(4));",
    );
    assert_eq!(execution.result, Some(4));
}

#[test]
fn test_division_by_zero_is_a_runtime_error() {
    assert!(matches!(
        execute("10 / (5 - 5);"),
        Err(VmError::DivisionByZero { .. })
    ));
}

#[test]
fn test_syntax_error_stops_the_pipeline() {
    let failure = compile_err("let var x: int = ; in x;");
    assert_eq!(failure.stage, Stage::Parsing);
    assert_eq!(error_kinds(&failure), vec![ErrorKind::Syntax]);
}

#[test]
fn test_lexical_error() {
    let failure = compile_err("1 # 2;");
    assert_eq!(failure.stage, Stage::Lexing);
    assert_eq!(failure.errors[0].get_position().1, 3);
}
