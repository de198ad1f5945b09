//! Unit tests for code generation.
//!
//! These compare the emitted assembly of small programs line by line; the
//! behaviour of larger programs is covered by running them on the virtual
//! machine in the integration tests.

use crate::{
    errors::errors::ErrorKind,
    lexer::lexer::tokenize,
    parser::parser::parse,
    symbol_table::symbol_table::{build_symbol_table, SemanticContext},
    type_checker::type_checker::type_check,
};

use super::compiler::compile;

fn generate(source: &str) -> Vec<String> {
    let mut program = parse(tokenize(source).unwrap()).unwrap();
    let symbols = build_symbol_table(&mut program);
    assert!(symbols.errors.is_empty(), "{:?}", symbols.errors);
    let checked = type_check(&program, &symbols.context);
    assert!(checked.errors.is_empty(), "{:?}", checked.errors);

    compile(&program, &symbols.context)
        .unwrap()
        .lines()
        .map(String::from)
        .collect()
}

#[test]
fn test_bare_expression() {
    assert_eq!(generate("1 + 2 * 3;"), vec![
        "push 1", "push 2", "push 3", "mult", "add", "halt"
    ]);
}

#[test]
fn test_literals() {
    assert_eq!(generate("true;"), vec!["push 1", "halt"]);
    assert_eq!(generate("false;"), vec!["push 0", "halt"]);
    assert_eq!(generate("null;"), vec!["push -1", "halt"]);
    assert_eq!(generate("-7;"), vec!["push -7", "halt"]);
}

#[test]
fn test_global_variable() {
    assert_eq!(
        generate("let var x: int = 5; in x;"),
        vec!["push 0", "push 5", "lfp", "push -2", "add", "lw", "halt"]
    );
}

#[test]
fn test_less_equal_branch_shape() {
    assert_eq!(
        generate("1 <= 2;"),
        vec![
            "push 1",
            "push 2",
            "bleq label0",
            "push 0",
            "b label1",
            "label0:",
            "push 1",
            "label1:",
            "halt",
        ]
    );
}

#[test]
fn test_greater_equal_swaps_operands() {
    let code = generate("1 >= 2;");
    assert_eq!(&code[..3], &["push 2", "push 1", "bleq label0"]);
}

#[test]
fn test_and_short_circuits() {
    assert_eq!(
        generate("false && true;"),
        vec![
            "push 0",
            "push 1",
            "beq label0",
            "push 0",
            "b label1",
            "label0:",
            "push 1",
            "label1:",
            "halt",
        ]
    );
}

#[test]
fn test_if_expression() {
    assert_eq!(
        generate("if true then { 1 } else { 2 };"),
        vec![
            "push 1",
            "push 1",
            "beq label0",
            "push 2",
            "b label1",
            "label0:",
            "push 1",
            "label1:",
            "halt",
        ]
    );
}

#[test]
fn test_function_declaration_and_call() {
    let code = generate("let fun id: int (x: int) x; in id(4);");

    assert_eq!(
        code,
        vec![
            "push 0",
            "push function0",
            // call
            "lfp",
            "push 4",
            "lfp",
            "stm",
            "ltm",
            "ltm",
            "push -2",
            "add",
            "lw",
            "js",
            "halt",
            // body
            "function0:",
            "cfp",
            "lra",
            "lfp",
            "push 1",
            "add",
            "lw",
            "stm",
            "sra",
            "pop",
            "pop",
            "sfp",
            "ltm",
            "lra",
            "js",
        ]
    );
}

#[test]
fn test_arguments_are_pushed_in_reverse() {
    let code = generate("let fun first: int (a: int, b: int) a; in first(1, 2);");
    let call = code.iter().position(|line| line == "lfp").unwrap();
    assert_eq!(&code[call..call + 3], &["lfp", "push 2", "push 1"]);
}

#[test]
fn test_local_declarations_are_popped() {
    let code = generate("let fun f: int () let var a: int = 1; var b: int = 2; in a; in f();");
    let body = code.iter().position(|line| line == "function0:").unwrap();
    let epilogue: Vec<&str> = code[body..]
        .iter()
        .skip_while(|line| *line != "stm")
        .map(String::as_str)
        .collect();
    assert_eq!(
        epilogue,
        vec!["stm", "pop", "pop", "sra", "pop", "sfp", "ltm", "lra", "js"]
    );
}

#[test]
fn test_nested_access_follows_static_chain() {
    let code = generate(
        "let
           var g: int = 1;
           fun f: int () g;
         in f();",
    );
    let body = code.iter().position(|line| line == "function0:").unwrap();
    assert_eq!(
        &code[body + 3..body + 8],
        &["lfp", "lw", "push -2", "add", "lw"]
    );
}

#[test]
fn test_class_dispatch_table_and_new() {
    let code = generate(
        "let
           class A (x: int) {
             fun get: int () x;
             fun twice: int () x + x;
           }
           var a: A = new A(3);
         in a.get();",
    );

    let dispatch: Vec<&str> = code
        .iter()
        .skip(1)
        .take(15)
        .map(String::as_str)
        .collect();
    assert_eq!(
        dispatch,
        vec![
            "lhp",
            "push function0",
            "lhp",
            "sw",
            "lhp",
            "push 1",
            "add",
            "shp",
            "push function1",
            "lhp",
            "sw",
            "lhp",
            "push 1",
            "add",
            "shp",
        ]
    );

    let new_start = 16;
    assert_eq!(
        &code[new_start..new_start + 19],
        &[
            "push 3",
            "lhp",
            "sw",
            "lhp",
            "push 1",
            "add",
            "shp",
            "push 10000",
            "push -2",
            "add",
            "lw",
            "lhp",
            "sw",
            "lhp",
            "lhp",
            "push 1",
            "add",
            "shp",
            "lfp",
        ]
    );
}

#[test]
fn test_method_call_loads_dispatch_pointer() {
    let code = generate(
        "let
           class A () { fun m: int () 1; fun n: int () 2; }
           var a: A = new A();
         in a.n();",
    );
    let halt = code.iter().position(|line| line == "halt").unwrap();
    assert_eq!(
        &code[halt - 13..halt],
        &[
            "lfp", "lfp", "push -3", "add", "lw", "stm", "ltm", "ltm", "lw", "push 1", "add",
            "lw", "js",
        ]
    );
}

#[test]
fn test_inherited_method_keeps_parent_label() {
    let code = generate(
        "let
           class A () { fun m: int () 1; fun n: int () 2; }
           class B extends A () { fun n: int () 3; }
         in 0;",
    );
    let second_table = code
        .iter()
        .enumerate()
        .filter(|(_, line)| *line == "lhp")
        .map(|(index, _)| index)
        .nth(5)
        .unwrap();
    assert_eq!(code[second_table + 1], "push function0");
    assert_eq!(code[second_table + 8], "push function2");
}

#[test]
fn test_unresolved_use_is_an_invariant_violation() {
    let program = parse(tokenize("x;").unwrap()).unwrap();
    let error = compile(&program, &SemanticContext::default()).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Internal);
}
