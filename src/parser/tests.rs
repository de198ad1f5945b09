//! Unit tests for the parser module.
//!
//! This module contains tests for parsing various language constructs including:
//! - Programs with and without declarations
//! - Variable, function and class declarations
//! - Operator precedence and associativity
//! - Function types in annotations
//! - Syntax errors

use crate::{
    ast::{
        ast::Program,
        declarations::Dec,
        expressions::{BinaryOp, Expr},
        types::TypeNode,
    },
    errors::errors::ErrorImpl,
    lexer::lexer::tokenize,
};

use super::parser::parse;

fn parse_source(source: &str) -> Program {
    parse(tokenize(source).unwrap()).unwrap()
}

fn parse_exp(source: &str) -> Expr {
    match parse_source(source) {
        Program::Exp(exp) => exp,
        Program::LetIn(_) => panic!("expected a bare expression"),
    }
}

fn parse_decs(source: &str) -> Vec<Dec> {
    match parse_source(source) {
        Program::LetIn(prog) => prog.decs,
        Program::Exp(_) => panic!("expected a let-in program"),
    }
}

#[test]
fn test_parse_bare_expression() {
    let exp = parse_exp("42;");
    assert!(matches!(exp, Expr::Int(ref int) if int.value == 42));
}

#[test]
fn test_parse_trailing_semicolon_is_optional() {
    let exp = parse_exp("true");
    assert!(matches!(exp, Expr::Bool(ref b) if b.value));
}

#[test]
fn test_parse_variable_declaration() {
    let decs = parse_decs("let var x: int = 5; in x;");
    assert_eq!(decs.len(), 1);
    match &decs[0] {
        Dec::Var(var) => {
            assert_eq!(var.id, "x");
            assert_eq!(var.ty, TypeNode::Int);
            assert!(matches!(var.exp, Expr::Int(ref int) if int.value == 5));
        }
        other => panic!("expected a variable, got {:?}", other),
    }
}

#[test]
fn test_parse_function_declaration() {
    let decs = parse_decs(
        "let
           fun add: int (a: int, b: int) a + b;
         in add(1, 2);",
    );

    match &decs[0] {
        Dec::Fun(fun) => {
            assert_eq!(fun.id, "add");
            assert_eq!(fun.ret, TypeNode::Int);
            assert_eq!(fun.params.len(), 2);
            assert_eq!(fun.params[1].id, "b");
            assert!(fun.decs.is_empty());
            assert!(matches!(fun.body, Expr::Binary(ref bin) if bin.op == BinaryOp::Plus));
        }
        other => panic!("expected a function, got {:?}", other),
    }
}

#[test]
fn test_parse_function_with_local_declarations() {
    let decs = parse_decs(
        "let
           fun f: int ()
             let var y: int = 1; fun g: bool () true;
             in y;
         in f();",
    );

    match &decs[0] {
        Dec::Fun(fun) => {
            assert!(fun.params.is_empty());
            assert_eq!(fun.decs.len(), 2);
            assert_eq!(fun.decs[1].id(), "g");
        }
        other => panic!("expected a function, got {:?}", other),
    }
}

#[test]
fn test_parse_higher_order_parameter() {
    let decs = parse_decs(
        "let
           fun apply: int (f: (int, bool) -> int, x: int) f(x, true);
         in 0;",
    );

    match &decs[0] {
        Dec::Fun(fun) => assert_eq!(
            fun.params[0].ty,
            TypeNode::arrow(vec![TypeNode::Int, TypeNode::Bool], TypeNode::Int)
        ),
        other => panic!("expected a function, got {:?}", other),
    }
}

#[test]
fn test_parse_class_declarations() {
    let decs = parse_decs(
        "let
           class Account (balance: int) {
             fun get: int () balance;
           }
           class Savings extends Account (rate: int) {
             fun get: int () balance + rate;
             fun owner: Account () null;
           }
           var s: Savings = new Savings(10, 2);
         in s.get();",
    );

    assert_eq!(decs.len(), 3);
    match &decs[1] {
        Dec::Class(class) => {
            assert_eq!(class.id, "Savings");
            assert_eq!(class.super_id.as_deref(), Some("Account"));
            assert_eq!(class.fields.len(), 1);
            assert_eq!(class.methods.len(), 2);
            assert_eq!(class.methods[1].ret, TypeNode::reference("Account"));
            assert!(class.methods[1].offset.is_none());
        }
        other => panic!("expected a class, got {:?}", other),
    }
    assert!(matches!(&decs[2], Dec::Var(var) if matches!(var.exp, Expr::New(_))));
}

#[test]
fn test_parse_method_call() {
    let exp = parse_exp("o.m(1, x);");
    match exp {
        Expr::ClassCall(call) => {
            assert_eq!(call.object_id, "o");
            assert_eq!(call.method_id, "m");
            assert_eq!(call.args.len(), 2);
        }
        other => panic!("expected a method call, got {:?}", other),
    }
}

#[test]
fn test_parse_multiplication_binds_tighter() {
    let exp = parse_exp("1 + 2 * 3;");
    match exp {
        Expr::Binary(plus) => {
            assert_eq!(plus.op, BinaryOp::Plus);
            assert!(matches!(*plus.right, Expr::Binary(ref times) if times.op == BinaryOp::Times));
        }
        other => panic!("expected a binary expression, got {:?}", other),
    }
}

#[test]
fn test_parse_subtraction_is_left_associative() {
    let exp = parse_exp("10 - 2 - 3;");
    match exp {
        Expr::Binary(outer) => {
            assert_eq!(outer.op, BinaryOp::Minus);
            assert!(matches!(*outer.left, Expr::Binary(ref inner) if inner.op == BinaryOp::Minus));
            assert!(matches!(*outer.right, Expr::Int(ref int) if int.value == 3));
        }
        other => panic!("expected a binary expression, got {:?}", other),
    }
}

#[test]
fn test_parse_not_binds_looser_than_equality() {
    let exp = parse_exp("!1 == 2 && false;");
    match exp {
        Expr::Binary(and) => {
            assert_eq!(and.op, BinaryOp::And);
            match *and.left {
                Expr::Not(ref not) => {
                    assert!(matches!(*not.arg, Expr::Binary(ref eq) if eq.op == BinaryOp::Equal))
                }
                ref other => panic!("expected a negation, got {:?}", other),
            }
        }
        other => panic!("expected a binary expression, got {:?}", other),
    }
}

#[test]
fn test_parse_negative_literal() {
    let exp = parse_exp("3 - -4;");
    match exp {
        Expr::Binary(minus) => {
            assert!(matches!(*minus.right, Expr::Int(ref int) if int.value == -4))
        }
        other => panic!("expected a binary expression, got {:?}", other),
    }
}

#[test]
fn test_parse_if_and_print() {
    let exp = parse_exp("print(if x <= 2 then { 1 } else { 0 });");
    match exp {
        Expr::Print(print) => assert!(matches!(*print.exp, Expr::If(_))),
        other => panic!("expected print, got {:?}", other),
    }
}

#[test]
fn test_parse_records_lines() {
    let decs = parse_decs("let\n  var a: int = 1;\n  var b: bool =\n true;\nin a;");
    assert_eq!(decs[0].line(), 2);
    assert_eq!(decs[1].line(), 3);
}

#[test]
fn test_parse_parameter_and_field_lines() {
    let decs = parse_decs(
        "let\n  class P (x: int,\n    y: bool) {}\n  fun f: int (a: int,\n    b: bool) a;\nin 0;",
    );

    match &decs[1] {
        Dec::Fun(fun) => {
            assert_eq!((fun.params[0].id.as_str(), fun.params[0].line), ("a", 4));
            assert_eq!((fun.params[1].id.as_str(), fun.params[1].line), ("b", 5));
        }
        other => panic!("expected a function, got {:?}", other),
    }
    match &decs[0] {
        Dec::Class(class) => {
            assert_eq!((class.fields[0].id.as_str(), class.fields[0].line), ("x", 2));
            assert_eq!((class.fields[1].id.as_str(), class.fields[1].line), ("y", 3));
            assert_eq!(class.fields[1].ty, TypeNode::Bool);
        }
        other => panic!("expected a class, got {:?}", other),
    }
}

#[test]
fn test_parse_if_without_else_fails() {
    let error = parse(tokenize("if true then { 1 };").unwrap()).unwrap_err();
    assert!(matches!(
        error.get_impl(),
        ErrorImpl::UnexpectedTokenDetailed { .. }
    ));
}

#[test]
fn test_parse_missing_in_fails() {
    let result = parse(tokenize("let var x: int = 1; x;").unwrap());
    assert!(result.is_err());
}

#[test]
fn test_parse_trailing_tokens_fail() {
    let error = parse(tokenize("1; 2;").unwrap()).unwrap_err();
    assert_eq!(error.get_line(), 1);
    assert!(matches!(
        error.get_impl(),
        ErrorImpl::UnexpectedTokenDetailed { token, .. } if token == "2"
    ));
}

#[test]
fn test_parse_number_out_of_range() {
    let error = parse(tokenize("99999999999;").unwrap()).unwrap_err();
    assert!(matches!(error.get_impl(), ErrorImpl::NumberParseError { .. }));
}

#[test]
fn test_parse_class_after_declaration_fails() {
    let result = parse(tokenize("let var x: int = 1; class A () {} in x;").unwrap());
    assert!(result.is_err());
}
