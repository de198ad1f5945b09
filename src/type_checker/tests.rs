use crate::{
    ast::types::{ArrowType, TypeNode},
    errors::errors::{Error, ErrorImpl, ErrorKind},
    lexer::lexer::tokenize,
    parser::parser::parse,
    symbol_table::symbol_table::build_symbol_table,
};

use super::{
    type_checker::{type_check, TypeCheckResult},
    type_rels::TypeRels,
};

/// Runs both semantic passes, returning the symbol table errors separately.
fn check(source: &str) -> (Vec<Error>, TypeCheckResult) {
    let mut program = parse(tokenize(source).unwrap()).unwrap();
    let symbols = build_symbol_table(&mut program);
    let result = type_check(&program, &symbols.context);
    (symbols.errors, result)
}

fn check_clean(source: &str) -> TypeCheckResult {
    let (symbol_errors, result) = check(source);
    assert!(symbol_errors.is_empty(), "{:?}", symbol_errors);
    result
}

fn mismatch_message(error: &Error) -> &str {
    match error.get_impl() {
        ErrorImpl::TypeMismatch { message } => message,
        other => panic!("expected a type mismatch, got {:?}", other),
    }
}

fn hierarchy() -> TypeRels {
    let mut rels = TypeRels::new();
    rels.set_super("B", "A");
    rels.set_super("C", "B");
    rels.set_super("D", "A");
    rels
}

#[test]
fn test_primitive_subtyping() {
    let rels = TypeRels::new();
    assert!(rels.is_subtype(&TypeNode::Bool, &TypeNode::Int));
    assert!(!rels.is_subtype(&TypeNode::Int, &TypeNode::Bool));
    assert!(rels.is_subtype(&TypeNode::Empty, &TypeNode::reference("A")));
    assert!(!rels.is_subtype(&TypeNode::reference("A"), &TypeNode::Empty));
    assert!(!rels.is_subtype(&TypeNode::Empty, &TypeNode::Int));
}

#[test]
fn test_subtype_reflexivity() {
    let rels = hierarchy();
    let types = vec![
        TypeNode::Int,
        TypeNode::Bool,
        TypeNode::Empty,
        TypeNode::reference("A"),
        TypeNode::reference("C"),
        TypeNode::arrow(vec![], TypeNode::Int),
        TypeNode::arrow(vec![TypeNode::Int, TypeNode::Bool], TypeNode::Bool),
        TypeNode::arrow(vec![TypeNode::reference("B")], TypeNode::reference("A")),
        TypeNode::arrow(
            vec![TypeNode::arrow(vec![TypeNode::reference("C")], TypeNode::Int)],
            TypeNode::reference("D"),
        ),
        TypeNode::Method(ArrowType::new(vec![TypeNode::reference("A")], TypeNode::Bool)),
    ];

    for ty in &types {
        assert!(rels.is_subtype(ty, ty), "{:?} is not a subtype of itself", ty);
    }
}

#[test]
fn test_unrelated_classes_are_mutually_incompatible() {
    let rels = hierarchy();
    let (b, d) = (TypeNode::reference("B"), TypeNode::reference("D"));
    assert!(!rels.is_subtype(&b, &d));
    assert!(!rels.is_subtype(&d, &b));
}

#[test]
fn test_reference_subtyping_walks_ancestors() {
    let rels = hierarchy();
    let (a, c, d) = (
        TypeNode::reference("A"),
        TypeNode::reference("C"),
        TypeNode::reference("D"),
    );
    assert!(rels.is_subtype(&c, &a));
    assert!(rels.is_subtype(&c, &c));
    assert!(!rels.is_subtype(&a, &c));
    assert!(!rels.is_subtype(&c, &d));
}

#[test]
fn test_arrow_subtyping_variance() {
    let rels = hierarchy();
    let takes_a_gives_c = TypeNode::arrow(vec![TypeNode::reference("A")], TypeNode::reference("C"));
    let takes_b_gives_a = TypeNode::arrow(vec![TypeNode::reference("B")], TypeNode::reference("A"));

    assert!(rels.is_subtype(&takes_a_gives_c, &takes_b_gives_a));
    assert!(!rels.is_subtype(&takes_b_gives_a, &takes_a_gives_c));
    assert!(!rels.is_subtype(
        &TypeNode::arrow(vec![], TypeNode::Int),
        &TypeNode::arrow(vec![TypeNode::Int], TypeNode::Int)
    ));
}

#[test]
fn test_lowest_common_ancestor() {
    let rels = hierarchy();
    let reference = TypeNode::reference;

    assert_eq!(
        rels.lowest_common_ancestor(&TypeNode::Bool, &TypeNode::Bool),
        Some(TypeNode::Bool)
    );
    assert_eq!(
        rels.lowest_common_ancestor(&TypeNode::Bool, &TypeNode::Int),
        Some(TypeNode::Int)
    );
    assert_eq!(
        rels.lowest_common_ancestor(&TypeNode::Empty, &reference("B")),
        Some(reference("B"))
    );
    assert_eq!(
        rels.lowest_common_ancestor(&reference("C"), &reference("D")),
        Some(reference("A"))
    );
    assert_eq!(
        rels.lowest_common_ancestor(&reference("C"), &reference("B")),
        Some(reference("B"))
    );
    assert_eq!(
        rels.lowest_common_ancestor(&reference("A"), &reference("Z")),
        None
    );
    assert_eq!(rels.lowest_common_ancestor(&TypeNode::Int, &reference("A")), None);
}

#[test]
fn test_main_type() {
    let result = check_clean("let var x: int = 5; in x + 1;");
    assert!(result.errors.is_empty());
    assert_eq!(result.main_type, Some(TypeNode::Int));

    let result = check_clean("1 <= 2 || false;");
    assert_eq!(result.main_type, Some(TypeNode::Bool));
}

#[test]
fn test_bool_is_accepted_as_int() {
    let result = check_clean("let var x: int = true; in x;");
    assert!(result.errors.is_empty());
}

#[test]
fn test_incompatible_variable_value() {
    let result = check_clean("let var x: bool = 5; in x;");
    assert_eq!(result.errors.len(), 1);
    assert_eq!(
        mismatch_message(&result.errors[0]),
        "Incompatible value for variable x"
    );
    assert_eq!(result.main_type, Some(TypeNode::Bool));
}

#[test]
fn test_wrong_return_type() {
    let result = check_clean("let fun f: bool () 5; in 1;");
    assert_eq!(mismatch_message(&result.errors[0]), "Wrong return type for function f");
}

#[test]
fn test_errors_in_sibling_declarations_accumulate() {
    let result = check_clean(
        "let
           var a: bool = 1;
           var b: int = true && 3;
           fun f: int () if 1 then { 1 } else { 2 };
         in !5;",
    );
    let messages: Vec<&str> = result.errors.iter().map(mismatch_message).collect();
    assert_eq!(
        messages,
        vec![
            "Incompatible value for variable a",
            "Non boolean values in &&",
            "Non boolean condition in if",
            "Non boolean after !",
        ]
    );
    assert_eq!(result.main_type, None);
}

#[test]
fn test_arity_mismatch() {
    let result = check_clean("let fun f: int (a: int) a; in f(1, 2);");
    assert_eq!(
        result.errors[0].get_impl(),
        &ErrorImpl::ArityMismatch {
            callee: String::from("f"),
            expected: 1,
            received: 2,
        }
    );
    assert_eq!(result.main_type, None);
}

#[test]
fn test_argument_type_mismatch_names_the_argument() {
    let result = check_clean("let fun f: int (a: int, b: bool) a; in f(1, 2);");
    assert_eq!(
        result.errors[0].get_impl(),
        &ErrorImpl::ArgumentTypeMismatch {
            callee: String::from("f"),
            index: 2,
            expected: String::from("bool"),
            received: String::from("int"),
        }
    );
}

#[test]
fn test_function_identifier_is_not_a_value() {
    let result = check_clean(
        "let
           fun apply: int (g: (int) -> int, x: int) g(x);
           fun inc: int (n: int) n + 1;
         in apply(inc, 4);",
    );
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].kind(), ErrorKind::InvalidUsage);
}

#[test]
fn test_calling_a_variable() {
    let result = check_clean("let var x: int = 1; in x(2);");
    assert_eq!(
        result.errors[0].get_impl(),
        &ErrorImpl::InvalidUsage {
            message: String::from("Invocation of a non-function x"),
        }
    );
}

#[test]
fn test_if_branches_join_to_common_superclass() {
    let result = check_clean(
        "let
           class A () {}
           class B extends A () {}
           class C extends A () {}
         in if true then { new B() } else { new C() };",
    );
    assert!(result.errors.is_empty());
    assert_eq!(result.main_type, Some(TypeNode::reference("A")));
}

#[test]
fn test_if_branches_without_common_type() {
    let result = check_clean("if true then { 1 } else { null };");
    assert_eq!(
        mismatch_message(&result.errors[0]),
        "Incompatible types in then-else branches"
    );
}

#[test]
fn test_equality_of_unrelated_classes() {
    let result = check_clean(
        "let
           class A () {}
           class B () {}
           var a: A = new A();
           var b: B = new B();
         in a == b;",
    );
    assert_eq!(mismatch_message(&result.errors[0]), "Incompatible types in ==");
}

#[test]
fn test_new_checks_constructor_arguments() {
    let result = check_clean(
        "let
           class P (x: int, flag: bool) {}
         in new P(true, 3);",
    );
    assert_eq!(
        result.errors[0].get_impl(),
        &ErrorImpl::ArgumentTypeMismatch {
            callee: String::from("P"),
            index: 2,
            expected: String::from("bool"),
            received: String::from("int"),
        }
    );
}

#[test]
fn test_method_calls_and_subclass_arguments() {
    let result = check_clean(
        "let
           class Animal (legs: int) { fun count: int () legs; }
           class Dog extends Animal () {}
           class Vet () { fun check: int (a: Animal) a.count(); }
           var v: Vet = new Vet();
         in v.check(new Dog(4));",
    );
    assert!(result.errors.is_empty(), "{:?}", result.errors);
    assert_eq!(result.main_type, Some(TypeNode::Int));
}

#[test]
fn test_method_body_and_override_checks() {
    let result = check_clean(
        "let
           class A (x: bool) {
             fun get: int () x;
             fun same: bool (o: A) true;
           }
           class B extends A (x: int) {
             fun get: bool () 1;
             fun same: bool (o: B) false;
           }
         in 0;",
    );
    let kinds: Vec<ErrorKind> = result.errors.iter().map(|error| error.kind()).collect();
    assert_eq!(
        kinds,
        vec![
            ErrorKind::OverrideIncompatibility,
            ErrorKind::OverrideIncompatibility,
            ErrorKind::TypeMismatch,
        ]
    );
    assert_eq!(
        result.errors[0].get_impl(),
        &ErrorImpl::OverrideIncompatibility {
            member: String::from("x"),
            class: String::from("B"),
        }
    );
    assert_eq!(
        result.errors[1].get_impl(),
        &ErrorImpl::OverrideIncompatibility {
            member: String::from("same"),
            class: String::from("B"),
        }
    );
    assert_eq!(mismatch_message(&result.errors[2]), "Wrong return type for method get");
}

#[test]
fn test_unresolved_names_are_not_reported_twice() {
    let (symbol_errors, result) = check("let var a: int = b + 1; var o: Z = null; in a;");
    assert_eq!(symbol_errors.len(), 2);
    assert!(result.errors.is_empty());
    assert_eq!(result.main_type, Some(TypeNode::Int));
}
