//! Parser module for building an Abstract Syntax Tree (AST).
//!
//! This module contains the parser that transforms a stream of tokens
//! into an Abstract Syntax Tree. It uses a Pratt parser for expressions
//! with proper operator precedence and handles:
//!
//! - Declaration parsing (classes, variables, functions and methods)
//! - Expression parsing (binary ops, calls, method calls, literals)
//! - Type parsing for type annotations, function types included
//!
//! The parser uses NUD (null denotation) and LED (left denotation) functions
//! for expression parsing with binding power for precedence handling. The
//! first syntax error stops parsing.

pub mod decl;
pub mod expr;
pub mod lookups;
pub mod parser;
pub mod types;

#[cfg(test)]
mod tests;
