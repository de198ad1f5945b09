//! Code generation module.
//!
//! Lowers the resolved, type-checked tree to assembly for the stack
//! machine in `svm`.
//!
//! Submodules:
//! - compiler: Generator state, labels, the shared branch emitter and the entry point
//! - decl: Declarations (variables, function bodies, class dispatch tables)
//! - expr: Expressions, calls and object creation

pub mod compiler;
pub mod decl;
pub mod expr;

#[cfg(test)]
mod tests;
