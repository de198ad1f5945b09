/// AST (Abstract Syntax Tree) module
/// Contains all definitions related to the tree every pass walks
///
/// Submodules:
/// - ast: Program roots and the generic `NodeRef` traversal view
/// - expressions: Definitions for the expression kinds
/// - declarations: Definitions for variable, function, class and member declarations
/// - types: Type annotations and the computed type representation
/// - printer: Indented debug rendering of a tree
pub mod ast;
pub mod declarations;
pub mod expressions;
pub mod printer;
pub mod types;
