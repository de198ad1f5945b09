//! Type checking module.
//!
//! Runs after the symbol table pass and computes a type for every
//! expression of the resolved tree:
//!
//! - Verifying operands, conditions and initializers against the subtype relation
//! - Checking arity and argument types of calls, method calls and `new`
//! - Checking that overriding members are subtypes of what they override
//! - Rejecting functions, methods and classes used as plain values
//!
//! Errors are accumulated; a bad declaration never stops its siblings from
//! being checked.

pub mod type_checker;
pub mod type_rels;

#[cfg(test)]
mod tests;
