//! Type annotations and the types computed by the semantic passes.
//!
//! The same representation serves both: the parser produces `Int`, `Bool`,
//! `Ref` and `Arrow` annotations, the symbol table pass adds `Method` and
//! `Class` types to its entries, and the type checker yields `Empty` for the
//! `null` literal.

use std::fmt::Display;

/// A function type `(p1, ..., pn) -> ret`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrowType {
    pub params: Vec<TypeNode>,
    pub ret: Box<TypeNode>,
}

impl ArrowType {
    pub fn new(params: Vec<TypeNode>, ret: TypeNode) -> Self {
        ArrowType {
            params,
            ret: Box::new(ret),
        }
    }
}

/// The type of a class declaration, indexed by member offset.
///
/// `all_fields[k]` is the field stored at offset `-(k + 1)`, `all_methods[i]`
/// the method in dispatch slot `i`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClassType {
    pub all_fields: Vec<TypeNode>,
    pub all_methods: Vec<ArrowType>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeNode {
    Int,
    Bool,
    Arrow(ArrowType),
    /// Reference to an object of the named class.
    Ref(String),
    /// Wrapper marking the arrow type of a method.
    Method(ArrowType),
    Class(ClassType),
    /// The type of `null`; below every `Ref`.
    Empty,
}

impl TypeNode {
    pub fn arrow(params: Vec<TypeNode>, ret: TypeNode) -> Self {
        TypeNode::Arrow(ArrowType::new(params, ret))
    }

    pub fn reference(class: &str) -> Self {
        TypeNode::Ref(class.to_string())
    }

    /// Whether a value of this type can live in a frame slot.
    pub fn is_value(&self) -> bool {
        matches!(
            self,
            TypeNode::Int | TypeNode::Bool | TypeNode::Ref(_) | TypeNode::Empty
        )
    }

    /// The arrow type of something callable, unwrapping method types.
    pub fn as_callable(&self) -> Option<&ArrowType> {
        match self {
            TypeNode::Arrow(arrow) | TypeNode::Method(arrow) => Some(arrow),
            _ => None,
        }
    }
}

impl Display for ArrowType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(")?;
        for (index, param) in self.params.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", param)?;
        }
        write!(f, ") -> {}", self.ret)
    }
}

impl Display for TypeNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TypeNode::Int => write!(f, "int"),
            TypeNode::Bool => write!(f, "bool"),
            TypeNode::Arrow(arrow) => write!(f, "{}", arrow),
            TypeNode::Ref(class) => write!(f, "{}", class),
            TypeNode::Method(arrow) => write!(f, "method {}", arrow),
            TypeNode::Class(class) => write!(
                f,
                "class({} fields, {} methods)",
                class.all_fields.len(),
                class.all_methods.len()
            ),
            TypeNode::Empty => write!(f, "null"),
        }
    }
}
