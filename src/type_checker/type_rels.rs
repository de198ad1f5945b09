//! The subtype relation.
//!
//! `bool <: int`, `null <: C` for every class `C`, class references follow
//! the superclass chain and arrow types are contravariant in their
//! parameters and covariant in their result. Nothing else is related.

use std::collections::HashMap;

use crate::ast::types::{ArrowType, TypeNode};

/// Class hierarchy, from class name to its direct superclass.
#[derive(Debug, Default, Clone)]
pub struct TypeRels {
    super_type: HashMap<String, String>,
}

impl TypeRels {
    pub fn new() -> Self {
        TypeRels::default()
    }

    pub fn set_super(&mut self, class: &str, superclass: &str) {
        self.super_type
            .insert(class.to_string(), superclass.to_string());
    }

    pub fn super_of(&self, class: &str) -> Option<&str> {
        self.super_type.get(class).map(String::as_str)
    }

    /// Proper ancestors of `class`, nearest first.
    pub fn ancestors<'a>(&'a self, class: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        std::iter::successors(self.super_of(class), move |current| self.super_of(current))
    }

    pub fn is_subtype(&self, a: &TypeNode, b: &TypeNode) -> bool {
        match (a, b) {
            (TypeNode::Bool, TypeNode::Bool | TypeNode::Int) => true,
            (TypeNode::Int, TypeNode::Int) => true,
            (TypeNode::Empty, TypeNode::Empty | TypeNode::Ref(_)) => true,
            (TypeNode::Ref(class_a), TypeNode::Ref(class_b)) => {
                class_a == class_b || self.ancestors(class_a).any(|ancestor| ancestor == class_b)
            }
            (TypeNode::Arrow(fun_a), TypeNode::Arrow(fun_b))
            | (TypeNode::Method(fun_a), TypeNode::Method(fun_b)) => {
                self.is_arrow_subtype(fun_a, fun_b)
            }
            _ => false,
        }
    }

    pub fn is_arrow_subtype(&self, a: &ArrowType, b: &ArrowType) -> bool {
        a.params.len() == b.params.len()
            && self.is_subtype(&a.ret, &b.ret)
            && a
                .params
                .iter()
                .zip(b.params.iter())
                .all(|(param_a, param_b)| self.is_subtype(param_b, param_a))
    }

    /// Smallest type both `a` and `b` are subtypes of, used to type `if`.
    pub fn lowest_common_ancestor(&self, a: &TypeNode, b: &TypeNode) -> Option<TypeNode> {
        if self.is_subtype(a, &TypeNode::Int) && self.is_subtype(b, &TypeNode::Int) {
            return if *a == TypeNode::Int || *b == TypeNode::Int {
                Some(TypeNode::Int)
            } else {
                Some(TypeNode::Bool)
            };
        }

        match (a, b) {
            (TypeNode::Empty, TypeNode::Empty | TypeNode::Ref(_)) => Some(b.clone()),
            (TypeNode::Ref(_), TypeNode::Empty) => Some(a.clone()),
            (TypeNode::Ref(class_a), TypeNode::Ref(class_b)) if class_a == class_b => {
                Some(a.clone())
            }
            (TypeNode::Ref(class_a), TypeNode::Ref(_)) => self
                .ancestors(class_a)
                .map(TypeNode::reference)
                .find(|ancestor| self.is_subtype(b, ancestor)),
            _ => None,
        }
    }
}
