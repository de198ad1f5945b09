//! Declaration nodes: variables, functions, classes and their members.

use crate::symbol_table::entry::EntryId;

use super::{
    expressions::Expr,
    types::{ArrowType, TypeNode},
};

#[derive(Debug, Clone)]
pub struct VarDec {
    pub id: String,
    pub ty: TypeNode,
    pub exp: Expr,
    pub line: u32,
}

#[derive(Debug, Clone)]
pub struct ParamDec {
    pub id: String,
    pub ty: TypeNode,
    pub line: u32,
}

#[derive(Debug, Clone)]
pub struct FunDec {
    pub id: String,
    pub ret: TypeNode,
    pub params: Vec<ParamDec>,
    pub decs: Vec<Dec>,
    pub body: Expr,
    pub line: u32,
}

impl FunDec {
    pub fn arrow_type(&self) -> ArrowType {
        ArrowType::new(
            self.params.iter().map(|param| param.ty.clone()).collect(),
            self.ret.clone(),
        )
    }
}

#[derive(Debug, Clone)]
pub struct FieldDec {
    pub id: String,
    pub ty: TypeNode,
    pub line: u32,
    /// Assigned by the symbol table pass; `-(k + 1)` for the k-th field slot.
    pub offset: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct MethodDec {
    pub id: String,
    pub ret: TypeNode,
    pub params: Vec<ParamDec>,
    pub decs: Vec<Dec>,
    pub body: Expr,
    pub line: u32,
    /// Method type, set by the symbol table pass.
    pub ty: Option<TypeNode>,
    /// Dispatch table slot, set by the symbol table pass.
    pub offset: Option<i32>,
}

impl MethodDec {
    pub fn arrow_type(&self) -> ArrowType {
        ArrowType::new(
            self.params.iter().map(|param| param.ty.clone()).collect(),
            self.ret.clone(),
        )
    }

    pub fn set_type(&mut self, ty: TypeNode) {
        self.ty = Some(ty);
    }
}

#[derive(Debug, Clone)]
pub struct ClassDec {
    pub id: String,
    pub super_id: Option<String>,
    pub fields: Vec<FieldDec>,
    pub methods: Vec<MethodDec>,
    pub line: u32,
    pub entry: Option<EntryId>,
    pub super_entry: Option<EntryId>,
}

#[derive(Debug, Clone)]
pub enum Dec {
    Var(VarDec),
    Fun(FunDec),
    Class(ClassDec),
}

impl Dec {
    pub fn line(&self) -> u32 {
        match self {
            Dec::Var(dec) => dec.line,
            Dec::Fun(dec) => dec.line,
            Dec::Class(dec) => dec.line,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Dec::Var(dec) => &dec.id,
            Dec::Fun(dec) => &dec.id,
            Dec::Class(dec) => &dec.id,
        }
    }

    /// The declared type; classes only get theirs from the symbol table.
    pub fn get_type(&self) -> Option<TypeNode> {
        match self {
            Dec::Var(dec) => Some(dec.ty.clone()),
            Dec::Fun(dec) => Some(TypeNode::Arrow(dec.arrow_type())),
            Dec::Class(_) => None,
        }
    }
}
