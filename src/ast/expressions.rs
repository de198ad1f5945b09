//! Expression nodes.
//!
//! Use-site nodes (`IdExpr`, `CallExpr`, `ClassCallExpr`, `NewExpr`) carry
//! resolution slots that start out empty and are filled by the symbol table
//! pass: the `EntryId` of the declaration they resolve to and the nesting
//! level the use-site sits at.

use crate::symbol_table::entry::EntryId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Plus,
    Minus,
    Times,
    Div,
    And,
    Or,
    Equal,
    LessEqual,
    GreaterEqual,
}

impl BinaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Plus => "+",
            BinaryOp::Minus => "-",
            BinaryOp::Times => "*",
            BinaryOp::Div => "/",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
            BinaryOp::Equal => "==",
            BinaryOp::LessEqual => "<=",
            BinaryOp::GreaterEqual => ">=",
        }
    }
}

#[derive(Debug, Clone)]
pub struct IntExpr {
    pub value: i32,
    pub line: u32,
}

#[derive(Debug, Clone)]
pub struct BoolExpr {
    pub value: bool,
    pub line: u32,
}

#[derive(Debug, Clone)]
pub struct NullExpr {
    pub line: u32,
}

#[derive(Debug, Clone)]
pub struct BinaryExpr {
    pub op: BinaryOp,
    pub left: Box<Expr>,
    pub right: Box<Expr>,
    pub line: u32,
}

#[derive(Debug, Clone)]
pub struct NotExpr {
    pub arg: Box<Expr>,
    pub line: u32,
}

#[derive(Debug, Clone)]
pub struct IfExpr {
    pub cond: Box<Expr>,
    pub then_branch: Box<Expr>,
    pub else_branch: Box<Expr>,
    pub line: u32,
}

#[derive(Debug, Clone)]
pub struct PrintExpr {
    pub exp: Box<Expr>,
    pub line: u32,
}

#[derive(Debug, Clone)]
pub struct IdExpr {
    pub id: String,
    pub line: u32,
    pub entry: Option<EntryId>,
    pub nesting_level: usize,
}

#[derive(Debug, Clone)]
pub struct CallExpr {
    pub id: String,
    pub args: Vec<Expr>,
    pub line: u32,
    pub entry: Option<EntryId>,
    pub nesting_level: usize,
}

/// `object.method(args)`
#[derive(Debug, Clone)]
pub struct ClassCallExpr {
    pub object_id: String,
    pub method_id: String,
    pub args: Vec<Expr>,
    pub line: u32,
    pub entry: Option<EntryId>,
    pub method_entry: Option<EntryId>,
    pub nesting_level: usize,
}

#[derive(Debug, Clone)]
pub struct NewExpr {
    pub class_id: String,
    pub args: Vec<Expr>,
    pub line: u32,
    pub entry: Option<EntryId>,
}

#[derive(Debug, Clone)]
pub enum Expr {
    Int(IntExpr),
    Bool(BoolExpr),
    Null(NullExpr),
    Binary(BinaryExpr),
    Not(NotExpr),
    If(IfExpr),
    Print(PrintExpr),
    Id(IdExpr),
    Call(CallExpr),
    ClassCall(ClassCallExpr),
    New(NewExpr),
}

impl Expr {
    pub fn line(&self) -> u32 {
        match self {
            Expr::Int(e) => e.line,
            Expr::Bool(e) => e.line,
            Expr::Null(e) => e.line,
            Expr::Binary(e) => e.line,
            Expr::Not(e) => e.line,
            Expr::If(e) => e.line,
            Expr::Print(e) => e.line,
            Expr::Id(e) => e.line,
            Expr::Call(e) => e.line,
            Expr::ClassCall(e) => e.line,
            Expr::New(e) => e.line,
        }
    }

    pub fn binary(op: BinaryOp, left: Expr, right: Expr, line: u32) -> Self {
        Expr::Binary(BinaryExpr {
            op,
            left: Box::new(left),
            right: Box::new(right),
            line,
        })
    }

    pub fn id(id: &str, line: u32) -> Self {
        Expr::Id(IdExpr {
            id: id.to_string(),
            line,
            entry: None,
            nesting_level: 0,
        })
    }

    pub fn call(id: &str, args: Vec<Expr>, line: u32) -> Self {
        Expr::Call(CallExpr {
            id: id.to_string(),
            args,
            line,
            entry: None,
            nesting_level: 0,
        })
    }

    pub fn class_call(object_id: &str, method_id: &str, args: Vec<Expr>, line: u32) -> Self {
        Expr::ClassCall(ClassCallExpr {
            object_id: object_id.to_string(),
            method_id: method_id.to_string(),
            args,
            line,
            entry: None,
            method_entry: None,
            nesting_level: 0,
        })
    }

    pub fn new_object(class_id: &str, args: Vec<Expr>, line: u32) -> Self {
        Expr::New(NewExpr {
            class_id: class_id.to_string(),
            args,
            line,
            entry: None,
        })
    }
}
