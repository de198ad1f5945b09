use super::{
    declarations::{Dec, FieldDec, MethodDec, ParamDec},
    expressions::Expr,
    types::TypeNode,
};

/// `let <decs> in <exp>`
#[derive(Debug, Clone)]
pub struct ProgLetIn {
    pub decs: Vec<Dec>,
    pub exp: Expr,
    pub line: u32,
}

/// Root of the tree handed over by the parser.
#[derive(Debug, Clone)]
pub enum Program {
    LetIn(ProgLetIn),
    /// A program made of a single expression, without declarations.
    Exp(Expr),
}

impl Program {
    pub fn line(&self) -> u32 {
        match self {
            Program::LetIn(prog) => prog.line,
            Program::Exp(exp) => exp.line(),
        }
    }

    pub fn as_node(&self) -> NodeRef<'_> {
        NodeRef::Program(self)
    }
}

/// Borrowed view over any node kind, used for generic traversal.
///
/// Type annotations carry no line of their own and report the line of the
/// node that owns them.
#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    Program(&'a Program),
    Dec(&'a Dec),
    Field(&'a FieldDec),
    Method(&'a MethodDec),
    Param(&'a ParamDec),
    Expr(&'a Expr),
    Type(&'a TypeNode, u32),
}

impl<'a> NodeRef<'a> {
    pub fn line(&self) -> u32 {
        match self {
            NodeRef::Program(program) => program.line(),
            NodeRef::Dec(dec) => dec.line(),
            NodeRef::Field(field) => field.line,
            NodeRef::Method(method) => method.line,
            NodeRef::Param(param) => param.line,
            NodeRef::Expr(exp) => exp.line(),
            NodeRef::Type(_, line) => *line,
        }
    }

    /// Short description of the node itself, without its children.
    pub fn label(&self) -> String {
        match self {
            NodeRef::Program(Program::LetIn(_)) => "ProgLetIn".to_string(),
            NodeRef::Program(Program::Exp(_)) => "Prog".to_string(),
            NodeRef::Dec(Dec::Var(dec)) => format!("Var: {}", dec.id),
            NodeRef::Dec(Dec::Fun(dec)) => format!("Fun: {}", dec.id),
            NodeRef::Dec(Dec::Class(dec)) => match &dec.super_id {
                Some(super_id) => format!("Class: {} extends {}", dec.id, super_id),
                None => format!("Class: {}", dec.id),
            },
            NodeRef::Field(field) => format!("Field: {}", field.id),
            NodeRef::Method(method) => format!("Method: {}", method.id),
            NodeRef::Param(param) => format!("Par: {}", param.id),
            NodeRef::Expr(exp) => match exp {
                Expr::Int(e) => format!("Int: {}", e.value),
                Expr::Bool(e) => format!("Bool: {}", e.value),
                Expr::Null(_) => "Null".to_string(),
                Expr::Binary(e) => format!("Binary: {}", e.op.symbol()),
                Expr::Not(_) => "Not".to_string(),
                Expr::If(_) => "If".to_string(),
                Expr::Print(_) => "Print".to_string(),
                Expr::Id(e) => format!("Id: {}", e.id),
                Expr::Call(e) => format!("Call: {}", e.id),
                Expr::ClassCall(e) => format!("ClassCall: {}.{}", e.object_id, e.method_id),
                Expr::New(e) => format!("New: {}", e.class_id),
            },
            NodeRef::Type(ty, _) => format!("Type: {}", ty),
        }
    }

    pub fn children(&self) -> Vec<NodeRef<'a>> {
        match *self {
            NodeRef::Program(Program::LetIn(prog)) => prog
                .decs
                .iter()
                .map(NodeRef::Dec)
                .chain(std::iter::once(NodeRef::Expr(&prog.exp)))
                .collect(),
            NodeRef::Program(Program::Exp(exp)) => vec![NodeRef::Expr(exp)],
            NodeRef::Dec(Dec::Var(dec)) => {
                vec![NodeRef::Type(&dec.ty, dec.line), NodeRef::Expr(&dec.exp)]
            }
            NodeRef::Dec(Dec::Fun(dec)) => {
                let mut children = vec![NodeRef::Type(&dec.ret, dec.line)];
                children.extend(dec.params.iter().map(NodeRef::Param));
                children.extend(dec.decs.iter().map(NodeRef::Dec));
                children.push(NodeRef::Expr(&dec.body));
                children
            }
            NodeRef::Dec(Dec::Class(dec)) => dec
                .fields
                .iter()
                .map(NodeRef::Field)
                .chain(dec.methods.iter().map(NodeRef::Method))
                .collect(),
            NodeRef::Field(field) => vec![NodeRef::Type(&field.ty, field.line)],
            NodeRef::Method(method) => {
                let mut children = vec![NodeRef::Type(&method.ret, method.line)];
                children.extend(method.params.iter().map(NodeRef::Param));
                children.extend(method.decs.iter().map(NodeRef::Dec));
                children.push(NodeRef::Expr(&method.body));
                children
            }
            NodeRef::Param(param) => vec![NodeRef::Type(&param.ty, param.line)],
            NodeRef::Expr(exp) => match exp {
                Expr::Int(_) | Expr::Bool(_) | Expr::Null(_) | Expr::Id(_) => vec![],
                Expr::Binary(e) => vec![NodeRef::Expr(&e.left), NodeRef::Expr(&e.right)],
                Expr::Not(e) => vec![NodeRef::Expr(&e.arg)],
                Expr::If(e) => vec![
                    NodeRef::Expr(&e.cond),
                    NodeRef::Expr(&e.then_branch),
                    NodeRef::Expr(&e.else_branch),
                ],
                Expr::Print(e) => vec![NodeRef::Expr(&e.exp)],
                Expr::Call(e) => e.args.iter().map(NodeRef::Expr).collect(),
                Expr::ClassCall(e) => e.args.iter().map(NodeRef::Expr).collect(),
                Expr::New(e) => e.args.iter().map(NodeRef::Expr).collect(),
            },
            NodeRef::Type(_, _) => vec![],
        }
    }
}
