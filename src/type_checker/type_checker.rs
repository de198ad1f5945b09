use tracing::{debug, trace, warn};

use crate::{
    ast::{
        ast::Program,
        declarations::{ClassDec, Dec, FunDec, MethodDec, VarDec},
        expressions::{BinaryOp, Expr},
        types::{ArrowType, ClassType, TypeNode},
    },
    errors::errors::{Error, ErrorImpl},
    symbol_table::{entry::EntryId, symbol_table::SemanticContext},
};

use super::type_rels::TypeRels;

#[derive(Debug)]
pub struct TypeCheckResult {
    /// Type of the main expression, `None` when it could not be computed.
    pub main_type: Option<TypeNode>,
    pub errors: Vec<Error>,
}

#[derive(Debug)]
pub struct TypeChecker<'c> {
    pub context: &'c SemanticContext,
    pub errors: Vec<Error>,
}

impl<'c> TypeChecker<'c> {
    pub fn new(context: &'c SemanticContext) -> Self {
        TypeChecker {
            context,
            errors: vec![],
        }
    }

    pub fn rels(&self) -> &'c TypeRels {
        &self.context.classes.type_rels
    }

    pub fn report(&mut self, error: Error) {
        warn!(line = error.get_line(), "{}", error);
        self.errors.push(error);
    }

    /// Fails with `IncompleteType` when `ty` mentions a class without a layout.
    pub fn ensure_complete(&self, ty: &TypeNode, line: u32) -> Result<(), Error> {
        match ty {
            TypeNode::Ref(class) if !self.context.classes.contains(class) => Err(Error::at_line(
                ErrorImpl::IncompleteType {
                    what: format!("class {}", class),
                },
                line,
            )),
            TypeNode::Arrow(arrow) | TypeNode::Method(arrow) => {
                for param in &arrow.params {
                    self.ensure_complete(param, line)?;
                }
                self.ensure_complete(&arrow.ret, line)
            }
            _ => Ok(()),
        }
    }

    /// Type stored in a resolved entry; unresolved use-sites are incomplete.
    pub fn entry_type(&self, entry: Option<EntryId>, name: &str, line: u32) -> Result<TypeNode, Error> {
        let entry = entry.ok_or_else(|| {
            Error::at_line(
                ErrorImpl::IncompleteType {
                    what: format!("unresolved {}", name),
                },
                line,
            )
        })?;
        let ty = self.context.entry(entry).ty.clone();
        self.ensure_complete(&ty, line)?;
        Ok(ty)
    }

    fn class_type(&self, entry: Option<EntryId>) -> Option<&'c ClassType> {
        match &self.context.entry(entry?).ty {
            TypeNode::Class(class_type) => Some(class_type),
            _ => None,
        }
    }
}

fn mismatch(message: String, line: u32) -> Error {
    Error::at_line(ErrorImpl::TypeMismatch { message }, line)
}

#[tracing::instrument(skip_all)]
pub fn type_check(program: &Program, context: &SemanticContext) -> TypeCheckResult {
    let mut type_checker = TypeChecker::new(context);

    let result = match program {
        Program::LetIn(prog) => {
            type_check_decs(&mut type_checker, &prog.decs);
            type_check_expr(&mut type_checker, &prog.exp)
        }
        Program::Exp(exp) => type_check_expr(&mut type_checker, exp),
    };

    let main_type = match result {
        Ok(ty) => Some(ty),
        Err(error) if error.is_incomplete() => {
            trace!("{}", error);
            None
        }
        Err(error) => {
            type_checker.report(error);
            None
        }
    };

    debug!(
        main_type = ?main_type.as_ref().map(|ty| ty.to_string()),
        errors = type_checker.errors.len(),
        "type checked"
    );
    TypeCheckResult {
        main_type,
        errors: type_checker.errors,
    }
}

/// Checks sibling declarations, each one independently of the others.
pub fn type_check_decs(type_checker: &mut TypeChecker, decs: &[Dec]) {
    for dec in decs {
        match type_check_dec(type_checker, dec) {
            Ok(()) => {}
            Err(error) if error.is_incomplete() => trace!("{}", error),
            Err(error) => type_checker.report(error),
        }
    }
}

pub fn type_check_dec(type_checker: &mut TypeChecker, dec: &Dec) -> Result<(), Error> {
    match dec {
        Dec::Var(var) => type_check_var(type_checker, var),
        Dec::Fun(fun) => type_check_fun(type_checker, fun),
        Dec::Class(class) => {
            type_check_class(type_checker, class);
            Ok(())
        }
    }
}

fn type_check_var(type_checker: &mut TypeChecker, var: &VarDec) -> Result<(), Error> {
    let exp_type = type_check_expr(type_checker, &var.exp)?;
    type_checker.ensure_complete(&var.ty, var.line)?;
    if !type_checker.rels().is_subtype(&exp_type, &var.ty) {
        return Err(mismatch(
            format!("Incompatible value for variable {}", var.id),
            var.line,
        ));
    }
    Ok(())
}

fn type_check_fun(type_checker: &mut TypeChecker, fun: &FunDec) -> Result<(), Error> {
    type_check_decs(type_checker, &fun.decs);
    let body_type = type_check_expr(type_checker, &fun.body)?;
    type_checker.ensure_complete(&fun.ret, fun.line)?;
    if !type_checker.rels().is_subtype(&body_type, &fun.ret) {
        return Err(mismatch(
            format!("Wrong return type for function {}", fun.id),
            fun.line,
        ));
    }
    Ok(())
}

fn type_check_method(type_checker: &mut TypeChecker, method: &MethodDec) -> Result<(), Error> {
    type_check_decs(type_checker, &method.decs);
    let body_type = type_check_expr(type_checker, &method.body)?;
    type_checker.ensure_complete(&method.ret, method.line)?;
    if !type_checker.rels().is_subtype(&body_type, &method.ret) {
        return Err(mismatch(
            format!("Wrong return type for method {}", method.id),
            method.line,
        ));
    }
    Ok(())
}

/// Checks method bodies and, for subclasses, that every member is a
/// subtype of the member it overrides.
fn type_check_class(type_checker: &mut TypeChecker, class: &ClassDec) {
    trace!(id = %class.id, "checking class");

    let own_type = type_checker.class_type(class.entry);
    let parent_type = class
        .super_entry
        .and_then(|entry| type_checker.class_type(Some(entry)));

    if let (Some(own_type), Some(parent_type)) = (own_type, parent_type) {
        for field in &class.fields {
            let Some(offset) = field.offset else { continue };
            let index = (-offset - 1) as usize;
            if let (Some(own), Some(inherited)) =
                (own_type.all_fields.get(index), parent_type.all_fields.get(index))
            {
                if !type_checker.rels().is_subtype(own, inherited) {
                    type_checker.report(Error::at_line(
                        ErrorImpl::OverrideIncompatibility {
                            member: field.id.clone(),
                            class: class.id.clone(),
                        },
                        field.line,
                    ));
                }
            }
        }

        for method in &class.methods {
            let Some(offset) = method.offset else { continue };
            let index = offset as usize;
            if let (Some(own), Some(inherited)) = (
                own_type.all_methods.get(index),
                parent_type.all_methods.get(index),
            ) {
                if !type_checker.rels().is_arrow_subtype(own, inherited) {
                    type_checker.report(Error::at_line(
                        ErrorImpl::OverrideIncompatibility {
                            member: method.id.clone(),
                            class: class.id.clone(),
                        },
                        method.line,
                    ));
                }
            }
        }
    }

    for method in &class.methods {
        match type_check_method(type_checker, method) {
            Ok(()) => {}
            Err(error) if error.is_incomplete() => trace!("{}", error),
            Err(error) => type_checker.report(error),
        }
    }
}

/// Arity and per-argument subtyping, shared by calls, method calls and `new`.
fn type_check_args(
    type_checker: &mut TypeChecker,
    callee: &str,
    expected: &[TypeNode],
    args: &[Expr],
    line: u32,
) -> Result<(), Error> {
    if expected.len() != args.len() {
        return Err(Error::at_line(
            ErrorImpl::ArityMismatch {
                callee: callee.to_string(),
                expected: expected.len(),
                received: args.len(),
            },
            line,
        ));
    }

    for (index, (arg, param)) in args.iter().zip(expected).enumerate() {
        let arg_type = type_check_expr(type_checker, arg)?;
        if !type_checker.rels().is_subtype(&arg_type, param) {
            return Err(Error::at_line(
                ErrorImpl::ArgumentTypeMismatch {
                    callee: callee.to_string(),
                    index: index + 1,
                    expected: param.to_string(),
                    received: arg_type.to_string(),
                },
                line,
            ));
        }
    }
    Ok(())
}

fn callable(ty: &TypeNode, callee: &str, line: u32) -> Result<ArrowType, Error> {
    ty.as_callable().cloned().ok_or_else(|| {
        Error::at_line(
            ErrorImpl::InvalidUsage {
                message: format!("Invocation of a non-function {}", callee),
            },
            line,
        )
    })
}

pub fn type_check_expr(type_checker: &mut TypeChecker, exp: &Expr) -> Result<TypeNode, Error> {
    match exp {
        Expr::Int(_) => Ok(TypeNode::Int),
        Expr::Bool(_) => Ok(TypeNode::Bool),
        Expr::Null(_) => Ok(TypeNode::Empty),
        Expr::Binary(binary) => {
            let left = type_check_expr(type_checker, &binary.left)?;
            let right = type_check_expr(type_checker, &binary.right)?;
            let rels = type_checker.rels();

            match binary.op {
                BinaryOp::Plus | BinaryOp::Minus | BinaryOp::Times | BinaryOp::Div => {
                    if !(rels.is_subtype(&left, &TypeNode::Int) && rels.is_subtype(&right, &TypeNode::Int)) {
                        return Err(mismatch(
                            format!("Non integers in {}", binary.op.symbol()),
                            binary.line,
                        ));
                    }
                    Ok(TypeNode::Int)
                }
                BinaryOp::And | BinaryOp::Or => {
                    if !(rels.is_subtype(&left, &TypeNode::Bool) && rels.is_subtype(&right, &TypeNode::Bool)) {
                        return Err(mismatch(
                            format!("Non boolean values in {}", binary.op.symbol()),
                            binary.line,
                        ));
                    }
                    Ok(TypeNode::Bool)
                }
                BinaryOp::Equal | BinaryOp::LessEqual | BinaryOp::GreaterEqual => {
                    if !(rels.is_subtype(&left, &right) || rels.is_subtype(&right, &left)) {
                        return Err(mismatch(
                            format!("Incompatible types in {}", binary.op.symbol()),
                            binary.line,
                        ));
                    }
                    Ok(TypeNode::Bool)
                }
            }
        }
        Expr::Not(not) => {
            let arg = type_check_expr(type_checker, &not.arg)?;
            if !type_checker.rels().is_subtype(&arg, &TypeNode::Bool) {
                return Err(mismatch("Non boolean after !".to_string(), not.line));
            }
            Ok(TypeNode::Bool)
        }
        Expr::If(if_exp) => {
            let cond = type_check_expr(type_checker, &if_exp.cond)?;
            if !type_checker.rels().is_subtype(&cond, &TypeNode::Bool) {
                return Err(mismatch("Non boolean condition in if".to_string(), if_exp.line));
            }
            let then_type = type_check_expr(type_checker, &if_exp.then_branch)?;
            let else_type = type_check_expr(type_checker, &if_exp.else_branch)?;
            type_checker
                .rels()
                .lowest_common_ancestor(&then_type, &else_type)
                .ok_or_else(|| {
                    mismatch(
                        "Incompatible types in then-else branches".to_string(),
                        if_exp.line,
                    )
                })
        }
        Expr::Print(print) => type_check_expr(type_checker, &print.exp),
        Expr::Id(id) => {
            let ty = type_checker.entry_type(id.entry, &id.id, id.line)?;
            let kind = match ty {
                TypeNode::Arrow(_) => "function",
                TypeNode::Method(_) => "method",
                TypeNode::Class(_) => "class",
                _ => return Ok(ty),
            };
            Err(Error::at_line(
                ErrorImpl::InvalidUsage {
                    message: format!("Wrong usage of {} identifier {}", kind, id.id),
                },
                id.line,
            ))
        }
        Expr::Call(call) => {
            let ty = type_checker.entry_type(call.entry, &call.id, call.line)?;
            let arrow = callable(&ty, &call.id, call.line)?;
            type_check_args(type_checker, &call.id, &arrow.params, &call.args, call.line)?;
            Ok(*arrow.ret)
        }
        Expr::ClassCall(call) => {
            let ty = type_checker.entry_type(call.method_entry, &call.method_id, call.line)?;
            let arrow = callable(&ty, &call.method_id, call.line)?;
            type_check_args(type_checker, &call.method_id, &arrow.params, &call.args, call.line)?;
            Ok(*arrow.ret)
        }
        Expr::New(new) => {
            let class_type = match new.entry {
                None => {
                    return Err(Error::at_line(
                        ErrorImpl::IncompleteType {
                            what: format!("unresolved class {}", new.class_id),
                        },
                        new.line,
                    ))
                }
                Some(_) => type_checker.class_type(new.entry).ok_or_else(|| {
                    Error::at_line(
                        ErrorImpl::InvalidUsage {
                            message: format!("{} is not a class", new.class_id),
                        },
                        new.line,
                    )
                })?,
            };
            type_check_args(
                type_checker,
                &new.class_id,
                &class_type.all_fields,
                &new.args,
                new.line,
            )?;
            Ok(TypeNode::reference(&new.class_id))
        }
    }
}
