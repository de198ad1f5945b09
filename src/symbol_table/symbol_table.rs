use std::collections::{HashMap, HashSet};

use tracing::{debug, trace, warn};

use crate::{
    ast::{
        ast::Program,
        declarations::{ClassDec, Dec, FunDec, ParamDec, VarDec},
        expressions::Expr,
        types::TypeNode,
    },
    errors::errors::{Error, ErrorImpl},
};

use super::{
    class_table::{ClassLayout, ClassTable, LayoutClash, MemberKind},
    entry::{EntryId, STentry, SymbolTable},
};

/// Nesting level of a class body; its methods sit one level deeper.
pub const CLASS_LEVEL: usize = 1;

/// First free slot for locals, below the access link and the return address.
pub const FIRST_LOCAL_OFFSET: i32 = -2;

/// What the symbol table pass hands over to the type checker and the
/// code generator.
#[derive(Debug, Default, Clone)]
pub struct SemanticContext {
    pub entries: SymbolTable,
    pub classes: ClassTable,
}

impl SemanticContext {
    pub fn entry(&self, id: EntryId) -> &STentry {
        self.entries.get(id)
    }
}

#[derive(Debug)]
pub struct SymbolTableResult {
    pub context: SemanticContext,
    pub errors: Vec<Error>,
}

/// Pass-local state; only `build_symbol_table` drives it.
#[derive(Debug)]
struct SymbolTableBuilder {
    /// One map per nesting level, innermost last.
    scopes: Vec<HashMap<String, EntryId>>,
    dec_offset: i32,
    entries: SymbolTable,
    classes: ClassTable,
    /// Class whose body is being visited; its table is still a scope.
    current_class: Option<String>,
    errors: Vec<Error>,
}

impl Default for SymbolTableBuilder {
    fn default() -> Self {
        SymbolTableBuilder::new()
    }
}

impl SymbolTableBuilder {
    pub fn new() -> Self {
        SymbolTableBuilder {
            scopes: vec![],
            dec_offset: FIRST_LOCAL_OFFSET,
            entries: SymbolTable::new(),
            classes: ClassTable::new(),
            current_class: None,
            errors: vec![],
        }
    }

    pub fn nesting_level(&self) -> usize {
        self.scopes.len().saturating_sub(1)
    }

    pub fn report(&mut self, error: Error) {
        warn!(line = error.get_line(), "{}", error);
        self.errors.push(error);
    }

    /// Innermost binding of `id`.
    pub fn lookup(&self, id: &str) -> Option<EntryId> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(id).copied())
    }

    pub fn next_offset(&mut self) -> i32 {
        let offset = self.dec_offset;
        self.dec_offset -= 1;
        offset
    }

    /// Binds `id` in the innermost scope. A name already bound there keeps
    /// its first entry; the new one is still created and returned with
    /// `false`.
    pub fn declare(&mut self, kind: &str, id: &str, entry: STentry, line: u32) -> (EntryId, bool) {
        let entry_id = self.entries.add(entry);
        let fresh = match self.scopes.last_mut() {
            Some(scope) if scope.contains_key(id) => false,
            Some(scope) => {
                scope.insert(id.to_string(), entry_id);
                true
            }
            None => false,
        };

        if !fresh {
            self.report(Error::at_line(
                ErrorImpl::DuplicateDeclaration {
                    kind: kind.to_string(),
                    name: id.to_string(),
                },
                line,
            ));
        }
        (entry_id, fresh)
    }

    /// Binds a class member, replacing whatever it overrides.
    fn bind_member(&mut self, name: &str, entry: STentry) -> EntryId {
        let entry_id = self.entries.add(entry);
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string(), entry_id);
        }
        entry_id
    }

    pub fn class_known(&self, class: &str) -> bool {
        self.classes.contains(class) || self.current_class.as_deref() == Some(class)
    }

    pub fn member(&self, class: &str, member: &str) -> Option<EntryId> {
        if self.current_class.as_deref() == Some(class) {
            self.scopes.get(CLASS_LEVEL)?.get(member).copied()
        } else {
            self.classes.member(class, member)
        }
    }

    /// Reports class names in an annotation that no declaration introduces.
    pub fn check_type(&mut self, ty: &TypeNode, line: u32) {
        match ty {
            TypeNode::Ref(class) => {
                if !self.class_known(class) {
                    self.report(Error::at_line(
                        ErrorImpl::UnresolvedReference {
                            kind: "Class".to_string(),
                            name: class.clone(),
                        },
                        line,
                    ));
                }
            }
            TypeNode::Arrow(arrow) | TypeNode::Method(arrow) => {
                for param in &arrow.params {
                    self.check_type(param, line);
                }
                self.check_type(&arrow.ret, line);
            }
            _ => {}
        }
    }

    fn unresolved(&mut self, kind: &str, name: &str, line: u32) {
        self.report(Error::at_line(
            ErrorImpl::UnresolvedReference {
                kind: kind.to_string(),
                name: name.to_string(),
            },
            line,
        ));
    }

    pub fn finish(self) -> SymbolTableResult {
        SymbolTableResult {
            context: SemanticContext {
                entries: self.entries,
                classes: self.classes,
            },
            errors: self.errors,
        }
    }
}

#[tracing::instrument(skip_all)]
pub fn build_symbol_table(program: &mut Program) -> SymbolTableResult {
    let mut builder = SymbolTableBuilder::new();
    builder.scopes.push(HashMap::new());

    match program {
        Program::LetIn(prog) => {
            for dec in prog.decs.iter_mut() {
                visit_dec(&mut builder, dec);
            }
            visit_exp(&mut builder, &mut prog.exp);
        }
        Program::Exp(exp) => visit_exp(&mut builder, exp),
    }

    builder.scopes.pop();
    debug!(
        entries = builder.entries.len(),
        classes = builder.classes.layouts.len(),
        errors = builder.errors.len(),
        "symbol table built"
    );
    builder.finish()
}

fn visit_dec(builder: &mut SymbolTableBuilder, dec: &mut Dec) {
    match dec {
        Dec::Var(var) => visit_var(builder, var),
        Dec::Fun(fun) => visit_fun(builder, fun),
        Dec::Class(class) => visit_class(builder, class),
    }
}

fn visit_var(builder: &mut SymbolTableBuilder, var: &mut VarDec) {
    trace!(id = %var.id, line = var.line, "var");
    // The initializer cannot see the variable it initializes.
    visit_exp(builder, &mut var.exp);
    builder.check_type(&var.ty, var.line);

    let offset = builder.next_offset();
    let entry = STentry::new(builder.nesting_level(), var.ty.clone(), offset);
    builder.declare("Var", &var.id, entry, var.line);
}

fn visit_fun(builder: &mut SymbolTableBuilder, fun: &mut FunDec) {
    trace!(id = %fun.id, line = fun.line, "fun");
    let ty = TypeNode::Arrow(fun.arrow_type());
    builder.check_type(&ty, fun.line);

    let offset = builder.next_offset();
    let entry = STentry::new(builder.nesting_level(), ty, offset);
    builder.declare("Fun", &fun.id, entry, fun.line);

    visit_body(builder, &fun.params, &mut fun.decs, &mut fun.body);
}

/// Scope of a function or method: parameters, local declarations, body.
fn visit_body(
    builder: &mut SymbolTableBuilder,
    params: &[ParamDec],
    decs: &mut [Dec],
    body: &mut Expr,
) {
    builder.scopes.push(HashMap::new());
    let previous_offset = builder.dec_offset;
    builder.dec_offset = FIRST_LOCAL_OFFSET;

    let level = builder.nesting_level();
    for (index, param) in params.iter().enumerate() {
        let entry = STentry::new(level, param.ty.clone(), index as i32 + 1);
        builder.declare("Par", &param.id, entry, param.line);
    }

    for dec in decs.iter_mut() {
        visit_dec(builder, dec);
    }
    visit_exp(builder, body);

    builder.scopes.pop();
    builder.dec_offset = previous_offset;
}

fn clash_error(clash: &LayoutClash, name: &str, class: &str, line: u32) -> Error {
    Error::at_line(
        ErrorImpl::InvalidUsage {
            message: format!(
                "{} {} in class {} overrides an inherited {}",
                clash.declared.name(),
                name,
                class,
                clash.inherited.name().to_lowercase()
            ),
        },
        line,
    )
}

fn visit_class(builder: &mut SymbolTableBuilder, class: &mut ClassDec) {
    trace!(id = %class.id, line = class.line, "class");
    if builder.nesting_level() != 0 {
        builder.report(Error::at_line(
            ErrorImpl::InvalidUsage {
                message: format!("class {} must be declared at top level", class.id),
            },
            class.line,
        ));
        return;
    }

    let mut superclass = None;
    let (mut layout, virtual_table) = match &class.super_id {
        Some(super_id) => match (
            builder.classes.layout(super_id),
            builder.classes.virtual_tables.get(super_id),
        ) {
            (Some(layout), Some(virtual_table)) => {
                let inherited = (layout.clone(), virtual_table.clone());
                class.super_entry = builder
                    .scopes
                    .first()
                    .and_then(|globals| globals.get(super_id))
                    .copied();
                superclass = Some(super_id.clone());
                inherited
            }
            _ => {
                builder.unresolved("Super class", super_id, class.line);
                (ClassLayout::new(), HashMap::new())
            }
        },
        None => (ClassLayout::new(), HashMap::new()),
    };

    let offset = builder.next_offset();
    let entry = STentry::new(0, TypeNode::Class(layout.class_type()), offset);
    let (entry_id, fresh) = builder.declare("Class", &class.id, entry, class.line);
    class.entry = Some(entry_id);

    builder.current_class = Some(class.id.clone());
    builder.scopes.push(virtual_table);
    let level = builder.nesting_level();
    let mut declared = HashSet::new();

    for field in class.fields.iter_mut() {
        builder.check_type(&field.ty, field.line);
        if !declared.insert(field.id.clone()) {
            builder.report(Error::at_line(
                ErrorImpl::DuplicateDeclaration {
                    kind: MemberKind::Field.name().to_string(),
                    name: field.id.clone(),
                },
                field.line,
            ));
            continue;
        }

        match layout.declare(MemberKind::Field, &class.id, &field.id, field.ty.clone()) {
            Ok(offset) => {
                field.offset = Some(offset);
                builder.bind_member(&field.id, STentry::new(level, field.ty.clone(), offset));
            }
            Err(clash) => {
                let error = clash_error(&clash, &field.id, &class.id, field.line);
                builder.report(error);
            }
        }
    }

    for method in class.methods.iter_mut() {
        if !declared.insert(method.id.clone()) {
            builder.report(Error::at_line(
                ErrorImpl::DuplicateDeclaration {
                    kind: MemberKind::Method.name().to_string(),
                    name: method.id.clone(),
                },
                method.line,
            ));
            continue;
        }

        let ty = TypeNode::Method(method.arrow_type());
        builder.check_type(&ty, method.line);
        method.set_type(ty.clone());

        match layout.declare(MemberKind::Method, &class.id, &method.id, ty.clone()) {
            Ok(offset) => {
                method.offset = Some(offset);
                builder.bind_member(&method.id, STentry::new(level, ty, offset));
            }
            Err(clash) => {
                let error = clash_error(&clash, &method.id, &class.id, method.line);
                builder.report(error);
                continue;
            }
        }

        visit_body(builder, &method.params, &mut method.decs, &mut method.body);
    }

    let virtual_table = builder.scopes.pop().unwrap_or_default();
    builder.current_class = None;
    builder
        .entries
        .set_type(entry_id, TypeNode::Class(layout.class_type()));

    if fresh {
        builder
            .classes
            .register(&class.id, superclass.as_deref(), layout, virtual_table);
    }
}

fn visit_exp(builder: &mut SymbolTableBuilder, exp: &mut Expr) {
    let level = builder.nesting_level();
    match exp {
        Expr::Int(_) | Expr::Bool(_) | Expr::Null(_) => {}
        Expr::Binary(binary) => {
            visit_exp(builder, &mut binary.left);
            visit_exp(builder, &mut binary.right);
        }
        Expr::Not(not) => visit_exp(builder, &mut not.arg),
        Expr::If(if_exp) => {
            visit_exp(builder, &mut if_exp.cond);
            visit_exp(builder, &mut if_exp.then_branch);
            visit_exp(builder, &mut if_exp.else_branch);
        }
        Expr::Print(print) => visit_exp(builder, &mut print.exp),
        Expr::Id(id) => match builder.lookup(&id.id) {
            Some(entry) => {
                trace!(id = %id.id, level, "resolved id");
                id.entry = Some(entry);
                id.nesting_level = level;
            }
            None => builder.unresolved("Var or Par", &id.id, id.line),
        },
        Expr::Call(call) => {
            match builder.lookup(&call.id) {
                Some(entry) => {
                    trace!(id = %call.id, level, "resolved call");
                    call.entry = Some(entry);
                    call.nesting_level = level;
                }
                None => builder.unresolved("Fun", &call.id, call.line),
            }
            for arg in call.args.iter_mut() {
                visit_exp(builder, arg);
            }
        }
        Expr::ClassCall(call) => {
            match builder.lookup(&call.object_id) {
                None => builder.unresolved("Object", &call.object_id, call.line),
                Some(object) => match builder.entries.get(object).ty.clone() {
                    TypeNode::Ref(class) => match builder.member(&class, &call.method_id) {
                        Some(method) if builder.entries.get(method).is_method() => {
                            trace!(object = %call.object_id, method = %call.method_id, level, "resolved method call");
                            call.entry = Some(object);
                            call.method_entry = Some(method);
                            call.nesting_level = level;
                        }
                        Some(_) => builder.report(Error::at_line(
                            ErrorImpl::InvalidUsage {
                                message: format!(
                                    "{} is a field of class {}, not a method",
                                    call.method_id, class
                                ),
                            },
                            call.line,
                        )),
                        None if builder.class_known(&class) => {
                            builder.unresolved("Method", &call.method_id, call.line)
                        }
                        None => builder.unresolved("Class", &class, call.line),
                    },
                    _ => builder.report(Error::at_line(
                        ErrorImpl::InvalidUsage {
                            message: format!(
                                "object {} is not of a class type",
                                call.object_id
                            ),
                        },
                        call.line,
                    )),
                },
            }
            for arg in call.args.iter_mut() {
                visit_exp(builder, arg);
            }
        }
        Expr::New(new) => {
            let class_entry = builder
                .scopes
                .first()
                .and_then(|globals| globals.get(&new.class_id))
                .copied()
                .filter(|entry| matches!(builder.entries.get(*entry).ty, TypeNode::Class(_)));
            match class_entry {
                Some(entry) => new.entry = Some(entry),
                None => builder.unresolved("Class", &new.class_id, new.line),
            }
            for arg in new.args.iter_mut() {
                visit_exp(builder, arg);
            }
        }
    }
}
