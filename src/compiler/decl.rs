use tracing::trace;

use crate::{
    ast::declarations::{ClassDec, Dec},
    errors::errors::Error,
};

use super::compiler::{invariant, Code, Compiler};

/// Generates the code allocating a declaration in the current frame.
///
/// Every declaration leaves exactly one word on the stack: the value of a
/// variable, the body label of a function, the dispatch pointer of a class.
pub fn gen_declaration(compiler: &mut Compiler, dec: &Dec) -> Result<Code, Error> {
    match dec {
        Dec::Var(var) => {
            trace!(id = %var.id, "var");
            super::expr::gen_expression(compiler, &var.exp)
        }
        Dec::Fun(fun) => {
            let label = compiler.fresh_function_label();
            trace!(id = %fun.id, %label, "fun");
            compiler.gen_function_body(&label, fun.params.len(), &fun.decs, &fun.body)?;
            Ok(vec![format!("push {}", label)])
        }
        Dec::Class(class) => gen_class(compiler, class),
    }
}

/// Emits the bodies of the class's own methods, then writes its dispatch
/// table to the heap. The address of the table is left on the stack.
fn gen_class(compiler: &mut Compiler, class: &ClassDec) -> Result<Code, Error> {
    for method in &class.methods {
        let label = compiler.fresh_function_label();
        trace!(class = %class.id, method = %method.id, %label, "method");
        compiler.gen_function_body(&label, method.params.len(), &method.decs, &method.body)?;
        compiler
            .method_labels
            .insert((class.id.clone(), method.id.clone()), label);
    }

    let layout = compiler.context.classes.layout(&class.id).ok_or_else(|| {
        invariant(format!("class {} has no layout", class.id), class.line)
    })?;

    let mut code = vec!["lhp".to_string()];
    for slot in &layout.methods {
        let label = compiler
            .method_labels
            .get(&(slot.owner.clone(), slot.name.clone()))
            .ok_or_else(|| {
                invariant(
                    format!("no body for method {} of class {}", slot.name, slot.owner),
                    class.line,
                )
            })?;
        code.push(format!("push {}", label));
        code.extend(["lhp", "sw", "lhp", "push 1", "add", "shp"].map(String::from));
    }
    Ok(code)
}
