use crate::{
    ast::expressions::{BinaryOp, Expr},
    errors::errors::Error,
    MEMSIZE,
};

use super::compiler::{invariant, Code, Compiler};

fn single(instruction: &str) -> Code {
    vec![instruction.to_string()]
}

fn push(value: impl std::fmt::Display) -> String {
    format!("push {}", value)
}

fn arithmetic_instruction(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Minus => "sub",
        BinaryOp::Times => "mult",
        BinaryOp::Div => "div",
        _ => "add",
    }
}

/// Bumps `hp` by one word.
fn bump_heap_pointer(code: &mut Code) {
    code.extend(["lhp", "push 1", "add", "shp"].map(String::from));
}

/// Moves the word on top of the stack to the heap.
fn store_on_heap(code: &mut Code) {
    code.extend(["lhp", "sw"].map(String::from));
    bump_heap_pointer(code);
}

/// Arguments are pushed last to first, so the first one ends up next to
/// the access link at offset 1.
fn gen_arguments(compiler: &mut Compiler, args: &[Expr]) -> Result<Code, Error> {
    let mut code = vec![];
    for arg in args.iter().rev() {
        code.extend(gen_expression(compiler, arg)?);
    }
    Ok(code)
}

/// Generates the code of an expression, leaving its value on top of the stack.
pub fn gen_expression(compiler: &mut Compiler, expression: &Expr) -> Result<Code, Error> {
    match expression {
        Expr::Int(int) => Ok(vec![push(int.value)]),
        Expr::Bool(boolean) => Ok(vec![push(if boolean.value { 1 } else { 0 })]),
        // No object lives at -1.
        Expr::Null(_) => Ok(vec![push(-1)]),
        Expr::Binary(binary) => {
            let left = gen_expression(compiler, &binary.left)?;
            let right = gen_expression(compiler, &binary.right)?;

            Ok(match binary.op {
                BinaryOp::Plus | BinaryOp::Minus | BinaryOp::Times | BinaryOp::Div => {
                    let mut code = [left, right].concat();
                    code.push(arithmetic_instruction(binary.op).to_string());
                    code
                }
                BinaryOp::Equal => {
                    let prefix = [left, right].concat();
                    compiler.select(prefix, "beq", single("push 1"), single("push 0"))
                }
                BinaryOp::LessEqual => {
                    let prefix = [left, right].concat();
                    compiler.select(prefix, "bleq", single("push 1"), single("push 0"))
                }
                BinaryOp::GreaterEqual => {
                    let prefix = [right, left].concat();
                    compiler.select(prefix, "bleq", single("push 1"), single("push 0"))
                }
                BinaryOp::And => {
                    let prefix = [left, single("push 1")].concat();
                    compiler.select(prefix, "beq", right, single("push 0"))
                }
                BinaryOp::Or => {
                    let prefix = [left, single("push 1")].concat();
                    compiler.select(prefix, "beq", single("push 1"), right)
                }
            })
        }
        Expr::Not(not) => {
            let prefix = [gen_expression(compiler, &not.arg)?, single("push 1")].concat();
            Ok(compiler.select(prefix, "beq", single("push 0"), single("push 1")))
        }
        Expr::If(if_exp) => {
            let prefix = [gen_expression(compiler, &if_exp.cond)?, single("push 1")].concat();
            let taken = gen_expression(compiler, &if_exp.then_branch)?;
            let fallthrough = gen_expression(compiler, &if_exp.else_branch)?;
            Ok(compiler.select(prefix, "beq", taken, fallthrough))
        }
        Expr::Print(print) => {
            let mut code = gen_expression(compiler, &print.exp)?;
            code.push("print".to_string());
            Ok(code)
        }
        Expr::Id(id) => {
            let entry = compiler.entry(id.entry, &id.id, id.line)?;
            let mut code = compiler.access_link(id.nesting_level, entry, id.line)?;
            code.extend([push(entry.offset), "add".to_string(), "lw".to_string()]);
            Ok(code)
        }
        Expr::Call(call) => {
            let entry = compiler.entry(call.entry, &call.id, call.line)?;

            let mut code = single("lfp");
            code.extend(gen_arguments(compiler, &call.args)?);
            code.extend(compiler.access_link(call.nesting_level, entry, call.line)?);
            code.extend(["stm", "ltm", "ltm"].map(String::from));
            if entry.is_method() {
                // The access link of a method is its object; go through its dispatch pointer.
                code.push("lw".to_string());
            }
            code.extend([push(entry.offset), "add".to_string(), "lw".to_string(), "js".to_string()]);
            Ok(code)
        }
        Expr::ClassCall(call) => {
            let object = compiler.entry(call.entry, &call.object_id, call.line)?;
            let method = compiler.entry(call.method_entry, &call.method_id, call.line)?;

            let mut code = single("lfp");
            code.extend(gen_arguments(compiler, &call.args)?);
            code.extend(compiler.access_link(call.nesting_level, object, call.line)?);
            code.extend([push(object.offset), "add".to_string(), "lw".to_string()]);
            code.extend(["stm", "ltm", "ltm", "lw"].map(String::from));
            code.extend([push(method.offset), "add".to_string(), "lw".to_string(), "js".to_string()]);
            Ok(code)
        }
        Expr::New(new) => {
            let class = compiler.entry(new.entry, &new.class_id, new.line)?;
            if class.nesting_level != 0 {
                return Err(invariant(
                    format!("class {} is not a global declaration", new.class_id),
                    new.line,
                ));
            }

            let mut code = vec![];
            for arg in &new.args {
                code.extend(gen_expression(compiler, arg)?);
            }
            for _ in &new.args {
                store_on_heap(&mut code);
            }

            code.extend([
                push(MEMSIZE),
                push(class.offset),
                "add".to_string(),
                "lw".to_string(),
                "lhp".to_string(),
                "sw".to_string(),
                "lhp".to_string(),
            ]);
            bump_heap_pointer(&mut code);
            Ok(code)
        }
    }
}

