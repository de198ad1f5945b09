//! Main code generation module.
//!
//! This module contains the `Compiler` structure holding the generator state
//! (label counters, the trailing block of function bodies and the labels of
//! every method body) and the entry point lowering a resolved, type-checked
//! program to stack machine assembly.

use std::collections::HashMap;

use tracing::debug;

use crate::{
    ast::{ast::Program, declarations::Dec, expressions::Expr},
    errors::errors::{Error, ErrorImpl},
    symbol_table::{
        entry::{EntryId, STentry},
        symbol_table::SemanticContext,
    },
};

use super::{decl::gen_declaration, expr::gen_expression};

/// A run of instructions, one per line.
pub type Code = Vec<String>;

/// The state of one code generation run.
///
/// # Type Parameters
///
/// * `'c` - Lifetime of the semantic context produced by the symbol table pass
pub struct Compiler<'c> {
    /// Entries and class layouts the earlier passes computed
    pub context: &'c SemanticContext,
    /// Function and method bodies, appended after `halt`
    pub function_code: Code,
    /// Counter behind `label<N>`
    pub label_count: usize,
    /// Counter behind `function<N>`
    pub function_label_count: usize,
    /// Body label of every method, by declaring class and method name
    pub method_labels: HashMap<(String, String), String>,
}

impl<'c> Compiler<'c> {
    pub fn new(context: &'c SemanticContext) -> Self {
        Compiler {
            context,
            function_code: vec![],
            label_count: 0,
            function_label_count: 0,
            method_labels: HashMap::new(),
        }
    }

    pub fn fresh_label(&mut self) -> String {
        let label = format!("label{}", self.label_count);
        self.label_count += 1;
        label
    }

    pub fn fresh_function_label(&mut self) -> String {
        let label = format!("function{}", self.function_label_count);
        self.function_label_count += 1;
        label
    }

    pub fn put_code(&mut self, code: Code) {
        self.function_code.extend(code);
    }

    /// Resolved entry of a use-site or declaration.
    pub fn entry(&self, entry: Option<EntryId>, what: &str, line: u32) -> Result<&'c STentry, Error> {
        match entry {
            Some(entry) => Ok(self.context.entry(entry)),
            None => Err(invariant(format!("{} reached code generation unresolved", what), line)),
        }
    }

    /// Emits the one branch shape every comparison, `!`, `if`, `&&` and
    /// `||` lowers to:
    ///
    /// ```text
    /// <prefix>
    /// <branch> Ltaken
    /// <fallthrough>
    /// b Lend
    /// Ltaken:
    /// <taken>
    /// Lend:
    /// ```
    pub fn select(&mut self, prefix: Code, branch: &str, taken: Code, fallthrough: Code) -> Code {
        let taken_label = self.fresh_label();
        let end_label = self.fresh_label();

        let mut code = prefix;
        code.push(format!("{} {}", branch, taken_label));
        code.extend(fallthrough);
        code.push(format!("b {}", end_label));
        code.push(format!("{}:", taken_label));
        code.extend(taken);
        code.push(format!("{}:", end_label));
        code
    }

    /// Follows the static chain from a use-site at `use_level` to the frame
    /// of a declaration at `entry.nesting_level`.
    pub fn access_link(&self, use_level: usize, entry: &STentry, line: u32) -> Result<Code, Error> {
        let hops = use_level.checked_sub(entry.nesting_level).ok_or_else(|| {
            invariant(
                format!(
                    "use at nesting level {} of a declaration at level {}",
                    use_level, entry.nesting_level
                ),
                line,
            )
        })?;

        let mut code = vec!["lfp".to_string()];
        code.extend(std::iter::repeat("lw".to_string()).take(hops));
        Ok(code)
    }

    /// Lays out a function or method body under `label` in the trailing block.
    pub fn gen_function_body(
        &mut self,
        label: &str,
        param_count: usize,
        decs: &[Dec],
        body: &Expr,
    ) -> Result<(), Error> {
        let mut dec_code = vec![];
        for dec in decs {
            dec_code.extend(gen_declaration(self, dec)?);
        }
        let body_code = gen_expression(self, body)?;

        let mut code = vec![format!("{}:", label), "cfp".to_string(), "lra".to_string()];
        code.extend(dec_code);
        code.extend(body_code);
        code.push("stm".to_string());
        code.extend(std::iter::repeat("pop".to_string()).take(decs.len()));
        code.push("sra".to_string());
        code.push("pop".to_string());
        code.extend(std::iter::repeat("pop".to_string()).take(param_count));
        code.extend(["sfp", "ltm", "lra", "js"].map(String::from));

        self.put_code(code);
        Ok(())
    }
}

pub fn invariant(message: String, line: u32) -> Error {
    Error::at_line(ErrorImpl::CodegenInvariant { message }, line)
}

/// Generates the assembly text of `program`.
///
/// Expects both semantic passes to have reported no errors; anything left
/// unresolved surfaces as a `CodegenInvariant` error.
#[tracing::instrument(skip_all)]
pub fn compile(program: &Program, context: &SemanticContext) -> Result<String, Error> {
    let mut compiler = Compiler::new(context);

    let mut code = vec![];
    match program {
        Program::LetIn(prog) => {
            code.push("push 0".to_string());
            for dec in &prog.decs {
                code.extend(gen_declaration(&mut compiler, dec)?);
            }
            code.extend(gen_expression(&mut compiler, &prog.exp)?);
            code.push("halt".to_string());
        }
        Program::Exp(exp) => {
            code.extend(gen_expression(&mut compiler, exp)?);
            code.push("halt".to_string());
        }
    }
    code.append(&mut compiler.function_code);

    debug!(
        instructions = code.len(),
        functions = compiler.function_label_count,
        "code generated"
    );
    Ok(code.join("\n"))
}
