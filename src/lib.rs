#![allow(clippy::module_inception)]

use std::fmt::Display;

use tracing::{debug, info};

use crate::{
    ast::{ast::Program, printer::print_tree, types::TypeNode},
    compiler::compiler::compile,
    errors::errors::{Error, ErrorTip},
    lexer::lexer::tokenize,
    parser::parser::parse,
    symbol_table::symbol_table::build_symbol_table,
    type_checker::type_checker::type_check,
};

pub mod ast;
pub mod compiler;
pub mod errors;
pub mod lexer;
pub mod macros;
pub mod parser;
pub mod svm;
pub mod symbol_table;
pub mod type_checker;

extern crate regex;

/// Words of stack machine memory. The stack grows down from here.
pub const MEMSIZE: i32 = 10000;

/// `(line, column)`, both starting at 1. Semantic errors only know the line
/// and leave the column at 0.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Position(pub u32, pub u32);

impl Position {
    pub fn null() -> Self {
        Position(0, 0)
    }

    pub fn line(line: u32) -> Self {
        Position(line, 0)
    }
}

#[derive(Debug, Clone)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

#[derive(Debug, Clone, Default)]
pub struct CompilerOptions {
    /// Log the parsed tree at debug level.
    pub debug: bool,
}

/// A successful compilation.
#[derive(Debug)]
pub struct Compilation {
    pub program: Program,
    pub main_type: Option<TypeNode>,
    pub assembly: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Lexing,
    Parsing,
    Semantic,
    CodeGeneration,
}

impl Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Lexing => "lexing",
            Stage::Parsing => "parsing",
            Stage::Semantic => "semantic analysis",
            Stage::CodeGeneration => "code generation",
        };
        write!(f, "{}", name)
    }
}

/// Errors found by each semantic pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ErrorCounts {
    pub symbol_table: usize,
    pub type_checker: usize,
}

#[derive(Debug)]
pub struct CompileFailure {
    pub stage: Stage,
    pub errors: Vec<Error>,
    pub counts: ErrorCounts,
}

impl CompileFailure {
    fn fatal(stage: Stage, error: Error) -> Self {
        CompileFailure {
            stage,
            errors: vec![error],
            counts: ErrorCounts::default(),
        }
    }
}

/// Runs every pass over `source`. Code is only generated when both semantic
/// passes came back clean.
#[tracing::instrument(skip_all)]
pub fn compile_source(source: &str, options: &CompilerOptions) -> Result<Compilation, CompileFailure> {
    let tokens = tokenize(source).map_err(|error| CompileFailure::fatal(Stage::Lexing, error))?;
    let mut program = parse(tokens).map_err(|error| CompileFailure::fatal(Stage::Parsing, error))?;

    let symbols = build_symbol_table(&mut program);
    if options.debug {
        debug!("syntax tree:\n{}", print_tree(program.as_node()));
    }
    let checked = type_check(&program, &symbols.context);

    let counts = ErrorCounts {
        symbol_table: symbols.errors.len(),
        type_checker: checked.errors.len(),
    };
    info!(
        symbol_table = counts.symbol_table,
        type_checker = counts.type_checker,
        "semantic analysis done"
    );

    if counts.symbol_table + counts.type_checker > 0 {
        let mut errors = symbols.errors;
        errors.extend(checked.errors);
        return Err(CompileFailure {
            stage: Stage::Semantic,
            errors,
            counts,
        });
    }

    let assembly = compile(&program, &symbols.context).map_err(|error| CompileFailure {
        stage: Stage::CodeGeneration,
        errors: vec![error],
        counts,
    })?;

    Ok(Compilation {
        program,
        main_type: checked.main_type,
        assembly,
    })
}

/// Renders an error with the offending source line:
///
/// ```text
/// Error: UnexpectedToken (Unexpected token: `;`)
/// -> quicksort.fool
///    |
/// 20 | var a: int = ;
///    | -------------^
/// ```
///
/// The caret is only drawn when the column is known.
pub fn format_error(error: &Error, source: &str, file: &str) -> String {
    let mut out = String::new();

    if let ErrorTip::None = error.get_tip() {
        out.push_str(&format!("Error: {}\n", error.get_error_name()));
    } else {
        out.push_str(&format!(
            "Error: {} ({})\n",
            error.get_error_name(),
            error.get_tip()
        ));
    }

    let Position(line, column) = error.get_position().clone();
    out.push_str(&format!("-> {}:{}\n", file, line));

    let line_text = match (line as usize).checked_sub(1).and_then(|index| source.lines().nth(index)) {
        Some(text) => text,
        None => {
            out.push_str(&format!("   {}\n", error.get_impl()));
            return out;
        }
    };

    let line_string = line.to_string();
    let padding = line_string.len() + 2;
    out.push_str(&format!("{:>padding$}\n", "|"));

    let (trimmed, removed_whitespace) = remove_starting_whitespace(line_text);
    out.push_str(&format!("{} | {}\n", line_string, trimmed.trim_end()));

    if column as usize > removed_whitespace {
        let arrows = column as usize - removed_whitespace;
        out.push_str(&format!("{:>padding$} {:->arrows$}\n", "|", "^"));
    } else {
        out.push_str(&format!("{:>padding$} {}\n", "|", error.get_impl()));
    }

    out
}

fn remove_starting_whitespace(string: &str) -> (&str, usize) {
    let start = string
        .chars()
        .take_while(|c| *c == ' ' || *c == '\t')
        .count();

    (&string[start..], start)
}
