use std::{fs, path::PathBuf, process::ExitCode, time::Instant};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use foolc::{
    compile_source, format_error,
    svm::{assembler::assemble, machine::Machine},
    CompilerOptions,
};

#[derive(Parser)]
#[command(name = "foolc", version, about = "FOOL compiler targeting the stack virtual machine")]
struct Cli {
    /// Source file to compile
    file: PathBuf,

    /// Where to write the assembly (defaults to `<file>.asm`)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Run the compiled program on the virtual machine
    #[arg(short, long)]
    run: bool,

    /// Log the syntax tree
    #[arg(short, long)]
    debug: bool,
}

fn init_tracing(debug: bool) {
    let filter = match EnvFilter::try_from_env("FOOLC_LOG") {
        Ok(filter) => filter,
        Err(_) if debug => EnvFilter::new("foolc=debug"),
        Err(_) => return,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let file_name = cli.file.display().to_string();
    let source = match fs::read_to_string(&cli.file) {
        Ok(source) => source,
        Err(error) => {
            eprintln!("Error: cannot read {}: {}", file_name, error);
            return ExitCode::FAILURE;
        }
    };

    let start = Instant::now();
    let options = CompilerOptions { debug: cli.debug };
    let span = tracing::info_span!("compile", file = %file_name);
    let compilation = match span.in_scope(|| compile_source(&source, &options)) {
        Ok(compilation) => compilation,
        Err(failure) => {
            for error in &failure.errors {
                eprint!("{}", format_error(error, &source, &file_name));
            }
            eprintln!(
                "Compilation failed during {}: {} symbol table error(s), {} type error(s)",
                failure.stage, failure.counts.symbol_table, failure.counts.type_checker
            );
            return ExitCode::FAILURE;
        }
    };

    if let Some(main_type) = &compilation.main_type {
        println!("Program type: {}", main_type);
    }
    println!("Compiled in {:?}", start.elapsed());

    let output = cli
        .output
        .unwrap_or_else(|| PathBuf::from(format!("{}.asm", file_name)));
    if let Err(error) = fs::write(&output, &compilation.assembly) {
        eprintln!("Error: cannot write {}: {}", output.display(), error);
        return ExitCode::FAILURE;
    }
    println!("Assembly written to {}", output.display());

    if cli.run {
        let execution = assemble(&compilation.assembly).and_then(|code| Machine::new(code).run());
        match execution {
            Ok(execution) => {
                for value in execution.output {
                    println!("{}", value);
                }
            }
            Err(error) => {
                eprintln!("Error: virtual machine: {}", error);
                return ExitCode::FAILURE;
            }
        }
    }

    ExitCode::SUCCESS
}
