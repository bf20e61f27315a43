//! cinderc - native compiler driver for the cinder language.
//!
//! Usage:
//!   cinderc <INPUT>               Compile to a native executable (a.out)
//!   cinderc <INPUT> -o <PATH>     Choose the output path
//!   cinderc <INPUT> --print-ast   Dump the parse tree and exit
//!   cinderc <INPUT> --print-ir    Dump the generated LLVM IR and exit

mod logger;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use cinder_lang::codegen::Compiler;
use cinder_lang::error::CinderError;
use cinder_lang::lexer::lex;
use cinder_lang::parser::ast::Node;
use cinder_lang::parser::printer;
use cinder_lang::parser::Parser as CinderParser;

use logger::{LogLevel, Logger};

/// cinderc - native compiler for the cinder language
#[derive(Parser, Debug)]
#[command(name = "cinderc")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The source file to compile
    input: PathBuf,

    /// Output path for the linked executable
    #[arg(short = 'o', long = "output", default_value = "a.out")]
    output: PathBuf,

    /// Print the parse tree and exit
    #[arg(long = "print-ast", conflicts_with = "print_ir")]
    print_ast: bool,

    /// Print the generated LLVM IR and exit
    #[arg(long = "print-ir")]
    print_ir: bool,

    /// Diagnostic verbosity
    #[arg(long = "log-level", value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,
}

fn main() -> ExitCode {
    let args = Args::parse();
    logger::set_level(args.log_level);

    let log = Logger::new("driver");
    match run(&args, &log) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            log.error(error.to_string());
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args, log: &Logger) -> Result<(), CinderError> {
    log.info(format!("Reading input file: {}", args.input.display()));
    let source = std::fs::read_to_string(&args.input).map_err(|e| {
        CinderError::io(format!("Error opening file {}: {}", args.input.display(), e))
    })?;

    log.debug("Lexing");
    let tokens = lex(&source)?;

    log.debug("Parsing");
    let mut parser = CinderParser::new(tokens);
    let program = parser.parse_program()?;

    if let Node::Program { body } = &program {
        if body.is_empty() {
            log.warn("Source file contains no statements.");
        }
    }

    if args.print_ast {
        print!("{}", printer::print(&program));
        return Ok(());
    }

    let module_name = args
        .input
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("module");
    let compiler = Compiler::new();

    if args.print_ir {
        log.debug("Emitting LLVM IR");
        print!("{}", compiler.emit_ir(&program, module_name)?);
        return Ok(());
    }

    log.info(format!("Compiling to {}", args.output.display()));
    compiler.compile_to_executable(&program, module_name, &args.output)?;

    Ok(())
}
