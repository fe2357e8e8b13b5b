//! tinyc - front end for the tiny statement language
//!
//! Usage: tinyc [OPTIONS] <input>...

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser as ClapParser, ValueEnum};
use codespan_reporting::term::termcolor::ColorChoice;
use tiny_compiler::common::fault::{fault, find_fault, ERROR_EXIT_CODE};
use tiny_compiler::common::{DiagnosticFormat, DiagnosticReporter, ReporterConfig};
use tiny_compiler::driver::{CompileOutcome, Pipeline};
use tiny_compiler::frontend::FrontendConfig;

/// Diagnostic output style
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Default)]
enum Format {
    /// One `line:col: message` line per error
    #[default]
    Short,
    /// Errors with a source snippet
    Rich,
}

/// When to colour rich diagnostics
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Default)]
enum Color {
    #[default]
    Auto,
    Always,
    Never,
}

#[derive(ClapParser, Debug)]
#[command(name = "tinyc")]
#[command(version = "1.0")]
#[command(about = "Checks tiny programs and reports errors by line and column", long_about = None)]
struct Args {
    /// Input source files, each compiled as its own unit
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Diagnostic format
    #[arg(short, long, value_enum, default_value = "short")]
    format: Format,

    /// Colour for rich diagnostics
    #[arg(long, value_enum, default_value = "auto")]
    color: Color,

    /// Stop parsing a file after this many errors
    #[arg(long)]
    error_limit: Option<usize>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Dump tokens (for debugging)
    #[arg(long)]
    dump_tokens: bool,

    /// Dump AST (for debugging)
    #[arg(long)]
    dump_ast: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(ERROR_EXIT_CODE as u8),
        Err(e) => {
            if let Some(internal) = find_fault(&e) {
                fault(internal);
            }
            eprintln!("error: {e:#}");
            ExitCode::from(ERROR_EXIT_CODE as u8)
        }
    }
}

/// Compile every input. `Ok(false)` if any of them had errors.
fn run(args: &Args) -> anyhow::Result<bool> {
    let reporter_config = ReporterConfig {
        format: match args.format {
            Format::Short => DiagnosticFormat::Short,
            Format::Rich => DiagnosticFormat::Rich,
        },
        color: match args.color {
            Color::Auto => ColorChoice::Auto,
            Color::Always => ColorChoice::Always,
            Color::Never => ColorChoice::Never,
        },
    };
    let mut reporter = DiagnosticReporter::stderr(reporter_config);

    let pipeline = Pipeline::new(FrontendConfig {
        dump_tokens: args.dump_tokens,
        dump_ast: args.dump_ast,
        verbose: args.verbose,
        error_limit: args.error_limit,
    });

    let mut all_ok = true;
    for input in &args.inputs {
        let source = fs::read_to_string(input)
            .with_context(|| format!("cannot read {}", input.display()))?;
        let filename = input.display().to_string();

        if pipeline.config().dump_tokens {
            println!("=== Tokens: {filename} ===");
            print!("{}", pipeline.dump_tokens(&source)?);
        }

        match pipeline.compile_source(&source, &filename, &mut reporter)? {
            CompileOutcome::Checked(program) => {
                if pipeline.config().dump_ast {
                    println!("=== AST: {filename} ===");
                    println!("{program:#?}");
                }
                if args.verbose {
                    eprintln!("{filename}: ok");
                }
            }
            CompileOutcome::Failed { errors } => {
                if args.verbose {
                    eprintln!("{filename}: {errors} error(s)");
                }
                all_ok = false;
            }
        }
    }

    Ok(all_ok)
}
