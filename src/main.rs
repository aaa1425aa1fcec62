//! xuc - the XuLang to C compiler
//!
//! Usage:
//!   xuc [OPTIONS] <input-file>
//!   xuc --help
//!
//! Examples:
//!   xuc idade.xu                       # C source on stdout
//!   xuc idade.xu -o idade.c            # C source into a file
//!   xuc --emit=tokens idade.xu         # Token stream, one per line
//!   xuc --emit=ast idade.xu            # AST as JSON
//!   xuc --emit=json idade.xu           # {"code": ...} or {"diagnostics": [...]}

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{debug, info};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use xulang::utils::errors::CompileError;
use xulang::utils::location::SourceMap;
use xulang::{CompileOptions, CompileOutput, Compiler};

/// xuc - compile XuLang programs to C
#[derive(Parser, Debug)]
#[command(name = "xuc")]
#[command(author = "XuLang Contributors")]
#[command(version)]
#[command(about = "Compiles XuLang teaching-language programs to C", long_about = None)]
struct Cli {
    /// Input file (.xu)
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Output file (defaults to stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// What to emit
    #[arg(long, default_value = "c")]
    emit: EmitKind,

    /// Size of each TEXTO buffer in the generated C
    #[arg(long, value_name = "N", default_value_t = xulang::DEFAULT_TEXT_BUFFER_SIZE)]
    text_buffer_size: usize,

    /// Leave out the banner comment
    #[arg(long)]
    no_banner: bool,

    /// Verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode (suppress warnings)
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum EmitKind {
    /// Generated C source
    C,
    /// Token stream
    Tokens,
    /// Abstract Syntax Tree as JSON
    Ast,
    /// Compilation result as JSON
    Json,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.quiet {
        log::LevelFilter::Error
    } else {
        match cli.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();

    info!("xuc v{}", xulang::VERSION);
    debug!("Input file: {:?}", cli.input);

    let source = fs::read_to_string(&cli.input)
        .with_context(|| format!("Failed to read input file: {:?}", cli.input))?;
    let source_name = cli.input.display().to_string();

    let options = build_options(&cli);
    debug!("Compile options: {:?}", options);
    let compiler = Compiler::new(options).context("Invalid options")?;

    match cli.emit {
        EmitKind::Tokens => match xulang::frontend::tokenize(&source) {
            Ok(tokens) => {
                let listing: Vec<String> = tokens
                    .iter()
                    .map(|t| format!("{}:{} {:?} {}", t.line(), t.column(), t.kind, t.lexeme))
                    .collect();
                write_output(&cli.output, &listing.join("\n"))?;
                Ok(ExitCode::SUCCESS)
            }
            Err(e) => Ok(report(&source, &source_name, &CompileError::from(e))),
        },
        EmitKind::Ast => match xulang::frontend::parse(&source) {
            Ok(program) => {
                let json = serde_json::to_string_pretty(&program).context("Failed to serialize AST")?;
                write_output(&cli.output, &json)?;
                Ok(ExitCode::SUCCESS)
            }
            Err(e) => Ok(report(&source, &source_name, &e)),
        },
        EmitKind::Json => {
            let output = compiler.compile(&source, Some(&source_name));
            let json = output.to_json().context("Failed to serialize result")?;
            write_output(&cli.output, &json)?;
            Ok(exit_code(&output))
        }
        EmitKind::C => match compiler.try_compile(&source, Some(&source_name)) {
            Ok(code) => {
                info!("Compilation succeeded");
                write_output(&cli.output, code.trim_end())?;
                Ok(ExitCode::SUCCESS)
            }
            Err(e) => Ok(report(&source, &source_name, &e)),
        },
    }
}

fn build_options(cli: &Cli) -> CompileOptions {
    CompileOptions {
        text_buffer_size: cli.text_buffer_size,
        banner: !cli.no_banner,
        ..Default::default()
    }
}

/// Print every diagnostic with its source line and fail.
fn report(source: &str, source_name: &str, error: &CompileError) -> ExitCode {
    let map = SourceMap::new(source);
    for diagnostic in error.diagnostics() {
        eprintln!("{}", diagnostic.render(&map, Some(source_name)));
    }
    info!("Compilation failed: {}", error);
    ExitCode::FAILURE
}

fn exit_code(output: &CompileOutput) -> ExitCode {
    if output.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn write_output(path: &Option<PathBuf>, content: &str) -> Result<()> {
    match path {
        Some(p) => {
            fs::write(p, format!("{}\n", content))
                .with_context(|| format!("Failed to write output file: {:?}", p))?;
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
