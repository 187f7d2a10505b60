mod ast;
mod config;
mod env;
mod error;
mod interpreter;
mod parser;
mod scanner;
mod token;
mod value;

use clap::Parser as ClapParser;
use env::Environment;
use error::Diagnostics;
use interpreter::Interpreter;
use parser::Parser;
use rustyline::error::ReadlineError;
use rustyline::{Config, Editor};
use scanner::Scanner;
use std::path::PathBuf;
use std::process::ExitCode;

/// sysexits.h-style exit codes: success, usage error, data (compile) error,
/// software (runtime) error.
const EX_OK: u8 = 0;
const EX_USAGE: u8 = 64;
const EX_DATAERR: u8 = 65;
const EX_SOFTWARE: u8 = 70;

/// A tree-walking interpreter for the Lox scripting language
#[derive(ClapParser, Debug)]
#[command(name = "lox")]
#[command(version = config::VERSION)]
#[command(about = "A tree-walking interpreter for the Lox scripting language")]
struct CliArgs {
    /// Script file to execute. If omitted, starts an interactive REPL.
    #[arg(value_name = "FILE")]
    script: Option<PathBuf>,
}

fn main() -> ExitCode {
    // Enforce the spec's own argc contract (0 args: REPL, 1 arg: script,
    // anything else: usage error) rather than letting clap's derive reject
    // extra positionals with its own exit code.
    if std::env::args().count() > 2 {
        eprintln!("Usage: lox [script]");
        return ExitCode::from(EX_USAGE);
    }

    let args = CliArgs::parse();

    match args.script {
        Some(path) => run_file(&path),
        None => run_prompt(),
    }
}

fn run_file(path: &PathBuf) -> ExitCode {
    let source = match std::fs::read_to_string(path) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("Cannot read script file {}: {}", path.display(), err);
            return ExitCode::from(EX_USAGE);
        }
    };

    let diagnostics = Diagnostics::new();
    run(&source, &diagnostics);

    if diagnostics.had_error() {
        ExitCode::from(EX_DATAERR)
    } else if diagnostics.had_runtime_error() {
        ExitCode::from(EX_SOFTWARE)
    } else {
        ExitCode::from(EX_OK)
    }
}

/// Interactive REPL: one environment persists across lines for the whole
/// session, but each line gets a fresh `Diagnostics` so one bad line is
/// reported without poisoning later ones.
fn run_prompt() -> ExitCode {
    println!("{}", config::WELCOME_MESSAGE);
    println!("{}", config::WELCOME_SUBTITLE);

    let config = Config::builder().auto_add_history(true).build();
    let mut editor = match Editor::<(), rustyline::history::DefaultHistory>::with_config(config) {
        Ok(editor) => editor,
        Err(err) => {
            eprintln!("Failed to initialize REPL: {}", err);
            return ExitCode::from(EX_SOFTWARE);
        }
    };

    let history_file = ".lox_history";
    let _ = editor.load_history(history_file);

    let environment = Environment::new();

    loop {
        match editor.readline("lox> ") {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                let diagnostics = Diagnostics::new();
                let tokens = Scanner::new(&line).scan_tokens(&diagnostics);
                let statements = Parser::new(tokens, &diagnostics).parse();
                if !diagnostics.had_error() {
                    Interpreter::with_environment(&diagnostics, environment.clone()).interpret(&statements);
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                break;
            }
            Err(err) => {
                eprintln!("Error: {}", err);
                break;
            }
        }
    }

    let _ = editor.save_history(history_file);
    ExitCode::from(EX_OK)
}

fn run(source: &str, diagnostics: &Diagnostics) {
    let tokens = Scanner::new(source).scan_tokens(diagnostics);
    let statements = Parser::new(tokens, diagnostics).parse();

    if diagnostics.had_error() {
        return;
    }

    Interpreter::new(diagnostics).interpret(&statements);
}
