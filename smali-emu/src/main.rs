//! Companion inspect tool and execution driver (spec.md §6, "CLI surface":
//! "collaborator, not core"). Mirrors what `original_source/utils/inspect.py`
//! prints for `-e`/`-m`, built out here since nothing else in the workspace
//! does.

use std::fs;
use std::io;
use std::process::ExitCode;

use clap::Parser;
use log::error;
use thiserror::Error;

use smali_ir::parser::{parse, EntrySelector};
use smali_ir::source::Source;
use smali_vm::executor::ExecutionLimits;
use smali_vm::run_entry;

#[derive(Error, Debug)]
enum CliError {
    #[error("could not read '{path}': {source}")]
    Io { path: String, source: io::Error },
    #[error(transparent)]
    Parse(#[from] smali_ir::ParseError),
    #[error(transparent)]
    Vm(#[from] smali_vm::VmError),
}

#[derive(Parser, Debug)]
#[command(name = "smali-emu", about = "Run or inspect a Smali method listing")]
struct Args {
    /// Input Smali file.
    #[arg(short = 'i', long = "input")]
    input: String,

    /// Print the parsed catch-block table instead of executing.
    #[arg(short = 'e', long = "catches")]
    catches: bool,

    /// Print the sorted list of method signatures instead of executing.
    #[arg(short = 'm', long = "methods")]
    methods: bool,

    /// Select the entry method by signature substring (defaults to the
    /// first method in the listing).
    #[arg(long = "entry")]
    entry: Option<String>,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), CliError> {
    let text = fs::read_to_string(&args.input).map_err(|source| CliError::Io {
        path: args.input.clone(),
        source,
    })?;
    let source = Source::from_str(&text);
    let selector = match &args.entry {
        Some(sig) => EntrySelector::BySignature(sig),
        None => EntrySelector::First,
    };
    let program = parse(&source, selector)?;

    if args.catches {
        for c in &program.catch_blocks {
            println!(
                "{:?} [{}, {}) -> {} ({:?})",
                c.exception_type, c.start_line, c.end_line, c.handler_label, c.kind
            );
        }
        return Ok(());
    }

    if args.methods {
        for m in &program.methods {
            println!("{}", m.signature);
        }
        return Ok(());
    }

    let result = run_entry(&program, Vec::new(), ExecutionLimits::unbounded())?;
    match result {
        Some(v) => println!("{}", v.display()),
        None => println!("<void>"),
    }
    Ok(())
}
