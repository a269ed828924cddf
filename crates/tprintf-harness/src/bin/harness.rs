//! CLI entrypoint for the tprintf conformance harness.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use tprintf_harness::{HarnessError, builtin_set, load_fixture_file, render_report, run_set};

/// Conformance tooling for tprintf.
#[derive(Debug, Parser)]
#[command(name = "tprintf-harness")]
#[command(about = "Conformance testing harness for tprintf")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run a fixture set through the engine and compare byte-for-byte.
    Verify {
        /// Fixture JSON path; the built-in set when omitted.
        #[arg(long)]
        fixture: Option<PathBuf>,
        /// Output report path (if omitted, prints to stdout).
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Write the built-in fixture set to a JSON file.
    Generate {
        /// Output path for fixture JSON.
        #[arg(long)]
        output: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(all_passed) => {
            if all_passed {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(e) => {
            eprintln!("harness: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<bool, HarnessError> {
    match cli.command {
        Command::Verify { fixture, report } => {
            let set = match fixture {
                Some(path) => load_fixture_file(&path)?,
                None => builtin_set(),
            };
            let results = run_set(&set);
            let rendered = render_report(&results);
            match report {
                Some(path) => std::fs::write(path, &rendered)?,
                None => print!("{rendered}"),
            }
            Ok(results.iter().all(|r| r.passed))
        }
        Command::Generate { output } => {
            let set = builtin_set();
            std::fs::write(output, set.to_json()?)?;
            Ok(true)
        }
    }
}
