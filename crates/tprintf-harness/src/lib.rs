//! Conformance tooling for the tprintf formatting engine.
//!
//! Fixture files describe (format string, typed arguments, expected
//! output) triples; the runner feeds them through the engine and compares
//! byte-for-byte. The `harness` binary wraps this behind a CLI.

pub mod fixtures;
pub mod runner;

pub use fixtures::{ArgSpec, FixtureCase, FixtureSet, builtin_set, error_name};
pub use runner::{CaseResult, render_report, run_case, run_set};

use std::path::Path;

use thiserror::Error;

/// Harness-level failures.
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("fixture parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Loads a fixture set from a JSON file.
pub fn load_fixture_file(path: &Path) -> Result<FixtureSet, HarnessError> {
    let content = std::fs::read_to_string(path)?;
    Ok(FixtureSet::from_json(&content)?)
}
