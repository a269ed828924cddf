//! Fixture execution engine.

use tprintf_core::{Arg, Locale, sprint_with};

use crate::fixtures::{FixtureCase, FixtureSet, error_name};

/// Outcome of one fixture case.
#[derive(Debug, Clone)]
pub struct CaseResult {
    pub name: String,
    pub passed: bool,
    pub expected: String,
    pub actual: String,
}

/// Runs every case in a set and collects results.
pub fn run_set(set: &FixtureSet) -> Vec<CaseResult> {
    set.cases.iter().map(run_case).collect()
}

/// Runs one case through the engine and compares byte-for-byte.
pub fn run_case(case: &FixtureCase) -> CaseResult {
    let locale = case
        .locale
        .as_ref()
        .map_or_else(Locale::c, |spec| spec.to_locale());
    let cells: Vec<Arg<'_>> = case.args.iter().map(|a| a.to_arg()).collect();

    let actual = match sprint_with(locale, case.format.as_bytes(), &cells) {
        Ok(text) => text,
        Err(e) => format!("error: {}", error_name(e)),
    };
    let expected = match (&case.expected, &case.expected_error) {
        (Some(text), _) => text.clone(),
        (None, Some(kind)) => format!("error: {kind}"),
        (None, None) => String::from("error: <unspecified>"),
    };

    CaseResult {
        name: case.name.clone(),
        passed: actual == expected,
        expected,
        actual,
    }
}

/// Renders results as a plain-text report, one line per case.
pub fn render_report(results: &[CaseResult]) -> String {
    let mut out = String::new();
    let passed = results.iter().filter(|r| r.passed).count();
    out.push_str(&format!(
        "# tprintf conformance: {passed}/{} passed\n\n",
        results.len()
    ));
    for r in results {
        if r.passed {
            out.push_str(&format!("PASS {}\n", r.name));
        } else {
            out.push_str(&format!(
                "FAIL {}\n  expected: {:?}\n  actual:   {:?}\n",
                r.name, r.expected, r.actual
            ));
        }
    }
    out
}
