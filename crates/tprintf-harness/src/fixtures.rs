//! Fixture loading and management.

use serde::{Deserialize, Serialize};
use tprintf_core::{Arg, FormatError, Locale};

/// A typed argument value as stored in fixture JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ArgSpec {
    Int(i64),
    Uint(u64),
    Double(f64),
    Str(String),
}

impl ArgSpec {
    /// Captures this fixture value into an engine cell borrowing `self`.
    pub fn to_arg(&self) -> Arg<'_> {
        match self {
            ArgSpec::Int(v) => Arg::signed(*v),
            ArgSpec::Uint(v) => Arg::unsigned(*v),
            ArgSpec::Double(v) => Arg::double(*v),
            ArgSpec::Str(s) => Arg::str(s.as_bytes()),
        }
    }
}

/// Locale override for a fixture case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocaleSpec {
    /// Decimal-point character.
    pub decimal_point: char,
    /// Thousands separator.
    pub thousands_sep: char,
    /// Grouping specification.
    pub grouping: Vec<u8>,
}

impl LocaleSpec {
    pub fn to_locale(&self) -> Locale {
        Locale::with_grouping(
            self.decimal_point as u8,
            self.thousands_sep as u8,
            self.grouping.clone(),
        )
    }
}

/// A single fixture test case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureCase {
    /// Case identifier.
    pub name: String,
    /// Format string fed to the engine.
    pub format: String,
    /// Typed arguments.
    #[serde(default)]
    pub args: Vec<ArgSpec>,
    /// Locale override; the neutral "C" locale when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<LocaleSpec>,
    /// Expected output text. Exactly one of `expected`/`expected_error`
    /// must be present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    /// Expected failure kind (see [`error_name`]).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_error: Option<String>,
}

/// A collection of fixture cases.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureSet {
    /// Schema version.
    pub version: String,
    /// Fixture family name.
    pub family: String,
    /// Individual test cases.
    pub cases: Vec<FixtureCase>,
}

impl FixtureSet {
    /// Load fixture set from JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize fixture set to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Stable name for an engine error kind, as used in fixture files.
pub fn error_name(error: FormatError) -> &'static str {
    match error {
        FormatError::InvalidArgument => "invalid_argument",
        FormatError::NoSpace => "no_space",
        FormatError::IllegalSequence => "illegal_sequence",
        FormatError::RangeError => "range_error",
        FormatError::NoFormatFunction => "no_format_function",
    }
}

/// Built-in fixture set covering the engine's documented properties.
pub fn builtin_set() -> FixtureSet {
    let thousands = Some(LocaleSpec {
        decimal_point: '.',
        thousands_sep: ',',
        grouping: vec![3],
    });
    let ok = |name: &str, format: &str, args: Vec<ArgSpec>, expected: &str| FixtureCase {
        name: name.into(),
        format: format.into(),
        args,
        locale: None,
        expected: Some(expected.into()),
        expected_error: None,
    };
    let err = |name: &str, format: &str, args: Vec<ArgSpec>, kind: &str| FixtureCase {
        name: name.into(),
        format: format.into(),
        args,
        locale: None,
        expected: None,
        expected_error: Some(kind.into()),
    };

    let mut cases = vec![
        ok("literal_passthrough", "plain text", vec![], "plain text"),
        ok("percent_escape", "100%%", vec![], "100%"),
        ok("decimal_basic", "%d", vec![ArgSpec::Int(42)], "42"),
        ok(
            "zero_pad_sign_ordering",
            "%05d",
            vec![ArgSpec::Int(-7)],
            "-0007",
        ),
        ok(
            "zero_pad_hex_prefix_ordering",
            "%#06x",
            vec![ArgSpec::Uint(0xa)],
            "0x000a",
        ),
        ok(
            "octal_alternate_form",
            "%#o",
            vec![ArgSpec::Uint(8)],
            "010",
        ),
        ok(
            "binary_alternate_form",
            "%#b",
            vec![ArgSpec::Uint(5)],
            "0b101",
        ),
        ok(
            "width_from_argument",
            "%*d",
            vec![ArgSpec::Int(6), ArgSpec::Int(42)],
            "    42",
        ),
        ok(
            "precision_from_argument",
            "%.*f",
            vec![ArgSpec::Int(2), ArgSpec::Double(3.14159)],
            "3.14",
        ),
        ok(
            "positional_reorder",
            "%2$s %1$s",
            vec![ArgSpec::Str("world".into()), ArgSpec::Str("hello".into())],
            "hello world",
        ),
        ok(
            "centre_align",
            "%=7s",
            vec![ArgSpec::Str("abc".into())],
            "  abc  ",
        ),
        ok(
            "string_precision_truncates",
            "%.3s",
            vec![ArgSpec::Str("hello".into())],
            "hel",
        ),
        ok(
            "float_default_precision",
            "%f",
            vec![ArgSpec::Double(2.5)],
            "2.500000",
        ),
        ok(
            "scientific_exponent_shape",
            "%.2e",
            vec![ArgSpec::Double(1234.5)],
            "1.23e+03",
        ),
        ok(
            "shortest_strips_zeros",
            "%g",
            vec![ArgSpec::Double(1.5)],
            "1.5",
        ),
        ok(
            "hex_float_one",
            "%a",
            vec![ArgSpec::Double(1.0)],
            "0x1p+0",
        ),
        ok(
            "hex_float_infinity",
            "%A",
            vec![ArgSpec::Double(f64::INFINITY)],
            "INF",
        ),
        ok(
            "integer_to_float_coercion",
            "%.1f",
            vec![ArgSpec::Int(3)],
            "3.0",
        ),
        ok(
            "string_to_integer_coercion",
            "%d",
            vec![ArgSpec::Str("3.5".into())],
            "3",
        ),
        ok(
            "double_to_integer_rounds",
            "%d",
            vec![ArgSpec::Double(2.6)],
            "3",
        ),
        ok("char_from_scalar", "%c", vec![ArgSpec::Int(65)], "A"),
        err(
            "mixed_indexing_rejected",
            "%1$d %d",
            vec![ArgSpec::Int(1), ArgSpec::Int(2)],
            "invalid_argument",
        ),
        err(
            "missing_argument_rejected",
            "%d %d",
            vec![ArgSpec::Int(1)],
            "invalid_argument",
        ),
        err(
            "surrogate_scalar_rejected",
            "%c",
            vec![ArgSpec::Uint(0xd800)],
            "illegal_sequence",
        ),
        err(
            "unknown_conversion_rejected",
            "%q",
            vec![ArgSpec::Int(1)],
            "invalid_argument",
        ),
    ];

    cases.push(FixtureCase {
        name: "grouped_thousands".into(),
        format: "%'d".into(),
        args: vec![ArgSpec::Int(1_234_567)],
        locale: thousands.clone(),
        expected: Some("1,234,567".into()),
        expected_error: None,
    });
    cases.push(FixtureCase {
        name: "grouped_float_integer_part".into(),
        format: "%'.2f".into(),
        args: vec![ArgSpec::Double(9_876_543.21)],
        locale: thousands,
        expected: Some("9,876,543.21".into()),
        expected_error: None,
    });

    FixtureSet {
        version: "1".into(),
        family: "format".into(),
        cases,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_set_round_trips_through_json() {
        let set = builtin_set();
        let json = set.to_json().unwrap();
        let back = FixtureSet::from_json(&json).unwrap();
        assert_eq!(back.cases.len(), set.cases.len());
        assert_eq!(back.family, "format");
    }

    #[test]
    fn every_case_has_exactly_one_expectation() {
        for case in builtin_set().cases {
            assert!(
                case.expected.is_some() ^ case.expected_error.is_some(),
                "case {} must expect output or an error, not both",
                case.name
            );
        }
    }

    #[test]
    fn arg_spec_captures_each_kind() {
        assert!(matches!(
            ArgSpec::Int(-1).to_arg().value,
            tprintf_core::ArgValue::Signed(-1)
        ));
        assert!(matches!(
            ArgSpec::Str("x".into()).to_arg().value,
            tprintf_core::ArgValue::Str(b"x")
        ));
    }
}
