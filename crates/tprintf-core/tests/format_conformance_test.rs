//! End-to-end conformance tests for the formatting engine.
//!
//! Exercises the public entry points the way callers use them: driver
//! loop, scanner, dispatch core, numeric routines, and sinks together.

use std::cell::Cell;

use tprintf_core::{
    Arg, FixedTarget, FormatError, Locale, StringTarget, args, fprint, print, snprint, sprint,
    sprint_with, wprint,
};

// ── digit round-trips ────────────────────────────────────────────

#[test]
fn rendered_digits_round_trip_in_every_base() {
    for value in [0u64, 1, 7, 42, 255, 4096, 65535, 123_456_789, u64::MAX] {
        let dec = sprint(b"%u", &args![value]).unwrap();
        assert_eq!(dec.parse::<u64>().unwrap(), value);
        let oct = sprint(b"%o", &args![value]).unwrap();
        assert_eq!(u64::from_str_radix(&oct, 8).unwrap(), value);
        let hex = sprint(b"%x", &args![value]).unwrap();
        assert_eq!(u64::from_str_radix(&hex, 16).unwrap(), value);
        let bin = sprint(b"%b", &args![value]).unwrap();
        assert_eq!(u64::from_str_radix(&bin, 2).unwrap(), value);
    }
}

// ── sign and prefix ordering under zero fill ─────────────────────

#[test]
fn zero_fill_goes_between_sign_and_digits() {
    assert_eq!(sprint(b"%05d", &args![-7]).unwrap(), "-0007");
}

#[test]
fn zero_fill_goes_between_radix_prefix_and_digits() {
    assert_eq!(sprint(b"%#06x", &args![0xau32]).unwrap(), "0x000a");
}

#[test]
fn positive_sign_flags() {
    assert_eq!(sprint(b"%+d", &args![42]).unwrap(), "+42");
    assert_eq!(sprint(b"% d", &args![42]).unwrap(), " 42");
    assert_eq!(sprint(b"%+06d", &args![42]).unwrap(), "+00042");
}

// ── grouping ─────────────────────────────────────────────────────

#[test]
fn grouping_inserts_locale_separator() {
    let loc = Locale::with_grouping(b'.', b',', vec![3]);
    let out = sprint_with(loc, b"%'d", &args![1_234_567]).unwrap();
    assert_eq!(out, "1,234,567");
}

#[test]
fn grouping_flag_is_inert_in_c_locale() {
    assert_eq!(sprint(b"%'d", &args![1_234_567]).unwrap(), "1234567");
}

#[test]
fn grouping_applies_to_float_integer_part() {
    let loc = Locale::with_grouping(b'.', b',', vec![3]);
    let out = sprint_with(loc, b"%'.2f", &args![9_876_543.21]).unwrap();
    assert_eq!(out, "9,876,543.21");
}

// ── width/precision via arguments ────────────────────────────────

#[test]
fn width_from_argument() {
    assert_eq!(sprint(b"%*d", &args![6, 42]).unwrap(), "    42");
}

#[test]
fn precision_from_argument() {
    assert_eq!(sprint(b"%.*f", &args![2, 3.14159]).unwrap(), "3.14");
}

#[test]
fn negative_width_argument_left_aligns() {
    assert_eq!(sprint(b"%*d", &args![-6, 42]).unwrap(), "42    ");
}

// ── positional arguments ─────────────────────────────────────────

#[test]
fn positional_arguments_reorder() {
    let out = sprint(b"%2$s %1$s", &args!["world", "hello"]).unwrap();
    assert_eq!(out, "hello world");
}

#[test]
fn positional_argument_may_repeat() {
    let out = sprint(b"%1$s-%1$s", &args!["dup"]).unwrap();
    assert_eq!(out, "dup-dup");
}

#[test]
fn mixing_explicit_and_implicit_indices_fails() {
    assert_eq!(
        sprint(b"%1$d %d", &args![1, 2]),
        Err(FormatError::InvalidArgument)
    );
}

#[test]
fn missing_arguments_fail() {
    assert_eq!(sprint(b"%d %d", &args![1]), Err(FormatError::InvalidArgument));
    assert_eq!(sprint(b"%3$d", &args![1, 2]), Err(FormatError::InvalidArgument));
}

// ── idempotence ──────────────────────────────────────────────────

#[test]
fn formatting_twice_is_byte_identical() {
    let cells = args![-42, "text", 2.5, 0xffu32];
    let fmt: &[u8] = b"%08d | %=10s | %.3e | %#x";
    let first = sprint(fmt, &cells).unwrap();
    let second = sprint(fmt, &cells).unwrap();
    assert_eq!(first, second);
}

// ── hex-float boundaries ─────────────────────────────────────────

#[test]
fn hex_float_boundary_values() {
    assert_eq!(sprint(b"%a", &args![f64::INFINITY]).unwrap(), "inf");
    assert_eq!(sprint(b"%A", &args![f64::INFINITY]).unwrap(), "INF");
    assert_eq!(sprint(b"%a", &args![f64::NAN]).unwrap(), "nan");
    assert_eq!(sprint(b"%A", &args![f64::NAN]).unwrap(), "NAN");
    assert_eq!(sprint(b"%a", &args![1.0]).unwrap(), "0x1p+0");
}

#[test]
fn hex_float_zero_fill_goes_after_radix_prefix() {
    assert_eq!(sprint(b"%09a", &args![1.5]).unwrap(), "0x01.8p+0");
}

// ── truncation ───────────────────────────────────────────────────

#[test]
fn fixed_sink_truncates_and_terminates() {
    let mut buf = [0xffu8; 4];
    let n = snprint(&mut buf, b"0123456789", &args![]).unwrap();
    assert_eq!(n, 3);
    assert_eq!(&buf, b"012\0");
}

#[test]
fn fixed_sink_counts_stored_bytes_for_n() {
    let mut buf = [0u8; 4];
    let seen = Cell::new(0i32);
    let n = snprint(&mut buf, b"abcdef%n", &args![&seen]).unwrap();
    assert_eq!(n, 3);
    assert_eq!(seen.get(), 3);
}

// ── type coercion ────────────────────────────────────────────────

#[test]
fn integer_formats_like_equivalent_double() {
    assert_eq!(
        sprint(b"%f", &args![7]).unwrap(),
        sprint(b"%f", &args![7.0]).unwrap()
    );
    assert_eq!(
        sprint(b"%.2e", &args![-12345]).unwrap(),
        sprint(b"%.2e", &args![-12345.0]).unwrap()
    );
}

#[test]
fn string_with_integer_conversion_truncates_toward_zero() {
    assert_eq!(sprint(b"%d", &args!["3.5"]).unwrap(), "3");
}

#[test]
fn double_with_char_conversion_rounds_to_scalar() {
    assert_eq!(sprint(b"%c", &args![65.4]).unwrap(), "A");
}

// ── strings, chars, pointers ─────────────────────────────────────

#[test]
fn string_precision_truncates() {
    assert_eq!(sprint(b"%.3s", &args!["hello"]).unwrap(), "hel");
    assert_eq!(sprint(b"%8.3s", &args!["hello"]).unwrap(), "     hel");
    assert_eq!(sprint(b"%-8.3s", &args!["hello"]).unwrap(), "hel     ");
}

#[test]
fn wide_aliases_match_narrow_conversions() {
    assert_eq!(
        sprint(b"%S", &args!["abc"]).unwrap(),
        sprint(b"%s", &args!["abc"]).unwrap()
    );
    assert_eq!(
        sprint(b"%C", &args![66]).unwrap(),
        sprint(b"%c", &args![66]).unwrap()
    );
}

#[test]
fn integer_pointer_conversion_uses_alternate_hex() {
    assert_eq!(sprint(b"%p", &args![0xdeadu64]).unwrap(), "0xdead");
}

// ── sinks ────────────────────────────────────────────────────────

#[test]
fn byte_stream_sink_collects_output() {
    let mut out: Vec<u8> = Vec::new();
    let n = wprint(&mut out, b"%d bytes", &args![5]).unwrap();
    assert_eq!(n, 7);
    assert_eq!(out, b"5 bytes");
}

#[test]
fn text_stream_sink_collects_chars() {
    let mut out = String::new();
    fprint(&mut out, b"%s \xe2\x82\xac%d", &args!["cost:", 9]).unwrap();
    assert_eq!(out, "cost: \u{20ac}9");
}

#[test]
fn sink_reuse_resets_between_calls() {
    let mut target = StringTarget::new();
    print(&mut target, b"%d", &args![1]).unwrap();
    print(&mut target, b"%d", &args![2]).unwrap();
    assert_eq!(target.as_bytes(), b"2");
}

#[test]
fn failure_still_terminates_fixed_sink() {
    let mut buf = [0xffu8; 8];
    let r = {
        let mut target = FixedTarget::new(&mut buf);
        print(&mut target, b"ab%q", &args![])
    };
    assert_eq!(r, Err(FormatError::InvalidArgument));
    assert_eq!(&buf[..3], b"ab\0");
}

// ── length modifiers and literal '%' specifiers ──────────────────

#[test]
fn length_modifiers_are_accepted_and_ignored() {
    assert_eq!(sprint(b"%lld %hu %zd", &args![1, 2, 3]).unwrap(), "1 2 3");
}

#[test]
fn lone_trailing_percent_is_an_error() {
    assert_eq!(sprint(b"oops %", &args![]), Err(FormatError::InvalidArgument));
}

// ── larger composed formats ──────────────────────────────────────

#[test]
fn composed_report_line() {
    let loc = Locale::with_grouping(b'.', b',', vec![3]);
    let out = sprint_with(
        loc,
        b"[%-6s] %'9d rows, %6.2f%% done, checksum %#010x",
        &args!["load", 1_048_576, 99.5, 0xdeadu32],
    )
    .unwrap();
    assert_eq!(out, "[load  ] 1,048,576 rows,  99.50% done, checksum 0x0000dead");
}
