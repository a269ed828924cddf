//! Dispatch, padding, and the driver loop.
//!
//! `print` scans literal text vs. `%` specifiers; each specifier is
//! resolved by the scanner and handed to the dispatch core, which selects
//! a numeric routine (or re-dispatches after a runtime type coercion) and
//! then pads, aligns, and streams the rendered text into the sink.
//!
//! The first failure aborts the call; output already streamed stays in
//! the sink (sinks are append-only, nothing is rolled back).

use std::{fmt, io};

use crate::errors::{self, FormatError, fail};
use crate::locale::Locale;
use crate::num::{self, NumBuf, NumConv};
use crate::scan::{self, ScanState, Spec};
use crate::sink::{FixedTarget, FmtTarget, StringTarget, Target, WriteTarget};
use crate::value::{Arg, ArgValue};

/// Coercion re-dispatch bound. The semantics need at most two hops
/// (integer→double, string→numeric→…); anything deeper is a logic error
/// reported as `InvalidArgument` instead of recursing further.
const MAX_COERCE_DEPTH: usize = 4;

/// Formats one resolved specifier and argument cell into the sink.
///
/// This is the dispatch core; custom formatters re-enter through it with
/// a replacement cell.
pub fn format_value(
    target: &mut dyn Target,
    spec: &Spec,
    arg: &Arg<'_>,
) -> Result<(), FormatError> {
    dispatch(target, spec, arg, 0)
}

fn dispatch(
    target: &mut dyn Target,
    spec: &Spec,
    arg: &Arg<'_>,
    depth: usize,
) -> Result<(), FormatError> {
    if depth > MAX_COERCE_DEPTH {
        return fail(FormatError::InvalidArgument);
    }
    match spec.conversion {
        // `%m` substitutes the current error-message text.
        b'm' => {
            let message = errors::last_error_message();
            let cell = Arg::str(message.as_bytes());
            let mut sub = *spec;
            sub.conversion = b's';
            dispatch(target, &sub, &cell, depth + 1)
        }
        b'%' => emit_padded(target, spec, false, b"", b"%"),
        _ => match arg.value {
            ArgValue::None => fail(FormatError::InvalidArgument),
            ArgValue::Signed(v) => integer(target, spec, v.unsigned_abs(), v < 0, depth),
            ArgValue::Unsigned(v) => integer(target, spec, v, false, depth),
            ArgValue::Double(v) => double(target, spec, v, depth),
            ArgValue::Str(s) => string(target, spec, s, depth),
            ArgValue::CountI16(c) => count_cell(
                target,
                spec,
                depth,
                c.get() as i64,
                false,
                i16::MAX as usize,
                &|n| c.set(n as i16),
                c as *const _ as usize,
            ),
            ArgValue::CountU16(c) => count_cell(
                target,
                spec,
                depth,
                c.get() as i64,
                true,
                u16::MAX as usize,
                &|n| c.set(n as u16),
                c as *const _ as usize,
            ),
            ArgValue::CountI32(c) => count_cell(
                target,
                spec,
                depth,
                c.get() as i64,
                false,
                i32::MAX as usize,
                &|n| c.set(n as i32),
                c as *const _ as usize,
            ),
            ArgValue::CountU32(c) => count_cell(
                target,
                spec,
                depth,
                c.get() as i64,
                true,
                u32::MAX as usize,
                &|n| c.set(n as u32),
                c as *const _ as usize,
            ),
            ArgValue::CountI64(c) => count_cell(
                target,
                spec,
                depth,
                c.get(),
                false,
                i64::MAX as usize,
                &|n| c.set(n as i64),
                c as *const _ as usize,
            ),
            ArgValue::CountU64(c) => count_cell(
                target,
                spec,
                depth,
                c.get() as i64,
                true,
                usize::MAX,
                &|n| c.set(n as u64),
                c as *const _ as usize,
            ),
            ArgValue::Opaque(addr) => match spec.conversion {
                b'p' => pointer_addr(target, spec, addr),
                _ => match arg.formatter {
                    Some(custom) => custom(target, spec),
                    None => fail(FormatError::NoFormatFunction),
                },
            },
        },
    }
}

/// Integer-kind dispatch. `magnitude` is the absolute value; `negative`
/// selects the sign; the two's-complement bit pattern is reconstructed
/// for the unsigned conversions.
fn integer(
    target: &mut dyn Target,
    spec: &Spec,
    magnitude: u64,
    negative: bool,
    depth: usize,
) -> Result<(), FormatError> {
    let raw = if negative {
        magnitude.wrapping_neg()
    } else {
        magnitude
    };
    match spec.conversion {
        b'd' | b'i' => {
            let locale = target.locale();
            let mut buf = NumBuf::new();
            let nc = num::decimal(&mut buf, magnitude, negative, spec, &locale)?;
            emit_num(target, spec, &buf, nc)
        }
        b'u' => {
            let locale = target.locale();
            let mut buf = NumBuf::new();
            let nc = num::decimal(&mut buf, raw, false, spec, &locale)?;
            emit_num(target, spec, &buf, nc)
        }
        b'o' | b'x' | b'X' | b'b' | b'B' => {
            let mut buf = NumBuf::new();
            let nc = num::radix(&mut buf, raw, spec)?;
            emit_num(target, spec, &buf, nc)
        }
        b'p' => pointer_addr(target, spec, raw as usize),
        b'c' | b'C' => {
            if negative {
                return fail(FormatError::IllegalSequence);
            }
            let scalar = match u32::try_from(magnitude).ok().and_then(char::from_u32) {
                Some(c) => c,
                None => return fail(FormatError::IllegalSequence),
            };
            let mut utf8 = [0u8; 4];
            let encoded = scalar.encode_utf8(&mut utf8);
            emit_padded(target, spec, false, b"", encoded.as_bytes())
        }
        b's' | b'S' => {
            // Canonical decimal text (at least one digit), then string
            // semantics for width and precision.
            let mut buf = NumBuf::new();
            let nc = num::decimal(&mut buf, magnitude, negative, &Spec::new(b'd'), &Locale::c())?;
            string(target, spec, nc.rendered(&buf), depth + 1)
        }
        b'e' | b'E' | b'f' | b'F' | b'g' | b'G' | b'a' | b'A' => {
            let v = if negative {
                -(magnitude as f64)
            } else {
                magnitude as f64
            };
            dispatch(target, spec, &Arg::double(v), depth + 1)
        }
        _ => fail(FormatError::InvalidArgument),
    }
}

/// Double-kind dispatch.
fn double(
    target: &mut dyn Target,
    spec: &Spec,
    value: f64,
    depth: usize,
) -> Result<(), FormatError> {
    match spec.conversion {
        b'e' | b'E' | b'f' | b'F' | b'g' | b'G' => {
            let locale = target.locale();
            let mut sub = *spec;
            if !value.is_finite() {
                sub.flags.zero_pad = false;
            }
            let mut buf = NumBuf::new();
            let nc = num::double_decimal(&mut buf, value, &sub, &locale)?;
            emit_num(target, &sub, &buf, nc)
        }
        b'a' | b'A' => {
            let mut sub = *spec;
            if !value.is_finite() {
                sub.flags.zero_pad = false;
            }
            let mut buf = NumBuf::new();
            let nc = num::hex_double(&mut buf, value, &sub)?;
            emit_num(target, &sub, &buf, nc)
        }
        b'd' | b'i' | b'c' | b'C' => {
            dispatch(target, spec, &Arg::signed(value.round() as i64), depth + 1)
        }
        b'u' | b'o' | b'x' | b'X' | b'b' | b'B' => {
            let raw = value.round() as i64 as u64;
            dispatch(target, spec, &Arg::unsigned(raw), depth + 1)
        }
        _ => fail(FormatError::InvalidArgument),
    }
}

/// String-kind dispatch.
fn string(
    target: &mut dyn Target,
    spec: &Spec,
    bytes: &[u8],
    depth: usize,
) -> Result<(), FormatError> {
    match spec.conversion {
        b's' | b'S' => {
            let max = spec.precision.unwrap_or(bytes.len());
            let effective = &bytes[..bytes.len().min(max)];
            emit_padded(target, spec, false, b"", effective)
        }
        b'd' | b'i' => {
            let v = parse_double_prefix(bytes).unwrap_or(0.0);
            dispatch(target, spec, &Arg::signed(v as i64), depth + 1)
        }
        b'u' | b'o' | b'x' | b'X' | b'b' | b'B' => {
            let v = parse_double_prefix(bytes).unwrap_or(0.0);
            dispatch(target, spec, &Arg::unsigned(v as i64 as u64), depth + 1)
        }
        b'e' | b'E' | b'f' | b'F' | b'g' | b'G' | b'a' | b'A' => {
            let v = parse_double_prefix(bytes).unwrap_or(f64::NAN);
            dispatch(target, spec, &Arg::double(v), depth + 1)
        }
        _ => fail(FormatError::InvalidArgument),
    }
}

/// Count-pointer-kind dispatch: `%n` writes the sink's byte count back
/// through the cell (range-checked against the pointee width), `%p`
/// formats the cell's address, anything else formats the pointee.
#[allow(clippy::too_many_arguments)]
fn count_cell(
    target: &mut dyn Target,
    spec: &Spec,
    depth: usize,
    pointee: i64,
    unsigned: bool,
    max_count: usize,
    store: &dyn Fn(usize),
    addr: usize,
) -> Result<(), FormatError> {
    match spec.conversion {
        b'n' => {
            let n = target.count();
            if n > max_count {
                return fail(FormatError::RangeError);
            }
            store(n);
            Ok(())
        }
        b'p' => pointer_addr(target, spec, addr),
        _ => {
            let cell = if unsigned {
                Arg::unsigned(pointee as u64)
            } else {
                Arg::signed(pointee)
            };
            dispatch(target, spec, &cell, depth + 1)
        }
    }
}

/// Formats an address as alternate-form hex.
fn pointer_addr(target: &mut dyn Target, spec: &Spec, addr: usize) -> Result<(), FormatError> {
    let mut sub = *spec;
    sub.conversion = b'x';
    sub.flags.alt_form = true;
    let mut buf = NumBuf::new();
    let nc = num::radix(&mut buf, addr as u64, &sub)?;
    emit_num(target, &sub, &buf, nc)
}

fn emit_num(
    target: &mut dyn Target,
    spec: &Spec,
    buf: &NumBuf,
    nc: NumConv,
) -> Result<(), FormatError> {
    emit_padded(target, spec, true, nc.prefix(buf), nc.digits(buf))
}

/// Pads, aligns, and streams rendered text.
///
/// The fill byte is `0` only when zero padding was requested, no
/// precision was given, the alignment is the default right alignment,
/// and the conversion is numeric. Zero fill goes between the sign/radix
/// prefix and the digit body (`-0007`, not `000-7`).
fn emit_padded(
    target: &mut dyn Target,
    spec: &Spec,
    numeric: bool,
    prefix: &[u8],
    body: &[u8],
) -> Result<(), FormatError> {
    let flags = &spec.flags;
    let rendered = prefix.len() + body.len();
    let fill = if flags.zero_pad
        && spec.precision.is_none()
        && !flags.centre_align
        && !flags.left_align
        && numeric
    {
        b'0'
    } else {
        b' '
    };
    let gap = spec.width.map_or(0, |w| w.saturating_sub(rendered));

    if flags.left_align {
        target.put_slice(prefix);
        target.put_slice(body);
        put_fill(target, fill, gap);
    } else if fill == b'0' && !prefix.is_empty() {
        target.put_slice(prefix);
        put_fill(target, b'0', gap);
        target.put_slice(body);
    } else if flags.centre_align {
        put_fill(target, fill, gap / 2);
        target.put_slice(prefix);
        target.put_slice(body);
        put_fill(target, fill, gap - gap / 2);
    } else {
        put_fill(target, fill, gap);
        target.put_slice(prefix);
        target.put_slice(body);
    }
    Ok(())
}

fn put_fill(target: &mut dyn Target, byte: u8, count: usize) {
    for _ in 0..count {
        target.put(byte);
    }
}

/// Longest leading run of `bytes` that parses as a double, in the
/// spirit of C `strtod`: optional sign, digits with an optional point,
/// an optional exponent, or an `inf`/`nan` token.
fn parse_double_prefix(bytes: &[u8]) -> Option<f64> {
    let mut i = 0;
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    let start = i;
    if i < bytes.len() && (bytes[i] == b'+' || bytes[i] == b'-') {
        i += 1;
    }
    let rest = &bytes[i..];
    if rest.len() >= 3 {
        let token = [
            rest[0].to_ascii_lowercase(),
            rest[1].to_ascii_lowercase(),
            rest[2].to_ascii_lowercase(),
        ];
        if &token == b"inf" {
            return Some(if bytes[start] == b'-' {
                f64::NEG_INFINITY
            } else {
                f64::INFINITY
            });
        }
        if &token == b"nan" {
            return Some(f64::NAN);
        }
    }
    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let int_digits = i - int_start;
    let mut frac_digits = 0;
    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        let frac_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        frac_digits = i - frac_start;
    }
    if int_digits == 0 && frac_digits == 0 {
        return None;
    }
    let mut end = i;
    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        let mut j = i + 1;
        if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
            j += 1;
        }
        let exp_start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            end = j;
        }
    }
    std::str::from_utf8(&bytes[start..end]).ok()?.parse().ok()
}

// ---------------------------------------------------------------------------
// Driver loop and convenience entry points
// ---------------------------------------------------------------------------

/// Formats `fmt` with `args` into `target`.
///
/// Returns the byte count reported by the sink's `end()`. The first
/// scanner or dispatch failure aborts the call with its error kind;
/// output already written stays in the sink, and the sink is still
/// finalized so fixed buffers end up terminated.
pub fn print(
    target: &mut dyn Target,
    fmt: &[u8],
    args: &[Arg<'_>],
) -> Result<i64, FormatError> {
    target.begin();
    let mut state = ScanState::new();
    let mut pos = 0;
    let len = fmt.len();
    while pos < len {
        let literal_start = pos;
        while pos < len && fmt[pos] != b'%' {
            pos += 1;
        }
        if pos > literal_start {
            target.put_slice(&fmt[literal_start..pos]);
        }
        if pos >= len {
            break;
        }
        pos += 1; // consume '%'
        if pos < len && fmt[pos] == b'%' {
            target.put(b'%');
            pos += 1;
            continue;
        }
        let step = scan::convert(&fmt[pos..], args, &mut state).and_then(|(spec, arg, used)| {
            let cell = arg.copied().unwrap_or_else(Arg::none);
            dispatch(target, &spec, &cell, 0)?;
            Ok(used)
        });
        match step {
            Ok(used) => pos += used,
            Err(e) => {
                target.end();
                return Err(e);
            }
        }
    }
    Ok(target.end())
}

/// Formats into a fresh growable buffer and returns the text.
pub fn sprint(fmt: &[u8], args: &[Arg<'_>]) -> Result<String, FormatError> {
    let mut target = StringTarget::new();
    print(&mut target, fmt, args)?;
    Ok(target.take_string())
}

/// Like [`sprint`], with an explicit locale.
pub fn sprint_with(locale: Locale, fmt: &[u8], args: &[Arg<'_>]) -> Result<String, FormatError> {
    let mut target = StringTarget::with_locale(locale);
    print(&mut target, fmt, args)?;
    Ok(target.take_string())
}

/// Formats into a caller-owned byte buffer, truncating silently at
/// capacity minus one and NUL-terminating. Returns the stored count.
pub fn snprint(buf: &mut [u8], fmt: &[u8], args: &[Arg<'_>]) -> Result<i64, FormatError> {
    let mut target = FixedTarget::new(buf);
    print(&mut target, fmt, args)
}

/// Formats into a byte stream.
pub fn wprint<W: io::Write>(writer: W, fmt: &[u8], args: &[Arg<'_>]) -> Result<i64, FormatError> {
    let mut target = WriteTarget::new(writer);
    print(&mut target, fmt, args)
}

/// Formats into a text stream.
pub fn fprint<W: fmt::Write>(writer: W, fmt: &[u8], args: &[Arg<'_>]) -> Result<i64, FormatError> {
    let mut target = FmtTarget::new(writer);
    print(&mut target, fmt, args)
}
