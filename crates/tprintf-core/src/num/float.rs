//! Floating-point decimal conversion (`e/E/f/F/g/G`).
//!
//! Digit generation is delegated to the platform formatter; the result is
//! then re-homed into the scratch buffer: the decimal point is localized
//! and, when grouping is requested and the value is finite, the integer
//! part is re-grouped by the locale's grouping walk, scanning backward
//! from the least-significant integer digit.

use crate::errors::FormatError;
use crate::locale::Locale;
use crate::scan::Spec;

use super::{NUM_BUF_LEN, NumBuf, NumConv, RevWriter, push_sign};

/// Renders a double in the style selected by the conversion character.
pub fn double_decimal(
    buf: &mut NumBuf,
    value: f64,
    spec: &Spec,
    locale: &Locale,
) -> Result<NumConv, FormatError> {
    let upper = spec.conversion.is_ascii_uppercase();
    let negative = value.is_sign_negative();
    let mut w = RevWriter::new(buf);

    if !value.is_finite() {
        let token: &[u8] = if value.is_nan() {
            if upper { b"NAN" } else { b"nan" }
        } else if upper {
            b"INF"
        } else {
            b"inf"
        };
        for &b in token.iter().rev() {
            w.push(b)?;
        }
        let body = w.pos();
        // NaN carries no sign; infinity keeps the flag-selected one.
        push_sign(
            &mut w,
            negative && !value.is_nan(),
            spec.flags.show_positive,
            spec.flags.pad_positive,
        )?;
        return Ok(NumConv {
            start: w.pos(),
            body,
            len: NUM_BUF_LEN - w.pos(),
        });
    }

    let precision = spec.precision.unwrap_or(6);
    let abs = value.abs();
    let rendered = match spec.conversion | 0x20 {
        b'e' => style_scientific(abs, precision, upper, spec.flags.alt_form),
        b'g' => style_shortest(abs, precision, upper, spec.flags.alt_form),
        _ => style_fixed(abs, precision, spec.flags.alt_form),
    };
    let bytes = rendered.as_bytes();

    // The integer part is the leading digit run; everything after it is
    // copied verbatim apart from the localized decimal point.
    let ipart_end = bytes
        .iter()
        .position(|&b| !b.is_ascii_digit())
        .unwrap_or(bytes.len());
    for i in (ipart_end..bytes.len()).rev() {
        let b = bytes[i];
        w.push(if b == b'.' { locale.decimal_point } else { b })?;
    }

    if spec.flags.group_digits && locale.groups_digits() {
        let mut walk = locale.grouping_walk();
        let mut remaining = walk.next_group();
        for &b in bytes[..ipart_end].iter().rev() {
            if remaining == Some(0) {
                w.push(locale.thousands_sep)?;
                remaining = walk.next_group();
            }
            w.push(b)?;
            if let Some(r) = remaining.as_mut() {
                *r -= 1;
            }
        }
    } else {
        for i in (0..ipart_end).rev() {
            w.push(bytes[i])?;
        }
    }

    let body = w.pos();
    push_sign(
        &mut w,
        negative,
        spec.flags.show_positive,
        spec.flags.pad_positive,
    )?;
    Ok(NumConv {
        start: w.pos(),
        body,
        len: NUM_BUF_LEN - w.pos(),
    })
}

/// `f`/`F`: fixed-point decimal.
fn style_fixed(value: f64, precision: usize, alt_form: bool) -> String {
    let mut s = format!("{value:.precision$}");
    if precision == 0 && alt_form {
        s.push('.');
    }
    s
}

/// `e`/`E`: scientific notation with a signed two-digit-minimum exponent.
fn style_scientific(value: f64, precision: usize, upper: bool, alt_form: bool) -> String {
    let s = format!("{value:.precision$e}");
    let (mantissa, exp) = s.split_once('e').expect("exponent marker");
    let exp: i32 = exp.parse().expect("decimal exponent");
    let mut out = String::from(mantissa);
    if precision == 0 && alt_form {
        out.push('.');
    }
    out.push(if upper { 'E' } else { 'e' });
    out.push(if exp < 0 { '-' } else { '+' });
    let magnitude = exp.unsigned_abs();
    if magnitude < 10 {
        out.push('0');
    }
    out.push_str(&magnitude.to_string());
    out
}

/// `g`/`G`: fixed or scientific, whichever is shorter per the C rule, with
/// trailing zeros stripped unless the alternate form is requested.
fn style_shortest(value: f64, precision: usize, upper: bool, alt_form: bool) -> String {
    let p = precision.max(1);
    // Decimal exponent after rounding to p significant digits.
    let probe = format!("{value:.prec$e}", prec = p - 1);
    let exp: i32 = probe[probe.find('e').expect("exponent marker") + 1..]
        .parse()
        .expect("decimal exponent");

    if exp >= -4 && exp < p as i32 {
        let frac = usize::try_from((p as i32 - 1 - exp).max(0)).unwrap_or(0);
        let mut s = format!("{value:.frac$}");
        if alt_form {
            if frac == 0 {
                s.push('.');
            }
        } else {
            strip_trailing_zeros(&mut s);
        }
        s
    } else {
        let mut s = style_scientific(value, p - 1, upper, alt_form);
        if !alt_form
            && let Some(e_pos) = s.bytes().position(|b| b == b'e' || b == b'E')
        {
            let mut mantissa = s[..e_pos].to_string();
            strip_trailing_zeros(&mut mantissa);
            let exp_part = &s[e_pos..];
            s = format!("{mantissa}{exp_part}");
        }
        s
    }
}

/// Removes trailing zeros after the decimal point.
fn strip_trailing_zeros(s: &mut String) {
    if s.contains('.') {
        while s.ends_with('0') {
            s.pop();
        }
        if s.ends_with('.') {
            s.pop();
        }
    }
}
