//! Hexadecimal floating-point conversion (`a/A`).
//!
//! Operates on the IEEE-754 bit pattern directly: {1 sign bit, 11-bit
//! exponent, 52-bit mantissa}. Normal values get the implicit leading `1`;
//! subnormals keep a leading `0` with the fixed -1022 exponent. Output is
//! `0x<d>.<hex-mantissa>p<signed-decimal-exponent>`.

use crate::errors::{FormatError, fail};
use crate::scan::Spec;

use super::{NUM_BUF_LEN, NumBuf, NumConv, RevWriter, push_decimal_digits, push_sign};

const MANTISSA_BITS: u32 = 52;
const MANTISSA_NIBBLES: usize = 13;
const EXPONENT_MASK: u64 = 0x7ff;
const EXPONENT_BIAS: i64 = 1023;

/// Renders a double as hexadecimal floating point.
///
/// With an explicit precision the mantissa is rounded to that many
/// nibbles, round-half-up on the first discarded nibble (a carry may
/// propagate into the leading digit). Without one, trailing zero nibbles
/// are dropped: `1.0` renders as `0x1p+0`.
pub fn hex_double(buf: &mut NumBuf, value: f64, spec: &Spec) -> Result<NumConv, FormatError> {
    let upper = spec.conversion == b'A';
    let mut w = RevWriter::new(buf);
    if w.free() < 4 {
        return fail(FormatError::NoSpace);
    }

    let bits = value.to_bits();
    let negative = bits >> 63 == 1;
    let exp_field = ((bits >> MANTISSA_BITS) & EXPONENT_MASK) as i64;
    let raw_mantissa = bits & ((1u64 << MANTISSA_BITS) - 1);

    if exp_field == EXPONENT_MASK as i64 {
        let nan = raw_mantissa != 0;
        let token: &[u8] = match (nan, upper) {
            (true, true) => b"NAN",
            (true, false) => b"nan",
            (false, true) => b"INF",
            (false, false) => b"inf",
        };
        for &b in token.iter().rev() {
            w.push(b)?;
        }
        let body = w.pos();
        push_sign(
            &mut w,
            negative && !nan,
            spec.flags.show_positive,
            spec.flags.pad_positive,
        )?;
        return Ok(NumConv {
            start: w.pos(),
            body,
            len: NUM_BUF_LEN - w.pos(),
        });
    }

    let (mut lead, exponent) = if exp_field == 0 {
        if raw_mantissa == 0 {
            (0u64, 0i64)
        } else {
            (0u64, -(EXPONENT_BIAS - 1))
        }
    } else {
        (1u64, exp_field - EXPONENT_BIAS)
    };

    // Significant fraction nibbles, most-significant-aligned in the low
    // bits after rounding/stripping.
    let mut nibbles = raw_mantissa;
    let significant: usize;
    match spec.precision {
        Some(p) if p < MANTISSA_NIBBLES => {
            let dropped = MANTISSA_NIBBLES - p;
            let round_nibble = (nibbles >> (4 * (dropped - 1))) & 0xf;
            nibbles >>= 4 * dropped;
            if round_nibble >= 8 {
                nibbles += 1;
                let carried = if p == 0 {
                    nibbles != 0
                } else {
                    nibbles >> (4 * p) != 0
                };
                if carried {
                    lead += 1;
                    nibbles = 0;
                }
            }
            significant = p;
        }
        Some(_) => {
            significant = MANTISSA_NIBBLES;
        }
        None => {
            let mut n = MANTISSA_NIBBLES;
            while n > 0 && nibbles & 0xf == 0 {
                nibbles >>= 4;
                n -= 1;
            }
            significant = n;
        }
    }

    let digits_tbl: &[u8; 16] = if upper {
        b"0123456789ABCDEF"
    } else {
        b"0123456789abcdef"
    };

    // Exponent via the decimal-integer routine, sign always shown.
    push_decimal_digits(&mut w, exponent.unsigned_abs(), 1, None)?;
    push_sign(&mut w, exponent < 0, true, false)?;
    w.push(if upper { b'P' } else { b'p' })?;

    // Fraction: zero-fill beyond the stored mantissa, then the nibbles.
    let extra_zeros = spec
        .precision
        .map_or(0, |p| p.saturating_sub(MANTISSA_NIBBLES));
    for _ in 0..extra_zeros {
        w.push(b'0')?;
    }
    let mut v = nibbles;
    for _ in 0..significant {
        w.push(digits_tbl[(v & 0xf) as usize])?;
        v >>= 4;
    }
    if significant + extra_zeros > 0 || spec.flags.alt_form {
        w.push(b'.')?;
    }
    w.push(digits_tbl[(lead & 0xf) as usize])?;

    let body = w.pos();
    w.push(if upper { b'X' } else { b'x' })?;
    w.push(b'0')?;
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

#[cfg(test)]
mod tests {
    use super::*;

    fn render(value: f64, spec: &Spec) -> String {
        let mut buf = NumBuf::new();
        let nc = hex_double(&mut buf, value, spec).unwrap();
        String::from_utf8(nc.rendered(&buf).to_vec()).unwrap()
    }

    #[test]
    fn test_one_renders_without_fraction() {
        assert_eq!(render(1.0, &Spec::new(b'a')), "0x1p+0");
    }

    #[test]
    fn test_simple_fractions() {
        assert_eq!(render(1.5, &Spec::new(b'a')), "0x1.8p+0");
        assert_eq!(render(0.5, &Spec::new(b'a')), "0x1p-1");
        assert_eq!(render(3.0, &Spec::new(b'a')), "0x1.8p+1");
        assert_eq!(render(255.5, &Spec::new(b'a')), "0x1.ffp+7");
    }

    #[test]
    fn test_zero() {
        assert_eq!(render(0.0, &Spec::new(b'a')), "0x0p+0");
        let mut buf = NumBuf::new();
        let nc = hex_double(&mut buf, -0.0, &Spec::new(b'a')).unwrap();
        assert_eq!(nc.rendered(&buf), b"-0x0p+0");
        assert_eq!(nc.prefix(&buf), b"-0x");
    }

    #[test]
    fn test_uppercase_variant() {
        assert_eq!(render(255.5, &Spec::new(b'A')), "0X1.FFP+7");
        assert_eq!(render(f64::INFINITY, &Spec::new(b'A')), "INF");
    }

    #[test]
    fn test_non_finite_tokens() {
        assert_eq!(render(f64::INFINITY, &Spec::new(b'a')), "inf");
        assert_eq!(render(f64::NEG_INFINITY, &Spec::new(b'a')), "-inf");
        assert_eq!(render(f64::NAN, &Spec::new(b'a')), "nan");
        assert_eq!(render(f64::NAN, &Spec::new(b'A')), "NAN");
    }

    #[test]
    fn test_precision_rounds_half_up() {
        // 1.5 = 0x1.8; rounding the 8 nibble away bumps the lead digit.
        let mut s = Spec::new(b'a');
        s.precision = Some(0);
        assert_eq!(render(1.5, &s), "0x2p+0");

        // 0x1.38p+0 rounded to one nibble: discarded 8 rounds up.
        let mut s = Spec::new(b'a');
        s.precision = Some(1);
        let v = f64::from_bits(0x3ff3_8000_0000_0000);
        assert_eq!(render(v, &s), "0x1.4p+0");
    }

    #[test]
    fn test_precision_carry_through_nibbles() {
        // 0x1.ff8p+0 to two nibbles: ff + carry = 0x2.00.
        let mut s = Spec::new(b'a');
        s.precision = Some(2);
        let v = f64::from_bits(0x3fff_f800_0000_0000);
        assert_eq!(render(v, &s), "0x2.00p+0");
    }

    #[test]
    fn test_precision_pads_with_zeros() {
        let mut s = Spec::new(b'a');
        s.precision = Some(3);
        assert_eq!(render(1.5, &s), "0x1.800p+0");
        s.precision = Some(15);
        assert_eq!(render(1.5, &s), "0x1.800000000000000p+0");
    }

    #[test]
    fn test_subnormal_leads_with_zero() {
        let smallest = f64::from_bits(1);
        let mut buf = NumBuf::new();
        let nc = hex_double(&mut buf, smallest, &Spec::new(b'a')).unwrap();
        let s = String::from_utf8(nc.rendered(&buf).to_vec()).unwrap();
        assert!(s.starts_with("0x0."), "subnormal should lead with 0: {s}");
        assert!(s.ends_with("p-1022"), "fixed subnormal exponent: {s}");
    }

    #[test]
    fn test_alt_form_forces_point() {
        let mut s = Spec::new(b'a');
        s.flags.alt_form = true;
        assert_eq!(render(1.0, &s), "0x1.p+0");
    }

    #[test]
    fn test_negative_exponent_sign() {
        assert_eq!(render(0.25, &Spec::new(b'a')), "0x1p-2");
    }
}
