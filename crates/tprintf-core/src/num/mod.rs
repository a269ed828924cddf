//! Numeric conversion routines.
//!
//! Pure functions that render an integer or floating-point value into a
//! fixed scratch buffer, right-to-left, and report a [`NumConv`] split of
//! sign/radix prefix vs. digit body. The split lets the padding stage
//! insert zero fill *between* a sign or `0x` prefix and the digits
//! (`-0042`, `0x00ff`) without re-scanning the text.

pub mod float;
pub mod hexfloat;

pub use float::double_decimal;
pub use hexfloat::hex_double;

use crate::errors::{FormatError, fail};
use crate::locale::Locale;
use crate::scan::Spec;

/// Scratch buffer length. Any 64-bit integer in any supported base fits
/// with grouping separators, and fixed-point output of the largest finite
/// double fits with margin. Conversions that would exceed it fail with
/// [`FormatError::NoSpace`].
pub const NUM_BUF_LEN: usize = 512;

/// Fixed scratch buffer for one numeric conversion.
#[derive(Debug)]
pub struct NumBuf {
    bytes: [u8; NUM_BUF_LEN],
}

impl Default for NumBuf {
    fn default() -> Self {
        Self::new()
    }
}

impl NumBuf {
    pub fn new() -> NumBuf {
        NumBuf {
            bytes: [0; NUM_BUF_LEN],
        }
    }
}

/// Split of a rendered numeric string.
///
/// The rendered text occupies `start..start + len` of the scratch buffer;
/// the sign/radix prefix occupies `start..body` and the digit body begins
/// at `body`. Invariant: `start <= body <= start + len`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumConv {
    pub start: usize,
    pub body: usize,
    pub len: usize,
}

impl NumConv {
    /// Sign/radix prefix region (may be empty).
    pub fn prefix<'b>(&self, buf: &'b NumBuf) -> &'b [u8] {
        &buf.bytes[self.start..self.body]
    }

    /// Digit body region.
    pub fn digits<'b>(&self, buf: &'b NumBuf) -> &'b [u8] {
        &buf.bytes[self.body..self.start + self.len]
    }

    /// Full rendered text, prefix included.
    pub fn rendered<'b>(&self, buf: &'b NumBuf) -> &'b [u8] {
        &buf.bytes[self.start..self.start + self.len]
    }
}

/// Right-to-left writer over the scratch buffer.
pub(crate) struct RevWriter<'b> {
    bytes: &'b mut [u8; NUM_BUF_LEN],
    pos: usize,
}

impl<'b> RevWriter<'b> {
    pub(crate) fn new(buf: &'b mut NumBuf) -> RevWriter<'b> {
        RevWriter {
            bytes: &mut buf.bytes,
            pos: NUM_BUF_LEN,
        }
    }

    /// Prepends one byte, failing with `NoSpace` when the buffer is full.
    pub(crate) fn push(&mut self, byte: u8) -> Result<(), FormatError> {
        if self.pos == 0 {
            return fail(FormatError::NoSpace);
        }
        self.pos -= 1;
        self.bytes[self.pos] = byte;
        Ok(())
    }

    /// First byte of the text written so far.
    pub(crate) fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    /// Remaining free bytes.
    pub(crate) fn free(&self) -> usize {
        self.pos
    }

    /// Current write position; text written so far starts here.
    pub(crate) fn pos(&self) -> usize {
        self.pos
    }
}

/// Emits the decimal digits of `magnitude`, least-significant first, with
/// optional locale grouping and a minimum digit count.
pub(crate) fn push_decimal_digits(
    w: &mut RevWriter<'_>,
    magnitude: u64,
    min_digits: usize,
    grouping: Option<(u8, &Locale)>,
) -> Result<(), FormatError> {
    let mut walk = grouping.map(|(sep, loc)| (sep, loc.grouping_walk()));
    let mut remaining = match walk.as_mut() {
        Some((_, walk)) => walk.next_group(),
        None => None,
    };
    let mut value = magnitude;
    let mut digits = 0usize;
    loop {
        if remaining == Some(0) {
            let (sep, walk) = walk.as_mut().unwrap();
            w.push(*sep)?;
            remaining = walk.next_group();
        }
        w.push(b'0' + (value % 10) as u8)?;
        value /= 10;
        digits += 1;
        if let Some(r) = remaining.as_mut() {
            *r -= 1;
        }
        if value == 0 && digits >= min_digits {
            break;
        }
    }
    Ok(())
}

/// Emits the sign character selected by the flags, if any.
pub(crate) fn push_sign(
    w: &mut RevWriter<'_>,
    negative: bool,
    show_positive: bool,
    pad_positive: bool,
) -> Result<(), FormatError> {
    if negative {
        w.push(b'-')
    } else if show_positive {
        w.push(b'+')
    } else if pad_positive {
        w.push(b' ')
    } else {
        Ok(())
    }
}

/// Renders a decimal integer.
///
/// `magnitude` is the absolute value; `negative` selects the sign.
/// Unsigned values are never negative but still honor the
/// show-positive/pad-positive flags. Precision is a minimum digit count;
/// value 0 with explicit precision 0 renders no digits. The `'` flag
/// groups digits per the locale's grouping rule.
pub fn decimal(
    buf: &mut NumBuf,
    magnitude: u64,
    negative: bool,
    spec: &Spec,
    locale: &Locale,
) -> Result<NumConv, FormatError> {
    let mut w = RevWriter::new(buf);
    let min_digits = spec.precision.unwrap_or(1);
    let suppress = magnitude == 0 && spec.precision == Some(0);
    if !suppress {
        let grouping = if spec.flags.group_digits && locale.groups_digits() {
            Some((locale.thousands_sep, locale))
        } else {
            None
        };
        push_decimal_digits(&mut w, magnitude, min_digits, grouping)?;
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

/// Renders an unsigned value in octal, hexadecimal, or binary by repeated
/// mask-and-shift. The alternate-form flag prepends `0` (octal, only when
/// the body does not already lead with one) or `0x`/`0X`/`0b`/`0B` with
/// case following the conversion character.
pub fn radix(buf: &mut NumBuf, value: u64, spec: &Spec) -> Result<NumConv, FormatError> {
    let (shift, upper) = match spec.conversion {
        b'o' => (3u32, false),
        b'X' => (4, true),
        b'b' => (1, false),
        b'B' => (1, true),
        _ => (4, false),
    };
    let digits_tbl: &[u8; 16] = if upper {
        b"0123456789ABCDEF"
    } else {
        b"0123456789abcdef"
    };
    let mask = (1u64 << shift) - 1;

    let mut w = RevWriter::new(buf);
    let min_digits = spec.precision.unwrap_or(1);
    let suppress = value == 0 && spec.precision == Some(0);
    if !suppress {
        let mut v = value;
        let mut count = 0usize;
        loop {
            w.push(digits_tbl[(v & mask) as usize])?;
            v >>= shift;
            count += 1;
            if v == 0 && count >= min_digits {
                break;
            }
        }
    }
    // The octal marker is an ordinary digit; it belongs to the body.
    if spec.flags.alt_form && spec.conversion == b'o' && w.peek() != Some(b'0') {
        w.push(b'0')?;
    }
    let body = w.pos();
    if spec.flags.alt_form && value != 0 {
        match spec.conversion {
            b'x' => {
                w.push(b'x')?;
                w.push(b'0')?;
            }
            b'X' => {
                w.push(b'X')?;
                w.push(b'0')?;
            }
            b'b' => {
                w.push(b'b')?;
                w.push(b'0')?;
            }
            b'B' => {
                w.push(b'B')?;
                w.push(b'0')?;
            }
            _ => {}
        }
    }
    Ok(NumConv {
        start: w.pos(),
        body,
        len: NUM_BUF_LEN - w.pos(),
    })
}
