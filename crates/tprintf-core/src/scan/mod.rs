//! Format-specifier scanner.
//!
//! Consumes one `%…` conversion specifier, resolving flags, explicit or
//! implicit argument indices, width, precision (both literal and
//! argument-supplied), length modifiers, and the conversion character.
//!
//! Grammar:
//!
//! ```text
//! %[argpos$][flags][width][.precision][lenmod]conv
//! argpos    ::= digits '$'
//! flags     ::= any of  # 0 - = (space) + '
//! width     ::= digits | '*' | '*' digits '$'
//! precision ::= '.' ( digits | '*' | '*' digits '$' )
//! lenmod    ::= h|hh|l|ll|L|q|j|z|t          (accepted, ignored)
//! conv      ::= d i o u x X b B e E f F g G a A c C s S p n m %
//! ```

use crate::errors::{FormatError, fail};
use crate::value::{Arg, ArgValue};

/// Largest accepted field width or precision. Larger requests are
/// rejected as invalid rather than silently clamped.
pub const MAX_FIELD: usize = 1 << 20;

/// Flags accumulated from a conversion specifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Flags {
    /// `#` alternate form (radix prefix, forced decimal point).
    pub alt_form: bool,
    /// `0` zero padding.
    pub zero_pad: bool,
    /// `-` left alignment.
    pub left_align: bool,
    /// `=` centre alignment.
    pub centre_align: bool,
    /// ` ` pad positive values with a space.
    pub pad_positive: bool,
    /// `+` show the sign of positive values.
    pub show_positive: bool,
    /// `'` locale digit grouping.
    pub group_digits: bool,
}

/// A resolved conversion specifier.
///
/// `width` and `precision` are meaningful only when present; `None`
/// means the field was not written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Spec {
    pub flags: Flags,
    pub width: Option<usize>,
    pub precision: Option<usize>,
    pub conversion: u8,
}

impl Spec {
    /// Bare specifier for `conversion` with no flags, width, or precision.
    pub fn new(conversion: u8) -> Spec {
        Spec {
            flags: Flags::default(),
            width: None,
            precision: None,
            conversion,
        }
    }
}

/// Argument-indexing discipline observed so far in one formatting call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Indexing {
    Unset,
    Implicit,
    Explicit,
}

/// Per-call scanner state: the next sequential argument and the indexing
/// discipline. Explicit (`N$`) and implicit indexing may not be mixed
/// within one call.
#[derive(Debug)]
pub struct ScanState {
    next_arg: usize,
    indexing: Indexing,
}

impl Default for ScanState {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanState {
    pub fn new() -> ScanState {
        ScanState {
            next_arg: 0,
            indexing: Indexing::Unset,
        }
    }

    fn take_implicit<'a, 'b>(&mut self, args: &'b [Arg<'a>]) -> Result<&'b Arg<'a>, FormatError> {
        if self.indexing == Indexing::Explicit {
            return fail(FormatError::InvalidArgument);
        }
        self.indexing = Indexing::Implicit;
        let idx = self.next_arg;
        self.next_arg += 1;
        match args.get(idx) {
            Some(arg) => Ok(arg),
            None => fail(FormatError::InvalidArgument),
        }
    }

    fn take_explicit<'a, 'b>(
        &mut self,
        args: &'b [Arg<'a>],
        index1: usize,
    ) -> Result<&'b Arg<'a>, FormatError> {
        if self.indexing == Indexing::Implicit {
            return fail(FormatError::InvalidArgument);
        }
        self.indexing = Indexing::Explicit;
        if index1 == 0 || index1 > args.len() {
            return fail(FormatError::InvalidArgument);
        }
        Ok(&args[index1 - 1])
    }
}

/// Consumes one conversion specifier.
///
/// `fmt` points to the first byte after `%`. Returns the resolved
/// specifier, the bound argument (`None` for `%m` and `%%`), and the
/// number of bytes consumed from `fmt`.
pub fn convert<'a, 'b>(
    fmt: &[u8],
    args: &'b [Arg<'a>],
    state: &mut ScanState,
) -> Result<(Spec, Option<&'b Arg<'a>>, usize), FormatError> {
    let len = fmt.len();
    let mut pos = 0;
    let mut flags = Flags::default();
    let mut explicit: Option<usize> = None;
    let mut width: Option<usize> = None;

    // --- flags (also the explicit argument index and a literal width) ---
    loop {
        if pos >= len {
            return fail(FormatError::InvalidArgument);
        }
        match fmt[pos] {
            b'#' => flags.alt_form = true,
            b'0' => flags.zero_pad = true,
            b'-' => flags.left_align = true,
            b'=' => flags.centre_align = true,
            b' ' => flags.pad_positive = true,
            b'+' => flags.show_positive = true,
            b'\'' => flags.group_digits = true,
            b'1'..=b'9' => {
                let n = scan_decimal(fmt, &mut pos);
                if pos < len && fmt[pos] == b'$' {
                    pos += 1;
                    explicit = Some(n);
                    continue;
                }
                width = Some(check_field(n)?);
                break;
            }
            _ => break,
        }
        pos += 1;
    }

    // --- width from argument ---
    if width.is_none() && pos < len && fmt[pos] == b'*' {
        pos += 1;
        let value = arg_int(star_arg(fmt, &mut pos, args, state)?)?;
        if value < 0 {
            flags.left_align = true;
        }
        width = Some(check_field(usize::try_from(value.unsigned_abs()).unwrap_or(usize::MAX))?);
    }

    // --- precision ---
    let mut precision: Option<usize> = None;
    if pos < len && fmt[pos] == b'.' {
        pos += 1;
        if pos < len && fmt[pos] == b'*' {
            pos += 1;
            let value = arg_int(star_arg(fmt, &mut pos, args, state)?)?;
            // A negative precision argument means "no precision".
            precision = if value < 0 {
                None
            } else {
                Some(check_field(usize::try_from(value).unwrap_or(usize::MAX))?)
            };
        } else if pos < len && fmt[pos].is_ascii_digit() {
            precision = Some(check_field(scan_decimal(fmt, &mut pos))?);
        } else {
            precision = Some(0);
        }
    }

    // --- length modifier (compatibility no-op) ---
    match fmt.get(pos) {
        Some(b'h') => {
            pos += 1;
            if fmt.get(pos) == Some(&b'h') {
                pos += 1;
            }
        }
        Some(b'l') => {
            pos += 1;
            if fmt.get(pos) == Some(&b'l') {
                pos += 1;
            }
        }
        Some(b'L' | b'q' | b'j' | b'z' | b't') => {
            pos += 1;
        }
        _ => {}
    }

    // --- conversion character ---
    if pos >= len {
        return fail(FormatError::InvalidArgument);
    }
    let conversion = fmt[pos];
    pos += 1;
    match conversion {
        b'd' | b'i' | b'o' | b'u' | b'x' | b'X' | b'b' | b'B' | b'e' | b'E' | b'f' | b'F'
        | b'g' | b'G' | b'a' | b'A' | b'c' | b'C' | b's' | b'S' | b'p' | b'n' | b'm' | b'%' => {}
        _ => return fail(FormatError::InvalidArgument),
    }

    // `m` substitutes the error message and `%` is literal; neither
    // consumes an argument.
    let arg = match conversion {
        b'm' | b'%' => None,
        _ => Some(match explicit {
            Some(n) => state.take_explicit(args, n)?,
            None => state.take_implicit(args)?,
        }),
    };

    Ok((
        Spec {
            flags,
            width,
            precision,
            conversion,
        },
        arg,
        pos,
    ))
}

/// Resolves a `*` width/precision source: either `*N$` or the next
/// sequential argument.
fn star_arg<'a, 'b>(
    fmt: &[u8],
    pos: &mut usize,
    args: &'b [Arg<'a>],
    state: &mut ScanState,
) -> Result<&'b Arg<'a>, FormatError> {
    if *pos < fmt.len() && fmt[*pos].is_ascii_digit() {
        let n = scan_decimal(fmt, pos);
        if *pos < fmt.len() && fmt[*pos] == b'$' {
            *pos += 1;
            return state.take_explicit(args, n);
        }
        return fail(FormatError::InvalidArgument);
    }
    state.take_implicit(args)
}

/// Integer value of a width/precision argument cell.
fn arg_int(arg: &Arg<'_>) -> Result<i64, FormatError> {
    match arg.value {
        ArgValue::Signed(v) => Ok(v),
        ArgValue::Unsigned(v) => match i64::try_from(v) {
            Ok(v) => Ok(v),
            Err(_) => fail(FormatError::InvalidArgument),
        },
        _ => fail(FormatError::InvalidArgument),
    }
}

fn scan_decimal(fmt: &[u8], pos: &mut usize) -> usize {
    let mut n = 0usize;
    while *pos < fmt.len() && fmt[*pos].is_ascii_digit() {
        n = n.saturating_mul(10).saturating_add((fmt[*pos] - b'0') as usize);
        *pos += 1;
    }
    n
}

fn check_field(n: usize) -> Result<usize, FormatError> {
    if n > MAX_FIELD {
        fail(FormatError::InvalidArgument)
    } else {
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan<'a, 'b>(
        fmt: &[u8],
        args: &'b [Arg<'a>],
    ) -> Result<(Spec, Option<&'b Arg<'a>>, usize), FormatError> {
        let mut state = ScanState::new();
        convert(fmt, args, &mut state)
    }

    #[test]
    fn test_scan_simple_int() {
        let args = [Arg::signed(1)];
        let (spec, arg, used) = scan(b"d", &args).unwrap();
        assert_eq!(used, 1);
        assert_eq!(spec.conversion, b'd');
        assert_eq!(spec.width, None);
        assert_eq!(spec.precision, None);
        assert!(arg.is_some());
    }

    #[test]
    fn test_scan_width_precision() {
        let args = [Arg::double(1.0)];
        let (spec, _, used) = scan(b"10.5f", &args).unwrap();
        assert_eq!(used, 5);
        assert_eq!(spec.width, Some(10));
        assert_eq!(spec.precision, Some(5));
    }

    #[test]
    fn test_scan_all_flags() {
        let args = [Arg::signed(1)];
        let (spec, _, _) = scan(b"#0-= +'d", &args).unwrap();
        assert!(spec.flags.alt_form);
        assert!(spec.flags.zero_pad);
        assert!(spec.flags.left_align);
        assert!(spec.flags.centre_align);
        assert!(spec.flags.pad_positive);
        assert!(spec.flags.show_positive);
        assert!(spec.flags.group_digits);
    }

    #[test]
    fn test_scan_bare_dot_means_zero_precision() {
        let args = [Arg::signed(1)];
        let (spec, _, _) = scan(b".d", &args).unwrap();
        assert_eq!(spec.precision, Some(0));
    }

    #[test]
    fn test_scan_length_modifiers_ignored() {
        let args = [Arg::signed(1)];
        for fmt in [&b"hhd"[..], b"hd", b"ld", b"lld", b"Ld", b"qd", b"jd", b"zd", b"td"] {
            let (spec, _, used) = scan(fmt, &args).unwrap();
            assert_eq!(spec.conversion, b'd');
            assert_eq!(used, fmt.len());
        }
    }

    #[test]
    fn test_scan_width_from_argument() {
        let args = [Arg::signed(6), Arg::signed(42)];
        let mut state = ScanState::new();
        let (spec, arg, _) = convert(b"*d", &args, &mut state).unwrap();
        assert_eq!(spec.width, Some(6));
        assert!(matches!(arg.unwrap().value, ArgValue::Signed(42)));
    }

    #[test]
    fn test_scan_negative_width_argument_left_aligns() {
        let args = [Arg::signed(-6), Arg::signed(42)];
        let (spec, _, _) = scan(b"*d", &args).unwrap();
        assert_eq!(spec.width, Some(6));
        assert!(spec.flags.left_align);
    }

    #[test]
    fn test_scan_negative_precision_argument_is_absent() {
        let args = [Arg::signed(-2), Arg::double(3.5)];
        let (spec, _, _) = scan(b".*f", &args).unwrap();
        assert_eq!(spec.precision, None);
    }

    #[test]
    fn test_scan_explicit_index() {
        let args = [Arg::str(b"a"), Arg::str(b"b")];
        let (spec, arg, _) = scan(b"2$s", &args).unwrap();
        assert_eq!(spec.conversion, b's');
        assert!(matches!(arg.unwrap().value, ArgValue::Str(b"b")));
    }

    #[test]
    fn test_scan_explicit_star_index() {
        let args = [Arg::signed(42), Arg::signed(8)];
        let (spec, arg, _) = scan(b"1$*2$d", &args).unwrap();
        assert_eq!(spec.width, Some(8));
        assert!(matches!(arg.unwrap().value, ArgValue::Signed(42)));
    }

    #[test]
    fn test_scan_rejects_mixed_indexing() {
        let args = [Arg::signed(1), Arg::signed(2)];
        let mut state = ScanState::new();
        convert(b"1$d", &args, &mut state).unwrap();
        assert_eq!(
            convert(b"d", &args, &mut state),
            Err(FormatError::InvalidArgument)
        );

        let mut state = ScanState::new();
        convert(b"d", &args, &mut state).unwrap();
        assert_eq!(
            convert(b"2$d", &args, &mut state),
            Err(FormatError::InvalidArgument)
        );
    }

    #[test]
    fn test_scan_rejects_index_out_of_range() {
        let args = [Arg::signed(1)];
        assert_eq!(scan(b"2$d", &args), Err(FormatError::InvalidArgument));
        assert_eq!(scan(b"0$d", &args), Err(FormatError::InvalidArgument));
    }

    #[test]
    fn test_scan_rejects_exhausted_arguments() {
        let args: [Arg<'_>; 0] = [];
        assert_eq!(scan(b"d", &args), Err(FormatError::InvalidArgument));
    }

    #[test]
    fn test_scan_rejects_unknown_conversion() {
        let args = [Arg::signed(1)];
        assert_eq!(scan(b"5w", &args), Err(FormatError::InvalidArgument));
    }

    #[test]
    fn test_scan_rejects_truncated_specifier() {
        let args = [Arg::signed(1)];
        assert_eq!(scan(b"", &args), Err(FormatError::InvalidArgument));
        assert_eq!(scan(b"05", &args), Err(FormatError::InvalidArgument));
        assert_eq!(scan(b"5.", &args), Err(FormatError::InvalidArgument));
    }

    #[test]
    fn test_scan_rejects_oversized_width() {
        let args = [Arg::signed(1)];
        assert_eq!(scan(b"9999999d", &args), Err(FormatError::InvalidArgument));
    }

    #[test]
    fn test_scan_message_conversion_binds_no_argument() {
        let args: [Arg<'_>; 0] = [];
        let (spec, arg, _) = scan(b"m", &args).unwrap();
        assert_eq!(spec.conversion, b'm');
        assert!(arg.is_none());
    }

    #[test]
    fn test_scan_argpos_before_flags() {
        let args = [Arg::signed(-3), Arg::signed(0)];
        let (spec, arg, _) = scan(b"1$08d", &args).unwrap();
        assert!(spec.flags.zero_pad);
        assert_eq!(spec.width, Some(8));
        assert!(matches!(arg.unwrap().value, ArgValue::Signed(-3)));
    }
}
