//! Typed argument cells.
//!
//! Each caller argument is captured into an [`Arg`]: a tagged union that
//! preserves enough type information for the dispatch core to format the
//! value generically. The discriminator is the single source of truth for
//! which payload is valid. Cells are stack-scoped, borrow the data they
//! reference, and never persist across formatting calls.

use std::cell::Cell;

use crate::errors::FormatError;
use crate::scan::Spec;
use crate::sink::Target;

/// Callback attached to an opaque cell; invoked when no built-in
/// conversion matches. Receives the sink and the resolved specifier and is
/// expected to call back into the dispatch core
/// ([`crate::engine::format_value`]) with a replacement cell.
pub type CustomFormatter = dyn Fn(&mut dyn Target, &Spec) -> Result<(), FormatError>;

/// Tagged payload of one captured argument.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ArgValue<'a> {
    /// Empty cell; formatting it is an error.
    None,
    /// Signed integer, widened to 64 bits.
    Signed(i64),
    /// Unsigned integer, widened to 64 bits.
    Unsigned(u64),
    /// Floating-point value, widened to f64.
    Double(f64),
    /// Borrowed byte string (not NUL-terminated).
    Str(&'a [u8]),
    /// `%n` write-back target, 16-bit signed.
    CountI16(&'a Cell<i16>),
    /// `%n` write-back target, 16-bit unsigned.
    CountU16(&'a Cell<u16>),
    /// `%n` write-back target, 32-bit signed.
    CountI32(&'a Cell<i32>),
    /// `%n` write-back target, 32-bit unsigned.
    CountU32(&'a Cell<u32>),
    /// `%n` write-back target, 64-bit signed.
    CountI64(&'a Cell<i64>),
    /// `%n` write-back target, 64-bit unsigned.
    CountU64(&'a Cell<u64>),
    /// Address of a value with no built-in mapping.
    Opaque(usize),
}

/// One captured, type-tagged caller argument.
#[derive(Clone, Copy)]
pub struct Arg<'a> {
    /// Tagged payload.
    pub value: ArgValue<'a>,
    /// Custom formatter consulted for opaque cells.
    pub formatter: Option<&'a CustomFormatter>,
}

impl PartialEq for Arg<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
            && match (self.formatter, other.formatter) {
                (None, None) => true,
                (Some(a), Some(b)) => std::ptr::eq(a, b),
                _ => false,
            }
    }
}

impl std::fmt::Debug for Arg<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Arg")
            .field("value", &self.value)
            .field("formatter", &self.formatter.map(|_| "fn"))
            .finish()
    }
}

impl<'a> Arg<'a> {
    /// Empty cell.
    pub fn none() -> Arg<'a> {
        Arg {
            value: ArgValue::None,
            formatter: None,
        }
    }

    /// Signed integer cell.
    pub fn signed(value: i64) -> Arg<'a> {
        Arg {
            value: ArgValue::Signed(value),
            formatter: None,
        }
    }

    /// Unsigned integer cell.
    pub fn unsigned(value: u64) -> Arg<'a> {
        Arg {
            value: ArgValue::Unsigned(value),
            formatter: None,
        }
    }

    /// Floating-point cell.
    pub fn double(value: f64) -> Arg<'a> {
        Arg {
            value: ArgValue::Double(value),
            formatter: None,
        }
    }

    /// Byte-string cell borrowing `bytes`.
    pub fn str(bytes: &'a [u8]) -> Arg<'a> {
        Arg {
            value: ArgValue::Str(bytes),
            formatter: None,
        }
    }

    /// Opaque cell carrying only an address. Without a formatter, every
    /// conversion other than `%p` fails with
    /// [`FormatError::NoFormatFunction`].
    pub fn opaque(addr: usize) -> Arg<'a> {
        Arg {
            value: ArgValue::Opaque(addr),
            formatter: None,
        }
    }

    /// Opaque cell for an arbitrary unmapped reference, capturing its
    /// address. The generic fallback of the capture extension point.
    pub fn opaque_of<T>(value: &T) -> Arg<'a> {
        Arg::opaque(value as *const T as usize)
    }

    /// Attaches a custom formatter to this cell.
    pub fn with_formatter(mut self, formatter: &'a CustomFormatter) -> Arg<'a> {
        self.formatter = Some(formatter);
        self
    }
}

/// Capture extension point: maps a concrete caller type to an [`Arg`].
///
/// Resolved at compile time; the mapping is total for every implemented
/// type, so capture itself cannot fail. New types plug in by implementing
/// this trait (or by falling back to [`Arg::opaque_of`] plus a custom
/// formatter).
pub trait ToArg<'a> {
    /// Captures `self` into a typed cell.
    fn to_arg(self) -> Arg<'a>;
}

macro_rules! impl_to_arg_signed {
    ($($t:ty),*) => {$(
        impl<'a> ToArg<'a> for $t {
            fn to_arg(self) -> Arg<'a> {
                Arg::signed(self as i64)
            }
        }
    )*};
}

macro_rules! impl_to_arg_unsigned {
    ($($t:ty),*) => {$(
        impl<'a> ToArg<'a> for $t {
            fn to_arg(self) -> Arg<'a> {
                Arg::unsigned(self as u64)
            }
        }
    )*};
}

impl_to_arg_signed!(i8, i16, i32, i64, isize);
impl_to_arg_unsigned!(u8, u16, u32, u64, usize);

impl<'a> ToArg<'a> for f32 {
    fn to_arg(self) -> Arg<'a> {
        Arg::double(f64::from(self))
    }
}

impl<'a> ToArg<'a> for f64 {
    fn to_arg(self) -> Arg<'a> {
        Arg::double(self)
    }
}

impl<'a> ToArg<'a> for char {
    fn to_arg(self) -> Arg<'a> {
        Arg::unsigned(self as u64)
    }
}

impl<'a> ToArg<'a> for bool {
    fn to_arg(self) -> Arg<'a> {
        Arg::unsigned(u64::from(self))
    }
}

impl<'a> ToArg<'a> for &'a str {
    fn to_arg(self) -> Arg<'a> {
        Arg::str(self.as_bytes())
    }
}

impl<'a> ToArg<'a> for &'a String {
    fn to_arg(self) -> Arg<'a> {
        Arg::str(self.as_bytes())
    }
}

impl<'a> ToArg<'a> for &'a [u8] {
    fn to_arg(self) -> Arg<'a> {
        Arg::str(self)
    }
}

impl<'a, const N: usize> ToArg<'a> for &'a [u8; N] {
    fn to_arg(self) -> Arg<'a> {
        Arg::str(self)
    }
}

macro_rules! impl_to_arg_count {
    ($($t:ty => $variant:ident),*) => {$(
        impl<'a> ToArg<'a> for &'a Cell<$t> {
            fn to_arg(self) -> Arg<'a> {
                Arg {
                    value: ArgValue::$variant(self),
                    formatter: None,
                }
            }
        }
    )*};
}

impl_to_arg_count!(
    i16 => CountI16,
    u16 => CountU16,
    i32 => CountI32,
    u32 => CountU32,
    i64 => CountI64,
    u64 => CountU64
);

impl<'a> ToArg<'a> for Arg<'a> {
    fn to_arg(self) -> Arg<'a> {
        self
    }
}

/// Builds a fixed-size cell array from heterogeneous values.
///
/// ```
/// use tprintf_core::{args, sprint};
///
/// let out = sprint(b"%s: %d", &args!["answer", 42]).unwrap();
/// assert_eq!(out, "answer: 42");
/// ```
#[macro_export]
macro_rules! args {
    () => {
        [$crate::value::Arg::none(); 0]
    };
    ($($v:expr),+ $(,)?) => {
        [$( $crate::value::ToArg::to_arg($v) ),+]
    };
}
