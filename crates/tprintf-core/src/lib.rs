//! # tprintf-core
//!
//! Type-safe printf-family formatting engine.
//!
//! Converts a heterogeneous list of typed argument cells into text
//! according to a C-printf-compatible format string, streaming the result
//! into a pluggable output sink. The specifier mini-language is
//! bit-for-bit compatible with C printf plus two extensions: `=` centre
//! alignment and `'` locale digit grouping.
//!
//! Reference: POSIX.1-2024 fprintf, ISO C11 7.21.6.1
//!
//! ```
//! use tprintf_core::{args, sprint};
//!
//! let out = sprint(b"%2$s %1$s: %3$-5d|", &args!["world", "hello", 42]).unwrap();
//! assert_eq!(out, "hello world: 42   |");
//! ```
//!
//! The whole engine is synchronous and stack-local: cells borrow caller
//! data for the duration of one call, numeric scratch buffers live on the
//! stack, and the only ambient state is a thread-local last-error channel
//! feeding `%m`.

#![deny(unsafe_code)]

pub mod engine;
pub mod errors;
pub mod locale;
pub mod num;
pub mod scan;
pub mod sink;
pub mod value;

pub use engine::{format_value, fprint, print, snprint, sprint, sprint_with, wprint};
pub use errors::FormatError;
pub use locale::Locale;
pub use scan::{Flags, Spec};
pub use sink::{FixedTarget, FmtTarget, StringTarget, Target, WriteTarget};
pub use value::{Arg, ArgValue, CustomFormatter, ToArg};
