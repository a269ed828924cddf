//! Formatting error definitions.
//!
//! Failures are reported through `Result<_, FormatError>`. Every failing
//! step also records its error kind in a thread-local channel, mirroring
//! errno semantics: the `%m` conversion reads it back as message text, and
//! concurrent formatting calls on different threads cannot corrupt each
//! other's reporting.

use std::cell::Cell;

use thiserror::Error;

thread_local! {
    static LAST_ERROR: Cell<Option<FormatError>> = const { Cell::new(None) };
}

/// Failure kinds raised by the formatting engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FormatError {
    /// Malformed specifier, inconsistent explicit/implicit argument
    /// indexing, or an argument index / field width out of range.
    #[error("invalid format specifier or argument")]
    InvalidArgument,
    /// The numeric conversion scratch buffer was exhausted.
    #[error("no space left in conversion buffer")]
    NoSpace,
    /// A character coercion produced a value outside the valid
    /// Unicode scalar range.
    #[error("illegal character sequence")]
    IllegalSequence,
    /// A `%n` write-back target is too narrow for the current byte count.
    #[error("byte count out of range for write-back target")]
    RangeError,
    /// An opaque argument was formatted with no custom formatter attached.
    #[error("no format function defined for argument")]
    NoFormatFunction,
}

impl FormatError {
    /// Short message text for this error kind, used by the `%m` conversion.
    pub fn message(self) -> &'static str {
        match self {
            FormatError::InvalidArgument => "Invalid argument",
            FormatError::NoSpace => "No space left in buffer",
            FormatError::IllegalSequence => "Illegal byte sequence",
            FormatError::RangeError => "Numerical result out of range",
            FormatError::NoFormatFunction => "No format function defined",
        }
    }
}

/// Returns the last error recorded on this thread, if any.
pub fn last_format_error() -> Option<FormatError> {
    LAST_ERROR.get()
}

/// Records `error` as this thread's last formatting error.
pub fn set_last_format_error(error: FormatError) {
    LAST_ERROR.set(Some(error));
}

/// Clears this thread's last formatting error.
pub fn clear_last_format_error() {
    LAST_ERROR.set(None);
}

/// Message text substituted by `%m`: the last recorded error's message,
/// or `"Success"` when none has been recorded.
pub fn last_error_message() -> &'static str {
    match last_format_error() {
        Some(e) => e.message(),
        None => "Success",
    }
}

/// Records `error` and returns it as the `Err` variant.
///
/// Used at the innermost failing step so the thread-local channel always
/// names the original failure, not a wrapper.
pub fn fail<T>(error: FormatError) -> Result<T, FormatError> {
    set_last_format_error(error);
    Err(error)
}
