//! Stream-backed sinks.
//!
//! [`WriteTarget`] feeds a byte stream (`std::io::Write`); [`FmtTarget`]
//! feeds a text stream (`std::fmt::Write`), reassembling the engine's byte
//! output into characters. Per the sink contract neither may fail: the
//! first downstream error latches the sink into a silent discard state.

use std::{fmt, io};

use crate::locale::Locale;

use super::{Target, capped_count};

/// Sink over a byte stream.
#[derive(Debug)]
pub struct WriteTarget<W: io::Write> {
    inner: W,
    written: usize,
    failed: bool,
}

impl<W: io::Write> WriteTarget<W> {
    /// Sink writing to `inner`.
    pub fn new(inner: W) -> WriteTarget<W> {
        WriteTarget {
            inner,
            written: 0,
            failed: false,
        }
    }

    /// `true` once a downstream write has failed.
    pub fn failed(&self) -> bool {
        self.failed
    }

    /// Releases the underlying stream.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: io::Write> Target for WriteTarget<W> {
    fn begin(&mut self) {
        self.written = 0;
        self.failed = false;
    }

    fn put(&mut self, byte: u8) {
        self.put_slice(&[byte]);
    }

    fn put_slice(&mut self, bytes: &[u8]) {
        if self.failed {
            return;
        }
        if self.inner.write_all(bytes).is_ok() {
            self.written += bytes.len();
        } else {
            self.failed = true;
        }
    }

    fn end(&mut self) -> i64 {
        let _ = self.inner.flush();
        capped_count(self.written)
    }

    fn count(&self) -> usize {
        self.written
    }
}

/// Sink over a text stream, carrying the stream's locale.
///
/// The engine emits UTF-8 bytes; this sink reassembles them into
/// characters before forwarding. Malformed sequences become U+FFFD.
pub struct FmtTarget<W: fmt::Write> {
    inner: W,
    written: usize,
    failed: bool,
    locale: Locale,
    pending: [u8; 4],
    pending_len: usize,
    pending_need: usize,
}

impl<W: fmt::Write> FmtTarget<W> {
    /// Sink writing to `inner` with the neutral "C" locale.
    pub fn new(inner: W) -> FmtTarget<W> {
        FmtTarget::with_locale(inner, Locale::c())
    }

    /// Sink writing to `inner` with the stream's locale.
    pub fn with_locale(inner: W, locale: Locale) -> FmtTarget<W> {
        FmtTarget {
            inner,
            written: 0,
            failed: false,
            locale,
            pending: [0; 4],
            pending_len: 0,
            pending_need: 0,
        }
    }

    /// Releases the underlying stream.
    pub fn into_inner(self) -> W {
        self.inner
    }

    fn emit_char(&mut self, c: char) {
        if !self.failed && self.inner.write_char(c).is_err() {
            self.failed = true;
        }
    }

    fn flush_pending_as_invalid(&mut self) {
        if self.pending_len > 0 {
            self.pending_len = 0;
            self.pending_need = 0;
            self.emit_char(char::REPLACEMENT_CHARACTER);
        }
    }
}

/// Expected sequence length for a UTF-8 lead byte, or 0 if `b` cannot
/// start a sequence.
fn utf8_seq_len(b: u8) -> usize {
    match b {
        0xc2..=0xdf => 2,
        0xe0..=0xef => 3,
        0xf0..=0xf4 => 4,
        _ => 0,
    }
}

impl<W: fmt::Write> Target for FmtTarget<W> {
    fn begin(&mut self) {
        self.written = 0;
        self.failed = false;
        self.pending_len = 0;
        self.pending_need = 0;
    }

    fn put(&mut self, byte: u8) {
        self.written += 1;
        if self.pending_len > 0 {
            if byte & 0xc0 == 0x80 {
                self.pending[self.pending_len] = byte;
                self.pending_len += 1;
                if self.pending_len == self.pending_need {
                    let complete = &self.pending[..self.pending_len];
                    let c = std::str::from_utf8(complete)
                        .ok()
                        .and_then(|s| s.chars().next())
                        .unwrap_or(char::REPLACEMENT_CHARACTER);
                    self.pending_len = 0;
                    self.pending_need = 0;
                    self.emit_char(c);
                }
                return;
            }
            // Sequence broken off; the new byte starts over.
            self.flush_pending_as_invalid();
        }
        if byte < 0x80 {
            self.emit_char(byte as char);
            return;
        }
        let need = utf8_seq_len(byte);
        if need == 0 {
            self.emit_char(char::REPLACEMENT_CHARACTER);
            return;
        }
        self.pending[0] = byte;
        self.pending_len = 1;
        self.pending_need = need;
    }

    fn end(&mut self) -> i64 {
        self.flush_pending_as_invalid();
        capped_count(self.written)
    }

    fn count(&self) -> usize {
        self.written
    }

    fn locale(&self) -> Locale {
        self.locale.clone()
    }
}
