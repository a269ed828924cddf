//! Growable in-memory sink.

use crate::locale::Locale;

use super::{Target, capped_count};

/// Sink that accumulates output in a growable byte buffer and hands it
/// back as a `String`.
#[derive(Debug, Default)]
pub struct StringTarget {
    buf: Vec<u8>,
    locale: Locale,
}

impl StringTarget {
    /// Empty sink with the neutral "C" locale.
    pub fn new() -> StringTarget {
        StringTarget {
            buf: Vec::new(),
            locale: Locale::c(),
        }
    }

    /// Empty sink with an explicit locale.
    pub fn with_locale(locale: Locale) -> StringTarget {
        StringTarget {
            buf: Vec::new(),
            locale,
        }
    }

    /// Accumulated bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the sink and returns the accumulated text. Byte sequences
    /// that are not valid UTF-8 are replaced with U+FFFD.
    pub fn take_string(self) -> String {
        match String::from_utf8(self.buf) {
            Ok(s) => s,
            Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
        }
    }
}

impl Target for StringTarget {
    fn begin(&mut self) {
        self.buf.clear();
    }

    fn put(&mut self, byte: u8) {
        self.buf.push(byte);
    }

    fn put_slice(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    fn end(&mut self) -> i64 {
        capped_count(self.buf.len())
    }

    fn count(&self) -> usize {
        self.buf.len()
    }

    fn locale(&self) -> Locale {
        self.locale.clone()
    }
}
