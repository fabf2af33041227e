//! Bounds-checked sub-element cursor for the FTIE optional parameters.
//!
//! Sub-elements share the `{id, length, value}` layout of top-level
//! elements. The cursor never reads past the buffer, never loops on a
//! non-advancing input, and treats a zero-length sub-element as the end of
//! the walk: legacy encoders pad the tail with zero bytes, and a zero
//! length would otherwise keep the cursor in place forever.

use crate::errors::{ProtocolError, Result};

/// Iterator over `(sub_element_id, value)` pairs in an FTIE tail.
pub struct SubElements<'a> {
    buf: &'a [u8],
}

impl<'a> SubElements<'a> {
    /// Walk the given optional-parameter bytes.
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }
}

impl<'a> Iterator for SubElements<'a> {
    type Item = Result<(u8, &'a [u8])>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.buf.is_empty() {
            return None;
        }
        if self.buf.len() < 2 {
            let err = ProtocolError::Truncated {
                element: "sub-element header",
                expected: 2,
                actual: self.buf.len(),
            };
            self.buf = &[];
            return Some(Err(err));
        }

        let id = self.buf[0];
        let len = self.buf[1] as usize;
        if len == 0 {
            // Zero-length sub-element: stop, keep what was already parsed.
            self.buf = &[];
            return None;
        }

        let remaining = self.buf.len() - 2;
        if len > remaining {
            self.buf = &[];
            return Some(Err(ProtocolError::SubElementOverrun { declared: len, remaining }));
        }

        let value = &self.buf[2..2 + len];
        self.buf = &self.buf[2 + len..];
        Some(Ok((id, value)))
    }
}

/// Append one sub-element to `out`.
pub fn write_sub_element(out: &mut Vec<u8>, id: u8, value: &[u8]) {
    debug_assert!(value.len() <= u8::MAX as usize);
    out.push(id);
    out.push(value.len() as u8);
    out.extend_from_slice(value);
}
