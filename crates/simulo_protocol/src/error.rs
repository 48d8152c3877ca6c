//! # Decode Error Types
//!
//! Both failures are fatal for the frame: the stream cannot be resynchronized
//! after an unknown tag or a short record.

use thiserror::Error;

/// Errors that can occur while decoding host events.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// A record's fixed size exceeds the bytes left in the span.
    #[error("truncated record with tag {tag} at offset {offset}: need {needed} bytes, have {available}")]
    Truncated {
        /// Offset of the record's tag byte.
        offset: usize,
        /// The record's tag.
        tag: u8,
        /// Full record size including the tag.
        needed: usize,
        /// Bytes from `offset` to the end of the span.
        available: usize,
    },

    /// The tag byte names no known record type.
    #[error("unknown event tag {tag:#04x} at offset {offset}")]
    UnknownTag {
        /// Offset of the tag byte.
        offset: usize,
        /// The offending tag.
        tag: u8,
    },
}

impl DecodeError {
    /// Offset of the record that failed.
    #[must_use]
    pub const fn offset(&self) -> usize {
        match *self {
            Self::Truncated { offset, .. } | Self::UnknownTag { offset, .. } => offset,
        }
    }
}

/// Result type for decode operations.
pub type DecodeResult<T> = Result<T, DecodeError>;
