//! # Event Decoder
//!
//! Bounds-checked reader over one polled span.
//!
//! ## Design
//!
//! - The record size is known from the tag, so the whole record is checked
//!   against the span once before any field is read
//! - Fields are read big-endian regardless of platform
//! - Borrowing only: no allocation unless collecting into a `Vec`

use simulo_core::{Pose, Viewport, KEYPOINT_COUNT, POSE_DATA_LEN};
use tracing::trace;

use crate::error::{DecodeError, DecodeResult};
use crate::event::{EventTag, HostEvent};

/// Streaming decoder over a byte span.
///
/// After an error the decoder is exhausted; every later call returns
/// `Ok(None)` and the iterator yields nothing.
pub struct EventDecoder<'a> {
    buffer: &'a [u8],
    position: usize,
}

impl<'a> EventDecoder<'a> {
    /// Creates a decoder over the valid part of a poll buffer.
    #[must_use]
    pub const fn new(buffer: &'a [u8]) -> Self {
        Self { buffer, position: 0 }
    }

    /// Offset of the next record.
    #[inline]
    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Returns the number of bytes remaining.
    #[inline]
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.position)
    }

    /// Decodes the next record, or `Ok(None)` at the end of the span.
    ///
    /// # Errors
    ///
    /// - [`DecodeError::UnknownTag`] for a tag outside 0..=2
    /// - [`DecodeError::Truncated`] if the record's fixed size exceeds the
    ///   remaining bytes
    pub fn next_event(&mut self) -> DecodeResult<Option<HostEvent>> {
        let offset = self.position;
        let Some(&tag_byte) = self.buffer.get(offset) else {
            return Ok(None);
        };

        let Some(tag) = EventTag::from_byte(tag_byte) else {
            self.position = self.buffer.len();
            return Err(DecodeError::UnknownTag { offset, tag: tag_byte });
        };

        let needed = tag.record_len();
        let available = self.remaining();
        if needed > available {
            self.position = self.buffer.len();
            return Err(DecodeError::Truncated {
                offset,
                tag: tag_byte,
                needed,
                available,
            });
        }

        let mut record = RecordReader::new(&self.buffer[offset + 1..offset + needed]);
        self.position = offset + needed;

        let event = match tag {
            EventTag::PoseUpsert => {
                let id = record.read_u32();
                let mut data = [0.0f32; POSE_DATA_LEN];
                for value in &mut data[..KEYPOINT_COUNT * 2] {
                    *value = f32::from(record.read_i16());
                }
                HostEvent::PoseUpsert {
                    id,
                    pose: Pose::from_data(data),
                }
            }
            EventTag::PoseDelete => HostEvent::PoseDelete { id: record.read_u32() },
            EventTag::ViewportResize => {
                let width = record.read_u16();
                let height = record.read_u16();
                HostEvent::ViewportResize(Viewport::new(width, height))
            }
        };
        Ok(Some(event))
    }
}

impl Iterator for EventDecoder<'_> {
    type Item = DecodeResult<HostEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_event().transpose()
    }
}

/// Reader over a record whose length was already validated.
struct RecordReader<'a> {
    bytes: &'a [u8],
}

impl<'a> RecordReader<'a> {
    const fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    #[inline]
    fn take<const N: usize>(&mut self) -> [u8; N] {
        let mut out = [0u8; N];
        let (head, tail) = self.bytes.split_at(N.min(self.bytes.len()));
        out[..head.len()].copy_from_slice(head);
        self.bytes = tail;
        out
    }

    #[inline]
    fn read_u16(&mut self) -> u16 {
        u16::from_be_bytes(self.take())
    }

    #[inline]
    fn read_i16(&mut self) -> i16 {
        i16::from_be_bytes(self.take())
    }

    #[inline]
    fn read_u32(&mut self) -> u32 {
        u32::from_be_bytes(self.take())
    }
}

/// Decodes a whole span.
///
/// # Errors
///
/// Returns the first [`DecodeError`]; no events are returned in that case.
pub fn decode_events(bytes: &[u8]) -> DecodeResult<Vec<HostEvent>> {
    EventDecoder::new(bytes).collect()
}

/// Decodes a whole span into a reusable vector, returning the event count.
///
/// `out` is cleared first. On error it holds the events that preceded the
/// failing record; the frame must still be treated as failed.
///
/// # Errors
///
/// Returns the first [`DecodeError`].
pub fn decode_into(bytes: &[u8], out: &mut Vec<HostEvent>) -> DecodeResult<usize> {
    out.clear();
    let mut decoder = EventDecoder::new(bytes);
    while let Some(event) = decoder.next_event()? {
        out.push(event);
    }
    trace!(bytes = bytes.len(), events = out.len(), "decoded span");
    Ok(out.len())
}
