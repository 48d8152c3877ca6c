//! # Event Encoder
//!
//! Writes host events in the wire format. Hosts written in Rust, tests and
//! benchmarks use it to produce spans for the decoder.
//!
//! The buffer is reused across frames; call [`EventEncoder::reset`] between
//! spans.

use simulo_core::Pose;

use crate::event::{EventTag, HostEvent, POSE_UPSERT_LEN};

/// Growable writer of tag-prefixed big-endian records.
#[derive(Debug, Default, Clone)]
pub struct EventEncoder {
    buffer: Vec<u8>,
}

impl EventEncoder {
    /// Creates an empty encoder.
    #[must_use]
    pub const fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    /// Creates an encoder with room for `capacity` bytes.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
        }
    }

    /// Resets the encoder for reuse.
    #[inline]
    pub fn reset(&mut self) {
        self.buffer.clear();
    }

    /// Returns the number of bytes written.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Returns true if no bytes have been written.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Returns a slice of the written data.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    /// Writes a pose upsert record.
    ///
    /// Coordinates are rounded to the nearest integer and saturated to the
    /// `i16` range; NaN encodes as zero.
    pub fn write_pose_upsert(&mut self, id: u32, pose: &Pose) {
        self.buffer.reserve(POSE_UPSERT_LEN);
        self.buffer.push(EventTag::PoseUpsert as u8);
        self.buffer.extend_from_slice(&id.to_be_bytes());
        for &value in pose.data() {
            self.buffer.extend_from_slice(&quantize(value).to_be_bytes());
        }
    }

    /// Writes a pose delete record.
    pub fn write_pose_delete(&mut self, id: u32) {
        self.buffer.push(EventTag::PoseDelete as u8);
        self.buffer.extend_from_slice(&id.to_be_bytes());
    }

    /// Writes a viewport resize record.
    pub fn write_viewport_resize(&mut self, width: u16, height: u16) {
        self.buffer.push(EventTag::ViewportResize as u8);
        self.buffer.extend_from_slice(&width.to_be_bytes());
        self.buffer.extend_from_slice(&height.to_be_bytes());
    }

    /// Writes any event.
    pub fn write_event(&mut self, event: &HostEvent) {
        match event {
            HostEvent::PoseUpsert { id, pose } => self.write_pose_upsert(*id, pose),
            HostEvent::PoseDelete { id } => self.write_pose_delete(*id),
            HostEvent::ViewportResize(viewport) => self.write_viewport_resize(viewport.width, viewport.height),
        }
    }

    /// Consumes the encoder, returning the written bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }
}

/// Rounds and saturates a coordinate to `i16`.
#[inline]
#[allow(clippy::cast_possible_truncation)]
fn quantize(value: f32) -> i16 {
    // `as` saturates and maps NaN to zero.
    value.round() as i16
}
