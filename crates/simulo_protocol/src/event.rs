//! # Host Events
//!
//! Typed records carried by the wire format.

use simulo_core::{Pose, Viewport, KEYPOINT_COUNT};

/// Size of a pose upsert record: tag + id + 17 keypoints of two `i16`.
pub const POSE_UPSERT_LEN: usize = 1 + 4 + KEYPOINT_COUNT * 2 * 2;

/// Size of a pose delete record: tag + id.
pub const POSE_DELETE_LEN: usize = 1 + 4;

/// Size of a viewport resize record: tag + width + height.
pub const VIEWPORT_RESIZE_LEN: usize = 1 + 2 + 2;

/// Record type discriminator.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventTag {
    /// Create or update a tracked pose.
    PoseUpsert = 0,
    /// Remove a tracked pose.
    PoseDelete = 1,
    /// Output surface changed size.
    ViewportResize = 2,
}

impl EventTag {
    /// Parses a tag byte.
    #[inline]
    #[must_use]
    pub const fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Self::PoseUpsert),
            1 => Some(Self::PoseDelete),
            2 => Some(Self::ViewportResize),
            _ => None,
        }
    }

    /// Full record size for this tag, tag byte included.
    #[inline]
    #[must_use]
    pub const fn record_len(self) -> usize {
        match self {
            Self::PoseUpsert => POSE_UPSERT_LEN,
            Self::PoseDelete => POSE_DELETE_LEN,
            Self::ViewportResize => VIEWPORT_RESIZE_LEN,
        }
    }
}

/// One decoded host event.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HostEvent {
    /// Create or update the pose of a tracked entity.
    PoseUpsert {
        /// Host-assigned tracked entity id.
        id: u32,
        /// Keypoints, widened from `i16`.
        pose: Pose,
    },
    /// Remove a tracked entity.
    PoseDelete {
        /// Host-assigned tracked entity id.
        id: u32,
    },
    /// New output surface size.
    ViewportResize(Viewport),
}

impl HostEvent {
    /// Record type of this event.
    #[must_use]
    pub const fn tag(&self) -> EventTag {
        match self {
            Self::PoseUpsert { .. } => EventTag::PoseUpsert,
            Self::PoseDelete { .. } => EventTag::PoseDelete,
            Self::ViewportResize(_) => EventTag::ViewportResize,
        }
    }

    /// Encoded size of this event.
    #[must_use]
    pub const fn encoded_len(&self) -> usize {
        self.tag().record_len()
    }
}
