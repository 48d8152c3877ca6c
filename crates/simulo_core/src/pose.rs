//! # Pose Keypoints
//!
//! A tracked body is described by 17 two-dimensional keypoints in a fixed
//! anatomical order. The data is stored flat, `x` and `y` interleaved.

use glam::Vec2;

/// Number of keypoints in a pose.
pub const KEYPOINT_COUNT: usize = 17;

/// Number of floats in a pose (x, y per keypoint).
pub const POSE_DATA_LEN: usize = KEYPOINT_COUNT * 2;

/// Semantic keypoint slot.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Keypoint {
    /// Nose.
    Nose = 0,
    /// Left eye.
    LeftEye = 1,
    /// Right eye.
    RightEye = 2,
    /// Left ear.
    LeftEar = 3,
    /// Right ear.
    RightEar = 4,
    /// Left shoulder.
    LeftShoulder = 5,
    /// Right shoulder.
    RightShoulder = 6,
    /// Left elbow.
    LeftElbow = 7,
    /// Right elbow.
    RightElbow = 8,
    /// Left wrist.
    LeftWrist = 9,
    /// Right wrist.
    RightWrist = 10,
    /// Left hip.
    LeftHip = 11,
    /// Right hip.
    RightHip = 12,
    /// Left knee.
    LeftKnee = 13,
    /// Right knee.
    RightKnee = 14,
    /// Left ankle.
    LeftAnkle = 15,
    /// Right ankle.
    RightAnkle = 16,
}

impl Keypoint {
    /// All keypoints in slot order.
    pub const ALL: [Self; KEYPOINT_COUNT] = [
        Self::Nose,
        Self::LeftEye,
        Self::RightEye,
        Self::LeftEar,
        Self::RightEar,
        Self::LeftShoulder,
        Self::RightShoulder,
        Self::LeftElbow,
        Self::RightElbow,
        Self::LeftWrist,
        Self::RightWrist,
        Self::LeftHip,
        Self::RightHip,
        Self::LeftKnee,
        Self::RightKnee,
        Self::LeftAnkle,
        Self::RightAnkle,
    ];

    /// Slot index of this keypoint (0-16).
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Looks up a keypoint by slot index.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

/// Seventeen 2D keypoints of one tracked body.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    data: [f32; POSE_DATA_LEN],
}

impl Pose {
    /// Creates a pose from flat interleaved data.
    #[inline]
    #[must_use]
    pub const fn from_data(data: [f32; POSE_DATA_LEN]) -> Self {
        Self { data }
    }

    /// Creates a pose with every keypoint at the origin.
    #[inline]
    #[must_use]
    pub const fn zeroed() -> Self {
        Self {
            data: [0.0; POSE_DATA_LEN],
        }
    }

    /// Creates a pose from 17 points.
    #[must_use]
    pub fn from_points(points: [Vec2; KEYPOINT_COUNT]) -> Self {
        let mut data = [0.0; POSE_DATA_LEN];
        for (i, point) in points.iter().enumerate() {
            data[i * 2] = point.x;
            data[i * 2 + 1] = point.y;
        }
        Self { data }
    }

    /// Returns the flat interleaved data.
    #[inline]
    #[must_use]
    pub const fn data(&self) -> &[f32; POSE_DATA_LEN] {
        &self.data
    }

    /// Returns the point at slot `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= KEYPOINT_COUNT`.
    #[inline]
    #[must_use]
    pub fn keypoint(&self, index: usize) -> Vec2 {
        assert!(index < KEYPOINT_COUNT, "keypoint index {index} out of range");
        Vec2::new(self.data[index * 2], self.data[index * 2 + 1])
    }

    /// Returns the point for a semantic slot.
    #[inline]
    #[must_use]
    pub fn get(&self, keypoint: Keypoint) -> Vec2 {
        self.keypoint(keypoint.index())
    }

    /// Overwrites the point at a semantic slot.
    #[inline]
    pub fn set(&mut self, keypoint: Keypoint, point: Vec2) {
        let i = keypoint.index();
        self.data[i * 2] = point.x;
        self.data[i * 2 + 1] = point.y;
    }

    /// Iterates `(keypoint, point)` pairs in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (Keypoint, Vec2)> + '_ {
        Keypoint::ALL.iter().map(|&k| (k, self.get(k)))
    }

    /// Nose.
    #[must_use]
    pub fn nose(&self) -> Vec2 {
        self.get(Keypoint::Nose)
    }

    /// Left eye.
    #[must_use]
    pub fn left_eye(&self) -> Vec2 {
        self.get(Keypoint::LeftEye)
    }

    /// Right eye.
    #[must_use]
    pub fn right_eye(&self) -> Vec2 {
        self.get(Keypoint::RightEye)
    }

    /// Left ear.
    #[must_use]
    pub fn left_ear(&self) -> Vec2 {
        self.get(Keypoint::LeftEar)
    }

    /// Right ear.
    #[must_use]
    pub fn right_ear(&self) -> Vec2 {
        self.get(Keypoint::RightEar)
    }

    /// Left shoulder.
    #[must_use]
    pub fn left_shoulder(&self) -> Vec2 {
        self.get(Keypoint::LeftShoulder)
    }

    /// Right shoulder.
    #[must_use]
    pub fn right_shoulder(&self) -> Vec2 {
        self.get(Keypoint::RightShoulder)
    }

    /// Left elbow.
    #[must_use]
    pub fn left_elbow(&self) -> Vec2 {
        self.get(Keypoint::LeftElbow)
    }

    /// Right elbow.
    #[must_use]
    pub fn right_elbow(&self) -> Vec2 {
        self.get(Keypoint::RightElbow)
    }

    /// Left wrist.
    #[must_use]
    pub fn left_wrist(&self) -> Vec2 {
        self.get(Keypoint::LeftWrist)
    }

    /// Right wrist.
    #[must_use]
    pub fn right_wrist(&self) -> Vec2 {
        self.get(Keypoint::RightWrist)
    }

    /// Left hip.
    #[must_use]
    pub fn left_hip(&self) -> Vec2 {
        self.get(Keypoint::LeftHip)
    }

    /// Right hip.
    #[must_use]
    pub fn right_hip(&self) -> Vec2 {
        self.get(Keypoint::RightHip)
    }

    /// Left knee.
    #[must_use]
    pub fn left_knee(&self) -> Vec2 {
        self.get(Keypoint::LeftKnee)
    }

    /// Right knee.
    #[must_use]
    pub fn right_knee(&self) -> Vec2 {
        self.get(Keypoint::RightKnee)
    }

    /// Left ankle.
    #[must_use]
    pub fn left_ankle(&self) -> Vec2 {
        self.get(Keypoint::LeftAnkle)
    }

    /// Right ankle.
    #[must_use]
    pub fn right_ankle(&self) -> Vec2 {
        self.get(Keypoint::RightAnkle)
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::zeroed()
    }
}
