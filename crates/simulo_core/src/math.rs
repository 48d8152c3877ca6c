//! # Transform Math
//!
//! Local transform composition. The order is fixed:
//! `local = Translate(position) * Rotate(rotation) * Scale(scale)`.

use glam::{Mat4, Vec3};

/// Builds the rotation matrix for Euler angles in radians.
///
/// The product is `Rx * Ry * Rz`. Positive angles turn clockwise when
/// looking down the axis toward the origin, matching the host's matrix
/// layout: a quarter turn about Z takes +X to -Y.
/// A zero vector yields the identity.
#[inline]
#[must_use]
pub fn rotation_matrix(rotation: Vec3) -> Mat4 {
    if rotation == Vec3::ZERO {
        return Mat4::IDENTITY;
    }
    Mat4::from_rotation_x(-rotation.x)
        * Mat4::from_rotation_y(-rotation.y)
        * Mat4::from_rotation_z(-rotation.z)
}

/// Composes a local transform from position, Euler rotation and scale.
#[inline]
#[must_use]
pub fn local_transform(position: Vec3, rotation: Vec3, scale: Vec3) -> Mat4 {
    Mat4::from_translation(position) * rotation_matrix(rotation) * Mat4::from_scale(scale)
}
