//! # Scene Nodes
//!
//! Nodes are addressed by lightweight identifiers consisting of:
//! - An index into the scene's slot array
//! - A generation counter for detecting stale references after reuse

use glam::{Mat4, Vec3};

use crate::behavior::Behavior;
use crate::host::{MaterialHandle, RenderHandle};
use crate::math::local_transform;
use crate::pose::Pose;

/// Unique identifier for a scene node.
///
/// The ID is split into two parts:
/// - Lower 32 bits: Index into the scene's slot array
/// - Upper 32 bits: Generation counter for detecting stale references
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct NodeId(u64);

impl NodeId {
    /// Creates a new node ID from index and generation.
    #[inline]
    #[must_use]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self(((generation as u64) << 32) | (index as u64))
    }

    /// Returns the index portion of the node ID.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0 as u32
    }

    /// Returns the generation portion of the node ID.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        (self.0 >> 32) as u32
    }

    /// Returns the packed 64-bit value.
    #[inline]
    #[must_use]
    pub const fn to_bits(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}v{}", self.index(), self.generation())
    }
}

/// Host-side render object owned by a renderable node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Renderable {
    /// Handle returned by the host at creation.
    pub handle: RenderHandle,
    /// Material currently assigned.
    pub material: MaterialHandle,
    /// Draw order the object was created with.
    pub render_order: u32,
}

/// What a node is, beyond its transform.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    /// Grouping/transform-only node.
    Plain,
    /// Node that owns a host render object.
    Renderable(Renderable),
}

/// A positioned node in the scene graph.
///
/// Fields are only mutated through [`Scene`](crate::Scene) so that transform
/// writes always reach the dirty set and parent/index links stay consistent.
pub struct Node {
    pub(crate) position: Vec3,
    pub(crate) rotation: Vec3,
    pub(crate) scale: Vec3,
    pub(crate) parent: Option<NodeId>,
    /// Slot in the parent's child list; `None` exactly when `parent` is `None`.
    pub(crate) index: Option<usize>,
    pub(crate) children: Vec<NodeId>,
    /// Global transform as of the last resolution pass.
    pub(crate) global: Mat4,
    pub(crate) kind: NodeKind,
    pub(crate) behavior: Option<Box<dyn Behavior>>,
    pub(crate) pose: Option<Pose>,
}

impl Node {
    pub(crate) fn new(kind: NodeKind, position: Vec3, scale: Vec3) -> Self {
        Self {
            position,
            rotation: Vec3::ZERO,
            scale,
            parent: None,
            index: None,
            children: Vec::new(),
            global: Mat4::IDENTITY,
            kind,
            behavior: None,
            pose: None,
        }
    }

    /// Local position.
    #[inline]
    #[must_use]
    pub const fn position(&self) -> Vec3 {
        self.position
    }

    /// Local Euler rotation in radians.
    #[inline]
    #[must_use]
    pub const fn rotation(&self) -> Vec3 {
        self.rotation
    }

    /// Local scale.
    #[inline]
    #[must_use]
    pub const fn scale(&self) -> Vec3 {
        self.scale
    }

    /// Parent node, if attached.
    #[inline]
    #[must_use]
    pub const fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Position in the parent's child list, if attached.
    #[inline]
    #[must_use]
    pub const fn index_in_parent(&self) -> Option<usize> {
        self.index
    }

    /// Children in insertion order (modulo swap-removals).
    #[inline]
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Node kind.
    #[inline]
    #[must_use]
    pub const fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Render handle if this node is renderable.
    #[inline]
    #[must_use]
    pub const fn render_handle(&self) -> Option<RenderHandle> {
        match self.kind {
            NodeKind::Renderable(r) => Some(r.handle),
            NodeKind::Plain => None,
        }
    }

    /// Attached pose, if this node represents a tracked body.
    #[inline]
    #[must_use]
    pub const fn pose(&self) -> Option<&Pose> {
        self.pose.as_ref()
    }

    /// Whether a behavior is attached.
    #[inline]
    #[must_use]
    pub fn has_behavior(&self) -> bool {
        self.behavior.is_some()
    }

    /// Local transform composed from position, rotation and scale.
    #[inline]
    #[must_use]
    pub fn local_transform(&self) -> Mat4 {
        local_transform(self.position, self.rotation, self.scale)
    }

    /// Global transform computed by the last resolution pass.
    #[inline]
    #[must_use]
    pub const fn global_transform(&self) -> Mat4 {
        self.global
    }
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("position", &self.position)
            .field("rotation", &self.rotation)
            .field("scale", &self.scale)
            .field("parent", &self.parent)
            .field("index", &self.index)
            .field("children", &self.children)
            .field("kind", &self.kind)
            .field("behavior", &self.behavior.is_some())
            .field("pose", &self.pose.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id_roundtrip() {
        let id = NodeId::new(12345, 67890);
        assert_eq!(id.index(), 12345);
        assert_eq!(id.generation(), 67890);
        assert_eq!(id.to_string(), "12345v67890");
    }

    #[test]
    fn test_new_node_is_detached() {
        let node = Node::new(NodeKind::Plain, Vec3::X, Vec3::ONE);
        assert_eq!(node.parent(), None);
        assert_eq!(node.index_in_parent(), None);
        assert!(node.render_handle().is_none());
        assert_eq!(node.local_transform(), Mat4::from_translation(Vec3::X));
    }
}
