//! # Scene Graph
//!
//! Generational arena of [`Node`]s forming a forest.
//!
//! ## Ownership
//!
//! ```text
//!   parent ──children: Vec<NodeId>──► child
//!   child  ──parent: Option<NodeId>─► parent   (non-owning)
//!   child  ──index:  Option<usize>──► its slot in parent.children
//! ```
//!
//! A node's `index` is `None` exactly when its `parent` is `None`. Removing a
//! child swaps the last child into its slot, so removal is O(1) but sibling
//! order is not preserved.
//!
//! Every local transform write marks the node in the scene's [`DirtySet`];
//! nothing is recomputed until [`TransformResolver`](crate::TransformResolver)
//! runs.

use glam::{Mat4, Vec3};
use tracing::debug;

use crate::behavior::Behavior;
use crate::dirty::DirtySet;
use crate::error::{SceneError, SceneResult};
use crate::host::{Host, MaterialHandle, RenderHandle};
use crate::node::{Node, NodeId, NodeKind, Renderable};
use crate::pose::Pose;

struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// Arena-backed scene graph.
pub struct Scene {
    slots: Vec<Slot>,
    /// Indices of empty slots available for reuse.
    free_indices: Vec<u32>,
    dirty: DirtySet,
    alive: usize,
}

impl Scene {
    /// Creates an empty scene.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty scene with room for `capacity` nodes.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_indices: Vec::new(),
            dirty: DirtySet::with_capacity(capacity),
            alive: 0,
        }
    }

    // ========================================================================
    // LIFECYCLE
    // ========================================================================

    /// Spawns a detached plain node. The new node starts dirty.
    pub fn spawn(&mut self, position: Vec3, scale: Vec3) -> NodeId {
        self.insert(Node::new(NodeKind::Plain, position, scale))
    }

    /// Spawns a detached renderable node, creating its host render object.
    pub fn spawn_renderable(
        &mut self,
        host: &mut dyn Host,
        material: MaterialHandle,
        render_order: u32,
        position: Vec3,
        scale: Vec3,
    ) -> NodeId {
        let handle = host.create_render_object(material, render_order);
        let kind = NodeKind::Renderable(Renderable {
            handle,
            material,
            render_order,
        });
        let id = self.insert(Node::new(kind, position, scale));
        debug!(node = %id, handle = handle.0, "spawned renderable");
        id
    }

    fn insert(&mut self, node: Node) -> NodeId {
        self.alive += 1;
        let id = if let Some(index) = self.free_indices.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            NodeId::new(index, slot.generation)
        } else {
            let index = u32::try_from(self.slots.len()).unwrap_or(u32::MAX);
            self.slots.push(Slot {
                generation: 0,
                node: Some(node),
            });
            NodeId::new(index, 0)
        };
        self.dirty.mark(id);
        id
    }

    /// Destroys a node and its whole subtree.
    ///
    /// The node is detached from its parent first. Every renderable in the
    /// subtree has its host render object released exactly once.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::StaleNode`] if `id` is not alive.
    pub fn despawn(&mut self, host: &mut dyn Host, id: NodeId) -> SceneResult<()> {
        if !self.is_alive(id) {
            return Err(SceneError::StaleNode(id));
        }
        if self.parent(id).is_some() {
            self.remove_from_parent(id)?;
        }

        let mut stack = vec![id];
        let mut released = 0usize;
        while let Some(current) = stack.pop() {
            let Some(node) = self.free_slot(current) else {
                continue;
            };
            stack.extend_from_slice(&node.children);
            if let NodeKind::Renderable(r) = node.kind {
                host.drop_render_object(r.handle);
            }
            released += 1;
        }
        debug!(node = %id, released, "despawned subtree");
        Ok(())
    }

    /// Empties a live slot, bumping its generation. Children are not touched.
    fn free_slot(&mut self, id: NodeId) -> Option<Node> {
        let slot = self.slots.get_mut(id.index() as usize)?;
        if slot.generation != id.generation() {
            return None;
        }
        let node = slot.node.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free_indices.push(id.index());
        self.dirty.unmark(id);
        self.alive -= 1;
        Some(node)
    }

    /// Destroys every node, releasing all render objects.
    pub fn clear(&mut self, host: &mut dyn Host) {
        for (index, slot) in self.slots.iter_mut().enumerate() {
            let Some(node) = slot.node.take() else {
                continue;
            };
            if let NodeKind::Renderable(r) = node.kind {
                host.drop_render_object(r.handle);
            }
            slot.generation = slot.generation.wrapping_add(1);
            self.free_indices.push(u32::try_from(index).unwrap_or(u32::MAX));
        }
        self.dirty.clear();
        self.alive = 0;
    }

    /// Returns `true` if `id` refers to a live node.
    #[inline]
    #[must_use]
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    /// Number of live nodes.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.alive
    }

    /// Returns `true` if no nodes are alive.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.alive == 0
    }

    /// Returns the node for a live id.
    #[inline]
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.slots
            .get(id.index() as usize)
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.node.as_ref())
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots
            .get_mut(id.index() as usize)
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.node.as_mut())
    }

    fn try_node(&self, id: NodeId) -> SceneResult<&Node> {
        self.node(id).ok_or(SceneError::StaleNode(id))
    }

    fn try_node_mut(&mut self, id: NodeId) -> SceneResult<&mut Node> {
        self.node_mut(id).ok_or(SceneError::StaleNode(id))
    }

    // ========================================================================
    // HIERARCHY
    // ========================================================================

    /// Appends `child` to `parent`'s children.
    ///
    /// Does not mark anything dirty; call [`mark_moved`](Self::mark_moved) if
    /// the child's global transform should be re-emitted under its new parent.
    ///
    /// # Errors
    ///
    /// - [`SceneError::StaleNode`] if either id is dead
    /// - [`SceneError::AlreadyAttached`] if `child` already has a parent
    /// - [`SceneError::CycleDetected`] if `child` is `parent` or one of its ancestors
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> SceneResult<()> {
        self.try_node(parent)?;
        if let Some(current) = self.try_node(child)?.parent {
            return Err(SceneError::AlreadyAttached { child, parent: current });
        }

        let mut ancestor = Some(parent);
        while let Some(a) = ancestor {
            if a == child {
                return Err(SceneError::CycleDetected { parent, child });
            }
            ancestor = self.node(a).and_then(|n| n.parent);
        }

        let parent_node = self.try_node_mut(parent)?;
        let index = parent_node.children.len();
        parent_node.children.push(child);

        let child_node = self.try_node_mut(child)?;
        child_node.parent = Some(parent);
        child_node.index = Some(index);
        Ok(())
    }

    /// Detaches `child` from `parent` by swap-removal.
    ///
    /// The last child moves into the vacated slot and has its index updated.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::NotAChild`] unless `child` is currently a child
    /// of `parent`.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> SceneResult<()> {
        let not_a_child = SceneError::NotAChild { parent, child };
        let Some(index) = self
            .node(child)
            .filter(|n| n.parent == Some(parent))
            .and_then(|n| n.index)
        else {
            return Err(not_a_child);
        };

        let parent_node = self.node_mut(parent).ok_or(not_a_child)?;
        if parent_node.children.get(index) != Some(&child) {
            return Err(not_a_child);
        }
        parent_node.children.swap_remove(index);
        let moved = parent_node.children.get(index).copied();

        if let Some(moved) = moved {
            if let Some(moved_node) = self.node_mut(moved) {
                moved_node.index = Some(index);
            }
        }

        if let Some(child_node) = self.node_mut(child) {
            child_node.parent = None;
            child_node.index = None;
        }
        Ok(())
    }

    /// Detaches `node` from whatever parent it has.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::StaleNode`] for a dead id and
    /// [`SceneError::NoParent`] for a detached node.
    pub fn remove_from_parent(&mut self, node: NodeId) -> SceneResult<()> {
        let parent = self.try_node(node)?.parent.ok_or(SceneError::NoParent(node))?;
        self.remove_child(parent, node)
    }

    /// Parent of a live node.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(Node::parent)
    }

    /// Children of a live node; empty for dead ids.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map_or(&[] as &[NodeId], Node::children)
    }

    /// Slot of a node in its parent's child list.
    #[must_use]
    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        self.node(id).and_then(Node::index_in_parent)
    }

    /// Iterates `root` and its descendants depth-first, parents before
    /// children, siblings in child-list order. Empty for a dead root.
    pub fn iter_depth_first(&self, root: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let stack = if self.is_alive(root) { vec![root] } else { Vec::new() };
        DepthFirst { scene: self, stack }
    }

    // ========================================================================
    // TRANSFORMS
    // ========================================================================

    /// Sets local position and marks the node dirty.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::StaleNode`] for a dead id.
    pub fn set_position(&mut self, id: NodeId, position: Vec3) -> SceneResult<()> {
        self.try_node_mut(id)?.position = position;
        self.dirty.mark(id);
        Ok(())
    }

    /// Offsets local position and marks the node dirty.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::StaleNode`] for a dead id.
    pub fn translate(&mut self, id: NodeId, offset: Vec3) -> SceneResult<()> {
        self.try_node_mut(id)?.position += offset;
        self.dirty.mark(id);
        Ok(())
    }

    /// Sets local Euler rotation (radians) and marks the node dirty.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::StaleNode`] for a dead id.
    pub fn set_rotation(&mut self, id: NodeId, rotation: Vec3) -> SceneResult<()> {
        self.try_node_mut(id)?.rotation = rotation;
        self.dirty.mark(id);
        Ok(())
    }

    /// Sets local scale and marks the node dirty.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::StaleNode`] for a dead id.
    pub fn set_scale(&mut self, id: NodeId, scale: Vec3) -> SceneResult<()> {
        self.try_node_mut(id)?.scale = scale;
        self.dirty.mark(id);
        Ok(())
    }

    /// Marks a node dirty without changing it, e.g. after reparenting.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::StaleNode`] for a dead id.
    pub fn mark_moved(&mut self, id: NodeId) -> SceneResult<()> {
        self.try_node(id)?;
        self.dirty.mark(id);
        Ok(())
    }

    /// Local position.
    #[must_use]
    pub fn position(&self, id: NodeId) -> Option<Vec3> {
        self.node(id).map(Node::position)
    }

    /// Local rotation.
    #[must_use]
    pub fn rotation(&self, id: NodeId) -> Option<Vec3> {
        self.node(id).map(Node::rotation)
    }

    /// Local scale.
    #[must_use]
    pub fn scale(&self, id: NodeId) -> Option<Vec3> {
        self.node(id).map(Node::scale)
    }

    /// Local transform.
    #[must_use]
    pub fn local_transform(&self, id: NodeId) -> Option<Mat4> {
        self.node(id).map(Node::local_transform)
    }

    /// Global transform as of the last resolution pass.
    #[must_use]
    pub fn global_transform(&self, id: NodeId) -> Option<Mat4> {
        self.node(id).map(Node::global_transform)
    }

    /// Computes the current global transform by walking the parent chain.
    ///
    /// Query helper only; ignores the cache and does not update it.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::StaleNode`] for a dead id.
    pub fn compute_global_transform(&self, id: NodeId) -> SceneResult<Mat4> {
        let node = self.try_node(id)?;
        let mut global = node.local_transform();
        let mut ancestor = node.parent;
        while let Some(a) = ancestor {
            let parent = self.try_node(a)?;
            global = parent.local_transform() * global;
            ancestor = parent.parent;
        }
        Ok(global)
    }

    /// The set of nodes moved since the last resolution pass.
    #[inline]
    #[must_use]
    pub const fn dirty(&self) -> &DirtySet {
        &self.dirty
    }

    #[inline]
    pub(crate) fn dirty_mut(&mut self) -> &mut DirtySet {
        &mut self.dirty
    }

    /// Returns `true` if any ancestor of `id` is in the dirty set.
    #[must_use]
    pub fn has_dirty_ancestor(&self, id: NodeId) -> bool {
        let mut ancestor = self.parent(id);
        while let Some(a) = ancestor {
            if self.dirty.contains(a) {
                return true;
            }
            ancestor = self.parent(a);
        }
        false
    }

    // ========================================================================
    // RENDERABLES
    // ========================================================================

    /// Render handle of a renderable node.
    #[must_use]
    pub fn render_handle(&self, id: NodeId) -> Option<RenderHandle> {
        self.node(id).and_then(Node::render_handle)
    }

    fn renderable_mut(&mut self, id: NodeId) -> SceneResult<&mut Renderable> {
        match &mut self.try_node_mut(id)?.kind {
            NodeKind::Renderable(r) => Ok(r),
            NodeKind::Plain => Err(SceneError::NotRenderable(id)),
        }
    }

    /// Reassigns a renderable node's material.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::StaleNode`] or [`SceneError::NotRenderable`].
    pub fn set_material(&mut self, host: &mut dyn Host, id: NodeId, material: MaterialHandle) -> SceneResult<()> {
        let renderable = self.renderable_mut(id)?;
        renderable.material = material;
        host.set_render_object_material(renderable.handle, material);
        Ok(())
    }

    /// Sets one renderable node's RGBA color.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::StaleNode`] or [`SceneError::NotRenderable`].
    pub fn set_color(&mut self, host: &mut dyn Host, id: NodeId, rgba: [f32; 4]) -> SceneResult<()> {
        self.set_colors(host, &[(id, rgba)])
    }

    /// Sets many renderable nodes' colors with one host call.
    ///
    /// Nothing is sent if any id is dead or not renderable.
    ///
    /// # Errors
    ///
    /// Returns the first [`SceneError::StaleNode`] or
    /// [`SceneError::NotRenderable`] encountered.
    pub fn set_colors(&mut self, host: &mut dyn Host, colors: &[(NodeId, [f32; 4])]) -> SceneResult<()> {
        let mut ids = Vec::with_capacity(colors.len());
        let mut flat = Vec::with_capacity(colors.len() * 4);
        for &(id, rgba) in colors {
            let handle = self
                .try_node(id)?
                .render_handle()
                .ok_or(SceneError::NotRenderable(id))?;
            ids.push(handle.0);
            flat.extend_from_slice(&rgba);
        }
        if !ids.is_empty() {
            host.set_render_object_colors(&ids, &flat);
        }
        Ok(())
    }

    // ========================================================================
    // ATTACHMENTS
    // ========================================================================

    /// Attaches or replaces a node's pose.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::StaleNode`] for a dead id.
    pub fn set_pose(&mut self, id: NodeId, pose: Pose) -> SceneResult<()> {
        self.try_node_mut(id)?.pose = Some(pose);
        Ok(())
    }

    /// Pose attached to a node.
    #[must_use]
    pub fn pose(&self, id: NodeId) -> Option<&Pose> {
        self.node(id).and_then(Node::pose)
    }

    /// Mutable pose attached to a node.
    pub fn pose_mut(&mut self, id: NodeId) -> Option<&mut Pose> {
        self.node_mut(id).and_then(|n| n.pose.as_mut())
    }

    /// Attaches or replaces a node's behavior.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::StaleNode`] for a dead id.
    pub fn set_behavior(&mut self, id: NodeId, behavior: Box<dyn Behavior>) -> SceneResult<()> {
        self.try_node_mut(id)?.behavior = Some(behavior);
        Ok(())
    }

    /// Takes a node's behavior out so it can run with `&mut Scene`.
    pub fn take_behavior(&mut self, id: NodeId) -> Option<Box<dyn Behavior>> {
        self.node_mut(id).and_then(|n| n.behavior.take())
    }

    /// Puts a taken behavior back.
    ///
    /// Returns `false` (dropping the behavior) if the node died meanwhile or
    /// was given a new behavior during the call.
    pub fn restore_behavior(&mut self, id: NodeId, behavior: Box<dyn Behavior>) -> bool {
        match self.node_mut(id) {
            Some(node) if node.behavior.is_none() => {
                node.behavior = Some(behavior);
                true
            }
            _ => false,
        }
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("alive", &self.alive)
            .field("slots", &self.slots.len())
            .field("dirty", &self.dirty.len())
            .finish()
    }
}

/// Depth-first iterator over a subtree.
struct DepthFirst<'a> {
    scene: &'a Scene,
    stack: Vec<NodeId>,
}

impl Iterator for DepthFirst<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        // Reverse so the first child is visited first.
        self.stack.extend(self.scene.children(id).iter().rev());
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::RecordingHost;

    fn plain(scene: &mut Scene) -> NodeId {
        scene.spawn(Vec3::ZERO, Vec3::ONE)
    }

    #[test]
    fn test_spawn_marks_dirty() {
        let mut scene = Scene::new();
        let a = plain(&mut scene);
        assert!(scene.is_alive(a));
        assert!(scene.dirty().contains(a));
        assert_eq!(scene.len(), 1);
    }

    #[test]
    fn test_add_child_sets_links() {
        let mut scene = Scene::new();
        let p = plain(&mut scene);
        let a = plain(&mut scene);
        let b = plain(&mut scene);
        scene.add_child(p, a).unwrap();
        scene.add_child(p, b).unwrap();

        assert_eq!(scene.children(p), &[a, b]);
        assert_eq!(scene.parent(b), Some(p));
        assert_eq!(scene.index_in_parent(a), Some(0));
        assert_eq!(scene.index_in_parent(b), Some(1));
    }

    #[test]
    fn test_add_child_rejects_second_parent() {
        let mut scene = Scene::new();
        let p = plain(&mut scene);
        let q = plain(&mut scene);
        let c = plain(&mut scene);
        scene.add_child(p, c).unwrap();

        assert_eq!(
            scene.add_child(q, c),
            Err(SceneError::AlreadyAttached { child: c, parent: p })
        );
        assert_eq!(scene.children(q), &[] as &[NodeId]);
    }

    #[test]
    fn test_add_child_rejects_cycles() {
        let mut scene = Scene::new();
        let a = plain(&mut scene);
        let b = plain(&mut scene);
        scene.add_child(a, b).unwrap();

        assert_eq!(scene.add_child(b, a), Err(SceneError::CycleDetected { parent: b, child: a }));
        assert_eq!(scene.add_child(a, a), Err(SceneError::CycleDetected { parent: a, child: a }));
    }

    #[test]
    fn test_swap_remove_fixes_index() {
        let mut scene = Scene::new();
        let p = plain(&mut scene);
        let a = plain(&mut scene);
        let b = plain(&mut scene);
        let c = plain(&mut scene);
        for child in [a, b, c] {
            scene.add_child(p, child).unwrap();
        }

        scene.remove_child(p, a).unwrap();

        assert_eq!(scene.children(p), &[c, b]);
        assert_eq!(scene.index_in_parent(c), Some(0));
        assert_eq!(scene.index_in_parent(b), Some(1));
        assert_eq!(scene.parent(a), None);
        assert_eq!(scene.index_in_parent(a), None);
    }

    #[test]
    fn test_remove_last_child() {
        let mut scene = Scene::new();
        let p = plain(&mut scene);
        let a = plain(&mut scene);
        let b = plain(&mut scene);
        scene.add_child(p, a).unwrap();
        scene.add_child(p, b).unwrap();

        scene.remove_child(p, b).unwrap();

        assert_eq!(scene.children(p), &[a]);
        assert_eq!(scene.index_in_parent(a), Some(0));
    }

    #[test]
    fn test_readd_never_aliases_index() {
        let mut scene = Scene::new();
        let p = plain(&mut scene);
        let a = plain(&mut scene);
        let b = plain(&mut scene);
        let c = plain(&mut scene);
        scene.add_child(p, a).unwrap();
        scene.add_child(p, b).unwrap();
        scene.remove_child(p, a).unwrap();
        scene.add_child(p, c).unwrap();

        let indices: Vec<_> = scene
            .children(p)
            .iter()
            .map(|&child| scene.index_in_parent(child))
            .collect();
        assert_eq!(indices, vec![Some(0), Some(1)]);
        assert_eq!(scene.children(p), &[b, c]);
    }

    #[test]
    fn test_remove_errors() {
        let mut scene = Scene::new();
        let p = plain(&mut scene);
        let a = plain(&mut scene);

        assert_eq!(scene.remove_child(p, a), Err(SceneError::NotAChild { parent: p, child: a }));
        assert_eq!(scene.remove_from_parent(a), Err(SceneError::NoParent(a)));
    }

    #[test]
    fn test_despawn_releases_subtree_once() {
        let mut host = RecordingHost::new();
        let material = host.create_material(None, [1.0; 4]);
        let mut scene = Scene::new();
        let root = plain(&mut scene);
        let group = plain(&mut scene);
        let r1 = scene.spawn_renderable(&mut host, material, 0, Vec3::ZERO, Vec3::ONE);
        let r2 = scene.spawn_renderable(&mut host, material, 0, Vec3::ZERO, Vec3::ONE);
        scene.add_child(root, group).unwrap();
        scene.add_child(group, r1).unwrap();
        scene.add_child(group, r2).unwrap();

        scene.despawn(&mut host, group).unwrap();

        assert!(!scene.is_alive(group));
        assert!(!scene.is_alive(r1));
        assert!(!scene.is_alive(r2));
        assert!(scene.children(root).is_empty());
        assert!(host.live_render_objects().is_empty());
        assert_eq!(host.invalid_releases(), 0);
        assert_eq!(scene.despawn(&mut host, group), Err(SceneError::StaleNode(group)));
    }

    #[test]
    fn test_slot_reuse_bumps_generation() {
        let mut host = RecordingHost::new();
        let mut scene = Scene::new();
        let a = plain(&mut scene);
        scene.despawn(&mut host, a).unwrap();
        let b = plain(&mut scene);

        assert_eq!(a.index(), b.index());
        assert_ne!(a.generation(), b.generation());
        assert!(!scene.is_alive(a));
        assert!(scene.dirty().contains(b));
        assert_eq!(scene.set_position(a, Vec3::X), Err(SceneError::StaleNode(a)));
    }

    #[test]
    fn test_compute_global_walks_chain() {
        let mut scene = Scene::new();
        let a = scene.spawn(Vec3::new(1.0, 0.0, 0.0), Vec3::splat(2.0));
        let b = scene.spawn(Vec3::new(0.0, 1.0, 0.0), Vec3::ONE);
        scene.add_child(a, b).unwrap();

        let global = scene.compute_global_transform(b).unwrap();
        let origin = global.transform_point3(Vec3::ZERO);
        assert!((origin - Vec3::new(1.0, 2.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn test_depth_first_order() {
        let mut scene = Scene::new();
        let root = plain(&mut scene);
        let a = plain(&mut scene);
        let a1 = plain(&mut scene);
        let b = plain(&mut scene);
        scene.add_child(root, a).unwrap();
        scene.add_child(a, a1).unwrap();
        scene.add_child(root, b).unwrap();

        let order: Vec<_> = scene.iter_depth_first(root).collect();
        assert_eq!(order, vec![root, a, a1, b]);
    }

    #[test]
    fn test_set_colors_validates_before_sending() {
        let mut host = RecordingHost::new();
        let material = host.create_material(None, [1.0; 4]);
        let mut scene = Scene::new();
        let r = scene.spawn_renderable(&mut host, material, 0, Vec3::ZERO, Vec3::ONE);
        let p = plain(&mut scene);
        host.take_calls();

        let result = scene.set_colors(&mut host, &[(r, [1.0; 4]), (p, [0.0; 4])]);

        assert_eq!(result, Err(SceneError::NotRenderable(p)));
        assert!(host.calls().is_empty());
        scene.set_color(&mut host, r, [0.2, 0.4, 0.6, 1.0]).unwrap();
        assert_eq!(host.calls().len(), 1);
    }

    #[test]
    fn test_clear_releases_everything() {
        let mut host = RecordingHost::new();
        let material = host.create_material(None, [1.0; 4]);
        let mut scene = Scene::new();
        let root = plain(&mut scene);
        let r = scene.spawn_renderable(&mut host, material, 0, Vec3::ZERO, Vec3::ONE);
        scene.add_child(root, r).unwrap();

        scene.clear(&mut host);

        assert!(scene.is_empty());
        assert!(scene.dirty().is_empty());
        assert!(host.live_render_objects().is_empty());
        assert!(!scene.is_alive(root));
    }
}
