//! # Transform Resolution
//!
//! Once per frame, after all update logic has run, the resolver walks the
//! subtrees rooted at dirty nodes and recomputes global transforms top-down:
//!
//! ```text
//! global(node) = global(parent) * local(node)      attached
//! global(node) = local(node)                       root
//! ```
//!
//! The accumulated parent transform is carried down the walk; the cached
//! global of a walk root's parent seeds it. Renderable nodes visited along
//! the way are appended to a [`TransformBatch`], which is sent to the host in
//! a single call.
//!
//! ## Performance
//!
//! - Work is O(size of dirty subtrees), not O(scene)
//! - Batch and traversal buffers are reused between frames
//! - One host call per frame regardless of how many nodes moved

use glam::Mat4;
use tracing::trace;

use crate::host::Host;
use crate::node::NodeId;
use crate::scene::Scene;
use crate::MATRIX_FLOATS;

/// Parallel arrays of render handles and their global transforms.
#[derive(Debug, Default, Clone)]
pub struct TransformBatch {
    ids: Vec<u32>,
    matrices: Vec<Mat4>,
}

impl TransformBatch {
    /// Creates an empty batch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    fn push(&mut self, id: u32, matrix: Mat4) {
        self.ids.push(id);
        self.matrices.push(matrix);
    }

    /// Render handle ids in append order.
    #[inline]
    #[must_use]
    pub fn ids(&self) -> &[u32] {
        &self.ids
    }

    /// Global transforms, parallel to [`ids`](Self::ids).
    #[inline]
    #[must_use]
    pub fn matrices(&self) -> &[Mat4] {
        &self.matrices
    }

    /// Global transforms as flat column-major floats, 16 per id.
    #[inline]
    #[must_use]
    pub fn matrices_flat(&self) -> &[f32] {
        bytemuck::cast_slice(&self.matrices)
    }

    /// Number of entries.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns `true` if the batch holds nothing.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Empties the batch, keeping its allocations.
    pub fn clear(&mut self) {
        self.ids.clear();
        self.matrices.clear();
    }
}

/// Counters for one resolution pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ResolveStats {
    /// Dirty nodes used as walk roots.
    pub roots: usize,
    /// Dirty entries skipped (dead, or covered by a dirty ancestor).
    pub skipped: usize,
    /// Nodes whose global transform was recomputed.
    pub visited: usize,
    /// Renderable transforms appended to the batch.
    pub emitted: usize,
}

/// Dirty-set driven global transform propagation.
#[derive(Debug, Default)]
pub struct TransformResolver {
    batch: TransformBatch,
    roots: Vec<NodeId>,
    stack: Vec<(NodeId, Mat4)>,
}

impl TransformResolver {
    /// Creates a resolver with empty buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Recomputes global transforms under every dirty node and rebuilds the
    /// batch. The scene's dirty set is empty afterwards.
    pub fn resolve(&mut self, scene: &mut Scene) -> ResolveStats {
        let mut stats = ResolveStats::default();
        self.batch.clear();
        self.roots.clear();
        self.roots.extend_from_slice(scene.dirty().entries());

        for &root in &self.roots {
            // Entries of despawned nodes linger until the set is cleared.
            if !scene.is_alive(root) || scene.has_dirty_ancestor(root) {
                stats.skipped += 1;
                continue;
            }
            stats.roots += 1;

            let seed = scene
                .parent(root)
                .and_then(|parent| scene.global_transform(parent))
                .unwrap_or(Mat4::IDENTITY);
            self.stack.push((root, seed));

            while let Some((id, parent_global)) = self.stack.pop() {
                let Some(node) = scene.node_mut(id) else {
                    continue;
                };
                let global = parent_global * node.local_transform();
                node.global = global;
                stats.visited += 1;

                if let Some(handle) = node.render_handle() {
                    self.batch.push(handle.0, global);
                    stats.emitted += 1;
                }
                self.stack.extend(node.children.iter().rev().map(|&child| (child, global)));
            }
        }

        scene.dirty_mut().clear();
        trace!(
            roots = stats.roots,
            visited = stats.visited,
            emitted = stats.emitted,
            "resolved transforms"
        );
        stats
    }

    /// Sends the current batch in one host call. Returns `false` without
    /// calling the host when the batch is empty.
    pub fn emit(&self, host: &mut dyn Host) -> bool {
        if self.batch.is_empty() {
            return false;
        }
        let matrices = self.batch.matrices_flat();
        debug_assert_eq!(matrices.len(), self.batch.len() * MATRIX_FLOATS);
        host.set_render_object_transforms(self.batch.ids(), matrices);
        true
    }

    /// Batch built by the last [`resolve`](Self::resolve).
    #[inline]
    #[must_use]
    pub const fn batch(&self) -> &TransformBatch {
        &self.batch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{MaterialHandle, RecordingHost};
    use glam::Vec3;

    fn setup() -> (RecordingHost, MaterialHandle, Scene, TransformResolver) {
        let mut host = RecordingHost::new();
        let material = host.create_material(None, [1.0; 4]);
        (host, material, Scene::new(), TransformResolver::new())
    }

    #[test]
    fn test_second_resolve_is_empty() {
        let (mut host, material, mut scene, mut resolver) = setup();
        scene.spawn_renderable(&mut host, material, 0, Vec3::X, Vec3::ONE);

        assert_eq!(resolver.resolve(&mut scene).emitted, 1);
        assert!(resolver.emit(&mut host));

        let stats = resolver.resolve(&mut scene);
        assert_eq!(stats, ResolveStats::default());
        assert!(!resolver.emit(&mut host));
        assert_eq!(host.transform_batches().len(), 1);
    }

    #[test]
    fn test_moving_root_updates_renderable_descendants() {
        let (mut host, material, mut scene, mut resolver) = setup();
        let root = scene.spawn(Vec3::ZERO, Vec3::ONE);
        let r1 = scene.spawn_renderable(&mut host, material, 0, Vec3::new(1.0, 0.0, 0.0), Vec3::ONE);
        let r2 = scene.spawn_renderable(&mut host, material, 0, Vec3::new(0.0, 1.0, 0.0), Vec3::ONE);
        let group = scene.spawn(Vec3::new(0.0, 0.0, 1.0), Vec3::ONE);
        scene.add_child(root, r1).unwrap();
        scene.add_child(root, r2).unwrap();
        scene.add_child(root, group).unwrap();
        resolver.resolve(&mut scene);

        scene.set_position(root, Vec3::new(10.0, 0.0, 0.0)).unwrap();
        let stats = resolver.resolve(&mut scene);

        assert_eq!(stats.roots, 1);
        assert_eq!(stats.visited, 4);
        assert_eq!(stats.emitted, 2);
        let batch = resolver.batch();
        let h1 = scene.render_handle(r1).unwrap().0;
        let h2 = scene.render_handle(r2).unwrap().0;
        let mut ids = batch.ids().to_vec();
        ids.sort_unstable();
        assert_eq!(ids, vec![h1.min(h2), h1.max(h2)]);

        for (&id, matrix) in batch.ids().iter().zip(batch.matrices()) {
            let expected = if id == h1 {
                Vec3::new(11.0, 0.0, 0.0)
            } else {
                Vec3::new(10.0, 1.0, 0.0)
            };
            assert!((matrix.w_axis.truncate() - expected).length() < 1e-6);
        }
        assert_eq!(scene.global_transform(group), Some(Mat4::from_translation(Vec3::new(10.0, 0.0, 1.0))));
    }

    #[test]
    fn test_dirty_child_seeds_from_cached_parent() {
        let (mut host, material, mut scene, mut resolver) = setup();
        let parent = scene.spawn(Vec3::new(5.0, 0.0, 0.0), Vec3::splat(2.0));
        let child = scene.spawn_renderable(&mut host, material, 0, Vec3::ZERO, Vec3::ONE);
        scene.add_child(parent, child).unwrap();
        resolver.resolve(&mut scene);

        scene.set_position(child, Vec3::new(1.0, 0.0, 0.0)).unwrap();
        let stats = resolver.resolve(&mut scene);

        assert_eq!(stats.visited, 1);
        let expected = scene.compute_global_transform(child).unwrap();
        assert_eq!(scene.global_transform(child), Some(expected));
        assert_eq!(resolver.batch().matrices()[0], expected);
    }

    #[test]
    fn test_nested_dirty_node_is_visited_once() {
        let (mut host, material, mut scene, mut resolver) = setup();
        let root = scene.spawn(Vec3::ZERO, Vec3::ONE);
        let child = scene.spawn_renderable(&mut host, material, 0, Vec3::ZERO, Vec3::ONE);
        scene.add_child(root, child).unwrap();

        let stats = resolver.resolve(&mut scene);

        assert_eq!(stats.roots, 1);
        assert_eq!(stats.skipped, 1);
        assert_eq!(resolver.batch().len(), 1);
    }

    #[test]
    fn test_despawned_dirty_node_is_skipped() {
        let (mut host, material, mut scene, mut resolver) = setup();
        let r = scene.spawn_renderable(&mut host, material, 0, Vec3::ZERO, Vec3::ONE);
        scene.despawn(&mut host, r).unwrap();

        let stats = resolver.resolve(&mut scene);

        assert_eq!(stats.skipped, 1);
        assert!(resolver.batch().is_empty());
        assert!(scene.dirty().is_empty());
    }

    #[test]
    fn test_detached_dirty_node_is_walked_as_root() {
        let (mut host, material, mut scene, mut resolver) = setup();
        let parent = scene.spawn(Vec3::new(3.0, 0.0, 0.0), Vec3::ONE);
        let child = scene.spawn_renderable(&mut host, material, 0, Vec3::X, Vec3::ONE);
        scene.add_child(parent, child).unwrap();
        resolver.resolve(&mut scene);

        scene.remove_from_parent(child).unwrap();
        scene.mark_moved(child).unwrap();
        resolver.resolve(&mut scene);

        assert_eq!(scene.global_transform(child), Some(Mat4::from_translation(Vec3::X)));
    }

    #[test]
    fn test_flat_matrices_are_column_major() {
        let (mut host, material, mut scene, mut resolver) = setup();
        scene.spawn_renderable(&mut host, material, 0, Vec3::new(1.0, 2.0, 3.0), Vec3::ONE);
        resolver.resolve(&mut scene);

        let flat = resolver.batch().matrices_flat();
        assert_eq!(flat.len(), MATRIX_FLOATS);
        assert_eq!(&flat[12..16], &[1.0, 2.0, 3.0, 1.0]);
    }
}
