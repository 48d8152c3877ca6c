//! # Pose Registry
//!
//! Maps host-assigned tracked-entity ids to the scene nodes that represent
//! them.
//!
//! ```text
//! upsert(id, pose)   absent  -> factory spawns a node, pose attached
//!                    present -> keypoints overwritten in place
//! remove(id)         present -> node detached and despawned with its subtree
//!                    absent  -> no-op
//! ```
//!
//! The registry never attaches nodes; where a tracked node lives in the
//! graph is up to the [`PoseFactory`].

use std::collections::HashMap;

use glam::Vec3;
use simulo_core::{Host, MaterialLibrary, NodeId, Pose, Scene, SceneResult};
use tracing::{debug, warn};

/// Scene access handed to a [`PoseFactory`].
pub struct SpawnContext<'a> {
    /// The scene.
    pub scene: &'a mut Scene,
    /// Host for render objects.
    pub host: &'a mut dyn Host,
    /// Shared materials.
    pub materials: &'a mut MaterialLibrary,
    /// Runtime root node.
    pub root: NodeId,
    /// Render order for renderables without an explicit one.
    pub default_render_order: u32,
}

/// Builds the node for a newly tracked entity.
pub trait PoseFactory {
    /// Spawns the node for `tracked_id`. The registry attaches `pose` to the
    /// returned node afterwards.
    ///
    /// # Errors
    ///
    /// Any [`SceneError`](simulo_core::SceneError) from building the node.
    fn spawn(&mut self, ctx: &mut SpawnContext<'_>, tracked_id: u32, pose: &Pose) -> SceneResult<NodeId>;
}

impl<F> PoseFactory for F
where
    F: FnMut(&mut SpawnContext<'_>, u32, &Pose) -> SceneResult<NodeId>,
{
    fn spawn(&mut self, ctx: &mut SpawnContext<'_>, tracked_id: u32, pose: &Pose) -> SceneResult<NodeId> {
        self(ctx, tracked_id, pose)
    }
}

/// Default factory: a detached plain node at the origin.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainPoseFactory;

impl PoseFactory for PlainPoseFactory {
    fn spawn(&mut self, ctx: &mut SpawnContext<'_>, _tracked_id: u32, _pose: &Pose) -> SceneResult<NodeId> {
        Ok(ctx.scene.spawn(Vec3::ZERO, Vec3::ONE))
    }
}

/// Tracked id to node mapping.
pub struct PoseRegistry {
    entries: HashMap<u32, NodeId>,
    factory: Box<dyn PoseFactory>,
}

impl PoseRegistry {
    /// Creates an empty registry using [`PlainPoseFactory`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_factory(PlainPoseFactory)
    }

    /// Creates an empty registry with a custom factory.
    #[must_use]
    pub fn with_factory(factory: impl PoseFactory + 'static) -> Self {
        Self {
            entries: HashMap::new(),
            factory: Box::new(factory),
        }
    }

    /// Replaces the factory used for ids seen from now on.
    pub fn set_factory(&mut self, factory: impl PoseFactory + 'static) {
        self.factory = Box::new(factory);
    }

    /// Creates or updates the node for `id`.
    ///
    /// A node that was despawned by game code while still registered is
    /// replaced by a fresh one.
    ///
    /// # Errors
    ///
    /// Propagates factory failures, and [`SceneError::StaleNode`] if the
    /// factory returns a node that is not alive. The registry is unchanged
    /// in both cases.
    ///
    /// [`SceneError::StaleNode`]: simulo_core::SceneError::StaleNode
    pub fn upsert(&mut self, ctx: &mut SpawnContext<'_>, id: u32, pose: Pose) -> SceneResult<NodeId> {
        if let Some(&node) = self.entries.get(&id) {
            if let Some(current) = ctx.scene.pose_mut(node) {
                *current = pose;
                return Ok(node);
            }
            if ctx.scene.is_alive(node) {
                ctx.scene.set_pose(node, pose)?;
                return Ok(node);
            }
            warn!(tracked_id = id, node = %node, "tracked node despawned externally, respawning");
            self.entries.remove(&id);
        }

        let node = self.factory.spawn(ctx, id, &pose)?;
        if let Err(err) = ctx.scene.set_pose(node, pose) {
            if ctx.scene.is_alive(node) {
                ctx.scene.despawn(&mut *ctx.host, node)?;
            }
            return Err(err);
        }
        self.entries.insert(id, node);
        debug!(tracked_id = id, node = %node, "pose tracked");
        Ok(node)
    }

    /// Forgets `id`, detaching and despawning its node. Returns `false` if
    /// the id was not registered.
    ///
    /// # Errors
    ///
    /// Propagates scene failures from despawning.
    pub fn remove(&mut self, scene: &mut Scene, host: &mut dyn Host, id: u32) -> SceneResult<bool> {
        let Some(node) = self.entries.remove(&id) else {
            return Ok(false);
        };
        if scene.is_alive(node) {
            scene.despawn(host, node)?;
        }
        debug!(tracked_id = id, node = %node, "pose untracked");
        Ok(true)
    }

    /// Node of a tracked id.
    #[must_use]
    pub fn get(&self, id: u32) -> Option<NodeId> {
        self.entries.get(&id).copied()
    }

    /// Returns `true` if `id` is tracked.
    #[must_use]
    pub fn contains(&self, id: u32) -> bool {
        self.entries.contains_key(&id)
    }

    /// Number of tracked ids.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates `(tracked id, node)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, NodeId)> + '_ {
        self.entries.iter().map(|(&id, &node)| (id, node))
    }

    /// Forgets every entry without touching the scene.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for PoseRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PoseRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoseRegistry")
            .field("entries", &self.entries)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use simulo_core::{Keypoint, RecordingHost, SceneError};

    struct Fixture {
        host: RecordingHost,
        scene: Scene,
        materials: MaterialLibrary,
        root: NodeId,
    }

    impl Fixture {
        fn new() -> Self {
            let mut scene = Scene::new();
            let root = scene.spawn(Vec3::ZERO, Vec3::ONE);
            Self {
                host: RecordingHost::new(),
                scene,
                materials: MaterialLibrary::new(),
                root,
            }
        }

        fn ctx(&mut self) -> SpawnContext<'_> {
            SpawnContext {
                scene: &mut self.scene,
                host: &mut self.host,
                materials: &mut self.materials,
                root: self.root,
                default_render_order: 0,
            }
        }
    }

    fn pose_with_nose(x: f32, y: f32) -> Pose {
        let mut pose = Pose::zeroed();
        pose.set(Keypoint::Nose, Vec2::new(x, y));
        pose
    }

    #[test]
    fn test_upsert_creates_then_updates_in_place() {
        let mut fx = Fixture::new();
        let mut registry = PoseRegistry::new();

        let first = registry.upsert(&mut fx.ctx(), 42, pose_with_nose(1.0, 2.0)).unwrap();
        let second = registry.upsert(&mut fx.ctx(), 42, pose_with_nose(3.0, 4.0)).unwrap();

        assert_eq!(first, second);
        assert_eq!(registry.len(), 1);
        assert_eq!(fx.scene.pose(first).map(Pose::nose), Some(Vec2::new(3.0, 4.0)));
        assert_eq!(fx.scene.parent(first), None);
    }

    #[test]
    fn test_remove_despawns_and_detaches() {
        let mut fx = Fixture::new();
        let root = fx.root;
        let mut registry = PoseRegistry::with_factory(|ctx: &mut SpawnContext<'_>, _id: u32, _pose: &Pose| -> SceneResult<NodeId> {
            let node = ctx.scene.spawn(Vec3::ZERO, Vec3::ONE);
            ctx.scene.add_child(ctx.root, node)?;
            Ok(node)
        });

        let node = registry.upsert(&mut fx.ctx(), 7, Pose::zeroed()).unwrap();
        assert_eq!(fx.scene.children(root), &[node]);

        assert!(registry.remove(&mut fx.scene, &mut fx.host, 7).unwrap());
        assert!(!fx.scene.is_alive(node));
        assert!(fx.scene.children(root).is_empty());
        assert!(!registry.contains(7));
        assert!(!registry.remove(&mut fx.scene, &mut fx.host, 7).unwrap());
    }

    #[test]
    fn test_respawns_externally_despawned_node() {
        let mut fx = Fixture::new();
        let mut registry = PoseRegistry::new();
        let node = registry.upsert(&mut fx.ctx(), 1, Pose::zeroed()).unwrap();
        fx.scene.despawn(&mut fx.host, node).unwrap();

        let replacement = registry.upsert(&mut fx.ctx(), 1, Pose::zeroed()).unwrap();

        assert_ne!(node, replacement);
        assert!(fx.scene.is_alive(replacement));
        assert_eq!(registry.get(1), Some(replacement));
    }

    #[test]
    fn test_factory_returning_dead_node_is_rejected() {
        let mut fx = Fixture::new();
        let mut registry = PoseRegistry::with_factory(|ctx: &mut SpawnContext<'_>, _id: u32, _pose: &Pose| -> SceneResult<NodeId> {
            let node = ctx.scene.spawn(Vec3::ZERO, Vec3::ONE);
            ctx.scene.despawn(&mut *ctx.host, node)?;
            Ok(node)
        });
        let before = fx.scene.len();

        let result = registry.upsert(&mut fx.ctx(), 3, Pose::zeroed());

        assert!(matches!(result, Err(SceneError::StaleNode(_))));
        assert!(registry.is_empty());
        assert_eq!(fx.scene.len(), before);
    }

    #[test]
    fn test_id_reuse_after_delete() {
        let mut fx = Fixture::new();
        let mut registry = PoseRegistry::new();
        let a = registry.upsert(&mut fx.ctx(), 5, Pose::zeroed()).unwrap();
        registry.remove(&mut fx.scene, &mut fx.host, 5).unwrap();
        let b = registry.upsert(&mut fx.ctx(), 5, Pose::zeroed()).unwrap();

        assert_ne!(a, b);
        assert_eq!(registry.iter().collect::<Vec<_>>(), vec![(5, b)]);
    }
}
