//! # Node Behaviors
//!
//! Per-node update logic. The frame driver temporarily takes the behavior
//! out of its node, runs it with mutable access to the whole scene, and puts
//! it back if the node survived.

use crate::error::SceneResult;
use crate::host::{Host, Viewport};
use crate::material::MaterialLibrary;
use crate::node::NodeId;
use crate::scene::Scene;

/// Everything a behavior may touch during its update.
pub struct UpdateContext<'a> {
    /// Node the behavior is attached to.
    pub node: NodeId,
    /// The scene, including the behavior's own node.
    pub scene: &'a mut Scene,
    /// Host for render object and material calls.
    pub host: &'a mut dyn Host,
    /// Shared material registry.
    pub materials: &'a mut MaterialLibrary,
    /// Most recent viewport size.
    pub viewport: Viewport,
}

impl UpdateContext<'_> {
    /// Despawns the behavior's own node and its subtree.
    ///
    /// # Errors
    ///
    /// [`SceneError::StaleNode`](crate::SceneError::StaleNode) if the node
    /// is already gone.
    pub fn despawn_self(&mut self) -> SceneResult<()> {
        self.scene.despawn(&mut *self.host, self.node)
    }
}

/// Update hook attached to a scene node.
pub trait Behavior {
    /// Called once per frame, parents before children.
    fn update(&mut self, ctx: &mut UpdateContext<'_>, delta: f32) -> SceneResult<()> {
        let _ = (ctx, delta);
        Ok(())
    }
}
