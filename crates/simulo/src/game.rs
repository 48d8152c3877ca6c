//! # Game Hooks
//!
//! Application code plugs into the frame loop through [`Game`]. Each hook
//! receives a [`GameContext`] borrowing the runtime's state for the call.

use glam::Vec3;
use simulo_core::{Host, MaterialHandle, MaterialLibrary, NodeId, Scene, SceneResult, Viewport};

use crate::registry::PoseRegistry;

/// Runtime state lent to game hooks.
pub struct GameContext<'a> {
    /// The scene.
    pub scene: &'a mut Scene,
    /// Host for render object and material calls.
    pub host: &'a mut dyn Host,
    /// Shared materials.
    pub materials: &'a mut MaterialLibrary,
    /// Tracked poses; swap the factory here during `init`.
    pub poses: &'a mut PoseRegistry,
    /// Runtime root node; behaviors below it are updated every frame.
    pub root: NodeId,
    /// Most recent viewport size.
    pub viewport: Viewport,
    /// Render order used by [`spawn_renderable`](Self::spawn_renderable).
    pub default_render_order: u32,
}

impl GameContext<'_> {
    /// Spawns a renderable node at the default render order and attaches it
    /// under `parent`.
    ///
    /// # Errors
    ///
    /// Propagates [`Scene::add_child`] failures for `parent`.
    pub fn spawn_renderable(
        &mut self,
        parent: NodeId,
        material: MaterialHandle,
        position: Vec3,
        scale: Vec3,
    ) -> SceneResult<NodeId> {
        let node = self
            .scene
            .spawn_renderable(&mut *self.host, material, self.default_render_order, position, scale);
        if let Err(err) = self.scene.add_child(parent, node) {
            self.scene.despawn(&mut *self.host, node)?;
            return Err(err);
        }
        Ok(node)
    }

    /// Creates a material owned by the runtime.
    pub fn create_material(&mut self, name: Option<&str>, tint: [f32; 4]) -> MaterialHandle {
        self.materials.create(&mut *self.host, name, tint)
    }
}

/// Application hooks called by the frame driver.
///
/// Every hook defaults to doing nothing.
pub trait Game {
    /// Called once before the first frame.
    ///
    /// # Errors
    ///
    /// Any scene error aborts startup.
    fn init(&mut self, ctx: &mut GameContext<'_>) -> SceneResult<()> {
        let _ = ctx;
        Ok(())
    }

    /// Called once per frame after events are applied, before node
    /// behaviors run.
    ///
    /// # Errors
    ///
    /// Any scene error stops the frame loop.
    fn update(&mut self, ctx: &mut GameContext<'_>, delta: f32) -> SceneResult<()> {
        let _ = (ctx, delta);
        Ok(())
    }

    /// Called zero or more times per frame at the configured fixed rate,
    /// before [`update`](Self::update).
    ///
    /// # Errors
    ///
    /// Any scene error stops the frame loop.
    fn fixed_update(&mut self, ctx: &mut GameContext<'_>, step: f32) -> SceneResult<()> {
        let _ = (ctx, step);
        Ok(())
    }
}

impl Game for () {}
