//! # Host Boundary
//!
//! The runtime never renders. Everything visible goes through [`Host`], the
//! narrow call surface the embedding environment implements.
//!
//! ```text
//! Runtime calls:                    Host implements:
//! ┌──────────────────────────┐      ┌──────────────────────┐
//! │ poll(buffer)             │ ───► │ writes event bytes   │
//! │ create_render_object     │ ───► │ allocates a handle   │
//! │ set_render_object_*      │ ───► │ flat parallel arrays │
//! │ drop_render_object       │ ───► │ frees the handle     │
//! │ create/update/drop_mat.. │ ───► │ material lifecycle   │
//! └──────────────────────────┘      └──────────────────────┘
//! ```
//!
//! Array arguments are flat and parallel, ordered by append sequence.

use std::collections::{BTreeSet, VecDeque};

/// Handle of a host render object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct RenderHandle(pub u32);

/// Handle of a host material.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct MaterialHandle(pub u32);

/// Result of polling the host for event bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PollStatus {
    /// The host wrote this many bytes (zero is legal).
    Ready(usize),
    /// The host is shutting down; the frame loop should stop.
    Closed,
}

/// Current output surface size reported by the host.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Viewport {
    /// Width in pixels.
    pub width: u16,
    /// Height in pixels.
    pub height: u16,
}

impl Viewport {
    /// Creates a viewport.
    #[must_use]
    pub const fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }

    /// Width over height, or zero for a degenerate viewport.
    #[must_use]
    pub fn aspect_ratio(self) -> f32 {
        if self.height == 0 {
            return 0.0;
        }
        f32::from(self.width) / f32::from(self.height)
    }
}

/// Interface to the embedding environment.
///
/// Implementations must treat every handle they return as owned by the
/// caller until the matching `drop_*` call.
pub trait Host {
    /// Writes up to `buffer.len()` bytes of pending event data.
    fn poll(&mut self, buffer: &mut [u8]) -> PollStatus;

    /// Allocates a render object drawn with `material` at `render_order`.
    fn create_render_object(&mut self, material: MaterialHandle, render_order: u32) -> RenderHandle;

    /// Reassigns the material of a render object.
    fn set_render_object_material(&mut self, object: RenderHandle, material: MaterialHandle);

    /// Sets per-object RGBA colors. `colors.len() == ids.len() * 4`.
    fn set_render_object_colors(&mut self, ids: &[u32], colors: &[f32]);

    /// Sets per-object global transforms, 16 column-major floats each.
    /// `matrices.len() == ids.len() * 16`.
    fn set_render_object_transforms(&mut self, ids: &[u32], matrices: &[f32]);

    /// Releases a render object.
    fn drop_render_object(&mut self, object: RenderHandle);

    /// Creates a material, optionally textured by name, with an RGBA tint.
    fn create_material(&mut self, name: Option<&str>, tint: [f32; 4]) -> MaterialHandle;

    /// Updates a material's RGBA tint.
    fn update_material(&mut self, material: MaterialHandle, tint: [f32; 4]);

    /// Releases a material.
    fn drop_material(&mut self, material: MaterialHandle);
}

// ============================================================================
// RECORDING HOST (tests, benches, headless runs)
// ============================================================================

/// One outbound call observed by [`RecordingHost`].
#[derive(Clone, Debug, PartialEq)]
pub enum HostCall {
    /// `create_render_object`.
    CreateRenderObject {
        /// Returned handle.
        handle: RenderHandle,
        /// Material passed in.
        material: MaterialHandle,
        /// Render order passed in.
        render_order: u32,
    },
    /// `set_render_object_material`.
    SetMaterial {
        /// Target object.
        object: RenderHandle,
        /// New material.
        material: MaterialHandle,
    },
    /// `set_render_object_colors`.
    SetColors {
        /// Object ids.
        ids: Vec<u32>,
        /// Flat RGBA values.
        colors: Vec<f32>,
    },
    /// `set_render_object_transforms`.
    SetTransforms {
        /// Object ids.
        ids: Vec<u32>,
        /// Flat column-major matrices.
        matrices: Vec<f32>,
    },
    /// `drop_render_object`.
    DropRenderObject(RenderHandle),
    /// `create_material`.
    CreateMaterial {
        /// Returned handle.
        handle: MaterialHandle,
        /// Texture name, if any.
        name: Option<String>,
        /// RGBA tint.
        tint: [f32; 4],
    },
    /// `update_material`.
    UpdateMaterial {
        /// Target material.
        material: MaterialHandle,
        /// New RGBA tint.
        tint: [f32; 4],
    },
    /// `drop_material`.
    DropMaterial(MaterialHandle),
}

enum Inbound {
    Bytes(Vec<u8>),
    Close,
}

/// In-memory host that replays queued event bytes and records every call.
///
/// When the inbound queue runs dry, `poll` reports [`PollStatus::Closed`],
/// so a frame loop driven by this host always terminates.
pub struct RecordingHost {
    inbound: VecDeque<Inbound>,
    calls: Vec<HostCall>,
    next_render_handle: u32,
    next_material_handle: u32,
    live_render_objects: BTreeSet<RenderHandle>,
    live_materials: BTreeSet<MaterialHandle>,
    invalid_releases: usize,
}

impl RecordingHost {
    /// Creates a host with nothing queued.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inbound: VecDeque::new(),
            calls: Vec::new(),
            next_render_handle: 1,
            next_material_handle: 1,
            live_render_objects: BTreeSet::new(),
            live_materials: BTreeSet::new(),
            invalid_releases: 0,
        }
    }

    /// Queues one poll result worth of event bytes.
    pub fn push_events(&mut self, bytes: impl Into<Vec<u8>>) {
        self.inbound.push_back(Inbound::Bytes(bytes.into()));
    }

    /// Queues a poll that returns zero bytes.
    pub fn push_empty_poll(&mut self) {
        self.inbound.push_back(Inbound::Bytes(Vec::new()));
    }

    /// Queues an explicit shutdown signal.
    pub fn push_close(&mut self) {
        self.inbound.push_back(Inbound::Close);
    }

    /// Number of queued poll results.
    #[must_use]
    pub fn pending_polls(&self) -> usize {
        self.inbound.len()
    }

    /// All calls recorded so far.
    #[must_use]
    pub fn calls(&self) -> &[HostCall] {
        &self.calls
    }

    /// Drains the recorded calls.
    pub fn take_calls(&mut self) -> Vec<HostCall> {
        std::mem::take(&mut self.calls)
    }

    /// Every transform batch recorded so far, as `(ids, matrices)`.
    #[must_use]
    pub fn transform_batches(&self) -> Vec<(&[u32], &[f32])> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                HostCall::SetTransforms { ids, matrices } => Some((ids.as_slice(), matrices.as_slice())),
                _ => None,
            })
            .collect()
    }

    /// Render objects created and not yet dropped.
    #[must_use]
    pub fn live_render_objects(&self) -> &BTreeSet<RenderHandle> {
        &self.live_render_objects
    }

    /// Materials created and not yet dropped.
    #[must_use]
    pub fn live_materials(&self) -> &BTreeSet<MaterialHandle> {
        &self.live_materials
    }

    /// Drops of unknown or already released handles.
    #[must_use]
    pub const fn invalid_releases(&self) -> usize {
        self.invalid_releases
    }
}

impl Default for RecordingHost {
    fn default() -> Self {
        Self::new()
    }
}

impl Host for RecordingHost {
    fn poll(&mut self, buffer: &mut [u8]) -> PollStatus {
        match self.inbound.pop_front() {
            None | Some(Inbound::Close) => PollStatus::Closed,
            Some(Inbound::Bytes(bytes)) => {
                let written = bytes.len().min(buffer.len());
                buffer[..written].copy_from_slice(&bytes[..written]);
                if written < bytes.len() {
                    // Deliver the overflow on the next poll.
                    self.inbound.push_front(Inbound::Bytes(bytes[written..].to_vec()));
                }
                PollStatus::Ready(written)
            }
        }
    }

    fn create_render_object(&mut self, material: MaterialHandle, render_order: u32) -> RenderHandle {
        let handle = RenderHandle(self.next_render_handle);
        self.next_render_handle += 1;
        self.live_render_objects.insert(handle);
        self.calls.push(HostCall::CreateRenderObject {
            handle,
            material,
            render_order,
        });
        handle
    }

    fn set_render_object_material(&mut self, object: RenderHandle, material: MaterialHandle) {
        self.calls.push(HostCall::SetMaterial { object, material });
    }

    fn set_render_object_colors(&mut self, ids: &[u32], colors: &[f32]) {
        self.calls.push(HostCall::SetColors {
            ids: ids.to_vec(),
            colors: colors.to_vec(),
        });
    }

    fn set_render_object_transforms(&mut self, ids: &[u32], matrices: &[f32]) {
        self.calls.push(HostCall::SetTransforms {
            ids: ids.to_vec(),
            matrices: matrices.to_vec(),
        });
    }

    fn drop_render_object(&mut self, object: RenderHandle) {
        if !self.live_render_objects.remove(&object) {
            self.invalid_releases += 1;
        }
        self.calls.push(HostCall::DropRenderObject(object));
    }

    fn create_material(&mut self, name: Option<&str>, tint: [f32; 4]) -> MaterialHandle {
        let handle = MaterialHandle(self.next_material_handle);
        self.next_material_handle += 1;
        self.live_materials.insert(handle);
        self.calls.push(HostCall::CreateMaterial {
            handle,
            name: name.map(str::to_owned),
            tint,
        });
        handle
    }

    fn update_material(&mut self, material: MaterialHandle, tint: [f32; 4]) {
        self.calls.push(HostCall::UpdateMaterial { material, tint });
    }

    fn drop_material(&mut self, material: MaterialHandle) {
        if !self.live_materials.remove(&material) {
            self.invalid_releases += 1;
        }
        self.calls.push(HostCall::DropMaterial(material));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poll_replays_and_closes() {
        let mut host = RecordingHost::new();
        host.push_events(vec![1, 2, 3]);
        host.push_empty_poll();

        let mut buf = [0u8; 8];
        assert_eq!(host.poll(&mut buf), PollStatus::Ready(3));
        assert_eq!(&buf[..3], &[1, 2, 3]);
        assert_eq!(host.poll(&mut buf), PollStatus::Ready(0));
        assert_eq!(host.poll(&mut buf), PollStatus::Closed);
    }

    #[test]
    fn test_poll_splits_oversized_chunks() {
        let mut host = RecordingHost::new();
        host.push_events(vec![9u8; 10]);

        let mut buf = [0u8; 4];
        assert_eq!(host.poll(&mut buf), PollStatus::Ready(4));
        assert_eq!(host.poll(&mut buf), PollStatus::Ready(4));
        assert_eq!(host.poll(&mut buf), PollStatus::Ready(2));
        assert_eq!(host.poll(&mut buf), PollStatus::Closed);
    }

    #[test]
    fn test_handle_tracking() {
        let mut host = RecordingHost::new();
        let material = host.create_material(Some("brick"), [1.0, 0.5, 0.5, 1.0]);
        let object = host.create_render_object(material, 3);
        assert_eq!(host.live_render_objects().len(), 1);

        host.drop_render_object(object);
        host.drop_render_object(object);
        host.drop_material(material);

        assert!(host.live_render_objects().is_empty());
        assert!(host.live_materials().is_empty());
        assert_eq!(host.invalid_releases(), 1);
    }

    #[test]
    fn test_viewport_aspect() {
        assert!((Viewport::new(800, 600).aspect_ratio() - 4.0 / 3.0).abs() < 1e-6);
        assert_eq!(Viewport::default().aspect_ratio(), 0.0);
    }
}
