//! # Simulo Core
//!
//! Scene graph and transform propagation for a runtime that mirrors a host
//! environment over a narrow call boundary.
//!
//! ## Architecture
//!
//! ```text
//!   transform writes ──► DirtySet ──► TransformResolver ──► Host
//!          ▲                              │  (ids[], matrices[])
//!          │                              ▼
//!        Scene (arena of nodes, parent owns children)
//! ```
//!
//! 1. **Scene** - generational arena; parents own ordered child lists,
//!    children keep a non-owning back-reference plus their slot index
//! 2. **DirtySet** - every local transform write marks the node, nothing is
//!    recomputed eagerly
//! 3. **TransformResolver** - once per frame, walks only the dirty subtrees
//!    and batches renderable transforms into one host call
//!
//! ## Example
//!
//! ```rust,ignore
//! use simulo_core::{RecordingHost, Scene, TransformResolver};
//! use glam::Vec3;
//!
//! let mut host = RecordingHost::new();
//! let mut scene = Scene::new();
//! let material = host.create_material(None, [1.0; 4]);
//! let root = scene.spawn(Vec3::ZERO, Vec3::ONE);
//! let quad = scene.spawn_renderable(&mut host, material, 0, Vec3::X, Vec3::ONE);
//! scene.add_child(root, quad)?;
//!
//! let mut resolver = TransformResolver::new();
//! resolver.resolve(&mut scene);
//! resolver.emit(&mut host);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod behavior;
pub mod dirty;
pub mod error;
pub mod host;
pub mod material;
pub mod math;
pub mod node;
pub mod pose;
pub mod resolve;
pub mod scene;

pub use behavior::{Behavior, UpdateContext};
pub use dirty::DirtySet;
pub use error::{SceneError, SceneResult};
pub use host::{Host, HostCall, MaterialHandle, PollStatus, RecordingHost, RenderHandle, Viewport};
pub use material::{Material, MaterialLibrary};
pub use math::{local_transform, rotation_matrix};
pub use node::{Node, NodeId, NodeKind, Renderable};
pub use pose::{Keypoint, Pose, KEYPOINT_COUNT, POSE_DATA_LEN};
pub use resolve::{ResolveStats, TransformBatch, TransformResolver};
pub use scene::Scene;

/// Number of floats in one emitted transform (4 columns of 4).
pub const MATRIX_FLOATS: usize = 16;
