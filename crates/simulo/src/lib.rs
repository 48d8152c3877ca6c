//! # Simulo
//!
//! Client runtime that mirrors a host environment: pose-tracking events
//! stream in, batched render-object transforms stream out.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────┐ poll  ┌─────────┐ events ┌──────────────┐
//! │  Host  │──────►│ decoder │───────►│ PoseRegistry │──┐
//! └────────┘       └─────────┘        └──────────────┘  │
//!     ▲                                                 ▼
//!     │  set_render_object_transforms    ┌──────────────────────┐
//!     └──────────────────────────────────│ Scene + DirtySet     │
//!          (ids[], matrices[])           │ Game / Behavior hooks│
//!                                        │ TransformResolver    │
//!                                        └──────────────────────┘
//! ```
//!
//! Everything runs on one thread; [`Runtime`] owns all mutable state.
//!
//! ## Example
//!
//! ```rust,ignore
//! use simulo::{Game, GameContext, RecordingHost, Runtime, ManualClock, SceneResult};
//!
//! struct Demo;
//!
//! impl Game for Demo {
//!     fn update(&mut self, ctx: &mut GameContext<'_>, delta: f32) -> SceneResult<()> {
//!         ctx.scene.translate(ctx.root, glam::Vec3::X * delta)
//!     }
//! }
//!
//! let mut runtime = Runtime::new(RecordingHost::new())?;
//! runtime.run(&mut Demo, &mut ManualClock::new(1.0 / 60.0))?;
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod clock;
pub mod config;
pub mod error;
pub mod game;
pub mod registry;
pub mod runtime;
pub mod timestep;
#[cfg(target_arch = "wasm32")]
pub mod wasm;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::RuntimeConfig;
pub use error::{RuntimeError, RuntimeResult};
pub use game::{Game, GameContext};
pub use registry::{PlainPoseFactory, PoseFactory, PoseRegistry, SpawnContext};
pub use runtime::{FrameOutcome, FramePhase, FrameReport, RunSummary, Runtime, RuntimeStats};
pub use timestep::FixedTimestep;
#[cfg(target_arch = "wasm32")]
pub use wasm::WasmHost;

pub use simulo_core::{
    Behavior, Host, Keypoint, MaterialHandle, MaterialLibrary, NodeId, PollStatus, Pose, RecordingHost, RenderHandle,
    Scene, SceneError, SceneResult, UpdateContext, Viewport,
};
pub use simulo_protocol::{DecodeError, EventEncoder, HostEvent};

pub use glam;
