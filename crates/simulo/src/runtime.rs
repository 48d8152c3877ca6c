//! # Runtime & Frame Driver
//!
//! The runtime owns every piece of mutable state: scene, dirty set, pose
//! registry, materials and scratch buffers. One call to [`Runtime::step`]
//! runs one frame.
//!
//! ## Frame Order
//!
//! ```text
//! 1. Poll the host into the event buffer (Closed ends the loop)
//! 2. Decode the polled span (any failure ends the loop with an error)
//! 3. Apply events: pose upserts/deletes to the registry, resizes to the viewport
//! 4. Game::fixed_update (0..=max per frame), then Game::update
//! 5. Node behaviors, depth-first from the root, parents before children
//! 6. Resolve dirty transforms
//! 7. Emit the transform batch in one host call
//! ```

use glam::Vec3;
use simulo_core::{
    Host, MaterialLibrary, NodeId, PollStatus, ResolveStats, Scene, SceneResult, TransformBatch, TransformResolver,
    UpdateContext, Viewport,
};
use simulo_protocol::{decode_into, HostEvent};
use tracing::{debug, error, info};

use crate::clock::Clock;
use crate::config::RuntimeConfig;
use crate::error::RuntimeResult;
use crate::game::{Game, GameContext};
use crate::registry::{PoseRegistry, SpawnContext};
use crate::timestep::FixedTimestep;

/// Where the driver currently is within a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FramePhase {
    /// Between frames.
    Idle,
    /// Waiting on the host for event bytes.
    Polling,
    /// Parsing the polled span.
    Decoding,
    /// Applying decoded events to the registry and viewport.
    Applying,
    /// Running game hooks and node behaviors.
    Updating,
    /// Recomputing dirty global transforms.
    Resolving,
    /// Sending the transform batch.
    Emitting,
    /// The host closed the stream or the runtime was shut down.
    Closed,
    /// A frame failed; the loop has stopped and the host is no longer polled.
    Failed,
}

/// What happened during one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// Frame number, starting at 1.
    pub frame: u64,
    /// Bytes the host wrote this frame.
    pub bytes_polled: usize,
    /// Events decoded and applied.
    pub events: usize,
    /// Fixed updates run.
    pub fixed_updates: u32,
    /// Node behaviors run.
    pub behaviors_run: usize,
    /// Transform resolution counters.
    pub resolve: ResolveStats,
    /// Whether a transform batch was sent.
    pub batch_emitted: bool,
}

/// Result of one [`Runtime::step`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    /// The frame completed; keep going.
    Continue(FrameReport),
    /// The host closed the event stream.
    Closed,
}

/// Counters across all frames.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RuntimeStats {
    /// Completed frames.
    pub frames: u64,
    /// Event bytes polled.
    pub bytes_polled: u64,
    /// Events applied.
    pub events_applied: u64,
    /// Pose upserts that created a node.
    pub poses_tracked: u64,
    /// Pose deletes that removed a node.
    pub poses_removed: u64,
    /// Fixed updates run.
    pub fixed_updates: u64,
    /// Node behaviors run.
    pub behaviors_run: u64,
    /// Transforms sent to the host.
    pub transforms_emitted: u64,
    /// Transform batches sent to the host.
    pub batches_emitted: u64,
}

/// Returned by [`Runtime::run`] when the host closes the stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunSummary {
    /// Frames completed.
    pub frames: u64,
    /// Counters at the end of the run.
    pub stats: RuntimeStats,
}

/// The runtime context.
///
/// Dropping it (or calling [`shutdown`](Self::shutdown)) releases every host
/// handle still alive.
pub struct Runtime<H: Host> {
    config: RuntimeConfig,
    host: H,
    scene: Scene,
    materials: MaterialLibrary,
    poses: PoseRegistry,
    resolver: TransformResolver,
    root: NodeId,
    viewport: Viewport,
    /// Poll target, sized once from the config.
    event_buffer: Vec<u8>,
    /// Decoded events, reused across frames.
    events: Vec<HostEvent>,
    /// Traversal stack for behavior updates.
    update_stack: Vec<NodeId>,
    timestep: FixedTimestep,
    phase: FramePhase,
    stats: RuntimeStats,
    initialized: bool,
    shut_down: bool,
}

impl<H: Host> Runtime<H> {
    /// Creates a runtime with the default configuration.
    ///
    /// # Errors
    ///
    /// Never fails with the defaults; kept fallible for symmetry with
    /// [`with_config`](Self::with_config).
    pub fn new(host: H) -> RuntimeResult<Self> {
        Self::with_config(host, RuntimeConfig::default())
    }

    /// Creates a runtime, validating `config`.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::Config`](crate::RuntimeError::Config) for an
    /// invalid configuration.
    pub fn with_config(host: H, config: RuntimeConfig) -> RuntimeResult<Self> {
        config.validate()?;

        let mut scene = Scene::new();
        let root = scene.spawn(Vec3::ZERO, Vec3::ONE);
        info!(
            event_buffer = config.event_buffer_capacity,
            fixed_updates_per_second = config.fixed_updates_per_second,
            "runtime started"
        );

        Ok(Self {
            event_buffer: vec![0u8; config.event_buffer_capacity],
            timestep: FixedTimestep::new(config.fixed_updates_per_second, config.max_fixed_steps_per_frame),
            config,
            host,
            scene,
            materials: MaterialLibrary::new(),
            poses: PoseRegistry::new(),
            resolver: TransformResolver::new(),
            root,
            viewport: Viewport::default(),
            events: Vec::new(),
            update_stack: Vec::new(),
            phase: FramePhase::Idle,
            stats: RuntimeStats::default(),
            initialized: false,
            shut_down: false,
        })
    }

    /// Borrows the runtime state as a [`GameContext`], e.g. to build the
    /// initial scene outside of [`Game::init`].
    pub fn context(&mut self) -> GameContext<'_> {
        GameContext {
            scene: &mut self.scene,
            host: &mut self.host,
            materials: &mut self.materials,
            poses: &mut self.poses,
            root: self.root,
            viewport: self.viewport,
            default_render_order: self.config.default_render_order,
        }
    }

    /// Runs [`Game::init`] once. Later calls do nothing.
    ///
    /// # Errors
    ///
    /// Propagates the hook's scene error.
    pub fn init<G: Game + ?Sized>(&mut self, game: &mut G) -> RuntimeResult<()> {
        if self.initialized {
            return Ok(());
        }
        game.init(&mut self.context())?;
        self.initialized = true;
        Ok(())
    }

    /// Runs frames until the host closes the stream.
    ///
    /// # Errors
    ///
    /// Returns the first decode or scene error; the loop stops there.
    pub fn run<G: Game + ?Sized>(&mut self, game: &mut G, clock: &mut dyn Clock) -> RuntimeResult<RunSummary> {
        self.init(game)?;
        loop {
            let delta = clock.delta();
            if self.step(game, delta)? == FrameOutcome::Closed {
                break;
            }
        }
        Ok(RunSummary {
            frames: self.stats.frames,
            stats: self.stats,
        })
    }

    /// Runs one frame with the given delta (seconds).
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::Decode`](crate::RuntimeError::Decode) for a
    /// bad event span and [`RuntimeError::Scene`](crate::RuntimeError::Scene)
    /// for hook or behavior failures. The phase is [`FramePhase::Failed`]
    /// afterwards, and every later call returns [`FrameOutcome::Closed`]
    /// without polling the host.
    pub fn step<G: Game + ?Sized>(&mut self, game: &mut G, delta: f32) -> RuntimeResult<FrameOutcome> {
        if self.shut_down || self.phase == FramePhase::Failed {
            return Ok(FrameOutcome::Closed);
        }

        self.phase = FramePhase::Polling;
        let bytes = match self.host.poll(&mut self.event_buffer) {
            PollStatus::Closed => {
                self.phase = FramePhase::Closed;
                info!(frames = self.stats.frames, "host closed the event stream");
                return Ok(FrameOutcome::Closed);
            }
            PollStatus::Ready(n) => n.min(self.event_buffer.len()),
        };

        let frame = self.stats.frames + 1;
        match self.frame(game, delta, frame, bytes) {
            Ok(report) => {
                self.phase = FramePhase::Idle;
                Ok(FrameOutcome::Continue(report))
            }
            Err(err) => {
                self.phase = FramePhase::Failed;
                error!(frame, error = %err, "frame failed");
                Err(err)
            }
        }
    }

    fn frame<G: Game + ?Sized>(&mut self, game: &mut G, delta: f32, frame: u64, bytes: usize) -> RuntimeResult<FrameReport> {
        self.phase = FramePhase::Decoding;
        let events = decode_into(&self.event_buffer[..bytes], &mut self.events)?;

        self.phase = FramePhase::Applying;
        self.apply_events()?;

        self.phase = FramePhase::Updating;
        let fixed_updates = self.timestep.advance(delta);
        let step = self.timestep.step();
        {
            let mut ctx = self.context();
            for _ in 0..fixed_updates {
                game.fixed_update(&mut ctx, step)?;
            }
            game.update(&mut ctx, delta)?;
        }
        let behaviors_run = self.run_behaviors(delta)?;

        self.phase = FramePhase::Resolving;
        let resolve = self.resolver.resolve(&mut self.scene);

        self.phase = FramePhase::Emitting;
        let batch_emitted = self.resolver.emit(&mut self.host);

        let report = FrameReport {
            frame,
            bytes_polled: bytes,
            events,
            fixed_updates,
            behaviors_run,
            resolve,
            batch_emitted,
        };
        self.record(&report);
        debug!(
            frame,
            bytes,
            events,
            behaviors = behaviors_run,
            emitted = resolve.emitted,
            "frame complete"
        );
        Ok(report)
    }

    fn apply_events(&mut self) -> SceneResult<()> {
        let mut ctx = SpawnContext {
            scene: &mut self.scene,
            host: &mut self.host,
            materials: &mut self.materials,
            root: self.root,
            default_render_order: self.config.default_render_order,
        };

        for event in &self.events {
            match *event {
                HostEvent::PoseUpsert { id, pose } => {
                    let known = self.poses.contains(id);
                    self.poses.upsert(&mut ctx, id, pose)?;
                    if !known {
                        self.stats.poses_tracked += 1;
                    }
                }
                HostEvent::PoseDelete { id } => {
                    if self.poses.remove(&mut *ctx.scene, &mut *ctx.host, id)? {
                        self.stats.poses_removed += 1;
                    }
                }
                HostEvent::ViewportResize(viewport) => {
                    debug!(width = viewport.width, height = viewport.height, "viewport resized");
                    self.viewport = viewport;
                }
            }
        }
        Ok(())
    }

    fn run_behaviors(&mut self, delta: f32) -> SceneResult<usize> {
        let mut ran = 0;
        self.update_stack.clear();
        self.update_stack.push(self.root);

        while let Some(id) = self.update_stack.pop() {
            if let Some(mut behavior) = self.scene.take_behavior(id) {
                let result = behavior.update(
                    &mut UpdateContext {
                        node: id,
                        scene: &mut self.scene,
                        host: &mut self.host,
                        materials: &mut self.materials,
                        viewport: self.viewport,
                    },
                    delta,
                );
                self.scene.restore_behavior(id, behavior);
                result?;
                ran += 1;
            }
            // Children are read after the callback so restructuring shows up
            // in the same frame. Reverse keeps first-child-first order.
            self.update_stack.extend(self.scene.children(id).iter().rev());
        }
        Ok(ran)
    }

    fn record(&mut self, report: &FrameReport) {
        let stats = &mut self.stats;
        stats.frames += 1;
        stats.bytes_polled += report.bytes_polled as u64;
        stats.events_applied += report.events as u64;
        stats.fixed_updates += u64::from(report.fixed_updates);
        stats.behaviors_run += report.behaviors_run as u64;
        stats.transforms_emitted += report.resolve.emitted as u64;
        if report.batch_emitted {
            stats.batches_emitted += 1;
        }
    }

    /// Releases every render object and material. Idempotent; later frames
    /// report [`FrameOutcome::Closed`].
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.scene.clear(&mut self.host);
        self.materials.release_all(&mut self.host);
        self.poses.clear();
        self.shut_down = true;
        self.phase = FramePhase::Closed;
        info!(frames = self.stats.frames, "runtime shut down");
    }

    /// The host.
    #[must_use]
    pub const fn host(&self) -> &H {
        &self.host
    }

    /// The host, mutably.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// The scene.
    #[must_use]
    pub const fn scene(&self) -> &Scene {
        &self.scene
    }

    /// The scene, mutably.
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    /// Material registry.
    #[must_use]
    pub const fn materials(&self) -> &MaterialLibrary {
        &self.materials
    }

    /// Pose registry.
    #[must_use]
    pub const fn poses(&self) -> &PoseRegistry {
        &self.poses
    }

    /// Pose registry, mutably (e.g. to install a factory).
    pub fn poses_mut(&mut self) -> &mut PoseRegistry {
        &mut self.poses
    }

    /// Root node; behaviors are updated from here.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        self.root
    }

    /// Most recent viewport size.
    #[must_use]
    pub const fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Current frame phase.
    #[must_use]
    pub const fn phase(&self) -> FramePhase {
        self.phase
    }

    /// Counters across all frames.
    #[must_use]
    pub const fn stats(&self) -> &RuntimeStats {
        &self.stats
    }

    /// Batch built by the most recent frame.
    #[must_use]
    pub const fn last_batch(&self) -> &TransformBatch {
        self.resolver.batch()
    }

    /// Fixed timestep accumulator.
    #[must_use]
    pub const fn timestep(&self) -> &FixedTimestep {
        &self.timestep
    }
}

impl<H: Host> Drop for Runtime<H> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl<H: Host> std::fmt::Debug for Runtime<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("config", &self.config)
            .field("scene", &self.scene)
            .field("poses", &self.poses)
            .field("viewport", &self.viewport)
            .field("phase", &self.phase)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use simulo_core::RecordingHost;

    #[test]
    fn test_closed_host_ends_run() {
        let mut runtime = Runtime::new(RecordingHost::new()).unwrap();
        let summary = runtime.run(&mut (), &mut ManualClock::new(0.016)).unwrap();
        assert_eq!(summary.frames, 0);
        assert_eq!(runtime.phase(), FramePhase::Closed);
    }

    #[test]
    fn test_empty_poll_is_a_frame() {
        let mut host = RecordingHost::new();
        host.push_empty_poll();
        let mut runtime = Runtime::new(host).unwrap();

        let outcome = runtime.step(&mut (), 0.0).unwrap();

        let FrameOutcome::Continue(report) = outcome else {
            panic!("expected a frame");
        };
        assert_eq!(report.frame, 1);
        assert_eq!(report.events, 0);
        assert_eq!(runtime.phase(), FramePhase::Idle);
        assert_eq!(runtime.step(&mut (), 0.0).unwrap(), FrameOutcome::Closed);
    }

    #[test]
    fn test_decode_failure_marks_failed() {
        let mut host = RecordingHost::new();
        host.push_events(vec![0xFF]);
        let mut runtime = Runtime::new(host).unwrap();

        assert!(runtime.step(&mut (), 0.0).is_err());
        assert_eq!(runtime.phase(), FramePhase::Failed);
        assert_eq!(runtime.stats().frames, 0);
    }

    #[test]
    fn test_failed_runtime_stops_polling() {
        let mut host = RecordingHost::new();
        host.push_events(vec![0xFF]);
        let mut upsert = vec![0x00, 0, 0, 0, 0x2A];
        upsert.extend_from_slice(&[0u8; 68]);
        host.push_events(upsert);
        let mut runtime = Runtime::new(host).unwrap();

        assert!(runtime.step(&mut (), 0.0).is_err());
        assert_eq!(runtime.step(&mut (), 0.0).unwrap(), FrameOutcome::Closed);

        assert_eq!(runtime.phase(), FramePhase::Failed);
        assert_eq!(runtime.host().pending_polls(), 1);
        assert!(!runtime.poses().contains(42));
        assert_eq!(runtime.stats().frames, 0);
    }

    #[test]
    fn test_shutdown_is_idempotent() {
        let mut runtime = Runtime::new(RecordingHost::new()).unwrap();
        runtime.shutdown();
        runtime.shutdown();
        assert!(runtime.scene().is_empty());
        assert_eq!(runtime.step(&mut (), 0.0).unwrap(), FrameOutcome::Closed);
    }
}
