//! # Wasm Host Bindings
//!
//! [`Host`] over the `env.simulo_*` imports provided by the embedding
//! environment. Only compiled for `wasm32`.

#![allow(unsafe_code)]

use simulo_core::{Host, MaterialHandle, PollStatus, RenderHandle, MATRIX_FLOATS};

use crate::clock::SystemClock;
use crate::config::RuntimeConfig;
use crate::error::RuntimeResult;
use crate::game::Game;
use crate::runtime::{RunSummary, Runtime};

#[link(wasm_import_module = "env")]
extern "C" {
    fn simulo_poll(buf: *mut u8, len: u32) -> i32;

    fn simulo_create_rendered_object2(material: u32, render_order: u32) -> u32;
    fn simulo_set_rendered_object_material(id: u32, material: u32);
    fn simulo_set_rendered_object_colors(count: u32, ids: *const u32, colors: *const f32);
    fn simulo_set_rendered_object_transforms(count: u32, ids: *const u32, matrices: *const f32);
    fn simulo_drop_rendered_object(id: u32);

    fn simulo_create_material(name: *const u8, name_len: u32, r: f32, g: f32, b: f32, a: f32) -> u32;
    fn simulo_update_material(id: u32, r: f32, g: f32, b: f32, a: f32);
    fn simulo_drop_material(id: u32);
}

/// Host backed by the wasm imports.
#[derive(Debug, Default)]
pub struct WasmHost {
    _private: (),
}

impl WasmHost {
    /// Creates the host.
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }
}

fn count(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

impl Host for WasmHost {
    fn poll(&mut self, buffer: &mut [u8]) -> PollStatus {
        // SAFETY: the host writes at most `len` bytes into `buffer`.
        let written = unsafe { simulo_poll(buffer.as_mut_ptr(), count(buffer.len())) };
        match usize::try_from(written) {
            Ok(n) => PollStatus::Ready(n.min(buffer.len())),
            Err(_) => PollStatus::Closed,
        }
    }

    fn create_render_object(&mut self, material: MaterialHandle, render_order: u32) -> RenderHandle {
        // SAFETY: plain integer arguments.
        RenderHandle(unsafe { simulo_create_rendered_object2(material.0, render_order) })
    }

    fn set_render_object_material(&mut self, object: RenderHandle, material: MaterialHandle) {
        // SAFETY: plain integer arguments.
        unsafe { simulo_set_rendered_object_material(object.0, material.0) }
    }

    fn set_render_object_colors(&mut self, ids: &[u32], colors: &[f32]) {
        debug_assert_eq!(colors.len(), ids.len() * 4);
        // SAFETY: the host reads `count` ids and `count * 4` floats.
        unsafe { simulo_set_rendered_object_colors(count(ids.len()), ids.as_ptr(), colors.as_ptr()) }
    }

    fn set_render_object_transforms(&mut self, ids: &[u32], matrices: &[f32]) {
        debug_assert_eq!(matrices.len(), ids.len() * MATRIX_FLOATS);
        // SAFETY: the host reads `count` ids and `count * 16` floats.
        unsafe { simulo_set_rendered_object_transforms(count(ids.len()), ids.as_ptr(), matrices.as_ptr()) }
    }

    fn drop_render_object(&mut self, object: RenderHandle) {
        // SAFETY: plain integer argument.
        unsafe { simulo_drop_rendered_object(object.0) }
    }

    fn create_material(&mut self, name: Option<&str>, tint: [f32; 4]) -> MaterialHandle {
        let (ptr, len) = name.map_or((std::ptr::null(), 0), |n| (n.as_ptr(), count(n.len())));
        let [r, g, b, a] = tint;
        // SAFETY: the host reads `len` bytes of UTF-8 from `ptr`, or nothing when `len` is zero.
        MaterialHandle(unsafe { simulo_create_material(ptr, len, r, g, b, a) })
    }

    fn update_material(&mut self, material: MaterialHandle, tint: [f32; 4]) {
        let [r, g, b, a] = tint;
        // SAFETY: plain scalar arguments.
        unsafe { simulo_update_material(material.0, r, g, b, a) }
    }

    fn drop_material(&mut self, material: MaterialHandle) {
        // SAFETY: plain integer argument.
        unsafe { simulo_drop_material(material.0) }
    }
}

/// Runs `game` against the wasm host until the host closes the stream.
///
/// # Errors
///
/// Returns the error that stopped the frame loop.
pub fn run<G: Game>(mut game: G, config: RuntimeConfig) -> RuntimeResult<RunSummary> {
    let mut runtime = Runtime::with_config(WasmHost::new(), config)?;
    runtime.run(&mut game, &mut SystemClock::new())
}
