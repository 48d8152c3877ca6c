//! # Materials
//!
//! Host materials are created once and shared by many render objects. The
//! library owns every handle it creates and releases them together.

use std::collections::HashMap;

use tracing::debug;

use crate::host::{Host, MaterialHandle};

/// Runtime-side record of a host material.
#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    /// Host handle.
    pub handle: MaterialHandle,
    /// Texture name the material was created with.
    pub name: Option<String>,
    /// RGBA tint.
    pub tint: [f32; 4],
}

/// Registry of live materials.
#[derive(Debug, Default)]
pub struct MaterialLibrary {
    materials: HashMap<MaterialHandle, Material>,
}

impl MaterialLibrary {
    /// Creates an empty library.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a host material and records it.
    pub fn create(&mut self, host: &mut dyn Host, name: Option<&str>, tint: [f32; 4]) -> MaterialHandle {
        let handle = host.create_material(name, tint);
        debug!(material = handle.0, ?name, "created material");
        self.materials.insert(
            handle,
            Material {
                handle,
                name: name.map(str::to_owned),
                tint,
            },
        );
        handle
    }

    /// Updates a material's tint. Returns `false` for unknown handles.
    pub fn set_tint(&mut self, host: &mut dyn Host, handle: MaterialHandle, tint: [f32; 4]) -> bool {
        let Some(material) = self.materials.get_mut(&handle) else {
            return false;
        };
        material.tint = tint;
        host.update_material(handle, tint);
        true
    }

    /// Releases one material. Returns `false` for unknown handles.
    pub fn destroy(&mut self, host: &mut dyn Host, handle: MaterialHandle) -> bool {
        if self.materials.remove(&handle).is_none() {
            return false;
        }
        host.drop_material(handle);
        true
    }

    /// Looks up a material.
    #[must_use]
    pub fn get(&self, handle: MaterialHandle) -> Option<&Material> {
        self.materials.get(&handle)
    }

    /// Number of live materials.
    #[must_use]
    pub fn len(&self) -> usize {
        self.materials.len()
    }

    /// Returns `true` if no materials are live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    /// Releases every material.
    pub fn release_all(&mut self, host: &mut dyn Host) {
        let mut handles: Vec<MaterialHandle> = self.materials.keys().copied().collect();
        handles.sort_unstable();
        for handle in handles {
            host.drop_material(handle);
        }
        self.materials.clear();
    }
}
