//! # Runtime Configuration
//!
//! Loaded once at startup, from TOML or defaults.
//!
//! ```toml
//! event_buffer_capacity = 32768
//! fixed_updates_per_second = 60.0
//! max_fixed_steps_per_frame = 8
//! default_render_order = 0
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use simulo_protocol::POSE_UPSERT_LEN;

use crate::error::{RuntimeError, RuntimeResult};

/// Default size of the event poll buffer (32 KiB).
pub const DEFAULT_EVENT_BUFFER_CAPACITY: usize = 32 * 1024;

/// Default fixed update rate.
pub const DEFAULT_FIXED_UPDATES_PER_SECOND: f32 = 60.0;

/// Runtime settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuntimeConfig {
    /// Bytes the host may write per poll. Must hold the largest record.
    pub event_buffer_capacity: usize,
    /// Rate of `Game::fixed_update` calls.
    pub fixed_updates_per_second: f32,
    /// Fixed updates run at most this many times per frame; the rest of the
    /// backlog is dropped.
    pub max_fixed_steps_per_frame: u32,
    /// Render order for renderables spawned without an explicit one.
    pub default_render_order: u32,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            event_buffer_capacity: DEFAULT_EVENT_BUFFER_CAPACITY,
            fixed_updates_per_second: DEFAULT_FIXED_UPDATES_PER_SECOND,
            max_fixed_steps_per_frame: 8,
            default_render_order: 0,
        }
    }
}

impl RuntimeConfig {
    /// Parses and validates a TOML document. Missing keys take defaults.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::Config`] for malformed TOML, unknown keys or
    /// values rejected by [`validate`](Self::validate).
    pub fn from_toml_str(source: &str) -> RuntimeResult<Self> {
        let config: Self = toml::from_str(source).map_err(|e| RuntimeError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::Io`] if the file cannot be read, otherwise as
    /// [`from_toml_str`](Self::from_toml_str).
    pub fn from_file(path: impl AsRef<Path>) -> RuntimeResult<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Serializes to TOML.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::Config`] if serialization fails.
    pub fn to_toml_string(&self) -> RuntimeResult<String> {
        toml::to_string(self).map_err(|e| RuntimeError::Config(e.to_string()))
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::Config`] describing the first bad field.
    pub fn validate(&self) -> RuntimeResult<()> {
        if self.event_buffer_capacity < POSE_UPSERT_LEN {
            return Err(RuntimeError::Config(format!(
                "event_buffer_capacity must be at least {POSE_UPSERT_LEN} bytes, got {}",
                self.event_buffer_capacity
            )));
        }
        if !self.fixed_updates_per_second.is_finite() || self.fixed_updates_per_second <= 0.0 {
            return Err(RuntimeError::Config(format!(
                "fixed_updates_per_second must be positive, got {}",
                self.fixed_updates_per_second
            )));
        }
        if self.max_fixed_steps_per_frame == 0 {
            return Err(RuntimeError::Config(
                "max_fixed_steps_per_frame must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Seconds per fixed update.
    #[must_use]
    pub fn fixed_step(&self) -> f32 {
        1.0 / self.fixed_updates_per_second
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = RuntimeConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.event_buffer_capacity, 32768);
        assert!((config.fixed_step() - 1.0 / 60.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_toml_roundtrip_defaults() {
        let text = RuntimeConfig::default().to_toml_string().unwrap();
        assert_eq!(RuntimeConfig::from_toml_str(&text).unwrap(), RuntimeConfig::default());
        assert_eq!(RuntimeConfig::from_toml_str("").unwrap(), RuntimeConfig::default());
    }

    #[test]
    fn test_partial_toml() {
        let config = RuntimeConfig::from_toml_str("fixed_updates_per_second = 30.0\ndefault_render_order = 4").unwrap();
        assert_eq!(config.default_render_order, 4);
        assert_eq!(config.event_buffer_capacity, DEFAULT_EVENT_BUFFER_CAPACITY);
    }

    #[test]
    fn test_rejects_bad_values() {
        for source in [
            "event_buffer_capacity = 0",
            "event_buffer_capacity = 72",
            "fixed_updates_per_second = 0.0",
            "fixed_updates_per_second = -5.0",
            "max_fixed_steps_per_frame = 0",
            "unknown_key = 1",
            "event_buffer_capacity = \"big\"",
        ] {
            assert!(
                matches!(RuntimeConfig::from_toml_str(source), Err(RuntimeError::Config(_))),
                "accepted {source}"
            );
        }
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = RuntimeConfig::from_file("/nonexistent/simulo.toml");
        assert!(matches!(result, Err(RuntimeError::Io(_))));
    }
}
