//! Process-wide configuration
//!
//! Installed through `Engine::initialize`. Contexts and geometries read it when
//! their own descriptors leave a value unset.

use crate::log::LogSeverity;

/// Largest quad count whose shared index pattern fits in 16-bit indices
/// (the highest index of quad `i` is `4i + 3`).
pub const MAX_INDEXABLE_QUADS: u32 = 65536 / 4;

/// Default quad count for the shared index pattern (`2^16 / 6` quads)
pub const DEFAULT_MAX_QUADS: u32 = 65536 / 6;

/// Default number of texture units available to sampler uniforms
pub const DEFAULT_MAX_TEXTURE_UNITS: u32 = 32;

/// Configuration of the resource layer
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Application name, used in log output
    pub app_name: String,
    /// Physical buffers rotated per dynamic logical buffer (at least 1)
    pub dynamic_buffer_count: usize,
    /// Quads covered by each context's shared quad index buffer
    pub max_quads: u32,
    /// Texture units a program may assign to sampler uniforms
    pub max_texture_units: u32,
    /// Entries below this severity never reach the logger
    pub min_log_severity: LogSeverity,
    /// Color used by `RenderContext::before_step`
    pub clear_color: [f32; 4],
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: String::from("galaxy_vid"),
            dynamic_buffer_count: 2,
            max_quads: DEFAULT_MAX_QUADS,
            max_texture_units: DEFAULT_MAX_TEXTURE_UNITS,
            min_log_severity: LogSeverity::Info,
            clear_color: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

impl Config {
    /// Check the values a context or geometry will rely on
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.dynamic_buffer_count == 0 {
            return Err("dynamic_buffer_count must be at least 1".to_string());
        }
        if self.max_quads > MAX_INDEXABLE_QUADS {
            return Err(format!(
                "max_quads {} exceeds the 16-bit index limit of {}",
                self.max_quads, MAX_INDEXABLE_QUADS
            ));
        }
        if self.max_texture_units == 0 {
            return Err("max_texture_units must be at least 1".to_string());
        }
        Ok(())
    }
}
