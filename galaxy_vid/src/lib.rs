/*!
# Galaxy VID

Video resource layer of the Galaxy engine.

Logical resources (textures, shader programs, geometry) are created once by
the application and drawn on any number of independent rendering contexts.
Each context lazily builds its own physical copy of a resource the first
time it draws it, keeps it in sync through dirty flags, and destroys it
through a deferred deletion queue swept at the end of the frame.

## Architecture

- **GraphicsDevice**: the native graphics API surface a context drives
  (a headless recording implementation is provided)
- **RenderContext**: one device, its deletion queue, viewport and frame stats
- **ResourceCache**: per-context physical objects of one logical resource
- **RingBuffer**: rotating physical buffers for dynamic uploads
- **PackedGeometry**: free-list backed triangle / quad containers

Everything is exposed through the [`vid`] namespace.
*/

// Internal modules
mod error;
mod engine;
mod config;
mod log;
mod graphics_device;
mod context;
mod resource;
mod utils;

// Main vid namespace module
pub mod vid {
    // Error types
    pub use crate::error::{Error, Result};

    // Engine singleton and its configuration
    pub use crate::engine::Engine;
    pub use crate::config::{Config, MAX_INDEXABLE_QUADS, DEFAULT_MAX_QUADS, DEFAULT_MAX_TEXTURE_UNITS};

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
    }

    // Graphics device sub-module
    pub mod device {
        pub use crate::graphics_device::*;
    }

    // Render context sub-module
    pub mod context {
        pub use crate::context::*;
    }

    // Logical resource sub-module
    pub mod resource {
        pub use crate::resource::*;
    }

    // Allocation helpers
    pub mod utils {
        pub use crate::utils::*;
    }
}

// Re-export math library at crate root
pub use glam;
