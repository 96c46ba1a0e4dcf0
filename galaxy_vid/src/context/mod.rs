pub mod render_context;
pub mod deletion_queue;
pub mod viewport;

pub use render_context::{RenderContext, ContextDesc, ContextId, FrameStats};
pub use deletion_queue::{DeletionQueue, SweepStats};
pub use viewport::{Viewport, orthographic_projection};
