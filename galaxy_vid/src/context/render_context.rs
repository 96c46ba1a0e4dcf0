/// RenderContext - one native graphics context and everything bound to it
///
/// A context owns its `GraphicsDevice`, the deletion queue of that device,
/// the shared quad index buffer and the letterboxed viewport. Logical
/// resources resolve their physical objects against a context on first use
/// and register themselves here, so that dropping the context releases every
/// cache entry it holds.
///
/// Frame protocol:
///
/// ```text
/// before_step()   clear the frame
/// ... draws ...
/// after_step()    sweep the deletion queue, present, update FPS
/// ```

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use glam::Mat4;
use crate::config::MAX_INDEXABLE_QUADS;
use crate::engine::Engine;
use crate::error::Result;
use crate::graphics_device::{
    GraphicsDevice, BufferHandle, ProgramHandle, PhysicalHandle, BufferKind, BufferUsage,
    IndexType, PrimitiveTopology,
};
use crate::resource::cache::ContextBound;
use crate::{engine_bail, engine_debug, engine_info};
use super::{DeletionQueue, SweepStats, Viewport, orthographic_projection};

static NEXT_CONTEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a render context
///
/// Identifiers are never reused, so a stale id can not alias a newer context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextId(u64);

impl ContextId {
    fn next() -> Self {
        ContextId(NEXT_CONTEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ctx#{}", self.0)
    }
}

/// Context creation parameters
///
/// `None` fields fall back to the active `Config`.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextDesc {
    /// Logical width of the drawing area
    pub width: u32,
    /// Logical height of the drawing area
    pub height: u32,
    /// Near plane of the orthographic projection (default `-height`)
    pub near: Option<f32>,
    /// Far plane of the orthographic projection (default `height`)
    pub far: Option<f32>,
    pub max_quads: Option<u32>,
    pub max_texture_units: Option<u32>,
    pub clear_color: Option<[f32; 4]>,
}

impl ContextDesc {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            near: None,
            far: None,
            max_quads: None,
            max_texture_units: None,
            clear_color: None,
        }
    }
}

/// Per-frame counters of a context
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameStats {
    /// Frames completed since creation
    pub frames: u64,
    /// Frames per second, refreshed once per second
    pub fps: u32,
    /// Draw calls issued this frame
    pub draw_calls: u32,
    /// Buffer and texture uploads this frame
    pub uploads: u32,
    /// Bytes uploaded this frame
    pub uploaded_bytes: u64,
    /// Objects destroyed by the last sweep
    pub swept: usize,
}

struct BoundProgram {
    handle: ProgramHandle,
    attribute_locations: Vec<u32>,
}

/// One native graphics context
pub struct RenderContext {
    id: ContextId,
    device: Box<dyn GraphicsDevice>,
    deletion_queue: Rc<RefCell<DeletionQueue>>,
    bound_caches: Vec<Weak<dyn ContextBound>>,

    width: u32,
    height: u32,
    near: f32,
    far: f32,
    viewport: Viewport,
    projection: Mat4,
    clear_color: [f32; 4],

    quad_indices: Option<BufferHandle>,
    max_quads: u32,
    max_texture_units: u32,
    current_program: Option<BoundProgram>,

    stats: FrameStats,
    fps_frames: u32,
    fps_since: Instant,
}

impl RenderContext {
    /// Create a context driving `device`
    ///
    /// Builds the shared quad index buffer and sets up a viewport covering
    /// the logical area at scale 1.
    ///
    /// # Errors
    ///
    /// - `InitializationFailed` for a zero logical size
    /// - `ResourceLimitExceeded` if `max_quads` exceeds the 16-bit index limit
    /// - Any device error raised while creating the quad index buffer
    pub fn new<D: GraphicsDevice + 'static>(desc: ContextDesc, device: D) -> Result<Self> {
        if desc.width == 0 || desc.height == 0 {
            engine_bail!(@InitializationFailed, "galaxy_vid::RenderContext",
                "logical size {}x{} is empty", desc.width, desc.height);
        }

        let config = Engine::config();
        let max_quads = desc.max_quads.unwrap_or(config.max_quads);
        if max_quads > MAX_INDEXABLE_QUADS {
            engine_bail!(@ResourceLimitExceeded, "galaxy_vid::RenderContext",
                "{} quads can not be indexed with 16-bit indices (max {})",
                max_quads, MAX_INDEXABLE_QUADS);
        }

        let near = desc.near.unwrap_or(-(desc.height as f32));
        let far = desc.far.unwrap_or(desc.height as f32);

        let mut context = Self {
            id: ContextId::next(),
            device: Box::new(device),
            deletion_queue: Rc::new(RefCell::new(DeletionQueue::new())),
            bound_caches: Vec::new(),
            width: desc.width,
            height: desc.height,
            near,
            far,
            viewport: Viewport { x: 0, y: 0, width: desc.width, height: desc.height },
            projection: orthographic_projection(desc.width, desc.height, near, far),
            clear_color: desc.clear_color.unwrap_or(config.clear_color),
            quad_indices: None,
            max_quads,
            max_texture_units: desc.max_texture_units.unwrap_or(config.max_texture_units),
            current_program: None,
            stats: FrameStats::default(),
            fps_frames: 0,
            fps_since: Instant::now(),
        };

        context.create_quad_indices()?;
        context.device.set_viewport(context.viewport)?;

        engine_info!("galaxy_vid::RenderContext", "Context {} created ({}x{}, {} quads)",
            context.id, context.width, context.height, context.max_quads);
        Ok(context)
    }

    fn create_quad_indices(&mut self) -> Result<()> {
        let indices: Vec<u16> = (0..self.max_quads)
            .flat_map(|quad| {
                let base = (quad * 4) as u16;
                [base, base + 1, base + 2, base + 2, base + 3, base]
            })
            .collect();

        let buffer = self.device.create_buffer(BufferKind::Index)?;
        if let Err(err) = self.device.upload_buffer(
            BufferKind::Index,
            buffer,
            bytemuck::cast_slice(&indices),
            BufferUsage::Static,
        ) {
            self.device.destroy_buffer(buffer);
            return Err(err);
        }
        self.quad_indices = Some(buffer);
        Ok(())
    }

    // ===== ACCESSORS =====

    pub fn id(&self) -> ContextId {
        self.id
    }

    /// Logical width
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Logical height
    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Orthographic projection of the logical area, origin at the centre
    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    /// Quads covered by the shared quad index buffer
    pub fn max_quads(&self) -> u32 {
        self.max_quads
    }

    pub fn max_texture_units(&self) -> u32 {
        self.max_texture_units
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    pub fn fps(&self) -> u32 {
        self.stats.fps
    }

    /// Direct access to the device, for calls the resource layer does not wrap
    pub fn device_mut(&mut self) -> &mut dyn GraphicsDevice {
        self.device.as_mut()
    }

    /// Number of queued handles not yet destroyed
    pub fn pending_deletions(&self) -> usize {
        self.deletion_queue.borrow().len()
    }

    /// Queue a handle created through `device_mut` for destruction
    pub fn defer_destroy(&mut self, handle: impl Into<PhysicalHandle>) {
        self.deletion_queue.borrow_mut().enqueue(handle);
    }

    pub(crate) fn deletion_queue(&self) -> Rc<RefCell<DeletionQueue>> {
        self.deletion_queue.clone()
    }

    /// Register a resource cache holding an entry for this context
    ///
    /// A cache released from this context and resolved again is registered once.
    pub(crate) fn track(&mut self, cache: Weak<dyn ContextBound>) {
        self.bound_caches.retain(|bound| bound.strong_count() > 0);
        if !self.bound_caches.iter().any(|bound| Weak::ptr_eq(bound, &cache)) {
            self.bound_caches.push(cache);
        }
    }

    /// Registered cache slots, dead ones included until the next registration
    #[cfg(test)]
    pub(crate) fn bound_cache_slots(&self) -> usize {
        self.bound_caches.len()
    }

    /// Number of live resource caches holding an entry for this context
    pub fn tracked_resources(&self) -> usize {
        self.bound_caches.iter().filter(|cache| cache.strong_count() > 0).count()
    }

    // ===== FRAME =====

    /// Start a frame: reset the per-frame counters and clear
    pub fn before_step(&mut self) -> Result<()> {
        self.stats.draw_calls = 0;
        self.stats.uploads = 0;
        self.stats.uploaded_bytes = 0;
        self.device.clear(self.clear_color)
    }

    /// Finish a frame: destroy queued objects, present and update FPS
    pub fn after_step(&mut self) -> Result<()> {
        self.sweep();
        self.device.present()?;

        self.stats.frames += 1;
        self.fps_frames += 1;
        let elapsed = self.fps_since.elapsed();
        if elapsed >= Duration::from_secs(1) {
            self.stats.fps = (self.fps_frames as f64 / elapsed.as_secs_f64()).round() as u32;
            self.fps_frames = 0;
            self.fps_since = Instant::now();
            engine_info!("galaxy_vid::RenderContext", "Context {}: {} fps", self.id, self.stats.fps);
        }
        Ok(())
    }

    /// Destroy every queued object now
    ///
    /// Called by `after_step`. Only call it directly when no draw issued
    /// since the last sweep can still read the queued objects.
    pub fn sweep(&mut self) -> SweepStats {
        let mut queue = self.deletion_queue.borrow_mut();
        if queue.is_empty() {
            self.stats.swept = 0;
            return SweepStats::default();
        }

        if let Some(program) = &self.current_program {
            if queue.contains(program.handle) {
                self.current_program = None;
            }
        }

        let stats = queue.sweep(self.device.as_mut());
        drop(queue);

        self.bound_caches.retain(|cache| cache.strong_count() > 0);
        self.stats.swept = stats.total();
        engine_debug!("galaxy_vid::RenderContext", "Context {} swept {} objects ({} programs, {} shaders, {} textures, {} buffers)",
            self.id, stats.total(), stats.programs, stats.shaders, stats.textures, stats.buffers);
        stats
    }

    /// Letterbox the logical area into a `window_width x window_height` window
    pub fn resize(&mut self, window_width: u32, window_height: u32) -> Result<()> {
        self.viewport = Viewport::letterbox(self.width, self.height, window_width, window_height);
        self.projection = orthographic_projection(self.width, self.height, self.near, self.far);
        self.device.set_viewport(self.viewport)?;
        engine_debug!("galaxy_vid::RenderContext", "Context {} viewport {:?}", self.id, self.viewport);
        Ok(())
    }

    /// RGB pixels of the viewport, top row first
    pub fn read_pixels(&mut self) -> Result<Vec<u8>> {
        let pixels = self.device.read_pixels(self.viewport)?;
        let row = self.viewport.width as usize * 3;
        if row == 0 {
            return Ok(pixels);
        }
        Ok(pixels.chunks_exact(row).rev().flatten().copied().collect())
    }

    /// Release every cache entry held for this context and sweep
    ///
    /// The context stays usable: resources drawn again afterwards recreate
    /// their physical objects. Returns the number of entries released.
    pub fn release_resources(&mut self) -> usize {
        let caches = std::mem::take(&mut self.bound_caches);
        let released = caches
            .iter()
            .filter_map(Weak::upgrade)
            .filter(|cache| cache.release_context(self.id))
            .count();

        self.sweep();
        engine_info!("galaxy_vid::RenderContext", "Context {} released {} resource entries", self.id, released);
        released
    }

    // ===== PROGRAM AND DRAW STATE =====

    /// Make `program` current, switching the enabled vertex attributes
    ///
    /// Attributes of the previous program are disabled, except location 0,
    /// and the attributes in `attribute_locations` are enabled. Returns
    /// whether a switch happened.
    pub fn use_program(&mut self, program: ProgramHandle, attribute_locations: &[u32]) -> Result<bool> {
        if let Some(current) = &self.current_program {
            if current.handle == program && current.attribute_locations == attribute_locations {
                return Ok(false);
            }
        }

        if let Some(previous) = self.current_program.take() {
            for &location in previous.attribute_locations.iter().filter(|&&l| l != 0) {
                self.device.disable_vertex_attribute(location)?;
            }
        }

        self.device.use_program(program)?;
        for &location in attribute_locations {
            self.device.enable_vertex_attribute(location)?;
        }
        self.current_program = Some(BoundProgram {
            handle: program,
            attribute_locations: attribute_locations.to_vec(),
        });
        Ok(true)
    }

    /// Program made current by the last `use_program`
    pub fn current_program(&self) -> Option<ProgramHandle> {
        self.current_program.as_ref().map(|p| p.handle)
    }

    /// Bind the shared quad index buffer
    pub fn bind_quad_indices(&mut self) -> Result<()> {
        match self.quad_indices {
            Some(buffer) => self.device.bind_buffer(BufferKind::Index, buffer),
            None => engine_bail!(@InvalidResource, "galaxy_vid::RenderContext",
                "context {} has no quad index buffer", self.id),
        }
    }

    pub(crate) fn record_upload(&mut self, bytes: usize) {
        self.stats.uploads += 1;
        self.stats.uploaded_bytes += bytes as u64;
    }

    pub fn draw_arrays(&mut self, topology: PrimitiveTopology, first: u32, count: u32) -> Result<()> {
        self.device.draw_arrays(topology, first, count)?;
        self.stats.draw_calls += 1;
        Ok(())
    }

    pub fn draw_elements(&mut self, topology: PrimitiveTopology, count: u32, index_type: IndexType, offset: u64) -> Result<()> {
        self.device.draw_elements(topology, count, index_type, offset)?;
        self.stats.draw_calls += 1;
        Ok(())
    }
}

impl Drop for RenderContext {
    fn drop(&mut self) {
        self.release_resources();
        if let Some(buffer) = self.quad_indices.take() {
            self.device.destroy_buffer(buffer);
        }
        engine_info!("galaxy_vid::RenderContext", "Context {} destroyed", self.id);
    }
}

#[cfg(test)]
#[path = "render_context_tests.rs"]
mod tests;
