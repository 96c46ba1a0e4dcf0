/// PackedGeometry - live, drawable mesh of fixed-size primitive slots
///
/// Every slot holds the interleaved vertices of one primitive. Slots are
/// managed by a `SlotAllocator`, so the whole backing array is uploaded as
/// one dynamic vertex buffer and drawn with a single call:
///
/// ```text
/// Triangle slots: [A B C][A B C][0 0 0][A B C]   draw_arrays(slots * 3)
/// Quad slots:     [A B C D][0 0 0 0][A B C D]    draw_elements(slots * 6)
///                                                 with the context quad indices
/// ```
///
/// Freed slots are zeroed and keep being drawn as degenerate primitives.
/// Any mutation marks the container dirty; the next draw re-uploads the
/// whole array on every context, rotating through the ring buffers.

use crate::context::{ContextId, RenderContext};
use crate::engine::Engine;
use crate::error::Result;
use crate::graphics_device::{BufferKind, BufferUsage, IndexType, PrimitiveTopology, VertexLayout};
use crate::utils::{DirtyFlag, SlotAllocator};
use crate::engine_bail;
use super::cache::{ResourceCache, ResourceId, UpdateFlags};
use super::geometry::point_attributes;
use super::{Program, RingBuffer};

/// Primitive stored in one slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotShape {
    /// 3 vertices, drawn as a triangle list
    Triangle,
    /// 4 vertices `A B C D`, drawn as triangles `A B C` and `C D A`
    Quad,
}

impl SlotShape {
    pub fn vertices_per_slot(&self) -> usize {
        match self {
            SlotShape::Triangle => 3,
            SlotShape::Quad => 4,
        }
    }
}

pub struct PackedGeometry {
    shape: SlotShape,
    floats_per_vertex: usize,
    layout: VertexLayout,
    slots: SlotAllocator,
    dirty: DirtyFlag,
    buffer_count: usize,
    cache: ResourceCache<RingBuffer>,
}

impl PackedGeometry {
    /// Create an empty container
    ///
    /// Uses `Config::dynamic_buffer_count` ring buffers per context.
    ///
    /// # Errors
    ///
    /// `LayoutMismatch` if the layout stride is not `floats_per_vertex` floats,
    /// or if its attributes disagree on the stride.
    pub fn new(shape: SlotShape, floats_per_vertex: usize, layout: VertexLayout) -> Result<Self> {
        let stride = layout.stride()?;
        if floats_per_vertex == 0 || stride as usize != floats_per_vertex * std::mem::size_of::<f32>() {
            engine_bail!(@LayoutMismatch, "galaxy_vid::PackedGeometry",
                "layout stride {} does not match {} floats per vertex", stride, floats_per_vertex);
        }

        Ok(Self {
            shape,
            floats_per_vertex,
            layout,
            slots: SlotAllocator::new(floats_per_vertex * shape.vertices_per_slot()),
            dirty: DirtyFlag::default(),
            buffer_count: Engine::config().dynamic_buffer_count.max(1),
            cache: ResourceCache::new(),
        })
    }

    /// Use `count` ring buffers for contexts that have not drawn yet
    pub fn set_buffer_count(&mut self, count: usize) {
        self.buffer_count = count.max(1);
    }

    pub fn id(&self) -> ResourceId {
        self.cache.id()
    }

    pub fn shape(&self) -> SlotShape {
        self.shape
    }

    pub fn floats_per_vertex(&self) -> usize {
        self.floats_per_vertex
    }

    pub fn layout(&self) -> &VertexLayout {
        &self.layout
    }

    /// Live slots
    pub fn len(&self) -> u32 {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Slots in the backing array, free ones included
    pub fn slot_count(&self) -> u32 {
        self.slots.record_count()
    }

    /// The whole backing array
    pub fn data(&self) -> &[f32] {
        self.slots.data()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.is_dirty()
    }

    /// Allocate one zeroed slot
    pub fn allocate(&mut self) -> u32 {
        self.dirty.mark();
        self.slots.allocate()
    }

    /// Allocate two adjacent zeroed slots and return the first
    pub fn allocate_pair(&mut self) -> u32 {
        self.dirty.mark();
        self.slots.allocate_pair()
    }

    /// Zero and release a slot
    ///
    /// Freeing a slot that is already free is not detected.
    pub fn free(&mut self, index: u32) -> Result<()> {
        self.check_index(index)?;
        self.dirty.mark();
        self.slots.free(index);
        Ok(())
    }

    /// Drop every slot
    pub fn clear(&mut self) {
        self.dirty.mark();
        self.slots.clear();
    }

    /// Floats of the slot at `index`
    pub fn slot(&self, index: u32) -> Result<&[f32]> {
        self.check_index(index)?;
        Ok(self.slots.record(index))
    }

    /// Mutable floats of the slot at `index`, marking the container dirty
    pub fn slot_mut(&mut self, index: u32) -> Result<&mut [f32]> {
        self.check_index(index)?;
        self.dirty.mark();
        Ok(self.slots.record_mut(index))
    }

    /// Mutable floats of vertex `vertex` of slot `index`
    pub(crate) fn vertex_mut(&mut self, index: u32, vertex: usize) -> &mut [f32] {
        let floats = self.floats_per_vertex;
        self.dirty.mark();
        &mut self.slots.record_mut(index)[vertex * floats..(vertex + 1) * floats]
    }

    pub(crate) fn check_index(&self, index: u32) -> Result<()> {
        if index >= self.slots.record_count() {
            engine_bail!(@InvalidResource, "galaxy_vid::PackedGeometry",
                "slot {} is out of range ({} slots)", index, self.slots.record_count());
        }
        Ok(())
    }

    /// Successful uploads of the backing array on `context`
    pub fn upload_count_on(&self, context: ContextId) -> Option<u64> {
        self.cache.with_entry(context, |entry| entry.objects().upload_count())
    }

    /// Draw every slot with `program` on `ctx`
    ///
    /// Re-uploads the backing array if it changed since this context last
    /// drew it. A container without slots issues no draw call.
    ///
    /// # Errors
    ///
    /// - `ResourceLimitExceeded` for more quad slots than the context's
    ///   shared quad index buffer covers
    /// - `InvalidResource` if the program reads an attribute the layout
    ///   does not provide
    /// - Program compile or link errors
    pub fn draw(&mut self, ctx: &mut RenderContext, program: &Program) -> Result<()> {
        if self.dirty.take() {
            self.cache.invalidate(UpdateFlags::DATA);
        }

        let slot_count = self.slots.record_count();
        if self.shape == SlotShape::Quad && slot_count > ctx.max_quads() {
            engine_bail!(@ResourceLimitExceeded, "galaxy_vid::PackedGeometry",
                "{} quads exceed the {} quads indexed by context {}", slot_count, ctx.max_quads(), ctx.id());
        }

        let reflection = program.bind(ctx)?;

        let buffer_count = self.buffer_count;
        let data = self.slots.as_bytes();
        self.cache.resolve(
            ctx,
            |device| RingBuffer::new(device, BufferKind::Vertex, buffer_count),
            |entry, ctx| {
                if entry.needs(UpdateFlags::DATA) {
                    entry.objects_mut().upload(ctx.device_mut(), data, BufferUsage::Dynamic)?;
                    ctx.record_upload(data.len());
                    entry.mark_synced(UpdateFlags::DATA);
                }
                entry.objects().bind(ctx.device_mut())
            },
        )?;

        point_attributes(ctx, &reflection, &self.layout)?;

        if slot_count == 0 {
            return Ok(());
        }
        match self.shape {
            SlotShape::Triangle => ctx.draw_arrays(PrimitiveTopology::TriangleList, 0, slot_count * 3),
            SlotShape::Quad => {
                ctx.bind_quad_indices()?;
                ctx.draw_elements(PrimitiveTopology::TriangleList, slot_count * 6, IndexType::U16, 0)
            }
        }
    }
}

#[cfg(test)]
#[path = "packed_geometry_tests.rs"]
mod tests;
