/// Geometry - bring-your-own vertex buffer with an optional index buffer
///
/// The application supplies raw interleaved vertex bytes and a
/// `VertexLayout` naming each attribute. Data is uploaded once per context
/// (static usage) and again only after `set_vertex_data` / `set_index_data`.

use crate::context::{DeletionQueue, RenderContext};
use crate::error::Result;
use crate::graphics_device::{
    BufferKind, BufferUsage, IndexType, PrimitiveTopology, ProgramReflection, VertexLayout,
};
use crate::{engine_bail, engine_debug};
use super::cache::{PhysicalObjects, ResourceCache, ResourceId, UpdateFlags};
use super::{Program, RingBuffer};

/// Index data of a `Geometry`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexData {
    U8(Vec<u8>),
    U16(Vec<u16>),
}

impl IndexData {
    pub fn index_type(&self) -> IndexType {
        match self {
            IndexData::U8(_) => IndexType::U8,
            IndexData::U16(_) => IndexType::U16,
        }
    }

    /// Number of indices
    pub fn len(&self) -> usize {
        match self {
            IndexData::U8(indices) => indices.len(),
            IndexData::U16(indices) => indices.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            IndexData::U8(indices) => indices,
            IndexData::U16(indices) => bytemuck::cast_slice(indices),
        }
    }
}

struct GeometryObjects {
    vertices: RingBuffer,
    indices: Option<RingBuffer>,
}

impl PhysicalObjects for GeometryObjects {
    fn retire(self, queue: &mut DeletionQueue) {
        self.vertices.retire(queue);
        if let Some(indices) = self.indices {
            indices.retire(queue);
        }
    }
}

/// Point every attribute `reflection` reports at its source in `layout`
///
/// The vertex buffer holding the layout's data must be bound.
pub(crate) fn point_attributes(ctx: &mut RenderContext, reflection: &ProgramReflection, layout: &VertexLayout) -> Result<()> {
    for attribute in &reflection.attributes {
        let Some(source) = layout.attribute(&attribute.name) else {
            engine_bail!(@InvalidResource, "galaxy_vid::Geometry",
                "program attribute '{}' is not provided by the vertex layout", attribute.name);
        };
        ctx.device_mut().vertex_attribute_pointer(attribute.location, source)?;
    }
    Ok(())
}

/// Application-provided vertex (and index) data
pub struct Geometry {
    topology: PrimitiveTopology,
    vertex_data: Vec<u8>,
    layout: VertexLayout,
    stride: u32,
    index_data: Option<IndexData>,
    cache: ResourceCache<GeometryObjects>,
}

impl Geometry {
    /// Create a geometry from interleaved vertex bytes
    ///
    /// # Errors
    ///
    /// - `LayoutMismatch` if the layout attributes disagree on the stride
    /// - `InvalidDataSize` if the vertex data is not a whole number of vertices
    pub fn new(
        topology: PrimitiveTopology,
        vertex_data: impl Into<Vec<u8>>,
        layout: VertexLayout,
        index_data: Option<IndexData>,
    ) -> Result<Self> {
        let vertex_data = vertex_data.into();
        let stride = layout.stride()?;
        check_vertex_data(&vertex_data, stride)?;

        Ok(Self {
            topology,
            vertex_data,
            layout,
            stride,
            index_data,
            cache: ResourceCache::new(),
        })
    }

    pub fn id(&self) -> ResourceId {
        self.cache.id()
    }

    pub fn topology(&self) -> PrimitiveTopology {
        self.topology
    }

    pub fn set_topology(&mut self, topology: PrimitiveTopology) {
        self.topology = topology;
    }

    pub fn layout(&self) -> &VertexLayout {
        &self.layout
    }

    pub fn vertex_data(&self) -> &[u8] {
        &self.vertex_data
    }

    pub fn index_data(&self) -> Option<&IndexData> {
        self.index_data.as_ref()
    }

    pub fn vertex_count(&self) -> u32 {
        (self.vertex_data.len() / self.stride as usize) as u32
    }

    /// Vertices or indices read by one draw
    pub fn draw_count(&self) -> u32 {
        match &self.index_data {
            Some(indices) => indices.len() as u32,
            None => self.vertex_count(),
        }
    }

    /// Replace the vertex data, re-uploaded by every context at its next draw
    pub fn set_vertex_data(&mut self, vertex_data: impl Into<Vec<u8>>) -> Result<()> {
        let vertex_data = vertex_data.into();
        check_vertex_data(&vertex_data, self.stride)?;
        self.vertex_data = vertex_data;
        self.cache.invalidate(UpdateFlags::DATA);
        Ok(())
    }

    /// Replace or remove the index data
    ///
    /// Removing it releases the index buffers of every context at its next draw.
    pub fn set_index_data(&mut self, index_data: Option<IndexData>) {
        self.index_data = index_data;
        self.cache.invalidate(UpdateFlags::INDICES);
    }

    /// Replace the layout; the vertex data must still fit it
    pub fn set_layout(&mut self, layout: VertexLayout) -> Result<()> {
        let stride = layout.stride()?;
        check_vertex_data(&self.vertex_data, stride)?;
        self.layout = layout;
        self.stride = stride;
        Ok(())
    }

    /// Draw with `program` on `ctx`
    pub fn draw(&self, ctx: &mut RenderContext, program: &Program) -> Result<()> {
        let reflection = program.bind(ctx)?;

        let index_binding = self.cache.resolve(
            ctx,
            |device| {
                Ok(GeometryObjects {
                    vertices: RingBuffer::new(device, BufferKind::Vertex, 1)?,
                    indices: None,
                })
            },
            |entry, ctx| {
                if entry.needs(UpdateFlags::DATA) {
                    entry.objects_mut().vertices.upload(ctx.device_mut(), &self.vertex_data, BufferUsage::Static)?;
                    ctx.record_upload(self.vertex_data.len());
                    entry.mark_synced(UpdateFlags::DATA);
                }

                if entry.needs(UpdateFlags::INDICES) {
                    let objects = entry.objects_mut();
                    match &self.index_data {
                        Some(indices) => {
                            if objects.indices.is_none() {
                                objects.indices = Some(RingBuffer::new(ctx.device_mut(), BufferKind::Index, 1)?);
                            }
                            if let Some(ring) = objects.indices.as_mut() {
                                ring.upload(ctx.device_mut(), indices.as_bytes(), BufferUsage::Static)?;
                                ctx.record_upload(indices.as_bytes().len());
                            }
                        }
                        None => {
                            if let Some(ring) = objects.indices.take() {
                                ring.retire(&mut ctx.deletion_queue().borrow_mut());
                                engine_debug!("galaxy_vid::Geometry", "Geometry {} dropped its index buffer on context {}",
                                    self.id(), ctx.id());
                            }
                        }
                    }
                    entry.mark_synced(UpdateFlags::INDICES);
                }

                entry.objects().vertices.bind(ctx.device_mut())?;
                Ok(entry.objects().indices.as_ref().map(|ring| ring.current()))
            },
        )?;

        point_attributes(ctx, &reflection, &self.layout)?;

        let count = self.draw_count();
        if count == 0 {
            return Ok(());
        }
        match (&self.index_data, index_binding) {
            (Some(indices), Some(buffer)) => {
                ctx.device_mut().bind_buffer(BufferKind::Index, buffer)?;
                ctx.draw_elements(self.topology, count, indices.index_type(), 0)
            }
            _ => ctx.draw_arrays(self.topology, 0, count),
        }
    }
}

fn check_vertex_data(data: &[u8], stride: u32) -> Result<()> {
    if stride == 0 || data.len() % stride as usize != 0 {
        engine_bail!(@InvalidDataSize, "galaxy_vid::Geometry",
            "{} bytes of vertex data is not a multiple of the {} byte stride", data.len(), stride);
    }
    Ok(())
}

#[cfg(test)]
#[path = "geometry_tests.rs"]
mod tests;
