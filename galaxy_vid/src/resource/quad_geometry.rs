/// QuadGeometry - packed 2D quads drawn through the context's quad indices
///
/// One slot holds the 4 vertices `A B C D` of a quad, read as triangles
/// `A B C` and `C D A` by the shared index pattern.

use crate::context::{ContextId, RenderContext};
use crate::error::Result;
use crate::graphics_device::{BufferFormat, VertexAttribute, VertexLayout};
use crate::engine_bail;
use super::cache::ResourceId;
use super::packed_geometry::{PackedGeometry, SlotShape};
use super::{AttributeNames, Program, Vertex2};

pub struct QuadGeometry {
    packed: PackedGeometry,
}

impl QuadGeometry {
    /// Quads of 4-float vertices fed to `aPos` and `aUV`
    pub fn new() -> Result<Self> {
        Self::with_attributes(Vertex2::FLOATS, AttributeNames::default())
    }

    /// Quads of `floats_per_vertex`-float vertices
    ///
    /// Only `names.position` and `names.uv` are used.
    ///
    /// # Errors
    ///
    /// `LayoutMismatch` if a vertex holds fewer than 4 floats.
    pub fn with_attributes(floats_per_vertex: usize, names: AttributeNames) -> Result<Self> {
        if floats_per_vertex < Vertex2::FLOATS {
            engine_bail!(@LayoutMismatch, "galaxy_vid::QuadGeometry",
                "vertices need at least {} floats, got {}", Vertex2::FLOATS, floats_per_vertex);
        }

        let stride = (floats_per_vertex * std::mem::size_of::<f32>()) as u32;
        let layout = VertexLayout::new(vec![
            VertexAttribute { name: names.position, format: BufferFormat::R32G32_SFLOAT, stride, offset: 0 },
            VertexAttribute { name: names.uv, format: BufferFormat::R32G32_SFLOAT, stride, offset: 8 },
        ]);

        Ok(Self {
            packed: PackedGeometry::new(SlotShape::Quad, floats_per_vertex, layout)?,
        })
    }

    pub fn id(&self) -> ResourceId {
        self.packed.id()
    }

    pub fn packed(&self) -> &PackedGeometry {
        &self.packed
    }

    pub fn packed_mut(&mut self) -> &mut PackedGeometry {
        &mut self.packed
    }

    /// Live quads
    pub fn len(&self) -> u32 {
        self.packed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packed.is_empty()
    }

    pub fn upload_count_on(&self, context: ContextId) -> Option<u64> {
        self.packed.upload_count_on(context)
    }

    pub fn add_quad2(&mut self, a: Vertex2, b: Vertex2, c: Vertex2, d: Vertex2) -> u32 {
        let index = self.packed.allocate();
        self.write(index, [a, b, c, d]);
        index
    }

    pub fn set_quad2(&mut self, index: u32, a: Vertex2, b: Vertex2, c: Vertex2, d: Vertex2) -> Result<()> {
        self.packed.check_index(index)?;
        self.write(index, [a, b, c, d]);
        Ok(())
    }

    pub fn del_quad2(&mut self, index: u32) -> Result<()> {
        self.packed.free(index)
    }

    pub fn clear(&mut self) {
        self.packed.clear();
    }

    /// Draw every quad with `program` on `ctx`
    ///
    /// # Errors
    ///
    /// `ResourceLimitExceeded` if the container holds more slots than
    /// `ctx.max_quads()`.
    pub fn draw(&mut self, ctx: &mut RenderContext, program: &Program) -> Result<()> {
        self.packed.draw(ctx, program)
    }

    fn write(&mut self, index: u32, vertices: [Vertex2; 4]) {
        for (i, vertex) in vertices.iter().enumerate() {
            vertex.write(self.packed.vertex_mut(index, i));
        }
    }
}

#[cfg(test)]
#[path = "quad_geometry_tests.rs"]
mod tests;
