/// TriangleGeometry - packed triangles, drawn as one triangle list
///
/// Quads are stored as two adjacent triangle slots `A B C` and `C D A`.

use crate::context::{ContextId, RenderContext};
use crate::error::Result;
use crate::graphics_device::{BufferFormat, VertexAttribute, VertexLayout};
use crate::engine_bail;
use super::cache::ResourceId;
use super::packed_geometry::{PackedGeometry, SlotShape};
use super::{Program, Vertex2, Vertex3};

/// Shader attribute names a packed container feeds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeNames {
    pub position: String,
    pub normal: String,
    pub uv: String,
}

impl Default for AttributeNames {
    fn default() -> Self {
        Self {
            position: "aPos".to_string(),
            normal: "aNorm".to_string(),
            uv: "aUV".to_string(),
        }
    }
}

pub struct TriangleGeometry {
    packed: PackedGeometry,
}

impl TriangleGeometry {
    /// Triangles of 8-float vertices fed to `aPos`, `aNorm` and `aUV`
    pub fn new() -> Result<Self> {
        Self::with_attributes(Vertex3::FLOATS, AttributeNames::default())
    }

    /// Triangles of `floats_per_vertex`-float vertices
    ///
    /// Position, normal and uv take the first 8 floats; the rest of each
    /// vertex is left zeroed for the caller to fill through `slot_mut`.
    ///
    /// # Errors
    ///
    /// `LayoutMismatch` if a vertex holds fewer than 8 floats.
    pub fn with_attributes(floats_per_vertex: usize, names: AttributeNames) -> Result<Self> {
        if floats_per_vertex < Vertex3::FLOATS {
            engine_bail!(@LayoutMismatch, "galaxy_vid::TriangleGeometry",
                "vertices need at least {} floats, got {}", Vertex3::FLOATS, floats_per_vertex);
        }

        let stride = (floats_per_vertex * std::mem::size_of::<f32>()) as u32;
        let layout = VertexLayout::new(vec![
            VertexAttribute { name: names.position, format: BufferFormat::R32G32B32_SFLOAT, stride, offset: 0 },
            VertexAttribute { name: names.normal, format: BufferFormat::R32G32B32_SFLOAT, stride, offset: 12 },
            VertexAttribute { name: names.uv, format: BufferFormat::R32G32_SFLOAT, stride, offset: 24 },
        ]);

        Ok(Self {
            packed: PackedGeometry::new(SlotShape::Triangle, floats_per_vertex, layout)?,
        })
    }

    pub fn id(&self) -> ResourceId {
        self.packed.id()
    }

    /// Underlying slot container
    pub fn packed(&self) -> &PackedGeometry {
        &self.packed
    }

    pub fn packed_mut(&mut self) -> &mut PackedGeometry {
        &mut self.packed
    }

    /// Live triangle slots (a quad counts two)
    pub fn len(&self) -> u32 {
        self.packed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packed.is_empty()
    }

    pub fn upload_count_on(&self, context: ContextId) -> Option<u64> {
        self.packed.upload_count_on(context)
    }

    // ===== TRIANGLES =====

    pub fn add_tri3(&mut self, a: Vertex3, b: Vertex3, c: Vertex3) -> u32 {
        let index = self.packed.allocate();
        self.write_tri(index, [a, b, c]);
        index
    }

    pub fn set_tri3(&mut self, index: u32, a: Vertex3, b: Vertex3, c: Vertex3) -> Result<()> {
        self.packed.check_index(index)?;
        self.write_tri(index, [a, b, c]);
        Ok(())
    }

    pub fn del_tri3(&mut self, index: u32) -> Result<()> {
        self.packed.free(index)
    }

    /// Add a triangle on the z = 0 plane
    pub fn add_tri2(&mut self, a: Vertex2, b: Vertex2, c: Vertex2) -> u32 {
        self.add_tri3(a.into(), b.into(), c.into())
    }

    pub fn set_tri2(&mut self, index: u32, a: Vertex2, b: Vertex2, c: Vertex2) -> Result<()> {
        self.set_tri3(index, a.into(), b.into(), c.into())
    }

    pub fn del_tri2(&mut self, index: u32) -> Result<()> {
        self.del_tri3(index)
    }

    // ===== QUADS =====

    /// Add quad `A B C D` as two adjacent slots and return the first
    pub fn add_quad3(&mut self, a: Vertex3, b: Vertex3, c: Vertex3, d: Vertex3) -> u32 {
        let index = self.packed.allocate_pair();
        self.write_quad(index, a, b, c, d);
        index
    }

    pub fn set_quad3(&mut self, index: u32, a: Vertex3, b: Vertex3, c: Vertex3, d: Vertex3) -> Result<()> {
        self.packed.check_index(index.saturating_add(1))?;
        self.write_quad(index, a, b, c, d);
        Ok(())
    }

    /// Free both slots of the quad at `index`, second slot first
    pub fn del_quad3(&mut self, index: u32) -> Result<()> {
        self.packed.check_index(index.saturating_add(1))?;
        self.packed.free(index + 1)?;
        self.packed.free(index)
    }

    pub fn add_quad2(&mut self, a: Vertex2, b: Vertex2, c: Vertex2, d: Vertex2) -> u32 {
        self.add_quad3(a.into(), b.into(), c.into(), d.into())
    }

    pub fn set_quad2(&mut self, index: u32, a: Vertex2, b: Vertex2, c: Vertex2, d: Vertex2) -> Result<()> {
        self.set_quad3(index, a.into(), b.into(), c.into(), d.into())
    }

    pub fn del_quad2(&mut self, index: u32) -> Result<()> {
        self.del_quad3(index)
    }

    pub fn clear(&mut self) {
        self.packed.clear();
    }

    /// Draw every slot with `program` on `ctx`
    pub fn draw(&mut self, ctx: &mut RenderContext, program: &Program) -> Result<()> {
        self.packed.draw(ctx, program)
    }

    fn write_tri(&mut self, index: u32, vertices: [Vertex3; 3]) {
        for (i, vertex) in vertices.iter().enumerate() {
            vertex.write(self.packed.vertex_mut(index, i));
        }
    }

    fn write_quad(&mut self, index: u32, a: Vertex3, b: Vertex3, c: Vertex3, d: Vertex3) {
        self.write_tri(index, [a, b, c]);
        self.write_tri(index + 1, [c, d, a]);
    }
}

#[cfg(test)]
#[path = "triangle_geometry_tests.rs"]
mod tests;
