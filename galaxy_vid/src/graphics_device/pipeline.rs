/// Vertex input description and fixed-function render state

use crate::error::Result;
use crate::engine_bail;
use super::BufferFormat;

// ===== TOPOLOGY =====

/// Primitive topology
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveTopology {
    /// Triangle list
    TriangleList,
    /// Triangle strip
    TriangleStrip,
    /// Triangle fan
    TriangleFan,
    /// Line list
    LineList,
    /// Line strip
    LineStrip,
    /// Point list
    PointList,
}

// ===== VERTEX LAYOUT =====

/// One named attribute inside an interleaved vertex buffer
///
/// The name is matched against the active attributes a program reports after
/// linking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexAttribute {
    /// Attribute name in the shader (e.g. "aPos")
    pub name: String,
    /// Component type and count
    pub format: BufferFormat,
    /// Distance in bytes between two consecutive vertices
    pub stride: u32,
    /// Offset in bytes of this attribute inside a vertex
    pub offset: u32,
}

/// Named vertex attributes sharing one buffer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VertexLayout {
    pub attributes: Vec<VertexAttribute>,
}

impl VertexLayout {
    pub fn new(attributes: Vec<VertexAttribute>) -> Self {
        Self { attributes }
    }

    /// Tightly packed layout: offsets follow declaration order and every
    /// attribute shares the total stride
    pub fn interleaved(attributes: &[(&str, BufferFormat)]) -> Self {
        let stride: u32 = attributes.iter().map(|(_, format)| format.size_bytes()).sum();
        let mut offset = 0;
        let attributes = attributes
            .iter()
            .map(|(name, format)| {
                let attribute = VertexAttribute {
                    name: name.to_string(),
                    format: *format,
                    stride,
                    offset,
                };
                offset += format.size_bytes();
                attribute
            })
            .collect();
        Self { attributes }
    }

    /// Find an attribute by shader name
    pub fn attribute(&self, name: &str) -> Option<&VertexAttribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Validate the layout and return its common stride
    ///
    /// # Errors
    ///
    /// - `InvalidResource` if the layout is empty or a name is repeated
    /// - `LayoutMismatch` if two attributes disagree on the stride, or an
    ///   attribute does not fit inside the stride
    pub fn stride(&self) -> Result<u32> {
        let first = match self.attributes.first() {
            Some(first) => first,
            None => engine_bail!(@InvalidResource, "galaxy_vid::VertexLayout",
                "vertex layout declares no attributes"),
        };

        for (i, attribute) in self.attributes.iter().enumerate() {
            if attribute.stride != first.stride {
                engine_bail!(@LayoutMismatch, "galaxy_vid::VertexLayout",
                    "attribute '{}' has stride {} but '{}' has stride {}",
                    attribute.name, attribute.stride, first.name, first.stride);
            }
            if attribute.offset + attribute.format.size_bytes() > attribute.stride {
                engine_bail!(@LayoutMismatch, "galaxy_vid::VertexLayout",
                    "attribute '{}' ({} bytes at offset {}) overflows stride {}",
                    attribute.name, attribute.format.size_bytes(), attribute.offset, attribute.stride);
            }
            if self.attributes[..i].iter().any(|a| a.name == attribute.name) {
                engine_bail!(@InvalidResource, "galaxy_vid::VertexLayout",
                    "attribute '{}' declared twice", attribute.name);
            }
        }

        Ok(first.stride)
    }
}

// ===== RENDER STATE =====

/// Blend factor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendFactor {
    Zero,
    One,
    SrcColor,
    OneMinusSrcColor,
    DstColor,
    OneMinusDstColor,
    SrcAlpha,
    OneMinusSrcAlpha,
    DstAlpha,
    OneMinusDstAlpha,
    SrcAlphaSaturate,
}

/// Fixed-function state applied when a program is bound
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderState {
    /// Only write fragments passing the depth test
    pub depth_test: bool,
    /// Write depth values
    pub depth_write: bool,
    /// Source blend factor
    pub blend_src: BlendFactor,
    /// Destination blend factor
    pub blend_dst: BlendFactor,
}

impl RenderState {
    /// Blending is off for the One/Zero factor pair (plain replace)
    pub fn blend_enabled(&self) -> bool {
        !(self.blend_src == BlendFactor::One && self.blend_dst == BlendFactor::Zero)
    }
}

impl Default for RenderState {
    fn default() -> Self {
        Self {
            depth_test: false,
            depth_write: false,
            blend_src: BlendFactor::One,
            blend_dst: BlendFactor::Zero,
        }
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
