/// Buffer kinds, usage hints and data formats

/// Binding target of a buffer object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferKind {
    /// Vertex attribute data
    Vertex,
    /// Element (index) data
    Index,
}

/// Upload frequency hint passed with every buffer upload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferUsage {
    /// Written once, drawn many times
    Static,
    /// Rewritten frequently (packed geometry containers)
    Dynamic,
}

/// Data format of one vertex attribute
///
/// Defines the component type and count of an attribute inside an
/// interleaved vertex buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(non_camel_case_types)]
pub enum BufferFormat {
    // Float formats
    R32_SFLOAT,
    R32G32_SFLOAT,
    R32G32B32_SFLOAT,
    R32G32B32A32_SFLOAT,

    // Integer formats
    R32_SINT,
    R32G32_SINT,
    R32G32B32_SINT,
    R32G32B32A32_SINT,

    // Short formats
    R16G16_SINT,
    R16G16B16A16_SINT,

    // Byte formats (normalized colors)
    R8G8B8A8_UNORM,
}

/// Scalar type of the components of a `BufferFormat`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentType {
    F32,
    I32,
    I16,
    U8,
}

impl BufferFormat {
    /// Returns size in bytes for this format
    pub fn size_bytes(&self) -> u32 {
        self.component_count() * match self.component_type() {
            ComponentType::F32 | ComponentType::I32 => 4,
            ComponentType::I16 => 2,
            ComponentType::U8 => 1,
        }
    }

    /// Number of components (1 to 4)
    pub fn component_count(&self) -> u32 {
        match self {
            BufferFormat::R32_SFLOAT | BufferFormat::R32_SINT => 1,
            BufferFormat::R32G32_SFLOAT | BufferFormat::R32G32_SINT | BufferFormat::R16G16_SINT => 2,
            BufferFormat::R32G32B32_SFLOAT | BufferFormat::R32G32B32_SINT => 3,
            BufferFormat::R32G32B32A32_SFLOAT
            | BufferFormat::R32G32B32A32_SINT
            | BufferFormat::R16G16B16A16_SINT
            | BufferFormat::R8G8B8A8_UNORM => 4,
        }
    }

    /// Component scalar type
    pub fn component_type(&self) -> ComponentType {
        match self {
            BufferFormat::R32_SFLOAT
            | BufferFormat::R32G32_SFLOAT
            | BufferFormat::R32G32B32_SFLOAT
            | BufferFormat::R32G32B32A32_SFLOAT => ComponentType::F32,
            BufferFormat::R32_SINT
            | BufferFormat::R32G32_SINT
            | BufferFormat::R32G32B32_SINT
            | BufferFormat::R32G32B32A32_SINT => ComponentType::I32,
            BufferFormat::R16G16_SINT | BufferFormat::R16G16B16A16_SINT => ComponentType::I16,
            BufferFormat::R8G8B8A8_UNORM => ComponentType::U8,
        }
    }

    /// Whether integer components are normalized to [0, 1] when read
    pub fn is_normalized(&self) -> bool {
        matches!(self, BufferFormat::R8G8B8A8_UNORM)
    }

    /// Float format with `components` components, if any
    pub fn float(components: u32) -> Option<BufferFormat> {
        match components {
            1 => Some(BufferFormat::R32_SFLOAT),
            2 => Some(BufferFormat::R32G32_SFLOAT),
            3 => Some(BufferFormat::R32G32B32_SFLOAT),
            4 => Some(BufferFormat::R32G32B32A32_SFLOAT),
            _ => None,
        }
    }
}

/// Index buffer element type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexType {
    /// 8-bit indices (max 255 vertices)
    U8,
    /// 16-bit indices (max 65535 vertices)
    U16,
}

impl IndexType {
    /// Size in bytes of one index element
    pub fn size_bytes(&self) -> u32 {
        match self {
            IndexType::U8 => 1,
            IndexType::U16 => 2,
        }
    }
}

#[cfg(test)]
#[path = "buffer_tests.rs"]
mod tests;
