/// Opaque graphics object identifiers
///
/// Handles are plain `Copy` names handed out by a `GraphicsDevice`. They carry
/// no ownership: whoever holds a handle must queue it for destruction on the
/// context that created it.

/// Buffer object identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferHandle(pub u32);

/// Texture object identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureHandle(pub u32);

/// Shader object identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShaderHandle(pub u32);

/// Program object identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProgramHandle(pub u32);

/// Any physical handle, tagged with its kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhysicalHandle {
    Buffer(BufferHandle),
    Texture(TextureHandle),
    Shader(ShaderHandle),
    Program(ProgramHandle),
}

impl From<BufferHandle> for PhysicalHandle {
    fn from(handle: BufferHandle) -> Self {
        PhysicalHandle::Buffer(handle)
    }
}

impl From<TextureHandle> for PhysicalHandle {
    fn from(handle: TextureHandle) -> Self {
        PhysicalHandle::Texture(handle)
    }
}

impl From<ShaderHandle> for PhysicalHandle {
    fn from(handle: ShaderHandle) -> Self {
        PhysicalHandle::Shader(handle)
    }
}

impl From<ProgramHandle> for PhysicalHandle {
    fn from(handle: ProgramHandle) -> Self {
        PhysicalHandle::Program(handle)
    }
}
