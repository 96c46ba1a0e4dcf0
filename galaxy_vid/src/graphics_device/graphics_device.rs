/// GraphicsDevice trait - the native graphics API seen by the resource layer

use crate::context::Viewport;
use crate::error::Result;
use super::{
    BufferHandle, TextureHandle, ShaderHandle, ProgramHandle,
    BufferKind, BufferUsage, IndexType, PrimitiveTopology, VertexAttribute,
    RenderState, ShaderStage, ProgramReflection, UniformData, TextureUpload,
};

/// Graphics API surface driven by one `RenderContext`
///
/// A device belongs to exactly one context and is only called from the code
/// driving that context, so the trait carries no `Send`/`Sync` bound. The
/// resource layer issues calls in the shapes create, upload, bind (repeat
/// upload on rotation), destroy; handles never outlive the device.
pub trait GraphicsDevice {
    // ===== BUFFERS =====

    /// Create an empty buffer object
    fn create_buffer(&mut self, kind: BufferKind) -> Result<BufferHandle>;

    /// Bind `buffer` and replace its whole contents with `data`
    fn upload_buffer(&mut self, kind: BufferKind, buffer: BufferHandle, data: &[u8], usage: BufferUsage) -> Result<()>;

    /// Bind `buffer` to the `kind` target
    fn bind_buffer(&mut self, kind: BufferKind, buffer: BufferHandle) -> Result<()>;

    fn destroy_buffer(&mut self, buffer: BufferHandle);

    // ===== TEXTURES =====

    fn create_texture(&mut self) -> Result<TextureHandle>;

    /// Replace the image of `texture`
    fn upload_texture(&mut self, texture: TextureHandle, upload: TextureUpload, data: &[u8]) -> Result<()>;

    /// Bind `texture` to texture unit `unit`
    fn bind_texture(&mut self, unit: u32, texture: TextureHandle) -> Result<()>;

    fn destroy_texture(&mut self, texture: TextureHandle);

    // ===== SHADERS AND PROGRAMS =====

    fn create_shader(&mut self, stage: ShaderStage) -> Result<ShaderHandle>;

    /// Set the source of `shader` and compile it
    ///
    /// Returns `Error::CompileFailure` carrying the driver log on rejection.
    fn compile_shader(&mut self, shader: ShaderHandle, source: &str) -> Result<()>;

    fn destroy_shader(&mut self, shader: ShaderHandle);

    /// Create a program with both shaders attached
    fn create_program(&mut self, vertex: ShaderHandle, fragment: ShaderHandle) -> Result<ProgramHandle>;

    /// Link `program` and report its active attributes and uniforms
    ///
    /// Returns `Error::LinkFailure` carrying the driver log on rejection.
    /// Texture units are left unassigned in the returned reflection.
    fn link_program(&mut self, program: ProgramHandle) -> Result<ProgramReflection>;

    fn use_program(&mut self, program: ProgramHandle) -> Result<()>;

    fn destroy_program(&mut self, program: ProgramHandle);

    /// Upload a uniform of the program in use
    fn set_uniform(&mut self, location: i32, data: UniformData<'_>) -> Result<()>;

    // ===== VERTEX INPUT =====

    fn enable_vertex_attribute(&mut self, location: u32) -> Result<()>;

    fn disable_vertex_attribute(&mut self, location: u32) -> Result<()>;

    /// Point `location` at `attribute` inside the bound vertex buffer
    fn vertex_attribute_pointer(&mut self, location: u32, attribute: &VertexAttribute) -> Result<()>;

    // ===== DRAWING =====

    fn set_render_state(&mut self, state: &RenderState) -> Result<()>;

    /// Draw `count` vertices starting at `first`
    fn draw_arrays(&mut self, topology: PrimitiveTopology, first: u32, count: u32) -> Result<()>;

    /// Draw `count` indices of the bound index buffer starting at byte `offset`
    fn draw_elements(&mut self, topology: PrimitiveTopology, count: u32, index_type: IndexType, offset: u64) -> Result<()>;

    // ===== FRAME =====

    fn set_viewport(&mut self, viewport: Viewport) -> Result<()>;

    /// Clear color and depth
    fn clear(&mut self, color: [f32; 4]) -> Result<()>;

    /// Present the finished frame
    fn present(&mut self) -> Result<()>;

    /// Read back `viewport` as tightly packed RGB bytes, bottom row first
    fn read_pixels(&mut self, viewport: Viewport) -> Result<Vec<u8>>;
}
