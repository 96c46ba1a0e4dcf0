/// Headless graphics device (no GPU required)
///
/// Keeps every object in memory and records each call in a shared
/// [`DeviceLog`], so the call stream issued by contexts and resources can be
/// inspected after the device has been moved into a `RenderContext`.
///
/// Shaders "compile" by scanning their GLSL declarations: `attribute` (or
/// `in` in a vertex shader) lines become active attributes and `uniform`
/// lines become active uniforms, in declaration order. A source containing
/// `#error` fails to compile; a program whose shaders contain `#link_error`
/// fails to link.

use std::cell::RefCell;
use std::rc::Rc;
use rustc_hash::FxHashMap;
use crate::context::Viewport;
use crate::error::{Error, Result};
use crate::engine_trace;
use super::{
    GraphicsDevice, BufferHandle, TextureHandle, ShaderHandle, ProgramHandle, PhysicalHandle,
    BufferKind, BufferUsage, IndexType, PrimitiveTopology, VertexAttribute, RenderState,
    ShaderStage, ProgramReflection, AttributeInfo, UniformInfo, UniformType, UniformData,
    TextureUpload,
};

// ============================================================================
// Recorded calls
// ============================================================================

/// Owned copy of a uniform upload
#[derive(Debug, Clone, PartialEq)]
pub enum UniformRecord {
    Float { components: u32, values: Vec<f32> },
    Int { components: u32, values: Vec<i32> },
    Matrix { dim: u32, values: Vec<f32> },
    Sampler { unit: u32 },
}

impl From<UniformData<'_>> for UniformRecord {
    fn from(data: UniformData<'_>) -> Self {
        match data {
            UniformData::Float { components, values } => UniformRecord::Float { components, values: values.to_vec() },
            UniformData::Int { components, values } => UniformRecord::Int { components, values: values.to_vec() },
            UniformData::Matrix { dim, values } => UniformRecord::Matrix { dim, values: values.to_vec() },
            UniformData::Sampler { unit } => UniformRecord::Sampler { unit },
        }
    }
}

/// One call received by the device
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCall {
    CreateBuffer(BufferHandle, BufferKind),
    UploadBuffer { kind: BufferKind, buffer: BufferHandle, len: usize, usage: BufferUsage },
    BindBuffer(BufferKind, BufferHandle),
    DestroyBuffer(BufferHandle),
    CreateTexture(TextureHandle),
    UploadTexture(TextureHandle, TextureUpload),
    BindTexture { unit: u32, texture: TextureHandle },
    DestroyTexture(TextureHandle),
    CreateShader(ShaderHandle, ShaderStage),
    CompileShader(ShaderHandle),
    DestroyShader(ShaderHandle),
    CreateProgram(ProgramHandle),
    LinkProgram(ProgramHandle),
    UseProgram(ProgramHandle),
    DestroyProgram(ProgramHandle),
    SetUniform { location: i32, value: UniformRecord },
    EnableAttribute(u32),
    DisableAttribute(u32),
    AttributePointer { location: u32, name: String, offset: u32, stride: u32 },
    SetRenderState(RenderState),
    DrawArrays { topology: PrimitiveTopology, first: u32, count: u32 },
    DrawElements { topology: PrimitiveTopology, count: u32, index_type: IndexType, offset: u64 },
    SetViewport(Viewport),
    Clear([f32; 4]),
    Present,
    ReadPixels,
}

// ============================================================================
// Shared device state
// ============================================================================

/// Objects and call history of a `HeadlessGraphicsDevice`
#[derive(Debug, Default)]
pub struct DeviceLog {
    /// Every call, in order
    pub calls: Vec<DeviceCall>,
    next_name: u32,
    buffers: FxHashMap<BufferHandle, (BufferKind, Vec<u8>)>,
    textures: FxHashMap<TextureHandle, Option<(TextureUpload, Vec<u8>)>>,
    shaders: FxHashMap<ShaderHandle, (ShaderStage, Option<String>)>,
    programs: FxHashMap<ProgramHandle, (ShaderHandle, ShaderHandle)>,
    destroyed: Vec<PhysicalHandle>,
    bound_vertex: Option<BufferHandle>,
    bound_index: Option<BufferHandle>,
    clear_color: [f32; 4],
}

/// Shared handle to a device log
pub type SharedDeviceLog = Rc<RefCell<DeviceLog>>;

impl DeviceLog {
    fn next_name(&mut self) -> u32 {
        self.next_name += 1;
        self.next_name
    }

    /// Number of recorded calls matching `predicate`
    pub fn count(&self, predicate: impl Fn(&DeviceCall) -> bool) -> usize {
        self.calls.iter().filter(|call| predicate(call)).count()
    }

    /// Number of buffer uploads to `kind` buffers
    pub fn upload_count(&self, kind: BufferKind) -> usize {
        self.count(|call| matches!(call, DeviceCall::UploadBuffer { kind: k, .. } if *k == kind))
    }

    /// Number of draw calls (arrays and elements)
    pub fn draw_count(&self) -> usize {
        self.count(|call| matches!(call, DeviceCall::DrawArrays { .. } | DeviceCall::DrawElements { .. }))
    }

    /// Last draw call, if any
    pub fn last_draw(&self) -> Option<&DeviceCall> {
        self.calls
            .iter()
            .rev()
            .find(|call| matches!(call, DeviceCall::DrawArrays { .. } | DeviceCall::DrawElements { .. }))
    }

    /// Forget the call history, keeping the objects
    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Whether `handle` names a live object
    pub fn is_live(&self, handle: PhysicalHandle) -> bool {
        match handle {
            PhysicalHandle::Buffer(b) => self.buffers.contains_key(&b),
            PhysicalHandle::Texture(t) => self.textures.contains_key(&t),
            PhysicalHandle::Shader(s) => self.shaders.contains_key(&s),
            PhysicalHandle::Program(p) => self.programs.contains_key(&p),
        }
    }

    /// Live buffer objects
    pub fn live_buffers(&self) -> Vec<BufferHandle> {
        let mut buffers: Vec<BufferHandle> = self.buffers.keys().copied().collect();
        buffers.sort();
        buffers
    }

    /// Live objects of every kind
    pub fn live_object_count(&self) -> usize {
        self.buffers.len() + self.textures.len() + self.shaders.len() + self.programs.len()
    }

    /// Destroyed handles, in destruction order
    pub fn destroyed(&self) -> &[PhysicalHandle] {
        &self.destroyed
    }

    /// Contents of a live buffer
    pub fn buffer_data(&self, buffer: BufferHandle) -> Option<&[u8]> {
        self.buffers.get(&buffer).map(|(_, data)| data.as_slice())
    }

    /// Contents of a live buffer read as floats
    pub fn buffer_floats(&self, buffer: BufferHandle) -> Option<Vec<f32>> {
        self.buffer_data(buffer).map(|data| {
            data.chunks_exact(4).map(bytemuck::pod_read_unaligned::<f32>).collect()
        })
    }

    /// Buffer currently bound to the vertex target
    pub fn bound_vertex_buffer(&self) -> Option<BufferHandle> {
        self.bound_vertex
    }

    /// Buffer currently bound to the index target
    pub fn bound_index_buffer(&self) -> Option<BufferHandle> {
        self.bound_index
    }

    /// Image last uploaded to a live texture
    pub fn texture_image(&self, texture: TextureHandle) -> Option<&(TextureUpload, Vec<u8>)> {
        self.textures.get(&texture).and_then(|image| image.as_ref())
    }

    fn destroy(&mut self, handle: PhysicalHandle) {
        let removed = match handle {
            PhysicalHandle::Buffer(b) => {
                if self.bound_vertex == Some(b) {
                    self.bound_vertex = None;
                }
                if self.bound_index == Some(b) {
                    self.bound_index = None;
                }
                self.buffers.remove(&b).is_some()
            }
            PhysicalHandle::Texture(t) => self.textures.remove(&t).is_some(),
            PhysicalHandle::Shader(s) => self.shaders.remove(&s).is_some(),
            PhysicalHandle::Program(p) => self.programs.remove(&p).is_some(),
        };
        if removed {
            self.destroyed.push(handle);
        }
    }
}

// ============================================================================
// GLSL declaration scanning
// ============================================================================

const PRECISION_QUALIFIERS: [&str; 3] = ["lowp", "mediump", "highp"];

/// `(type, name, array size)` of every statement starting with `keyword`
fn declarations<'a>(source: &'a str, keyword: &str) -> Vec<(&'a str, &'a str, u32)> {
    let mut found = Vec::new();
    for statement in source.split(';') {
        let mut tokens = statement
            .split_whitespace()
            .filter(|token| !PRECISION_QUALIFIERS.contains(token));
        if tokens.next() != Some(keyword) {
            continue;
        }
        let (Some(ty), Some(declarator)) = (tokens.next(), tokens.next()) else {
            continue;
        };
        let (name, size) = match declarator.split_once('[') {
            Some((name, rest)) => (name, rest.trim_end_matches(']').parse().unwrap_or(1)),
            None => (declarator, 1),
        };
        found.push((ty, name, size));
    }
    found
}

fn reflect(vertex: &str, fragment: &str) -> ProgramReflection {
    let mut reflection = ProgramReflection::default();

    let attributes = declarations(vertex, "attribute")
        .into_iter()
        .chain(declarations(vertex, "in"));
    for (location, (_, name, size)) in attributes.enumerate() {
        reflection.attributes.push(AttributeInfo {
            name: name.to_string(),
            location: location as u32,
            size,
        });
    }

    let uniforms = declarations(vertex, "uniform")
        .into_iter()
        .chain(declarations(fragment, "uniform"));
    for (ty, name, size) in uniforms {
        let Some(ty) = UniformType::from_glsl(ty) else {
            continue;
        };
        if reflection.uniform(name).is_some() {
            continue;
        }
        let location = reflection.uniforms.len() as i32;
        reflection.uniforms.push(UniformInfo {
            name: name.to_string(),
            ty,
            size,
            location,
            texture_unit: None,
        });
    }

    reflection
}

// ============================================================================
// HeadlessGraphicsDevice
// ============================================================================

/// In-memory `GraphicsDevice`
pub struct HeadlessGraphicsDevice {
    log: SharedDeviceLog,
}

impl HeadlessGraphicsDevice {
    pub fn new() -> Self {
        Self {
            log: Rc::new(RefCell::new(DeviceLog::default())),
        }
    }

    /// Shared view of the device state, valid after the device is moved away
    pub fn log(&self) -> SharedDeviceLog {
        self.log.clone()
    }

    fn record(&self, call: DeviceCall) {
        self.log.borrow_mut().calls.push(call);
    }
}

impl Default for HeadlessGraphicsDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphicsDevice for HeadlessGraphicsDevice {
    fn create_buffer(&mut self, kind: BufferKind) -> Result<BufferHandle> {
        let mut log = self.log.borrow_mut();
        let buffer = BufferHandle(log.next_name());
        log.buffers.insert(buffer, (kind, Vec::new()));
        log.calls.push(DeviceCall::CreateBuffer(buffer, kind));
        Ok(buffer)
    }

    fn upload_buffer(&mut self, kind: BufferKind, buffer: BufferHandle, data: &[u8], usage: BufferUsage) -> Result<()> {
        let mut log = self.log.borrow_mut();
        match log.buffers.get_mut(&buffer) {
            Some((_, contents)) => *contents = data.to_vec(),
            None => return Err(Error::BackendError(format!("upload to unknown buffer {:?}", buffer))),
        }
        match kind {
            BufferKind::Vertex => log.bound_vertex = Some(buffer),
            BufferKind::Index => log.bound_index = Some(buffer),
        }
        log.calls.push(DeviceCall::UploadBuffer { kind, buffer, len: data.len(), usage });
        engine_trace!("galaxy_vid::HeadlessGraphicsDevice", "upload {} bytes to {:?}", data.len(), buffer);
        Ok(())
    }

    fn bind_buffer(&mut self, kind: BufferKind, buffer: BufferHandle) -> Result<()> {
        let mut log = self.log.borrow_mut();
        if !log.buffers.contains_key(&buffer) {
            return Err(Error::BackendError(format!("bind of unknown buffer {:?}", buffer)));
        }
        match kind {
            BufferKind::Vertex => log.bound_vertex = Some(buffer),
            BufferKind::Index => log.bound_index = Some(buffer),
        }
        log.calls.push(DeviceCall::BindBuffer(kind, buffer));
        Ok(())
    }

    fn destroy_buffer(&mut self, buffer: BufferHandle) {
        let mut log = self.log.borrow_mut();
        log.destroy(PhysicalHandle::Buffer(buffer));
        log.calls.push(DeviceCall::DestroyBuffer(buffer));
    }

    fn create_texture(&mut self) -> Result<TextureHandle> {
        let mut log = self.log.borrow_mut();
        let texture = TextureHandle(log.next_name());
        log.textures.insert(texture, None);
        log.calls.push(DeviceCall::CreateTexture(texture));
        Ok(texture)
    }

    fn upload_texture(&mut self, texture: TextureHandle, upload: TextureUpload, data: &[u8]) -> Result<()> {
        let mut log = self.log.borrow_mut();
        match log.textures.get_mut(&texture) {
            Some(image) => *image = Some((upload, data.to_vec())),
            None => return Err(Error::BackendError(format!("upload to unknown texture {:?}", texture))),
        }
        log.calls.push(DeviceCall::UploadTexture(texture, upload));
        Ok(())
    }

    fn bind_texture(&mut self, unit: u32, texture: TextureHandle) -> Result<()> {
        self.record(DeviceCall::BindTexture { unit, texture });
        Ok(())
    }

    fn destroy_texture(&mut self, texture: TextureHandle) {
        let mut log = self.log.borrow_mut();
        log.destroy(PhysicalHandle::Texture(texture));
        log.calls.push(DeviceCall::DestroyTexture(texture));
    }

    fn create_shader(&mut self, stage: ShaderStage) -> Result<ShaderHandle> {
        let mut log = self.log.borrow_mut();
        let shader = ShaderHandle(log.next_name());
        log.shaders.insert(shader, (stage, None));
        log.calls.push(DeviceCall::CreateShader(shader, stage));
        Ok(shader)
    }

    fn compile_shader(&mut self, shader: ShaderHandle, source: &str) -> Result<()> {
        let mut log = self.log.borrow_mut();
        log.calls.push(DeviceCall::CompileShader(shader));
        let Some((_, compiled)) = log.shaders.get_mut(&shader) else {
            return Err(Error::BackendError(format!("compile of unknown shader {:?}", shader)));
        };
        *compiled = None;
        if let Some(line) = source.lines().position(|line| line.trim_start().starts_with("#error")) {
            return Err(Error::CompileFailure(format!("0:{}: '#error' directive", line + 1)));
        }
        *compiled = Some(source.to_string());
        Ok(())
    }

    fn destroy_shader(&mut self, shader: ShaderHandle) {
        let mut log = self.log.borrow_mut();
        log.destroy(PhysicalHandle::Shader(shader));
        log.calls.push(DeviceCall::DestroyShader(shader));
    }

    fn create_program(&mut self, vertex: ShaderHandle, fragment: ShaderHandle) -> Result<ProgramHandle> {
        let mut log = self.log.borrow_mut();
        let program = ProgramHandle(log.next_name());
        log.programs.insert(program, (vertex, fragment));
        log.calls.push(DeviceCall::CreateProgram(program));
        Ok(program)
    }

    fn link_program(&mut self, program: ProgramHandle) -> Result<ProgramReflection> {
        let mut log = self.log.borrow_mut();
        log.calls.push(DeviceCall::LinkProgram(program));
        let Some(&(vertex, fragment)) = log.programs.get(&program) else {
            return Err(Error::BackendError(format!("link of unknown program {:?}", program)));
        };
        let source = |shader: ShaderHandle| log.shaders.get(&shader).and_then(|(_, source)| source.clone());
        let (Some(vertex_source), Some(fragment_source)) = (source(vertex), source(fragment)) else {
            return Err(Error::LinkFailure("attached shaders are not compiled".to_string()));
        };
        if vertex_source.contains("#link_error") || fragment_source.contains("#link_error") {
            return Err(Error::LinkFailure("varying mismatch between stages".to_string()));
        }
        Ok(reflect(&vertex_source, &fragment_source))
    }

    fn use_program(&mut self, program: ProgramHandle) -> Result<()> {
        self.record(DeviceCall::UseProgram(program));
        Ok(())
    }

    fn destroy_program(&mut self, program: ProgramHandle) {
        let mut log = self.log.borrow_mut();
        log.destroy(PhysicalHandle::Program(program));
        log.calls.push(DeviceCall::DestroyProgram(program));
    }

    fn set_uniform(&mut self, location: i32, data: UniformData<'_>) -> Result<()> {
        self.record(DeviceCall::SetUniform { location, value: data.into() });
        Ok(())
    }

    fn enable_vertex_attribute(&mut self, location: u32) -> Result<()> {
        self.record(DeviceCall::EnableAttribute(location));
        Ok(())
    }

    fn disable_vertex_attribute(&mut self, location: u32) -> Result<()> {
        self.record(DeviceCall::DisableAttribute(location));
        Ok(())
    }

    fn vertex_attribute_pointer(&mut self, location: u32, attribute: &VertexAttribute) -> Result<()> {
        self.record(DeviceCall::AttributePointer {
            location,
            name: attribute.name.clone(),
            offset: attribute.offset,
            stride: attribute.stride,
        });
        Ok(())
    }

    fn set_render_state(&mut self, state: &RenderState) -> Result<()> {
        self.record(DeviceCall::SetRenderState(*state));
        Ok(())
    }

    fn draw_arrays(&mut self, topology: PrimitiveTopology, first: u32, count: u32) -> Result<()> {
        let mut log = self.log.borrow_mut();
        if log.bound_vertex.is_none() {
            return Err(Error::BackendError("draw_arrays without a vertex buffer".to_string()));
        }
        log.calls.push(DeviceCall::DrawArrays { topology, first, count });
        Ok(())
    }

    fn draw_elements(&mut self, topology: PrimitiveTopology, count: u32, index_type: IndexType, offset: u64) -> Result<()> {
        let mut log = self.log.borrow_mut();
        let available = log
            .bound_index
            .and_then(|buffer| log.buffers.get(&buffer))
            .map(|(_, data)| data.len() as u64);
        let needed = offset + count as u64 * index_type.size_bytes() as u64;
        match available {
            None => return Err(Error::BackendError("draw_elements without an index buffer".to_string())),
            Some(len) if len < needed => {
                return Err(Error::BackendError(format!("draw_elements reads {} bytes of {}", needed, len)))
            }
            Some(_) => {}
        }
        log.calls.push(DeviceCall::DrawElements { topology, count, index_type, offset });
        Ok(())
    }

    fn set_viewport(&mut self, viewport: Viewport) -> Result<()> {
        self.record(DeviceCall::SetViewport(viewport));
        Ok(())
    }

    fn clear(&mut self, color: [f32; 4]) -> Result<()> {
        let mut log = self.log.borrow_mut();
        log.clear_color = color;
        log.calls.push(DeviceCall::Clear(color));
        Ok(())
    }

    fn present(&mut self) -> Result<()> {
        self.record(DeviceCall::Present);
        Ok(())
    }

    fn read_pixels(&mut self, viewport: Viewport) -> Result<Vec<u8>> {
        let mut log = self.log.borrow_mut();
        log.calls.push(DeviceCall::ReadPixels);
        let rgb: Vec<u8> = log.clear_color[..3]
            .iter()
            .map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8)
            .collect();
        let pixels = viewport.width as usize * viewport.height as usize;
        Ok(rgb.iter().copied().cycle().take(pixels * 3).collect())
    }
}

#[cfg(test)]
#[path = "headless_graphics_device_tests.rs"]
mod tests;
