/// Deferred destruction of physical objects
///
/// Handles released by logical resources are queued here and only destroyed
/// by `sweep`, which a `RenderContext` runs after each frame. A handle freed
/// while a draw that uses it is still in flight therefore stays valid until
/// the frame is over.

use crate::graphics_device::{
    GraphicsDevice, PhysicalHandle, BufferHandle, TextureHandle, ShaderHandle, ProgramHandle,
};

/// Objects destroyed by one sweep, by kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepStats {
    pub programs: usize,
    pub shaders: usize,
    pub textures: usize,
    pub buffers: usize,
}

impl SweepStats {
    pub fn total(&self) -> usize {
        self.programs + self.shaders + self.textures + self.buffers
    }
}

/// Handles waiting for destruction on one context
#[derive(Debug, Default)]
pub struct DeletionQueue {
    programs: Vec<ProgramHandle>,
    shaders: Vec<ShaderHandle>,
    textures: Vec<TextureHandle>,
    buffers: Vec<BufferHandle>,
}

impl DeletionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `handle` for destruction at the next sweep
    pub fn enqueue(&mut self, handle: impl Into<PhysicalHandle>) {
        match handle.into() {
            PhysicalHandle::Program(p) => self.programs.push(p),
            PhysicalHandle::Shader(s) => self.shaders.push(s),
            PhysicalHandle::Texture(t) => self.textures.push(t),
            PhysicalHandle::Buffer(b) => self.buffers.push(b),
        }
    }

    /// Whether `handle` is waiting for destruction
    pub fn contains(&self, handle: impl Into<PhysicalHandle>) -> bool {
        match handle.into() {
            PhysicalHandle::Program(p) => self.programs.contains(&p),
            PhysicalHandle::Shader(s) => self.shaders.contains(&s),
            PhysicalHandle::Texture(t) => self.textures.contains(&t),
            PhysicalHandle::Buffer(b) => self.buffers.contains(&b),
        }
    }

    pub fn len(&self) -> usize {
        self.programs.len() + self.shaders.len() + self.textures.len() + self.buffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Destroy every queued object and empty the queue
    ///
    /// Programs go first so their shaders are no longer attached when the
    /// shaders are destroyed.
    pub fn sweep(&mut self, device: &mut dyn GraphicsDevice) -> SweepStats {
        let stats = SweepStats {
            programs: self.programs.len(),
            shaders: self.shaders.len(),
            textures: self.textures.len(),
            buffers: self.buffers.len(),
        };

        for program in self.programs.drain(..) {
            device.destroy_program(program);
        }
        for shader in self.shaders.drain(..) {
            device.destroy_shader(shader);
        }
        for texture in self.textures.drain(..) {
            device.destroy_texture(texture);
        }
        for buffer in self.buffers.drain(..) {
            device.destroy_buffer(buffer);
        }

        stats
    }
}

#[cfg(test)]
#[path = "deletion_queue_tests.rs"]
mod tests;
