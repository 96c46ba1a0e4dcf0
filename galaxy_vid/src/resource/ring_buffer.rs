/// Rotating set of physical buffers behind one logical buffer
///
/// Each upload goes to the buffer after the one last drawn from, so data
/// written this frame never overwrites a buffer an earlier draw may still be
/// reading. With two buffers this is classic double buffering.

use crate::context::DeletionQueue;
use crate::error::Result;
use crate::graphics_device::{GraphicsDevice, BufferHandle, BufferKind, BufferUsage};
use crate::{engine_bail, engine_trace};
use super::cache::PhysicalObjects;

pub struct RingBuffer {
    kind: BufferKind,
    buffers: Vec<BufferHandle>,
    current: usize,
    upload_count: u64,
}

impl RingBuffer {
    /// Create `count` physical buffers of `kind`
    ///
    /// # Errors
    ///
    /// `InvalidResource` for a zero count, or the device error of the failed
    /// creation (buffers created before it are destroyed).
    pub fn new(device: &mut dyn GraphicsDevice, kind: BufferKind, count: usize) -> Result<Self> {
        if count == 0 {
            engine_bail!(@InvalidResource, "galaxy_vid::RingBuffer", "a ring needs at least one buffer");
        }

        let mut buffers = Vec::with_capacity(count);
        for _ in 0..count {
            match device.create_buffer(kind) {
                Ok(buffer) => buffers.push(buffer),
                Err(err) => {
                    for buffer in buffers {
                        device.destroy_buffer(buffer);
                    }
                    return Err(err);
                }
            }
        }

        Ok(Self {
            kind,
            buffers,
            // The first upload lands on buffer 0
            current: count - 1,
            upload_count: 0,
        })
    }

    /// Rotate to the next buffer and replace its contents with `data`
    ///
    /// The rotation only happens if the upload succeeds.
    pub fn upload(&mut self, device: &mut dyn GraphicsDevice, data: &[u8], usage: BufferUsage) -> Result<()> {
        let next = (self.current + 1) % self.buffers.len();
        device.upload_buffer(self.kind, self.buffers[next], data, usage)?;
        self.current = next;
        self.upload_count += 1;
        engine_trace!("galaxy_vid::RingBuffer", "upload #{} ({} bytes) to slot {}",
            self.upload_count, data.len(), next);
        Ok(())
    }

    /// Bind the buffer holding the latest upload
    pub fn bind(&self, device: &mut dyn GraphicsDevice) -> Result<()> {
        device.bind_buffer(self.kind, self.current())
    }

    /// Buffer holding the latest upload
    pub fn current(&self) -> BufferHandle {
        self.buffers[self.current]
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn kind(&self) -> BufferKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    pub fn handles(&self) -> &[BufferHandle] {
        &self.buffers
    }

    /// Successful uploads so far
    pub fn upload_count(&self) -> u64 {
        self.upload_count
    }
}

impl PhysicalObjects for RingBuffer {
    fn retire(self, queue: &mut DeletionQueue) {
        for buffer in self.buffers {
            queue.enqueue(buffer);
        }
    }
}

#[cfg(test)]
#[path = "ring_buffer_tests.rs"]
mod tests;
