/// Texture and Tileset - 2D images shared by any number of contexts

use std::cell::{Ref, RefCell};
use std::fmt;
use std::rc::Rc;
use crate::context::{ContextId, DeletionQueue, RenderContext};
use crate::error::Result;
use crate::graphics_device::{PixelFormat, TextureHandle, TextureUpload};
use crate::{engine_bail, engine_trace};
use super::cache::{PhysicalObjects, ResourceCache, ResourceId, UpdateFlags};

struct TextureObject(TextureHandle);

impl PhysicalObjects for TextureObject {
    fn retire(self, queue: &mut DeletionQueue) {
        queue.enqueue(self.0);
    }
}

/// CPU-side image of a texture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureImage {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub data: Vec<u8>,
}

impl TextureImage {
    /// Validate `data` against `width x height` and pick its format
    ///
    /// # Errors
    ///
    /// `InvalidDataSize` unless `data` holds exactly 3 (RGB) or 4 (RGBA) bytes
    /// per pixel.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        match PixelFormat::for_byte_len(width, height, data.len()) {
            Some(format) => Ok(Self { width, height, format, data }),
            None => engine_bail!(@InvalidDataSize, "galaxy_vid::Texture",
                "{} bytes is neither RGB nor RGBA for {}x{}", data.len(), width, height),
        }
    }

    fn upload(&self) -> TextureUpload {
        TextureUpload {
            width: self.width,
            height: self.height,
            format: self.format,
        }
    }
}

struct TextureInner {
    image: RefCell<TextureImage>,
    cache: ResourceCache<TextureObject>,
}

/// Shared 2D texture
///
/// Cloning a `Texture` shares the logical resource: every clone sees the same
/// image and the same per-context objects. The physical objects are released
/// when the last clone is dropped.
#[derive(Clone)]
pub struct Texture {
    inner: Rc<TextureInner>,
}

impl Texture {
    /// Create a texture from `width * height` RGB or RGBA pixels
    pub fn new(width: u32, height: u32, data: impl Into<Vec<u8>>) -> Result<Self> {
        let image = TextureImage::new(width, height, data.into())?;
        Ok(Self {
            inner: Rc::new(TextureInner {
                image: RefCell::new(image),
                cache: ResourceCache::new(),
            }),
        })
    }

    pub fn id(&self) -> ResourceId {
        self.inner.cache.id()
    }

    pub fn width(&self) -> u32 {
        self.inner.image.borrow().width
    }

    pub fn height(&self) -> u32 {
        self.inner.image.borrow().height
    }

    pub fn format(&self) -> PixelFormat {
        self.inner.image.borrow().format
    }

    /// Current CPU-side image
    pub fn image(&self) -> Ref<'_, TextureImage> {
        self.inner.image.borrow()
    }

    /// Replace the image
    ///
    /// Validated before anything changes; on success every context re-uploads
    /// at its next bind.
    pub fn set_data(&self, width: u32, height: u32, data: impl Into<Vec<u8>>) -> Result<()> {
        let image = TextureImage::new(width, height, data.into())?;
        *self.inner.image.borrow_mut() = image;
        self.inner.cache.invalidate(UpdateFlags::DATA);
        Ok(())
    }

    /// Bind to texture unit `unit` of `ctx`, uploading first if stale
    pub fn bind(&self, ctx: &mut RenderContext, unit: u32) -> Result<()> {
        let image = &self.inner.image;
        self.inner.cache.resolve(
            ctx,
            |device| Ok(TextureObject(device.create_texture()?)),
            |entry, ctx| {
                let handle = entry.objects().0;
                if entry.needs(UpdateFlags::DATA) {
                    let image = image.borrow();
                    ctx.device_mut().upload_texture(handle, image.upload(), &image.data)?;
                    ctx.record_upload(image.data.len());
                    entry.mark_synced(UpdateFlags::DATA);
                    engine_trace!("galaxy_vid::Texture", "uploaded {}x{} {:?} image",
                        image.width, image.height, image.format);
                }
                ctx.device_mut().bind_texture(unit, handle)
            },
        )
    }

    /// Physical texture created on `context`, if any
    pub fn handle_on(&self, context: ContextId) -> Option<TextureHandle> {
        self.inner.cache.with_entry(context, |entry| entry.objects().0)
    }

    /// Whether two handles share the same logical texture
    pub fn ptr_eq(&self, other: &Texture) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Texture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let image = self.inner.image.borrow();
        f.debug_struct("Texture")
            .field("id", &self.id())
            .field("width", &image.width)
            .field("height", &image.height)
            .field("format", &image.format)
            .finish()
    }
}

// ============================================================================
// Tileset
// ============================================================================

/// Tile layout of a `Tileset`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TilesetDesc {
    /// Tile width in pixels, 0 for the full image width
    pub tile_width: u32,
    /// Tile height in pixels, 0 for the full image height
    pub tile_height: u32,
    /// Animation frames laid out side by side for each tile
    pub num_frames: u32,
    /// Steps each frame is shown for
    pub step: u32,
}

impl Default for TilesetDesc {
    fn default() -> Self {
        Self {
            tile_width: 0,
            tile_height: 0,
            num_frames: 1,
            step: 1,
        }
    }
}

/// Texture cut into equally sized tiles
///
/// Each row of tiles stores `num_frames` animation frames per tile, side by
/// side, so a row of a `w` pixel wide image holds
/// `w / (tile_width * num_frames)` tiles.
#[derive(Debug, Clone)]
pub struct Tileset {
    texture: Texture,
    tile_width: u32,
    tile_height: u32,
    num_frames: u32,
    step: u32,
}

impl Tileset {
    /// Create a tileset over a new texture
    ///
    /// # Errors
    ///
    /// `InvalidDataSize` for bad image data, `InvalidResource` for a zero
    /// frame count or step.
    pub fn new(width: u32, height: u32, data: impl Into<Vec<u8>>, desc: TilesetDesc) -> Result<Self> {
        Self::from_texture(Texture::new(width, height, data)?, desc)
    }

    pub fn from_texture(texture: Texture, desc: TilesetDesc) -> Result<Self> {
        if desc.num_frames == 0 || desc.step == 0 {
            engine_bail!(@InvalidResource, "galaxy_vid::Tileset",
                "num_frames ({}) and step ({}) must be at least 1", desc.num_frames, desc.step);
        }
        Ok(Self {
            tile_width: if desc.tile_width == 0 { texture.width() } else { desc.tile_width },
            tile_height: if desc.tile_height == 0 { texture.height() } else { desc.tile_height },
            num_frames: desc.num_frames,
            step: desc.step,
            texture,
        })
    }

    pub fn texture(&self) -> &Texture {
        &self.texture
    }

    pub fn tile_width(&self) -> u32 {
        self.tile_width
    }

    pub fn tile_height(&self) -> u32 {
        self.tile_height
    }

    pub fn num_frames(&self) -> u32 {
        self.num_frames
    }

    pub fn step(&self) -> u32 {
        self.step
    }

    /// Tiles per row
    pub fn num_tiles_x(&self) -> u32 {
        match self.tile_width * self.num_frames {
            0 => 0,
            span => self.texture.width() / span,
        }
    }

    /// Rows of tiles
    pub fn num_tiles_y(&self) -> u32 {
        match self.tile_height {
            0 => 0,
            tile_height => self.texture.height() / tile_height,
        }
    }

    pub fn num_tiles(&self) -> u32 {
        self.num_tiles_x() * self.num_tiles_y()
    }

    /// Bind the underlying texture
    pub fn bind(&self, ctx: &mut RenderContext, unit: u32) -> Result<()> {
        self.texture.bind(ctx, unit)
    }
}

#[cfg(test)]
#[path = "texture_tests.rs"]
mod tests;
