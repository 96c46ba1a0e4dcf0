/// Texture image formats

/// Pixel format of an uploaded 8-bit image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// 3 bytes per pixel
    Rgb8,
    /// 4 bytes per pixel
    Rgba8,
}

impl PixelFormat {
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            PixelFormat::Rgb8 => 3,
            PixelFormat::Rgba8 => 4,
        }
    }

    /// Format whose `width * height` image occupies exactly `len` bytes
    pub fn for_byte_len(width: u32, height: u32, len: usize) -> Option<PixelFormat> {
        let pixels = width as usize * height as usize;
        [PixelFormat::Rgb8, PixelFormat::Rgba8]
            .into_iter()
            .find(|format| pixels * format.bytes_per_pixel() == len)
    }
}

/// Dimensions and format of a texture image upload
///
/// Textures are sampled with nearest filtering and clamp-to-edge wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureUpload {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
}
