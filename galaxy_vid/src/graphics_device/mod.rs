/// Graphics device module - the native graphics API surface and its vocabulary

pub mod graphics_device;
pub mod handle;
pub mod buffer;
pub mod texture;
pub mod shader;
pub mod pipeline;
pub mod headless_graphics_device;

pub use graphics_device::*;
pub use handle::*;
pub use buffer::*;
pub use texture::*;
pub use shader::*;
pub use pipeline::*;
pub use headless_graphics_device::{HeadlessGraphicsDevice, DeviceLog, SharedDeviceLog, DeviceCall, UniformRecord};
