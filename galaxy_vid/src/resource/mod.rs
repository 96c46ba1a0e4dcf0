//! Logical resources
//!
//! Application-facing objects (textures, programs, geometry) that carry
//! CPU-side data and materialize lazily on every `RenderContext` they are
//! used with, through a per-context `ResourceCache`.

pub mod cache;
mod ring_buffer;
mod uniform;
mod texture;
mod program;
mod vertex;
mod geometry;
mod packed_geometry;
mod triangle_geometry;
mod quad_geometry;

pub use cache::{ResourceCache, CacheEntry, ResourceId, UpdateFlags, PhysicalObjects};
pub use ring_buffer::RingBuffer;
pub use uniform::UniformValue;
pub use texture::{Texture, TextureImage, Tileset, TilesetDesc};
pub use program::Program;
pub use vertex::{Vertex2, Vertex3};
pub use geometry::{Geometry, IndexData};
pub use packed_geometry::{PackedGeometry, SlotShape};
pub use triangle_geometry::{TriangleGeometry, AttributeNames};
pub use quad_geometry::QuadGeometry;
