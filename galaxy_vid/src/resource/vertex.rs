/// Vertex records written into packed geometry slots

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};

/// 3D vertex: position, normal and texture coordinates (8 floats)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct Vertex3 {
    pub position: Vec3,
    pub normal: Vec3,
    pub uv: Vec2,
}

impl Vertex3 {
    pub const FLOATS: usize = 8;

    pub fn new(position: Vec3, normal: Vec3, uv: Vec2) -> Self {
        Self { position, normal, uv }
    }

    /// Write into the first 8 floats of `dst`
    pub(crate) fn write(&self, dst: &mut [f32]) {
        dst[..Self::FLOATS].copy_from_slice(bytemuck::cast_slice(std::slice::from_ref(self)));
    }
}

impl From<Vertex2> for Vertex3 {
    /// Place a 2D vertex on the z = 0 plane, facing +z
    fn from(vertex: Vertex2) -> Self {
        Self {
            position: vertex.position.extend(0.0),
            normal: Vec3::Z,
            uv: vertex.uv,
        }
    }
}

/// 2D vertex: position and texture coordinates (4 floats)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct Vertex2 {
    pub position: Vec2,
    pub uv: Vec2,
}

impl Vertex2 {
    pub const FLOATS: usize = 4;

    pub fn new(x: f32, y: f32, u: f32, v: f32) -> Self {
        Self {
            position: Vec2::new(x, y),
            uv: Vec2::new(u, v),
        }
    }

    /// Write into the first 4 floats of `dst`
    pub(crate) fn write(&self, dst: &mut [f32]) {
        dst[..Self::FLOATS].copy_from_slice(bytemuck::cast_slice(std::slice::from_ref(self)));
    }
}
