/// Uniform values stored by a `Program`

use glam::{Vec2, Vec3, Vec4, IVec2, IVec3, IVec4, BVec2, BVec3, BVec4, Mat2, Mat3, Mat4};
use crate::error::Result;
use crate::graphics_device::{GraphicsDevice, UniformClass, UniformData, UniformInfo, UniformType};
use crate::engine_bail;
use super::Texture;

/// Value of one uniform
///
/// Matched against the type the linked program reports for the uniform when
/// it is uploaded. Bool uniforms also accept ints; arrays are given flat,
/// several elements per `Floats`/`Ints` value.
#[derive(Debug, Clone)]
pub enum UniformValue {
    Float(f32),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    Int(i32),
    IVec2(IVec2),
    IVec3(IVec3),
    IVec4(IVec4),
    Bool(bool),
    BVec2(BVec2),
    BVec3(BVec3),
    BVec4(BVec4),
    Mat2(Mat2),
    Mat3(Mat3),
    Mat4(Mat4),
    /// Flat float data for float vectors, matrices or arrays of them
    Floats(Vec<f32>),
    /// Flat int data for int or bool vectors or arrays of them
    Ints(Vec<i32>),
    /// Texture read by a sampler uniform
    Sampler(Texture),
}

impl UniformValue {
    /// GLSL-style name of the value shape, for diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            UniformValue::Float(_) => "float",
            UniformValue::Vec2(_) => "vec2",
            UniformValue::Vec3(_) => "vec3",
            UniformValue::Vec4(_) => "vec4",
            UniformValue::Int(_) => "int",
            UniformValue::IVec2(_) => "ivec2",
            UniformValue::IVec3(_) => "ivec3",
            UniformValue::IVec4(_) => "ivec4",
            UniformValue::Bool(_) => "bool",
            UniformValue::BVec2(_) => "bvec2",
            UniformValue::BVec3(_) => "bvec3",
            UniformValue::BVec4(_) => "bvec4",
            UniformValue::Mat2(_) => "mat2",
            UniformValue::Mat3(_) => "mat3",
            UniformValue::Mat4(_) => "mat4",
            UniformValue::Floats(_) => "float[]",
            UniformValue::Ints(_) => "int[]",
            UniformValue::Sampler(_) => "sampler",
        }
    }

    /// Texture of a sampler value
    pub fn texture(&self) -> Option<&Texture> {
        match self {
            UniformValue::Sampler(texture) => Some(texture),
            _ => None,
        }
    }

    /// Upload the value into the uniform described by `info`
    ///
    /// The program owning `info` must be in use. Sampler values upload the
    /// texture unit assigned at link time; binding the texture itself is up to
    /// the caller.
    pub(crate) fn upload(&self, device: &mut dyn GraphicsDevice, info: &UniformInfo) -> Result<()> {
        let ty = info.ty;
        let location = info.location;
        let scalars = ty.scalar_count() as usize;
        let max_scalars = scalars * info.size.max(1) as usize;

        match (self, ty.class()) {
            (UniformValue::Sampler(_), UniformClass::Sampler) => {
                match info.texture_unit {
                    Some(unit) => device.set_uniform(location, UniformData::Sampler { unit }),
                    None => engine_bail!(@InvalidResource, "galaxy_vid::Program",
                        "sampler '{}' has no texture unit", info.name),
                }
            }

            (UniformValue::Floats(values), UniformClass::Float | UniformClass::Matrix) => {
                if values.is_empty() || values.len() % scalars != 0 || values.len() > max_scalars {
                    engine_bail!(@InvalidResource, "galaxy_vid::Program",
                        "uniform '{}' ({:?}[{}]) can not take {} floats",
                        info.name, ty, info.size, values.len());
                }
                device.set_uniform(location, float_data(ty, values))
            }

            (UniformValue::Ints(values), UniformClass::Int) => {
                if values.is_empty() || values.len() % scalars != 0 || values.len() > max_scalars {
                    engine_bail!(@InvalidResource, "galaxy_vid::Program",
                        "uniform '{}' ({:?}[{}]) can not take {} ints",
                        info.name, ty, info.size, values.len());
                }
                device.set_uniform(location, UniformData::Int { components: ty.components(), values })
            }

            _ => match self.fixed_scalars(ty) {
                Some(Scalars::Float(values)) => device.set_uniform(location, float_data(ty, &values)),
                Some(Scalars::Int(values)) => {
                    device.set_uniform(location, UniformData::Int { components: ty.components(), values: &values })
                }
                None => engine_bail!(@InvalidResource, "galaxy_vid::Program",
                    "uniform '{}' is {:?}, got {}", info.name, ty, self.type_name()),
            },
        }
    }

    /// Scalars of a fixed-size value, if its shape matches `ty` exactly
    fn fixed_scalars(&self, ty: UniformType) -> Option<Scalars> {
        use UniformType as T;
        let bools = |values: &[bool]| Scalars::Int(values.iter().map(|&b| b as i32).collect());

        Some(match (self, ty) {
            (UniformValue::Float(v), T::Float) => Scalars::Float(vec![*v]),
            (UniformValue::Vec2(v), T::FloatVec2) => Scalars::Float(v.to_array().to_vec()),
            (UniformValue::Vec3(v), T::FloatVec3) => Scalars::Float(v.to_array().to_vec()),
            (UniformValue::Vec4(v), T::FloatVec4) => Scalars::Float(v.to_array().to_vec()),
            (UniformValue::Mat2(m), T::FloatMat2) => Scalars::Float(m.to_cols_array().to_vec()),
            (UniformValue::Mat3(m), T::FloatMat3) => Scalars::Float(m.to_cols_array().to_vec()),
            (UniformValue::Mat4(m), T::FloatMat4) => Scalars::Float(m.to_cols_array().to_vec()),
            (UniformValue::Int(v), T::Int | T::Bool) => Scalars::Int(vec![*v]),
            (UniformValue::IVec2(v), T::IntVec2 | T::BoolVec2) => Scalars::Int(v.to_array().to_vec()),
            (UniformValue::IVec3(v), T::IntVec3 | T::BoolVec3) => Scalars::Int(v.to_array().to_vec()),
            (UniformValue::IVec4(v), T::IntVec4 | T::BoolVec4) => Scalars::Int(v.to_array().to_vec()),
            (UniformValue::Bool(b), T::Bool) => bools(&[*b]),
            (UniformValue::BVec2(b), T::BoolVec2) => bools(&[b.x, b.y]),
            (UniformValue::BVec3(b), T::BoolVec3) => bools(&[b.x, b.y, b.z]),
            (UniformValue::BVec4(b), T::BoolVec4) => bools(&[b.x, b.y, b.z, b.w]),
            _ => return None,
        })
    }
}

enum Scalars {
    Float(Vec<f32>),
    Int(Vec<i32>),
}

fn float_data(ty: UniformType, values: &[f32]) -> UniformData<'_> {
    match ty.class() {
        UniformClass::Matrix => UniformData::Matrix { dim: ty.components(), values },
        _ => UniformData::Float { components: ty.components(), values },
    }
}

macro_rules! impl_from_value {
    ($($source:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$source> for UniformValue {
                fn from(value: $source) -> Self {
                    UniformValue::$variant(value)
                }
            }
        )*
    };
}

impl_from_value! {
    f32 => Float,
    Vec2 => Vec2,
    Vec3 => Vec3,
    Vec4 => Vec4,
    i32 => Int,
    IVec2 => IVec2,
    IVec3 => IVec3,
    IVec4 => IVec4,
    bool => Bool,
    BVec2 => BVec2,
    BVec3 => BVec3,
    BVec4 => BVec4,
    Mat2 => Mat2,
    Mat3 => Mat3,
    Mat4 => Mat4,
    Vec<f32> => Floats,
    Vec<i32> => Ints,
    Texture => Sampler,
}

impl From<&Texture> for UniformValue {
    fn from(texture: &Texture) -> Self {
        UniformValue::Sampler(texture.clone())
    }
}

#[cfg(test)]
#[path = "uniform_tests.rs"]
mod tests;
