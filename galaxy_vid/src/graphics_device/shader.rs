/// Shader stages, link-time reflection and uniform upload data

/// Shader stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

/// Type of an active uniform as reported after linking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UniformType {
    Float,
    FloatVec2,
    FloatVec3,
    FloatVec4,
    Int,
    IntVec2,
    IntVec3,
    IntVec4,
    Bool,
    BoolVec2,
    BoolVec3,
    BoolVec4,
    FloatMat2,
    FloatMat3,
    FloatMat4,
    Sampler2D,
    SamplerCube,
}

/// How the components of a uniform type are uploaded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniformClass {
    /// Float scalar or vector
    Float,
    /// Int or bool scalar or vector (bools upload as ints)
    Int,
    /// Square float matrix
    Matrix,
    /// Texture sampler
    Sampler,
}

impl UniformType {
    /// Parse a GLSL type name (`vec3`, `mat4`, `sampler2D`, ...)
    pub fn from_glsl(name: &str) -> Option<UniformType> {
        Some(match name {
            "float" => UniformType::Float,
            "vec2" => UniformType::FloatVec2,
            "vec3" => UniformType::FloatVec3,
            "vec4" => UniformType::FloatVec4,
            "int" => UniformType::Int,
            "ivec2" => UniformType::IntVec2,
            "ivec3" => UniformType::IntVec3,
            "ivec4" => UniformType::IntVec4,
            "bool" => UniformType::Bool,
            "bvec2" => UniformType::BoolVec2,
            "bvec3" => UniformType::BoolVec3,
            "bvec4" => UniformType::BoolVec4,
            "mat2" => UniformType::FloatMat2,
            "mat3" => UniformType::FloatMat3,
            "mat4" => UniformType::FloatMat4,
            "sampler2D" => UniformType::Sampler2D,
            "samplerCube" => UniformType::SamplerCube,
            _ => return None,
        })
    }

    pub fn class(&self) -> UniformClass {
        match self {
            UniformType::Float | UniformType::FloatVec2 | UniformType::FloatVec3 | UniformType::FloatVec4 => {
                UniformClass::Float
            }
            UniformType::Int | UniformType::IntVec2 | UniformType::IntVec3 | UniformType::IntVec4
            | UniformType::Bool | UniformType::BoolVec2 | UniformType::BoolVec3 | UniformType::BoolVec4 => {
                UniformClass::Int
            }
            UniformType::FloatMat2 | UniformType::FloatMat3 | UniformType::FloatMat4 => UniformClass::Matrix,
            UniformType::Sampler2D | UniformType::SamplerCube => UniformClass::Sampler,
        }
    }

    /// Components of one element (vector width, or column count for matrices)
    pub fn components(&self) -> u32 {
        match self {
            UniformType::Float | UniformType::Int | UniformType::Bool
            | UniformType::Sampler2D | UniformType::SamplerCube => 1,
            UniformType::FloatVec2 | UniformType::IntVec2 | UniformType::BoolVec2 | UniformType::FloatMat2 => 2,
            UniformType::FloatVec3 | UniformType::IntVec3 | UniformType::BoolVec3 | UniformType::FloatMat3 => 3,
            UniformType::FloatVec4 | UniformType::IntVec4 | UniformType::BoolVec4 | UniformType::FloatMat4 => 4,
        }
    }

    /// Scalars in one element (`components` squared for matrices)
    pub fn scalar_count(&self) -> u32 {
        match self.class() {
            UniformClass::Matrix => self.components() * self.components(),
            _ => self.components(),
        }
    }

    pub fn is_sampler(&self) -> bool {
        self.class() == UniformClass::Sampler
    }
}

/// Active vertex attribute of a linked program
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeInfo {
    pub name: String,
    /// Attribute location to point vertex data at
    pub location: u32,
    /// Array size (1 for non-arrays)
    pub size: u32,
}

/// Active uniform of a linked program
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformInfo {
    pub name: String,
    pub ty: UniformType,
    /// Array size (1 for non-arrays)
    pub size: u32,
    pub location: i32,
    /// Texture unit assigned to a sampler uniform
    pub texture_unit: Option<u32>,
}

/// Everything the driver reports about a program after a successful link
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgramReflection {
    pub attributes: Vec<AttributeInfo>,
    pub uniforms: Vec<UniformInfo>,
}

impl ProgramReflection {
    pub fn attribute(&self, name: &str) -> Option<&AttributeInfo> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn uniform(&self, name: &str) -> Option<&UniformInfo> {
        self.uniforms.iter().find(|u| u.name == name)
    }

    /// Attribute locations, in reflection order
    pub fn attribute_locations(&self) -> Vec<u32> {
        self.attributes.iter().map(|a| a.location).collect()
    }

    /// Number of sampler uniforms (texture units the program needs)
    pub fn sampler_count(&self) -> usize {
        self.uniforms.iter().filter(|u| u.ty.is_sampler()).count()
    }
}

/// Uniform payload handed to the device, already matched to the reflected type
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformData<'a> {
    /// `components`-wide float vectors, `values.len() / components` elements
    Float { components: u32, values: &'a [f32] },
    /// `components`-wide int vectors (bools included)
    Int { components: u32, values: &'a [i32] },
    /// Column-major `dim` x `dim` matrices
    Matrix { dim: u32, values: &'a [f32] },
    /// Texture unit a sampler reads from
    Sampler { unit: u32 },
}

#[cfg(test)]
#[path = "shader_tests.rs"]
mod tests;
