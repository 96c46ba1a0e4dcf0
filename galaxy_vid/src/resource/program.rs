/// Program - a vertex/fragment shader pair with its uniform values
///
/// Sources and uniform values live on the CPU side. Each context compiles
/// its own copy on first bind, and recompiles or re-uploads uniforms only
/// when `compile` or `set_uniform` changed something since.

use std::rc::Rc;
use rustc_hash::FxHashMap;
use crate::context::{ContextId, DeletionQueue, RenderContext};
use crate::error::Result;
use crate::graphics_device::{
    GraphicsDevice, ShaderHandle, ProgramHandle, ShaderStage, ProgramReflection, RenderState,
};
use crate::{engine_bail, engine_debug, engine_error};
use super::cache::{PhysicalObjects, ResourceCache, ResourceId, UpdateFlags};
use super::UniformValue;

struct ProgramObjects {
    vertex: ShaderHandle,
    fragment: ShaderHandle,
    program: ProgramHandle,
    /// Set by a successful link
    reflection: Option<Rc<ProgramReflection>>,
}

impl PhysicalObjects for ProgramObjects {
    fn retire(self, queue: &mut DeletionQueue) {
        queue.enqueue(self.program);
        queue.enqueue(self.vertex);
        queue.enqueue(self.fragment);
    }
}

fn create_objects(device: &mut dyn GraphicsDevice) -> Result<ProgramObjects> {
    let vertex = device.create_shader(ShaderStage::Vertex)?;
    let fragment = match device.create_shader(ShaderStage::Fragment) {
        Ok(fragment) => fragment,
        Err(err) => {
            device.destroy_shader(vertex);
            return Err(err);
        }
    };
    let program = match device.create_program(vertex, fragment) {
        Ok(program) => program,
        Err(err) => {
            device.destroy_shader(vertex);
            device.destroy_shader(fragment);
            return Err(err);
        }
    };
    Ok(ProgramObjects { vertex, fragment, program, reflection: None })
}

/// Shader program
pub struct Program {
    vertex_source: String,
    fragment_source: String,
    uniforms: FxHashMap<String, UniformValue>,
    render_state: RenderState,
    cache: ResourceCache<ProgramObjects>,
}

impl Program {
    /// Create a program from GLSL sources
    ///
    /// Nothing is compiled until the program is first bound on a context.
    pub fn new(vertex_source: impl Into<String>, fragment_source: impl Into<String>) -> Self {
        Self {
            vertex_source: vertex_source.into(),
            fragment_source: fragment_source.into(),
            uniforms: FxHashMap::default(),
            render_state: RenderState::default(),
            cache: ResourceCache::new(),
        }
    }

    pub fn id(&self) -> ResourceId {
        self.cache.id()
    }

    pub fn vertex_source(&self) -> &str {
        &self.vertex_source
    }

    pub fn fragment_source(&self) -> &str {
        &self.fragment_source
    }

    /// Replace both sources
    ///
    /// Stored uniform values are dropped, since they belong to the previous
    /// program. Every context recompiles at its next bind.
    pub fn compile(&mut self, vertex_source: impl Into<String>, fragment_source: impl Into<String>) {
        self.vertex_source = vertex_source.into();
        self.fragment_source = fragment_source.into();
        self.uniforms.clear();
        self.cache.invalidate(UpdateFlags::COMPILE);
    }

    /// Store a uniform value, uploaded by every context at its next bind
    pub fn set_uniform(&mut self, name: impl Into<String>, value: impl Into<UniformValue>) {
        self.uniforms.insert(name.into(), value.into());
        self.cache.invalidate(UpdateFlags::UNIFORMS);
    }

    pub fn uniform(&self, name: &str) -> Option<&UniformValue> {
        self.uniforms.get(name)
    }

    pub fn uniforms(&self) -> impl Iterator<Item = (&str, &UniformValue)> {
        self.uniforms.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn render_state(&self) -> &RenderState {
        &self.render_state
    }

    /// Render state applied whenever the program is bound
    pub fn set_render_state(&mut self, render_state: RenderState) {
        self.render_state = render_state;
    }

    /// Reflection of the program linked on `context`, if any
    pub fn reflection_on(&self, context: ContextId) -> Option<Rc<ProgramReflection>> {
        self.cache.with_entry(context, |entry| entry.objects().reflection.clone()).flatten()
    }

    /// Physical program created on `context`, if any
    pub fn handle_on(&self, context: ContextId) -> Option<ProgramHandle> {
        self.cache.with_entry(context, |entry| entry.objects().program)
    }

    /// Make the program current on `ctx`
    ///
    /// Compiles and links if needed, uploads pending uniform values, binds the
    /// textures of sampler uniforms and applies the render state. Returns what
    /// the linked program reports, for matching vertex attributes.
    ///
    /// # Errors
    ///
    /// - `CompileFailure` / `LinkFailure` with the driver log; the program
    ///   stays undrawable on `ctx` and the next bind tries again
    /// - `ResourceLimitExceeded` if the program has more samplers than the
    ///   context has texture units
    /// - `InvalidResource` for a value set on a uniform the program does not
    ///   have, or of the wrong type
    pub fn bind(&self, ctx: &mut RenderContext) -> Result<Rc<ProgramReflection>> {
        self.cache.resolve(ctx, create_objects, |entry, ctx| {
            if entry.needs(UpdateFlags::COMPILE) {
                let objects = entry.objects_mut();
                objects.reflection = None;
                let reflection = self.build(ctx, objects)?;
                objects.reflection = Some(Rc::new(reflection));
                entry.mark_synced(UpdateFlags::COMPILE);
                entry.invalidate(UpdateFlags::UNIFORMS);
            }

            let program = entry.objects().program;
            let reflection = match &entry.objects().reflection {
                Some(reflection) => reflection.clone(),
                None => engine_bail!(@InvalidResource, "galaxy_vid::Program",
                    "program {} is not linked on context {}", self.id(), ctx.id()),
            };

            ctx.use_program(program, &reflection.attribute_locations())?;

            if entry.needs(UpdateFlags::UNIFORMS) {
                for (name, value) in &self.uniforms {
                    let Some(info) = reflection.uniform(name) else {
                        engine_bail!(@InvalidResource, "galaxy_vid::Program",
                            "uniform '{}' is not active in program {}", name, self.id());
                    };
                    value.upload(ctx.device_mut(), info)?;
                }
                entry.mark_synced(UpdateFlags::UNIFORMS);
            }

            for (name, value) in &self.uniforms {
                let unit = reflection.uniform(name).and_then(|info| info.texture_unit);
                if let (Some(texture), Some(unit)) = (value.texture(), unit) {
                    texture.bind(ctx, unit)?;
                }
            }

            ctx.device_mut().set_render_state(&self.render_state)?;
            Ok(reflection)
        })
    }

    /// Compile, link and assign texture units
    fn build(&self, ctx: &mut RenderContext, objects: &ProgramObjects) -> Result<ProgramReflection> {
        let max_units = ctx.max_texture_units();
        let device = ctx.device_mut();

        device
            .compile_shader(objects.vertex, &self.vertex_source)
            .inspect_err(|err| engine_error!("galaxy_vid::Program", "Vertex shader of {}: {}", self.id(), err))?;
        device
            .compile_shader(objects.fragment, &self.fragment_source)
            .inspect_err(|err| engine_error!("galaxy_vid::Program", "Fragment shader of {}: {}", self.id(), err))?;
        let mut reflection = device
            .link_program(objects.program)
            .inspect_err(|err| engine_error!("galaxy_vid::Program", "Program {}: {}", self.id(), err))?;

        let mut next_unit = 0;
        for uniform in reflection.uniforms.iter_mut().filter(|u| u.ty.is_sampler()) {
            if next_unit >= max_units {
                engine_bail!(@ResourceLimitExceeded, "galaxy_vid::Program",
                    "program {} uses more than {} samplers", self.id(), max_units);
            }
            uniform.texture_unit = Some(next_unit);
            next_unit += 1;
        }

        engine_debug!("galaxy_vid::Program", "Program {} linked on context {} ({} attributes, {} uniforms)",
            self.id(), ctx.id(), reflection.attributes.len(), reflection.uniforms.len());
        Ok(reflection)
    }
}

#[cfg(test)]
#[path = "program_tests.rs"]
mod tests;
