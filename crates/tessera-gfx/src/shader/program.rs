use std::rc::Rc;

use crate::context::GraphicsContext;
use crate::device::{Gl, ShaderStage};
use crate::error::{GfxError, Result};
use crate::resource::{Disposable, ObjectCore, ResourceHandle, ResourceKind};
use crate::texture::Texture;

use super::shader::Shader;

/// A linked vertex + fragment program.
///
/// The program owns both stages and disposes them with itself. Uniform
/// setters bind the program first; the context skips the bind when the
/// program is already current. Uniforms the linker optimized away are
/// skipped silently.
pub struct ShaderProgram {
    object: Rc<ProgramObject>,
}

struct ProgramObject {
    core: ObjectCore,
    handle: ResourceHandle,
    vertex: Shader,
    fragment: Shader,
}

impl ShaderProgram {
    pub fn new(context: &GraphicsContext, vertex: Shader, fragment: Shader) -> Result<Self> {
        check_stage("vertex", &vertex, ShaderStage::Vertex)?;
        check_stage("fragment", &fragment, ShaderStage::Fragment)?;
        for shader in [&vertex, &fragment] {
            shader.ensure_live()?;
            if !shader.belongs_to(context) {
                return Err(GfxError::invalid("shader", "created by another context"));
            }
        }

        let shared = context.shared();
        shared.ensure_live()?;
        let raw = shared.with_gl(|gl| gl.create_program())?;
        let stages = [vertex.handle().raw(), fragment.handle().raw()];
        let object = shared.adopt(|core| ProgramObject {
            core,
            handle: ResourceHandle::new(ResourceKind::Program, raw),
            vertex,
            fragment,
        });
        let program = Self { object };

        if let Err(err) = shared.with_gl(|gl| gl.link_program(raw, &stages)) {
            if let Err(cleanup) = program.dispose() {
                log::warn!("cleanup of unlinked program failed: {cleanup}");
            }
            return Err(err);
        }

        log::debug!("linked program {raw} from shaders {stages:?}");
        Ok(program)
    }

    #[inline]
    pub fn handle(&self) -> ResourceHandle {
        self.object.handle
    }

    pub fn vertex_shader(&self) -> &Shader {
        &self.object.vertex
    }

    pub fn fragment_shader(&self) -> &Shader {
        &self.object.fragment
    }

    pub fn set_f32(&self, name: &str, value: f32) -> Result<()> {
        self.set_uniform(name, |gl, location| gl.uniform_1f(location, value))
    }

    pub fn set_i32(&self, name: &str, value: i32) -> Result<()> {
        self.set_uniform(name, |gl, location| gl.uniform_1i(location, value))
    }

    /// Column-major 4x4 matrix.
    pub fn set_matrix4(&self, name: &str, value: &[f32; 16]) -> Result<()> {
        self.set_uniform(name, |gl, location| gl.uniform_matrix4(location, value))
    }

    /// Points a sampler uniform at the unit `texture` is bound to.
    pub fn set_sampler(&self, name: &str, texture: &Texture) -> Result<()> {
        if texture.is_disposed() {
            return Err(GfxError::invalid("texture", "texture has been disposed"));
        }
        let unit = texture.unit().index() as i32;
        self.set_uniform(name, |gl, location| gl.uniform_1i(location, unit))
    }

    pub(crate) fn belongs_to(&self, context: &GraphicsContext) -> bool {
        self.object.core.belongs_to(context.shared())
    }

    fn set_uniform(&self, name: &str, set: impl FnOnce(&mut Gl<'_>, i32) -> Result<()>) -> Result<()> {
        if self.object.core.is_disposed() {
            return Err(GfxError::invalid("program", "program has been disposed"));
        }
        let context = self.object.core.context()?;
        let raw = self.object.handle.raw();
        context.use_program(raw)?;
        context.with_gl(|gl| match gl.uniform_location(raw, name)? {
            Some(location) => set(gl, location),
            None => {
                log::debug!("program {raw} has no active uniform `{name}`");
                Ok(())
            }
        })
    }
}

impl Disposable for ShaderProgram {
    fn dispose(&self) -> Result<()> {
        self.object.dispose()
    }

    fn is_disposed(&self) -> bool {
        self.object.is_disposed()
    }
}

impl std::fmt::Debug for ShaderProgram {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShaderProgram")
            .field("handle", &self.object.handle.raw())
            .field("vertex", &self.object.vertex)
            .field("fragment", &self.object.fragment)
            .finish()
    }
}

impl Disposable for ProgramObject {
    fn dispose(&self) -> Result<()> {
        let raw = self.handle.raw();
        self.core.dispose("program", &[self.handle], |context| {
            context.forget_program(raw);
            let vertex = self.vertex.dispose();
            let fragment = self.fragment.dispose();
            vertex.and(fragment)
        })
    }

    fn is_disposed(&self) -> bool {
        self.core.is_disposed()
    }
}

impl Drop for ProgramObject {
    fn drop(&mut self) {
        if let Err(err) = self.dispose() {
            log::warn!("program {} disposal on drop failed: {err}", self.handle.raw());
        }
    }
}

fn check_stage(name: &'static str, shader: &Shader, expected: ShaderStage) -> Result<()> {
    if shader.stage() != expected {
        return Err(GfxError::invalid(name, format!("expected a {expected:?} shader, got {:?}", shader.stage())));
    }
    Ok(())
}
