use std::rc::Rc;

use crate::context::GraphicsContext;
use crate::device::ShaderStage;
use crate::error::{GfxError, Result};
use crate::resource::{Disposable, ObjectCore, ResourceHandle, ResourceKind};

/// A compiled shader stage.
pub struct Shader {
    object: Rc<ShaderObject>,
}

struct ShaderObject {
    core: ObjectCore,
    stage: ShaderStage,
    handle: ResourceHandle,
}

impl Shader {
    /// Creates a shader object and compiles `source` on the device.
    ///
    /// A compile failure disposes the shader object and returns the device's
    /// info log in [`GfxError::ShaderCompile`].
    pub fn new(context: &GraphicsContext, stage: ShaderStage, source: &str) -> Result<Self> {
        let shared = context.shared();
        shared.ensure_live()?;
        let raw = shared.with_gl(|gl| gl.create_shader(stage))?;
        let object = shared.adopt(|core| ShaderObject {
            core,
            stage,
            handle: ResourceHandle::new(ResourceKind::Shader, raw),
        });
        let shader = Self { object };

        if let Err(err) = shared.with_gl(|gl| gl.compile_shader(raw, stage, source)) {
            if let Err(cleanup) = shader.dispose() {
                log::warn!("cleanup of failed {stage:?} shader failed: {cleanup}");
            }
            return Err(err);
        }

        log::debug!("compiled {stage:?} shader {raw}");
        Ok(shader)
    }

    pub fn vertex(context: &GraphicsContext, source: &str) -> Result<Self> {
        Self::new(context, ShaderStage::Vertex, source)
    }

    pub fn fragment(context: &GraphicsContext, source: &str) -> Result<Self> {
        Self::new(context, ShaderStage::Fragment, source)
    }

    #[inline]
    pub fn stage(&self) -> ShaderStage {
        self.object.stage
    }

    #[inline]
    pub fn handle(&self) -> ResourceHandle {
        self.object.handle
    }

    pub(crate) fn belongs_to(&self, context: &GraphicsContext) -> bool {
        self.object.core.belongs_to(context.shared())
    }

    pub(crate) fn ensure_live(&self) -> Result<()> {
        if self.object.core.is_disposed() {
            return Err(GfxError::invalid("shader", "shader has been disposed"));
        }
        Ok(())
    }
}

impl Disposable for Shader {
    fn dispose(&self) -> Result<()> {
        self.object.dispose()
    }

    fn is_disposed(&self) -> bool {
        self.object.is_disposed()
    }
}

impl std::fmt::Debug for Shader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shader")
            .field("stage", &self.object.stage)
            .field("handle", &self.object.handle.raw())
            .finish()
    }
}

impl Disposable for ShaderObject {
    fn dispose(&self) -> Result<()> {
        self.core.dispose("shader", &[self.handle], |_| Ok(()))
    }

    fn is_disposed(&self) -> bool {
        self.core.is_disposed()
    }
}

impl Drop for ShaderObject {
    fn drop(&mut self) {
        if let Err(err) = self.dispose() {
            log::warn!("shader {} disposal on drop failed: {err}", self.handle.raw());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ContextConfig;
    use crate::device::{Call, RecordingDevice};

    #[test]
    fn compiles_and_registers() {
        let device = RecordingDevice::new();
        let journal = device.journal();
        let ctx = GraphicsContext::new(device, ContextConfig::default()).unwrap();

        let shader = Shader::vertex(&ctx, "void main() {}").unwrap();

        assert_eq!(shader.stage(), ShaderStage::Vertex);
        assert!(journal.calls().contains(&Call::CompileShader(shader.handle().raw())));
        assert_eq!(ctx.live_objects(), 1);
    }

    #[test]
    fn compile_failure_reports_log_and_cleans_up() {
        let device = RecordingDevice::new();
        let journal = device.journal();
        let ctx = GraphicsContext::new(device, ContextConfig::default()).unwrap();

        let err = Shader::fragment(&ctx, "   ").unwrap_err();

        match err {
            GfxError::ShaderCompile { stage, log } => {
                assert_eq!(stage, ShaderStage::Fragment);
                assert_eq!(log, "empty shader source");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(journal.count(|c| matches!(c, Call::DeleteShader(_))), 1);
        assert_eq!(ctx.live_objects(), 0);
    }
}
