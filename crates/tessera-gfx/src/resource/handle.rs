use crate::device::Gl;
use crate::error::Result;

/// Kind of native object a handle names.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Texture,
    Buffer,
    VertexArray,
    Shader,
    Program,
}

/// Native object name paired with the routine that frees it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ResourceHandle {
    kind: ResourceKind,
    raw: u32,
}

impl ResourceHandle {
    #[inline]
    pub const fn new(kind: ResourceKind, raw: u32) -> Self {
        Self { kind, raw }
    }

    #[inline]
    pub const fn kind(self) -> ResourceKind {
        self.kind
    }

    /// Native name passed to API calls.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.raw
    }

    pub(crate) fn release(self, gl: &mut Gl<'_>) -> Result<()> {
        match self.kind {
            ResourceKind::Texture => gl.delete_texture(self.raw),
            ResourceKind::Buffer => gl.delete_buffer(self.raw),
            ResourceKind::VertexArray => gl.delete_vertex_array(self.raw),
            ResourceKind::Shader => gl.delete_shader(self.raw),
            ResourceKind::Program => gl.delete_program(self.raw),
        }
    }
}

/// Releases every handle, reporting the first failure after trying them all.
pub(crate) fn release_all(gl: &mut Gl<'_>, handles: &[ResourceHandle]) -> Result<()> {
    let mut result = Ok(());
    for handle in handles {
        if let Err(err) = handle.release(gl) {
            log::warn!("failed to release {:?} {}: {err}", handle.kind, handle.raw);
            if result.is_ok() {
                result = Err(err);
            }
        }
    }
    result
}
