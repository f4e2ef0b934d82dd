use std::cell::Cell;

use crate::device::{BufferTarget, BufferUsage, Gl};
use crate::error::{GfxError, Result};
use crate::resource::{Disposable, ObjectCore, ResourceHandle};

/// Native side of a vertex or index buffer: the buffer object plus, for
/// vertex buffers, the vertex array describing its layout.
pub(super) struct BufferObject {
    pub(super) core: ObjectCore,
    pub(super) buffer: ResourceHandle,
    pub(super) vertex_array: Option<ResourceHandle>,
    pub(super) len: Cell<usize>,
}

impl BufferObject {
    pub(super) fn ensure_live(&self, what: &'static str) -> Result<()> {
        if self.core.is_disposed() {
            return Err(GfxError::invalid(what, "buffer has been disposed"));
        }
        Ok(())
    }

    fn handles(&self) -> Vec<ResourceHandle> {
        self.vertex_array.into_iter().chain(Some(self.buffer)).collect()
    }
}

impl Disposable for BufferObject {
    fn dispose(&self) -> Result<()> {
        self.core.dispose("buffer", &self.handles(), |_| Ok(()))
    }

    fn is_disposed(&self) -> bool {
        self.core.is_disposed()
    }
}

impl Drop for BufferObject {
    fn drop(&mut self) {
        if let Err(err) = self.dispose() {
            log::warn!("buffer {} disposal on drop failed: {err}", self.buffer.raw());
        }
    }
}

/// Binds `buffer` to `target` and replaces its contents.
pub(super) fn upload(
    gl: &mut Gl<'_>,
    target: BufferTarget,
    buffer: u32,
    bytes: &[u8],
    usage: BufferUsage,
) -> Result<()> {
    gl.bind_buffer(target, buffer)?;
    gl.buffer_data(target, bytes, usage)
}

/// Byte length of `count` elements of `size` bytes, as the native API wants it.
pub(super) fn byte_len(count: usize, size: usize) -> Result<i32> {
    count
        .checked_mul(size)
        .and_then(|n| i32::try_from(n).ok())
        .ok_or_else(|| GfxError::invalid("data", format!("{count} elements of {size} bytes overflow")))
}
