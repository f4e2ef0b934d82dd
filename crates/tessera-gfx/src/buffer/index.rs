use std::cell::Cell;
use std::marker::PhantomData;
use std::mem::size_of;
use std::rc::Rc;

use bytemuck::Pod;

use crate::context::GraphicsContext;
use crate::device::{BufferTarget, BufferUsage, IndexType};
use crate::error::Result;
use crate::resource::{Disposable, ResourceHandle, ResourceKind};

use super::object::{byte_len, upload, BufferObject};

/// Integer type usable as an element index.
pub trait Index: Pod {
    const TYPE: IndexType;
}

impl Index for u8 {
    const TYPE: IndexType = IndexType::U8;
}

impl Index for u16 {
    const TYPE: IndexType = IndexType::U16;
}

impl Index for u32 {
    const TYPE: IndexType = IndexType::U32;
}

/// GPU buffer of element indices.
pub struct IndexBuffer<I: Index> {
    object: Rc<BufferObject>,
    usage: BufferUsage,
    _index: PhantomData<I>,
}

impl<I: Index> IndexBuffer<I> {
    pub fn new(context: &GraphicsContext, data: &[I], usage: BufferUsage) -> Result<Self> {
        byte_len(data.len(), size_of::<I>())?;

        let shared = context.shared();
        shared.ensure_live()?;
        let buffer = shared.with_gl(|gl| gl.create_buffer())?;
        let object = shared.adopt(|core| BufferObject {
            core,
            buffer: ResourceHandle::new(ResourceKind::Buffer, buffer),
            vertex_array: None,
            len: Cell::new(0),
        });
        let ib = Self { object, usage, _index: PhantomData };

        let uploaded = shared.with_gl(|gl| {
            upload(gl, BufferTarget::ElementArray, buffer, bytemuck::cast_slice(data), usage)
        });
        if let Err(err) = uploaded {
            if let Err(cleanup) = ib.dispose() {
                log::warn!("cleanup of partially created index buffer failed: {cleanup}");
            }
            return Err(err);
        }

        ib.object.len.set(data.len());
        log::debug!("created index buffer {buffer} with {} {:?} indices", data.len(), I::TYPE);
        Ok(ib)
    }

    /// Replaces the buffer contents.
    pub fn set_data(&self, data: &[I]) -> Result<()> {
        self.object.ensure_live("index buffer")?;
        byte_len(data.len(), size_of::<I>())?;
        let buffer = self.object.buffer.raw();
        let usage = self.usage;
        self.object.core.with_gl(|gl| {
            upload(gl, BufferTarget::ElementArray, buffer, bytemuck::cast_slice(data), usage)
        })?;
        self.object.len.set(data.len());
        Ok(())
    }

    /// Number of indices last uploaded.
    #[inline]
    pub fn len(&self) -> usize {
        self.object.len.get()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn handle(&self) -> ResourceHandle {
        self.object.buffer
    }

    pub(crate) fn buffer(&self) -> Result<u32> {
        self.object.ensure_live("index buffer")?;
        Ok(self.object.buffer.raw())
    }

    pub(crate) fn belongs_to(&self, context: &GraphicsContext) -> bool {
        self.object.core.belongs_to(context.shared())
    }
}

impl<I: Index> Disposable for IndexBuffer<I> {
    fn dispose(&self) -> Result<()> {
        self.object.dispose()
    }

    fn is_disposed(&self) -> bool {
        self.object.is_disposed()
    }
}

impl<I: Index> std::fmt::Debug for IndexBuffer<I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexBuffer")
            .field("buffer", &self.object.buffer.raw())
            .field("len", &self.len())
            .field("type", &I::TYPE)
            .finish()
    }
}
