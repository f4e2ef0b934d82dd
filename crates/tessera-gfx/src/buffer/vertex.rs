use std::cell::Cell;
use std::marker::PhantomData;
use std::mem::size_of;
use std::rc::Rc;

use bytemuck::Pod;

use crate::context::GraphicsContext;
use crate::device::{AttribType, BufferTarget, BufferUsage};
use crate::error::{GfxError, Result};
use crate::resource::{Disposable, ResourceHandle, ResourceKind};

use super::object::{byte_len, upload, BufferObject};

/// One attribute of a vertex layout, fed to attribute slot = its position in
/// [`Vertex::ATTRIBUTES`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct VertexAttribute {
    pub components: i32,
    pub ty: AttribType,
    pub normalized: bool,
    /// Byte offset inside the vertex.
    pub offset: i32,
}

impl VertexAttribute {
    pub const fn f32(components: i32, offset: i32) -> Self {
        Self { components, ty: AttribType::F32, normalized: false, offset }
    }

    /// Bytes read as `[0, 1]` floats, the usual encoding of a [`Color4`](crate::Color4).
    pub const fn unorm8(components: i32, offset: i32) -> Self {
        Self { components, ty: AttribType::U8, normalized: true, offset }
    }
}

/// Plain-data vertex with a fixed attribute layout.
pub trait Vertex: Pod {
    const ATTRIBUTES: &'static [VertexAttribute];
}

/// GPU buffer of `T` vertices together with the vertex array describing `T`.
pub struct VertexBuffer<T: Vertex> {
    object: Rc<BufferObject>,
    usage: BufferUsage,
    _vertex: PhantomData<T>,
}

impl<T: Vertex> VertexBuffer<T> {
    pub fn new(context: &GraphicsContext, data: &[T], usage: BufferUsage) -> Result<Self> {
        let stride = byte_len(1, size_of::<T>())?;
        byte_len(data.len(), size_of::<T>())?;

        let shared = context.shared();
        shared.ensure_live()?;
        let (vertex_array, buffer) = shared.with_gl(|gl| {
            let vertex_array = gl.create_vertex_array()?;
            match gl.create_buffer() {
                Ok(buffer) => Ok((vertex_array, buffer)),
                Err(err) => {
                    if let Err(cleanup) = gl.delete_vertex_array(vertex_array) {
                        log::warn!("cleanup of vertex array {vertex_array} failed: {cleanup}");
                    }
                    Err(err)
                }
            }
        })?;

        let object = shared.adopt(|core| BufferObject {
            core,
            buffer: ResourceHandle::new(ResourceKind::Buffer, buffer),
            vertex_array: Some(ResourceHandle::new(ResourceKind::VertexArray, vertex_array)),
            len: Cell::new(0),
        });
        let vb = Self { object, usage, _vertex: PhantomData };

        let configured = shared.with_gl(|gl| {
            gl.bind_vertex_array(vertex_array)?;
            gl.bind_buffer(BufferTarget::Array, buffer)?;
            gl.buffer_data(BufferTarget::Array, bytemuck::cast_slice(data), usage)?;
            for (index, attribute) in T::ATTRIBUTES.iter().enumerate() {
                gl.vertex_attribute(
                    index as u32,
                    attribute.components,
                    attribute.ty,
                    attribute.normalized,
                    stride,
                    attribute.offset,
                )?;
            }
            gl.bind_vertex_array(0)
        });
        if let Err(err) = configured {
            if let Err(cleanup) = vb.dispose() {
                log::warn!("cleanup of partially created vertex buffer failed: {cleanup}");
            }
            return Err(err);
        }

        vb.object.len.set(data.len());
        log::debug!("created vertex buffer {buffer} with {} vertices", data.len());
        Ok(vb)
    }

    /// Replaces the buffer contents.
    pub fn set_data(&self, data: &[T]) -> Result<()> {
        self.object.ensure_live("vertex buffer")?;
        byte_len(data.len(), size_of::<T>())?;
        let buffer = self.object.buffer.raw();
        let usage = self.usage;
        self.object.core.with_gl(|gl| upload(gl, BufferTarget::Array, buffer, bytemuck::cast_slice(data), usage))?;
        self.object.len.set(data.len());
        Ok(())
    }

    /// Number of vertices last uploaded.
    #[inline]
    pub fn len(&self) -> usize {
        self.object.len.get()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn usage(&self) -> BufferUsage {
        self.usage
    }

    pub fn handle(&self) -> ResourceHandle {
        self.object.buffer
    }

    pub(crate) fn vertex_array(&self) -> Result<u32> {
        self.object.ensure_live("vertex buffer")?;
        self.object
            .vertex_array
            .map(ResourceHandle::raw)
            .ok_or_else(|| GfxError::invalid("vertex buffer", "no vertex array"))
    }

    pub(crate) fn belongs_to(&self, context: &GraphicsContext) -> bool {
        self.object.core.belongs_to(context.shared())
    }
}

impl<T: Vertex> Disposable for VertexBuffer<T> {
    fn dispose(&self) -> Result<()> {
        self.object.dispose()
    }

    fn is_disposed(&self) -> bool {
        self.object.is_disposed()
    }
}

impl<T: Vertex> std::fmt::Debug for VertexBuffer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VertexBuffer")
            .field("buffer", &self.object.buffer.raw())
            .field("len", &self.len())
            .field("usage", &self.usage)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use bytemuck::Zeroable;

    use super::*;
    use crate::context::ContextConfig;
    use crate::coords::Color4;
    use crate::device::{Call, ErrorCode, Journal, RecordingDevice};

    #[repr(C)]
    #[derive(Debug, Copy, Clone, Pod, Zeroable)]
    struct ColoredVertex {
        position: [f32; 2],
        color: Color4,
    }

    impl Vertex for ColoredVertex {
        const ATTRIBUTES: &'static [VertexAttribute] =
            &[VertexAttribute::f32(2, 0), VertexAttribute::unorm8(4, 8)];
    }

    fn context() -> (GraphicsContext, Journal) {
        let device = RecordingDevice::new();
        let journal = device.journal();
        (GraphicsContext::new(device, ContextConfig::default()).unwrap(), journal)
    }

    fn triangle() -> [ColoredVertex; 3] {
        [
            ColoredVertex { position: [0.0, 0.0], color: Color4::WHITE },
            ColoredVertex { position: [1.0, 0.0], color: Color4::WHITE },
            ColoredVertex { position: [0.0, 1.0], color: Color4::WHITE },
        ]
    }

    #[test]
    fn layout_follows_the_vertex_attributes() {
        let (ctx, journal) = context();
        let vb = VertexBuffer::new(&ctx, &triangle(), BufferUsage::StaticDraw).unwrap();

        assert_eq!(vb.len(), 3);
        assert!(journal.calls().contains(&Call::BufferData {
            target: BufferTarget::Array,
            len: 3 * 12,
            usage: BufferUsage::StaticDraw,
        }));
        assert!(journal.calls().contains(&Call::VertexAttribPointer {
            index: 1,
            components: 4,
            ty: AttribType::U8,
            normalized: true,
            stride: 12,
            offset: 8,
        }));
        assert_eq!(journal.calls().last(), Some(&Call::BindVertexArray(0)));
    }

    #[test]
    fn set_data_replaces_contents() {
        let (ctx, journal) = context();
        let vb = VertexBuffer::new(&ctx, &triangle(), BufferUsage::DynamicDraw).unwrap();
        journal.clear();

        vb.set_data(&triangle()[..1]).unwrap();

        assert_eq!(vb.len(), 1);
        assert_eq!(journal.count(|c| matches!(c, Call::BufferData { len: 12, .. })), 1);
    }

    #[test]
    fn failed_buffer_creation_frees_the_vertex_array() {
        let (ctx, journal) = context();
        journal.fail_on(|c| matches!(c, Call::CreateBuffer(_)), ErrorCode::OUT_OF_MEMORY);

        let err = VertexBuffer::new(&ctx, &triangle(), BufferUsage::StaticDraw).unwrap_err();

        assert!(err.to_string().contains("glGenBuffers"));
        assert_eq!(journal.count(|c| matches!(c, Call::DeleteVertexArray(_))), 1);
        assert_eq!(ctx.live_objects(), 0);
    }

    #[test]
    fn dispose_frees_buffer_and_vertex_array() {
        let (ctx, journal) = context();
        let vb = VertexBuffer::new(&ctx, &triangle(), BufferUsage::StaticDraw).unwrap();

        vb.dispose().unwrap();

        assert!(!journal.is_live(vb.handle().raw()));
        assert_eq!(journal.count(|c| matches!(c, Call::DeleteVertexArray(_))), 1);
        assert!(vb.set_data(&triangle()).is_err());
    }
}
