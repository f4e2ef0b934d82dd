use std::mem::size_of;
use std::rc::Rc;

use crate::buffer::{Index, IndexBuffer, Vertex, VertexBuffer};
use crate::coords::{Color4, Rectangle, SurfaceSize};
use crate::device::{BufferTarget, ClearMask, GpuCommands, PrimitiveType};
use crate::error::{GfxError, Result};
use crate::resource::{Disposable, Lifecycle};
use crate::shader::ShaderProgram;
use crate::state::{BlendState, DepthBufferState, RasterizerState, RenderStateCache};

use super::config::ContextConfig;
use super::shared::ContextShared;

/// Owner of a native device and everything created through it.
///
/// State setters diff against the cached state and only reach the device
/// when something changed. Rectangles are given in surface pixels with a
/// top-left origin.
///
/// Disposing the context (explicitly or by dropping it) disposes every object
/// it created that is still alive, then releases the device. Objects that
/// outlive their context are inert: their own disposal becomes a no-op and
/// any other operation fails with [`GfxError::ContextDisposed`].
pub struct GraphicsContext {
    shared: Rc<ContextShared>,
    cache: RenderStateCache,
    lifecycle: Lifecycle,
}

impl GraphicsContext {
    /// Takes ownership of `device` and sends the configured initial state.
    ///
    /// If the initial state cannot be installed the device is released
    /// before the error is returned.
    pub fn new(device: impl GpuCommands + 'static, config: ContextConfig) -> Result<Self> {
        config.validate()?;

        let shared = Rc::new(ContextShared::new(Box::new(device), config.texture_units));
        let cache = match shared.with_gl(|gl| RenderStateCache::install(gl, &config)) {
            Ok(cache) => cache,
            Err(err) => {
                shared.release_device();
                return Err(err);
            }
        };

        log::debug!(
            "graphics context created: {}x{} surface, {} texture units",
            config.surface_width,
            config.surface_height,
            config.texture_units
        );
        Ok(Self { shared, cache, lifecycle: Lifecycle::new() })
    }

    pub(crate) fn shared(&self) -> &Rc<ContextShared> {
        &self.shared
    }

    /// `true` from the moment teardown starts.
    pub fn is_disposing(&self) -> bool {
        self.shared.is_disposing()
    }

    pub fn surface_size(&self) -> SurfaceSize {
        self.cache.surface()
    }

    pub fn blend_state(&self) -> BlendState {
        self.cache.blend()
    }

    pub fn depth_state(&self) -> DepthBufferState {
        self.cache.depth()
    }

    pub fn rasterizer_state(&self) -> RasterizerState {
        self.cache.rasterizer()
    }

    pub fn viewport(&self) -> Rectangle {
        self.cache.viewport()
    }

    pub fn scissor(&self) -> Option<Rectangle> {
        self.cache.scissor()
    }

    pub fn clear_color(&self) -> Color4 {
        self.cache.clear_color()
    }

    /// Texture units currently held by live textures.
    pub fn texture_units_in_use(&self) -> usize {
        self.shared.units_in_use()
    }

    pub fn texture_unit_capacity(&self) -> usize {
        self.shared.unit_capacity()
    }

    /// Objects created through this context and not yet disposed.
    pub fn live_objects(&self) -> usize {
        self.shared.live_objects()
    }

    // ── render state ─────────────────────────────────────────────────────

    pub fn set_blend_state(&mut self, state: BlendState) -> Result<()> {
        self.shared.with_gl(|gl| self.cache.set_blend(gl, state))
    }

    pub fn set_depth_state(&mut self, state: DepthBufferState) -> Result<()> {
        self.shared.with_gl(|gl| self.cache.set_depth(gl, state))
    }

    pub fn set_rasterizer_state(&mut self, state: RasterizerState) -> Result<()> {
        self.shared.with_gl(|gl| self.cache.set_rasterizer(gl, state))
    }

    pub fn set_viewport(&mut self, viewport: Rectangle) -> Result<()> {
        self.shared.with_gl(|gl| self.cache.set_viewport(gl, viewport))
    }

    /// `None` disables scissor testing.
    pub fn set_scissor(&mut self, scissor: Option<Rectangle>) -> Result<()> {
        self.shared.with_gl(|gl| self.cache.set_scissor(gl, scissor))
    }

    /// Tells the context the host surface changed size.
    pub fn resize(&mut self, width: i32, height: i32) -> Result<()> {
        self.shared.with_gl(|gl| self.cache.resize(gl, SurfaceSize::new(width, height)))
    }

    // ── clearing ─────────────────────────────────────────────────────────

    /// Clears color and depth to `color`.
    pub fn clear(&mut self, color: Color4) -> Result<()> {
        self.clear_with(color, ClearMask::COLOR | ClearMask::DEPTH)
    }

    /// The clear color is only re-sent when it changed; the clear itself is
    /// always issued.
    pub fn clear_with(&mut self, color: Color4, mask: ClearMask) -> Result<()> {
        self.shared.with_gl(|gl| {
            self.cache.set_clear_color(gl, color)?;
            gl.clear(mask)
        })
    }

    // ── drawing ──────────────────────────────────────────────────────────

    pub fn set_shader_program(&self, program: &ShaderProgram) -> Result<()> {
        if program.is_disposed() {
            return Err(GfxError::invalid("program", "program has been disposed"));
        }
        if !program.belongs_to(self) {
            return Err(GfxError::invalid("program", "created by another context"));
        }
        self.shared.use_program(program.handle().raw())
    }

    pub fn draw<T: Vertex>(&self, primitive: PrimitiveType, vertices: &VertexBuffer<T>) -> Result<()> {
        self.draw_range(primitive, vertices, 0, vertices.len())
    }

    pub fn draw_range<T: Vertex>(
        &self,
        primitive: PrimitiveType,
        vertices: &VertexBuffer<T>,
        start_vertex: usize,
        vertex_count: usize,
    ) -> Result<()> {
        if !vertices.belongs_to(self) {
            return Err(GfxError::invalid("vertices", "created by another context"));
        }
        check_range("vertex range", start_vertex, vertex_count, vertices.len())?;
        let vertex_array = vertices.vertex_array()?;
        let (first, count) = (to_i32(start_vertex)?, to_i32(vertex_count)?);

        self.shared.with_gl(|gl| {
            gl.bind_vertex_array(vertex_array)?;
            gl.draw_arrays(primitive, first, count)
        })
    }

    pub fn draw_indexed<T: Vertex, I: Index>(
        &self,
        primitive: PrimitiveType,
        vertices: &VertexBuffer<T>,
        indices: &IndexBuffer<I>,
    ) -> Result<()> {
        self.draw_indexed_range(primitive, vertices, indices, 0, indices.len())
    }

    /// Draws `index_count` indices starting at `start_index`.
    pub fn draw_indexed_range<T: Vertex, I: Index>(
        &self,
        primitive: PrimitiveType,
        vertices: &VertexBuffer<T>,
        indices: &IndexBuffer<I>,
        start_index: usize,
        index_count: usize,
    ) -> Result<()> {
        if !vertices.belongs_to(self) || !indices.belongs_to(self) {
            return Err(GfxError::invalid("buffers", "created by another context"));
        }
        check_range("index range", start_index, index_count, indices.len())?;
        let vertex_array = vertices.vertex_array()?;
        let element_buffer = indices.buffer()?;
        let count = to_i32(index_count)?;
        let offset = to_i32(start_index * size_of::<I>())?;

        self.shared.with_gl(|gl| {
            gl.bind_vertex_array(vertex_array)?;
            gl.bind_buffer(BufferTarget::ElementArray, element_buffer)?;
            gl.draw_elements(primitive, count, I::TYPE, offset)
        })
    }
}

impl Disposable for GraphicsContext {
    fn dispose(&self) -> Result<()> {
        self.lifecycle.run(
            || self.shared.cascade(),
            || {
                self.shared.release_device();
                Ok(())
            },
        )
    }

    fn is_disposed(&self) -> bool {
        self.lifecycle.is_disposed()
    }
}

impl Drop for GraphicsContext {
    fn drop(&mut self) {
        if let Err(err) = self.dispose() {
            log::warn!("graphics context teardown reported an error: {err}");
        }
    }
}

fn check_range(name: &'static str, start: usize, count: usize, len: usize) -> Result<()> {
    match start.checked_add(count) {
        Some(end) if end <= len => Ok(()),
        _ => Err(GfxError::invalid(name, format!("{start}..{start}+{count} exceeds {len} elements"))),
    }
}

fn to_i32(n: usize) -> Result<i32> {
    i32::try_from(n).map_err(|_| GfxError::invalid("count", format!("{n} does not fit the native range")))
}

#[cfg(test)]
mod tests {
    use bytemuck::{Pod, Zeroable};

    use super::*;
    use crate::buffer::VertexAttribute;
    use crate::device::{BufferUsage, Call, Capability, ErrorCode, IndexType, Journal, RecordingDevice};
    use crate::shader::Shader;
    use crate::texture::Texture;

    fn context_with(config: ContextConfig) -> (GraphicsContext, Journal) {
        let device = RecordingDevice::new();
        let journal = device.journal();
        (GraphicsContext::new(device, config).unwrap(), journal)
    }

    fn context() -> (GraphicsContext, Journal) {
        context_with(ContextConfig::default())
    }

    #[repr(C)]
    #[derive(Copy, Clone, Pod, Zeroable)]
    struct Position([f32; 2]);

    impl Vertex for Position {
        const ATTRIBUTES: &'static [VertexAttribute] = &[VertexAttribute::f32(2, 0)];
    }

    fn quad(ctx: &GraphicsContext) -> (VertexBuffer<Position>, IndexBuffer<u16>) {
        let vertices = [Position([0.0, 0.0]), Position([1.0, 0.0]), Position([0.0, 1.0]), Position([1.0, 1.0])];
        let vb = VertexBuffer::new(ctx, &vertices, BufferUsage::StaticDraw).unwrap();
        let ib = IndexBuffer::new(ctx, &[0u16, 1, 2, 2, 1, 3], BufferUsage::StaticDraw).unwrap();
        (vb, ib)
    }

    // ── texture units ────────────────────────────────────────────────────

    #[test]
    fn eight_unit_scenario() {
        let (ctx, _journal) = context_with(ContextConfig::default().with_texture_units(8));

        let mut textures: Vec<Texture> = (0..8).map(|_| Texture::new(&ctx, 4, 4).unwrap()).collect();
        let units: Vec<u32> = textures.iter().map(|t| t.unit().index()).collect();
        assert_eq!(units, [0, 1, 2, 3, 4, 5, 6, 7]);

        let err = Texture::new(&ctx, 4, 4).unwrap_err();
        assert!(matches!(err, GfxError::TextureUnitsExhausted { capacity: 8 }));
        assert_eq!(ctx.texture_units_in_use(), 8);

        textures.remove(3).dispose().unwrap();

        let replacement = Texture::new(&ctx, 4, 4).unwrap();
        assert_eq!(replacement.unit().index(), 3);
    }

    #[test]
    fn freed_units_are_not_reused_before_the_cursor_wraps() {
        let (ctx, _journal) = context_with(ContextConfig::default().with_texture_units(4));
        let first = Texture::new(&ctx, 1, 1).unwrap();
        let _second = Texture::new(&ctx, 1, 1).unwrap();
        drop(first);

        let third = Texture::new(&ctx, 1, 1).unwrap();
        assert_eq!(third.unit().index(), 2);
    }

    // ── state diffing ────────────────────────────────────────────────────

    #[test]
    fn disabled_blend_twice_issues_no_new_calls() {
        let (mut ctx, journal) = context();
        let blend_toggles = |j: &Journal| {
            j.count(|c| matches!(c, Call::Enable(Capability::Blend) | Call::Disable(Capability::Blend)))
        };
        assert_eq!(blend_toggles(&journal), 1);

        ctx.set_blend_state(BlendState::DISABLED).unwrap();
        ctx.set_blend_state(BlendState::DISABLED).unwrap();

        assert_eq!(blend_toggles(&journal), 1);
    }

    #[test]
    fn changing_blend_reapplies_decomposition() {
        let (mut ctx, journal) = context();
        journal.clear();

        ctx.set_blend_state(BlendState::ALPHA_BLEND).unwrap();
        ctx.set_blend_state(BlendState::ALPHA_BLEND).unwrap();
        ctx.set_blend_state(BlendState::DISABLED).unwrap();

        assert_eq!(
            journal.calls(),
            [
                Call::Enable(Capability::Blend),
                Call::BlendFunc(crate::device::BlendFactor::SourceAlpha, crate::device::BlendFactor::OneMinusSourceAlpha),
                Call::Disable(Capability::Blend),
            ]
        );
        assert_eq!(ctx.blend_state(), BlendState::DISABLED);
    }

    #[test]
    fn viewport_and_scissor_flip_against_surface_height() {
        let (mut ctx, journal) = context_with(ContextConfig::default().with_surface(640, 480));
        journal.clear();

        ctx.set_viewport(Rectangle::new(0, 0, 320, 240)).unwrap();
        ctx.set_scissor(Some(Rectangle::new(10, 20, 30, 40))).unwrap();

        let calls = journal.calls();
        assert!(calls.contains(&Call::Viewport(Rectangle::new(0, 240, 320, 240))));
        assert!(calls.contains(&Call::Scissor(Rectangle::new(10, 480 - 20 - 40, 30, 40))));
        assert!(calls.contains(&Call::Enable(Capability::ScissorTest)));
    }

    #[test]
    fn clear_resends_color_only_on_change() {
        let (mut ctx, journal) = context();
        journal.clear();

        ctx.clear(Color4::CORNFLOWER_BLUE).unwrap();
        ctx.clear(Color4::BLACK).unwrap();
        ctx.clear(Color4::BLACK).unwrap();

        assert_eq!(journal.count(|c| matches!(c, Call::ClearColor(_))), 1);
        assert_eq!(journal.count(|c| *c == Call::Clear(ClearMask::COLOR | ClearMask::DEPTH)), 3);
        assert_eq!(ctx.clear_color(), Color4::BLACK);
    }

    #[test]
    fn native_failure_names_the_operation() {
        let (mut ctx, journal) = context();
        journal.fail_on(|c| matches!(c, Call::Viewport(_)), ErrorCode::INVALID_VALUE);

        let err = ctx.set_viewport(Rectangle::new(0, 0, 10, 10)).unwrap_err();

        assert_eq!(err.to_string(), "GL error: function glViewport resulted in error code InvalidValue");
        assert_eq!(ctx.viewport(), Rectangle::new(0, 0, 800, 600));
    }

    #[test]
    fn failed_installation_releases_the_device() {
        let device = RecordingDevice::new();
        let journal = device.journal();
        journal.fail_on(|c| matches!(c, Call::ClearColor(_)), ErrorCode::OUT_OF_MEMORY);

        let err = GraphicsContext::new(device, ContextConfig::default()).err().unwrap();

        assert!(matches!(err, GfxError::Native { op: "ClearColor", .. }));
        assert!(journal.released());
    }

    // ── drawing ──────────────────────────────────────────────────────────

    #[test]
    fn program_binding_is_cached() {
        let (ctx, journal) = context();
        let vs = Shader::vertex(&ctx, "void main() {}").unwrap();
        let fs = Shader::fragment(&ctx, "void main() {}").unwrap();
        let program = ShaderProgram::new(&ctx, vs, fs).unwrap();

        ctx.set_shader_program(&program).unwrap();
        ctx.set_shader_program(&program).unwrap();

        assert_eq!(journal.count(|c| matches!(c, Call::UseProgram(_))), 1);
    }

    #[test]
    fn indexed_range_offsets_by_index_size() {
        let (ctx, journal) = context();
        let (vb, ib) = quad(&ctx);
        journal.clear();

        ctx.draw_indexed_range(PrimitiveType::Triangles, &vb, &ib, 3, 3).unwrap();

        assert_eq!(
            journal.calls().last(),
            Some(&Call::DrawElements { mode: PrimitiveType::Triangles, count: 3, ty: IndexType::U16, offset: 6 })
        );
    }

    #[test]
    fn draw_covers_the_whole_buffer() {
        let (ctx, journal) = context();
        let (vb, _ib) = quad(&ctx);

        ctx.draw(PrimitiveType::TriangleStrip, &vb).unwrap();

        assert_eq!(
            journal.calls().last(),
            Some(&Call::DrawArrays { mode: PrimitiveType::TriangleStrip, first: 0, count: 4 })
        );
    }

    #[test]
    fn out_of_range_draws_are_rejected() {
        let (ctx, journal) = context();
        let (vb, ib) = quad(&ctx);
        journal.clear();

        assert!(ctx.draw_range(PrimitiveType::Points, &vb, 2, 3).is_err());
        assert!(ctx.draw_indexed_range(PrimitiveType::Triangles, &vb, &ib, 4, 3).is_err());
        assert!(ctx.draw_range(PrimitiveType::Points, &vb, usize::MAX, 2).is_err());
        assert!(journal.is_empty());
    }

    // ── teardown ─────────────────────────────────────────────────────────

    #[test]
    fn dispose_cascades_before_releasing_the_device() {
        let (ctx, journal) = context();
        let texture = Texture::new(&ctx, 2, 2).unwrap();
        let (vb, ib) = quad(&ctx);
        let vs = Shader::vertex(&ctx, "void main() {}").unwrap();
        let fs = Shader::fragment(&ctx, "void main() {}").unwrap();
        let program = ShaderProgram::new(&ctx, vs, fs).unwrap();

        ctx.dispose().unwrap();

        assert!(ctx.is_disposing());
        assert!(texture.is_disposed() && vb.is_disposed() && ib.is_disposed() && program.is_disposed());
        assert_eq!(ctx.live_objects(), 0);
        assert_eq!(ctx.texture_units_in_use(), 0);
        assert_eq!(journal.live_objects(), 0);

        let calls = journal.calls();
        assert_eq!(calls.last(), Some(&Call::Release));
        assert_eq!(journal.count(|c| *c == Call::Release), 1);
    }

    #[test]
    fn objects_disposed_earlier_are_not_disposed_again() {
        let (ctx, journal) = context();
        let texture = Texture::new(&ctx, 2, 2).unwrap();
        texture.dispose().unwrap();

        ctx.dispose().unwrap();
        ctx.dispose().unwrap();

        assert_eq!(journal.count(|c| matches!(c, Call::DeleteTexture(_))), 1);
        assert_eq!(journal.count(|c| *c == Call::Release), 1);
    }

    #[test]
    fn dropping_the_context_disarms_surviving_objects() {
        let (ctx, journal) = context();
        let texture = Texture::new(&ctx, 2, 2).unwrap();

        drop(ctx);

        assert!(texture.is_disposed());
        assert!(journal.released());
        drop(texture);
        assert_eq!(journal.count(|c| matches!(c, Call::DeleteTexture(_))), 1);
    }

    #[test]
    fn disposed_context_refuses_work() {
        let (mut ctx, _journal) = context();
        ctx.dispose().unwrap();

        assert!(matches!(ctx.set_blend_state(BlendState::ALPHA_BLEND), Err(GfxError::ContextDisposed)));
        assert!(matches!(Texture::new(&ctx, 1, 1), Err(GfxError::ContextDisposed)));
        assert!(matches!(Shader::vertex(&ctx, "void main() {}"), Err(GfxError::ContextDisposed)));
    }
}
