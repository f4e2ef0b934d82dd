//! OpenGL backend over a live [`glow::Context`].
//!
//! # Safety
//!
//! The wrapped context must be current on the calling thread for the whole
//! lifetime of the [`GlowDevice`]. Every method issues raw GL calls.

use std::num::NonZeroU32;

use glow::HasContext;

use super::commands::GpuCommands;
use super::types::{
    AttribType, BlendFactor, BufferTarget, BufferUsage, Capability, ClearMask, CompareFunction,
    CullFace, FrontFace, IndexType, PixelFormat, PrimitiveType, ShaderStage, TextureParameter,
};

/// [`GpuCommands`] implementation issuing GL calls through `glow`.
pub struct GlowDevice {
    gl: glow::Context,
}

impl GlowDevice {
    /// Wraps a context that is current on this thread.
    ///
    /// # Safety
    ///
    /// `gl` must stay current on the calling thread until the device is released.
    pub unsafe fn new(gl: glow::Context) -> Self {
        Self { gl }
    }

    pub fn gl(&self) -> &glow::Context {
        &self.gl
    }
}

fn texture(name: u32) -> Option<glow::NativeTexture> {
    NonZeroU32::new(name).map(glow::NativeTexture)
}

fn shader(name: u32) -> Option<glow::NativeShader> {
    NonZeroU32::new(name).map(glow::NativeShader)
}

fn program(name: u32) -> Option<glow::NativeProgram> {
    NonZeroU32::new(name).map(glow::NativeProgram)
}

fn buffer(name: u32) -> Option<glow::NativeBuffer> {
    NonZeroU32::new(name).map(glow::NativeBuffer)
}

fn vertex_array(name: u32) -> Option<glow::NativeVertexArray> {
    NonZeroU32::new(name).map(glow::NativeVertexArray)
}

fn location(location: i32) -> glow::NativeUniformLocation {
    glow::NativeUniformLocation(location as u32)
}

// Format, type and internal format triple for `tex_image_2d`.
fn pixel_layout(format: PixelFormat) -> (i32, u32, u32) {
    match format {
        PixelFormat::Rgba8 => (glow::RGBA8 as i32, glow::RGBA, glow::UNSIGNED_BYTE),
    }
}

impl GpuCommands for GlowDevice {
    fn get_error(&mut self) -> u32 {
        unsafe { self.gl.get_error() }
    }

    fn enable(&mut self, cap: Capability) {
        unsafe { self.gl.enable(cap as u32) }
    }

    fn disable(&mut self, cap: Capability) {
        unsafe { self.gl.disable(cap as u32) }
    }

    fn blend_func(&mut self, src: BlendFactor, dst: BlendFactor) {
        unsafe { self.gl.blend_func(src as u32, dst as u32) }
    }

    fn depth_func(&mut self, func: CompareFunction) {
        unsafe { self.gl.depth_func(func as u32) }
    }

    fn front_face(&mut self, winding: FrontFace) {
        unsafe { self.gl.front_face(winding as u32) }
    }

    fn cull_face(&mut self, face: CullFace) {
        unsafe { self.gl.cull_face(face as u32) }
    }

    fn viewport(&mut self, x: i32, y: i32, width: i32, height: i32) {
        unsafe { self.gl.viewport(x, y, width, height) }
    }

    fn scissor(&mut self, x: i32, y: i32, width: i32, height: i32) {
        unsafe { self.gl.scissor(x, y, width, height) }
    }

    fn clear_color(&mut self, r: f32, g: f32, b: f32, a: f32) {
        unsafe { self.gl.clear_color(r, g, b, a) }
    }

    fn clear(&mut self, mask: ClearMask) {
        unsafe { self.gl.clear(mask.bits()) }
    }

    fn create_texture(&mut self) -> u32 {
        unsafe { self.gl.create_texture() }.map_or(0, |t| t.0.get())
    }

    fn delete_texture(&mut self, name: u32) {
        if let Some(t) = texture(name) {
            unsafe { self.gl.delete_texture(t) }
        }
    }

    fn bind_texture(&mut self, unit: u32, name: u32) {
        unsafe {
            self.gl.active_texture(glow::TEXTURE0 + unit);
            self.gl.bind_texture(glow::TEXTURE_2D, texture(name));
        }
    }

    // Texture calls below act on the texture bound to the active unit. The
    // context binds the texture on its own unit before configuring or reading
    // it back.
    fn upload_texture_image(
        &mut self,
        _name: u32,
        width: i32,
        height: i32,
        format: PixelFormat,
        pixels: Option<&[u8]>,
    ) {
        let (internal, format, ty) = pixel_layout(format);
        unsafe {
            self.gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                internal,
                width,
                height,
                0,
                format,
                ty,
                glow::PixelUnpackData::Slice(pixels),
            )
        }
    }

    fn set_texture_parameter(&mut self, _name: u32, param: TextureParameter, value: i32) {
        unsafe { self.gl.tex_parameter_i32(glow::TEXTURE_2D, param as u32, value) }
    }

    fn read_texture_pixels(&mut self, name: u32, format: PixelFormat, out: &mut [u8]) {
        let (_, format, ty) = pixel_layout(format);
        unsafe {
            self.gl.bind_texture(glow::TEXTURE_2D, texture(name));
            self.gl.get_tex_image(
                glow::TEXTURE_2D,
                0,
                format,
                ty,
                glow::PixelPackData::Slice(Some(out)),
            )
        }
    }

    fn create_shader(&mut self, stage: ShaderStage) -> u32 {
        unsafe { self.gl.create_shader(stage as u32) }.map_or(0, |s| s.0.get())
    }

    fn shader_source(&mut self, name: u32, source: &str) {
        if let Some(s) = shader(name) {
            unsafe { self.gl.shader_source(s, source) }
        }
    }

    fn compile_shader(&mut self, name: u32) {
        if let Some(s) = shader(name) {
            unsafe { self.gl.compile_shader(s) }
        }
    }

    fn shader_compile_status(&mut self, name: u32) -> bool {
        shader(name).is_some_and(|s| unsafe { self.gl.get_shader_compile_status(s) })
    }

    fn shader_info_log(&mut self, name: u32) -> String {
        shader(name).map(|s| unsafe { self.gl.get_shader_info_log(s) }).unwrap_or_default()
    }

    fn delete_shader(&mut self, name: u32) {
        if let Some(s) = shader(name) {
            unsafe { self.gl.delete_shader(s) }
        }
    }

    fn create_program(&mut self) -> u32 {
        unsafe { self.gl.create_program() }.map_or(0, |p| p.0.get())
    }

    fn attach_shader(&mut self, prog: u32, name: u32) {
        if let (Some(p), Some(s)) = (program(prog), shader(name)) {
            unsafe { self.gl.attach_shader(p, s) }
        }
    }

    fn link_program(&mut self, prog: u32) {
        if let Some(p) = program(prog) {
            unsafe { self.gl.link_program(p) }
        }
    }

    fn program_link_status(&mut self, prog: u32) -> bool {
        program(prog).is_some_and(|p| unsafe { self.gl.get_program_link_status(p) })
    }

    fn program_info_log(&mut self, prog: u32) -> String {
        program(prog).map(|p| unsafe { self.gl.get_program_info_log(p) }).unwrap_or_default()
    }

    fn delete_program(&mut self, prog: u32) {
        if let Some(p) = program(prog) {
            unsafe { self.gl.delete_program(p) }
        }
    }

    fn use_program(&mut self, prog: u32) {
        unsafe { self.gl.use_program(program(prog)) }
    }

    fn uniform_location(&mut self, prog: u32, name: &str) -> Option<i32> {
        let p = program(prog)?;
        unsafe { self.gl.get_uniform_location(p, name) }.map(|l| l.0 as i32)
    }

    fn uniform_1i(&mut self, loc: i32, value: i32) {
        unsafe { self.gl.uniform_1_i32(Some(&location(loc)), value) }
    }

    fn uniform_1f(&mut self, loc: i32, value: f32) {
        unsafe { self.gl.uniform_1_f32(Some(&location(loc)), value) }
    }

    fn uniform_matrix4(&mut self, loc: i32, value: &[f32; 16]) {
        unsafe { self.gl.uniform_matrix_4_f32_slice(Some(&location(loc)), false, value) }
    }

    fn create_buffer(&mut self) -> u32 {
        unsafe { self.gl.create_buffer() }.map_or(0, |b| b.0.get())
    }

    fn bind_buffer(&mut self, target: BufferTarget, name: u32) {
        unsafe { self.gl.bind_buffer(target as u32, buffer(name)) }
    }

    fn buffer_data(&mut self, target: BufferTarget, data: &[u8], usage: BufferUsage) {
        unsafe { self.gl.buffer_data_u8_slice(target as u32, data, usage as u32) }
    }

    fn delete_buffer(&mut self, name: u32) {
        if let Some(b) = buffer(name) {
            unsafe { self.gl.delete_buffer(b) }
        }
    }

    fn create_vertex_array(&mut self) -> u32 {
        unsafe { self.gl.create_vertex_array() }.map_or(0, |v| v.0.get())
    }

    fn bind_vertex_array(&mut self, name: u32) {
        unsafe { self.gl.bind_vertex_array(vertex_array(name)) }
    }

    fn delete_vertex_array(&mut self, name: u32) {
        if let Some(v) = vertex_array(name) {
            unsafe { self.gl.delete_vertex_array(v) }
        }
    }

    fn enable_vertex_attrib_array(&mut self, index: u32) {
        unsafe { self.gl.enable_vertex_attrib_array(index) }
    }

    fn vertex_attrib_pointer(
        &mut self,
        index: u32,
        components: i32,
        ty: AttribType,
        normalized: bool,
        stride: i32,
        offset: i32,
    ) {
        unsafe {
            self.gl
                .vertex_attrib_pointer_f32(index, components, ty as u32, normalized, stride, offset)
        }
    }

    fn draw_arrays(&mut self, mode: PrimitiveType, first: i32, count: i32) {
        unsafe { self.gl.draw_arrays(mode as u32, first, count) }
    }

    fn draw_elements(&mut self, mode: PrimitiveType, count: i32, ty: IndexType, offset: i32) {
        unsafe { self.gl.draw_elements(mode as u32, count, ty as u32, offset) }
    }
}
