use crate::error::{GfxError, Result};

use super::commands::GpuCommands;
use super::error::ErrorCode;
use super::types::{
    AttribType, BlendFactor, BufferTarget, BufferUsage, Capability, ClearMask, CompareFunction,
    CullFace, FrontFace, IndexType, PixelFormat, PrimitiveType, ShaderStage, TextureParameter,
};

/// Error-checked view over a borrowed [`GpuCommands`].
///
/// Every method issues one native call, polls the error code and maps a
/// non-zero code to [`GfxError::Native`] named after the GL entry point.
pub struct Gl<'a> {
    raw: &'a mut (dyn GpuCommands + 'static),
}

impl<'a> Gl<'a> {
    #[inline]
    pub fn new(raw: &'a mut (dyn GpuCommands + 'static)) -> Self {
        Self { raw }
    }

    fn check(&mut self, op: &'static str) -> Result<()> {
        let code = ErrorCode(self.raw.get_error());
        if code.is_error() {
            return Err(GfxError::Native { op, code });
        }
        Ok(())
    }

    fn created(&mut self, op: &'static str, handle: u32) -> Result<u32> {
        self.check(op)?;
        if handle == 0 {
            return Err(GfxError::CreationFailed { op });
        }
        Ok(handle)
    }

    pub fn toggle(&mut self, cap: Capability, enabled: bool) -> Result<()> {
        if enabled {
            self.raw.enable(cap);
            self.check("Enable")
        } else {
            self.raw.disable(cap);
            self.check("Disable")
        }
    }

    pub fn blend_func(&mut self, src: BlendFactor, dst: BlendFactor) -> Result<()> {
        self.raw.blend_func(src, dst);
        self.check("BlendFunc")
    }

    pub fn depth_func(&mut self, func: CompareFunction) -> Result<()> {
        self.raw.depth_func(func);
        self.check("DepthFunc")
    }

    pub fn front_face(&mut self, winding: FrontFace) -> Result<()> {
        self.raw.front_face(winding);
        self.check("FrontFace")
    }

    pub fn cull_face(&mut self, face: CullFace) -> Result<()> {
        self.raw.cull_face(face);
        self.check("CullFace")
    }

    pub fn viewport(&mut self, x: i32, y: i32, width: i32, height: i32) -> Result<()> {
        self.raw.viewport(x, y, width, height);
        self.check("Viewport")
    }

    pub fn scissor(&mut self, x: i32, y: i32, width: i32, height: i32) -> Result<()> {
        self.raw.scissor(x, y, width, height);
        self.check("Scissor")
    }

    pub fn clear_color(&mut self, [r, g, b, a]: [f32; 4]) -> Result<()> {
        self.raw.clear_color(r, g, b, a);
        self.check("ClearColor")
    }

    pub fn clear(&mut self, mask: ClearMask) -> Result<()> {
        self.raw.clear(mask);
        self.check("Clear")
    }

    pub fn create_texture(&mut self) -> Result<u32> {
        let handle = self.raw.create_texture();
        self.created("GenTextures", handle)
    }

    pub fn delete_texture(&mut self, texture: u32) -> Result<()> {
        self.raw.delete_texture(texture);
        self.check("DeleteTextures")
    }

    pub fn bind_texture(&mut self, unit: u32, texture: u32) -> Result<()> {
        self.raw.bind_texture(unit, texture);
        self.check("BindTexture")
    }

    pub fn upload_texture_image(
        &mut self,
        texture: u32,
        width: i32,
        height: i32,
        format: PixelFormat,
        pixels: Option<&[u8]>,
    ) -> Result<()> {
        self.raw.upload_texture_image(texture, width, height, format, pixels);
        self.check("TexImage2D")
    }

    pub fn set_texture_parameter(
        &mut self,
        texture: u32,
        param: TextureParameter,
        value: i32,
    ) -> Result<()> {
        self.raw.set_texture_parameter(texture, param, value);
        self.check("TexParameteri")
    }

    pub fn read_texture_pixels(
        &mut self,
        texture: u32,
        format: PixelFormat,
        out: &mut [u8],
    ) -> Result<()> {
        self.raw.read_texture_pixels(texture, format, out);
        self.check("GetTexImage")
    }

    pub fn create_shader(&mut self, stage: ShaderStage) -> Result<u32> {
        let handle = self.raw.create_shader(stage);
        self.created("CreateShader", handle)
    }

    /// Uploads `source` and compiles it, returning the info log on failure.
    pub fn compile_shader(&mut self, shader: u32, stage: ShaderStage, source: &str) -> Result<()> {
        self.raw.shader_source(shader, source);
        self.check("ShaderSource")?;
        self.raw.compile_shader(shader);
        self.check("CompileShader")?;
        let compiled = self.raw.shader_compile_status(shader);
        self.check("GetShaderiv")?;
        if !compiled {
            let log = self.raw.shader_info_log(shader);
            self.check("GetShaderInfoLog")?;
            return Err(GfxError::ShaderCompile { stage, log });
        }
        Ok(())
    }

    pub fn delete_shader(&mut self, shader: u32) -> Result<()> {
        self.raw.delete_shader(shader);
        self.check("DeleteShader")
    }

    pub fn create_program(&mut self) -> Result<u32> {
        let handle = self.raw.create_program();
        self.created("CreateProgram", handle)
    }

    /// Attaches `shaders` and links, returning the info log on failure.
    pub fn link_program(&mut self, program: u32, shaders: &[u32]) -> Result<()> {
        for &shader in shaders {
            self.raw.attach_shader(program, shader);
            self.check("AttachShader")?;
        }
        self.raw.link_program(program);
        self.check("LinkProgram")?;
        let linked = self.raw.program_link_status(program);
        self.check("GetProgramiv")?;
        if !linked {
            let log = self.raw.program_info_log(program);
            self.check("GetProgramInfoLog")?;
            return Err(GfxError::ProgramLink { log });
        }
        Ok(())
    }

    pub fn delete_program(&mut self, program: u32) -> Result<()> {
        self.raw.delete_program(program);
        self.check("DeleteProgram")
    }

    pub fn use_program(&mut self, program: u32) -> Result<()> {
        self.raw.use_program(program);
        self.check("UseProgram")
    }

    pub fn uniform_location(&mut self, program: u32, name: &str) -> Result<Option<i32>> {
        let location = self.raw.uniform_location(program, name);
        self.check("GetUniformLocation")?;
        Ok(location)
    }

    pub fn uniform_1i(&mut self, location: i32, value: i32) -> Result<()> {
        self.raw.uniform_1i(location, value);
        self.check("Uniform1i")
    }

    pub fn uniform_1f(&mut self, location: i32, value: f32) -> Result<()> {
        self.raw.uniform_1f(location, value);
        self.check("Uniform1f")
    }

    pub fn uniform_matrix4(&mut self, location: i32, value: &[f32; 16]) -> Result<()> {
        self.raw.uniform_matrix4(location, value);
        self.check("UniformMatrix4fv")
    }

    pub fn create_buffer(&mut self) -> Result<u32> {
        let handle = self.raw.create_buffer();
        self.created("GenBuffers", handle)
    }

    pub fn bind_buffer(&mut self, target: BufferTarget, buffer: u32) -> Result<()> {
        self.raw.bind_buffer(target, buffer);
        self.check("BindBuffer")
    }

    pub fn buffer_data(&mut self, target: BufferTarget, data: &[u8], usage: BufferUsage) -> Result<()> {
        self.raw.buffer_data(target, data, usage);
        self.check("BufferData")
    }

    pub fn delete_buffer(&mut self, buffer: u32) -> Result<()> {
        self.raw.delete_buffer(buffer);
        self.check("DeleteBuffers")
    }

    pub fn create_vertex_array(&mut self) -> Result<u32> {
        let handle = self.raw.create_vertex_array();
        self.created("GenVertexArrays", handle)
    }

    pub fn bind_vertex_array(&mut self, vertex_array: u32) -> Result<()> {
        self.raw.bind_vertex_array(vertex_array);
        self.check("BindVertexArray")
    }

    pub fn delete_vertex_array(&mut self, vertex_array: u32) -> Result<()> {
        self.raw.delete_vertex_array(vertex_array);
        self.check("DeleteVertexArrays")
    }

    pub fn vertex_attribute(
        &mut self,
        index: u32,
        components: i32,
        ty: AttribType,
        normalized: bool,
        stride: i32,
        offset: i32,
    ) -> Result<()> {
        self.raw.enable_vertex_attrib_array(index);
        self.check("EnableVertexAttribArray")?;
        self.raw.vertex_attrib_pointer(index, components, ty, normalized, stride, offset);
        self.check("VertexAttribPointer")
    }

    pub fn draw_arrays(&mut self, mode: PrimitiveType, first: i32, count: i32) -> Result<()> {
        self.raw.draw_arrays(mode, first, count);
        self.check("DrawArrays")
    }

    pub fn draw_elements(
        &mut self,
        mode: PrimitiveType,
        count: i32,
        ty: IndexType,
        offset: i32,
    ) -> Result<()> {
        self.raw.draw_elements(mode, count, ty, offset);
        self.check("DrawElements")
    }
}
