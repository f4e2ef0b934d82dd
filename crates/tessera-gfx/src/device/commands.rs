use super::types::{
    AttribType, BlendFactor, BufferTarget, BufferUsage, Capability, ClearMask, CompareFunction,
    CullFace, FrontFace, IndexType, PixelFormat, PrimitiveType, ShaderStage, TextureParameter,
};

/// Raw immediate-mode command surface of a GPU device.
///
/// Implementations forward each call to the native API and never translate
/// errors themselves: the caller polls [`get_error`](Self::get_error) after
/// every call. Object handles are plain `u32` names where `0` means "no object",
/// matching GL conventions.
///
/// The interface is single-threaded. An implementation is owned by exactly one
/// `GraphicsContext` and is only ever called from the thread that owns it.
pub trait GpuCommands {
    /// Returns and clears the pending error code (`0` when none).
    fn get_error(&mut self) -> u32;

    // ── device state ──────────────────────────────────────────────────────

    fn enable(&mut self, cap: Capability);
    fn disable(&mut self, cap: Capability);
    fn blend_func(&mut self, src: BlendFactor, dst: BlendFactor);
    fn depth_func(&mut self, func: CompareFunction);
    fn front_face(&mut self, winding: FrontFace);
    fn cull_face(&mut self, face: CullFace);

    /// Rectangle in native (bottom-left origin) coordinates.
    fn viewport(&mut self, x: i32, y: i32, width: i32, height: i32);

    /// Rectangle in native (bottom-left origin) coordinates.
    fn scissor(&mut self, x: i32, y: i32, width: i32, height: i32);

    fn clear_color(&mut self, r: f32, g: f32, b: f32, a: f32);
    fn clear(&mut self, mask: ClearMask);

    // ── textures ──────────────────────────────────────────────────────────

    fn create_texture(&mut self) -> u32;
    fn delete_texture(&mut self, texture: u32);

    /// Makes `unit` active and binds `texture` to it.
    fn bind_texture(&mut self, unit: u32, texture: u32);

    /// Allocates storage for the bound texture; `None` reserves it uninitialized.
    fn upload_texture_image(
        &mut self,
        texture: u32,
        width: i32,
        height: i32,
        format: PixelFormat,
        pixels: Option<&[u8]>,
    );

    fn set_texture_parameter(&mut self, texture: u32, param: TextureParameter, value: i32);

    /// Reads the whole level-0 image of `texture` into `out`.
    fn read_texture_pixels(&mut self, texture: u32, format: PixelFormat, out: &mut [u8]);

    // ── shaders ───────────────────────────────────────────────────────────

    fn create_shader(&mut self, stage: ShaderStage) -> u32;
    fn shader_source(&mut self, shader: u32, source: &str);
    fn compile_shader(&mut self, shader: u32);
    fn shader_compile_status(&mut self, shader: u32) -> bool;
    fn shader_info_log(&mut self, shader: u32) -> String;
    fn delete_shader(&mut self, shader: u32);

    fn create_program(&mut self) -> u32;
    fn attach_shader(&mut self, program: u32, shader: u32);
    fn link_program(&mut self, program: u32);
    fn program_link_status(&mut self, program: u32) -> bool;
    fn program_info_log(&mut self, program: u32) -> String;
    fn delete_program(&mut self, program: u32);
    fn use_program(&mut self, program: u32);

    /// Location of an active uniform of `program`, `None` if it does not exist.
    fn uniform_location(&mut self, program: u32, name: &str) -> Option<i32>;
    fn uniform_1i(&mut self, location: i32, value: i32);
    fn uniform_1f(&mut self, location: i32, value: f32);

    /// Column-major 4x4 matrix.
    fn uniform_matrix4(&mut self, location: i32, value: &[f32; 16]);

    // ── buffers ───────────────────────────────────────────────────────────

    fn create_buffer(&mut self) -> u32;
    fn bind_buffer(&mut self, target: BufferTarget, buffer: u32);
    fn buffer_data(&mut self, target: BufferTarget, data: &[u8], usage: BufferUsage);
    fn delete_buffer(&mut self, buffer: u32);

    fn create_vertex_array(&mut self) -> u32;
    fn bind_vertex_array(&mut self, vertex_array: u32);
    fn delete_vertex_array(&mut self, vertex_array: u32);
    fn enable_vertex_attrib_array(&mut self, index: u32);
    fn vertex_attrib_pointer(
        &mut self,
        index: u32,
        components: i32,
        ty: AttribType,
        normalized: bool,
        stride: i32,
        offset: i32,
    );

    // ── draws ─────────────────────────────────────────────────────────────

    fn draw_arrays(&mut self, mode: PrimitiveType, first: i32, count: i32);

    /// `offset` is in bytes into the bound element buffer.
    fn draw_elements(&mut self, mode: PrimitiveType, count: i32, ty: IndexType, offset: i32);

    /// Called once when the owning context tears down, after every object
    /// created through it has been released.
    fn release(&mut self) {}
}
