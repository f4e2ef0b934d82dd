//! Headless device that records every native call.
//!
//! Used by the studio and by tests: object names come from a counter, texture
//! images are kept in memory so readback returns what was uploaded, and error
//! codes can be injected to exercise failure paths.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use crate::coords::Rectangle;

use super::commands::GpuCommands;
use super::error::ErrorCode;
use super::types::{
    AttribType, BlendFactor, BufferTarget, BufferUsage, Capability, ClearMask, CompareFunction,
    CullFace, FrontFace, IndexType, PixelFormat, PrimitiveType, ShaderStage, TextureParameter,
};

/// One recorded state-mutating or resource-mutating call.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Enable(Capability),
    Disable(Capability),
    BlendFunc(BlendFactor, BlendFactor),
    DepthFunc(CompareFunction),
    FrontFace(FrontFace),
    CullFace(CullFace),
    Viewport(Rectangle),
    Scissor(Rectangle),
    ClearColor([f32; 4]),
    Clear(ClearMask),

    CreateTexture(u32),
    DeleteTexture(u32),
    BindTexture { unit: u32, texture: u32 },
    UploadTextureImage { texture: u32, width: i32, height: i32, format: PixelFormat, initialized: bool },
    SetTextureParameter { texture: u32, param: TextureParameter, value: i32 },
    ReadTexturePixels(u32),

    CreateShader(u32, ShaderStage),
    ShaderSource(u32),
    CompileShader(u32),
    DeleteShader(u32),
    CreateProgram(u32),
    AttachShader { program: u32, shader: u32 },
    LinkProgram(u32),
    DeleteProgram(u32),
    UseProgram(u32),
    Uniform1i { location: i32, value: i32 },
    Uniform1f { location: i32, value: f32 },
    UniformMatrix4 { location: i32 },

    CreateBuffer(u32),
    BindBuffer(BufferTarget, u32),
    BufferData { target: BufferTarget, len: usize, usage: BufferUsage },
    DeleteBuffer(u32),
    CreateVertexArray(u32),
    BindVertexArray(u32),
    DeleteVertexArray(u32),
    EnableVertexAttribArray(u32),
    VertexAttribPointer { index: u32, components: i32, ty: AttribType, normalized: bool, stride: i32, offset: i32 },

    DrawArrays { mode: PrimitiveType, first: i32, count: i32 },
    DrawElements { mode: PrimitiveType, count: i32, ty: IndexType, offset: i32 },

    Release,
}

type Matcher = Box<dyn Fn(&Call) -> bool>;

#[derive(Default)]
struct JournalState {
    calls: Vec<Call>,
    next_name: u32,
    pending_error: u32,
    failures: Vec<(Matcher, ErrorCode)>,
    live: HashSet<u32>,
    images: HashMap<u32, Vec<u8>>,
    sources: HashMap<u32, String>,
    attached: HashMap<u32, Vec<u32>>,
    uniforms: HashMap<(u32, String), i32>,
    released: bool,
}

/// Shared view of a [`RecordingDevice`]'s history.
///
/// Cloning is cheap; all clones observe the same device.
#[derive(Clone, Default)]
pub struct Journal {
    state: Rc<RefCell<JournalState>>,
}

impl Journal {
    /// Snapshot of every recorded call, oldest first.
    pub fn calls(&self) -> Vec<Call> {
        self.state.borrow().calls.clone()
    }

    pub fn len(&self) -> usize {
        self.state.borrow().calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forgets recorded calls; object and image bookkeeping is kept.
    pub fn clear(&self) {
        self.state.borrow_mut().calls.clear();
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.state.borrow().calls.iter().filter(|c| pred(c)).count()
    }

    /// Makes the next call matching `pred` report `code`. Each rule fires once.
    pub fn fail_on(&self, pred: impl Fn(&Call) -> bool + 'static, code: ErrorCode) {
        self.state.borrow_mut().failures.push((Box::new(pred), code));
    }

    /// Number of native objects created and not yet deleted.
    pub fn live_objects(&self) -> usize {
        self.state.borrow().live.len()
    }

    pub fn is_live(&self, name: u32) -> bool {
        self.state.borrow().live.contains(&name)
    }

    /// Image last uploaded to `texture`, if any storage was reserved.
    pub fn texture_image(&self, texture: u32) -> Option<Vec<u8>> {
        self.state.borrow().images.get(&texture).cloned()
    }

    pub fn released(&self) -> bool {
        self.state.borrow().released
    }
}

/// [`GpuCommands`] implementation with no GPU behind it.
#[derive(Default)]
pub struct RecordingDevice {
    journal: Journal,
}

impl RecordingDevice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn journal(&self) -> Journal {
        self.journal.clone()
    }

    fn record(&mut self, call: Call) {
        let mut state = self.journal.state.borrow_mut();
        if let Some(pos) = state.failures.iter().position(|(matches, _)| matches(&call)) {
            let (_, code) = state.failures.remove(pos);
            state.pending_error = code.0;
        }
        state.calls.push(call);
    }

    fn create(&mut self, make: impl FnOnce(u32) -> Call) -> u32 {
        let name = {
            let mut state = self.journal.state.borrow_mut();
            state.next_name += 1;
            let name = state.next_name;
            state.live.insert(name);
            name
        };
        self.record(make(name));
        name
    }

    fn delete(&mut self, name: u32, call: Call) {
        {
            let mut state = self.journal.state.borrow_mut();
            state.live.remove(&name);
            state.images.remove(&name);
            state.sources.remove(&name);
            state.attached.remove(&name);
        }
        self.record(call);
    }
}

impl GpuCommands for RecordingDevice {
    fn get_error(&mut self) -> u32 {
        std::mem::take(&mut self.journal.state.borrow_mut().pending_error)
    }

    fn enable(&mut self, cap: Capability) {
        self.record(Call::Enable(cap));
    }

    fn disable(&mut self, cap: Capability) {
        self.record(Call::Disable(cap));
    }

    fn blend_func(&mut self, src: BlendFactor, dst: BlendFactor) {
        self.record(Call::BlendFunc(src, dst));
    }

    fn depth_func(&mut self, func: CompareFunction) {
        self.record(Call::DepthFunc(func));
    }

    fn front_face(&mut self, winding: FrontFace) {
        self.record(Call::FrontFace(winding));
    }

    fn cull_face(&mut self, face: CullFace) {
        self.record(Call::CullFace(face));
    }

    fn viewport(&mut self, x: i32, y: i32, width: i32, height: i32) {
        self.record(Call::Viewport(Rectangle::new(x, y, width, height)));
    }

    fn scissor(&mut self, x: i32, y: i32, width: i32, height: i32) {
        self.record(Call::Scissor(Rectangle::new(x, y, width, height)));
    }

    fn clear_color(&mut self, r: f32, g: f32, b: f32, a: f32) {
        self.record(Call::ClearColor([r, g, b, a]));
    }

    fn clear(&mut self, mask: ClearMask) {
        self.record(Call::Clear(mask));
    }

    fn create_texture(&mut self) -> u32 {
        self.create(Call::CreateTexture)
    }

    fn delete_texture(&mut self, texture: u32) {
        self.delete(texture, Call::DeleteTexture(texture));
    }

    fn bind_texture(&mut self, unit: u32, texture: u32) {
        self.record(Call::BindTexture { unit, texture });
    }

    fn upload_texture_image(
        &mut self,
        texture: u32,
        width: i32,
        height: i32,
        format: PixelFormat,
        pixels: Option<&[u8]>,
    ) {
        let len = width.max(0) as usize * height.max(0) as usize * format.bytes_per_pixel();
        let image = match pixels {
            Some(bytes) => bytes.to_vec(),
            None => vec![0; len],
        };
        self.journal.state.borrow_mut().images.insert(texture, image);
        self.record(Call::UploadTextureImage {
            texture,
            width,
            height,
            format,
            initialized: pixels.is_some(),
        });
    }

    fn set_texture_parameter(&mut self, texture: u32, param: TextureParameter, value: i32) {
        self.record(Call::SetTextureParameter { texture, param, value });
    }

    fn read_texture_pixels(&mut self, texture: u32, _format: PixelFormat, out: &mut [u8]) {
        if let Some(image) = self.journal.state.borrow().images.get(&texture) {
            let n = image.len().min(out.len());
            out[..n].copy_from_slice(&image[..n]);
        }
        self.record(Call::ReadTexturePixels(texture));
    }

    fn create_shader(&mut self, stage: ShaderStage) -> u32 {
        self.create(|name| Call::CreateShader(name, stage))
    }

    fn shader_source(&mut self, shader: u32, source: &str) {
        self.journal.state.borrow_mut().sources.insert(shader, source.to_owned());
        self.record(Call::ShaderSource(shader));
    }

    fn compile_shader(&mut self, shader: u32) {
        self.record(Call::CompileShader(shader));
    }

    // Empty sources are the only thing this device refuses to compile.
    fn shader_compile_status(&mut self, shader: u32) -> bool {
        self.journal
            .state
            .borrow()
            .sources
            .get(&shader)
            .is_some_and(|src| !src.trim().is_empty())
    }

    fn shader_info_log(&mut self, shader: u32) -> String {
        if self.shader_compile_status(shader) {
            String::new()
        } else {
            "empty shader source".to_owned()
        }
    }

    fn delete_shader(&mut self, shader: u32) {
        self.delete(shader, Call::DeleteShader(shader));
    }

    fn create_program(&mut self) -> u32 {
        self.create(Call::CreateProgram)
    }

    fn attach_shader(&mut self, program: u32, shader: u32) {
        self.journal
            .state
            .borrow_mut()
            .attached
            .entry(program)
            .or_default()
            .push(shader);
        self.record(Call::AttachShader { program, shader });
    }

    fn link_program(&mut self, program: u32) {
        self.record(Call::LinkProgram(program));
    }

    fn program_link_status(&mut self, program: u32) -> bool {
        self.journal
            .state
            .borrow()
            .attached
            .get(&program)
            .is_some_and(|shaders| !shaders.is_empty())
    }

    fn program_info_log(&mut self, program: u32) -> String {
        if self.program_link_status(program) {
            String::new()
        } else {
            "no shaders attached".to_owned()
        }
    }

    fn delete_program(&mut self, program: u32) {
        self.delete(program, Call::DeleteProgram(program));
    }

    fn use_program(&mut self, program: u32) {
        self.record(Call::UseProgram(program));
    }

    fn uniform_location(&mut self, program: u32, name: &str) -> Option<i32> {
        let mut state = self.journal.state.borrow_mut();
        let next = state.uniforms.len() as i32;
        Some(*state.uniforms.entry((program, name.to_owned())).or_insert(next))
    }

    fn uniform_1i(&mut self, location: i32, value: i32) {
        self.record(Call::Uniform1i { location, value });
    }

    fn uniform_1f(&mut self, location: i32, value: f32) {
        self.record(Call::Uniform1f { location, value });
    }

    fn uniform_matrix4(&mut self, location: i32, _value: &[f32; 16]) {
        self.record(Call::UniformMatrix4 { location });
    }

    fn create_buffer(&mut self) -> u32 {
        self.create(Call::CreateBuffer)
    }

    fn bind_buffer(&mut self, target: BufferTarget, buffer: u32) {
        self.record(Call::BindBuffer(target, buffer));
    }

    fn buffer_data(&mut self, target: BufferTarget, data: &[u8], usage: BufferUsage) {
        self.record(Call::BufferData { target, len: data.len(), usage });
    }

    fn delete_buffer(&mut self, buffer: u32) {
        self.delete(buffer, Call::DeleteBuffer(buffer));
    }

    fn create_vertex_array(&mut self) -> u32 {
        self.create(Call::CreateVertexArray)
    }

    fn bind_vertex_array(&mut self, vertex_array: u32) {
        self.record(Call::BindVertexArray(vertex_array));
    }

    fn delete_vertex_array(&mut self, vertex_array: u32) {
        self.delete(vertex_array, Call::DeleteVertexArray(vertex_array));
    }

    fn enable_vertex_attrib_array(&mut self, index: u32) {
        self.record(Call::EnableVertexAttribArray(index));
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
        self.record(Call::VertexAttribPointer { index, components, ty, normalized, stride, offset });
    }

    fn draw_arrays(&mut self, mode: PrimitiveType, first: i32, count: i32) {
        self.record(Call::DrawArrays { mode, first, count });
    }

    fn draw_elements(&mut self, mode: PrimitiveType, count: i32, ty: IndexType, offset: i32) {
        self.record(Call::DrawElements { mode, count, ty, offset });
    }

    fn release(&mut self) {
        self.journal.state.borrow_mut().released = true;
        self.record(Call::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::Gl;
    use crate::error::GfxError;

    #[test]
    fn names_are_unique_and_tracked() {
        let mut dev = RecordingDevice::new();
        let journal = dev.journal();

        let a = dev.create_texture();
        let b = dev.create_buffer();
        assert_ne!(a, b);
        assert_eq!(journal.live_objects(), 2);

        dev.delete_texture(a);
        assert!(!journal.is_live(a));
        assert!(journal.is_live(b));
    }

    #[test]
    fn injected_error_fires_once_on_matching_call() {
        let mut dev = RecordingDevice::new();
        let journal = dev.journal();
        journal.fail_on(|c| matches!(c, Call::Enable(Capability::Blend)), ErrorCode::INVALID_ENUM);

        let mut gl = Gl::new(&mut dev);
        gl.toggle(Capability::DepthTest, true).unwrap();

        let err = gl.toggle(Capability::Blend, true).unwrap_err();
        assert!(matches!(
            err,
            GfxError::Native { op: "Enable", code: ErrorCode::INVALID_ENUM }
        ));

        gl.toggle(Capability::Blend, true).unwrap();
    }

    #[test]
    fn readback_returns_uploaded_image() {
        let mut dev = RecordingDevice::new();
        let tex = dev.create_texture();
        dev.upload_texture_image(tex, 1, 1, PixelFormat::Rgba8, Some(&[9, 8, 7, 6]));

        let mut out = [0u8; 4];
        dev.read_texture_pixels(tex, PixelFormat::Rgba8, &mut out);
        assert_eq!(out, [9, 8, 7, 6]);
    }

    #[test]
    fn uninitialized_upload_reserves_zeroed_storage() {
        let mut dev = RecordingDevice::new();
        let journal = dev.journal();
        let tex = dev.create_texture();
        dev.upload_texture_image(tex, 2, 3, PixelFormat::Rgba8, None);
        assert_eq!(journal.texture_image(tex), Some(vec![0; 24]));
    }

    #[test]
    fn empty_source_fails_compilation() {
        let mut dev = RecordingDevice::new();
        let shader = dev.create_shader(ShaderStage::Vertex);
        let mut gl = Gl::new(&mut dev);

        let err = gl.compile_shader(shader, ShaderStage::Vertex, "   ").unwrap_err();
        assert!(matches!(err, GfxError::ShaderCompile { stage: ShaderStage::Vertex, .. }));
    }
}
