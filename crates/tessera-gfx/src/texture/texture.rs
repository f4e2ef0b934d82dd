use std::borrow::Cow;
use std::path::Path;
use std::rc::Rc;

use image::RgbaImage;

use crate::context::GraphicsContext;
use crate::coords::Color4;
use crate::device::{Gl, PixelFormat, TextureFilter, TextureParameter, TextureWrap};
use crate::error::{GfxError, Result};
use crate::resource::{Disposable, ObjectCore, ResourceHandle, ResourceKind, TextureUnit};

use super::color_key::apply_color_key;
use super::params::TextureParams;

const FORMAT: PixelFormat = PixelFormat::Rgba8;

/// 2D RGBA8 texture bound to its own texture unit.
///
/// Creating a texture claims a unit from the context; the unit is given back
/// when the texture is disposed, explicitly or on drop.
pub struct Texture {
    object: Rc<TextureObject>,
}

struct TextureObject {
    core: ObjectCore,
    unit: TextureUnit,
    handle: ResourceHandle,
    width: i32,
    height: i32,
    params: TextureParams,
}

impl Texture {
    /// Texture with uninitialized storage of the given size.
    pub fn new(context: &GraphicsContext, width: i32, height: i32) -> Result<Self> {
        check_size(width, height)?;
        Self::create(context, width, height, TextureParams::default(), None)
    }

    /// Texture from tightly packed RGBA8 rows, top row first.
    ///
    /// `bytes` is validated before anything is allocated. With a color key
    /// set, matching pixels are rewritten in a copy; `bytes` is not modified.
    pub fn from_bytes(
        context: &GraphicsContext,
        bytes: &[u8],
        width: i32,
        height: i32,
        params: TextureParams,
    ) -> Result<Self> {
        check_size(width, height)?;
        let expected = width as usize * height as usize * FORMAT.bytes_per_pixel();
        if bytes.len() != expected {
            return Err(GfxError::invalid(
                "bytes",
                format!("{width}x{height} RGBA8 needs {expected} bytes, got {}", bytes.len()),
            ));
        }

        let pixels = match params.color_key {
            Some(key) => {
                let mut owned = bytes.to_vec();
                let replaced = apply_color_key(&mut owned, key, params.transparent_pixel);
                log::debug!("color key {:08x} replaced {replaced} pixels", key.to_rgba());
                Cow::Owned(owned)
            }
            None => Cow::Borrowed(bytes),
        };

        Self::create(context, width, height, params, Some(&pixels))
    }

    pub fn from_image(context: &GraphicsContext, image: &RgbaImage, params: TextureParams) -> Result<Self> {
        let (width, height) = image.dimensions();
        let width = i32::try_from(width).map_err(|_| GfxError::invalid("image", "width out of range"))?;
        let height = i32::try_from(height).map_err(|_| GfxError::invalid("image", "height out of range"))?;
        Self::from_bytes(context, image.as_raw(), width, height, params)
    }

    /// Decodes an image file (format chosen by extension) and uploads it.
    pub fn load_from_file(
        context: &GraphicsContext,
        path: impl AsRef<Path>,
        params: TextureParams,
    ) -> Result<Self> {
        let path = path.as_ref();
        log::debug!("loading texture from {}", path.display());
        let image = image::open(path)?.to_rgba8();
        Self::from_image(context, &image, params)
    }

    /// Decodes an in-memory encoded image (format sniffed from the header) and uploads it.
    pub fn load_from_memory(context: &GraphicsContext, encoded: &[u8], params: TextureParams) -> Result<Self> {
        let image = image::load_from_memory(encoded)?.to_rgba8();
        Self::from_image(context, &image, params)
    }

    fn create(
        context: &GraphicsContext,
        width: i32,
        height: i32,
        params: TextureParams,
        pixels: Option<&[u8]>,
    ) -> Result<Self> {
        let shared = context.shared();
        let unit = shared.allocate_unit()?;
        let raw = match shared.with_gl(|gl| gl.create_texture()) {
            Ok(raw) => raw,
            Err(err) => {
                shared.deallocate_unit(unit);
                return Err(err);
            }
        };

        let object = shared.adopt(|core| TextureObject {
            core,
            unit,
            handle: ResourceHandle::new(ResourceKind::Texture, raw),
            width,
            height,
            params,
        });
        let texture = Self { object };

        if let Err(err) = shared.with_gl(|gl| texture.object.configure(gl, pixels)) {
            if let Err(cleanup) = texture.dispose() {
                log::warn!("cleanup of partially created texture failed: {cleanup}");
            }
            return Err(err);
        }

        log::debug!("created {width}x{height} texture {raw} on unit {}", unit.index());
        Ok(texture)
    }

    /// Reads the texture back as RGBA8 bytes.
    pub fn bytes(&self) -> Result<Vec<u8>> {
        self.ensure_live()?;
        let len = self.object.width as usize * self.object.height as usize * FORMAT.bytes_per_pixel();
        let mut out = vec![0; len];
        let raw = self.object.handle.raw();
        let unit = self.object.unit.index();
        self.object.core.with_gl(|gl| {
            gl.bind_texture(unit, raw)?;
            gl.read_texture_pixels(raw, FORMAT, &mut out)
        })?;
        Ok(out)
    }

    pub fn pixels(&self) -> Result<Vec<Color4>> {
        let bytes = self.bytes()?;
        Ok(bytemuck::cast_slice::<u8, Color4>(&bytes).to_vec())
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.object.width
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.object.height
    }

    /// Texture unit the texture is bound to; samplers refer to it by index.
    #[inline]
    pub fn unit(&self) -> TextureUnit {
        self.object.unit
    }

    #[inline]
    pub fn handle(&self) -> ResourceHandle {
        self.object.handle
    }

    pub fn min_filter(&self) -> TextureFilter {
        self.object.params.min_filter
    }

    pub fn mag_filter(&self) -> TextureFilter {
        self.object.params.mag_filter
    }

    pub fn wrap_s(&self) -> TextureWrap {
        self.object.params.wrap_s
    }

    pub fn wrap_t(&self) -> TextureWrap {
        self.object.params.wrap_t
    }

    fn ensure_live(&self) -> Result<()> {
        if self.object.core.is_disposed() {
            return Err(GfxError::invalid("texture", "texture has been disposed"));
        }
        Ok(())
    }
}

impl Disposable for Texture {
    fn dispose(&self) -> Result<()> {
        self.object.dispose()
    }

    fn is_disposed(&self) -> bool {
        self.object.is_disposed()
    }
}

impl std::fmt::Debug for Texture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Texture")
            .field("handle", &self.object.handle.raw())
            .field("unit", &self.object.unit.index())
            .field("width", &self.object.width)
            .field("height", &self.object.height)
            .finish()
    }
}

impl TextureObject {
    fn configure(&self, gl: &mut Gl<'_>, pixels: Option<&[u8]>) -> Result<()> {
        let raw = self.handle.raw();
        let params = &self.params;
        gl.bind_texture(self.unit.index(), raw)?;
        gl.set_texture_parameter(raw, TextureParameter::MagFilter, params.mag_filter as i32)?;
        gl.set_texture_parameter(raw, TextureParameter::MinFilter, params.min_filter as i32)?;
        gl.set_texture_parameter(raw, TextureParameter::WrapS, params.wrap_s as i32)?;
        gl.set_texture_parameter(raw, TextureParameter::WrapT, params.wrap_t as i32)?;
        gl.upload_texture_image(raw, self.width, self.height, FORMAT, pixels)
    }
}

impl Disposable for TextureObject {
    fn dispose(&self) -> Result<()> {
        let unit = self.unit;
        self.core.dispose("texture", &[self.handle], |context| {
            // The unit table is discarded wholesale during context teardown.
            if !context.is_disposing() {
                context.deallocate_unit(unit);
            }
            Ok(())
        })
    }

    fn is_disposed(&self) -> bool {
        self.core.is_disposed()
    }
}

impl Drop for TextureObject {
    fn drop(&mut self) {
        if let Err(err) = self.dispose() {
            log::warn!("texture {} disposal on drop failed: {err}", self.handle.raw());
        }
    }
}

fn check_size(width: i32, height: i32) -> Result<()> {
    if width <= 0 || height <= 0 {
        return Err(GfxError::invalid("size", format!("{width}x{height} texture has no pixels")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::context::ContextConfig;
    use crate::device::{Call, ErrorCode, Journal, RecordingDevice};

    fn context(units: usize) -> (GraphicsContext, Journal) {
        let device = RecordingDevice::new();
        let journal = device.journal();
        let config = ContextConfig { texture_units: units, ..Default::default() };
        (GraphicsContext::new(device, config).unwrap(), journal)
    }

    fn checker() -> Vec<u8> {
        let mut bytes = Vec::new();
        for color in [Color4::MAGENTA, Color4::WHITE, Color4::WHITE, Color4::MAGENTA] {
            bytes.extend_from_slice(&color.to_bytes());
        }
        bytes
    }

    // ── creation ─────────────────────────────────────────────────────────

    #[test]
    fn from_bytes_binds_configures_then_uploads() {
        let (ctx, journal) = context(4);
        journal.clear();

        let tex = Texture::from_bytes(&ctx, &checker(), 2, 2, TextureParams::default()).unwrap();
        let raw = tex.handle().raw();

        let calls = journal.calls();
        assert_eq!(calls[0], Call::CreateTexture(raw));
        assert_eq!(calls[1], Call::BindTexture { unit: 0, texture: raw });
        assert!(matches!(
            calls.last(),
            Some(Call::UploadTextureImage { width: 2, height: 2, initialized: true, .. })
        ));
        assert_eq!(journal.count(|c| matches!(c, Call::SetTextureParameter { .. })), 4);
        assert_eq!(tex.bytes().unwrap(), checker());
    }

    #[test]
    fn new_reserves_uninitialized_storage() {
        let (ctx, journal) = context(4);
        let tex = Texture::new(&ctx, 16, 8).unwrap();
        assert!(journal.calls().contains(&Call::UploadTextureImage {
            texture: tex.handle().raw(),
            width: 16,
            height: 8,
            format: PixelFormat::Rgba8,
            initialized: false,
        }));
        assert_eq!(tex.bytes().unwrap().len(), 16 * 8 * 4);
    }

    #[test]
    fn color_key_rewrites_a_copy() {
        let (ctx, _journal) = context(4);
        let source = checker();
        let params = TextureParams::default().with_color_key(Color4::MAGENTA);

        let tex = Texture::from_bytes(&ctx, &source, 2, 2, params).unwrap();

        assert_eq!(
            tex.pixels().unwrap(),
            [Color4::TRANSPARENT_BLACK, Color4::WHITE, Color4::WHITE, Color4::TRANSPARENT_BLACK]
        );
        assert_eq!(source, checker());
    }

    #[test]
    fn load_from_memory_decodes_png() {
        let (ctx, _journal) = context(4);
        let image = RgbaImage::from_raw(2, 2, checker()).unwrap();
        let mut encoded = Vec::new();
        image.write_to(&mut Cursor::new(&mut encoded), image::ImageFormat::Png).unwrap();

        let tex = Texture::load_from_memory(&ctx, &encoded, TextureParams::default()).unwrap();

        assert_eq!((tex.width(), tex.height()), (2, 2));
        assert_eq!(tex.bytes().unwrap(), checker());
    }

    #[test]
    fn readback_binds_the_texture_on_its_own_unit() {
        let (ctx, journal) = context(4);
        let first = Texture::from_bytes(&ctx, &checker(), 2, 2, TextureParams::default()).unwrap();
        let second = Texture::new(&ctx, 2, 2).unwrap();
        assert_eq!((first.unit().index(), second.unit().index()), (0, 1));
        let raw = first.handle().raw();
        journal.clear();

        assert_eq!(first.bytes().unwrap(), checker());

        assert_eq!(journal.calls(), [
            Call::BindTexture { unit: 0, texture: raw },
            Call::ReadTexturePixels(raw),
        ]);
    }

    #[test]
    fn garbage_image_data_is_an_image_error() {
        let (ctx, journal) = context(4);
        let err = Texture::load_from_memory(&ctx, b"not an image", TextureParams::default()).unwrap_err();
        assert!(matches!(err, GfxError::Image(_)));
        assert_eq!(journal.count(|c| matches!(c, Call::CreateTexture(_))), 0);
    }

    // ── validation ───────────────────────────────────────────────────────

    #[test]
    fn wrong_length_is_rejected_before_allocation() {
        let (ctx, journal) = context(4);
        journal.clear();

        let err = Texture::from_bytes(&ctx, &[0; 15], 2, 2, TextureParams::default()).unwrap_err();

        assert!(matches!(err, GfxError::InvalidArgument { name: "bytes", .. }));
        assert!(journal.is_empty());
        assert_eq!(ctx.texture_units_in_use(), 0);
    }

    #[test]
    fn zero_size_is_rejected() {
        let (ctx, _journal) = context(4);
        assert!(matches!(Texture::new(&ctx, 0, 4), Err(GfxError::InvalidArgument { .. })));
    }

    // ── partial failure ──────────────────────────────────────────────────

    #[test]
    fn failed_native_create_returns_the_unit() {
        let (ctx, journal) = context(1);
        journal.fail_on(|c| matches!(c, Call::CreateTexture(_)), ErrorCode::OUT_OF_MEMORY);

        let err = Texture::new(&ctx, 4, 4).unwrap_err();

        assert!(err.to_string().contains("glGenTextures"));
        assert_eq!(ctx.texture_units_in_use(), 0);
        assert!(Texture::new(&ctx, 4, 4).is_ok());
    }

    #[test]
    fn failed_upload_disposes_the_half_built_texture() {
        let (ctx, journal) = context(2);
        journal.fail_on(|c| matches!(c, Call::UploadTextureImage { .. }), ErrorCode::INVALID_VALUE);

        let err = Texture::new(&ctx, 4, 4).unwrap_err();

        assert!(matches!(err, GfxError::Native { op: "TexImage2D", .. }));
        assert_eq!(ctx.texture_units_in_use(), 0);
        assert_eq!(ctx.live_objects(), 0);
        assert_eq!(journal.count(|c| matches!(c, Call::DeleteTexture(_))), 1);
    }

    // ── disposal ─────────────────────────────────────────────────────────

    #[test]
    fn dispose_twice_deletes_once() {
        let (ctx, journal) = context(2);
        let tex = Texture::new(&ctx, 1, 1).unwrap();

        tex.dispose().unwrap();
        tex.dispose().unwrap();
        drop(tex);

        assert_eq!(journal.count(|c| matches!(c, Call::DeleteTexture(_))), 1);
        assert_eq!(ctx.texture_units_in_use(), 0);
    }

    #[test]
    fn drop_releases_unit_and_handle() {
        let (ctx, journal) = context(1);
        let raw = {
            let tex = Texture::new(&ctx, 1, 1).unwrap();
            tex.handle().raw()
        };
        assert!(!journal.is_live(raw));
        assert_eq!(ctx.texture_units_in_use(), 0);
    }

    #[test]
    fn readback_after_dispose_is_rejected() {
        let (ctx, _journal) = context(1);
        let tex = Texture::new(&ctx, 1, 1).unwrap();
        tex.dispose().unwrap();
        assert!(tex.bytes().is_err());
    }
}
