use crate::coords::Color4;
use crate::device::{TextureFilter, TextureWrap};

/// Sampling parameters and upload-time pixel rewriting for a texture.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TextureParams {
    pub min_filter: TextureFilter,
    pub mag_filter: TextureFilter,
    pub wrap_s: TextureWrap,
    pub wrap_t: TextureWrap,
    /// Pixels exactly equal to this color are replaced by
    /// [`transparent_pixel`](Self::transparent_pixel) before upload.
    pub color_key: Option<Color4>,
    pub transparent_pixel: Color4,
}

impl TextureParams {
    pub fn with_filter(mut self, filter: TextureFilter) -> Self {
        self.min_filter = filter;
        self.mag_filter = filter;
        self
    }

    pub fn with_wrap(mut self, wrap: TextureWrap) -> Self {
        self.wrap_s = wrap;
        self.wrap_t = wrap;
        self
    }

    pub fn with_color_key(mut self, key: Color4) -> Self {
        self.color_key = Some(key);
        self
    }
}

impl Default for TextureParams {
    fn default() -> Self {
        Self {
            min_filter: TextureFilter::Nearest,
            mag_filter: TextureFilter::Nearest,
            wrap_s: TextureWrap::ClampToEdge,
            wrap_t: TextureWrap::ClampToEdge,
            color_key: None,
            transparent_pixel: Color4::TRANSPARENT_BLACK,
        }
    }
}
