use crate::coords::Color4;
use crate::error::{GfxError, Result};
use crate::state::{BlendState, DepthBufferState, RasterizerState};

/// Number of texture units a context manages unless configured otherwise.
pub const DEFAULT_TEXTURE_UNITS: usize = 32;

/// Initial configuration of a [`GraphicsContext`](super::GraphicsContext).
///
/// Every state listed here is sent to the device during construction, so the
/// cache starts out matching the device.
#[derive(Debug, Clone)]
pub struct ContextConfig {
    /// Host surface size in pixels. The height drives the viewport/scissor flip.
    pub surface_width: i32,
    pub surface_height: i32,

    /// Size of the texture-unit table.
    pub texture_units: usize,

    pub clear_color: Color4,
    pub blend: BlendState,
    pub depth: DepthBufferState,
    pub rasterizer: RasterizerState,
}

impl ContextConfig {
    pub fn with_surface(mut self, width: i32, height: i32) -> Self {
        self.surface_width = width;
        self.surface_height = height;
        self
    }

    pub fn with_texture_units(mut self, units: usize) -> Self {
        self.texture_units = units;
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.surface_width <= 0 || self.surface_height <= 0 {
            return Err(GfxError::invalid(
                "surface",
                format!("{}x{} is not a drawable size", self.surface_width, self.surface_height),
            ));
        }
        if self.texture_units == 0 {
            return Err(GfxError::invalid("texture_units", "at least one texture unit is required"));
        }
        Ok(())
    }
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            surface_width: 800,
            surface_height: 600,
            texture_units: DEFAULT_TEXTURE_UNITS,
            clear_color: Color4::CORNFLOWER_BLUE,
            blend: BlendState::DISABLED,
            depth: DepthBufferState::DISABLED,
            rasterizer: RasterizerState::DEFAULT,
        }
    }
}
