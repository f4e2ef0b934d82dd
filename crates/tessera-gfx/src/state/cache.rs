use crate::context::ContextConfig;
use crate::coords::{Color4, Rectangle, SurfaceSize};
use crate::device::{Capability, Gl};
use crate::error::{GfxError, Result};

use super::{BlendState, DepthBufferState, RasterizerState};

/// Last render state sent to the device.
///
/// Every setter compares against the cached value and returns without a
/// native call when nothing changed. The cached value is only replaced once
/// the native calls for the new value have succeeded.
///
/// Rectangles are cached in caller space (top-left origin); the flip to the
/// native bottom-left origin happens on the way out.
#[derive(Debug, Clone)]
pub(crate) struct RenderStateCache {
    surface: SurfaceSize,
    blend: BlendState,
    depth: DepthBufferState,
    rasterizer: RasterizerState,
    viewport: Rectangle,
    scissor: Option<Rectangle>,
    clear_color: Color4,
}

impl RenderStateCache {
    /// Sends every initial state to the device unconditionally.
    pub(crate) fn install(gl: &mut Gl<'_>, config: &ContextConfig) -> Result<Self> {
        let surface = SurfaceSize::new(config.surface_width, config.surface_height);
        let viewport = Rectangle::from_size(surface.width, surface.height);

        config.blend.apply(gl)?;
        config.rasterizer.apply(gl)?;
        gl.clear_color(config.clear_color.to_normalized())?;
        config.depth.apply(gl)?;
        gl.viewport(0, 0, surface.width, surface.height)?;
        gl.toggle(Capability::ScissorTest, false)?;

        Ok(Self {
            surface,
            blend: config.blend,
            depth: config.depth,
            rasterizer: config.rasterizer,
            viewport,
            scissor: None,
            clear_color: config.clear_color,
        })
    }

    pub(crate) fn surface(&self) -> SurfaceSize {
        self.surface
    }

    pub(crate) fn blend(&self) -> BlendState {
        self.blend
    }

    pub(crate) fn depth(&self) -> DepthBufferState {
        self.depth
    }

    pub(crate) fn rasterizer(&self) -> RasterizerState {
        self.rasterizer
    }

    pub(crate) fn viewport(&self) -> Rectangle {
        self.viewport
    }

    pub(crate) fn scissor(&self) -> Option<Rectangle> {
        self.scissor
    }

    pub(crate) fn clear_color(&self) -> Color4 {
        self.clear_color
    }

    // ── state objects ────────────────────────────────────────────────────

    pub(crate) fn set_blend(&mut self, gl: &mut Gl<'_>, state: BlendState) -> Result<()> {
        if state == self.blend {
            log::trace!("blend state unchanged");
            return Ok(());
        }
        state.apply(gl)?;
        self.blend = state;
        Ok(())
    }

    pub(crate) fn set_depth(&mut self, gl: &mut Gl<'_>, state: DepthBufferState) -> Result<()> {
        if state == self.depth {
            log::trace!("depth state unchanged");
            return Ok(());
        }
        state.apply(gl)?;
        self.depth = state;
        Ok(())
    }

    pub(crate) fn set_rasterizer(&mut self, gl: &mut Gl<'_>, state: RasterizerState) -> Result<()> {
        if state == self.rasterizer {
            log::trace!("rasterizer state unchanged");
            return Ok(());
        }
        state.apply(gl)?;
        self.rasterizer = state;
        Ok(())
    }

    // ── rectangles ───────────────────────────────────────────────────────

    pub(crate) fn set_viewport(&mut self, gl: &mut Gl<'_>, rect: Rectangle) -> Result<()> {
        check_rect("viewport", rect)?;
        if rect == self.viewport {
            log::trace!("viewport unchanged");
            return Ok(());
        }
        self.send_viewport(gl, rect)?;
        self.viewport = rect;
        Ok(())
    }

    /// `Some` sets the clip rectangle and turns the scissor test on,
    /// `None` turns it off.
    pub(crate) fn set_scissor(&mut self, gl: &mut Gl<'_>, rect: Option<Rectangle>) -> Result<()> {
        if let Some(rect) = rect {
            check_rect("scissor", rect)?;
        }
        if rect == self.scissor {
            log::trace!("scissor unchanged");
            return Ok(());
        }
        match rect {
            Some(rect) => {
                self.send_scissor(gl, rect)?;
                if self.scissor.is_none() {
                    gl.toggle(Capability::ScissorTest, true)?;
                }
            }
            None => gl.toggle(Capability::ScissorTest, false)?,
        }
        self.scissor = rect;
        Ok(())
    }

    /// Records a new host surface size and re-sends the rectangles, whose
    /// native form depends on the surface height.
    ///
    /// A viewport that covered the whole old surface grows or shrinks with it.
    pub(crate) fn resize(&mut self, gl: &mut Gl<'_>, surface: SurfaceSize) -> Result<()> {
        if !surface.is_valid() {
            return Err(GfxError::invalid(
                "surface",
                format!("{}x{} is not a drawable size", surface.width, surface.height),
            ));
        }
        if surface == self.surface {
            return Ok(());
        }

        let viewport = if self.viewport == Rectangle::from_size(self.surface.width, self.surface.height) {
            Rectangle::from_size(surface.width, surface.height)
        } else {
            self.viewport
        };

        let previous = self.surface;
        self.surface = surface;
        let flips = self.to_native("viewport", viewport).and_then(|_| match self.scissor {
            Some(rect) => self.to_native("scissor", rect).map(drop),
            None => Ok(()),
        });
        if let Err(err) = flips {
            self.surface = previous;
            return Err(err);
        }
        let sent = self.send_viewport(gl, viewport).and_then(|()| match self.scissor {
            Some(rect) => self.send_scissor(gl, rect),
            None => Ok(()),
        });
        if let Err(err) = sent {
            self.surface = previous;
            return Err(err);
        }

        self.viewport = viewport;
        Ok(())
    }

    // ── clearing ─────────────────────────────────────────────────────────

    pub(crate) fn set_clear_color(&mut self, gl: &mut Gl<'_>, color: Color4) -> Result<()> {
        if color == self.clear_color {
            return Ok(());
        }
        gl.clear_color(color.to_normalized())?;
        self.clear_color = color;
        Ok(())
    }

    fn send_viewport(&self, gl: &mut Gl<'_>, rect: Rectangle) -> Result<()> {
        let native = self.to_native("viewport", rect)?;
        gl.viewport(native.x, native.y, native.width, native.height)
    }

    fn send_scissor(&self, gl: &mut Gl<'_>, rect: Rectangle) -> Result<()> {
        let native = self.to_native("scissor", rect)?;
        gl.scissor(native.x, native.y, native.width, native.height)
    }

    fn to_native(&self, name: &'static str, rect: Rectangle) -> Result<Rectangle> {
        rect.flipped(self.surface.height).ok_or_else(|| {
            GfxError::invalid(
                name,
                format!("y {} height {} overflow against surface height {}", rect.y, rect.height, self.surface.height),
            )
        })
    }
}

fn check_rect(name: &'static str, rect: Rectangle) -> Result<()> {
    if rect.width < 0 || rect.height < 0 {
        return Err(GfxError::invalid(name, format!("negative size {}x{}", rect.width, rect.height)));
    }
    Ok(())
}
