use crate::device::{BlendFactor, Capability, Gl};
use crate::error::Result;

/// How fragment colors combine with the color already in the target.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct BlendState {
    pub enabled: bool,
    pub source: BlendFactor,
    pub destination: BlendFactor,
}

impl BlendState {
    /// Blending off; fragments overwrite the target.
    pub const DISABLED: Self = Self {
        enabled: false,
        source: BlendFactor::One,
        destination: BlendFactor::Zero,
    };

    /// Straight-alpha "over" compositing.
    pub const ALPHA_BLEND: Self = Self {
        enabled: true,
        source: BlendFactor::SourceAlpha,
        destination: BlendFactor::OneMinusSourceAlpha,
    };

    /// Premultiplied-alpha "over" compositing.
    pub const PREMULTIPLIED: Self = Self {
        enabled: true,
        source: BlendFactor::One,
        destination: BlendFactor::OneMinusSourceAlpha,
    };

    pub const ADDITIVE: Self = Self {
        enabled: true,
        source: BlendFactor::SourceAlpha,
        destination: BlendFactor::One,
    };

    pub const fn new(source: BlendFactor, destination: BlendFactor) -> Self {
        Self { enabled: true, source, destination }
    }

    /// Toggles the blend capability, then sets the factors if blending is on.
    pub(crate) fn apply(&self, gl: &mut Gl<'_>) -> Result<()> {
        gl.toggle(Capability::Blend, self.enabled)?;
        if self.enabled {
            gl.blend_func(self.source, self.destination)?;
        }
        Ok(())
    }
}

impl Default for BlendState {
    fn default() -> Self {
        Self::DISABLED
    }
}
