use crate::device::{Capability, CullFace, FrontFace, Gl};
use crate::error::Result;

/// Which faces are discarded before rasterization.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum CullMode {
    #[default]
    None,
    Front,
    Back,
    FrontAndBack,
}

impl CullMode {
    /// Native face to cull, or `None` when culling is off.
    pub const fn face(self) -> Option<CullFace> {
        match self {
            CullMode::None => None,
            CullMode::Front => Some(CullFace::Front),
            CullMode::Back => Some(CullFace::Back),
            CullMode::FrontAndBack => Some(CullFace::FrontAndBack),
        }
    }
}

/// Triangle winding and culling.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct RasterizerState {
    pub front_face: FrontFace,
    pub cull_mode: CullMode,
}

impl RasterizerState {
    pub const DEFAULT: Self = Self { front_face: FrontFace::CounterClockwise, cull_mode: CullMode::None };

    pub const CULL_BACK: Self = Self { front_face: FrontFace::CounterClockwise, cull_mode: CullMode::Back };

    pub const CULL_FRONT: Self = Self { front_face: FrontFace::CounterClockwise, cull_mode: CullMode::Front };

    /// Winding is always sent; the cull face only when culling is on.
    pub(crate) fn apply(&self, gl: &mut Gl<'_>) -> Result<()> {
        gl.front_face(self.front_face)?;
        match self.cull_mode.face() {
            Some(face) => {
                gl.toggle(Capability::CullFace, true)?;
                gl.cull_face(face)
            }
            None => gl.toggle(Capability::CullFace, false),
        }
    }
}

impl Default for RasterizerState {
    fn default() -> Self {
        Self::DEFAULT
    }
}
