use crate::device::{Capability, CompareFunction, Gl};
use crate::error::Result;

/// Depth-test configuration.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct DepthBufferState {
    pub enabled: bool,
    pub function: CompareFunction,
}

impl DepthBufferState {
    pub const DISABLED: Self = Self { enabled: false, function: CompareFunction::LessOrEqual };

    pub const LESS_OR_EQUAL: Self = Self { enabled: true, function: CompareFunction::LessOrEqual };

    pub const LESS: Self = Self { enabled: true, function: CompareFunction::Less };

    pub const fn new(function: CompareFunction) -> Self {
        Self { enabled: true, function }
    }

    pub(crate) fn apply(&self, gl: &mut Gl<'_>) -> Result<()> {
        gl.toggle(Capability::DepthTest, self.enabled)?;
        if self.enabled {
            gl.depth_func(self.function)?;
        }
        Ok(())
    }
}

impl Default for DepthBufferState {
    fn default() -> Self {
        Self::DISABLED
    }
}
