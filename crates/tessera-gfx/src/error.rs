//! Error type shared by every operation of the crate.

use thiserror::Error;

use crate::device::{ErrorCode, ShaderStage};

/// Failure of a context, state or resource operation.
///
/// All variants are reported synchronously to the direct caller. Nothing in
/// the crate retries; exhaustion and native failures are caller-actionable.
#[derive(Debug, Error)]
pub enum GfxError {
    /// A required input is missing or malformed. No state was mutated.
    #[error("invalid argument `{name}`: {reason}")]
    InvalidArgument { name: &'static str, reason: String },

    /// Every texture unit is held by a live object.
    #[error(
        "maximum number of textures allocated ({capacity}); dispose of at least one texture before allocating another"
    )]
    TextureUnitsExhausted { capacity: usize },

    /// The device reported an error code after a native call.
    #[error("GL error: function gl{op} resulted in error code {code}")]
    Native { op: &'static str, code: ErrorCode },

    /// A native create call returned the null handle.
    #[error("GL error: function gl{op} returned no object")]
    CreationFailed { op: &'static str },

    #[error("{stage:?} shader failed to compile: {log}")]
    ShaderCompile { stage: ShaderStage, log: String },

    #[error("shader program failed to link: {log}")]
    ProgramLink { log: String },

    /// The owning context has released its device.
    #[error("graphics context has been disposed")]
    ContextDisposed,

    #[error(transparent)]
    Image(#[from] image::ImageError),
}

impl GfxError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument { name, reason: reason.into() }
    }
}

pub type Result<T, E = GfxError> = std::result::Result<T, E>;
