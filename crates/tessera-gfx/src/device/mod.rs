//! Native GPU command interface.
//!
//! This module is responsible for:
//! - the raw [`GpuCommands`] trait a backend implements
//! - the typed parameters passed across it
//! - translating device error codes into [`GfxError`](crate::GfxError) via [`Gl`]
//! - the headless [`RecordingDevice`] and, with the `glow` feature, [`GlowDevice`]

mod checked;
mod commands;
mod error;
pub mod recording;
mod types;

#[cfg(feature = "glow")]
mod glow_device;

pub use checked::Gl;
pub use commands::GpuCommands;
pub use error::ErrorCode;
pub use recording::{Call, Journal, RecordingDevice};
pub use types::{
    AttribType, BlendFactor, BufferTarget, BufferUsage, Capability, ClearMask, CompareFunction,
    CullFace, FrontFace, IndexType, PixelFormat, PrimitiveType, ShaderStage, TextureFilter,
    TextureParameter, TextureWrap,
};

#[cfg(feature = "glow")]
pub use glow_device::GlowDevice;
