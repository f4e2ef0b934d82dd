//! The graphics context: sole owner of the native device, the texture-unit
//! table, the render state cache and the registry of live objects.

mod config;
mod graphics;
mod shared;

pub use config::{ContextConfig, DEFAULT_TEXTURE_UNITS};
pub use graphics::GraphicsContext;

pub(crate) use shared::ContextShared;
