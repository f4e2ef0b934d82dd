//! Render state value objects and the cache that diffs them against the device.
//!
//! State values are plain `Copy` data compared structurally; there is no
//! "absent" state, so the device always has a fully specified current state.

mod blend;
mod cache;
mod depth;
mod rasterizer;

pub use blend::BlendState;
pub use depth::DepthBufferState;
pub use rasterizer::{CullMode, RasterizerState};

pub(crate) use cache::RenderStateCache;
