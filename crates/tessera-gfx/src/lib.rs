//! Tessera graphics crate.
//!
//! GPU resource and render-state management over an immediate-mode command
//! interface: texture-unit allocation, diffed render state, and tracked,
//! two-phase disposal of every object a context creates.

pub mod buffer;
pub mod context;
pub mod coords;
pub mod device;
pub mod logging;
pub mod resource;
pub mod shader;
pub mod state;
pub mod texture;

mod error;

pub use buffer::{Index, IndexBuffer, Vertex, VertexAttribute, VertexBuffer};
pub use context::{ContextConfig, GraphicsContext};
pub use coords::{Color4, Rectangle, SurfaceSize};
pub use error::{GfxError, Result};
pub use resource::{Disposable, DisposeState};
pub use shader::{Shader, ShaderProgram};
pub use state::{BlendState, CullMode, DepthBufferState, RasterizerState};
pub use texture::{Texture, TextureParams};
