//! Vertex and index buffers.

mod index;
mod object;
mod vertex;

pub use index::{Index, IndexBuffer};
pub use vertex::{Vertex, VertexAttribute, VertexBuffer};
