//! Textures and their upload parameters.

mod color_key;
mod params;
mod texture;

pub use color_key::apply_color_key;
pub use params::TextureParams;
pub use texture::Texture;
