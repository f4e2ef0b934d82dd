//! Coordinate and color value types shared by the context and its resources.
//!
//! Canonical caller space:
//! - integer pixels
//! - origin top-left
//! - +X right, +Y down
//!
//! The native command interface uses a bottom-left origin; the conversion lives
//! in [`Rectangle::flipped`] and is applied by the context only.

mod color;
mod rect;
mod size;

pub use color::Color4;
pub use rect::Rectangle;
pub use size::SurfaceSize;
