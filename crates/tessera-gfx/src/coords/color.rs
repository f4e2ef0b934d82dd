use bytemuck::{Pod, Zeroable};

/// 8-bit straight-alpha RGBA color.
///
/// The layout matches one pixel of an RGBA8 texture, so pixel buffers can be
/// reinterpreted as `[Color4]` with `bytemuck`.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct Color4 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color4 {
    pub const TRANSPARENT_BLACK: Self = Self::new(0, 0, 0, 0);
    pub const BLACK: Self = Self::new(0, 0, 0, 255);
    pub const WHITE: Self = Self::new(255, 255, 255, 255);
    pub const MAGENTA: Self = Self::new(255, 0, 255, 255);
    pub const CORNFLOWER_BLUE: Self = Self::new(100, 149, 237, 255);

    #[inline]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    #[inline]
    pub const fn to_bytes(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Packs the channels as `0xRRGGBBAA`.
    #[inline]
    pub const fn to_rgba(self) -> u32 {
        u32::from_be_bytes(self.to_bytes())
    }

    /// Channels normalized to `[0, 1]`, in the order the clear-color call expects.
    #[inline]
    pub fn to_normalized(self) -> [f32; 4] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            self.a as f32 / 255.0,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packs_rgba_big_endian() {
        assert_eq!(Color4::new(0x11, 0x22, 0x33, 0x44).to_rgba(), 0x1122_3344);
        assert_eq!(Color4::MAGENTA.to_rgba(), 0xFF00_FFFF);
    }

    #[test]
    fn normalized_endpoints() {
        assert_eq!(Color4::WHITE.to_normalized(), [1.0, 1.0, 1.0, 1.0]);
        assert_eq!(Color4::TRANSPARENT_BLACK.to_normalized(), [0.0; 4]);
    }

    #[test]
    fn pixel_bytes_reinterpret_as_colors() {
        let bytes = [1u8, 2, 3, 4, 5, 6, 7, 8];
        let colors: &[Color4] = bytemuck::cast_slice(&bytes);
        assert_eq!(colors, &[Color4::new(1, 2, 3, 4), Color4::new(5, 6, 7, 8)]);
    }
}
