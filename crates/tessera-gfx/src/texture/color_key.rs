use crate::coords::Color4;

/// Rewrites every RGBA8 pixel equal to `key` to `replacement`.
///
/// Returns the number of pixels replaced. A trailing partial pixel is left alone.
pub fn apply_color_key(pixels: &mut [u8], key: Color4, replacement: Color4) -> usize {
    let key = key.to_bytes();
    let replacement = replacement.to_bytes();
    let mut replaced = 0;
    for pixel in pixels.chunks_exact_mut(4) {
        if *pixel == key {
            pixel.copy_from_slice(&replacement);
            replaced += 1;
        }
    }
    replaced
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_pixels_become_transparent() {
        let mut pixels = [
            255, 0, 255, 255, // key
            1, 2, 3, 4,
            255, 0, 255, 255, // key
        ];
        let n = apply_color_key(&mut pixels, Color4::MAGENTA, Color4::TRANSPARENT_BLACK);
        assert_eq!(n, 2);
        assert_eq!(pixels, [0, 0, 0, 0, 1, 2, 3, 4, 0, 0, 0, 0]);
    }

    #[test]
    fn near_misses_are_untouched() {
        // Same RGB as the key with a different alpha.
        let mut pixels = [255, 0, 255, 254, 255, 1, 255, 255];
        let before = pixels;
        assert_eq!(apply_color_key(&mut pixels, Color4::MAGENTA, Color4::WHITE), 0);
        assert_eq!(pixels, before);
    }

    #[test]
    fn key_spanning_pixel_boundary_is_not_matched() {
        let mut pixels = [0, 255, 0, 255, 255, 0, 0, 0];
        assert_eq!(apply_color_key(&mut pixels, Color4::MAGENTA, Color4::WHITE), 0);
    }

    #[test]
    fn custom_replacement_is_written_verbatim() {
        let mut pixels = [10, 20, 30, 40];
        let key = Color4::new(10, 20, 30, 40);
        apply_color_key(&mut pixels, key, Color4::new(9, 8, 7, 6));
        assert_eq!(pixels, [9, 8, 7, 6]);
    }
}
