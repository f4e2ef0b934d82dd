/// Axis-aligned rectangle in pixels (top-left origin).
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct Rectangle {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rectangle {
    #[inline]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// Rectangle covering a whole surface of the given size.
    #[inline]
    pub const fn from_size(width: i32, height: i32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Converts from top-left origin to the bottom-left origin used by the
    /// native interface, for a surface `surface_height` pixels tall.
    ///
    /// `y' = surface_height - y - height`, or `None` when that leaves the
    /// `i32` range.
    #[inline]
    pub fn flipped(self, surface_height: i32) -> Option<Self> {
        let y = surface_height.checked_sub(self.y)?.checked_sub(self.height)?;
        Some(Self::new(self.x, y, self.width, self.height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(x: i32, y: i32, w: i32, h: i32) -> Rectangle { Rectangle::new(x, y, w, h) }

    // ── flipped ───────────────────────────────────────────────────────────

    #[test]
    fn flipped_full_surface_is_identity() {
        assert_eq!(r(0, 0, 800, 600).flipped(600), Some(r(0, 0, 800, 600)));
    }

    #[test]
    fn flipped_top_strip_moves_to_native_top() {
        // A 100px strip at the logical top sits at native y = 500.
        assert_eq!(r(0, 0, 800, 100).flipped(600), Some(r(0, 500, 800, 100)));
    }

    #[test]
    fn flipped_keeps_x_and_size() {
        let f = r(13, 40, 7, 9).flipped(100).unwrap();
        assert_eq!((f.x, f.width, f.height), (13, 7, 9));
        assert_eq!(f.y, 100 - 40 - 9);
    }

    #[test]
    fn flipped_twice_round_trips() {
        let rect = r(5, 17, 30, 11);
        assert_eq!(rect.flipped(240).and_then(|f| f.flipped(240)), Some(rect));
    }

    #[test]
    fn flipped_out_of_range_is_none() {
        assert_eq!(r(0, i32::MIN, 10, 10).flipped(600), None);
        assert_eq!(r(0, -10, 10, i32::MAX).flipped(i32::MAX), None);
        assert_eq!(r(0, 0, 10, i32::MAX).flipped(-2), None);
    }
}
