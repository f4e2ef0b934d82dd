use crate::error::{GfxError, Result};

/// Index of a hardware texture binding slot.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureUnit(u32);

impl TextureUnit {
    #[inline]
    pub const fn index(self) -> u32 {
        self.0
    }
}

/// Fixed-size occupancy table of texture units.
///
/// Allocation scans circularly from a rotating cursor and takes the first free
/// slot, so freed low indices are not immediately reused while later slots
/// are still free.
///
/// Invariant: a unit is handed out at most once until it is deallocated.
#[derive(Debug, Clone)]
pub struct TextureUnitAllocator {
    occupied: Vec<bool>,
    next: usize,
}

impl TextureUnitAllocator {
    pub fn new(capacity: usize) -> Self {
        Self { occupied: vec![false; capacity], next: 0 }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.occupied.len()
    }

    /// Number of units currently held.
    pub fn in_use(&self) -> usize {
        self.occupied.iter().filter(|&&o| o).count()
    }

    pub fn is_occupied(&self, unit: TextureUnit) -> bool {
        self.occupied.get(unit.0 as usize).copied().unwrap_or(false)
    }

    /// Claims the first free unit at or after the cursor, wrapping around.
    ///
    /// Fails with [`GfxError::TextureUnitsExhausted`] when every unit is held;
    /// the table is left untouched in that case.
    pub fn allocate(&mut self) -> Result<TextureUnit> {
        let capacity = self.capacity();
        for offset in 0..capacity {
            let index = (self.next + offset) % capacity;
            if !self.occupied[index] {
                self.occupied[index] = true;
                self.next = (index + 1) % capacity;
                return Ok(TextureUnit(index as u32));
            }
        }
        Err(GfxError::TextureUnitsExhausted { capacity })
    }

    /// Frees `unit`. Units only ever come from [`allocate`](Self::allocate).
    pub fn deallocate(&mut self, unit: TextureUnit) {
        debug_assert!(self.is_occupied(unit), "texture unit {} was not allocated", unit.0);
        if let Some(slot) = self.occupied.get_mut(unit.0 as usize) {
            *slot = false;
        }
    }

    /// Frees every unit and rewinds the cursor.
    pub fn clear(&mut self) {
        self.occupied.fill(false);
        self.next = 0;
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn indices(units: &[TextureUnit]) -> Vec<u32> {
        units.iter().map(|u| u.index()).collect()
    }

    // ── allocate ──────────────────────────────────────────────────────────

    #[test]
    fn fills_in_order_then_exhausts() {
        let mut alloc = TextureUnitAllocator::new(8);
        let units: Vec<_> = (0..8).map(|_| alloc.allocate().unwrap()).collect();
        assert_eq!(indices(&units), (0..8).collect::<Vec<_>>());

        let err = alloc.allocate().unwrap_err();
        assert!(matches!(err, GfxError::TextureUnitsExhausted { capacity: 8 }));
        assert_eq!(alloc.in_use(), 8);
    }

    #[test]
    fn freed_slot_is_found_after_wrapping() {
        let mut alloc = TextureUnitAllocator::new(8);
        let units: Vec<_> = (0..8).map(|_| alloc.allocate().unwrap()).collect();

        alloc.deallocate(units[3]);
        assert_eq!(alloc.allocate().unwrap().index(), 3);
    }

    #[test]
    fn cursor_skips_past_recently_freed_low_index() {
        let mut alloc = TextureUnitAllocator::new(4);
        let a = alloc.allocate().unwrap();
        alloc.deallocate(a);

        // Cursor sits at 1, so unit 0 is not reused straight away.
        assert_eq!(alloc.allocate().unwrap().index(), 1);
        assert_eq!(alloc.allocate().unwrap().index(), 2);
        assert_eq!(alloc.allocate().unwrap().index(), 3);
        assert_eq!(alloc.allocate().unwrap().index(), 0);
    }

    #[test]
    fn zero_capacity_always_exhausted() {
        let mut alloc = TextureUnitAllocator::new(0);
        assert!(matches!(
            alloc.allocate(),
            Err(GfxError::TextureUnitsExhausted { capacity: 0 })
        ));
    }

    // ── interleaved sequences ─────────────────────────────────────────────

    #[test]
    fn interleaved_sequence_never_hands_out_a_held_unit() {
        const N: usize = 6;
        let mut alloc = TextureUnitAllocator::new(N);
        let mut live: Vec<TextureUnit> = Vec::new();

        // Deterministic pseudo-random walk that never exceeds N live units.
        let mut seed: u32 = 0x9E37_79B9;
        for _ in 0..2_000 {
            seed = seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            let release = !live.is_empty() && (live.len() == N || seed & 0x100 != 0);

            if release {
                let victim = live.swap_remove((seed >> 16) as usize % live.len());
                alloc.deallocate(victim);
            } else {
                let unit = alloc.allocate().expect("allocation within capacity must succeed");
                assert!(!live.contains(&unit), "unit {} handed out twice", unit.index());
                live.push(unit);
            }

            assert_eq!(alloc.in_use(), live.len());
            let distinct: HashSet<_> = live.iter().collect();
            assert_eq!(distinct.len(), live.len());
        }
    }

    #[test]
    fn succeeds_again_after_one_release_at_capacity() {
        let mut alloc = TextureUnitAllocator::new(3);
        let units: Vec<_> = (0..3).map(|_| alloc.allocate().unwrap()).collect();
        assert!(alloc.allocate().is_err());

        alloc.deallocate(units[1]);
        assert_eq!(alloc.allocate().unwrap(), units[1]);
    }

    #[test]
    fn clear_releases_everything() {
        let mut alloc = TextureUnitAllocator::new(2);
        alloc.allocate().unwrap();
        alloc.allocate().unwrap();
        alloc.clear();
        assert_eq!(alloc.in_use(), 0);
        assert_eq!(alloc.allocate().unwrap().index(), 0);
    }
}
