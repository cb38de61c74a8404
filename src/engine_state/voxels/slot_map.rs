//! # Chunk Slot Map
//!
//! A cubic, array-backed map from spatial chunk coordinate to storage slot.
//!
//! ## Architecture
//!
//! The chunk area never moves block data when the viewer crosses a chunk
//! boundary. Instead it rewrites which slot backs which coordinate: the next
//! mapping is built in a scratch map and then exchanged with the live one
//! through [`ChunkSlotMap::swap_with`], which is a constant-time pointer swap.
//! A well-formed map is always a bijection between the `dimension³`
//! coordinates and the slots `0..dimension³`.

/// Bijective `(x, y, z) -> slot` map over a cube of side `dimension`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChunkSlotMap {
    dimension: usize,
    slots: Vec<usize>,
}

impl ChunkSlotMap {
    /// Creates the identity map, where the slot of a coordinate is its
    /// flattened index.
    pub fn identity(dimension: usize) -> Self {
        Self {
            dimension,
            slots: (0..dimension * dimension * dimension).collect(),
        }
    }

    /// Side length of the cube.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of coordinates (and slots).
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the map covers no coordinates.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    #[inline]
    fn offset(&self, x: usize, y: usize, z: usize) -> usize {
        debug_assert!(
            x < self.dimension && y < self.dimension && z < self.dimension,
            "coordinate ({x}, {y}, {z}) outside slot map of dimension {}",
            self.dimension
        );
        x + y * self.dimension + z * self.dimension * self.dimension
    }

    /// Slot backing the coordinate `(x, y, z)`.
    #[inline]
    pub fn at(&self, x: usize, y: usize, z: usize) -> usize {
        self.slots[self.offset(x, y, z)]
    }

    /// Assigns `slot` to the coordinate `(x, y, z)`.
    ///
    /// Only the scratch map should be written piecemeal; the live map is
    /// replaced wholesale with [`swap_with`](Self::swap_with).
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, z: usize, slot: usize) {
        let offset = self.offset(x, y, z);
        self.slots[offset] = slot;
    }

    /// Exchanges the contents of two maps of the same dimension in O(1).
    pub fn swap_with(&mut self, other: &mut ChunkSlotMap) {
        assert_eq!(
            self.dimension, other.dimension,
            "cannot swap slot maps of different dimensions"
        );
        std::mem::swap(&mut self.slots, &mut other.slots);
    }

    /// Whether every slot in `0..len` is used by exactly one coordinate.
    pub fn is_bijection(&self) -> bool {
        let mut seen = vec![false; self.slots.len()];
        for &slot in &self.slots {
            if slot >= seen.len() || seen[slot] {
                return false;
            }
            seen[slot] = true;
        }
        true
    }

    /// Every coordinate in scan order (x fastest, then y, then z).
    pub fn coordinates(&self) -> impl Iterator<Item = (usize, usize, usize)> {
        let d = self.dimension;
        (0..d).flat_map(move |z| (0..d).flat_map(move |y| (0..d).map(move |x| (x, y, z))))
    }
}
