//! Entity handles with generational indices.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Entity handle with a generation counter for stale reference detection.
///
/// The generation increments every time the slot behind an index is freed,
/// so a handle kept across a destroy/create cycle no longer compares equal
/// to the handle currently issued for that index.
///
/// # Layout
/// - `index`: 20 significant bits, slot in the allocator's generation table
/// - `generation`: 12 significant bits, wraps on overflow
///
/// Both fields participate in equality, ordering (index first), and hashing.
/// [`Entity::to_bits`] packs a handle into a single `u32`
/// (`generation << 20 | index`) for serializers that want a flat integer.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Entity {
    /// Slot index in the allocator.
    pub index: u32,
    /// Generation counter for stale reference detection.
    pub generation: u16,
}

impl Entity {
    /// Number of bits available to the index field.
    pub const INDEX_BITS: u32 = 20;

    /// Number of bits available to the generation field.
    pub const GENERATION_BITS: u32 = 12;

    /// Mask selecting the index field.
    pub const INDEX_MASK: u32 = (1 << Self::INDEX_BITS) - 1;

    /// Mask selecting the generation field.
    pub const GENERATION_MASK: u16 = (1 << Self::GENERATION_BITS) - 1;

    /// Index value that terminates the allocator's free list. Never issued.
    pub const INVALID_INDEX: u32 = Self::INDEX_MASK;

    /// Largest index the allocator will ever hand out.
    pub const MAX_INDEX: u32 = Self::INVALID_INDEX - 1;

    /// Creates a handle, masking both fields into their bit widths.
    #[must_use]
    pub const fn new(index: u32, generation: u16) -> Self {
        Self {
            index: index & Self::INDEX_MASK,
            generation: generation & Self::GENERATION_MASK,
        }
    }

    /// Returns a sentinel value representing "no entity".
    #[must_use]
    pub const fn null() -> Self {
        Self {
            index: Self::INVALID_INDEX,
            generation: 0,
        }
    }

    /// Returns true if this is the null sentinel value.
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.index == Self::INVALID_INDEX
    }

    /// Returns the generation that follows this one, wrapping at 12 bits.
    #[must_use]
    pub const fn next_generation(self) -> u16 {
        self.generation.wrapping_add(1) & Self::GENERATION_MASK
    }

    /// Packs the handle into one integer: generation in the high 12 bits,
    /// index in the low 20.
    #[must_use]
    pub const fn to_bits(self) -> u32 {
        ((self.generation as u32) << Self::INDEX_BITS) | self.index
    }

    /// Inverse of [`Entity::to_bits`].
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn from_bits(bits: u32) -> Self {
        Self {
            index: bits & Self::INDEX_MASK,
            generation: (bits >> Self::INDEX_BITS) as u16,
        }
    }
}

impl Default for Entity {
    fn default() -> Self {
        Self::null()
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "Entity(null)")
        } else {
            write!(f, "Entity({}v{})", self.index, self.generation)
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "Entity(null)")
        } else {
            write!(f, "Entity({})", self.index)
        }
    }
}
