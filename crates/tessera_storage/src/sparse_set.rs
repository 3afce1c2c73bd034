//! Sparse set mapping a sparse key universe onto a dense index space.
//!
//! Two arrays:
//! - `sparse[key.sparse_index()]` holds the key's position in `packed`, or
//!   `ABSENT`
//! - `packed` holds the keys contiguously
//!
//! Erase is swap-with-last-then-pop, so positions are stable only until the
//! next erase. Only membership and the `sparse`/`packed` correspondence are
//! guaranteed.

use tessera_foundation::{Entity, Error, ErrorKind, Result};

/// Sentinel stored in the sparse array for keys not in the set.
const ABSENT: u32 = u32::MAX;

/// Keys that can live in a [`SparseSet`].
///
/// `sparse_index` picks the key's slot in the sparse array. Distinct keys may
/// share a slot (an entity and its stale predecessor do), in which case only
/// the key actually stored in `packed` is considered present.
pub trait SparseKey: Copy + Eq {
    /// Returns the slot this key occupies in the sparse array.
    fn sparse_index(&self) -> usize;
}

impl SparseKey for Entity {
    fn sparse_index(&self) -> usize {
        self.index as usize
    }
}

impl SparseKey for u32 {
    fn sparse_index(&self) -> usize {
        *self as usize
    }
}

impl SparseKey for usize {
    fn sparse_index(&self) -> usize {
        *self
    }
}

/// A sparse set of keys with O(1) insert, erase, and lookup.
#[derive(Clone, Debug)]
pub struct SparseSet<K: SparseKey> {
    /// Dense position per sparse slot, or `ABSENT`.
    sparse: Vec<u32>,
    /// Keys, contiguous.
    packed: Vec<K>,
}

impl<K: SparseKey> Default for SparseSet<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: SparseKey> SparseSet<K> {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sparse: Vec::new(),
            packed: Vec::new(),
        }
    }

    /// Creates an empty set with room for `capacity` keys in the dense array.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            sparse: Vec::new(),
            packed: Vec::with_capacity(capacity),
        }
    }

    /// Reserves room for `additional` more keys in the dense array.
    pub fn reserve(&mut self, additional: usize) {
        self.packed.reserve(additional);
    }

    /// Inserts a key, returning its dense position.
    ///
    /// # Errors
    ///
    /// Returns `KeyAlreadyPresent` if the key is already in the set, and
    /// `SlotOccupied` if a different key with the same sparse index is.
    ///
    /// # Panics
    ///
    /// Panics if the set would hold more than `u32::MAX - 1` keys.
    pub fn insert(&mut self, key: K) -> Result<usize> {
        match self.occupant(key) {
            Some(occupant) if occupant == key => {
                return Err(Error::new(ErrorKind::KeyAlreadyPresent {
                    key: key.sparse_index(),
                }));
            }
            Some(_) => {
                return Err(Error::new(ErrorKind::SlotOccupied {
                    key: key.sparse_index(),
                }));
            }
            None => {}
        }

        let slot = key.sparse_index();
        if slot >= self.sparse.len() {
            self.sparse.resize(slot + 1, ABSENT);
        }

        let position = self.packed.len();
        self.sparse[slot] = u32::try_from(position)
            .ok()
            .filter(|&p| p != ABSENT)
            .expect("sparse set dense array overflow");
        self.packed.push(key);
        Ok(position)
    }

    /// Erases a key, returning the dense position it vacated.
    ///
    /// The last key is moved into the vacated position, so after this call
    /// the key previously at `len() - 1` (if any) lives at the returned
    /// position.
    ///
    /// # Errors
    ///
    /// Returns `KeyNotFound` if the key is not in the set.
    #[allow(clippy::cast_possible_truncation)]
    pub fn erase(&mut self, key: K) -> Result<usize> {
        let Some(position) = self.index(key) else {
            return Err(Error::new(ErrorKind::KeyNotFound {
                key: key.sparse_index(),
            }));
        };

        self.packed.swap_remove(position);
        if let Some(moved) = self.packed.get(position) {
            // Positions fit in u32: insert refuses to grow past that.
            self.sparse[moved.sparse_index()] = position as u32;
        }
        self.sparse[key.sparse_index()] = ABSENT;
        Ok(position)
    }

    /// Returns true if the key is in the set.
    #[must_use]
    pub fn contains(&self, key: K) -> bool {
        self.index(key).is_some()
    }

    /// Returns the dense position of a key.
    #[must_use]
    pub fn index(&self, key: K) -> Option<usize> {
        let position = *self.sparse.get(key.sparse_index())?;
        if position == ABSENT {
            return None;
        }
        let position = position as usize;
        (self.packed[position] == key).then_some(position)
    }

    /// Returns whichever key currently holds `key`'s sparse slot.
    ///
    /// This is `Some(key)` when the key is present, and `Some(other)` when a
    /// distinct key sharing the slot is present instead.
    #[must_use]
    pub fn occupant(&self, key: K) -> Option<K> {
        let position = *self.sparse.get(key.sparse_index())?;
        if position == ABSENT {
            return None;
        }
        Some(self.packed[position as usize])
    }

    /// Returns the key at a dense position.
    #[must_use]
    pub fn get(&self, position: usize) -> Option<K> {
        self.packed.get(position).copied()
    }

    /// Returns the number of keys in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.packed.len()
    }

    /// Returns true if the set holds no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.packed.is_empty()
    }

    /// Returns the dense key array.
    #[must_use]
    pub fn as_slice(&self) -> &[K] {
        &self.packed
    }

    /// Iterates keys in dense order.
    pub fn iter(&self) -> std::iter::Copied<std::slice::Iter<'_, K>> {
        self.packed.iter().copied()
    }

    /// Removes every key. The sparse array keeps its length.
    pub fn clear(&mut self) {
        for key in &self.packed {
            self.sparse[key.sparse_index()] = ABSENT;
        }
        self.packed.clear();
    }
}
