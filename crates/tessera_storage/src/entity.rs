//! Entity allocation with generational indices.
//!
//! The `EntityAllocator` owns the generation table: one [`Entity`] per slot
//! ever issued. A live slot stores exactly the handle that was handed out
//! for it, so validity is a single comparison. A free slot stores the next
//! free index in its INDEX field, forming an intrusive singly linked free
//! list whose head is `free_head`.
//!
//! Recycling is LIFO: the most recently destroyed index is reused first.

use tessera_foundation::{Entity, Error, Result};

/// Issues, recycles, and validates entity handles.
#[derive(Debug, Clone)]
pub struct EntityAllocator {
    /// One entry per slot. Live: the issued handle. Free: next free index
    /// plus the generation the slot will be reissued with.
    entities: Vec<Entity>,
    /// First free slot, or `Entity::INVALID_INDEX` if none.
    free_head: u32,
    /// Count of live entities.
    alive: usize,
    /// Maximum number of slots.
    limit: usize,
}

impl Default for EntityAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityAllocator {
    /// Largest number of slots any allocator can hold.
    pub const MAX_SLOTS: usize = Entity::MAX_INDEX as usize + 1;

    /// Creates an empty allocator with the maximum slot limit.
    #[must_use]
    pub fn new() -> Self {
        Self::with_limit(Self::MAX_SLOTS)
    }

    /// Creates an empty allocator that will never hold more than `limit`
    /// slots. The limit is clamped to [`Self::MAX_SLOTS`].
    #[must_use]
    pub fn with_limit(limit: usize) -> Self {
        Self {
            entities: Vec::new(),
            free_head: Entity::INVALID_INDEX,
            alive: 0,
            limit: limit.min(Self::MAX_SLOTS),
        }
    }

    /// Reserves room for `additional` more slots.
    pub fn reserve(&mut self, additional: usize) {
        self.entities
            .reserve(additional.min(self.limit - self.entities.len()));
    }

    /// Creates an entity, panicking if the allocator is full.
    ///
    /// # Panics
    ///
    /// Panics with `CapacityExhausted` when every slot is live.
    #[track_caller]
    pub fn create(&mut self) -> Entity {
        match self.try_create() {
            Ok(entity) => entity,
            Err(err) => panic!("{err}"),
        }
    }

    /// Creates an entity.
    ///
    /// Pops the free list when it is non-empty, reusing the slot with the
    /// generation already bumped by `destroy`. Otherwise appends a slot with
    /// generation 0.
    ///
    /// # Errors
    ///
    /// Returns `CapacityExhausted` when the free list is empty and the slot
    /// limit has been reached.
    #[allow(clippy::cast_possible_truncation)]
    pub fn try_create(&mut self) -> Result<Entity> {
        let entity = if self.free_head == Entity::INVALID_INDEX {
            if self.entities.len() >= self.limit {
                return Err(Error::capacity_exhausted(self.limit).with_context("create"));
            }
            // len < limit <= MAX_INDEX + 1, so the index fits in 20 bits.
            let entity = Entity::new(self.entities.len() as u32, 0);
            self.entities.push(entity);
            entity
        } else {
            let index = self.free_head;
            let slot = &mut self.entities[index as usize];
            self.free_head = slot.index;
            slot.index = index;
            *slot
        };

        self.alive += 1;
        Ok(entity)
    }

    /// Destroys an entity, panicking if the handle is not valid.
    ///
    /// # Panics
    ///
    /// Panics with `EntityNotFound` or `StaleEntity` when `entity` is not
    /// the live handle for its slot.
    #[track_caller]
    pub fn destroy(&mut self, entity: Entity) {
        if let Err(err) = self.try_destroy(entity) {
            panic!("{err}");
        }
    }

    /// Destroys an entity.
    ///
    /// Pushes the slot onto the free list and bumps its generation (wrapping
    /// at 12 bits), which invalidates every outstanding copy of the handle.
    ///
    /// # Errors
    ///
    /// Returns `EntityNotFound` or `StaleEntity` when `entity` is not valid.
    pub fn try_destroy(&mut self, entity: Entity) -> Result<()> {
        self.validate(entity)
            .map_err(|err| err.with_context("destroy"))?;

        self.entities[entity.index as usize] =
            Entity::new(self.free_head, entity.next_generation());
        self.free_head = entity.index;
        self.alive -= 1;
        Ok(())
    }

    /// Returns true if `entity` is the live handle for its slot.
    #[must_use]
    pub fn valid(&self, entity: Entity) -> bool {
        self.entities.get(entity.index as usize) == Some(&entity)
    }

    /// Validates a handle.
    ///
    /// # Errors
    ///
    /// Returns `StaleEntity` if the slot's generation has moved on, and
    /// `EntityNotFound` if the index was never issued or the handle was
    /// never issued at the slot's current generation.
    pub fn validate(&self, entity: Entity) -> Result<()> {
        let Some(slot) = self.entities.get(entity.index as usize) else {
            return Err(Error::entity_not_found(entity));
        };

        if *slot == entity {
            Ok(())
        } else if slot.generation != entity.generation {
            Err(Error::stale_entity(entity))
        } else {
            // Matching generation on a free slot: this handle was never issued.
            Err(Error::entity_not_found(entity))
        }
    }

    /// Returns the live handle at `index`, if the slot is occupied.
    #[must_use]
    pub fn current(&self, index: u32) -> Option<Entity> {
        self.entities
            .get(index as usize)
            .copied()
            .filter(|slot| slot.index == index)
    }

    /// Returns the generation stored at `index`, live or free.
    #[must_use]
    pub fn generation(&self, index: u32) -> Option<u16> {
        self.entities.get(index as usize).map(|slot| slot.generation)
    }

    /// Returns the number of live entities.
    #[must_use]
    pub fn alive(&self) -> usize {
        self.alive
    }

    /// Returns the number of slots ever created (live plus free).
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns true if no slot has ever been created.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Returns the slot limit.
    #[must_use]
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Iterates over live handles in index order.
    pub fn iter(&self) -> impl Iterator<Item = Entity> + '_ {
        self.entities
            .iter()
            .enumerate()
            .filter(|(index, slot)| slot.index as usize == *index)
            .map(|(_, slot)| *slot)
    }

    /// Destroys every live entity. Slots are kept and recycled.
    pub fn clear(&mut self) {
        let live: Vec<Entity> = self.iter().collect();
        for entity in live {
            let index = entity.index as usize;
            self.entities[index] = Entity::new(self.free_head, entity.next_generation());
            self.free_head = entity.index;
        }
        self.alive = 0;
    }
}
