//! Configuration for a [`Registry`](crate::Registry).

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::entity::EntityAllocator;

/// Capacity settings for a registry.
///
/// Nothing here changes observable semantics; it only controls up-front
/// reservation and the entity limit.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RegistryConfig {
    /// Entity slots reserved when the registry is created.
    pub entity_capacity: usize,

    /// Components reserved in each pool when it is first created.
    pub pool_capacity: usize,

    /// Maximum number of entity slots (clamped to what a handle can address).
    pub max_entities: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            entity_capacity: 0,
            pool_capacity: 0,
            max_entities: EntityAllocator::MAX_SLOTS,
        }
    }
}

impl RegistryConfig {
    /// Creates a configuration that reserves room for `entities` entities
    /// and as many components per pool.
    #[must_use]
    pub fn preallocated(entities: usize) -> Self {
        Self {
            entity_capacity: entities,
            pool_capacity: entities,
            ..Self::default()
        }
    }

    /// Builder method to set the reserved entity slots.
    #[must_use]
    pub fn with_entity_capacity(mut self, capacity: usize) -> Self {
        self.entity_capacity = capacity;
        self
    }

    /// Builder method to set the per-pool reservation.
    #[must_use]
    pub fn with_pool_capacity(mut self, capacity: usize) -> Self {
        self.pool_capacity = capacity;
        self
    }

    /// Builder method to set the entity limit.
    #[must_use]
    pub fn with_max_entities(mut self, max: usize) -> Self {
        self.max_entities = max.min(EntityAllocator::MAX_SLOTS);
        self
    }
}
