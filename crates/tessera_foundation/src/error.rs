//! Error types for the Tessera storage core.
//!
//! Uses `thiserror` for ergonomic error definition. Every kind here is a
//! violated precondition: fallible APIs hand it back as a value, fail-fast
//! APIs panic with its `Display` text.

use thiserror::Error;

use crate::entity::Entity;

/// The main error type for Tessera operations.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional note naming the operation that failed.
    pub context: Option<&'static str>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Records which operation produced this error.
    #[must_use]
    pub fn with_context(mut self, operation: &'static str) -> Self {
        self.context = Some(operation);
        self
    }

    /// Creates an entity not found error.
    #[must_use]
    pub fn entity_not_found(entity: Entity) -> Self {
        Self::new(ErrorKind::EntityNotFound(entity))
    }

    /// Creates a stale entity reference error.
    #[must_use]
    pub fn stale_entity(entity: Entity) -> Self {
        Self::new(ErrorKind::StaleEntity(entity))
    }

    /// Creates a "component already attached" error.
    #[must_use]
    pub fn component_already_present(entity: Entity, component: &'static str) -> Self {
        Self::new(ErrorKind::ComponentAlreadyPresent { entity, component })
    }

    /// Creates a "component not attached" error.
    #[must_use]
    pub fn component_not_found(entity: Entity, component: &'static str) -> Self {
        Self::new(ErrorKind::ComponentNotFound { entity, component })
    }

    /// Creates a capacity exhausted error.
    #[must_use]
    pub fn capacity_exhausted(limit: usize) -> Self {
        Self::new(ErrorKind::CapacityExhausted { limit })
    }

    /// Returns true if this error reports an unusable entity handle.
    #[must_use]
    pub fn is_invalid_entity(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::EntityNotFound(_) | ErrorKind::StaleEntity(_)
        )
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// Handle index was never issued, or its slot is currently free.
    #[error("entity not found: {0:?}")]
    EntityNotFound(Entity),

    /// Handle generation no longer matches its slot (slot was recycled).
    #[error("stale entity reference: {0:?}")]
    StaleEntity(Entity),

    /// Entity already has a component of this type.
    #[error("component already present: {component} on entity {entity:?}")]
    ComponentAlreadyPresent {
        /// The entity that was targeted.
        entity: Entity,
        /// Type name of the component.
        component: &'static str,
    },

    /// Entity does not have a component of this type.
    #[error("component not found: {component} on entity {entity:?}")]
    ComponentNotFound {
        /// The entity that was queried.
        entity: Entity,
        /// Type name of the component.
        component: &'static str,
    },

    /// Key inserted into a sparse set that already contains it.
    #[error("key already present in sparse set: {key}")]
    KeyAlreadyPresent {
        /// Sparse index of the key.
        key: usize,
    },

    /// Key inserted into a sparse set whose slot holds a different key.
    #[error("sparse slot {key} is occupied by a different key")]
    SlotOccupied {
        /// Sparse index of the key.
        key: usize,
    },

    /// Key erased from a sparse set that does not contain it.
    #[error("key not found in sparse set: {key}")]
    KeyNotFound {
        /// Sparse index of the key.
        key: usize,
    },

    /// The allocator cannot issue another entity index.
    #[error("entity capacity exhausted (limit {limit})")]
    CapacityExhausted {
        /// The configured slot limit.
        limit: usize,
    },

    /// A mutable view named the same component type more than once.
    #[error("component type requested twice in one mutable view: {component}")]
    DuplicateViewComponent {
        /// Type name of the repeated component.
        component: &'static str,
    },

    /// Internal error (should not happen).
    #[error("internal error: {0}")]
    Internal(String),
}
