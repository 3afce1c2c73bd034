//! Per-type component storage.
//!
//! A `ComponentPool<T>` is a [`SparseSet<Entity>`] plus a dense `Vec<T>`
//! kept index-aligned with the set's packed array: `components[i]` belongs
//! to `entities.as_slice()[i]`. Removal swap-pops both arrays in lockstep.

use std::any::{Any, type_name};
use std::fmt;

use tessera_foundation::{Component, Entity, Error, ErrorKind, Result};

use crate::sparse_set::SparseSet;

/// Dense storage for every component of one type.
#[derive(Clone, Debug)]
pub struct ComponentPool<T> {
    /// Which entities have a component, and where it lives.
    entities: SparseSet<Entity>,
    /// Component values, aligned with `entities`.
    components: Vec<T>,
}

impl<T: Component> Default for ComponentPool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Component> ComponentPool<T> {
    /// Creates an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entities: SparseSet::new(),
            components: Vec::new(),
        }
    }

    /// Creates an empty pool with room for `capacity` components.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entities: SparseSet::with_capacity(capacity),
            components: Vec::with_capacity(capacity),
        }
    }

    /// Attaches a component, panicking if the entity already has one.
    ///
    /// # Panics
    ///
    /// Panics with `ComponentAlreadyPresent` if `entity` already has a `T`.
    #[track_caller]
    pub fn emplace(&mut self, entity: Entity, value: T) -> &mut T {
        match self.insert(entity, value) {
            Ok(component) => component,
            Err(err) => panic!("{err}"),
        }
    }

    /// Attaches a component, returning a reference to the stored value.
    ///
    /// # Errors
    ///
    /// Returns `ComponentAlreadyPresent` if `entity` already has a `T`, and
    /// `SlotOccupied` if another generation of the same index holds one. The
    /// pool cannot tell which of the two handles is live; the caller decides
    /// and removes the other first.
    pub fn insert(&mut self, entity: Entity, value: T) -> Result<&mut T> {
        if self.entities.contains(entity) {
            return Err(Error::component_already_present(entity, type_name::<T>()));
        }

        let position = self.entities.insert(entity)?;
        debug_assert_eq!(position, self.components.len());
        self.components.push(value);
        Ok(&mut self.components[position])
    }

    /// Attaches a component or overwrites the existing one, returning the
    /// previous value.
    ///
    /// # Errors
    ///
    /// Returns `SlotOccupied` if another generation of the same index holds
    /// a component.
    pub fn replace(&mut self, entity: Entity, value: T) -> Result<Option<T>> {
        if let Some(slot) = self.get_mut(entity) {
            return Ok(Some(std::mem::replace(slot, value)));
        }
        match self.insert(entity, value) {
            Ok(_) => Ok(None),
            Err(err) => {
                debug_assert!(
                    !matches!(err.kind, ErrorKind::ComponentAlreadyPresent { .. }),
                    "{err}"
                );
                Err(err)
            }
        }
    }

    /// Returns the key stored in `entity`'s slot: `entity` itself, another
    /// generation of the same index, or `None` when the slot is empty.
    #[must_use]
    pub fn occupant(&self, entity: Entity) -> Option<Entity> {
        self.entities.occupant(entity)
    }

    /// Detaches a component and returns it.
    ///
    /// The last component is moved into the vacated slot.
    ///
    /// # Errors
    ///
    /// Returns `ComponentNotFound` if `entity` has no `T`.
    pub fn erase(&mut self, entity: Entity) -> Result<T> {
        let position = self
            .entities
            .erase(entity)
            .map_err(|_| Error::component_not_found(entity, type_name::<T>()))?;
        Ok(self.components.swap_remove(position))
    }

    /// Detaches a component if present.
    pub fn remove(&mut self, entity: Entity) -> Option<T> {
        self.erase(entity).ok()
    }

    /// Returns true if `entity` has a component in this pool.
    #[must_use]
    pub fn contains(&self, entity: Entity) -> bool {
        self.entities.contains(entity)
    }

    /// Gets the component for `entity`.
    #[must_use]
    pub fn get(&self, entity: Entity) -> Option<&T> {
        let position = self.entities.index(entity)?;
        Some(&self.components[position])
    }

    /// Gets the component for `entity` mutably.
    #[must_use]
    pub fn get_mut(&mut self, entity: Entity) -> Option<&mut T> {
        let position = self.entities.index(entity)?;
        Some(&mut self.components[position])
    }

    /// Returns the number of components stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Returns true if the pool is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Returns the entities with a component, in dense order.
    #[must_use]
    pub fn entities(&self) -> &[Entity] {
        self.entities.as_slice()
    }

    /// Returns the components, aligned with [`Self::entities`].
    #[must_use]
    pub fn components(&self) -> &[T] {
        &self.components
    }

    /// Returns the components mutably, aligned with [`Self::entities`].
    #[must_use]
    pub fn components_mut(&mut self) -> &mut [T] {
        &mut self.components
    }

    /// Iterates `(entity, component)` pairs in dense order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (Entity, &T)> {
        self.entities.iter().zip(self.components.iter())
    }

    /// Iterates `(entity, component)` pairs mutably in dense order.
    pub fn iter_mut(&mut self) -> impl DoubleEndedIterator<Item = (Entity, &mut T)> {
        self.entities.iter().zip(self.components.iter_mut())
    }

    /// Reserves room for `additional` more components.
    pub fn reserve(&mut self, additional: usize) {
        self.entities.reserve(additional);
        self.components.reserve(additional);
    }

    /// Drops every component.
    pub fn clear(&mut self) {
        self.entities.clear();
        self.components.clear();
    }
}

/// Type-erased view of a [`ComponentPool`], as stored by the registry.
///
/// Covers everything the registry and views need without knowing `T`;
/// typed access goes through [`ErasedPool::as_any`] and a checked downcast.
pub trait ErasedPool: Any {
    /// Returns the component type name.
    fn component_name(&self) -> &'static str;

    /// Returns the number of components stored.
    fn len(&self) -> usize;

    /// Returns true if the pool is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if `entity` has a component in this pool.
    fn contains(&self, entity: Entity) -> bool;

    /// Returns the entities with a component, in dense order.
    fn entities(&self) -> &[Entity];

    /// Returns the key stored in `entity`'s slot, of any generation.
    fn occupant(&self, entity: Entity) -> Option<Entity>;

    /// Drops the component of `entity`, returning whether one was present.
    fn remove_entity(&mut self, entity: Entity) -> bool;

    /// Drops every component.
    fn clear(&mut self);

    /// Casts to `&dyn Any` for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Casts to `&mut dyn Any` for downcasting.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Component> ErasedPool for ComponentPool<T> {
    fn component_name(&self) -> &'static str {
        type_name::<T>()
    }

    fn len(&self) -> usize {
        self.components.len()
    }

    fn contains(&self, entity: Entity) -> bool {
        self.entities.contains(entity)
    }

    fn entities(&self) -> &[Entity] {
        self.entities.as_slice()
    }

    fn occupant(&self, entity: Entity) -> Option<Entity> {
        ComponentPool::occupant(self, entity)
    }

    fn remove_entity(&mut self, entity: Entity) -> bool {
        self.erase(entity).is_ok()
    }

    fn clear(&mut self) {
        ComponentPool::clear(self);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl fmt::Debug for dyn ErasedPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErasedPool")
            .field("component", &self.component_name())
            .field("len", &self.len())
            .finish()
    }
}

/// Downcasts an erased pool to its concrete type.
///
/// # Errors
///
/// Returns `Internal` if the pool does not store `T`.
pub(crate) fn downcast_ref<'a, T: Component>(
    pool: &'a (dyn ErasedPool + 'static),
) -> Result<&'a ComponentPool<T>> {
    let name = pool.component_name();
    pool.as_any()
        .downcast_ref::<ComponentPool<T>>()
        .ok_or_else(|| pool_mismatch::<T>(name))
}

/// Downcasts an erased pool to its concrete type, mutably.
///
/// # Errors
///
/// Returns `Internal` if the pool does not store `T`.
pub(crate) fn downcast_mut<'a, T: Component>(
    pool: &'a mut (dyn ErasedPool + 'static),
) -> Result<&'a mut ComponentPool<T>> {
    let name = pool.component_name();
    pool.as_any_mut()
        .downcast_mut::<ComponentPool<T>>()
        .ok_or_else(|| pool_mismatch::<T>(name))
}

fn pool_mismatch<T: Component>(found: &str) -> Error {
    Error::new(ErrorKind::Internal(format!(
        "pool type mismatch: expected {}, found {found}",
        type_name::<T>()
    )))
}
