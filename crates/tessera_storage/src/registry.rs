//! The registry: entities plus one lazily created pool per component type.
//!
//! Pools live in a `Vec<Box<dyn ErasedPool>>` indexed by [`ComponentId`];
//! the registry's [`ComponentTable`] hands out ids in registration order, so
//! `pools[id.index()]` is always the pool for that id.

use std::any::type_name;

use tessera_foundation::{Component, ComponentId, ComponentTable, Entity, Error, ErrorKind, Result};

use crate::config::RegistryConfig;
use crate::entity::EntityAllocator;
use crate::pool::{ComponentPool, ErasedPool, downcast_mut, downcast_ref};
use crate::view::{View, ViewMut, ViewQuery};

/// Owns every entity and every component pool.
#[derive(Debug)]
pub struct Registry {
    /// Settings the registry was built with.
    config: RegistryConfig,
    /// Entity handles and the generation table.
    entities: EntityAllocator,
    /// Component type table; ids index `pools`.
    components: ComponentTable,
    /// One pool per registered component type.
    pools: Vec<Box<dyn ErasedPool>>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Creates an empty registry with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Creates an empty registry with the given settings.
    #[must_use]
    pub fn with_config(config: RegistryConfig) -> Self {
        let mut entities = EntityAllocator::with_limit(config.max_entities);
        entities.reserve(config.entity_capacity);
        Self {
            config,
            entities,
            components: ComponentTable::new(),
            pools: Vec::new(),
        }
    }

    /// Returns the settings this registry was built with.
    #[must_use]
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    // --- Component Types ---

    /// Registers `T`, creating its pool if needed, and returns its id.
    ///
    /// Calling this is optional: every operation that stores a `T` registers
    /// it on first use. Registering up front fixes the id order.
    pub fn register<T: Component>(&mut self) -> ComponentId {
        self.assure::<T>()
    }

    /// Returns the id of `T`, if it has been registered.
    #[must_use]
    pub fn component_id<T: Component>(&self) -> Option<ComponentId> {
        self.components.id_of::<T>()
    }

    /// Returns the component type table.
    #[must_use]
    pub fn components(&self) -> &ComponentTable {
        &self.components
    }

    /// Returns the pool for `T`, if one exists.
    #[must_use]
    pub fn pool<T: Component>(&self) -> Option<&ComponentPool<T>> {
        let id = self.components.id_of::<T>()?;
        downcast_ref(self.pools[id.index()].as_ref()).ok()
    }

    /// Returns the number of `T` components stored.
    #[must_use]
    pub fn len_of<T: Component>(&self) -> usize {
        self.pool::<T>().map_or(0, ComponentPool::len)
    }

    /// Registers `T` and creates its pool on first use.
    pub(crate) fn assure<T: Component>(&mut self) -> ComponentId {
        let id = self.components.register::<T>();
        if id.index() == self.pools.len() {
            self.pools
                .push(Box::new(ComponentPool::<T>::with_capacity(self.config.pool_capacity)));
            tracing::debug!(component = type_name::<T>(), ?id, "created component pool");
        }
        id
    }

    fn pool_mut<T: Component>(&mut self) -> Result<&mut ComponentPool<T>> {
        let id = self.assure::<T>();
        downcast_mut(self.pools[id.index()].as_mut())
    }

    /// Borrows the pools for `ids` mutably at once, alongside the allocator.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateViewComponent` if an id appears twice.
    pub(crate) fn split_pools_mut<const N: usize>(
        &mut self,
        ids: [ComponentId; N],
    ) -> Result<(&EntityAllocator, [&mut (dyn ErasedPool + 'static); N])> {
        for (position, id) in ids.iter().enumerate() {
            if ids[..position].contains(id) {
                let component = self.components.info(*id).map_or("<unknown>", |info| info.name);
                return Err(Error::new(ErrorKind::DuplicateViewComponent { component }));
            }
        }

        let mut slots: [Option<&mut (dyn ErasedPool + 'static)>; N] =
            std::array::from_fn(|_| None);
        for (index, pool) in self.pools.iter_mut().enumerate() {
            if let Some(slot) = ids.iter().position(|id| id.index() == index) {
                slots[slot] = Some(pool.as_mut());
            }
        }

        let pools: Vec<&mut (dyn ErasedPool + 'static)> = slots.into_iter().flatten().collect();
        let pools = <[&mut (dyn ErasedPool + 'static); N]>::try_from(pools).map_err(|_| {
            Error::new(ErrorKind::Internal(
                "view requested a component without a pool".to_string(),
            ))
        })?;
        Ok((&self.entities, pools))
    }

    // --- Entity Operations ---

    /// Creates an entity, panicking if the entity limit is reached.
    ///
    /// # Panics
    ///
    /// Panics with `CapacityExhausted` when no slot is free.
    #[track_caller]
    pub fn create(&mut self) -> Entity {
        expect_ok(self.try_create())
    }

    /// Creates an entity.
    ///
    /// # Errors
    ///
    /// Returns `CapacityExhausted` when no slot is free.
    pub fn try_create(&mut self) -> Result<Entity> {
        let entity = self.entities.try_create()?;
        tracing::trace!(?entity, "created entity");
        Ok(entity)
    }

    /// Destroys an entity, panicking if the handle is not valid.
    ///
    /// Components are left in their pools; use [`Self::despawn`] to drop
    /// them too.
    ///
    /// # Panics
    ///
    /// Panics with `EntityNotFound` or `StaleEntity`.
    #[track_caller]
    pub fn destroy(&mut self, entity: Entity) {
        expect_ok(self.try_destroy(entity));
    }

    /// Destroys an entity without touching its components.
    ///
    /// Components left behind are unreachable through the registry and its
    /// views. They are dropped when the pool's slot is reused or the
    /// registry is cleared. When the slot's generation is about to wrap back
    /// to zero they are dropped here instead, since the next handle issued
    /// for the slot would otherwise equal an old one that still owns them.
    ///
    /// # Errors
    ///
    /// Returns `EntityNotFound` or `StaleEntity` when `entity` is not valid.
    pub fn try_destroy(&mut self, entity: Entity) -> Result<()> {
        self.entities.try_destroy(entity)?;
        tracing::trace!(?entity, "destroyed entity");

        if cfg!(debug_assertions) {
            let leftover = self.pools.iter().filter(|pool| pool.contains(entity)).count();
            if leftover > 0 {
                tracing::warn!(
                    ?entity,
                    leftover,
                    "destroyed entity still has components; use despawn to drop them"
                );
            }
        }

        if entity.next_generation() == 0 {
            let purged = self
                .pools
                .iter_mut()
                .filter_map(|pool| {
                    pool.occupant(entity)
                        .map(|occupant| pool.remove_entity(occupant))
                })
                .filter(|&removed| removed)
                .count();
            tracing::trace!(?entity, purged, "generation wrapped; purged slot");
        }
        Ok(())
    }

    /// Removes every component of `entity`, then destroys it.
    ///
    /// # Panics
    ///
    /// Panics with `EntityNotFound` or `StaleEntity`.
    #[track_caller]
    pub fn despawn(&mut self, entity: Entity) -> usize {
        expect_ok(self.try_despawn(entity))
    }

    /// Removes every component of `entity`, then destroys it. Returns the
    /// number of components dropped.
    ///
    /// # Errors
    ///
    /// Returns `EntityNotFound` or `StaleEntity` when `entity` is not valid.
    pub fn try_despawn(&mut self, entity: Entity) -> Result<usize> {
        self.entities
            .validate(entity)
            .map_err(|err| err.with_context("despawn"))?;

        let removed = self
            .pools
            .iter_mut()
            .map(|pool| pool.remove_entity(entity))
            .filter(|&removed| removed)
            .count();
        self.entities.try_destroy(entity)?;
        tracing::trace!(?entity, removed, "despawned entity");
        Ok(removed)
    }

    /// Returns true if `entity` is the live handle for its slot.
    #[must_use]
    pub fn valid(&self, entity: Entity) -> bool {
        self.entities.valid(entity)
    }

    /// Returns true if `entity` is valid and holds no components.
    #[must_use]
    pub fn orphan(&self, entity: Entity) -> bool {
        self.valid(entity) && !self.pools.iter().any(|pool| pool.contains(entity))
    }

    /// Returns the number of live entities.
    #[must_use]
    pub fn alive(&self) -> usize {
        self.entities.alive()
    }

    /// Iterates over live entities in index order.
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.entities.iter()
    }

    /// Returns the entity allocator.
    #[must_use]
    pub fn allocator(&self) -> &EntityAllocator {
        &self.entities
    }

    /// Destroys every entity and empties every pool.
    ///
    /// Registered types keep their ids and their (now empty) pools.
    pub fn clear(&mut self) {
        for pool in &mut self.pools {
            pool.clear();
        }
        self.entities.clear();
        tracing::debug!(pools = self.pools.len(), "cleared registry");
    }

    // --- Component Operations ---

    /// Attaches a component, panicking on failure.
    ///
    /// # Panics
    ///
    /// Panics if `entity` is not valid or already has a `T`.
    #[track_caller]
    pub fn emplace<T: Component>(&mut self, entity: Entity, value: T) -> &mut T {
        expect_ok(self.insert(entity, value))
    }

    /// Attaches a component.
    ///
    /// # Errors
    ///
    /// Returns `EntityNotFound` or `StaleEntity` for an invalid handle, and
    /// `ComponentAlreadyPresent` if `entity` already has a `T`.
    pub fn insert<T: Component>(&mut self, entity: Entity, value: T) -> Result<&mut T> {
        self.entities
            .validate(entity)
            .map_err(|err| err.with_context("emplace"))?;
        let pool = self.pool_mut::<T>()?;
        evict_stale(pool, entity);
        pool.insert(entity, value)
    }

    /// Attaches a component or overwrites the existing one, returning the
    /// previous value.
    ///
    /// # Panics
    ///
    /// Panics if `entity` is not valid.
    #[track_caller]
    pub fn set<T: Component>(&mut self, entity: Entity, value: T) -> Option<T> {
        if let Err(err) = self.entities.validate(entity) {
            panic!("{err}");
        }
        let pool = expect_ok(self.pool_mut::<T>());
        evict_stale(pool, entity);
        expect_ok(pool.replace(entity, value))
    }

    /// Detaches a component and returns it, panicking if it is absent.
    ///
    /// # Panics
    ///
    /// Panics if `entity` is not valid or has no `T`.
    #[track_caller]
    pub fn remove<T: Component>(&mut self, entity: Entity) -> T {
        expect_ok(self.erase::<T>(entity))
    }

    /// Detaches a component if `entity` is valid and has one.
    pub fn try_remove<T: Component>(&mut self, entity: Entity) -> Option<T> {
        self.erase::<T>(entity).ok()
    }

    /// Detaches a component and returns it.
    ///
    /// # Errors
    ///
    /// Returns `EntityNotFound` or `StaleEntity` for an invalid handle, and
    /// `ComponentNotFound` if `entity` has no `T`.
    pub fn erase<T: Component>(&mut self, entity: Entity) -> Result<T> {
        self.entities.validate(entity)?;
        let id = self
            .components
            .id_of::<T>()
            .ok_or_else(|| Error::component_not_found(entity, type_name::<T>()))?;
        downcast_mut::<T>(self.pools[id.index()].as_mut())?.erase(entity)
    }

    /// Returns true if `entity` is valid and has a `T`.
    #[must_use]
    pub fn has<T: Component>(&self, entity: Entity) -> bool {
        self.valid(entity) && self.pool::<T>().is_some_and(|pool| pool.contains(entity))
    }

    /// Gets a component, panicking if it is absent.
    ///
    /// # Panics
    ///
    /// Panics if `entity` is not valid or has no `T`.
    #[track_caller]
    #[must_use]
    pub fn get<T: Component>(&self, entity: Entity) -> &T {
        expect_ok(self.component::<T>(entity))
    }

    /// Gets a component mutably, panicking if it is absent.
    ///
    /// # Panics
    ///
    /// Panics if `entity` is not valid or has no `T`.
    #[track_caller]
    pub fn get_mut<T: Component>(&mut self, entity: Entity) -> &mut T {
        expect_ok(self.component_mut::<T>(entity))
    }

    /// Gets a component if `entity` is valid and has one.
    #[must_use]
    pub fn try_get<T: Component>(&self, entity: Entity) -> Option<&T> {
        self.component::<T>(entity).ok()
    }

    /// Gets a component mutably if `entity` is valid and has one.
    pub fn try_get_mut<T: Component>(&mut self, entity: Entity) -> Option<&mut T> {
        self.component_mut::<T>(entity).ok()
    }

    fn component<T: Component>(&self, entity: Entity) -> Result<&T> {
        self.entities.validate(entity)?;
        self.pool::<T>()
            .and_then(|pool| pool.get(entity))
            .ok_or_else(|| Error::component_not_found(entity, type_name::<T>()))
    }

    fn component_mut<T: Component>(&mut self, entity: Entity) -> Result<&mut T> {
        self.entities.validate(entity)?;
        let id = self
            .components
            .id_of::<T>()
            .ok_or_else(|| Error::component_not_found(entity, type_name::<T>()))?;
        downcast_mut::<T>(self.pools[id.index()].as_mut())?
            .get_mut(entity)
            .ok_or_else(|| Error::component_not_found(entity, type_name::<T>()))
    }

    // --- Views ---

    /// Creates a read-only view over every entity holding all of `Q`.
    ///
    /// Types without a pool yet make the view empty.
    #[must_use]
    pub fn view<Q: ViewQuery>(&self) -> View<'_, Q> {
        View::new(&self.entities, Q::fetch(self))
    }

    /// Creates a mutable view, panicking if `Q` repeats a type.
    ///
    /// # Panics
    ///
    /// Panics with `DuplicateViewComponent` if `Q` names a type twice.
    #[track_caller]
    pub fn view_mut<Q: ViewQuery>(&mut self) -> ViewMut<'_, Q> {
        expect_ok(self.try_view_mut())
    }

    /// Creates a mutable view, registering any type that has no pool yet.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateViewComponent` if `Q` names a type twice.
    pub fn try_view_mut<Q: ViewQuery>(&mut self) -> Result<ViewMut<'_, Q>> {
        let (allocator, pools) = Q::fetch_mut(self)?;
        Ok(ViewMut::new(allocator, pools))
    }
}

/// Drops a component left in `entity`'s slot by an earlier generation.
///
/// Only called once `entity` has been validated, so any other occupant of
/// the slot is stale.
fn evict_stale<T: Component>(pool: &mut ComponentPool<T>, entity: Entity) {
    if let Some(stale) = pool.occupant(entity).filter(|&occupant| occupant != entity) {
        pool.remove(stale);
        tracing::trace!(component = type_name::<T>(), ?stale, ?entity, "evicted stale component");
    }
}

#[track_caller]
fn expect_ok<T>(result: Result<T>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => panic!("{err}"),
    }
}
