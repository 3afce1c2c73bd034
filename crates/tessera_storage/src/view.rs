//! Views: lazy iteration over entities that hold a set of component types.
//!
//! A view picks the smallest of its pools as the *driver* and walks the
//! driver's dense entity array, keeping each entity that every other pool
//! also contains. Nothing is materialized; membership is re-tested as the
//! cursor advances, in either direction.
//!
//! Single-component views have no other pools to test, so each step only
//! checks the entity's handle against the allocator. That check is what
//! hides components left behind by destroyed entities.
//!
//! Both view kinds borrow the [`Registry`], so the borrow checker rejects
//! structural changes (creating or destroying entities, attaching or
//! detaching components) while a view is alive.

use std::any::{Any, type_name};
use std::iter::FusedIterator;

use tessera_foundation::{Component, Entity, Error, Result};

use crate::entity::EntityAllocator;
use crate::pool::{ComponentPool, ErasedPool, downcast_mut};
use crate::registry::Registry;

mod sealed {
    pub trait Sealed {}
}

/// A tuple of component types a view can iterate over.
///
/// Implemented for `(A,)` through `(A, B, C, D, E, F, G, H)`.
pub trait ViewQuery: sealed::Sealed + 'static {
    /// Number of component types in the query.
    const ARITY: usize;

    /// Shared pool references, `None` where a type has no pool yet.
    type Pools<'a>: Copy;

    /// Shared component references for one entity.
    type Item<'a>;

    /// Exclusive pool references.
    type PoolsMut<'a>;

    /// Exclusive component references for one entity.
    type ItemMut<'a>;

    /// Looks up the pools for each type.
    fn fetch(registry: &Registry) -> Self::Pools<'_>;

    /// Borrows the pools for each type mutably, creating missing ones.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateViewComponent` if a type appears twice.
    fn fetch_mut(registry: &mut Registry) -> Result<(&EntityAllocator, Self::PoolsMut<'_>)>;

    /// Returns the pool at `position` in the tuple, type-erased.
    fn erased<'a>(pools: &Self::Pools<'a>, position: usize) -> Option<&'a dyn ErasedPool>;

    /// Returns the exclusive pool at `position` in the tuple, type-erased.
    fn erased_mut<'p>(
        pools: &'p Self::PoolsMut<'_>,
        position: usize,
    ) -> Option<&'p dyn ErasedPool>;

    /// Returns the type name at `position` in the tuple.
    fn component_name(position: usize) -> &'static str;

    /// Fetches every component of `entity`, or `None` if one is missing.
    fn get<'a>(pools: &Self::Pools<'a>, entity: Entity) -> Option<Self::Item<'a>>;

    /// Fetches every component of `entity` mutably.
    fn get_mut<'p>(
        pools: &'p mut Self::PoolsMut<'_>,
        entity: Entity,
    ) -> Option<Self::ItemMut<'p>>;

    /// Finds the pool storing `Target`, if it is part of the query.
    fn pool_of<'a, Target: Component>(
        pools: &Self::Pools<'a>,
    ) -> Option<&'a ComponentPool<Target>>;

    /// Finds the exclusive pool storing `Target`, if it is part of the query.
    fn pool_of_mut<'p, Target: Component>(
        pools: &'p mut Self::PoolsMut<'_>,
    ) -> Option<&'p mut ComponentPool<Target>>;
}

macro_rules! impl_view_query {
    ($arity:literal; $($T:ident $p:ident $idx:tt),+) => {
        impl<$($T: Component),+> sealed::Sealed for ($($T,)+) {}

        impl<$($T: Component),+> ViewQuery for ($($T,)+) {
            const ARITY: usize = $arity;

            type Pools<'a> = ($(Option<&'a ComponentPool<$T>>,)+);
            type Item<'a> = ($(&'a $T,)+);
            type PoolsMut<'a> = ($(&'a mut ComponentPool<$T>,)+);
            type ItemMut<'a> = ($(&'a mut $T,)+);

            fn fetch(registry: &Registry) -> Self::Pools<'_> {
                ($(registry.pool::<$T>(),)+)
            }

            fn fetch_mut(
                registry: &mut Registry,
            ) -> Result<(&EntityAllocator, Self::PoolsMut<'_>)> {
                let ids = [$(registry.assure::<$T>(),)+];
                let (allocator, [$($p,)+]) = registry.split_pools_mut(ids)?;
                Ok((allocator, ($(downcast_mut::<$T>($p)?,)+)))
            }

            fn erased<'a>(pools: &Self::Pools<'a>, position: usize) -> Option<&'a dyn ErasedPool> {
                match position {
                    $($idx => pools.$idx.map(|pool| pool as &dyn ErasedPool),)+
                    _ => None,
                }
            }

            fn erased_mut<'p>(
                pools: &'p Self::PoolsMut<'_>,
                position: usize,
            ) -> Option<&'p dyn ErasedPool> {
                match position {
                    $($idx => Some(&*pools.$idx as &dyn ErasedPool),)+
                    _ => None,
                }
            }

            fn component_name(position: usize) -> &'static str {
                match position {
                    $($idx => type_name::<$T>(),)+
                    _ => "<out of range>",
                }
            }

            fn get<'a>(pools: &Self::Pools<'a>, entity: Entity) -> Option<Self::Item<'a>> {
                Some(($(pools.$idx?.get(entity)?,)+))
            }

            fn get_mut<'p>(
                pools: &'p mut Self::PoolsMut<'_>,
                entity: Entity,
            ) -> Option<Self::ItemMut<'p>> {
                let ($($p,)+) = pools;
                Some(($($p.get_mut(entity)?,)+))
            }

            fn pool_of<'a, Target: Component>(
                pools: &Self::Pools<'a>,
            ) -> Option<&'a ComponentPool<Target>> {
                $(
                    if let Some(found) = pools
                        .$idx
                        .and_then(|pool| (pool as &dyn Any).downcast_ref::<ComponentPool<Target>>())
                    {
                        return Some(found);
                    }
                )+
                None
            }

            fn pool_of_mut<'p, Target: Component>(
                pools: &'p mut Self::PoolsMut<'_>,
            ) -> Option<&'p mut ComponentPool<Target>> {
                let ($($p,)+) = pools;
                $(
                    if let Some(found) =
                        (&mut **$p as &mut dyn Any).downcast_mut::<ComponentPool<Target>>()
                    {
                        return Some(found);
                    }
                )+
                None
            }
        }

        impl<$($T: Component),+> ViewMut<'_, ($($T,)+)> {
            /// Calls `f` with every matching entity and its components,
            /// mutably, in the driver's dense order.
            pub fn for_each<Func>(&mut self, mut f: Func)
            where
                Func: FnMut(Entity, ($(&mut $T,)+)),
            {
                let mut position = 0;
                while let Some(&entity) = self.driver_entities().get(position) {
                    position += 1;
                    if !self.accepts(entity) {
                        continue;
                    }
                    if let Some(item) = <($($T,)+) as ViewQuery>::get_mut(&mut self.pools, entity) {
                        f(entity, item);
                    }
                }
            }
        }
    };
}

impl_view_query!(1; A a 0);
impl_view_query!(2; A a 0, B b 1);
impl_view_query!(3; A a 0, B b 1, C c 2);
impl_view_query!(4; A a 0, B b 1, C c 2, D d 3);
impl_view_query!(5; A a 0, B b 1, C c 2, D d 3, E e 4);
impl_view_query!(6; A a 0, B b 1, C c 2, D d 3, E e 4, F f 5);
impl_view_query!(7; A a 0, B b 1, C c 2, D d 3, E e 4, F f 5, G g 6);
impl_view_query!(8; A a 0, B b 1, C c 2, D d 3, E e 4, F f 5, G g 6, H h 7);

/// Picks the smallest pool. `None` if any pool is missing.
fn select_driver<'a, Q: ViewQuery>(pools: &Q::Pools<'a>) -> Option<(usize, &'a [Entity])> {
    let mut driver: Option<(usize, &'a [Entity])> = None;
    for position in 0..Q::ARITY {
        let entities = Q::erased(pools, position)?.entities();
        if driver.is_none_or(|(_, smallest)| entities.len() < smallest.len()) {
            driver = Some((position, entities));
        }
    }
    driver
}

/// Read-only view over entities holding every type in `Q`.
pub struct View<'a, Q: ViewQuery> {
    allocator: &'a EntityAllocator,
    pools: Q::Pools<'a>,
    /// Position of the driver pool and its entity array.
    driver: Option<(usize, &'a [Entity])>,
}

impl<Q: ViewQuery> Clone for View<'_, Q> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<Q: ViewQuery> Copy for View<'_, Q> {}

impl<Q: ViewQuery> std::fmt::Debug for View<'_, Q> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("View")
            .field("query", &type_name::<Q>())
            .field("driver", &self.driver.map(|(position, _)| Q::component_name(position)))
            .field("size_hint", &self.size_hint())
            .finish()
    }
}

impl<'a, Q: ViewQuery> View<'a, Q> {
    pub(crate) fn new(allocator: &'a EntityAllocator, pools: Q::Pools<'a>) -> Self {
        let driver = select_driver::<Q>(&pools);
        Self {
            allocator,
            pools,
            driver,
        }
    }

    /// Returns true if `entity` passes every check except the driver pool.
    fn accepts(&self, entity: Entity, driver: usize) -> bool {
        self.allocator.valid(entity)
            && (0..Q::ARITY)
                .filter(|&position| position != driver)
                .all(|position| {
                    Q::erased(&self.pools, position).is_some_and(|pool| pool.contains(entity))
                })
    }

    /// Returns true if `entity` is valid and holds every type in `Q`.
    #[must_use]
    pub fn contains(&self, entity: Entity) -> bool {
        self.allocator.valid(entity)
            && (0..Q::ARITY).all(|position| {
                Q::erased(&self.pools, position).is_some_and(|pool| pool.contains(entity))
            })
    }

    /// Iterates matching entities in the driver's dense order.
    #[must_use]
    pub fn iter(&self) -> ViewIter<'a, Q> {
        ViewIter {
            view: *self,
            front: 0,
            back: self.size_hint(),
        }
    }

    /// Returns every component of `entity`, panicking if it is not in the
    /// view.
    ///
    /// # Panics
    ///
    /// Panics if `entity` is invalid or lacks one of the types.
    #[track_caller]
    #[must_use]
    pub fn get(&self, entity: Entity) -> Q::Item<'a> {
        match self.try_get(entity) {
            Some(item) => item,
            None => panic!("{}", self.missing(entity)),
        }
    }

    /// Returns every component of `entity`, if it is in the view.
    #[must_use]
    pub fn try_get(&self, entity: Entity) -> Option<Q::Item<'a>> {
        if !self.allocator.valid(entity) {
            return None;
        }
        Q::get(&self.pools, entity)
    }

    /// Returns one component of `entity`.
    ///
    /// # Panics
    ///
    /// Panics if `T` is not part of the view, or `entity` is invalid or has
    /// no `T`.
    #[track_caller]
    #[must_use]
    pub fn component<T: Component>(&self, entity: Entity) -> &'a T {
        match self.try_component::<T>(entity) {
            Some(component) => component,
            None => match self.allocator.validate(entity) {
                Err(err) => panic!("{err}"),
                Ok(()) => panic!("{}", Error::component_not_found(entity, type_name::<T>())),
            },
        }
    }

    /// Returns one component of `entity`, if `T` is part of the view and the
    /// entity has it.
    #[must_use]
    pub fn try_component<T: Component>(&self, entity: Entity) -> Option<&'a T> {
        if !self.allocator.valid(entity) {
            return None;
        }
        Q::pool_of::<T>(&self.pools)?.get(entity)
    }

    /// Calls `f` with every matching entity and its components.
    pub fn each<F>(&self, mut f: F)
    where
        F: FnMut(Entity, Q::Item<'a>),
    {
        for entity in self.iter() {
            if let Some(item) = Q::get(&self.pools, entity) {
                f(entity, item);
            }
        }
    }

    /// Iterates `(entity, components)` pairs.
    pub fn components(
        &self,
    ) -> impl DoubleEndedIterator<Item = (Entity, Q::Item<'a>)> + use<'a, Q> {
        let pools = self.pools;
        self.iter()
            .filter_map(move |entity| Q::get(&pools, entity).map(|item| (entity, item)))
    }

    /// Returns the driver pool's size, an upper bound on the number of
    /// matching entities.
    #[must_use]
    pub fn size_hint(&self) -> usize {
        self.driver.map_or(0, |(_, entities)| entities.len())
    }

    /// Returns true if no entity matches.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    fn missing(&self, entity: Entity) -> Error {
        if let Err(err) = self.allocator.validate(entity) {
            return err;
        }
        let position = (0..Q::ARITY)
            .find(|&position| {
                !Q::erased(&self.pools, position).is_some_and(|pool| pool.contains(entity))
            })
            .unwrap_or(0);
        Error::component_not_found(entity, Q::component_name(position))
    }
}

impl<'a, Q: ViewQuery> IntoIterator for View<'a, Q> {
    type Item = Entity;
    type IntoIter = ViewIter<'a, Q>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, Q: ViewQuery> IntoIterator for &View<'a, Q> {
    type Item = Entity;
    type IntoIter = ViewIter<'a, Q>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Bidirectional cursor over a [`View`].
///
/// `front..back` is the unvisited range of the driver's entity array.
pub struct ViewIter<'a, Q: ViewQuery> {
    view: View<'a, Q>,
    front: usize,
    back: usize,
}

impl<Q: ViewQuery> Clone for ViewIter<'_, Q> {
    fn clone(&self) -> Self {
        Self {
            view: self.view,
            front: self.front,
            back: self.back,
        }
    }
}

impl<Q: ViewQuery> std::fmt::Debug for ViewIter<'_, Q> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewIter")
            .field("view", &self.view)
            .field("front", &self.front)
            .field("back", &self.back)
            .finish()
    }
}

impl<Q: ViewQuery> Iterator for ViewIter<'_, Q> {
    type Item = Entity;

    fn next(&mut self) -> Option<Entity> {
        let (driver, entities) = self.view.driver?;
        while self.front < self.back {
            let entity = entities[self.front];
            self.front += 1;
            if self.view.accepts(entity, driver) {
                return Some(entity);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.back - self.front))
    }
}

impl<Q: ViewQuery> DoubleEndedIterator for ViewIter<'_, Q> {
    fn next_back(&mut self) -> Option<Entity> {
        let (driver, entities) = self.view.driver?;
        while self.front < self.back {
            self.back -= 1;
            let entity = entities[self.back];
            if self.view.accepts(entity, driver) {
                return Some(entity);
            }
        }
        None
    }
}

impl<Q: ViewQuery> FusedIterator for ViewIter<'_, Q> {}

/// Exclusive view over entities holding every type in `Q`.
///
/// Created with [`Registry::view_mut`]; pools for the query's types are
/// created on demand, so the view is never missing a pool.
pub struct ViewMut<'a, Q: ViewQuery> {
    allocator: &'a EntityAllocator,
    pools: Q::PoolsMut<'a>,
    /// Position of the driver pool.
    driver: usize,
}

impl<Q: ViewQuery> std::fmt::Debug for ViewMut<'_, Q> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewMut")
            .field("query", &type_name::<Q>())
            .field("driver", &Q::component_name(self.driver))
            .field("size_hint", &self.size_hint())
            .finish()
    }
}

impl<'a, Q: ViewQuery> ViewMut<'a, Q> {
    pub(crate) fn new(allocator: &'a EntityAllocator, pools: Q::PoolsMut<'a>) -> Self {
        let mut driver = 0;
        let mut smallest = usize::MAX;
        for position in 0..Q::ARITY {
            let len = Q::erased_mut(&pools, position).map_or(usize::MAX, |pool| pool.len());
            if len < smallest {
                driver = position;
                smallest = len;
            }
        }
        Self {
            allocator,
            pools,
            driver,
        }
    }

    fn driver_entities(&self) -> &[Entity] {
        Q::erased_mut(&self.pools, self.driver)
            .map(|pool| pool.entities())
            .unwrap_or_default()
    }

    fn accepts(&self, entity: Entity) -> bool {
        self.allocator.valid(entity)
            && (0..Q::ARITY)
                .filter(|&position| position != self.driver)
                .all(|position| {
                    Q::erased_mut(&self.pools, position).is_some_and(|pool| pool.contains(entity))
                })
    }

    /// Returns true if `entity` is valid and holds every type in `Q`.
    #[must_use]
    pub fn contains(&self, entity: Entity) -> bool {
        self.allocator.valid(entity)
            && (0..Q::ARITY).all(|position| {
                Q::erased_mut(&self.pools, position).is_some_and(|pool| pool.contains(entity))
            })
    }

    /// Returns every component of `entity` mutably, panicking if it is not in
    /// the view.
    ///
    /// # Panics
    ///
    /// Panics if `entity` is invalid or lacks one of the types.
    #[track_caller]
    pub fn get_mut(&mut self, entity: Entity) -> Q::ItemMut<'_> {
        if let Err(err) = self.check(entity) {
            panic!("{err}");
        }
        match Q::get_mut(&mut self.pools, entity) {
            Some(item) => item,
            None => panic!("{}", Error::component_not_found(entity, type_name::<Q>())),
        }
    }

    /// Returns every component of `entity` mutably, if it is in the view.
    pub fn try_get_mut(&mut self, entity: Entity) -> Option<Q::ItemMut<'_>> {
        if !self.allocator.valid(entity) {
            return None;
        }
        Q::get_mut(&mut self.pools, entity)
    }

    /// Returns one component of `entity` mutably, if `T` is part of the view
    /// and the entity has it.
    pub fn component_mut<T: Component>(&mut self, entity: Entity) -> Option<&mut T> {
        if !self.allocator.valid(entity) {
            return None;
        }
        Q::pool_of_mut::<T>(&mut self.pools)?.get_mut(entity)
    }

    /// Iterates matching entities in the driver's dense order.
    pub fn entities(&self) -> impl DoubleEndedIterator<Item = Entity> + '_ {
        self.driver_entities()
            .iter()
            .copied()
            .filter(|&entity| self.accepts(entity))
    }

    /// Returns the driver pool's size, an upper bound on the number of
    /// matching entities.
    #[must_use]
    pub fn size_hint(&self) -> usize {
        self.driver_entities().len()
    }

    fn check(&self, entity: Entity) -> Result<()> {
        self.allocator.validate(entity)?;
        match (0..Q::ARITY).find(|&position| {
            !Q::erased_mut(&self.pools, position).is_some_and(|pool| pool.contains(entity))
        }) {
            Some(position) => Err(Error::component_not_found(entity, Q::component_name(position))),
            None => Ok(()),
        }
    }
}
