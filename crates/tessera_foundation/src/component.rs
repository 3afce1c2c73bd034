//! Component type identifiers.
//!
//! Each distinct component type is entered into a [`ComponentTable`] once
//! and receives a [`ComponentId`] that indexes the owning registry's pools.
//! Ids come from the table itself, in registration order, so there is no
//! process-wide counter and no reliance on static initialization order.

use std::any::{TypeId, type_name};
use std::collections::HashMap;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Marker trait for values that can be stored as components.
///
/// Any `'static` type qualifies; components only need to be movable and
/// droppable, since pools relocate them on swap-and-pop removal.
pub trait Component: 'static {}

impl<T: 'static> Component for T {}

/// Numeric token identifying a registered component type.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ComponentId(pub(crate) u32);

impl ComponentId {
    /// Returns the dense index of this component type.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComponentId({})", self.0)
    }
}

/// Metadata recorded for each registered component type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComponentInfo {
    /// The id assigned at registration.
    pub id: ComponentId,
    /// Rust type name, used in error messages and logs.
    pub name: &'static str,
    /// The type's `TypeId`.
    pub type_id: TypeId,
    /// Size of one value in bytes.
    pub size: usize,
}

/// Table mapping component types to their ids.
///
/// Ids are dense, start at zero, and are never reused or unregistered.
/// Not thread-safe; each registry owns its own table.
#[derive(Clone, Debug, Default)]
pub struct ComponentTable {
    /// Registered types, indexed by `ComponentId`.
    infos: Vec<ComponentInfo>,
    /// Map from `TypeId` to assigned id.
    by_type: HashMap<TypeId, ComponentId>,
}

impl ComponentTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `T`, returning its id.
    ///
    /// Registering an already known type returns the existing id.
    ///
    /// # Panics
    ///
    /// Panics if more than `u32::MAX` types are registered.
    pub fn register<T: Component>(&mut self) -> ComponentId {
        let type_id = TypeId::of::<T>();
        if let Some(&id) = self.by_type.get(&type_id) {
            return id;
        }

        let id = ComponentId(
            u32::try_from(self.infos.len()).expect("too many registered component types"),
        );
        let name = type_name::<T>();
        self.infos.push(ComponentInfo {
            id,
            name,
            type_id,
            size: std::mem::size_of::<T>(),
        });
        self.by_type.insert(type_id, id);
        tracing::debug!(component = name, id = id.0, "registered component type");
        id
    }

    /// Looks up the id of `T` without registering it.
    #[must_use]
    pub fn id_of<T: Component>(&self) -> Option<ComponentId> {
        self.by_type.get(&TypeId::of::<T>()).copied()
    }

    /// Gets the metadata for an id.
    #[must_use]
    pub fn info(&self, id: ComponentId) -> Option<&ComponentInfo> {
        self.infos.get(id.0 as usize)
    }

    /// Returns the number of registered types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.infos.len()
    }

    /// Returns true if no type has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.infos.is_empty()
    }

    /// Iterates registered types in id order.
    pub fn iter(&self) -> impl Iterator<Item = &ComponentInfo> {
        self.infos.iter()
    }
}
