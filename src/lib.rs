//! Tessera - Sparse-set entity-component storage
//!
//! This crate re-exports all layers of the Tessera storage core for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 1: tessera_storage    — SparseSet, EntityAllocator, ComponentPool, Registry, View
//! Layer 0: tessera_foundation — Core types (Entity, ComponentId, Error)
//! ```
//!
//! # Example
//!
//! ```
//! use tessera::storage::Registry;
//!
//! struct Position(f32, f32);
//! struct Velocity(f32, f32);
//!
//! let mut registry = Registry::new();
//! let e = registry.create();
//! registry.emplace(e, Position(0.0, 0.0));
//! registry.emplace(e, Velocity(1.0, 2.0));
//!
//! registry
//!     .view_mut::<(Position, Velocity)>()
//!     .for_each(|_, (p, v)| {
//!         p.0 += v.0;
//!         p.1 += v.1;
//!     });
//!
//! assert_eq!(registry.get::<Position>(e).1, 2.0);
//! ```

pub use tessera_foundation as foundation;
pub use tessera_storage as storage;
