//! Sparse-set entity and component storage for Tessera.
//!
//! This crate provides:
//! - [`SparseSet`] - O(1) insert, erase, and membership over sparse keys
//! - [`EntityAllocator`] - Generational entity allocation with an intrusive free list
//! - [`ComponentPool`] - Dense per-type component storage
//! - [`Registry`] - Entities plus one lazily created pool per component type
//! - [`View`] / [`ViewMut`] - Lazy intersection of several pools, driven by the smallest

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod entity;
pub mod pool;
pub mod registry;
pub mod sparse_set;
pub mod view;

pub use config::RegistryConfig;
pub use entity::EntityAllocator;
pub use pool::{ComponentPool, ErasedPool};
pub use registry::Registry;
pub use sparse_set::{SparseKey, SparseSet};
pub use view::{View, ViewIter, ViewMut, ViewQuery};
