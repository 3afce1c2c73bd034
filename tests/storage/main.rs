//! Integration tests for Layer 1: Storage
//!
//! Tests for sparse sets, entity allocation, component pools, the registry, and views.

mod registry;
mod sparse_set;
mod views;
