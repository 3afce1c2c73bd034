//! Integration tests for Layer 0: Foundation
//!
//! Tests for core types: Entity, ComponentTable, and Error.
