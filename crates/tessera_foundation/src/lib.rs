//! Entity handles, component type ids, and error types for Tessera.
//!
//! This crate provides:
//! - [`Entity`] - Generational entity handles (20-bit index, 12-bit generation)
//! - [`ComponentTable`] - Explicit registry assigning a [`ComponentId`] per type
//! - [`Error`] - Precondition errors shared by every storage layer

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod component;
pub mod entity;
pub mod error;

pub use component::{Component, ComponentId, ComponentInfo, ComponentTable};
pub use entity::Entity;
pub use error::{Error, ErrorKind};

/// Result type alias using Tessera's Error type.
pub type Result<T> = std::result::Result<T, Error>;
