//! Workspace placeholder crate.
//!
//! This crate exists so host applications can depend on `favorites-mirror`
//! and reach the façade without wiring each workspace crate individually.

pub use core_service::{CoreError, MirrorService, Result};
