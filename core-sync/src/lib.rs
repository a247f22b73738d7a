//! # Sync Module
//!
//! Orchestrates synchronization of the mirrored album collection with the
//! remote library.
//!
//! ## Components
//!
//! - **Sync Engine** (`engine`): full and incremental refresh with an
//!   all-or-nothing commit per pass
//! - Normalization helpers: raw entry to album record, catalog id
//!   resolution

pub mod engine;
pub mod error;

pub use engine::{normalize_entry, resolve_catalog_id, SyncEngine};
pub use error::{Result, SyncError};
