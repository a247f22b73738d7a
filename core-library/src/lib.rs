//! # Library Module
//!
//! Durable local state of the album mirror: the album record model, the two
//! persisted cache documents and their file stores, and the user-driven
//! exclusion set.

pub mod error;
pub mod exclusion;
pub mod models;
pub mod store;

pub use error::{LibraryError, Result};
pub use exclusion::ExclusionManager;
pub use models::{canonical_link_for, derive_release_year, AlbumRecord, CATALOG_ALBUM_URL_BASE};
pub use store::{AlbumCache, AlbumCacheStore, PlayCountCache, PlayCountStore};
