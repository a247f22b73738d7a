//! # Host Bridge Traits
//!
//! Abstraction traits between the mirror core and everything outside it.
//!
//! ## Overview
//!
//! This crate defines the contract between the core crates and their
//! collaborators: the HTTP transport a host supplies, the remote library
//! service a connector implements, and a clock for deterministic tests.
//!
//! ## Traits
//!
//! - [`HttpClient`](http::HttpClient) - Async HTTP operations with retry
//! - [`LibraryProvider`](library::LibraryProvider) - Paged favorites listing and per-album track listings
//! - [`Clock`](time::Clock) - Time source for deterministic testing
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). Implementations
//! should convert their internal errors to `BridgeError` with actionable
//! messages.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` bounds to support safe concurrent
//! usage across async tasks.

pub mod error;
pub mod http;
pub mod library;
pub mod time;

pub use error::BridgeError;

// Re-export commonly used types
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, RetryPolicy};
pub use library::{
    AlbumTrackListing, CatalogRef, FavoritesPage, LibraryProvider, RawAlbumEntry, RawTrackEntry,
};
pub use time::{Clock, SystemClock};
