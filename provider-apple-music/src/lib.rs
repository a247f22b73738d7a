//! # Apple Music Provider
//!
//! `LibraryProvider` implementation for the Apple Music API.

pub mod connector;
pub mod error;
pub mod types;

pub use connector::AppleMusicConnector;
pub use error::{AppleMusicError, Result};
