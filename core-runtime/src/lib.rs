//! # Core Runtime
//!
//! Ambient infrastructure shared by the mirror core crates: configuration,
//! structured logging, and the progress event bus.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use config::{CoreConfig, CoreConfigBuilder};
pub use error::{Error, Result};
pub use events::{CoreEvent, EnrichEvent, EventBus, SyncEvent};
pub use logging::{init_logging, LogFormat, LoggingConfig};
