//! Time Source Abstraction
//!
//! A small clock trait so components that need "now" (timestamping saves,
//! deriving a fallback release year) can be driven deterministically in
//! tests.

use chrono::{DateTime, Utc};

/// Time source trait
pub trait Clock: Send + Sync {
    /// Current instant in UTC
    fn now(&self) -> DateTime<Utc>;

    /// Current calendar year in UTC
    fn current_year(&self) -> i32 {
        use chrono::Datelike;
        self.now().year()
    }
}

/// System wall-clock implementation
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
