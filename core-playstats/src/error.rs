use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlayStatsError {
    #[error("Cache error: {0}")]
    Cache(#[from] core_library::LibraryError),
}

pub type Result<T> = std::result::Result<T, PlayStatsError>;
