use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Refresh already in progress")]
    SyncInProgress,

    #[error("Favorites fetch failed: {0}")]
    FetchFailed(String),

    #[error("Cache error: {0}")]
    Cache(#[from] core_library::LibraryError),
}

pub type Result<T> = std::result::Result<T, SyncError>;
