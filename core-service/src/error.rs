use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Runtime error: {0}")]
    Runtime(#[from] core_runtime::Error),

    #[error("Sync error: {0}")]
    Sync(#[from] core_sync::SyncError),

    #[error("Library error: {0}")]
    Library(#[from] core_library::LibraryError),

    #[error("Play statistics error: {0}")]
    PlayStats(#[from] core_playstats::PlayStatsError),

    #[error("Export error: {0}")]
    Export(#[from] core_export::ExportError),
}

pub type Result<T> = std::result::Result<T, CoreError>;
