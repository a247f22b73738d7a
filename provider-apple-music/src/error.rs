//! Error types for the Apple Music provider

use thiserror::Error;

/// Apple Music provider errors
#[derive(Error, Debug)]
pub enum AppleMusicError {
    /// API request returned an error status
    #[error("Apple Music API error (status {status_code}): {message}")]
    ApiError { status_code: u16, message: String },

    /// Failed to parse an API response
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Catalog album lookup returned no resource
    #[error("Catalog album not found: {catalog_id}")]
    AlbumNotFound { catalog_id: i64 },

    /// Bridge error
    #[error(transparent)]
    Bridge(#[from] bridge_traits::error::BridgeError),
}

/// Result type for Apple Music operations
pub type Result<T> = std::result::Result<T, AppleMusicError>;

impl From<AppleMusicError> for bridge_traits::error::BridgeError {
    fn from(error: AppleMusicError) -> Self {
        match error {
            AppleMusicError::ApiError {
                status_code,
                message,
            } => bridge_traits::error::BridgeError::OperationFailed(format!(
                "API error (status {}): {}",
                status_code, message
            )),
            AppleMusicError::ParseError(msg) => {
                bridge_traits::error::BridgeError::OperationFailed(format!("Parse error: {}", msg))
            }
            AppleMusicError::AlbumNotFound { catalog_id } => {
                bridge_traits::error::BridgeError::OperationFailed(format!(
                    "Catalog album not found: {}",
                    catalog_id
                ))
            }
            AppleMusicError::Bridge(e) => e,
        }
    }
}
