pub mod supabase;

use crate::models::user::DirectoryUser;

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    #[error("directory responded with {status}: {message}")]
    Status { status: u16, message: String },
    #[error("invalid directory configuration: {0}")]
    Config(String),
}

/// Abstraction over the remote user directory.
///
/// The application state holds one of these behind an `Arc<dyn Directory>`, so handlers never
/// know which service backs it. Tests substitute an in-memory implementation.
#[async_trait]
pub trait Directory: Send + Sync {
    /// Lists users in the directory.
    ///
    /// Only the first page the service returns is listed; pagination cursors are not followed.
    async fn list_users(&self) -> Result<Vec<DirectoryUser>, DirectoryError>;
}
