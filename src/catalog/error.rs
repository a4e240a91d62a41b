use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CatalogError>;

/// Failures of the local apartment catalog
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to open catalog database at {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("schema migration to version {version} failed: {source}")]
    Migration {
        version: i32,
        #[source]
        source: rusqlite::Error,
    },

    #[error("catalog query failed: {0}")]
    Query(#[from] rusqlite::Error),

    #[error("catalog storage unavailable: {0}")]
    Unavailable(String),
}

impl From<tokio::task::JoinError> for CatalogError {
    fn from(err: tokio::task::JoinError) -> Self {
        CatalogError::Unavailable(format!("storage task did not complete: {}", err))
    }
}
