// ABOUTME: Local persistence for Diagram Designer
// ABOUTME: SQLite key/value store backing node positions and viewer preferences

pub mod local_store;
pub mod positions;
pub mod preferences;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StorageError>;

pub use local_store::LocalStore;
pub use positions::{AllPositions, PositionStore};
pub use preferences::Preferences;
