use thiserror::Error;

pub mod menu;
pub mod orders;

pub use menu::SqlItemCatalog;
pub use orders::SqlOrderHistory;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}
