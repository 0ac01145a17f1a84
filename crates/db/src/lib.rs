pub mod connection;
pub mod fixtures;
pub mod migrations;
pub mod repositories;

pub use connection::{connect, DbPool};
pub use fixtures::{seed_demo_data, SeedSummary};
pub use repositories::{RepositoryError, SqlItemCatalog, SqlOrderHistory};
