pub mod error;
pub mod repository;
pub mod seed;
pub mod sorting;
pub mod sqlite;
pub mod traits;
pub mod types;

pub use error::Result;
pub use repository::ApartmentRepository;
pub use seed::seed_if_missing;
pub use sqlite::SqliteStore;
pub use types::CatalogConfig;
