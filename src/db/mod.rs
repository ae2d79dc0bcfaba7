pub mod error;
pub mod migrations;
pub mod repository;

pub use error::StoreError;
pub use repository::{Repository, SqliteRepository};
