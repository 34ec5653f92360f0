pub mod app_config;
pub mod booking_repo;
pub mod database;
pub mod memory;
pub mod review_repo;
pub mod room_repo;

pub use booking_repo::PgBookingRepository;
pub use database::DbClient;
pub use memory::InMemoryStore;
pub use review_repo::PgReviewRepository;
pub use room_repo::PgRoomRepository;

use cozystay_core::RepoError;

pub(crate) fn db_error(err: sqlx::Error) -> RepoError {
    match &err {
        sqlx::Error::RowNotFound => RepoError::NotFound(err.to_string()),
        sqlx::Error::Database(db) if db.is_unique_violation() => RepoError::Conflict(db.message().to_string()),
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => RepoError::NotFound(db.message().to_string()),
        _ => RepoError::Storage(err.to_string()),
    }
}
