pub mod access;
pub mod attributes;
pub mod booking;
pub mod repository;
pub mod review;
pub mod room;

pub use access::{authorize, Access};
pub use booking::{Booking, BookingFilter, BookingStatus, NewBooking, StayDetails};
pub use repository::{
    BookingRepository, CancelCommit, RepoError, RepoResult, ReviewRepository, RoomRepository,
    UpdateOutcome,
};
pub use review::{NewReview, RatingRange, Review};
pub use room::{PriceRange, Room};

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
