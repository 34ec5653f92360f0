use async_trait::async_trait;
use uuid::Uuid;

use crate::booking::{Booking, BookingFilter, NewBooking, StayDetails};
use crate::review::{NewReview, RatingRange, Review};
use crate::room::{PriceRange, Room};

#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("storage failure: {0}")]
    Storage(String),
}

pub type RepoResult<T> = Result<T, RepoError>;

/// Result of replacing the stay fields of a booking that may or may not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Modified,
    /// The record exists but already held exactly these values.
    Unchanged,
    Missing,
}

/// Result of the atomic cancel step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelCommit {
    Committed,
    /// Another caller cancelled (or deleted) the booking first; nothing was written.
    AlreadyGone,
}

/// Repository trait for room data access
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// Rooms within `range`, ascending by price per night.
    async fn list_rooms(&self, range: PriceRange) -> RepoResult<Vec<Room>>;

    async fn get_room(&self, id: Uuid) -> RepoResult<Option<Room>>;

    async fn set_available(&self, id: Uuid, available: bool) -> RepoResult<()>;
}

/// Repository trait for booking data access
#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn list_bookings(&self, filter: &BookingFilter) -> RepoResult<Vec<Booking>>;

    async fn get_booking(&self, id: Uuid) -> RepoResult<Option<Booking>>;

    /// Persist a new active booking and mark its room unavailable in one unit.
    /// Fails with `NotFound` when the room does not exist and `Conflict` when
    /// `booking.id` is already taken.
    async fn create_booking(&self, booking: NewBooking) -> RepoResult<Booking>;

    /// Replace the stay fields of an existing booking. Never inserts.
    async fn update_existing(&self, id: Uuid, stay: &StayDetails) -> RepoResult<UpdateOutcome>;

    /// Returns the number of records removed (0 or 1).
    async fn delete_booking(&self, id: Uuid) -> RepoResult<u64>;

    /// Mark the booking canceled, free `room_id` and remove the booking,
    /// all or nothing.
    async fn commit_cancellation(&self, id: Uuid, room_id: Uuid) -> RepoResult<CancelCommit>;
}

/// Repository trait for review data access
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    async fn list_reviews(&self, range: RatingRange) -> RepoResult<Vec<Review>>;

    async fn get_review(&self, review_id: &str) -> RepoResult<Option<Review>>;

    async fn create_review(&self, review: NewReview) -> RepoResult<Review>;
}
