use cozystay_core::{
    Booking, BookingRepository, CoreError, NewBooking, RepoError, StayDetails, UpdateOutcome,
};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Owner and room for a booking created through the upsert path.
#[derive(Debug, Clone)]
pub struct BookingSeed {
    pub email: String,
    pub room_id: Uuid,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UpsertOutcome {
    Created(Booking),
    Modified,
    Unchanged,
}

#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("storage failure: {0}")]
    Storage(String),
}

impl From<RepoError> for BookingError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => BookingError::NotFound(msg),
            RepoError::Conflict(msg) => BookingError::Conflict(msg),
            RepoError::Storage(msg) => BookingError::Storage(msg),
        }
    }
}

impl From<CoreError> for BookingError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ValidationError(msg) => BookingError::Validation(msg),
        }
    }
}

/// Validated booking writes on top of a [`BookingRepository`].
pub struct BookingManager {
    bookings: Arc<dyn BookingRepository>,
}

impl BookingManager {
    pub fn new(bookings: Arc<dyn BookingRepository>) -> Self {
        Self { bookings }
    }

    pub async fn create(&self, booking: NewBooking) -> Result<Booking, BookingError> {
        booking.stay.validate()?;
        let stored = self.bookings.create_booking(booking).await?;
        info!(booking_id = %stored.id, room_id = %stored.room_id, "booking created");
        Ok(stored)
    }

    /// Replace the stay fields of an existing booking; a missing id is
    /// `NotFound`, never an insert.
    pub async fn update_existing(&self, id: Uuid, stay: &StayDetails) -> Result<UpdateOutcome, BookingError> {
        stay.validate()?;
        match self.bookings.update_existing(id, stay).await? {
            UpdateOutcome::Missing => Err(BookingError::NotFound(format!("booking {id}"))),
            outcome => Ok(outcome),
        }
    }

    /// Update-or-insert kept for callers of `PUT /bookings/:id`, which has
    /// always inserted when the id is unknown. Unlike before, the outcome says
    /// which of the two happened.
    pub async fn upsert(
        &self,
        id: Uuid,
        stay: &StayDetails,
        seed: Option<BookingSeed>,
    ) -> Result<UpsertOutcome, BookingError> {
        stay.validate()?;
        match self.bookings.update_existing(id, stay).await? {
            UpdateOutcome::Modified => return Ok(UpsertOutcome::Modified),
            UpdateOutcome::Unchanged => return Ok(UpsertOutcome::Unchanged),
            UpdateOutcome::Missing => {}
        }

        let seed = seed.ok_or_else(|| {
            BookingError::Validation("email and room_id are required to create a booking".to_string())
        })?;
        let new_booking = NewBooking {
            id: Some(id),
            email: seed.email,
            room_id: seed.room_id,
            stay: stay.clone(),
        };

        match self.bookings.create_booking(new_booking).await {
            Ok(created) => {
                info!(booking_id = %id, "booking created by upsert");
                Ok(UpsertOutcome::Created(created))
            }
            // Someone inserted the same id between our update and insert
            Err(RepoError::Conflict(_)) => match self.bookings.update_existing(id, stay).await? {
                UpdateOutcome::Modified => Ok(UpsertOutcome::Modified),
                UpdateOutcome::Unchanged => Ok(UpsertOutcome::Unchanged),
                UpdateOutcome::Missing => Err(BookingError::Conflict(format!("booking {id}"))),
            },
            Err(err) => Err(err.into()),
        }
    }

    pub async fn delete(&self, id: Uuid) -> Result<u64, BookingError> {
        Ok(self.bookings.delete_booking(id).await?)
    }
}
