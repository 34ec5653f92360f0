use chrono::{DateTime, Utc};
use cozystay_core::{authorize, BookingRepository, BookingStatus, CancelCommit, RepoError};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::policy::{evaluate_cancellation, Rejection};

/// Confirmation returned to the caller. The booking's final state is not
/// exposed since the record no longer exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CanceledBooking {
    pub booking_id: Uuid,
    pub room_id: Uuid,
}

#[derive(Debug, thiserror::Error)]
pub enum CancellationError {
    #[error("Booking not found")]
    NotFound,
    #[error("Booking belongs to another user")]
    Forbidden,
    #[error(transparent)]
    Rejected(#[from] Rejection),
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<RepoError> for CancellationError {
    fn from(err: RepoError) -> Self {
        CancellationError::Internal(err.to_string())
    }
}

/// Validates and executes booking cancellations.
///
/// Sequence: load, ownership, timing rules, then one atomic commit that marks
/// the booking canceled, frees its room and removes the record. Storage errors
/// surface as `Internal`; nothing is retried.
pub struct CancellationWorkflow {
    bookings: Arc<dyn BookingRepository>,
}

impl CancellationWorkflow {
    pub fn new(bookings: Arc<dyn BookingRepository>) -> Self {
        Self { bookings }
    }

    pub async fn cancel(
        &self,
        booking_id: Uuid,
        caller: &str,
        now: DateTime<Utc>,
    ) -> Result<CanceledBooking, CancellationError> {
        let booking = self
            .bookings
            .get_booking(booking_id)
            .await?
            .filter(|b| b.status == BookingStatus::Active)
            .ok_or(CancellationError::NotFound)?;

        if !authorize(&booking.email, caller).is_allowed() {
            return Err(CancellationError::Forbidden);
        }

        if let Err(rejection) = evaluate_cancellation(booking.stay.check_in_date, now) {
            warn!(%booking_id, reason = rejection.reason(), "cancellation rejected");
            return Err(rejection.into());
        }

        match self.bookings.commit_cancellation(booking_id, booking.room_id).await? {
            CancelCommit::Committed => {
                info!(%booking_id, room_id = %booking.room_id, "booking canceled, room released");
                Ok(CanceledBooking {
                    booking_id,
                    room_id: booking.room_id,
                })
            }
            // Lost the race to a concurrent cancel or delete
            CancelCommit::AlreadyGone => Err(CancellationError::NotFound),
        }
    }
}
