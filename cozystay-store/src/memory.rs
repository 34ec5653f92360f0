//! In-memory implementation of the room, booking and review repositories.
//!
//! All three collections sit behind one `tokio::sync::RwLock`, so every
//! multi-entity mutation (booking creation, cancellation) is applied while a
//! single write guard is held and is observed atomically by readers.
//!
//! Not durable: state is lost when the process exits. Used by the test suites
//! and when `database.url` is `memory://`.
use async_trait::async_trait;
use chrono::Utc;
use cozystay_core::{
    Booking, BookingFilter, BookingRepository, BookingStatus, CancelCommit, NewBooking,
    NewReview, PriceRange, RatingRange, RepoError, RepoResult, Review, ReviewRepository, Room,
    RoomRepository, StayDetails, UpdateOutcome,
};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Default)]
struct State {
    rooms: HashMap<Uuid, Room>,
    bookings: HashMap<Uuid, Booking>,
    /// Keyed by the caller-supplied `review_id`.
    reviews: HashMap<String, Review>,
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<State>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rooms are managed outside this service; this seeds one directly.
    pub async fn insert_room(&self, room: Room) {
        let room = Room::from_stored(room.id, room.price_per_night, room.available, Value::Object(room.details));
        self.state.write().await.rooms.insert(room.id, room);
    }
}

#[async_trait]
impl RoomRepository for InMemoryStore {
    async fn list_rooms(&self, range: PriceRange) -> RepoResult<Vec<Room>> {
        let state = self.state.read().await;
        let mut rooms: Vec<Room> = state
            .rooms
            .values()
            .filter(|room| range.contains(room.price_per_night))
            .cloned()
            .collect();
        rooms.sort_by(|a, b| a.price_per_night.total_cmp(&b.price_per_night));
        Ok(rooms)
    }

    async fn get_room(&self, id: Uuid) -> RepoResult<Option<Room>> {
        Ok(self.state.read().await.rooms.get(&id).cloned())
    }

    async fn set_available(&self, id: Uuid, available: bool) -> RepoResult<()> {
        if let Some(room) = self.state.write().await.rooms.get_mut(&id) {
            room.available = available;
        }
        Ok(())
    }
}

#[async_trait]
impl BookingRepository for InMemoryStore {
    async fn list_bookings(&self, filter: &BookingFilter) -> RepoResult<Vec<Booking>> {
        let state = self.state.read().await;
        let mut bookings: Vec<Booking> = state
            .bookings
            .values()
            .filter(|booking| filter.matches(booking))
            .cloned()
            .collect();
        bookings.sort_by_key(|booking| booking.created_at);
        Ok(bookings)
    }

    async fn get_booking(&self, id: Uuid) -> RepoResult<Option<Booking>> {
        Ok(self.state.read().await.bookings.get(&id).cloned())
    }

    async fn create_booking(&self, booking: NewBooking) -> RepoResult<Booking> {
        let mut state = self.state.write().await;
        let id = booking.id.unwrap_or_else(Uuid::new_v4);
        if state.bookings.contains_key(&id) {
            return Err(RepoError::Conflict(format!("booking {id} already exists")));
        }
        let room = state
            .rooms
            .get_mut(&booking.room_id)
            .ok_or_else(|| RepoError::NotFound(format!("room {}", booking.room_id)))?;
        room.available = false;

        let now = Utc::now();
        let stored = Booking {
            id,
            email: booking.email,
            room_id: booking.room_id,
            stay: booking.stay,
            status: BookingStatus::Active,
            created_at: now,
            updated_at: now,
        };
        state.bookings.insert(id, stored.clone());
        Ok(stored)
    }

    async fn update_existing(&self, id: Uuid, stay: &StayDetails) -> RepoResult<UpdateOutcome> {
        let mut state = self.state.write().await;
        let Some(booking) = state.bookings.get_mut(&id) else {
            return Ok(UpdateOutcome::Missing);
        };
        if booking.stay == *stay {
            return Ok(UpdateOutcome::Unchanged);
        }
        booking.stay = stay.clone();
        booking.updated_at = Utc::now();
        Ok(UpdateOutcome::Modified)
    }

    async fn delete_booking(&self, id: Uuid) -> RepoResult<u64> {
        let removed = self.state.write().await.bookings.remove(&id);
        Ok(u64::from(removed.is_some()))
    }

    async fn commit_cancellation(&self, id: Uuid, room_id: Uuid) -> RepoResult<CancelCommit> {
        let mut state = self.state.write().await;
        match state.bookings.get_mut(&id) {
            Some(booking) if booking.status == BookingStatus::Active => {
                booking.status = BookingStatus::Canceled;
            }
            _ => return Ok(CancelCommit::AlreadyGone),
        }
        if let Some(room) = state.rooms.get_mut(&room_id) {
            room.available = true;
        }
        state.bookings.remove(&id);
        Ok(CancelCommit::Committed)
    }
}

#[async_trait]
impl ReviewRepository for InMemoryStore {
    async fn list_reviews(&self, range: RatingRange) -> RepoResult<Vec<Review>> {
        let state = self.state.read().await;
        let mut reviews: Vec<Review> = state
            .reviews
            .values()
            .filter(|review| range.contains(review.rating))
            .cloned()
            .collect();
        reviews.sort_by_key(|review| review.created_at);
        Ok(reviews)
    }

    async fn get_review(&self, review_id: &str) -> RepoResult<Option<Review>> {
        Ok(self.state.read().await.reviews.get(review_id).cloned())
    }

    async fn create_review(&self, review: NewReview) -> RepoResult<Review> {
        let review = review.without_reserved();
        let mut state = self.state.write().await;
        if state.reviews.contains_key(&review.review_id) {
            return Err(RepoError::Conflict(format!("review {} already exists", review.review_id)));
        }
        let stored = Review {
            id: Uuid::new_v4(),
            review_id: review.review_id,
            rating: review.rating,
            details: review.details,
            created_at: Utc::now(),
        };
        state.reviews.insert(stored.review_id.clone(), stored.clone());
        Ok(stored)
    }
}
