use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    middleware::from_fn_with_state,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use cozystay_booking::{BookingSeed, UpsertOutcome};
use cozystay_core::{Booking, BookingFilter, BookingStatus, NewBooking, StayDetails};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::{ensure_owner, session_middleware};
use crate::session::SessionClaims;
use crate::state::AppState;
use crate::parse_id;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct BookingQuery {
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub email: String,
    pub room_id: Uuid,
    #[serde(flatten)]
    pub stay: StayDetails,
}

#[derive(Debug, Deserialize)]
pub struct UpdateBookingRequest {
    #[serde(flatten)]
    pub stay: StayDetails,
    /// Only read when the id is unknown and a booking gets created.
    pub email: Option<String>,
    pub room_id: Option<Uuid>,
}

/// What the public per-room listing exposes: occupancy, not guests.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomOccupancy {
    pub id: Uuid,
    #[serde(rename = "room_id")]
    pub room_id: Uuid,
    pub check_in_date: DateTime<Utc>,
    pub check_out_date: DateTime<Utc>,
    pub status: BookingStatus,
}

impl From<Booking> for RoomOccupancy {
    fn from(booking: Booking) -> Self {
        Self {
            id: booking.id,
            room_id: booking.room_id,
            check_in_date: booking.stay.check_in_date,
            check_out_date: booking.stay.check_out_date,
            status: booking.status,
        }
    }
}

pub fn routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/bookings", get(list_bookings).post(create_booking))
        .route(
            "/bookings/{id}",
            get(get_booking).put(update_booking).delete(delete_booking),
        )
        .route("/bookings/{id}/cancel", post(cancel_booking))
        .route_layer(from_fn_with_state(state, session_middleware));

    Router::new()
        .route("/bookings/room/{room_id}", get(list_room_bookings))
        .merge(protected)
}

async fn load_owned(state: &AppState, id: Uuid, session: &SessionClaims) -> Result<Booking, AppError> {
    let booking = state
        .bookings
        .get_booking(id)
        .await?
        .ok_or_else(|| AppError::NotFoundError("Booking not found".to_string()))?;
    ensure_owner(&booking.email, session)?;
    Ok(booking)
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /bookings?email=
/// Bookings of the session owner; asking for anyone else is forbidden
async fn list_bookings(
    State(state): State<AppState>,
    Extension(session): Extension<SessionClaims>,
    Query(query): Query<BookingQuery>,
) -> Result<Json<Vec<Booking>>, AppError> {
    let requested = query.email.unwrap_or_else(|| session.email.clone());
    ensure_owner(&requested, &session)?;

    let bookings = state.bookings.list_bookings(&BookingFilter::Owner(requested)).await?;
    Ok(Json(bookings))
}

/// GET /bookings/:id
async fn get_booking(
    State(state): State<AppState>,
    Extension(session): Extension<SessionClaims>,
    Path(id): Path<String>,
) -> Result<Json<Booking>, AppError> {
    let id = parse_id(&id)?;
    Ok(Json(load_owned(&state, id, &session).await?))
}

/// GET /bookings/room/:room_id
async fn list_room_bookings(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> Result<Json<Vec<RoomOccupancy>>, AppError> {
    let room_id = parse_id(&room_id)?;
    let bookings = state.bookings.list_bookings(&BookingFilter::Room(room_id)).await?;
    Ok(Json(bookings.into_iter().map(RoomOccupancy::from).collect()))
}

/// POST /bookings
async fn create_booking(
    State(state): State<AppState>,
    Extension(session): Extension<SessionClaims>,
    body: Result<Json<CreateBookingRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Booking>), AppError> {
    let Json(req) = body?;
    ensure_owner(&req.email, &session)?;

    let booking = state
        .manager
        .create(NewBooking {
            id: None,
            email: req.email,
            room_id: req.room_id,
            stay: req.stay,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(booking)))
}

/// PUT /bookings/:id
/// Replaces the stay fields; an unknown id creates the booking (201)
async fn update_booking(
    State(state): State<AppState>,
    Extension(session): Extension<SessionClaims>,
    Path(id): Path<String>,
    body: Result<Json<UpdateBookingRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let id = parse_id(&id)?;
    let Json(req) = body?;

    let seed = match state.bookings.get_booking(id).await? {
        Some(existing) => {
            ensure_owner(&existing.email, &session)?;
            None
        }
        None => {
            let email = req.email.unwrap_or_else(|| session.email.clone());
            ensure_owner(&email, &session)?;
            req.room_id.map(|room_id| BookingSeed { email, room_id })
        }
    };

    let response = match state.manager.upsert(id, &req.stay, seed).await? {
        UpsertOutcome::Created(booking) => (
            StatusCode::CREATED,
            json!({ "message": "Booking created", "created": true, "modified": false, "booking": booking }),
        ),
        UpsertOutcome::Modified => (
            StatusCode::OK,
            json!({ "message": "Booking updated successfully", "created": false, "modified": true }),
        ),
        UpsertOutcome::Unchanged => (
            StatusCode::OK,
            json!({ "message": "Booking unchanged", "created": false, "modified": false }),
        ),
    };
    Ok((response.0, Json(response.1)))
}

/// DELETE /bookings/:id
async fn delete_booking(
    State(state): State<AppState>,
    Extension(session): Extension<SessionClaims>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let id = parse_id(&id)?;
    let deleted = match state.bookings.get_booking(id).await? {
        Some(existing) => {
            ensure_owner(&existing.email, &session)?;
            state.manager.delete(id).await?
        }
        None => 0,
    };
    Ok(Json(json!({ "deletedCount": deleted })))
}

/// POST /bookings/:id/cancel
async fn cancel_booking(
    State(state): State<AppState>,
    Extension(session): Extension<SessionClaims>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let id = parse_id(&id)?;
    state.cancellation.cancel(id, &session.email, Utc::now()).await?;
    Ok(Json(json!({ "message": "Booking canceled successfully" })))
}

