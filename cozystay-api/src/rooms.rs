use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use cozystay_core::{PriceRange, Room};
use serde::Deserialize;

use crate::{error::AppError, parse_id, parse_bound, state::AppState};

#[derive(Debug, Deserialize)]
pub struct RoomQuery {
    #[serde(rename = "minPrice")]
    min_price: Option<String>,
    #[serde(rename = "maxPrice")]
    max_price: Option<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/rooms", get(list_rooms))
        .route("/rooms/{id}", get(get_room))
}

/// GET /rooms?minPrice=&maxPrice=
/// Rooms in the inclusive price range, cheapest first
async fn list_rooms(
    State(state): State<AppState>,
    Query(query): Query<RoomQuery>,
) -> Result<Json<Vec<Room>>, AppError> {
    let range = PriceRange::new(
        parse_bound::<f64>("minPrice", query.min_price.as_deref())?,
        parse_bound::<f64>("maxPrice", query.max_price.as_deref())?,
    );
    Ok(Json(state.rooms.list_rooms(range).await?))
}

/// GET /rooms/:id
async fn get_room(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Room>, AppError> {
    let id = parse_id(&id)?;
    state
        .rooms
        .get_room(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFoundError("Room not found".to_string()))
}
