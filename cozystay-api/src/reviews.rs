use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use cozystay_core::{NewReview, RatingRange, Review};
use serde::Deserialize;

use crate::{error::AppError, parse_bound, state::AppState};

#[derive(Debug, Deserialize)]
pub struct ReviewQuery {
    #[serde(rename = "minRating")]
    min_rating: Option<String>,
    #[serde(rename = "maxRating")]
    max_rating: Option<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/reviews", get(list_reviews).post(create_review))
        .route("/reviews/{review_id}", get(get_review))
}

async fn list_reviews(
    State(state): State<AppState>,
    Query(query): Query<ReviewQuery>,
) -> Result<Json<Vec<Review>>, AppError> {
    let range = RatingRange {
        min: parse_bound::<i32>("minRating", query.min_rating.as_deref())?,
        max: parse_bound::<i32>("maxRating", query.max_rating.as_deref())?,
    };
    Ok(Json(state.reviews.list_reviews(range).await?))
}

async fn get_review(
    State(state): State<AppState>,
    Path(review_id): Path<String>,
) -> Result<Json<Review>, AppError> {
    state
        .reviews
        .get_review(&review_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFoundError("Review not found".to_string()))
}

async fn create_review(
    State(state): State<AppState>,
    body: Result<Json<NewReview>, JsonRejection>,
) -> Result<(StatusCode, Json<Review>), AppError> {
    let Json(review) = body?;
    if review.review_id.trim().is_empty() {
        return Err(AppError::ValidationError("review_id is required".to_string()));
    }
    let stored = state.reviews.create_review(review.without_reserved()).await?;
    tracing::info!(review_id = %stored.review_id, "review created");
    Ok((StatusCode::CREATED, Json(stored)))
}
