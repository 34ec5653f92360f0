use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cozystay_core::{NewReview, RatingRange, RepoResult, Review, ReviewRepository};
use serde_json::Value;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db_error;

pub struct PgReviewRepository {
    pool: PgPool,
}

impl PgReviewRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ReviewRow {
    id: Uuid,
    review_id: String,
    rating: i32,
    details: Json<Value>,
    created_at: DateTime<Utc>,
}

impl From<ReviewRow> for Review {
    fn from(row: ReviewRow) -> Self {
        Review::from_stored(row.id, row.review_id, row.rating, row.details.0, row.created_at)
    }
}

#[async_trait]
impl ReviewRepository for PgReviewRepository {
    async fn list_reviews(&self, range: RatingRange) -> RepoResult<Vec<Review>> {
        let rows: Vec<ReviewRow> = sqlx::query_as(
            r#"
            SELECT id, review_id, rating, details, created_at
            FROM reviews
            WHERE ($1::INT4 IS NULL OR rating >= $1)
              AND ($2::INT4 IS NULL OR rating <= $2)
            ORDER BY created_at
            "#,
        )
        .bind(range.min)
        .bind(range.max)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(rows.into_iter().map(Review::from).collect())
    }

    async fn get_review(&self, review_id: &str) -> RepoResult<Option<Review>> {
        let row: Option<ReviewRow> = sqlx::query_as(
            "SELECT id, review_id, rating, details, created_at FROM reviews WHERE review_id = $1",
        )
        .bind(review_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(row.map(Review::from))
    }

    async fn create_review(&self, review: NewReview) -> RepoResult<Review> {
        let row: ReviewRow = sqlx::query_as(
            r#"
            INSERT INTO reviews (id, review_id, rating, details)
            VALUES ($1, $2, $3, $4)
            RETURNING id, review_id, rating, details, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&review.review_id)
        .bind(review.rating)
        .bind(Json(Value::Object(review.details)))
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(Review::from(row))
    }
}
