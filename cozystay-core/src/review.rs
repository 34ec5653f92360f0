use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::attributes;

/// Keys of the typed review fields as they appear in JSON.
pub const REVIEW_FIELDS: &[&str] = &["id", "review_id", "rating", "createdAt"];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Review {
    pub id: Uuid,
    /// Caller-supplied business key used for lookups.
    pub review_id: String,
    pub rating: i32,
    #[serde(flatten)]
    pub details: Map<String, Value>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewReview {
    pub review_id: String,
    pub rating: i32,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

impl Review {
    pub fn from_stored(
        id: Uuid,
        review_id: String,
        rating: i32,
        details: Value,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            review_id,
            rating,
            details: attributes::from_stored(details, REVIEW_FIELDS),
            created_at,
        }
    }
}

impl NewReview {
    /// Attributes a client sent under a server-owned key are discarded.
    pub fn without_reserved(mut self) -> Self {
        self.details = attributes::strip_reserved(self.details, REVIEW_FIELDS);
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RatingRange {
    pub min: Option<i32>,
    pub max: Option<i32>,
}

impl RatingRange {
    pub fn contains(&self, rating: i32) -> bool {
        self.min.is_none_or(|min| rating >= min) && self.max.is_none_or(|max| rating <= max)
    }
}
