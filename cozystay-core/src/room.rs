use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::attributes;

/// Keys of the typed room fields as they appear in JSON.
pub const ROOM_FIELDS: &[&str] = &["id", "pricePerNight", "available"];

/// A rentable room. Everything besides price and availability is an opaque
/// descriptive payload kept as-is.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: Uuid,
    pub price_per_night: f64,
    pub available: bool,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

impl Room {
    /// Rebuilds a room from persisted columns, discarding attributes that would
    /// shadow the typed fields.
    pub fn from_stored(id: Uuid, price_per_night: f64, available: bool, details: Value) -> Self {
        Self {
            id,
            price_per_night,
            available,
            details: attributes::from_stored(details, ROOM_FIELDS),
        }
    }
}

/// Inclusive price bounds; an absent bound is unconstrained.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PriceRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl PriceRange {
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, price: f64) -> bool {
        self.min.is_none_or(|min| price >= min) && self.max.is_none_or(|max| price <= max)
    }
}
