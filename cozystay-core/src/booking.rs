use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::{CoreError, CoreResult};

/// Booking status. The only legal transition is `Active -> Canceled`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Active,
    Canceled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Active => "active",
            BookingStatus::Canceled => "canceled",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "active" => Some(BookingStatus::Active),
            "canceled" => Some(BookingStatus::Canceled),
            _ => None,
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The stay itself: dates, party size and cost. This is also the field set a
/// booking update is allowed to replace.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StayDetails {
    #[serde(deserialize_with = "flexible_date::deserialize")]
    pub check_in_date: DateTime<Utc>,
    #[serde(deserialize_with = "flexible_date::deserialize")]
    pub check_out_date: DateTime<Utc>,
    #[serde(default = "default_rooms")]
    pub num_rooms: i32,
    #[serde(default = "default_adults")]
    pub num_adults: i32,
    #[serde(default)]
    pub num_children: i32,
    pub price_per_night: f64,
    pub total_cost: f64,
}

fn default_rooms() -> i32 {
    1
}

fn default_adults() -> i32 {
    1
}

impl StayDetails {
    pub fn validate(&self) -> CoreResult<()> {
        if self.check_out_date <= self.check_in_date {
            return Err(CoreError::ValidationError(
                "checkOutDate must be after checkInDate".to_string(),
            ));
        }
        if self.num_rooms < 1 {
            return Err(CoreError::ValidationError("numRooms must be at least 1".to_string()));
        }
        if self.num_adults < 0 || self.num_children < 0 {
            return Err(CoreError::ValidationError("guest counts cannot be negative".to_string()));
        }
        if self.price_per_night < 0.0 || self.total_cost < 0.0 {
            return Err(CoreError::ValidationError("prices cannot be negative".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: Uuid,
    pub email: String,
    #[serde(rename = "room_id")]
    pub room_id: Uuid,
    #[serde(flatten)]
    pub stay: StayDetails,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for inserting a booking. `id` is only set on the upsert path, where
/// the caller names the record.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub id: Option<Uuid>,
    pub email: String,
    pub room_id: Uuid,
    pub stay: StayDetails,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingFilter {
    All,
    Owner(String),
    Room(Uuid),
}

impl BookingFilter {
    pub fn matches(&self, booking: &Booking) -> bool {
        match self {
            BookingFilter::All => true,
            BookingFilter::Owner(email) => booking.email == *email,
            BookingFilter::Room(room_id) => booking.room_id == *room_id,
        }
    }
}

/// Accepts either a full RFC 3339 timestamp or a bare `YYYY-MM-DD` date,
/// which is read as midnight UTC.
pub mod flexible_date {
    use super::*;
    use serde::Deserializer;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(serde::de::Error::custom)
    }

    pub fn parse(raw: &str) -> Result<DateTime<Utc>, String> {
        if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
            return Ok(ts.with_timezone(&Utc));
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
            .ok_or_else(|| format!("invalid date: {raw}"))
    }
}
