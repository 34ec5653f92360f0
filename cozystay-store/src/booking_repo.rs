use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cozystay_core::{
    Booking, BookingFilter, BookingRepository, BookingStatus, CancelCommit, NewBooking, RepoError,
    RepoResult, StayDetails, UpdateOutcome,
};
use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;
use uuid::Uuid;

use crate::db_error;

const BOOKING_COLUMNS: &str = "id, email, room_id, check_in_date, check_out_date, num_rooms, \
     num_adults, num_children, price_per_night, total_cost, status, created_at, updated_at";

pub struct PgBookingRepository {
    pool: PgPool,
}

impl PgBookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    email: String,
    room_id: Uuid,
    check_in_date: DateTime<Utc>,
    check_out_date: DateTime<Utc>,
    num_rooms: i32,
    num_adults: i32,
    num_children: i32,
    price_per_night: f64,
    total_cost: f64,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<BookingRow> for Booking {
    type Error = RepoError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        let status = BookingStatus::parse(&row.status)
            .ok_or_else(|| RepoError::Storage(format!("unknown booking status {:?}", row.status)))?;
        Ok(Booking {
            id: row.id,
            email: row.email,
            room_id: row.room_id,
            stay: StayDetails {
                check_in_date: row.check_in_date,
                check_out_date: row.check_out_date,
                num_rooms: row.num_rooms,
                num_adults: row.num_adults,
                num_children: row.num_children,
                price_per_night: row.price_per_night,
                total_cost: row.total_cost,
            },
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn into_bookings(rows: Vec<BookingRow>) -> RepoResult<Vec<Booking>> {
    rows.into_iter().map(Booking::try_from).collect()
}

async fn lock_stay(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
) -> Result<Option<BookingRow>, sqlx::Error> {
    sqlx::query_as(&format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1 FOR UPDATE"))
        .bind(id)
        .fetch_optional(&mut **tx)
        .await
}

#[async_trait]
impl BookingRepository for PgBookingRepository {
    async fn list_bookings(&self, filter: &BookingFilter) -> RepoResult<Vec<Booking>> {
        let rows: Vec<BookingRow> = match filter {
            BookingFilter::All => {
                sqlx::query_as(&format!("SELECT {BOOKING_COLUMNS} FROM bookings ORDER BY created_at"))
                    .fetch_all(&self.pool)
                    .await
            }
            BookingFilter::Owner(email) => {
                sqlx::query_as(&format!(
                    "SELECT {BOOKING_COLUMNS} FROM bookings WHERE email = $1 ORDER BY created_at"
                ))
                .bind(email)
                .fetch_all(&self.pool)
                .await
            }
            BookingFilter::Room(room_id) => {
                sqlx::query_as(&format!(
                    "SELECT {BOOKING_COLUMNS} FROM bookings WHERE room_id = $1 ORDER BY check_in_date"
                ))
                .bind(room_id)
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(db_error)?;

        into_bookings(rows)
    }

    async fn get_booking(&self, id: Uuid) -> RepoResult<Option<Booking>> {
        let row: Option<BookingRow> =
            sqlx::query_as(&format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(db_error)?;

        row.map(Booking::try_from).transpose()
    }

    async fn create_booking(&self, booking: NewBooking) -> RepoResult<Booking> {
        let booking_id = booking.id.unwrap_or_else(Uuid::new_v4);
        let stay = &booking.stay;

        let mut tx = self.pool.begin().await.map_err(db_error)?;

        let room: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM rooms WHERE id = $1 FOR UPDATE")
            .bind(booking.room_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_error)?;
        if room.is_none() {
            return Err(RepoError::NotFound(format!("room {}", booking.room_id)));
        }

        let row: BookingRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO bookings (id, email, room_id, check_in_date, check_out_date, num_rooms, num_adults, num_children, price_per_night, total_cost, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {BOOKING_COLUMNS}
            "#
        ))
        .bind(booking_id)
        .bind(&booking.email)
        .bind(booking.room_id)
        .bind(stay.check_in_date)
        .bind(stay.check_out_date)
        .bind(stay.num_rooms)
        .bind(stay.num_adults)
        .bind(stay.num_children)
        .bind(stay.price_per_night)
        .bind(stay.total_cost)
        .bind(BookingStatus::Active.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error)?;

        sqlx::query("UPDATE rooms SET available = FALSE WHERE id = $1")
            .bind(booking.room_id)
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;

        tx.commit().await.map_err(db_error)?;

        Booking::try_from(row)
    }

    async fn update_existing(&self, id: Uuid, stay: &StayDetails) -> RepoResult<UpdateOutcome> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        let current = match lock_stay(&mut tx, id).await.map_err(db_error)? {
            Some(row) => Booking::try_from(row)?,
            None => return Ok(UpdateOutcome::Missing),
        };
        if current.stay == *stay {
            debug!(booking_id = %id, "update is a no-op");
            return Ok(UpdateOutcome::Unchanged);
        }

        sqlx::query(
            r#"
            UPDATE bookings
            SET check_in_date = $1, check_out_date = $2, num_rooms = $3, num_adults = $4,
                num_children = $5, total_cost = $6, price_per_night = $7, updated_at = NOW()
            WHERE id = $8
            "#,
        )
        .bind(stay.check_in_date)
        .bind(stay.check_out_date)
        .bind(stay.num_rooms)
        .bind(stay.num_adults)
        .bind(stay.num_children)
        .bind(stay.total_cost)
        .bind(stay.price_per_night)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(db_error)?;

        tx.commit().await.map_err(db_error)?;
        Ok(UpdateOutcome::Modified)
    }

    async fn delete_booking(&self, id: Uuid) -> RepoResult<u64> {
        let result = sqlx::query("DELETE FROM bookings WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(result.rows_affected())
    }

    async fn commit_cancellation(&self, id: Uuid, room_id: Uuid) -> RepoResult<CancelCommit> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        let marked = sqlx::query(
            "UPDATE bookings SET status = $1, updated_at = NOW() WHERE id = $2 AND status = $3",
        )
        .bind(BookingStatus::Canceled.as_str())
        .bind(id)
        .bind(BookingStatus::Active.as_str())
        .execute(&mut *tx)
        .await
        .map_err(db_error)?;

        if marked.rows_affected() == 0 {
            tx.rollback().await.map_err(db_error)?;
            return Ok(CancelCommit::AlreadyGone);
        }

        sqlx::query("UPDATE rooms SET available = TRUE WHERE id = $1")
            .bind(room_id)
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;

        sqlx::query("DELETE FROM bookings WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;

        tx.commit().await.map_err(db_error)?;
        Ok(CancelCommit::Committed)
    }
}
