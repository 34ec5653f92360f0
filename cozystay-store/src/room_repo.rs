use async_trait::async_trait;
use cozystay_core::{PriceRange, RepoResult, Room, RoomRepository};
use serde_json::Value;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db_error;

pub struct PgRoomRepository {
    pool: PgPool,
}

impl PgRoomRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct RoomRow {
    id: Uuid,
    price_per_night: f64,
    available: bool,
    details: Json<Value>,
}

impl From<RoomRow> for Room {
    fn from(row: RoomRow) -> Self {
        Room::from_stored(row.id, row.price_per_night, row.available, row.details.0)
    }
}

#[async_trait]
impl RoomRepository for PgRoomRepository {
    async fn list_rooms(&self, range: PriceRange) -> RepoResult<Vec<Room>> {
        let rows: Vec<RoomRow> = sqlx::query_as(
            r#"
            SELECT id, price_per_night, available, details
            FROM rooms
            WHERE ($1::FLOAT8 IS NULL OR price_per_night >= $1)
              AND ($2::FLOAT8 IS NULL OR price_per_night <= $2)
            ORDER BY price_per_night ASC
            "#,
        )
        .bind(range.min)
        .bind(range.max)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(rows.into_iter().map(Room::from).collect())
    }

    async fn get_room(&self, id: Uuid) -> RepoResult<Option<Room>> {
        let row: Option<RoomRow> = sqlx::query_as(
            "SELECT id, price_per_night, available, details FROM rooms WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(row.map(Room::from))
    }

    async fn set_available(&self, id: Uuid, available: bool) -> RepoResult<()> {
        sqlx::query("UPDATE rooms SET available = $1 WHERE id = $2")
            .bind(available)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(())
    }
}
